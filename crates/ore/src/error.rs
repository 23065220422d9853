use std::{error::Error, fmt};

use ore_core::{OreError, StructureError};

use crate::backend::LevelSet;

/// A multilinear-map error.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("unsupported multiplicative depth {0}")]
    Depth(usize),
    #[error("level {level} is out of range for depth {kappa}")]
    Level { level: usize, kappa: usize },
    #[error("cannot add encodings at levels {lhs} and {rhs}")]
    UnequalLevels { lhs: LevelSet, rhs: LevelSet },
    #[error("cannot multiply encodings at overlapping levels {lhs} and {rhs}")]
    OverlappingLevels { lhs: LevelSet, rhs: LevelSet },
    #[error("zero test of an encoding at levels {0}, expected every level")]
    NotTopLevel(LevelSet),
    #[error("cannot multiply a {lhs:?} matrix by a {rhs:?} matrix")]
    Dimensions {
        lhs: (usize, usize),
        rhs: (usize, usize),
    },
    #[error("a {rows}x{cols} matrix cannot hold {len} entries")]
    Entries { rows: usize, cols: usize, len: usize },
}

/// A MIFE engine error.
#[derive(Debug, thiserror::Error)]
pub struct MifeError {
    kind: ErrorKind,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl MifeError {
    fn new<E>(kind: ErrorKind, source: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        Self {
            kind,
            source: Some(source.into()),
        }
    }

    pub(crate) fn mismatch(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Mismatch, msg.into())
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, msg.into())
    }

    pub(crate) fn seed(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Seed, msg.into())
    }

    /// Returns the kind of error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

/// The kind of a [`MifeError`].
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Core,
    Structure,
    Backend,
    Seed,
    Config,
    Mismatch,
    Io,
    Serialization,
}

impl fmt::Display for MifeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ErrorKind::Core => write!(f, "core error"),
            ErrorKind::Structure => write!(f, "structure error"),
            ErrorKind::Backend => write!(f, "backend error"),
            ErrorKind::Seed => write!(f, "seed error"),
            ErrorKind::Config => write!(f, "configuration error"),
            ErrorKind::Mismatch => write!(f, "artifact mismatch"),
            ErrorKind::Io => write!(f, "io error"),
            ErrorKind::Serialization => write!(f, "serialization error"),
        }?;

        if let Some(source) = self.source.as_ref() {
            write!(f, " caused by: {source}")?;
        }

        Ok(())
    }
}

impl From<OreError> for MifeError {
    fn from(err: OreError) -> Self {
        match err {
            OreError::Structure(err) => err.into(),
            OreError::Infeasible { .. } | OreError::CostTable(_) => {
                Self::new(ErrorKind::Config, err)
            }
            err => Self::new(ErrorKind::Core, err),
        }
    }
}

impl From<StructureError> for MifeError {
    fn from(err: StructureError) -> Self {
        Self::new(ErrorKind::Structure, err)
    }
}

impl From<BackendError> for MifeError {
    fn from(err: BackendError) -> Self {
        Self::new(ErrorKind::Backend, err)
    }
}

impl From<std::io::Error> for MifeError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, err)
    }
}

impl From<bincode::Error> for MifeError {
    fn from(err: bincode::Error) -> Self {
        Self::new(ErrorKind::Serialization, err)
    }
}
