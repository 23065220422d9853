//! Multilinear-map backends.
//!
//! An encoding carries the set of levels it covers. Encodings multiply only when their level
//! sets are disjoint, add only when their level sets are equal, and can be zero-tested only once
//! they cover every level.

mod ideal;

pub use ideal::IdealMmap;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{field::Fp, BackendError};

/// Largest multiplicative depth supported by the level sets.
pub const MAX_LEVELS: usize = 64;

/// A set of levels in `[0, kappa)`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelSet(u64);

impl LevelSet {
    /// Returns the set holding only `level`.
    pub fn single(level: usize) -> Result<Self, BackendError> {
        if level >= MAX_LEVELS {
            return Err(BackendError::Level {
                level,
                kappa: MAX_LEVELS,
            });
        }
        Ok(Self(1 << level))
    }

    /// Returns the set of all levels in `[0, kappa)`.
    pub fn top(kappa: usize) -> Self {
        if kappa >= MAX_LEVELS {
            Self(u64::MAX)
        } else {
            Self((1 << kappa) - 1)
        }
    }

    /// Returns the number of levels in the set.
    pub fn degree(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns `true` if the sets share no level.
    pub fn is_disjoint(&self, other: &LevelSet) -> bool {
        self.0 & other.0 == 0
    }

    /// Returns the union of both sets.
    pub fn union(&self, other: &LevelSet) -> LevelSet {
        LevelSet(self.0 | other.0)
    }
}

impl fmt::Display for LevelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for level in (0..MAX_LEVELS).filter(|level| (self.0 >> level) & 1 == 1) {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{level}")?;
            first = false;
        }
        write!(f, "}}")
    }
}

/// An encoded field element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encoding {
    levels: LevelSet,
    value: Fp,
}

impl Encoding {
    /// Returns the levels covered by the encoding.
    pub fn levels(&self) -> LevelSet {
        self.levels
    }
}

/// A multilinear map of depth kappa.
pub trait MultilinearMap: Send + Sync {
    /// Returns the backend kind.
    fn kind(&self) -> BackendKind;

    /// Returns the multiplicative depth.
    fn kappa(&self) -> usize;

    /// Encodes `value` at `level`.
    fn encode(&self, value: Fp, level: usize) -> Result<Encoding, BackendError>;

    /// Adds two encodings at the same levels.
    fn add(&self, lhs: &Encoding, rhs: &Encoding) -> Result<Encoding, BackendError>;

    /// Multiplies two encodings at disjoint levels.
    fn mul(&self, lhs: &Encoding, rhs: &Encoding) -> Result<Encoding, BackendError>;

    /// Tests an encoding covering every level for zero.
    fn is_zero(&self, encoding: &Encoding) -> Result<bool, BackendError>;
}

/// The available multilinear-map backends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BackendKind {
    /// The insecure reference backend, see [`IdealMmap`].
    #[default]
    Ideal,
}

impl BackendKind {
    /// Instantiates the backend for depth `kappa`.
    pub fn instantiate(&self, kappa: usize) -> Result<Box<dyn MultilinearMap>, BackendError> {
        match self {
            BackendKind::Ideal => Ok(Box::new(IdealMmap::new(kappa)?)),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Ideal => write!(f, "ideal"),
        }
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ideal" => Ok(BackendKind::Ideal),
            other => Err(format!("unknown backend {other}, expected ideal")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_level_set() {
        let a = LevelSet::single(0).unwrap();
        let b = LevelSet::single(3).unwrap();

        assert!(a.is_disjoint(&b));
        assert!(!a.is_disjoint(&a));
        assert_eq!(a.union(&b).degree(), 2);
        assert_eq!(a.union(&b).to_string(), "{0, 3}");
        assert_eq!(LevelSet::top(4), LevelSet(0b1111));
        assert_eq!(LevelSet::top(64).degree(), 64);
        assert!(LevelSet::single(64).is_err());
    }

    #[test]
    fn test_backend_kind() {
        assert_eq!("Ideal".parse::<BackendKind>().unwrap(), BackendKind::Ideal);
        assert!("clt13".parse::<BackendKind>().is_err());

        let mmap = BackendKind::Ideal.instantiate(4).unwrap();
        assert_eq!(mmap.kind(), BackendKind::Ideal);
        assert_eq!(mmap.kappa(), 4);
    }
}
