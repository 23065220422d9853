//! Decoding of the final comparison row.

use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};

use crate::matrix::NONZERO;

/// The outcome of comparing two plaintexts `x` and `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    /// `x == y`.
    Equal = 0,
    /// `x < y`.
    Less = 1,
    /// `x > y`.
    Greater = 2,
}

impl Comparison {
    /// Returns the column of the final row holding this outcome.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Returns the outcome held in column `index`.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Comparison::Equal),
            1 => Some(Comparison::Less),
            2 => Some(Comparison::Greater),
            _ => None,
        }
    }

    /// Compares `x` with `y`.
    pub fn of<T: Ord + ?Sized>(x: &T, y: &T) -> Self {
        x.cmp(y).into()
    }
}

impl From<Ordering> for Comparison {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Equal => Comparison::Equal,
            Ordering::Less => Comparison::Less,
            Ordering::Greater => Comparison::Greater,
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Equal => write!(f, "equal"),
            Comparison::Less => write!(f, "less"),
            Comparison::Greater => write!(f, "greater"),
        }
    }
}

/// The final row did not hold exactly one outcome.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("no outcome is set")]
    Empty,
    #[error("{0} outcomes are set")]
    Ambiguous(usize),
    #[error("column {column} holds {value}, expected 0 or 1")]
    UnexpectedEntry { column: usize, value: u64 },
    #[error("expected 3 columns, got {0}")]
    Width(usize),
}

/// Decodes the zero-test pattern of the final row, `true` marking a nonzero column.
pub fn decode(pattern: [bool; 3]) -> Result<Comparison, DecodeError> {
    let mut set = pattern
        .iter()
        .enumerate()
        .filter_map(|(index, &nonzero)| nonzero.then_some(index));

    match (set.next(), set.count()) {
        (None, _) => Err(DecodeError::Empty),
        (Some(index), 0) => Comparison::from_index(index).ok_or(DecodeError::Width(index + 1)),
        (Some(_), rest) => Err(DecodeError::Ambiguous(rest + 1)),
    }
}

/// Decodes the first three entries of a cleartext final row.
pub fn decode_clear(row: &[u64]) -> Result<Comparison, DecodeError> {
    if row.len() < 3 {
        return Err(DecodeError::Width(row.len()));
    }

    let mut pattern = [false; 3];
    for (column, (&value, slot)) in row.iter().zip(pattern.iter_mut()).enumerate() {
        if value != 0 && value != NONZERO {
            return Err(DecodeError::UnexpectedEntry { column, value });
        }
        *slot = value == NONZERO;
    }

    decode(pattern)
}
