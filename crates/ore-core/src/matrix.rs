//! Cleartext matrices of compiled branching programs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::StructureError;

/// The nonzero marker placed in cleartext matrices.
pub const NONZERO: u64 = 1;

/// A row-major matrix over small nonnegative integers.
///
/// Compiled matrices only hold `0` or [`NONZERO`]; products of compiled matrices may hold larger
/// values.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearMatrix {
    rows: usize,
    cols: usize,
    entries: Vec<u64>,
}

impl ClearMatrix {
    /// Creates a `rows×cols` zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            entries: vec![0; rows * cols],
        }
    }

    /// Creates a `1×cols` row vector with the marker at `col`.
    pub fn one_hot(cols: usize, col: usize) -> Self {
        let mut m = Self::zeros(1, cols);
        m.mark(0, col);
        m
    }

    /// Creates a `rows×cols` matrix where row `i` holds the marker at column `route(i)`.
    pub fn routing(rows: usize, cols: usize, route: impl Fn(usize) -> usize) -> Self {
        let mut m = Self::zeros(rows, cols);
        for row in 0..rows {
            m.mark(row, route(row));
        }
        m
    }

    /// Places the marker at `(row, col)`.
    pub fn mark(&mut self, row: usize, col: usize) {
        self.set(row, col, NONZERO);
    }

    /// Sets the entry at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if `(row, col)` is out of bounds.
    pub fn set(&mut self, row: usize, col: usize, value: u64) {
        assert!(row < self.rows && col < self.cols, "entry out of bounds");
        self.entries[row * self.cols + col] = value;
    }

    /// Returns the entry at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if `(row, col)` is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> u64 {
        assert!(row < self.rows && col < self.cols, "entry out of bounds");
        self.entries[row * self.cols + col]
    }

    /// Returns the number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns `(rows, cols)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the matrix has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns row `row`.
    pub fn row(&self, row: usize) -> &[u64] {
        &self.entries[row * self.cols..(row + 1) * self.cols]
    }

    /// Returns the entries in row-major order.
    pub fn entries(&self) -> &[u64] {
        &self.entries
    }

    /// Returns the matrix product `self · rhs`.
    pub fn mul(&self, rhs: &ClearMatrix) -> Result<ClearMatrix, StructureError> {
        if self.cols != rhs.rows {
            return Err(StructureError::Product {
                lhs: self.dims(),
                rhs: rhs.dims(),
            });
        }

        let mut out = ClearMatrix::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            for (k, &a) in self.row(i).iter().enumerate() {
                if a == 0 {
                    continue;
                }
                for (j, &b) in rhs.row(k).iter().enumerate() {
                    out.entries[i * rhs.cols + j] += a * b;
                }
            }
        }

        Ok(out)
    }
}

impl fmt::Debug for ClearMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ClearMatrix({}x{})", self.rows, self.cols)?;
        for row in 0..self.rows {
            writeln!(f, "  {:?}", self.row(row))?;
        }
        Ok(())
    }
}
