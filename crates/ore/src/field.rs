//! Arithmetic modulo the Mersenne prime `2^61 - 1`.

use std::ops::{Add, Mul, Neg, Sub};

use ore_core::ClearMatrix;
use rand::{
    distributions::{Distribution, Standard},
    Rng,
};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::BackendError;

/// The field modulus.
pub const MODULUS: u64 = (1 << 61) - 1;

/// An element of `Z_p` with `p = 2^61 - 1`.
///
/// Elements are always reduced. Deserialization rejects values outside of `[0, p)`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "u64")]
pub struct Fp(u64);

impl Fp {
    /// Zero.
    pub const ZERO: Fp = Fp(0);
    /// One.
    pub const ONE: Fp = Fp(1);

    /// Creates a new element, reducing `value`.
    pub fn new(value: u64) -> Self {
        Self(value % MODULUS)
    }

    /// Returns the canonical representative.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Returns `true` if the element is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Returns `self^exp`.
    pub fn pow(self, mut exp: u64) -> Self {
        let mut base = self;
        let mut acc = Fp::ONE;
        while exp > 0 {
            if exp & 1 == 1 {
                acc = acc * base;
            }
            base = base * base;
            exp >>= 1;
        }
        acc
    }

    /// Returns the multiplicative inverse, or `None` for zero.
    pub fn inverse(self) -> Option<Self> {
        (!self.is_zero()).then(|| self.pow(MODULUS - 2))
    }
}

impl Add for Fp {
    type Output = Fp;

    fn add(self, rhs: Fp) -> Fp {
        // Both operands are below 2^61, the sum does not overflow.
        Fp::new(self.0 + rhs.0)
    }
}

impl Neg for Fp {
    type Output = Fp;

    fn neg(self) -> Fp {
        if self.is_zero() {
            self
        } else {
            Fp(MODULUS - self.0)
        }
    }
}

impl Sub for Fp {
    type Output = Fp;

    fn sub(self, rhs: Fp) -> Fp {
        if self.0 >= rhs.0 {
            Fp(self.0 - rhs.0)
        } else {
            Fp(MODULUS - (rhs.0 - self.0))
        }
    }
}

impl Mul for Fp {
    type Output = Fp;

    fn mul(self, rhs: Fp) -> Fp {
        let product = self.0 as u128 * rhs.0 as u128;
        Fp((product % MODULUS as u128) as u64)
    }
}

impl From<u64> for Fp {
    fn from(value: u64) -> Self {
        Fp::new(value)
    }
}

impl From<Fp> for u64 {
    fn from(value: Fp) -> u64 {
        value.0
    }
}

impl<'de> Deserialize<'de> for Fp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = u64::deserialize(deserializer)?;
        if value >= MODULUS {
            return Err(de::Error::custom(format!(
                "field element {value} is not reduced modulo {MODULUS}"
            )));
        }
        Ok(Fp(value))
    }
}

impl Distribution<Fp> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Fp {
        Fp(rng.gen_range(0..MODULUS))
    }
}

/// A row-major matrix over `Z_p`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "MatrixParts<Fp>", into = "MatrixParts<Fp>")]
pub struct FpMatrix {
    rows: usize,
    cols: usize,
    entries: Vec<Fp>,
}

impl FpMatrix {
    /// Creates a `rows×cols` zero matrix.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            entries: vec![Fp::ZERO; rows * cols],
        }
    }

    /// Creates the `dim×dim` identity.
    pub fn identity(dim: usize) -> Self {
        let mut m = Self::zeros(dim, dim);
        for i in 0..dim {
            m.entries[i * dim + i] = Fp::ONE;
        }
        m
    }

    /// Samples a uniformly random `rows×cols` matrix.
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        Self {
            rows,
            cols,
            entries: (0..rows * cols).map(|_| rng.gen()).collect(),
        }
    }

    /// Samples a random invertible `dim×dim` matrix and returns it with its inverse.
    pub fn random_invertible<R: Rng + ?Sized>(dim: usize, rng: &mut R) -> (Self, Self) {
        loop {
            let m = Self::random(dim, dim, rng);
            if let Some(inverse) = m.inverse() {
                return (m, inverse);
            }
        }
    }

    /// Returns `(rows, cols)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns the entry at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> Fp {
        self.entries[row * self.cols + col]
    }

    /// Returns the entries in row-major order.
    pub fn entries(&self) -> &[Fp] {
        &self.entries
    }

    /// Returns `scalar · self`.
    pub fn scale(mut self, scalar: Fp) -> Self {
        self.entries.iter_mut().for_each(|e| *e = *e * scalar);
        self
    }

    /// Returns the matrix product `self · rhs`.
    pub fn mul(&self, rhs: &FpMatrix) -> Result<FpMatrix, BackendError> {
        if self.cols != rhs.rows {
            return Err(BackendError::Dimensions {
                lhs: self.dims(),
                rhs: rhs.dims(),
            });
        }

        let mut out = FpMatrix::zeros(self.rows, rhs.cols);
        for i in 0..self.rows {
            for k in 0..self.cols {
                let a = self.get(i, k);
                if a.is_zero() {
                    continue;
                }
                for j in 0..rhs.cols {
                    let slot = &mut out.entries[i * rhs.cols + j];
                    *slot = *slot + a * rhs.get(k, j);
                }
            }
        }

        Ok(out)
    }

    /// Returns the inverse with Gauss-Jordan elimination, or `None` if the matrix is singular.
    pub fn inverse(&self) -> Option<FpMatrix> {
        if self.rows != self.cols {
            return None;
        }

        let n = self.rows;
        let mut a = self.clone();
        let mut inv = FpMatrix::identity(n);

        for col in 0..n {
            let pivot = (col..n).find(|&row| !a.get(row, col).is_zero())?;
            if pivot != col {
                a.swap_rows(pivot, col);
                inv.swap_rows(pivot, col);
            }

            let scale = a.get(col, col).inverse()?;
            a.scale_row(col, scale);
            inv.scale_row(col, scale);

            for row in 0..n {
                let factor = a.get(row, col);
                if row == col || factor.is_zero() {
                    continue;
                }
                a.sub_row(row, col, factor);
                inv.sub_row(row, col, factor);
            }
        }

        Some(inv)
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        for col in 0..self.cols {
            self.entries.swap(a * self.cols + col, b * self.cols + col);
        }
    }

    fn scale_row(&mut self, row: usize, scalar: Fp) {
        let cols = self.cols;
        self.entries[row * cols..(row + 1) * cols]
            .iter_mut()
            .for_each(|e| *e = *e * scalar);
    }

    // row[dst] -= factor * row[src]
    fn sub_row(&mut self, dst: usize, src: usize, factor: Fp) {
        for col in 0..self.cols {
            let value = self.get(src, col);
            let slot = &mut self.entries[dst * self.cols + col];
            *slot = *slot - factor * value;
        }
    }
}

// Serialized form of a row-major matrix, checked on deserialization.
#[derive(Serialize, Deserialize)]
pub(crate) struct MatrixParts<T> {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) entries: Vec<T>,
}

impl<T> MatrixParts<T> {
    pub(crate) fn check(&self) -> Result<(), BackendError> {
        if self.rows.checked_mul(self.cols) != Some(self.entries.len()) {
            return Err(BackendError::Entries {
                rows: self.rows,
                cols: self.cols,
                len: self.entries.len(),
            });
        }
        Ok(())
    }
}

impl TryFrom<MatrixParts<Fp>> for FpMatrix {
    type Error = BackendError;

    fn try_from(parts: MatrixParts<Fp>) -> Result<Self, Self::Error> {
        parts.check()?;
        Ok(Self {
            rows: parts.rows,
            cols: parts.cols,
            entries: parts.entries,
        })
    }
}

impl From<FpMatrix> for MatrixParts<Fp> {
    fn from(m: FpMatrix) -> Self {
        Self {
            rows: m.rows,
            cols: m.cols,
            entries: m.entries,
        }
    }
}

impl From<&ClearMatrix> for FpMatrix {
    fn from(m: &ClearMatrix) -> Self {
        Self {
            rows: m.rows(),
            cols: m.cols(),
            entries: m.entries().iter().map(|&e| Fp::new(e)).collect(),
        }
    }
}
