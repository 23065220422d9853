//! Message spaces and fixed-length base-`d` digit strings.

use num_bigint::BigUint;
use rug::{integer::Order, Float, Integer};
use serde::{Deserialize, Serialize};

use crate::{OreError, MAX_RADIX};

// Precision of the logarithm estimate, in bits.
const PRECISION: u32 = 200;

/// The set of plaintexts `[0, size)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSpace {
    size: BigUint,
}

impl MessageSpace {
    /// Creates a message space with `size` values.
    pub fn new(size: BigUint) -> Result<Self, OreError> {
        if size.bits() == 0 {
            return Err(OreError::EmptyMessageSpace);
        }

        Ok(Self { size })
    }

    /// Creates the message space of size `base^exp`.
    pub fn from_power(base: usize, exp: u32) -> Result<Self, OreError> {
        Self::new(BigUint::from(base).pow(exp))
    }

    /// Returns the number of values in the message space.
    pub fn size(&self) -> &BigUint {
        &self.size
    }

    /// Returns the smallest `n` such that `base^n >= size`.
    pub fn digit_length(&self, base: usize) -> Result<usize, OreError> {
        digit_length(&self.size, base)
    }
}

/// Returns the smallest `n` such that `base^n >= size`.
///
/// The length is first estimated with a high-precision logarithm and then corrected with exact
/// integer powers, so the result is minimal even when `size` is an exact power of `base`.
pub fn digit_length(size: &BigUint, base: usize) -> Result<usize, OreError> {
    if size.bits() == 0 {
        return Err(OreError::EmptyMessageSpace);
    }
    check_base(base)?;

    let big_base = BigUint::from(base);
    let mut n = log_ceil(size, base);

    while &big_base.pow(n as u32) < size {
        n += 1;
    }
    while n > 0 && &big_base.pow(n as u32 - 1) >= size {
        n -= 1;
    }

    Ok(n)
}

// Computes ceil(log_base(size)) with MPFR floats.
fn log_ceil(size: &BigUint, base: usize) -> usize {
    let size = Integer::from_digits(&size.to_bytes_le(), Order::Lsf);

    let ratio = Float::with_val(PRECISION, &size).ln() / Float::with_val(PRECISION, base).ln();

    ratio
        .ceil()
        .to_integer()
        .and_then(|n| n.to_usize())
        .unwrap_or(0)
}

pub(crate) fn check_base(base: usize) -> Result<(), OreError> {
    if (2..=MAX_RADIX).contains(&base) {
        Ok(())
    } else {
        Err(OreError::InvalidBase(base))
    }
}

/// A plaintext written as `len` base-`d` digits, most-significant digit first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitString {
    base: usize,
    digits: Vec<usize>,
}

impl DigitString {
    /// Writes `message mod base^len` as `len` digits.
    ///
    /// Messages outside of `[0, base^len)` are reduced silently, comparisons between digit
    /// strings are therefore comparisons modulo `base^len`.
    pub fn from_message(message: &BigUint, base: usize, len: usize) -> Result<Self, OreError> {
        check_base(base)?;

        let modulus = BigUint::from(base).pow(len as u32);
        let reduced = message % modulus;

        let mut digits = vec![0; len];
        if len > 0 {
            let repr = reduced.to_radix_be(base as u32);
            // `to_radix_be` never returns more digits than `len` after the reduction.
            let offset = len - repr.len();
            for (slot, digit) in digits[offset..].iter_mut().zip(repr) {
                *slot = digit as usize;
            }
        }

        Ok(Self { base, digits })
    }

    /// Creates a digit string from explicit digits, most-significant first.
    pub fn from_digits(base: usize, digits: Vec<usize>) -> Result<Self, OreError> {
        check_base(base)?;

        if let Some((position, &digit)) = digits.iter().enumerate().find(|&(_, &d)| d >= base) {
            return Err(OreError::DigitOutOfRange {
                position,
                digit,
                base,
            });
        }

        Ok(Self { base, digits })
    }

    /// Returns the base.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Returns the number of digits.
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    /// Returns `true` if the string has no digits.
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Returns the digits, most-significant first.
    pub fn digits(&self) -> &[usize] {
        &self.digits
    }

    /// Returns the value represented by the digits.
    pub fn value(&self) -> BigUint {
        self.digits
            .iter()
            .fold(BigUint::default(), |acc, &digit| acc * self.base + digit)
    }
}
