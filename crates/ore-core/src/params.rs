//! Program families and the parameters bound into public parameters.

use std::{fmt, str::FromStr};

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::{compiler::Compiler, digits::check_base, schedule, OreError};

/// A family of branching programs implementing the comparison automaton.
///
/// Every family computes the same verdicts, they differ in multiplicative depth and per-level
/// matrix dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Family {
    /// One square `(d+3)×(d+3)` matrix per digit and stream.
    Normal,
    /// Two digits merged per level, `d+2` wide, depth `n+1`.
    DegreeCompressed,
    /// One small matrix per digit and stream, depth `2n`.
    MatrixCompressed,
}

impl Family {
    /// The families searched by the parameter optimizer, in visiting order.
    pub const COMPRESSED: [Family; 2] = [Family::DegreeCompressed, Family::MatrixCompressed];

    /// All families.
    pub const ALL: [Family; 3] = [
        Family::Normal,
        Family::DegreeCompressed,
        Family::MatrixCompressed,
    ];

    /// Returns the multiplicative depth of a program over `digit_len` digits.
    pub fn kappa(&self, digit_len: usize) -> usize {
        match self {
            Family::Normal | Family::MatrixCompressed => 2 * digit_len,
            Family::DegreeCompressed => digit_len + 1,
        }
    }

    /// Returns the number of matrices contributed by `stream`.
    pub fn stream_len(&self, stream: Stream, digit_len: usize) -> usize {
        match (self, stream) {
            (Family::DegreeCompressed, Stream::X) => digit_len / 2 + 1,
            (Family::DegreeCompressed, Stream::Y) => digit_len.div_ceil(2),
            _ => digit_len,
        }
    }

    /// Returns the number of matrix entries, and so of encodings, in one compiled plaintext.
    pub fn encoding_count(&self, base: usize, digit_len: usize) -> usize {
        let (d, n) = (base, digit_len);
        if n == 0 {
            return 0;
        }

        match self {
            Family::Normal => 2 * n * (d + 3) * (d + 3),
            // The second matrix is also the last one, it is `d×3` instead of `d×(d+2)`.
            Family::DegreeCompressed if n == 1 => 4 * d,
            Family::DegreeCompressed => d * d * (n - 1) + (d + 1) * (4 * n - 2),
            Family::MatrixCompressed => 6 * (n - 1) * (d + 2) + 4 * d,
        }
    }

    /// Returns the number of rows of the first level.
    pub fn input_dim(&self, base: usize) -> usize {
        match self {
            Family::Normal => base + 3,
            _ => 1,
        }
    }

    /// Returns the number of columns of the last level.
    pub fn output_dim(&self, base: usize) -> usize {
        match self {
            Family::Normal => base + 3,
            _ => 3,
        }
    }

    /// Returns the compiler implementing this family.
    pub fn compiler(&self) -> &'static dyn Compiler {
        use crate::compiler::{
            DegreeCompressedCompiler, MatrixCompressedCompiler, NormalCompiler,
        };

        match self {
            Family::Normal => &NormalCompiler,
            Family::DegreeCompressed => &DegreeCompressedCompiler,
            Family::MatrixCompressed => &MatrixCompressedCompiler,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Normal => write!(f, "normal"),
            Family::DegreeCompressed => write!(f, "degree-compressed"),
            Family::MatrixCompressed => write!(f, "matrix-compressed"),
        }
    }
}

impl FromStr for Family {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "normal" => Ok(Family::Normal),
            "dc" | "degree-compressed" => Ok(Family::DegreeCompressed),
            "mc" | "matrix-compressed" => Ok(Family::MatrixCompressed),
            other => Err(format!(
                "unknown family {other}, expected one of normal, dc, mc"
            )),
        }
    }
}

/// One of the two plaintext streams of the comparison.
///
/// The first ciphertext supplies the `X` stream and the second one the `Y` stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stream {
    /// The first input.
    X,
    /// The second input.
    Y,
}

impl Stream {
    /// Both streams, in input order.
    pub const ALL: [Stream; 2] = [Stream::X, Stream::Y];

    /// Returns the input index of the stream.
    pub fn index(&self) -> usize {
        match self {
            Stream::X => 0,
            Stream::Y => 1,
        }
    }

    /// Returns the stream with input index `index`.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Stream::X),
            1 => Some(Stream::Y),
            _ => None,
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::X => write!(f, "X"),
            Stream::Y => write!(f, "Y"),
        }
    }
}

/// The `(base, digit length, family)` triple fixed for the lifetime of a scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OreParams {
    base: usize,
    digit_len: usize,
    family: Family,
}

impl OreParams {
    /// Creates new parameters.
    pub fn new(base: usize, digit_len: usize, family: Family) -> Result<Self, OreError> {
        check_base(base)?;
        if digit_len == 0 {
            return Err(OreError::InvalidDigitLength(digit_len));
        }

        Ok(Self {
            base,
            digit_len,
            family,
        })
    }

    /// Returns the base `d`.
    pub fn base(&self) -> usize {
        self.base
    }

    /// Returns the digit length `n`.
    pub fn digit_len(&self) -> usize {
        self.digit_len
    }

    /// Returns the program family.
    pub fn family(&self) -> Family {
        self.family
    }

    /// Returns the multiplicative depth.
    pub fn kappa(&self) -> usize {
        self.family.kappa(self.digit_len)
    }

    /// Returns the number of matrices contributed by `stream`.
    pub fn stream_len(&self, stream: Stream) -> usize {
        self.family.stream_len(stream, self.digit_len)
    }

    /// Returns the number of encodings in one compiled plaintext.
    pub fn encoding_count(&self) -> usize {
        self.family.encoding_count(self.base, self.digit_len)
    }

    /// Returns the Kilian dimension of every junction between consecutive levels.
    pub fn kilian_dims(&self) -> Vec<usize> {
        schedule::kilian_dims(self.family, self.base, self.digit_len)
    }

    /// Returns `d^n`, the modulus of the comparison.
    pub fn modulus(&self) -> BigUint {
        BigUint::from(self.base).pow(self.digit_len as u32)
    }
}

impl fmt::Display for OreParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "d = {}, n = {}, family = {}, kappa = {}",
            self.base,
            self.digit_len,
            self.family,
            self.kappa()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(Family::Normal, 4, 8)]
    #[case(Family::DegreeCompressed, 4, 5)]
    #[case(Family::MatrixCompressed, 4, 8)]
    #[case(Family::DegreeCompressed, 1, 2)]
    fn test_kappa(#[case] family: Family, #[case] n: usize, #[case] kappa: usize) {
        assert_eq!(family.kappa(n), kappa);
    }

    #[test]
    fn test_stream_lengths_cover_kappa() {
        for family in Family::ALL {
            for n in 1..=12 {
                let x = family.stream_len(Stream::X, n);
                let y = family.stream_len(Stream::Y, n);

                assert_eq!(x + y, family.kappa(n));
                // Strict alternation starting with X.
                assert!(x == y || x == y + 1);
            }
        }
    }

    #[test]
    fn test_family_from_str() {
        assert_eq!("dc".parse::<Family>().unwrap(), Family::DegreeCompressed);
        assert_eq!(
            "Matrix-Compressed".parse::<Family>().unwrap(),
            Family::MatrixCompressed
        );
        assert_eq!("normal".parse::<Family>().unwrap(), Family::Normal);
        assert!("tiny".parse::<Family>().is_err());

        for family in Family::ALL {
            assert_eq!(family.to_string().parse::<Family>().unwrap(), family);
        }
    }

    #[test]
    fn test_params_validation() {
        assert!(OreParams::new(1, 3, Family::Normal).is_err());
        assert!(OreParams::new(2, 0, Family::Normal).is_err());

        let params = OreParams::new(5, 5, Family::MatrixCompressed).unwrap();
        assert_eq!(params.modulus(), BigUint::from(3125u32));
        assert_eq!(params.kappa(), 10);
    }

    #[test]
    fn test_stream_index() {
        for stream in Stream::ALL {
            assert_eq!(Stream::from_index(stream.index()), Some(stream));
        }
        assert_eq!(Stream::from_index(2), None);
    }
}
