//! The hooks consumed by the MIFE engine.

use num_bigint::BigUint;
use tracing::{debug, instrument};

use crate::{
    parse, schedule,
    structure::{check_structure, level_chain},
    ClearMatrix, ClearMatrixSet, Comparison, DecodeError, DigitString, OreError, OreParams,
    Stream, StructureError,
};

/// A matrix branching program evaluated by a multi-input functional encryption scheme.
///
/// The engine sizes its randomizers from [`kilian_dims`](Self::kilian_dims), places every
/// compiled matrix at the level given by [`ordering`](Self::ordering), and reads the verdict with
/// [`parse`](Self::parse). The default hooks derive everything from [`params`](Self::params).
pub trait MatrixBranchingProgram {
    /// Returns the parameters of the program.
    fn params(&self) -> &OreParams;

    /// Returns the number of inputs of the program.
    fn num_inputs(&self) -> usize {
        Stream::ALL.len()
    }

    /// Returns the multiplicative depth.
    fn kappa(&self) -> usize {
        self.params().kappa()
    }

    /// Returns the number of matrices contributed by `stream`.
    fn stream_len(&self, stream: Stream) -> usize {
        self.params().stream_len(stream)
    }

    /// Returns the dimension of every junction between consecutive levels.
    fn kilian_dims(&self) -> Vec<usize> {
        self.params().kilian_dims()
    }

    /// Maps a level to the stream and position of its matrix.
    fn ordering(&self, level: usize) -> (Stream, usize) {
        schedule::ordering(level)
    }

    /// Compiles `message` into both streams of matrices.
    fn set_matrices(&self, message: &BigUint) -> Result<ClearMatrixSet, OreError>;

    /// Decodes the zero-test pattern of the final row.
    fn parse(&self, pattern: [bool; 3]) -> Result<Comparison, DecodeError> {
        parse::decode(pattern)
    }
}

/// The comparison program for fixed parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OreProgram {
    params: OreParams,
}

impl OreProgram {
    /// Creates a new program.
    pub fn new(params: OreParams) -> Self {
        Self { params }
    }

    /// Compiles a probe plaintext and checks it against the declared shape.
    pub fn check(&self) -> Result<(), OreError> {
        let probe = self.set_matrices(&BigUint::default())?;
        check_structure(self, &probe)?;
        Ok(())
    }

    /// Compares `x` with `y` by multiplying the cleartext matrices.
    ///
    /// Both plaintexts are reduced modulo `d^n` first.
    #[instrument(level = "trace", skip_all, err)]
    pub fn evaluate_clear(&self, x: &BigUint, y: &BigUint) -> Result<Comparison, OreError> {
        let x = self.set_matrices(x)?;
        let y = self.set_matrices(y)?;

        let chain = level_chain(self, &x, &y)?;
        let (first, rest) = chain.split_first().ok_or(StructureError::LevelCount {
            expected: self.kappa(),
            actual: 0,
        })?;
        let product = rest
            .iter()
            .try_fold(ClearMatrix::clone(first), |acc, &m| acc.mul(m))?;

        Ok(parse::decode_clear(product.row(0))?)
    }
}

impl MatrixBranchingProgram for OreProgram {
    fn params(&self) -> &OreParams {
        &self.params
    }

    fn set_matrices(&self, message: &BigUint) -> Result<ClearMatrixSet, OreError> {
        let digits =
            DigitString::from_message(message, self.params.base(), self.params.digit_len())?;
        let set = self.params.family().compiler().compile(&digits);

        debug!(
            family = %self.params.family(),
            encodings = set.encoding_count(),
            "compiled plaintext"
        );

        Ok(set)
    }
}
