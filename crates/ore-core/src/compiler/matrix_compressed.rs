use crate::{
    compiler::{verdict, Compiler, EQUAL, GREATER, LESS},
    ClearMatrix, DigitString, Family, Stream,
};

/// Compiles programs of depth `2n` from small rectangular matrices.
///
/// `X` matrices widen the three comparison states into `d+2` states, carrying the digit of the
/// first input while the comparison is still equal. `Y` matrices narrow them back to three.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixCompressedCompiler;

impl Compiler for MatrixCompressedCompiler {
    fn family(&self) -> Family {
        Family::MatrixCompressed
    }

    fn compile_stream(&self, stream: Stream, digits: &DigitString) -> Vec<ClearMatrix> {
        let d = digits.base();

        digits
            .digits()
            .iter()
            .enumerate()
            .map(|(position, &digit)| match (stream, position) {
                (Stream::X, 0) => ClearMatrix::one_hot(d, digit),
                (Stream::X, _) => ClearMatrix::routing(3, d + 2, |state| match state {
                    EQUAL => digit,
                    LESS => d,
                    _ => d + 1,
                }),
                (Stream::Y, 0) => ClearMatrix::routing(d, 3, |v| verdict(v, digit)),
                (Stream::Y, _) => ClearMatrix::routing(d + 2, 3, |v| match v {
                    v if v == d => LESS,
                    v if v == d + 1 => GREATER,
                    v => verdict(v, digit),
                }),
            })
            .collect()
    }
}
