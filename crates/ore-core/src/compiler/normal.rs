use crate::{compiler::verdict, ClearMatrix, DigitString, Family, Stream};

use super::{Compiler, GREATER, LESS};

// State `READ + v` means the first input's current digit is `v`.
const READ: usize = 3;

/// Compiles one square `(d+3)×(d+3)` matrix per digit and stream.
///
/// States `0`, `1` and `2` are equal, less and greater, states `3+v` remember the digit `v` of
/// the first input until the matching `Y` matrix reads it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalCompiler;

impl Compiler for NormalCompiler {
    fn family(&self) -> Family {
        Family::Normal
    }

    fn compile_stream(&self, stream: Stream, digits: &DigitString) -> Vec<ClearMatrix> {
        let dim = digits.base() + READ;

        digits
            .digits()
            .iter()
            .map(|&digit| {
                let mut m = ClearMatrix::zeros(dim, dim);
                m.mark(LESS, LESS);
                m.mark(GREATER, GREATER);

                match stream {
                    Stream::X => m.mark(0, READ + digit),
                    Stream::Y => {
                        for v in 0..digits.base() {
                            m.mark(READ + v, verdict(v, digit));
                        }
                    }
                }

                m
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normal_matrices() {
        let digits = DigitString::from_digits(2, vec![1, 0]).unwrap();

        let x = NormalCompiler.compile_stream(Stream::X, &digits);
        assert_eq!(x.len(), 2);
        assert_eq!(x[0].dims(), (5, 5));
        assert_eq!(x[0].row(0), &[0, 0, 0, 0, 1]);
        assert_eq!(x[1].row(0), &[0, 0, 0, 1, 0]);

        let y = NormalCompiler.compile_stream(Stream::Y, &digits);
        // y_0 = 1: digit 0 is less, digit 1 is equal.
        assert_eq!(y[0].row(3), &[0, 1, 0, 0, 0]);
        assert_eq!(y[0].row(4), &[1, 0, 0, 0, 0]);
        // y_1 = 0: digit 1 is greater.
        assert_eq!(y[1].row(4), &[0, 0, 1, 0, 0]);
        assert_eq!(y[1].row(0), &[0, 0, 0, 0, 0]);
    }
}
