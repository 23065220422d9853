use std::cmp::Ordering;

use crate::{
    compiler::{verdict, Compiler, GREATER, LESS},
    ClearMatrix, DigitString, Family, Stream,
};

/// Compiles programs of depth `n+1` by reading two digits per matrix.
///
/// Columns `0..d` carry the digit most recently read, which the next matrix compares against
/// its own digit. Column `d` is the absorbing less state and column `d+1` the absorbing greater
/// state. The last matrix of the chain projects onto the three comparison states.
#[derive(Debug, Clone, Copy, Default)]
pub struct DegreeCompressedCompiler;

impl Compiler for DegreeCompressedCompiler {
    fn family(&self) -> Family {
        Family::DegreeCompressed
    }

    fn compile_stream(&self, stream: Stream, digits: &DigitString) -> Vec<ClearMatrix> {
        let d = digits.base();
        let digits = digits.digits();
        let n = digits.len();
        let len = Family::DegreeCompressed.stream_len(stream, n);

        let mut matrices = Vec::with_capacity(len);
        let mut position = match stream {
            Stream::X => {
                matrices.push(ClearMatrix::one_hot(d, digits[0]));
                1
            }
            Stream::Y if n == 1 => {
                matrices.push(ClearMatrix::routing(d, 3, |i| verdict(i, digits[0])));
                1
            }
            Stream::Y => {
                matrices.push(second(d, digits[0], digits[1]));
                2
            }
        };

        while matrices.len() < len {
            if position == n - 1 {
                matrices.push(last(stream, d, digits[position]));
                position += 1;
            } else {
                matrices.push(middle(stream, d, digits[position], digits[position + 1]));
                position += 2;
            }
        }

        matrices
    }
}

// Compares the carried digit `carried` with the matrix digit `digit`, where the matrix belongs
// to `stream`. The carried digit always comes from the other input.
fn compare(stream: Stream, carried: usize, digit: usize) -> usize {
    match stream {
        Stream::X => verdict(digit, carried),
        Stream::Y => verdict(carried, digit),
    }
}

// `d×(d+2)`: compares `x_0` with `y_0` and carries `y_1` on a tie.
fn second(d: usize, y0: usize, y1: usize) -> ClearMatrix {
    ClearMatrix::routing(d, d + 2, |i| match i.cmp(&y0) {
        Ordering::Less => d,
        Ordering::Greater => d + 1,
        Ordering::Equal => y1,
    })
}

// `(d+2)×(d+2)`: compares the carried digit with `a` and carries `b` on a tie.
fn middle(stream: Stream, d: usize, a: usize, b: usize) -> ClearMatrix {
    ClearMatrix::routing(d + 2, d + 2, |i| {
        if i >= d {
            return i;
        }
        match compare(stream, i, a) {
            LESS => d,
            GREATER => d + 1,
            _ => b,
        }
    })
}

// `(d+2)×3`: compares the carried digit with `a` and projects onto the comparison states.
fn last(stream: Stream, d: usize, a: usize) -> ClearMatrix {
    ClearMatrix::routing(d + 2, 3, |i| match i {
        i if i == d => LESS,
        i if i == d + 1 => GREATER,
        i => compare(stream, i, a),
    })
}
