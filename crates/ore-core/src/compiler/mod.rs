//! Compilation of digit strings into matrix branching programs.
//!
//! Each [`Family`] has its own compiler. All of them implement the same comparison automaton:
//! the product of the `X` matrices of the first plaintext interleaved with the `Y` matrices of
//! the second plaintext, evaluated from the start state, lands in exactly one of the states
//! equal, less or greater.

mod degree;
mod matrix_compressed;
mod normal;

pub use degree::DegreeCompressedCompiler;
pub use matrix_compressed::MatrixCompressedCompiler;
pub use normal::NormalCompiler;

use serde::{Deserialize, Serialize};

use crate::{ClearMatrix, DigitString, Family, Stream};

/// The matrices compiled from one plaintext, for both streams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearMatrixSet {
    /// The matrices read when the plaintext is the first input.
    pub x: Vec<ClearMatrix>,
    /// The matrices read when the plaintext is the second input.
    pub y: Vec<ClearMatrix>,
}

impl ClearMatrixSet {
    /// Returns the matrices of `stream`.
    pub fn stream(&self, stream: Stream) -> &[ClearMatrix] {
        match stream {
            Stream::X => &self.x,
            Stream::Y => &self.y,
        }
    }

    /// Returns the matrix at `position` in `stream`.
    pub fn get(&self, stream: Stream, position: usize) -> Option<&ClearMatrix> {
        self.stream(stream).get(position)
    }

    /// Returns the total number of matrix entries.
    pub fn encoding_count(&self) -> usize {
        self.x.iter().chain(&self.y).map(ClearMatrix::len).sum()
    }
}

/// A branching-program compiler for one family.
pub trait Compiler: Send + Sync {
    /// Returns the family this compiler implements.
    fn family(&self) -> Family;

    /// Compiles the matrices of `stream` for `digits`.
    ///
    /// The digit string must contain at least one digit.
    fn compile_stream(&self, stream: Stream, digits: &DigitString) -> Vec<ClearMatrix>;

    /// Compiles both streams for `digits`.
    fn compile(&self, digits: &DigitString) -> ClearMatrixSet {
        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                let (x, y) = rayon::join(
                    || self.compile_stream(Stream::X, digits),
                    || self.compile_stream(Stream::Y, digits),
                );
            } else {
                let x = self.compile_stream(Stream::X, digits);
                let y = self.compile_stream(Stream::Y, digits);
            }
        }

        ClearMatrixSet { x, y }
    }
}

// Comparison states shared by the compressed families, read on the last three columns.
pub(crate) const EQUAL: usize = 0;
pub(crate) const LESS: usize = 1;
pub(crate) const GREATER: usize = 2;

/// Returns the state reached after comparing digit `v` of the first input with digit `y` of the
/// second input.
pub(crate) fn verdict(v: usize, y: usize) -> usize {
    match v.cmp(&y) {
        std::cmp::Ordering::Equal => EQUAL,
        std::cmp::Ordering::Less => LESS,
        std::cmp::Ordering::Greater => GREATER,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{schedule::ordering, OreParams};

    use num_bigint::BigUint;
    use pretty_assertions::assert_eq;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha12Rng;
    use rstest::*;

    // Multiplies the interleaved chain of `x` and `y` and returns the final row.
    fn evaluate(params: &OreParams, x: &ClearMatrixSet, y: &ClearMatrixSet) -> Vec<u64> {
        let mut acc: Option<ClearMatrix> = None;
        for level in 0..params.kappa() {
            let (stream, position) = ordering(level);
            let set = match stream {
                Stream::X => x,
                Stream::Y => y,
            };
            let m = set.get(stream, position).unwrap();
            acc = Some(match acc {
                None => m.clone(),
                Some(acc) => acc.mul(m).unwrap(),
            });
        }

        acc.unwrap().row(0)[..3].to_vec()
    }

    fn expected_row(x: usize, y: usize) -> Vec<u64> {
        let mut row = vec![0; 3];
        row[verdict(x, y)] = 1;
        row
    }

    #[rstest]
    #[case(2, 1)]
    #[case(2, 2)]
    #[case(2, 3)]
    #[case(2, 4)]
    #[case(3, 1)]
    #[case(3, 2)]
    #[case(3, 3)]
    #[case(4, 2)]
    #[case(4, 3)]
    #[case(5, 2)]
    fn test_families_compare(#[case] base: usize, #[case] digit_len: usize) {
        let size = base.pow(digit_len as u32);

        for family in Family::ALL {
            let params = OreParams::new(base, digit_len, family).unwrap();
            let compiler = family.compiler();

            let sets: Vec<_> = (0..size)
                .map(|m| {
                    let digits =
                        DigitString::from_message(&BigUint::from(m), base, digit_len).unwrap();
                    compiler.compile(&digits)
                })
                .collect();

            for (x, set_x) in sets.iter().enumerate() {
                for (y, set_y) in sets.iter().enumerate() {
                    assert_eq!(
                        evaluate(&params, set_x, set_y),
                        expected_row(x, y),
                        "{family}: x = {x}, y = {y}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_first_difference_decides() {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let marked = |column: usize| {
            let mut row = vec![0; 3];
            row[column] = 1;
            row
        };

        for family in Family::ALL {
            for base in [2, 3, 5] {
                for digit_len in 1..=10 {
                    let params = OreParams::new(base, digit_len, family).unwrap();
                    let compile = |digits: Vec<usize>| {
                        family
                            .compiler()
                            .compile(&DigitString::from_digits(base, digits).unwrap())
                    };

                    for position in 0..digit_len {
                        // Shared prefix, a smaller digit for x at `position`, unrelated suffixes.
                        let prefix: Vec<usize> =
                            (0..position).map(|_| rng.gen_range(0..base)).collect();
                        let low = rng.gen_range(0..base - 1);
                        let high = rng.gen_range(low + 1..base);

                        let mut x = prefix.clone();
                        let mut y = prefix;
                        x.push(low);
                        y.push(high);
                        for _ in position + 1..digit_len {
                            x.push(rng.gen_range(0..base));
                            y.push(rng.gen_range(0..base));
                        }

                        let (set_x, set_y) = (compile(x.clone()), compile(y.clone()));
                        assert_eq!(
                            evaluate(&params, &set_x, &set_y),
                            marked(LESS),
                            "{family}: x = {x:?}, y = {y:?}"
                        );
                        assert_eq!(
                            evaluate(&params, &set_y, &set_x),
                            marked(GREATER),
                            "{family}: x = {y:?}, y = {x:?}"
                        );
                        assert_eq!(evaluate(&params, &set_x, &set_x), marked(EQUAL));
                    }
                }
            }
        }
    }

    #[test]
    fn test_encoding_count_matches_compiled() {
        for family in Family::ALL {
            for base in 2..=5 {
                for digit_len in 1..=10 {
                    let digits = DigitString::from_digits(base, vec![base - 1; digit_len]).unwrap();
                    let set = family.compiler().compile(&digits);

                    assert_eq!(
                        set.encoding_count(),
                        family.encoding_count(base, digit_len),
                        "{family}: d = {base}, n = {digit_len}"
                    );
                    assert_eq!(set.x.len(), family.stream_len(Stream::X, digit_len));
                    assert_eq!(set.y.len(), family.stream_len(Stream::Y, digit_len));
                }
            }
        }
    }

    #[test]
    fn test_compiled_entries_are_markers() {
        for family in Family::ALL {
            let digits = DigitString::from_digits(4, vec![3, 0, 2, 1, 1]).unwrap();
            let set = family.compiler().compile(&digits);

            for m in set.x.iter().chain(&set.y) {
                assert!(m.entries().iter().all(|&e| e <= crate::matrix::NONZERO));
                // Every state has at most one successor, exactly one in the compressed families.
                for row in 0..m.rows() {
                    let successors = m.row(row).iter().sum::<u64>();
                    match family {
                        Family::Normal => assert!(successors <= 1),
                        _ => assert_eq!(successors, 1),
                    }
                }
            }
        }
    }

    #[test]
    fn test_compiler_family() {
        for family in Family::ALL {
            assert_eq!(family.compiler().family(), family);
        }
    }
}
