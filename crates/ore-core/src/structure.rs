//! Structural checks of compiled programs against their declared shape.
//!
//! The MIFE engine trusts the level ordering and the Kilian dimensions declared by a program to
//! size its randomizers. Any disagreement with the compiled matrices would silently corrupt
//! every ciphertext, so it is rejected before key material is generated.

use tracing::trace;

use crate::{ClearMatrix, ClearMatrixSet, MatrixBranchingProgram, Stream};

/// A mismatch between a program's declared shape and its compiled matrices.
#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    #[error("stream {stream} has {actual} matrices, expected {expected}")]
    StreamLength {
        stream: Stream,
        expected: usize,
        actual: usize,
    },
    #[error("streams cover {actual} levels, expected kappa = {expected}")]
    LevelCount { expected: usize, actual: usize },
    #[error("level {level} maps to missing matrix {position} of stream {stream}")]
    MissingLevel {
        level: usize,
        stream: Stream,
        position: usize,
    },
    #[error("{actual} Kilian dimensions declared, expected {expected}")]
    KilianLength { expected: usize, actual: usize },
    #[error("first level has {actual} rows, expected {expected}")]
    InputDim { expected: usize, actual: usize },
    #[error("last level has {actual} columns, expected {expected}")]
    OutputDim { expected: usize, actual: usize },
    #[error("junction {junction} declared with dimension {declared}, compiled dimension is {actual}")]
    Junction {
        junction: usize,
        declared: usize,
        actual: usize,
    },
    #[error("cannot multiply a {lhs:?} matrix by a {rhs:?} matrix")]
    Product {
        lhs: (usize, usize),
        rhs: (usize, usize),
    },
}

/// Arranges the `X` matrices of `x` and the `Y` matrices of `y` in level order.
pub fn level_chain<'a, P>(
    program: &P,
    x: &'a ClearMatrixSet,
    y: &'a ClearMatrixSet,
) -> Result<Vec<&'a ClearMatrix>, StructureError>
where
    P: MatrixBranchingProgram + ?Sized,
{
    (0..program.kappa())
        .map(|level| {
            let (stream, position) = program.ordering(level);
            let set = match stream {
                Stream::X => x,
                Stream::Y => y,
            };

            set.get(stream, position)
                .ok_or(StructureError::MissingLevel {
                    level,
                    stream,
                    position,
                })
        })
        .collect()
}

/// Checks that `set`, compiled by `program`, matches the program's declared shape.
///
/// The checks cover the per-stream matrix counts, the level ordering, the dimensions of the
/// first and last levels, and every declared Kilian dimension.
pub fn check_structure<P>(program: &P, set: &ClearMatrixSet) -> Result<(), StructureError>
where
    P: MatrixBranchingProgram + ?Sized,
{
    let params = program.params();
    let kappa = program.kappa();

    for stream in Stream::ALL {
        let expected = program.stream_len(stream);
        let actual = set.stream(stream).len();
        if expected != actual {
            return Err(StructureError::StreamLength {
                stream,
                expected,
                actual,
            });
        }
    }

    let covered = set.x.len() + set.y.len();
    if covered != kappa {
        return Err(StructureError::LevelCount {
            expected: kappa,
            actual: covered,
        });
    }

    let chain = level_chain(program, set, set)?;

    let (first, last) = match (chain.first(), chain.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(StructureError::LevelCount {
                expected: kappa,
                actual: 0,
            })
        }
    };

    let input_dim = params.family().input_dim(params.base());
    if first.rows() != input_dim {
        return Err(StructureError::InputDim {
            expected: input_dim,
            actual: first.rows(),
        });
    }

    let output_dim = params.family().output_dim(params.base());
    if last.cols() != output_dim {
        return Err(StructureError::OutputDim {
            expected: output_dim,
            actual: last.cols(),
        });
    }

    let kilian = program.kilian_dims();
    if kilian.len() != kappa - 1 {
        return Err(StructureError::KilianLength {
            expected: kappa - 1,
            actual: kilian.len(),
        });
    }

    for (junction, (pair, &declared)) in chain.windows(2).zip(&kilian).enumerate() {
        let (lhs, rhs) = (pair[0], pair[1]);
        if lhs.cols() != rhs.rows() {
            return Err(StructureError::Product {
                lhs: lhs.dims(),
                rhs: rhs.dims(),
            });
        }
        if lhs.cols() != declared {
            return Err(StructureError::Junction {
                junction,
                declared,
                actual: lhs.cols(),
            });
        }
    }

    trace!(kappa, "program structure is consistent");

    Ok(())
}
