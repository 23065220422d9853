//! Level scheduling: which stream feeds each multiplication level, and the Kilian dimension
//! between consecutive levels.

use crate::{Family, Stream};

/// Maps a multiplication level in `[0, kappa)` to the stream supplying it and the position of
/// the matrix within that stream.
///
/// Levels strictly alternate between the two streams, starting with `X`.
pub fn ordering(level: usize) -> (Stream, usize) {
    let stream = if level % 2 == 0 { Stream::X } else { Stream::Y };
    (stream, level / 2)
}

/// Returns the dimension of every junction between consecutive levels.
///
/// Entry `i` is the number of columns of level `i`, which is the number of rows of level `i+1`.
/// The vector has `kappa - 1` entries, one per Kilian randomizer.
pub fn kilian_dims(family: Family, base: usize, digit_len: usize) -> Vec<usize> {
    let d = base;
    let junctions = family.kappa(digit_len).saturating_sub(1);

    (0..junctions)
        .map(|i| match family {
            Family::Normal => d + 3,
            Family::DegreeCompressed if i == 0 => d,
            Family::DegreeCompressed => d + 2,
            Family::MatrixCompressed if i == 0 => d,
            Family::MatrixCompressed if i % 2 == 1 => 3,
            Family::MatrixCompressed => d + 2,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ordering_alternates() {
        let levels: Vec<_> = (0..6).map(ordering).collect();
        assert_eq!(
            levels,
            vec![
                (Stream::X, 0),
                (Stream::Y, 0),
                (Stream::X, 1),
                (Stream::Y, 1),
                (Stream::X, 2),
                (Stream::Y, 2),
            ]
        );
    }

    #[test]
    fn test_kilian_dims() {
        assert_eq!(kilian_dims(Family::Normal, 2, 2), vec![5, 5, 5]);
        assert_eq!(kilian_dims(Family::DegreeCompressed, 3, 4), vec![3, 5, 5, 5]);
        assert_eq!(
            kilian_dims(Family::MatrixCompressed, 5, 3),
            vec![5, 3, 7, 3, 7]
        );
        assert_eq!(kilian_dims(Family::DegreeCompressed, 4, 1), vec![4]);
    }

    #[test]
    fn test_kilian_length() {
        for family in Family::ALL {
            for n in 1..=10 {
                assert_eq!(kilian_dims(family, 3, n).len(), family.kappa(n) - 1);
            }
        }
    }
}
