use crate::{
    backend::{BackendKind, Encoding, LevelSet, MultilinearMap, MAX_LEVELS},
    field::Fp,
    BackendError,
};

/// An insecure multilinear map holding field elements in the clear.
///
/// Level bookkeeping is enforced exactly as a graded encoding scheme would, so it exercises the
/// engine end to end, but it provides no hiding whatsoever. It is intended for testing.
#[derive(Debug, Clone, Copy)]
pub struct IdealMmap {
    kappa: usize,
}

impl IdealMmap {
    /// Creates a new map of depth `kappa`.
    pub fn new(kappa: usize) -> Result<Self, BackendError> {
        if kappa == 0 || kappa > MAX_LEVELS {
            return Err(BackendError::Depth(kappa));
        }
        Ok(Self { kappa })
    }
}

impl MultilinearMap for IdealMmap {
    fn kind(&self) -> BackendKind {
        BackendKind::Ideal
    }

    fn kappa(&self) -> usize {
        self.kappa
    }

    fn encode(&self, value: Fp, level: usize) -> Result<Encoding, BackendError> {
        if level >= self.kappa {
            return Err(BackendError::Level {
                level,
                kappa: self.kappa,
            });
        }

        Ok(Encoding {
            levels: LevelSet::single(level)?,
            value,
        })
    }

    fn add(&self, lhs: &Encoding, rhs: &Encoding) -> Result<Encoding, BackendError> {
        if lhs.levels != rhs.levels {
            return Err(BackendError::UnequalLevels {
                lhs: lhs.levels,
                rhs: rhs.levels,
            });
        }

        Ok(Encoding {
            levels: lhs.levels,
            value: lhs.value + rhs.value,
        })
    }

    fn mul(&self, lhs: &Encoding, rhs: &Encoding) -> Result<Encoding, BackendError> {
        if !lhs.levels.is_disjoint(&rhs.levels) {
            return Err(BackendError::OverlappingLevels {
                lhs: lhs.levels,
                rhs: rhs.levels,
            });
        }

        Ok(Encoding {
            levels: lhs.levels.union(&rhs.levels),
            value: lhs.value * rhs.value,
        })
    }

    fn is_zero(&self, encoding: &Encoding) -> Result<bool, BackendError> {
        if encoding.levels != LevelSet::top(self.kappa) {
            return Err(BackendError::NotTopLevel(encoding.levels));
        }

        Ok(encoding.value.is_zero())
    }
}
