//! Deterministic randomness.
//!
//! Every random choice of the scheme is drawn from a labeled stream derived from a single
//! 128-bit seed, so identical seeds reproduce identical artifacts.

use std::{fmt, str::FromStr};

use num_bigint::{BigUint, RandBigInt};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::MifeError;

/// Label of the stream used by setup.
pub const SETUP_LABEL: &str = "setup";

/// Label of the stream used to generate plaintexts.
pub const PLAINTEXTS_LABEL: &str = "plaintexts";

/// A 128-bit seed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Seed([u8; 16]);

/// The seed used when none is provided.
pub const DEFAULT_SEED: Seed = Seed([
    0x62, 0xf1, 0xb2, 0xd2, 0x73, 0x3a, 0x5e, 0x5f, 0xd6, 0x3d, 0xe8, 0xef, 0xf7, 0xfc, 0xf9,
    0x65,
]);

impl Seed {
    /// Creates a seed from raw bytes.
    pub fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Returns the seed bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Returns the stream labeled `label`.
    pub fn rng(&self, label: &str) -> ChaCha20Rng {
        let mut hasher = Sha256::new();
        hasher.update(self.0);
        hasher.update(label.as_bytes());
        ChaCha20Rng::from_seed(hasher.finalize().into())
    }

    /// Returns the stream used to encrypt the `index`-th message, counting from one.
    pub fn message_rng(&self, index: usize) -> ChaCha20Rng {
        self.rng(&index.to_string())
    }
}

impl Default for Seed {
    fn default() -> Self {
        DEFAULT_SEED
    }
}

impl FromStr for Seed {
    type Err = MifeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|e| MifeError::seed(format!("invalid hex: {e}")))?;
        let bytes: [u8; 16] = bytes.try_into().map_err(|bytes: Vec<u8>| {
            MifeError::seed(format!(
                "expected 32 hex characters, got {}",
                2 * bytes.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Seed({self})")
    }
}

/// Draws `count` plaintexts uniformly from `[0, size)`.
pub fn generate_plaintexts(count: usize, size: &BigUint, seed: &Seed) -> Vec<BigUint> {
    let mut rng = seed.rng(PLAINTEXTS_LABEL);
    (0..count).map(|_| rng.gen_biguint_below(size)).collect()
}
