//! Order-revealing encryption from multi-input functional encryption.
//!
//! Plaintexts are compiled into matrix branching programs by [`ore_core`], randomized with
//! Kilian randomizers and encoded with a multilinear map. Comparing two ciphertexts multiplies
//! their encodings and zero-tests the result, revealing only the order of the plaintexts.
//!
//! The only backend is [`IdealMmap`](backend::IdealMmap), which is **insecure** and meant for
//! testing the engine.
//!
//! # Example
//!
//! ```
//! use num_bigint::BigUint;
//! use ore::{encrypt, evaluate, setup, Seed, SetupConfig};
//! use ore_core::{Comparison, Family, OreParams, OreProgram};
//!
//! let program = OreProgram::new(OreParams::new(4, 3, Family::MatrixCompressed).unwrap());
//! let seed = Seed::default();
//! let (pp, sk) = setup(&program, &SetupConfig::default(), &seed).unwrap();
//!
//! let a = encrypt(&program, &pp, &sk, &BigUint::from(12u32), &mut seed.message_rng(1)).unwrap();
//! let b = encrypt(&program, &pp, &sk, &BigUint::from(40u32), &mut seed.message_rng(2)).unwrap();
//!
//! assert_eq!(evaluate(&program, &pp, &a, &b).unwrap(), Comparison::Less);
//! ```

#![deny(
    unsafe_code,
    missing_docs,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all
)]

pub mod backend;
mod error;
pub mod field;
pub mod io;
pub mod mife;
pub mod seed;
pub mod selftest;

pub use error::{BackendError, ErrorKind, MifeError};
pub use mife::{
    encrypt, evaluate, setup, Ciphertext, PublicParams, SecretKey, SetupConfig,
    SetupConfigBuilder, DEFAULT_LAMBDA,
};
pub use seed::{generate_plaintexts, Seed, DEFAULT_SEED};
