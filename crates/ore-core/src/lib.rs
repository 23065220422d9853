//! Core components of order-revealing encryption (ORE) built on multi-input functional
//! encryption (MIFE).
//!
//! This crate compiles plaintexts into matrix branching programs whose product reveals only the
//! three-way comparison of two plaintexts, and selects the digit base, digit length and program
//! family that minimize encoding cost for a given message space.
//!
//! It contains no cryptography and performs no I/O. The MIFE engine and the multilinear-map
//! backend consume the hooks exposed by [`MatrixBranchingProgram`], see the `ore` crate.
//!
//! # Example
//!
//! ```
//! use num_bigint::BigUint;
//! use ore_core::{optimize, Comparison, MessageSpace, OptimizerConfig, OreProgram};
//!
//! let space = MessageSpace::from_power(2, 10).unwrap();
//! let selection = optimize(&space, &OptimizerConfig::default()).unwrap();
//!
//! let program = OreProgram::new(selection.params);
//! let verdict = program
//!     .evaluate_clear(&BigUint::from(17u32), &BigUint::from(512u32))
//!     .unwrap();
//!
//! assert_eq!(verdict, Comparison::Less);
//! ```

#![deny(
    unsafe_code,
    missing_docs,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all
)]

pub mod compiler;
pub mod cost;
pub mod digits;
pub mod matrix;
pub mod optimizer;
pub mod params;
pub mod parse;
pub mod program;
pub mod schedule;
pub mod structure;

pub use compiler::{ClearMatrixSet, Compiler};
pub use cost::EncodingCostTable;
pub use digits::{DigitString, MessageSpace};
pub use matrix::ClearMatrix;
pub use optimizer::{optimize, optimize_family, OptimizerConfig, OptimizerConfigBuilder, Selection};
pub use params::{Family, OreParams, Stream};
pub use parse::{Comparison, DecodeError};
pub use program::{MatrixBranchingProgram, OreProgram};
pub use structure::{check_structure, StructureError};

use num_bigint::BigUint;

/// Largest supported base, bounded by the radix conversion of big integers.
pub const MAX_RADIX: usize = 256;

/// Default upper bound of the base search.
pub const DEFAULT_MAX_BASE: usize = 5;

/// An ORE core error.
#[allow(missing_docs)]
#[derive(Debug, thiserror::Error)]
pub enum OreError {
    #[error("message space must contain at least one value")]
    EmptyMessageSpace,
    #[error("invalid base {0}, expected a value in [2, 256]")]
    InvalidBase(usize),
    #[error("invalid digit length {0}, expected at least one digit")]
    InvalidDigitLength(usize),
    #[error("digit {digit} at position {position} is out of range for base {base}")]
    DigitOutOfRange {
        position: usize,
        digit: usize,
        base: usize,
    },
    #[error("no base in [2, {max_base}] yields a feasible compressed program for {size} messages")]
    Infeasible { max_base: usize, size: BigUint },
    #[error("invalid cost table: {0}")]
    CostTable(String),
    #[error(transparent)]
    Structure(#[from] StructureError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
