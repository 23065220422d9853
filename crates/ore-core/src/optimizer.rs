//! Selection of the digit base, digit length and program family.

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    EncodingCostTable, Family, MessageSpace, OreError, OreParams, DEFAULT_MAX_BASE, MAX_RADIX,
};

/// Optimizer configuration.
#[derive(Debug, Clone, Builder)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct OptimizerConfig {
    /// Largest base searched.
    #[builder(default = "DEFAULT_MAX_BASE")]
    max_base: usize,
    /// Per-level encoding costs.
    #[builder(default)]
    cost_table: EncodingCostTable,
}

impl OptimizerConfig {
    /// Creates a new builder for the optimizer configuration.
    pub fn builder() -> OptimizerConfigBuilder {
        OptimizerConfigBuilder::default()
    }

    /// Returns the largest base searched.
    pub fn max_base(&self) -> usize {
        self.max_base
    }

    /// Returns the cost table.
    pub fn cost_table(&self) -> &EncodingCostTable {
        &self.cost_table
    }
}

impl OptimizerConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        match self.max_base {
            Some(max_base) if !(2..=MAX_RADIX).contains(&max_base) => Err(format!(
                "max base must be in [2, {MAX_RADIX}], got {max_base}"
            )),
            _ => Ok(()),
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        OptimizerConfigBuilder::default().build().unwrap()
    }
}

/// The parameters chosen for a message space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// The chosen parameters.
    pub params: OreParams,
    /// The number of encodings in one ciphertext.
    pub encoding_count: usize,
    /// The predicted cost of one ciphertext.
    pub total_cost: u64,
}

/// Returns the compressed program with the smallest predicted cost for `space`.
///
/// Bases are visited in ascending order and, within a base, degree-compressed before
/// matrix-compressed. A later candidate only replaces the current one if it is strictly cheaper.
pub fn optimize(space: &MessageSpace, config: &OptimizerConfig) -> Result<Selection, OreError> {
    search(space, config, &Family::COMPRESSED)
}

/// Returns the cheapest program of `family` for `space`.
///
/// This is the only way to select the normal family.
pub fn optimize_family(
    space: &MessageSpace,
    config: &OptimizerConfig,
    family: Family,
) -> Result<Selection, OreError> {
    search(space, config, &[family])
}

#[instrument(level = "debug", skip_all, fields(size = %space.size()), err)]
fn search(
    space: &MessageSpace,
    config: &OptimizerConfig,
    families: &[Family],
) -> Result<Selection, OreError> {
    let mut best: Option<Selection> = None;

    for base in 2..=config.max_base {
        // A program reads at least one digit.
        let digit_len = space.digit_length(base)?.max(1);

        for &family in families {
            let Some(total_cost) = config.cost_table.family_cost(family, base, digit_len) else {
                debug!(
                    base,
                    digit_len,
                    %family,
                    kappa = family.kappa(digit_len),
                    "infeasible candidate"
                );
                continue;
            };

            debug!(base, digit_len, %family, total_cost, "candidate");

            if matches!(best, Some(best) if best.total_cost <= total_cost) {
                continue;
            }

            best = Some(Selection {
                params: OreParams::new(base, digit_len, family)?,
                encoding_count: family.encoding_count(base, digit_len),
                total_cost,
            });
        }
    }

    let selection = best.ok_or_else(|| OreError::Infeasible {
        max_base: config.max_base,
        size: space.size().clone(),
    })?;

    debug!(params = %selection.params, total_cost = selection.total_cost, "selected");

    Ok(selection)
}
