//! Per-level encoding cost model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Family, OreError};

/// Largest multiplicative depth covered by the default table.
pub const DEFAULT_MAX_KAPPA: usize = 30;

// Cost of one encoding at depth 2 in the default table.
const DEFAULT_UNIT_COST: u64 = 25;

/// The cost of producing one encoding, indexed by the multiplicative depth kappa.
///
/// The table only covers the depths that were measured; any other depth is infeasible.
///
/// # Format
///
/// Tables load from YAML maps of kappa to cost:
///
/// ```yaml
/// 2: 100
/// 3: 225
/// 4: 400
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<usize, u64>", into = "BTreeMap<usize, u64>")]
pub struct EncodingCostTable {
    costs: BTreeMap<usize, u64>,
}

impl EncodingCostTable {
    /// Creates a table from `(kappa, cost)` pairs.
    ///
    /// Returns an error if a cost is zero or a depth is below 2.
    pub fn new(costs: impl IntoIterator<Item = (usize, u64)>) -> Result<Self, OreError> {
        let costs: BTreeMap<_, _> = costs.into_iter().collect();

        if let Some((kappa, _)) = costs.iter().find(|&(&kappa, _)| kappa < 2) {
            return Err(OreError::CostTable(format!(
                "kappa {kappa} is below the minimum depth 2"
            )));
        }
        if let Some((kappa, _)) = costs.iter().find(|&(_, &cost)| cost == 0) {
            return Err(OreError::CostTable(format!(
                "cost for kappa {kappa} must be positive"
            )));
        }
        if costs.is_empty() {
            return Err(OreError::CostTable("table is empty".to_string()));
        }

        Ok(Self { costs })
    }

    /// Parses a table from a YAML map of kappa to cost.
    pub fn from_yaml(yaml: &str) -> Result<Self, OreError> {
        let costs: BTreeMap<usize, u64> =
            serde_yaml::from_str(yaml).map_err(|e| OreError::CostTable(e.to_string()))?;
        Self::new(costs)
    }

    /// Returns the largest depth covered by the table.
    pub fn max_kappa(&self) -> usize {
        self.costs.keys().next_back().copied().unwrap_or_default()
    }

    /// Returns the per-encoding cost at depth `kappa`, or `None` if the depth is infeasible.
    pub fn cost(&self, kappa: usize) -> Option<u64> {
        if kappa < 2 {
            return None;
        }
        self.costs.get(&kappa).copied()
    }

    /// Returns the total cost of one plaintext of `family` over `digit_len` base-`base` digits.
    ///
    /// Every encoding of the plaintext is charged the per-level cost at the family's depth.
    pub fn family_cost(&self, family: Family, base: usize, digit_len: usize) -> Option<u64> {
        let per_encoding = self.cost(family.kappa(digit_len))?;
        let count = u64::try_from(family.encoding_count(base, digit_len)).ok()?;
        count.checked_mul(per_encoding)
    }
}

impl Default for EncodingCostTable {
    /// An estimated table where the cost of one encoding grows with the square of the depth.
    fn default() -> Self {
        let costs = (2..=DEFAULT_MAX_KAPPA)
            .map(|kappa| (kappa, (kappa * kappa) as u64 * DEFAULT_UNIT_COST / 4))
            .collect();

        Self { costs }
    }
}

impl TryFrom<BTreeMap<usize, u64>> for EncodingCostTable {
    type Error = OreError;

    fn try_from(costs: BTreeMap<usize, u64>) -> Result<Self, Self::Error> {
        Self::new(costs)
    }
}

impl From<EncodingCostTable> for BTreeMap<usize, u64> {
    fn from(table: EncodingCostTable) -> Self {
        table.costs
    }
}
