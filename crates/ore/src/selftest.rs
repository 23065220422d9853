//! End-to-end comparison scenarios run through the engine.

use std::fmt;

use num_bigint::BigUint;
use ore_core::{Comparison, Family, OreParams, OreProgram};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::{
    io::{from_bytes, to_bytes},
    mife::{encrypt, evaluate, setup, Ciphertext, PublicParams, SecretKey, SetupConfig},
    seed::{generate_plaintexts, Seed},
    MifeError,
};

/// A self-test scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Plaintexts are drawn from `[0, message_space)`.
    pub message_space: u64,
    /// Number of plaintexts.
    pub count: usize,
    /// Digit base.
    pub base: usize,
    /// Digit length.
    pub digit_len: usize,
    /// Program family.
    pub family: Family,
}

impl Scenario {
    /// Returns the standard suite.
    ///
    /// Some scenarios use fewer digits than the message space needs, their plaintexts are
    /// compared modulo `d^n`.
    pub fn suite() -> Vec<Scenario> {
        let scenario = |message_space, count, base, digit_len, family| Scenario {
            message_space,
            count,
            base,
            digit_len,
            family,
        };

        vec![
            scenario(16, 5, 2, 2, Family::Normal),
            scenario(16, 5, 2, 3, Family::DegreeCompressed),
            scenario(16, 5, 2, 4, Family::MatrixCompressed),
            scenario(1000, 10, 5, 5, Family::Normal),
            scenario(1000, 10, 5, 5, Family::DegreeCompressed),
            scenario(1000, 10, 5, 5, Family::MatrixCompressed),
        ]
    }

    /// Runs the scenario, comparing every ordered pair of plaintexts.
    #[instrument(level = "info", skip_all, fields(scenario = %self), err)]
    pub fn run(&self, seed: &Seed) -> Result<Report, MifeError> {
        let params = OreParams::new(self.base, self.digit_len, self.family)?;
        let program = OreProgram::new(params);
        let modulus = params.modulus();

        let messages = generate_plaintexts(self.count, &BigUint::from(self.message_space), seed);

        let (pp, sk) = setup(&program, &SetupConfig::default(), seed)?;
        // Exercise the artifact encoding.
        let pp: PublicParams = from_bytes(&to_bytes(&pp)?)?;
        let sk: SecretKey = from_bytes(&to_bytes(&sk)?)?;

        let cts = messages
            .iter()
            .enumerate()
            .map(|(i, message)| {
                let ct = encrypt(&program, &pp, &sk, message, &mut seed.message_rng(i + 1))?;
                from_bytes::<Ciphertext>(&to_bytes(&ct)?)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut report = Report {
            scenario: self.clone(),
            comparisons: 0,
            mismatches: 0,
        };

        for (x, ct_x) in messages.iter().zip(&cts) {
            for (y, ct_y) in messages.iter().zip(&cts) {
                let expected = Comparison::of(&(x % &modulus), &(y % &modulus));
                let actual = evaluate(&program, &pp, ct_x, ct_y)?;

                report.comparisons += 1;
                if actual != expected {
                    warn!(%x, %y, %expected, %actual, "comparison mismatch");
                    report.mismatches += 1;
                }
            }
        }

        info!(
            comparisons = report.comparisons,
            mismatches = report.mismatches,
            "scenario complete"
        );

        Ok(report)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} messages in [0, {}), d = {}, n = {}, {}",
            self.count, self.message_space, self.base, self.digit_len, self.family
        )
    }
}

/// The outcome of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// The scenario run.
    pub scenario: Scenario,
    /// Number of comparisons evaluated.
    pub comparisons: usize,
    /// Number of comparisons that disagreed with the plaintext comparison.
    pub mismatches: usize,
}

impl Report {
    /// Returns `true` if every comparison was correct.
    pub fn passed(&self) -> bool {
        self.mismatches == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_scenarios() {
        for scenario in Scenario::suite().into_iter().take(3) {
            let report = scenario.run(&Seed::default()).unwrap();
            assert!(report.passed(), "{}", report.scenario);
            assert_eq!(report.comparisons, scenario.count * scenario.count);
        }
    }
}
