//! Reputation averaging
//!
//! A company's legal identity carries the average reputation of its
//! employees. The average is applied through two synthetic sources, one per
//! polarity, so it can be withdrawn and recomputed without touching anything
//! other members gave the company directly.

use serde::{Deserialize, Serialize};

use crate::value_objects::{CompanyId, MemberId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Positive,
    Negative,
}

/// Someone who can give reputation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReputationSource {
    Member(MemberId),
    /// The averaging source of a company
    Accumulator {
        company: CompanyId,
        polarity: Polarity,
    },
}

impl ReputationSource {
    pub const fn is_accumulator(&self) -> bool {
        matches!(self, Self::Accumulator { .. })
    }
}

/// Reputation figures of one employee, as reported by the reputation system
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ReputationSample {
    /// Sum of positive reputation received
    pub positive: f64,
    /// Net reputation
    pub total: f64,
    /// Part of `positive` granted for speaking well of others
    pub speaks_well_bonus: f64,
}

/// Averages to apply through the two accumulators
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedReputation {
    pub positive: f64,
    pub negative: f64,
}

/// Average the employees' reputation
///
/// For each sample the negative part is `total - positive`, and the
/// positive running total accumulates `(positive - bonus) + negative`.
/// Both totals are divided by the sample count, except when the positive
/// total is exactly zero, in which case neither is divided.
#[allow(clippy::float_cmp)]
pub fn aggregate_reputation(samples: &[ReputationSample], exclude_bonus: bool) -> AggregatedReputation {
    let mut positive_total = 0.0;
    let mut negative_total = 0.0;
    for sample in samples {
        let ignored = if exclude_bonus {
            sample.speaks_well_bonus
        } else {
            0.0
        };
        let negative = sample.total - sample.positive;
        positive_total += (sample.positive - ignored) + negative;
        negative_total += negative;
    }

    // The guard is keyed on the positive total for both figures.
    if positive_total != 0.0 && !samples.is_empty() {
        let count = samples.len() as f64;
        positive_total /= count;
        negative_total /= count;
    }

    AggregatedReputation {
        positive: positive_total,
        negative: negative_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(positive: f64, total: f64) -> ReputationSample {
        ReputationSample {
            positive,
            total,
            speaks_well_bonus: 0.0,
        }
    }

    #[test]
    fn averages_two_employees() {
        // negative parts: 2 and 0
        let samples = [sample(10.0, 12.0), sample(4.0, 4.0)];
        let agg = aggregate_reputation(&samples, false);
        assert!((agg.positive - 8.0).abs() < 1e-9);
        assert!((agg.negative - 1.0).abs() < 1e-9);
    }

    #[test]
    fn bonus_is_excluded_only_when_asked() {
        let samples = [ReputationSample {
            positive: 6.0,
            total: 6.0,
            speaks_well_bonus: 2.0,
        }];
        assert!((aggregate_reputation(&samples, false).positive - 6.0).abs() < 1e-9);
        assert!((aggregate_reputation(&samples, true).positive - 4.0).abs() < 1e-9);
    }

    #[test]
    fn zero_positive_total_skips_division() {
        // positive part cancels the negative one
        let samples = [sample(3.0, 0.0), sample(0.0, 0.0)];
        let agg = aggregate_reputation(&samples, false);
        assert!(agg.positive.abs() < f64::EPSILON);
        assert!((agg.negative - -3.0).abs() < 1e-9);
    }

    #[test]
    fn no_employees_yields_zero() {
        assert_eq!(aggregate_reputation(&[], true), AggregatedReputation::default());
    }
}
