//! Feedback Loop Aggregator
//!
//! Turns a direct employment impact into a per-period table of second-round
//! effects: lost (or gained) jobs change household income, which changes
//! consumption, production and in turn employment.
//!
//! ## Timing
//! The direct impact phases in as `1 - e^(-speed * t)`; induced effects are
//! computed from that period's direct impact only.

use serde::{Deserialize, Serialize};

use crate::reference::ReferenceData;
use crate::state::ratio_or_zero;

pub const DEFAULT_ADJUSTMENT_SPEED: f64 = 0.3;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedbackPeriod {
    pub period: usize,
    pub direct_employment: f64,
    pub induced_consumption: f64,
    pub induced_production: f64,
    pub induced_employment: f64,
    pub total_employment: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedbackLoop {
    pub multiplier: f64,
    pub propensity: f64,
    pub income_per_worker: f64, // annual
    pub output_per_worker: f64, // annual
    pub adjustment_speed: f64,
}

impl FeedbackLoop {
    /// Calibrated on the reference economy: annual median wage as income,
    /// GDP per worker as output.
    pub fn from_reference(reference: &ReferenceData, propensity: f64) -> Self {
        let baseline = &reference.baseline;
        Self {
            multiplier: baseline.keynesian_multiplier,
            propensity,
            income_per_worker: baseline.median_wage * 12.0,
            output_per_worker: ratio_or_zero(baseline.gdp, baseline.total_employment),
            adjustment_speed: DEFAULT_ADJUSTMENT_SPEED,
        }
    }

    pub fn trajectory(&self, initial_impact: f64, periods: usize) -> Vec<FeedbackPeriod> {
        (1..=periods)
            .map(|t| {
                let direct = initial_impact * (1.0 - (-self.adjustment_speed * t as f64).exp());
                let consumption = direct * self.income_per_worker * self.propensity;
                let production = consumption * self.multiplier;
                let induced = ratio_or_zero(production, self.output_per_worker);

                FeedbackPeriod {
                    period: t,
                    direct_employment: direct,
                    induced_consumption: consumption,
                    induced_production: production,
                    induced_employment: induced,
                    total_employment: direct + induced,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_losses_feed_back_negatively() {
        let data = ReferenceData::default();
        let feedback = FeedbackLoop::from_reference(&data, 0.85);
        let table = feedback.trajectory(-10_000.0, 3);

        assert_eq!(table.len(), 3);
        for row in &table {
            assert!(row.direct_employment < 0.0);
            assert!(row.induced_consumption < 0.0);
            assert!(row.total_employment < row.direct_employment);
        }
        assert!(table[2].direct_employment < table[0].direct_employment);
    }

    #[test]
    fn test_zero_output_per_worker_gives_no_induced_jobs() {
        let feedback = FeedbackLoop {
            multiplier: 1.3,
            propensity: 0.85,
            income_per_worker: 25_000.0,
            output_per_worker: 0.0,
            adjustment_speed: DEFAULT_ADJUSTMENT_SPEED,
        };
        let row = feedback.trajectory(-100.0, 1)[0];
        assert_eq!(row.induced_employment, 0.0);
        assert_eq!(row.total_employment, row.direct_employment);
    }

    #[test]
    fn test_zero_impact_zero_table() {
        let data = ReferenceData::default();
        let table = FeedbackLoop::from_reference(&data, 0.85).trajectory(0.0, 4);
        assert!(table.iter().all(|r| r.total_employment == 0.0));
    }
}
