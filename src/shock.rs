//! Policy Shock Specification
//!
//! A shock is a one-off change in the cost of labor: a minimum-wage rise, a
//! cut in weekly hours with wages maintained, or a change in employer payroll
//! contributions. Every solver reads it through the derived quantities below,
//! so the three kinds reach the economy as a per-sector labor-cost change.
//!
//! An hours cut also carries the share of monthly pay kept, the share of the
//! lost hours refilled by hiring and an hourly productivity gain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::reference::{Baseline, ReferenceData, SectorKey};
use crate::state::ratio_or_zero;

pub const DEFAULT_AFFECTED_SHARE: f64 = 0.107;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShockKind {
    Wage,  // magnitude = fractional wage change
    Hours, // magnitude = fractional cut in weekly hours
    Tax,   // magnitude = change in employer contribution rate
}

impl ShockKind {
    pub fn all() -> Vec<Self> {
        vec![Self::Wage, Self::Hours, Self::Tax]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Wage => "wage",
            Self::Hours => "hours",
            Self::Tax => "tax",
        }
    }

    /// Share of the labor-cost change that ends up in household income.
    pub fn income_pass_through(&self) -> f64 {
        match self {
            Self::Wage => 1.0,
            Self::Hours | Self::Tax => 0.0,
        }
    }
}

impl fmt::Display for ShockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShockKind {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wage" => Ok(Self::Wage),
            "hours" => Ok(Self::Hours),
            "tax" => Ok(Self::Tax),
            _ => Err(SimulationError::UnsupportedShockKind(s.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetGroup {
    LowWage,
    All,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShockParameters {
    pub labor_demand_elasticity: f64, // negative: employment falls as cost rises
    pub price_transmission: f64,      // share of cost increases passed to prices
    pub wage_diffusion: f64,          // spillover onto wages above the affected band
    pub pay_maintained: f64,          // hours: share of monthly pay kept
    pub compensatory_hiring: f64,     // hours: share of lost hours refilled by new hires
    pub productivity_gain: f64,       // hours: hourly productivity gain
}

impl Default for ShockParameters {
    fn default() -> Self {
        Self {
            labor_demand_elasticity: -0.5,
            price_transmission: 0.45,
            wage_diffusion: 0.2,
            pay_maintained: 1.0,
            compensatory_hiring: 0.0,
            productivity_gain: 0.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShockSpecification {
    pub kind: ShockKind,
    pub magnitude: f64,
    pub affected_share: f64,
    pub target_group: TargetGroup,
    pub anticipated: bool,
    pub parameters: ShockParameters,
}

impl ShockSpecification {
    pub fn new(kind: ShockKind, magnitude: f64) -> Self {
        Self {
            kind,
            magnitude,
            affected_share: DEFAULT_AFFECTED_SHARE,
            target_group: TargetGroup::LowWage,
            anticipated: true,
            parameters: ShockParameters::default(),
        }
    }

    /// Raise of the hourly minimum wage to `new_hourly`.
    pub fn minimum_wage(new_hourly: f64, baseline: &Baseline) -> Self {
        let magnitude = (new_hourly - baseline.minimum_wage_hourly) / baseline.minimum_wage_hourly;
        Self {
            affected_share: baseline.minimum_wage_coverage,
            ..Self::new(ShockKind::Wage, magnitude)
        }
    }

    /// Cut of the working week from `from_hours` to `to_hours`, monthly pay held
    /// unless `parameters.pay_maintained` says otherwise.
    pub fn hours_reduction(from_hours: f64, to_hours: f64) -> Self {
        let magnitude = if from_hours > 0.0 { (from_hours - to_hours) / from_hours } else { 0.0 };
        Self {
            affected_share: 1.0,
            target_group: TargetGroup::All,
            ..Self::new(ShockKind::Hours, magnitude)
        }
    }

    /// Change of the employer contribution rate, in rate points (0.02 = +2 points).
    pub fn payroll_tax(rate_change: f64) -> Self {
        Self {
            affected_share: 1.0,
            target_group: TargetGroup::All,
            ..Self::new(ShockKind::Tax, rate_change)
        }
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if !self.magnitude.is_finite() {
            return Err(SimulationError::invalid("shock magnitude must be finite"));
        }
        if !(0.0..=1.0).contains(&self.affected_share) {
            return Err(SimulationError::invalid(format!(
                "affected share {} outside [0, 1]",
                self.affected_share
            )));
        }
        if self.kind == ShockKind::Hours && self.magnitude >= 1.0 {
            return Err(SimulationError::invalid("hours reduction must be below 100%"));
        }
        let p = &self.parameters;
        let values = [
            p.labor_demand_elasticity,
            p.price_transmission,
            p.wage_diffusion,
            p.pay_maintained,
            p.compensatory_hiring,
            p.productivity_gain,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SimulationError::invalid("shock parameters must be finite"));
        }
        if p.pay_maintained <= 0.0 {
            return Err(SimulationError::invalid("share of pay maintained must be positive"));
        }
        if !(0.0..=1.0).contains(&p.compensatory_hiring) {
            return Err(SimulationError::invalid("compensatory hiring outside [0, 1]"));
        }
        if p.productivity_gain <= -1.0 {
            return Err(SimulationError::invalid("productivity gain must exceed -100%"));
        }
        Ok(())
    }

    /// Proportional change in the cost of an hour of affected labor.
    pub fn labor_cost_change(&self, baseline: &Baseline) -> f64 {
        match self.kind {
            ShockKind::Wage => self.magnitude,
            ShockKind::Hours => {
                let p = &self.parameters;
                p.pay_maintained / (1.0 - self.magnitude) - 1.0 - p.productivity_gain
            }
            ShockKind::Tax => self.magnitude / (1.0 + baseline.employer_contribution_rate),
        }
    }

    /// Share of `labor_cost_change` that reaches household income. For an
    /// hours cut, income moves with the monthly pay kept, not the hourly cost.
    pub fn income_pass_through(&self, baseline: &Baseline) -> f64 {
        match self.kind {
            ShockKind::Hours => {
                let given_up = self.parameters.pay_maintained - 1.0;
                ratio_or_zero(given_up, self.labor_cost_change(baseline))
            }
            kind => kind.income_pass_through(),
        }
    }

    /// Jobs opened to refill part of the hours no longer worked; hours cuts only.
    pub fn work_sharing_jobs(&self, reference: &ReferenceData) -> f64 {
        if self.kind != ShockKind::Hours {
            return 0.0;
        }
        reference.sector_employment()
            * self.magnitude
            * self.affected_share
            * self.parameters.compensatory_hiring
    }

    /// Share of a sector's workforce hit by the shock.
    ///
    /// Low-wage shocks follow the sector's minimum-wage distribution, rescaled
    /// so the economy-wide coverage equals `affected_share`.
    pub fn sector_affected_share(&self, key: SectorKey, reference: &ReferenceData) -> f64 {
        match self.target_group {
            TargetGroup::LowWage => {
                let coverage = reference.baseline.minimum_wage_coverage;
                if coverage <= 0.0 {
                    return 0.0;
                }
                (reference.minimum_wage_share[key] * self.affected_share / coverage).clamp(0.0, 1.0)
            }
            TargetGroup::All => self.affected_share,
        }
    }

    /// Sector-average labor-cost change.
    pub fn sector_cost_change(&self, key: SectorKey, reference: &ReferenceData) -> f64 {
        self.labor_cost_change(&reference.baseline) * self.sector_affected_share(key, reference)
    }

    /// Employment-weighted mean of the sector cost changes.
    pub fn mean_cost_change(&self, reference: &ReferenceData) -> f64 {
        let weights = reference.employment_weights();
        SectorKey::ALL
            .iter()
            .map(|&key| weights[key] * self.sector_cost_change(key, reference))
            .sum()
    }

    /// Low-wage intensity in [0, 1]: 1 once the whole minimum-wage segment is covered.
    pub fn low_wage_intensity(&self, reference: &ReferenceData) -> f64 {
        if self.target_group != TargetGroup::LowWage {
            return 0.0;
        }
        let coverage = reference.baseline.minimum_wage_coverage;
        if coverage <= 0.0 {
            return 0.0;
        }
        (self.affected_share / coverage).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shock_kind() {
        assert_eq!("wage".parse::<ShockKind>(), Ok(ShockKind::Wage));
        assert_eq!(" Hours ".parse::<ShockKind>(), Ok(ShockKind::Hours));
        assert_eq!(
            "bonus".parse::<ShockKind>(),
            Err(SimulationError::UnsupportedShockKind("bonus".into()))
        );
    }

    #[test]
    fn test_minimum_wage_constructor() {
        let baseline = Baseline::default();
        let shock = ShockSpecification::minimum_wage(15.0, &baseline);

        assert!((shock.magnitude - 0.2626).abs() < 1e-3);
        assert_eq!(shock.target_group, TargetGroup::LowWage);
        assert!((shock.affected_share - 0.107).abs() < 1e-12);
    }

    #[test]
    fn test_hours_reduction_cost() {
        let baseline = Baseline::default();
        let shock = ShockSpecification::hours_reduction(35.0, 32.0);

        // 3/35 fewer hours at the same pay = 3/32 more per hour
        assert!((shock.labor_cost_change(&baseline) - 3.0 / 32.0).abs() < 1e-12);
        assert_eq!(shock.income_pass_through(&baseline), 0.0);
    }

    #[test]
    fn test_hours_reduction_with_partial_pay_and_productivity() {
        let baseline = Baseline::default();
        let mut shock = ShockSpecification::hours_reduction(35.0, 32.0);
        shock.parameters.pay_maintained = 0.95;
        shock.parameters.productivity_gain = 0.03;

        let cost = shock.labor_cost_change(&baseline);
        assert!((cost - (0.95 * 35.0 / 32.0 - 1.0 - 0.03)).abs() < 1e-12);
        assert!(cost < 3.0 / 32.0);
        // income falls by the 5% of monthly pay given up
        assert!((cost * shock.income_pass_through(&baseline) + 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_work_sharing_jobs() {
        let data = ReferenceData::default();
        let mut shock = ShockSpecification::hours_reduction(35.0, 32.0);
        assert_eq!(shock.work_sharing_jobs(&data), 0.0);

        shock.parameters.compensatory_hiring = 0.08;
        let expected = data.sector_employment() * (3.0 / 35.0) * 0.08;
        assert!((shock.work_sharing_jobs(&data) - expected).abs() < 1e-6);

        let wage = ShockSpecification {
            parameters: shock.parameters,
            ..ShockSpecification::new(ShockKind::Wage, 0.1)
        };
        assert_eq!(wage.work_sharing_jobs(&data), 0.0);
    }

    #[test]
    fn test_low_wage_shares_follow_minimum_wage_distribution() {
        let data = ReferenceData::default();
        let shock = ShockSpecification::new(ShockKind::Wage, 0.1);

        let hospitality = shock.sector_affected_share(SectorKey::Hospitality, &data);
        let finance = shock.sector_affected_share(SectorKey::Finance, &data);
        assert!(hospitality > finance);
        assert!((hospitality - 0.35).abs() < 1e-12);

        // rescaled coverage lands close to the configured share
        let mean_share = shock.mean_cost_change(&data) / 0.1;
        assert!((mean_share - DEFAULT_AFFECTED_SHARE).abs() < 0.01);
    }

    #[test]
    fn test_zero_affected_share_means_no_cost_change() {
        let data = ReferenceData::default();
        let shock = ShockSpecification {
            affected_share: 0.0,
            ..ShockSpecification::new(ShockKind::Wage, 0.3)
        };

        for key in SectorKey::all() {
            assert_eq!(shock.sector_cost_change(key, &data), 0.0);
        }
        assert_eq!(shock.low_wage_intensity(&data), 0.0);
    }

    #[test]
    fn test_validate_rejects_full_hours_cut() {
        let shock = ShockSpecification::hours_reduction(35.0, 0.0);
        assert!(matches!(shock.validate(), Err(SimulationError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_validate_rejects_bad_hours_parameters() {
        let mut shock = ShockSpecification::hours_reduction(35.0, 32.0);
        shock.parameters.compensatory_hiring = 1.5;
        assert!(matches!(shock.validate(), Err(SimulationError::InvalidConfiguration(_))));

        shock.parameters.compensatory_hiring = 0.08;
        shock.parameters.pay_maintained = 0.0;
        assert!(matches!(shock.validate(), Err(SimulationError::InvalidConfiguration(_))));
    }
}
