//! Labor-category substitution.
//!
//! A low-wage cost shock makes the most exposed categories (young and
//! unqualified workers) relatively dearer. They lose employment share in
//! proportion to the exposure, the substitution elasticity and their weight in
//! the sector; the opposite category picks up part of the displaced share.
//! Capital replaces labor along a constant-elasticity path: the capital/labor
//! ratio moves by `(1 + c)^σ`.

use serde::{Deserialize, Serialize};

use crate::reference::{ReferenceData, SectorKey, SectorTable};
use crate::shock::{ShockSpecification, TargetGroup};

/// Share of the young workers' loss taken up by seniors.
const SENIOR_TAKE_UP: f64 = 0.5;
/// Share of the unqualified workers' loss taken up by qualified workers.
const QUALIFIED_TAKE_UP: f64 = 0.4;

/// Signed employment-share effects for one sector.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryEffects {
    pub young: f64,
    pub senior: f64,
    pub unqualified: f64,
    pub qualified: f64,
}

impl CategoryEffects {
    pub fn net_age(&self) -> f64 {
        self.young + self.senior
    }

    pub fn net_qualification(&self) -> f64 {
        self.unqualified + self.qualified
    }

    fn scaled(&self, factor: f64) -> Self {
        Self {
            young: self.young * factor,
            senior: self.senior * factor,
            unqualified: self.unqualified * factor,
            qualified: self.qualified * factor,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalLaborShift {
    pub ratio_change: f64, // relative change of K/L
    pub labor_reduction: f64,
    pub capital_increase: f64,
}

impl CapitalLaborShift {
    pub fn new(elasticity: f64, cost_change: f64, employment: f64, capital: f64) -> Self {
        let ratio = (1.0 + cost_change).max(0.0).powf(elasticity);
        Self {
            ratio_change: ratio - 1.0,
            labor_reduction: if ratio > 0.0 { employment * (1.0 - 1.0 / ratio) } else { 0.0 },
            capital_increase: capital * (ratio - 1.0),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisEffect {
    pub loss: f64,
    pub gain: f64,
    pub net: f64,
}

/// Employment-weighted effects over all sectors, in jobs.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SubstitutionSummary {
    pub by_age: AxisEffect,
    pub by_qualification: AxisEffect,
    pub by_sector: SectorTable<CategoryEffects>,
    pub capital_labor: CapitalLaborShift, // economy-wide elasticity, mean cost change
}

pub fn sector_effects(
    shock: &ShockSpecification,
    sector: SectorKey,
    reference: &ReferenceData,
) -> CategoryEffects {
    if shock.target_group != TargetGroup::LowWage {
        return CategoryEffects::default();
    }

    let exposure =
        shock.labor_cost_change(&reference.baseline) * shock.low_wage_intensity(reference);
    let elasticities = &reference.substitution;

    let young = -exposure * elasticities.young_senior * reference.age[sector].young;
    let unqualified = -exposure
        * elasticities.qualified_unqualified
        * reference.qualification[sector].unqualified;

    CategoryEffects {
        young,
        senior: SENIOR_TAKE_UP * young.abs(),
        unqualified,
        qualified: QUALIFIED_TAKE_UP * unqualified.abs(),
    }
}

pub fn aggregate(shock: &ShockSpecification, reference: &ReferenceData) -> SubstitutionSummary {
    let by_sector = SectorTable::from_fn(|key| {
        sector_effects(shock, key, reference).scaled(reference.sector(key).employment)
    });

    let sum = |f: fn(&CategoryEffects) -> f64| by_sector.values().map(f).sum::<f64>();
    let (young, senior) = (sum(|e| e.young), sum(|e| e.senior));
    let (unqualified, qualified) = (sum(|e| e.unqualified), sum(|e| e.qualified));

    SubstitutionSummary {
        by_age: AxisEffect {
            loss: young,
            gain: senior,
            net: young + senior,
        },
        by_qualification: AxisEffect {
            loss: unqualified,
            gain: qualified,
            net: unqualified + qualified,
        },
        by_sector,
        capital_labor: CapitalLaborShift::new(
            reference.substitution.capital_labor,
            shock.mean_cost_change(reference),
            reference.sector_employment(),
            reference.sectors.values().map(|s| s.capital()).sum(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shock::ShockKind;

    #[test]
    fn test_exposed_categories_lose() {
        let data = ReferenceData::default();
        let shock = ShockSpecification::new(ShockKind::Wage, 0.2);
        let effects = sector_effects(&shock, SectorKey::Hospitality, &data);

        assert!(effects.young < 0.0);
        assert!(effects.unqualified < 0.0);
        assert!((effects.senior - 0.5 * effects.young.abs()).abs() < 1e-15);
        assert!((effects.qualified - 0.4 * effects.unqualified.abs()).abs() < 1e-15);
        assert!(effects.net_age() < 0.0);
    }

    #[test]
    fn test_broad_shocks_have_no_category_shift() {
        let data = ReferenceData::default();
        let shock = ShockSpecification::hours_reduction(35.0, 32.0);
        let summary = aggregate(&shock, &data);

        assert_eq!(summary.by_age, AxisEffect::default());
        assert_eq!(summary.by_qualification, AxisEffect::default());
    }

    #[test]
    fn test_aggregate_net_is_sum_of_sector_nets() {
        let data = ReferenceData::default();
        let shock = ShockSpecification::new(ShockKind::Wage, 0.15);
        let summary = aggregate(&shock, &data);

        let expected: f64 = SectorKey::ALL
            .iter()
            .map(|&key| sector_effects(&shock, key, &data).net_age() * data.sector(key).employment)
            .sum();
        assert!((summary.by_age.net - expected).abs() <= 1e-9 * expected.abs().max(1.0));
    }

    #[test]
    fn test_capital_replaces_labor_at_economy_wide_elasticity() {
        let data = ReferenceData::default();
        let shock = ShockSpecification::new(ShockKind::Wage, 0.2);
        let summary = aggregate(&shock, &data);

        let expected = (1.0 + shock.mean_cost_change(&data)).powf(0.8) - 1.0;
        assert!((summary.capital_labor.ratio_change - expected).abs() < 1e-12);
        assert!(summary.capital_labor.labor_reduction > 0.0);
        assert!(summary.capital_labor.capital_increase > 0.0);
    }

    #[test]
    fn test_capital_labor_shift_is_neutral_without_cost_change() {
        let shift = CapitalLaborShift::new(0.8, 0.0, 1_000.0, 5_000.0);
        assert_eq!(shift, CapitalLaborShift::default());
    }

    #[test]
    fn test_zero_affected_share_is_neutral() {
        let data = ReferenceData::default();
        let shock = ShockSpecification {
            affected_share: 0.0,
            ..ShockSpecification::new(ShockKind::Wage, 0.3)
        };
        let summary = aggregate(&shock, &data);
        assert_eq!(summary.by_age.net, 0.0);
        assert_eq!(summary.by_qualification.net, 0.0);
        assert_eq!(summary.capital_labor, CapitalLaborShift::default());
    }
}
