//! Economy snapshots and trajectories.
//!
//! A `SimulationState` is a plain value: solvers build a fresh one each period
//! from the previous one and never mutate a recorded state.

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::reference::{ReferenceData, SectorKey, SectorTable};

const EPSILON: f64 = 1e-12;

/// `numerator / denominator`, or 0 when the denominator is (near) zero.
pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator.abs() < EPSILON {
        0.0
    } else {
        numerator / denominator
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorState {
    pub production: f64,
    pub employment: f64,
    pub capital: f64,
    pub wage: f64, // annual labor cost per worker
    pub price: f64,
    pub productivity: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Anticipations {
    pub inflation: f64,
    pub growth: f64,
    pub wages: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    pub period: usize,
    pub converged: bool,
    pub sectors: SectorTable<SectorState>,
    pub gdp: f64,
    pub consumption: f64,
    pub investment: f64,
    pub government: f64,
    pub exports: f64,
    pub imports: f64,
    pub total_employment: f64,
    pub unemployment_rate: f64,
    pub inflation: f64,
    pub interest_rate: f64,
    pub anticipations: Anticipations,
}

impl SimulationState {
    /// The reference year as a period-0 state.
    pub fn baseline(reference: &ReferenceData) -> Self {
        let b = &reference.baseline;
        let sectors = reference.sectors.map(|_, s| SectorState {
            production: s.value_added,
            employment: s.employment,
            capital: s.capital(),
            wage: s.average_wage(),
            price: 1.0,
            productivity: 1.0,
        });

        Self {
            period: 0,
            converged: true,
            sectors,
            gdp: b.gdp,
            consumption: b.gdp * b.consumption_share,
            investment: b.gdp * b.investment_share,
            government: b.gdp * b.government_share(),
            exports: b.gdp * b.export_share,
            imports: b.gdp * b.import_share,
            total_employment: reference.sector_employment(),
            unemployment_rate: b.unemployment_rate,
            inflation: b.inflation,
            interest_rate: b.interest_rate,
            anticipations: Anticipations {
                inflation: b.inflation,
                growth: b.growth_trend,
                wages: b.wage_growth,
            },
        }
    }

    /// Sum of wage * employment over sectors.
    pub fn wage_bill(&self) -> f64 {
        self.sectors.values().map(|s| s.wage * s.employment).sum()
    }

    /// Value-added weighted price level, given base-year weights.
    pub fn price_level(&self, weights: &SectorTable<f64>) -> f64 {
        let total = weights.sum();
        let weighted: f64 = self.sectors.iter().map(|(key, s)| s.price * weights[key]).sum();
        if total > 0.0 {
            weighted / total
        } else {
            1.0
        }
    }

    pub fn numeric_fields(&self) -> Vec<(String, f64)> {
        let mut fields = vec![
            ("gdp".to_string(), self.gdp),
            ("consumption".to_string(), self.consumption),
            ("investment".to_string(), self.investment),
            ("government".to_string(), self.government),
            ("exports".to_string(), self.exports),
            ("imports".to_string(), self.imports),
            ("total_employment".to_string(), self.total_employment),
            ("unemployment_rate".to_string(), self.unemployment_rate),
            ("inflation".to_string(), self.inflation),
            ("interest_rate".to_string(), self.interest_rate),
            ("anticipations.inflation".to_string(), self.anticipations.inflation),
            ("anticipations.growth".to_string(), self.anticipations.growth),
            ("anticipations.wages".to_string(), self.anticipations.wages),
        ];
        for (key, s) in self.sectors.iter() {
            let code = key.code();
            fields.push((format!("{code}.production"), s.production));
            fields.push((format!("{code}.employment"), s.employment));
            fields.push((format!("{code}.capital"), s.capital));
            fields.push((format!("{code}.wage"), s.wage));
            fields.push((format!("{code}.price"), s.price));
            fields.push((format!("{code}.productivity"), s.productivity));
        }
        fields
    }

    pub fn ensure_finite(&self) -> Result<(), SimulationError> {
        match self.numeric_fields().into_iter().find(|(_, v)| !v.is_finite()) {
            Some((field, _)) => Err(SimulationError::SimulationDivergence {
                period: self.period,
                field,
            }),
            None => Ok(()),
        }
    }

    /// Largest relative difference over all numeric fields.
    pub fn max_relative_deviation(&self, other: &SimulationState) -> f64 {
        self.numeric_fields()
            .iter()
            .zip(other.numeric_fields())
            .map(|((_, a), (_, b))| (a - b).abs() / a.abs().max(b.abs()).max(1.0))
            .fold(0.0, f64::max)
    }

    /// Averages numeric fields over a block of sub-period states; period and
    /// convergence flag come from the last one.
    pub fn average(block: &[SimulationState]) -> Option<SimulationState> {
        let last = block.last()?;
        let n = block.len() as f64;
        let mean = |f: &dyn Fn(&SimulationState) -> f64| block.iter().map(f).sum::<f64>() / n;

        let sectors = SectorTable::from_fn(|key: SectorKey| {
            let avg = |f: &dyn Fn(&SectorState) -> f64| {
                block.iter().map(|s| f(&s.sectors[key])).sum::<f64>() / n
            };
            SectorState {
                production: avg(&|s| s.production),
                employment: avg(&|s| s.employment),
                capital: avg(&|s| s.capital),
                wage: avg(&|s| s.wage),
                price: avg(&|s| s.price),
                productivity: avg(&|s| s.productivity),
            }
        });

        Some(SimulationState {
            period: last.period,
            converged: last.converged,
            sectors,
            gdp: mean(&|s| s.gdp),
            consumption: mean(&|s| s.consumption),
            investment: mean(&|s| s.investment),
            government: mean(&|s| s.government),
            exports: mean(&|s| s.exports),
            imports: mean(&|s| s.imports),
            total_employment: mean(&|s| s.total_employment),
            unemployment_rate: mean(&|s| s.unemployment_rate),
            inflation: mean(&|s| s.inflation),
            interest_rate: mean(&|s| s.interest_rate),
            anticipations: Anticipations {
                inflation: mean(&|s| s.anticipations.inflation),
                growth: mean(&|s| s.anticipations.growth),
                wages: mean(&|s| s.anticipations.wages),
            },
        })
    }
}

/// One state per reporting period, in order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trajectory {
    states: Vec<SimulationState>,
}

impl Trajectory {
    pub fn new(states: Vec<SimulationState>) -> Self {
        Self { states }
    }

    /// Collapses `sub_periods` consecutive states into one reporting period,
    /// renumbered 1, 2, ...
    pub fn downsample(sub_states: &[SimulationState], sub_periods: usize) -> Self {
        let states = sub_states
            .chunks(sub_periods.max(1))
            .enumerate()
            .filter_map(|(i, block)| {
                let mut state = SimulationState::average(block)?;
                state.period = i + 1;
                Some(state)
            })
            .collect();
        Self { states }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[SimulationState] {
        &self.states
    }

    pub fn iter(&self) -> impl Iterator<Item = &SimulationState> {
        self.states.iter()
    }

    pub fn last(&self) -> Option<&SimulationState> {
        self.states.last()
    }

    pub fn get(&self, index: usize) -> Option<&SimulationState> {
        self.states.get(index)
    }

    /// Periods whose last inner loop hit the iteration cap.
    pub fn non_converged_periods(&self) -> Vec<usize> {
        self.states.iter().filter(|s| !s.converged).map(|s| s.period).collect()
    }
}
