//! Aggregate Equilibrium Solver
//!
//! A small New-Keynesian economy over the ten sectors, solved period by period
//! as a damped fixed point. Levels are measured against the balanced-growth
//! baseline, so an economy hit by a zero shock stays exactly on it.
//!
//! ## Per Sub-Period
//! 1. Labor cost jumps by the sector's shock, then diffuses upward
//! 2. Inflation, growth and wage expectations are revised
//! 3. Labor demand, supply, production, prices and demand are iterated to a
//!    fixed point (capped; the last iterate is kept when the cap is hit)
//! 4. Production deviations pass through the input-output table
//! 5. Capital accumulates and productivity advances
//!
//! The solver runs at quarterly granularity and reports yearly averages.

use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Tuning;
use crate::error::SimulationError;
use crate::propagation::PropagationEngine;
use crate::reference::{ReferenceData, SectorKey, SectorTable};
use crate::shock::{ShockKind, ShockSpecification};
use crate::state::{ratio_or_zero, Anticipations, SectorState, SimulationState, Trajectory};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquilibriumParams {
    pub discount_factor: f64,         // beta
    pub risk_aversion: f64,           // sigma
    pub frisch_elasticity: f64,       // phi
    pub capital_share: f64,           // alpha
    pub depreciation: f64,            // delta, per sub-period
    pub persistence: f64,             // rho, expectation smoothing
    pub calvo: f64,                   // theta, price stickiness
    pub demand_elasticity: f64,       // epsilon, sets the markup
    pub taylor_inflation: f64,
    pub investment_response: f64,
    pub export_price_elasticity: f64,
    pub import_demand_elasticity: f64,
    pub demand_feedback: f64,         // weight of aggregate demand in hiring
    pub participation_response: f64,
    pub propensity_to_consume: f64,   // hand-to-mouth share of consumption
    pub wage_diffusion_speed: f64,    // per sub-period
    pub productivity_trend: f64,      // per sub-period
    pub productivity_noise: f64,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub sub_periods: usize,
    pub propagation: PropagationEngine,
}

impl Default for EquilibriumParams {
    fn default() -> Self {
        Self {
            discount_factor: 0.99,
            risk_aversion: 1.5,
            frisch_elasticity: 1.0,
            capital_share: 0.35,
            depreciation: 0.025,
            persistence: 0.8,
            calvo: 0.75,
            demand_elasticity: 6.0,
            taylor_inflation: 1.5,
            investment_response: 2.0,
            export_price_elasticity: 0.8,
            import_demand_elasticity: 1.2,
            demand_feedback: 0.5,
            participation_response: 0.1,
            propensity_to_consume: 0.85,
            wage_diffusion_speed: 0.25,
            productivity_trend: 0.004,
            productivity_noise: 0.0,
            max_iterations: 50,
            tolerance: 1e-4,
            sub_periods: 4,
            propagation: PropagationEngine {
                iterations: 10,
                decay: 0.7,
                tolerance: 1e-6,
            },
        }
    }
}

impl EquilibriumParams {
    pub fn with_tuning(tuning: &Tuning) -> Self {
        Self {
            risk_aversion: tuning.risk_aversion,
            frisch_elasticity: tuning.labor_supply_elasticity,
            propensity_to_consume: tuning.propensity_to_consume,
            ..Self::default()
        }
    }

    pub fn markup(&self) -> f64 {
        self.demand_elasticity / (self.demand_elasticity - 1.0)
    }

    fn validate(&self) -> Result<(), SimulationError> {
        if self.sub_periods == 0 || self.max_iterations == 0 {
            return Err(SimulationError::invalid(
                "solver needs at least one sub-period and one iteration",
            ));
        }
        if self.risk_aversion <= 0.0 || self.demand_elasticity <= 1.0 {
            return Err(SimulationError::invalid(
                "risk aversion must be positive and demand elasticity above 1",
            ));
        }
        if !(0.0..1.0).contains(&self.calvo) || !(0.0..1.0).contains(&self.persistence) {
            return Err(SimulationError::invalid("calvo and persistence must lie in [0, 1)"));
        }
        Ok(())
    }
}

/// Shock quantities resolved once per run.
struct ShockPath {
    cost_change: SectorTable<f64>,
    mean_cost_change: f64,
    income_pass_through: f64,
    anticipated: bool,
    labor_demand_elasticity: f64,
    price_transmission: f64,
    wage_diffusion: f64,
}

impl ShockPath {
    fn new(shock: &ShockSpecification, reference: &ReferenceData) -> Self {
        Self {
            cost_change: SectorTable::from_fn(|key| shock.sector_cost_change(key, reference)),
            mean_cost_change: shock.mean_cost_change(reference),
            income_pass_through: shock.income_pass_through(&reference.baseline),
            anticipated: shock.anticipated,
            labor_demand_elasticity: shock.parameters.labor_demand_elasticity.abs(),
            price_transmission: shock.parameters.price_transmission,
            wage_diffusion: match shock.kind {
                ShockKind::Wage => shock.parameters.wage_diffusion,
                ShockKind::Hours | ShockKind::Tax => 0.0,
            },
        }
    }
}

/// Values carried between fixed-point iterations.
struct Iterate {
    employment: SectorTable<f64>,
    production: SectorTable<f64>,
    prices: SectorTable<f64>,
    price_level: f64,
    gdp: f64,
    consumption: f64,
    investment: f64,
    exports: f64,
    imports: f64,
    total_employment: f64,
    unemployment_rate: f64,
    inflation: f64,
}

pub struct EquilibriumSolver<'a> {
    reference: &'a ReferenceData,
    params: EquilibriumParams,
    include_anticipations: bool,
    baseline: SimulationState,
    value_added_weights: SectorTable<f64>,
    export_weights: SectorTable<f64>,
    cost_scale: SectorTable<f64>, // normalizes the markup price to 1 at baseline
    neutral_rate: f64,            // policy rate with expectations at target
}

impl<'a> EquilibriumSolver<'a> {
    pub fn new(reference: &'a ReferenceData, params: EquilibriumParams) -> Self {
        let baseline = SimulationState::baseline(reference);
        let value_added_weights = reference.sectors.map(|_, s| s.value_added);
        let export_weights = reference.sectors.map(|_, s| s.value_added * s.export_share);

        let labor_share = 1.0 - params.capital_share;
        let markup = params.markup();
        let cost_scale = baseline.sectors.map(|_, s| {
            let marginal_product = ratio_or_zero(labor_share * s.production, s.employment);
            let marginal_cost = ratio_or_zero(s.wage, marginal_product);
            ratio_or_zero(1.0, markup * marginal_cost)
        });
        let expectation_gap =
            baseline.anticipations.inflation - reference.baseline.inflation_target;
        let neutral_rate = baseline.interest_rate - params.taylor_inflation * expectation_gap;

        Self {
            reference,
            params,
            include_anticipations: true,
            baseline,
            value_added_weights,
            export_weights,
            cost_scale,
            neutral_rate,
        }
    }

    pub fn with_anticipations(mut self, include: bool) -> Self {
        self.include_anticipations = include;
        self
    }

    pub fn params(&self) -> &EquilibriumParams {
        &self.params
    }

    pub fn baseline(&self) -> &SimulationState {
        &self.baseline
    }

    pub fn simulate(
        &self,
        shock: &ShockSpecification,
        periods: usize,
        rng: &mut impl Rng,
    ) -> Result<Trajectory, SimulationError> {
        self.params.validate()?;
        if periods == 0 {
            return Err(SimulationError::invalid("horizon must be at least one period"));
        }

        info!(
            target: "labor_shock::equilibrium",
            kind = %shock.kind,
            magnitude = shock.magnitude,
            periods,
            "starting equilibrium run"
        );

        let path = ShockPath::new(shock, self.reference);
        let steps = periods * self.params.sub_periods;
        let mut sub_states: Vec<SimulationState> = Vec::with_capacity(steps);

        for t in 1..=steps {
            let prev = sub_states.last().unwrap_or(&self.baseline);
            let state = self.step(prev, &path, t, rng)?;
            if !state.converged {
                debug!(
                    target: "labor_shock::equilibrium",
                    sub_period = t,
                    "fixed point hit the iteration cap, keeping last iterate"
                );
            }
            sub_states.push(state);
        }

        let trajectory = Trajectory::downsample(&sub_states, self.params.sub_periods);
        if let Some(last) = trajectory.last() {
            info!(
                target: "labor_shock::equilibrium",
                employment = last.total_employment,
                inflation = last.inflation,
                "equilibrium run finished"
            );
        }
        Ok(trajectory)
    }

    fn step(
        &self,
        prev: &SimulationState,
        path: &ShockPath,
        t: usize,
        rng: &mut impl Rng,
    ) -> Result<SimulationState, SimulationError> {
        let p = &self.params;
        let base = &self.baseline;
        let sub = p.sub_periods as f64;
        let period = (t - 1) / p.sub_periods + 1;

        // 1. labor cost
        let wages = SectorTable::from_fn(|key| {
            let w0 = base.sectors[key].wage;
            let c = path.cost_change[key];
            let floor = w0 * (1.0 + c);
            let target = w0 * (1.0 + c * (1.0 + path.wage_diffusion));
            let wage = if t == 1 {
                floor
            } else {
                let w = prev.sectors[key].wage;
                w + p.wage_diffusion_speed * (target - w)
            };
            wage.max(0.0)
        });

        // 2. expectations
        let output_gap = ratio_or_zero(prev.gdp - base.gdp, base.gdp);
        let anticipations = if self.include_anticipations {
            let rational = if path.anticipated {
                path.mean_cost_change * path.price_transmission * (-0.1 * t as f64 / sub).exp()
            } else {
                0.0
            };
            let wage_gap = ratio_or_zero(
                SectorKey::ALL.iter().map(|&k| wages[k] * base.sectors[k].employment).sum::<f64>(),
                base.wage_bill(),
            ) - 1.0;
            let rho = p.persistence;
            Anticipations {
                inflation: rho * prev.anticipations.inflation
                    + (1.0 - rho) * (prev.inflation + 0.5 * output_gap + rational),
                growth: rho * prev.anticipations.growth
                    + (1.0 - rho) * (base.anticipations.growth + output_gap),
                wages: rho * prev.anticipations.wages
                    + (1.0 - rho) * (base.anticipations.wages + wage_gap),
            }
        } else {
            base.anticipations
        };

        let target = self.reference.baseline.inflation_target;
        let interest_rate =
            self.neutral_rate + p.taylor_inflation * (anticipations.inflation - target);
        let real_rate_gap = (interest_rate - anticipations.inflation)
            - (base.interest_rate - base.anticipations.inflation);

        // 3. fixed point
        let prev_price_level = prev.price_level(&self.value_added_weights);
        let mut it = Iterate {
            employment: prev.sectors.map(|_, s| s.employment),
            production: prev.sectors.map(|_, s| s.production),
            prices: prev.sectors.map(|_, s| s.price),
            price_level: prev_price_level,
            gdp: prev.gdp,
            consumption: prev.consumption,
            investment: prev.investment,
            exports: prev.exports,
            imports: prev.imports,
            total_employment: prev.total_employment,
            unemployment_rate: prev.unemployment_rate,
            inflation: prev.inflation,
        };

        let mut converged = false;
        for _ in 0..p.max_iterations {
            let next = self.solve_once(
                prev,
                path,
                &wages,
                &it,
                real_rate_gap,
                &anticipations,
                prev_price_level,
            );
            let gap = [
                ratio_or_zero((next.gdp - it.gdp).abs(), base.gdp),
                ratio_or_zero(
                    (next.total_employment - it.total_employment).abs(),
                    base.total_employment,
                ),
                (next.price_level - it.price_level).abs(),
            ]
            .into_iter()
            .fold(0.0, f64::max);
            it = next;
            if gap < p.tolerance {
                converged = true;
                break;
            }
        }

        // 4. input-output passes on production deviations
        let direct = it.production.map(|key, &y| y - base.sectors[key].production);
        let propagated = p.propagation.propagate(&direct, &self.reference.io).totals();

        // 5. accumulation
        let investment_ratio = ratio_or_zero(it.investment, base.investment);
        let growth = 1.0 + p.productivity_trend;
        let sectors = SectorTable::from_fn(|key| {
            let b = &base.sectors[key];
            let s = &prev.sectors[key];
            let noise = if p.productivity_noise > 0.0 {
                let z: f64 = StandardNormal.sample(rng);
                p.productivity_noise * z
            } else {
                0.0
            };
            SectorState {
                production: (b.production + propagated[key]).max(0.0),
                employment: it.employment[key],
                capital: ((1.0 - p.depreciation) * s.capital
                    + p.depreciation * b.capital * investment_ratio)
                    .max(0.0),
                wage: wages[key],
                price: it.prices[key],
                productivity: (s.productivity * (growth + noise) / growth).max(0.0),
            }
        });

        let state = SimulationState {
            period,
            converged,
            sectors,
            gdp: it.gdp,
            consumption: it.consumption,
            investment: it.investment,
            government: base.government,
            exports: it.exports,
            imports: it.imports,
            total_employment: it.total_employment,
            unemployment_rate: it.unemployment_rate,
            inflation: it.inflation,
            interest_rate,
            anticipations,
        };
        state.ensure_finite()?;
        Ok(state)
    }

    #[allow(clippy::too_many_arguments)]
    fn solve_once(
        &self,
        prev: &SimulationState,
        path: &ShockPath,
        wages: &SectorTable<f64>,
        it: &Iterate,
        real_rate_gap: f64,
        anticipations: &Anticipations,
        prev_price_level: f64,
    ) -> Iterate {
        let p = &self.params;
        let base = &self.baseline;
        let sub = p.sub_periods as f64;
        let labor_share = 1.0 - p.capital_share;
        let demand_ratio = ratio_or_zero(it.gdp, base.gdp);

        // labor demand
        let mut employment = SectorTable::from_fn(|key| {
            let b = &base.sectors[key];
            let real_cost = ratio_or_zero(ratio_or_zero(wages[key], it.prices[key]), b.wage);
            let deviation = if b.wage > 0.0 { real_cost - 1.0 } else { 0.0 };
            let sensitivity = self.reference.sectors[key].cost_sensitivity;
            let l = b.employment
                * (1.0 - path.labor_demand_elasticity * sensitivity * deviation)
                * (1.0 + p.demand_feedback * (demand_ratio - 1.0));
            l.max(0.0)
        });

        // labor supply
        let wage_index = ratio_or_zero(
            SectorKey::ALL.iter().map(|&k| wages[k] * base.sectors[k].employment).sum::<f64>(),
            base.wage_bill(),
        );
        let real_wage_index = ratio_or_zero(wage_index, it.price_level);
        let labor_force = self.reference.labor_force()
            * (1.0 + p.participation_response * p.frisch_elasticity * (real_wage_index - 1.0));
        let mut total_employment = employment.sum();
        if total_employment > labor_force {
            let scale = ratio_or_zero(labor_force, total_employment);
            employment = employment.map(|_, &l| l * scale);
            total_employment = employment.sum();
        }
        let unemployment_rate =
            (1.0 - ratio_or_zero(total_employment, labor_force)).clamp(0.0, 1.0);

        // production
        let production = SectorTable::from_fn(|key| {
            let b = &base.sectors[key];
            let s = &prev.sectors[key];
            let capital = if b.capital > 0.0 { s.capital / b.capital } else { 1.0 };
            let labor = if b.employment > 0.0 { employment[key] / b.employment } else { 1.0 };
            b.production * s.productivity * capital.powf(p.capital_share) * labor.powf(labor_share)
        });

        // prices
        let markup = p.markup();
        let prices = SectorTable::from_fn(|key| {
            let marginal_product = ratio_or_zero(labor_share * production[key], employment[key]);
            let optimal = if marginal_product > 0.0 {
                markup * (wages[key] / marginal_product) * self.cost_scale[key]
            } else {
                1.0
            };
            let target = 1.0 + path.price_transmission * (optimal - 1.0);
            p.calvo * prev.sectors[key].price + (1.0 - p.calvo) * target
        });
        let weighted: f64 = SectorKey::ALL
            .iter()
            .map(|&k| prices[k] * self.value_added_weights[k])
            .sum();
        let price_level = ratio_or_zero(weighted, self.value_added_weights.sum());
        let inflation = base.inflation + (ratio_or_zero(price_level, prev_price_level) - 1.0) * sub;

        // aggregate demand
        let income: f64 = SectorKey::ALL
            .iter()
            .map(|&k| {
                let w0 = base.sectors[k].wage;
                (w0 + path.income_pass_through * (wages[k] - w0)) * employment[k]
            })
            .sum();
        let real_income_ratio = ratio_or_zero(ratio_or_zero(income, base.wage_bill()), price_level);

        let euler =
            prev.consumption * (1.0 - p.discount_factor / p.risk_aversion * real_rate_gap / sub);
        let consumption = (1.0 - p.propensity_to_consume) * euler
            + p.propensity_to_consume * base.consumption * real_income_ratio;

        let expected_growth_gap = anticipations.growth - base.anticipations.growth;
        let investment = (base.investment
            * (1.0 + p.investment_response * (expected_growth_gap - real_rate_gap)))
            .max(0.0);

        let export_weighted: f64 = SectorKey::ALL
            .iter()
            .map(|&k| prices[k] * self.export_weights[k])
            .sum();
        let export_price = ratio_or_zero(export_weighted, self.export_weights.sum());
        let exports = if export_price > 0.0 {
            base.exports * export_price.powf(-p.export_price_elasticity)
        } else {
            base.exports
        };

        let domestic_ratio =
            ratio_or_zero(consumption + investment, base.consumption + base.investment);
        let imports =
            (base.imports * (1.0 + p.import_demand_elasticity * (domestic_ratio - 1.0))).max(0.0);

        let gdp = consumption + investment + base.government + exports - imports;

        Iterate {
            employment,
            production,
            prices,
            price_level,
            gdp,
            consumption,
            investment,
            exports,
            imports,
            total_employment,
            unemployment_rate,
            inflation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shock::TargetGroup;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn run(shock: &ShockSpecification, periods: usize) -> Trajectory {
        let data = ReferenceData::default();
        let solver = EquilibriumSolver::new(&data, EquilibriumParams::default());
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        solver.simulate(shock, periods, &mut rng).expect("solver run")
    }

    #[test]
    fn test_one_state_per_period() {
        let shock = ShockSpecification::new(ShockKind::Wage, 0.1);
        let trajectory = run(&shock, 4);

        assert_eq!(trajectory.len(), 4);
        let periods: Vec<usize> = trajectory.iter().map(|s| s.period).collect();
        assert_eq!(periods, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_zero_shock_stays_on_baseline() {
        let data = ReferenceData::default();
        let baseline = SimulationState::baseline(&data);
        let trajectory = run(&ShockSpecification::new(ShockKind::Wage, 0.0), 3);

        for state in trajectory.iter() {
            assert!(state.converged);
            assert!(state.max_relative_deviation(&baseline) < 1e-9, "period {}", state.period);
        }
    }

    #[test]
    fn test_wage_shock_cuts_employment_and_raises_prices() {
        let data = ReferenceData::default();
        let baseline = SimulationState::baseline(&data);
        let trajectory = run(&ShockSpecification::new(ShockKind::Wage, 0.2), 3);
        let last = trajectory.last().expect("non-empty");

        assert!(last.converged);
        assert!(last.total_employment < baseline.total_employment);
        assert!(last.sectors[SectorKey::Hospitality].price > 1.0);
        // hospitality carries the largest minimum-wage share
        let relative =
            |key: SectorKey| last.sectors[key].employment / baseline.sectors[key].employment;
        let hosp = relative(SectorKey::Hospitality);
        let fin = relative(SectorKey::Finance);
        assert!(hosp < fin);
    }

    #[test]
    fn test_larger_shock_larger_loss() {
        let small = run(&ShockSpecification::new(ShockKind::Wage, 0.1), 3);
        let large = run(&ShockSpecification::new(ShockKind::Wage, 0.26), 3);

        let small_emp = small.last().map(|s| s.total_employment).unwrap_or_default();
        let large_emp = large.last().map(|s| s.total_employment).unwrap_or_default();
        assert!(large_emp < small_emp);
    }

    #[test]
    fn test_payroll_tax_does_not_raise_income() {
        let data = ReferenceData::default();
        let baseline = SimulationState::baseline(&data);
        let mut shock = ShockSpecification::payroll_tax(0.05);
        shock.target_group = TargetGroup::All;
        let last = run(&shock, 2).last().cloned().expect("non-empty");

        assert!(last.consumption < baseline.consumption);
        assert!(last.total_employment < baseline.total_employment);
    }

    #[test]
    fn test_non_negative_under_extreme_cut() {
        let shock = ShockSpecification {
            affected_share: 1.0,
            target_group: TargetGroup::All,
            ..ShockSpecification::new(ShockKind::Wage, 3.0)
        };
        for state in run(&shock, 3).iter() {
            for (_, s) in state.sectors.iter() {
                assert!(s.employment >= 0.0);
                assert!(s.production >= 0.0);
            }
        }
    }

    #[test]
    fn test_nan_reference_diverges() {
        let mut data = ReferenceData::default();
        data.sectors[SectorKey::Retail].value_added = f64::NAN;
        let solver = EquilibriumSolver::new(&data, EquilibriumParams::default());
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let err = solver
            .simulate(&ShockSpecification::new(ShockKind::Wage, 0.1), 2, &mut rng)
            .unwrap_err();
        assert!(matches!(err, SimulationError::SimulationDivergence { period: 1, .. }));
    }

    #[test]
    fn test_zero_employment_sector_stays_finite() {
        let mut data = ReferenceData::default();
        data.sectors[SectorKey::Agriculture].employment = 0.0;
        let solver = EquilibriumSolver::new(&data, EquilibriumParams::default());
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let trajectory = solver
            .simulate(&ShockSpecification::new(ShockKind::Wage, 0.15), 2, &mut rng)
            .expect("finite run");
        let agriculture = trajectory.last().map(|s| s.sectors[SectorKey::Agriculture].employment);
        assert_eq!(agriculture, Some(0.0));
    }

    #[test]
    fn test_iteration_cap_keeps_running_and_flags_periods() {
        let data = ReferenceData::default();
        let params = EquilibriumParams {
            max_iterations: 1,
            ..EquilibriumParams::default()
        };
        let solver = EquilibriumSolver::new(&data, params);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let trajectory = solver
            .simulate(&ShockSpecification::new(ShockKind::Wage, 0.2), 3, &mut rng)
            .expect("capped run still returns a trajectory");
        assert_eq!(trajectory.len(), 3);
        assert_eq!(trajectory.non_converged_periods(), vec![1, 2, 3]);
    }

    #[test]
    fn test_taylor_rule_reacts_to_expectations_above_target() {
        let data = ReferenceData::default();
        let solver = EquilibriumSolver::new(&data, EquilibriumParams::default());
        let baseline = solver.baseline().clone();

        // baseline expectations sit above target, so the neutral rate sits below the baseline rate
        assert!(baseline.anticipations.inflation > data.baseline.inflation_target);
        assert!(solver.neutral_rate < baseline.interest_rate);

        let trajectory = run(&ShockSpecification::new(ShockKind::Wage, 0.2), 2);
        let last = trajectory.last().expect("non-empty");
        let rate_gap = last.interest_rate - baseline.interest_rate;
        let expectation_gap = last.anticipations.inflation - baseline.anticipations.inflation;
        assert!(expectation_gap.abs() > 0.0);
        assert!((rate_gap - 1.5 * expectation_gap).abs() < 1e-12);
    }

    #[test]
    fn test_productivity_noise_is_seeded() {
        let data = ReferenceData::default();
        let params = EquilibriumParams {
            productivity_noise: 0.002,
            ..EquilibriumParams::default()
        };
        let solver = EquilibriumSolver::new(&data, params);
        let shock = ShockSpecification::new(ShockKind::Wage, 0.1);

        let a = solver.simulate(&shock, 2, &mut ChaCha8Rng::seed_from_u64(9)).expect("run");
        let b = solver.simulate(&shock, 2, &mut ChaCha8Rng::seed_from_u64(9)).expect("run");
        assert_eq!(a, b);
    }
}
