//! Simulation Entry Point
//!
//! Runs the configured solver and turns its trajectory into a
//! `SimulationResult`: headline impacts, public finances, margins, trade, the
//! sector breakdown and the transforms (propagation, substitution, threshold,
//! feedback).
//!
//! ## Modes
//! - Aggregate: equilibrium solver only
//! - Agent: agent population only, with distributional detail
//! - Hybrid: both; the equilibrium trajectory carries the headline numbers and
//!   the agent run is reported alongside as a diagnostic

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use crate::config::{Mode, SimulationConfig};
use crate::equilibrium::{EquilibriumParams, EquilibriumSolver};
use crate::error::SimulationError;
use crate::feedback::FeedbackLoop;
use crate::hybrid::HybridRun;
use crate::population::{AgentParams, AgentSimulator, DistributionSummary};
use crate::propagation::{PropagationEngine, PropagationOutcome};
use crate::reference::{ReferenceData, SectorKey, SectorTable};
use crate::result::{
    Diagnostics, EmploymentChange, EmploymentImpact, FirmCostBreakdown, FiscalBalance, GdpImpact,
    HybridDiagnostics, InflationImpact, MarginImpact, PeriodValue, PurchasingPowerImpact, Range,
    SectorBreakdown, SimulationResult, TradeImpact, WorkingTimeImpact,
};
use crate::shock::{ShockKind, ShockSpecification, TargetGroup};
use crate::state::{ratio_or_zero, SimulationState, Trajectory};
use crate::substitution::{self, CapitalLaborShift};
use crate::threshold::ThresholdSet;

/// Share of the first-round cost shock that shows up as lost production.
const DIRECT_PRODUCTION_PASS: f64 = 0.6;
/// Spill-over of a low-wage raise to middle incomes, relative to the diffusion rate.
const MIDDLE_INCOME_SPILLOVER: f64 = 0.3;
const BASE_UNCERTAINTY: f64 = 0.3;
const UNCERTAINTY_PER_BAND: f64 = 0.15;
const INFLATION_RANGE: (f64, f64) = (0.6, 1.4);
const FISCAL_RANGE: (f64, f64) = (0.5, 1.5);
const WEEKS_PER_YEAR: f64 = 52.0;
const HOURS_PER_DAY: f64 = 7.0;

/// What a solver run leaves behind for result assembly.
struct Outcome {
    baseline: SimulationState,
    trajectory: Trajectory,
    distribution: Option<DistributionSummary>,
    hybrid: Option<HybridDiagnostics>,
}

pub fn simulate(
    config: &SimulationConfig,
    reference: &ReferenceData,
) -> Result<SimulationResult, SimulationError> {
    config.validate()?;
    let shock = config.shock();
    info!(
        target: "labor_shock::engine",
        mode = config.mode.name(),
        kind = %shock.kind,
        magnitude = shock.magnitude,
        horizon = config.horizon,
        "simulation requested"
    );

    let outcome = run_mode(config, &shock, reference)?;
    let result = assemble(config, &shock, reference, outcome)?;

    info!(
        target: "labor_shock::engine",
        employment = result.employment.absolute,
        inflation = result.inflation.incremental,
        "simulation finished"
    );
    Ok(result)
}

fn run_mode(
    config: &SimulationConfig,
    shock: &ShockSpecification,
    reference: &ReferenceData,
) -> Result<Outcome, SimulationError> {
    let solver = EquilibriumSolver::new(reference, EquilibriumParams::with_tuning(&config.tuning))
        .with_anticipations(config.include_anticipations);
    let simulator = AgentSimulator::new(
        reference,
        AgentParams {
            propensity_to_consume: config.tuning.propensity_to_consume,
            ..AgentParams::new(config.households, config.firms)
        },
    )
    .with_anticipations(config.include_anticipations);

    match config.mode {
        Mode::Aggregate => {
            let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
            let trajectory = solver.simulate(shock, config.horizon, &mut rng)?;
            Ok(Outcome {
                baseline: solver.baseline().clone(),
                trajectory,
                distribution: None,
                hybrid: None,
            })
        }
        Mode::Agent => {
            let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
            let run = simulator.run(shock, config.horizon, &mut rng)?;
            Ok(Outcome {
                distribution: Some(run.population.distribution()),
                baseline: run.baseline,
                trajectory: run.trajectory,
                hybrid: None,
            })
        }
        Mode::Hybrid => {
            let run = HybridRun::run(&solver, &simulator, shock, config.horizon, config.seed)?;
            Ok(Outcome {
                baseline: solver.baseline().clone(),
                trajectory: run.macro_trajectory.clone(),
                distribution: Some(run.micro.population.distribution()),
                hybrid: Some(HybridDiagnostics {
                    macro_trajectory: run.macro_trajectory,
                    micro_trajectory: run.micro.trajectory,
                    emergent_effects: run.emergent_effects,
                    aggregation_bias: run.aggregation_bias,
                }),
            })
        }
    }
}

fn assemble(
    config: &SimulationConfig,
    shock: &ShockSpecification,
    reference: &ReferenceData,
    outcome: Outcome,
) -> Result<SimulationResult, SimulationError> {
    let Outcome {
        baseline,
        trajectory,
        distribution,
        hybrid,
    } = outcome;
    let last = trajectory
        .last()
        .ok_or_else(|| SimulationError::invalid("solver returned an empty trajectory"))?;
    let b = &reference.baseline;
    let cost_change = shock.labor_cost_change(b);

    let thresholds = ThresholdSet::default();
    let (amplification, active_bands) = if config.include_thresholds {
        (thresholds.amplification(cost_change), thresholds.active_bands(cost_change))
    } else {
        (1.0, 0)
    };

    let work_sharing = shock.work_sharing_jobs(reference);
    let employment = employment_impact(
        &baseline,
        &trajectory,
        last,
        amplification,
        active_bands,
        work_sharing,
    );
    let inflation = inflation_impact(&baseline, &trajectory, last, amplification);
    let purchasing_power = purchasing_power(shock, reference, inflation.incremental);
    let gdp = gdp_impact(&baseline, last);
    let fiscal = fiscal_balance(&baseline, last, employment.absolute, reference);
    let margins = margin_impact(shock, reference);
    let working_time = (shock.kind == ShockKind::Hours)
        .then(|| working_time(shock, reference, work_sharing));
    let trade = TradeImpact {
        exports_change: last.exports - baseline.exports,
        imports_change: last.imports - baseline.imports,
        balance_change: (last.exports - last.imports) - (baseline.exports - baseline.imports),
    };

    let propagation = production_effects(shock, reference);
    let sectors = config
        .include_sectoral_effects
        .then(|| sector_breakdown(shock, reference, &baseline, last, &propagation, amplification));
    let substitution = (shock.target_group == TargetGroup::LowWage)
        .then(|| substitution::aggregate(shock, reference));

    let feedback = FeedbackLoop::from_reference(reference, config.tuning.propensity_to_consume)
        .trajectory(employment.absolute, config.horizon);

    let notes = reference.data_quality_notes();
    for note in &notes {
        warn!(target: "labor_shock::engine", "{note}");
    }
    let diagnostics = Diagnostics {
        non_converged_periods: trajectory.non_converged_periods(),
        propagation_converged: propagation.converged,
        propagation_iterations: propagation.iterations,
        data_quality_notes: notes,
    };

    Ok(SimulationResult {
        mode: config.mode,
        shock_kind: shock.kind,
        magnitude: shock.magnitude,
        horizon: config.horizon,
        amplification,
        anticipations: config.include_anticipations.then_some(last.anticipations),
        employment,
        purchasing_power,
        inflation,
        gdp,
        fiscal,
        margins,
        trade,
        working_time,
        sectors,
        substitution,
        feedback,
        hybrid,
        distribution,
        diagnostics,
    })
}

fn employment_impact(
    baseline: &SimulationState,
    trajectory: &Trajectory,
    last: &SimulationState,
    amplification: f64,
    active_bands: usize,
    work_sharing: f64,
) -> EmploymentImpact {
    let absolute =
        (last.total_employment - baseline.total_employment) * amplification + work_sharing;
    let relative_uncertainty = BASE_UNCERTAINTY + UNCERTAINTY_PER_BAND * active_bands as f64;
    let uncertainty = relative_uncertainty * absolute.abs();

    EmploymentImpact {
        absolute,
        percent: ratio_or_zero(absolute, baseline.total_employment) * 100.0,
        range: Range {
            low: absolute - uncertainty,
            high: absolute + uncertainty,
        },
        trajectory: trajectory
            .iter()
            .map(|s| PeriodValue {
                period: s.period,
                value: baseline.total_employment
                    + (s.total_employment - baseline.total_employment) * amplification
                    + work_sharing,
            })
            .collect(),
        work_sharing,
    }
}

fn inflation_impact(
    baseline: &SimulationState,
    trajectory: &Trajectory,
    last: &SimulationState,
    amplification: f64,
) -> InflationImpact {
    let incremental = (last.inflation - baseline.inflation) * amplification * 100.0;
    InflationImpact {
        incremental,
        total: baseline.inflation * 100.0 + incremental,
        range: Range::scaled(incremental, INFLATION_RANGE.0, INFLATION_RANGE.1),
        trajectory: trajectory
            .iter()
            .map(|s| {
                let amplified = (s.inflation - baseline.inflation) * amplification;
                PeriodValue {
                    period: s.period,
                    value: (baseline.inflation + amplified) * 100.0,
                }
            })
            .collect(),
    }
}

/// Real income gains in percent, net of the incremental inflation.
fn purchasing_power(
    shock: &ShockSpecification,
    reference: &ReferenceData,
    incremental_inflation: f64,
) -> PurchasingPowerImpact {
    let b = &reference.baseline;
    let reach = match shock.target_group {
        TargetGroup::LowWage => shock.low_wage_intensity(reference),
        TargetGroup::All => shock.affected_share,
    };
    let nominal = shock.labor_cost_change(b) * shock.income_pass_through(b) * reach * 100.0;

    let spillover = shock.parameters.wage_diffusion * nominal * MIDDLE_INCOME_SPILLOVER;

    PurchasingPowerImpact {
        low_income: nominal - incremental_inflation,
        middle_income: spillover - incremental_inflation,
        high_income: -incremental_inflation,
        monthly_net_gain_at_minimum: (shock.kind == ShockKind::Wage)
            .then(|| b.minimum_wage_monthly_net * shock.magnitude),
    }
}

fn gdp_impact(baseline: &SimulationState, last: &SimulationState) -> GdpImpact {
    let change = last.gdp - baseline.gdp;
    GdpImpact {
        change,
        percent: ratio_or_zero(change, baseline.gdp) * 100.0,
        consumption_change: last.consumption - baseline.consumption,
        investment_change: last.investment - baseline.investment,
        government_change: last.government - baseline.government,
        net_exports_change: (last.exports - last.imports) - (baseline.exports - baseline.imports),
    }
}

fn fiscal_balance(
    baseline: &SimulationState,
    last: &SimulationState,
    employment_change: f64,
    reference: &ReferenceData,
) -> FiscalBalance {
    let b = &reference.baseline;
    let contribution_rate = b.employer_contribution_rate + b.employee_contribution_rate;
    let contribution_revenue = (last.wage_bill() - baseline.wage_bill()) * contribution_rate;
    let consumption_tax_revenue =
        (last.consumption - baseline.consumption) * b.consumption_tax_rate;
    let job_losses = -employment_change;
    let benefit_outlay =
        job_losses * b.median_wage * 12.0 * b.benefit_replacement_rate * b.benefit_coverage;
    let net = contribution_revenue + consumption_tax_revenue - benefit_outlay;

    FiscalBalance {
        contribution_revenue,
        consumption_tax_revenue,
        benefit_outlay,
        net,
        range: Range::scaled(net, FISCAL_RANGE.0, FISCAL_RANGE.1),
    }
}

fn margin_impact(shock: &ShockSpecification, reference: &ReferenceData) -> MarginImpact {
    let labor_cost: f64 = reference
        .sectors
        .iter()
        .map(|(key, s)| s.wage_bill * shock.sector_cost_change(key, reference))
        .sum();
    let unpassed = labor_cost * (1.0 - shock.parameters.price_transmission);
    let change = -ratio_or_zero(unpassed, reference.total_value_added()) * 100.0;

    MarginImpact {
        unpassed_labor_cost: unpassed,
        margin_change_points: change,
        new_margin_rate: reference.baseline.margin_rate + change / 100.0,
    }
}

/// Freed time per worker and the firms' cost of an hours cut.
fn working_time(
    shock: &ShockSpecification,
    reference: &ReferenceData,
    work_sharing: f64,
) -> WorkingTimeImpact {
    let b = &reference.baseline;
    let p = &shock.parameters;
    let weekly_hours = b.weekly_hours * (1.0 - shock.magnitude);
    let freed_hours = (b.weekly_hours - weekly_hours) * WEEKS_PER_YEAR;
    let employer = 1.0 + b.employer_contribution_rate;

    // pay for hours no longer worked, net of the pay given up
    let paid_share = p.pay_maintained - 1.0 + shock.magnitude * p.pay_maintained;
    let labor_cost = b.payroll * shock.affected_share * paid_share * employer;
    let hiring_cost = work_sharing * b.median_wage * 12.0 * employer;
    let productivity_offset = b.payroll * shock.affected_share * p.productivity_gain;

    WorkingTimeImpact {
        weekly_hours,
        monthly_hours: weekly_hours * WEEKS_PER_YEAR / 12.0,
        freed_hours_per_year: freed_hours,
        freed_days_per_year: freed_hours / HOURS_PER_DAY,
        firm_costs: FirmCostBreakdown {
            hourly_cost_change: shock.labor_cost_change(b) * 100.0,
            labor_cost,
            hiring_cost,
            productivity_offset,
            net: labor_cost + hiring_cost - productivity_offset,
        },
    }
}

/// First-round production losses per sector, spread through the input-output table.
fn production_effects(shock: &ShockSpecification, reference: &ReferenceData) -> PropagationOutcome {
    let direct = SectorTable::from_fn(|key| {
        let s = reference.sector(key);
        let cost_change = shock.sector_cost_change(key, reference);
        -s.value_added * cost_change * s.wage_share * s.cost_sensitivity * DIRECT_PRODUCTION_PASS
    });
    PropagationEngine::default().propagate(&direct, &reference.io)
}

fn sector_breakdown(
    shock: &ShockSpecification,
    reference: &ReferenceData,
    baseline: &SimulationState,
    last: &SimulationState,
    propagation: &PropagationOutcome,
    amplification: f64,
) -> Vec<SectorBreakdown> {
    SectorKey::all()
        .into_iter()
        .map(|key| {
            let sector = reference.sector(key);
            let before = &baseline.sectors[key];
            let after = &last.sectors[key];
            let change = (after.employment - before.employment) * amplification;

            let c = shock.sector_cost_change(key, reference);

            SectorBreakdown {
                sector: key,
                name: key.name().to_string(),
                employment: EmploymentChange {
                    initial: before.employment,
                    change,
                    final_level: before.employment + change,
                },
                production: propagation.effects[key],
                price_change: if before.price > 0.0 {
                    after.price / before.price - 1.0
                } else {
                    0.0
                },
                wage_bill_change: after.wage * after.employment - before.wage * before.employment,
                capital_labor: CapitalLaborShift::new(
                    sector.capital_labor_elasticity,
                    c,
                    sector.employment,
                    sector.capital(),
                ),
                categories: substitution::sector_effects(shock, key, reference),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;

    fn config(kind: ShockKind, magnitude: f64, mode: Mode) -> SimulationConfig {
        SimulationConfig {
            households: 1_000,
            firms: 100,
            ..SimulationConfig::with_shock(kind, magnitude, mode)
        }
    }

    #[test]
    fn test_aggregate_wage_shock_loses_jobs() {
        let data = ReferenceData::default();
        let raise = config(ShockKind::Wage, 0.26, Mode::Aggregate);
        let result = simulate(&raise, &data).expect("simulate");

        assert!(result.employment.absolute < 0.0);
        assert!(result.employment.range.low < result.employment.absolute);
        let hospitality = result
            .sectors
            .as_ref()
            .and_then(|s| s.iter().find(|b| b.sector == SectorKey::Hospitality))
            .expect("hospitality breakdown");
        assert!(hospitality.price_change > 0.0);
        assert!(hospitality.employment.change < 0.0);
        assert_eq!(result.feedback.len(), 3);
        assert!(result.hybrid.is_none());
        assert!(result.distribution.is_none());
        assert!(result.diagnostics.non_converged_periods.is_empty());
        assert_eq!(result.sectors.as_ref().map(Vec::len), Some(10));
        assert!(result.substitution.is_some());
    }

    #[test]
    fn test_zero_shock_reports_nothing() {
        let data = ReferenceData::default();
        let zero = config(ShockKind::Wage, 0.0, Mode::Aggregate);
        let result = simulate(&zero, &data).expect("simulate");

        assert!(result.employment.absolute.abs() < 1e-3);
        assert!(result.inflation.incremental.abs() < 1e-9);
        assert!(result.fiscal.net.abs() < 1.0);
        assert_eq!(result.margins.unpassed_labor_cost, 0.0);
        assert_eq!(result.amplification, 1.0);
    }

    #[test]
    fn test_thresholds_can_be_disabled() {
        let data = ReferenceData::default();
        let mut cfg = config(ShockKind::Wage, 0.3, Mode::Aggregate);
        let amplified = simulate(&cfg, &data).expect("simulate");
        cfg.include_thresholds = false;
        let plain = simulate(&cfg, &data).expect("simulate");

        assert_eq!(plain.amplification, 1.0);
        assert!(amplified.amplification > 1.0);
        assert!(amplified.employment.absolute < plain.employment.absolute);
    }

    #[test]
    fn test_hours_reduction_has_no_income_gain() {
        let data = ReferenceData::default();
        let mut cfg = config(ShockKind::Hours, 0.0, Mode::Aggregate);
        let shock = ShockSpecification::hours_reduction(35.0, 32.0);
        cfg.magnitude = shock.magnitude;
        cfg.affected_share = shock.affected_share;
        cfg.target_group = shock.target_group;

        let result = simulate(&cfg, &data).expect("simulate");
        assert!(result.purchasing_power.monthly_net_gain_at_minimum.is_none());
        assert_eq!(result.purchasing_power.low_income, result.purchasing_power.high_income);
        assert!(result.substitution.is_none());
        assert_eq!(result.employment.work_sharing, 0.0);
    }

    fn hours_config(to_hours: f64, tuning: Tuning) -> SimulationConfig {
        let shock = ShockSpecification::hours_reduction(35.0, to_hours);
        SimulationConfig {
            magnitude: shock.magnitude,
            affected_share: shock.affected_share,
            target_group: shock.target_group,
            tuning,
            ..config(ShockKind::Hours, 0.0, Mode::Aggregate)
        }
    }

    #[test]
    fn test_working_time_reports_freed_time() {
        let data = ReferenceData::default();
        let result = simulate(&hours_config(32.0, Tuning::default()), &data).expect("simulate");
        let time = result.working_time.expect("hours cuts report working time");

        assert!((time.weekly_hours - 32.0).abs() < 1e-9);
        assert!((time.freed_hours_per_year - 156.0).abs() < 1e-9);
        assert!((time.freed_days_per_year - 156.0 / 7.0).abs() < 1e-9);
        assert!((time.monthly_hours - 32.0 * 52.0 / 12.0).abs() < 1e-9);
        assert!((time.firm_costs.hourly_cost_change - 300.0 / 32.0).abs() < 1e-9);
        // full pay on fewer hours: only the lost hours are a cost
        let expected = data.baseline.payroll * (3.0 / 35.0) * 1.42;
        assert!((time.firm_costs.labor_cost - expected).abs() < 1e-3 * expected);
        assert_eq!(time.firm_costs.hiring_cost, 0.0);

        let wage_config = config(ShockKind::Wage, 0.1, Mode::Aggregate);
        let wage = simulate(&wage_config, &data).expect("simulate");
        assert!(wage.working_time.is_none());
    }

    #[test]
    fn test_compensatory_hiring_adds_jobs() {
        let data = ReferenceData::default();
        let plain = simulate(&hours_config(32.0, Tuning::default()), &data).expect("simulate");
        let hiring = Tuning {
            compensatory_hiring: 0.08,
            ..Tuning::default()
        };
        let shared = simulate(&hours_config(32.0, hiring), &data).expect("simulate");

        let jobs = data.sector_employment() * (3.0 / 35.0) * 0.08;
        assert!((shared.employment.work_sharing - jobs).abs() < 1e-6 * jobs);
        let added = shared.employment.absolute - plain.employment.absolute;
        assert!((added - jobs).abs() < 1e-6 * jobs);
        let last = shared.employment.trajectory.last().map(|p| p.value).unwrap_or_default();
        let plain_last = plain.employment.trajectory.last().map(|p| p.value).unwrap_or_default();
        assert!((last - plain_last - jobs).abs() < 1e-6 * jobs);

        let costs = shared.working_time.expect("working time").firm_costs;
        assert!(costs.hiring_cost > 0.0);
        assert!((costs.net - (costs.labor_cost + costs.hiring_cost)).abs() < 1e-6 * costs.net);
    }

    #[test]
    fn test_productivity_gain_softens_job_losses() {
        let data = ReferenceData::default();
        let plain = simulate(&hours_config(32.0, Tuning::default()), &data).expect("simulate");
        let productive = Tuning {
            productivity_gain: 0.03,
            ..Tuning::default()
        };
        let offset = simulate(&hours_config(32.0, productive), &data).expect("simulate");

        assert!(plain.employment.absolute < 0.0);
        assert!(offset.employment.absolute > plain.employment.absolute);
        let costs = offset.working_time.expect("working time").firm_costs;
        assert!((costs.productivity_offset - data.baseline.payroll * 0.03).abs() < 1.0);
        assert!(costs.net < costs.labor_cost);
    }

    #[test]
    fn test_partial_pay_lowers_purchasing_power() {
        let data = ReferenceData::default();
        let partial = Tuning {
            pay_maintained: 0.9,
            ..Tuning::default()
        };
        let result = simulate(&hours_config(32.0, partial), &data).expect("simulate");

        // 10% of monthly pay given up, before inflation
        let gap = result.purchasing_power.low_income - result.purchasing_power.high_income;
        assert!((gap + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_agent_mode_reports_distribution() {
        let data = ReferenceData::default();
        let result = simulate(&config(ShockKind::Wage, 0.1, Mode::Agent), &data).expect("simulate");
        let distribution = result.distribution.expect("agent runs report distribution");
        assert!(distribution.gini > 0.0);
    }

    #[test]
    fn test_hybrid_mode_reports_both_runs() {
        let data = ReferenceData::default();
        let mut cfg = config(ShockKind::Wage, 0.1, Mode::Hybrid);
        cfg.horizon = 2;
        let result = simulate(&cfg, &data).expect("simulate");

        let hybrid = result.hybrid.expect("hybrid diagnostics");
        assert_eq!(hybrid.macro_trajectory.len(), 2);
        assert_eq!(hybrid.micro_trajectory.len(), 2);
        assert_eq!(hybrid.emergent_effects.len(), 2);
    }

    #[test]
    fn test_invalid_config_rejected_before_running() {
        let data = ReferenceData::default();
        let mut cfg = config(ShockKind::Wage, 0.1, Mode::Aggregate);
        cfg.horizon = 0;
        assert!(matches!(simulate(&cfg, &data), Err(SimulationError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_production_effects_negative_for_cost_shock() {
        let data = ReferenceData::default();
        let shock = ShockSpecification::new(ShockKind::Wage, 0.2);
        let outcome = production_effects(&shock, &data);
        assert!(outcome.effects[SectorKey::Hospitality].direct < 0.0);
        assert!(outcome.effects.values().all(|e| e.total <= 0.0));
    }
}
