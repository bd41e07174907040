use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use labor_shock_simulation::equilibrium::{EquilibriumParams, EquilibriumSolver};
use labor_shock_simulation::hybrid::HybridRun;
use labor_shock_simulation::population::{AgentParams, AgentSimulator};
use labor_shock_simulation::propagation::PropagationEngine;
use labor_shock_simulation::reference::{IoMatrix, SectorKey, SectorTable, SECTOR_COUNT};
use labor_shock_simulation::state::SimulationState;
use labor_shock_simulation::substitution::{aggregate, sector_effects};
use labor_shock_simulation::threshold::ThresholdSet;
use labor_shock_simulation::{
    simulate, Mode, ReferenceData, ShockKind, ShockSpecification, SimulationConfig,
    SimulationError,
};

const TOLERANCE: f64 = 1e-9;

fn small_config(kind: ShockKind, magnitude: f64, mode: Mode) -> SimulationConfig {
    SimulationConfig {
        households: 1_000,
        firms: 100,
        ..SimulationConfig::with_shock(kind, magnitude, mode)
    }
}

fn assert_on_baseline(states: &[SimulationState], baseline: &SimulationState) {
    for state in states {
        let deviation = state.max_relative_deviation(baseline);
        assert!(deviation < TOLERANCE, "period {} deviates by {deviation}", state.period);
    }
}

// ---------------------------------------------------------------------------
// Zero shock
// ---------------------------------------------------------------------------

#[test]
fn zero_shock_stays_on_baseline_in_every_mode() {
    let data = ReferenceData::default();
    let shock = ShockSpecification::new(ShockKind::Wage, 0.0);
    let solver = EquilibriumSolver::new(&data, EquilibriumParams::default());
    let simulator = AgentSimulator::new(&data, AgentParams::new(1_000, 100));

    let macro_run = solver
        .simulate(&shock, 3, &mut ChaCha8Rng::seed_from_u64(1))
        .expect("aggregate run");
    assert_eq!(macro_run.len(), 3);
    assert_on_baseline(macro_run.states(), solver.baseline());

    let agent_run = simulator
        .run(&shock, 3, &mut ChaCha8Rng::seed_from_u64(1))
        .expect("agent run");
    assert_eq!(agent_run.trajectory.len(), 3);
    assert_on_baseline(agent_run.trajectory.states(), &agent_run.baseline);

    let hybrid = HybridRun::run(&solver, &simulator, &shock, 3, 1).expect("hybrid run");
    assert_on_baseline(hybrid.macro_trajectory.states(), solver.baseline());
    assert_on_baseline(hybrid.micro.trajectory.states(), &hybrid.micro.baseline);
}

#[test]
fn zero_shock_reports_no_impact_in_every_mode() {
    let data = ReferenceData::default();
    for mode in Mode::all() {
        let result = simulate(&small_config(ShockKind::Wage, 0.0, mode), &data).expect("simulate");
        assert!(result.employment.absolute.abs() < 1e-3, "{}", mode.name());
        assert!(result.inflation.incremental.abs() < TOLERANCE, "{}", mode.name());
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn large_wage_raise_costs_jobs_with_wider_range() {
    let data = ReferenceData::default();
    let large_raise = small_config(ShockKind::Wage, 0.26, Mode::Aggregate);
    let small_raise = small_config(ShockKind::Wage, 0.10, Mode::Aggregate);
    let large = simulate(&large_raise, &data).expect("simulate");
    let small = simulate(&small_raise, &data).expect("simulate");

    let terminal = large.horizon;
    assert!(!large.diagnostics.non_converged_periods.contains(&terminal));
    assert!(large.employment.absolute < 0.0);
    assert!(large.employment.range.width() > small.employment.range.width());
}

#[test]
fn nobody_affected_means_no_effect_in_every_mode() {
    let data = ReferenceData::default();
    for mode in Mode::all() {
        let config = SimulationConfig {
            affected_share: 0.0,
            ..small_config(ShockKind::Wage, 0.2, mode)
        };
        let result = simulate(&config, &data).expect("simulate");

        assert!(result.employment.absolute.abs() < 1e-3, "{}", mode.name());
        assert!(result.inflation.incremental.abs() < TOLERANCE, "{}", mode.name());
        let substitution = result.substitution.expect("low-wage shocks report substitution");
        assert_eq!(substitution.by_age.net, 0.0);
        assert_eq!(substitution.by_qualification.net, 0.0);
    }
}

#[test]
fn hybrid_gaps_are_micro_minus_macro_per_period() {
    let data = ReferenceData::default();
    let config = SimulationConfig {
        horizon: 5,
        ..small_config(ShockKind::Wage, 0.1, Mode::Hybrid)
    };
    let result = simulate(&config, &data).expect("simulate");
    let hybrid = result.hybrid.expect("hybrid diagnostics");

    assert_eq!(hybrid.emergent_effects.len(), 5);
    for (i, effect) in hybrid.emergent_effects.iter().enumerate() {
        let micro = &hybrid.micro_trajectory.states()[i];
        let macro_state = &hybrid.macro_trajectory.states()[i];
        assert_eq!(effect.employment_gap, micro.total_employment - macro_state.total_employment);
    }
}

// ---------------------------------------------------------------------------
// Reproducibility
// ---------------------------------------------------------------------------

#[test]
fn same_seed_same_agents() {
    let data = ReferenceData::default();
    let simulator = AgentSimulator::new(&data, AgentParams::new(800, 80));
    let shock = ShockSpecification::new(ShockKind::Wage, 0.2);

    let a = simulator.run(&shock, 3, &mut ChaCha8Rng::seed_from_u64(77)).expect("run");
    let b = simulator.run(&shock, 3, &mut ChaCha8Rng::seed_from_u64(77)).expect("run");
    assert_eq!(a.trajectory, b.trajectory);
    assert_eq!(a.population.households, b.population.households);
    assert_eq!(a.population.firms, b.population.firms);
}

#[test]
fn same_config_same_result() {
    let data = ReferenceData::default();
    let config = small_config(ShockKind::Wage, 0.15, Mode::Agent);
    assert_eq!(simulate(&config, &data), simulate(&config, &data));
}

// ---------------------------------------------------------------------------
// Error surfaces
// ---------------------------------------------------------------------------

#[test]
fn unknown_shock_kind_is_rejected() {
    let err =
        SimulationConfig::from_json(r#"{"shockKind": "bonus", "magnitude": 0.1}"#).unwrap_err();
    assert!(matches!(err, SimulationError::UnsupportedShockKind(_)));
}

#[test]
fn invalid_configurations_are_rejected() {
    assert!(matches!(
        SimulationConfig::from_json(r#"{"shockKind": "wage", "horizon": 0}"#),
        Err(SimulationError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        SimulationConfig::from_json("{not json"),
        Err(SimulationError::InvalidConfiguration(_))
    ));

    let data = ReferenceData::default();
    let hours = small_config(ShockKind::Hours, 1.0, Mode::Aggregate);
    assert!(matches!(simulate(&hours, &data), Err(SimulationError::InvalidConfiguration(_))));
}

#[test]
fn non_finite_reference_data_diverges() {
    let mut data = ReferenceData::default();
    data.sectors[SectorKey::Retail].value_added = f64::NAN;

    let config = small_config(ShockKind::Wage, 0.1, Mode::Aggregate);
    assert!(matches!(
        simulate(&config, &data),
        Err(SimulationError::SimulationDivergence { .. })
    ));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn io_matrix() -> impl Strategy<Value = IoMatrix> {
    prop::array::uniform10(prop::array::uniform10(0.0f64..=1.0)).prop_map(IoMatrix::from_rows)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn sector_levels_never_negative(
        magnitude in 0.0f64..0.8,
        kind in prop::sample::select(ShockKind::all()),
    ) {
        let data = ReferenceData::default();
        let solver = EquilibriumSolver::new(&data, EquilibriumParams::default());
        let shock = ShockSpecification::new(kind, magnitude);
        let trajectory = solver
            .simulate(&shock, 2, &mut ChaCha8Rng::seed_from_u64(3))
            .expect("run");

        for state in trajectory.iter() {
            for (_, s) in state.sectors.iter() {
                prop_assert!(s.employment >= 0.0);
                prop_assert!(s.production >= 0.0);
            }
        }
    }

    #[test]
    fn threshold_is_identity_below_first_level(x in -0.15f64..=0.15) {
        let set = ThresholdSet::default();
        prop_assert_eq!(set.apply(x), x);
    }

    #[test]
    fn threshold_is_monotone(x in 0.0f64..1.0, step in 0.0f64..0.5) {
        let set = ThresholdSet::default();
        prop_assert!(set.apply(x + step) >= set.apply(x) - 1e-12);
        prop_assert!(set.apply(x) >= x);
    }

    #[test]
    fn substitution_net_is_sum_of_sector_nets(magnitude in -0.2f64..0.5, share in 0.0f64..0.3) {
        let data = ReferenceData::default();
        let shock = ShockSpecification {
            affected_share: share,
            ..ShockSpecification::new(ShockKind::Wage, magnitude)
        };
        let summary = aggregate(&shock, &data);

        let (mut age, mut qualification) = (0.0, 0.0);
        for key in SectorKey::ALL {
            let effects = sector_effects(&shock, key, &data);
            let employment = data.sector(key).employment;
            age += effects.net_age() * employment;
            qualification += effects.net_qualification() * employment;
        }
        prop_assert!((summary.by_age.net - age).abs() <= 1e-9 * age.abs().max(1.0));
        let qualification_gap = (summary.by_qualification.net - qualification).abs();
        prop_assert!(qualification_gap <= 1e-9 * qualification.abs().max(1.0));
    }

    #[test]
    fn propagation_settles_on_a_fixed_point(io in io_matrix(), seed in -1_000.0f64..1_000.0) {
        let engine = PropagationEngine {
            iterations: 500,
            ..PropagationEngine::default()
        };
        let direct =
            SectorTable::from_fn(|k| seed * (k.index() as f64 + 1.0) / SECTOR_COUNT as f64);
        let outcome = engine.propagate(&direct, &io);

        prop_assert!(outcome.converged);
        prop_assert!(outcome.iterations < engine.iterations);
        for (_, effect) in outcome.effects.iter() {
            prop_assert!(effect.total.is_finite());
        }

        // one more pass changes nothing within tolerance
        let largest = outcome.effects.values().map(|e| e.total.abs()).fold(0.0, f64::max);
        let mut next = outcome.effects.clone();
        let increment = engine.iterate(&mut next, &io, outcome.iterations);
        prop_assert!(increment <= engine.tolerance * largest);
    }
}
