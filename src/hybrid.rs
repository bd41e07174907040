//! Hybrid Combiner
//!
//! Runs the equilibrium solver and the agent population side by side on the
//! same shock and reports where the two disagree. Nothing is reconciled: the
//! per-period gap between the micro and macro aggregates is the emergent
//! effect, its summary the aggregation bias.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::equilibrium::EquilibriumSolver;
use crate::error::SimulationError;
use crate::population::{AgentRun, AgentSimulator};
use crate::shock::ShockSpecification;
use crate::state::Trajectory;

/// ChaCha stream used by the agent run; the solver keeps stream 0.
const AGENT_STREAM: u64 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EmergentEffect {
    pub period: usize,
    pub employment_gap: f64,  // micro minus macro
    pub consumption_gap: f64, // micro minus macro
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationBias {
    pub final_employment_gap: f64,
    pub final_consumption_gap: f64,
    pub mean_employment_gap: f64,
    pub mean_consumption_gap: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HybridRun {
    pub macro_trajectory: Trajectory,
    pub micro: AgentRun,
    pub emergent_effects: Vec<EmergentEffect>,
    pub aggregation_bias: AggregationBias,
}

impl HybridRun {
    pub fn run(
        solver: &EquilibriumSolver<'_>,
        simulator: &AgentSimulator<'_>,
        shock: &ShockSpecification,
        periods: usize,
        seed: u64,
    ) -> Result<Self, SimulationError> {
        info!(target: "labor_shock::hybrid", periods, seed, "starting hybrid run");

        let (macro_result, micro_result) = std::thread::scope(|scope| {
            let macro_handle = scope.spawn(|| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                solver.simulate(shock, periods, &mut rng)
            });
            let micro_handle = scope.spawn(|| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(AGENT_STREAM);
                simulator.run(shock, periods, &mut rng)
            });
            (
                macro_handle.join().unwrap_or_else(|e| std::panic::resume_unwind(e)),
                micro_handle.join().unwrap_or_else(|e| std::panic::resume_unwind(e)),
            )
        });
        let macro_trajectory = macro_result?;
        let micro = micro_result?;

        let emergent_effects = emergent_effects(&macro_trajectory, &micro.trajectory);
        let aggregation_bias = aggregation_bias(&emergent_effects);
        info!(
            target: "labor_shock::hybrid",
            final_employment_gap = aggregation_bias.final_employment_gap,
            "hybrid run finished"
        );

        Ok(Self {
            macro_trajectory,
            micro,
            emergent_effects,
            aggregation_bias,
        })
    }
}

/// Per-period micro minus macro aggregates, paired by index.
pub fn emergent_effects(
    macro_trajectory: &Trajectory,
    micro_trajectory: &Trajectory,
) -> Vec<EmergentEffect> {
    macro_trajectory
        .iter()
        .zip(micro_trajectory.iter())
        .map(|(m, a)| EmergentEffect {
            period: m.period,
            employment_gap: a.total_employment - m.total_employment,
            consumption_gap: a.consumption - m.consumption,
        })
        .collect()
}

pub fn aggregation_bias(effects: &[EmergentEffect]) -> AggregationBias {
    let Some(last) = effects.last() else {
        return AggregationBias::default();
    };
    let n = effects.len() as f64;
    AggregationBias {
        final_employment_gap: last.employment_gap,
        final_consumption_gap: last.consumption_gap,
        mean_employment_gap: effects.iter().map(|e| e.employment_gap).sum::<f64>() / n,
        mean_consumption_gap: effects.iter().map(|e| e.consumption_gap).sum::<f64>() / n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equilibrium::EquilibriumParams;
    use crate::population::AgentParams;
    use crate::reference::ReferenceData;
    use crate::shock::ShockKind;

    #[test]
    fn test_one_effect_per_period() {
        let data = ReferenceData::default();
        let solver = EquilibriumSolver::new(&data, EquilibriumParams::default());
        let simulator = AgentSimulator::new(&data, AgentParams::new(1_000, 100));
        let shock = ShockSpecification::new(ShockKind::Wage, 0.1);

        let run = HybridRun::run(&solver, &simulator, &shock, 4, 42).expect("hybrid run");
        assert_eq!(run.emergent_effects.len(), 4);
        for (i, effect) in run.emergent_effects.iter().enumerate() {
            let micro = &run.micro.trajectory.states()[i];
            let macro_state = &run.macro_trajectory.states()[i];
            assert_eq!(effect.period, i + 1);
            assert_eq!(
                effect.employment_gap,
                micro.total_employment - macro_state.total_employment
            );
        }
        let last = run.emergent_effects[3];
        assert_eq!(run.aggregation_bias.final_employment_gap, last.employment_gap);
    }

    #[test]
    fn test_same_seed_same_hybrid() {
        let data = ReferenceData::default();
        let solver = EquilibriumSolver::new(&data, EquilibriumParams::default());
        let simulator = AgentSimulator::new(&data, AgentParams::new(500, 50));
        let shock = ShockSpecification::new(ShockKind::Wage, 0.2);

        let a = HybridRun::run(&solver, &simulator, &shock, 2, 9).expect("hybrid run");
        let b = HybridRun::run(&solver, &simulator, &shock, 2, 9).expect("hybrid run");
        assert_eq!(a, b);
    }

    #[test]
    fn test_bias_of_known_gaps() {
        let effects = [
            EmergentEffect {
                period: 1,
                employment_gap: 10.0,
                consumption_gap: -4.0,
            },
            EmergentEffect {
                period: 2,
                employment_gap: 30.0,
                consumption_gap: 0.0,
            },
        ];
        let bias = aggregation_bias(&effects);
        assert_eq!(bias.final_employment_gap, 30.0);
        assert_eq!(bias.mean_employment_gap, 20.0);
        assert_eq!(bias.mean_consumption_gap, -2.0);
        assert_eq!(aggregation_bias(&[]), AggregationBias::default());
    }
}
