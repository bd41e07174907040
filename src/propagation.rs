//! Sectoral Propagation
//!
//! Diffuses a vector of direct, per-sector production changes through the
//! input-output table. Each pass adds, for every sector, the coefficient-
//! weighted total effect of the sectors buying from it, damped geometrically
//! by pass number. The table is not normalized, so the damping is what keeps
//! the series bounded.

use serde::{Deserialize, Serialize};

use crate::reference::{IoMatrix, SectorKey, SectorTable};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorEffect {
    pub direct: f64,
    pub indirect: f64,
    pub total: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropagationOutcome {
    pub effects: SectorTable<SectorEffect>,
    pub iterations: usize,
    pub converged: bool,
}

impl PropagationOutcome {
    pub fn totals(&self) -> SectorTable<f64> {
        self.effects.map(|_, e| e.total)
    }

}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PropagationEngine {
    pub iterations: usize,
    pub decay: f64,     // damping factor per pass
    pub tolerance: f64, // last increment relative to the largest total
}

impl Default for PropagationEngine {
    fn default() -> Self {
        Self {
            iterations: 5,
            decay: 0.7,
            tolerance: 1e-6,
        }
    }
}

impl PropagationEngine {
    pub fn propagate(&self, direct: &SectorTable<f64>, io: &IoMatrix) -> PropagationOutcome {
        let mut effects = direct.map(|_, &d| SectorEffect {
            direct: d,
            indirect: 0.0,
            total: d,
        });

        let mut iterations = 0;
        let mut converged = false;
        for pass in 0..self.iterations {
            let increment = self.iterate(&mut effects, io, pass);
            iterations = pass + 1;

            let scale = effects.values().map(|e| e.total.abs()).fold(0.0, f64::max);
            if increment <= self.tolerance * scale {
                converged = true;
                break;
            }
        }

        if !converged {
            tracing::debug!(
                target: "labor_shock::propagation",
                iterations,
                "propagation stopped at the pass cap"
            );
        }

        PropagationOutcome {
            effects,
            iterations,
            converged,
        }
    }

    /// One damped pass, updating totals in sector order. Returns the largest
    /// absolute increment.
    pub fn iterate(
        &self,
        effects: &mut SectorTable<SectorEffect>,
        io: &IoMatrix,
        pass: usize,
    ) -> f64 {
        let damping = self.decay.powi(pass as i32);
        let mut largest: f64 = 0.0;

        for supplier in SectorKey::ALL {
            let demand: f64 = SectorKey::ALL
                .iter()
                .map(|&consumer| io.coefficient(supplier, consumer) * effects[consumer].total)
                .sum();
            let increment = damping * demand;

            let effect = &mut effects[supplier];
            effect.indirect += increment;
            effect.total = effect.direct + effect.indirect;
            largest = largest.max(increment.abs());
        }

        largest
    }
}
