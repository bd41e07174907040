//! Simulation Configuration
//!
//! One struct enumerating every option with its default. Validation runs once,
//! before any simulation work; solvers trust what they receive afterwards.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SimulationError;
use crate::shock::{
    ShockKind, ShockParameters, ShockSpecification, TargetGroup, DEFAULT_AFFECTED_SHARE,
};

pub const DEFAULT_HOUSEHOLDS: usize = 10_000;
pub const DEFAULT_FIRMS: usize = 1_000;
pub const DEFAULT_HORIZON: usize = 3;
pub const DEFAULT_SEED: u64 = 42;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Aggregate, // equilibrium solver
    Agent,     // agent population
    Hybrid,    // both, with divergence diagnostics
}

impl Mode {
    pub fn all() -> Vec<Self> {
        vec![Self::Aggregate, Self::Agent, Self::Hybrid]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Aggregate => "Aggregate equilibrium",
            Self::Agent => "Agent population",
            Self::Hybrid => "Hybrid (equilibrium + agents)",
        }
    }
}

/// Behavioral parameters exposed to callers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tuning {
    pub risk_aversion: f64,           // sigma in the Euler equation
    pub labor_supply_elasticity: f64, // Frisch
    pub labor_demand_elasticity: f64,
    pub price_transmission: f64,
    pub wage_diffusion: f64,
    pub propensity_to_consume: f64,
    pub pay_maintained: f64, // hours shocks only
    pub compensatory_hiring: f64,
    pub productivity_gain: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        let shock = ShockParameters::default();
        Self {
            risk_aversion: 1.5,
            labor_supply_elasticity: 1.0,
            labor_demand_elasticity: shock.labor_demand_elasticity,
            price_transmission: shock.price_transmission,
            wage_diffusion: shock.wage_diffusion,
            propensity_to_consume: 0.85,
            pay_maintained: shock.pay_maintained,
            compensatory_hiring: shock.compensatory_hiring,
            productivity_gain: shock.productivity_gain,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimulationConfig {
    pub shock_kind: ShockKind,
    pub magnitude: f64,
    pub affected_share: f64,
    pub target_group: TargetGroup,
    pub anticipated: bool,
    pub mode: Mode,
    pub horizon: usize, // reporting periods (years)
    pub include_thresholds: bool,
    pub include_anticipations: bool,
    pub include_sectoral_effects: bool,
    pub households: usize,
    pub firms: usize,
    pub seed: u64,
    pub tuning: Tuning,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            shock_kind: ShockKind::Wage,
            magnitude: 0.0,
            affected_share: DEFAULT_AFFECTED_SHARE,
            target_group: TargetGroup::LowWage,
            anticipated: true,
            mode: Mode::Aggregate,
            horizon: DEFAULT_HORIZON,
            include_thresholds: true,
            include_anticipations: true,
            include_sectoral_effects: true,
            households: DEFAULT_HOUSEHOLDS,
            firms: DEFAULT_FIRMS,
            seed: DEFAULT_SEED,
            tuning: Tuning::default(),
        }
    }
}

impl SimulationConfig {
    pub fn with_shock(kind: ShockKind, magnitude: f64, mode: Mode) -> Self {
        Self {
            shock_kind: kind,
            magnitude,
            mode,
            ..Self::default()
        }
    }

    /// Parses camelCase JSON. An unknown `shockKind` is reported as
    /// `UnsupportedShockKind`; any other malformed input as `InvalidConfiguration`.
    pub fn from_json(input: &str) -> Result<Self, SimulationError> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| SimulationError::invalid(format!("malformed JSON: {e}")))?;

        if let Some(kind) = value.get("shockKind") {
            match kind.as_str() {
                Some(s) => {
                    s.parse::<ShockKind>()?;
                }
                None => return Err(SimulationError::UnsupportedShockKind(kind.to_string())),
            }
        }

        let config: Self =
            serde_json::from_value(value).map_err(|e| SimulationError::invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.horizon == 0 {
            return Err(SimulationError::invalid("horizon must be at least one period"));
        }
        if self.households == 0 {
            return Err(SimulationError::invalid("household population must not be empty"));
        }
        if self.firms == 0 {
            return Err(SimulationError::invalid("firm population must not be empty"));
        }

        let t = &self.tuning;
        if !(t.risk_aversion > 0.0 && t.risk_aversion.is_finite()) {
            return Err(SimulationError::invalid("risk aversion must be positive"));
        }
        if !(t.labor_supply_elasticity > 0.0 && t.labor_supply_elasticity.is_finite()) {
            return Err(SimulationError::invalid("labor supply elasticity must be positive"));
        }
        if !(0.0..=1.0).contains(&t.propensity_to_consume) {
            return Err(SimulationError::invalid("propensity to consume outside [0, 1]"));
        }
        if !(0.0..=1.0).contains(&t.price_transmission) {
            return Err(SimulationError::invalid("price transmission outside [0, 1]"));
        }

        self.shock().validate()
    }

    pub fn shock(&self) -> ShockSpecification {
        ShockSpecification {
            kind: self.shock_kind,
            magnitude: self.magnitude,
            affected_share: self.affected_share,
            target_group: self.target_group,
            anticipated: self.anticipated,
            parameters: ShockParameters {
                labor_demand_elasticity: self.tuning.labor_demand_elasticity,
                price_transmission: self.tuning.price_transmission,
                wage_diffusion: self.tuning.wage_diffusion,
                pay_maintained: self.tuning.pay_maintained,
                compensatory_hiring: self.tuning.compensatory_hiring,
                productivity_gain: self.tuning.productivity_gain,
            },
        }
    }
}
