//! Labor-Market Shock Simulation Library
//!
//! This library estimates how a labor-market policy shock (minimum-wage
//! increase, shorter working week, payroll-tax change) plays out over a few
//! years, on a ten-sector model of the French economy.
//!
//! ## Modules
//!
//! - `reference`: built-in sector tables, input-output matrix, baseline aggregates
//! - `shock`, `config`: what is simulated and how
//! - `equilibrium`: aggregate New-Keynesian solver (fixed point per quarter)
//! - `agents`, `population`: household and firm agents on a matched labor market
//! - `hybrid`: both solvers side by side, with their divergence
//! - `propagation`, `substitution`, `threshold`, `feedback`: transforms applied to a run
//! - `engine`, `result`: the `simulate` entry point and its output
//!
//! ## Usage
//!
//! ```bash
//! # Minimum wage raise, aggregate solver
//! cargo run --bin minimum_wage --release
//!
//! # 35h to 32h working week
//! cargo run --bin hours_reduction --release
//!
//! # Macro vs agent comparison
//! cargo run --bin hybrid --release
//! ```

pub mod agents;
pub mod config;
pub mod engine;
pub mod equilibrium;
pub mod error;
pub mod feedback;
pub mod hybrid;
pub mod population;
pub mod propagation;
pub mod reference;
pub mod result;
pub mod shock;
pub mod state;
pub mod substitution;
pub mod threshold;

pub use config::{Mode, SimulationConfig};
pub use engine::simulate;
pub use error::SimulationError;
pub use reference::ReferenceData;
pub use result::SimulationResult;
pub use shock::{ShockKind, ShockSpecification};
