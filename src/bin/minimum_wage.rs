//! Minimum Wage Simulation Binary
//!
//! Raises the hourly minimum wage to each requested level and reports the
//! employment, price, income and public-finance consequences.
//!
//! ## Usage
//! ```bash
//! cargo run --bin minimum_wage --release
//! cargo run --bin minimum_wage --release -- --hourly 13 --hourly 15 --mode agent
//! cargo run --bin minimum_wage --release -- --config scenario.json --json
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use labor_shock_simulation::{
    simulate, Mode, ReferenceData, ShockKind, ShockSpecification, SimulationConfig,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    Aggregate,
    Agent,
    Hybrid,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Aggregate => Mode::Aggregate,
            ModeArg::Agent => Mode::Agent,
            ModeArg::Hybrid => Mode::Hybrid,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "minimum_wage")]
#[command(about = "Simulate hourly minimum wage raises")]
struct Args {
    /// JSON configuration (camelCase keys); flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// New hourly minimum wage, in euros (repeatable)
    #[arg(long, default_values_t = [12.5, 13.5, 15.0])]
    hourly: Vec<f64>,

    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Years to simulate
    #[arg(long)]
    horizon: Option<usize>,

    #[arg(short, long)]
    seed: Option<u64>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let base = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let reference = ReferenceData::default();

    let mut results = Vec::new();
    for &hourly in &args.hourly {
        let shock = ShockSpecification::minimum_wage(hourly, &reference.baseline);
        let config = SimulationConfig {
            shock_kind: ShockKind::Wage,
            magnitude: shock.magnitude,
            affected_share: shock.affected_share,
            ..base.clone()
        };
        match simulate(&config, &reference) {
            Ok(result) => results.push((hourly, result)),
            Err(e) => {
                eprintln!("error at {hourly:.2} EUR/h: {e}");
                return ExitCode::FAILURE;
            }
        }
    }

    if args.json {
        let payload: Vec<_> = results.iter().map(|(_, r)| r).collect();
        match serde_json::to_string_pretty(&payload) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    println!("=======================================================");
    println!("  Minimum Wage Simulation");
    println!(
        "  From {:.2} EUR/h, {} mode",
        reference.baseline.minimum_wage_hourly,
        base.mode.name()
    );
    println!("=======================================================");
    println!();

    for (hourly, result) in &results {
        println!("=======================================================");
        println!("Scenario: {:.2} EUR/h", hourly);
        println!("=======================================================");
        println!();
        result.print();
        println!();
        result.print_sectors();
        println!();
    }

    println!("=======================================================");
    println!("  Summary");
    println!("=======================================================");
    println!();
    println!("| Hourly | Raise  | Jobs      | Inflation | Real gain (low) | Fiscal (bn) |");
    println!("|--------|--------|-----------|-----------|-----------------|-------------|");
    for (hourly, result) in &results {
        println!(
            "| {:6.2} | {:5.1}% | {:+9.0} | {:+8.2}p | {:+14.2}% | {:+11.2} |",
            hourly,
            result.magnitude * 100.0,
            result.employment.absolute,
            result.inflation.incremental,
            result.purchasing_power.low_income,
            result.fiscal.net / 1e9
        );
    }

    ExitCode::SUCCESS
}

fn load_config(args: &Args) -> Result<SimulationConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => SimulationConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.mode = mode.into();
    }
    if let Some(horizon) = args.horizon {
        config.horizon = horizon;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate()?;
    Ok(config)
}
