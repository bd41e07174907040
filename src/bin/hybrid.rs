//! Hybrid Comparison Binary
//!
//! Runs the equilibrium solver and the agent population on the same wage
//! shock and shows, year by year, how far the emergent micro aggregates drift
//! from the macro solution.
//!
//! ## Usage
//! ```bash
//! cargo run --bin hybrid --release
//! cargo run --bin hybrid --release -- --magnitude 0.2 --households 20000 --horizon 5
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use labor_shock_simulation::{simulate, Mode, ReferenceData, ShockKind, SimulationConfig};

#[derive(Parser, Debug)]
#[command(name = "hybrid")]
#[command(about = "Compare aggregate and agent-based runs of a wage shock")]
struct Args {
    /// Wage increase for affected workers (0.1 = +10%)
    #[arg(short, long, default_value_t = 0.1)]
    magnitude: f64,

    #[arg(long, default_value_t = 5)]
    horizon: usize,

    #[arg(long, default_value_t = 10_000)]
    households: usize,

    #[arg(long, default_value_t = 1_000)]
    firms: usize,

    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Print the full result as JSON
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
    let reference = ReferenceData::default();
    let config = SimulationConfig {
        horizon: args.horizon,
        households: args.households,
        firms: args.firms,
        seed: args.seed,
        ..SimulationConfig::with_shock(ShockKind::Wage, args.magnitude, Mode::Hybrid)
    };

    let result = match simulate(&config, &reference) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        return match serde_json::to_string_pretty(&result) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        };
    }

    println!("=======================================================");
    println!("  Hybrid Simulation");
    println!("  Aggregate Solver vs Agent Population");
    println!("=======================================================");
    println!();
    println!("Parameters:");
    println!("  Wage shock: {:+.1}%", args.magnitude * 100.0);
    println!("  Households: {}, Firms: {}", args.households, args.firms);
    println!();

    result.print();
    println!();

    if let Some(hybrid) = &result.hybrid {
        println!("| Year | Macro jobs  | Micro jobs  | Gap        | Consumption gap (bn) |");
        println!("|------|-------------|-------------|------------|----------------------|");
        for ((m, a), effect) in hybrid
            .macro_trajectory
            .iter()
            .zip(hybrid.micro_trajectory.iter())
            .zip(&hybrid.emergent_effects)
        {
            println!(
                "| {:4} | {:11.0} | {:11.0} | {:+10.0} | {:+20.2} |",
                effect.period,
                m.total_employment,
                a.total_employment,
                effect.employment_gap,
                effect.consumption_gap / 1e9
            );
        }
        println!();
        println!("Aggregation bias:");
        println!("  Final employment gap:    {:+.0}", hybrid.aggregation_bias.final_employment_gap);
        println!("  Mean employment gap:     {:+.0}", hybrid.aggregation_bias.mean_employment_gap);
        println!(
            "  Mean consumption gap:    {:+.2} bn",
            hybrid.aggregation_bias.mean_consumption_gap / 1e9
        );
        println!();
    }

    if let Some(d) = &result.distribution {
        println!("Agent distribution (final year):");
        println!(
            "  Wage p10 / p50 / p90:    {:.0} / {:.0} / {:.0}",
            d.wages.p10, d.wages.p50, d.wages.p90
        );
        println!("  Gini:                    {:.3}", d.gini);
        println!("  Mobility rate:           {:.2}%", d.mobility_rate * 100.0);
        println!("  Labor supply index:      {:.3}", d.labor_supply_index);
        for group in d.by_age.iter().chain(&d.by_qualification) {
            let label = format!("{}:", group.group);
            println!("  {:<24} {:.1}% employed", label, group.employment_rate * 100.0);
        }
    }

    ExitCode::SUCCESS
}
