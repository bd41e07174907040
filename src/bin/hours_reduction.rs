//! Working-Week Reduction Binary
//!
//! Shortens the legal working week. With a share `p` of monthly pay kept and
//! an hourly productivity gain `g`, hourly labor cost moves by
//! `p * from / to - 1 - g`; part of the lost hours can be refilled by hiring.
//! Compares several target weeks.
//!
//! ## Usage
//! ```bash
//! cargo run --bin hours_reduction --release
//! cargo run --bin hours_reduction --release -- --to 32 --horizon 5
//! cargo run --bin hours_reduction --release -- --to 32 --pay-kept 0.95 --hiring 0 --productivity 0
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use labor_shock_simulation::config::Tuning;
use labor_shock_simulation::shock::TargetGroup;
use labor_shock_simulation::{
    simulate, ReferenceData, ShockKind, ShockSpecification, SimulationConfig,
};

#[derive(Parser, Debug)]
#[command(name = "hours_reduction")]
#[command(about = "Simulate a shorter legal working week")]
struct Args {
    /// Target weekly hours (repeatable)
    #[arg(long, default_values_t = [34.0, 32.0, 30.0])]
    to: Vec<f64>,

    /// Share of monthly pay kept (1.0 = full pay)
    #[arg(long, default_value_t = 1.0)]
    pay_kept: f64,

    /// Share of the lost hours refilled by new hires
    #[arg(long, default_value_t = 0.08)]
    hiring: f64,

    /// Hourly productivity gain (0.03 = +3%)
    #[arg(long, default_value_t = 0.03)]
    productivity: f64,

    /// Years to simulate
    #[arg(long, default_value_t = 3)]
    horizon: usize,

    #[arg(short, long, default_value_t = 42)]
    seed: u64,

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
    let reference = ReferenceData::default();
    let from = reference.baseline.weekly_hours;

    let mut results = Vec::new();
    for &to in &args.to {
        let shock = ShockSpecification::hours_reduction(from, to);
        let config = SimulationConfig {
            shock_kind: ShockKind::Hours,
            magnitude: shock.magnitude,
            affected_share: shock.affected_share,
            target_group: TargetGroup::All,
            horizon: args.horizon,
            seed: args.seed,
            tuning: Tuning {
                pay_maintained: args.pay_kept,
                compensatory_hiring: args.hiring,
                productivity_gain: args.productivity,
                ..Tuning::default()
            },
            ..SimulationConfig::default()
        };
        match simulate(&config, &reference) {
            Ok(result) => results.push((to, result)),
            Err(e) => {
                eprintln!("error at {to}h: {e}");
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
    println!("  Working-Week Reduction");
    println!("  From {:.0}h", from);
    println!("=======================================================");
    println!();
    println!("Parameters:");
    println!("  Pay kept:     {:.0}%", args.pay_kept * 100.0);
    println!("  Hiring:       {:.0}% of lost hours", args.hiring * 100.0);
    println!("  Productivity: {:+.1}%", args.productivity * 100.0);
    println!();

    for (to, result) in &results {
        println!("=======================================================");
        println!("Scenario: {:.0}h week", to);
        println!("=======================================================");
        println!();
        result.print();
        println!();
        println!("Feedback loop:");
        result.print_feedback();
        println!();
    }

    println!("| Week | Cost change | Jobs      | Shared   | Days off | GDP     | Margin rate |");
    println!("|------|-------------|-----------|----------|----------|---------|-------------|");
    for (to, result) in &results {
        let Some(time) = &result.working_time else {
            continue;
        };
        println!(
            "| {:3.0}h | {:10.1}% | {:+9.0} | {:+8.0} | {:8.0} | {:+6.2}% | {:10.1}% |",
            to,
            time.firm_costs.hourly_cost_change,
            result.employment.absolute,
            result.employment.work_sharing,
            time.freed_days_per_year,
            result.gdp.percent,
            result.margins.new_margin_rate * 100.0
        );
    }

    ExitCode::SUCCESS
}
