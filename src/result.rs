//! Output records.
//!
//! Everything a run reports, serializable as camelCase JSON. Amounts are in
//! euros per year and jobs unless a field says otherwise.

use serde::{Deserialize, Serialize};

use crate::config::Mode;
use crate::feedback::FeedbackPeriod;
use crate::hybrid::{AggregationBias, EmergentEffect};
use crate::population::DistributionSummary;
use crate::propagation::SectorEffect;
use crate::reference::SectorKey;
use crate::shock::ShockKind;
use crate::state::{Anticipations, Trajectory};
use crate::substitution::{CapitalLaborShift, CategoryEffects, SubstitutionSummary};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub low: f64,
    pub high: f64,
}

impl Range {
    /// `value` scaled by both factors, ordered low to high.
    pub fn scaled(value: f64, low_factor: f64, high_factor: f64) -> Self {
        let (a, b) = (value * low_factor, value * high_factor);
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    pub fn width(&self) -> f64 {
        self.high - self.low
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeriodValue {
    pub period: usize,
    pub value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmploymentImpact {
    pub absolute: f64,
    pub percent: f64,
    pub range: Range,
    pub trajectory: Vec<PeriodValue>,
    pub work_sharing: f64, // jobs opened by compensatory hiring, included above
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchasingPowerImpact {
    pub low_income: f64, // real gain, percent
    pub middle_income: f64,
    pub high_income: f64,
    pub monthly_net_gain_at_minimum: Option<f64>, // euros per month, wage shocks only
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InflationImpact {
    pub incremental: f64, // percentage points over baseline
    pub total: f64,       // percent
    pub range: Range,
    pub trajectory: Vec<PeriodValue>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GdpImpact {
    pub change: f64,
    pub percent: f64,
    pub consumption_change: f64,
    pub investment_change: f64,
    pub government_change: f64,
    pub net_exports_change: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiscalBalance {
    pub contribution_revenue: f64,
    pub consumption_tax_revenue: f64,
    pub benefit_outlay: f64, // positive is extra spending
    pub net: f64,
    pub range: Range,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarginImpact {
    pub unpassed_labor_cost: f64,
    pub margin_change_points: f64,
    pub new_margin_rate: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeImpact {
    pub exports_change: f64,
    pub imports_change: f64,
    pub balance_change: f64,
}

/// Yearly cost to firms of an hours cut, in euros.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirmCostBreakdown {
    pub hourly_cost_change: f64, // percent
    pub labor_cost: f64,
    pub hiring_cost: f64,
    pub productivity_offset: f64,
    pub net: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkingTimeImpact {
    pub weekly_hours: f64,
    pub monthly_hours: f64,
    pub freed_hours_per_year: f64, // per worker
    pub freed_days_per_year: f64,  // 7-hour days
    pub firm_costs: FirmCostBreakdown,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmploymentChange {
    pub initial: f64,
    pub change: f64,
    #[serde(rename = "final")]
    pub final_level: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectorBreakdown {
    pub sector: SectorKey,
    pub name: String,
    pub employment: EmploymentChange,
    pub production: SectorEffect,
    pub price_change: f64,
    pub wage_bill_change: f64,
    pub capital_labor: CapitalLaborShift,
    pub categories: CategoryEffects,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HybridDiagnostics {
    pub macro_trajectory: Trajectory,
    pub micro_trajectory: Trajectory,
    pub emergent_effects: Vec<EmergentEffect>,
    pub aggregation_bias: AggregationBias,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub non_converged_periods: Vec<usize>,
    pub propagation_converged: bool,
    pub propagation_iterations: usize,
    pub data_quality_notes: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub mode: Mode,
    pub shock_kind: ShockKind,
    pub magnitude: f64,
    pub horizon: usize,
    pub amplification: f64,
    pub employment: EmploymentImpact,
    pub purchasing_power: PurchasingPowerImpact,
    pub inflation: InflationImpact,
    pub gdp: GdpImpact,
    pub fiscal: FiscalBalance,
    pub margins: MarginImpact,
    pub trade: TradeImpact,
    pub working_time: Option<WorkingTimeImpact>,
    pub sectors: Option<Vec<SectorBreakdown>>,
    pub substitution: Option<SubstitutionSummary>,
    pub feedback: Vec<FeedbackPeriod>,
    pub hybrid: Option<HybridDiagnostics>,
    pub distribution: Option<DistributionSummary>,
    pub anticipations: Option<Anticipations>,
    pub diagnostics: Diagnostics,
}

impl SimulationResult {
    pub fn print(&self) {
        println!("  Mode:                    {}", self.mode.name());
        println!("  Shock:                   {} {:+.1}%", self.shock_kind, self.magnitude * 100.0);
        println!("  Horizon:                 {} years", self.horizon);
        println!("  Threshold amplification: {:.2}x", self.amplification);
        println!();
        println!(
            "  Employment change:       {:+.0} jobs ({:+.2}%)",
            self.employment.absolute, self.employment.percent
        );
        println!(
            "  Employment range:        [{:+.0}, {:+.0}]",
            self.employment.range.low, self.employment.range.high
        );
        println!("  Incremental inflation:   {:+.2} pts", self.inflation.incremental);
        println!("  Total inflation:         {:.2}%", self.inflation.total);
        println!("  GDP change:              {:+.2}%", self.gdp.percent);
        println!("  Real gain, low incomes:  {:+.2}%", self.purchasing_power.low_income);
        println!("  Real gain, middle:       {:+.2}%", self.purchasing_power.middle_income);
        if let Some(gain) = self.purchasing_power.monthly_net_gain_at_minimum {
            println!("  Net gain at minimum:     {:+.0} EUR/month", gain);
        }
        println!("  Fiscal balance:          {:+.2} bn EUR", self.fiscal.net / 1e9);
        println!(
            "  Margin rate:             {:.1}% ({:+.2} pts)",
            self.margins.new_margin_rate * 100.0,
            self.margins.margin_change_points
        );
        println!("  Trade balance:           {:+.2} bn EUR", self.trade.balance_change / 1e9);

        if let Some(time) = &self.working_time {
            let costs = &time.firm_costs;
            println!();
            println!(
                "  Weekly hours:            {:.1}h ({:.1}h a month)",
                time.weekly_hours, time.monthly_hours
            );
            println!(
                "  Freed time:              {:.0} h/year ({:.0} days)",
                time.freed_hours_per_year, time.freed_days_per_year
            );
            println!("  Work-sharing hires:      {:+.0} jobs", self.employment.work_sharing);
            println!("  Hourly labor cost:       {:+.2}%", costs.hourly_cost_change);
            println!("  Firm cost, lost hours:   {:+.2} bn EUR", costs.labor_cost / 1e9);
            println!("  Firm cost, new hires:    {:+.2} bn EUR", costs.hiring_cost / 1e9);
            println!("  Productivity offset:     {:.2} bn EUR", costs.productivity_offset / 1e9);
            println!("  Firm cost, net:          {:+.2} bn EUR", costs.net / 1e9);
        }

        if !self.diagnostics.non_converged_periods.is_empty() {
            println!("  Non-converged periods:   {:?}", self.diagnostics.non_converged_periods);
        }
        for note in &self.diagnostics.data_quality_notes {
            println!("  Note:                    {}", note);
        }
    }

    pub fn print_sectors(&self) {
        let Some(sectors) = &self.sectors else {
            return;
        };
        println!("| Sector | Employment | Change | Direct output | Total output | Price |");
        println!("|--------|------------|--------|---------------|--------------|-------|");
        for s in sectors {
            println!(
                "| {} | {:.0} | {:+.0} | {:+.2} bn | {:+.2} bn | {:+.2}% |",
                s.name,
                s.employment.initial,
                s.employment.change,
                s.production.direct / 1e9,
                s.production.total / 1e9,
                s.price_change * 100.0
            );
        }
    }

    pub fn print_feedback(&self) {
        println!("| Year | Direct jobs | Induced consumption | Induced jobs | Total |");
        println!("|------|-------------|---------------------|--------------|-------|");
        for row in &self.feedback {
            println!(
                "| {} | {:+.0} | {:+.2} bn | {:+.0} | {:+.0} |",
                row.period,
                row.direct_employment,
                row.induced_consumption / 1e9,
                row.induced_employment,
                row.total_employment
            );
        }
    }
}
