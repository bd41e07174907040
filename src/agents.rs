//! Household and firm agents.
//!
//! Agents are plain records. Behavior lives in functions that read a record
//! (and the period's context) and return a new value: a revised household, or
//! a firm's decision for the matching step to carry out.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::reference::SectorKey;
use crate::state::ratio_or_zero;

/// Categorical weights must sum to 1 within this tolerance.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

pub const AUTOMATION_SHOCK_THRESHOLD: f64 = 0.15;
pub const AUTOMATION_FLEXIBILITY_THRESHOLD: f64 = 0.6;
pub const AUTOMATION_INVESTMENT_THRESHOLD: f64 = 0.1;
const AUTOMATION_LABOR_SAVING: f64 = 0.3;
const AUTOMATION_INVESTMENT_RATE: f64 = 0.15;
const NORMAL_INVESTMENT_RATE: f64 = 0.05;
const RISK_PREMIUM: f64 = 0.03;
const COMPETITOR_PRICE_MARGIN: f64 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualification {
    Unqualified,
    Qualified,
    HighlyQualified,
}

impl Qualification {
    pub fn all() -> Vec<Self> {
        vec![Self::Unqualified, Self::Qualified, Self::HighlyQualified]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Unqualified => "Unqualified",
            Self::Qualified => "Qualified",
            Self::HighlyQualified => "Highly qualified",
        }
    }

    pub fn wage_multiplier(&self) -> f64 {
        match self {
            Self::Unqualified => 0.8,
            Self::Qualified => 1.0,
            Self::HighlyQualified => 1.6,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBand {
    Young,  // under 30
    Prime,  // 30 to 54
    Senior, // 55 and over
}

impl AgeBand {
    pub fn all() -> Vec<Self> {
        vec![Self::Young, Self::Prime, Self::Senior]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Young => "Under 30",
            Self::Prime => "30-54",
            Self::Senior => "55+",
        }
    }

    /// Age range `[low, high)` used when drawing an age inside the band.
    pub fn range(&self) -> (f64, f64) {
        match self {
            Self::Young => (20.0, 30.0),
            Self::Prime => (30.0, 55.0),
            Self::Senior => (55.0, 65.0),
        }
    }

    pub fn of(age: f64) -> Self {
        if age < 30.0 {
            Self::Young
        } else if age < 55.0 {
            Self::Prime
        } else {
            Self::Senior
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    Micro,
    Small,
    Large,
}

impl SizeClass {
    pub fn all() -> Vec<Self> {
        vec![Self::Micro, Self::Small, Self::Large]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Micro => "Micro (<10)",
            Self::Small => "Small/medium (10-249)",
            Self::Large => "Large (250+)",
        }
    }

    pub fn population_share(&self) -> f64 {
        match self {
            Self::Micro => 0.6,
            Self::Small => 0.3,
            Self::Large => 0.1,
        }
    }

    /// Typical headcount, used to split sector totals between firms.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Micro => 5.0,
            Self::Small => 50.0,
            Self::Large => 500.0,
        }
    }

    pub fn flexibility(&self) -> f64 {
        match self {
            Self::Micro => 0.3,
            Self::Small => 0.5,
            Self::Large => 0.8,
        }
    }

    pub fn market_power(&self) -> f64 {
        match self {
            Self::Micro => 0.2,
            Self::Small => 0.4,
            Self::Large => 0.7,
        }
    }
}

/// Draws one option. Weights that are negative or do not sum to 1 yield
/// `default` without consuming randomness.
pub fn sample_categorical<T: Copy>(options: &[(T, f64)], default: T, rng: &mut impl Rng) -> T {
    let total: f64 = options.iter().map(|(_, w)| w).sum();
    let malformed = options.iter().any(|(_, w)| !w.is_finite() || *w < 0.0);
    if malformed || (total - 1.0).abs() > WEIGHT_TOLERANCE {
        return default;
    }

    let draw = rng.gen::<f64>();
    let mut cumulative = 0.0;
    for &(value, weight) in options {
        cumulative += weight;
        if draw < cumulative {
            return value;
        }
    }
    options.last().map(|&(value, _)| value).unwrap_or(default)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HouseholdAgent {
    pub id: usize,
    pub age: f64,
    pub qualification: Qualification,
    pub sector: SectorKey,
    pub wage: f64,          // monthly gross
    pub base_wage: f64,     // before the shock
    pub smoothed_wage: f64, // permanent-income memory
    pub employed: bool,
    pub savings: f64,
    pub consumption: f64, // monthly
    pub sector_moves: u32,
}

impl HouseholdAgent {
    pub fn age_band(&self) -> AgeBand {
        AgeBand::of(self.age)
    }

    pub fn propensity_to_consume(&self, base: f64) -> f64 {
        if self.wage < 1500.0 {
            return 0.95;
        }
        if self.wage > 4000.0 {
            return 0.60;
        }
        match self.age_band() {
            AgeBand::Young => base + 0.05,
            AgeBand::Senior => base - 0.10,
            AgeBand::Prime => base,
        }
    }

    pub fn labor_supply_elasticity(&self) -> f64 {
        if self.age < 35.0 {
            0.5
        } else if self.age > 55.0 {
            0.1
        } else {
            0.3
        }
    }

    /// Permanent-income consumption. The unemployed do not consume out of
    /// wage income.
    pub fn consume(&self, anticipated_inflation: f64, base_propensity: f64) -> Self {
        if !self.employed {
            return Self {
                consumption: 0.0,
                ..self.clone()
            };
        }

        let permanent = 0.7 * self.smoothed_wage + 0.3 * self.wage;
        let real = permanent / (1.0 + anticipated_inflation);
        let consumption = self.propensity_to_consume(base_propensity) * real;

        Self {
            consumption,
            savings: self.savings + self.wage - consumption,
            smoothed_wage: permanent,
            ..self.clone()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FirmAgent {
    pub id: usize,
    pub sector: SectorKey,
    pub size: SizeClass,
    pub production: f64,
    pub base_production: f64,
    pub employees: f64, // population units
    pub base_employees: f64,
    pub capital: f64,
    pub base_capital: f64,
    pub price: f64,
    pub hiring_backlog: f64,
    pub separation_backlog: f64,
}

impl FirmAgent {
    pub fn flexibility(&self) -> f64 {
        self.size.flexibility()
    }

    pub fn market_power(&self) -> f64 {
        self.size.market_power()
    }

    /// Cobb-Douglas output at the current headcount and capital.
    pub fn output(&self, capital_share: f64) -> f64 {
        let labor = if self.base_employees > 0.0 {
            self.employees / self.base_employees
        } else {
            1.0
        };
        let capital = if self.base_capital > 0.0 { self.capital / self.base_capital } else { 1.0 };
        self.base_production
            * labor.max(0.0).powf(1.0 - capital_share)
            * capital.max(0.0).powf(capital_share)
    }
}

/// What a firm sees when deciding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FirmContext {
    pub cost_change: f64,       // this sector's labor-cost change
    pub shock_magnitude: f64,   // economy-wide labor-cost change for affected workers
    pub wage_share: f64,
    pub cost_sensitivity: f64,
    pub labor_demand_elasticity: f64,
    pub demand_feedback: f64,
    pub expected_demand_gap: f64,
    pub expected_growth: f64,
    pub competitor_price: f64,
    pub interest_rate: f64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FirmDecision {
    pub hires: f64,
    pub separations: f64,
    pub automation_separations: f64,
    pub price: f64,
    pub investment: f64,
}

pub fn decide(firm: &FirmAgent, ctx: &FirmContext) -> FirmDecision {
    let flexibility = firm.flexibility();

    // employment
    let real_cost = ratio_or_zero(1.0 + ctx.cost_change, firm.price) - 1.0;
    let market_desired = (firm.base_employees
        * (1.0 - ctx.labor_demand_elasticity * ctx.cost_sensitivity * real_cost)
        * (1.0 + ctx.demand_feedback * ctx.expected_demand_gap))
        .max(0.0);

    let automating = ctx.shock_magnitude > AUTOMATION_SHOCK_THRESHOLD
        && flexibility > AUTOMATION_FLEXIBILITY_THRESHOLD;
    let desired = if automating {
        (market_desired * (1.0 - AUTOMATION_LABOR_SAVING * ctx.cost_change)).max(0.0)
    } else {
        market_desired
    };

    let separations = (firm.employees - market_desired).max(0.0) * flexibility;
    let automation_separations =
        (firm.employees.min(market_desired) - desired).max(0.0) * flexibility;
    let hires = (desired - firm.employees).max(0.0) * flexibility;

    // pricing
    let target = 1.0 + ctx.wage_share * ctx.cost_change * (0.5 + 0.5 * firm.market_power());
    let blended = (1.0 - flexibility) * firm.price + flexibility * target;
    let price = blended.min(ctx.competitor_price * (1.0 + COMPETITOR_PRICE_MARGIN));

    // investment
    let expected_return = ctx.expected_growth + 0.02;
    let cost_of_capital = ctx.interest_rate + RISK_PREMIUM;
    let mut investment = if expected_return > cost_of_capital {
        NORMAL_INVESTMENT_RATE * firm.capital
    } else {
        0.0
    };
    if ctx.shock_magnitude > AUTOMATION_INVESTMENT_THRESHOLD && ctx.cost_change > 0.0 {
        investment += ctx.cost_change * firm.capital * AUTOMATION_INVESTMENT_RATE;
    }

    FirmDecision {
        hires,
        separations,
        automation_separations,
        price,
        investment,
    }
}
