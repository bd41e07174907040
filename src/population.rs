//! Agent Population Simulation
//!
//! Thousands of heterogeneous households and firms react to the shock with
//! simple behavioral rules; aggregates emerge from their interaction on the
//! labor market instead of being solved for.
//!
//! ## Period Mechanics
//! 1. Firms form expectations (demand reverting to trend, competitor prices
//!    drifting with the shock)
//! 2. Firms decide headcount, automation, prices and investment
//! 3. The labor market matches: separations hit random workers of the firm's
//!    sector, hires come from the unemployed pool in order
//! 4. Households consume out of permanent income
//! 5. Market conditions are recomputed from the new population
//!
//! ## What We Measure
//! - Employment and consumption scaled to the economy
//! - Wage distribution, inequality, mobility
//! - Employment by age band, qualification and sector

use rand::seq::index;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::agents::{
    decide, sample_categorical, AgeBand, FirmAgent, FirmContext, HouseholdAgent, Qualification,
    SizeClass,
};
use crate::error::SimulationError;
use crate::reference::{ReferenceData, SectorKey, SectorTable, SECTOR_COUNT};
use crate::shock::{ShockKind, ShockSpecification};
use crate::state::{ratio_or_zero, Anticipations, SectorState, SimulationState, Trajectory};

const MONTHS: f64 = 12.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentParams {
    pub households: usize,
    pub firms: usize,
    pub wage_dispersion: f64, // std dev of the wage noise
    pub propensity_to_consume: f64,
    pub demand_feedback: f64,
    pub capital_share: f64,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            households: 10_000,
            firms: 1_000,
            wage_dispersion: 0.05,
            propensity_to_consume: 0.85,
            demand_feedback: 0.5,
            capital_share: 0.35,
        }
    }
}

impl AgentParams {
    pub fn new(households: usize, firms: usize) -> Self {
        Self {
            households,
            firms,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketConditions {
    pub unemployment_rate: f64,
    pub inflation: f64,
    pub average_wage: f64,  // monthly, employed households
    pub average_price: f64, // headcount-weighted over firms
    pub consumption: f64,   // monthly, summed over households
    pub investment: f64,    // last period's firm investment
    pub expected_growth: f64,
    pub expected_inflation: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Population {
    pub households: Vec<HouseholdAgent>,
    pub firms: Vec<FirmAgent>,
    pub market: MarketConditions,
}

impl Population {
    pub fn employed(&self) -> usize {
        self.households.iter().filter(|h| h.employed).count()
    }
}

/// Shock quantities and the period index for one transition.
#[derive(Clone, Debug)]
pub struct StepContext {
    pub period: usize, // 0-based
    pub cost_change: SectorTable<f64>,
    pub shock_magnitude: f64,
    pub mean_cost_change: f64,
    pub labor_demand_elasticity: f64,
    pub include_anticipations: bool,
    pub baseline_consumption: f64,
}

pub struct AgentSimulator<'a> {
    reference: &'a ReferenceData,
    params: AgentParams,
    include_anticipations: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentRun {
    pub baseline: SimulationState,
    pub trajectory: Trajectory,
    pub population: Population,
    pub household_weight: f64, // workers represented by one household
}

impl<'a> AgentSimulator<'a> {
    pub fn new(reference: &'a ReferenceData, params: AgentParams) -> Self {
        Self {
            reference,
            params,
            include_anticipations: true,
        }
    }

    pub fn with_anticipations(mut self, include: bool) -> Self {
        self.include_anticipations = include;
        self
    }

    pub fn params(&self) -> &AgentParams {
        &self.params
    }

    pub fn household_weight(&self) -> f64 {
        ratio_or_zero(self.reference.labor_force(), self.params.households as f64)
    }

    pub fn run(
        &self,
        shock: &ShockSpecification,
        periods: usize,
        rng: &mut impl Rng,
    ) -> Result<AgentRun, SimulationError> {
        if periods == 0 {
            return Err(SimulationError::invalid("horizon must be at least one period"));
        }
        info!(
            target: "labor_shock::population",
            households = self.params.households,
            firms = self.params.firms,
            periods,
            "starting agent run"
        );

        let initial = self.initialize(rng)?;
        let baseline = self.aggregate(&initial, 0);
        let baseline_consumption = initial.market.consumption;

        let mut population = apply_wage_shock(initial, shock, self.reference);
        let cost_change = SectorTable::from_fn(|key| shock.sector_cost_change(key, self.reference));
        let mut states = Vec::with_capacity(periods);

        for t in 0..periods {
            let ctx = StepContext {
                period: t,
                cost_change: cost_change.clone(),
                shock_magnitude: shock.labor_cost_change(&self.reference.baseline),
                mean_cost_change: shock.mean_cost_change(self.reference),
                labor_demand_elasticity: shock.parameters.labor_demand_elasticity.abs(),
                include_anticipations: self.include_anticipations,
                baseline_consumption,
            };
            population = step(population, &ctx, self.reference, &self.params, rng);

            let state = self.aggregate(&population, t + 1);
            state.ensure_finite()?;
            debug!(
                target: "labor_shock::population",
                period = t + 1,
                unemployment = population.market.unemployment_rate,
                "period complete"
            );
            states.push(state);
        }

        Ok(AgentRun {
            baseline,
            trajectory: Trajectory::new(states),
            population,
            household_weight: self.household_weight(),
        })
    }

    pub fn initialize(&self, rng: &mut impl Rng) -> Result<Population, SimulationError> {
        let reference = self.reference;
        let baseline = &reference.baseline;
        let weights = reference.employment_weights();
        let sector_options: Vec<(SectorKey, f64)> = weights.iter().map(|(k, &w)| (k, w)).collect();
        let dispersion = Normal::new(1.0, self.params.wage_dispersion)
            .map_err(|e| SimulationError::invalid(format!("wage dispersion: {e}")))?;

        let households: Vec<HouseholdAgent> = (0..self.params.households)
            .map(|id| {
                let sector = sample_categorical(&sector_options, SectorKey::Retail, rng);

                let ages = reference.age[sector];
                let band = sample_categorical(
                    &[
                        (AgeBand::Young, ages.young),
                        (AgeBand::Prime, ages.prime()),
                        (AgeBand::Senior, ages.senior),
                    ],
                    AgeBand::Prime,
                    rng,
                );
                let (low, high) = band.range();
                let age = rng.gen_range(low..high);

                let q = reference.qualification[sector];
                let qualification = sample_categorical(
                    &[
                        (Qualification::Unqualified, q.unqualified),
                        (Qualification::Qualified, q.qualified),
                        (Qualification::HighlyQualified, q.highly_qualified),
                    ],
                    Qualification::Qualified,
                    rng,
                );

                let monthly = reference.sector(sector).average_wage() / MONTHS;
                let experience = 1.0 + (age - 25.0).max(0.0) * 0.01;
                let noise = dispersion.sample(rng).clamp(0.85, 1.15);
                let wage = monthly * qualification.wage_multiplier() * experience * noise;

                let household = HouseholdAgent {
                    id,
                    age,
                    qualification,
                    sector,
                    wage,
                    base_wage: wage,
                    smoothed_wage: wage,
                    employed: rng.gen::<f64>() >= baseline.unemployment_rate,
                    savings: wage * 3.0 * rng.gen::<f64>(),
                    consumption: 0.0,
                    sector_moves: 0,
                };
                let consumed =
                    household.consume(baseline.inflation, self.params.propensity_to_consume);
                HouseholdAgent {
                    savings: household.savings,
                    smoothed_wage: household.smoothed_wage,
                    ..consumed
                }
            })
            .collect();

        let size_options: Vec<(SizeClass, f64)> =
            SizeClass::all().into_iter().map(|s| (s, s.population_share())).collect();
        let drawn: Vec<(SectorKey, SizeClass)> = (0..self.params.firms)
            .map(|_| {
                let sector = sample_categorical(&sector_options, SectorKey::Retail, rng);
                let size = sample_categorical(&size_options, SizeClass::Small, rng);
                (sector, size)
            })
            .collect();

        let mut size_totals = SectorTable::<f64>::default();
        for &(sector, size) in &drawn {
            size_totals[sector] += size.weight();
        }
        let mut employed_totals = SectorTable::<f64>::default();
        for h in households.iter().filter(|h| h.employed) {
            employed_totals[h.sector] += 1.0;
        }
        for (key, &total) in size_totals.iter() {
            if total == 0.0 && reference.sector(key).employment > 0.0 {
                warn!(
                    target: "labor_shock::population",
                    sector = key.name(),
                    "no firm drawn for sector"
                );
            }
        }

        let firms = drawn
            .into_iter()
            .enumerate()
            .map(|(id, (sector, size))| {
                let share = ratio_or_zero(size.weight(), size_totals[sector]);
                let s = reference.sector(sector);
                FirmAgent {
                    id,
                    sector,
                    size,
                    production: s.value_added * share,
                    base_production: s.value_added * share,
                    employees: employed_totals[sector] * share,
                    base_employees: employed_totals[sector] * share,
                    capital: s.capital() * share,
                    base_capital: s.capital() * share,
                    price: 1.0,
                    hiring_backlog: 0.0,
                    separation_backlog: 0.0,
                }
            })
            .collect();

        let mut population = Population {
            households,
            firms,
            market: MarketConditions {
                unemployment_rate: 0.0,
                inflation: baseline.inflation,
                average_wage: 0.0,
                average_price: 1.0,
                consumption: 0.0,
                investment: 0.0,
                expected_growth: baseline.growth_trend,
                expected_inflation: baseline.inflation,
            },
        };
        population.market = market_conditions(&population, 1.0, population.market, reference);
        Ok(population)
    }

    /// The population's economy-wide snapshot.
    pub fn aggregate(&self, population: &Population, period: usize) -> SimulationState {
        let reference = self.reference;
        let base = SimulationState::baseline(reference);
        let weight = self.household_weight();

        let mut employed = SectorTable::<f64>::default();
        let mut wage_sums = SectorTable::<f64>::default();
        for h in population.households.iter().filter(|h| h.employed) {
            employed[h.sector] += 1.0;
            wage_sums[h.sector] += h.wage;
        }

        let mut production = SectorTable::<f64>::default();
        let mut capital = SectorTable::<f64>::default();
        let mut price_weighted = SectorTable::<f64>::default();
        let mut headcount = SectorTable::<f64>::default();
        for f in &population.firms {
            production[f.sector] += f.production;
            capital[f.sector] += f.capital;
            price_weighted[f.sector] += f.price * f.employees;
            headcount[f.sector] += f.employees;
        }

        let sectors = SectorTable::from_fn(|key| SectorState {
            production: production[key],
            employment: employed[key] * weight,
            capital: capital[key],
            wage: ratio_or_zero(wage_sums[key], employed[key]) * MONTHS,
            price: if headcount[key] > 0.0 { price_weighted[key] / headcount[key] } else { 1.0 },
            productivity: 1.0,
        });

        let market = &population.market;
        let total_employed = employed.sum();
        let raise: f64 = population
            .households
            .iter()
            .filter(|h| h.employed)
            .map(|h| ratio_or_zero(h.wage, h.base_wage) - 1.0)
            .sum();

        SimulationState {
            period,
            converged: true,
            sectors,
            gdp: production.sum(),
            consumption: market.consumption * MONTHS * weight,
            investment: base.investment + market.investment,
            government: base.government,
            exports: base.exports,
            imports: base.imports,
            total_employment: total_employed * weight,
            unemployment_rate: market.unemployment_rate,
            inflation: market.inflation,
            interest_rate: base.interest_rate,
            anticipations: Anticipations {
                inflation: market.expected_inflation,
                growth: market.expected_growth,
                wages: base.anticipations.wages + ratio_or_zero(raise, total_employed),
            },
        }
    }
}

/// Rescales the monthly pay of the lowest-paid `sector_affected_share` of each
/// sector. A wage shock raises them by the shock and the next band of the same
/// size by its diffused share; an hours cut scales them by the share of pay kept.
pub fn apply_wage_shock(
    population: Population,
    shock: &ShockSpecification,
    reference: &ReferenceData,
) -> Population {
    let (affected_factor, spill_factor) = match shock.kind {
        ShockKind::Wage => (
            1.0 + shock.magnitude,
            1.0 + shock.magnitude * shock.parameters.wage_diffusion,
        ),
        ShockKind::Hours => (shock.parameters.pay_maintained, 1.0),
        ShockKind::Tax => (1.0, 1.0),
    };
    if affected_factor == 1.0 && spill_factor == 1.0 {
        return population;
    }

    let Population {
        mut households,
        firms,
        market,
    } = population;

    for key in SectorKey::ALL {
        let mut members: Vec<usize> = households
            .iter()
            .enumerate()
            .filter(|(_, h)| h.sector == key)
            .map(|(i, _)| i)
            .collect();
        members.sort_by(|&a, &b| households[a].wage.total_cmp(&households[b].wage));

        let affected =
            (shock.sector_affected_share(key, reference) * members.len() as f64).round() as usize;
        let affected = affected.min(members.len());
        let spill_end = (2 * affected).min(members.len());

        for &i in &members[..affected] {
            households[i].wage *= affected_factor;
        }
        for &i in &members[affected..spill_end] {
            households[i].wage *= spill_factor;
        }
    }

    Population {
        households,
        firms,
        market,
    }
}

/// One period transition.
pub fn step(
    population: Population,
    ctx: &StepContext,
    reference: &ReferenceData,
    params: &AgentParams,
    rng: &mut impl Rng,
) -> Population {
    let baseline = &reference.baseline;
    let t = ctx.period as f64;
    let Population {
        mut households,
        mut firms,
        market,
    } = population;

    // 1. expectations
    let consumption_gap = ratio_or_zero(market.consumption, ctx.baseline_consumption) - 1.0;
    let (expected_demand_gap, competitor_price, expected_inflation) = if ctx.include_anticipations {
        (
            consumption_gap * (-0.1 * t).exp(),
            market.average_price * (1.0 + ctx.mean_cost_change * 0.4 * (1.0 - t / 20.0).max(0.0)),
            baseline.inflation + ctx.mean_cost_change * 0.3 * (-0.15 * t).exp(),
        )
    } else {
        (0.0, market.average_price, market.inflation)
    };
    let expected_growth = baseline.growth_trend + expected_demand_gap;

    // 2. decisions
    let decisions: Vec<_> = firms
        .iter()
        .map(|firm| {
            let sector = reference.sector(firm.sector);
            decide(
                firm,
                &FirmContext {
                    cost_change: ctx.cost_change[firm.sector],
                    shock_magnitude: ctx.shock_magnitude,
                    wage_share: sector.wage_share,
                    cost_sensitivity: sector.cost_sensitivity,
                    labor_demand_elasticity: ctx.labor_demand_elasticity,
                    demand_feedback: params.demand_feedback,
                    expected_demand_gap,
                    expected_growth,
                    competitor_price,
                    interest_rate: baseline.interest_rate,
                },
            )
        })
        .collect();

    // 3. matching
    let mut employed_by_sector: Vec<Vec<usize>> = vec![Vec::new(); SECTOR_COUNT];
    let mut unemployed = Vec::new();
    for (i, h) in households.iter().enumerate() {
        if h.employed {
            employed_by_sector[h.sector.index()].push(i);
        } else {
            unemployed.push(i);
        }
    }
    let mut next_unemployed = 0;
    let mut investment = 0.0;

    for (firm, decision) in firms.iter_mut().zip(&decisions) {
        let pending =
            firm.separation_backlog + decision.separations + decision.automation_separations;
        let requested = pending.floor().max(0.0) as usize;
        firm.separation_backlog = pending - requested as f64;

        let pool = &mut employed_by_sector[firm.sector.index()];
        let fired = requested.min(pool.len());
        if fired > 0 {
            let mut picks = index::sample(rng, pool.len(), fired).into_vec();
            picks.sort_unstable_by(|a, b| b.cmp(a));
            for pos in picks {
                let h = pool.swap_remove(pos);
                households[h].employed = false;
            }
        }

        let pending = firm.hiring_backlog + decision.hires;
        let requested = pending.floor().max(0.0) as usize;
        firm.hiring_backlog = pending - requested as f64;

        let hired = requested.min(unemployed.len() - next_unemployed);
        for &h in &unemployed[next_unemployed..next_unemployed + hired] {
            let household = &mut households[h];
            household.employed = true;
            if household.sector != firm.sector {
                household.sector = firm.sector;
                household.sector_moves += 1;
            }
            pool.push(h);
        }
        next_unemployed += hired;

        firm.employees = (firm.employees - fired as f64 + hired as f64).max(0.0);
        firm.price = decision.price;
        firm.capital += decision.investment;
        firm.production = firm.output(params.capital_share);
        investment += decision.investment;
    }

    // 4. consumption
    let households = households
        .iter()
        .map(|h| h.consume(expected_inflation, params.propensity_to_consume))
        .collect();

    // 5. market
    let mut next = Population {
        households,
        firms,
        market,
    };
    let previous = MarketConditions {
        investment,
        expected_growth,
        expected_inflation,
        ..market
    };
    next.market = market_conditions(&next, market.average_price, previous, reference);
    next
}

fn market_conditions(
    population: &Population,
    previous_price: f64,
    previous: MarketConditions,
    reference: &ReferenceData,
) -> MarketConditions {
    let n = population.households.len() as f64;
    let employed: Vec<&HouseholdAgent> =
        population.households.iter().filter(|h| h.employed).collect();

    let headcount: f64 = population.firms.iter().map(|f| f.employees).sum();
    let average_price = if headcount > 0.0 {
        population.firms.iter().map(|f| f.price * f.employees).sum::<f64>() / headcount
    } else {
        previous_price
    };

    let price_change = ratio_or_zero(average_price, previous_price) - 1.0;
    MarketConditions {
        unemployment_rate: 1.0 - ratio_or_zero(employed.len() as f64, n),
        inflation: reference.baseline.inflation + price_change,
        average_wage: ratio_or_zero(employed.iter().map(|h| h.wage).sum(), employed.len() as f64),
        average_price,
        consumption: population.households.iter().map(|h| h.consumption).sum(),
        ..previous
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WagePercentiles {
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupEmployment {
    pub group: String,
    pub households: usize,
    pub employment_rate: f64,
    pub average_wage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub wages: WagePercentiles,
    pub gini: f64,
    pub by_age: Vec<GroupEmployment>,
    pub by_qualification: Vec<GroupEmployment>,
    pub by_sector: Vec<GroupEmployment>,
    pub mobility_rate: f64,
    pub labor_supply_index: f64,
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() as f64 - 1.0) * p).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Gini coefficient of non-negative values sorted ascending.
pub fn gini(sorted: &[f64]) -> f64 {
    let n = sorted.len() as f64;
    let total: f64 = sorted.iter().sum();
    if sorted.is_empty() || total <= 0.0 {
        return 0.0;
    }
    let ranked: f64 = sorted.iter().enumerate().map(|(i, x)| (i as f64 + 1.0) * x).sum();
    2.0 * ranked / (n * total) - (n + 1.0) / n
}

fn group_employment<'h>(
    name: &str,
    members: impl Iterator<Item = &'h HouseholdAgent>,
) -> GroupEmployment {
    let (mut count, mut employed, mut wages) = (0usize, 0usize, 0.0);
    for h in members {
        count += 1;
        if h.employed {
            employed += 1;
            wages += h.wage;
        }
    }
    if count == 0 {
        debug!(target: "labor_shock::population", group = name, "empty group, rates set to 0");
    }
    GroupEmployment {
        group: name.to_string(),
        households: count,
        employment_rate: ratio_or_zero(employed as f64, count as f64),
        average_wage: ratio_or_zero(wages, employed as f64),
    }
}

impl Population {
    pub fn distribution(&self) -> DistributionSummary {
        let mut wages: Vec<f64> = self
            .households
            .iter()
            .filter(|h| h.employed)
            .map(|h| h.wage)
            .collect();
        wages.sort_by(|a, b| a.total_cmp(b));

        let households = || self.households.iter();
        let by_age = AgeBand::all()
            .into_iter()
            .map(|band| {
                group_employment(band.name(), households().filter(|h| h.age_band() == band))
            })
            .collect();
        let by_qualification = Qualification::all()
            .into_iter()
            .map(|q| group_employment(q.name(), households().filter(|h| h.qualification == q)))
            .collect();
        let by_sector = SectorKey::all()
            .into_iter()
            .map(|key| group_employment(key.name(), households().filter(|h| h.sector == key)))
            .collect();

        let movers = self.households.iter().filter(|h| h.sector_moves > 0).count();
        let employed: Vec<&HouseholdAgent> =
            self.households.iter().filter(|h| h.employed).collect();
        let supply: f64 = employed
            .iter()
            .map(|h| 1.0 + h.labor_supply_elasticity() * (ratio_or_zero(h.wage, h.base_wage) - 1.0))
            .sum();

        DistributionSummary {
            wages: WagePercentiles {
                p10: percentile(&wages, 0.10),
                p25: percentile(&wages, 0.25),
                p50: percentile(&wages, 0.50),
                p75: percentile(&wages, 0.75),
                p90: percentile(&wages, 0.90),
            },
            gini: gini(&wages),
            by_age,
            by_qualification,
            by_sector,
            mobility_rate: ratio_or_zero(movers as f64, self.households.len() as f64),
            labor_supply_index: ratio_or_zero(supply, employed.len() as f64),
        }
    }
}
