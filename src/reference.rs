//! Reference Data
//!
//! Static structural tables for the ten-sector economy: sector accounts,
//! input-output coefficients, workforce demographics, substitution
//! elasticities and the baseline macro aggregates every solver starts from.
//!
//! The built-in tables (`ReferenceData::default()`) describe the French
//! economy around 2019-2024. Callers can deserialize their own tables; the
//! solvers only ever read them.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

pub const SECTOR_COUNT: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorKey {
    Agriculture,
    Manufacturing,
    Construction,
    Retail,
    Transport,
    Hospitality,
    Information,
    Finance,
    BusinessServices,
    PublicServices,
}

impl SectorKey {
    pub const ALL: [SectorKey; SECTOR_COUNT] = [
        Self::Agriculture,
        Self::Manufacturing,
        Self::Construction,
        Self::Retail,
        Self::Transport,
        Self::Hospitality,
        Self::Information,
        Self::Finance,
        Self::BusinessServices,
        Self::PublicServices,
    ];

    pub fn all() -> Vec<Self> {
        Self::ALL.to_vec()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Agriculture => "Agriculture",
            Self::Manufacturing => "Manufacturing",
            Self::Construction => "Construction",
            Self::Retail => "Retail & wholesale",
            Self::Transport => "Transport & storage",
            Self::Hospitality => "Hospitality & food",
            Self::Information => "Information & communication",
            Self::Finance => "Finance & insurance",
            Self::BusinessServices => "Business services",
            Self::PublicServices => "Public administration, education, health",
        }
    }

    /// NACE section code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Agriculture => "AZ",
            Self::Manufacturing => "C",
            Self::Construction => "F",
            Self::Retail => "G",
            Self::Transport => "H",
            Self::Hospitality => "I",
            Self::Information => "J",
            Self::Finance => "K",
            Self::BusinessServices => "MN",
            Self::PublicServices => "OPQ",
        }
    }
}

/// One value per sector, indexed by `SectorKey`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectorTable<T>(pub [T; SECTOR_COUNT]);

impl<T> SectorTable<T> {
    pub fn from_fn(mut f: impl FnMut(SectorKey) -> T) -> Self {
        Self(std::array::from_fn(|i| f(SectorKey::ALL[i])))
    }

    pub fn map<U>(&self, mut f: impl FnMut(SectorKey, &T) -> U) -> SectorTable<U> {
        SectorTable::from_fn(|key| f(key, &self[key]))
    }

    pub fn iter(&self) -> impl Iterator<Item = (SectorKey, &T)> {
        SectorKey::ALL.iter().copied().zip(self.0.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }
}

impl SectorTable<f64> {
    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }
}

impl<T: Default> Default for SectorTable<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<SectorKey> for SectorTable<T> {
    type Output = T;

    fn index(&self, key: SectorKey) -> &T {
        &self.0[key.index()]
    }
}

impl<T> IndexMut<SectorKey> for SectorTable<T> {
    fn index_mut(&mut self, key: SectorKey) -> &mut T {
        &mut self.0[key.index()]
    }
}

/// Sector accounts. Monetary amounts are annual euros.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub employment: f64,
    pub value_added: f64,
    pub wage_bill: f64,
    pub wage_share: f64,            // of value added
    pub capital_intensity: f64,     // capital stock per unit of value added
    pub capital_labor_elasticity: f64,
    pub export_share: f64,
    pub cost_sensitivity: f64,      // 0 = sheltered, 1 = fully exposed
}

impl Sector {
    /// Average annual wage per worker.
    pub fn average_wage(&self) -> f64 {
        if self.employment > 0.0 {
            self.wage_bill / self.employment
        } else {
            0.0
        }
    }

    pub fn capital(&self) -> f64 {
        self.value_added * self.capital_intensity
    }
}

/// Row = supplying sector, column = consuming sector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IoMatrix(pub SectorTable<SectorTable<f64>>);

impl IoMatrix {
    pub fn coefficient(&self, supplier: SectorKey, consumer: SectorKey) -> f64 {
        self.0[supplier][consumer]
    }

    pub fn from_rows(rows: [[f64; SECTOR_COUNT]; SECTOR_COUNT]) -> Self {
        Self(SectorTable(rows.map(SectorTable)))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgeStructure {
    pub young: f64,  // under 30
    pub senior: f64, // 55 and over
}

impl AgeStructure {
    pub fn prime(&self) -> f64 {
        1.0 - self.young - self.senior
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QualificationStructure {
    pub unqualified: f64,
    pub qualified: f64,
    pub highly_qualified: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaborSubstitution {
    pub young_senior: f64,
    pub qualified_unqualified: f64,
    pub capital_labor: f64,
}

/// Macro aggregates of the reference year.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub gdp: f64,
    pub total_employment: f64,
    pub unemployment_rate: f64,
    pub inflation: f64,
    pub inflation_target: f64,
    pub interest_rate: f64,
    pub growth_trend: f64,
    pub wage_growth: f64,
    pub median_wage: f64,           // monthly net
    pub minimum_wage_hourly: f64,
    pub minimum_wage_monthly_net: f64,
    pub minimum_wage_coverage: f64, // share of workers paid the minimum wage
    pub weekly_hours: f64,
    pub payroll: f64,
    pub employer_contribution_rate: f64,
    pub employee_contribution_rate: f64,
    pub consumption_share: f64,
    pub investment_share: f64,
    pub export_share: f64,
    pub import_share: f64,
    pub margin_rate: f64,
    pub consumption_tax_rate: f64,
    pub benefit_replacement_rate: f64,
    pub benefit_coverage: f64,
    pub keynesian_multiplier: f64,
}

impl Baseline {
    /// Public spending share that closes the expenditure identity.
    pub fn government_share(&self) -> f64 {
        1.0 - self.consumption_share - self.investment_share - self.export_share + self.import_share
    }
}

impl Default for Baseline {
    fn default() -> Self {
        Self {
            gdp: 2_950e9,
            total_employment: 29.8e6,
            unemployment_rate: 0.073,
            inflation: 0.025,
            inflation_target: 0.02,
            interest_rate: 0.025,
            growth_trend: 0.015,
            wage_growth: 0.02,
            median_wage: 2091.0,
            minimum_wage_hourly: 11.88,
            minimum_wage_monthly_net: 1426.30,
            minimum_wage_coverage: 0.107,
            weekly_hours: 35.0,
            payroll: 782e9,
            employer_contribution_rate: 0.42,
            employee_contribution_rate: 0.22,
            consumption_share: 0.54,
            investment_share: 0.23,
            export_share: 0.32,
            import_share: 0.35,
            margin_rate: 0.32,
            consumption_tax_rate: 0.15,
            benefit_replacement_rate: 0.57,
            benefit_coverage: 0.7,
            keynesian_multiplier: 1.3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub sectors: SectorTable<Sector>,
    pub io: IoMatrix,
    pub age: SectorTable<AgeStructure>,
    pub qualification: SectorTable<QualificationStructure>,
    pub minimum_wage_share: SectorTable<f64>,
    pub substitution: LaborSubstitution,
    pub baseline: Baseline,
}

impl ReferenceData {
    pub fn sector(&self, key: SectorKey) -> &Sector {
        &self.sectors[key]
    }

    /// Employment summed over the sector table.
    pub fn sector_employment(&self) -> f64 {
        self.sectors.values().map(|s| s.employment).sum()
    }

    pub fn labor_force(&self) -> f64 {
        self.sector_employment() / (1.0 - self.baseline.unemployment_rate)
    }

    pub fn total_value_added(&self) -> f64 {
        self.sectors.values().map(|s| s.value_added).sum()
    }

    pub fn employment_weights(&self) -> SectorTable<f64> {
        let total = self.sector_employment();
        self.sectors.map(|_, s| if total > 0.0 { s.employment / total } else { 0.0 })
    }

    /// Sectors whose figures force a derived metric to be skipped.
    pub fn data_quality_notes(&self) -> Vec<String> {
        let mut notes = Vec::new();
        for (key, sector) in self.sectors.iter() {
            if sector.employment <= 0.0 {
                notes.push(format!("{}: zero employment, per-worker metrics set to 0", key.name()));
            }
            if sector.value_added <= 0.0 {
                notes.push(format!("{}: zero value added, output ratios set to 0", key.name()));
            }
        }
        notes
    }
}

#[allow(clippy::too_many_arguments)]
fn sector(
    employment: f64,
    value_added: f64,
    wage_bill: f64,
    wage_share: f64,
    capital_intensity: f64,
    capital_labor_elasticity: f64,
    export_share: f64,
    cost_sensitivity: f64,
) -> Sector {
    Sector {
        employment,
        value_added,
        wage_bill,
        wage_share,
        capital_intensity,
        capital_labor_elasticity,
        export_share,
        cost_sensitivity,
    }
}

impl Default for ReferenceData {
    fn default() -> Self {
        let sectors = SectorTable([
            sector(730_000.0, 34e9, 14e9, 0.41, 2.1, 0.4, 0.18, 0.60),
            sector(3_200_000.0, 265e9, 145e9, 0.55, 1.8, 0.8, 0.42, 0.85),
            sector(1_450_000.0, 88e9, 58e9, 0.66, 0.9, 0.5, 0.05, 0.70),
            sector(3_850_000.0, 238e9, 128e9, 0.54, 1.2, 0.6, 0.12, 0.65),
            sector(1_450_000.0, 95e9, 56e9, 0.59, 1.5, 0.55, 0.22, 0.75),
            sector(1_280_000.0, 75e9, 48e9, 0.64, 0.8, 0.4, 0.15, 0.50),
            sector(890_000.0, 115e9, 72e9, 0.63, 2.5, 0.9, 0.28, 0.80),
            sector(850_000.0, 125e9, 68e9, 0.54, 3.2, 0.7, 0.18, 0.60),
            sector(4_650_000.0, 385e9, 242e9, 0.63, 1.1, 0.75, 0.32, 0.70),
            sector(8_950_000.0, 465e9, 352e9, 0.76, 0.6, 0.3, 0.02, 0.30),
        ]);

        let io = IoMatrix::from_rows([
            [0.15, 0.25, 0.01, 0.05, 0.02, 0.35, 0.01, 0.01, 0.02, 0.08],
            [0.20, 0.35, 0.45, 0.60, 0.15, 0.15, 0.10, 0.05, 0.10, 0.12],
            [0.05, 0.03, 0.02, 0.02, 0.01, 0.03, 0.08, 0.12, 0.05, 0.08],
            [0.08, 0.10, 0.05, 0.05, 0.08, 0.12, 0.05, 0.08, 0.08, 0.06],
            [0.12, 0.08, 0.05, 0.15, 0.10, 0.05, 0.08, 0.06, 0.12, 0.05],
            [0.02, 0.01, 0.01, 0.01, 0.05, 0.02, 0.02, 0.03, 0.08, 0.02],
            [0.03, 0.05, 0.02, 0.05, 0.08, 0.03, 0.15, 0.12, 0.18, 0.08],
            [0.05, 0.04, 0.03, 0.06, 0.06, 0.04, 0.08, 0.15, 0.12, 0.05],
            [0.15, 0.12, 0.20, 0.10, 0.18, 0.08, 0.25, 0.20, 0.25, 0.15],
            [0.05, 0.03, 0.02, 0.02, 0.05, 0.02, 0.05, 0.03, 0.08, 0.20],
        ]);

        let age = SectorTable(
            [
                (0.15, 0.28),
                (0.18, 0.24),
                (0.22, 0.18),
                (0.28, 0.15),
                (0.16, 0.26),
                (0.35, 0.12),
                (0.32, 0.10),
                (0.20, 0.18),
                (0.24, 0.16),
                (0.15, 0.28),
            ]
            .map(|(young, senior)| AgeStructure { young, senior }),
        );

        let qualification = SectorTable(
            [
                (0.45, 0.40, 0.15),
                (0.25, 0.50, 0.25),
                (0.35, 0.50, 0.15),
                (0.40, 0.45, 0.15),
                (0.35, 0.50, 0.15),
                (0.55, 0.35, 0.10),
                (0.10, 0.40, 0.50),
                (0.15, 0.45, 0.40),
                (0.25, 0.45, 0.30),
                (0.20, 0.50, 0.30),
            ]
            .map(|(unqualified, qualified, highly_qualified)| QualificationStructure {
                unqualified,
                qualified,
                highly_qualified,
            }),
        );

        Self {
            sectors,
            io,
            age,
            qualification,
            minimum_wage_share: SectorTable([
                0.08, 0.06, 0.10, 0.22, 0.09, 0.35, 0.02, 0.01, 0.12, 0.05,
            ]),
            substitution: LaborSubstitution {
                young_senior: 0.7,
                qualified_unqualified: 0.5,
                capital_labor: 0.8,
            },
            baseline: Baseline::default(),
        }
    }
}
