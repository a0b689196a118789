use serde::{Deserialize, Serialize};

use super::super::domain::RiskLevel;
use super::tier::{standard_tiers, RiskTier, TierBand};
use super::ScoringCategory;

/// Points awarded per risk bucket for a categorical factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelPoints {
    pub low: f32,
    pub medium: f32,
    pub high: f32,
}

impl LevelPoints {
    pub const fn new(low: f32, medium: f32, high: f32) -> Self {
        Self { low, medium, high }
    }

    pub fn points(&self, level: RiskLevel) -> f32 {
        match level {
            RiskLevel::Low => self.low,
            RiskLevel::Medium => self.medium,
            RiskLevel::High => self.high,
        }
    }

    fn is_valid(&self) -> bool {
        [self.low, self.medium, self.high]
            .iter()
            .all(|points| points.is_finite() && *points >= 0.0)
    }
}

/// Closed-open numeric interval `lower <= value < upper`; `upper: None` is unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub lower: f64,
    pub upper: Option<f64>,
    pub points: f32,
}

impl Band {
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && self.upper.map_or(true, |upper| value < upper)
    }
}

/// Contiguous bands starting at zero, the last one unbounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BandTable {
    pub bands: Vec<Band>,
}

impl BandTable {
    /// Builds contiguous bands from `(lower, points)` steps; each band ends where the next begins.
    pub fn stepped(steps: &[(f64, f32)]) -> Self {
        let bands = steps
            .iter()
            .enumerate()
            .map(|(index, &(lower, points))| Band {
                lower,
                upper: steps.get(index + 1).map(|&(next, _)| next),
                points,
            })
            .collect();
        Self { bands }
    }

    /// Points for `value`; values outside every band (negative, NaN) score zero.
    pub fn points(&self, value: f64) -> f32 {
        self.bands
            .iter()
            .find(|band| band.contains(value))
            .map_or(0.0, |band| band.points)
    }

    fn validate(&self, table: &'static str) -> Result<(), ScoringConfigError> {
        let invalid = |reason| ScoringConfigError::InvalidBands { table, reason };

        let first = self.bands.first().ok_or(invalid("no bands defined"))?;
        if first.lower != 0.0 {
            return Err(invalid("first band must start at zero"));
        }

        for pair in self.bands.windows(2) {
            if pair[0].upper != Some(pair[1].lower) {
                return Err(invalid("bands must be contiguous"));
            }
            if pair[1].lower <= pair[0].lower {
                return Err(invalid("bands must be increasing"));
            }
        }

        if self.bands.last().and_then(|band| band.upper).is_some() {
            return Err(invalid("last band must be unbounded"));
        }

        if self
            .bands
            .iter()
            .any(|band| !band.points.is_finite() || band.points < 0.0)
        {
            return Err(ScoringConfigError::InvalidPoints { table });
        }

        Ok(())
    }
}

/// Raw point cap of a category and the share of the 100-point scale it is rescaled onto.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeight {
    pub raw_cap: f32,
    pub weight: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    pub personal_information: CategoryWeight,
    pub lifestyle_behavior: CategoryWeight,
    pub financial_information: CategoryWeight,
    pub medical_information: CategoryWeight,
    pub preferences_risk_appetite: CategoryWeight,
    pub dependents_information: CategoryWeight,
    pub insurance_history: CategoryWeight,
    pub coverage_summary: CategoryWeight,
}

impl CategoryWeights {
    pub fn get(&self, category: ScoringCategory) -> CategoryWeight {
        match category {
            ScoringCategory::PersonalInformation => self.personal_information,
            ScoringCategory::LifestyleBehavior => self.lifestyle_behavior,
            ScoringCategory::FinancialInformation => self.financial_information,
            ScoringCategory::MedicalInformation => self.medical_information,
            ScoringCategory::PreferencesRiskAppetite => self.preferences_risk_appetite,
            ScoringCategory::DependentsInformation => self.dependents_information,
            ScoringCategory::InsuranceHistory => self.insurance_history,
            ScoringCategory::CoverageSummary => self.coverage_summary,
        }
    }

    pub fn total_weight(&self) -> u16 {
        ScoringCategory::ALL
            .iter()
            .map(|category| u16::from(self.get(*category).weight))
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalRules {
    pub age: BandTable,
    pub marital_status: LevelPoints,
    pub location: LevelPoints,
    /// Matched as substrings of the lowercased city answer.
    pub metro_cities: Vec<String>,
    /// Checked only when no metro entry matches. The standard rubric lists every
    /// tier-2 city as a metro too, so these only score separately under a custom rubric.
    pub tier_two_cities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifestyleRules {
    pub occupation: LevelPoints,
    pub hazardous_occupations: Vec<String>,
    pub field_occupations: Vec<String>,
    pub working_type: LevelPoints,
    pub hazardous_working_types: Vec<String>,
    pub field_working_types: Vec<String>,
    pub daily_steps: BandTable,
    pub sleep_hours: BandTable,
    pub smoking: LevelPoints,
    pub alcohol: LevelPoints,
    pub commute: LevelPoints,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRules {
    pub employment: LevelPoints,
    pub annual_income: BandTable,
    pub disposable_share: BandTable,
    pub emi_share: BandTable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalRules {
    pub conditions: LevelPoints,
    pub chronic_conditions: Vec<String>,
    pub bmi: BandTable,
    pub checkup_months: BandTable,
    /// `low` for none, `medium` for a single allergy, `high` for several.
    pub allergies: LevelPoints,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRules {
    pub budget_flexibility: LevelPoints,
    pub riders: LevelPoints,
    pub deductibles: LevelPoints,
    pub risk_tolerance: LevelPoints,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependentRules {
    pub count: BandTable,
    pub dependency: LevelPoints,
    pub dependency_cap: f32,
    pub elderly_age: f64,
    pub elderly_points: f32,
    pub elderly_cap: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceHistoryRules {
    pub life_insurance: LevelPoints,
    pub health_insurance: LevelPoints,
    pub claims: BandTable,
    pub lapses: LevelPoints,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageRules {
    /// Keyed by life cover as a multiple of annual income.
    pub life_multiple: BandTable,
    pub health_cover: BandTable,
}

/// Immutable rubric bound to a [`super::ScoringEngine`] at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub version: String,
    pub weights: CategoryWeights,
    pub personal: PersonalRules,
    pub lifestyle: LifestyleRules,
    pub financial: FinancialRules,
    pub medical: MedicalRules,
    pub preferences: PreferenceRules,
    pub dependents: DependentRules,
    pub insurance_history: InsuranceHistoryRules,
    pub coverage: CoverageRules,
    pub tiers: [TierBand; 5],
}

fn words(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

const fn weight(raw_cap: f32, weight: u8) -> CategoryWeight {
    CategoryWeight { raw_cap, weight }
}

impl ScoringConfig {
    /// Rubric v2: eight categories with raw caps 5/8/8/8/4/6/4/3, rescaled onto 100 points.
    pub fn standard() -> Self {
        Self {
            version: "v2-46".to_string(),
            weights: CategoryWeights {
                personal_information: weight(5.0, 11),
                lifestyle_behavior: weight(8.0, 17),
                financial_information: weight(8.0, 17),
                medical_information: weight(8.0, 17),
                preferences_risk_appetite: weight(4.0, 9),
                dependents_information: weight(6.0, 13),
                insurance_history: weight(4.0, 9),
                coverage_summary: weight(3.0, 7),
            },
            personal: PersonalRules {
                age: BandTable::stepped(&[(0.0, 1.0), (30.0, 2.0), (50.0, 3.0)]),
                marital_status: LevelPoints::new(0.0, 0.5, 1.0),
                location: LevelPoints::new(0.0, 0.5, 1.0),
                metro_cities: words(&[
                    "mumbai", "delhi", "bangalore", "hyderabad", "chennai", "kolkata", "pune",
                    "ahmedabad", "surat", "jaipur", "lucknow", "kanpur", "nagpur", "indore",
                    "thane", "bhopal", "visakhapatnam", "patna", "vadodara", "ghaziabad",
                    "ludhiana", "agra", "nashik", "faridabad", "meerut", "rajkot", "kalyan",
                    "vasai", "srinagar", "aurangabad", "dhanbad", "amritsar", "allahabad",
                    "ranchi", "howrah", "coimbatore", "jabalpur", "gwalior", "vijayawada",
                    "jodhpur", "madurai", "raipur", "kota", "guwahati", "chandigarh", "solapur",
                    "hubli", "bareilly", "moradabad", "gurgaon", "aligarh", "jalandhar",
                    "tiruchirappalli", "bhubaneswar", "salem", "warangal", "mira",
                    "thiruvananthapuram", "bhiwandi", "saharanpur", "guntur", "amravati",
                    "bikaner", "noida", "jamshedpur", "bhilai", "cuttack", "firozabad", "kochi",
                    "nellore", "bhavnagar", "dehradun", "durgapur", "asansol", "rourkela",
                    "bhagalpur", "mangalore", "bellary", "mysore", "tiruppur", "gulbarga",
                    "bhubaneshwar", "pimpri", "panchkula", "bathinda", "karnal", "hisar",
                    "baramula", "ambala", "vapi", "rohtak", "firozpur", "hissar", "panipat",
                    "sonipat", "yamunanagar", "kaithal", "kurukshetra", "bhiwani", "fatehabad",
                    "jind", "sirsa", "faridkot", "moga", "patiala", "sangrur", "muktsar",
                    "fazilka", "tarn taran", "kapurthala", "hoshiarpur", "nawanshahr", "rupnagar",
                    "sahibzada ajit singh nagar", "fatehgarh sahib", "gurdaspur", "pathankot",
                    "shahid bhagat singh nagar", "barnala", "mansa",
                ]),
                tier_two_cities: words(&[
                    "nagpur",
                    "indore",
                    "bhopal",
                    "lucknow",
                    "kanpur",
                    "patna",
                    "chandigarh",
                    "amritsar",
                ]),
            },
            lifestyle: LifestyleRules {
                occupation: LevelPoints::new(0.0, 1.0, 2.0),
                hazardous_occupations: words(&[
                    "driver",
                    "construction",
                    "delivery",
                    "miner",
                    "pilot",
                    "firefighter",
                    "police",
                ]),
                field_occupations: words(&["field", "onsite", "sales"]),
                working_type: LevelPoints::new(0.0, 1.0, 2.0),
                hazardous_working_types: words(&["hazardous", "driver"]),
                field_working_types: words(&["onsite", "field"]),
                daily_steps: BandTable::stepped(&[(0.0, 2.0), (5_000.0, 1.0), (10_000.0, 0.0)]),
                sleep_hours: BandTable::stepped(&[(0.0, 2.0), (5.0, 1.0), (7.0, 0.0)]),
                smoking: LevelPoints::new(0.0, 1.5, 3.0),
                alcohol: LevelPoints::new(0.0, 1.0, 2.0),
                commute: LevelPoints::new(0.0, 0.5, 1.0),
            },
            financial: FinancialRules {
                employment: LevelPoints::new(0.0, 1.0, 2.0),
                annual_income: BandTable::stepped(&[
                    (0.0, 2.0),
                    (500_000.0, 1.0),
                    (1_000_000.0, 0.0),
                ]),
                disposable_share: BandTable::stepped(&[(0.0, 2.0), (15.0, 1.0), (30.0, 0.0)]),
                emi_share: BandTable::stepped(&[(0.0, 0.0), (30.0, 1.0), (50.0, 2.0)]),
            },
            medical: MedicalRules {
                conditions: LevelPoints::new(0.0, 1.0, 2.0),
                chronic_conditions: words(&["diabetes", "heart", "cancer"]),
                bmi: BandTable::stepped(&[(0.0, 2.0), (18.5, 0.0), (25.0, 1.0), (30.0, 2.0)]),
                checkup_months: BandTable::stepped(&[(0.0, 0.0), (12.0, 1.0), (36.0, 2.0)]),
                allergies: LevelPoints::new(0.0, 0.5, 1.0),
            },
            preferences: PreferenceRules {
                budget_flexibility: LevelPoints::new(0.0, 0.5, 1.0),
                riders: LevelPoints::new(0.0, 0.5, 1.0),
                deductibles: LevelPoints::new(0.0, 0.5, 1.0),
                risk_tolerance: LevelPoints::new(0.0, 0.5, 1.0),
            },
            dependents: DependentRules {
                count: BandTable::stepped(&[(0.0, 0.0), (1.0, 1.0), (3.0, 2.0), (5.0, 3.0)]),
                dependency: LevelPoints::new(0.5, 1.0, 1.5),
                dependency_cap: 2.5,
                elderly_age: 60.0,
                elderly_points: 0.5,
                elderly_cap: 1.5,
            },
            insurance_history: InsuranceHistoryRules {
                life_insurance: LevelPoints::new(0.0, 0.5, 1.0),
                health_insurance: LevelPoints::new(0.0, 0.5, 1.0),
                claims: BandTable::stepped(&[(0.0, 0.0), (1.0, 1.0), (3.0, 2.0)]),
                lapses: LevelPoints::new(0.0, 0.5, 1.0),
            },
            coverage: CoverageRules {
                life_multiple: BandTable::stepped(&[(0.0, 2.0), (5.0, 1.0), (10.0, 0.0)]),
                health_cover: BandTable::stepped(&[
                    (0.0, 1.0),
                    (200_000.0, 0.5),
                    (500_000.0, 0.0),
                ]),
            },
            tiers: standard_tiers(),
        }
    }

    /// Rejects rubrics that could break the 0–100 invariants or leave tier gaps.
    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        let total = self.weights.total_weight();
        if total > 100 {
            return Err(ScoringConfigError::WeightsExceedScale { total });
        }

        for category in ScoringCategory::ALL {
            let cap = self.weights.get(category).raw_cap;
            if !cap.is_finite() || cap <= 0.0 {
                return Err(ScoringConfigError::InvalidCap {
                    category: category.key(),
                });
            }
        }

        let tables = [
            ("personal.age", &self.personal.age),
            ("lifestyle.daily_steps", &self.lifestyle.daily_steps),
            ("lifestyle.sleep_hours", &self.lifestyle.sleep_hours),
            ("financial.annual_income", &self.financial.annual_income),
            ("financial.disposable_share", &self.financial.disposable_share),
            ("financial.emi_share", &self.financial.emi_share),
            ("medical.bmi", &self.medical.bmi),
            ("medical.checkup_months", &self.medical.checkup_months),
            ("dependents.count", &self.dependents.count),
            ("insurance_history.claims", &self.insurance_history.claims),
            ("coverage.life_multiple", &self.coverage.life_multiple),
            ("coverage.health_cover", &self.coverage.health_cover),
        ];
        for (table, bands) in tables {
            bands.validate(table)?;
        }

        let levels = [
            ("personal.marital_status", &self.personal.marital_status),
            ("personal.location", &self.personal.location),
            ("lifestyle.occupation", &self.lifestyle.occupation),
            ("lifestyle.working_type", &self.lifestyle.working_type),
            ("lifestyle.smoking", &self.lifestyle.smoking),
            ("lifestyle.alcohol", &self.lifestyle.alcohol),
            ("lifestyle.commute", &self.lifestyle.commute),
            ("financial.employment", &self.financial.employment),
            ("medical.conditions", &self.medical.conditions),
            ("medical.allergies", &self.medical.allergies),
            ("preferences.budget_flexibility", &self.preferences.budget_flexibility),
            ("preferences.riders", &self.preferences.riders),
            ("preferences.deductibles", &self.preferences.deductibles),
            ("preferences.risk_tolerance", &self.preferences.risk_tolerance),
            ("dependents.dependency", &self.dependents.dependency),
            ("insurance_history.life_insurance", &self.insurance_history.life_insurance),
            ("insurance_history.health_insurance", &self.insurance_history.health_insurance),
            ("insurance_history.lapses", &self.insurance_history.lapses),
        ];
        for (table, points) in levels {
            if !points.is_valid() {
                return Err(ScoringConfigError::InvalidPoints { table });
            }
        }

        let dependents = &self.dependents;
        if [
            dependents.dependency_cap,
            dependents.elderly_points,
            dependents.elderly_cap,
        ]
        .iter()
        .any(|points| !points.is_finite() || *points < 0.0)
        {
            return Err(ScoringConfigError::InvalidPoints {
                table: "dependents",
            });
        }

        self.validate_tiers()
    }

    fn validate_tiers(&self) -> Result<(), ScoringConfigError> {
        let mut expected_min: u16 = 0;
        for (band, tier) in self.tiers.iter().zip(RiskTier::ALL) {
            let invalid = |reason| ScoringConfigError::InvalidTiers {
                tier: tier.label(),
                reason,
            };
            if band.tier != tier {
                return Err(invalid("tiers must be listed from very low to very high"));
            }
            if u16::from(band.min) != expected_min {
                return Err(invalid("band must start right after the previous band"));
            }
            if band.max < band.min {
                return Err(invalid("band maximum is below its minimum"));
            }
            expected_min = u16::from(band.max) + 1;
        }

        if expected_min != 101 {
            return Err(ScoringConfigError::InvalidTiers {
                tier: RiskTier::VeryHigh.label(),
                reason: "top band must end at 100",
            });
        }

        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// Raised when a rubric cannot guarantee the score invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoringConfigError {
    #[error("category weights add up to {total}, above the 100 point scale")]
    WeightsExceedScale { total: u16 },
    #[error("category {category} needs a positive raw cap")]
    InvalidCap { category: &'static str },
    #[error("band table {table} is invalid: {reason}")]
    InvalidBands {
        table: &'static str,
        reason: &'static str,
    },
    #[error("points in {table} must be finite and non-negative")]
    InvalidPoints { table: &'static str },
    #[error("tier {tier} is invalid: {reason}")]
    InvalidTiers {
        tier: &'static str,
        reason: &'static str,
    },
}
