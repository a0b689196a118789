mod config;
mod rules;
mod tier;

pub use config::{
    Band, BandTable, CategoryWeight, CategoryWeights, CoverageRules, DependentRules,
    FinancialRules, InsuranceHistoryRules, LevelPoints, LifestyleRules, MedicalRules,
    PersonalRules, PreferenceRules, ScoringConfig, ScoringConfigError,
};
pub use tier::{RiskTier, TierBand};

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::domain::ApplicantRecord;

/// The eight scored sections of an assessment, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringCategory {
    PersonalInformation,
    LifestyleBehavior,
    FinancialInformation,
    MedicalInformation,
    PreferencesRiskAppetite,
    DependentsInformation,
    InsuranceHistory,
    CoverageSummary,
}

impl ScoringCategory {
    pub const ALL: [ScoringCategory; 8] = [
        ScoringCategory::PersonalInformation,
        ScoringCategory::LifestyleBehavior,
        ScoringCategory::FinancialInformation,
        ScoringCategory::MedicalInformation,
        ScoringCategory::PreferencesRiskAppetite,
        ScoringCategory::DependentsInformation,
        ScoringCategory::InsuranceHistory,
        ScoringCategory::CoverageSummary,
    ];

    /// Stable name used by report renderers and the breakdown map.
    pub const fn key(self) -> &'static str {
        match self {
            ScoringCategory::PersonalInformation => "personal_information",
            ScoringCategory::LifestyleBehavior => "lifestyle_behavior",
            ScoringCategory::FinancialInformation => "financial_information",
            ScoringCategory::MedicalInformation => "medical_information",
            ScoringCategory::PreferencesRiskAppetite => "preferences_risk_appetite",
            ScoringCategory::DependentsInformation => "dependents_information",
            ScoringCategory::InsuranceHistory => "insurance_history",
            ScoringCategory::CoverageSummary => "coverage_summary",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            ScoringCategory::PersonalInformation => "Personal Information",
            ScoringCategory::LifestyleBehavior => "Lifestyle & Behavior",
            ScoringCategory::FinancialInformation => "Financial Information",
            ScoringCategory::MedicalInformation => "Medical Information",
            ScoringCategory::PreferencesRiskAppetite => "Preferences & Risk Appetite",
            ScoringCategory::DependentsInformation => "Dependents Information",
            ScoringCategory::InsuranceHistory => "Insurance History",
            ScoringCategory::CoverageSummary => "Coverage Summary",
        }
    }
}

/// Individual rubric line contributing raw points to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    Age,
    MaritalStatus,
    Location,
    Occupation,
    WorkingType,
    DailySteps,
    SleepHours,
    Smoking,
    Alcohol,
    Commute,
    EmploymentStatus,
    AnnualIncome,
    DisposableIncome,
    EmiLoad,
    PreExistingConditions,
    Bmi,
    HealthCheckup,
    Allergies,
    BudgetFlexibility,
    RidersWillingness,
    DeductibleFlexibility,
    RiskTolerance,
    DependentCount,
    DependencyLevel,
    ElderlyDependents,
    LifeInsurance,
    HealthInsurance,
    ClaimHistory,
    PolicyLapse,
    LifeCoverage,
    HealthCoverage,
}

impl RiskFactor {
    pub const fn key(self) -> &'static str {
        match self {
            RiskFactor::Age => "age",
            RiskFactor::MaritalStatus => "marital_status",
            RiskFactor::Location => "location",
            RiskFactor::Occupation => "occupation",
            RiskFactor::WorkingType => "working_type",
            RiskFactor::DailySteps => "daily_steps",
            RiskFactor::SleepHours => "sleep_hours",
            RiskFactor::Smoking => "smoking",
            RiskFactor::Alcohol => "alcohol",
            RiskFactor::Commute => "commute",
            RiskFactor::EmploymentStatus => "employment_status",
            RiskFactor::AnnualIncome => "annual_income",
            RiskFactor::DisposableIncome => "disposable_income",
            RiskFactor::EmiLoad => "emi_load",
            RiskFactor::PreExistingConditions => "pre_existing_conditions",
            RiskFactor::Bmi => "bmi",
            RiskFactor::HealthCheckup => "health_checkup",
            RiskFactor::Allergies => "allergies",
            RiskFactor::BudgetFlexibility => "budget_flexibility",
            RiskFactor::RidersWillingness => "riders_willingness",
            RiskFactor::DeductibleFlexibility => "deductible_flexibility",
            RiskFactor::RiskTolerance => "risk_tolerance",
            RiskFactor::DependentCount => "dependent_count",
            RiskFactor::DependencyLevel => "dependency_level",
            RiskFactor::ElderlyDependents => "elderly_dependents",
            RiskFactor::LifeInsurance => "life_insurance",
            RiskFactor::HealthInsurance => "health_insurance",
            RiskFactor::ClaimHistory => "claim_history",
            RiskFactor::PolicyLapse => "policy_lapse",
            RiskFactor::LifeCoverage => "life_coverage",
            RiskFactor::HealthCoverage => "health_coverage",
        }
    }
}

/// Discrete contribution to a category, kept for transparent audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorScore {
    pub factor: RiskFactor,
    pub points: f32,
    pub notes: String,
}

impl FactorScore {
    pub(crate) fn new(factor: RiskFactor, points: f32, notes: String) -> Self {
        Self {
            factor,
            points,
            notes,
        }
    }

    pub(crate) fn not_provided(factor: RiskFactor) -> Self {
        Self::new(factor, 0.0, "not provided".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: ScoringCategory,
    pub label: String,
    /// Points on the 100-point scale, never above `max_points`.
    pub points: u8,
    pub max_points: u8,
    /// Factor sum clamped to `[0, raw_cap]` before rescaling.
    pub raw_points: f32,
    pub raw_cap: f32,
    pub factors: Vec<FactorScore>,
}

/// Per-category points plus the composite total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub rubric_version: String,
    pub categories: Vec<CategoryScore>,
    pub total_score: u8,
}

impl ScoreBreakdown {
    /// Category name to points, keyed by the stable snake_case names.
    pub fn as_map(&self) -> BTreeMap<&'static str, u8> {
        self.categories
            .iter()
            .map(|category| (category.category.key(), category.points))
            .collect()
    }

    pub fn category(&self, category: ScoringCategory) -> Option<&CategoryScore> {
        self.categories
            .iter()
            .find(|entry| entry.category == category)
    }
}

/// Breakdown together with the tier it classifies into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub breakdown: ScoreBreakdown,
    pub tier: TierBand,
}

/// Stateless scorer applying one validated rubric. Cheap to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Result<Self, ScoringConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn standard() -> Self {
        Self {
            config: ScoringConfig::standard(),
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(&self, record: &ApplicantRecord) -> ScoreBreakdown {
        let categories: Vec<CategoryScore> = ScoringCategory::ALL
            .iter()
            .map(|category| self.score_category(*category, record))
            .collect();

        let total: u16 = categories
            .iter()
            .map(|category| u16::from(category.points))
            .sum();

        ScoreBreakdown {
            rubric_version: self.config.version.clone(),
            categories,
            total_score: total.min(100) as u8,
        }
    }

    /// Tier for `total`; totals above the scale fall into the top band.
    pub fn classify(&self, total: u8) -> &TierBand {
        let total = total.min(100);
        self.config
            .tiers
            .iter()
            .find(|band| band.contains(total))
            .unwrap_or(&self.config.tiers[4])
    }

    pub fn assess(&self, record: &ApplicantRecord) -> RiskAssessment {
        let breakdown = self.score(record);
        let tier = self.classify(breakdown.total_score).clone();
        RiskAssessment { breakdown, tier }
    }

    fn score_category(&self, category: ScoringCategory, record: &ApplicantRecord) -> CategoryScore {
        let weight = self.config.weights.get(category);
        let factors = rules::score_category(category, record, &self.config);

        let raw_sum: f32 = factors.iter().map(|factor| factor.points).sum();
        let raw_points = if raw_sum.is_finite() {
            raw_sum.clamp(0.0, weight.raw_cap)
        } else {
            0.0
        };
        let scaled = (f32::from(weight.weight) * raw_points / weight.raw_cap).round();
        let points = scaled.clamp(0.0, f32::from(weight.weight)) as u8;

        trace!(
            category = category.key(),
            raw_points,
            points,
            "scored category"
        );

        CategoryScore {
            category,
            label: category.label().to_string(),
            points,
            max_points: weight.weight,
            raw_points,
            raw_cap: weight.raw_cap,
            factors,
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::standard()
    }
}
