use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::form::{self, FormChoice, FormSubmission};

/// Snapshot of every answer captured for one underwriting assessment.
///
/// Deserializes from the multi-step form payload (`basic_info`, `additional_info`, ...) and
/// serializes as eight named sections. Every field is optional; malformed values are dropped
/// rather than rejected so scoring can always proceed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "FormSubmission")]
pub struct ApplicantRecord {
    pub assessed_on: Option<NaiveDate>,
    pub personal: PersonalSection,
    pub lifestyle: LifestyleSection,
    pub financial: FinancialSection,
    pub medical: MedicalSection,
    pub preferences: PreferencesSection,
    pub dependents: DependentsSection,
    pub insurance_history: InsuranceHistorySection,
    pub coverage: CoverageSection,
}

impl ApplicantRecord {
    /// Applicant age, falling back to whole years between date of birth and the assessment date.
    pub fn age(&self) -> Option<f64> {
        self.personal.age.filter(|age| *age >= 0.0).or_else(|| {
            let dob = self.personal.date_of_birth?;
            let on = self.assessed_on?;
            on.years_since(dob).map(f64::from)
        })
    }

    /// Body mass index from the lifestyle answer, the medical answer, or height and weight.
    pub fn bmi(&self) -> Option<f64> {
        self.lifestyle
            .bmi
            .filter(|bmi| *bmi > 0.0)
            .or(self.medical.bmi.filter(|bmi| *bmi > 0.0))
            .or_else(|| self.medical.derived_bmi())
    }

    pub fn applicant_name(&self) -> Option<&str> {
        self.personal.full_name.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalSection {
    #[serde(deserialize_with = "form::text")]
    pub full_name: Option<String>,
    #[serde(deserialize_with = "form::number")]
    pub age: Option<f64>,
    #[serde(deserialize_with = "form::date")]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(deserialize_with = "form::text")]
    pub gender: Option<String>,
    #[serde(deserialize_with = "form::choice")]
    pub marital_status: Option<MaritalStatus>,
    #[serde(deserialize_with = "form::text")]
    pub city: Option<String>,
    #[serde(deserialize_with = "form::text")]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifestyleSection {
    #[serde(deserialize_with = "form::text")]
    pub occupation: Option<String>,
    #[serde(deserialize_with = "form::text")]
    pub working_type: Option<String>,
    #[serde(deserialize_with = "form::number")]
    pub daily_steps: Option<f64>,
    #[serde(deserialize_with = "form::number")]
    pub sleep_hours: Option<f64>,
    #[serde(deserialize_with = "form::number")]
    pub bmi: Option<f64>,
    #[serde(deserialize_with = "form::choice")]
    pub smoker: Option<Answer>,
    #[serde(deserialize_with = "form::choice")]
    pub alcohol: Option<AlcoholUse>,
    #[serde(deserialize_with = "form::choice")]
    pub commute: Option<CommuteMode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialSection {
    #[serde(deserialize_with = "form::choice")]
    pub employment_status: Option<EmploymentStatus>,
    #[serde(deserialize_with = "form::number")]
    pub annual_income: Option<f64>,
    #[serde(deserialize_with = "form::number")]
    pub monthly_salary: Option<f64>,
    #[serde(deserialize_with = "form::number")]
    pub disposable_income: Option<f64>,
    #[serde(deserialize_with = "form::number")]
    pub existing_emis: Option<f64>,
    #[serde(deserialize_with = "form::number")]
    pub bnpl_obligations: Option<f64>,
    #[serde(deserialize_with = "form::number")]
    pub monthly_expenses: Option<f64>,
}

impl FinancialSection {
    fn salary(&self) -> Option<f64> {
        self.monthly_salary.filter(|salary| *salary > 0.0)
    }

    /// Share of the monthly salary left after expenses and repayments, as a percentage.
    pub fn disposable_share(&self) -> Option<f64> {
        let salary = self.salary()?;
        let disposable = match (self.disposable_income, self.monthly_expenses) {
            (Some(disposable), _) => disposable,
            (None, Some(expenses)) => {
                salary
                    - expenses
                    - self.existing_emis.unwrap_or(0.0)
                    - self.bnpl_obligations.unwrap_or(0.0)
            }
            (None, None) => return None,
        };
        Some((disposable / salary * 100.0).max(0.0))
    }

    /// Monthly repayments (EMIs plus buy-now-pay-later) as a percentage of salary.
    pub fn emi_share(&self) -> Option<f64> {
        let salary = self.salary()?;
        let repayments = match (self.existing_emis, self.bnpl_obligations) {
            (None, None) => return None,
            (emis, bnpl) => emis.unwrap_or(0.0) + bnpl.unwrap_or(0.0),
        };
        Some((repayments / salary * 100.0).max(0.0))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MedicalSection {
    #[serde(deserialize_with = "form::text")]
    pub pre_existing_conditions: Option<String>,
    #[serde(deserialize_with = "form::date")]
    pub last_checkup: Option<NaiveDate>,
    #[serde(deserialize_with = "form::text")]
    pub allergies: Option<String>,
    #[serde(deserialize_with = "form::number")]
    pub height_cm: Option<f64>,
    #[serde(deserialize_with = "form::number")]
    pub weight_kg: Option<f64>,
    #[serde(deserialize_with = "form::number")]
    pub bmi: Option<f64>,
}

impl MedicalSection {
    pub fn derived_bmi(&self) -> Option<f64> {
        let height_m = self.height_cm.filter(|height| *height > 0.0)? / 100.0;
        let weight = self.weight_kg.filter(|weight| *weight > 0.0)?;
        Some(weight / (height_m * height_m))
    }

    /// Months (30-day periods) between the last checkup and the assessment date.
    pub fn months_since_checkup(&self, assessed_on: Option<NaiveDate>) -> Option<f64> {
        let checkup = self.last_checkup?;
        let on = assessed_on?;
        Some((on - checkup).num_days() as f64 / 30.0)
    }

    /// Declared conditions, ignoring "none"-style answers.
    pub fn conditions(&self) -> Option<&str> {
        self.pre_existing_conditions
            .as_deref()
            .filter(|value| !form::is_none_answer(value))
    }

    /// Individual allergy entries from the comma separated answer.
    pub fn allergy_list(&self) -> Vec<&str> {
        self.allergies
            .as_deref()
            .filter(|value| !form::is_none_answer(value))
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesSection {
    #[serde(deserialize_with = "form::choice")]
    pub budget_flexibility: Option<Flexibility>,
    #[serde(deserialize_with = "form::choice")]
    pub riders: Option<Answer>,
    #[serde(deserialize_with = "form::choice")]
    pub flexible_deductibles: Option<Answer>,
    #[serde(deserialize_with = "form::choice")]
    pub risk_tolerance: Option<RiskTolerance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DependentsSection {
    pub declared_count: Option<f64>,
    pub dependents: Vec<Dependent>,
}

impl DependentsSection {
    /// Declared dependent count, or the size of the roster when no count was given.
    pub fn count(&self) -> Option<f64> {
        self.declared_count
            .filter(|count| *count >= 0.0)
            .or_else(|| (!self.dependents.is_empty()).then(|| self.dependents.len() as f64))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dependent {
    #[serde(deserialize_with = "form::text")]
    pub relationship: Option<String>,
    #[serde(deserialize_with = "form::number")]
    pub age: Option<f64>,
    #[serde(deserialize_with = "form::choice")]
    pub dependency: Option<DependencyLevel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InsuranceHistorySection {
    pub has_life_insurance: Option<Answer>,
    pub has_health_insurance: Option<Answer>,
    pub lapsed_policies: Option<Answer>,
    pub claim_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageSection {
    pub life_cover: Option<f64>,
    pub health_cover: Option<f64>,
}

/// Risk bucket a categorical answer falls into; points per bucket come from the rubric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Yes/no form answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Answer {
    Yes,
    No,
    Unrecognized,
}

impl Answer {
    /// Risk when answering "yes" is the adverse outcome (smoking, lapsed policies).
    pub const fn yes_is_adverse(self) -> RiskLevel {
        match self {
            Answer::Yes => RiskLevel::High,
            Answer::No => RiskLevel::Low,
            Answer::Unrecognized => RiskLevel::Medium,
        }
    }

    /// Risk when answering "no" is the adverse outcome (existing cover, riders).
    pub const fn no_is_adverse(self) -> RiskLevel {
        match self {
            Answer::Yes => RiskLevel::Low,
            Answer::No => RiskLevel::High,
            Answer::Unrecognized => RiskLevel::Medium,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Answer::Yes => "yes",
            Answer::No => "no",
            Answer::Unrecognized => "unrecognized",
        }
    }
}

impl FormChoice for Answer {
    fn from_form(raw: &str) -> Self {
        match raw {
            "yes" | "y" | "true" | "1" => Answer::Yes,
            "no" | "n" | "false" | "0" | "none" | "never" => Answer::No,
            _ => Answer::Unrecognized,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    Single,
    Married,
    Divorced,
    Widowed,
    Unrecognized,
}

impl MaritalStatus {
    pub const fn risk_level(self) -> RiskLevel {
        match self {
            MaritalStatus::Single => RiskLevel::High,
            MaritalStatus::Married | MaritalStatus::Divorced | MaritalStatus::Widowed => {
                RiskLevel::Low
            }
            MaritalStatus::Unrecognized => RiskLevel::Medium,
        }
    }
}

impl FormChoice for MaritalStatus {
    fn from_form(raw: &str) -> Self {
        match raw {
            "single" | "unmarried" | "never married" => MaritalStatus::Single,
            "married" => MaritalStatus::Married,
            "divorced" | "separated" => MaritalStatus::Divorced,
            "widowed" | "widow" | "widower" => MaritalStatus::Widowed,
            _ => MaritalStatus::Unrecognized,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlcoholUse {
    Never,
    Occasional,
    Frequent,
    Unrecognized,
}

impl AlcoholUse {
    pub const fn risk_level(self) -> RiskLevel {
        match self {
            AlcoholUse::Never => RiskLevel::Low,
            AlcoholUse::Occasional | AlcoholUse::Unrecognized => RiskLevel::Medium,
            AlcoholUse::Frequent => RiskLevel::High,
        }
    }
}

impl FormChoice for AlcoholUse {
    fn from_form(raw: &str) -> Self {
        if raw.contains("regular") || raw.contains("daily") || raw.contains("frequent") {
            AlcoholUse::Frequent
        } else if raw.contains("occasional") || raw.contains("social") {
            AlcoholUse::Occasional
        } else if matches!(raw, "never" | "no" | "none" | "non-drinker" | "teetotal") {
            AlcoholUse::Never
        } else {
            AlcoholUse::Unrecognized
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommuteMode {
    HeavyVehicle,
    TwoWheeler,
    Car,
    PublicTransport,
    Walk,
    Unrecognized,
}

impl CommuteMode {
    pub const fn risk_level(self) -> RiskLevel {
        match self {
            CommuteMode::HeavyVehicle | CommuteMode::TwoWheeler => RiskLevel::High,
            CommuteMode::Car | CommuteMode::PublicTransport | CommuteMode::Walk => RiskLevel::Low,
            CommuteMode::Unrecognized => RiskLevel::Medium,
        }
    }
}

impl FormChoice for CommuteMode {
    fn from_form(raw: &str) -> Self {
        if raw.contains("heavy") || raw.contains("truck") {
            CommuteMode::HeavyVehicle
        } else if raw.contains("bike")
            || raw.contains("motor")
            || raw.contains("scooter")
            || raw.contains("wheeler")
        {
            CommuteMode::TwoWheeler
        } else if raw.contains("car") {
            CommuteMode::Car
        } else if raw.contains("public")
            || raw.contains("bus")
            || raw.contains("train")
            || raw.contains("metro")
        {
            CommuteMode::PublicTransport
        } else if raw.contains("walk") || raw.contains("remote") || raw.contains("home") {
            CommuteMode::Walk
        } else {
            CommuteMode::Unrecognized
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentStatus {
    Salaried,
    SelfEmployed,
    Retired,
    Unemployed,
    Unrecognized,
}

impl EmploymentStatus {
    pub const fn risk_level(self) -> RiskLevel {
        match self {
            EmploymentStatus::Salaried | EmploymentStatus::Retired => RiskLevel::Low,
            EmploymentStatus::SelfEmployed | EmploymentStatus::Unrecognized => RiskLevel::Medium,
            EmploymentStatus::Unemployed => RiskLevel::High,
        }
    }
}

impl FormChoice for EmploymentStatus {
    fn from_form(raw: &str) -> Self {
        if raw.contains("unemployed") {
            EmploymentStatus::Unemployed
        } else if raw.contains("freelanc")
            || raw.contains("business")
            || raw.contains("self")
            || raw.contains("contract")
        {
            EmploymentStatus::SelfEmployed
        } else if raw.contains("retired") {
            EmploymentStatus::Retired
        } else if raw.contains("salaried") || raw.contains("employed") {
            EmploymentStatus::Salaried
        } else {
            EmploymentStatus::Unrecognized
        }
    }
}

/// Budget flexibility declared on the preferences step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flexibility {
    High,
    Moderate,
    Low,
    Unrecognized,
}

impl Flexibility {
    pub const fn risk_level(self) -> RiskLevel {
        match self {
            Flexibility::High => RiskLevel::Low,
            Flexibility::Moderate | Flexibility::Unrecognized => RiskLevel::Medium,
            Flexibility::Low => RiskLevel::High,
        }
    }
}

impl FormChoice for Flexibility {
    fn from_form(raw: &str) -> Self {
        if raw.contains("high") {
            Flexibility::High
        } else if raw.contains("moderate") || raw.contains("medium") {
            Flexibility::Moderate
        } else if raw.contains("low") || raw.contains("none") {
            Flexibility::Low
        } else {
            Flexibility::Unrecognized
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Conservative,
    Moderate,
    Aggressive,
    Unrecognized,
}

impl RiskTolerance {
    pub const fn risk_level(self) -> RiskLevel {
        match self {
            RiskTolerance::Conservative => RiskLevel::Low,
            RiskTolerance::Moderate | RiskTolerance::Unrecognized => RiskLevel::Medium,
            RiskTolerance::Aggressive => RiskLevel::High,
        }
    }
}

impl FormChoice for RiskTolerance {
    fn from_form(raw: &str) -> Self {
        if raw.contains("conservative") || raw == "low" {
            RiskTolerance::Conservative
        } else if raw.contains("moderate") || raw.contains("balanced") || raw == "medium" {
            RiskTolerance::Moderate
        } else if raw.contains("aggressive") || raw == "high" {
            RiskTolerance::Aggressive
        } else {
            RiskTolerance::Unrecognized
        }
    }
}

/// How much a dependent relies on the applicant's income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyLevel {
    Full,
    Partial,
    Minimal,
    Unrecognized,
}

impl DependencyLevel {
    pub const fn risk_level(self) -> RiskLevel {
        match self {
            DependencyLevel::Full => RiskLevel::High,
            DependencyLevel::Partial | DependencyLevel::Unrecognized => RiskLevel::Medium,
            DependencyLevel::Minimal => RiskLevel::Low,
        }
    }
}

impl FormChoice for DependencyLevel {
    fn from_form(raw: &str) -> Self {
        if raw.starts_with("full") || raw == "complete" {
            DependencyLevel::Full
        } else if raw.starts_with("partial") {
            DependencyLevel::Partial
        } else if raw.starts_with("minimal") || raw == "low" {
            DependencyLevel::Minimal
        } else {
            DependencyLevel::Unrecognized
        }
    }
}
