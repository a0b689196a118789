//! Adapter for the multi-step web form payload.
//!
//! The form posts one JSON object per step and the browser sends whatever the user typed:
//! numbers as strings, booleans as "yes"/"no", dynamically numbered keys for repeated rows.
//! Everything here is lenient. A value that cannot be understood becomes `None` (or an
//! `Unrecognized` variant) instead of failing the whole payload.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::warn;

use super::domain::{
    Answer, ApplicantRecord, CoverageSection, Dependent, DependencyLevel, DependentsSection,
    FinancialSection, InsuranceHistorySection, LifestyleSection, MedicalSection,
    PersonalSection, PreferencesSection,
};

/// Categorical answer with a catch-all variant for anything unexpected.
pub trait FormChoice: Sized {
    /// `raw` is already trimmed and lowercased.
    fn from_form(raw: &str) -> Self;
}

/// One JSON object of the form whose fields may arrive under several wire names.
pub(crate) trait FormSection: DeserializeOwned + Default {
    const NAME: &'static str;
    /// `(wire name, field)` pairs folded onto the field before deserializing.
    const ALIASES: &'static [(&'static str, &'static str)] = &[];
}

/// Moves every alias onto its field. A present field value is kept, otherwise the first
/// non-empty alias in table order wins.
fn fold_aliases(fields: &mut Map<String, Value>, aliases: &[(&str, &str)]) {
    for (wire, field) in aliases {
        let Some(value) = fields.remove(*wire) else {
            continue;
        };
        if !fields.get(*field).is_some_and(is_present) {
            fields.insert((*field).to_string(), value);
        }
    }
}

/// Reads one step leniently. Only a step that is not an object falls back to defaults.
fn read_section<T: FormSection>(value: Value) -> T {
    let mut fields = match value {
        Value::Object(fields) => fields,
        Value::Null => return T::default(),
        _ => {
            warn!(section = T::NAME, "form step is not an object; treating it as unanswered");
            return T::default();
        }
    };
    fold_aliases(&mut fields, T::ALIASES);

    serde_json::from_value(Value::Object(fields)).unwrap_or_else(|err| {
        warn!(section = T::NAME, error = %err, "form step unreadable; treating it as unanswered");
        T::default()
    })
}

fn take_section<T: FormSection>(fields: &mut Map<String, Value>, key: &str) -> T {
    fields.remove(key).map(read_section).unwrap_or_default()
}

const STEP_ALIASES: &[(&str, &str)] = &[
    ("assessedOn", "assessed_on"),
    ("basicInfo", "basic_info"),
    ("personal", "basic_info"),
    ("additionalInfo", "additional_info"),
    ("lifestyle", "additional_info"),
    ("financialInfo", "financial_info"),
    ("financial", "financial_info"),
    ("medicalInfo", "medical_info"),
    ("medical", "medical_info"),
    ("preferencesInfo", "preferences_info"),
    ("preferences", "preferences_info"),
    ("familyInfo", "family_info"),
    ("dependents", "family_info"),
    ("coverageInfo", "coverage_info"),
    ("coverage", "coverage_info"),
    ("insuranceHistory", "insurance_history"),
];

/// Wire shape posted by the form collector, one key per form step.
///
/// The serialized [`ApplicantRecord`] is accepted as well: its section names are step
/// aliases and its `insurance_history` section fills the answers the coverage step omits.
#[derive(Debug, Default)]
pub(crate) struct FormSubmission {
    assessed_on: Option<NaiveDate>,
    basic_info: PersonalSection,
    additional_info: LifestyleSection,
    financial_info: FinancialSection,
    medical_info: MedicalSection,
    preferences_info: PreferencesSection,
    family_info: DependentsForm,
    coverage_info: CoverageForm,
    insurance_history: HistoryForm,
}

impl<'de> Deserialize<'de> for FormSubmission {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let mut fields = Map::<String, Value>::deserialize(deserializer)?;
        fold_aliases(&mut fields, STEP_ALIASES);

        Ok(FormSubmission {
            assessed_on: fields
                .get("assessed_on")
                .and_then(text_from_value)
                .and_then(|raw| parse_date(&raw)),
            basic_info: take_section(&mut fields, "basic_info"),
            additional_info: take_section(&mut fields, "additional_info"),
            financial_info: take_section(&mut fields, "financial_info"),
            medical_info: take_section(&mut fields, "medical_info"),
            preferences_info: take_section(&mut fields, "preferences_info"),
            family_info: take_section(&mut fields, "family_info"),
            coverage_info: take_section(&mut fields, "coverage_info"),
            insurance_history: take_section(&mut fields, "insurance_history"),
        })
    }
}

impl From<FormSubmission> for ApplicantRecord {
    fn from(form: FormSubmission) -> Self {
        let (derived_history, coverage) = form.coverage_info.split();
        ApplicantRecord {
            assessed_on: form.assessed_on,
            personal: form.basic_info,
            lifestyle: form.additional_info,
            financial: form.financial_info,
            medical: form.medical_info,
            preferences: form.preferences_info,
            dependents: form.family_info.into(),
            insurance_history: form.insurance_history.or(derived_history),
            coverage,
        }
    }
}

impl FormSection for PersonalSection {
    const NAME: &'static str = "basic_info";
    const ALIASES: &'static [(&'static str, &'static str)] = &[
        ("fullName", "full_name"),
        ("dob", "date_of_birth"),
        ("dateOfBirth", "date_of_birth"),
        ("maritalStatus", "marital_status"),
    ];
}

impl FormSection for LifestyleSection {
    const NAME: &'static str = "additional_info";
    const ALIASES: &'static [(&'static str, &'static str)] = &[
        ("workingType", "working_type"),
        ("steps_per_day", "daily_steps"),
        ("dailySteps", "daily_steps"),
        ("sleep", "sleep_hours"),
        ("sleepHours", "sleep_hours"),
        ("commuteType", "commute"),
    ];
}

impl FormSection for FinancialSection {
    const NAME: &'static str = "financial_info";
    const ALIASES: &'static [(&'static str, &'static str)] = &[
        ("employmentStatus", "employment_status"),
        ("totalCTC", "annual_income"),
        ("annualIncome", "annual_income"),
        ("monthlySalary", "monthly_salary"),
        ("disposableIncome", "disposable_income"),
        ("existingEMIs", "existing_emis"),
        ("bnplObligations", "bnpl_obligations"),
        ("monthlyExpenses", "monthly_expenses"),
    ];
}

impl FormSection for MedicalSection {
    const NAME: &'static str = "medical_info";
    const ALIASES: &'static [(&'static str, &'static str)] = &[
        ("preExistingConditions", "pre_existing_conditions"),
        ("lastCheckup", "last_checkup"),
        ("lastHealthCheckup", "last_checkup"),
        ("height", "height_cm"),
        ("weight", "weight_kg"),
    ];
}

impl FormSection for PreferencesSection {
    const NAME: &'static str = "preferences_info";
    const ALIASES: &'static [(&'static str, &'static str)] = &[
        ("budgetFlexibility", "budget_flexibility"),
        ("willingToBuyRiders", "riders"),
        ("willingnessForRiders", "riders"),
        ("flexibleDeductibles", "flexible_deductibles"),
        ("deductibleFlexibility", "flexible_deductibles"),
        ("riskTolerance", "risk_tolerance"),
    ];
}

impl FormSection for Dependent {
    const NAME: &'static str = "dependent";
    const ALIASES: &'static [(&'static str, &'static str)] = &[
        ("dependency_level", "dependency"),
        ("dependencyLevel", "dependency"),
    ];
}

/// Family step: either a `dependents` list or `dependent_<n>_<field>` keys.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct DependentsForm {
    #[serde(deserialize_with = "number")]
    num_dependents: Option<f64>,
    #[serde(deserialize_with = "rows")]
    dependents: Option<Vec<Dependent>>,
    #[serde(flatten)]
    dynamic: BTreeMap<String, Value>,
}

impl FormSection for DependentsForm {
    const NAME: &'static str = "family_info";
    const ALIASES: &'static [(&'static str, &'static str)] = &[
        ("numDependents", "num_dependents"),
        ("declared_count", "num_dependents"),
    ];
}

impl From<DependentsForm> for DependentsSection {
    fn from(form: DependentsForm) -> Self {
        let dependents = match form.dependents {
            Some(listed) if !listed.is_empty() => listed,
            _ => numbered_dependents(&form.dynamic),
        };

        DependentsSection {
            declared_count: form.num_dependents,
            dependents,
        }
    }
}

fn numbered_dependents(dynamic: &BTreeMap<String, Value>) -> Vec<Dependent> {
    let mut roster: BTreeMap<u32, Dependent> = BTreeMap::new();

    for (key, value) in dynamic {
        let Some((index, field)) = key
            .strip_prefix("dependent_")
            .and_then(|rest| rest.split_once('_'))
        else {
            continue;
        };
        let Ok(index) = index.parse::<u32>() else {
            continue;
        };

        let entry = roster.entry(index).or_default();
        match field {
            "age" => entry.age = number_from_value(value),
            "dependency" | "dependency_level" => {
                entry.dependency = text_from_value(value)
                    .map(|raw| DependencyLevel::from_form(&raw.to_ascii_lowercase()));
            }
            "relationship" => entry.relationship = text_from_value(value),
            _ => {}
        }
    }

    roster.into_values().collect()
}

/// Coverage step: carries both the insurance history and the coverage amounts.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CoverageForm {
    #[serde(deserialize_with = "choice")]
    has_life_insurance: Option<Answer>,
    #[serde(deserialize_with = "choice")]
    has_health_insurance: Option<Answer>,
    #[serde(deserialize_with = "choice")]
    has_lapsed_policies: Option<Answer>,
    #[serde(deserialize_with = "optional_list")]
    claim_history: Option<Vec<Value>>,
    #[serde(deserialize_with = "optional_list")]
    policy_lapse_history: Option<Vec<Value>>,
    #[serde(deserialize_with = "number")]
    total_life_coverage: Option<f64>,
    #[serde(deserialize_with = "number")]
    total_health_coverage: Option<f64>,
    #[serde(deserialize_with = "rows")]
    existing_life_policies: Option<Vec<PolicySummary>>,
    #[serde(deserialize_with = "rows")]
    existing_health_policies: Option<Vec<PolicySummary>>,
    #[serde(flatten)]
    dynamic: BTreeMap<String, Value>,
}

impl FormSection for CoverageForm {
    const NAME: &'static str = "coverage_info";
    const ALIASES: &'static [(&'static str, &'static str)] = &[
        ("hasLifeInsurance", "has_life_insurance"),
        ("hasHealthInsurance", "has_health_insurance"),
        ("hasLapsedPolicies", "has_lapsed_policies"),
        ("claimHistory", "claim_history"),
        ("policyLapseHistory", "policy_lapse_history"),
        ("totalLifeCoverage", "total_life_coverage"),
        ("life_cover", "total_life_coverage"),
        ("totalHealthCoverage", "total_health_coverage"),
        ("health_cover", "total_health_coverage"),
        ("existingLifePolicies", "existing_life_policies"),
        ("existingHealthPolicies", "existing_health_policies"),
    ];
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PolicySummary {
    #[serde(deserialize_with = "number")]
    sum_assured: Option<f64>,
}

impl FormSection for PolicySummary {
    const NAME: &'static str = "policy";
    const ALIASES: &'static [(&'static str, &'static str)] = &[("sumAssured", "sum_assured")];
}

/// Insurance history as the record serializes it; answers here win over the coverage step.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct HistoryForm {
    #[serde(deserialize_with = "choice")]
    has_life_insurance: Option<Answer>,
    #[serde(deserialize_with = "choice")]
    has_health_insurance: Option<Answer>,
    #[serde(deserialize_with = "choice")]
    lapsed_policies: Option<Answer>,
    #[serde(deserialize_with = "number")]
    claim_count: Option<f64>,
}

impl FormSection for HistoryForm {
    const NAME: &'static str = "insurance_history";
    const ALIASES: &'static [(&'static str, &'static str)] = &[
        ("hasLifeInsurance", "has_life_insurance"),
        ("hasHealthInsurance", "has_health_insurance"),
        ("has_lapsed_policies", "lapsed_policies"),
        ("hasLapsedPolicies", "lapsed_policies"),
        ("claimCount", "claim_count"),
    ];
}

impl HistoryForm {
    fn or(self, derived: InsuranceHistorySection) -> InsuranceHistorySection {
        InsuranceHistorySection {
            has_life_insurance: self.has_life_insurance.or(derived.has_life_insurance),
            has_health_insurance: self.has_health_insurance.or(derived.has_health_insurance),
            lapsed_policies: self.lapsed_policies.or(derived.lapsed_policies),
            claim_count: self
                .claim_count
                .filter(|count| *count >= 0.0)
                .map(|count| count as u32)
                .or(derived.claim_count),
        }
    }
}

impl CoverageForm {
    fn split(self) -> (InsuranceHistorySection, CoverageSection) {
        let claim_count = self
            .claim_history
            .as_ref()
            .map(|claims| claims.len() as u32)
            .or_else(|| {
                let amounts = self.numbered("claim_amount_");
                (!amounts.is_empty())
                    .then(|| amounts.iter().filter(|value| is_present(value)).count() as u32)
            });

        let history = InsuranceHistorySection {
            has_life_insurance: self
                .has_life_insurance
                .or_else(|| held(self.existing_life_policies.as_deref())),
            has_health_insurance: self
                .has_health_insurance
                .or_else(|| held(self.existing_health_policies.as_deref())),
            lapsed_policies: self
                .has_lapsed_policies
                .or_else(|| held(self.policy_lapse_history.as_deref())),
            claim_count,
        };

        let coverage = CoverageSection {
            life_cover: self.total_cover(
                "life_sum_",
                self.total_life_coverage,
                self.existing_life_policies.as_deref(),
            ),
            health_cover: self.total_cover(
                "health_sum_",
                self.total_health_coverage,
                self.existing_health_policies.as_deref(),
            ),
        };

        (history, coverage)
    }

    fn numbered(&self, prefix: &str) -> Vec<&Value> {
        self.dynamic
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(_, value)| value)
            .collect()
    }

    fn total_cover(
        &self,
        prefix: &str,
        declared: Option<f64>,
        policies: Option<&[PolicySummary]>,
    ) -> Option<f64> {
        let sums: Vec<f64> = self
            .numbered(prefix)
            .into_iter()
            .filter_map(number_from_value)
            .collect();
        if !sums.is_empty() {
            return Some(sums.iter().sum());
        }

        declared.or_else(|| {
            let assured: Vec<f64> = policies?
                .iter()
                .filter_map(|policy| policy.sum_assured)
                .collect();
            (!assured.is_empty()).then(|| assured.iter().sum())
        })
    }
}

fn held<T>(rows: Option<&[T]>) -> Option<Answer> {
    rows.map(|rows| if rows.is_empty() { Answer::No } else { Answer::Yes })
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(raw) => !raw.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// True for answers that mean "nothing to declare".
pub(crate) fn is_none_answer(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "" | "none" | "no" | "nil" | "n/a" | "na"
    )
}

pub(crate) fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value))
}

pub(crate) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(text_from_value(&value))
}

pub(crate) fn choice<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FormChoice,
{
    let value = Value::deserialize(deserializer)?;
    Ok(text_from_value(&value).map(|raw| T::from_form(&raw.to_ascii_lowercase())))
}

pub(crate) fn date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(text_from_value(&value).and_then(|raw| parse_date(&raw)))
}

/// Array of step-shaped objects; entries that are not objects are skipped.
pub(crate) fn rows<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: FormSection,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter(Value::is_object)
                .map(read_section)
                .collect(),
        ),
        _ => None,
    })
}

pub(crate) fn optional_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        ),
        _ => None,
    })
}

pub(crate) fn number_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => parse_number(raw),
        _ => None,
    }
    .filter(|number| number.is_finite())
}

pub(crate) fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(raw) => {
            let trimmed = raw.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Parses "72", "9,50,000", "₹ 40000", "6 hours" and the lower end of "7-8 hours".
fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('₹')
        .chars()
        .filter(|ch| *ch != ',' && *ch != '_')
        .collect();
    let cleaned = cleaned.trim();

    cleaned
        .parse::<f64>()
        .ok()
        .or_else(|| cleaned.split_whitespace().next()?.parse::<f64>().ok())
        .or_else(|| leading_number(cleaned))
}

fn leading_number(raw: &str) -> Option<f64> {
    let end = raw
        .find(|ch: char| !(ch.is_ascii_digit() || ch == '.'))
        .unwrap_or(raw.len());
    raw[..end].parse::<f64>().ok()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|datetime| datetime.date_naive())
}

#[cfg(test)]
pub(crate) fn parse_number_for_tests(raw: &str) -> Option<f64> {
    parse_number(raw)
}
