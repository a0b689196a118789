use chrono::NaiveDate;
use serde::Serialize;

use super::super::domain::{
    ApplicantRecord, CoverageSection, DependentsSection, FinancialSection,
    InsuranceHistorySection, LifestyleSection, MedicalSection, PersonalSection,
    PreferencesSection, RiskLevel,
};
use super::config::{
    BandTable, CoverageRules, DependentRules, FinancialRules, InsuranceHistoryRules, LevelPoints,
    LifestyleRules, MedicalRules, PersonalRules, PreferenceRules, ScoringConfig,
};
use super::{FactorScore, RiskFactor, ScoringCategory};

/// Factor points for one category. Each category only sees the answers it scores.
pub(crate) fn score_category(
    category: ScoringCategory,
    record: &ApplicantRecord,
    config: &ScoringConfig,
) -> Vec<FactorScore> {
    match category {
        ScoringCategory::PersonalInformation => {
            personal(record.age(), &record.personal, &config.personal)
        }
        ScoringCategory::LifestyleBehavior => lifestyle(&record.lifestyle, &config.lifestyle),
        ScoringCategory::FinancialInformation => financial(&record.financial, &config.financial),
        ScoringCategory::MedicalInformation => medical(
            &record.medical,
            record.bmi(),
            record.assessed_on,
            &config.medical,
        ),
        ScoringCategory::PreferencesRiskAppetite => {
            preferences(&record.preferences, &config.preferences)
        }
        ScoringCategory::DependentsInformation => {
            dependents(&record.dependents, &config.dependents)
        }
        ScoringCategory::InsuranceHistory => {
            insurance_history(&record.insurance_history, &config.insurance_history)
        }
        ScoringCategory::CoverageSummary => coverage(
            &record.coverage,
            record.financial.annual_income,
            &config.coverage,
        ),
    }
}

fn personal(age: Option<f64>, section: &PersonalSection, rules: &PersonalRules) -> Vec<FactorScore> {
    vec![
        banded(RiskFactor::Age, age, &rules.age, |age| {
            format!("age {}", figure(age))
        }),
        leveled(
            RiskFactor::MaritalStatus,
            section
                .marital_status
                .map(|status| (status.risk_level(), format!("marital status {}", describe(&status)))),
            &rules.marital_status,
        ),
        leveled(
            RiskFactor::Location,
            section.city.as_deref().map(|city| {
                let level = if listed(city, &rules.metro_cities) {
                    RiskLevel::High
                } else if listed(city, &rules.tier_two_cities) {
                    RiskLevel::Medium
                } else {
                    RiskLevel::Low
                };
                (level, format!("resides in {city}"))
            }),
            &rules.location,
        ),
    ]
}

fn lifestyle(section: &LifestyleSection, rules: &LifestyleRules) -> Vec<FactorScore> {
    vec![
        leveled(
            RiskFactor::Occupation,
            section.occupation.as_deref().map(|occupation| {
                (
                    keyword_level(
                        occupation,
                        &rules.hazardous_occupations,
                        &rules.field_occupations,
                    ),
                    format!("occupation {occupation}"),
                )
            }),
            &rules.occupation,
        ),
        leveled(
            RiskFactor::WorkingType,
            section.working_type.as_deref().map(|working_type| {
                (
                    keyword_level(
                        working_type,
                        &rules.hazardous_working_types,
                        &rules.field_working_types,
                    ),
                    format!("works {working_type}"),
                )
            }),
            &rules.working_type,
        ),
        banded(
            RiskFactor::DailySteps,
            section.daily_steps,
            &rules.daily_steps,
            |steps| format!("{} steps per day", figure(steps)),
        ),
        banded(
            RiskFactor::SleepHours,
            section.sleep_hours,
            &rules.sleep_hours,
            |hours| format!("{} hours of sleep", figure(hours)),
        ),
        leveled(
            RiskFactor::Smoking,
            section
                .smoker
                .map(|answer| (answer.yes_is_adverse(), format!("smoker: {}", answer.label()))),
            &rules.smoking,
        ),
        leveled(
            RiskFactor::Alcohol,
            section
                .alcohol
                .map(|alcohol| (alcohol.risk_level(), format!("alcohol {}", describe(&alcohol)))),
            &rules.alcohol,
        ),
        leveled(
            RiskFactor::Commute,
            section
                .commute
                .map(|commute| (commute.risk_level(), format!("commutes by {}", describe(&commute)))),
            &rules.commute,
        ),
    ]
}

fn financial(section: &FinancialSection, rules: &FinancialRules) -> Vec<FactorScore> {
    vec![
        leveled(
            RiskFactor::EmploymentStatus,
            section
                .employment_status
                .map(|status| (status.risk_level(), format!("employment {}", describe(&status)))),
            &rules.employment,
        ),
        banded(
            RiskFactor::AnnualIncome,
            section.annual_income,
            &rules.annual_income,
            |income| format!("annual income {}", figure(income)),
        ),
        banded(
            RiskFactor::DisposableIncome,
            section.disposable_share(),
            &rules.disposable_share,
            |share| format!("{}% of salary disposable", figure(share)),
        ),
        banded(
            RiskFactor::EmiLoad,
            section.emi_share(),
            &rules.emi_share,
            |share| format!("repayments take {}% of salary", figure(share)),
        ),
    ]
}

fn medical(
    section: &MedicalSection,
    bmi: Option<f64>,
    assessed_on: Option<NaiveDate>,
    rules: &MedicalRules,
) -> Vec<FactorScore> {
    let conditions = section.pre_existing_conditions.as_ref().map(|_| {
        match section.conditions() {
            None => (RiskLevel::Low, "no pre-existing conditions".to_string()),
            Some(conditions) => {
                let declared = conditions.to_ascii_lowercase();
                let chronic = rules
                    .chronic_conditions
                    .iter()
                    .any(|keyword| declared.contains(&keyword.to_ascii_lowercase()));
                let level = if chronic {
                    RiskLevel::High
                } else {
                    RiskLevel::Medium
                };
                (level, format!("declared {conditions}"))
            }
        }
    });

    let allergies = section.allergies.as_ref().map(|_| {
        let declared = section.allergy_list();
        let level = match declared.len() {
            0 => RiskLevel::Low,
            1 => RiskLevel::Medium,
            _ => RiskLevel::High,
        };
        (level, format!("{} allergies declared", declared.len()))
    });

    vec![
        leveled(RiskFactor::PreExistingConditions, conditions, &rules.conditions),
        banded(RiskFactor::Bmi, bmi, &rules.bmi, |bmi| format!("bmi {bmi:.1}")),
        banded(
            RiskFactor::HealthCheckup,
            section.months_since_checkup(assessed_on),
            &rules.checkup_months,
            |months| format!("last checkup {} months ago", months.floor().max(0.0)),
        ),
        leveled(RiskFactor::Allergies, allergies, &rules.allergies),
    ]
}

fn preferences(section: &PreferencesSection, rules: &PreferenceRules) -> Vec<FactorScore> {
    vec![
        leveled(
            RiskFactor::BudgetFlexibility,
            section.budget_flexibility.map(|flexibility| {
                (
                    flexibility.risk_level(),
                    format!("budget flexibility {}", describe(&flexibility)),
                )
            }),
            &rules.budget_flexibility,
        ),
        leveled(
            RiskFactor::RidersWillingness,
            section.riders.map(|answer| {
                (
                    answer.no_is_adverse(),
                    format!("willing to buy riders: {}", answer.label()),
                )
            }),
            &rules.riders,
        ),
        leveled(
            RiskFactor::DeductibleFlexibility,
            section.flexible_deductibles.map(|answer| {
                (
                    answer.no_is_adverse(),
                    format!("flexible deductibles: {}", answer.label()),
                )
            }),
            &rules.deductibles,
        ),
        leveled(
            RiskFactor::RiskTolerance,
            section.risk_tolerance.map(|tolerance| {
                (
                    tolerance.risk_level(),
                    format!("risk tolerance {}", describe(&tolerance)),
                )
            }),
            &rules.risk_tolerance,
        ),
    ]
}

fn dependents(section: &DependentsSection, rules: &DependentRules) -> Vec<FactorScore> {
    let count = banded(
        RiskFactor::DependentCount,
        section.count(),
        &rules.count,
        |count| format!("{} dependents", figure(count)),
    );

    let levels: Vec<RiskLevel> = section
        .dependents
        .iter()
        .filter_map(|dependent| dependent.dependency.map(|level| level.risk_level()))
        .collect();
    let reliance = if levels.is_empty() {
        FactorScore::not_provided(RiskFactor::DependencyLevel)
    } else {
        let points: f32 = levels
            .iter()
            .map(|level| rules.dependency.points(*level))
            .sum();
        FactorScore::new(
            RiskFactor::DependencyLevel,
            points.min(rules.dependency_cap),
            format!("{} dependents rely on the applicant", levels.len()),
        )
    };

    let ages: Vec<f64> = section
        .dependents
        .iter()
        .filter_map(|dependent| dependent.age)
        .collect();
    let elderly = if ages.is_empty() {
        FactorScore::not_provided(RiskFactor::ElderlyDependents)
    } else {
        let seniors = ages.iter().filter(|age| **age >= rules.elderly_age).count();
        FactorScore::new(
            RiskFactor::ElderlyDependents,
            (seniors as f32 * rules.elderly_points).min(rules.elderly_cap),
            format!(
                "{seniors} dependents aged {} or over",
                figure(rules.elderly_age)
            ),
        )
    };

    vec![count, reliance, elderly]
}

fn insurance_history(
    section: &InsuranceHistorySection,
    rules: &InsuranceHistoryRules,
) -> Vec<FactorScore> {
    vec![
        leveled(
            RiskFactor::LifeInsurance,
            section.has_life_insurance.map(|answer| {
                (
                    answer.no_is_adverse(),
                    format!("holds life insurance: {}", answer.label()),
                )
            }),
            &rules.life_insurance,
        ),
        leveled(
            RiskFactor::HealthInsurance,
            section.has_health_insurance.map(|answer| {
                (
                    answer.no_is_adverse(),
                    format!("holds health insurance: {}", answer.label()),
                )
            }),
            &rules.health_insurance,
        ),
        banded(
            RiskFactor::ClaimHistory,
            section.claim_count.map(f64::from),
            &rules.claims,
            |claims| format!("{} prior claims", figure(claims)),
        ),
        leveled(
            RiskFactor::PolicyLapse,
            section.lapsed_policies.map(|answer| {
                (
                    answer.yes_is_adverse(),
                    format!("lapsed policies: {}", answer.label()),
                )
            }),
            &rules.lapses,
        ),
    ]
}

fn coverage(
    section: &CoverageSection,
    annual_income: Option<f64>,
    rules: &CoverageRules,
) -> Vec<FactorScore> {
    let life_multiple = section
        .life_cover
        .zip(annual_income.filter(|income| *income > 0.0))
        .map(|(cover, income)| cover / income);

    vec![
        banded(
            RiskFactor::LifeCoverage,
            life_multiple,
            &rules.life_multiple,
            |multiple| format!("life cover {multiple:.1}x annual income"),
        ),
        banded(
            RiskFactor::HealthCoverage,
            section.health_cover,
            &rules.health_cover,
            |cover| format!("health cover {}", figure(cover)),
        ),
    ]
}

fn banded(
    factor: RiskFactor,
    value: Option<f64>,
    table: &BandTable,
    describe: impl FnOnce(f64) -> String,
) -> FactorScore {
    match value {
        Some(value) => FactorScore::new(factor, table.points(value), describe(value)),
        None => FactorScore::not_provided(factor),
    }
}

fn leveled(
    factor: RiskFactor,
    answer: Option<(RiskLevel, String)>,
    points: &LevelPoints,
) -> FactorScore {
    match answer {
        Some((level, detail)) => FactorScore::new(
            factor,
            points.points(level),
            format!("{detail} ({} risk)", level.label()),
        ),
        None => FactorScore::not_provided(factor),
    }
}

/// Substring match so "New Delhi" and "Navi Mumbai" land on their metro entries.
fn listed(value: &str, entries: &[String]) -> bool {
    let value = value.trim().to_ascii_lowercase();
    entries.iter().any(|entry| {
        let entry = entry.trim().to_ascii_lowercase();
        !entry.is_empty() && value.contains(&entry)
    })
}

fn keyword_level(value: &str, hazardous: &[String], field: &[String]) -> RiskLevel {
    let value = value.to_ascii_lowercase();
    let matches = |keywords: &[String]| {
        keywords
            .iter()
            .any(|keyword| value.contains(&keyword.to_ascii_lowercase()))
    };

    if matches(hazardous) {
        RiskLevel::High
    } else if matches(field) {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Human wording for a snake_case enum variant.
fn describe<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|value| value.as_str().map(|raw| raw.replace('_', " ")))
        .unwrap_or_default()
}

fn figure(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}
