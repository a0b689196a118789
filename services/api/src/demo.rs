use crate::infra::{assessment_service, AdviceMode};
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};
use serde_json::json;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::info;
use underwrite_ai::assessment::{
    write_breakdown_csv, ApplicantRecord, AssessmentReport, AssessmentService, RiskAssessment,
};
use underwrite_ai::config::AppConfig;
use underwrite_ai::error::AppError;
use underwrite_ai::telemetry;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON export of the applicant form (step-keyed or flat)
    #[arg(long)]
    pub(crate) data_file: PathBuf,
    /// Output format for the assessment
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
    /// Date ages and checkup recency are measured against (defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) assessed_on: Option<NaiveDate>,
    /// Ask the configured advisor for a narrative recommendation
    #[arg(long)]
    pub(crate) with_advice: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Ask the configured advisor for a narrative recommendation
    #[arg(long)]
    pub(crate) with_advice: bool,
    /// Print every scored factor beneath the category table
    #[arg(long)]
    pub(crate) factors: bool,
}

pub(crate) async fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        data_file,
        format,
        assessed_on,
        with_advice,
    } = args;

    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let raw = std::fs::read_to_string(&data_file)?;
    let mut record: ApplicantRecord = serde_json::from_str(&raw)?;
    record.assessed_on = assessed_on
        .or(record.assessed_on)
        .or_else(|| Some(Local::now().date_naive()));

    let service = assessment_service(&config, advice_mode(with_advice))?;
    info!(path = %data_file.display(), ?format, "scoring applicant form");

    let stdout = io::stdout();
    match format {
        OutputFormat::Json => {
            let rendered = if with_advice {
                serde_json::to_string_pretty(&service.report(&record).await)?
            } else {
                serde_json::to_string_pretty(&service.score(&record))?
            };
            writeln!(stdout.lock(), "{rendered}")?;
        }
        OutputFormat::Csv => {
            let assessment = service.score(&record);
            write_breakdown_csv(&assessment.breakdown, stdout.lock())?;
        }
        OutputFormat::Text => {
            let report = text_report(&service, &record, with_advice).await;
            write!(stdout.lock(), "{}", report.render_text())?;
        }
    }

    Ok(())
}

pub(crate) fn run_rubric() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let rubric = config.scoring.load_rubric()?;
    println!("{}", serde_json::to_string_pretty(&rubric)?);
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let record: ApplicantRecord = serde_json::from_value(sample_applicant())?;
    let service = assessment_service(&config, advice_mode(args.with_advice))?;

    let report = text_report(&service, &record, args.with_advice).await;
    print!("{}", report.render_text());

    if args.factors {
        println!();
        print_factors(&service.score(&record));
    }

    Ok(())
}

fn advice_mode(with_advice: bool) -> AdviceMode {
    if with_advice {
        AdviceMode::Configured
    } else {
        AdviceMode::Off
    }
}

async fn text_report(
    service: &AssessmentService,
    record: &ApplicantRecord,
    with_advice: bool,
) -> AssessmentReport {
    if with_advice {
        service.report(record).await
    } else {
        AssessmentReport::new(record, &service.score(record))
    }
}

fn print_factors(assessment: &RiskAssessment) {
    println!("Scored factors:");
    for category in &assessment.breakdown.categories {
        println!(
            "  {} ({}/{}, raw {:.1}/{:.0})",
            category.label,
            category.points,
            category.max_points,
            category.raw_points,
            category.raw_cap
        );
        for factor in &category.factors {
            println!(
                "    - {:<28} {:>4.1}  {}",
                factor.factor.key(),
                factor.points,
                factor.notes
            );
        }
    }
}

fn sample_applicant() -> serde_json::Value {
    json!({
        "assessed_on": "2025-01-15",
        "basic_info": {
            "full_name": "Ananya Iyer",
            "date_of_birth": "1986-09-02",
            "gender": "Female",
            "marital_status": "Married",
            "city": "Bengaluru",
            "state": "Karnataka"
        },
        "additional_info": {
            "occupation": "Architect",
            "working_type": "Hybrid",
            "daily_steps": "7,200",
            "sleep_hours": "7",
            "smoker": "No",
            "alcohol": "Occasionally",
            "commute": "Public Transport"
        },
        "financial_info": {
            "employment_status": "Salaried",
            "annual_income": "14,50,000",
            "monthly_salary": "110000",
            "monthly_expenses": "55000",
            "existing_emis": "18000",
            "bnpl_obligations": "0"
        },
        "medical_info": {
            "pre_existing_conditions": "Mild asthma",
            "height": "162",
            "weight": "61",
            "last_checkup": "2024-08-20",
            "allergies": "Pollen"
        },
        "preferences_info": {
            "budget_flexibility": "Moderate",
            "willingnessForRiders": "Yes",
            "deductibleFlexibility": "Yes",
            "risk_tolerance": "Moderate"
        },
        "family_info": {
            "num_dependents": "2",
            "dependent_1_relationship": "Son",
            "dependent_1_age": "6",
            "dependent_1_dependency": "Full",
            "dependent_2_relationship": "Mother",
            "dependent_2_age": "64",
            "dependent_2_dependency": "Partial"
        },
        "coverage_info": {
            "has_life_insurance": "Yes",
            "has_health_insurance": "Yes",
            "has_lapsed_policies": "No",
            "life_sum_1": "5000000",
            "health_sum_1": "500000"
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use underwrite_ai::assessment::ScoringEngine;

    #[test]
    fn sample_applicant_parses_into_every_section() {
        let record: ApplicantRecord =
            serde_json::from_value(sample_applicant()).expect("sample parses");

        assert_eq!(record.applicant_name(), Some("Ananya Iyer"));
        assert_eq!(record.dependents.count(), Some(2.0));
        assert!(record.coverage.life_cover.is_some());
        assert!(record.medical.derived_bmi().is_some());
    }

    #[test]
    fn sample_applicant_scores_within_scale() {
        let record: ApplicantRecord =
            serde_json::from_value(sample_applicant()).expect("sample parses");
        let assessment = ScoringEngine::standard().assess(&record);

        assert!(assessment.breakdown.total_score <= 100);
        assert_eq!(assessment.breakdown.categories.len(), 8);
        let text = AssessmentReport::new(&record, &assessment).render_text();
        assert!(text.contains("Applicant: Ananya Iyer"));
    }

    #[test]
    fn advice_flag_selects_mode() {
        assert_eq!(advice_mode(true), AdviceMode::Configured);
        assert_eq!(advice_mode(false), AdviceMode::Off);
    }
}
