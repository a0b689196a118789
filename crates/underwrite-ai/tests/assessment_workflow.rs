//! End-to-end scenarios for scoring submitted applications through the public API.

use std::io::Write;

use serde_json::json;
use underwrite_ai::assessment::{
    write_breakdown_csv, Answer, ApplicantRecord, AssessmentReport, AssessmentService, RiskTier,
    ScoringCategory, ScoringConfig, ScoringEngine,
};
use underwrite_ai::config::ScoringSettings;

fn high_risk_payload() -> serde_json::Value {
    json!({
        "assessed_on": "2025-06-01",
        "basic_info": {
            "full_name": "Ravi Kumar",
            "date_of_birth": "1968-02-10",
            "marital_status": "Single",
            "city": "Mumbai"
        },
        "additional_info": {
            "occupation": "Delivery Driver",
            "working_type": "Field",
            "daily_steps": "3000",
            "sleep_hours": "4",
            "smoker": "Yes",
            "alcohol": "Regularly",
            "commute": "Motorbike"
        },
        "financial_info": {
            "employment_status": "Unemployed",
            "annual_income": "300000",
            "monthly_salary": "25000",
            "monthly_expenses": "18000",
            "existing_emis": "12000",
            "bnpl_obligations": "2000"
        },
        "medical_info": {
            "pre_existing_conditions": "Heart disease",
            "bmi": "33",
            "last_checkup": "2020-01-01",
            "allergies": "Dust, Pollen, Penicillin"
        },
        "preferences_info": {
            "budget_flexibility": "Low",
            "willingnessForRiders": "No",
            "deductibleFlexibility": "No",
            "risk_tolerance": "Aggressive"
        },
        "family_info": {
            "num_dependents": "5",
            "dependent_1_age": "70",
            "dependent_1_dependency": "Full",
            "dependent_2_age": "68",
            "dependent_2_dependency": "Full",
            "dependent_3_age": "66",
            "dependent_3_dependency": "Full"
        },
        "coverage_info": {
            "has_life_insurance": "No",
            "has_health_insurance": "No",
            "has_lapsed_policies": "Yes",
            "claim_history": [{ "amount": 1 }, { "amount": 2 }, { "amount": 3 }],
            "life_sum_1": "0",
            "health_sum_1": "0"
        }
    })
}

#[test]
fn high_risk_applicant_reaches_top_tier() {
    let record: ApplicantRecord =
        serde_json::from_value(high_risk_payload()).expect("payload parses");
    let engine = ScoringEngine::standard();
    let assessment = engine.assess(&record);

    assert_eq!(assessment.breakdown.total_score, 98);
    assert_eq!(assessment.tier.tier, RiskTier::VeryHigh);
    assert_eq!(assessment.tier.rating, "D");

    // Medical answers top out at 7 of 8 raw points; every other category saturates.
    let medical = assessment
        .breakdown
        .category(ScoringCategory::MedicalInformation)
        .expect("medical category");
    assert_eq!(medical.raw_points, 7.0);
    assert_eq!(medical.points, 15);
    for category in &assessment.breakdown.categories {
        if category.category == ScoringCategory::MedicalInformation {
            continue;
        }
        assert_eq!(
            category.points, category.max_points,
            "{} should be saturated",
            category.label
        );
    }
}

#[test]
fn low_risk_applicant_stays_in_lowest_tier() {
    let payload = json!({
        "basic_info": { "age": 27, "marital_status": "Married", "city": "Shimla" },
        "additional_info": { "daily_steps": 11000, "sleep_hours": 8, "smoker": "No" },
        "financial_info": { "employment_status": "Salaried", "annual_income": 2400000 },
        "medical_info": { "pre_existing_conditions": "none", "bmi": 22 }
    });
    let record: ApplicantRecord = serde_json::from_value(payload).expect("payload parses");
    let assessment = ScoringEngine::standard().assess(&record);

    // Only the youngest age band contributes: 1 raw point of 5 on an 11 point weight.
    assert_eq!(assessment.breakdown.total_score, 2);
    assert_eq!(assessment.tier.tier, RiskTier::VeryLow);
}

#[test]
fn manual_records_score_like_form_payloads() {
    let mut record = ApplicantRecord::default();
    record.personal.age = Some(42.0);
    record.lifestyle.smoker = Some(Answer::Yes);
    record.lifestyle.bmi = Some(23.0);

    let breakdown = ScoringEngine::standard().score(&record);
    assert_eq!(breakdown.total_score, 10);
    assert_eq!(
        breakdown
            .category(ScoringCategory::LifestyleBehavior)
            .map(|category| category.points),
        Some(6)
    );
}

#[tokio::test]
async fn standard_service_reports_without_advice() {
    let record: ApplicantRecord =
        serde_json::from_value(high_risk_payload()).expect("payload parses");
    let report = AssessmentService::standard().report(&record).await;

    assert_eq!(report.applicant_name.as_deref(), Some("Ravi Kumar"));
    assert_eq!(report.tier_label, "Very High");
    assert!(report.render_text().contains("Advisory unavailable"));
}

#[test]
fn rubric_file_drives_the_engine() {
    let mut rubric = ScoringConfig::standard();
    rubric.version = "regional-2025".to_string();
    rubric.personal.metro_cities.push("shimla".to_string());

    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(
        serde_json::to_string_pretty(&rubric)
            .expect("rubric serializes")
            .as_bytes(),
    )
    .expect("rubric written");

    let settings = ScoringSettings {
        rubric_path: Some(file.path().to_path_buf()),
    };
    let engine = ScoringEngine::new(settings.load_rubric().expect("rubric loads"))
        .expect("rubric valid");

    let mut record = ApplicantRecord::default();
    record.personal.city = Some("Shimla".to_string());
    let breakdown = engine.score(&record);

    assert_eq!(breakdown.rubric_version, "regional-2025");
    // Metro location: 1 raw point of 5 on an 11 point weight.
    assert_eq!(breakdown.total_score, 2);
}

#[test]
fn csv_export_and_text_report_agree_on_totals() {
    let record: ApplicantRecord =
        serde_json::from_value(high_risk_payload()).expect("payload parses");
    let assessment = ScoringEngine::standard().assess(&record);

    let mut buffer = Vec::new();
    write_breakdown_csv(&assessment.breakdown, &mut buffer).expect("csv written");
    let csv = String::from_utf8(buffer).expect("utf8");
    assert!(csv.starts_with("category,factor,points"));
    assert!(csv.contains("medical_information,pre_existing_conditions,2.0,15,17,"));

    let text = AssessmentReport::new(&record, &assessment).render_text();
    assert!(text.contains("Risk score: 98/100 (Very High risk, rating D)"));
}
