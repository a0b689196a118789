use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use axum::Router;
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::assessment::advisor::{AdvisorError, AdvisoryRequest, UnderwritingAdvisor};
use crate::assessment::domain::{Answer, ApplicantRecord};
use crate::assessment::scoring::ScoringEngine;
use crate::assessment::{assessment_router, AssessmentService};

pub(super) fn assessed_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date")
}

/// Form payload for a fully answered application, posted the way the browser sends it.
pub(super) fn form_payload() -> Value {
    json!({
        "assessed_on": "2025-01-15",
        "basic_info": {
            "full_name": "Priya Sharma",
            "age": "34",
            "gender": "Female",
            "marital_status": "Married",
            "city": "Pune",
            "state": "Maharashtra"
        },
        "additional_info": {
            "occupation": "Software Engineer",
            "working_type": "Hybrid",
            "daily_steps": "6,500",
            "sleep_hours": "6",
            "smoker": "No",
            "alcohol": "Occasionally",
            "commute": "Car"
        },
        "financial_info": {
            "employment_status": "Salaried",
            "annual_income": "₹ 18,00,000",
            "monthly_salary": "150000",
            "monthly_expenses": "60000",
            "existing_emis": "25000",
            "bnpl_obligations": "5000"
        },
        "medical_info": {
            "pre_existing_conditions": "None",
            "height": "165",
            "weight": "68",
            "last_checkup": "2024-03-15",
            "allergies": "Dust"
        },
        "preferences_info": {
            "budget_flexibility": "Moderate",
            "willingnessForRiders": "Yes",
            "deductibleFlexibility": "No",
            "risk_tolerance": "Conservative"
        },
        "family_info": {
            "num_dependents": "2",
            "dependent_1_relationship": "Father",
            "dependent_1_age": "62",
            "dependent_1_dependency": "Full",
            "dependent_2_relationship": "Son",
            "dependent_2_age": "6",
            "dependent_2_dependency": "Full"
        },
        "coverage_info": {
            "has_life_insurance": "Yes",
            "has_health_insurance": "Yes",
            "has_lapsed_policies": "No",
            "claim_history": [],
            "life_sum_1": "50,00,000",
            "health_sum_1": "500000"
        }
    })
}

pub(super) fn form_record() -> ApplicantRecord {
    serde_json::from_value(form_payload()).expect("form payload parses")
}

/// Age 42, smoker, BMI 23, nothing else answered.
pub(super) fn worked_example() -> ApplicantRecord {
    let mut record = ApplicantRecord::default();
    record.personal.age = Some(42.0);
    record.lifestyle.smoker = Some(Answer::Yes);
    record.lifestyle.bmi = Some(23.0);
    record
}

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::standard()
}

pub(super) fn router_with(advisor: Arc<dyn UnderwritingAdvisor>) -> Router {
    let service = AssessmentService::new(ScoringEngine::standard(), advisor);
    assessment_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Advisor that answers with fixed text and records the prompts it receives.
#[derive(Default)]
pub(super) struct CannedAdvisor {
    pub(super) prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl UnderwritingAdvisor for CannedAdvisor {
    async fn recommend(&self, request: &AdvisoryRequest) -> Result<String, AdvisorError> {
        self.prompts
            .lock()
            .expect("prompt mutex")
            .push(request.prompt().to_string());
        Ok("RECOMMENDATIONS\n- Standard term cover".to_string())
    }
}

/// Advisor whose upstream always rejects the call.
pub(super) struct RejectingAdvisor;

#[async_trait]
impl UnderwritingAdvisor for RejectingAdvisor {
    async fn recommend(&self, _request: &AdvisoryRequest) -> Result<String, AdvisorError> {
        Err(AdvisorError::Api {
            status: 503,
            message: "model overloaded".to_string(),
        })
    }
}
