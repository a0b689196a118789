//! Hand-off to a hosted generative model for narrative underwriting advice.
//!
//! The advisor only ever adds text next to a finished assessment. Scores and tiers are
//! computed before any request is made and are never influenced by the reply.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use super::domain::ApplicantRecord;
use super::scoring::RiskAssessment;
use crate::config::AdvisorConfig;

/// Prompt bundle sent to an advisor: the applicant answers plus the deterministic score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryRequest {
    prompt: String,
}

impl AdvisoryRequest {
    pub fn new(record: &ApplicantRecord, assessment: &RiskAssessment) -> Self {
        let applicant = serde_json::to_string_pretty(record).unwrap_or_else(|_| "{}".to_string());
        let breakdown = assessment
            .breakdown
            .categories
            .iter()
            .map(|category| {
                format!(
                    "- {}: {}/{}",
                    category.label, category.points, category.max_points
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "You are an expert insurance underwriter. Review this applicant and write a \
personalised risk narrative.\n\n\
APPLICANT DATA:\n{applicant}\n\n\
DETERMINISTIC SCORE (rubric {version}): {total}/100, {tier} risk (rating {rating})\n\
{breakdown}\n\n\
Respond with these sections, one bullet per line:\n\
DETAILED ANALYSIS\nRISK FACTORS\nPOSITIVE INDICATORS\nAREAS OF CONCERN\nRECOMMENDATIONS\n\
Do not change the score or the tier.",
            version = assessment.breakdown.rubric_version,
            total = assessment.breakdown.total_score,
            tier = assessment.tier.label(),
            rating = assessment.tier.rating,
        );

        Self { prompt }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

#[async_trait]
pub trait UnderwritingAdvisor: Send + Sync {
    async fn recommend(&self, request: &AdvisoryRequest) -> Result<String, AdvisorError>;
}

/// Advisory text attached to a report, or the reason it is missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Advisory {
    Generated { text: String },
    Unavailable { reason: String },
}

impl From<Result<String, AdvisorError>> for Advisory {
    fn from(result: Result<String, AdvisorError>) -> Self {
        match result {
            Ok(text) => Advisory::Generated { text },
            Err(err) => Advisory::Unavailable {
                reason: err.to_string(),
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("advisor is not configured")]
    Disabled,
    #[error("advisor request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("advisor returned status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("advisor returned no text")]
    EmptyContent,
}

/// Used when no API key is configured; every request reports [`AdvisorError::Disabled`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledAdvisor;

#[async_trait]
impl UnderwritingAdvisor for DisabledAdvisor {
    async fn recommend(&self, _request: &AdvisoryRequest) -> Result<String, AdvisorError> {
        Err(AdvisorError::Disabled)
    }
}

/// Client for a `generateContent` style endpoint.
#[derive(Clone)]
pub struct GenerativeAdvisor {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    text: Option<String>,
}

impl GenerateResponse {
    fn text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

impl GenerativeAdvisor {
    pub fn new(
        api_key: String,
        endpoint: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, AdvisorError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            model,
            api_key,
        })
    }

    fn url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl UnderwritingAdvisor for GenerativeAdvisor {
    async fn recommend(&self, request: &AdvisoryRequest) -> Result<String, AdvisorError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": request.prompt() }] }],
        });

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "advisor request rejected");
            return Err(AdvisorError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let reply: GenerateResponse = response.json().await?;
        let text = reply.text().ok_or(AdvisorError::EmptyContent)?;
        debug!(model = %self.model, chars = text.len(), "advisor reply received");
        Ok(text)
    }
}

/// Picks the hosted advisor when an API key is configured, otherwise [`DisabledAdvisor`].
pub fn advisor_from_config(config: &AdvisorConfig) -> Arc<dyn UnderwritingAdvisor> {
    let Some(api_key) = config.api_key.clone() else {
        return Arc::new(DisabledAdvisor);
    };

    match GenerativeAdvisor::new(
        api_key,
        config.endpoint.clone(),
        config.model.clone(),
        Duration::from_secs(config.timeout_secs),
    ) {
        Ok(advisor) => Arc::new(advisor),
        Err(err) => {
            warn!(error = %err, "advisor client unavailable, continuing without advice");
            Arc::new(DisabledAdvisor)
        }
    }
}
