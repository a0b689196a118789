use std::sync::Arc;

use tracing::{debug, info};

use super::advisor::{Advisory, AdvisoryRequest, DisabledAdvisor, UnderwritingAdvisor};
use super::domain::ApplicantRecord;
use super::report::AssessmentReport;
use super::scoring::{RiskAssessment, ScoringConfig, ScoringEngine};

/// Service composing the scoring engine with the advisory hand-off.
#[derive(Clone)]
pub struct AssessmentService {
    engine: Arc<ScoringEngine>,
    advisor: Arc<dyn UnderwritingAdvisor>,
}

impl AssessmentService {
    pub fn new(engine: ScoringEngine, advisor: Arc<dyn UnderwritingAdvisor>) -> Self {
        Self {
            engine: Arc::new(engine),
            advisor,
        }
    }

    /// Service over the standard rubric with advice switched off.
    pub fn standard() -> Self {
        Self::new(ScoringEngine::standard(), Arc::new(DisabledAdvisor))
    }

    pub fn rubric(&self) -> &ScoringConfig {
        self.engine.config()
    }

    /// Score the record and classify the total. Never fails.
    pub fn score(&self, record: &ApplicantRecord) -> RiskAssessment {
        let assessment = self.engine.assess(record);
        debug!(
            total = assessment.breakdown.total_score,
            tier = assessment.tier.label(),
            rubric = %assessment.breakdown.rubric_version,
            "applicant scored"
        );
        assessment
    }

    /// Score the record, then ask the advisor for narrative guidance.
    pub async fn report(&self, record: &ApplicantRecord) -> AssessmentReport {
        let assessment = self.score(record);
        let request = AdvisoryRequest::new(record, &assessment);
        let advisory = Advisory::from(self.advisor.recommend(&request).await);

        if let Advisory::Unavailable { reason } = &advisory {
            info!(%reason, "report issued without advisory");
        }

        AssessmentReport::new(record, &assessment).with_advisory(advisory)
    }
}
