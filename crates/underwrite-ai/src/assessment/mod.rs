//! Underwriting risk assessment: applicant intake, rubric scoring, tiers, and reports.
//!
//! Scoring is deterministic and side-effect free. The advisory hand-off is the only
//! asynchronous step and never feeds back into the score.

pub mod advisor;
pub mod domain;
pub(crate) mod form;
pub mod report;
pub mod router;
pub mod scoring;
pub mod service;

#[cfg(test)]
mod tests;

pub use advisor::{
    advisor_from_config, Advisory, AdvisorError, AdvisoryRequest, DisabledAdvisor,
    GenerativeAdvisor, UnderwritingAdvisor,
};
pub use domain::{
    AlcoholUse, Answer, ApplicantRecord, CommuteMode, CoverageSection, Dependent,
    DependencyLevel, DependentsSection, EmploymentStatus, FinancialSection, Flexibility,
    InsuranceHistorySection, LifestyleSection, MaritalStatus, MedicalSection, PersonalSection,
    PreferencesSection, RiskLevel, RiskTolerance,
};
pub use form::FormChoice;
pub use report::{write_breakdown_csv, AssessmentReport, CategoryRow, SCORE_SCALE};
pub use router::assessment_router;
pub use scoring::{
    CategoryScore, FactorScore, RiskAssessment, RiskFactor, RiskTier, ScoreBreakdown,
    ScoringCategory, ScoringConfig, ScoringConfigError, ScoringEngine, TierBand,
};
pub use service::AssessmentService;
