use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;
use underwrite_ai::assessment::{
    advisor_from_config, AssessmentService, DisabledAdvisor, ScoringEngine, UnderwritingAdvisor,
};
use underwrite_ai::config::{AppConfig, ConfigError};
use underwrite_ai::error::AppError;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Whether the hosted advisor may be called for this run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AdviceMode {
    Configured,
    Off,
}

/// Builds the assessment service from the loaded rubric and advisor settings.
pub(crate) fn assessment_service(
    config: &AppConfig,
    advice: AdviceMode,
) -> Result<AssessmentService, AppError> {
    let rubric = config.scoring.load_rubric()?;
    let engine = ScoringEngine::new(rubric).map_err(ConfigError::RubricInvalid)?;

    let advisor: Arc<dyn UnderwritingAdvisor> = match advice {
        AdviceMode::Configured => advisor_from_config(&config.advisor),
        AdviceMode::Off => Arc::new(DisabledAdvisor),
    };

    info!(
        rubric = %engine.config().version,
        custom_rubric = config.scoring.rubric_path.is_some(),
        advisor_enabled = advice == AdviceMode::Configured && config.advisor.is_enabled(),
        "assessment service configured"
    );

    Ok(AssessmentService::new(engine, advisor))
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(
            parse_date(" 2025-01-15 "),
            Ok(NaiveDate::from_ymd_opt(2025, 1, 15).expect("valid date"))
        );
    }

    #[test]
    fn reports_bad_dates() {
        let err = parse_date("15/01/2025").expect_err("rejected");
        assert!(err.contains("15/01/2025"));
    }
}
