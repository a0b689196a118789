use std::fmt::Write as _;
use std::io::Write;

use serde::Serialize;

use super::advisor::Advisory;
use super::domain::ApplicantRecord;
use super::scoring::{RiskAssessment, RiskTier, ScoreBreakdown, ScoringCategory};

pub const SCORE_SCALE: u8 = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub category: ScoringCategory,
    pub label: String,
    pub points: u8,
    pub max_points: u8,
}

/// Presentation-ready summary of one assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applicant_name: Option<String>,
    pub rubric_version: String,
    pub total_score: u8,
    pub score_scale: u8,
    pub tier: RiskTier,
    pub tier_label: &'static str,
    pub rating: String,
    pub description: String,
    pub recommended_cover: String,
    pub suggested_premium: String,
    pub categories: Vec<CategoryRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<Advisory>,
}

impl AssessmentReport {
    pub fn new(record: &ApplicantRecord, assessment: &RiskAssessment) -> Self {
        let tier = &assessment.tier;
        let categories = assessment
            .breakdown
            .categories
            .iter()
            .map(|category| CategoryRow {
                category: category.category,
                label: category.label.clone(),
                points: category.points,
                max_points: category.max_points,
            })
            .collect();

        Self {
            applicant_name: record.applicant_name().map(str::to_string),
            rubric_version: assessment.breakdown.rubric_version.clone(),
            total_score: assessment.breakdown.total_score,
            score_scale: SCORE_SCALE,
            tier: tier.tier,
            tier_label: tier.label(),
            rating: tier.rating.clone(),
            description: tier.description.clone(),
            recommended_cover: tier.recommended_cover.clone(),
            suggested_premium: tier.suggested_premium.clone(),
            categories,
            advisory: None,
        }
    }

    pub fn with_advisory(mut self, advisory: Advisory) -> Self {
        self.advisory = Some(advisory);
        self
    }

    /// Plain-text summary for terminals and log attachments.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Underwriting Risk Assessment");
        let _ = writeln!(out, "============================");
        if let Some(name) = &self.applicant_name {
            let _ = writeln!(out, "Applicant: {name}");
        }
        let _ = writeln!(
            out,
            "Risk score: {}/{} ({} risk, rating {})",
            self.total_score, self.score_scale, self.tier_label, self.rating
        );
        let _ = writeln!(out, "Assessment: {}", self.description);
        let _ = writeln!(out, "Recommended cover: {}", self.recommended_cover);
        let _ = writeln!(out, "Suggested premium: {}", self.suggested_premium);
        let _ = writeln!(out);
        let _ = writeln!(out, "Category breakdown (rubric {}):", self.rubric_version);

        let width = self
            .categories
            .iter()
            .map(|row| row.label.len())
            .max()
            .unwrap_or(0);
        for row in &self.categories {
            let _ = writeln!(
                out,
                "  {:<width$}  {:>3}/{:<3}",
                row.label,
                row.points,
                row.max_points,
                width = width
            );
        }

        match &self.advisory {
            Some(Advisory::Generated { text }) => {
                let _ = writeln!(out);
                let _ = writeln!(out, "Advisory");
                let _ = writeln!(out, "--------");
                let _ = writeln!(out, "{}", text.trim_end());
            }
            Some(Advisory::Unavailable { reason }) => {
                let _ = writeln!(out);
                let _ = writeln!(out, "Advisory unavailable: {reason}");
            }
            None => {}
        }

        out
    }
}

#[derive(Debug, Serialize)]
struct BreakdownRow<'a> {
    category: &'static str,
    factor: &'static str,
    points: f32,
    category_points: u8,
    category_max: u8,
    notes: &'a str,
}

/// Writes one CSV row per factor with its category totals alongside.
pub fn write_breakdown_csv<W: Write>(
    breakdown: &ScoreBreakdown,
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    for category in &breakdown.categories {
        for factor in &category.factors {
            csv_writer.serialize(BreakdownRow {
                category: category.category.key(),
                factor: factor.factor.key(),
                points: factor.points,
                category_points: category.points,
                category_max: category.max_points,
                notes: &factor.notes,
            })?;
        }
    }

    csv_writer.flush()?;
    Ok(())
}
