use serde::{Deserialize, Serialize};

/// Ordered risk bands derived from the total score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    VeryLow,
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskTier {
    pub const ALL: [RiskTier; 5] = [
        RiskTier::VeryLow,
        RiskTier::Low,
        RiskTier::Moderate,
        RiskTier::High,
        RiskTier::VeryHigh,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            RiskTier::VeryLow => "Very Low",
            RiskTier::Low => "Low",
            RiskTier::Moderate => "Moderate",
            RiskTier::High => "High",
            RiskTier::VeryHigh => "Very High",
        }
    }
}

/// One row of the tier lookup table. `min` and `max` are both inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierBand {
    pub tier: RiskTier,
    pub min: u8,
    pub max: u8,
    pub rating: String,
    pub description: String,
    pub recommended_cover: String,
    pub suggested_premium: String,
}

impl TierBand {
    pub fn contains(&self, total: u8) -> bool {
        self.min <= total && total <= self.max
    }

    pub fn label(&self) -> &'static str {
        self.tier.label()
    }
}

fn band(
    tier: RiskTier,
    min: u8,
    max: u8,
    rating: &str,
    description: &str,
    recommended_cover: &str,
    suggested_premium: &str,
) -> TierBand {
    TierBand {
        tier,
        min,
        max,
        rating: rating.to_string(),
        description: description.to_string(),
        recommended_cover: recommended_cover.to_string(),
        suggested_premium: suggested_premium.to_string(),
    }
}

pub(crate) fn standard_tiers() -> [TierBand; 5] {
    [
        band(
            RiskTier::VeryLow,
            0,
            20,
            "A+",
            "Excellent risk profile with minimal underwriting considerations",
            "Standard coverage with minimal loading",
            "Standard rates",
        ),
        band(
            RiskTier::Low,
            21,
            35,
            "A",
            "Good risk profile with standard underwriting considerations",
            "Standard coverage with slight loading",
            "Standard rates with minor adjustments",
        ),
        band(
            RiskTier::Moderate,
            36,
            50,
            "B",
            "Standard risk profile with moderate underwriting considerations",
            "Standard coverage with moderate loading",
            "Standard rates with moderate loading",
        ),
        band(
            RiskTier::High,
            51,
            70,
            "C",
            "Higher risk profile requiring detailed underwriting review",
            "Limited coverage with significant loading",
            "Higher rates with significant loading",
        ),
        band(
            RiskTier::VeryHigh,
            71,
            100,
            "D",
            "High-risk profile requiring specialized underwriting and medical review",
            "Specialized coverage with maximum loading",
            "Maximum rates with specialized underwriting",
        ),
    ]
}
