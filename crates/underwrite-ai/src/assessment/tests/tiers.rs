use super::common::*;

use crate::assessment::scoring::{
    Band, BandTable, RiskTier, ScoringConfig, ScoringConfigError, ScoringEngine,
};

#[test]
fn tier_boundaries_follow_the_rating_table() {
    let engine = engine();
    let cases = [
        (0, RiskTier::VeryLow, "A+"),
        (20, RiskTier::VeryLow, "A+"),
        (21, RiskTier::Low, "A"),
        (35, RiskTier::Low, "A"),
        (36, RiskTier::Moderate, "B"),
        (50, RiskTier::Moderate, "B"),
        (51, RiskTier::High, "C"),
        (70, RiskTier::High, "C"),
        (71, RiskTier::VeryHigh, "D"),
        (100, RiskTier::VeryHigh, "D"),
    ];

    for (total, tier, rating) in cases {
        let band = engine.classify(total);
        assert_eq!(band.tier, tier, "total {total}");
        assert_eq!(band.rating, rating, "total {total}");
    }
}

#[test]
fn every_total_on_the_scale_has_exactly_one_tier() {
    let config = ScoringConfig::standard();
    for total in 0..=100u8 {
        let matches = config
            .tiers
            .iter()
            .filter(|band| band.contains(total))
            .count();
        assert_eq!(matches, 1, "total {total}");
    }
}

#[test]
fn totals_above_the_scale_clamp_to_top_tier() {
    assert_eq!(engine().classify(u8::MAX).tier, RiskTier::VeryHigh);
}

#[test]
fn tier_labels_and_text_are_stable() {
    let band = engine().classify(60).clone();
    assert_eq!(band.label(), "High");
    assert_eq!(
        band.description,
        "Higher risk profile requiring detailed underwriting review"
    );
    assert_eq!(band.recommended_cover, "Limited coverage with significant loading");
    assert_eq!(band.suggested_premium, "Higher rates with significant loading");
}

#[test]
fn standard_rubric_is_valid_and_uses_full_scale() {
    let config = ScoringConfig::standard();
    assert_eq!(config.validate(), Ok(()));
    assert_eq!(config.weights.total_weight(), 100);
}

#[test]
fn rejects_weights_above_the_scale() {
    let mut config = ScoringConfig::standard();
    config.weights.personal_information.weight = 20;

    let err = ScoringEngine::new(config).expect_err("rubric rejected");
    assert_eq!(err, ScoringConfigError::WeightsExceedScale { total: 109 });
}

#[test]
fn rejects_non_positive_caps() {
    let mut config = ScoringConfig::standard();
    config.weights.medical_information.raw_cap = 0.0;

    let err = config.validate().expect_err("rubric rejected");
    assert_eq!(
        err,
        ScoringConfigError::InvalidCap {
            category: "medical_information"
        }
    );
}

#[test]
fn rejects_gapped_band_tables() {
    let mut config = ScoringConfig::standard();
    config.personal.age = BandTable {
        bands: vec![
            Band {
                lower: 0.0,
                upper: Some(30.0),
                points: 1.0,
            },
            Band {
                lower: 35.0,
                upper: None,
                points: 2.0,
            },
        ],
    };

    let err = config.validate().expect_err("rubric rejected");
    assert_eq!(
        err,
        ScoringConfigError::InvalidBands {
            table: "personal.age",
            reason: "bands must be contiguous",
        }
    );
}

#[test]
fn rejects_bounded_last_band() {
    let mut config = ScoringConfig::standard();
    config.lifestyle.sleep_hours = BandTable {
        bands: vec![Band {
            lower: 0.0,
            upper: Some(24.0),
            points: 1.0,
        }],
    };

    assert!(matches!(
        config.validate(),
        Err(ScoringConfigError::InvalidBands {
            table: "lifestyle.sleep_hours",
            ..
        })
    ));
}

#[test]
fn rejects_negative_points() {
    let mut config = ScoringConfig::standard();
    config.preferences.riders.high = -1.0;

    assert_eq!(
        config.validate(),
        Err(ScoringConfigError::InvalidPoints {
            table: "preferences.riders"
        })
    );
}

#[test]
fn rejects_tiers_that_leave_gaps() {
    let mut config = ScoringConfig::standard();
    config.tiers[2].min = 40;

    assert!(matches!(
        config.validate(),
        Err(ScoringConfigError::InvalidTiers {
            tier: "Moderate",
            ..
        })
    ));
}

#[test]
fn rejects_tiers_that_stop_short_of_the_top() {
    let mut config = ScoringConfig::standard();
    config.tiers[4].max = 90;

    assert!(matches!(
        config.validate(),
        Err(ScoringConfigError::InvalidTiers {
            tier: "Very High",
            reason: "top band must end at 100",
        })
    ));
}

#[test]
fn rubric_survives_json_round_trip() {
    let config = ScoringConfig::standard();
    let json = serde_json::to_string(&config).expect("rubric serializes");
    let parsed: ScoringConfig = serde_json::from_str(&json).expect("rubric parses");

    assert_eq!(parsed.validate(), Ok(()));
    assert_eq!(parsed.version, config.version);
    assert_eq!(parsed.tiers, config.tiers);
}
