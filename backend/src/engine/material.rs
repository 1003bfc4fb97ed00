use shared::{Disposal, ImageFeatureVector, MaterialVerdict};

use super::ValidationError;
use super::catalog::{HUE_MAX, RuleTable, UNIT_MAX};

const CONFIDENCE_FLOOR: f32 = 0.45;
const CONFIDENCE_CEIL: f32 = 0.95;

// Walks the ordered rule table; the first match decides. This is a decision
// table over coarse pixel statistics, not object recognition, and the
// configured rationale strings say so to the user.
pub fn classify(
    rules: &RuleTable,
    features: &ImageFeatureVector,
) -> Result<MaterialVerdict, ValidationError> {
    validate(features)?;

    for (index, rule) in rules.rules().iter().enumerate() {
        if rule.matches(features) {
            return Ok(MaterialVerdict {
                disposal: rule.disposal,
                rationale: rule.rationale.clone(),
                action: rule.action.clone(),
                impact: rules.impact_for(rule.disposal, index).to_string(),
                confidence: confidence(rule.bound_count(), features.brightness),
                cue: Some(rule.cue.clone()),
            });
        }
    }

    Ok(MaterialVerdict {
        disposal: Disposal::Uncertain,
        rationale: rules.uncertain_rationale().to_string(),
        action: rules.uncertain_action().to_string(),
        impact: rules
            .impact_for(Disposal::Uncertain, rules.rules().len())
            .to_string(),
        confidence: CONFIDENCE_FLOOR,
        cue: None,
    })
}

fn validate(features: &ImageFeatureVector) -> Result<(), ValidationError> {
    check("dominant_hue", features.dominant_hue, HUE_MAX)?;
    check("dominant_saturation", features.dominant_saturation, UNIT_MAX)?;
    check("dominant_value", features.dominant_value, UNIT_MAX)?;
    check("brightness", features.brightness, UNIT_MAX)?;
    check("texture", features.texture, UNIT_MAX)?;
    Ok(())
}

fn check(feature: &'static str, value: f32, max: f32) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 || value > max {
        return Err(ValidationError::FeatureOutOfRange {
            feature,
            value,
            min: 0.0,
            max,
        });
    }
    Ok(())
}

// More pinned-down features means a more decisive rule; a mid-exposure photo
// earns a small bonus because the statistics are most reliable there.
fn confidence(bound_count: usize, brightness: f32) -> f32 {
    let mut value = 0.6 + 0.08 * bound_count.saturating_sub(1) as f32;
    if (0.35..0.8).contains(&brightness) {
        value += 0.05;
    }
    value.clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEIL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::catalog::{FeatureRange, HeuristicRule};

    fn rule(
        cue: &str,
        brightness: Option<(f32, f32)>,
        saturation: Option<(f32, f32)>,
        texture: Option<(f32, f32)>,
        disposal: Disposal,
    ) -> HeuristicRule {
        let range = |bounds: Option<(f32, f32)>| {
            bounds.map(|(min, max)| FeatureRange { min, max })
        };
        HeuristicRule {
            cue: cue.to_string(),
            hue: None,
            saturation: range(saturation),
            brightness: range(brightness),
            texture: range(texture),
            disposal,
            rationale: format!("{} rationale", cue),
            action: format!("{} action", cue),
        }
    }

    fn table() -> RuleTable {
        let config: crate::config::AppConfig = serde_json::from_value(serde_json::json!({
            "questionnaire": {
                "diet": {
                    "prompt": "Typical diet?",
                    "options": {
                        "mixed": { "label": "Mixed", "category": "Diet", "weight": 1.6 }
                    }
                }
            },
            "actions": {
                "Transport": ["a"], "Energy": ["b"], "Diet": ["c"], "Waste": ["d"], "Other": ["e"]
            },
            "summaries": { "bands": [], "default": "summary" },
            "rules": [
                {
                    "cue": "black_plastic",
                    "when": { "brightness": { "max": 0.25 }, "saturation": { "max": 0.3 } },
                    "disposal": "GeneralWaste",
                    "rationale": "Dark, low-color surface reads as black plastic.",
                    "action": "Use the general waste bin."
                },
                {
                    "cue": "glass_or_clear_plastic",
                    "when": {
                        "brightness": { "min": 0.75 },
                        "saturation": { "max": 0.2 },
                        "texture": { "max": 0.25 }
                    },
                    "disposal": "Recyclable",
                    "rationale": "Bright, low-saturation, smooth surface.",
                    "action": "Recycle it curbside."
                },
                {
                    "cue": "food_residue",
                    "when": {
                        "hue": { "min": 10.0, "max": 60.0 },
                        "saturation": { "min": 0.35 },
                        "brightness": { "max": 0.65 }
                    },
                    "disposal": "RinseFirst",
                    "rationale": "Warm organic tones suggest food residue.",
                    "action": "Rinse before recycling."
                }
            ],
            "uncertain": {
                "rationale": "No heuristic condition was confidently met.",
                "action": "Check your local recycling guide."
            },
            "impact": {
                "Recyclable": ["Clean stream kept."],
                "RinseFirst": ["Rinse saved the batch."],
                "GeneralWaste": ["Good catch.", "Jam avoided."],
                "Uncertain": ["Better unsure than wrong."]
            },
            "tips": ["tip"],
            "ollama": { "model": "m", "system_prompt": "p" }
        }))
        .unwrap();
        crate::engine::catalog::EngineContext::from_config(&config)
            .unwrap()
            .rules
    }

    fn features(hue: f32, saturation: f32, brightness: f32, texture: f32) -> ImageFeatureVector {
        ImageFeatureVector {
            dominant_hue: hue,
            dominant_saturation: saturation,
            dominant_value: brightness,
            brightness,
            texture,
        }
    }

    #[test]
    fn bright_low_saturation_smooth_is_recyclable() {
        let verdict = classify(&table(), &features(200.0, 0.05, 0.9, 0.1)).unwrap();
        assert_eq!(verdict.disposal, Disposal::Recyclable);
        assert_eq!(verdict.cue.as_deref(), Some("glass_or_clear_plastic"));
    }

    #[test]
    fn warm_saturated_dim_item_needs_a_rinse() {
        let verdict = classify(&table(), &features(25.0, 0.6, 0.3, 0.7)).unwrap();
        assert_eq!(verdict.disposal, Disposal::RinseFirst);
        assert_eq!(verdict.cue.as_deref(), Some("food_residue"));
    }

    #[test]
    fn mid_range_features_come_back_uncertain() {
        let verdict = classify(&table(), &features(180.0, 0.5, 0.5, 0.5)).unwrap();
        assert_eq!(verdict.disposal, Disposal::Uncertain);
        assert_eq!(verdict.cue, None);
        assert_eq!(
            verdict.rationale,
            "No heuristic condition was confidently met."
        );
        assert!((verdict.confidence - CONFIDENCE_FLOOR).abs() < f32::EPSILON);
    }

    #[test]
    fn first_matching_rule_wins() {
        // Dark and colorless satisfies black_plastic before anything else.
        let verdict = classify(&table(), &features(30.0, 0.1, 0.2, 0.1)).unwrap();
        assert_eq!(verdict.disposal, Disposal::GeneralWaste);
        assert_eq!(verdict.cue.as_deref(), Some("black_plastic"));
    }

    #[test]
    fn classification_is_deterministic() {
        let input = features(25.0, 0.6, 0.3, 0.7);
        assert_eq!(
            classify(&table(), &input).unwrap(),
            classify(&table(), &input).unwrap()
        );
    }

    #[test]
    fn out_of_range_brightness_fails_validation() {
        let result = classify(&table(), &features(180.0, 0.5, -5.0, 0.5));
        assert!(matches!(
            result,
            Err(ValidationError::FeatureOutOfRange {
                feature: "brightness",
                ..
            })
        ));
    }

    #[test]
    fn out_of_range_saturation_fails_validation() {
        let result = classify(&table(), &features(180.0, 300.0, 0.5, 0.5));
        assert!(matches!(
            result,
            Err(ValidationError::FeatureOutOfRange {
                feature: "dominant_saturation",
                ..
            })
        ));
    }

    #[test]
    fn non_finite_feature_fails_validation() {
        let result = classify(&table(), &features(f32::NAN, 0.5, 0.5, 0.5));
        assert!(matches!(
            result,
            Err(ValidationError::FeatureOutOfRange {
                feature: "dominant_hue",
                ..
            })
        ));
    }

    #[test]
    fn confidence_stays_inside_documented_band() {
        assert!((CONFIDENCE_FLOOR..=CONFIDENCE_CEIL).contains(&confidence(0, 0.1)));
        assert!((CONFIDENCE_FLOOR..=CONFIDENCE_CEIL).contains(&confidence(4, 0.5)));
        assert!(confidence(4, 0.5) > confidence(1, 0.1));
    }

    #[test]
    fn impact_statement_is_pinned_to_the_matched_rule() {
        let dark = features(30.0, 0.1, 0.2, 0.1);
        let first = classify(&table(), &dark).unwrap();
        let second = classify(&table(), &dark).unwrap();
        assert_eq!(first.impact, second.impact);
        assert_eq!(first.impact, "Good catch.");
    }

    #[test]
    fn helper_rules_match_on_resolved_bounds() {
        let helper = rule("shiny_film", Some((0.55, 1.0)), Some((0.0, 0.25)), Some((0.45, 1.0)), Disposal::GeneralWaste);
        assert!(helper.matches(&features(0.0, 0.1, 0.9, 0.6)));
        assert!(!helper.matches(&features(0.0, 0.1, 0.9, 0.1)));
        assert_eq!(helper.bound_count(), 3);
    }
}
