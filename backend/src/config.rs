use std::collections::BTreeMap;
use std::env;

use serde::{Deserialize, Serialize};
use shared::{Disposal, EmissionCategory};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question '{question}': {reason}")]
    InvalidQuestion { question: String, reason: String },
    #[error("question '{question}' option '{option}': unknown category '{category}'")]
    UnknownCategory {
        question: String,
        option: String,
        category: String,
    },
    #[error("unknown category '{0}' in action catalog")]
    UnknownActionCategory(String),
    #[error("no actions configured for category {0}")]
    MissingActions(EmissionCategory),
    #[error("action catalog holds {0} distinct actions, at least 3 are required")]
    TooFewActions(usize),
    #[error("summary bands must be ordered by ascending max_total")]
    UnorderedSummaryBands,
    #[error("rule '{cue}': {reason}")]
    InvalidRule { cue: String, reason: String },
    #[error("unknown disposal '{0}' in impact statements")]
    UnknownImpactDisposal(String),
    #[error("impact statements missing for disposal {0}")]
    MissingImpact(Disposal),
    #[error("daily tip list is empty")]
    NoTips,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub questionnaire: BTreeMap<String, QuestionConfig>,
    pub actions: BTreeMap<String, Vec<String>>,
    pub summaries: SummaryConfig,
    pub rules: Vec<RuleConfig>,
    pub uncertain: UncertainConfig,
    pub impact: BTreeMap<String, Vec<String>>,
    pub tips: Vec<String>,
    pub ollama: OllamaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionConfig {
    pub prompt: String,
    pub options: BTreeMap<String, OptionConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionConfig {
    pub label: String,
    pub category: String,
    pub weight: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    pub bands: Vec<SummaryBand>,
    pub default: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryBand {
    pub max_total: f32,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    pub cue: String,
    pub when: FeatureBounds,
    pub disposal: String,
    pub rationale: String,
    pub action: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureBounds {
    #[serde(default)]
    pub hue: Option<Bound>,
    #[serde(default)]
    pub saturation: Option<Bound>,
    #[serde(default)]
    pub brightness: Option<Bound>,
    #[serde(default)]
    pub texture: Option<Bound>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bound {
    #[serde(default)]
    pub min: Option<f32>,
    #[serde(default)]
    pub max: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UncertainConfig {
    pub rationale: String,
    pub action: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub model: String,
    pub system_prompt: String,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigurationError> {
        let path = env::var("GREENGUARD_CONFIG").unwrap_or_else(|_| {
            let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
            format!("{}/../config/greenguard.json", manifest_dir)
        });
        Self::load_from(&path)
    }

    pub fn load_from(path: &str) -> Result<Self, ConfigurationError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_string(),
            source,
        })?;
        let config: AppConfig = serde_json::from_str(&raw)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::catalog::EngineContext;
    use crate::engine::{emission, material};
    use shared::ImageFeatureVector;

    fn shipped_config() -> AppConfig {
        let path = format!(
            "{}/../config/greenguard.json",
            env!("CARGO_MANIFEST_DIR")
        );
        AppConfig::load_from(&path).unwrap()
    }

    #[test]
    fn shipped_config_builds_a_context() {
        let context = EngineContext::from_config(&shipped_config()).unwrap();
        assert!(!context.rules.rules().is_empty());
        assert!(!shipped_config().tips.is_empty());
        assert!(context.catalog.question("car_travel").is_some());
    }

    #[test]
    fn missing_config_file_is_an_io_error() {
        assert!(matches!(
            AppConfig::load_from("/definitely/not/here.json"),
            Err(ConfigurationError::Io { .. })
        ));
    }

    #[test]
    fn shipped_questionnaire_scores_end_to_end() {
        let context = EngineContext::from_config(&shipped_config()).unwrap();
        let answers = [
            ("car_travel", "over_600"),
            ("electricity", "150_to_400"),
            ("cooling", "sometimes"),
            ("diet", "mixed"),
            ("recycling", "some"),
            ("shopping", "rarely"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let profile = emission::score(&context.catalog, &answers).unwrap();
        assert_eq!(profile.scores.len(), 5);
        assert_eq!(
            profile.scores[0].category,
            shared::EmissionCategory::Transport
        );
        assert_eq!(profile.actions.len(), 3);
        assert!(!profile.summary.is_empty());
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
    fn shipped_rules_classify_bright_smooth_items_as_recyclable() {
        let context = EngineContext::from_config(&shipped_config()).unwrap();
        let verdict = material::classify(&context.rules, &features(200.0, 0.05, 0.9, 0.1)).unwrap();
        assert_eq!(verdict.disposal, Disposal::Recyclable);
    }

    #[test]
    fn shipped_rules_send_warm_dim_items_to_the_sink_first() {
        let context = EngineContext::from_config(&shipped_config()).unwrap();
        let verdict = material::classify(&context.rules, &features(25.0, 0.6, 0.3, 0.7)).unwrap();
        assert_eq!(verdict.disposal, Disposal::RinseFirst);
    }

    #[test]
    fn shipped_rules_admit_uncertainty_at_mid_range() {
        let context = EngineContext::from_config(&shipped_config()).unwrap();
        let verdict = material::classify(&context.rules, &features(180.0, 0.5, 0.5, 0.5)).unwrap();
        assert_eq!(verdict.disposal, Disposal::Uncertain);
    }
}
