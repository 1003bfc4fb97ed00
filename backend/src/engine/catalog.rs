use std::collections::{BTreeMap, HashSet};

use shared::{Disposal, EmissionCategory, ImageFeatureVector, OptionInfo, QuestionInfo};
use strum::IntoEnumIterator;

use super::emission::RECOMMENDED_ACTIONS;
use crate::config::{AppConfig, Bound, ConfigurationError};

pub const HUE_MAX: f32 = 360.0;
pub const UNIT_MAX: f32 = 1.0;

#[derive(Debug, Clone)]
pub struct WeightedOption {
    pub label: String,
    pub weight: f32,
}

#[derive(Debug, Clone)]
pub struct QuestionSpec {
    pub prompt: String,
    pub category: EmissionCategory,
    pub options: BTreeMap<String, WeightedOption>,
}

// Immutable scoring tables, cross-validated once at startup. The scorers only
// ever see this typed form, never the raw config document.
#[derive(Debug, Clone)]
pub struct ScoringCatalog {
    questions: BTreeMap<String, QuestionSpec>,
    actions: BTreeMap<EmissionCategory, Vec<String>>,
    bands: Vec<(f32, String)>,
    default_summary: String,
}

impl ScoringCatalog {
    fn from_config(config: &AppConfig) -> Result<Self, ConfigurationError> {
        let questions = build_questions(config)?;
        let actions = build_actions(config)?;

        let bands = config.summaries.bands.clone();
        if bands.windows(2).any(|w| w[0].max_total > w[1].max_total) {
            return Err(ConfigurationError::UnorderedSummaryBands);
        }

        Ok(Self {
            questions,
            actions,
            bands: bands.into_iter().map(|b| (b.max_total, b.text)).collect(),
            default_summary: config.summaries.default.clone(),
        })
    }

    pub fn questions(&self) -> impl Iterator<Item = (&String, &QuestionSpec)> {
        self.questions.iter()
    }

    pub fn question(&self, id: &str) -> Option<&QuestionSpec> {
        self.questions.get(id)
    }

    pub fn actions(&self, category: EmissionCategory) -> &[String] {
        self.actions.get(&category).map_or(&[], Vec::as_slice)
    }

    pub fn summary_for(&self, total: f32) -> &str {
        for (max_total, text) in &self.bands {
            if total < *max_total {
                return text;
            }
        }
        &self.default_summary
    }

    pub fn question_infos(&self) -> Vec<QuestionInfo> {
        self.questions
            .iter()
            .map(|(id, question)| QuestionInfo {
                id: id.clone(),
                prompt: question.prompt.clone(),
                options: question
                    .options
                    .iter()
                    .map(|(option_id, option)| OptionInfo {
                        id: option_id.clone(),
                        label: option.label.clone(),
                    })
                    .collect(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FeatureRange {
    pub min: f32,
    pub max: f32,
}

impl FeatureRange {
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone)]
pub struct HeuristicRule {
    pub cue: String,
    pub hue: Option<FeatureRange>,
    pub saturation: Option<FeatureRange>,
    pub brightness: Option<FeatureRange>,
    pub texture: Option<FeatureRange>,
    pub disposal: Disposal,
    pub rationale: String,
    pub action: String,
}

impl HeuristicRule {
    pub fn matches(&self, features: &ImageFeatureVector) -> bool {
        let checks = [
            (self.hue, features.dominant_hue),
            (self.saturation, features.dominant_saturation),
            (self.brightness, features.brightness),
            (self.texture, features.texture),
        ];
        checks
            .iter()
            .all(|(range, value)| range.map_or(true, |r| r.contains(*value)))
    }

    // How many features the rule actually pins down; feeds the confidence figure.
    pub fn bound_count(&self) -> usize {
        [self.hue, self.saturation, self.brightness, self.texture]
            .iter()
            .filter(|range| range.is_some())
            .count()
    }
}

// Ordered decision table; the first matching rule wins. No match falls back
// to the Uncertain verdict, never to a guess.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<HeuristicRule>,
    uncertain_rationale: String,
    uncertain_action: String,
    impact: BTreeMap<Disposal, Vec<String>>,
}

impl RuleTable {
    fn from_config(config: &AppConfig) -> Result<Self, ConfigurationError> {
        let mut rules = Vec::with_capacity(config.rules.len());
        for rule in &config.rules {
            let disposal: Disposal = rule.disposal.parse().map_err(|_| {
                ConfigurationError::InvalidRule {
                    cue: rule.cue.clone(),
                    reason: format!("unknown disposal '{}'", rule.disposal),
                }
            })?;
            if disposal == Disposal::Uncertain {
                return Err(ConfigurationError::InvalidRule {
                    cue: rule.cue.clone(),
                    reason: "Uncertain is reserved for the no-match fallback".to_string(),
                });
            }

            let built = HeuristicRule {
                cue: rule.cue.clone(),
                hue: resolve_bound(&rule.cue, "hue", rule.when.hue, HUE_MAX)?,
                saturation: resolve_bound(&rule.cue, "saturation", rule.when.saturation, UNIT_MAX)?,
                brightness: resolve_bound(&rule.cue, "brightness", rule.when.brightness, UNIT_MAX)?,
                texture: resolve_bound(&rule.cue, "texture", rule.when.texture, UNIT_MAX)?,
                disposal,
                rationale: rule.rationale.clone(),
                action: rule.action.clone(),
            };
            if built.bound_count() == 0 {
                return Err(ConfigurationError::InvalidRule {
                    cue: rule.cue.clone(),
                    reason: "rule has no feature bounds".to_string(),
                });
            }
            rules.push(built);
        }

        let mut impact = BTreeMap::new();
        for (name, lines) in &config.impact {
            let disposal: Disposal = name
                .parse()
                .map_err(|_| ConfigurationError::UnknownImpactDisposal(name.clone()))?;
            impact.insert(disposal, lines.clone());
        }
        for disposal in Disposal::iter() {
            if impact.get(&disposal).is_none_or(|lines| lines.is_empty()) {
                return Err(ConfigurationError::MissingImpact(disposal));
            }
        }

        Ok(Self {
            rules,
            uncertain_rationale: config.uncertain.rationale.clone(),
            uncertain_action: config.uncertain.action.clone(),
            impact,
        })
    }

    pub fn rules(&self) -> &[HeuristicRule] {
        &self.rules
    }

    pub fn uncertain_rationale(&self) -> &str {
        &self.uncertain_rationale
    }

    pub fn uncertain_action(&self) -> &str {
        &self.uncertain_action
    }

    pub fn impact_for(&self, disposal: Disposal, index: usize) -> &str {
        match self.impact.get(&disposal) {
            Some(lines) if !lines.is_empty() => &lines[index % lines.len()],
            _ => "",
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineContext {
    pub catalog: ScoringCatalog,
    pub rules: RuleTable,
}

impl EngineContext {
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigurationError> {
        if config.tips.is_empty() {
            return Err(ConfigurationError::NoTips);
        }
        Ok(Self {
            catalog: ScoringCatalog::from_config(config)?,
            rules: RuleTable::from_config(config)?,
        })
    }
}

fn build_questions(
    config: &AppConfig,
) -> Result<BTreeMap<String, QuestionSpec>, ConfigurationError> {
    let mut questions = BTreeMap::new();
    for (id, question) in &config.questionnaire {
        if question.options.is_empty() {
            return Err(ConfigurationError::InvalidQuestion {
                question: id.clone(),
                reason: "no options defined".to_string(),
            });
        }

        let mut category: Option<EmissionCategory> = None;
        let mut options = BTreeMap::new();
        for (option_id, option) in &question.options {
            let parsed: EmissionCategory = option.category.parse().map_err(|_| {
                ConfigurationError::UnknownCategory {
                    question: id.clone(),
                    option: option_id.clone(),
                    category: option.category.clone(),
                }
            })?;
            // A question contributes to exactly one category, no fan-out.
            match category {
                None => category = Some(parsed),
                Some(existing) if existing != parsed => {
                    return Err(ConfigurationError::InvalidQuestion {
                        question: id.clone(),
                        reason: format!(
                            "options span multiple categories ({} and {})",
                            existing, parsed
                        ),
                    });
                }
                Some(_) => {}
            }
            if !option.weight.is_finite() || option.weight < 0.0 {
                return Err(ConfigurationError::InvalidQuestion {
                    question: id.clone(),
                    reason: format!("option '{}' has invalid weight {}", option_id, option.weight),
                });
            }
            options.insert(
                option_id.clone(),
                WeightedOption {
                    label: option.label.clone(),
                    weight: option.weight,
                },
            );
        }

        let category = category.ok_or_else(|| ConfigurationError::InvalidQuestion {
            question: id.clone(),
            reason: "no options defined".to_string(),
        })?;
        questions.insert(
            id.clone(),
            QuestionSpec {
                prompt: question.prompt.clone(),
                category,
                options,
            },
        );
    }
    Ok(questions)
}

fn build_actions(
    config: &AppConfig,
) -> Result<BTreeMap<EmissionCategory, Vec<String>>, ConfigurationError> {
    let mut actions = BTreeMap::new();
    for (name, list) in &config.actions {
        let category: EmissionCategory = name
            .parse()
            .map_err(|_| ConfigurationError::UnknownActionCategory(name.clone()))?;
        actions.insert(category, list.clone());
    }
    for category in EmissionCategory::iter() {
        if actions.get(&category).is_none_or(|list| list.is_empty()) {
            return Err(ConfigurationError::MissingActions(category));
        }
    }
    let distinct: HashSet<&String> = actions.values().flatten().collect();
    if distinct.len() < RECOMMENDED_ACTIONS {
        return Err(ConfigurationError::TooFewActions(distinct.len()));
    }
    Ok(actions)
}

fn resolve_bound(
    cue: &str,
    feature: &'static str,
    bound: Option<Bound>,
    feature_max: f32,
) -> Result<Option<FeatureRange>, ConfigurationError> {
    let bound = match bound {
        Some(bound) => bound,
        None => return Ok(None),
    };
    let min = bound.min.unwrap_or(0.0);
    let max = bound.max.unwrap_or(feature_max);
    if !min.is_finite() || !max.is_finite() || min < 0.0 || max > feature_max || min > max {
        return Err(ConfigurationError::InvalidRule {
            cue: cue.to_string(),
            reason: format!(
                "'{}' bounds {}..{} fall outside 0..{}",
                feature, min, max, feature_max
            ),
        });
    }
    Ok(Some(FeatureRange { min, max }))
}
