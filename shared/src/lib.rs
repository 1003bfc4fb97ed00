use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

// Variant order doubles as the fixed tiebreak priority when scores are equal.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumString,
)]
pub enum EmissionCategory {
    Transport,
    Energy,
    Diet,
    Waste,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: EmissionCategory,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionProfile {
    pub scores: Vec<CategoryScore>,
    pub actions: Vec<String>,
    pub summary: String,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display,
    EnumIter, EnumString,
)]
pub enum Disposal {
    Recyclable,
    RinseFirst,
    GeneralWaste,
    Uncertain,
}

// Dominant color is an HSV triplet; hue is in degrees (0-360), everything
// else is normalized to 0-1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageFeatureVector {
    pub dominant_hue: f32,
    pub dominant_saturation: f32,
    pub dominant_value: f32,
    pub brightness: f32,
    pub texture: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialVerdict {
    pub disposal: Disposal,
    pub rationale: String,
    pub action: String,
    pub impact: String,
    pub confidence: f32,
    pub cue: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootprintRequest {
    pub answers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub verdict: MaterialVerdict,
    pub features: ImageFeatureVector,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionInfo {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionInfo {
    pub id: String,
    pub prompt: String,
    pub options: Vec<OptionInfo>,
}
