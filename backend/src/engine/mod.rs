pub mod catalog;
pub mod emission;
pub mod features;
pub mod material;

use thiserror::Error;

// Malformed input is rejected up front; an inconclusive-but-valid input
// (all-zero profile, no matching rule) is an ordinary result, not an error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing answer for question '{0}'")]
    MissingAnswer(String),
    #[error("unknown question '{0}'")]
    UnknownQuestion(String),
    #[error("invalid option '{option}' for question '{question}'")]
    InvalidOption { question: String, option: String },
    #[error("feature '{feature}' out of range: {value} (expected {min} to {max})")]
    FeatureOutOfRange {
        feature: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
}
