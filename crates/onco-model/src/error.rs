use thiserror::Error;

/// Invalid configuration values. Always fatal.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OptionsError {
    #[error("{name} must be a fraction in [0, 1], got {value}")]
    FractionOutOfRange { name: &'static str, value: f64 },

    #[error("{name} must be in [0, 100], got {value}")]
    ScoreOutOfRange { name: &'static str, value: f64 },

    #[error("{name} must be at least 1")]
    ZeroCount { name: &'static str },

    #[error("invalid split pattern {pattern:?}: {message}")]
    InvalidSplitPattern { pattern: String, message: String },
}
