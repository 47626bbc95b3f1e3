//! Configuration options for substance and protocol resolution.
//!
//! Every option has a default, so a partial TOML file deserializes cleanly.
//! Thresholds are fractions in `[0, 1]`; scores are compared on the 0–100
//! scale internally (see [`crate::Score::meets`]).

use serde::{Deserialize, Serialize};

use crate::error::OptionsError;

/// Default similarity threshold for substance matching.
pub const DEFAULT_THRESHOLD: f64 = 0.85;
/// Default cap of kept candidates per canonical entry.
pub const DEFAULT_MAX_PER_ENTRY: usize = 2;
/// Default split-indicator pattern of the collapsed mode.
pub const DEFAULT_SPLIT_PATTERN: &str = r"[/,;+]|\bund\b|\boder\b";
/// Default cutoff for direct protocol-code matches.
pub const DEFAULT_CODE_CUTOFF: f64 = 0.90;
/// Default threshold for substance extraction from protocol text.
pub const DEFAULT_PROTOCOL_THRESHOLD: f64 = 0.90;
/// Default prefix of the slot columns in the protocol reference table.
pub const DEFAULT_SLOT_PREFIX: &str = "substanz_";
/// Default name of the code column in the protocol reference table.
pub const DEFAULT_CODE_COLUMN: &str = "code";
/// A protocol never lists the same substance twice.
pub const PROTOCOL_MAX_PER_ENTRY: usize = 1;
/// Default score floor of the built-in vocabulary index.
pub const DEFAULT_MIN_SCORE: f64 = 75.0;
/// Default number of tokens a window may differ from an entry's length.
pub const DEFAULT_FLEX: usize = 1;

/// Shape of the substance output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// Only the best hit per record, unnumbered columns.
    Atomic,
    /// All kept hits, numbered columns.
    #[default]
    MultiHit,
    /// Legacy single-winner resolution with `; `-joined cells.
    Collapsed,
}

impl OutputMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Atomic => "atomic",
            Self::MultiHit => "multi-hit",
            Self::Collapsed => "collapsed",
        }
    }
}

/// Options for substance records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubstanceOptions {
    /// Minimum similarity as a fraction in `[0, 1]`.
    pub threshold: f64,
    /// How often the same canonical entry may appear for one record.
    pub max_per_entry: usize,
    pub mode: OutputMode,
    /// Records matching this pattern skip tie-breaking in collapsed mode.
    pub split_pattern: String,
}

impl Default for SubstanceOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            max_per_entry: DEFAULT_MAX_PER_ENTRY,
            mode: OutputMode::default(),
            split_pattern: DEFAULT_SPLIT_PATTERN.to_string(),
        }
    }
}

impl SubstanceOptions {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_max_per_entry(mut self, max_per_entry: usize) -> Self {
        self.max_per_entry = max_per_entry;
        self
    }

    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        check_fraction("substances.threshold", self.threshold)?;
        if self.max_per_entry == 0 {
            return Err(OptionsError::ZeroCount {
                name: "substances.max_per_entry",
            });
        }
        Ok(())
    }
}

/// Options for protocol records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolOptions {
    /// Cutoff for the direct code match, fraction in `[0, 1]`.
    pub code_cutoff: f64,
    /// Threshold for substance extraction, fraction in `[0, 1]`.
    pub substance_threshold: f64,
    pub slot_prefix: String,
    pub code_column: String,
    /// Number of slot columns; detected from the reference header when unset.
    pub slot_count: Option<usize>,
}

impl Default for ProtocolOptions {
    fn default() -> Self {
        Self {
            code_cutoff: DEFAULT_CODE_CUTOFF,
            substance_threshold: DEFAULT_PROTOCOL_THRESHOLD,
            slot_prefix: DEFAULT_SLOT_PREFIX.to_string(),
            code_column: DEFAULT_CODE_COLUMN.to_string(),
            slot_count: None,
        }
    }
}

impl ProtocolOptions {
    pub fn with_slot_count(mut self, slot_count: usize) -> Self {
        self.slot_count = Some(slot_count);
        self
    }

    /// Names of the slot columns for `count` slots (`substanz_1` …).
    pub fn slot_columns(&self, count: usize) -> Vec<String> {
        (1..=count)
            .map(|index| format!("{}{index}", self.slot_prefix))
            .collect()
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        check_fraction("protocols.code_cutoff", self.code_cutoff)?;
        check_fraction("protocols.substance_threshold", self.substance_threshold)?;
        if self.slot_count == Some(0) {
            return Err(OptionsError::ZeroCount {
                name: "protocols.slot_count",
            });
        }
        Ok(())
    }
}

/// Options of the built-in vocabulary index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherOptions {
    /// Scores below this floor (0–100) are never reported.
    pub min_score: f64,
    /// Window sizes range over `entry_tokens ± flex`.
    pub flex: usize,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            flex: DEFAULT_FLEX,
        }
    }
}

impl MatcherOptions {
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(0.0..=100.0).contains(&self.min_score) {
            return Err(OptionsError::ScoreOutOfRange {
                name: "matcher.min_score",
                value: self.min_score,
            });
        }
        Ok(())
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Shard records across worker threads.
    pub parallel: bool,
    pub substances: SubstanceOptions,
    pub protocols: ProtocolOptions,
    pub matcher: MatcherOptions,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            parallel: true,
            substances: SubstanceOptions::default(),
            protocols: ProtocolOptions::default(),
            matcher: MatcherOptions::default(),
        }
    }
}

impl EngineOptions {
    pub fn validate(&self) -> Result<(), OptionsError> {
        self.substances.validate()?;
        self.protocols.validate()?;
        self.matcher.validate()
    }
}

fn check_fraction(name: &'static str, value: f64) -> Result<(), OptionsError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(OptionsError::FractionOutOfRange { name, value })
    }
}
