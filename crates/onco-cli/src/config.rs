//! Engine configuration: TOML file plus command-line overrides.

use std::path::Path;

use anyhow::{Context, Result};
use onco_model::EngineOptions;
use tracing::info;

use crate::cli::{ProtocolsArgs, SubstancesArgs};

/// Reads engine options from `path`, or the defaults when no file is given.
///
/// Missing keys keep their defaults.
pub fn load_options(path: Option<&Path>) -> Result<EngineOptions> {
    let Some(path) = path else {
        return Ok(EngineOptions::default());
    };
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let options =
        parse_options(&content).with_context(|| format!("parse config {}", path.display()))?;
    info!(path = %path.display(), "loaded configuration");
    Ok(options)
}

/// Parses and validates a TOML configuration document.
pub fn parse_options(content: &str) -> Result<EngineOptions> {
    let options: EngineOptions = toml::from_str(content)?;
    options.validate()?;
    Ok(options)
}

/// Applies the `substances` flags on top of `options`.
pub fn apply_substance_args(options: &mut EngineOptions, args: &SubstancesArgs) {
    let substances = &mut options.substances;
    if let Some(mode) = args.mode {
        substances.mode = mode.into();
    }
    if let Some(threshold) = args.threshold {
        substances.threshold = threshold;
    }
    if let Some(max_per_entry) = args.max_per_entry {
        substances.max_per_entry = max_per_entry;
    }
}

/// Applies the `protocols` flags on top of `options`.
pub fn apply_protocol_args(options: &mut EngineOptions, args: &ProtocolsArgs) {
    let protocols = &mut options.protocols;
    if let Some(slot_count) = args.slot_count {
        protocols.slot_count = Some(slot_count);
    }
    if let Some(code_cutoff) = args.code_cutoff {
        protocols.code_cutoff = code_cutoff;
    }
    if let Some(threshold) = args.substance_threshold {
        protocols.substance_threshold = threshold;
    }
}
