//! CLI argument definitions for oncomatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use onco_model::OutputMode;
use onco_output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "oncomatch",
    version,
    about = "Resolve oncology substance and protocol free text against reference lists",
    long_about = "Resolve free-text cancer-therapy descriptions against curated reference lists.\n\n\
                  `substances` maps each record to canonical substance names,\n\
                  `protocols` maps each record to a protocol code."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Engine configuration file (TOML). Command-line flags take precedence.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow free-text values in log output.
    ///
    /// Clinical free text can identify patients; it is redacted by default.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Resolve records on a single thread.
    #[arg(long = "no-parallel", global = true)]
    pub no_parallel: bool,

    /// Do not draw a progress bar.
    #[arg(long = "no-progress", global = true)]
    pub no_progress: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Map free-text substance descriptions to canonical substance names.
    Substances(SubstancesArgs),

    /// Map free-text protocol descriptions to protocol codes.
    Protocols(ProtocolsArgs),

    /// Print the normalized form of each argument.
    Normalize(NormalizeArgs),
}

/// Input and output flags shared by the batch commands.
#[derive(Args)]
pub struct IoArgs {
    /// CSV file holding the free-text column.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Reference table (CSV).
    #[arg(long = "reference", value_name = "CSV")]
    pub reference: PathBuf,

    /// Name of the free-text column in INPUT.
    #[arg(long = "column", default_value = "Bezeichnung")]
    pub column: String,

    /// Field delimiter of the input files (sniffed from the header when unset).
    #[arg(long = "delimiter", value_name = "CHAR", value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// Result file (default: next to INPUT, named after the command).
    #[arg(long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Result file format.
    #[arg(long = "format", value_enum, default_value = "csv")]
    pub format: FormatArg,

    /// Field delimiter of a CSV result file.
    #[arg(
        long = "output-delimiter",
        value_name = "CHAR",
        default_value = ",",
        value_parser = parse_delimiter
    )]
    pub output_delimiter: u8,
}

#[derive(Args)]
pub struct SubstancesArgs {
    #[command(flatten)]
    pub io: IoArgs,

    /// Column of the reference table holding the canonical names.
    #[arg(long = "reference-column", default_value = "substanz")]
    pub reference_column: String,

    /// Output shape.
    #[arg(long = "mode", value_enum)]
    pub mode: Option<ModeArg>,

    /// Minimum similarity as a fraction in [0, 1].
    #[arg(long = "threshold", value_name = "F")]
    pub threshold: Option<f64>,

    /// How often the same canonical name may be kept per record.
    #[arg(long = "max-per-entry", value_name = "N")]
    pub max_per_entry: Option<usize>,
}

#[derive(Args)]
pub struct ProtocolsArgs {
    #[command(flatten)]
    pub io: IoArgs,

    /// Number of substance slots of the reference table (detected when unset).
    #[arg(long = "slot-count", value_name = "N")]
    pub slot_count: Option<usize>,

    /// Cutoff for a direct code match, fraction in [0, 1].
    #[arg(long = "code-cutoff", value_name = "F")]
    pub code_cutoff: Option<f64>,

    /// Threshold for substance extraction, fraction in [0, 1].
    #[arg(long = "substance-threshold", value_name = "F")]
    pub substance_threshold: Option<f64>,
}

#[derive(Args)]
pub struct NormalizeArgs {
    /// Free-text values to normalize.
    #[arg(value_name = "TEXT", required = true)]
    pub texts: Vec<String>,
}

/// CLI output mode choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Atomic,
    MultiHit,
    Collapsed,
}

impl From<ModeArg> for OutputMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Atomic => Self::Atomic,
            ModeArg::MultiHit => Self::MultiHit,
            ModeArg::Collapsed => Self::Collapsed,
        }
    }
}

/// CLI result format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Csv,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Csv => Self::Csv,
            FormatArg::Json => Self::Json,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

/// Accepts a single ASCII character, or `tab` / `\t`.
pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ => match value.as_bytes() {
            [byte] if byte.is_ascii() && !byte.is_ascii_alphanumeric() => Ok(*byte),
            _ => Err(format!(
                "expected a single non-alphanumeric ASCII character, got {value:?}"
            )),
        },
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn delimiters() {
        assert_eq!(parse_delimiter(";"), Ok(b';'));
        assert_eq!(parse_delimiter("tab"), Ok(b'\t'));
        assert_eq!(parse_delimiter("\\t"), Ok(b'\t'));
        assert!(parse_delimiter("ab").is_err());
        assert!(parse_delimiter("a").is_err());
        assert!(parse_delimiter("").is_err());
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "oncomatch",
            "substances",
            "input.csv",
            "--reference",
            "substanzen.csv",
            "--mode",
            "collapsed",
            "--no-parallel",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert!(cli.no_parallel);
        assert!(matches!(cli.log_level, Some(LogLevelArg::Debug)));
        let Command::Substances(args) = cli.command else {
            panic!("expected substances");
        };
        assert_eq!(args.io.column, "Bezeichnung");
        assert_eq!(args.reference_column, "substanz");
        assert!(matches!(args.mode, Some(ModeArg::Collapsed)));
        assert_eq!(args.io.output_delimiter, b',');
    }

    #[test]
    fn normalize_requires_text() {
        assert!(Cli::try_parse_from(["oncomatch", "normalize"]).is_err());
    }
}
