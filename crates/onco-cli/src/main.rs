//! oncomatch: resolve oncology substance and protocol free text.

use std::io::{self, IsTerminal};

use anyhow::Result;
use clap::{ColorChoice, Parser};
use onco_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use onco_cli::commands::{run_normalize, run_protocols, run_substances};
use onco_cli::config::load_options;
use onco_cli::logging::{LogConfig, LogFormat, init_logging};
use onco_cli::types::RunSummary;
use tracing::level_filters::LevelFilter;

mod summary;

use crate::summary::print_summary;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(Some(summary)) => {
            print_summary(&summary);
            0
        }
        Ok(None) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<Option<RunSummary>> {
    let show_progress = !cli.no_progress && cli.log_file.is_none();
    match &cli.command {
        Command::Substances(args) => {
            let mut options = load_options(cli.config.as_deref())?;
            options.parallel &= !cli.no_parallel;
            run_substances(args, &options, show_progress).map(Some)
        }
        Command::Protocols(args) => {
            let mut options = load_options(cli.config.as_deref())?;
            options.parallel &= !cli.no_parallel;
            run_protocols(args, &options, show_progress).map(Some)
        }
        Command::Normalize(args) => {
            for line in run_normalize(args) {
                println!("{line}");
            }
            Ok(None)
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    }
    .with_log_data(cli.log_data);
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
