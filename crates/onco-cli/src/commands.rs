use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use onco_core::{ProgressHook, ProtocolPipeline, SubstancePipeline, SubstanceRecords};
use onco_ingest::{load_free_text_column, load_protocol_reference, load_substance_vocabulary};
use onco_model::EngineOptions;
use onco_normalization::normalize;
use onco_output::{
    OutputFormat, OutputTable, render_collapsed, render_protocols, render_substances,
};
use tracing::{debug, info_span, trace};

use crate::cli::{IoArgs, NormalizeArgs, ProtocolsArgs, SubstancesArgs};
use crate::config::{apply_protocol_args, apply_substance_args};
use crate::logging::redact_value;
use crate::types::RunSummary;

pub fn run_substances(
    args: &SubstancesArgs,
    options: &EngineOptions,
    show_progress: bool,
) -> Result<RunSummary> {
    let io = &args.io;
    let span = info_span!("substances", input = %io.input.display());
    let _guard = span.enter();
    let started = Instant::now();

    let mut options = options.clone();
    apply_substance_args(&mut options, args);
    options.validate().context("invalid substance options")?;

    let values = load_free_text_column(&io.input, &io.column, io.delimiter)
        .context("load free-text input")?;
    let vocabulary = load_substance_vocabulary(&io.reference, &args.reference_column, io.delimiter)
        .context("load substance vocabulary")?;

    let mut pipeline = SubstancePipeline::from_vocabulary(
        &vocabulary,
        options.substances.clone(),
        &options.matcher,
    )
    .context("build substance matcher")?
    .with_parallel(options.parallel);
    let bar = progress_bar(values.len(), show_progress);
    if let Some(bar) = &bar {
        pipeline = pipeline.with_progress(progress_hook(bar));
    }
    let run = pipeline.run(&values).context("resolve substances")?;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    let table = match &run.records {
        SubstanceRecords::Resolved(records) => {
            for record in records.iter().filter(|r| r.hits.is_empty()) {
                trace!(
                    record = record.id.get(),
                    original = redact_value(&record.original),
                    "no substance found"
                );
            }
            render_substances(records, run.mode)
        }
        SubstanceRecords::Collapsed(records) => {
            for record in records.iter().filter(|r| r.matched_to.is_empty()) {
                trace!(
                    record = record.id.get(),
                    original = redact_value(&record.original),
                    "no substance found"
                );
            }
            render_collapsed(records)
        }
    };
    let output = write_table(&table, io, "substances")?;

    Ok(RunSummary {
        command: "substances",
        mode: Some(run.mode),
        input: io.input.clone(),
        output,
        format: io.format.into(),
        stats: run.stats,
        reference_issues: Vec::new(),
        elapsed: started.elapsed(),
    })
}

pub fn run_protocols(
    args: &ProtocolsArgs,
    options: &EngineOptions,
    show_progress: bool,
) -> Result<RunSummary> {
    let io = &args.io;
    let span = info_span!("protocols", input = %io.input.display());
    let _guard = span.enter();
    let started = Instant::now();

    let mut options = options.clone();
    apply_protocol_args(&mut options, args);
    options.validate().context("invalid protocol options")?;

    let values = load_free_text_column(&io.input, &io.column, io.delimiter)
        .context("load free-text input")?;
    let reference = load_protocol_reference(&io.reference, &options.protocols, io.delimiter)
        .context("load protocol reference")?;
    let width = reference.width();

    let (pipeline, issues) = ProtocolPipeline::from_reference(
        reference.entries,
        width,
        options.protocols.clone(),
        &options.matcher,
    )
    .context("build protocol matcher")?;
    let mut pipeline = pipeline.with_parallel(options.parallel);
    let bar = progress_bar(values.len(), show_progress);
    if let Some(bar) = &bar {
        pipeline = pipeline.with_progress(progress_hook(bar));
    }
    let run = pipeline.run(&values).context("resolve protocols")?;
    if let Some(bar) = bar {
        bar.finish_and_clear();
    }

    for record in run.records.iter().filter(|r| r.code.is_none()) {
        trace!(
            record = record.id.get(),
            original = redact_value(&record.original),
            "no protocol code found"
        );
    }
    let table = render_protocols(&run.records, &reference.slot_columns);
    let output = write_table(&table, io, "protocols")?;

    Ok(RunSummary {
        command: "protocols",
        mode: None,
        input: io.input.clone(),
        output,
        format: io.format.into(),
        stats: run.stats,
        reference_issues: issues,
        elapsed: started.elapsed(),
    })
}

/// Normalizes every argument, one result per line.
pub fn run_normalize(args: &NormalizeArgs) -> Vec<String> {
    args.texts
        .iter()
        .map(|text| {
            let normalized = normalize(text);
            debug!(
                input = redact_value(text),
                output = redact_value(&normalized),
                "normalized"
            );
            normalized
        })
        .collect()
}

/// `<dir of INPUT>/<stem of INPUT>_<command>.<format>` unless `--output` is set.
pub fn output_path(io: &IoArgs, command: &str) -> PathBuf {
    if let Some(path) = &io.output {
        return path.clone();
    }
    let stem = io
        .input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "oncomatch".to_string());
    let format: OutputFormat = io.format.into();
    io.input
        .with_file_name(format!("{stem}_{command}.{}", format.as_str()))
}

fn write_table(table: &OutputTable, io: &IoArgs, command: &str) -> Result<PathBuf> {
    let path = output_path(io, command);
    table
        .write_to_path(&path, io.format.into(), io.output_delimiter)
        .with_context(|| format!("write results to {}", path.display()))?;
    Ok(path)
}

fn progress_bar(len: usize, enabled: bool) -> Option<ProgressBar> {
    if !enabled || len == 0 || !io::stderr().is_terminal() {
        return None;
    }
    let bar = ProgressBar::new(len as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style.progress_chars("#>-"));
    Some(bar)
}

fn progress_hook(bar: &ProgressBar) -> ProgressHook {
    let bar = bar.clone();
    Arc::new(move |finished| bar.inc(finished))
}
