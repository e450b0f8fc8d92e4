//! Patch command implementation.
//!
//! With offsets from `--plan` or `--set` the run is non-interactive.
//! Otherwise the interactive flow prompts for whatever is missing.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use libpatcher_core::{
    FlowMode, FlowResult, FlowState, ObjectInspector, OffsetRequest, PatchContext, PatchEngine,
    PatchFlow, PatchPlan, PatchReport, PatchStatus, PreviewEntry, PreviewStatus, encode_hex,
    format_offset,
};
use owo_colors::OwoColorize;
use tracing::{debug, info};

use crate::cli::PatchArgs;
use crate::prompter::CliPrompter;

/// Run the patch command
pub fn run(args: PatchArgs) -> Result<()> {
    let plan = args.plan.as_deref().map(PatchPlan::load).transpose()?;
    let file = args
        .file
        .clone()
        .or_else(|| plan.as_ref().and_then(|p| p.file.clone()));
    let pairs = collect_pairs(plan.as_ref(), &args.set)?;
    let mode = if args.dry_run {
        FlowMode::Preview
    } else {
        FlowMode::Apply
    };

    let result = if pairs.is_empty() {
        match run_interactive(file, mode)? {
            Some(result) => result,
            None => {
                println!("\n{}", "Program terminated by user.".red().bold());
                return Ok(());
            }
        }
    } else {
        let Some(file) = file else {
            bail!("No target file: pass FILE or set `file` in the plan");
        };
        run_batch(&file, &pairs, mode)?
    };

    match result {
        FlowResult::Applied(report) => finish(&report, args.report.as_deref()),
        FlowResult::Previewed { context, entries } => {
            print_preview(&context, &entries);
            Ok(())
        }
    }
}

fn run_interactive(file: Option<PathBuf>, mode: FlowMode) -> Result<Option<FlowResult>> {
    let prompter = CliPrompter::new();
    let flow = PatchFlow::new(&prompter, &ObjectInspector).with_mode(mode);
    let start = file.map(FlowState::with_path).unwrap_or_else(FlowState::start);
    Ok(flow.run_from(start)?)
}

/// Patch (or preview) without prompting
pub fn run_batch(file: &Path, pairs: &[(String, String)], mode: FlowMode) -> Result<FlowResult> {
    let context = PatchContext::resolve(&ObjectInspector, file)?;
    println!(
        "{}",
        format!(
            "Detected architecture: {}\nPatches of {} will be applied.",
            context.arch(),
            context.arch().family_name()
        )
        .green()
        .bold()
    );

    let request = OffsetRequest::from_raw(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
    debug!("Request: {:?}", request);

    let engine = PatchEngine::new(&context);
    Ok(match mode {
        FlowMode::Apply => FlowResult::Applied(engine.apply(&request)?),
        FlowMode::Preview => {
            let entries = engine.preview(&request)?;
            FlowResult::Previewed { context, entries }
        }
    })
}

/// Parse one `--set kind=offsets` argument
pub fn parse_set_arg(arg: &str) -> Result<(String, String)> {
    let Some((kind, offsets)) = arg.split_once('=') else {
        bail!("Expected KIND=OFFSETS, got {:?}", arg);
    };
    let kind = kind.trim();
    if kind.is_empty() {
        bail!("Missing kind in {:?}", arg);
    }
    Ok((kind.to_string(), offsets.trim().to_string()))
}

/// Plan entries first, then `--set` arguments in command-line order
pub fn collect_pairs(plan: Option<&PatchPlan>, set: &[String]) -> Result<Vec<(String, String)>> {
    let mut pairs: Vec<(String, String)> = plan
        .map(|p| {
            p.offsets
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        })
        .unwrap_or_default();

    for arg in set {
        pairs.push(parse_set_arg(arg)?);
    }
    Ok(pairs)
}

fn finish(report: &PatchReport, report_path: Option<&Path>) -> Result<()> {
    print_report(report);

    if let Some(path) = report_path {
        report.save_json(path)?;
    }

    if !report.is_success() {
        bail!(
            "{} offset(s) were not patched",
            report.outcomes.len() - report.applied_count()
        );
    }
    Ok(())
}

fn print_report(report: &PatchReport) {
    println!();
    for outcome in &report.outcomes {
        let target = format!("{} @ {}", outcome.kind, format_offset(outcome.offset));
        match &outcome.status {
            PatchStatus::Applied { previous, written } => {
                let line = format!(
                    "Value of {} has been set ({} -> {})",
                    target,
                    encode_hex(previous),
                    encode_hex(written)
                );
                println!("{}", line.green());
            }
            PatchStatus::Failed(failure) => {
                let line = format!("Skipping {}: {}", target, failure);
                println!("{}", line.red());
            }
        }
    }

    info!(
        "{} applied, {} skipped, {} failed",
        report.applied_count(),
        report.skipped_count(),
        report.failed_count()
    );
    println!(
        "\n{}",
        format!(
            "Finished setting values. Elapsed time: {:.2} seconds.",
            report.elapsed.as_secs_f64()
        )
        .green()
        .bold()
    );
}

fn print_preview(context: &PatchContext, entries: &[PreviewEntry]) {
    println!(
        "\nDry run for {} ({}), nothing was written:",
        context.path().display(),
        context.arch()
    );
    for entry in entries {
        let target = format!("{} @ {}", entry.kind, format_offset(entry.offset));
        match &entry.status {
            PreviewStatus::Pending {
                current,
                replacement,
            } => println!(
                "  {}: {} -> {}",
                target,
                encode_hex(current),
                encode_hex(replacement).green()
            ),
            PreviewStatus::AlreadyApplied { bytes } => {
                println!("  {}: {} (already applied)", target, encode_hex(bytes).dimmed())
            }
            PreviewStatus::Failed(failure) => println!("  {}: {}", target, failure.red()),
        }
    }
}
