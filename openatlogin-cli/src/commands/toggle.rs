//! `openatlogin enable` / `openatlogin disable`
//!
//! Exit status is 0 even when individual steps fail; the summary shows which.

use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;

use openatlogin_launchd::{
    apply_in_background, CommandStep, DisableReport, EnableReport, Intent, StepOutcome,
    ToggleReport,
};

use crate::Controller;

pub fn run(controller: Controller, enabled: bool, json: bool) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    let report = runtime.block_on(apply_in_background(
        Arc::new(controller),
        Intent::from(enabled),
    ));

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to render report JSON")?
        );
        return Ok(());
    }

    match &report {
        ToggleReport::Enabled(r) => print_enable(r),
        ToggleReport::Disabled(r) => print_disable(r),
    }
    Ok(())
}

fn print_enable(report: &EnableReport) {
    headline(report.is_clean(), "Open at login enabled", report.label.as_str());
    step_line("agents dir", &report.create_dir);
    step_line("descriptor", &report.write_descriptor);
    println!("  {:<12}{}", "", report.descriptor_path.display().to_string().dimmed());
    command_line("bootstrap", &report.bootstrap);
    if let Some(kickstart) = &report.kickstart {
        command_line("kickstart", kickstart);
    }
}

fn print_disable(report: &DisableReport) {
    headline(report.is_clean(), "Open at login disabled", report.label.as_str());
    command_line("bootout", &report.bootout);
    step_line("descriptor", &report.remove_descriptor);
    println!("  {:<12}{}", "", report.descriptor_path.display().to_string().dimmed());
}

fn headline(clean: bool, text: &str, label: &str) {
    let mark = if clean { "✓".green().bold() } else { "!".yellow().bold() };
    println!("{mark} {text} ({label})");
}

fn step_line(name: &str, outcome: &StepOutcome) {
    println!("  {name:<12}{}", render(outcome));
}

fn command_line(name: &str, step: &CommandStep) {
    let status = step
        .status
        .map(|s| format!(" [status {s}]"))
        .unwrap_or_default();
    println!("  {name:<12}{}{}", render(&step.outcome), status.dimmed());
}

fn render(outcome: &StepOutcome) -> String {
    match outcome {
        StepOutcome::Done => "ok".green().to_string(),
        StepOutcome::Skipped => "skipped".bright_black().to_string(),
        StepOutcome::Failed { reason } => format!("{} {reason}", "failed:".red()),
    }
}
