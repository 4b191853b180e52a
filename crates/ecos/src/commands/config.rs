use crate::ui;
use anyhow::Context;
use colored::Colorize;
use ecos_core::{ArtifactRenderer, DriftDetector};
use std::path::Path;

use crate::ConfigCommands;

pub fn handle(cmd: ConfigCommands) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Diff { project_dir, json } => diff(&project_dir, json),
        ConfigCommands::Generate { project_dir, force } => generate(&project_dir, force),
        ConfigCommands::Check {
            project_dir,
            ignore_drift,
        } => check(&project_dir, ignore_drift),
    }
}

fn diff(project_dir: &Path, json: bool) -> anyhow::Result<()> {
    let detector = DriftDetector::new()?;
    let report = detector.detect_drift(project_dir)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.files.is_empty() {
        println!(
            "{}",
            "No generated dbt files found. Run `ecos config generate` to create them.".yellow()
        );
        return Ok(());
    }

    for (name, file) in &report.files {
        match &file.diff {
            Some(diff) if file.has_changes => {
                println!();
                ui::print_diff(diff);
            }
            _ => println!("  {} {} is in sync", "✓".green(), name.cyan()),
        }
    }

    println!();
    if report.has_changes {
        println!(
            "{}",
            format!(
                "Drift detected in {}. Run `ecos config generate --force` to overwrite.",
                report.drifted().join(", ")
            )
            .yellow()
            .bold()
        );
    } else {
        println!("{}", "All dbt files are in sync with .ecos.yaml".green());
    }
    Ok(())
}

fn generate(project_dir: &Path, force: bool) -> anyhow::Result<()> {
    let cfg = ecos_config::load_from_dir(project_dir).context("failed to load .ecos.yaml")?;

    if !force {
        let report = DriftDetector::new()?.detect_drift(project_dir)?;
        if report.has_changes {
            anyhow::bail!(
                "{} differ from .ecos.yaml; review with `ecos config diff` and re-run with --force to overwrite",
                report.drifted().join(", ")
            );
        }
    }

    let written = ArtifactRenderer::new()?.generate_all(&cfg, project_dir)?;
    println!("{}", "Generated dbt files:".bold());
    for path in written {
        println!("  {} {}", "✓".green(), path.display().to_string().cyan());
    }
    Ok(())
}

fn check(project_dir: &Path, ignore_drift: bool) -> anyhow::Result<()> {
    ecos_config::load_from_dir(project_dir).context("failed to load .ecos.yaml")?;
    println!("  {} .ecos.yaml is valid", "✓".green());

    DriftDetector::new()?.ensure_in_sync(project_dir, ignore_drift)?;
    if ignore_drift {
        println!("  {} drift check skipped", "-".dimmed());
    } else {
        println!("  {} dbt files are in sync", "✓".green());
    }
    Ok(())
}
