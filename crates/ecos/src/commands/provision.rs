use crate::ui;
use anyhow::Context;
use colored::Colorize;
use ecos_cloud::{LifecycleError, LifecycleOrchestrator, Provisioning, ResourcePlugin};
use std::path::Path;

pub async fn handle(config_path: Option<&Path>, source: Option<&str>, skip: bool) -> anyhow::Result<()> {
    let cfg = ecos_config::load_config(config_path).context("failed to load .ecos.yaml")?;

    if skip {
        tracing::info!("resource provisioning skipped");
        println!(
            "{}",
            "Resource provisioning skipped. Run `ecos provision` when you are ready.".yellow()
        );
        return Ok(());
    }

    let mut plugin = super::load_plugin(source, &cfg)?;
    let orchestrator = LifecycleOrchestrator::new();

    println!(
        "{}",
        format!("Provisioning {} resources...", plugin.name()).blue().bold()
    );
    orchestrator.prepare(&mut *plugin, &cfg).await?;

    match orchestrator
        .create_resources(&*plugin, Provisioning::Auto)
        .await
    {
        Ok(report) => {
            ui::print_results(&report.results);
            if !report.warnings.is_empty() {
                println!();
                println!("{}", "Some resources were only partially configured:".yellow().bold());
                for warning in &report.warnings {
                    println!("  ⚠ {}", warning.yellow());
                }
            }
            println!();
            println!("{}", "✓ Resources are ready".green().bold());
            Ok(())
        }
        Err(err) => {
            if let LifecycleError::CreationFailed { results } = &err {
                ui::print_results(results);
            }
            Err(err.into())
        }
    }
}
