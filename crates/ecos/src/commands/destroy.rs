use crate::prompt::StdinPrompter;
use crate::ui;
use anyhow::Context;
use colored::Colorize;
use ecos_cloud::{DestroyOutcome, LifecycleError, LifecycleOrchestrator};
use std::path::{Path, PathBuf};

pub async fn handle(config_path: Option<&Path>, source: Option<&str>) -> anyhow::Result<()> {
    let config_path: PathBuf = match config_path {
        Some(path) => path.to_path_buf(),
        None => ecos_config::find_config_file(&std::env::current_dir()?)
            .context("destroy needs the .ecos.yaml that names the resources")?,
    };
    let cfg = ecos_config::load_config(Some(&config_path)).context("failed to load .ecos.yaml")?;
    let mut plugin = super::load_plugin(source, &cfg)?;
    let orchestrator = LifecycleOrchestrator::new();

    orchestrator.prepare(&mut *plugin, &cfg).await?;
    let plan = orchestrator.plan_destroy(&*plugin).await?;
    ui::print_plan(&plan);

    let outcome = orchestrator
        .destroy(&*plugin, &plan, &config_path, &StdinPrompter)
        .await;

    match outcome {
        Ok(DestroyOutcome::Declined) => {
            println!("{}", "Destruction cancelled. Nothing was changed.".yellow());
        }
        Ok(DestroyOutcome::Cancelled) => {
            println!(
                "{}",
                format!(
                    "Destruction cancelled. {} was restored.",
                    config_path.display()
                )
                .yellow()
            );
        }
        Ok(DestroyOutcome::Destroyed {
            results,
            backup_path,
        }) => {
            ui::print_results(&results);
            println!();
            println!("{}", "✓ Resources destroyed".green().bold());
            println!(
                "  Configuration backed up to {}",
                backup_path.display().to_string().cyan()
            );
        }
        Err(err) => {
            if let LifecycleError::DestructionFailed { results } = &err {
                ui::print_results(results);
                println!();
            }
            return Err(err.into());
        }
    }
    Ok(())
}
