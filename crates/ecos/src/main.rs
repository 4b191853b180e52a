mod commands;
mod logging;
mod prompt;
mod ui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ecos")]
#[command(about = "Cost analytics on AWS CUR: keep dbt files in sync and manage cloud resources", long_about = None)]
struct Cli {
    /// Path to .ecos.yaml (provision and destroy)
    #[arg(long, global = true, env = "ECOS_CONFIG")]
    config: Option<PathBuf>,
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect or regenerate the dbt files derived from .ecos.yaml
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Create the cloud resources named in .ecos.yaml
    Provision {
        /// Record the configuration only; do not touch the cloud
        #[arg(long)]
        skip: bool,
        /// Datasource plugin (defaults to data_source in .ecos.yaml)
        #[arg(long)]
        source: Option<String>,
    },
    /// Destroy the cloud resources named in .ecos.yaml
    Destroy {
        /// Datasource plugin (defaults to data_source in .ecos.yaml)
        #[arg(long)]
        source: Option<String>,
    },
    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show differences between .ecos.yaml and the generated dbt files
    Diff {
        /// Project root containing .ecos.yaml
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Regenerate dbt_project.yml and the dbt profile from .ecos.yaml
    Generate {
        /// Project root containing .ecos.yaml
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
        /// Overwrite files that were edited by hand
        #[arg(long)]
        force: bool,
    },
    /// Validate .ecos.yaml and fail if the dbt files have drifted
    Check {
        /// Project root containing .ecos.yaml
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
        /// Proceed even if the dbt files differ from .ecos.yaml
        #[arg(long)]
        ignore_drift: bool,
    },
}

impl Cli {
    /// Config file whose `global.log_level` seeds the log filter.
    fn log_config_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config {
            return Some(path.clone());
        }
        match &self.command {
            Commands::Config(
                ConfigCommands::Diff { project_dir, .. }
                | ConfigCommands::Generate { project_dir, .. }
                | ConfigCommands::Check { project_dir, .. },
            ) => Some(project_dir.join(ecos_config::CONFIG_FILENAME)),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_level = ecos_config::load_or_default(cli.log_config_path().as_deref())
        .ok()
        .map(|cfg| cfg.global.log_level);
    logging::init(cli.verbose, config_level.as_deref());

    match cli.command {
        Commands::Version => {
            println!("ecos {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Config(cmd) => {
            commands::config::handle(cmd)?;
        }
        Commands::Provision { skip, source } => {
            commands::provision::handle(cli.config.as_deref(), source.as_deref(), skip).await?;
        }
        Commands::Destroy { source } => {
            commands::destroy::handle(cli.config.as_deref(), source.as_deref()).await?;
        }
    }

    Ok(())
}
