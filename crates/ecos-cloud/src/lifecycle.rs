//! Create and destroy workflows over a [`ResourcePlugin`]

use crate::backup::ConfigBackup;
use crate::error::LifecycleError;
use crate::prompt::{ConfirmLevel, Confirmation, Prompter};
use crate::provider::ResourcePlugin;
use crate::result::{ResourcePreview, ResourceResult, ResourceStatus};
use ecos_config::ProjectConfig;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Whether `create_resources` should touch the cloud at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioning {
    Auto,
    Skip,
}

/// Progress of the create flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatePhase {
    Pending,
    BucketCreated,
    FoldersCreated,
    WorkgroupsCreated,
    Done,
    Skipped,
}

#[derive(Debug, Clone)]
pub struct CreateReport {
    pub phase: CreatePhase,
    pub results: Vec<ResourceResult>,
    /// One line per partially created resource.
    pub warnings: Vec<String>,
}

/// Preview of a destroy, classified for confirmation.
#[derive(Debug, Clone)]
pub struct DestroyPlan {
    pub previews: Vec<ResourcePreview>,
}

impl DestroyPlan {
    pub fn has_unmanaged(&self) -> bool {
        self.previews
            .iter()
            .any(|p| !p.is_unknown() && !p.managed)
    }

    pub fn has_unknown(&self) -> bool {
        self.previews.iter().any(ResourcePreview::is_unknown)
    }

    /// Strong confirmation is required unless every resource is verifiably managed.
    pub fn confirm_level(&self) -> ConfirmLevel {
        if self.has_unmanaged() || self.has_unknown() {
            ConfirmLevel::Strong
        } else {
            ConfirmLevel::Standard
        }
    }
}

#[derive(Debug)]
pub enum DestroyOutcome {
    /// The operator answered no at the preview; nothing was touched.
    Declined,
    /// The plugin returned no results; the config was restored.
    Cancelled,
    /// Every resource was deleted or skipped; the config stays moved aside.
    Destroyed {
        results: Vec<ResourceResult>,
        backup_path: PathBuf,
    },
}

#[derive(Debug, Default)]
pub struct LifecycleOrchestrator;

impl LifecycleOrchestrator {
    pub fn new() -> Self {
        Self
    }

    /// Load resource names from the config (when supported) and validate
    /// prerequisites. Runs before any mutating call.
    pub async fn prepare(
        &self,
        plugin: &mut dyn ResourcePlugin,
        cfg: &ProjectConfig,
    ) -> Result<(), LifecycleError> {
        if let Some(loader) = plugin.as_config_loader() {
            loader.load_from_config(cfg)?;
        }
        plugin.validate_prerequisites().await?;
        debug!(plugin = plugin.name(), "plugin ready");
        Ok(())
    }

    /// Provision storage, folders and workgroups in order.
    ///
    /// Fails iff some resource failed; partial creations only produce warnings.
    #[tracing::instrument(skip(self, plugin), fields(plugin = plugin.name()))]
    pub async fn create_resources(
        &self,
        plugin: &dyn ResourcePlugin,
        provisioning: Provisioning,
    ) -> Result<CreateReport, LifecycleError> {
        if provisioning == Provisioning::Skip {
            info!("resource provisioning skipped");
            return Ok(CreateReport {
                phase: CreatePhase::Skipped,
                results: Vec::new(),
                warnings: Vec::new(),
            });
        }

        let creator = plugin
            .as_creator()
            .ok_or_else(|| LifecycleError::MissingCapability {
                plugin: plugin.name().to_string(),
                capability: "resource creation",
            })?;

        let mut phase = CreatePhase::Pending;
        let mut results = Vec::new();

        results.push(creator.create_storage().await);
        phase = advance(phase, CreatePhase::BucketCreated);

        results.extend(creator.create_folders().await);
        phase = advance(phase, CreatePhase::FoldersCreated);

        results.extend(creator.create_workgroups().await);
        phase = advance(phase, CreatePhase::WorkgroupsCreated);

        if results.iter().any(ResourceResult::is_failed) {
            return Err(LifecycleError::CreationFailed { results });
        }

        let warnings: Vec<String> = results
            .iter()
            .filter(|r| r.status == ResourceStatus::PartiallyCreated)
            .map(|r| {
                format!(
                    "{} {} was only partially configured: {}",
                    r.kind,
                    r.name,
                    r.warning.as_deref().unwrap_or("unknown step failed")
                )
            })
            .collect();
        for warning in &warnings {
            warn!("{warning}");
        }

        phase = advance(phase, CreatePhase::Done);
        info!(count = results.len(), "resource provisioning complete");
        Ok(CreateReport {
            phase,
            results,
            warnings,
        })
    }

    /// Ask the plugin what destroy would act on.
    pub async fn plan_destroy(
        &self,
        plugin: &dyn ResourcePlugin,
    ) -> Result<DestroyPlan, LifecycleError> {
        let previewer = plugin
            .as_previewer()
            .ok_or_else(|| LifecycleError::MissingCapability {
                plugin: plugin.name().to_string(),
                capability: "resource preview",
            })?;
        Ok(DestroyPlan {
            previews: previewer.describe_destruction().await,
        })
    }

    /// Confirm, back up the config, destroy, then keep or restore the backup.
    ///
    /// The config at `config_path` is left moved aside only when nothing
    /// failed and something was destroyed or skipped.
    #[tracing::instrument(skip(self, plugin, plan, prompter), fields(plugin = plugin.name()))]
    pub async fn destroy(
        &self,
        plugin: &dyn ResourcePlugin,
        plan: &DestroyPlan,
        config_path: &Path,
        prompter: &dyn Prompter,
    ) -> Result<DestroyOutcome, LifecycleError> {
        let destroyer = plugin
            .as_destroyer()
            .ok_or_else(|| LifecycleError::MissingCapability {
                plugin: plugin.name().to_string(),
                capability: "resource destruction",
            })?;

        let level = plan.confirm_level();
        if !prompter.confirm(&Confirmation::Destroy { level }) {
            info!("destruction declined");
            return Ok(DestroyOutcome::Declined);
        }

        let backup = ConfigBackup::create(config_path).await?;

        let results = match destroyer.destroy_resources(prompter).await {
            Ok(results) => results,
            Err(err) => {
                if let Err(restore_err) = backup.restore().await {
                    warn!(error = %err, "resource destruction failed");
                    return Err(restore_err);
                }
                return Err(err.into());
            }
        };

        if results.is_empty() {
            backup.restore().await?;
            info!("destruction cancelled, config restored");
            return Ok(DestroyOutcome::Cancelled);
        }

        if results.iter().any(ResourceResult::is_failed) {
            if let Err(restore_err) = backup.restore().await {
                warn!(
                    failed = results.iter().filter(|r| r.is_failed()).count(),
                    "resource destruction failed"
                );
                return Err(restore_err);
            }
            return Err(LifecycleError::DestructionFailed { results });
        }

        let backup_path = backup.keep();
        info!(
            count = results.len(),
            backup = %backup_path.display(),
            "resources destroyed"
        );
        Ok(DestroyOutcome::Destroyed {
            results,
            backup_path,
        })
    }
}

fn advance(from: CreatePhase, to: CreatePhase) -> CreatePhase {
    debug!(?from, ?to, "create phase");
    to
}
