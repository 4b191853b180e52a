//! Resource plugin capability traits
//!
//! Every datasource implements [`ResourcePlugin`]. Optional capabilities are
//! separate traits exposed through the `as_*` accessors, so callers can ask
//! a plugin what it supports without knowing its concrete type.

use crate::error::Result;
use crate::prompt::Prompter;
use crate::result::{ResourcePreview, ResourceResult};
use async_trait::async_trait;
use ecos_config::ProjectConfig;

#[async_trait]
pub trait ResourcePlugin: Send + Sync {
    /// Datasource identifier (e.g., "aws_cur")
    fn name(&self) -> &str;

    /// Verify credentials and environment before any resource call.
    async fn validate_prerequisites(&mut self) -> Result<()>;

    fn as_config_loader(&mut self) -> Option<&mut dyn ConfigLoader> {
        None
    }

    fn as_previewer(&self) -> Option<&dyn DestroyPreviewer> {
        None
    }

    fn as_creator(&self) -> Option<&dyn ResourceCreator> {
        None
    }

    fn as_destroyer(&self) -> Option<&dyn DestroyExecutor> {
        None
    }
}

/// Loads resource names from `.ecos.yaml`.
pub trait ConfigLoader: Send + Sync {
    fn load_from_config(&mut self, cfg: &ProjectConfig) -> Result<()>;
}

#[async_trait]
pub trait DestroyPreviewer: Send + Sync {
    /// One preview per candidate resource. Query failures are reported in
    /// [`ResourcePreview::error`], never as an `Err`.
    async fn describe_destruction(&self) -> Vec<ResourcePreview>;
}

/// Provisioning, one method per phase.
#[async_trait]
pub trait ResourceCreator: Send + Sync {
    async fn create_storage(&self) -> ResourceResult;

    async fn create_folders(&self) -> Vec<ResourceResult>;

    async fn create_workgroups(&self) -> Vec<ResourceResult>;
}

#[async_trait]
pub trait DestroyExecutor: Send + Sync {
    /// Destroy every configured resource.
    ///
    /// An empty result without error means the operator cancelled.
    async fn destroy_resources(&self, prompter: &dyn Prompter) -> Result<Vec<ResourceResult>>;
}
