//! ecos cloud resources
//!
//! Plugin abstraction for the cloud resources that back an ecos project
//! (result storage and query workgroups), plus the workflows that create
//! and destroy them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                    ecos CLI                      │
//! │             (ecos provision / destroy)           │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 ecos-cloud                       │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │          LifecycleOrchestrator            │   │
//! │  │   create phases · destroy + ConfigBackup  │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌────────────────┐  ┌──────────────────────┐   │
//! │  │ PluginRegistry │  │ trait ResourcePlugin │   │
//! │  └────────────────┘  └──────────────────────┘   │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼───────┐
//! │  aws_cur      │
//! │  (S3, Athena) │
//! └───────────────┘
//! ```

pub mod backup;
pub mod error;
pub mod lifecycle;
pub mod prompt;
pub mod provider;
pub mod registry;
pub mod result;

// Re-exports
pub use backup::{ConfigBackup, backup_path};
pub use error::{CloudError, LifecycleError, Result};
pub use lifecycle::{
    CreatePhase, CreateReport, DestroyOutcome, DestroyPlan, LifecycleOrchestrator, Provisioning,
};
pub use prompt::{ConfirmLevel, Confirmation, FixedPrompter, Prompter};
pub use provider::{ConfigLoader, DestroyExecutor, DestroyPreviewer, ResourceCreator, ResourcePlugin};
pub use registry::{PluginFactory, PluginRegistry};
pub use result::{ResourcePreview, ResourceResult, ResourceStatus};

/// Tag key marking a resource as created by ecos.
pub const MANAGED_TAG_KEY: &str = "ecos:managed";
/// Value of [`MANAGED_TAG_KEY`] on managed resources.
pub const MANAGED_TAG_VALUE: &str = "true";
/// Tag key carrying the project name.
pub const PROJECT_TAG_KEY: &str = "ecos:project";
