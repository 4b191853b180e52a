use crate::result::ResourceResult;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CloudError {
    #[error(
        "unsupported datasource '{name}' (available: {})",
        list_or_none(.available)
    )]
    UnsupportedDatasource { name: String, available: Vec<String> },

    #[error("{0}")]
    InvalidConfig(String),

    #[error("prerequisite validation failed: {0}")]
    Prerequisite(String),

    #[error("{operation} failed: {message}")]
    Api { operation: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error("plugin '{plugin}' does not support {capability}")]
    MissingCapability {
        plugin: String,
        capability: &'static str,
    },

    #[error("failed to back up {} before destruction: {source}", .path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to restore config backup {}: {source}", .path.display())]
    Restore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create {}", failed_names(.results))]
    CreationFailed { results: Vec<ResourceResult> },

    #[error("failed to destroy {}; configuration restored", failed_names(.results))]
    DestructionFailed { results: Vec<ResourceResult> },

    #[error(transparent)]
    Plugin(#[from] CloudError),
}

fn list_or_none(names: &[String]) -> String {
    if names.is_empty() {
        "none".to_string()
    } else {
        names.join(", ")
    }
}

fn failed_names(results: &[ResourceResult]) -> String {
    results
        .iter()
        .filter(|r| r.is_failed())
        .map(|r| format!("{} {}", r.kind, r.name))
        .collect::<Vec<_>>()
        .join(", ")
}
