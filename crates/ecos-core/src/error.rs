use ecos_config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to load templates: {0}")]
    TemplateLoad(#[source] tera::Error),

    #[error("failed to render {artifact}: {source}")]
    Template {
        artifact: &'static str,
        #[source]
        source: tera::Error,
    },

    #[error("path {} exists but is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Error, Debug)]
pub enum DriftError {
    #[error(".ecos.yaml not found in {}", .0.display())]
    ConfigNotFound(PathBuf),

    #[error("failed to load .ecos.yaml: {0}")]
    Config(#[source] ConfigError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("failed to check {artifact}: {source}")]
    ReadArtifact {
        artifact: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "configuration drift detected in {}, please sync your files\nhint: run `ecos config generate`, or pass --ignore-drift",
        .files.join(", ")
    )]
    DriftDetected { files: Vec<String> },
}

impl From<ConfigError> for DriftError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NotFound { searched } => DriftError::ConfigNotFound(searched),
            other => DriftError::Config(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
