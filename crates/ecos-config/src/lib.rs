//! ecos project configuration
//!
//! `.ecos.yaml` is the single source of truth for an ecos project. This crate
//! loads it, fills defaults, validates it and locates it on disk.

pub mod error;
pub mod model;

pub use error::*;
pub use model::*;

use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the project configuration.
pub const CONFIG_FILENAME: &str = ".ecos.yaml";

/// Load the project configuration.
///
/// Without an explicit path only the current directory is searched. The
/// returned config has defaults applied and has passed validation.
pub fn load_config(path: Option<&Path>) -> Result<ProjectConfig> {
    match path {
        Some(path) => load_file(path),
        None => load_from_dir(&std::env::current_dir()?),
    }
}

/// Load `.ecos.yaml` from `dir`, failing with [`ConfigError::NotFound`] when absent.
pub fn load_from_dir(dir: &Path) -> Result<ProjectConfig> {
    let path = dir.join(CONFIG_FILENAME);
    if !path.is_file() {
        return Err(ConfigError::NotFound {
            searched: dir.to_path_buf(),
        });
    }
    load_file(&path)
}

/// Like [`load_config`], but an absent file yields [`ProjectConfig::defaults`].
pub fn load_or_default(path: Option<&Path>) -> Result<ProjectConfig> {
    match load_config(path) {
        Err(ConfigError::NotFound { searched }) => {
            debug!(searched = %searched.display(), "no config file, using defaults");
            Ok(ProjectConfig::defaults())
        }
        other => other,
    }
}

/// Parse a config document that did not come from disk.
pub fn parse_config(content: &str, origin: &Path) -> Result<ProjectConfig> {
    let mut cfg: ProjectConfig = if content.trim().is_empty() {
        ProjectConfig::default()
    } else {
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?
    };
    cfg.apply_defaults();
    cfg.validate()?;
    Ok(cfg)
}

fn load_file(path: &Path) -> Result<ProjectConfig> {
    debug!(path = %path.display(), "loading config");
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&content, path)
}

/// Walk upward from `start` looking for `.ecos.yaml`.
pub fn find_config_file(start: &Path) -> Result<PathBuf> {
    for dir in start.ancestors() {
        let candidate = dir.join(CONFIG_FILENAME);
        if candidate.is_file() {
            debug!(path = %candidate.display(), "found config file");
            return Ok(candidate);
        }
    }
    Err(ConfigError::NotFound {
        searched: start.to_path_buf(),
    })
}

/// Expand a leading `~/` and make relative paths absolute against the
/// current directory.
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    if let Ok(rest) = path.strip_prefix("~") {
        let home = dirs::home_dir().ok_or(ConfigError::HomeDirNotFound)?;
        return Ok(home.join(rest));
    }
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}
