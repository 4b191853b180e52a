//! `.ecos.yaml` data model.
//!
//! Every section deserializes with `#[serde(default)]` so partial files are
//! accepted; [`ProjectConfig::apply_defaults`] then fills the documented
//! defaults and [`ProjectConfig::validate`] enforces the semantic rules.

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_PROJECT_NAME: &str = "my-cost-analysis";
pub const DEFAULT_MODEL_VERSION: &str = "latest";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_TRANSFORM_PLUGIN: &str = "dbt";
pub const DEFAULT_DBT_DIR: &str = "./transform/dbt";
pub const DEFAULT_PROFILE_FILE: &str = "profiles.yml";
pub const DEFAULT_DBT_PROFILE: &str = "ecos-athena";
pub const DEFAULT_DBT_TARGET: &str = "prod";
pub const DEFAULT_REPORT_FORMAT: &str = "table";
pub const DEFAULT_REPORT_OUTPUT: &str = "./reports";

pub const LOG_LEVELS: &[&str] = &["debug", "info", "warn", "error"];
pub const TRANSFORM_PLUGINS: &[&str] = &["dbt", "sql"];
pub const REPORT_FORMATS: &[&str] = &["json", "csv", "table", "yaml"];

/// Root of `.ecos.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub project_name: String,
    pub model_version: String,
    /// Datasource identifier used to select a resource plugin (e.g. `aws_cur`).
    #[serde(skip_serializing_if = "String::is_empty")]
    pub data_source: String,
    pub global: GlobalConfig,
    pub transform: TransformConfig,
    pub report: ReportConfig,
    pub aws: AwsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub log_level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Active transform plugin. Exactly one is active at a time.
    pub plugin: String,
    pub dbt: DbtConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<SqlConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DbtConfig {
    pub project_dir: String,
    pub profile_dir: String,
    pub profile_file: String,
    pub profile: String,
    pub target: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub aws_profile: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub materialization: Option<MaterializationConfig>,
}

/// Materialization strategy; `layer_overrides` is keyed by layer
/// (`bronze`, `silver`, `gold`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterializationConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub mode: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub layer_overrides: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlConfig {
    pub connection_string: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub driver: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub script_paths: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub variables: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub plugin: String,
    pub format: String,
    pub output_path: String,
}

/// Cloud resource names. These are the only resources `ecos` will
/// provision or destroy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    pub region: String,
    pub database: String,
    pub results_bucket: String,
    /// Primary workgroup, used by dbt.
    pub dbt_workgroup: String,
    /// Secondary workgroup for ad-hoc queries.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub adhoc_workgroup: String,
}

impl ProjectConfig {
    /// Configuration used when no `.ecos.yaml` exists yet.
    pub fn defaults() -> Self {
        let mut cfg = Self {
            project_name: DEFAULT_PROJECT_NAME.to_string(),
            ..Self::default()
        };
        cfg.apply_defaults();
        cfg
    }

    /// Populate every unset field with its documented default.
    pub fn apply_defaults(&mut self) {
        fill(&mut self.model_version, DEFAULT_MODEL_VERSION);
        fill(&mut self.global.log_level, DEFAULT_LOG_LEVEL);
        fill(&mut self.transform.plugin, DEFAULT_TRANSFORM_PLUGIN);

        let dbt = &mut self.transform.dbt;
        fill(&mut dbt.project_dir, DEFAULT_DBT_DIR);
        fill(&mut dbt.profile_dir, DEFAULT_DBT_DIR);
        fill(&mut dbt.profile_file, DEFAULT_PROFILE_FILE);
        fill(&mut dbt.profile, DEFAULT_DBT_PROFILE);
        fill(&mut dbt.target, DEFAULT_DBT_TARGET);

        fill(&mut self.report.format, DEFAULT_REPORT_FORMAT);
        fill(&mut self.report.output_path, DEFAULT_REPORT_OUTPUT);
    }

    pub fn validate(&self) -> Result<()> {
        let level = self.global.log_level.as_str();
        if !LOG_LEVELS.contains(&level) {
            return Err(ConfigError::Validation(format!(
                "invalid log level: {level} (must be one of: {})",
                LOG_LEVELS.join(", ")
            )));
        }

        match self.transform.plugin.as_str() {
            "dbt" => {
                if self.transform.dbt.project_dir.is_empty() {
                    return Err(ConfigError::Validation(
                        "transform.dbt.project_dir is required when plugin is 'dbt'".into(),
                    ));
                }
            }
            "sql" => {
                let has_connection = self
                    .transform
                    .sql
                    .as_ref()
                    .is_some_and(|sql| !sql.connection_string.is_empty());
                if !has_connection {
                    return Err(ConfigError::Validation(
                        "transform.sql.connection_string is required when plugin is 'sql'".into(),
                    ));
                }
            }
            other => {
                return Err(ConfigError::Validation(format!(
                    "unknown transform plugin: {other} (must be one of: {})",
                    TRANSFORM_PLUGINS.join(", ")
                )));
            }
        }

        let format = self.report.format.as_str();
        if !REPORT_FORMATS.contains(&format) {
            return Err(ConfigError::Validation(format!(
                "invalid report format: {format} (must be one of: {})",
                REPORT_FORMATS.join(", ")
            )));
        }

        Ok(())
    }

    /// The only mutation permitted after load.
    pub fn set_model_version(&mut self, version: impl Into<String>) {
        self.model_version = version.into();
    }

    /// Directory holding `dbt_project.yml`, resolved against the project root.
    pub fn dbt_dir(&self, project_root: &Path) -> PathBuf {
        resolve(project_root, &self.transform.dbt.project_dir)
    }

    /// Full path of the dbt profiles file, resolved against the project root.
    pub fn profiles_path(&self, project_root: &Path) -> PathBuf {
        resolve(project_root, &self.transform.dbt.profile_dir)
            .join(&self.transform.dbt.profile_file)
    }
}

fn fill(field: &mut String, default: &str) {
    if field.is_empty() {
        *field = default.to_string();
    }
}

fn resolve(root: &Path, dir: &str) -> PathBuf {
    let dir = Path::new(dir);
    if dir.is_absolute() {
        return dir.to_path_buf();
    }
    dir.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .fold(root.to_path_buf(), |acc, c| acc.join(c))
}
