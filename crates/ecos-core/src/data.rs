//! Typed template data and its projection from [`ProjectConfig`].

use ecos_config::ProjectConfig;
use serde::Serialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_MATERIALIZATION: &str = "view";
pub const DEFAULT_AWS_PROFILE: &str = "default";

/// Identity of a generated artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    DbtProfiles,
    DbtProject,
    EcosConfig,
}

impl ArtifactKind {
    /// Default on-disk file name.
    pub fn file_name(self) -> &'static str {
        match self {
            ArtifactKind::DbtProfiles => "profiles.yml",
            ArtifactKind::DbtProject => "dbt_project.yml",
            ArtifactKind::EcosConfig => ecos_config::CONFIG_FILENAME,
        }
    }

    pub(crate) fn template_name(self) -> &'static str {
        match self {
            ArtifactKind::DbtProfiles => "profiles.yml",
            ArtifactKind::DbtProject => "dbt_project.yml",
            ArtifactKind::EcosConfig => "ecos.yaml",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DatasourceVar {
    pub key: String,
    pub value: String,
}

impl DatasourceVar {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DbtProfilesData {
    pub profile: String,
    pub target: String,
    pub aws_profile: String,
    pub aws_region: String,
    pub results_bucket: String,
    pub database: String,
    pub workgroup: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DbtProjectData {
    pub profile: String,
    pub datasource_vars: Vec<DatasourceVar>,
    pub iceberg_enabled: bool,
    pub billing_period_start: Option<String>,
    pub billing_period_end: Option<String>,
    pub materialization_mode: String,
    pub bronze_materialization: String,
    pub silver_materialization: String,
    pub gold_materialization: String,
    pub use_iceberg: bool,
    pub enable_partitioning: bool,
}

/// Data for a freshly initialized `.ecos.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EcosConfigData {
    pub project_name: String,
    pub model_version: String,
    pub data_source: String,
    pub log_level: String,
    pub project_dir: String,
    pub profile_dir: String,
    pub profile_file: String,
    pub profile: String,
    pub target: String,
    pub aws_profile: String,
    pub datasource_vars: Vec<DatasourceVar>,
    pub aws_region: String,
    pub database: String,
    pub dbt_workgroup: String,
    pub adhoc_workgroup: String,
    pub results_bucket: String,
    pub materialization_mode: String,
    pub bronze_materialization: String,
    pub silver_materialization: String,
    pub gold_materialization: String,
    pub report_format: String,
    pub report_output_path: String,
}

/// Input of one render call. The variant selects the template.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateData {
    DbtProfiles(DbtProfilesData),
    DbtProject(DbtProjectData),
    EcosConfig(EcosConfigData),
}

impl TemplateData {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            TemplateData::DbtProfiles(_) => ArtifactKind::DbtProfiles,
            TemplateData::DbtProject(_) => ArtifactKind::DbtProject,
            TemplateData::EcosConfig(_) => ArtifactKind::EcosConfig,
        }
    }
}

struct Layers {
    mode: String,
    bronze: String,
    silver: String,
    gold: String,
}

/// An empty `mode` falls back to the default; a layer override is used
/// whenever its key is present, even if empty.
fn layers(cfg: &ProjectConfig) -> Layers {
    let mat = cfg.transform.dbt.materialization.as_ref();
    let layer = |name: &str| {
        mat.and_then(|m| m.layer_overrides.get(name))
            .cloned()
            .unwrap_or_else(|| DEFAULT_MATERIALIZATION.to_string())
    };
    Layers {
        mode: mat
            .map(|m| m.mode.clone())
            .filter(|mode| !mode.is_empty())
            .unwrap_or_else(|| DEFAULT_MATERIALIZATION.to_string()),
        bronze: layer("bronze"),
        silver: layer("silver"),
        gold: layer("gold"),
    }
}

fn datasource_vars(cfg: &ProjectConfig) -> Vec<DatasourceVar> {
    cfg.transform
        .dbt
        .vars
        .iter()
        .map(|(k, v)| DatasourceVar::new(k, v))
        .collect()
}

fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

impl From<&ProjectConfig> for DbtProfilesData {
    fn from(cfg: &ProjectConfig) -> Self {
        let dbt = &cfg.transform.dbt;
        Self {
            profile: dbt.profile.clone(),
            target: or_default(&dbt.target, ecos_config::DEFAULT_DBT_TARGET),
            aws_profile: or_default(&dbt.aws_profile, DEFAULT_AWS_PROFILE),
            aws_region: cfg.aws.region.clone(),
            results_bucket: cfg.aws.results_bucket.clone(),
            database: cfg.aws.database.clone(),
            workgroup: cfg.aws.dbt_workgroup.clone(),
        }
    }
}

impl From<&ProjectConfig> for DbtProjectData {
    fn from(cfg: &ProjectConfig) -> Self {
        let layers = layers(cfg);
        Self {
            profile: cfg.transform.dbt.profile.clone(),
            datasource_vars: datasource_vars(cfg),
            iceberg_enabled: false,
            billing_period_start: None,
            billing_period_end: None,
            materialization_mode: layers.mode,
            bronze_materialization: layers.bronze,
            silver_materialization: layers.silver,
            gold_materialization: layers.gold,
            use_iceberg: false,
            enable_partitioning: true,
        }
    }
}

impl From<&ProjectConfig> for EcosConfigData {
    fn from(cfg: &ProjectConfig) -> Self {
        let dbt = &cfg.transform.dbt;
        let layers = layers(cfg);
        Self {
            project_name: cfg.project_name.clone(),
            model_version: cfg.model_version.clone(),
            data_source: cfg.data_source.clone(),
            log_level: cfg.global.log_level.clone(),
            project_dir: dbt.project_dir.clone(),
            profile_dir: dbt.profile_dir.clone(),
            profile_file: dbt.profile_file.clone(),
            profile: dbt.profile.clone(),
            target: dbt.target.clone(),
            aws_profile: dbt.aws_profile.clone(),
            datasource_vars: datasource_vars(cfg),
            aws_region: cfg.aws.region.clone(),
            database: cfg.aws.database.clone(),
            dbt_workgroup: cfg.aws.dbt_workgroup.clone(),
            adhoc_workgroup: cfg.aws.adhoc_workgroup.clone(),
            results_bucket: cfg.aws.results_bucket.clone(),
            materialization_mode: layers.mode,
            bronze_materialization: layers.bronze,
            silver_materialization: layers.silver,
            gold_materialization: layers.gold,
            report_format: cfg.report.format.clone(),
            report_output_path: cfg.report.output_path.clone(),
        }
    }
}

/// Project a config into the data of both dbt artifacts.
pub fn project_templates(cfg: &ProjectConfig) -> (DbtProjectData, DbtProfilesData) {
    (DbtProjectData::from(cfg), DbtProfilesData::from(cfg))
}

/// A dbt artifact kept in sync with `.ecos.yaml`.
#[derive(Debug, Clone)]
pub struct TrackedArtifact {
    /// Report key, the artifact's file name.
    pub file_name: String,
    pub path: PathBuf,
    pub data: TemplateData,
}

/// Artifacts derived from `cfg`, located relative to `project_root`.
pub fn tracked_artifacts(cfg: &ProjectConfig, project_root: &Path) -> Vec<TrackedArtifact> {
    let (project, profiles) = project_templates(cfg);
    let project_path = cfg
        .dbt_dir(project_root)
        .join(ArtifactKind::DbtProject.file_name());
    let profiles_path = cfg.profiles_path(project_root);

    vec![
        TrackedArtifact {
            file_name: ArtifactKind::DbtProject.file_name().to_string(),
            path: project_path,
            data: TemplateData::DbtProject(project),
        },
        TrackedArtifact {
            file_name: cfg.transform.dbt.profile_file.clone(),
            path: profiles_path,
            data: TemplateData::DbtProfiles(profiles),
        },
    ]
}
