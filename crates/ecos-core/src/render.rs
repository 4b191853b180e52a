//! Artifact rendering
//!
//! Templates are embedded at compile time and rendered with Tera. Rendering
//! is a pure function of the template data; writing to disk is a separate
//! step in [`ArtifactRenderer::generate_artifact`].

use crate::data::{ArtifactKind, TemplateData, tracked_artifacts};
use crate::error::{RenderError, Result};
use ecos_config::ProjectConfig;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};
use tracing::{debug, info};

const TEMPLATES: &[(&str, &str)] = &[
    (
        "dbt_project.yml",
        include_str!("../templates/dbt_project.yml.tera"),
    ),
    ("profiles.yml", include_str!("../templates/profiles.yml.tera")),
    ("ecos.yaml", include_str!("../templates/ecos.yaml.tera")),
];

#[cfg(unix)]
const DIR_MODE: u32 = 0o750;
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

pub struct ArtifactRenderer {
    tera: Tera,
}

impl ArtifactRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())
            .map_err(RenderError::TemplateLoad)?;
        Ok(Self { tera })
    }

    /// Render one artifact. Identical data always yields identical bytes;
    /// datasource variables are ordered by key regardless of input order.
    pub fn render(&self, data: &TemplateData) -> Result<String> {
        let kind = data.kind();
        match data {
            TemplateData::DbtProfiles(d) => self.render_kind(kind, d),
            TemplateData::DbtProject(d) => {
                let mut d = d.clone();
                d.datasource_vars.sort();
                self.render_kind(kind, &d)
            }
            TemplateData::EcosConfig(d) => {
                let mut d = d.clone();
                d.datasource_vars.sort();
                self.render_kind(kind, &d)
            }
        }
    }

    fn render_kind<T: Serialize>(&self, kind: ArtifactKind, data: &T) -> Result<String> {
        let wrap = |source: tera::Error| RenderError::Template {
            artifact: kind.file_name(),
            source,
        };
        let context = Context::from_serialize(data).map_err(wrap)?;
        self.tera
            .render(kind.template_name(), &context)
            .map_err(wrap)
    }

    /// Render `data` and write it into `target_dir` under the artifact's
    /// default file name.
    pub fn generate_artifact(&self, data: &TemplateData, target_dir: &Path) -> Result<PathBuf> {
        let content = self.render(data)?;
        write_artifact(&content, target_dir, data.kind().file_name())
    }

    /// Regenerate every dbt artifact derived from `cfg` under `project_root`.
    #[tracing::instrument(skip(self, cfg))]
    pub fn generate_all(&self, cfg: &ProjectConfig, project_root: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for artifact in tracked_artifacts(cfg, project_root) {
            let content = self.render(&artifact.data)?;
            let dir = artifact.path.parent().unwrap_or(project_root);
            written.push(write_artifact(&content, dir, &artifact.file_name)?);
        }
        info!(count = written.len(), "generated dbt artifacts");
        Ok(written)
    }
}

/// Write `content` to `target_dir/file_name`, replacing any existing file.
///
/// `~/` is expanded and relative directories are resolved against the
/// current directory. Missing directories are created.
pub fn write_artifact(content: &str, target_dir: &Path, file_name: &str) -> Result<PathBuf> {
    let dir = ecos_config::expand_path(target_dir)?;
    ensure_dir(&dir)?;

    let path = dir.join(file_name);
    write_private(&path, content).map_err(|source| RenderError::Write {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), bytes = content.len(), "wrote artifact");
    Ok(path)
}

fn ensure_dir(dir: &Path) -> Result<()> {
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => return Err(RenderError::NotADirectory(dir.to_path_buf())),
        Err(_) => {}
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(dir).map_err(|source| RenderError::Write {
        path: dir.to_path_buf(),
        source,
    })
}

fn write_private(path: &Path, content: &str) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(FILE_MODE);
    }
    let mut file = options.open(path)?;
    file.write_all(content.as_bytes())?;

    // mode() only applies on creation
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(FILE_MODE))?;
    }
    Ok(())
}
