//! Drift detection between `.ecos.yaml` and the generated dbt files.

use crate::data::tracked_artifacts;
use crate::error::DriftError;
use crate::render::ArtifactRenderer;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Comparison result for one artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffReport {
    pub path: PathBuf,
    pub has_changes: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

/// Comparison result for every tracked artifact present on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconciliationReport {
    pub has_changes: bool,
    /// Keyed by artifact file name.
    pub files: BTreeMap<String, DiffReport>,
}

impl ReconciliationReport {
    /// File names of drifted artifacts.
    pub fn drifted(&self) -> Vec<String> {
        self.files
            .iter()
            .filter(|(_, report)| report.has_changes)
            .map(|(name, _)| name.clone())
            .collect()
    }
}

pub struct DriftDetector {
    renderer: ArtifactRenderer,
}

impl DriftDetector {
    pub fn new() -> Result<Self, DriftError> {
        Ok(Self {
            renderer: ArtifactRenderer::new()?,
        })
    }

    pub fn with_renderer(renderer: ArtifactRenderer) -> Self {
        Self { renderer }
    }

    /// Compare the artifacts `.ecos.yaml` would produce with the files on disk.
    ///
    /// Never writes. Artifacts missing from disk are left out of the report.
    #[tracing::instrument(skip(self))]
    pub fn detect_drift(&self, project_dir: &Path) -> Result<ReconciliationReport, DriftError> {
        // 1. source of truth
        let cfg = ecos_config::load_from_dir(project_dir)?;

        let mut report = ReconciliationReport::default();
        for artifact in tracked_artifacts(&cfg, project_dir) {
            // 2. expected content
            let expected = self.renderer.render(&artifact.data)?;

            // 3. compare with disk
            if !artifact.path.exists() {
                debug!(artifact = %artifact.file_name, "not generated yet, skipping");
                continue;
            }
            let current = std::fs::read_to_string(&artifact.path).map_err(|source| {
                DriftError::ReadArtifact {
                    artifact: artifact.file_name.clone(),
                    source,
                }
            })?;

            let has_changes = current != expected;
            let diff = has_changes.then(|| positional_diff(&artifact.file_name, &expected, &current));
            if has_changes {
                debug!(artifact = %artifact.file_name, "drift detected");
                report.has_changes = true;
            }
            report.files.insert(
                artifact.file_name,
                DiffReport {
                    path: artifact.path,
                    has_changes,
                    diff,
                },
            );
        }

        info!(
            checked = report.files.len(),
            has_changes = report.has_changes,
            "drift check complete"
        );
        Ok(report)
    }

    /// Gate for commands that consume the generated files.
    ///
    /// A failed check is only logged; callers proceed as if in sync.
    pub fn ensure_in_sync(&self, project_dir: &Path, ignore_drift: bool) -> Result<(), DriftError> {
        if ignore_drift {
            warn!("drift check bypassed with --ignore-drift");
            return Ok(());
        }
        match self.detect_drift(project_dir) {
            Ok(report) if report.has_changes => Err(DriftError::DriftDetected {
                files: report.drifted(),
            }),
            Ok(_) => Ok(()),
            Err(err) => {
                warn!(error = %err, "could not check for configuration drift");
                Ok(())
            }
        }
    }
}

/// Line-by-line diff by position.
///
/// Both sides are split on `\n` and padded to the same length; every
/// differing position emits `- expected` and `+ current`, omitting empty
/// lines on either side.
pub fn positional_diff(file: &str, expected: &str, current: &str) -> String {
    let expected_lines: Vec<&str> = expected.split('\n').collect();
    let current_lines: Vec<&str> = current.split('\n').collect();
    let len = expected_lines.len().max(current_lines.len());

    let mut out = String::new();
    let _ = write!(out, "--- {file} (expected)\n+++ {file} (current)\n");
    for i in 0..len {
        let exp = expected_lines.get(i).copied().unwrap_or("");
        let act = current_lines.get(i).copied().unwrap_or("");
        if exp == act {
            continue;
        }
        if !exp.is_empty() {
            let _ = writeln!(out, "- {exp}");
        }
        if !act.is_empty() {
            let _ = writeln!(out, "+ {act}");
        }
    }
    out
}
