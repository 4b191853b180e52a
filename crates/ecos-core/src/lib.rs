//! ecos core
//!
//! Renders the dbt artifacts derived from `.ecos.yaml` and detects drift
//! between what the configuration would produce and what is on disk.
//!
//! ```text
//! .ecos.yaml ──load──▶ ProjectConfig ──project──▶ TemplateData
//!                                                     │
//!                                               ArtifactRenderer
//!                                                 │         │
//!                                          generate_all   DriftDetector
//!                                                 │         │
//!                                           transform/dbt ◀─┘ compare
//! ```

pub mod data;
pub mod drift;
pub mod error;
pub mod render;

pub use data::{
    ArtifactKind, DatasourceVar, DbtProfilesData, DbtProjectData, EcosConfigData, TemplateData,
    TrackedArtifact, project_templates, tracked_artifacts,
};
pub use drift::{DiffReport, DriftDetector, ReconciliationReport, positional_diff};
pub use error::{DriftError, RenderError, Result};
pub use render::{ArtifactRenderer, write_artifact};
