//! Result types shared by every resource plugin

use serde::{Deserialize, Serialize};

/// One resource that destroy would act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePreview {
    /// Resource kind (e.g., "S3 Bucket", "Workgroup")
    pub kind: String,

    /// Resource name
    pub name: String,

    /// Carries the ecos ownership tag
    pub managed: bool,

    /// Humanized reason the ownership check could not be completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResourcePreview {
    pub fn new(kind: impl Into<String>, name: impl Into<String>, managed: bool) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            managed,
            error: None,
        }
    }

    /// Ownership could not be verified.
    pub fn unknown(kind: impl Into<String>, name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            managed: false,
            error: Some(error.into()),
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.error.as_deref().is_some_and(|e| !e.trim().is_empty())
    }
}

/// Outcome of a create or destroy step for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    Created,
    Skipped,
    PartiallyCreated,
    Failed,
    Deleted,
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceStatus::Created => write!(f, "created"),
            ResourceStatus::Skipped => write!(f, "skipped"),
            ResourceStatus::PartiallyCreated => write!(f, "partially_created"),
            ResourceStatus::Failed => write!(f, "failed"),
            ResourceStatus::Deleted => write!(f, "deleted"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceResult {
    pub kind: String,
    pub name: String,
    pub status: ResourceStatus,

    /// Failure reason
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Secondary step that did not complete on an otherwise created resource
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,

    /// Why a resource was skipped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ResourceResult {
    fn with_status(kind: impl Into<String>, name: impl Into<String>, status: ResourceStatus) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
            status,
            error: None,
            warning: None,
            detail: None,
        }
    }

    pub fn created(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_status(kind, name, ResourceStatus::Created)
    }

    pub fn deleted(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::with_status(kind, name, ResourceStatus::Deleted)
    }

    pub fn skipped(kind: impl Into<String>, name: impl Into<String>, reason: impl Into<String>) -> Self {
        let mut result = Self::with_status(kind, name, ResourceStatus::Skipped);
        result.detail = Some(reason.into());
        result
    }

    pub fn failed(kind: impl Into<String>, name: impl Into<String>, error: impl Into<String>) -> Self {
        let mut result = Self::with_status(kind, name, ResourceStatus::Failed);
        result.error = Some(error.into());
        result
    }

    pub fn partially_created(
        kind: impl Into<String>,
        name: impl Into<String>,
        warning: impl Into<String>,
    ) -> Self {
        let mut result = Self::with_status(kind, name, ResourceStatus::PartiallyCreated);
        result.warning = Some(warning.into());
        result
    }

    /// Record a failed secondary step. A created resource becomes partially created.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        let warning = warning.into();
        self.warning = Some(match self.warning.take() {
            Some(existing) => format!("{existing}; {warning}"),
            None => warning,
        });
        if self.status == ResourceStatus::Created {
            self.status = ResourceStatus::PartiallyCreated;
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == ResourceStatus::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_matches_serde() {
        let status = ResourceStatus::PartiallyCreated;
        assert_eq!(status.to_string(), "partially_created");
        assert_eq!(
            serde_json::to_string(&status).unwrap(),
            "\"partially_created\""
        );
    }

    #[test]
    fn test_add_warning_downgrades_created() {
        let mut result = ResourceResult::created("S3 Bucket", "b");
        result.add_warning("versioning: access denied");
        result.add_warning("tagging: access denied");

        assert_eq!(result.status, ResourceStatus::PartiallyCreated);
        assert_eq!(
            result.warning.as_deref(),
            Some("versioning: access denied; tagging: access denied")
        );
    }

    #[test]
    fn test_add_warning_keeps_failed() {
        let mut result = ResourceResult::failed("S3 Bucket", "b", "boom");
        result.add_warning("extra");
        assert!(result.is_failed());
    }

    #[test]
    fn test_preview_unknown() {
        assert!(ResourcePreview::unknown("Workgroup", "w", "access denied").is_unknown());
        assert!(!ResourcePreview::new("Workgroup", "w", false).is_unknown());
    }
}
