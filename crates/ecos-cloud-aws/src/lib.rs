//! AWS resource plugin for ecos
//!
//! Provisions and tears down the resources behind the `aws_cur`
//! datasource: an S3 bucket for query results and dbt artifacts, and the
//! Athena workgroups used by dbt and ad-hoc queries. Every resource created
//! here carries the `ecos:managed=true` tag.
//!
//! ```text
//! AwsCurPlugin ──▶ trait AwsApi ──▶ SdkAwsApi (aws-sdk-s3, aws-sdk-athena, aws-sdk-sts)
//!                               └─▶ in-memory fakes in tests
//! ```

pub mod api;
pub mod classify;
pub mod error;
pub mod provider;
pub mod sdk;

pub use api::{AwsApi, LifecycleRule, ObjectId, ObjectPage, Tag, VersionPage, WorkgroupSpec};
pub use classify::{ErrorClass, classify, humanize_preview_error};
pub use error::{AwsError, Result};
pub use provider::{AwsCurPlugin, AwsSettings, PLUGIN_NAME};
pub use sdk::SdkAwsApi;

use ecos_cloud::PluginRegistry;

/// Register the `aws_cur` datasource.
pub fn register(registry: &mut PluginRegistry) {
    registry.register(PLUGIN_NAME, || Box::new(AwsCurPlugin::new()));
}
