//! The AWS calls the plugin needs, one method per API operation.
//!
//! [`crate::sdk::SdkAwsApi`] implements this over the AWS SDK. Tests
//! substitute an in-memory implementation.

use crate::error::Result;
use async_trait::async_trait;

/// Operation names, used in errors and logs.
pub mod op {
    pub const GET_CALLER_IDENTITY: &str = "GetCallerIdentity";
    pub const HEAD_BUCKET: &str = "HeadBucket";
    pub const CREATE_BUCKET: &str = "CreateBucket";
    pub const PUT_BUCKET_VERSIONING: &str = "PutBucketVersioning";
    pub const PUT_BUCKET_LIFECYCLE: &str = "PutBucketLifecycleConfiguration";
    pub const PUT_BUCKET_TAGGING: &str = "PutBucketTagging";
    pub const GET_BUCKET_TAGGING: &str = "GetBucketTagging";
    pub const HEAD_OBJECT: &str = "HeadObject";
    pub const PUT_OBJECT: &str = "PutObject";
    pub const LIST_OBJECTS: &str = "ListObjectsV2";
    pub const LIST_OBJECT_VERSIONS: &str = "ListObjectVersions";
    pub const DELETE_OBJECTS: &str = "DeleteObjects";
    pub const DELETE_BUCKET: &str = "DeleteBucket";
    pub const GET_WORKGROUP: &str = "GetWorkGroup";
    pub const CREATE_WORKGROUP: &str = "CreateWorkGroup";
    pub const TAG_RESOURCE: &str = "TagResource";
    pub const LIST_TAGS_FOR_RESOURCE: &str = "ListTagsForResource";
    pub const DELETE_WORKGROUP: &str = "DeleteWorkGroup";
}

/// Maximum keys per DeleteObjects request.
pub const DELETE_BATCH_SIZE: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// An object key, optionally pinned to one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectId {
    pub key: String,
    pub version_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub keys: Vec<String>,
    /// Continuation token; `None` on the last page.
    pub next: Option<String>,
}

/// One page of object versions and delete markers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionPage {
    pub ids: Vec<ObjectId>,
    /// `(key_marker, version_id_marker)`; `None` on the last page.
    pub next: Option<(Option<String>, Option<String>)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleRule {
    pub id: String,
    pub prefix: String,
    pub expiration_days: Option<i32>,
    pub abort_incomplete_upload_days: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkgroupSpec {
    pub name: String,
    pub description: String,
    /// Query result location, `s3://<bucket>/<workgroup>/`
    pub output_location: String,
    pub enforce_configuration: bool,
    pub publish_cloudwatch_metrics: bool,
    pub requester_pays: bool,
}

#[async_trait]
pub trait AwsApi: Send + Sync {
    /// Account id of the current credentials.
    async fn caller_account(&self) -> Result<String>;

    async fn head_bucket(&self, bucket: &str) -> Result<()>;
    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<()>;
    async fn enable_versioning(&self, bucket: &str) -> Result<()>;
    async fn put_lifecycle_rules(&self, bucket: &str, rules: &[LifecycleRule]) -> Result<()>;
    async fn put_bucket_tags(&self, bucket: &str, tags: &[Tag]) -> Result<()>;
    async fn get_bucket_tags(&self, bucket: &str) -> Result<Vec<Tag>>;

    async fn head_object(&self, bucket: &str, key: &str) -> Result<()>;
    /// Create an empty object.
    async fn put_object(&self, bucket: &str, key: &str) -> Result<()>;
    async fn list_objects(
        &self,
        bucket: &str,
        token: Option<String>,
        max_keys: Option<i32>,
    ) -> Result<ObjectPage>;
    async fn list_object_versions(
        &self,
        bucket: &str,
        marker: Option<(Option<String>, Option<String>)>,
        max_keys: Option<i32>,
    ) -> Result<VersionPage>;
    /// Delete at most [`DELETE_BATCH_SIZE`] objects.
    async fn delete_objects(&self, bucket: &str, ids: &[ObjectId]) -> Result<()>;
    async fn delete_bucket(&self, bucket: &str) -> Result<()>;

    async fn get_workgroup(&self, name: &str) -> Result<()>;
    async fn create_workgroup(&self, spec: &WorkgroupSpec) -> Result<()>;
    async fn tag_resource(&self, arn: &str, tags: &[Tag]) -> Result<()>;
    async fn list_resource_tags(&self, arn: &str) -> Result<Vec<Tag>>;
    /// Delete a workgroup together with its saved queries.
    async fn delete_workgroup(&self, name: &str) -> Result<()>;
}
