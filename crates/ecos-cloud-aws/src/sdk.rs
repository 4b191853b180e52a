//! [`AwsApi`] over the AWS SDK for Rust.
//!
//! Every call is bounded by [`tokio::time::timeout`]; an expired deadline
//! surfaces as an [`AwsError`] with code [`crate::error::TIMEOUT_CODE`].

use crate::api::{
    AwsApi, LifecycleRule, ObjectId, ObjectPage, Tag, VersionPage, WorkgroupSpec, op,
};
use crate::error::{AwsError, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::types as s3t;
use aws_sdk_athena::types as athena_types;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Identity and describe calls.
const SHORT_TIMEOUT: Duration = Duration::from_secs(5);
/// Create and tag calls.
const MEDIUM_TIMEOUT: Duration = Duration::from_secs(15);
/// Object and workgroup deletion.
const LONG_TIMEOUT: Duration = Duration::from_secs(60);

const US_EAST_1: &str = "us-east-1";

pub struct SdkAwsApi {
    s3: aws_sdk_s3::Client,
    athena: aws_sdk_athena::Client,
    sts: aws_sdk_sts::Client,
}

impl SdkAwsApi {
    /// Load the shared AWS configuration for `region`, optionally from a
    /// named profile.
    pub async fn connect(region: &str, profile: Option<&str>) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region.to_string()));
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;
        debug!(region, profile = ?profile, "AWS configuration loaded");

        Self {
            s3: aws_sdk_s3::Client::new(&config),
            athena: aws_sdk_athena::Client::new(&config),
            sts: aws_sdk_sts::Client::new(&config),
        }
    }
}

async fn call<T, E, R, F>(operation: &str, limit: Duration, request: F) -> Result<T>
where
    F: Future<Output = std::result::Result<T, SdkError<E, R>>>,
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    match tokio::time::timeout(limit, request).await {
        Err(_) => Err(AwsError::timeout(operation, limit)),
        Ok(Ok(output)) => Ok(output),
        Ok(Err(err)) => Err(sdk_error(operation, &err)),
    }
}

fn sdk_error<E, R>(operation: &str, err: &SdkError<E, R>) -> AwsError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let service = err.as_service_error();
    let code = service.and_then(|e| e.code());
    let message = service
        .and_then(|e| e.message())
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(err).to_string());
    AwsError::new(operation, code, message)
}

fn build_error(operation: &str, err: impl std::fmt::Display) -> AwsError {
    AwsError::new(operation, None, format!("invalid request: {err}"))
}

fn s3_tags(operation: &str, tags: &[Tag]) -> Result<Vec<s3t::Tag>> {
    tags.iter()
        .map(|t| {
            s3t::Tag::builder()
                .key(&t.key)
                .value(&t.value)
                .build()
                .map_err(|e| build_error(operation, e))
        })
        .collect()
}

#[allow(deprecated)]
fn s3_lifecycle_rule(operation: &str, rule: &LifecycleRule) -> Result<s3t::LifecycleRule> {
    let mut builder = s3t::LifecycleRule::builder()
        .id(&rule.id)
        .status(s3t::ExpirationStatus::Enabled)
        .prefix(&rule.prefix);
    if let Some(days) = rule.expiration_days {
        builder = builder.expiration(s3t::LifecycleExpiration::builder().days(days).build());
    }
    if let Some(days) = rule.abort_incomplete_upload_days {
        builder = builder.abort_incomplete_multipart_upload(
            s3t::AbortIncompleteMultipartUpload::builder()
                .days_after_initiation(days)
                .build(),
        );
    }
    builder.build().map_err(|e| build_error(operation, e))
}

#[async_trait]
impl AwsApi for SdkAwsApi {
    async fn caller_account(&self) -> Result<String> {
        let output = call(
            op::GET_CALLER_IDENTITY,
            SHORT_TIMEOUT,
            self.sts.get_caller_identity().send(),
        )
        .await?;
        output.account().map(str::to_string).ok_or_else(|| {
            AwsError::new(op::GET_CALLER_IDENTITY, None, "response did not include an account id")
        })
    }

    async fn head_bucket(&self, bucket: &str) -> Result<()> {
        call(
            op::HEAD_BUCKET,
            SHORT_TIMEOUT,
            self.s3.head_bucket().bucket(bucket).send(),
        )
        .await?;
        Ok(())
    }

    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<()> {
        let mut request = self.s3.create_bucket().bucket(bucket);
        if region != US_EAST_1 {
            request = request.create_bucket_configuration(
                s3t::CreateBucketConfiguration::builder()
                    .location_constraint(s3t::BucketLocationConstraint::from(region))
                    .build(),
            );
        }
        call(op::CREATE_BUCKET, MEDIUM_TIMEOUT, request.send()).await?;
        Ok(())
    }

    async fn enable_versioning(&self, bucket: &str) -> Result<()> {
        let request = self
            .s3
            .put_bucket_versioning()
            .bucket(bucket)
            .versioning_configuration(
                s3t::VersioningConfiguration::builder()
                    .status(s3t::BucketVersioningStatus::Enabled)
                    .build(),
            );
        call(op::PUT_BUCKET_VERSIONING, MEDIUM_TIMEOUT, request.send()).await?;
        Ok(())
    }

    async fn put_lifecycle_rules(&self, bucket: &str, rules: &[LifecycleRule]) -> Result<()> {
        let rules = rules
            .iter()
            .map(|r| s3_lifecycle_rule(op::PUT_BUCKET_LIFECYCLE, r))
            .collect::<Result<Vec<_>>>()?;
        let configuration = s3t::BucketLifecycleConfiguration::builder()
            .set_rules(Some(rules))
            .build()
            .map_err(|e| build_error(op::PUT_BUCKET_LIFECYCLE, e))?;
        let request = self
            .s3
            .put_bucket_lifecycle_configuration()
            .bucket(bucket)
            .lifecycle_configuration(configuration);
        call(op::PUT_BUCKET_LIFECYCLE, MEDIUM_TIMEOUT, request.send()).await?;
        Ok(())
    }

    async fn put_bucket_tags(&self, bucket: &str, tags: &[Tag]) -> Result<()> {
        let tagging = s3t::Tagging::builder()
            .set_tag_set(Some(s3_tags(op::PUT_BUCKET_TAGGING, tags)?))
            .build()
            .map_err(|e| build_error(op::PUT_BUCKET_TAGGING, e))?;
        let request = self.s3.put_bucket_tagging().bucket(bucket).tagging(tagging);
        call(op::PUT_BUCKET_TAGGING, MEDIUM_TIMEOUT, request.send()).await?;
        Ok(())
    }

    async fn get_bucket_tags(&self, bucket: &str) -> Result<Vec<Tag>> {
        let output = call(
            op::GET_BUCKET_TAGGING,
            SHORT_TIMEOUT,
            self.s3.get_bucket_tagging().bucket(bucket).send(),
        )
        .await?;
        Ok(output
            .tag_set()
            .iter()
            .map(|t| Tag::new(t.key(), t.value()))
            .collect())
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<()> {
        call(
            op::HEAD_OBJECT,
            SHORT_TIMEOUT,
            self.s3.head_object().bucket(bucket).key(key).send(),
        )
        .await?;
        Ok(())
    }

    async fn put_object(&self, bucket: &str, key: &str) -> Result<()> {
        call(
            op::PUT_OBJECT,
            MEDIUM_TIMEOUT,
            self.s3.put_object().bucket(bucket).key(key).send(),
        )
        .await?;
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        token: Option<String>,
        max_keys: Option<i32>,
    ) -> Result<ObjectPage> {
        let request = self
            .s3
            .list_objects_v2()
            .bucket(bucket)
            .set_continuation_token(token)
            .set_max_keys(max_keys);
        let output = call(op::LIST_OBJECTS, SHORT_TIMEOUT, request.send()).await?;

        let keys = output
            .contents()
            .iter()
            .filter_map(|o| o.key().map(str::to_string))
            .collect();
        let next = if output.is_truncated().unwrap_or(false) {
            output.next_continuation_token().map(str::to_string)
        } else {
            None
        };
        Ok(ObjectPage { keys, next })
    }

    async fn list_object_versions(
        &self,
        bucket: &str,
        marker: Option<(Option<String>, Option<String>)>,
        max_keys: Option<i32>,
    ) -> Result<VersionPage> {
        let (key_marker, version_marker) = marker.unwrap_or((None, None));
        let request = self
            .s3
            .list_object_versions()
            .bucket(bucket)
            .set_key_marker(key_marker)
            .set_version_id_marker(version_marker)
            .set_max_keys(max_keys);
        let output = call(op::LIST_OBJECT_VERSIONS, SHORT_TIMEOUT, request.send()).await?;

        let versions = output.versions().iter().filter_map(|v| {
            v.key().map(|key| ObjectId {
                key: key.to_string(),
                version_id: v.version_id().map(str::to_string),
            })
        });
        let markers = output.delete_markers().iter().filter_map(|m| {
            m.key().map(|key| ObjectId {
                key: key.to_string(),
                version_id: m.version_id().map(str::to_string),
            })
        });
        let ids = versions.chain(markers).collect();

        let next = output.is_truncated().unwrap_or(false).then(|| {
            (
                output.next_key_marker().map(str::to_string),
                output.next_version_id_marker().map(str::to_string),
            )
        });
        Ok(VersionPage { ids, next })
    }

    async fn delete_objects(&self, bucket: &str, ids: &[ObjectId]) -> Result<()> {
        let objects = ids
            .iter()
            .map(|id| {
                s3t::ObjectIdentifier::builder()
                    .key(&id.key)
                    .set_version_id(id.version_id.clone())
                    .build()
                    .map_err(|e| build_error(op::DELETE_OBJECTS, e))
            })
            .collect::<Result<Vec<_>>>()?;
        let delete = s3t::Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(|e| build_error(op::DELETE_OBJECTS, e))?;

        let output = call(
            op::DELETE_OBJECTS,
            LONG_TIMEOUT,
            self.s3.delete_objects().bucket(bucket).delete(delete).send(),
        )
        .await?;

        // per-key failures come back in a successful response
        if let Some(first) = output.errors().first() {
            return Err(AwsError::new(
                op::DELETE_OBJECTS,
                first.code(),
                format!(
                    "{} of {} objects not deleted (first: {}: {})",
                    output.errors().len(),
                    ids.len(),
                    first.key().unwrap_or("?"),
                    first.message().unwrap_or("no message")
                ),
            ));
        }
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        call(
            op::DELETE_BUCKET,
            LONG_TIMEOUT,
            self.s3.delete_bucket().bucket(bucket).send(),
        )
        .await?;
        Ok(())
    }

    async fn get_workgroup(&self, name: &str) -> Result<()> {
        call(
            op::GET_WORKGROUP,
            SHORT_TIMEOUT,
            self.athena.get_work_group().work_group(name).send(),
        )
        .await?;
        Ok(())
    }

    async fn create_workgroup(&self, spec: &WorkgroupSpec) -> Result<()> {
        let configuration = athena_types::WorkGroupConfiguration::builder()
            .result_configuration(
                athena_types::ResultConfiguration::builder()
                    .output_location(&spec.output_location)
                    .build(),
            )
            .enforce_work_group_configuration(spec.enforce_configuration)
            .publish_cloud_watch_metrics_enabled(spec.publish_cloudwatch_metrics)
            .requester_pays_enabled(spec.requester_pays)
            .build();
        let request = self
            .athena
            .create_work_group()
            .name(&spec.name)
            .description(&spec.description)
            .configuration(configuration);
        call(op::CREATE_WORKGROUP, MEDIUM_TIMEOUT, request.send()).await?;
        Ok(())
    }

    async fn tag_resource(&self, arn: &str, tags: &[Tag]) -> Result<()> {
        let tags = tags
            .iter()
            .map(|t| athena_types::Tag::builder().key(&t.key).value(&t.value).build())
            .collect::<Vec<_>>();
        let request = self
            .athena
            .tag_resource()
            .resource_arn(arn)
            .set_tags(Some(tags));
        call(op::TAG_RESOURCE, MEDIUM_TIMEOUT, request.send()).await?;
        Ok(())
    }

    async fn list_resource_tags(&self, arn: &str) -> Result<Vec<Tag>> {
        let output = call(
            op::LIST_TAGS_FOR_RESOURCE,
            SHORT_TIMEOUT,
            self.athena.list_tags_for_resource().resource_arn(arn).send(),
        )
        .await?;
        Ok(output
            .tags()
            .iter()
            .filter_map(|t| Some(Tag::new(t.key()?, t.value().unwrap_or_default())))
            .collect())
    }

    async fn delete_workgroup(&self, name: &str) -> Result<()> {
        let request = self
            .athena
            .delete_work_group()
            .work_group(name)
            .recursive_delete_option(true);
        call(op::DELETE_WORKGROUP, LONG_TIMEOUT, request.send()).await?;
        Ok(())
    }
}
