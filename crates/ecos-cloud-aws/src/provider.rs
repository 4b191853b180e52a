//! `aws_cur` resource plugin: one S3 results bucket and two Athena workgroups.

use crate::api::{AwsApi, DELETE_BATCH_SIZE, LifecycleRule, ObjectId, Tag, WorkgroupSpec};
use crate::classify::{ErrorClass, classify, humanize_preview_error};
use crate::error::AwsError;
use crate::sdk::SdkAwsApi;
use async_trait::async_trait;
use ecos_cloud::{
    CloudError, ConfigLoader, Confirmation, DestroyExecutor, DestroyPreviewer, MANAGED_TAG_KEY,
    MANAGED_TAG_VALUE, PROJECT_TAG_KEY, Prompter, ResourceCreator, ResourcePlugin,
    ResourcePreview, ResourceResult, Result,
};
use ecos_config::ProjectConfig;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const PLUGIN_NAME: &str = "aws_cur";

pub const KIND_BUCKET: &str = "S3 Bucket";
pub const KIND_FOLDER: &str = "S3 Folder";
pub const KIND_WORKGROUP: &str = "Athena Workgroup";
/// Kind shown for workgroups in destroy previews.
pub const KIND_WORKGROUP_PREVIEW: &str = "Workgroup";

/// Folder markers created in the results bucket.
pub const FOLDERS: &[&str] = &["dbt/", "adhoc/", "temp/"];

pub const ADHOC_RETENTION_DAYS: i32 = 30;
pub const INCOMPLETE_UPLOAD_CLEANUP_DAYS: i32 = 7;

const NO_RESOURCES_MESSAGE: &str = ".ecos.yaml does not contain any ecos-managed resource names.

This usually happens when:
  • Resource creation was skipped during \"ecos init\", or
  • The .ecos.yaml file was manually modified or corrupted.

Please re-run \"ecos init\" (or review your existing .ecos.yaml) before running \"ecos destroy\"";

/// Resource names and connection settings taken from `.ecos.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsSettings {
    pub region: String,
    pub bucket: String,
    pub dbt_workgroup: String,
    pub adhoc_workgroup: String,
    pub aws_profile: String,
    pub project_name: String,
}

impl AwsSettings {
    pub fn from_config(cfg: &ProjectConfig) -> Self {
        Self {
            region: cfg.aws.region.clone(),
            bucket: cfg.aws.results_bucket.clone(),
            dbt_workgroup: cfg.aws.dbt_workgroup.clone(),
            adhoc_workgroup: cfg.aws.adhoc_workgroup.clone(),
            aws_profile: cfg.transform.dbt.aws_profile.clone(),
            project_name: cfg.project_name.clone(),
        }
    }

    /// Configured workgroup names, primary first.
    pub fn workgroups(&self) -> Vec<&str> {
        [self.dbt_workgroup.as_str(), self.adhoc_workgroup.as_str()]
            .into_iter()
            .filter(|w| !w.is_empty())
            .collect()
    }

    fn has_resources(&self) -> bool {
        !self.bucket.is_empty() || !self.workgroups().is_empty()
    }
}

pub struct AwsCurPlugin {
    settings: AwsSettings,
    account_id: Option<String>,
    api: Option<Arc<dyn AwsApi>>,
}

impl AwsCurPlugin {
    pub fn new() -> Self {
        Self {
            settings: AwsSettings::default(),
            account_id: None,
            api: None,
        }
    }

    /// Use `api` instead of connecting through the AWS SDK.
    pub fn with_api(api: Arc<dyn AwsApi>) -> Self {
        Self {
            api: Some(api),
            ..Self::new()
        }
    }

    pub fn settings(&self) -> &AwsSettings {
        &self.settings
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    fn api(&self) -> Result<&dyn AwsApi> {
        self.api.as_deref().ok_or_else(|| {
            CloudError::Prerequisite("AWS session not initialized; validate prerequisites first".into())
        })
    }

    fn workgroup_arn(&self, workgroup: &str) -> String {
        format!(
            "arn:aws:athena:{}:{}:workgroup/{}",
            self.settings.region,
            self.account_id.as_deref().unwrap_or_default(),
            workgroup
        )
    }

    fn ownership_tags(&self) -> Vec<Tag> {
        vec![
            Tag::new(MANAGED_TAG_KEY, MANAGED_TAG_VALUE),
            Tag::new(PROJECT_TAG_KEY, &self.settings.project_name),
        ]
    }

    async fn bucket_managed(&self, api: &dyn AwsApi, bucket: &str) -> std::result::Result<bool, AwsError> {
        match api.get_bucket_tags(bucket).await {
            Ok(tags) => Ok(is_managed(&tags)),
            Err(err) if classify(&err) == ErrorClass::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn workgroup_managed(
        &self,
        api: &dyn AwsApi,
        workgroup: &str,
    ) -> std::result::Result<bool, AwsError> {
        match api.list_resource_tags(&self.workgroup_arn(workgroup)).await {
            Ok(tags) => Ok(is_managed(&tags)),
            Err(err) if classify(&err) == ErrorClass::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    async fn bucket_is_empty(&self, api: &dyn AwsApi, bucket: &str) -> std::result::Result<bool, AwsError> {
        match api.list_objects(bucket, None, Some(1)).await {
            Ok(page) if !page.keys.is_empty() => return Ok(false),
            Ok(_) => {}
            Err(err) if classify(&err) == ErrorClass::NotFound => return Ok(true),
            Err(err) => return Err(err),
        }
        match api.list_object_versions(bucket, None, Some(1)).await {
            Ok(versions) => Ok(versions.ids.is_empty()),
            Err(err) if classify(&err) == ErrorClass::NotFound => Ok(true),
            Err(err) => Err(err),
        }
    }

    async fn delete_batches(
        &self,
        api: &dyn AwsApi,
        bucket: &str,
        ids: &[ObjectId],
    ) -> std::result::Result<(), AwsError> {
        for batch in ids.chunks(DELETE_BATCH_SIZE) {
            api.delete_objects(bucket, batch).await?;
        }
        Ok(())
    }

    async fn delete_object_versions(&self, api: &dyn AwsApi, bucket: &str) -> std::result::Result<(), AwsError> {
        let mut marker = None;
        loop {
            let page = api.list_object_versions(bucket, marker, None).await?;
            self.delete_batches(api, bucket, &page.ids).await?;
            match page.next {
                Some(next) => marker = Some(next),
                None => return Ok(()),
            }
        }
    }

    async fn empty_bucket(&self, api: &dyn AwsApi, bucket: &str) -> std::result::Result<(), AwsError> {
        let mut token = None;
        loop {
            let page = api.list_objects(bucket, token, None).await?;
            let ids: Vec<ObjectId> = page
                .keys
                .into_iter()
                .map(|key| ObjectId {
                    key,
                    version_id: None,
                })
                .collect();
            self.delete_batches(api, bucket, &ids).await?;
            match page.next {
                Some(next) => token = Some(next),
                None => return Ok(()),
            }
        }
    }

    async fn destroy_bucket(&self, api: &dyn AwsApi, bucket: &str) -> ResourceResult {
        if let Err(err) = api.head_bucket(bucket).await {
            return match classify(&err) {
                ErrorClass::NotFound => ResourceResult::skipped(
                    KIND_BUCKET,
                    bucket,
                    "Bucket already deleted or does not exist",
                ),
                _ => ResourceResult::failed(KIND_BUCKET, bucket, format!("failed to access bucket: {err}")),
            };
        }

        if let Err(err) = self.delete_object_versions(api, bucket).await {
            return ResourceResult::failed(
                KIND_BUCKET,
                bucket,
                format!("failed to delete object versions: {err}"),
            );
        }
        if let Err(err) = self.empty_bucket(api, bucket).await {
            return ResourceResult::failed(KIND_BUCKET, bucket, format!("failed to empty bucket: {err}"));
        }

        if let Err(err) = api.delete_bucket(bucket).await {
            let context = match classify(&err) {
                ErrorClass::AccessDenied => "permission denied while deleting bucket",
                ErrorClass::BucketNotEmpty => "bucket not empty during delete operation",
                ErrorClass::Conflict => "bucket has pending operations preventing deletion",
                _ => "failed to delete bucket",
            };
            return ResourceResult::failed(KIND_BUCKET, bucket, format!("{context}: {err}"));
        }

        info!(bucket, "bucket deleted");
        ResourceResult::deleted(KIND_BUCKET, bucket)
    }

    async fn destroy_workgroup(&self, api: &dyn AwsApi, workgroup: &str) -> ResourceResult {
        if let Err(err) = api.get_workgroup(workgroup).await {
            return match classify(&err) {
                ErrorClass::NotFound | ErrorClass::InvalidRequest => ResourceResult::skipped(
                    KIND_WORKGROUP,
                    workgroup,
                    "Workgroup already deleted or does not exist",
                ),
                _ => ResourceResult::failed(
                    KIND_WORKGROUP,
                    workgroup,
                    format!("failed to describe workgroup: {err}"),
                ),
            };
        }

        if let Err(err) = api.delete_workgroup(workgroup).await {
            return ResourceResult::failed(KIND_WORKGROUP, workgroup, err.to_string());
        }

        info!(workgroup, "workgroup deleted");
        ResourceResult::deleted(KIND_WORKGROUP, workgroup)
    }

    /// The API handle, if the results bucket exists and is reachable.
    async fn accessible_api(&self) -> Option<&dyn AwsApi> {
        let api = self.api().ok()?;
        if self.settings.bucket.is_empty() || api.head_bucket(&self.settings.bucket).await.is_err() {
            return None;
        }
        Some(api)
    }

    async fn create_workgroup(&self, api: &dyn AwsApi, workgroup: &str) -> ResourceResult {
        if api.get_workgroup(workgroup).await.is_ok() {
            return ResourceResult::skipped(KIND_WORKGROUP, workgroup, "Workgroup already exists");
        }

        let spec = WorkgroupSpec {
            name: workgroup.to_string(),
            description: format!(
                "Workgroup created by ecos cli for project {}",
                self.settings.project_name
            ),
            output_location: format!("s3://{}/{}/", self.settings.bucket, workgroup),
            enforce_configuration: true,
            publish_cloudwatch_metrics: true,
            requester_pays: false,
        };
        if let Err(err) = api.create_workgroup(&spec).await {
            return match classify(&err) {
                ErrorClass::AlreadyExists => {
                    ResourceResult::skipped(KIND_WORKGROUP, workgroup, "Workgroup already exists")
                }
                _ => ResourceResult::failed(
                    KIND_WORKGROUP,
                    workgroup,
                    format!("Failed to create workgroup: {err}"),
                ),
            };
        }

        let mut result = ResourceResult::created(KIND_WORKGROUP, workgroup);
        let arn = self.workgroup_arn(workgroup);
        if let Err(err) = api.tag_resource(&arn, &self.ownership_tags()).await {
            result.add_warning(format!(
                "Failed to tag workgroup {workgroup:?} (ARN: {arn}) with {MANAGED_TAG_KEY} and {PROJECT_TAG_KEY} tags: {err}"
            ));
        }
        result
    }
}

impl Default for AwsCurPlugin {
    fn default() -> Self {
        Self::new()
    }
}

fn is_managed(tags: &[Tag]) -> bool {
    tags.iter()
        .any(|t| t.key == MANAGED_TAG_KEY && t.value == MANAGED_TAG_VALUE)
}

/// Expire ad-hoc query results and abort stale multipart uploads.
pub fn lifecycle_rules() -> Vec<LifecycleRule> {
    vec![
        LifecycleRule {
            id: "DeleteAdhocQueryResultsAfter30Days".into(),
            prefix: "adhoc/".into(),
            expiration_days: Some(ADHOC_RETENTION_DAYS),
            abort_incomplete_upload_days: None,
        },
        LifecycleRule {
            id: "DeleteIncompleteMultipartUploads".into(),
            prefix: String::new(),
            expiration_days: None,
            abort_incomplete_upload_days: Some(INCOMPLETE_UPLOAD_CLEANUP_DAYS),
        },
    ]
}

#[async_trait]
impl ResourcePlugin for AwsCurPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    async fn validate_prerequisites(&mut self) -> Result<()> {
        if self.settings.region.is_empty() {
            return Err(CloudError::Prerequisite("AWS region is not configured".into()));
        }
        let api = match self.api.clone() {
            Some(api) => api,
            None => {
                let profile = Some(self.settings.aws_profile.as_str()).filter(|p| !p.is_empty());
                let api: Arc<dyn AwsApi> =
                    Arc::new(SdkAwsApi::connect(&self.settings.region, profile).await);
                self.api = Some(Arc::clone(&api));
                api
            }
        };

        let account = api
            .caller_account()
            .await
            .map_err(|err| CloudError::Prerequisite(err.to_string()))?;
        debug!(account = %account, "AWS credentials valid");
        self.account_id = Some(account);
        Ok(())
    }

    fn as_config_loader(&mut self) -> Option<&mut dyn ConfigLoader> {
        Some(self)
    }

    fn as_previewer(&self) -> Option<&dyn DestroyPreviewer> {
        Some(self)
    }

    fn as_creator(&self) -> Option<&dyn ResourceCreator> {
        Some(self)
    }

    fn as_destroyer(&self) -> Option<&dyn DestroyExecutor> {
        Some(self)
    }
}

impl ConfigLoader for AwsCurPlugin {
    fn load_from_config(&mut self, cfg: &ProjectConfig) -> Result<()> {
        let settings = AwsSettings::from_config(cfg);
        if settings.region.is_empty() {
            return Err(CloudError::InvalidConfig(
                "aws.region missing in .ecos.yaml".into(),
            ));
        }
        if !settings.has_resources() {
            return Err(CloudError::InvalidConfig(NO_RESOURCES_MESSAGE.into()));
        }
        self.settings = settings;
        Ok(())
    }
}

#[async_trait]
impl DestroyPreviewer for AwsCurPlugin {
    async fn describe_destruction(&self) -> Vec<ResourcePreview> {
        let bucket = &self.settings.bucket;
        let workgroups = self.settings.workgroups();

        let api = match self.api() {
            Ok(api) => api,
            Err(err) => {
                let reason = err.to_string();
                let mut previews = Vec::new();
                if !bucket.is_empty() {
                    previews.push(ResourcePreview::unknown(KIND_BUCKET, bucket, &reason));
                }
                for wg in workgroups {
                    previews.push(ResourcePreview::unknown(KIND_WORKGROUP_PREVIEW, wg, &reason));
                }
                return previews;
            }
        };

        let mut previews = Vec::new();
        if !bucket.is_empty() {
            previews.push(match self.bucket_managed(api, bucket).await {
                Ok(managed) => ResourcePreview::new(KIND_BUCKET, bucket, managed),
                Err(err) => {
                    ResourcePreview::unknown(KIND_BUCKET, bucket, humanize_preview_error(&err, bucket))
                }
            });
        }
        for wg in workgroups {
            previews.push(match self.workgroup_managed(api, wg).await {
                Ok(managed) => ResourcePreview::new(KIND_WORKGROUP_PREVIEW, wg, managed),
                Err(err) => ResourcePreview::unknown(
                    KIND_WORKGROUP_PREVIEW,
                    wg,
                    humanize_preview_error(&err, wg),
                ),
            });
        }
        previews
    }
}

#[async_trait]
impl ResourceCreator for AwsCurPlugin {
    async fn create_storage(&self) -> ResourceResult {
        let bucket = &self.settings.bucket;
        if bucket.is_empty() {
            return ResourceResult::skipped(KIND_BUCKET, "", "No results bucket configured");
        }
        let api = match self.api() {
            Ok(api) => api,
            Err(err) => return ResourceResult::failed(KIND_BUCKET, bucket, err.to_string()),
        };

        if api.head_bucket(bucket).await.is_ok() {
            return ResourceResult::skipped(KIND_BUCKET, bucket, "Bucket already exists");
        }

        if let Err(err) = api.create_bucket(bucket, &self.settings.region).await {
            return match classify(&err) {
                ErrorClass::AlreadyOwnedByYou => {
                    ResourceResult::skipped(KIND_BUCKET, bucket, "Bucket already owned by you")
                }
                ErrorClass::TakenGlobally => ResourceResult::failed(
                    KIND_BUCKET,
                    bucket,
                    format!("Bucket name {bucket} is already taken globally"),
                ),
                ErrorClass::AccessDenied => {
                    ResourceResult::failed(KIND_BUCKET, bucket, "Access denied - check AWS permissions")
                }
                _ => ResourceResult::failed(KIND_BUCKET, bucket, format!("Failed to create bucket: {err}")),
            };
        }

        let mut result = ResourceResult::created(KIND_BUCKET, bucket);
        if let Err(err) = api.enable_versioning(bucket).await {
            result.add_warning(format!("Failed to enable versioning for bucket {bucket:?}: {err}"));
        }
        if let Err(err) = api.put_lifecycle_rules(bucket, &lifecycle_rules()).await {
            result.add_warning(format!(
                "Failed to configure lifecycle policy for bucket {bucket:?}: {err}. Automatic cleanup \
                 ({ADHOC_RETENTION_DAYS}-day adhoc deletion, {INCOMPLETE_UPLOAD_CLEANUP_DAYS}-day \
                 incomplete upload cleanup) will not work"
            ));
        }
        if let Err(err) = api.put_bucket_tags(bucket, &self.ownership_tags()).await {
            result.add_warning(format!(
                "Failed to tag bucket {bucket:?} with {MANAGED_TAG_KEY} and {PROJECT_TAG_KEY} tags: {err}"
            ));
        }
        info!(bucket, status = %result.status, "bucket provisioned");
        result
    }

    async fn create_folders(&self) -> Vec<ResourceResult> {
        let bucket = &self.settings.bucket;
        let Some(api) = self.accessible_api().await else {
            return FOLDERS
                .iter()
                .map(|f| ResourceResult::skipped(KIND_FOLDER, *f, "Bucket not accessible"))
                .collect();
        };

        let mut results = Vec::new();
        for folder in FOLDERS {
            if api.head_object(bucket, folder).await.is_ok() {
                results.push(ResourceResult::skipped(KIND_FOLDER, *folder, "Folder already exists"));
                continue;
            }
            results.push(match api.put_object(bucket, folder).await {
                Ok(()) => ResourceResult::created(KIND_FOLDER, *folder),
                Err(err) => {
                    ResourceResult::failed(KIND_FOLDER, *folder, format!("Failed to create folder: {err}"))
                }
            });
        }
        results
    }

    async fn create_workgroups(&self) -> Vec<ResourceResult> {
        let workgroups = self.settings.workgroups();
        let Some(api) = self.accessible_api().await else {
            return workgroups
                .into_iter()
                .map(|wg| ResourceResult::skipped(KIND_WORKGROUP, wg, "S3 bucket not accessible"))
                .collect();
        };

        let mut results = Vec::new();
        for wg in workgroups {
            results.push(self.create_workgroup(api, wg).await);
        }
        results
    }
}

#[async_trait]
impl DestroyExecutor for AwsCurPlugin {
    async fn destroy_resources(&self, prompter: &dyn Prompter) -> Result<Vec<ResourceResult>> {
        let api = self.api()?;
        let bucket = &self.settings.bucket;
        let mut results = Vec::new();

        if !bucket.is_empty() {
            match self.bucket_is_empty(api, bucket).await {
                Ok(true) => results.push(self.destroy_bucket(api, bucket).await),
                Ok(false) => {
                    warn!(bucket = %bucket, "bucket is not empty, deleting it removes all data");
                    let request = Confirmation::DeleteBucketContents {
                        bucket: bucket.clone(),
                    };
                    if !prompter.confirm(&request) {
                        return Ok(Vec::new());
                    }
                    results.push(self.destroy_bucket(api, bucket).await);
                }
                Err(err) => {
                    warn!(bucket = %bucket, error = %err, "bucket contents could not be listed");
                    results.push(ResourceResult::failed(
                        KIND_BUCKET,
                        bucket,
                        format!("failed to list bucket contents: {err}"),
                    ));
                }
            }
        }

        for wg in self.settings.workgroups() {
            results.push(self.destroy_workgroup(api, wg).await);
        }
        Ok(results)
    }
}
