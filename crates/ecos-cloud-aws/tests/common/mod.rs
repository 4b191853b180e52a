#![allow(dead_code)]

use async_trait::async_trait;
use ecos_cloud_aws::api::op;
use ecos_cloud_aws::{
    AwsApi, AwsError, LifecycleRule, ObjectId, ObjectPage, Result, Tag, VersionPage,
    WorkgroupSpec,
};
use ecos_config::ProjectConfig;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Mutex;

pub const ACCOUNT: &str = "123456789012";
pub const REGION: &str = "eu-west-1";
pub const BUCKET: &str = "acme-athena-results";
pub const DBT_WORKGROUP: &str = "acme-dbt";
pub const ADHOC_WORKGROUP: &str = "acme-adhoc";

/// Version id reported for the current version of every object.
const CURRENT: &str = "current";

#[derive(Debug, Default)]
pub struct FakeBucket {
    pub tags: Vec<Tag>,
    pub objects: BTreeSet<String>,
    /// Noncurrent versions and delete markers, as `(key, version_id)`.
    pub versions: BTreeSet<(String, String)>,
    pub versioning: bool,
    pub lifecycle: Vec<LifecycleRule>,
}

#[derive(Debug)]
pub struct FakeWorkgroup {
    pub spec: Option<WorkgroupSpec>,
    pub tags: Vec<Tag>,
}

#[derive(Default)]
struct State {
    buckets: BTreeMap<String, FakeBucket>,
    workgroups: BTreeMap<String, FakeWorkgroup>,
    failures: HashMap<(&'static str, String), AwsError>,
    calls: Vec<String>,
}

/// In-memory S3, Athena and STS.
///
/// Listing is paged by `page_size` and continues after the last returned
/// key, so deletions between pages behave like the real services.
pub struct FakeAws {
    state: Mutex<State>,
    page_size: usize,
}

fn managed_tags() -> Vec<Tag> {
    vec![
        Tag::new("ecos:managed", "true"),
        Tag::new("ecos:project", "acme"),
    ]
}

impl FakeAws {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            page_size: 1000,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_bucket(self, name: &str, managed: bool) -> Self {
        let tags = if managed { managed_tags() } else { Vec::new() };
        self.state.lock().unwrap().buckets.insert(
            name.to_string(),
            FakeBucket {
                tags,
                ..FakeBucket::default()
            },
        );
        self
    }

    pub fn with_objects(self, bucket: &str, count: usize) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let b = state.buckets.get_mut(bucket).unwrap();
            for i in 0..count {
                b.objects.insert(format!("dbt/run-{i:05}.json"));
            }
        }
        self
    }

    pub fn with_old_versions(self, bucket: &str, count: usize) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let b = state.buckets.get_mut(bucket).unwrap();
            for i in 0..count {
                b.versions.insert((format!("adhoc/q-{i:05}.csv"), format!("v{i}")));
            }
        }
        self
    }

    pub fn with_workgroup(self, name: &str, managed: bool) -> Self {
        let tags = if managed { managed_tags() } else { Vec::new() };
        self.state
            .lock()
            .unwrap()
            .workgroups
            .insert(name.to_string(), FakeWorkgroup { spec: None, tags });
        self
    }

    /// Make every call of `operation` on `target` fail with `code`.
    pub fn fail(self, operation: &'static str, target: &str, code: Option<&str>, message: &str) -> Self {
        self.state.lock().unwrap().failures.insert(
            (operation, target.to_string()),
            AwsError::new(operation, code, message),
        );
        self
    }

    pub fn has_bucket(&self, name: &str) -> bool {
        self.state.lock().unwrap().buckets.contains_key(name)
    }

    pub fn has_workgroup(&self, name: &str) -> bool {
        self.state.lock().unwrap().workgroups.contains_key(name)
    }

    pub fn bucket_tags(&self, name: &str) -> Vec<Tag> {
        self.state.lock().unwrap().buckets[name].tags.clone()
    }

    pub fn bucket_versioning(&self, name: &str) -> bool {
        self.state.lock().unwrap().buckets[name].versioning
    }

    pub fn bucket_lifecycle(&self, name: &str) -> Vec<LifecycleRule> {
        self.state.lock().unwrap().buckets[name].lifecycle.clone()
    }

    pub fn objects(&self, bucket: &str) -> Vec<String> {
        self.state.lock().unwrap().buckets[bucket]
            .objects
            .iter()
            .cloned()
            .collect()
    }

    pub fn workgroup_spec(&self, name: &str) -> Option<WorkgroupSpec> {
        self.state.lock().unwrap().workgroups[name].spec.clone()
    }

    pub fn workgroup_tags(&self, name: &str) -> Vec<Tag> {
        self.state.lock().unwrap().workgroups[name].tags.clone()
    }

    /// Calls made so far, as `"<operation> <target>"`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count_calls(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.split(' ').next() == Some(operation))
            .count()
    }

    fn check(&self, operation: &'static str, target: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("{operation} {target}"));
        match state.failures.get(&(operation, target.to_string())) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn limit(&self, max_keys: Option<i32>) -> usize {
        max_keys
            .map(|m| m as usize)
            .unwrap_or(self.page_size)
            .min(self.page_size)
    }
}

fn no_such_bucket(operation: &str) -> AwsError {
    AwsError::with_code(operation, "NoSuchBucket", "The specified bucket does not exist")
}

fn workgroup_arn_name(arn: &str) -> &str {
    arn.rsplit_once("workgroup/").map(|(_, n)| n).unwrap_or(arn)
}

#[async_trait]
impl AwsApi for FakeAws {
    async fn caller_account(&self) -> Result<String> {
        self.check(op::GET_CALLER_IDENTITY, "")?;
        Ok(ACCOUNT.to_string())
    }

    async fn head_bucket(&self, bucket: &str) -> Result<()> {
        self.check(op::HEAD_BUCKET, bucket)?;
        if self.has_bucket(bucket) {
            Ok(())
        } else {
            Err(AwsError::with_code(op::HEAD_BUCKET, "NotFound", "Not Found"))
        }
    }

    async fn create_bucket(&self, bucket: &str, _region: &str) -> Result<()> {
        self.check(op::CREATE_BUCKET, bucket)?;
        let mut state = self.state.lock().unwrap();
        if state.buckets.contains_key(bucket) {
            return Err(AwsError::with_code(
                op::CREATE_BUCKET,
                "BucketAlreadyOwnedByYou",
                "Your previous request to create the named bucket succeeded",
            ));
        }
        state.buckets.insert(bucket.to_string(), FakeBucket::default());
        Ok(())
    }

    async fn enable_versioning(&self, bucket: &str) -> Result<()> {
        self.check(op::PUT_BUCKET_VERSIONING, bucket)?;
        let mut state = self.state.lock().unwrap();
        let b = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket(op::PUT_BUCKET_VERSIONING))?;
        b.versioning = true;
        Ok(())
    }

    async fn put_lifecycle_rules(&self, bucket: &str, rules: &[LifecycleRule]) -> Result<()> {
        self.check(op::PUT_BUCKET_LIFECYCLE, bucket)?;
        let mut state = self.state.lock().unwrap();
        let b = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket(op::PUT_BUCKET_LIFECYCLE))?;
        b.lifecycle = rules.to_vec();
        Ok(())
    }

    async fn put_bucket_tags(&self, bucket: &str, tags: &[Tag]) -> Result<()> {
        self.check(op::PUT_BUCKET_TAGGING, bucket)?;
        let mut state = self.state.lock().unwrap();
        let b = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket(op::PUT_BUCKET_TAGGING))?;
        b.tags = tags.to_vec();
        Ok(())
    }

    async fn get_bucket_tags(&self, bucket: &str) -> Result<Vec<Tag>> {
        self.check(op::GET_BUCKET_TAGGING, bucket)?;
        let state = self.state.lock().unwrap();
        let b = state
            .buckets
            .get(bucket)
            .ok_or_else(|| no_such_bucket(op::GET_BUCKET_TAGGING))?;
        if b.tags.is_empty() {
            return Err(AwsError::with_code(
                op::GET_BUCKET_TAGGING,
                "NoSuchTagSet",
                "The TagSet does not exist",
            ));
        }
        Ok(b.tags.clone())
    }

    async fn head_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.check(op::HEAD_OBJECT, key)?;
        let state = self.state.lock().unwrap();
        match state.buckets.get(bucket) {
            Some(b) if b.objects.contains(key) => Ok(()),
            _ => Err(AwsError::with_code(op::HEAD_OBJECT, "NotFound", "Not Found")),
        }
    }

    async fn put_object(&self, bucket: &str, key: &str) -> Result<()> {
        self.check(op::PUT_OBJECT, key)?;
        let mut state = self.state.lock().unwrap();
        let b = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket(op::PUT_OBJECT))?;
        b.objects.insert(key.to_string());
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        token: Option<String>,
        max_keys: Option<i32>,
    ) -> Result<ObjectPage> {
        self.check(op::LIST_OBJECTS, bucket)?;
        let limit = self.limit(max_keys);
        let state = self.state.lock().unwrap();
        let b = state
            .buckets
            .get(bucket)
            .ok_or_else(|| no_such_bucket(op::LIST_OBJECTS))?;

        let remaining: Vec<String> = b
            .objects
            .iter()
            .filter(|k| token.as_ref().is_none_or(|t| *k > t))
            .cloned()
            .collect();
        let keys: Vec<String> = remaining.iter().take(limit).cloned().collect();
        let next = if remaining.len() > keys.len() {
            keys.last().cloned()
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
        self.check(op::LIST_OBJECT_VERSIONS, bucket)?;
        let limit = self.limit(max_keys);
        let state = self.state.lock().unwrap();
        let b = state
            .buckets
            .get(bucket)
            .ok_or_else(|| no_such_bucket(op::LIST_OBJECT_VERSIONS))?;

        let mut all: Vec<(String, String)> = b
            .objects
            .iter()
            .map(|k| (k.clone(), CURRENT.to_string()))
            .chain(b.versions.iter().cloned())
            .collect();
        all.sort();

        let after = marker.map(|(k, v)| (k.unwrap_or_default(), v.unwrap_or_default()));
        let remaining: Vec<(String, String)> = all
            .into_iter()
            .filter(|entry| after.as_ref().is_none_or(|a| entry > a))
            .collect();
        let page: Vec<(String, String)> = remaining.iter().take(limit).cloned().collect();
        let next = if remaining.len() > page.len() {
            page.last().map(|(k, v)| (Some(k.clone()), Some(v.clone())))
        } else {
            None
        };
        let ids = page
            .into_iter()
            .map(|(key, version)| ObjectId {
                key,
                version_id: Some(version),
            })
            .collect();
        Ok(VersionPage { ids, next })
    }

    async fn delete_objects(&self, bucket: &str, ids: &[ObjectId]) -> Result<()> {
        self.check(op::DELETE_OBJECTS, bucket)?;
        if ids.len() > 1000 {
            return Err(AwsError::with_code(
                op::DELETE_OBJECTS,
                "MalformedXML",
                "too many keys in one request",
            ));
        }
        let mut state = self.state.lock().unwrap();
        let b = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket(op::DELETE_OBJECTS))?;
        for id in ids {
            match id.version_id.as_deref() {
                None | Some(CURRENT) => {
                    b.objects.remove(&id.key);
                }
                Some(version) => {
                    b.versions.remove(&(id.key.clone(), version.to_string()));
                }
            }
        }
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<()> {
        self.check(op::DELETE_BUCKET, bucket)?;
        let mut state = self.state.lock().unwrap();
        let b = state
            .buckets
            .get(bucket)
            .ok_or_else(|| no_such_bucket(op::DELETE_BUCKET))?;
        if !b.objects.is_empty() || !b.versions.is_empty() {
            return Err(AwsError::with_code(
                op::DELETE_BUCKET,
                "BucketNotEmpty",
                "The bucket you tried to delete is not empty",
            ));
        }
        state.buckets.remove(bucket);
        Ok(())
    }

    async fn get_workgroup(&self, name: &str) -> Result<()> {
        self.check(op::GET_WORKGROUP, name)?;
        if self.has_workgroup(name) {
            Ok(())
        } else {
            Err(AwsError::with_code(
                op::GET_WORKGROUP,
                "InvalidRequestException",
                "WorkGroup is not found.",
            ))
        }
    }

    async fn create_workgroup(&self, spec: &WorkgroupSpec) -> Result<()> {
        self.check(op::CREATE_WORKGROUP, &spec.name)?;
        let mut state = self.state.lock().unwrap();
        if state.workgroups.contains_key(&spec.name) {
            return Err(AwsError::with_code(
                op::CREATE_WORKGROUP,
                "InvalidRequestException",
                format!("WorkGroup {} already exists", spec.name),
            ));
        }
        state.workgroups.insert(
            spec.name.clone(),
            FakeWorkgroup {
                spec: Some(spec.clone()),
                tags: Vec::new(),
            },
        );
        Ok(())
    }

    async fn tag_resource(&self, arn: &str, tags: &[Tag]) -> Result<()> {
        let name = workgroup_arn_name(arn);
        self.check(op::TAG_RESOURCE, name)?;
        let mut state = self.state.lock().unwrap();
        let wg = state.workgroups.get_mut(name).ok_or_else(|| {
            AwsError::with_code(op::TAG_RESOURCE, "ResourceNotFoundException", arn)
        })?;
        wg.tags = tags.to_vec();
        Ok(())
    }

    async fn list_resource_tags(&self, arn: &str) -> Result<Vec<Tag>> {
        let name = workgroup_arn_name(arn);
        self.check(op::LIST_TAGS_FOR_RESOURCE, name)?;
        let state = self.state.lock().unwrap();
        state
            .workgroups
            .get(name)
            .map(|wg| wg.tags.clone())
            .ok_or_else(|| {
                AwsError::with_code(op::LIST_TAGS_FOR_RESOURCE, "ResourceNotFoundException", arn)
            })
    }

    async fn delete_workgroup(&self, name: &str) -> Result<()> {
        self.check(op::DELETE_WORKGROUP, name)?;
        let mut state = self.state.lock().unwrap();
        if state.workgroups.remove(name).is_none() {
            return Err(AwsError::with_code(
                op::DELETE_WORKGROUP,
                "InvalidRequestException",
                "WorkGroup is not found.",
            ));
        }
        Ok(())
    }
}

/// Project config naming the standard bucket and workgroups.
pub fn project_config() -> ProjectConfig {
    let mut cfg = ProjectConfig::defaults();
    cfg.project_name = "acme".into();
    cfg.data_source = "aws_cur".into();
    cfg.aws.region = REGION.into();
    cfg.aws.database = "acme_cur".into();
    cfg.aws.results_bucket = BUCKET.into();
    cfg.aws.dbt_workgroup = DBT_WORKGROUP.into();
    cfg.aws.adhoc_workgroup = ADHOC_WORKGROUP.into();
    cfg
}
