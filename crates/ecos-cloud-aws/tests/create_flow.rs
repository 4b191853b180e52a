mod common;

use common::{ADHOC_WORKGROUP, BUCKET, DBT_WORKGROUP, FakeAws, project_config};
use ecos_cloud::{
    CloudError, CreatePhase, LifecycleError, LifecycleOrchestrator, Provisioning, ResourceStatus,
};
use ecos_cloud_aws::api::op;
use ecos_cloud_aws::{AwsApi, AwsCurPlugin};
use std::sync::Arc;

async fn prepared(fake: &Arc<FakeAws>) -> AwsCurPlugin {
    let api: Arc<dyn AwsApi> = fake.clone();
    let mut plugin = AwsCurPlugin::with_api(api);
    LifecycleOrchestrator::new()
        .prepare(&mut plugin, &project_config())
        .await
        .unwrap();
    plugin
}

#[tokio::test]
async fn test_create_from_scratch() {
    let fake = Arc::new(FakeAws::new());
    let plugin = prepared(&fake).await;

    let report = LifecycleOrchestrator::new()
        .create_resources(&plugin, Provisioning::Auto)
        .await
        .unwrap();

    assert_eq!(report.phase, CreatePhase::Done);
    assert!(report.warnings.is_empty());
    // bucket, three folders, two workgroups
    assert_eq!(report.results.len(), 6);
    assert!(
        report
            .results
            .iter()
            .all(|r| r.status == ResourceStatus::Created),
        "{:?}",
        report.results
    );

    assert!(fake.bucket_versioning(BUCKET));
    let tags = fake.bucket_tags(BUCKET);
    assert!(tags.iter().any(|t| t.key == "ecos:managed" && t.value == "true"));
    assert!(tags.iter().any(|t| t.key == "ecos:project" && t.value == "acme"));

    let rules = fake.bucket_lifecycle(BUCKET);
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].id, "DeleteAdhocQueryResultsAfter30Days");

    assert_eq!(fake.objects(BUCKET), vec!["adhoc/", "dbt/", "temp/"]);

    let spec = fake.workgroup_spec(DBT_WORKGROUP).unwrap();
    assert_eq!(spec.output_location, "s3://acme-athena-results/acme-dbt/");
    assert_eq!(spec.description, "Workgroup created by ecos cli for project acme");
    assert!(spec.enforce_configuration);
    assert!(spec.publish_cloudwatch_metrics);
    assert!(!spec.requester_pays);
    assert!(
        fake.workgroup_tags(ADHOC_WORKGROUP)
            .iter()
            .any(|t| t.key == "ecos:managed" && t.value == "true")
    );
}

#[tokio::test]
async fn test_create_is_idempotent() {
    let fake = Arc::new(FakeAws::new());
    let plugin = prepared(&fake).await;
    let orchestrator = LifecycleOrchestrator::new();

    orchestrator
        .create_resources(&plugin, Provisioning::Auto)
        .await
        .unwrap();
    let second = orchestrator
        .create_resources(&plugin, Provisioning::Auto)
        .await
        .unwrap();

    assert!(
        second
            .results
            .iter()
            .all(|r| r.status == ResourceStatus::Skipped)
    );
    assert_eq!(second.results[0].detail.as_deref(), Some("Bucket already exists"));
    assert_eq!(second.results[1].detail.as_deref(), Some("Folder already exists"));
    assert_eq!(second.results[4].detail.as_deref(), Some("Workgroup already exists"));
    assert_eq!(fake.count_calls(op::CREATE_BUCKET), 1);
    assert_eq!(fake.count_calls(op::CREATE_WORKGROUP), 2);
}

#[tokio::test]
async fn test_tagging_failure_is_partial_creation() {
    let fake = Arc::new(FakeAws::new().fail(
        op::PUT_BUCKET_TAGGING,
        BUCKET,
        Some("AccessDenied"),
        "not allowed to tag",
    ));
    let plugin = prepared(&fake).await;

    let report = LifecycleOrchestrator::new()
        .create_resources(&plugin, Provisioning::Auto)
        .await
        .unwrap();

    let bucket = &report.results[0];
    assert_eq!(bucket.status, ResourceStatus::PartiallyCreated);
    assert!(bucket.warning.as_deref().unwrap().contains("Failed to tag bucket"));
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains(BUCKET));
    // folders and workgroups are still provisioned
    assert!(fake.has_workgroup(DBT_WORKGROUP));
}

#[tokio::test]
async fn test_workgroup_tag_failure_names_arn() {
    let fake = Arc::new(FakeAws::new().fail(
        op::TAG_RESOURCE,
        DBT_WORKGROUP,
        Some("AccessDeniedException"),
        "denied",
    ));
    let plugin = prepared(&fake).await;

    let report = LifecycleOrchestrator::new()
        .create_resources(&plugin, Provisioning::Auto)
        .await
        .unwrap();

    let dbt = report
        .results
        .iter()
        .find(|r| r.name == DBT_WORKGROUP)
        .unwrap();
    assert_eq!(dbt.status, ResourceStatus::PartiallyCreated);
    assert!(
        dbt.warning
            .as_deref()
            .unwrap()
            .contains("arn:aws:athena:eu-west-1:123456789012:workgroup/acme-dbt")
    );
}

#[tokio::test]
async fn test_bucket_taken_globally_fails_creation() {
    let fake = Arc::new(FakeAws::new().fail(
        op::CREATE_BUCKET,
        BUCKET,
        Some("BucketAlreadyExists"),
        "The requested bucket name is not available",
    ));
    let plugin = prepared(&fake).await;

    let err = LifecycleOrchestrator::new()
        .create_resources(&plugin, Provisioning::Auto)
        .await
        .unwrap_err();

    let results = match err {
        LifecycleError::CreationFailed { results } => results,
        other => panic!("expected CreationFailed, got {other:?}"),
    };
    assert_eq!(results[0].status, ResourceStatus::Failed);
    assert_eq!(
        results[0].error.as_deref(),
        Some("Bucket name acme-athena-results is already taken globally")
    );
    assert!(results[1..4].iter().all(|r| r.detail.as_deref() == Some("Bucket not accessible")));
    assert!(results[4..].iter().all(|r| r.detail.as_deref() == Some("S3 bucket not accessible")));
    assert!(!fake.has_workgroup(DBT_WORKGROUP));
}

#[tokio::test]
async fn test_existing_unmanaged_workgroup_is_left_alone() {
    let fake = Arc::new(FakeAws::new().with_workgroup(ADHOC_WORKGROUP, false));
    let plugin = prepared(&fake).await;

    let report = LifecycleOrchestrator::new()
        .create_resources(&plugin, Provisioning::Auto)
        .await
        .unwrap();

    let adhoc = report
        .results
        .iter()
        .find(|r| r.name == ADHOC_WORKGROUP)
        .unwrap();
    assert_eq!(adhoc.status, ResourceStatus::Skipped);
    assert!(fake.workgroup_tags(ADHOC_WORKGROUP).is_empty());
}

#[tokio::test]
async fn test_skip_provisioning_makes_no_resource_calls() {
    let fake = Arc::new(FakeAws::new());
    let plugin = prepared(&fake).await;

    let report = LifecycleOrchestrator::new()
        .create_resources(&plugin, Provisioning::Skip)
        .await
        .unwrap();

    assert_eq!(report.phase, CreatePhase::Skipped);
    assert!(report.results.is_empty());
    assert_eq!(fake.calls(), vec![format!("{} ", op::GET_CALLER_IDENTITY)]);
}

#[tokio::test]
async fn test_invalid_credentials_fail_prepare() {
    let fake = Arc::new(FakeAws::new().fail(
        op::GET_CALLER_IDENTITY,
        "",
        Some("ExpiredToken"),
        "The security token included in the request is expired",
    ));
    let api: Arc<dyn AwsApi> = fake.clone();
    let mut plugin = AwsCurPlugin::with_api(api);

    let err = LifecycleOrchestrator::new()
        .prepare(&mut plugin, &project_config())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        LifecycleError::Plugin(CloudError::Prerequisite(_))
    ));
    assert!(err.to_string().contains("ExpiredToken"));
    assert_eq!(fake.count_calls(op::HEAD_BUCKET), 0);
}
