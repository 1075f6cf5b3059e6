//! Integration tests for snapshot creation.

mod helpers;

use serde_json::json;
use uuid::Uuid;

use versa_core::ErrorKind;
use versa_service::SnapshotRequest;

use helpers::{ALICE, BOB, TestContext};

#[tokio::test]
async fn test_sequential_snapshots_number_from_one() {
    let ctx = TestContext::new().await;
    let proposal = ctx.proposal("Q3 pricing").await;

    let mut versions = Vec::new();
    for i in 0..5 {
        ctx.retitle(proposal.id, &format!("Q3 pricing r{i}")).await;
        let dto = ctx
            .service
            .create_snapshot(proposal.id, ALICE, Some(format!("r{i}")), None)
            .await
            .unwrap();
        versions.push(dto.version);
    }

    assert_eq!(versions, vec![1, 2, 3, 4, 5]);
    assert_eq!(ctx.live(proposal.id).await.current_version, 5);
}

#[tokio::test]
async fn test_first_snapshot_has_no_parent() {
    let ctx = TestContext::new().await;
    let proposal = ctx.proposal("Renewal").await;

    let first = ctx
        .service
        .create_snapshot(proposal.id, ALICE, None, None)
        .await
        .unwrap();
    assert_eq!(first.parent_version, None);
    assert_eq!(first.changed_fields, None);
    assert_eq!(first.snapshot_data["title"], json!("Renewal"));

    ctx.retitle(proposal.id, "Renewal 2027").await;
    let second = ctx
        .service
        .create_snapshot(proposal.id, BOB, None, None)
        .await
        .unwrap();
    assert_eq!(second.parent_version, Some(1));
    assert_eq!(
        second.changed_fields,
        Some(json!({"title": {"old": "Renewal", "new": "Renewal 2027"}}))
    );
    assert_eq!(second.created_by_id, BOB);
}

#[tokio::test]
async fn test_unchanged_entity_still_gets_a_version() {
    let ctx = TestContext::new().await;
    let proposal = ctx.proposal("Static").await;

    ctx.service
        .create_snapshot(proposal.id, ALICE, None, None)
        .await
        .unwrap();
    let again = ctx
        .service
        .create_snapshot(proposal.id, ALICE, None, None)
        .await
        .unwrap();

    assert_eq!(again.version, 2);
    assert_eq!(again.changed_fields, Some(json!({})));
}

#[tokio::test]
async fn test_snapshot_does_not_touch_tracked_fields() {
    let ctx = TestContext::new().await;
    let proposal = ctx.proposal("Untouched").await;

    ctx.service
        .create_snapshot(proposal.id, BOB, Some("checkpoint".into()), None)
        .await
        .unwrap();

    let live = ctx.live(proposal.id).await;
    assert_eq!(live.title, proposal.title);
    assert_eq!(live.content, proposal.content);
    assert_eq!(live.modified_by, None);
    assert_eq!(live.updated_at, proposal.updated_at);
}

#[tokio::test]
async fn test_three_concurrent_snapshots() {
    let ctx = TestContext::new().await;
    let proposal = ctx.proposal("Contended").await;

    let tasks: Vec<_> = (0..3)
        .map(|i| {
            let service = ctx.service.clone();
            let id = proposal.id;
            tokio::spawn(async move {
                service
                    .create_snapshot(id, ALICE, Some(format!("writer {i}")), None)
                    .await
            })
        })
        .collect();

    let mut versions: Vec<i32> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap().unwrap().version)
        .collect();
    versions.sort_unstable();

    assert_eq!(versions, vec![1, 2, 3]);
    assert_eq!(ctx.live(proposal.id).await.current_version, 3);
    assert_eq!(ctx.snapshot_count(proposal.id).await, 3);
}

#[tokio::test]
async fn test_many_concurrent_snapshots_are_distinct() {
    let ctx = TestContext::new().await;
    let proposal = ctx.proposal("Busy").await;

    let tasks: Vec<_> = (0..12)
        .map(|_| {
            let service = ctx.service.clone();
            let id = proposal.id;
            tokio::spawn(async move { service.create_snapshot(id, BOB, None, None).await })
        })
        .collect();

    let mut versions: Vec<i32> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|r| r.unwrap().unwrap().version)
        .collect();
    versions.sort_unstable();
    versions.dedup();

    assert_eq!(versions.len(), 12);
    assert_eq!(ctx.live(proposal.id).await.current_version, 12);
}

#[tokio::test]
async fn test_entities_are_versioned_independently() {
    let ctx = TestContext::new().await;
    let a = ctx.proposal("A").await;
    let b = ctx.proposal("B").await;

    ctx.service.create_snapshot(a.id, ALICE, None, None).await.unwrap();
    ctx.service.create_snapshot(a.id, ALICE, None, None).await.unwrap();
    let first_b = ctx.service.create_snapshot(b.id, ALICE, None, None).await.unwrap();

    assert_eq!(first_b.version, 1);
    assert_eq!(ctx.live(b.id).await.current_version, 1);
}

#[tokio::test]
async fn test_snapshot_of_unknown_entity() {
    let ctx = TestContext::new().await;

    let err = ctx
        .service
        .create_snapshot(Uuid::new_v4(), ALICE, None, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_snapshot_options() {
    let ctx = TestContext::new().await;
    let proposal = ctx.proposal("Launch").await;

    let request = SnapshotRequest::labeled("Sent to client")
        .with_description("Final pricing agreed")
        .with_tags([" sent ", "pricing", "sent"])
        .with_metadata(json!({"channel": "email"}))
        .major();
    let dto = ctx
        .service
        .create_snapshot_with(proposal.id, ALICE, request)
        .await
        .unwrap();

    assert_eq!(dto.label.as_deref(), Some("Sent to client"));
    assert_eq!(dto.description.as_deref(), Some("Final pricing agreed"));
    assert_eq!(dto.tags, vec!["sent".to_string(), "pricing".to_string()]);
    assert_eq!(dto.metadata, Some(json!({"channel": "email"})));
    assert!(dto.is_major);
}

#[tokio::test]
async fn test_invalid_request_writes_nothing() {
    let ctx = TestContext::new().await;
    let proposal = ctx.proposal("Strict").await;

    let err = ctx
        .service
        .create_snapshot(proposal.id, ALICE, Some("x".repeat(300)), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    let err = ctx
        .service
        .create_snapshot_with(
            proposal.id,
            ALICE,
            SnapshotRequest::default().with_tags(["ok", ""]),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);

    assert_eq!(ctx.snapshot_count(proposal.id).await, 0);
    assert_eq!(ctx.live(proposal.id).await.current_version, 0);
}

#[tokio::test]
async fn test_store_failure_is_not_retried() {
    let ctx = TestContext::new().await;
    let proposal = ctx.proposal("Quarterly").await;
    ctx.service.create_snapshot(proposal.id, ALICE, None, None).await.unwrap();
    ctx.flaky_snapshots.fail_nth_insert(1);

    let err = ctx
        .service
        .create_snapshot(proposal.id, ALICE, Some("second".into()), None)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Storage);
    assert!(!err.is_retryable());
    assert_eq!(ctx.snapshot_count(proposal.id).await, 1);
    assert_eq!(ctx.live(proposal.id).await.current_version, 1);

    let next = ctx.service.create_snapshot(proposal.id, ALICE, None, None).await.unwrap();
    assert_eq!(next.version, 2);
}

#[tokio::test]
async fn test_duplicate_tags_do_not_count_toward_limit() {
    let ctx = TestContext::new().await;
    let proposal = ctx.proposal("Tagged").await;
    let mut tags: Vec<String> = (0..32).map(|i| format!("region-{i}")).collect();
    tags.push("region-0".into());

    let dto = ctx
        .service
        .create_snapshot_with(proposal.id, ALICE, SnapshotRequest::default().with_tags(tags))
        .await
        .unwrap();
    assert_eq!(dto.tags.len(), 32);

    let too_many: Vec<String> = (0..33).map(|i| format!("region-{i}")).collect();
    let err = ctx
        .service
        .create_snapshot_with(proposal.id, ALICE, SnapshotRequest::default().with_tags(too_many))
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_update_labels_leaves_data_alone() {
    let ctx = TestContext::new().await;
    let proposal = ctx.proposal("Annotated").await;
    let dto = ctx
        .service
        .create_snapshot(proposal.id, ALICE, Some("draft".into()), None)
        .await
        .unwrap();

    let updated = ctx
        .service
        .update_version_labels(
            dto.id,
            Some("approved".into()),
            None,
            Some(vec!["legal".into(), " legal".into()]),
        )
        .await
        .unwrap();

    assert_eq!(updated.label.as_deref(), Some("approved"));
    assert_eq!(updated.tags, vec!["legal".to_string()]);
    assert_eq!(updated.snapshot_data, dto.snapshot_data);
    assert_eq!(updated.version, dto.version);
    assert_eq!(updated.created_at, dto.created_at);
}

#[tokio::test]
async fn test_update_labels_of_unknown_snapshot() {
    let ctx = TestContext::new().await;

    let err = ctx
        .service
        .update_version_labels(Uuid::new_v4(), Some("x".into()), None, None)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
