//! Integration tests for history, comparison, and deletion.

mod helpers;

use serde_json::json;
use uuid::Uuid;

use versa::{Stores, Versa};
use versa_core::ErrorKind;
use versa_entity::document::{CreateDocument, KnowledgeDocument};
use versa_entity::snapshot::{ChangeType, FieldDiff};
use versa_service::SnapshotRequest;

use helpers::{ALICE, BOB, TestContext, test_config};

#[tokio::test]
async fn test_compare_title_change() {
    let ctx = TestContext::new().await;
    let proposal = ctx.proposal("A").await;
    let v1 = ctx.service.create_snapshot(proposal.id, ALICE, None, None).await.unwrap();
    ctx.retitle(proposal.id, "B").await;
    let v2 = ctx.service.create_snapshot(proposal.id, ALICE, None, None).await.unwrap();

    let comparison = ctx.service.compare_versions(v1.id, v2.id).await.unwrap();

    assert_eq!(
        comparison.differences,
        vec![FieldDiff {
            field: "title".into(),
            old_value: Some(json!("A")),
            new_value: Some(json!("B")),
            change_type: ChangeType::Modified,
        }]
    );
}

#[tokio::test]
async fn test_compare_is_mirrored() {
    let ctx = TestContext::new().await;
    let proposal = ctx.proposal("Spring catalogue").await;
    let v1 = ctx.service.create_snapshot(proposal.id, ALICE, None, None).await.unwrap();
    ctx.proposals
        .edit(proposal.id, |p| {
            p.title = "Summer catalogue".into();
            p.client_name = None;
            p.mime_type = Some("application/pdf".into());
            p.metadata = Some(json!({"pages": 12}));
        })
        .await
        .unwrap();
    let v2 = ctx.service.create_snapshot(proposal.id, ALICE, None, None).await.unwrap();

    let forward = ctx.service.compare_versions(v1.id, v2.id).await.unwrap().differences;
    let backward = ctx.service.compare_versions(v2.id, v1.id).await.unwrap().differences;

    assert_eq!(forward.len(), 4);
    let mirrored: Vec<FieldDiff> = forward.iter().map(FieldDiff::mirrored).collect();
    assert_eq!(backward, mirrored);

    let client = forward.iter().find(|d| d.field == "client_name").unwrap();
    assert_eq!(client.change_type, ChangeType::Removed);
    let mime = forward.iter().find(|d| d.field == "mime_type").unwrap();
    assert_eq!(mime.change_type, ChangeType::Added);
}

#[tokio::test]
async fn test_compare_with_itself_is_empty() {
    let ctx = TestContext::new().await;
    let proposal = ctx.proposal("Same").await;
    let v1 = ctx.service.create_snapshot(proposal.id, ALICE, None, None).await.unwrap();

    let comparison = ctx.service.compare_versions(v1.id, v1.id).await.unwrap();
    assert!(comparison.differences.is_empty());
}

#[tokio::test]
async fn test_compare_unknown_ids() {
    let ctx = TestContext::new().await;
    let proposal = ctx.proposal("Known").await;
    let v1 = ctx.service.create_snapshot(proposal.id, ALICE, None, None).await.unwrap();

    let err = ctx
        .service
        .compare_versions(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);

    let err = ctx
        .service
        .compare_versions(v1.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::NotFound);
}

#[tokio::test]
async fn test_compare_with_live() {
    let ctx = TestContext::new().await;
    let proposal = ctx.proposal("Live").await;
    let v1 = ctx.service.create_snapshot(proposal.id, ALICE, None, None).await.unwrap();
    assert!(ctx.service.compare_with_live(v1.id).await.unwrap().differences.is_empty());

    ctx.retitle(proposal.id, "Live (edited)").await;
    let diff = ctx.service.compare_with_live(v1.id).await.unwrap().differences;
    assert_eq!(diff.len(), 1);
    assert_eq!(diff[0].new_value, Some(json!("Live (edited)")));
}

#[tokio::test]
async fn test_history_newest_first_and_enriched() {
    let ctx = TestContext::new().await;
    let proposal = ctx.proposal("Draft 1").await;
    ctx.service.create_snapshot(proposal.id, ALICE, None, None).await.unwrap();
    ctx.retitle(proposal.id, "Draft 2").await;
    ctx.service.create_snapshot(proposal.id, BOB, None, None).await.unwrap();
    ctx.service.create_snapshot(proposal.id, 99, None, None).await.unwrap();

    let history = ctx.service.get_version_history(proposal.id, None, None).await.unwrap();

    let versions: Vec<i32> = history.iter().map(|h| h.version.version).collect();
    assert_eq!(versions, vec![3, 2, 1]);

    assert_eq!(history[0].created_by_name, None);
    assert_eq!(history[1].created_by_name.as_deref(), Some("Bob Okafor"));
    assert_eq!(history[2].created_by_name.as_deref(), Some("Alice Moreau"));

    assert_eq!(history[0].diff_from_parent, Some(vec![]));
    let v2_diff = history[1].diff_from_parent.as_ref().unwrap();
    assert_eq!(v2_diff.len(), 1);
    assert_eq!(v2_diff[0].field, "title");
    assert_eq!(history[2].diff_from_parent, None);
}

#[tokio::test]
async fn test_history_paging() {
    let ctx = TestContext::new().await;
    let proposal = ctx.proposal("Paged").await;
    for _ in 0..6 {
        ctx.service.create_snapshot(proposal.id, ALICE, None, None).await.unwrap();
    }

    let page = ctx
        .service
        .get_version_history(proposal.id, Some(2), Some(1))
        .await
        .unwrap();
    let versions: Vec<i32> = page.iter().map(|h| h.version.version).collect();
    assert_eq!(versions, vec![5, 4]);

    // Rows whose parent falls outside the page still get a diff.
    assert!(page[1].diff_from_parent.is_some());

    let clamped = ctx
        .service
        .get_version_history(proposal.id, Some(0), None)
        .await
        .unwrap();
    assert_eq!(clamped.len(), 1);

    let past_end = ctx
        .service
        .get_version_history(proposal.id, Some(10), Some(10))
        .await
        .unwrap();
    assert!(past_end.is_empty());
}

#[tokio::test]
async fn test_history_of_unknown_entity() {
    let ctx = TestContext::new().await;
    let err = ctx
        .service
        .get_version_history(Uuid::new_v4(), None, None)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_delete_current_version_rejected() {
    let ctx = TestContext::new().await;
    let proposal = ctx.proposal("Keep").await;
    ctx.service.create_snapshot(proposal.id, ALICE, None, None).await.unwrap();
    let v2 = ctx.service.create_snapshot(proposal.id, ALICE, None, None).await.unwrap();

    let err = ctx.service.delete_version(v2.id).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(ctx.service.get_version(v2.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_delete_old_version() {
    let ctx = TestContext::new().await;
    let proposal = ctx.proposal("One").await;
    ctx.service.create_snapshot(proposal.id, ALICE, None, None).await.unwrap();
    ctx.retitle(proposal.id, "Two").await;
    let v2 = ctx.service.create_snapshot(proposal.id, ALICE, None, None).await.unwrap();
    ctx.retitle(proposal.id, "Three").await;
    ctx.service.create_snapshot(proposal.id, ALICE, None, None).await.unwrap();

    ctx.service.delete_version(v2.id).await.unwrap();

    assert!(ctx.service.get_version(v2.id).await.unwrap().is_none());
    let history = ctx.service.get_version_history(proposal.id, None, None).await.unwrap();
    let versions: Vec<i32> = history.iter().map(|h| h.version.version).collect();
    assert_eq!(versions, vec![3, 1]);
    assert_eq!(history[0].version.parent_version, Some(2));
    assert_eq!(history[0].diff_from_parent, None);

    let next = ctx.service.create_snapshot(proposal.id, ALICE, None, None).await.unwrap();
    assert_eq!(next.version, 4);

    let err = ctx.service.delete_version(v2.id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_stats_and_tags() {
    let ctx = TestContext::new().await;
    let proposal = ctx.proposal("Stats").await;
    let request = SnapshotRequest::labeled("milestone").with_tags(["release"]).major();
    ctx.service.create_snapshot_with(proposal.id, ALICE, request).await.unwrap();
    ctx.service.create_snapshot(proposal.id, BOB, None, None).await.unwrap();
    let last = ctx
        .service
        .create_snapshot_with(
            proposal.id,
            BOB,
            SnapshotRequest::default().with_tags(["release", "hotfix"]),
        )
        .await
        .unwrap();

    let stats = ctx.service.get_version_stats(proposal.id).await.unwrap();
    assert_eq!(stats.total_versions, 3);
    assert_eq!(stats.major_versions, 1);
    assert_eq!(stats.minor_versions, 2);
    assert_eq!(stats.contributor_count, 2);
    assert_eq!(stats.last_modified, Some(last.created_at));

    let tagged = ctx.service.find_versions_by_tag(proposal.id, "release").await.unwrap();
    let versions: Vec<i32> = tagged.iter().map(|s| s.version).collect();
    assert_eq!(versions, vec![3, 1]);

    let hotfix = ctx.service.find_versions_by_tag(proposal.id, " hotfix ").await.unwrap();
    assert_eq!(hotfix.len(), 1);

    assert!(ctx.service.find_versions_by_tag(proposal.id, "missing").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_snapshot_detail() {
    let ctx = TestContext::new().await;
    let proposal = ctx.proposal("Detail").await;
    let v1 = ctx.service.create_snapshot(proposal.id, ALICE, None, None).await.unwrap();
    ctx.retitle(proposal.id, "Detail (final)").await;
    let v2 = ctx.service.create_snapshot(proposal.id, ALICE, None, None).await.unwrap();

    let queries = ctx.service.query_service();
    let first = queries.get_snapshot_detail(v1.id).await.unwrap().unwrap();
    assert_eq!(first.parent_diff, None);
    let second = queries.get_snapshot_detail(v2.id).await.unwrap().unwrap();
    assert_eq!(second.parent_diff.unwrap().len(), 1);

    assert!(queries.get_snapshot_detail(Uuid::new_v4()).await.unwrap().is_none());
    assert_eq!(queries.get_version(proposal.id, 2).await.unwrap().unwrap().id, v2.id);
    assert!(queries.get_version(proposal.id, 7).await.unwrap().is_none());
}

#[tokio::test]
async fn test_documents_share_the_engine() {
    let versa = Versa::in_memory(&test_config());
    let Stores::Memory {
        proposals,
        documents,
        ..
    } = versa.stores()
    else {
        panic!("expected in-memory stores");
    };

    let doc = KnowledgeDocument::new(CreateDocument {
        title: "Onboarding guide".into(),
        body: "Welcome".into(),
        category: Some("hr".into()),
        created_by: ALICE,
        ..Default::default()
    });
    documents.put(doc.clone()).await;

    let v1 = versa.documents.create_snapshot(doc.id, ALICE, None, None).await.unwrap();
    documents
        .edit(doc.id, |d| d.summary = Some("Day one checklist".into()))
        .await
        .unwrap();
    let v2 = versa.documents.create_snapshot(doc.id, ALICE, None, None).await.unwrap();

    let diff = versa.documents.compare_versions(v1.id, v2.id).await.unwrap().differences;
    assert_eq!(diff.len(), 1);
    assert_eq!(diff[0].field, "summary");
    assert_eq!(diff[0].change_type, ChangeType::Added);

    versa.documents.revert_to_version(v1.id, BOB, None).await.unwrap();
    assert_eq!(documents.get(doc.id).await.unwrap().summary, None);

    // Snapshot ids of one kind do not resolve through another kind.
    assert!(versa.proposals.get_version(v1.id).await.unwrap().is_none());
    assert!(proposals.get(doc.id).await.is_none());
}
