//! Integration tests for the report repository.

use std::sync::Arc;

use assert_matches::assert_matches;
use coak_core::namespace::ContentSource;
use coak_core::report::{ReportReason, ReportType};
use coak_db::models::report::{CreateReport, ReportFilter};
use coak_db::repositories::report_repo::DEFAULT_REPORTS_COLLECTION;
use coak_db::repositories::ReportRepo;
use coak_db::{MemoryStore, StoreError};

fn comment_report(target: &str, reason: ReportReason) -> CreateReport {
    CreateReport {
        document_id: "v1".to_string(),
        report_type: ReportType::Comment,
        target_id: target.to_string(),
        content: format!("text of {target}"),
        parent_comment_id: None,
        source: ContentSource::Video,
        reason,
        reported_by: "carol".to_string(),
        reported_by_email: "carol@example.com".to_string(),
    }
}

fn repo() -> (Arc<MemoryStore>, ReportRepo) {
    let store = Arc::new(MemoryStore::new());
    let repo = ReportRepo::new(store.clone(), DEFAULT_REPORTS_COLLECTION);
    (store, repo)
}

#[tokio::test]
async fn create_stores_pending_report() {
    let (store, repo) = repo();

    let report = repo
        .create(&comment_report("c1", ReportReason::Spam))
        .await
        .unwrap();
    assert!(!report.completed);
    assert_eq!(store.document_count(DEFAULT_REPORTS_COLLECTION).await, 1);

    let stored = repo.fetch(&report.id).await.unwrap().unwrap();
    assert_eq!(stored, report);
}

#[tokio::test]
async fn reply_report_keeps_parent_comment_id() {
    let (_store, repo) = repo();
    let mut input = comment_report("r1", ReportReason::Abuse);
    input.report_type = ReportType::Reply;
    input.parent_comment_id = Some("c1".to_string());
    input.source = ContentSource::Notice;

    let report = repo.create(&input).await.unwrap();
    let stored = repo.fetch(&report.id).await.unwrap().unwrap();
    assert_eq!(stored.report_type, ReportType::Reply);
    assert_eq!(stored.parent_comment_id.as_deref(), Some("c1"));
    assert_eq!(stored.source, ContentSource::Notice);
}

#[tokio::test]
async fn list_is_newest_first_and_filters_by_state() {
    let (_store, repo) = repo();
    let mut ids = Vec::new();
    for target in ["c1", "c2", "c3"] {
        ids.push(
            repo.create(&comment_report(target, ReportReason::Other))
                .await
                .unwrap()
                .id,
        );
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    repo.mark_completed(&ids[1]).await.unwrap();

    let all: Vec<String> = repo
        .list(ReportFilter::All)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.target_id)
        .collect();
    assert_eq!(all, vec!["c3", "c2", "c1"]);

    let pending: Vec<String> = repo
        .list(ReportFilter::Pending)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.target_id)
        .collect();
    assert_eq!(pending, vec!["c3", "c1"]);

    let completed = repo.list(ReportFilter::Completed).await.unwrap();
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].id, ids[1]);
    assert!(completed[0].completed);
}

#[tokio::test]
async fn mark_completed_unknown_report_is_not_found() {
    let (_store, repo) = repo();
    assert_matches!(
        repo.mark_completed("missing").await,
        Err(StoreError::NotFound { .. })
    );
}

#[tokio::test]
async fn fetch_unknown_report_is_none() {
    let (_store, repo) = repo();
    assert!(repo.fetch("missing").await.unwrap().is_none());
}
