//! Integration tests for comment pagination and comment CRUD.
//!
//! Runs the repository layer against the in-memory gateway:
//! - page ordering per namespace
//! - cursor idempotence
//! - the page-size `has_more` heuristic
//! - partial edits and orphan/cascade deletes

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{Duration, TimeZone, Utc};
use coak_core::comment::ReplyDeletePolicy;
use coak_core::namespace::ThreadNamespace;
use coak_db::models::comment::{Comment, NewComment};
use coak_db::repositories::CommentRepo;
use coak_db::{DocumentStore, Fields, MemoryStore, StoreError, StoreOp};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fields(value: serde_json::Value) -> Fields {
    match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("expected a JSON object"),
    }
}

/// Seed `count` comments `c00..` with strictly increasing `createdAt`.
async fn seed_comments(store: &MemoryStore, ns: &ThreadNamespace, thread: &str, count: usize) {
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    for i in 0..count {
        let created_at = base + Duration::minutes(i as i64);
        store
            .set(
                &ns.comment_path(thread, &format!("c{i:02}")),
                fields(json!({
                    "content": format!("comment {i}"),
                    "createdAt": created_at,
                    "authorId": "alice",
                    "authorEmail": "alice@example.com",
                    "replyCount": 0,
                })),
                false,
            )
            .await
            .unwrap();
    }
}

fn new_comment(content: &str) -> NewComment {
    NewComment {
        content: content.to_string(),
        author_id: "alice".to_string(),
        author_email: "alice@example.com".to_string(),
        is_secret: false,
    }
}

fn video_repo(store: &Arc<MemoryStore>) -> CommentRepo {
    CommentRepo::new(store.clone(), ThreadNamespace::video("videos"))
}

fn comment_ids(items: &[Comment]) -> Vec<String> {
    items.iter().map(|c| c.id.clone()).collect()
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

#[tokio::test]
async fn video_threads_page_newest_first() {
    let store = Arc::new(MemoryStore::new());
    let repo = video_repo(&store).with_page_size(3);
    seed_comments(&store, repo.namespace(), "v1", 5).await;

    let page = repo.fetch_page("v1", None).await.unwrap();
    assert_eq!(comment_ids(&page.items), vec!["c04", "c03", "c02"]);
}

#[tokio::test]
async fn announcement_threads_page_oldest_first() {
    let store = Arc::new(MemoryStore::new());
    let repo = CommentRepo::new(store.clone(), ThreadNamespace::announcement("notices"))
        .with_page_size(3);
    seed_comments(&store, repo.namespace(), "n1", 5).await;

    let page = repo.fetch_page("n1", None).await.unwrap();
    assert_eq!(comment_ids(&page.items), vec!["c00", "c01", "c02"]);
}

#[tokio::test]
async fn pages_concatenate_without_gaps_or_duplicates() {
    let store = Arc::new(MemoryStore::new());
    let repo = video_repo(&store).with_page_size(4);
    seed_comments(&store, repo.namespace(), "v1", 10).await;

    let mut seen = Vec::new();
    let mut cursor = None;
    loop {
        let page = repo.fetch_page("v1", cursor.as_ref()).await.unwrap();
        seen.extend(comment_ids(&page.items));
        if !page.has_more {
            break;
        }
        cursor = page.next_cursor;
    }

    let expected: Vec<String> = (0..10).rev().map(|i| format!("c{i:02}")).collect();
    assert_eq!(seen, expected);
}

// ---------------------------------------------------------------------------
// Cursor semantics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fetching_with_same_cursor_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let repo = video_repo(&store).with_page_size(3);
    seed_comments(&store, repo.namespace(), "v1", 8).await;

    let first = repo.fetch_page("v1", None).await.unwrap();
    let cursor = first.next_cursor.clone().unwrap();

    let a = repo.fetch_page("v1", Some(&cursor)).await.unwrap();
    let b = repo.fetch_page("v1", Some(&cursor)).await.unwrap();
    assert_eq!(a, b);
    assert_eq!(comment_ids(&a.items), vec!["c04", "c03", "c02"]);
}

#[tokio::test]
async fn empty_thread_has_no_more() {
    let store = Arc::new(MemoryStore::new());
    let repo = video_repo(&store);

    let page = repo.fetch_page("nothing-here", None).await.unwrap();
    assert!(page.items.is_empty());
    assert!(!page.has_more);
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn exact_multiple_of_page_size_needs_one_empty_fetch() {
    let store = Arc::new(MemoryStore::new());
    let repo = video_repo(&store).with_page_size(5);
    seed_comments(&store, repo.namespace(), "v1", 10).await;

    let first = repo.fetch_page("v1", None).await.unwrap();
    assert_eq!(first.items.len(), 5);
    assert!(first.has_more);

    let second = repo
        .fetch_page("v1", first.next_cursor.as_ref())
        .await
        .unwrap();
    assert_eq!(second.items.len(), 5);
    assert!(second.has_more, "a full final page still reports more");

    let third = repo
        .fetch_page("v1", second.next_cursor.as_ref())
        .await
        .unwrap();
    assert!(third.items.is_empty());
    assert!(!third.has_more);
    assert!(third.next_cursor.is_none());
}

#[tokio::test]
async fn short_page_is_final() {
    let store = Arc::new(MemoryStore::new());
    let repo = video_repo(&store).with_page_size(10);
    seed_comments(&store, repo.namespace(), "v1", 7).await;

    let page = repo.fetch_page("v1", None).await.unwrap();
    assert_eq!(page.items.len(), 7);
    assert!(!page.has_more);
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn query_failure_surfaces_backend_error() {
    let store = Arc::new(MemoryStore::new());
    let repo = video_repo(&store);
    store.fail_once(StoreOp::Query, Some("videos/v1")).await;

    assert_matches!(
        repo.fetch_page("v1", None).await,
        Err(StoreError::Backend(_))
    );
}

// ---------------------------------------------------------------------------
// Create / edit / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_assigns_id_and_zero_reply_count() {
    let store = Arc::new(MemoryStore::new());
    let repo = video_repo(&store);

    let comment = repo.create("v1", &new_comment("first!")).await.unwrap();
    assert!(!comment.id.is_empty());
    assert_eq!(comment.reply_count, 0);
    assert_eq!(comment.is_hidden, None);

    let stored = repo.fetch_comment("v1", &comment.id).await.unwrap().unwrap();
    assert_eq!(stored, comment);
}

#[tokio::test]
async fn edit_touches_only_content_and_secret() {
    let store = Arc::new(MemoryStore::new());
    let repo = video_repo(&store);
    let comment = repo.create("v1", &new_comment("before")).await.unwrap();
    repo.set_hidden("v1", &comment.id, true).await.unwrap();
    store
        .increment(
            &repo.namespace().comment_path("v1", &comment.id),
            "replyCount",
            2,
        )
        .await
        .unwrap();

    repo.edit("v1", &comment.id, "after", true).await.unwrap();

    let stored = repo.fetch_comment("v1", &comment.id).await.unwrap().unwrap();
    assert_eq!(stored.content, "after");
    assert!(stored.is_secret);
    assert_eq!(stored.created_at, comment.created_at);
    assert_eq!(stored.reply_count, 2);
    assert_eq!(stored.is_hidden, Some(true));
}

#[tokio::test]
async fn edit_missing_comment_is_not_found() {
    let store = Arc::new(MemoryStore::new());
    let repo = video_repo(&store);

    assert_matches!(
        repo.edit("v1", "ghost", "text", false).await,
        Err(StoreError::NotFound { .. })
    );
}

#[tokio::test]
async fn orphan_delete_leaves_replies_fetchable() {
    let store = Arc::new(MemoryStore::new());
    let repo = video_repo(&store);
    let comment = repo.create("v1", &new_comment("parent")).await.unwrap();
    let reply = repo
        .create_reply("v1", &comment.id, &new_comment("child"))
        .await
        .unwrap();

    repo.delete("v1", &comment.id).await.unwrap();

    assert!(repo.fetch_comment("v1", &comment.id).await.unwrap().is_none());
    let orphan = repo
        .fetch_reply("v1", &comment.id, &reply.id)
        .await
        .unwrap();
    assert_eq!(orphan.map(|r| r.id), Some(reply.id));
}

#[tokio::test]
async fn cascade_delete_removes_replies() {
    let store = Arc::new(MemoryStore::new());
    let repo = video_repo(&store).with_delete_policy(ReplyDeletePolicy::Cascade);
    let comment = repo.create("v1", &new_comment("parent")).await.unwrap();
    for text in ["a", "b", "c"] {
        repo.create_reply("v1", &comment.id, &new_comment(text))
            .await
            .unwrap();
    }

    repo.delete("v1", &comment.id).await.unwrap();

    let replies_collection = repo.namespace().replies_collection("v1", &comment.id);
    assert_eq!(store.document_count(&replies_collection).await, 0);
    assert!(repo.fetch_comment("v1", &comment.id).await.unwrap().is_none());
}

#[tokio::test]
async fn set_hidden_on_reply_updates_only_that_reply() {
    let store = Arc::new(MemoryStore::new());
    let repo = video_repo(&store);
    let comment = repo.create("v1", &new_comment("parent")).await.unwrap();
    let hidden = repo
        .create_reply("v1", &comment.id, &new_comment("bad"))
        .await
        .unwrap();
    let kept = repo
        .create_reply("v1", &comment.id, &new_comment("fine"))
        .await
        .unwrap();

    repo.set_reply_hidden("v1", &comment.id, &hidden.id, true)
        .await
        .unwrap();

    let replies = repo.fetch_replies("v1", &comment.id).await.unwrap();
    let by_id = |id: &str| replies.iter().find(|r| r.id == id).cloned().unwrap();
    assert_eq!(by_id(&hidden.id).is_hidden, Some(true));
    assert_eq!(by_id(&kept.id).is_hidden, None);
}
