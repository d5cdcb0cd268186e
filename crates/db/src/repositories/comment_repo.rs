//! Repository for comment threads and their replies.
//!
//! One [`CommentRepo`] serves one [`ThreadNamespace`]; video and
//! announcement threads are two instances of the same type. The repository
//! holds no state beyond its configuration.

use std::sync::Arc;

use chrono::Utc;
use coak_core::comment::{ReplyDeletePolicy, DEFAULT_PAGE_SIZE};
use coak_core::namespace::{SortDirection, ThreadNamespace, CREATED_AT_FIELD};

use crate::error::StoreError;
use crate::gateway::{to_fields, Cursor, DocumentStore, Query};
use crate::models::comment::{Comment, EditComment, NewComment, Reply, SetHidden};

/// Counter field on a comment tracking its reply count.
const REPLY_COUNT_FIELD: &str = "replyCount";

/// One page of a paginated fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Position of the last item; `None` when this page is the last one.
    pub next_cursor: Option<Cursor>,
    /// `items.len() == page_size`. A full final page still reports `true`;
    /// the following fetch then comes back empty.
    pub has_more: bool,
}

/// Data access for one thread namespace.
#[derive(Clone)]
pub struct CommentRepo {
    store: Arc<dyn DocumentStore>,
    namespace: ThreadNamespace,
    page_size: usize,
    delete_policy: ReplyDeletePolicy,
}

impl CommentRepo {
    pub fn new(store: Arc<dyn DocumentStore>, namespace: ThreadNamespace) -> Self {
        Self {
            store,
            namespace,
            page_size: DEFAULT_PAGE_SIZE,
            delete_policy: ReplyDeletePolicy::default(),
        }
    }

    /// Override the page size (minimum 1).
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_delete_policy(mut self, policy: ReplyDeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    pub fn namespace(&self) -> &ThreadNamespace {
        &self.namespace
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /* ----------------------------------------------------------------------
       Comments
       ---------------------------------------------------------------------- */

    /// Fetch one page of top-level comments in namespace order.
    pub async fn fetch_page(
        &self,
        thread_id: &str,
        after: Option<&Cursor>,
    ) -> Result<Page<Comment>, StoreError> {
        let query = Query::ordered_by(CREATED_AT_FIELD, self.namespace.comment_order)
            .limit(self.page_size)
            .start_after(after.cloned());

        let docs = self
            .store
            .query(&self.namespace.comments_collection(thread_id), &query)
            .await?;

        let has_more = docs.len() == self.page_size;
        let next_cursor = if has_more {
            docs.last().map(|doc| Cursor::at(doc, CREATED_AT_FIELD))
        } else {
            None
        };

        let items = docs
            .iter()
            .map(Comment::from_document)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            namespace = self.namespace.source.as_str(),
            thread_id,
            count = items.len(),
            has_more,
            "Fetched comment page"
        );

        Ok(Page {
            items,
            next_cursor,
            has_more,
        })
    }

    /// Read a single comment.
    pub async fn fetch_comment(
        &self,
        thread_id: &str,
        comment_id: &str,
    ) -> Result<Option<Comment>, StoreError> {
        self.store
            .get(&self.namespace.comment_path(thread_id, comment_id))
            .await?
            .as_ref()
            .map(Comment::from_document)
            .transpose()
    }

    /// Create a comment with `replyCount = 0`, returning it with its new id.
    pub async fn create(&self, thread_id: &str, input: &NewComment) -> Result<Comment, StoreError> {
        let collection = self.namespace.comments_collection(thread_id);
        let id = self.store.new_id(&collection);

        let comment = Comment {
            id: id.clone(),
            content: input.content.clone(),
            created_at: Utc::now(),
            author_id: input.author_id.clone(),
            author_email: input.author_email.clone(),
            reply_count: 0,
            is_secret: input.is_secret,
            is_hidden: None,
        };

        self.store
            .set(&format!("{collection}/{id}"), to_fields(&comment)?, false)
            .await?;

        tracing::info!(thread_id, comment_id = %id, "Comment created");
        Ok(comment)
    }

    /// Replace a comment's `content` and `isSecret`; nothing else changes.
    pub async fn edit(
        &self,
        thread_id: &str,
        comment_id: &str,
        content: &str,
        is_secret: bool,
    ) -> Result<(), StoreError> {
        let fields = to_fields(&EditComment { content, is_secret })?;
        self.store
            .update(&self.namespace.comment_path(thread_id, comment_id), fields)
            .await?;
        tracing::info!(thread_id, comment_id, "Comment edited");
        Ok(())
    }

    /// Delete a comment.
    ///
    /// Under [`ReplyDeletePolicy::Orphan`] the replies sub-collection is left
    /// in place. Under [`ReplyDeletePolicy::Cascade`] every reply is deleted
    /// first.
    pub async fn delete(&self, thread_id: &str, comment_id: &str) -> Result<(), StoreError> {
        if self.delete_policy == ReplyDeletePolicy::Cascade {
            let replies = self.fetch_replies(thread_id, comment_id).await?;
            for reply in &replies {
                self.store
                    .delete(&self.namespace.reply_path(thread_id, comment_id, &reply.id))
                    .await?;
            }
            tracing::debug!(
                thread_id,
                comment_id,
                count = replies.len(),
                "Cascade-deleted replies"
            );
        }

        self.store
            .delete(&self.namespace.comment_path(thread_id, comment_id))
            .await?;
        tracing::info!(thread_id, comment_id, "Comment deleted");
        Ok(())
    }

    /* ----------------------------------------------------------------------
       Replies
       ---------------------------------------------------------------------- */

    /// All replies of a comment, oldest first.
    pub async fn fetch_replies(
        &self,
        thread_id: &str,
        parent_id: &str,
    ) -> Result<Vec<Reply>, StoreError> {
        let query = Query::ordered_by(CREATED_AT_FIELD, SortDirection::Ascending);
        let docs = self
            .store
            .query(&self.namespace.replies_collection(thread_id, parent_id), &query)
            .await?;

        let replies = docs
            .iter()
            .map(Reply::from_document)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(thread_id, parent_id, count = replies.len(), "Fetched replies");
        Ok(replies)
    }

    /// Read a single reply.
    pub async fn fetch_reply(
        &self,
        thread_id: &str,
        parent_id: &str,
        reply_id: &str,
    ) -> Result<Option<Reply>, StoreError> {
        self.store
            .get(&self.namespace.reply_path(thread_id, parent_id, reply_id))
            .await?
            .as_ref()
            .map(Reply::from_document)
            .transpose()
    }

    /// Create a reply, then atomically increment the parent's `replyCount`.
    ///
    /// If the increment fails the reply still exists and
    /// [`StoreError::CounterUpdate`] is returned.
    pub async fn create_reply(
        &self,
        thread_id: &str,
        parent_id: &str,
        input: &NewComment,
    ) -> Result<Reply, StoreError> {
        let collection = self.namespace.replies_collection(thread_id, parent_id);
        let id = self.store.new_id(&collection);

        let reply = Reply {
            id: id.clone(),
            parent_id: parent_id.to_string(),
            content: input.content.clone(),
            created_at: Utc::now(),
            author_id: input.author_id.clone(),
            author_email: input.author_email.clone(),
            is_secret: input.is_secret,
            is_hidden: None,
        };

        self.store
            .set(&format!("{collection}/{id}"), to_fields(&reply)?, false)
            .await?;
        tracing::info!(thread_id, parent_id, reply_id = %id, "Reply created");

        self.adjust_reply_count(thread_id, parent_id, 1).await?;
        Ok(reply)
    }

    /// Replace a reply's `content` and `isSecret`.
    pub async fn edit_reply(
        &self,
        thread_id: &str,
        parent_id: &str,
        reply_id: &str,
        content: &str,
        is_secret: bool,
    ) -> Result<(), StoreError> {
        let fields = to_fields(&EditComment { content, is_secret })?;
        self.store
            .update(
                &self.namespace.reply_path(thread_id, parent_id, reply_id),
                fields,
            )
            .await?;
        tracing::info!(thread_id, parent_id, reply_id, "Reply edited");
        Ok(())
    }

    /// Delete a reply, then atomically decrement the parent's `replyCount`.
    ///
    /// A reply that is already gone yields [`StoreError::NotFound`] and the
    /// counter is left alone.
    pub async fn delete_reply(
        &self,
        thread_id: &str,
        parent_id: &str,
        reply_id: &str,
    ) -> Result<(), StoreError> {
        let path = self.namespace.reply_path(thread_id, parent_id, reply_id);
        if !self.store.delete(&path).await? {
            tracing::warn!(thread_id, parent_id, reply_id, "Reply already deleted");
            return Err(StoreError::NotFound { path });
        }
        tracing::info!(thread_id, parent_id, reply_id, "Reply deleted");

        self.adjust_reply_count(thread_id, parent_id, -1).await
    }

    async fn adjust_reply_count(
        &self,
        thread_id: &str,
        parent_id: &str,
        delta: i64,
    ) -> Result<(), StoreError> {
        let path = self.namespace.comment_path(thread_id, parent_id);
        if let Err(e) = self.store.increment(&path, REPLY_COUNT_FIELD, delta).await {
            tracing::error!(
                thread_id,
                parent_id,
                delta,
                error = %e,
                "Reply written but replyCount not updated"
            );
            return Err(StoreError::CounterUpdate {
                path,
                delta,
                source: Box::new(e),
            });
        }
        Ok(())
    }

    /* ----------------------------------------------------------------------
       Moderation
       ---------------------------------------------------------------------- */

    /// Set or clear a comment's `isHidden` flag.
    pub async fn set_hidden(
        &self,
        thread_id: &str,
        comment_id: &str,
        hidden: bool,
    ) -> Result<(), StoreError> {
        let fields = to_fields(&SetHidden { is_hidden: hidden })?;
        self.store
            .update(&self.namespace.comment_path(thread_id, comment_id), fields)
            .await?;
        tracing::info!(thread_id, comment_id, hidden, "Comment visibility changed");
        Ok(())
    }

    /// Set or clear a reply's `isHidden` flag.
    pub async fn set_reply_hidden(
        &self,
        thread_id: &str,
        parent_id: &str,
        reply_id: &str,
        hidden: bool,
    ) -> Result<(), StoreError> {
        let fields = to_fields(&SetHidden { is_hidden: hidden })?;
        self.store
            .update(
                &self.namespace.reply_path(thread_id, parent_id, reply_id),
                fields,
            )
            .await?;
        tracing::info!(thread_id, parent_id, reply_id, hidden, "Reply visibility changed");
        Ok(())
    }
}
