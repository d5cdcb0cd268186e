//! Per-thread session state machine.
//!
//! A [`ThreadSession`] owns the locally loaded comments and replies of one
//! thread for one viewer. Every mutating action takes `&mut self`, so a
//! session never has two actions in flight. Failed actions return a
//! [`ThreadError`] and also leave a [`Notice`] for the view to show.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use coak_core::banned_words::BannedWordList;
use coak_core::comment::validate_content;
use coak_core::error::CoreError;
use coak_core::namespace::ThreadNamespace;
use coak_core::types::DocId;
use coak_core::visibility::{can_modify, render_comment, render_reply, Rendered, Viewer};
use coak_db::models::comment::{Comment, NewComment, Reply};
use coak_db::repositories::{BannedWordRepo, CommentRepo};
use coak_db::{Cursor, StoreError};
use serde::Serialize;

use crate::compose::{ComposeMode, ComposeState};
use crate::error::{Notice, ThreadError, ThreadResult};

/// Loading state of the comment list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadState {
    #[default]
    Idle,
    LoadingInitial,
    Loaded,
    LoadingMore,
}

/// A comment as displayed to the session's viewer, with its loaded replies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedComment {
    pub id: DocId,
    pub created_at: DateTime<Utc>,
    pub reply_count: i64,
    #[serde(flatten)]
    pub body: Rendered,
    pub replies: Vec<RenderedReply>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedReply {
    pub id: DocId,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: Rendered,
}

pub struct ThreadSession {
    comments_repo: CommentRepo,
    banned_words_repo: BannedWordRepo,
    viewer: Viewer,
    thread_id: DocId,

    comments: Vec<Comment>,
    cursor: Option<Cursor>,
    has_more: bool,
    load_state: LoadState,
    replies: HashMap<DocId, Vec<Reply>>,

    /// `None` until the list has been fetched successfully.
    banned_words: Option<BannedWordList>,
    compose: ComposeState,
    notice: Option<Notice>,
}

impl ThreadSession {
    pub fn new(
        comments_repo: CommentRepo,
        banned_words_repo: BannedWordRepo,
        viewer: Viewer,
        thread_id: impl Into<DocId>,
    ) -> Self {
        Self {
            comments_repo,
            banned_words_repo,
            viewer,
            thread_id: thread_id.into(),
            comments: Vec::new(),
            cursor: None,
            has_more: false,
            load_state: LoadState::Idle,
            replies: HashMap::new(),
            banned_words: None,
            compose: ComposeState::default(),
            notice: None,
        }
    }

    /* ----------------------------------------------------------------------
       Accessors
       ---------------------------------------------------------------------- */

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn namespace(&self) -> &ThreadNamespace {
        self.comments_repo.namespace()
    }

    pub fn viewer(&self) -> &Viewer {
        &self.viewer
    }

    /// Loaded comments, in fetch order.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn comment(&self, comment_id: &str) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }

    /// Replies of `parent_id`, if they have been loaded.
    pub fn replies(&self, parent_id: &str) -> Option<&[Reply]> {
        self.replies.get(parent_id).map(Vec::as_slice)
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn banned_words(&self) -> Option<&BannedWordList> {
        self.banned_words.as_ref()
    }

    /// Whether posts are currently checked against the banned-word list.
    /// `false` until a fetch in [`on_appear`](Self::on_appear) succeeds.
    pub fn filter_available(&self) -> bool {
        self.banned_words.is_some()
    }

    pub fn compose(&self) -> &ComposeState {
        &self.compose
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Remove and return the pending notice.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /* ----------------------------------------------------------------------
       Loading
       ---------------------------------------------------------------------- */

    /// Fetch the banned-word list (first time only), then load the first page.
    ///
    /// A failed list fetch does not block the thread: the session continues
    /// with no filter, leaves a notice, and retries on the next call.
    pub async fn on_appear(&mut self) -> ThreadResult<()> {
        if self.banned_words.is_none() {
            match self.banned_words_repo.fetch().await {
                Ok(list) => self.banned_words = Some(list),
                Err(e) => {
                    tracing::warn!(
                        thread_id = %self.thread_id,
                        error = %e,
                        "Banned-word list unavailable, continuing without filter"
                    );
                    self.notice = Some(Notice::from(&ThreadError::from(e)));
                }
            }
        }

        self.load_initial().await
    }

    /// Replace the comment list with the first page.
    ///
    /// On failure the state returns to idle and previously loaded items are
    /// left untouched.
    pub async fn load_initial(&mut self) -> ThreadResult<()> {
        self.load_state = LoadState::LoadingInitial;

        match self.comments_repo.fetch_page(&self.thread_id, None).await {
            Ok(page) => {
                self.comments = page.items;
                self.cursor = page.next_cursor;
                self.has_more = page.has_more;
                self.load_state = LoadState::Loaded;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(thread_id = %self.thread_id, error = %e, "Initial load failed");
                self.load_state = LoadState::Idle;
                self.fail(e.into())
            }
        }
    }

    /// Append the next page. A no-op when there is nothing more to load.
    ///
    /// Returns the number of comments appended.
    pub async fn load_more(&mut self) -> ThreadResult<usize> {
        if !self.has_more {
            return Ok(0);
        }
        let Some(cursor) = self.cursor.clone() else {
            return Ok(0);
        };

        self.load_state = LoadState::LoadingMore;
        let result = self
            .comments_repo
            .fetch_page(&self.thread_id, Some(&cursor))
            .await;
        self.load_state = LoadState::Loaded;

        match result {
            Ok(page) => {
                let count = page.items.len();
                self.comments.extend(page.items);
                self.cursor = page.next_cursor;
                self.has_more = page.has_more;
                Ok(count)
            }
            Err(e) => {
                tracing::warn!(thread_id = %self.thread_id, error = %e, "Loading more failed");
                self.fail(e.into())
            }
        }
    }

    /// Reload the full reply list of `parent_id`.
    pub async fn load_replies(&mut self, parent_id: &str) -> ThreadResult<()> {
        let result = self.reload_replies(parent_id).await;
        self.record(result)
    }

    /// Re-read one comment so its local copy (notably `replyCount`) matches
    /// the store. A comment that no longer exists is dropped from the list.
    pub async fn refresh_comment(&mut self, comment_id: &str) -> ThreadResult<()> {
        let result = self.resync_comment(comment_id).await;
        self.record(result)
    }

    /* ----------------------------------------------------------------------
       Writes
       ---------------------------------------------------------------------- */

    /// Post a new top-level comment and prepend it to the loaded list.
    pub async fn post_comment(&mut self, content: &str, is_secret: bool) -> ThreadResult<Comment> {
        let result = self.try_post_comment(content, is_secret).await;
        self.record(result)
    }

    async fn try_post_comment(&mut self, content: &str, is_secret: bool) -> ThreadResult<Comment> {
        let content = self.check_content(content)?;
        let input = self.new_comment(content, is_secret);

        let comment = self.comments_repo.create(&self.thread_id, &input).await?;
        self.comments.insert(0, comment.clone());
        Ok(comment)
    }

    /// Reply to `parent_id`, then reload that parent's replies and re-read
    /// the parent itself.
    pub async fn post_reply(
        &mut self,
        parent_id: &str,
        content: &str,
        is_secret: bool,
    ) -> ThreadResult<Reply> {
        let result = self.try_post_reply(parent_id, content, is_secret).await;
        self.record(result)
    }

    async fn try_post_reply(
        &mut self,
        parent_id: &str,
        content: &str,
        is_secret: bool,
    ) -> ThreadResult<Reply> {
        let content = self.check_content(content)?;
        let input = self.new_comment(content, is_secret);

        let created = self
            .comments_repo
            .create_reply(&self.thread_id, parent_id, &input)
            .await;
        match created {
            Ok(reply) => {
                self.resync_parent(parent_id).await?;
                Ok(reply)
            }
            Err(e @ StoreError::CounterUpdate { .. }) => {
                // The reply exists; show it even though the count is stale.
                self.resync_parent(parent_id).await?;
                Err(e.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace a comment's content and secret flag.
    pub async fn confirm_edit(
        &mut self,
        comment_id: &str,
        content: &str,
        is_secret: bool,
    ) -> ThreadResult<()> {
        let result = self.try_confirm_edit(comment_id, content, is_secret).await;
        self.record(result)
    }

    async fn try_confirm_edit(
        &mut self,
        comment_id: &str,
        content: &str,
        is_secret: bool,
    ) -> ThreadResult<()> {
        self.modifiable_comment(comment_id)?;
        let content = self.check_content(content)?;

        self.comments_repo
            .edit(&self.thread_id, comment_id, &content, is_secret)
            .await?;

        if let Some(comment) = self.comments.iter_mut().find(|c| c.id == comment_id) {
            comment.content = content;
            comment.is_secret = is_secret;
        }
        Ok(())
    }

    /// Replace a reply's content and secret flag, then reload its parent's
    /// replies.
    pub async fn confirm_edit_reply(
        &mut self,
        parent_id: &str,
        reply_id: &str,
        content: &str,
        is_secret: bool,
    ) -> ThreadResult<()> {
        let result = self
            .try_confirm_edit_reply(parent_id, reply_id, content, is_secret)
            .await;
        self.record(result)
    }

    async fn try_confirm_edit_reply(
        &mut self,
        parent_id: &str,
        reply_id: &str,
        content: &str,
        is_secret: bool,
    ) -> ThreadResult<()> {
        self.modifiable_reply(parent_id, reply_id)?;
        let content = self.check_content(content)?;

        self.comments_repo
            .edit_reply(&self.thread_id, parent_id, reply_id, &content, is_secret)
            .await?;
        self.reload_replies(parent_id).await
    }

    /// Delete a comment, then reload the first page.
    pub async fn delete_comment(&mut self, comment_id: &str) -> ThreadResult<()> {
        let result = self.try_delete_comment(comment_id).await;
        self.record(result)
    }

    async fn try_delete_comment(&mut self, comment_id: &str) -> ThreadResult<()> {
        self.modifiable_comment(comment_id)?;

        self.comments_repo.delete(&self.thread_id, comment_id).await?;

        if self.compose.targets_comment(comment_id) {
            self.compose.reset();
        }
        self.replies.remove(comment_id);
        self.load_initial().await
    }

    /// Delete a reply, then reload its parent's replies and re-read the parent.
    pub async fn delete_reply(&mut self, parent_id: &str, reply_id: &str) -> ThreadResult<()> {
        let result = self.try_delete_reply(parent_id, reply_id).await;
        self.record(result)
    }

    async fn try_delete_reply(&mut self, parent_id: &str, reply_id: &str) -> ThreadResult<()> {
        self.modifiable_reply(parent_id, reply_id)?;

        let deferred = match self
            .comments_repo
            .delete_reply(&self.thread_id, parent_id, reply_id)
            .await
        {
            Ok(()) => None,
            // The reply is gone either way; reload before reporting.
            Err(e @ (StoreError::CounterUpdate { .. } | StoreError::NotFound { .. })) => Some(e),
            Err(e) => return Err(e.into()),
        };

        if self.compose.targets_reply(reply_id) {
            self.compose.reset();
        }
        self.resync_parent(parent_id).await?;

        match deferred {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /* ----------------------------------------------------------------------
       Compose slot
       ---------------------------------------------------------------------- */

    /// Load a comment into the compose slot for editing.
    pub fn start_edit(&mut self, comment_id: &str) -> ThreadResult<()> {
        let result = self
            .modifiable_comment(comment_id)
            .map(|c| (c.content.clone(), c.is_secret));
        let (content, is_secret) = self.record(result)?;
        self.compose.enter_edit(comment_id, &content, is_secret);
        Ok(())
    }

    /// Load a reply into the compose slot for editing.
    pub fn start_edit_reply(&mut self, parent_id: &str, reply_id: &str) -> ThreadResult<()> {
        let result = self
            .modifiable_reply(parent_id, reply_id)
            .map(|r| (r.content.clone(), r.is_secret));
        let (content, is_secret) = self.record(result)?;
        self.compose
            .enter_edit_reply(parent_id, reply_id, &content, is_secret);
        Ok(())
    }

    /// Point the compose slot at `parent_id` for a new reply.
    pub fn start_reply(&mut self, parent_id: &str) -> ThreadResult<()> {
        if self.comment(parent_id).is_none() {
            let err = ThreadError::from(CoreError::NotFound {
                entity: "comment",
                id: parent_id.to_string(),
            });
            return self.fail(err);
        }
        self.compose.enter_reply(parent_id);
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.compose.cancel_edit();
    }

    pub fn cancel_edit_reply(&mut self) {
        self.compose.cancel_edit_reply();
    }

    pub fn clear_reply_target(&mut self) {
        self.compose.clear_reply_target();
    }

    pub fn set_compose_text(&mut self, text: impl Into<String>) {
        self.compose.text = text.into();
    }

    pub fn set_compose_secret(&mut self, is_secret: bool) {
        self.compose.is_secret = is_secret;
    }

    /// Apply the compose slot according to its mode.
    ///
    /// The slot is reset once the write has landed, including when only the
    /// reply counter failed afterwards. Any other failure keeps the text so
    /// the user can retry.
    pub async fn submit(&mut self) -> ThreadResult<()> {
        let text = self.compose.text.clone();
        let is_secret = self.compose.is_secret;

        let result = match self.compose.mode().clone() {
            ComposeMode::Idle => self.post_comment(&text, is_secret).await.map(drop),
            ComposeMode::ReplyingTo { parent_id } => {
                self.post_reply(&parent_id, &text, is_secret).await.map(drop)
            }
            ComposeMode::Editing { comment_id } => {
                self.confirm_edit(&comment_id, &text, is_secret).await
            }
            ComposeMode::EditingReply {
                parent_id,
                reply_id,
            } => {
                self.confirm_edit_reply(&parent_id, &reply_id, &text, is_secret)
                    .await
            }
        };

        match result {
            Ok(()) => {
                self.compose.reset();
                Ok(())
            }
            Err(e @ ThreadError::Store(StoreError::CounterUpdate { .. })) => {
                self.compose.reset();
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /* ----------------------------------------------------------------------
       Rendering
       ---------------------------------------------------------------------- */

    /// Every loaded comment and reply as the viewer sees it.
    pub fn render(&self) -> Vec<RenderedComment> {
        self.comments
            .iter()
            .map(|comment| RenderedComment {
                id: comment.id.clone(),
                created_at: comment.created_at,
                reply_count: comment.reply_count,
                body: render_comment(comment, &self.viewer),
                replies: self
                    .replies
                    .get(&comment.id)
                    .map(|replies| {
                        replies
                            .iter()
                            .map(|reply| RenderedReply {
                                id: reply.id.clone(),
                                created_at: reply.created_at,
                                body: render_reply(reply, comment, &self.viewer),
                            })
                            .collect()
                    })
                    .unwrap_or_default(),
            })
            .collect()
    }

    /* ----------------------------------------------------------------------
       Internals
       ---------------------------------------------------------------------- */

    fn record<T>(&mut self, result: ThreadResult<T>) -> ThreadResult<T> {
        if let Err(e) = &result {
            self.notice = Some(Notice::from(e));
        }
        result
    }

    fn fail<T>(&mut self, err: ThreadError) -> ThreadResult<T> {
        self.record(Err(err))
    }

    /// Trim, validate and run the banned-word check. Never touches the store.
    fn check_content(&self, raw: &str) -> ThreadResult<String> {
        let content = validate_content(raw)?;

        if let Some(word) = self
            .banned_words
            .as_ref()
            .and_then(|list| list.find_match(&content))
        {
            tracing::warn!(
                thread_id = %self.thread_id,
                viewer_id = %self.viewer.id,
                "Blocked content containing a banned word"
            );
            return Err(ThreadError::BannedWordBlocked {
                word: word.to_string(),
            });
        }

        Ok(content)
    }

    fn new_comment(&self, content: String, is_secret: bool) -> NewComment {
        NewComment {
            content,
            author_id: self.viewer.id.clone(),
            author_email: self.viewer.email.clone(),
            is_secret,
        }
    }

    fn modifiable_comment(&self, comment_id: &str) -> ThreadResult<&Comment> {
        let comment = self.comment(comment_id).ok_or_else(|| CoreError::NotFound {
            entity: "comment",
            id: comment_id.to_string(),
        })?;
        if !can_modify(comment, &self.viewer) {
            return Err(CoreError::Forbidden(
                "Only the author or an administrator can change this comment".to_string(),
            )
            .into());
        }
        Ok(comment)
    }

    fn modifiable_reply(&self, parent_id: &str, reply_id: &str) -> ThreadResult<&Reply> {
        let reply = self
            .replies
            .get(parent_id)
            .and_then(|replies| replies.iter().find(|r| r.id == reply_id))
            .ok_or_else(|| CoreError::NotFound {
                entity: "reply",
                id: reply_id.to_string(),
            })?;
        if !can_modify(reply, &self.viewer) {
            return Err(CoreError::Forbidden(
                "Only the author or an administrator can change this reply".to_string(),
            )
            .into());
        }
        Ok(reply)
    }

    async fn reload_replies(&mut self, parent_id: &str) -> ThreadResult<()> {
        let replies = self
            .comments_repo
            .fetch_replies(&self.thread_id, parent_id)
            .await?;
        self.replies.insert(parent_id.to_string(), replies);
        Ok(())
    }

    async fn resync_comment(&mut self, comment_id: &str) -> ThreadResult<()> {
        let fresh = self
            .comments_repo
            .fetch_comment(&self.thread_id, comment_id)
            .await?;
        match fresh {
            Some(fresh) => {
                if let Some(local) = self.comments.iter_mut().find(|c| c.id == comment_id) {
                    *local = fresh;
                }
            }
            None => {
                self.comments.retain(|c| c.id != comment_id);
                self.replies.remove(comment_id);
            }
        }
        Ok(())
    }

    /// Reply list first, then the parent's counter.
    async fn resync_parent(&mut self, parent_id: &str) -> ThreadResult<()> {
        self.reload_replies(parent_id).await?;
        self.resync_comment(parent_id).await
    }
}
