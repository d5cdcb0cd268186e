//! Comment and reply documents.
//!
//! Field names are camelCase on the wire; the admin tooling reads the same
//! documents.

use coak_core::types::{DocId, Timestamp};
use coak_core::visibility::Redactable;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::gateway::Document;

/* --------------------------------------------------------------------------
   Comments
   -------------------------------------------------------------------------- */

/// A top-level comment at `{root}/{thread}/comments/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(skip)]
    pub id: DocId,
    pub content: String,
    pub created_at: Timestamp,
    pub author_id: String,
    pub author_email: String,
    #[serde(default)]
    pub reply_count: i64,
    #[serde(default)]
    pub is_secret: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_hidden: Option<bool>,
}

impl Comment {
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let mut comment: Comment = doc.decode()?;
        comment.id = doc.id.clone();
        Ok(comment)
    }
}

/* --------------------------------------------------------------------------
   Replies
   -------------------------------------------------------------------------- */

/// A reply at `{root}/{thread}/comments/{parentId}/replies/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(skip)]
    pub id: DocId,
    pub parent_id: DocId,
    pub content: String,
    pub created_at: Timestamp,
    pub author_id: String,
    pub author_email: String,
    #[serde(default)]
    pub is_secret: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_hidden: Option<bool>,
}

impl Reply {
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let mut reply: Reply = doc.decode()?;
        reply.id = doc.id.clone();
        Ok(reply)
    }
}

/* --------------------------------------------------------------------------
   DTOs
   -------------------------------------------------------------------------- */

/// DTO for creating a comment or a reply. Content must already be validated.
#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub content: String,
    pub author_id: String,
    pub author_email: String,
    pub is_secret: bool,
}

/// Partial update applied by an edit; touches exactly these two fields.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditComment<'a> {
    pub content: &'a str,
    pub is_secret: bool,
}

/// Partial update applied by moderation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetHidden {
    pub is_hidden: bool,
}

/* --------------------------------------------------------------------------
   Visibility policy
   -------------------------------------------------------------------------- */

impl Redactable for Comment {
    fn author_id(&self) -> &str {
        &self.author_id
    }
    fn author_email(&self) -> &str {
        &self.author_email
    }
    fn content(&self) -> &str {
        &self.content
    }
    fn is_secret(&self) -> bool {
        self.is_secret
    }
    fn is_hidden(&self) -> bool {
        self.is_hidden.unwrap_or(false)
    }
}

impl Redactable for Reply {
    fn author_id(&self) -> &str {
        &self.author_id
    }
    fn author_email(&self) -> &str {
        &self.author_email
    }
    fn content(&self) -> &str {
        &self.content
    }
    fn is_secret(&self) -> bool {
        self.is_secret
    }
    fn is_hidden(&self) -> bool {
        self.is_hidden.unwrap_or(false)
    }
}
