//! Visibility policy for comments and replies.
//!
//! Two independent redactions stack on every item:
//!
//! - **Secret** (`isSecret`): content and author are shown only to the
//!   author and to admins.
//! - **Hidden** (`isHidden`): set by moderation; content is replaced by
//!   [`HIDDEN_PLACEHOLDER`] for every viewer, the author and admins included.
//!
//! Hidden wins for content display. The author is displayed only when the
//! item passes the secrecy check and is not hidden.
//!
//! A secret reply does not check its own author: it is readable exactly when
//! its parent comment is readable for the same viewer.

use serde::Serialize;

use crate::comment::{HIDDEN_PLACEHOLDER, SECRET_PLACEHOLDER};

/// The identity a thread is being viewed as.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Viewer {
    pub id: String,
    pub email: String,
    pub is_admin: bool,
}

impl Viewer {
    pub fn new(id: impl Into<String>, email: impl Into<String>, is_admin: bool) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            is_admin,
        }
    }
}

/// Fields the policy needs from a comment or reply.
pub trait Redactable {
    fn author_id(&self) -> &str;
    fn author_email(&self) -> &str;
    fn content(&self) -> &str;
    fn is_secret(&self) -> bool;
    fn is_hidden(&self) -> bool;
}

/// Secrecy check for a top-level comment.
pub fn is_visible<T: Redactable + ?Sized>(item: &T, viewer: &Viewer) -> bool {
    !item.is_secret() || item.author_id() == viewer.id || viewer.is_admin
}

/// Secrecy check for a reply, decided by its parent comment.
pub fn is_reply_visible<R, C>(reply: &R, parent: &C, viewer: &Viewer) -> bool
where
    R: Redactable + ?Sized,
    C: Redactable + ?Sized,
{
    !reply.is_secret() || is_visible(parent, viewer)
}

/// Whether the viewer may edit or delete the item.
pub fn can_modify<T: Redactable + ?Sized>(item: &T, viewer: &Viewer) -> bool {
    item.author_id() == viewer.id || viewer.is_admin
}

/// What the rendering layer shows for one comment or reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rendered {
    pub content: String,
    pub author_email: Option<String>,
    pub can_modify: bool,
    pub is_secret: bool,
    pub is_hidden: bool,
}

fn render_with<T: Redactable + ?Sized>(item: &T, viewer: &Viewer, visible: bool) -> Rendered {
    let content = if item.is_hidden() {
        HIDDEN_PLACEHOLDER.to_string()
    } else if !visible {
        SECRET_PLACEHOLDER.to_string()
    } else {
        item.content().to_string()
    };

    let author_email = (visible && !item.is_hidden()).then(|| item.author_email().to_string());

    Rendered {
        content,
        author_email,
        can_modify: can_modify(item, viewer),
        is_secret: item.is_secret(),
        is_hidden: item.is_hidden(),
    }
}

/// Render a top-level comment for `viewer`.
pub fn render_comment<T: Redactable + ?Sized>(comment: &T, viewer: &Viewer) -> Rendered {
    render_with(comment, viewer, is_visible(comment, viewer))
}

/// Render a reply for `viewer`, using `parent` for the secrecy decision.
pub fn render_reply<R, C>(reply: &R, parent: &C, viewer: &Viewer) -> Rendered
where
    R: Redactable + ?Sized,
    C: Redactable + ?Sized,
{
    render_with(reply, viewer, is_reply_visible(reply, parent, viewer))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
