//! The compose slot of a thread session.
//!
//! One slot holds the text being written plus what it will be applied to.
//! Because the mode is a single enum, editing and replying can never be
//! active at the same time; entering a mode replaces whatever was there.

use coak_core::types::DocId;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ComposeMode {
    /// Writing a new top-level comment.
    #[default]
    Idle,
    Editing {
        comment_id: DocId,
    },
    EditingReply {
        parent_id: DocId,
        reply_id: DocId,
    },
    ReplyingTo {
        parent_id: DocId,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComposeState {
    pub text: String,
    pub is_secret: bool,
    mode: ComposeMode,
}

impl ComposeState {
    pub fn mode(&self) -> &ComposeMode {
        &self.mode
    }

    pub(crate) fn enter_edit(&mut self, comment_id: &str, content: &str, is_secret: bool) {
        self.text = content.to_string();
        self.is_secret = is_secret;
        self.mode = ComposeMode::Editing {
            comment_id: comment_id.to_string(),
        };
    }

    pub(crate) fn enter_edit_reply(
        &mut self,
        parent_id: &str,
        reply_id: &str,
        content: &str,
        is_secret: bool,
    ) {
        self.text = content.to_string();
        self.is_secret = is_secret;
        self.mode = ComposeMode::EditingReply {
            parent_id: parent_id.to_string(),
            reply_id: reply_id.to_string(),
        };
    }

    pub(crate) fn enter_reply(&mut self, parent_id: &str) {
        self.text.clear();
        self.is_secret = false;
        self.mode = ComposeMode::ReplyingTo {
            parent_id: parent_id.to_string(),
        };
    }

    /// Back to idle with empty text and the secret flag cleared.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Reset only if the slot is currently editing a comment.
    pub fn cancel_edit(&mut self) {
        if matches!(self.mode, ComposeMode::Editing { .. }) {
            self.reset();
        }
    }

    /// Reset only if the slot is currently editing a reply.
    pub fn cancel_edit_reply(&mut self) {
        if matches!(self.mode, ComposeMode::EditingReply { .. }) {
            self.reset();
        }
    }

    /// Reset only if the slot is currently replying.
    pub fn clear_reply_target(&mut self) {
        if matches!(self.mode, ComposeMode::ReplyingTo { .. }) {
            self.reset();
        }
    }

    /// True if the slot edits `comment_id` or replies to it, or edits one of
    /// its replies.
    pub fn targets_comment(&self, comment_id: &str) -> bool {
        match &self.mode {
            ComposeMode::Idle => false,
            ComposeMode::Editing { comment_id: id } => id == comment_id,
            ComposeMode::EditingReply { parent_id, .. } | ComposeMode::ReplyingTo { parent_id } => {
                parent_id == comment_id
            }
        }
    }

    pub fn targets_reply(&self, reply_id: &str) -> bool {
        matches!(&self.mode, ComposeMode::EditingReply { reply_id: id, .. } if id == reply_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_then_cancel_resets_everything() {
        let mut compose = ComposeState::default();
        compose.enter_edit("c1", "hello", true);
        assert_eq!(
            compose.mode(),
            &ComposeMode::Editing {
                comment_id: "c1".into()
            }
        );
        assert_eq!(compose.text, "hello");
        assert!(compose.is_secret);

        compose.cancel_edit();
        assert_eq!(compose, ComposeState::default());
    }

    #[test]
    fn cancel_of_other_mode_is_ignored() {
        let mut compose = ComposeState::default();
        compose.enter_reply("c1");
        compose.text = "draft".into();

        compose.cancel_edit();
        compose.cancel_edit_reply();
        assert_eq!(compose.text, "draft");

        compose.clear_reply_target();
        assert_eq!(compose.mode(), &ComposeMode::Idle);
        assert!(compose.text.is_empty());
    }

    #[test]
    fn entering_a_mode_replaces_the_previous_one() {
        let mut compose = ComposeState::default();
        compose.enter_edit("c1", "one", false);
        compose.enter_edit_reply("c2", "r1", "two", true);
        assert_eq!(
            compose.mode(),
            &ComposeMode::EditingReply {
                parent_id: "c2".into(),
                reply_id: "r1".into()
            }
        );
        assert_eq!(compose.text, "two");
    }

    #[test]
    fn targets_follow_mode() {
        let mut compose = ComposeState::default();
        compose.enter_edit_reply("c1", "r1", "x", false);
        assert!(compose.targets_comment("c1"));
        assert!(compose.targets_reply("r1"));
        assert!(!compose.targets_reply("r2"));
        assert!(!compose.targets_comment("c2"));
    }
}
