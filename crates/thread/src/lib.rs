//! `coak-thread`: comment thread sessions and report moderation on top of
//! the `coak-db` repositories.

pub mod compose;
pub mod config;
pub mod error;
pub mod moderation;
pub mod session;

pub use compose::{ComposeMode, ComposeState};
pub use config::SessionConfig;
pub use error::{ErrorKind, Notice, ThreadError, ThreadResult};
pub use moderation::{ModerationService, ReportDraft};
pub use session::{LoadState, RenderedComment, RenderedReply, ThreadSession};
