//! Document models and DTOs.

pub mod comment;
pub mod report;

pub use comment::{Comment, EditComment, NewComment, Reply, SetHidden};
pub use report::{CreateReport, Report, ReportFilter};
