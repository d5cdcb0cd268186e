//! Report documents.

use coak_core::namespace::ContentSource;
use coak_core::report::{ReportReason, ReportType};
use coak_core::types::{DocId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::gateway::Document;

/// A user report at `reports/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(skip)]
    pub id: DocId,
    /// Video or announcement owning the reported thread.
    pub document_id: DocId,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub target_id: DocId,
    /// Text of the reported item at the time of the report.
    pub content: String,
    /// Set only for reply reports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_comment_id: Option<DocId>,
    pub source: ContentSource,
    pub reason: ReportReason,
    pub reported_by: String,
    pub reported_by_email: String,
    pub timestamp: Timestamp,
    #[serde(default)]
    pub completed: bool,
}

impl Report {
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let mut report: Report = doc.decode()?;
        report.id = doc.id.clone();
        Ok(report)
    }
}

/// DTO for creating a report. Target and reason must already be validated.
#[derive(Debug, Clone)]
pub struct CreateReport {
    pub document_id: DocId,
    pub report_type: ReportType,
    pub target_id: DocId,
    pub content: String,
    pub parent_comment_id: Option<DocId>,
    pub source: ContentSource,
    pub reason: ReportReason,
    pub reported_by: String,
    pub reported_by_email: String,
}

/// Which reports the admin list shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl ReportFilter {
    pub fn accepts(self, report: &Report) -> bool {
        match self {
            Self::All => true,
            Self::Pending => !report.completed,
            Self::Completed => report.completed,
        }
    }
}
