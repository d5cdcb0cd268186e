//! Report submission and admin resolution.
//!
//! Resolution is two independent steps: close the report, then hide the
//! reported content. Both are always attempted. When exactly one succeeds
//! the caller gets [`ThreadError::PartialModerationFailure`]; nothing is
//! rolled back.

use std::sync::Arc;

use coak_core::error::CoreError;
use coak_core::namespace::ContentSource;
use coak_core::report::{require_reason, validate_target, ReportReason, ReportType};
use coak_core::types::DocId;
use coak_core::visibility::Viewer;
use coak_db::models::report::{CreateReport, Report, ReportFilter};
use coak_db::repositories::{CommentRepo, ReportRepo};
use coak_db::DocumentStore;
use serde::Deserialize;

use crate::config::SessionConfig;
use crate::error::{ThreadError, ThreadResult};

/// What the report form collects before submission.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDraft {
    pub source: ContentSource,
    /// Video or announcement id owning the thread.
    pub document_id: DocId,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub target_id: DocId,
    #[serde(default)]
    pub parent_comment_id: Option<DocId>,
    pub content: String,
    /// Unset until the user picks one.
    #[serde(default)]
    pub reason: Option<ReportReason>,
}

#[derive(Clone)]
pub struct ModerationService {
    reports: ReportRepo,
    video: CommentRepo,
    notice: CommentRepo,
}

impl ModerationService {
    pub fn new(reports: ReportRepo, video: CommentRepo, notice: CommentRepo) -> Self {
        Self {
            reports,
            video,
            notice,
        }
    }

    /// Wire the service to `store` using the configured collections.
    pub fn from_config(config: &SessionConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self::new(
            config.report_repo(store.clone()),
            config.comment_repo(store.clone(), ContentSource::Video),
            config.comment_repo(store, ContentSource::Notice),
        )
    }

    fn comments(&self, source: ContentSource) -> &CommentRepo {
        match source {
            ContentSource::Video => &self.video,
            ContentSource::Notice => &self.notice,
        }
    }

    /// Validate the draft locally and append it as a pending report.
    pub async fn submit_report(&self, draft: &ReportDraft, reporter: &Viewer) -> ThreadResult<Report> {
        let reason = require_reason(draft.reason)?;
        validate_target(
            draft.report_type,
            &draft.target_id,
            draft.parent_comment_id.as_deref(),
        )?;

        let input = CreateReport {
            document_id: draft.document_id.clone(),
            report_type: draft.report_type,
            target_id: draft.target_id.clone(),
            content: draft.content.clone(),
            parent_comment_id: draft.parent_comment_id.clone(),
            source: draft.source,
            reason,
            reported_by: reporter.id.clone(),
            reported_by_email: reporter.email.clone(),
        };
        Ok(self.reports.create(&input).await?)
    }

    /// Reports for the admin list, newest first.
    pub async fn list_reports(&self, admin: &Viewer, filter: ReportFilter) -> ThreadResult<Vec<Report>> {
        require_admin(admin)?;
        let reports = self.reports.list(filter).await?;
        tracing::debug!(count = reports.len(), ?filter, "Listed reports");
        Ok(reports)
    }

    /// Resolve the report with id `report_id`.
    pub async fn resolve_report(&self, admin: &Viewer, report_id: &str) -> ThreadResult<()> {
        require_admin(admin)?;
        let report = self
            .reports
            .fetch(report_id)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                entity: "report",
                id: report_id.to_string(),
            })?;
        self.mark_report_as_completed(admin, &report).await
    }

    /// Close `report` and hide the content it points at.
    pub async fn mark_report_as_completed(&self, admin: &Viewer, report: &Report) -> ThreadResult<()> {
        require_admin(admin)?;

        let completed = self.reports.mark_completed(&report.id).await;
        let hidden = self.hide_target(report).await;

        match (completed, hidden) {
            (Ok(()), Ok(())) => {
                tracing::info!(
                    report_id = %report.id,
                    source = report.source.as_str(),
                    report_type = report.report_type.as_str(),
                    target_id = %report.target_id,
                    "Report resolved and content hidden"
                );
                Ok(())
            }
            (Err(e), Err(hide_err)) => {
                tracing::warn!(
                    report_id = %report.id,
                    error = %e,
                    hide_error = %hide_err,
                    "Report resolution failed"
                );
                Err(e.into())
            }
            (completed, hidden) => {
                let report_completed = completed.is_ok();
                let content_hidden = hidden.is_ok();
                let message = match (completed, hidden) {
                    (Err(e), _) => e.to_string(),
                    (_, Err(e)) => e.to_string(),
                    _ => String::new(),
                };
                tracing::error!(
                    report_id = %report.id,
                    report_completed,
                    content_hidden,
                    error = %message,
                    "Report partially resolved"
                );
                Err(ThreadError::PartialModerationFailure {
                    report_id: report.id.clone(),
                    report_completed,
                    content_hidden,
                    message,
                })
            }
        }
    }

    /// Dispatch on `(source, type)` to the matching hide call.
    async fn hide_target(&self, report: &Report) -> ThreadResult<()> {
        let repo = self.comments(report.source);
        match report.report_type {
            ReportType::Comment => {
                repo.set_hidden(&report.document_id, &report.target_id, true)
                    .await?
            }
            ReportType::Reply => {
                let parent_id = report.parent_comment_id.as_deref().ok_or_else(|| {
                    CoreError::Validation(format!(
                        "Reply report {} has no parent comment id",
                        report.id
                    ))
                })?;
                repo.set_reply_hidden(&report.document_id, parent_id, &report.target_id, true)
                    .await?
            }
        }
        Ok(())
    }
}

fn require_admin(viewer: &Viewer) -> Result<(), CoreError> {
    if viewer.is_admin {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Only administrators can manage reports".to_string(),
        ))
    }
}
