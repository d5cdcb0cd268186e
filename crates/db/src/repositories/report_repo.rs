//! Repository for the `reports` collection.

use std::sync::Arc;

use chrono::Utc;
use coak_core::namespace::SortDirection;
use serde_json::Value;

use crate::error::StoreError;
use crate::gateway::{to_fields, DocumentStore, Fields, Query};
use crate::models::report::{CreateReport, Report, ReportFilter};

/// Default collection holding reports.
pub const DEFAULT_REPORTS_COLLECTION: &str = "reports";

/// Field the admin list is ordered by.
const TIMESTAMP_FIELD: &str = "timestamp";

/// Provides create, list and resolve operations for reports.
#[derive(Clone)]
pub struct ReportRepo {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl ReportRepo {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    fn path(&self, report_id: &str) -> String {
        format!("{}/{report_id}", self.collection)
    }

    /// Store a new report with `completed = false`.
    pub async fn create(&self, input: &CreateReport) -> Result<Report, StoreError> {
        let id = self.store.new_id(&self.collection);

        let report = Report {
            id: id.clone(),
            document_id: input.document_id.clone(),
            report_type: input.report_type,
            target_id: input.target_id.clone(),
            content: input.content.clone(),
            parent_comment_id: input.parent_comment_id.clone(),
            source: input.source,
            reason: input.reason,
            reported_by: input.reported_by.clone(),
            reported_by_email: input.reported_by_email.clone(),
            timestamp: Utc::now(),
            completed: false,
        };

        self.store
            .set(&self.path(&id), to_fields(&report)?, false)
            .await?;

        tracing::info!(
            report_id = %id,
            source = report.source.as_str(),
            report_type = report.report_type.as_str(),
            target_id = %report.target_id,
            "Report submitted"
        );
        Ok(report)
    }

    /// Find a report by id.
    pub async fn fetch(&self, report_id: &str) -> Result<Option<Report>, StoreError> {
        self.store
            .get(&self.path(report_id))
            .await?
            .as_ref()
            .map(Report::from_document)
            .transpose()
    }

    /// List reports newest first, keeping those accepted by `filter`.
    pub async fn list(&self, filter: ReportFilter) -> Result<Vec<Report>, StoreError> {
        let query = Query::ordered_by(TIMESTAMP_FIELD, SortDirection::Descending);
        let docs = self.store.query(&self.collection, &query).await?;

        let mut reports = Vec::with_capacity(docs.len());
        for doc in &docs {
            let report = Report::from_document(doc)?;
            if filter.accepts(&report) {
                reports.push(report);
            }
        }
        Ok(reports)
    }

    /// Flip `completed` to true. Fails with `NotFound` for an unknown id.
    pub async fn mark_completed(&self, report_id: &str) -> Result<(), StoreError> {
        let mut fields = Fields::new();
        fields.insert("completed".to_string(), Value::Bool(true));
        self.store.update(&self.path(report_id), fields).await?;
        tracing::info!(report_id, "Report marked completed");
        Ok(())
    }
}
