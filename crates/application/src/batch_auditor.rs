use std::sync::Arc;

use async_trait::async_trait;
use forgeline_core::{AppResult, ResourceId, UserIdentity};
use forgeline_domain::{AuditAction, BatchDeleteResult, BatchOperationContext};
use serde_json::json;

use crate::audit_ports::{AuditEvent, AuditRepository};
use crate::batch_ports::{BatchAuditor, ItemAuditOutcome};

/// Resource-id placeholder used for whole-invocation audit events.
const BATCH_MARKER: &str = "batch";

/// Batch auditor that appends structured events to an audit repository.
#[derive(Clone)]
pub struct RepositoryBatchAuditor {
    repository: Arc<dyn AuditRepository>,
}

impl RepositoryBatchAuditor {
    /// Creates an auditor over the given repository.
    #[must_use]
    pub fn new(repository: Arc<dyn AuditRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl BatchAuditor for RepositoryBatchAuditor {
    async fn record_start(
        &self,
        principal: &UserIdentity,
        resource_type: &str,
        ids: &[ResourceId],
        context: &BatchOperationContext,
    ) -> AppResult<()> {
        let detail = json!({
            "principal": principal.display_name(),
            "ids": ids.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "context": context.entries(),
        });

        self.repository
            .append_event(AuditEvent {
                tenant_id: principal.tenant_id(),
                subject: principal.subject().to_owned(),
                action: AuditAction::BatchDeleteStarted,
                resource_type: resource_type.to_owned(),
                resource_id: BATCH_MARKER.to_owned(),
                detail: Some(detail.to_string()),
            })
            .await
    }

    async fn record_item_outcome(
        &self,
        principal: &UserIdentity,
        resource_type: &str,
        id: ResourceId,
        outcome: &ItemAuditOutcome,
    ) -> AppResult<()> {
        let detail = match outcome {
            ItemAuditOutcome::Deleted => json!({ "outcome": "deleted" }),
            ItemAuditOutcome::Skipped { reason } => {
                json!({ "outcome": "skipped", "reason": reason })
            }
            ItemAuditOutcome::Failed { reason } => {
                json!({ "outcome": "failed", "reason": reason })
            }
        };

        self.repository
            .append_event(AuditEvent {
                tenant_id: principal.tenant_id(),
                subject: principal.subject().to_owned(),
                action: AuditAction::BatchDeleteItem,
                resource_type: resource_type.to_owned(),
                resource_id: id.to_string(),
                detail: Some(detail.to_string()),
            })
            .await
    }

    async fn record_complete(
        &self,
        principal: &UserIdentity,
        resource_type: &str,
        result: &BatchDeleteResult,
    ) -> AppResult<()> {
        let detail = json!({
            "deleted_count": result.deleted_count(),
            "failed_count": result.failed_items().len(),
            "skipped_count": result.skipped_items().len(),
        });

        self.repository
            .append_event(AuditEvent {
                tenant_id: principal.tenant_id(),
                subject: principal.subject().to_owned(),
                action: AuditAction::BatchDeleteCompleted,
                resource_type: resource_type.to_owned(),
                resource_id: BATCH_MARKER.to_owned(),
                detail: Some(detail.to_string()),
            })
            .await
    }
}
