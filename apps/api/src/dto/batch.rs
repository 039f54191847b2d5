use forgeline_core::{AppResult, ResourceId};
use forgeline_domain::{BatchDeleteResult, BatchOperationContext};
use serde::{Deserialize, Serialize};
use serde_json::json;
use ts_rs::TS;

/// Request body for `DELETE /api/{resource}/batch`.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/batch-delete-request.ts"
)]
pub struct BatchDeleteRequest {
    pub ids: Vec<String>,
    #[serde(default)]
    pub force: bool,
    #[serde(default)]
    pub source: Option<String>,
}

impl BatchDeleteRequest {
    /// Parses the transport ids, rejecting malformed values before any
    /// storage access.
    pub fn resource_ids(&self) -> AppResult<Vec<ResourceId>> {
        self.ids
            .iter()
            .map(|value| ResourceId::parse(value))
            .collect()
    }

    /// Builds the operation context threaded through the delete engine.
    #[must_use]
    pub fn context(&self) -> BatchOperationContext {
        let mut context =
            BatchOperationContext::new().with(BatchOperationContext::FORCE_KEY, json!(self.force));
        if let Some(source) = &self.source {
            context = context.with(BatchOperationContext::SOURCE_KEY, json!(source));
        }
        context
    }
}

/// One failed or skipped item in a batch-delete response.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/item-outcome-response.ts"
)]
pub struct ItemOutcomeResponse {
    pub id: String,
    pub reason: String,
}

/// Data payload of a batch-delete response.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/batch-delete-data.ts"
)]
pub struct BatchDeleteData {
    pub deleted_count: usize,
    pub deleted_ids: Vec<String>,
    pub failed_items: Vec<ItemOutcomeResponse>,
    pub skipped_items: Vec<ItemOutcomeResponse>,
}

impl From<BatchDeleteResult> for BatchDeleteData {
    fn from(result: BatchDeleteResult) -> Self {
        Self {
            deleted_count: result.deleted_count(),
            deleted_ids: result
                .deleted_ids()
                .iter()
                .map(ToString::to_string)
                .collect(),
            failed_items: result
                .failed_items()
                .iter()
                .map(|item| ItemOutcomeResponse {
                    id: item.id.to_string(),
                    reason: item.reason.clone(),
                })
                .collect(),
            skipped_items: result
                .skipped_items()
                .iter()
                .map(|item| ItemOutcomeResponse {
                    id: item.id.to_string(),
                    reason: item.reason.clone(),
                })
                .collect(),
        }
    }
}

/// Builds the human-readable summary line for a completed batch.
#[must_use]
pub fn summary_message(result: &BatchDeleteResult, resource_label: &str) -> String {
    let requested =
        result.deleted_count() + result.failed_items().len() + result.skipped_items().len();
    format!(
        "deleted {} of {requested} {resource_label}",
        result.deleted_count()
    )
}

#[cfg(test)]
mod tests {
    use forgeline_core::ResourceId;
    use forgeline_domain::BatchDeleteResult;

    use super::{BatchDeleteRequest, summary_message};

    #[test]
    fn malformed_id_is_rejected_at_the_boundary() {
        let request = BatchDeleteRequest {
            ids: vec!["not-a-uuid".to_owned()],
            force: false,
            source: None,
        };
        assert!(request.resource_ids().is_err());
    }

    #[test]
    fn context_carries_force_and_source() {
        let request = BatchDeleteRequest {
            ids: vec![],
            force: true,
            source: Some("admin-ui".to_owned()),
        };
        let context = request.context();
        assert!(context.force());
        assert_eq!(context.source(), Some("admin-ui"));
    }

    #[test]
    fn summary_counts_every_bucket() {
        let mut result = BatchDeleteResult::new();
        result.record_deleted(ResourceId::new());
        result.record_failed(ResourceId::new(), "NOT_FOUND");
        result.record_skipped(ResourceId::new(), "system-protected");
        assert_eq!(summary_message(&result, "departments"), "deleted 1 of 3 departments");
    }
}
