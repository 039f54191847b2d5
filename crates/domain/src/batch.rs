use std::collections::BTreeMap;

use forgeline_core::ResourceId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stable reason and error codes surfaced in batch-delete results.
pub mod reason {
    /// Requested id did not resolve to a live row.
    pub const NOT_FOUND: &str = "NOT_FOUND";
    /// Department still has child departments.
    pub const HAS_CHILDREN: &str = "HAS_CHILDREN";
    /// Department still has devices assigned to it.
    pub const HAS_DEVICES: &str = "HAS_DEVICES";
    /// Row carries the protected-system flag.
    pub const SYSTEM_PROTECTED: &str = "system-protected";
    /// Request omitted a required field (e.g. an empty id list).
    pub const MISSING_FIELD: &str = "MISSING_FIELD";
    /// An id in the request is not a well-formed identifier.
    pub const INVALID_ID: &str = "INVALID_ID";
    /// Request exceeds the configured maximum batch size.
    pub const BATCH_SIZE_EXCEEDED: &str = "BATCH_SIZE_EXCEEDED";
}

/// Decision produced by a validator or permission check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// The operation may proceed.
    Allowed,
    /// The operation is rejected for the given reason.
    Rejected {
        /// Stable reason code or human-readable denial message.
        reason: String,
    },
}

impl ValidationOutcome {
    /// Creates an allowing outcome.
    #[must_use]
    pub fn allow() -> Self {
        Self::Allowed
    }

    /// Creates a rejecting outcome with a mandatory reason.
    #[must_use]
    pub fn reject(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// Returns whether the outcome allows the operation.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Deletion strategy applied by a resource adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Remove the row from storage.
    Hard,
    /// Keep the row and set its `deleted_at` marker.
    Soft,
}

/// One id that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    /// Identifier of the affected row.
    pub id: ResourceId,
    /// Stable reason code or adapter error message.
    pub reason: String,
}

/// One id excluded from deletion by a business-rule validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemSkip {
    /// Identifier of the affected row.
    pub id: ResourceId,
    /// Reason supplied by the rejecting validator.
    pub reason: String,
}

/// Itemized outcome of one batch-delete invocation.
///
/// Created empty at the start of a call, mutated only by that call, and
/// returned by value once processing finishes. Every requested id lands in
/// exactly one of the three buckets; unresolved ids are failures with reason
/// [`reason::NOT_FOUND`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchDeleteResult {
    deleted_ids: Vec<ResourceId>,
    failed_items: Vec<ItemFailure>,
    skipped_items: Vec<ItemSkip>,
}

impl BatchDeleteResult {
    /// Creates an empty result accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one successfully deleted id, preserving processing order.
    pub fn record_deleted(&mut self, id: ResourceId) {
        self.deleted_ids.push(id);
    }

    /// Records one failed id with its reason.
    pub fn record_failed(&mut self, id: ResourceId, reason: impl Into<String>) {
        self.failed_items.push(ItemFailure {
            id,
            reason: reason.into(),
        });
    }

    /// Records one skipped id with the rejecting validator's reason.
    pub fn record_skipped(&mut self, id: ResourceId, reason: impl Into<String>) {
        self.skipped_items.push(ItemSkip {
            id,
            reason: reason.into(),
        });
    }

    /// Returns how many rows were deleted; equal to `deleted_ids().len()` by
    /// construction.
    #[must_use]
    pub fn deleted_count(&self) -> usize {
        self.deleted_ids.len()
    }

    /// Returns deleted ids in processing order.
    #[must_use]
    pub fn deleted_ids(&self) -> &[ResourceId] {
        &self.deleted_ids
    }

    /// Returns failed items in processing order.
    #[must_use]
    pub fn failed_items(&self) -> &[ItemFailure] {
        &self.failed_items
    }

    /// Returns skipped items in processing order.
    #[must_use]
    pub fn skipped_items(&self) -> &[ItemSkip] {
        &self.skipped_items
    }

    /// Returns whether every requested item was deleted.
    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.failed_items.is_empty() && self.skipped_items.is_empty()
    }
}

/// Read-only key/value bag threaded unchanged through permission checks,
/// validators and auditors of one batch invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOperationContext {
    values: BTreeMap<String, Value>,
}

impl BatchOperationContext {
    /// Key carrying the caller's force-delete escalation flag.
    pub const FORCE_KEY: &'static str = "force";
    /// Key carrying the originating surface label (e.g. `api`).
    pub const SOURCE_KEY: &'static str = "source";

    /// Creates an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the context with one entry added.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Looks up one raw context value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns whether the caller requested force-delete escalation.
    #[must_use]
    pub fn force(&self) -> bool {
        self.values
            .get(Self::FORCE_KEY)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Returns the originating surface label, if the caller supplied one.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.values.get(Self::SOURCE_KEY).and_then(Value::as_str)
    }

    /// Returns all entries for audit serialization.
    #[must_use]
    pub fn entries(&self) -> &BTreeMap<String, Value> {
        &self.values
    }
}
