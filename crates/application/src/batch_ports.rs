use async_trait::async_trait;
use forgeline_core::{AppResult, ResourceId, TenantId, UserIdentity};
use forgeline_domain::{
    BatchDeleteResult, BatchOperationContext, DeletePolicy, ValidationOutcome,
};

/// Per-resource lookup and delete primitives supplied by the surrounding
/// application.
#[async_trait]
pub trait ResourceAdapter<R>: Send + Sync {
    /// Resolves all requested ids in one query.
    ///
    /// Ids without a live row resolve to `None`; the adapter never errors for
    /// individual misses, only for whole-query failures.
    async fn resolve_many(
        &self,
        tenant_id: TenantId,
        ids: &[ResourceId],
    ) -> AppResult<Vec<(ResourceId, Option<R>)>>;

    /// Opens the single transaction that scopes one whole batch.
    async fn begin_delete(&self, tenant_id: TenantId) -> AppResult<Box<dyn DeleteTransaction<R>>>;
}

/// Handle over one in-flight batch transaction.
///
/// Dropping the handle without committing rolls the transaction back.
#[async_trait]
pub trait DeleteTransaction<R>: Send {
    /// Deletes one item under the given policy.
    ///
    /// `force` enables cascade semantics where the adapter supports them
    /// (e.g. deleting a department subtree).
    async fn delete(&mut self, item: &R, policy: DeletePolicy, force: bool) -> AppResult<()>;

    /// Commits every delete staged so far.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}

/// Business-rule predicate deciding whether one resolved item may be deleted.
#[async_trait]
pub trait ItemValidator<R>: Send + Sync {
    /// Validates one item; must be side-effect free with respect to the item.
    ///
    /// `deleted_in_batch` lists ids already deleted earlier in the same
    /// invocation. Those deletes are still staged in the batch transaction,
    /// invisible to reads outside it, so validators must treat matching
    /// dependents as gone.
    async fn validate_item(
        &self,
        item: &R,
        context: &BatchOperationContext,
        deleted_in_batch: &[ResourceId],
    ) -> AppResult<ValidationOutcome>;
}

/// Authorization predicate over the whole batch, independent of item-level
/// business rules.
#[async_trait]
pub trait PermissionChecker: Send + Sync {
    /// Checks whether the principal may batch-delete this resource type.
    ///
    /// Called exactly once per invocation, before any item is touched. Pure
    /// check; implementations may consult policy stores but must not mutate
    /// state.
    async fn check(
        &self,
        principal: &UserIdentity,
        resource_type: &str,
        context: &BatchOperationContext,
    ) -> AppResult<ValidationOutcome>;
}

/// Per-item outcome reported to the auditor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemAuditOutcome {
    /// The row was deleted.
    Deleted,
    /// A validator excluded the row.
    Skipped {
        /// Reason supplied by the rejecting validator.
        reason: String,
    },
    /// The delete failed or the id did not resolve.
    Failed {
        /// Stable reason code or adapter error message.
        reason: String,
    },
}

/// Append-only recorder for batch-delete events.
///
/// All three methods are fire-and-forget: the orchestrator calls them in
/// start → item → complete order and swallows any error they return.
#[async_trait]
pub trait BatchAuditor: Send + Sync {
    /// Records the start of one invocation with the requested ids.
    async fn record_start(
        &self,
        principal: &UserIdentity,
        resource_type: &str,
        ids: &[ResourceId],
        context: &BatchOperationContext,
    ) -> AppResult<()>;

    /// Records the outcome of one processed item.
    async fn record_item_outcome(
        &self,
        principal: &UserIdentity,
        resource_type: &str,
        id: ResourceId,
        outcome: &ItemAuditOutcome,
    ) -> AppResult<()>;

    /// Records the invocation summary.
    async fn record_complete(
        &self,
        principal: &UserIdentity,
        resource_type: &str,
        result: &BatchDeleteResult,
    ) -> AppResult<()>;
}
