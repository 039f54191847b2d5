use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use forgeline_core::{AppError, AppResult, ResourceId, UserIdentity};
use forgeline_domain::{
    BatchDeleteResult, BatchOperationContext, DeletableResource, DeletePolicy, ValidationOutcome,
    reason,
};
use tracing::warn;

use crate::authorization_service::PermitAllChecker;
use crate::batch_ports::{
    BatchAuditor, ItemAuditOutcome, ItemValidator, PermissionChecker, ResourceAdapter,
};
use crate::validators::PermitAllValidator;

#[cfg(test)]
mod tests;

/// Default upper bound on the number of ids in one invocation.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 100;

/// Orchestrator for batch deletion of one resource type.
///
/// Composes a resource adapter, exactly one item validator and one permission
/// checker (permissive defaults), and an optional auditor. One invocation
/// processes items strictly sequentially, in input order, inside a single
/// adapter transaction; partial failures are reported in the returned
/// [`BatchDeleteResult`] rather than raised.
pub struct BatchDeleteService<R: DeletableResource> {
    adapter: Arc<dyn ResourceAdapter<R>>,
    validator: Arc<dyn ItemValidator<R>>,
    permission_checker: Arc<dyn PermissionChecker>,
    auditor: Option<Arc<dyn BatchAuditor>>,
    delete_policy: DeletePolicy,
    max_batch_size: usize,
}

impl<R: DeletableResource> BatchDeleteService<R> {
    /// Creates a service with permissive defaults over the given adapter.
    #[must_use]
    pub fn new(adapter: Arc<dyn ResourceAdapter<R>>) -> Self {
        Self {
            adapter,
            validator: Arc::new(PermitAllValidator::new()),
            permission_checker: Arc::new(PermitAllChecker),
            auditor: None,
            delete_policy: DeletePolicy::Hard,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }

    /// Replaces the item validator.
    #[must_use]
    pub fn with_validator(mut self, validator: Arc<dyn ItemValidator<R>>) -> Self {
        self.validator = validator;
        self
    }

    /// Replaces the permission checker.
    #[must_use]
    pub fn with_permission_checker(mut self, checker: Arc<dyn PermissionChecker>) -> Self {
        self.permission_checker = checker;
        self
    }

    /// Attaches an auditor.
    #[must_use]
    pub fn with_auditor(mut self, auditor: Arc<dyn BatchAuditor>) -> Self {
        self.auditor = Some(auditor);
        self
    }

    /// Overrides the delete strategy passed to the adapter.
    #[must_use]
    pub fn with_delete_policy(mut self, policy: DeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    /// Overrides the maximum accepted batch size.
    #[must_use]
    pub fn with_max_batch_size(mut self, max_batch_size: usize) -> Self {
        self.max_batch_size = max_batch_size;
        self
    }

    /// Deletes the requested ids for the principal's tenant.
    ///
    /// Structural and authorization failures abort with an error before any
    /// storage access; everything after that is reported per item in the
    /// result. Item processing order equals input id order; tree-shaped
    /// resources rely on this, so ids are never re-ordered here.
    pub async fn batch_delete(
        &self,
        principal: &UserIdentity,
        ids: &[ResourceId],
        context: &BatchOperationContext,
    ) -> AppResult<BatchDeleteResult> {
        let ids = self.validated_ids(ids)?;

        match self
            .permission_checker
            .check(principal, R::RESOURCE_TYPE, context)
            .await?
        {
            ValidationOutcome::Allowed => {}
            ValidationOutcome::Rejected { reason } => {
                return Err(AppError::Forbidden(reason));
            }
        }

        self.audit_start(principal, &ids, context).await;

        let resolved = self
            .adapter
            .resolve_many(principal.tenant_id(), &ids)
            .await?;
        let mut items: HashMap<ResourceId, R> = HashMap::with_capacity(resolved.len());
        for (id, item) in resolved {
            if let Some(item) = item {
                items.insert(id, item);
            }
        }

        let mut result = BatchDeleteResult::new();
        let mut transaction = self.adapter.begin_delete(principal.tenant_id()).await?;

        for id in &ids {
            let Some(item) = items.get(id) else {
                result.record_failed(*id, reason::NOT_FOUND);
                self.audit_item(
                    principal,
                    *id,
                    &ItemAuditOutcome::Failed {
                        reason: reason::NOT_FOUND.to_owned(),
                    },
                )
                .await;
                continue;
            };

            // Validation sees what this batch has already deleted, so a
            // leaves-first id order clears a tree without force.
            let validation = self
                .validator
                .validate_item(item, context, result.deleted_ids())
                .await;
            let outcome = match validation {
                Ok(ValidationOutcome::Allowed) => {
                    match transaction
                        .delete(item, self.delete_policy, context.force())
                        .await
                    {
                        Ok(()) => {
                            result.record_deleted(*id);
                            ItemAuditOutcome::Deleted
                        }
                        Err(error) => {
                            let message = error.to_string();
                            result.record_failed(*id, message.clone());
                            ItemAuditOutcome::Failed { reason: message }
                        }
                    }
                }
                Ok(ValidationOutcome::Rejected { reason }) => {
                    result.record_skipped(*id, reason.clone());
                    ItemAuditOutcome::Skipped { reason }
                }
                Err(error) => {
                    let message = error.to_string();
                    result.record_failed(*id, message.clone());
                    ItemAuditOutcome::Failed { reason: message }
                }
            };

            self.audit_item(principal, *id, &outcome).await;
        }

        transaction.commit().await?;

        self.audit_complete(principal, &result).await;

        Ok(result)
    }

    /// Rejects structurally invalid requests and collapses duplicate ids,
    /// keeping the first occurrence's position.
    fn validated_ids(&self, ids: &[ResourceId]) -> AppResult<Vec<ResourceId>> {
        if ids.is_empty() {
            return Err(AppError::Validation(format!(
                "{}: ids must not be empty",
                reason::MISSING_FIELD
            )));
        }

        if ids.len() > self.max_batch_size {
            return Err(AppError::Validation(format!(
                "{}: {} ids exceed the maximum batch size of {}",
                reason::BATCH_SIZE_EXCEEDED,
                ids.len(),
                self.max_batch_size
            )));
        }

        let mut seen = HashSet::with_capacity(ids.len());
        Ok(ids.iter().copied().filter(|id| seen.insert(*id)).collect())
    }

    async fn audit_start(
        &self,
        principal: &UserIdentity,
        ids: &[ResourceId],
        context: &BatchOperationContext,
    ) {
        let Some(auditor) = &self.auditor else {
            return;
        };

        if let Err(error) = auditor
            .record_start(principal, R::RESOURCE_TYPE, ids, context)
            .await
        {
            warn!(resource_type = R::RESOURCE_TYPE, error = %error, "audit start failed");
        }
    }

    async fn audit_item(&self, principal: &UserIdentity, id: ResourceId, outcome: &ItemAuditOutcome) {
        let Some(auditor) = &self.auditor else {
            return;
        };

        if let Err(error) = auditor
            .record_item_outcome(principal, R::RESOURCE_TYPE, id, outcome)
            .await
        {
            warn!(resource_type = R::RESOURCE_TYPE, %id, error = %error, "audit item failed");
        }
    }

    async fn audit_complete(&self, principal: &UserIdentity, result: &BatchDeleteResult) {
        let Some(auditor) = &self.auditor else {
            return;
        };

        if let Err(error) = auditor
            .record_complete(principal, R::RESOURCE_TYPE, result)
            .await
        {
            warn!(resource_type = R::RESOURCE_TYPE, error = %error, "audit complete failed");
        }
    }
}
