use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use forgeline_core::{AppResult, ResourceId};
use forgeline_domain::{BatchOperationContext, SystemProtected, ValidationOutcome, reason};

use crate::batch_ports::ItemValidator;

/// Default validator that allows every item.
#[derive(Debug, Clone, Copy)]
pub struct PermitAllValidator<R> {
    _marker: PhantomData<fn(R)>,
}

impl<R> PermitAllValidator<R> {
    /// Creates the permissive default validator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<R> Default for PermitAllValidator<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Send + Sync> ItemValidator<R> for PermitAllValidator<R> {
    async fn validate_item(
        &self,
        _item: &R,
        _context: &BatchOperationContext,
        _deleted_in_batch: &[ResourceId],
    ) -> AppResult<ValidationOutcome> {
        Ok(ValidationOutcome::allow())
    }
}

/// Rejects items whose protected-system flag is set.
///
/// Never bypassed by force; seeded system rows stay deletable only through
/// migrations.
#[derive(Debug, Clone, Copy)]
pub struct SystemProtectedValidator<R> {
    _marker: PhantomData<fn(R)>,
}

impl<R> SystemProtectedValidator<R> {
    /// Creates the system-protection validator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<R> Default for SystemProtectedValidator<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: SystemProtected + Send + Sync> ItemValidator<R> for SystemProtectedValidator<R> {
    async fn validate_item(
        &self,
        item: &R,
        _context: &BatchOperationContext,
        _deleted_in_batch: &[ResourceId],
    ) -> AppResult<ValidationOutcome> {
        if item.is_system() {
            Ok(ValidationOutcome::reject(reason::SYSTEM_PROTECTED))
        } else {
            Ok(ValidationOutcome::allow())
        }
    }
}

/// Read-only existence check for one kind of dependent reference.
#[async_trait]
pub trait ReferencePredicate<R>: Send + Sync {
    /// Returns whether a dependent reference to the item exists.
    ///
    /// Dependents whose id is in `deleted_in_batch` do not count: they were
    /// deleted earlier in the same invocation and the staged delete is not
    /// yet visible to reads outside the batch transaction.
    async fn dependent_exists(
        &self,
        item: &R,
        deleted_in_batch: &[ResourceId],
    ) -> AppResult<bool>;

    /// Stable rejection reason reported when the reference exists.
    fn reason(&self) -> &str;

    /// Whether a `force=true` context bypasses this predicate.
    fn bypassed_by_force(&self) -> bool {
        false
    }
}

/// Rejects items that still have dependent references.
///
/// Predicates run in registration order; the first one reporting a dependent
/// wins. Predicates that opt into force bypass are skipped when the caller
/// escalated with `force=true`.
pub struct ReferenceCheckValidator<R> {
    predicates: Vec<Arc<dyn ReferencePredicate<R>>>,
}

impl<R> ReferenceCheckValidator<R> {
    /// Creates a validator over the given existence checks.
    #[must_use]
    pub fn new(predicates: Vec<Arc<dyn ReferencePredicate<R>>>) -> Self {
        Self { predicates }
    }
}

#[async_trait]
impl<R: Send + Sync> ItemValidator<R> for ReferenceCheckValidator<R> {
    async fn validate_item(
        &self,
        item: &R,
        context: &BatchOperationContext,
        deleted_in_batch: &[ResourceId],
    ) -> AppResult<ValidationOutcome> {
        for predicate in &self.predicates {
            if context.force() && predicate.bypassed_by_force() {
                continue;
            }

            if predicate.dependent_exists(item, deleted_in_batch).await? {
                return Ok(ValidationOutcome::reject(predicate.reason().to_owned()));
            }
        }

        Ok(ValidationOutcome::allow())
    }
}

/// AND-combines validators; the first rejection wins (short-circuit).
pub struct CompositeValidator<R> {
    validators: Vec<Arc<dyn ItemValidator<R>>>,
}

impl<R> CompositeValidator<R> {
    /// Creates a composite over the given validators.
    #[must_use]
    pub fn new(validators: Vec<Arc<dyn ItemValidator<R>>>) -> Self {
        Self { validators }
    }
}

#[async_trait]
impl<R: Send + Sync> ItemValidator<R> for CompositeValidator<R> {
    async fn validate_item(
        &self,
        item: &R,
        context: &BatchOperationContext,
        deleted_in_batch: &[ResourceId],
    ) -> AppResult<ValidationOutcome> {
        for validator in &self.validators {
            let outcome = validator
                .validate_item(item, context, deleted_in_batch)
                .await?;
            if !outcome.is_allowed() {
                return Ok(outcome);
            }
        }

        Ok(ValidationOutcome::allow())
    }
}
