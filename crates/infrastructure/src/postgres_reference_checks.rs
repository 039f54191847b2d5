use async_trait::async_trait;
use sqlx::PgPool;

use forgeline_application::ReferencePredicate;
use forgeline_core::{AppError, AppResult, ResourceId};
use forgeline_domain::{DeletableResource, Department, reason};

/// Reports whether a department still has live child departments.
///
/// Children deleted earlier in the same batch are excluded, since those
/// deletes are staged in the batch transaction and not yet visible to this
/// pool-side read. Bypassed by `force=true`: the department adapter cascades
/// over the subtree in that case.
#[derive(Clone)]
pub struct PgDepartmentHasChildren {
    pool: PgPool,
}

impl PgDepartmentHasChildren {
    /// Creates a predicate with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferencePredicate<Department> for PgDepartmentHasChildren {
    async fn dependent_exists(
        &self,
        item: &Department,
        deleted_in_batch: &[ResourceId],
    ) -> AppResult<bool> {
        let excluded: Vec<uuid::Uuid> = deleted_in_batch.iter().map(ResourceId::as_uuid).collect();
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM departments
                WHERE parent_id = $1 AND deleted_at IS NULL AND NOT (id = ANY($2))
            )
            "#,
        )
        .bind(item.resource_id().as_uuid())
        .bind(&excluded)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to check child departments: {error}"))
        })
    }

    fn reason(&self) -> &str {
        reason::HAS_CHILDREN
    }

    fn bypassed_by_force(&self) -> bool {
        true
    }
}

/// Reports whether devices are still assigned to a department.
///
/// Never bypassed: equipment must be reassigned before its department goes
/// away, forced or not. A department batch never deletes devices, so the
/// same-batch exclusion list does not apply here.
#[derive(Clone)]
pub struct PgDepartmentHasDevices {
    pool: PgPool,
}

impl PgDepartmentHasDevices {
    /// Creates a predicate with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReferencePredicate<Department> for PgDepartmentHasDevices {
    async fn dependent_exists(
        &self,
        item: &Department,
        _deleted_in_batch: &[ResourceId],
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM devices
                WHERE department_id = $1 AND deleted_at IS NULL
            )
            "#,
        )
        .bind(item.resource_id().as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to check assigned devices: {error}"))
        })
    }

    fn reason(&self) -> &str {
        reason::HAS_DEVICES
    }
}
