use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use forgeline_application::{DeleteTransaction, ResourceAdapter};
use forgeline_core::{AppError, AppResult, ResourceId, TenantId};
use forgeline_domain::{DeletableResource, DeletePolicy, Department};

/// PostgreSQL-backed resource adapter for departments.
///
/// Departments form a tree via `parent_id`; a forced delete removes the whole
/// subtree inside the batch transaction.
#[derive(Clone)]
pub struct PostgresDepartmentAdapter {
    pool: PgPool,
}

impl PostgresDepartmentAdapter {
    /// Creates an adapter with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct DepartmentRow {
    id: uuid::Uuid,
    tenant_id: uuid::Uuid,
    name: String,
    parent_id: Option<uuid::Uuid>,
    is_system: bool,
}

impl DepartmentRow {
    fn into_department(self) -> AppResult<Department> {
        Department::new(
            ResourceId::from_uuid(self.id),
            TenantId::from_uuid(self.tenant_id),
            self.name,
            self.parent_id.map(ResourceId::from_uuid),
            self.is_system,
        )
    }
}

#[async_trait]
impl ResourceAdapter<Department> for PostgresDepartmentAdapter {
    async fn resolve_many(
        &self,
        tenant_id: TenantId,
        ids: &[ResourceId],
    ) -> AppResult<Vec<(ResourceId, Option<Department>)>> {
        let id_values: Vec<uuid::Uuid> = ids.iter().map(ResourceId::as_uuid).collect();
        let rows = sqlx::query_as::<_, DepartmentRow>(
            r#"
            SELECT id, tenant_id, name, parent_id, is_system
            FROM departments
            WHERE tenant_id = $1 AND id = ANY($2) AND deleted_at IS NULL
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(&id_values)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve departments: {error}")))?;

        let mut resolved: HashMap<ResourceId, Department> = HashMap::with_capacity(rows.len());
        for row in rows {
            let department = row.into_department()?;
            resolved.insert(department.resource_id(), department);
        }

        Ok(ids.iter().map(|id| (*id, resolved.remove(id))).collect())
    }

    async fn begin_delete(
        &self,
        tenant_id: TenantId,
    ) -> AppResult<Box<dyn DeleteTransaction<Department>>> {
        let transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to open batch transaction: {error}"))
        })?;

        Ok(Box::new(PgDepartmentTransaction {
            tenant_id,
            transaction,
        }))
    }
}

struct PgDepartmentTransaction {
    tenant_id: TenantId,
    transaction: Transaction<'static, Postgres>,
}

#[async_trait]
impl DeleteTransaction<Department> for PgDepartmentTransaction {
    async fn delete(
        &mut self,
        item: &Department,
        policy: DeletePolicy,
        force: bool,
    ) -> AppResult<()> {
        let id = item.resource_id();
        let query = match (policy, force) {
            (DeletePolicy::Hard, false) => {
                r#"
                DELETE FROM departments
                WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL
                "#
            }
            (DeletePolicy::Hard, true) => {
                r#"
                WITH RECURSIVE subtree AS (
                    SELECT id FROM departments
                    WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL
                    UNION ALL
                    SELECT child.id
                    FROM departments child
                    JOIN subtree ON child.parent_id = subtree.id
                    WHERE child.deleted_at IS NULL
                )
                DELETE FROM departments
                WHERE id IN (SELECT id FROM subtree)
                "#
            }
            (DeletePolicy::Soft, false) => {
                r#"
                UPDATE departments SET deleted_at = NOW()
                WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL
                "#
            }
            (DeletePolicy::Soft, true) => {
                r#"
                WITH RECURSIVE subtree AS (
                    SELECT id FROM departments
                    WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL
                    UNION ALL
                    SELECT child.id
                    FROM departments child
                    JOIN subtree ON child.parent_id = subtree.id
                    WHERE child.deleted_at IS NULL
                )
                UPDATE departments SET deleted_at = NOW()
                WHERE id IN (SELECT id FROM subtree)
                "#
            }
        };

        let outcome = sqlx::query(query)
            .bind(id.as_uuid())
            .bind(self.tenant_id.as_uuid())
            .execute(&mut *self.transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete department '{id}': {error}"))
            })?;

        // A concurrent delete can leave zero matched rows; report it as a
        // per-item miss instead of crashing the batch.
        if outcome.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "department '{id}' no longer exists"
            )));
        }

        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit batch transaction: {error}"))
        })
    }
}
