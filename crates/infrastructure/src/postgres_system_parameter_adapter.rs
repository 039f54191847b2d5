use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use forgeline_application::{DeleteTransaction, ResourceAdapter};
use forgeline_core::{AppError, AppResult, ResourceId, TenantId};
use forgeline_domain::{DeletableResource, DeletePolicy, SystemParameter};

/// PostgreSQL-backed resource adapter for system parameters.
#[derive(Clone)]
pub struct PostgresSystemParameterAdapter {
    pool: PgPool,
}

impl PostgresSystemParameterAdapter {
    /// Creates an adapter with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct SystemParameterRow {
    id: uuid::Uuid,
    tenant_id: uuid::Uuid,
    param_key: String,
    param_value: String,
    is_system: bool,
}

impl SystemParameterRow {
    fn into_parameter(self) -> AppResult<SystemParameter> {
        SystemParameter::new(
            ResourceId::from_uuid(self.id),
            TenantId::from_uuid(self.tenant_id),
            self.param_key,
            self.param_value,
            self.is_system,
        )
    }
}

#[async_trait]
impl ResourceAdapter<SystemParameter> for PostgresSystemParameterAdapter {
    async fn resolve_many(
        &self,
        tenant_id: TenantId,
        ids: &[ResourceId],
    ) -> AppResult<Vec<(ResourceId, Option<SystemParameter>)>> {
        let id_values: Vec<uuid::Uuid> = ids.iter().map(ResourceId::as_uuid).collect();
        let rows = sqlx::query_as::<_, SystemParameterRow>(
            r#"
            SELECT id, tenant_id, param_key, param_value, is_system
            FROM system_parameters
            WHERE tenant_id = $1 AND id = ANY($2)
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(&id_values)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to resolve system parameters: {error}"))
        })?;

        let mut resolved: HashMap<ResourceId, SystemParameter> =
            HashMap::with_capacity(rows.len());
        for row in rows {
            let parameter = row.into_parameter()?;
            resolved.insert(parameter.resource_id(), parameter);
        }

        Ok(ids.iter().map(|id| (*id, resolved.remove(id))).collect())
    }

    async fn begin_delete(
        &self,
        tenant_id: TenantId,
    ) -> AppResult<Box<dyn DeleteTransaction<SystemParameter>>> {
        let transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to open batch transaction: {error}"))
        })?;

        Ok(Box::new(PgSystemParameterTransaction {
            tenant_id,
            transaction,
        }))
    }
}

struct PgSystemParameterTransaction {
    tenant_id: TenantId,
    transaction: Transaction<'static, Postgres>,
}

#[async_trait]
impl DeleteTransaction<SystemParameter> for PgSystemParameterTransaction {
    async fn delete(
        &mut self,
        item: &SystemParameter,
        _policy: DeletePolicy,
        _force: bool,
    ) -> AppResult<()> {
        // Parameters carry no history worth keeping; the delete is always hard.
        let id = item.resource_id();
        let outcome = sqlx::query(
            r#"
            DELETE FROM system_parameters
            WHERE id = $1 AND tenant_id = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(self.tenant_id.as_uuid())
        .execute(&mut *self.transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to delete system parameter '{id}': {error}"))
        })?;

        if outcome.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "system parameter '{id}' no longer exists"
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
