use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use forgeline_application::{DeleteTransaction, ResourceAdapter};
use forgeline_core::{AppError, AppResult, ResourceId, TenantId};
use forgeline_domain::{DeletableResource, DeletePolicy, Device};

/// PostgreSQL-backed resource adapter for devices.
///
/// Devices keep their telemetry history, so the dashboard wires this adapter
/// with the soft-delete policy; hard delete stays available for cleanup jobs.
#[derive(Clone)]
pub struct PostgresDeviceAdapter {
    pool: PgPool,
}

impl PostgresDeviceAdapter {
    /// Creates an adapter with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct DeviceRow {
    id: uuid::Uuid,
    tenant_id: uuid::Uuid,
    serial_number: String,
    display_name: String,
    department_id: Option<uuid::Uuid>,
    is_system: bool,
}

impl DeviceRow {
    fn into_device(self) -> AppResult<Device> {
        Device::new(
            ResourceId::from_uuid(self.id),
            TenantId::from_uuid(self.tenant_id),
            self.serial_number,
            self.display_name,
            self.department_id.map(ResourceId::from_uuid),
            self.is_system,
        )
    }
}

#[async_trait]
impl ResourceAdapter<Device> for PostgresDeviceAdapter {
    async fn resolve_many(
        &self,
        tenant_id: TenantId,
        ids: &[ResourceId],
    ) -> AppResult<Vec<(ResourceId, Option<Device>)>> {
        let id_values: Vec<uuid::Uuid> = ids.iter().map(ResourceId::as_uuid).collect();
        let rows = sqlx::query_as::<_, DeviceRow>(
            r#"
            SELECT id, tenant_id, serial_number, display_name, department_id, is_system
            FROM devices
            WHERE tenant_id = $1 AND id = ANY($2) AND deleted_at IS NULL
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(&id_values)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve devices: {error}")))?;

        let mut resolved: HashMap<ResourceId, Device> = HashMap::with_capacity(rows.len());
        for row in rows {
            let device = row.into_device()?;
            resolved.insert(device.resource_id(), device);
        }

        Ok(ids.iter().map(|id| (*id, resolved.remove(id))).collect())
    }

    async fn begin_delete(
        &self,
        tenant_id: TenantId,
    ) -> AppResult<Box<dyn DeleteTransaction<Device>>> {
        let transaction = self.pool.begin().await.map_err(|error| {
            AppError::Internal(format!("failed to open batch transaction: {error}"))
        })?;

        Ok(Box::new(PgDeviceTransaction {
            tenant_id,
            transaction,
        }))
    }
}

struct PgDeviceTransaction {
    tenant_id: TenantId,
    transaction: Transaction<'static, Postgres>,
}

#[async_trait]
impl DeleteTransaction<Device> for PgDeviceTransaction {
    async fn delete(&mut self, item: &Device, policy: DeletePolicy, _force: bool) -> AppResult<()> {
        let id = item.resource_id();
        let query = match policy {
            DeletePolicy::Hard => {
                r#"
                DELETE FROM devices
                WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL
                "#
            }
            DeletePolicy::Soft => {
                r#"
                UPDATE devices SET deleted_at = NOW()
                WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL
                "#
            }
        };

        let outcome = sqlx::query(query)
            .bind(id.as_uuid())
            .bind(self.tenant_id.as_uuid())
            .execute(&mut *self.transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete device '{id}': {error}"))
            })?;

        if outcome.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("device '{id}' no longer exists")));
        }

        Ok(())
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit batch transaction: {error}"))
        })
    }
}
