use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use forgeline_application::{
    AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository,
};
use forgeline_core::{AppError, AppResult, TenantId};
use forgeline_domain::AuditAction;

/// Largest page the audit read model hands out in one call.
const MAX_PAGE_SIZE: usize = 100;

/// PostgreSQL store for the batch-delete audit trail.
///
/// One type serves both sides of the trail: the write path appends events
/// emitted by the delete engine, the read path projects them for the admin
/// surface. Reads are restricted to the engine's own [`AuditAction`] values;
/// rows written under other action names by future deployments stay out of
/// this projection.
#[derive(Clone)]
pub struct PostgresAuditStore {
    pool: PgPool,
}

impl PostgresAuditStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditStore {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_log_entries
                (id, tenant_id, subject, action, resource_type, resource_id, detail, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event.tenant_id.as_uuid())
        .bind(event.subject)
        .bind(event.action.as_str())
        .bind(event.resource_type)
        .bind(event.resource_id)
        .bind(event.detail)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append audit event: {error}")))?;

        Ok(())
    }
}

#[derive(Debug, FromRow)]
struct AuditTrailRow {
    id: Uuid,
    subject: String,
    action: String,
    resource_type: String,
    resource_id: String,
    detail: Option<String>,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl AuditLogRepository for PostgresAuditStore {
    async fn list_recent_entries(
        &self,
        tenant_id: TenantId,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogEntry>> {
        let engine_actions: Vec<String> = AuditAction::all()
            .iter()
            .map(|action| action.as_str().to_owned())
            .collect();
        let page_size = query.limit.clamp(1, MAX_PAGE_SIZE) as i64;
        let offset = query.offset as i64;

        let rows = sqlx::query_as::<_, AuditTrailRow>(
            r#"
            SELECT id, subject, action, resource_type, resource_id, detail, created_at
            FROM audit_log_entries
            WHERE tenant_id = $1
                AND action = ANY($2)
                AND ($3::TEXT IS NULL OR action = $3)
                AND ($4::TEXT IS NULL OR subject = $4)
            ORDER BY created_at DESC, id
            LIMIT $5 OFFSET $6
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(&engine_actions)
        .bind(query.action)
        .bind(query.subject)
        .bind(page_size)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list audit log entries: {error}")))?;

        Ok(rows
            .into_iter()
            .map(|row| AuditLogEntry {
                event_id: row.id.to_string(),
                subject: row.subject,
                action: row.action,
                resource_type: row.resource_type,
                resource_id: row.resource_id,
                detail: row.detail,
                created_at: row.created_at.to_rfc3339(),
            })
            .collect())
    }
}
