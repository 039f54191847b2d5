use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;

use forgeline_application::AuthorizationRepository;
use forgeline_core::{AppError, AppResult, TenantId};
use forgeline_domain::Permission;

/// PostgreSQL-backed repository for subject permission lookups.
#[derive(Clone)]
pub struct PostgresAuthorizationRepository {
    pool: PgPool,
}

impl PostgresAuthorizationRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuthorizationRepository for PostgresAuthorizationRepository {
    async fn list_permissions_for_subject(
        &self,
        tenant_id: TenantId,
        subject: &str,
    ) -> AppResult<Vec<Permission>> {
        let values = sqlx::query_scalar::<_, String>(
            r#"
            SELECT permission FROM subject_permissions
            WHERE tenant_id = $1 AND subject = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(subject)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

        // Rows written by newer deployments may carry permissions this build
        // does not know; they are ignored rather than treated as corruption.
        Ok(values
            .iter()
            .filter_map(|value| Permission::from_str(value).ok())
            .collect())
    }
}
