use std::sync::Arc;

use forgeline_core::{AppResult, UserIdentity};
use forgeline_domain::Permission;

use crate::audit_ports::{AuditLogEntry, AuditLogQuery, AuditLogRepository};
use crate::authorization_service::AuthorizationService;

/// Application service exposing the audit trail to the admin surface.
#[derive(Clone)]
pub struct AuditLogService {
    repository: Arc<dyn AuditLogRepository>,
    authorization_service: AuthorizationService,
}

impl AuditLogService {
    /// Creates a new audit log service from a repository implementation.
    #[must_use]
    pub fn new(
        repository: Arc<dyn AuditLogRepository>,
        authorization_service: AuthorizationService,
    ) -> Self {
        Self {
            repository,
            authorization_service,
        }
    }

    /// Lists recent audit entries for the actor's tenant.
    pub async fn list_audit_log(
        &self,
        actor: &UserIdentity,
        query: AuditLogQuery,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.authorization_service
            .require_permission(
                actor.tenant_id(),
                actor.subject(),
                Permission::SecurityAuditRead,
            )
            .await?;

        self.repository
            .list_recent_entries(actor.tenant_id(), query)
            .await
    }
}
