use std::sync::Arc;

use async_trait::async_trait;
use forgeline_core::{AppError, AppResult, TenantId, UserIdentity};
use forgeline_domain::{BatchOperationContext, Permission, ValidationOutcome};

use crate::batch_ports::PermissionChecker;

/// Repository port for permission lookups.
#[async_trait]
pub trait AuthorizationRepository: Send + Sync {
    /// Lists effective permissions for a subject in a tenant.
    async fn list_permissions_for_subject(
        &self,
        tenant_id: TenantId,
        subject: &str,
    ) -> AppResult<Vec<Permission>>;
}

/// Application service for tenant-scoped authorization checks.
#[derive(Clone)]
pub struct AuthorizationService {
    repository: Arc<dyn AuthorizationRepository>,
}

impl AuthorizationService {
    /// Creates a new authorization service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AuthorizationRepository>) -> Self {
        Self { repository }
    }

    /// Ensures a subject has the required permission in the tenant scope.
    pub async fn require_permission(
        &self,
        tenant_id: TenantId,
        subject: &str,
        permission: Permission,
    ) -> AppResult<()> {
        if self.has_permission(tenant_id, subject, permission).await? {
            return Ok(());
        }

        Err(AppError::Forbidden(format!(
            "subject '{subject}' is missing permission '{}' in tenant '{tenant_id}'",
            permission.as_str()
        )))
    }

    /// Returns whether the subject currently has the permission.
    pub async fn has_permission(
        &self,
        tenant_id: TenantId,
        subject: &str,
        permission: Permission,
    ) -> AppResult<bool> {
        let granted = self
            .repository
            .list_permissions_for_subject(tenant_id, subject)
            .await?;

        Ok(granted.contains(&permission))
    }
}

/// Permission checker that binds one required permission to the policy store.
#[derive(Clone)]
pub struct PolicyPermissionChecker {
    authorization_service: AuthorizationService,
    required: Permission,
}

impl PolicyPermissionChecker {
    /// Creates a checker requiring the given permission.
    #[must_use]
    pub fn new(authorization_service: AuthorizationService, required: Permission) -> Self {
        Self {
            authorization_service,
            required,
        }
    }
}

#[async_trait]
impl PermissionChecker for PolicyPermissionChecker {
    async fn check(
        &self,
        principal: &UserIdentity,
        _resource_type: &str,
        _context: &BatchOperationContext,
    ) -> AppResult<ValidationOutcome> {
        let granted = self
            .authorization_service
            .has_permission(principal.tenant_id(), principal.subject(), self.required)
            .await?;

        if granted {
            Ok(ValidationOutcome::allow())
        } else {
            Ok(ValidationOutcome::reject(format!(
                "subject '{}' is missing permission '{}'",
                principal.subject(),
                self.required.as_str()
            )))
        }
    }
}

/// Default permission checker that allows every principal.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermitAllChecker;

#[async_trait]
impl PermissionChecker for PermitAllChecker {
    async fn check(
        &self,
        _principal: &UserIdentity,
        _resource_type: &str,
        _context: &BatchOperationContext,
    ) -> AppResult<ValidationOutcome> {
        Ok(ValidationOutcome::allow())
    }
}
