use std::sync::Arc;

use forgeline_application::{AuditLogService, BatchDeleteService};
use forgeline_domain::{Department, Device, SystemParameter};
use sqlx::PgPool;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub department_delete: Arc<BatchDeleteService<Department>>,
    pub device_delete: Arc<BatchDeleteService<Device>>,
    pub parameter_delete: Arc<BatchDeleteService<SystemParameter>>,
    pub audit_log_service: AuditLogService,
    pub pool: PgPool,
}
