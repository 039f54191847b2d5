//! Application services and ports.

#![forbid(unsafe_code)]

mod audit_log_service;
mod audit_ports;
mod authorization_service;
mod batch_auditor;
mod batch_delete_service;
mod batch_ports;
mod validators;

pub use audit_log_service::AuditLogService;
pub use audit_ports::{AuditEvent, AuditLogEntry, AuditLogQuery, AuditLogRepository, AuditRepository};
pub use authorization_service::{
    AuthorizationRepository, AuthorizationService, PermitAllChecker, PolicyPermissionChecker,
};
pub use batch_auditor::RepositoryBatchAuditor;
pub use batch_delete_service::{BatchDeleteService, DEFAULT_MAX_BATCH_SIZE};
pub use batch_ports::{
    BatchAuditor, DeleteTransaction, ItemAuditOutcome, ItemValidator, PermissionChecker,
    ResourceAdapter,
};
pub use validators::{
    CompositeValidator, PermitAllValidator, ReferenceCheckValidator, ReferencePredicate,
    SystemProtectedValidator,
};
