use std::sync::Arc;

use forgeline_application::{
    AuditLogService, AuthorizationService, BatchDeleteService, CompositeValidator, ItemValidator,
    PolicyPermissionChecker, ReferenceCheckValidator, RepositoryBatchAuditor,
    SystemProtectedValidator,
};
use forgeline_domain::{DeletePolicy, Department, Permission};
use forgeline_infrastructure::{
    PgDepartmentHasChildren, PgDepartmentHasDevices, PostgresAuditStore,
    PostgresAuthorizationRepository, PostgresDepartmentAdapter, PostgresDeviceAdapter,
    PostgresSystemParameterAdapter,
};
use sqlx::PgPool;

use crate::state::AppState;

pub fn build_state(pool: PgPool) -> AppState {
    let authorization_service = AuthorizationService::new(Arc::new(
        PostgresAuthorizationRepository::new(pool.clone()),
    ));
    let audit_store = Arc::new(PostgresAuditStore::new(pool.clone()));
    let auditor = Arc::new(RepositoryBatchAuditor::new(audit_store.clone()));

    let department_validator: Arc<dyn ItemValidator<Department>> =
        Arc::new(CompositeValidator::new(vec![
            Arc::new(SystemProtectedValidator::new()),
            Arc::new(ReferenceCheckValidator::new(vec![
                Arc::new(PgDepartmentHasChildren::new(pool.clone())),
                Arc::new(PgDepartmentHasDevices::new(pool.clone())),
            ])),
        ]));

    let department_delete =
        BatchDeleteService::new(Arc::new(PostgresDepartmentAdapter::new(pool.clone())))
            .with_validator(department_validator)
            .with_permission_checker(Arc::new(PolicyPermissionChecker::new(
                authorization_service.clone(),
                Permission::DepartmentDelete,
            )))
            .with_auditor(auditor.clone());

    // Devices keep their telemetry history: the dashboard only ever
    // soft-deletes them.
    let device_delete = BatchDeleteService::new(Arc::new(PostgresDeviceAdapter::new(pool.clone())))
        .with_validator(Arc::new(SystemProtectedValidator::new()))
        .with_permission_checker(Arc::new(PolicyPermissionChecker::new(
            authorization_service.clone(),
            Permission::DeviceDelete,
        )))
        .with_auditor(auditor.clone())
        .with_delete_policy(DeletePolicy::Soft);

    let parameter_delete =
        BatchDeleteService::new(Arc::new(PostgresSystemParameterAdapter::new(pool.clone())))
            .with_validator(Arc::new(SystemProtectedValidator::new()))
            .with_permission_checker(Arc::new(PolicyPermissionChecker::new(
                authorization_service.clone(),
                Permission::SystemParameterDelete,
            )))
            .with_auditor(auditor);

    let audit_log_service = AuditLogService::new(audit_store, authorization_service);

    AppState {
        department_delete: Arc::new(department_delete),
        device_delete: Arc::new(device_delete),
        parameter_delete: Arc::new(parameter_delete),
        audit_log_service,
        pool,
    }
}
