//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod postgres_audit;
mod postgres_authorization_repository;
mod postgres_department_adapter;
mod postgres_device_adapter;
mod postgres_reference_checks;
mod postgres_system_parameter_adapter;

pub use postgres_audit::PostgresAuditStore;
pub use postgres_authorization_repository::PostgresAuthorizationRepository;
pub use postgres_department_adapter::PostgresDepartmentAdapter;
pub use postgres_device_adapter::PostgresDeviceAdapter;
pub use postgres_reference_checks::{PgDepartmentHasChildren, PgDepartmentHasDevices};
pub use postgres_system_parameter_adapter::PostgresSystemParameterAdapter;
