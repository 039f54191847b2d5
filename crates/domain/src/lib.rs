//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod batch;
mod department;
mod device;
mod resource;
mod security;
mod system_parameter;

pub use batch::{
    BatchDeleteResult, BatchOperationContext, DeletePolicy, ItemFailure, ItemSkip,
    ValidationOutcome, reason,
};
pub use department::Department;
pub use device::Device;
pub use resource::{DeletableResource, SystemProtected};
pub use security::{AuditAction, Permission};
pub use system_parameter::SystemParameter;
