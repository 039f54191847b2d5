use forgeline_core::{AppResult, NonEmptyString, ResourceId, TenantId};
use serde::{Deserialize, Serialize};

use crate::resource::{DeletableResource, SystemProtected};

/// Organizational unit owning devices; departments form a tree per tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    id: ResourceId,
    tenant_id: TenantId,
    name: NonEmptyString,
    parent_id: Option<ResourceId>,
    is_system: bool,
}

impl Department {
    /// Creates a department with validated fields.
    pub fn new(
        id: ResourceId,
        tenant_id: TenantId,
        name: impl Into<String>,
        parent_id: Option<ResourceId>,
        is_system: bool,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            tenant_id,
            name: NonEmptyString::new(name)?,
            parent_id,
            is_system,
        })
    }

    /// Returns the owning tenant.
    #[must_use]
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Returns the department name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the parent department, if this is not a root.
    #[must_use]
    pub fn parent_id(&self) -> Option<ResourceId> {
        self.parent_id
    }
}

impl DeletableResource for Department {
    const RESOURCE_TYPE: &'static str = "department";

    fn resource_id(&self) -> ResourceId {
        self.id
    }
}

impl SystemProtected for Department {
    fn is_system(&self) -> bool {
        self.is_system
    }
}
