use forgeline_core::{AppResult, NonEmptyString, ResourceId, TenantId};
use serde::{Deserialize, Serialize};

use crate::resource::{DeletableResource, SystemProtected};

/// Tenant-scoped configuration row; seeded rows carry the system flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemParameter {
    id: ResourceId,
    tenant_id: TenantId,
    param_key: NonEmptyString,
    param_value: String,
    is_system: bool,
}

impl SystemParameter {
    /// Creates a system parameter with validated fields.
    pub fn new(
        id: ResourceId,
        tenant_id: TenantId,
        param_key: impl Into<String>,
        param_value: impl Into<String>,
        is_system: bool,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            tenant_id,
            param_key: NonEmptyString::new(param_key)?,
            param_value: param_value.into(),
            is_system,
        })
    }

    /// Returns the owning tenant.
    #[must_use]
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Returns the stable configuration key.
    #[must_use]
    pub fn param_key(&self) -> &NonEmptyString {
        &self.param_key
    }

    /// Returns the configured value.
    #[must_use]
    pub fn param_value(&self) -> &str {
        self.param_value.as_str()
    }
}

impl DeletableResource for SystemParameter {
    const RESOURCE_TYPE: &'static str = "system_parameter";

    fn resource_id(&self) -> ResourceId {
        self.id
    }
}

impl SystemProtected for SystemParameter {
    fn is_system(&self) -> bool {
        self.is_system
    }
}
