use forgeline_core::{AppResult, NonEmptyString, ResourceId, TenantId};
use serde::{Deserialize, Serialize};

use crate::resource::{DeletableResource, SystemProtected};

/// One monitored piece of production-line equipment (welder, feeder, sensor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    id: ResourceId,
    tenant_id: TenantId,
    serial_number: NonEmptyString,
    display_name: NonEmptyString,
    department_id: Option<ResourceId>,
    is_system: bool,
}

impl Device {
    /// Creates a device with validated fields.
    pub fn new(
        id: ResourceId,
        tenant_id: TenantId,
        serial_number: impl Into<String>,
        display_name: impl Into<String>,
        department_id: Option<ResourceId>,
        is_system: bool,
    ) -> AppResult<Self> {
        Ok(Self {
            id,
            tenant_id,
            serial_number: NonEmptyString::new(serial_number)?,
            display_name: NonEmptyString::new(display_name)?,
            department_id,
            is_system,
        })
    }

    /// Returns the owning tenant.
    #[must_use]
    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    /// Returns the manufacturer serial number.
    #[must_use]
    pub fn serial_number(&self) -> &NonEmptyString {
        &self.serial_number
    }

    /// Returns the display name shown in the dashboard.
    #[must_use]
    pub fn display_name(&self) -> &NonEmptyString {
        &self.display_name
    }

    /// Returns the department the device is assigned to, if any.
    #[must_use]
    pub fn department_id(&self) -> Option<ResourceId> {
        self.department_id
    }
}

impl DeletableResource for Device {
    const RESOURCE_TYPE: &'static str = "device";

    fn resource_id(&self) -> ResourceId {
        self.id
    }
}

impl SystemProtected for Device {
    fn is_system(&self) -> bool {
        self.is_system
    }
}
