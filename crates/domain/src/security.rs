use std::str::FromStr;

use forgeline_core::AppError;
use serde::{Deserialize, Serialize};

/// Permissions enforced by application policy checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Allows batch-deleting departments.
    DepartmentDelete,
    /// Allows batch-deleting devices.
    DeviceDelete,
    /// Allows batch-deleting system parameters.
    SystemParameterDelete,
    /// Allows reading audit log entries.
    SecurityAuditRead,
}

impl Permission {
    /// Returns a stable storage value for this permission.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DepartmentDelete => "department.delete",
            Self::DeviceDelete => "device.delete",
            Self::SystemParameterDelete => "system_parameter.delete",
            Self::SecurityAuditRead => "security.audit.read",
        }
    }

    /// Returns all known permissions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Permission] = &[
            Permission::DepartmentDelete,
            Permission::DeviceDelete,
            Permission::SystemParameterDelete,
            Permission::SecurityAuditRead,
        ];

        ALL
    }
}

impl FromStr for Permission {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "department.delete" => Ok(Self::DepartmentDelete),
            "device.delete" => Ok(Self::DeviceDelete),
            "system_parameter.delete" => Ok(Self::SystemParameterDelete),
            "security.audit.read" => Ok(Self::SecurityAuditRead),
            _ => Err(AppError::Validation(format!(
                "unknown permission value '{value}'"
            ))),
        }
    }
}

/// Stable audit actions emitted by the batch-delete engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted once when a batch-delete invocation starts.
    BatchDeleteStarted,
    /// Emitted once per processed item with its outcome.
    BatchDeleteItem,
    /// Emitted once with the invocation summary.
    BatchDeleteCompleted,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BatchDeleteStarted => "batch_delete.started",
            Self::BatchDeleteItem => "batch_delete.item",
            Self::BatchDeleteCompleted => "batch_delete.completed",
        }
    }

    /// Returns all known audit actions.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AuditAction] = &[
            AuditAction::BatchDeleteStarted,
            AuditAction::BatchDeleteItem,
            AuditAction::BatchDeleteCompleted,
        ];

        ALL
    }
}
