use forgeline_core::ResourceId;

/// Capability shared by every entity that the batch-delete engine can target.
pub trait DeletableResource: Clone + Send + Sync + 'static {
    /// Stable resource-type label used in permissions, audit events and routes.
    const RESOURCE_TYPE: &'static str;

    /// Returns the identifier of this resource row.
    fn resource_id(&self) -> ResourceId;
}

/// Capability of resources that carry a protected-system flag.
pub trait SystemProtected {
    /// Returns whether the row is a protected system record.
    fn is_system(&self) -> bool;
}
