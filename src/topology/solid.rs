use super::shell::ShellId;

slotmap::new_key_type! {
    /// Handle of a solid in a [`TopologyStore`](super::TopologyStore).
    pub struct SolidId;
}

/// A volume bounded by an outer shell, minus the voids of its inner shells.
#[derive(Debug, Clone)]
pub struct SolidData {
    pub outer_shell: ShellId,
    pub inner_shells: Vec<ShellId>,
}
