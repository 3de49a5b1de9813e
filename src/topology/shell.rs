use super::face::FaceId;

slotmap::new_key_type! {
    /// Handle of a shell in a [`TopologyStore`](super::TopologyStore).
    pub struct ShellId;
}

/// A set of faces joined along shared edges.
#[derive(Debug, Clone)]
pub struct ShellData {
    pub faces: Vec<FaceId>,
    /// The faces bound a volume without gaps.
    pub is_closed: bool,
}

impl ShellData {
    /// A watertight shell over `faces`.
    #[must_use]
    pub fn closed(faces: Vec<FaceId>) -> Self {
        Self {
            faces,
            is_closed: true,
        }
    }
}
