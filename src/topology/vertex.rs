use crate::math::Point3;

slotmap::new_key_type! {
    /// Handle of a vertex in a [`TopologyStore`](super::TopologyStore).
    pub struct VertexId;
}

/// A point where edges meet.
#[derive(Debug, Clone)]
pub struct VertexData {
    pub point: Point3,
}

impl VertexData {
    #[must_use]
    pub fn new(point: Point3) -> Self {
        Self { point }
    }
}
