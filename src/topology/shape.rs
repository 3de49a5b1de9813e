use super::{EdgeId, FaceId, ShellId, SolidId, VertexId, WireId};

/// A handle to any topological entity in a [`TopologyStore`](super::TopologyStore).
///
/// Handles are cheap to copy and never own geometry; they are only
/// meaningful together with the store that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    Solid(SolidId),
    Shell(ShellId),
    Face(FaceId),
    Wire(WireId),
    Edge(EdgeId),
    Vertex(VertexId),
}

impl Shape {
    /// Returns the solid handle, if this is a solid.
    #[must_use]
    pub fn as_solid(&self) -> Option<SolidId> {
        match self {
            Self::Solid(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<SolidId> for Shape {
    fn from(id: SolidId) -> Self {
        Self::Solid(id)
    }
}

impl From<FaceId> for Shape {
    fn from(id: FaceId) -> Self {
        Self::Face(id)
    }
}
