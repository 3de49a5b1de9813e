use super::edge::EdgeId;

slotmap::new_key_type! {
    /// Handle of a wire in a [`TopologyStore`](super::TopologyStore).
    pub struct WireId;
}

/// One step of a wire: an edge and the direction it is walked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrientedEdge {
    pub edge: EdgeId,
    /// `true` walks the edge from its start vertex to its end vertex.
    pub forward: bool,
}

impl OrientedEdge {
    #[must_use]
    pub fn new(edge: EdgeId, forward: bool) -> Self {
        Self { edge, forward }
    }

    /// The same edge walked the other way.
    #[must_use]
    pub fn reversed(self) -> Self {
        Self {
            forward: !self.forward,
            ..self
        }
    }
}

/// A chain of edges, each starting where the previous one ends.
#[derive(Debug, Clone)]
pub struct WireData {
    pub edges: Vec<OrientedEdge>,
    /// The last edge ends where the first one starts.
    pub is_closed: bool,
}

impl WireData {
    /// A closed loop over `edges`.
    #[must_use]
    pub fn closed(edges: Vec<OrientedEdge>) -> Self {
        Self {
            edges,
            is_closed: true,
        }
    }

    /// The loop walked backwards: reversed order, every edge flipped.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            edges: self.edges.iter().rev().map(|oe| oe.reversed()).collect(),
            is_closed: self.is_closed,
        }
    }
}
