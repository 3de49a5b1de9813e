use crate::error::{OperationError, Result};
use crate::math::{Point3, TOLERANCE};
use crate::topology::{EdgeData, OrientedEdge, TopologyStore, VertexData, WireData, WireId};

/// Creates a wire of straight edges through a sequence of 3D points.
///
/// Consecutive edges share their vertex; a closed wire connects the last
/// point back to the first.
pub struct MakeWire {
    points: Vec<Point3>,
    close: bool,
}

impl MakeWire {
    /// Creates a new `MakeWire` operation.
    #[must_use]
    pub fn new(points: Vec<Point3>, close: bool) -> Self {
        Self { points, close }
    }

    /// Executes the operation, creating the wire in the topology store.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if there are too few points
    /// (2 for an open wire, 3 for a closed one) or two consecutive points
    /// coincide.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<WireId> {
        let n = self.points.len();
        let min = if self.close { 3 } else { 2 };
        if n < min {
            return Err(OperationError::InvalidInput(format!(
                "wire needs at least {min} points, got {n}"
            ))
            .into());
        }

        let segment_count = if self.close { n } else { n - 1 };
        for i in 0..segment_count {
            let a = self.points[i];
            let b = self.points[(i + 1) % n];
            if (b - a).norm() < TOLERANCE {
                return Err(OperationError::InvalidInput(format!(
                    "wire points {i} and {} coincide",
                    (i + 1) % n
                ))
                .into());
            }
        }

        let vertices: Vec<_> = self
            .points
            .iter()
            .map(|&p| store.add_vertex(VertexData::new(p)))
            .collect();

        let mut edges = Vec::with_capacity(segment_count);
        for i in 0..segment_count {
            let j = (i + 1) % n;
            let data = EdgeData::line(vertices[i], vertices[j], self.points[i], self.points[j])?;
            edges.push(OrientedEdge::new(store.add_edge(data), true));
        }

        Ok(store.add_wire(WireData {
            edges,
            is_closed: self.close,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn closed_wire_shares_vertices() {
        let mut store = TopologyStore::new();
        let wire = MakeWire::new(vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)], true)
            .execute(&mut store)
            .unwrap();
        let data = store.wire(wire).unwrap();
        assert!(data.is_closed);
        assert_eq!(data.edges.len(), 3);

        let first = store.edge(data.edges[0].edge).unwrap();
        let last = store.edge(data.edges[2].edge).unwrap();
        assert_eq!(last.end, first.start);
    }

    #[test]
    fn open_wire_has_one_edge_less() {
        let mut store = TopologyStore::new();
        let wire = MakeWire::new(vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0)], false)
            .execute(&mut store)
            .unwrap();
        assert_eq!(store.wire(wire).unwrap().edges.len(), 2);
    }

    #[test]
    fn too_few_points_is_an_error() {
        let mut store = TopologyStore::new();
        let result = MakeWire::new(vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)], true).execute(&mut store);
        assert!(result.is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn coincident_points_are_rejected() {
        let mut store = TopologyStore::new();
        let result = MakeWire::new(
            vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)],
            true,
        )
        .execute(&mut store);
        assert!(result.is_err());
    }
}
