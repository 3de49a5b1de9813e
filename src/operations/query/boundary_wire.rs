use crate::error::{Result, TopologyError};
use crate::tessellation::{Polyline, TessellationParams};
use crate::tessellation::TessellateCurve;
use crate::topology::{FaceId, TopologyStore};

/// Extracts the outer boundary of a face as one polyline per edge.
///
/// Edges come in wire traversal order and each polyline runs in traversal
/// direction, endpoints included, so consecutive polylines meet end to start.
pub struct BoundaryWire {
    face: FaceId,
    params: TessellationParams,
}

impl BoundaryWire {
    /// Creates a new `BoundaryWire` query.
    #[must_use]
    pub fn new(face: FaceId, params: TessellationParams) -> Self {
        Self { face, params }
    }

    /// Executes the query.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::InvalidTopology`] for a wire without edges,
    /// [`TopologyError::WireNotClosed`] for an open one, or an error if an
    /// entity is missing.
    pub fn execute(&self, store: &TopologyStore) -> Result<Vec<Polyline>> {
        let face = store.face(self.face)?;
        let wire = store.wire(face.outer_wire)?;
        if wire.edges.is_empty() {
            return Err(TopologyError::InvalidTopology("outer wire has no edges".into()).into());
        }
        if !wire.is_closed {
            return Err(TopologyError::WireNotClosed.into());
        }

        let mut chain = Vec::with_capacity(wire.edges.len());
        for oe in &wire.edges {
            let mut polyline = TessellateCurve::new(oe.edge, self.params).execute(store)?;
            if !oe.forward {
                polyline.points.reverse();
            }
            chain.push(polyline);
        }
        Ok(chain)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::creation::MakeBox;

    #[test]
    fn box_face_has_four_chained_edges() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let face = store.solid_faces(solid).unwrap()[0];
        let chain = BoundaryWire::new(face, TessellationParams::default())
            .execute(&store)
            .unwrap();
        assert_eq!(chain.len(), 4);
        for i in 0..4 {
            let end = chain[i].points.last().unwrap();
            let next_start = chain[(i + 1) % 4].points[0];
            assert!((end - next_start).norm() < 1e-12);
        }
    }
}
