use crate::error::{OperationError, Result};
use crate::geometry::surface::Plane;
use crate::math::polygon_3d::{newell_normal, vertex_average};
use crate::tessellation::{wire_polyline, TessellationParams};
use crate::topology::{FaceData, FaceId, FaceSurface, TopologyStore, WireId};

/// Creates a planar face from a closed outer wire and optional holes.
///
/// Without an explicit plane, the supporting plane is derived from the
/// outer wire (Newell normal through the vertex average) and the face
/// normal follows the wire's winding. With [`MakeFace::on_plane`], the given
/// plane is used and `same_sense` records whether the winding agrees with
/// its normal.
pub struct MakeFace {
    outer_wire: WireId,
    inner_wires: Vec<WireId>,
    plane: Option<Plane>,
}

impl MakeFace {
    /// Creates a new `MakeFace` operation.
    #[must_use]
    pub fn new(outer_wire: WireId, inner_wires: Vec<WireId>) -> Self {
        Self {
            outer_wire,
            inner_wires,
            plane: None,
        }
    }

    /// Uses `plane` as the supporting surface instead of fitting one.
    #[must_use]
    pub fn on_plane(mut self, plane: Plane) -> Self {
        self.plane = Some(plane);
        self
    }

    /// Executes the operation, creating the face in the topology store.
    ///
    /// # Errors
    ///
    /// Returns an error if a wire is missing or open, or the outer wire
    /// encloses no area.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<FaceId> {
        let params = TessellationParams::default();
        let outer = wire_polyline(store, self.outer_wire, &params)?;
        for &wire in &self.inner_wires {
            wire_polyline(store, wire, &params)?;
        }

        let winding = newell_normal(&outer).ok_or_else(|| {
            OperationError::InvalidInput("outer wire encloses no area".into())
        })?;

        let (plane, same_sense) = match &self.plane {
            Some(plane) => (plane.clone(), winding.dot(plane.plane_normal()) > 0.0),
            None => {
                let origin = vertex_average(&outer);
                let plane = Plane::from_normal_and_ref(origin, winding, outer[1] - outer[0])?;
                (plane, true)
            }
        };

        Ok(store.add_face(FaceData {
            surface: FaceSurface::Plane(plane),
            outer_wire: self.outer_wire,
            inner_wires: self.inner_wires.clone(),
            same_sense,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::{Point3, Vector3};
    use crate::operations::creation::MakeWire;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn normal_follows_winding() {
        let mut store = TopologyStore::new();
        let wire = MakeWire::new(
            vec![p(0.0, 0.0, 1.0), p(2.0, 0.0, 1.0), p(2.0, 2.0, 1.0), p(0.0, 2.0, 1.0)],
            true,
        )
        .execute(&mut store)
        .unwrap();
        let face = MakeFace::new(wire, vec![]).execute(&mut store).unwrap();
        let data = store.face(face).unwrap();
        assert!((data.planar_normal().unwrap() - Vector3::z()).norm() < 1e-12);
        let FaceSurface::Plane(plane) = &data.surface else {
            panic!("expected a plane");
        };
        assert!(plane.signed_distance(&p(5.0, 5.0, 1.0)).abs() < 1e-12);
    }

    #[test]
    fn explicit_plane_records_sense() {
        let mut store = TopologyStore::new();
        let wire = MakeWire::new(vec![p(0.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(1.0, 0.0, 0.0)], true)
            .execute(&mut store)
            .unwrap();
        let plane = Plane::from_normal(Point3::origin(), Vector3::z()).unwrap();
        let face = MakeFace::new(wire, vec![]).on_plane(plane).execute(&mut store).unwrap();
        let data = store.face(face).unwrap();
        assert!(!data.same_sense);
        assert!((data.planar_normal().unwrap() + Vector3::z()).norm() < 1e-12);
    }

    #[test]
    fn collinear_wire_is_rejected() {
        let mut store = TopologyStore::new();
        let wire = MakeWire::new(vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(2.0, 0.0, 0.0)], true)
            .execute(&mut store)
            .unwrap();
        assert!(MakeFace::new(wire, vec![]).execute(&mut store).is_err());
    }
}
