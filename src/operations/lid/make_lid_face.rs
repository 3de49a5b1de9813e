use crate::error::LidError;
use crate::geometry::surface::Plane;
use crate::math::polygon_2d::{find_self_intersection, signed_area_2d};
use crate::math::polygon_3d::project_to_uv;
use crate::math::Point3;
use crate::operations::creation::{MakeFace, MakeWire};
use crate::topology::{FaceId, TopologyStore};

/// Builds the planar lid face from a projected boundary polygon.
///
/// The polygon is checked in the plane's own coordinates and wound so that
/// the face normal equals the plane normal.
pub struct MakeLidFace<'a> {
    points: &'a [Point3],
    plane: &'a Plane,
    tolerance: f64,
}

impl<'a> MakeLidFace<'a> {
    /// Creates a new `MakeLidFace` operation.
    #[must_use]
    pub fn new(points: &'a [Point3], plane: &'a Plane) -> Self {
        Self {
            points,
            plane,
            tolerance: 1e-6,
        }
    }

    /// Sets the distance below which segments count as touching.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Executes the operation, creating the face in the topology store.
    ///
    /// # Errors
    ///
    /// Returns [`LidError::InvalidWire`] for a self-intersecting or zero-area
    /// polygon, or [`LidError::Kernel`] if the face cannot be built.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<FaceId, LidError> {
        let uv = project_to_uv(self.points, self.plane);
        if let Some((i, j)) = find_self_intersection(&uv, self.tolerance) {
            return Err(LidError::InvalidWire(format!(
                "projected boundary crosses itself at segments {i} and {j}"
            )));
        }

        let area = signed_area_2d(&uv);
        if area.abs() <= self.tolerance * self.tolerance {
            return Err(LidError::InvalidWire(format!(
                "projected boundary encloses no area ({area:e})"
            )));
        }

        let mut points = self.points.to_vec();
        if area < 0.0 {
            points.reverse();
        }
        let wire = MakeWire::new(points, true).execute(store)?;
        Ok(MakeFace::new(wire, vec![])
            .on_plane(self.plane.clone())
            .execute(store)?)
    }
}
