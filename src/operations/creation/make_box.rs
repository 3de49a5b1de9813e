use crate::error::{OperationError, Result};
use crate::math::{Point3, TOLERANCE};
use crate::topology::{ShellData, SolidId, TopologyStore};

use super::{MakeFace, MakeSolid, MakeWire};

/// Creates an axis-aligned box solid from two corner points.
pub struct MakeBox {
    min_corner: Point3,
    max_corner: Point3,
}

impl MakeBox {
    /// Creates a new `MakeBox` operation.
    #[must_use]
    pub fn new(min_corner: Point3, max_corner: Point3) -> Self {
        Self {
            min_corner,
            max_corner,
        }
    }

    /// Executes the operation, creating the box in the topology store.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the box has no extent along
    /// some axis.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SolidId> {
        let (lo, hi) = (self.min_corner, self.max_corner);
        if (0..3).any(|i| hi[i] - lo[i] < TOLERANCE) {
            return Err(OperationError::InvalidInput(format!(
                "box corners {lo:?} and {hi:?} do not span a volume"
            ))
            .into());
        }

        let c = |x: f64, y: f64, z: f64| Point3::new(x, y, z);
        // Each loop is counter-clockwise seen from outside.
        let loops = [
            [c(lo.x, lo.y, lo.z), c(lo.x, hi.y, lo.z), c(hi.x, hi.y, lo.z), c(hi.x, lo.y, lo.z)],
            [c(lo.x, lo.y, hi.z), c(hi.x, lo.y, hi.z), c(hi.x, hi.y, hi.z), c(lo.x, hi.y, hi.z)],
            [c(lo.x, lo.y, lo.z), c(hi.x, lo.y, lo.z), c(hi.x, lo.y, hi.z), c(lo.x, lo.y, hi.z)],
            [c(lo.x, hi.y, lo.z), c(lo.x, hi.y, hi.z), c(hi.x, hi.y, hi.z), c(hi.x, hi.y, lo.z)],
            [c(lo.x, lo.y, lo.z), c(lo.x, lo.y, hi.z), c(lo.x, hi.y, hi.z), c(lo.x, hi.y, lo.z)],
            [c(hi.x, lo.y, lo.z), c(hi.x, hi.y, lo.z), c(hi.x, hi.y, hi.z), c(hi.x, lo.y, hi.z)],
        ];

        let mut faces = Vec::with_capacity(loops.len());
        for points in loops {
            let wire = MakeWire::new(points.to_vec(), true).execute(store)?;
            faces.push(MakeFace::new(wire, vec![]).execute(store)?);
        }

        let shell = store.add_shell(ShellData::closed(faces));
        MakeSolid::new(shell, vec![]).execute(store)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn box_faces_point_outward() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), Point3::new(2.0, 4.0, 6.0))
            .execute(&mut store)
            .unwrap();
        let centre = Point3::new(1.0, 2.0, 3.0);
        for face_id in store.solid_faces(solid).unwrap() {
            let face = store.face(face_id).unwrap();
            let crate::topology::FaceSurface::Plane(plane) = &face.surface else {
                panic!("box faces are planar");
            };
            let outward = face.planar_normal().unwrap();
            assert!(outward.dot(&(plane.origin() - centre)) > 0.0);
        }
    }

    #[test]
    fn flat_box_is_rejected() {
        let mut store = TopologyStore::new();
        let result = MakeBox::new(Point3::origin(), Point3::new(1.0, 1.0, 0.0)).execute(&mut store);
        assert!(result.is_err());
    }
}
