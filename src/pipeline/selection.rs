//! Face picking and the ordered selection set.

use crate::error::Result;
use crate::math::intersect_3d::ray_triangle_intersect;
use crate::math::{Point3, Vector3};
use crate::tessellation::{TessellateFace, TessellationParams};
use crate::topology::{FaceId, SolidId, TopologyStore};

/// A pick ray in model space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3,
    pub direction: Vector3,
}

impl Ray {
    /// Creates a new ray.
    #[must_use]
    pub fn new(origin: Point3, direction: Vector3) -> Self {
        Self { origin, direction }
    }
}

/// Resolves a pick ray to a face of a solid.
///
/// Implementations must be deterministic: the same solid and ray always
/// give the same face.
pub trait FacePicker {
    /// The face of `solid` hit by `ray`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid cannot be read.
    fn pick_face(&self, store: &TopologyStore, solid: SolidId, ray: &Ray) -> Result<Option<FaceId>>;
}

/// Picks the nearest face along the ray by intersecting face
/// tessellations. Ties go to the face that comes first in the shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RayPicker {
    params: TessellationParams,
}

impl RayPicker {
    /// Creates a new `RayPicker`.
    #[must_use]
    pub fn new(params: TessellationParams) -> Self {
        Self { params }
    }
}

impl FacePicker for RayPicker {
    fn pick_face(&self, store: &TopologyStore, solid: SolidId, ray: &Ray) -> Result<Option<FaceId>> {
        let mut nearest: Option<(f64, FaceId)> = None;
        for face in store.solid_faces(solid)? {
            let mesh = TessellateFace::new(face, self.params).execute(store)?;
            for [a, b, c] in mesh.triangles() {
                let Some(hit) = ray_triangle_intersect(&ray.origin, &ray.direction, &a, &b, &c)
                else {
                    continue;
                };
                if nearest.is_none_or(|(t, _)| hit.t < t) {
                    nearest = Some((hit.t, face));
                }
            }
        }
        Ok(nearest.map(|(_, face)| face))
    }
}

/// Ordered, duplicate-free set of selected faces.
///
/// Insertion order is the order lids are built in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    faces: Vec<FaceId>,
}

impl Selection {
    /// Adds a face; returns `false` if it was already selected.
    pub fn insert(&mut self, face: FaceId) -> bool {
        if self.faces.contains(&face) {
            return false;
        }
        self.faces.push(face);
        true
    }

    /// Removes a face; returns `false` if it was not selected.
    pub fn remove(&mut self, face: FaceId) -> bool {
        let before = self.faces.len();
        self.faces.retain(|&f| f != face);
        self.faces.len() != before
    }

    #[must_use]
    pub fn faces(&self) -> &[FaceId] {
        &self.faces
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.faces.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn clear(&mut self) {
        self.faces.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::creation::MakeBox;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn normal_of(store: &TopologyStore, face: FaceId) -> Vector3 {
        store.face(face).unwrap().planar_normal().unwrap()
    }

    // ── picking ──

    #[test]
    fn ray_from_above_picks_top_face() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), p(10.0, 10.0, 10.0))
            .execute(&mut store)
            .unwrap();
        let ray = Ray::new(p(3.0, 4.0, 20.0), -Vector3::z());
        let face = RayPicker::default().pick_face(&store, solid, &ray).unwrap().unwrap();
        assert!((normal_of(&store, face) - Vector3::z()).norm() < 1e-12);
    }

    #[test]
    fn ray_from_the_side_picks_near_face() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), p(10.0, 10.0, 10.0))
            .execute(&mut store)
            .unwrap();
        let ray = Ray::new(p(-5.0, 3.0, 7.0), Vector3::x());
        let face = RayPicker::default().pick_face(&store, solid, &ray).unwrap().unwrap();
        assert!((normal_of(&store, face) + Vector3::x()).norm() < 1e-12);
    }

    #[test]
    fn miss_picks_nothing() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), p(1.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let ray = Ray::new(p(5.0, 5.0, 5.0), Vector3::z());
        assert!(RayPicker::default().pick_face(&store, solid, &ray).unwrap().is_none());
    }

    #[test]
    fn picking_is_deterministic() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), p(2.0, 2.0, 2.0))
            .execute(&mut store)
            .unwrap();
        // Straight through an edge shared by two faces.
        let ray = Ray::new(p(2.0, 1.0, 5.0), -Vector3::z());
        let picker = RayPicker::default();
        let first = picker.pick_face(&store, solid, &ray).unwrap();
        for _ in 0..3 {
            assert_eq!(picker.pick_face(&store, solid, &ray).unwrap(), first);
        }
    }

    // ── selection set ──

    #[test]
    fn selection_keeps_order_and_ignores_duplicates() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), p(1.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let faces = store.solid_faces(solid).unwrap();
        let mut selection = Selection::default();
        assert!(selection.insert(faces[3]));
        assert!(selection.insert(faces[1]));
        assert!(!selection.insert(faces[3]));
        assert_eq!(selection.faces(), &[faces[3], faces[1]]);
        assert!(selection.remove(faces[3]));
        assert!(!selection.remove(faces[3]));
        assert_eq!(selection.faces(), &[faces[1]]);
    }
}
