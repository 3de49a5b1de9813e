use crate::geometry::surface::{Cylinder, Plane, Surface};
use crate::math::{Point3, Vector3};

use super::wire::WireId;

slotmap::new_key_type! {
    /// Unique identifier for a face in the topology store.
    pub struct FaceId;
}

/// The geometric surface associated with a face.
#[derive(Debug, Clone)]
pub enum FaceSurface {
    /// A planar surface.
    Plane(Plane),
    /// A cylindrical surface.
    Cylinder(Cylinder),
}

impl FaceSurface {
    /// Returns the plane if this is a planar surface.
    #[must_use]
    pub fn as_plane(&self) -> Option<&Plane> {
        match self {
            Self::Plane(plane) => Some(plane),
            Self::Cylinder(_) => None,
        }
    }

    /// The underlying parametric surface.
    #[must_use]
    pub fn as_surface(&self) -> &dyn Surface {
        match self {
            Self::Plane(plane) => plane,
            Self::Cylinder(cylinder) => cylinder,
        }
    }
}

/// Data associated with a topological face.
///
/// A face is a bounded region on a surface, defined by an outer wire
/// and optionally inner wires (holes).
#[derive(Debug, Clone)]
pub struct FaceData {
    /// The geometric surface on which this face lies.
    pub surface: FaceSurface,
    /// The outer boundary wire.
    pub outer_wire: WireId,
    /// Inner boundary wires (holes).
    pub inner_wires: Vec<WireId>,
    /// If `true`, the face normal agrees with the surface normal.
    pub same_sense: bool,
}

impl FaceData {
    /// Outward normal of a planar face, taking `same_sense` into account.
    #[must_use]
    pub fn planar_normal(&self) -> Option<Vector3> {
        let normal = *self.surface.as_plane()?.plane_normal();
        Some(if self.same_sense { normal } else { -normal })
    }

    /// Outward normal of the face at the surface point nearest to `point`.
    #[must_use]
    pub fn normal_at(&self, point: &Point3) -> Vector3 {
        let normal = self.surface.as_surface().normal_at(point);
        if self.same_sense {
            normal
        } else {
            -normal
        }
    }
}
