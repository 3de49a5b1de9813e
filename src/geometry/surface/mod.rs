//! Surfaces carried by faces.

mod cylinder;
mod plane;

pub use cylinder::Cylinder;
pub use plane::Plane;

use crate::math::{Point2, Point3, Vector3};

/// A parametric surface a face can lie on.
///
/// `point_at` and `uv_of` invert each other on the surface.
pub trait Surface {
    /// Point at parameters `(u, v)`.
    fn point_at(&self, u: f64, v: f64) -> Point3;

    /// Parameters of the surface point nearest to `point`.
    fn uv_of(&self, point: &Point3) -> Point2;

    /// Unit normal, in the surface's own orientation, at the surface point
    /// nearest to `point`.
    fn normal_at(&self, point: &Point3) -> Vector3;
}
