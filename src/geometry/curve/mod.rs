//! Curves carried by edges.

mod circle;
mod line;

pub use circle::Circle;
pub use line::Line;

use crate::math::Point3;

/// A parametric curve an edge can run along.
///
/// `point_at` and `parameter_of` invert each other on the curve. Off the
/// curve, `parameter_of` gives the parameter of the nearest curve point.
pub trait Curve {
    /// Point at parameter `t`.
    fn point_at(&self, t: f64) -> Point3;

    /// Parameter of the curve point nearest to `point`.
    fn parameter_of(&self, point: &Point3) -> f64;

    /// Distance from `point` to the curve.
    fn distance_to(&self, point: &Point3) -> f64 {
        (self.point_at(self.parameter_of(point)) - point).norm()
    }
}
