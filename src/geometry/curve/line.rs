use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::Curve;

/// An unbounded straight line, parameterized by arc length from its origin.
#[derive(Debug, Clone)]
pub struct Line {
    origin: Point3,
    direction: Vector3,
}

impl Line {
    /// Creates the line through two points; `start` sits at `t = 0` and
    /// `end` at `t = |end - start|`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ZeroVector`] if the points coincide.
    pub fn through(start: Point3, end: Point3) -> Result<Self> {
        let span = end - start;
        let len = span.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self {
            origin: start,
            direction: span / len,
        })
    }

    /// Unit direction of increasing `t`.
    #[must_use]
    pub fn direction(&self) -> &Vector3 {
        &self.direction
    }
}

impl Curve for Line {
    fn point_at(&self, t: f64) -> Point3 {
        self.origin + self.direction * t
    }

    fn parameter_of(&self, point: &Point3) -> f64 {
        (point - self.origin).dot(&self.direction)
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
    fn through_points_is_arc_length_parameterized() {
        let line = Line::through(p(1.0, 0.0, 0.0), p(1.0, 4.0, 0.0)).unwrap();
        assert!((line.point_at(4.0) - p(1.0, 4.0, 0.0)).norm() < 1e-12);
        assert!((line.parameter_of(&p(7.0, 2.0, 0.0)) - 2.0).abs() < 1e-12);
        assert!((line.direction() - Vector3::y()).norm() < 1e-12);
    }

    #[test]
    fn distance_is_perpendicular() {
        let line = Line::through(p(0.0, 0.0, 0.0), p(0.0, 0.0, 2.0)).unwrap();
        assert!((line.distance_to(&p(3.0, 4.0, 9.0)) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn coincident_points_are_rejected() {
        let q = p(1.0, 1.0, 1.0);
        assert!(Line::through(q, q).is_err());
    }
}
