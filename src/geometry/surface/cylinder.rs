use crate::error::{GeometryError, Result};
use crate::math::{Point2, Point3, Vector3, TOLERANCE};

use super::Surface;

/// An unbounded circular cylinder.
///
/// `P(u, v) = origin + radius * (cos u * x_axis + sin u * y_axis) + v * axis`
/// with `y_axis = axis × x_axis`. The normal points away from the axis.
#[derive(Debug, Clone)]
pub struct Cylinder {
    origin: Point3,
    radius: f64,
    axis: Vector3,
    x_axis: Vector3,
}

impl Cylinder {
    /// Creates a cylinder from its placement; `ref_dir` fixes `u = 0` and
    /// its component along the axis is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] for a radius that is not
    /// positive or a reference direction parallel to the axis, and
    /// [`GeometryError::ZeroVector`] for a zero axis.
    pub fn new(origin: Point3, radius: f64, axis: Vector3, ref_dir: Vector3) -> Result<Self> {
        if radius.is_nan() || radius < TOLERANCE {
            return Err(GeometryError::Degenerate(format!("cylinder radius {radius}")).into());
        }
        let axis = axis
            .try_normalize(TOLERANCE)
            .ok_or(GeometryError::ZeroVector)?;
        let x_axis = (ref_dir - axis * ref_dir.dot(&axis))
            .try_normalize(TOLERANCE)
            .ok_or_else(|| {
                GeometryError::Degenerate("cylinder reference direction is parallel to its axis".into())
            })?;
        Ok(Self {
            origin,
            radius,
            axis,
            x_axis,
        })
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Unit axis direction, the direction of increasing `v`.
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    fn y_axis(&self) -> Vector3 {
        self.axis.cross(&self.x_axis)
    }
}

impl Surface for Cylinder {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        let radial = self.x_axis * u.cos() + self.y_axis() * u.sin();
        self.origin + radial * self.radius + self.axis * v
    }

    /// `u` in `(-π, π]`, `v` the signed height along the axis.
    fn uv_of(&self, point: &Point3) -> Point2 {
        let d = point - self.origin;
        Point2::new(d.dot(&self.y_axis()).atan2(d.dot(&self.x_axis)), d.dot(&self.axis))
    }

    fn normal_at(&self, point: &Point3) -> Vector3 {
        let d = point - self.origin;
        (d - self.axis * d.dot(&self.axis))
            .try_normalize(TOLERANCE)
            .unwrap_or(self.x_axis)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn z_cylinder(radius: f64) -> Cylinder {
        Cylinder::new(Point3::origin(), radius, Vector3::z(), Vector3::x()).unwrap()
    }

    #[test]
    fn point_at_follows_angle_and_height() {
        let c = z_cylinder(2.0);
        assert!((c.point_at(0.0, 0.0) - p(2.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((c.point_at(FRAC_PI_2, 5.0) - p(0.0, 2.0, 5.0)).norm() < 1e-12);
    }

    #[test]
    fn uv_of_inverts_point_at() {
        let c = z_cylinder(2.0);
        for (u, v) in [(0.0, 0.0), (FRAC_PI_2, 3.0), (1.0, -2.5), (-2.0, 1.0)] {
            let uv = c.uv_of(&c.point_at(u, v));
            assert!((uv.x - u).abs() < 1e-9 && (uv.y - v).abs() < 1e-9, "u={u}, v={v}");
        }
    }

    #[test]
    fn normal_points_away_from_axis() {
        let c = z_cylinder(1.0);
        assert!((c.normal_at(&p(3.0, 0.0, 7.0)) - Vector3::x()).norm() < 1e-12);
        assert!((c.normal_at(&p(0.0, 0.5, -1.0)) - Vector3::y()).norm() < 1e-12);
    }

    #[test]
    fn skewed_reference_is_orthogonalized() {
        let c = Cylinder::new(Point3::origin(), 1.0, Vector3::z(), Vector3::new(1.0, 0.0, 1.0)).unwrap();
        assert!((c.point_at(0.0, 0.0) - p(1.0, 0.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn degenerate_placements_are_rejected() {
        assert!(Cylinder::new(Point3::origin(), 0.0, Vector3::z(), Vector3::x()).is_err());
        assert!(Cylinder::new(Point3::origin(), 1.0, Vector3::z(), Vector3::z()).is_err());
    }
}
