use std::f64::consts::TAU;

use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::Curve;

/// A circle in 3D.
///
/// `P(t) = center + radius * (cos t * x_axis + sin t * y_axis)` with
/// `y_axis = axis × x_axis`, so `t` grows counter-clockwise about `axis`.
#[derive(Debug, Clone)]
pub struct Circle {
    center: Point3,
    radius: f64,
    axis: Vector3,
    x_axis: Vector3,
}

impl Circle {
    /// Creates a circle from its placement.
    ///
    /// `ref_dir` fixes `t = 0`; its component along the axis is dropped, so
    /// slightly skewed placements from exchange files are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Degenerate`] for a radius that is not
    /// positive or a reference direction parallel to the axis, and
    /// [`GeometryError::ZeroVector`] for a zero axis.
    pub fn new(center: Point3, radius: f64, axis: Vector3, ref_dir: Vector3) -> Result<Self> {
        if radius.is_nan() || radius < TOLERANCE {
            return Err(GeometryError::Degenerate(format!("circle radius {radius}")).into());
        }
        let axis = axis
            .try_normalize(TOLERANCE)
            .ok_or(GeometryError::ZeroVector)?;
        let x_axis = (ref_dir - axis * ref_dir.dot(&axis))
            .try_normalize(TOLERANCE)
            .ok_or_else(|| {
                GeometryError::Degenerate("circle reference direction is parallel to its axis".into())
            })?;
        Ok(Self {
            center,
            radius,
            axis,
            x_axis,
        })
    }

    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Unit normal of the circle plane.
    #[must_use]
    pub fn axis(&self) -> &Vector3 {
        &self.axis
    }

    fn y_axis(&self) -> Vector3 {
        self.axis.cross(&self.x_axis)
    }

    /// Parameters `(t_start, t_end)` of the arc from `start` to `end`.
    ///
    /// The arc turns counter-clockwise about the axis when `ccw` is set, so
    /// `t_end - t_start` is positive, and clockwise otherwise. Without an
    /// `end` the arc is the full turn beginning at `start`.
    #[must_use]
    pub fn arc(&self, start: &Point3, end: Option<&Point3>, ccw: bool) -> (f64, f64) {
        let t_start = self.parameter_of(start);
        let t_end = end.map_or(t_start, |end| self.parameter_of(end));
        let sweep = (t_end - t_start).rem_euclid(TAU);
        let sweep = if ccw {
            if sweep <= TOLERANCE { TAU } else { sweep }
        } else if sweep >= TAU - TOLERANCE || sweep <= TOLERANCE {
            -TAU
        } else {
            sweep - TAU
        };
        (t_start, t_start + sweep)
    }
}

impl Curve for Circle {
    fn point_at(&self, t: f64) -> Point3 {
        self.center + (self.x_axis * t.cos() + self.y_axis() * t.sin()) * self.radius
    }

    /// Angle in `[0, 2π)` of the projection of `point` into the circle
    /// plane.
    fn parameter_of(&self, point: &Point3) -> f64 {
        let d = point - self.center;
        d.dot(&self.y_axis()).atan2(d.dot(&self.x_axis)).rem_euclid(TAU)
    }
}
