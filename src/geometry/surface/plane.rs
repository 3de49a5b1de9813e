use crate::error::{GeometryError, Result};
use crate::math::{Point2, Point3, Vector3, TOLERANCE};

use super::Surface;

/// An infinite plane in 3D space.
///
/// Defined by an origin point and an orthonormal frame (`u_dir`, `v_dir`,
/// `normal`) with `normal = u_dir × v_dir`.
///
/// Parametric form: `P(u, v) = origin + u * u_dir + v * v_dir`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plane {
    origin: Point3,
    u_dir: Vector3,
    v_dir: Vector3,
    normal: Vector3,
}

impl Plane {
    /// Creates a new plane from an origin and two direction vectors.
    ///
    /// `v_dir` only selects the side of the normal; it is re-orthogonalized
    /// against `u_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the direction vectors are zero-length
    /// or parallel (degenerate plane).
    pub fn new(origin: Point3, u_dir: Vector3, v_dir: Vector3) -> Result<Self> {
        let u_len = u_dir.norm();
        if u_len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        if v_dir.norm() < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }

        let u_dir = u_dir / u_len;
        let normal = u_dir.cross(&v_dir);
        let normal_len = normal.norm();
        if normal_len < TOLERANCE {
            return Err(GeometryError::Degenerate("plane directions are parallel".into()).into());
        }
        let normal = normal / normal_len;
        let v_dir = normal.cross(&u_dir);

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
        })
    }

    /// Creates a plane from an origin and a normal vector.
    ///
    /// The U and V directions are computed automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_normal(origin: Point3, normal: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;

        // Choose a reference vector not parallel to the normal
        let reference = if normal.x.abs() < 0.9 {
            Vector3::new(1.0, 0.0, 0.0)
        } else {
            Vector3::new(0.0, 1.0, 0.0)
        };

        let u_dir = normal.cross(&reference).normalize();
        let v_dir = normal.cross(&u_dir);

        Ok(Self {
            origin,
            u_dir,
            v_dir,
            normal,
        })
    }

    /// Creates a plane from an origin, a normal and a reference direction for
    /// `u`, as STEP `AXIS2_PLACEMENT_3D` does.
    ///
    /// The reference is projected into the plane; if it is parallel to the
    /// normal, an arbitrary in-plane direction is used instead.
    ///
    /// # Errors
    ///
    /// Returns an error if the normal vector is zero-length.
    pub fn from_normal_and_ref(origin: Point3, normal: Vector3, ref_dir: Vector3) -> Result<Self> {
        let len = normal.norm();
        if len < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let normal = normal / len;
        let projected = ref_dir - normal * ref_dir.dot(&normal);
        if projected.norm() < TOLERANCE {
            return Self::from_normal(origin, normal);
        }
        let u_dir = projected.normalize();
        Ok(Self {
            origin,
            u_dir,
            v_dir: normal.cross(&u_dir),
            normal,
        })
    }

    /// Returns the origin point of the plane.
    #[must_use]
    pub fn origin(&self) -> &Point3 {
        &self.origin
    }

    /// Returns the U direction vector.
    #[must_use]
    pub fn u_dir(&self) -> &Vector3 {
        &self.u_dir
    }

    /// Returns the V direction vector.
    #[must_use]
    pub fn v_dir(&self) -> &Vector3 {
        &self.v_dir
    }

    /// Returns the normal vector of the plane.
    #[must_use]
    pub fn plane_normal(&self) -> &Vector3 {
        &self.normal
    }

    /// Signed distance of `point` along the normal.
    #[must_use]
    pub fn signed_distance(&self, point: &Point3) -> f64 {
        (point - self.origin).dot(&self.normal)
    }

    /// Orthogonal projection of `point` onto the plane.
    #[must_use]
    pub fn project_point(&self, point: &Point3) -> Point3 {
        point - self.normal * self.signed_distance(point)
    }

    /// Plane coordinates of `point` (its projection, expressed in `u`/`v`).
    #[must_use]
    pub fn to_uv(&self, point: &Point3) -> Point2 {
        let diff = point - self.origin;
        Point2::new(diff.dot(&self.u_dir), diff.dot(&self.v_dir))
    }

    /// The 3D point at plane coordinates `(u, v)`.
    #[must_use]
    pub fn point_at(&self, u: f64, v: f64) -> Point3 {
        self.origin + self.u_dir * u + self.v_dir * v
    }
}

impl Surface for Plane {
    fn point_at(&self, u: f64, v: f64) -> Point3 {
        Plane::point_at(self, u, v)
    }

    fn uv_of(&self, point: &Point3) -> Point2 {
        self.to_uv(point)
    }

    fn normal_at(&self, _point: &Point3) -> Vector3 {
        self.normal
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
    fn new_orthogonalizes_v() {
        let plane = Plane::new(p(0.0, 0.0, 0.0), Vector3::x(), Vector3::new(1.0, 1.0, 0.0)).unwrap();
        assert!(plane.u_dir().dot(plane.v_dir()).abs() < TOLERANCE);
        assert!((plane.plane_normal() - Vector3::z()).norm() < TOLERANCE);
    }

    #[test]
    fn parallel_directions_are_rejected() {
        assert!(Plane::new(p(0.0, 0.0, 0.0), Vector3::x(), Vector3::x() * 2.0).is_err());
    }

    #[test]
    fn frame_is_right_handed() {
        let plane = Plane::from_normal(p(1.0, 2.0, 3.0), Vector3::new(1.0, 1.0, 1.0)).unwrap();
        let n = plane.u_dir().cross(plane.v_dir());
        assert!((n - plane.plane_normal()).norm() < 1e-12);
    }

    #[test]
    fn reference_direction_becomes_u() {
        let plane =
            Plane::from_normal_and_ref(p(0.0, 0.0, 0.0), Vector3::z(), Vector3::new(0.0, 2.0, 0.5))
                .unwrap();
        assert!((plane.u_dir() - Vector3::y()).norm() < 1e-12);
        assert!((plane.v_dir() + Vector3::x()).norm() < 1e-12);
    }

    #[test]
    fn projection_lands_on_plane() {
        let plane = Plane::from_normal(p(0.0, 0.0, 2.0), Vector3::z()).unwrap();
        let q = plane.project_point(&p(3.0, -1.0, 7.0));
        assert!((q - p(3.0, -1.0, 2.0)).norm() < 1e-12);
        assert!((plane.signed_distance(&p(0.0, 0.0, 7.0)) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn uv_roundtrip() {
        let plane = Plane::from_normal(p(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 1.0)).unwrap();
        let q = plane.point_at(2.5, -1.5);
        let uv = plane.to_uv(&q);
        assert!((uv.x - 2.5).abs() < 1e-12);
        assert!((uv.y + 1.5).abs() < 1e-12);
    }
}
