use super::{Point3, Vector3, TOLERANCE};

/// A ray-triangle hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Ray parameter of the hit (`origin + t * dir`).
    pub t: f64,
    /// Barycentric coordinate along `b - a`.
    pub u: f64,
    /// Barycentric coordinate along `c - a`.
    pub v: f64,
}

impl RayHit {
    /// Returns `true` when the hit lies within `eps` of a triangle edge or
    /// vertex, where parity counting becomes unreliable.
    #[must_use]
    pub fn near_edge(&self, eps: f64) -> bool {
        self.u < eps || self.v < eps || self.u + self.v > 1.0 - eps
    }
}

/// Möller-Trumbore ray-triangle intersection.
///
/// Only hits with `t > TOLERANCE` are reported. Both triangle windings are
/// accepted.
#[must_use]
pub fn ray_triangle_intersect(
    origin: &Point3,
    dir: &Vector3,
    a: &Point3,
    b: &Point3,
    c: &Point3,
) -> Option<RayHit> {
    let e1 = b - a;
    let e2 = c - a;
    let h = dir.cross(&e2);
    let det = e1.dot(&h);
    if det.abs() < TOLERANCE * e1.norm() * e2.norm() {
        return None;
    }
    let inv = 1.0 / det;
    let s = origin - a;
    let u = inv * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(&e1);
    let v = inv * dir.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = inv * e2.dot(&q);
    (t > TOLERANCE).then_some(RayHit { t, u, v })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn v(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z)
    }

    // ── ray_triangle_intersect ──

    #[test]
    fn ray_hits_triangle_interior() {
        let hit = ray_triangle_intersect(
            &p(0.25, 0.25, -1.0),
            &v(0.0, 0.0, 1.0),
            &p(0.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(0.0, 1.0, 0.0),
        )
        .unwrap();
        assert!((hit.t - 1.0).abs() < 1e-12);
        assert!(!hit.near_edge(1e-6));
    }

    #[test]
    fn ray_misses_triangle() {
        let hit = ray_triangle_intersect(
            &p(2.0, 2.0, -1.0),
            &v(0.0, 0.0, 1.0),
            &p(0.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(0.0, 1.0, 0.0),
        );
        assert!(hit.is_none());
    }

    #[test]
    fn hits_behind_origin_are_ignored() {
        let hit = ray_triangle_intersect(
            &p(0.25, 0.25, 1.0),
            &v(0.0, 0.0, 1.0),
            &p(0.0, 0.0, 0.0),
            &p(1.0, 0.0, 0.0),
            &p(0.0, 1.0, 0.0),
        );
        assert!(hit.is_none());
    }
}
