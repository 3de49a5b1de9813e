use crate::error::Result;
use crate::math::intersect_3d::ray_triangle_intersect;
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::tessellation::{TessellateSolid, TessellationParams, TriangleMesh};
use crate::topology::{SolidId, TopologyStore};

/// Classification of a point relative to a solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointClassification {
    Inside,
    Outside,
    OnBoundary,
}

/// Ray directions tried in turn. Off-axis first, as models tend to be
/// axis-aligned.
const RAY_DIRECTIONS: [[f64; 3]; 4] = [
    [0.577_215_664_9, 0.318_309_886_2, 0.751_826_0],
    [-0.267_949_192_4, 0.927_050_983_1, 0.262_865_556_1],
    [0.141_421_356_2, -0.316_227_766_0, 0.938_083_151_9],
    [1.0, 0.0, 0.0],
];

/// Classifies a point as inside, outside, or on the boundary of a solid.
///
/// Uses ray casting on the solid's tessellation: shoots a ray from the point
/// and counts triangle crossings. Odd crossings = inside, even = outside. If
/// the ray grazes a triangle edge, retries with another direction.
///
/// # Errors
///
/// Returns an error if the solid or its topology cannot be read.
pub fn classify_point_in_solid(
    point: &Point3,
    solid_id: SolidId,
    store: &TopologyStore,
) -> Result<PointClassification> {
    let mesh = TessellateSolid::new(solid_id, TessellationParams::default()).execute(store)?;
    Ok(classify_point_in_mesh(point, &mesh, TOLERANCE * 1e3))
}

/// Classifies a point against a closed triangle mesh.
///
/// Points closer than `boundary_tol` to any triangle are `OnBoundary`.
#[must_use]
pub fn classify_point_in_mesh(point: &Point3, mesh: &TriangleMesh, boundary_tol: f64) -> PointClassification {
    if mesh
        .triangles()
        .any(|tri| distance_to_triangle(point, &tri) <= boundary_tol)
    {
        return PointClassification::OnBoundary;
    }

    for dir in RAY_DIRECTIONS {
        let dir = Vector3::from(dir).normalize();
        if let RayCastResult::Clear(classification) = ray_cast_classify(point, &dir, mesh) {
            return classification;
        }
    }

    // Every direction grazed an edge; report outside.
    PointClassification::Outside
}

enum RayCastResult {
    Clear(PointClassification),
    Degenerate,
}

fn ray_cast_classify(point: &Point3, dir: &Vector3, mesh: &TriangleMesh) -> RayCastResult {
    let mut crossings = 0u32;
    for [a, b, c] in mesh.triangles() {
        let Some(hit) = ray_triangle_intersect(point, dir, &a, &b, &c) else {
            continue;
        };
        if hit.near_edge(1e-9) {
            return RayCastResult::Degenerate;
        }
        crossings += 1;
    }

    if crossings % 2 == 1 {
        RayCastResult::Clear(PointClassification::Inside)
    } else {
        RayCastResult::Clear(PointClassification::Outside)
    }
}

/// Euclidean distance from `p` to the closed triangle `tri`.
fn distance_to_triangle(p: &Point3, tri: &[Point3; 3]) -> f64 {
    let [a, b, c] = tri;
    let normal = (b - a).cross(&(c - a));
    let len = normal.norm();
    if len > TOLERANCE {
        let n = normal / len;
        let dist = (p - a).dot(&n);
        let q = p - n * dist;
        let inside = [(a, b), (b, c), (c, a)]
            .iter()
            .all(|(s, e)| (*e - *s).cross(&(q - *s)).dot(&n) >= 0.0);
        if inside {
            return dist.abs();
        }
    }
    [(a, b), (b, c), (c, a)]
        .iter()
        .map(|(s, e)| distance_to_segment(p, s, e))
        .fold(f64::INFINITY, f64::min)
}

fn distance_to_segment(p: &Point3, a: &Point3, b: &Point3) -> f64 {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < TOLERANCE * TOLERANCE {
        return (p - a).norm();
    }
    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    (p - (a + ab * t)).norm()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::creation::{MakeFace, MakeWire};
    use crate::operations::shaping::Extrude;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn make_box(store: &mut TopologyStore) -> SolidId {
        let pts = vec![p(0.0, 0.0, 0.0), p(2.0, 0.0, 0.0), p(2.0, 2.0, 0.0), p(0.0, 2.0, 0.0)];
        let wire = MakeWire::new(pts, true).execute(store).unwrap();
        let face = MakeFace::new(wire, vec![]).execute(store).unwrap();
        Extrude::new(face, Vector3::new(0.0, 0.0, 2.0))
            .execute(store)
            .unwrap()
    }

    #[test]
    fn center_is_inside() {
        let mut store = TopologyStore::new();
        let solid = make_box(&mut store);
        let result = classify_point_in_solid(&p(1.0, 1.0, 1.0), solid, &store).unwrap();
        assert_eq!(result, PointClassification::Inside);
    }

    #[test]
    fn far_point_is_outside() {
        let mut store = TopologyStore::new();
        let solid = make_box(&mut store);
        let result = classify_point_in_solid(&p(10.0, 10.0, 10.0), solid, &store).unwrap();
        assert_eq!(result, PointClassification::Outside);
    }

    #[test]
    fn point_near_face_is_outside() {
        let mut store = TopologyStore::new();
        let solid = make_box(&mut store);
        let result = classify_point_in_solid(&p(1.0, 1.0, -1.0), solid, &store).unwrap();
        assert_eq!(result, PointClassification::Outside);
    }

    #[test]
    fn point_on_face_is_boundary() {
        let mut store = TopologyStore::new();
        let solid = make_box(&mut store);
        let result = classify_point_in_solid(&p(1.0, 1.0, 0.0), solid, &store).unwrap();
        assert_eq!(result, PointClassification::OnBoundary);
    }

    #[test]
    fn point_just_inside() {
        let mut store = TopologyStore::new();
        let solid = make_box(&mut store);
        let result = classify_point_in_solid(&p(0.001, 0.001, 0.001), solid, &store).unwrap();
        assert_eq!(result, PointClassification::Inside);
    }

    #[test]
    fn distance_to_triangle_regions() {
        let tri = [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)];
        assert!((distance_to_triangle(&p(0.2, 0.2, 3.0), &tri) - 3.0).abs() < 1e-12);
        assert!((distance_to_triangle(&p(2.0, 0.0, 0.0), &tri) - 1.0).abs() < 1e-12);
    }
}
