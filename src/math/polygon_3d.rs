use crate::geometry::surface::Plane;

use super::polygon_2d::signed_area_2d;
use super::{Point2, Point3, Vector3, TOLERANCE};

/// Newell's method: the area vector of a closed 3D polygon.
///
/// The result points along the polygon normal (right-hand rule on the vertex
/// order) and its length is twice the enclosed area. Robust for concave and
/// slightly non-planar loops.
#[must_use]
fn newell_vector(points: &[Point3]) -> Vector3 {
    let n = points.len();
    let mut normal = Vector3::zeros();
    for i in 0..n {
        let curr = &points[i];
        let next = &points[(i + 1) % n];
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }
    normal
}

/// Unit normal of a closed 3D polygon, or `None` when it encloses no area.
#[must_use]
pub fn newell_normal(points: &[Point3]) -> Option<Vector3> {
    if points.len() < 3 {
        return None;
    }
    let normal = newell_vector(points);
    let len = normal.norm();
    (len > TOLERANCE).then(|| normal / len)
}

/// Projects 3D points onto the UV coordinate system of a plane.
#[must_use]
pub fn project_to_uv(points: &[Point3], plane: &Plane) -> Vec<Point2> {
    points.iter().map(|p| plane.to_uv(p)).collect()
}

/// Area centroid of a planar polygon lying in `plane`.
///
/// Falls back to the vertex average when the polygon encloses no area.
#[must_use]
pub fn polygon_centroid_3d(points: &[Point3], plane: &Plane) -> Point3 {
    let average = vertex_average(points);
    let uvs = project_to_uv(points, plane);
    let area = signed_area_2d(&uvs);
    if area.abs() < TOLERANCE {
        return average;
    }
    let n = uvs.len();
    let (mut cx, mut cy) = (0.0, 0.0);
    for i in 0..n {
        let a = uvs[i];
        let b = uvs[(i + 1) % n];
        let cross = a.x * b.y - b.x * a.y;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }
    let scale = 1.0 / (6.0 * area);
    plane.point_at(cx * scale, cy * scale)
}

/// Arithmetic mean of a point set (origin when empty).
#[must_use]
pub fn vertex_average(points: &[Point3]) -> Point3 {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    #[allow(clippy::cast_precision_loss)]
    let count = points.len() as f64;
    Point3::from(sum / count)
}
