use std::collections::{HashSet, VecDeque};
use std::f64::consts::{PI, TAU};

use spade::handles::{FixedFaceHandle, InnerTag};
use spade::{ConstrainedDelaunayTriangulation, Point2 as SpadePoint2, Triangulation};

use crate::error::{Result, TessellationError};
use crate::geometry::surface::{Cylinder, Plane, Surface};
use crate::math::{Point2, Point3};
use crate::topology::{EdgeCurve, FaceData, FaceId, FaceSurface, TopologyStore, WireId};

use super::tessellate_curve::wire_polyline;
use super::{TessellationParams, TriangleMesh};

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Tessellates a face into a triangle mesh.
///
/// Triangles are wound so that their geometric normal is the face's outward
/// normal (the surface normal, reversed when the face is not `same_sense`).
pub struct TessellateFace {
    face: FaceId,
    params: TessellationParams,
}

impl TessellateFace {
    /// Creates a new `TessellateFace` operation.
    #[must_use]
    pub fn new(face: FaceId, params: TessellationParams) -> Self {
        Self { face, params }
    }

    /// Executes the tessellation, returning a triangle mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if a boundary wire is open or self-crossing, or the
    /// face spans no area.
    pub fn execute(&self, store: &TopologyStore) -> Result<TriangleMesh> {
        let face = store.face(self.face)?;
        match &face.surface {
            FaceSurface::Plane(plane) => tessellate_plane(store, plane, face, &self.params),
            FaceSurface::Cylinder(cyl) => tessellate_cylinder(store, cyl, face, &self.params),
        }
    }
}

/// Constrained Delaunay triangulation of the boundary loops in plane
/// coordinates, keeping the triangles enclosed by the loops.
#[allow(clippy::cast_possible_truncation)]
fn tessellate_plane(
    store: &TopologyStore,
    plane: &Plane,
    face: &FaceData,
    params: &TessellationParams,
) -> Result<TriangleMesh> {
    let mut cdt = Cdt::new();
    for &wire in std::iter::once(&face.outer_wire).chain(&face.inner_wires) {
        let uvs: Vec<Point2> = wire_polyline(store, wire, params)?
            .iter()
            .map(|p| plane.to_uv(p))
            .collect();
        add_loop(&mut cdt, &uvs)?;
    }

    let normal = face.normal_at(plane.origin());
    let mut mesh = TriangleMesh::default();
    let mut remap: Vec<Option<u32>> = vec![None; cdt.num_vertices()];
    for fixed in enclosed_faces(&cdt) {
        let mut triangle = cdt.face(fixed).vertices().map(|vertex| {
            *remap[vertex.fix().index()].get_or_insert_with(|| {
                let uv = vertex.position();
                mesh.vertices.push(plane.point_at(uv.x, uv.y));
                mesh.normals.push(normal);
                mesh.uvs.push(Point2::new(uv.x, uv.y));
                (mesh.vertices.len() - 1) as u32
            })
        });
        // Spade winds faces counter-clockwise in (u, v), i.e. around +normal.
        if !face.same_sense {
            triangle.swap(1, 2);
        }
        mesh.indices.push(triangle);
    }
    Ok(mesh)
}

/// Inserts a closed loop as constraint edges.
fn add_loop(cdt: &mut Cdt, uvs: &[Point2]) -> Result<()> {
    if uvs.len() < 3 {
        return Err(TessellationError::Failed(format!(
            "boundary loop has {} points",
            uvs.len()
        ))
        .into());
    }
    let handles = uvs
        .iter()
        .map(|uv| cdt.insert(SpadePoint2::new(uv.x, uv.y)))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| TessellationError::Failed(format!("boundary point rejected: {e}")))?;

    for (i, &from) in handles.iter().enumerate() {
        let to = handles[(i + 1) % handles.len()];
        if from == to {
            continue;
        }
        if !cdt.can_add_constraint(from, to) {
            return Err(TessellationError::Failed("boundary loops cross each other".into()).into());
        }
        cdt.add_constraint(from, to);
    }
    Ok(())
}

/// Faces of the triangulation enclosed by its constraint loops.
///
/// Faces are flooded inward from the convex hull; crossing a constraint
/// edge toggles between outside and inside.
fn enclosed_faces(cdt: &Cdt) -> Vec<FixedFaceHandle<InnerTag>> {
    let outer = cdt.outer_face().fix();
    let mut seen: HashSet<usize> = HashSet::new();
    let mut queue = VecDeque::new();
    let mut enclosed_faces = Vec::new();

    for edge in cdt.directed_edges().filter(|e| e.face().fix() == outer) {
        if let Some(face) = edge.rev().face().as_inner() {
            if seen.insert(face.fix().index()) {
                let enclosed = cdt.is_constraint_edge(edge.as_undirected().fix());
                queue.push_back((face.fix(), enclosed));
            }
        }
    }

    while let Some((fixed, enclosed)) = queue.pop_front() {
        if enclosed {
            enclosed_faces.push(fixed);
        }
        for edge in cdt.face(fixed).adjacent_edges() {
            let Some(next) = edge.rev().face().as_inner() else {
                continue;
            };
            if seen.insert(next.fix().index()) {
                let toggled = enclosed != cdt.is_constraint_edge(edge.as_undirected().fix());
                queue.push_back((next.fix(), toggled));
            }
        }
    }

    enclosed_faces.sort_unstable_by_key(|face| face.index());
    enclosed_faces
}

/// A strip of quads spanning the angular and axial extent of the boundary.
///
/// A wire carrying a full circle makes the strip a full turn. Cylinders
/// are straight along the axis, so a single row of quads is exact there.
fn tessellate_cylinder(
    store: &TopologyStore,
    cyl: &Cylinder,
    face: &FaceData,
    params: &TessellationParams,
) -> Result<TriangleMesh> {
    let outer = wire_polyline(store, face.outer_wire, params)?;
    let mut boundary = outer.clone();
    for &wire in &face.inner_wires {
        boundary.extend(wire_polyline(store, wire, params)?);
    }
    let Some(first) = outer.first() else {
        return Err(TessellationError::Failed("cylindrical face has an empty boundary".into()).into());
    };

    let (v_min, v_max) = boundary
        .iter()
        .map(|p| cyl.uv_of(p).y)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let full_turn = std::iter::once(&face.outer_wire)
        .chain(&face.inner_wires)
        .any(|&wire| has_full_circle(store, wire));
    let (u_min, u_max) = if full_turn {
        let start = cyl.uv_of(first).x;
        (start, start + TAU)
    } else {
        unwrapped_range(outer.iter().map(|p| cyl.uv_of(p).x))
    };

    if u_max - u_min < f64::EPSILON || v_max - v_min < f64::EPSILON {
        return Err(TessellationError::Failed("cylindrical face spans no area".into()).into());
    }
    let segments = params.arc_segments(cyl.radius(), u_max - u_min);
    Ok(ruled_strip(cyl, (u_min, u_max), (v_min, v_max), segments, face.same_sense))
}

/// Two rows of `segments + 1` surface points joined by quads.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn ruled_strip(
    surface: &dyn Surface,
    (u_min, u_max): (f64, f64),
    (v_min, v_max): (f64, f64),
    segments: usize,
    same_sense: bool,
) -> TriangleMesh {
    let mut mesh = TriangleMesh::default();
    for v in [v_min, v_max] {
        for i in 0..=segments {
            let u = u_min + (u_max - u_min) * i as f64 / segments as f64;
            let point = surface.point_at(u, v);
            let normal = surface.normal_at(&point);
            mesh.vertices.push(point);
            mesh.normals.push(if same_sense { normal } else { -normal });
            mesh.uvs.push(Point2::new(u, v));
        }
    }

    let row = (segments + 1) as u32;
    for i in 0..segments as u32 {
        let (a, b, c, d) = (i, i + 1, row + i + 1, row + i);
        if same_sense {
            mesh.indices.extend([[a, b, c], [a, c, d]]);
        } else {
            mesh.indices.extend([[a, c, b], [a, d, c]]);
        }
    }
    mesh
}

/// `true` if the wire holds a circular edge sweeping a full turn.
fn has_full_circle(store: &TopologyStore, wire: WireId) -> bool {
    store.wire(wire).is_ok_and(|wire| {
        wire.edges.iter().any(|oe| {
            store.edge(oe.edge).is_ok_and(|edge| {
                matches!(edge.curve, EdgeCurve::Circle(_))
                    && (edge.t_end - edge.t_start).abs() > TAU - 1e-6
            })
        })
    })
}

/// Range of a sequence of angles in `(-π, π]`, unwrapped across the seam so
/// that sweeps longer than π are measured correctly.
fn unwrapped_range(angles: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let mut angles = angles.into_iter();
    let Some(first) = angles.next() else {
        return (0.0, 0.0);
    };
    let (mut lo, mut hi, mut running, mut previous) = (first, first, first, first);
    for angle in angles {
        let mut delta = angle - previous;
        if delta > PI {
            delta -= TAU;
        } else if delta < -PI {
            delta += TAU;
        }
        running += delta;
        lo = lo.min(running);
        hi = hi.max(running);
        previous = angle;
    }
    (lo, hi)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Vector3;
    use crate::operations::creation::{MakeFace, MakeWire};

    fn p(x: f64, y: f64) -> Point3 {
        Point3::new(x, y, 0.0)
    }

    fn planar_face(store: &mut TopologyStore, points: Vec<Point3>) -> FaceId {
        let wire = MakeWire::new(points, true).execute(store).unwrap();
        MakeFace::new(wire, vec![]).execute(store).unwrap()
    }

    fn tessellate(store: &TopologyStore, face: FaceId) -> TriangleMesh {
        TessellateFace::new(face, TessellationParams::default())
            .execute(store)
            .unwrap()
    }

    fn area(mesh: &TriangleMesh) -> f64 {
        mesh.triangles()
            .map(|t| (t[1] - t[0]).cross(&(t[2] - t[0])).norm() * 0.5)
            .sum()
    }

    // ── planar faces ──

    #[test]
    fn triangle_stays_one_triangle() {
        let mut store = TopologyStore::new();
        let face = planar_face(&mut store, vec![p(0.0, 0.0), p(4.0, 0.0), p(2.0, 3.0)]);
        let mesh = tessellate(&store, face);
        assert_eq!(mesh.indices.len(), 1);
        assert_eq!(mesh.normals.len(), 3);
        assert_eq!(mesh.uvs.len(), 3);
    }

    #[test]
    fn concave_outline_keeps_its_notch() {
        let mut store = TopologyStore::new();
        let face = planar_face(
            &mut store,
            vec![p(0.0, 0.0), p(4.0, 0.0), p(4.0, 2.0), p(2.0, 2.0), p(2.0, 4.0), p(0.0, 4.0)],
        );
        let mesh = tessellate(&store, face);
        assert_eq!(mesh.indices.len(), 4);
        assert!((area(&mesh) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn clockwise_face_points_down() {
        let mut store = TopologyStore::new();
        let face = planar_face(&mut store, vec![p(0.0, 0.0), p(0.0, 3.0), p(3.0, 3.0), p(3.0, 0.0)]);
        let mesh = tessellate(&store, face);
        for t in mesh.triangles() {
            assert!((t[1] - t[0]).cross(&(t[2] - t[0])).z < 0.0);
        }
        assert!(mesh.normals.iter().all(|n| n.z < 0.0));
    }

    #[test]
    fn hole_is_left_open() {
        let mut store = TopologyStore::new();
        let outer = MakeWire::new(vec![p(0.0, 0.0), p(4.0, 0.0), p(4.0, 4.0), p(0.0, 4.0)], true)
            .execute(&mut store)
            .unwrap();
        let hole = MakeWire::new(vec![p(1.0, 1.0), p(1.0, 3.0), p(3.0, 3.0), p(3.0, 1.0)], true)
            .execute(&mut store)
            .unwrap();
        let face = MakeFace::new(outer, vec![hole]).execute(&mut store).unwrap();
        assert!((area(&tessellate(&store, face)) - 12.0).abs() < 1e-9);
    }

    // ── cylindrical faces ──

    #[test]
    fn strip_follows_surface_orientation() {
        let cyl = Cylinder::new(Point3::origin(), 2.0, Vector3::z(), Vector3::x()).unwrap();
        for same_sense in [true, false] {
            let mesh = ruled_strip(&cyl, (0.0, TAU), (0.0, 3.0), 16, same_sense);
            assert_eq!(mesh.indices.len(), 32);
            for (t, [a, ..]) in mesh.triangles().zip(&mesh.indices) {
                let geometric = (t[1] - t[0]).cross(&(t[2] - t[0]));
                assert!(geometric.dot(&mesh.normals[*a as usize]) > 0.0);
            }
        }
    }

    #[test]
    fn unwrapping_crosses_the_seam() {
        let angles = [170.0_f64, -170.0, -150.0].map(f64::to_radians);
        let (lo, hi) = unwrapped_range(angles);
        assert!((hi - lo - 40.0_f64.to_radians()).abs() < 1e-9);
    }
}
