use std::collections::HashMap;

use crate::error::{OperationError, Result};
use crate::math::polygon_3d::newell_normal;
use crate::math::Point3;
use crate::operations::creation::{MakeFace, MakeSolid};
use crate::topology::{
    EdgeData, EdgeId, FaceId, OrientedEdge, ShellData, SolidId, TopologyStore, VertexData,
    VertexId, WireData,
};

use super::bsp::Polygon;

/// Distance within which boolean output vertices are welded.
const WELD_TOLERANCE: f64 = 1e-7;

/// Assembles a solid from the polygons of a boolean result.
///
/// Each polygon becomes one planar face. Coincident vertices are merged
/// through a spatial hash; polygons that collapse under welding are dropped.
pub(super) fn assemble_polygons(store: &mut TopologyStore, polygons: &[Polygon]) -> Result<SolidId> {
    let mut merger = VertexMerger::new(WELD_TOLERANCE);
    let mut faces: Vec<FaceId> = Vec::with_capacity(polygons.len());

    for polygon in polygons {
        if let Some(face) = create_face_from_polygon(store, &polygon.vertices, &mut merger)? {
            faces.push(face);
        }
    }

    if faces.is_empty() {
        return Err(OperationError::EmptyResult.into());
    }

    let shell = store.add_shell(ShellData::closed(faces));
    MakeSolid::new(shell, vec![]).execute(store)
}

/// Creates a face from a polygon boundary, reusing merged vertices.
///
/// Returns `None` when fewer than three distinct vertices survive welding
/// or the welded loop encloses no area.
fn create_face_from_polygon(
    store: &mut TopologyStore,
    boundary: &[Point3],
    merger: &mut VertexMerger,
) -> Result<Option<FaceId>> {
    let mut loop_ids: Vec<(VertexId, Point3)> = Vec::with_capacity(boundary.len());
    for p in boundary {
        let (vid, point) = merger.get_or_create(store, p);
        if loop_ids.last().is_some_and(|&(last, _)| last == vid) {
            continue;
        }
        loop_ids.push((vid, point));
    }
    while loop_ids.len() > 1 && loop_ids.first().map(|e| e.0) == loop_ids.last().map(|e| e.0) {
        loop_ids.pop();
    }
    if loop_ids.len() < 3 {
        return Ok(None);
    }
    let welded: Vec<Point3> = loop_ids.iter().map(|&(_, point)| point).collect();
    if newell_normal(&welded).is_none() {
        return Ok(None);
    }

    let n = loop_ids.len();
    let mut oriented_edges = Vec::with_capacity(n);
    for i in 0..n {
        let (start, start_pt) = loop_ids[i];
        let (end, end_pt) = loop_ids[(i + 1) % n];
        let edge_id = create_line_edge(store, start, end, start_pt, end_pt)?;
        oriented_edges.push(OrientedEdge::new(edge_id, true));
    }

    let wire = store.add_wire(WireData::closed(oriented_edges));
    Ok(Some(MakeFace::new(wire, vec![]).execute(store)?))
}

/// Creates a line edge between two vertices.
fn create_line_edge(
    store: &mut TopologyStore,
    start: VertexId,
    end: VertexId,
    start_point: Point3,
    end_point: Point3,
) -> Result<EdgeId> {
    let data = EdgeData::line(start, end, start_point, end_point)?;
    Ok(store.add_edge(data))
}

/// Spatial hash-based vertex merger.
///
/// Groups points by grid cell and merges vertices that are within
/// `cell_size` of each other.
struct VertexMerger {
    cell_size: f64,
    map: HashMap<(i64, i64, i64), Vec<(VertexId, Point3)>>,
}

impl VertexMerger {
    fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            map: HashMap::new(),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell_key(&self, p: &Point3) -> (i64, i64, i64) {
        let inv = 1.0 / self.cell_size;
        (
            (p.x * inv).floor() as i64,
            (p.y * inv).floor() as i64,
            (p.z * inv).floor() as i64,
        )
    }

    /// Returns the welded vertex for `point` and its stored position.
    fn get_or_create(&mut self, store: &mut TopologyStore, point: &Point3) -> (VertexId, Point3) {
        let key = self.cell_key(point);

        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let neighbor = (key.0 + dx, key.1 + dy, key.2 + dz);
                    if let Some(entries) = self.map.get(&neighbor) {
                        for &(vid, existing) in entries {
                            if (point - existing).norm() < self.cell_size {
                                return (vid, existing);
                            }
                        }
                    }
                }
            }
        }

        let vid = store.add_vertex(VertexData::new(*point));
        self.map.entry(key).or_default().push((vid, *point));
        (vid, *point)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::query::Volume;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn quad(points: [Point3; 4]) -> Polygon {
        Polygon::new(points.to_vec()).unwrap()
    }

    fn unit_cube() -> Vec<Polygon> {
        vec![
            quad([p(0.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(1.0, 1.0, 0.0), p(1.0, 0.0, 0.0)]),
            quad([p(0.0, 0.0, 1.0), p(1.0, 0.0, 1.0), p(1.0, 1.0, 1.0), p(0.0, 1.0, 1.0)]),
            quad([p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 0.0, 1.0), p(0.0, 0.0, 1.0)]),
            quad([p(0.0, 1.0, 0.0), p(0.0, 1.0, 1.0), p(1.0, 1.0, 1.0), p(1.0, 1.0, 0.0)]),
            quad([p(0.0, 0.0, 0.0), p(0.0, 0.0, 1.0), p(0.0, 1.0, 1.0), p(0.0, 1.0, 0.0)]),
            quad([p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(1.0, 1.0, 1.0), p(1.0, 0.0, 1.0)]),
        ]
    }

    #[test]
    fn assemble_cube_welds_vertices() {
        let mut store = TopologyStore::new();
        let solid = assemble_polygons(&mut store, &unit_cube()).unwrap();
        assert_eq!(store.solid_faces(solid).unwrap().len(), 6);
        let volume = Volume::new(solid).execute(&store).unwrap();
        assert!((volume - 1.0).abs() < 1e-9);
    }

    #[test]
    fn collapsed_polygon_is_dropped() {
        let mut store = TopologyStore::new();
        let mut polygons = unit_cube();
        let mut sliver = polygons[0].clone();
        sliver.vertices = vec![p(0.0, 0.0, 0.0), p(1e-9, 0.0, 0.0), p(0.0, 1e-9, 0.0)];
        polygons.push(sliver);
        let solid = assemble_polygons(&mut store, &polygons).unwrap();
        assert_eq!(store.solid_faces(solid).unwrap().len(), 6);
    }

    #[test]
    fn nothing_to_assemble_is_empty_result() {
        let mut store = TopologyStore::new();
        let err = assemble_polygons(&mut store, &[]).unwrap_err();
        assert!(matches!(
            err,
            crate::error::CfdPrepError::Operation(OperationError::EmptyResult)
        ));
    }
}
