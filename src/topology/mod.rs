pub mod edge;
pub mod face;
pub mod shell;
pub mod solid;
pub mod vertex;
pub mod wire;

mod shape;

pub use edge::{EdgeCurve, EdgeData, EdgeId};
pub use face::{FaceData, FaceId, FaceSurface};
pub use shell::{ShellData, ShellId};
pub use solid::{SolidData, SolidId};
pub use vertex::{VertexData, VertexId};
pub use shape::Shape;
pub use wire::{OrientedEdge, WireData, WireId};

use std::collections::HashMap;

use crate::error::TopologyError;
use slotmap::SlotMap;

/// Central arena that owns all topological entities.
///
/// Entities reference each other via typed IDs (generational indices),
/// avoiding self-referential structures and enabling safe mutation.
#[derive(Debug, Default)]
pub struct TopologyStore {
    vertices: SlotMap<VertexId, VertexData>,
    edges: SlotMap<EdgeId, EdgeData>,
    wires: SlotMap<WireId, WireData>,
    faces: SlotMap<FaceId, FaceData>,
    shells: SlotMap<ShellId, ShellData>,
    solids: SlotMap<SolidId, SolidData>,
}

impl TopologyStore {
    /// Creates a new, empty topology store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Vertex operations ---

    /// Inserts a vertex and returns its ID.
    pub fn add_vertex(&mut self, data: VertexData) -> VertexId {
        self.vertices.insert(data)
    }

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, TopologyError> {
        self.vertices
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    // --- Edge operations ---

    /// Inserts an edge and returns its ID.
    pub fn add_edge(&mut self, data: EdgeData) -> EdgeId {
        self.edges.insert(data)
    }

    /// Returns a reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeData, TopologyError> {
        self.edges
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge".into()))
    }

    // --- Wire operations ---

    /// Inserts a wire and returns its ID.
    pub fn add_wire(&mut self, data: WireData) -> WireId {
        self.wires.insert(data)
    }

    /// Returns a reference to the wire data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn wire(&self, id: WireId) -> Result<&WireData, TopologyError> {
        self.wires
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("wire".into()))
    }

    // --- Face operations ---

    /// Inserts a face and returns its ID.
    pub fn add_face(&mut self, data: FaceData) -> FaceId {
        self.faces.insert(data)
    }

    /// Returns a reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn face(&self, id: FaceId) -> Result<&FaceData, TopologyError> {
        self.faces
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))
    }

    // --- Shell operations ---

    /// Inserts a shell and returns its ID.
    pub fn add_shell(&mut self, data: ShellData) -> ShellId {
        self.shells.insert(data)
    }

    /// Returns a reference to the shell data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn shell(&self, id: ShellId) -> Result<&ShellData, TopologyError> {
        self.shells
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("shell".into()))
    }

    // --- Solid operations ---

    /// Inserts a solid and returns its ID.
    pub fn add_solid(&mut self, data: SolidData) -> SolidId {
        self.solids.insert(data)
    }

    /// Returns a reference to the solid data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the store.
    pub fn solid(&self, id: SolidId) -> Result<&SolidData, TopologyError> {
        self.solids
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("solid".into()))
    }

    // --- Whole-solid operations ---

    /// Returns `true` if the store holds the given solid.
    #[must_use]
    pub fn contains_solid(&self, id: SolidId) -> bool {
        self.solids.contains_key(id)
    }

    /// Number of solids in the store.
    #[must_use]
    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    /// Number of faces in the store.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of edges in the store.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of vertices in the store.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns `true` if the store holds no entities at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
            && self.edges.is_empty()
            && self.wires.is_empty()
            && self.faces.is_empty()
            && self.shells.is_empty()
            && self.solids.is_empty()
    }

    /// All faces of a solid, outer shell first, in shell order.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid or one of its shells is missing.
    pub fn solid_faces(&self, id: SolidId) -> Result<Vec<FaceId>, TopologyError> {
        let solid = self.solid(id)?;
        let mut faces = Vec::new();
        for shell_id in std::iter::once(solid.outer_shell).chain(solid.inner_shells.iter().copied()) {
            faces.extend_from_slice(&self.shell(shell_id)?.faces);
        }
        Ok(faces)
    }

    /// Returns `true` if `face` bounds `solid`.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid or one of its shells is missing.
    pub fn solid_has_face(&self, solid: SolidId, face: FaceId) -> Result<bool, TopologyError> {
        Ok(self.solid_faces(solid)?.contains(&face))
    }

    /// Removes a solid and every entity reachable from it.
    ///
    /// Solids never share sub-entities in this store, so the whole graph
    /// below the solid is released. Entities already gone are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid itself is not in the store.
    pub fn remove_solid(&mut self, id: SolidId) -> Result<(), TopologyError> {
        let solid = self
            .solids
            .remove(id)
            .ok_or_else(|| TopologyError::EntityNotFound("solid".into()))?;

        for shell_id in std::iter::once(solid.outer_shell).chain(solid.inner_shells) {
            let Some(shell) = self.shells.remove(shell_id) else {
                continue;
            };
            for face_id in shell.faces {
                self.release_face(face_id);
            }
        }
        Ok(())
    }

    /// Removes a face that no shell references, with its wires, edges and
    /// vertices.
    ///
    /// # Errors
    ///
    /// Returns an error if the face is not in the store.
    pub fn remove_face(&mut self, id: FaceId) -> Result<(), TopologyError> {
        if self.release_face(id) {
            Ok(())
        } else {
            Err(TopologyError::EntityNotFound("face".into()))
        }
    }

    fn release_face(&mut self, id: FaceId) -> bool {
        let Some(face) = self.faces.remove(id) else {
            return false;
        };
        for wire_id in std::iter::once(face.outer_wire).chain(face.inner_wires) {
            let Some(wire) = self.wires.remove(wire_id) else {
                continue;
            };
            for oe in wire.edges {
                if let Some(edge) = self.edges.remove(oe.edge) {
                    self.vertices.remove(edge.start);
                    self.vertices.remove(edge.end);
                }
            }
        }
        true
    }

    /// Deep-copies a solid from another store into this one, returning the
    /// new handle. Shared vertices and edges stay shared in the copy.
    ///
    /// # Errors
    ///
    /// Returns an error if any entity reachable from `id` is missing in
    /// `source`.
    pub fn copy_solid_from(
        &mut self,
        source: &TopologyStore,
        id: SolidId,
    ) -> Result<SolidId, TopologyError> {
        let mut vertex_map: HashMap<VertexId, VertexId> = HashMap::new();
        let mut edge_map: HashMap<EdgeId, EdgeId> = HashMap::new();

        let solid = source.solid(id)?;
        let mut copy_shell = |store: &mut Self, shell_id: ShellId| -> Result<ShellId, TopologyError> {
            let shell = source.shell(shell_id)?;
            let mut faces = Vec::with_capacity(shell.faces.len());
            for &face_id in &shell.faces {
                let face = source.face(face_id)?;
                let mut wires = Vec::with_capacity(1 + face.inner_wires.len());
                for &wire_id in std::iter::once(&face.outer_wire).chain(&face.inner_wires) {
                    let wire = source.wire(wire_id)?;
                    let mut edges = Vec::with_capacity(wire.edges.len());
                    for oe in &wire.edges {
                        let new_edge = if let Some(&e) = edge_map.get(&oe.edge) {
                            e
                        } else {
                            let edge = source.edge(oe.edge)?;
                            let mut map_vertex = |v: VertexId| -> Result<VertexId, TopologyError> {
                                if let Some(&nv) = vertex_map.get(&v) {
                                    return Ok(nv);
                                }
                                let nv = store.add_vertex(source.vertex(v)?.clone());
                                vertex_map.insert(v, nv);
                                Ok(nv)
                            };
                            let start = map_vertex(edge.start)?;
                            let end = map_vertex(edge.end)?;
                            let e = store.add_edge(EdgeData {
                                start,
                                end,
                                ..edge.clone()
                            });
                            edge_map.insert(oe.edge, e);
                            e
                        };
                        edges.push(OrientedEdge::new(new_edge, oe.forward));
                    }
                    wires.push(store.add_wire(WireData {
                        edges,
                        is_closed: wire.is_closed,
                    }));
                }
                let outer_wire = wires.remove(0);
                faces.push(store.add_face(FaceData {
                    surface: face.surface.clone(),
                    outer_wire,
                    inner_wires: wires,
                    same_sense: face.same_sense,
                }));
            }
            Ok(store.add_shell(ShellData {
                faces,
                is_closed: shell.is_closed,
            }))
        };

        let outer_shell = copy_shell(self, solid.outer_shell)?;
        let mut inner_shells = Vec::with_capacity(solid.inner_shells.len());
        for &shell_id in &solid.inner_shells {
            inner_shells.push(copy_shell(self, shell_id)?);
        }
        Ok(self.add_solid(SolidData {
            outer_shell,
            inner_shells,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::Point3;
    use crate::operations::creation::MakeBox;

    #[test]
    fn remove_solid_releases_everything() {
        let mut store = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), Point3::new(1.0, 2.0, 3.0))
            .execute(&mut store)
            .unwrap();
        assert_eq!(store.face_count(), 6);

        store.remove_solid(solid).unwrap();
        assert!(store.is_empty());
        assert!(store.remove_solid(solid).is_err());
    }

    #[test]
    fn remove_solid_leaves_other_solids_intact() {
        let mut store = TopologyStore::new();
        let a = MakeBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let b = MakeBox::new(Point3::new(5.0, 0.0, 0.0), Point3::new(6.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();

        store.remove_solid(a).unwrap();
        assert_eq!(store.solid_count(), 1);
        assert_eq!(store.solid_faces(b).unwrap().len(), 6);
    }

    #[test]
    fn copy_solid_preserves_shared_topology() {
        let mut scratch = TopologyStore::new();
        let solid = MakeBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .execute(&mut scratch)
            .unwrap();

        let mut store = TopologyStore::new();
        let copy = store.copy_solid_from(&scratch, solid).unwrap();

        assert_eq!(store.solid_faces(copy).unwrap().len(), 6);
        assert_eq!(store.vertices.len(), scratch.vertices.len());
        assert_eq!(store.edges.len(), scratch.edges.len());
    }

    #[test]
    fn face_membership() {
        let mut store = TopologyStore::new();
        let a = MakeBox::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let b = MakeBox::new(Point3::new(2.0, 0.0, 0.0), Point3::new(3.0, 1.0, 1.0))
            .execute(&mut store)
            .unwrap();
        let face_of_b = store.solid_faces(b).unwrap()[0];
        assert!(store.solid_has_face(b, face_of_b).unwrap());
        assert!(!store.solid_has_face(a, face_of_b).unwrap());
    }

    #[test]
    fn remove_face_releases_loose_face() {
        use crate::operations::creation::{MakeFace, MakeWire};

        let mut store = TopologyStore::new();
        let wire = MakeWire::new(
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)],
            true,
        )
        .execute(&mut store)
        .unwrap();
        let face = MakeFace::new(wire, vec![]).execute(&mut store).unwrap();

        store.remove_face(face).unwrap();
        assert!(store.is_empty());
        assert!(store.remove_face(face).is_err());
    }
}
