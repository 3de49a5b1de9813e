//! Builds a kernel solid from parsed STEP data.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::ImportError;
use crate::math::Point3;
use crate::operations::creation::MakeSolid;
use crate::topology::{
    EdgeCurve, EdgeData, EdgeId, FaceData, FaceId, FaceSurface, OrientedEdge, ShellData, SolidId,
    TopologyStore, VertexData, VertexId, WireData, WireId,
};

use super::entities::{
    parse_closed_shell, parse_curve, parse_edge_curve, parse_edge_loop, parse_face,
    parse_manifold_solid_brep, parse_oriented_edge, parse_surface, parse_vertex_point, StepCurve,
    StepFace, StepSurface,
};
use super::parser::{Parser, StepFile};

/// Largest distance between a vertex and the curve of an edge it bounds.
const ON_CURVE_TOLERANCE: f64 = 1e-6;

/// Imports the root solid of a STEP (ISO 10303-21) file.
///
/// The root is the `MANIFOLD_SOLID_BREP` with the smallest entity id; any
/// other solids are ignored with a warning. The solid is assembled in a
/// scratch store and copied into the target store only once it is
/// complete, so a failed import leaves the target untouched.
pub struct ImportStep<'a> {
    data: &'a [u8],
}

impl<'a> ImportStep<'a> {
    /// Creates a new `ImportStep` operation over raw file contents.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Executes the import, returning the root solid.
    ///
    /// # Errors
    ///
    /// Returns an [`ImportError`] when the data cannot be tokenized or
    /// parsed, uses unsupported entities, or does not describe a closed
    /// manifold solid.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SolidId, ImportError> {
        let file = Parser::parse(self.data)?;
        debug!(entities = file.entities.len(), "parsed STEP data");

        let solids = file.entities_of_type("MANIFOLD_SOLID_BREP");
        let Some(root) = solids.first() else {
            return Err(ImportError::NoSolids);
        };
        if solids.len() > 1 {
            let ignored: Vec<u64> = solids[1..].iter().map(|entity| entity.id).collect();
            warn!(root = root.id, ?ignored, "STEP file has several solids, importing the first");
        }

        let mut scratch = TopologyStore::new();
        let solid = SolidBuilder::new(&file).build(&mut scratch, root.id)?;
        let imported = store
            .copy_solid_from(&scratch, solid)
            .map_err(|e| ImportError::InvalidTopology(e.to_string()))?;

        let faces = store
            .solid_faces(imported)
            .map_err(|e| ImportError::InvalidTopology(e.to_string()))?
            .len();
        info!(
            root = root.id,
            faces,
            edges = scratch.edge_count(),
            vertices = scratch.vertex_count(),
            "imported STEP solid"
        );
        Ok(imported)
    }
}

/// Imports the root solid of in-memory STEP data.
///
/// # Errors
///
/// See [`ImportStep::execute`].
pub fn import_step(data: &[u8], store: &mut TopologyStore) -> Result<SolidId, ImportError> {
    ImportStep::new(data).execute(store)
}

/// Reads a STEP file from disk and imports its root solid.
///
/// # Errors
///
/// Returns [`ImportError::Io`] if the file cannot be read, otherwise see
/// [`ImportStep::execute`].
pub fn import_step_file(
    path: impl AsRef<Path>,
    store: &mut TopologyStore,
) -> Result<SolidId, ImportError> {
    let data = std::fs::read(path)?;
    import_step(&data, store)
}

/// Resolves STEP entity ids to store entities for one solid.
struct SolidBuilder<'a> {
    file: &'a StepFile,
    vertex_map: HashMap<u64, VertexId>,
    edge_map: HashMap<u64, EdgeId>,
    /// Number of times each STEP edge is traversed forward and backward.
    edge_uses: HashMap<u64, (usize, usize)>,
}

impl<'a> SolidBuilder<'a> {
    fn new(file: &'a StepFile) -> Self {
        Self {
            file,
            vertex_map: HashMap::new(),
            edge_map: HashMap::new(),
            edge_uses: HashMap::new(),
        }
    }

    fn build(mut self, store: &mut TopologyStore, solid_id: u64) -> Result<SolidId, ImportError> {
        let shell_id = parse_manifold_solid_brep(self.file, solid_id)?;
        let face_ids = parse_closed_shell(self.file, shell_id)?;
        if face_ids.is_empty() {
            return Err(ImportError::InvalidTopology(format!(
                "#{shell_id}: shell has no faces"
            )));
        }

        let mut faces = Vec::with_capacity(face_ids.len());
        for face_id in face_ids {
            faces.push(self.build_face(store, face_id)?);
        }
        self.check_edge_uses()?;

        let shell = store.add_shell(ShellData::closed(faces));
        MakeSolid::new(shell, vec![])
            .execute(store)
            .map_err(|e| ImportError::InvalidTopology(format!("#{solid_id}: {e}")))
    }

    fn build_face(&mut self, store: &mut TopologyStore, face_id: u64) -> Result<FaceId, ImportError> {
        let StepFace {
            bounds,
            surface,
            same_sense,
        } = parse_face(self.file, face_id)?;
        if bounds.is_empty() {
            return Err(ImportError::InvalidTopology(format!("#{face_id}: face has no bounds")));
        }

        let outer_index = bounds.iter().position(|b| b.is_outer).unwrap_or(0);
        let mut outer_wire = None;
        let mut inner_wires = Vec::with_capacity(bounds.len() - 1);
        for (i, bound) in bounds.iter().enumerate() {
            let wire = self.build_wire(store, bound.edge_loop, bound.orientation)?;
            if i == outer_index {
                outer_wire = Some(wire);
            } else {
                inner_wires.push(wire);
            }
        }
        let Some(outer_wire) = outer_wire else {
            return Err(ImportError::InvalidTopology(format!("#{face_id}: no outer bound")));
        };

        let surface = match parse_surface(self.file, surface)? {
            StepSurface::Plane(plane) => FaceSurface::Plane(plane),
            StepSurface::Cylinder(cylinder) => FaceSurface::Cylinder(cylinder),
        };
        Ok(store.add_face(FaceData {
            surface,
            outer_wire,
            inner_wires,
            same_sense,
        }))
    }

    /// Builds a closed wire from an `EDGE_LOOP`, reversed when the bound
    /// orientation is `.F.`.
    fn build_wire(
        &mut self,
        store: &mut TopologyStore,
        loop_id: u64,
        orientation: bool,
    ) -> Result<WireId, ImportError> {
        let oriented_ids = parse_edge_loop(self.file, loop_id)?;
        if oriented_ids.is_empty() {
            return Err(ImportError::InvalidTopology(format!("#{loop_id}: empty edge loop")));
        }

        // (step edge, forward, first step vertex, last step vertex)
        let mut traversal = Vec::with_capacity(oriented_ids.len());
        for oe_id in oriented_ids {
            let (edge_id, forward) = parse_oriented_edge(self.file, oe_id)?;
            let edge = parse_edge_curve(self.file, edge_id)?;
            let (first, last) = if forward {
                (edge.start_vertex, edge.end_vertex)
            } else {
                (edge.end_vertex, edge.start_vertex)
            };
            traversal.push((edge_id, forward, first, last));
        }
        if !orientation {
            traversal.reverse();
            for step in &mut traversal {
                *step = (step.0, !step.1, step.3, step.2);
            }
        }

        for (i, &(edge_id, _, _, last)) in traversal.iter().enumerate() {
            let next_first = traversal[(i + 1) % traversal.len()].2;
            if last != next_first {
                return Err(ImportError::InvalidTopology(format!(
                    "#{loop_id}: edge #{edge_id} ends at #{last} but the next edge starts at #{next_first}"
                )));
            }
        }

        let mut edges = Vec::with_capacity(traversal.len());
        for &(edge_id, forward, _, _) in &traversal {
            let edge = self.edge(store, edge_id)?;
            let uses = self.edge_uses.entry(edge_id).or_default();
            if forward {
                uses.0 += 1;
            } else {
                uses.1 += 1;
            }
            edges.push(OrientedEdge::new(edge, forward));
        }
        Ok(store.add_wire(WireData::closed(edges)))
    }

    /// The store edge for a STEP `EDGE_CURVE`, created on first use.
    fn edge(&mut self, store: &mut TopologyStore, edge_id: u64) -> Result<EdgeId, ImportError> {
        if let Some(&edge) = self.edge_map.get(&edge_id) {
            return Ok(edge);
        }

        let step_edge = parse_edge_curve(self.file, edge_id)?;
        let (start, start_point) = self.vertex(store, step_edge.start_vertex)?;
        let (end, end_point) = self.vertex(store, step_edge.end_vertex)?;

        let data = match parse_curve(self.file, step_edge.curve)? {
            StepCurve::Line => EdgeData::line(start, end, start_point, end_point)
                .map_err(|e| ImportError::InvalidGeometry(format!("#{edge_id}: {e}")))?,
            StepCurve::Circle(circle) => {
                let arc_end =
                    (step_edge.start_vertex != step_edge.end_vertex).then_some(&end_point);
                let (t_start, t_end) = circle.arc(&start_point, arc_end, step_edge.same_sense);
                EdgeData {
                    start,
                    end,
                    curve: EdgeCurve::Circle(circle),
                    t_start,
                    t_end,
                }
            }
        };

        let curve = data.curve.as_curve();
        for (vertex_id, point) in [
            (step_edge.start_vertex, start_point),
            (step_edge.end_vertex, end_point),
        ] {
            let distance = curve.distance_to(&point);
            if distance > ON_CURVE_TOLERANCE {
                return Err(ImportError::InvalidGeometry(format!(
                    "#{edge_id}: vertex #{vertex_id} lies {distance:e} off its curve"
                )));
            }
        }

        let edge = store.add_edge(data);
        self.edge_map.insert(edge_id, edge);
        Ok(edge)
    }

    fn vertex(
        &mut self,
        store: &mut TopologyStore,
        vertex_id: u64,
    ) -> Result<(VertexId, Point3), ImportError> {
        let point = parse_vertex_point(self.file, vertex_id)?;
        let vertex = *self
            .vertex_map
            .entry(vertex_id)
            .or_insert_with(|| store.add_vertex(VertexData::new(point)));
        Ok((vertex, point))
    }

    /// Every edge of a closed manifold shell is used once in each direction.
    fn check_edge_uses(&self) -> Result<(), ImportError> {
        let mut ids: Vec<_> = self.edge_uses.iter().collect();
        ids.sort_unstable_by_key(|(id, _)| **id);
        for (edge_id, &(forward, backward)) in ids {
            if forward != 1 || backward != 1 {
                return Err(ImportError::InvalidTopology(format!(
                    "#{edge_id}: edge is used {forward} time(s) forward and {backward} time(s) \
                     backward, a closed shell needs exactly one of each"
                )));
            }
        }
        Ok(())
    }
}
