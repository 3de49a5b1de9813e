use crate::error::{OperationError, Result};
use crate::math::polygon_3d::newell_normal;
use crate::math::{Point3, Vector3, TOLERANCE};
use crate::operations::creation::{MakeFace, MakeSolid};
use crate::tessellation::{wire_polyline, TessellationParams};
use crate::topology::{
    EdgeData, EdgeId, FaceId, OrientedEdge, ShellData, SolidId, TopologyStore, VertexData,
    WireData,
};

/// Sweeps a planar face along a vector into a closed prism.
///
/// Curved boundary edges are sampled first, so every wall is a planar quad.
/// The prism is a manifold B-rep: its `2n` vertices and `3n` edges are
/// shared between the faces meeting there. The source face is left
/// untouched.
pub struct Extrude {
    face: FaceId,
    vector: Vector3,
    params: TessellationParams,
}

impl Extrude {
    /// Creates a new `Extrude` operation.
    #[must_use]
    pub fn new(face: FaceId, vector: Vector3) -> Self {
        Self {
            face,
            vector,
            params: TessellationParams::default(),
        }
    }

    /// Sets the sampling used for curved boundary edges.
    #[must_use]
    pub fn with_params(mut self, params: TessellationParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the extrusion, creating the prism in the topology store.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the vector is zero or lies
    /// in the face plane, or the face has holes, and
    /// [`OperationError::Failed`] if the boundary encloses no area.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SolidId> {
        let length = self.vector.norm();
        if length < TOLERANCE {
            return Err(OperationError::InvalidInput("extrusion vector is zero".into()).into());
        }
        let face = store.face(self.face)?;
        if !face.inner_wires.is_empty() {
            return Err(OperationError::InvalidInput("cannot extrude a face with holes".into()).into());
        }

        let mut base = wire_polyline(store, face.outer_wire, &self.params)?;
        let normal = newell_normal(&base)
            .ok_or_else(|| OperationError::Failed("face boundary encloses no area".into()))?;
        let alignment = normal.dot(&self.vector);
        if alignment.abs() < TOLERANCE * length {
            return Err(OperationError::InvalidInput(
                "extrusion vector lies in the face plane".into(),
            )
            .into());
        }
        // Wind the base counter-clockwise about the vector.
        if alignment < 0.0 {
            base.reverse();
        }

        let faces = Prism::build(store, &base, self.vector)?;
        let shell = store.add_shell(ShellData::closed(faces));
        MakeSolid::new(shell, vec![]).execute(store)
    }
}

/// Edges of a prism over a base loop `b` and its translate `t`.
struct Prism {
    /// `b[i] -> b[i + 1]`.
    base: Vec<EdgeId>,
    /// `t[i] -> t[i + 1]`.
    cap: Vec<EdgeId>,
    /// `b[i] -> t[i]`.
    rails: Vec<EdgeId>,
}

impl Prism {
    /// Creates the faces of the prism: the base facing backwards, the cap
    /// facing along `vector`, then one wall per base edge.
    fn build(store: &mut TopologyStore, base: &[Point3], vector: Vector3) -> Result<Vec<FaceId>> {
        let n = base.len();
        let cap: Vec<Point3> = base.iter().map(|p| p + vector).collect();
        let base_vertices: Vec<_> = base.iter().map(|&p| store.add_vertex(VertexData::new(p))).collect();
        let cap_vertices: Vec<_> = cap.iter().map(|&p| store.add_vertex(VertexData::new(p))).collect();

        let mut prism = Self {
            base: Vec::with_capacity(n),
            cap: Vec::with_capacity(n),
            rails: Vec::with_capacity(n),
        };
        for i in 0..n {
            let j = (i + 1) % n;
            let edge = EdgeData::line(base_vertices[i], base_vertices[j], base[i], base[j])?;
            prism.base.push(store.add_edge(edge));
            let edge = EdgeData::line(cap_vertices[i], cap_vertices[j], cap[i], cap[j])?;
            prism.cap.push(store.add_edge(edge));
            let edge = EdgeData::line(base_vertices[i], cap_vertices[i], base[i], cap[i])?;
            prism.rails.push(store.add_edge(edge));
        }

        let mut faces = Vec::with_capacity(n + 2);
        let forward = |edges: &[EdgeId]| {
            WireData::closed(edges.iter().map(|&e| OrientedEdge::new(e, true)).collect())
        };
        faces.push(face(store, forward(&prism.base).reversed())?);
        faces.push(face(store, forward(&prism.cap))?);
        for i in 0..n {
            let j = (i + 1) % n;
            let wall = WireData::closed(vec![
                OrientedEdge::new(prism.base[i], true),
                OrientedEdge::new(prism.rails[j], true),
                OrientedEdge::new(prism.cap[i], false),
                OrientedEdge::new(prism.rails[i], false),
            ]);
            faces.push(face(store, wall)?);
        }
        Ok(faces)
    }
}

fn face(store: &mut TopologyStore, wire: WireData) -> Result<FaceId> {
    let wire = store.add_wire(wire);
    MakeFace::new(wire, vec![]).execute(store)
}
