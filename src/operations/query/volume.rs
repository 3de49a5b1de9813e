use crate::error::Result;
use crate::tessellation::{TessellateSolid, TessellationParams, TriangleMesh};
use crate::topology::{SolidId, TopologyStore};

/// Computes the volume of a solid.
///
/// Uses tessellation and the signed tetrahedron method. For each triangle,
/// computes `(1/6) * v0 . (v1 x v2)` and sums over all triangles. Face
/// tessellations are wound outward, so voids subtract automatically.
pub struct Volume {
    solid: SolidId,
    params: TessellationParams,
}

impl Volume {
    /// Creates a new `Volume` query with default tessellation parameters.
    #[must_use]
    pub fn new(solid: SolidId) -> Self {
        Self {
            solid,
            params: TessellationParams::default(),
        }
    }

    /// Sets custom tessellation parameters for higher accuracy.
    #[must_use]
    pub fn with_params(mut self, params: TessellationParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the query, returning the enclosed volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid cannot be tessellated.
    pub fn execute(&self, store: &TopologyStore) -> Result<f64> {
        let mesh = TessellateSolid::new(self.solid, self.params).execute(store)?;
        Ok(signed_mesh_volume(&mesh).abs())
    }
}

/// Signed volume enclosed by a closed, consistently wound mesh.
///
/// Positive when the triangles face outward.
#[must_use]
pub fn signed_mesh_volume(mesh: &TriangleMesh) -> f64 {
    mesh.triangles()
        .map(|[v0, v1, v2]| v0.coords.dot(&v1.coords.cross(&v2.coords)))
        .sum::<f64>()
        / 6.0
}
