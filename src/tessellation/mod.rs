mod tessellate_curve;
mod tessellate_face;
mod tessellate_solid;

pub use tessellate_curve::{wire_polyline, TessellateCurve};
pub use tessellate_face::TessellateFace;
pub use tessellate_solid::TessellateSolid;

use crate::error::{Result, TessellationError};
use crate::math::{Point2, Point3, Vector3};

/// Parameters controlling tessellation quality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TessellationParams {
    /// Maximum allowed deviation from the true geometry.
    pub tolerance: f64,
    /// Minimum number of segments for curves.
    pub min_segments: usize,
    /// Maximum number of segments for curves.
    pub max_segments: usize,
}

impl Default for TessellationParams {
    fn default() -> Self {
        Self {
            tolerance: 0.01,
            min_segments: 4,
            max_segments: 256,
        }
    }
}

impl TessellationParams {
    /// Checks that the parameters describe a usable sampling.
    ///
    /// # Errors
    ///
    /// Returns [`TessellationError::InvalidParameters`] for a non-positive or
    /// non-finite tolerance, or an empty/inverted segment range.
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(TessellationError::InvalidParameters(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            ))
            .into());
        }
        if self.min_segments == 0 || self.min_segments > self.max_segments {
            return Err(TessellationError::InvalidParameters(format!(
                "segment range [{}, {}] is empty",
                self.min_segments, self.max_segments
            ))
            .into());
        }
        Ok(())
    }

    /// Number of segments needed to keep the chord error of an arc of
    /// `radius` spanning `sweep` radians within the tolerance.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn arc_segments(&self, radius: f64, sweep: f64) -> usize {
        if radius > self.tolerance {
            let half_angle = (1.0 - self.tolerance / radius).acos();
            let computed = (sweep.abs() / (2.0 * half_angle)).ceil() as usize;
            computed.clamp(self.min_segments, self.max_segments)
        } else {
            self.min_segments
        }
    }
}

/// A polyline approximation of a curve.
#[derive(Debug, Clone, Default)]
pub struct Polyline {
    /// The ordered vertices of the polyline.
    pub points: Vec<Point3>,
}

/// A triangle mesh approximation of a surface.
///
/// Triangles are wound counter-clockwise when seen from the side their
/// normals point to.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Vertex normals.
    pub normals: Vec<Vector3>,
    /// UV coordinates.
    pub uvs: Vec<Point2>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Appends another mesh, re-basing its indices.
    #[allow(clippy::cast_possible_truncation)]
    pub fn merge(&mut self, other: &TriangleMesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.uvs.extend_from_slice(&other.uvs);
        self.indices.extend(
            other
                .indices
                .iter()
                .map(|[a, b, c]| [a + offset, b + offset, c + offset]),
        );
    }

    /// Iterates over the triangles as point triples.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3; 3]> + '_ {
        self.indices.iter().map(|&[a, b, c]| {
            [
                self.vertices[a as usize],
                self.vertices[b as usize],
                self.vertices[c as usize],
            ]
        })
    }

    /// Returns `true` if the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
