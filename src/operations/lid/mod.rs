//! Lid synthesis: closing selected openings of a solid with thin planar
//! slabs.
//!
//! Each selected face goes through boundary extraction, plane
//! determination, projection, face construction and extrusion toward the
//! interior of the solid.

mod determine_plane;
mod make_lid_face;
mod project;
mod synthesize;

pub use determine_plane::{fit_plane, DeterminePlane, FittedPlane, PlaneSource};
pub use make_lid_face::MakeLidFace;
pub use project::ProjectWire;
pub use synthesize::{Lid, LidFailure, LidSynthesis, SignEvidence, SynthesizeLid};

use crate::error::{OperationError, Result};
use crate::tessellation::TessellationParams;

/// Which side of the face a lid is extruded to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LidDirection {
    /// Into the solid, as resolved by probing.
    #[default]
    Inward,
    /// Away from the solid; such lids enclose nothing.
    Outward,
}

/// Parameters controlling lid synthesis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LidParams {
    /// Lid thickness.
    pub distance: f64,
    /// Relative spread below which boundary samples count as collinear.
    pub plane_fit_tolerance: f64,
    /// Largest boundary gap healed during projection.
    pub heal_tolerance: f64,
    pub direction: LidDirection,
    /// Sampling of curved boundary edges.
    pub tessellation: TessellationParams,
}

impl Default for LidParams {
    fn default() -> Self {
        Self {
            distance: 1.0,
            plane_fit_tolerance: 1e-6,
            heal_tolerance: 1e-6,
            direction: LidDirection::Inward,
            tessellation: TessellationParams::default(),
        }
    }
}

impl LidParams {
    /// Sets the lid thickness.
    #[must_use]
    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    /// Sets the extrusion side.
    #[must_use]
    pub fn with_direction(mut self, direction: LidDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Checks that every distance and tolerance is finite and positive.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] naming the offending field,
    /// or a tessellation error for bad sampling parameters.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("distance", self.distance),
            ("plane_fit_tolerance", self.plane_fit_tolerance),
            ("heal_tolerance", self.heal_tolerance),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(OperationError::InvalidInput(format!(
                    "lid {name} must be finite and positive, got {value}"
                ))
                .into());
            }
        }
        self.tessellation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(LidParams::default().validate().is_ok());
    }

    #[test]
    fn non_positive_distance_is_rejected() {
        for distance in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(LidParams::default().with_distance(distance).validate().is_err());
        }
    }
}
