use crate::error::{OperationError, Result};
use crate::operations::lid::{LidDirection, LidParams};
use crate::tessellation::TessellationParams;

/// What the volume extractor returns once the lids are known to touch the
/// solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionMode {
    /// The solid with the lid slabs removed: `root - union(lids)`.
    #[default]
    Trim,
    /// The overlap of solid and lids: `root ∩ union(lids)`.
    Overlap,
}

/// Settings of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Lid thickness, in model units.
    pub extrusion_distance: f64,
    /// Relative spread below which boundary samples count as collinear.
    pub plane_fit_tolerance: f64,
    /// Largest boundary gap healed when projecting a face boundary.
    pub heal_tolerance: f64,
    /// Volumes at or below this are treated as empty.
    pub volume_tolerance: f64,
    pub extraction_mode: ExtractionMode,
    pub lid_direction: LidDirection,
    /// Faceting of curved geometry for booleans, picking and queries.
    pub tessellation: TessellationParams,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            extrusion_distance: 1.0,
            plane_fit_tolerance: 1e-6,
            heal_tolerance: 1e-6,
            volume_tolerance: 1e-6,
            extraction_mode: ExtractionMode::Trim,
            lid_direction: LidDirection::Inward,
            tessellation: TessellationParams::default(),
        }
    }
}

impl PipelineConfig {
    /// Sets the lid thickness.
    #[must_use]
    pub fn with_extrusion_distance(mut self, distance: f64) -> Self {
        self.extrusion_distance = distance;
        self
    }

    /// Sets the volume below which a result counts as empty.
    #[must_use]
    pub fn with_volume_tolerance(mut self, tolerance: f64) -> Self {
        self.volume_tolerance = tolerance;
        self
    }

    /// Sets what the extractor returns.
    #[must_use]
    pub fn with_extraction_mode(mut self, mode: ExtractionMode) -> Self {
        self.extraction_mode = mode;
        self
    }

    /// Sets the side lids are extruded to.
    #[must_use]
    pub fn with_lid_direction(mut self, direction: LidDirection) -> Self {
        self.lid_direction = direction;
        self
    }

    /// Sets the tessellation parameters.
    #[must_use]
    pub fn with_tessellation(mut self, tessellation: TessellationParams) -> Self {
        self.tessellation = tessellation;
        self
    }

    /// The lid synthesis parameters derived from this configuration.
    #[must_use]
    pub fn lid_params(&self) -> LidParams {
        LidParams {
            distance: self.extrusion_distance,
            plane_fit_tolerance: self.plane_fit_tolerance,
            heal_tolerance: self.heal_tolerance,
            direction: self.lid_direction,
            tessellation: self.tessellation,
        }
    }

    /// Checks every setting.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] for a non-finite or
    /// non-positive distance or tolerance, or a tessellation error for bad
    /// sampling parameters.
    pub fn validate(&self) -> Result<()> {
        if !self.volume_tolerance.is_finite() || self.volume_tolerance <= 0.0 {
            return Err(OperationError::InvalidInput(format!(
                "volume_tolerance must be finite and positive, got {}",
                self.volume_tolerance
            ))
            .into());
        }
        self.lid_params().validate()
    }
}
