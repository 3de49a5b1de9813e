use crate::error::Result;
use crate::tessellation::TessellationParams;
use crate::topology::{SolidId, TopologyStore};

use super::engine::boolean_execute;
use super::select::BooleanOp;

/// A boolean combination of two solids.
///
/// The operands stay in the store; the result is a new faceted solid.
///
/// ```ignore
/// let trimmed = Boolean::subtract(root, lids).with_params(params).execute(&mut store)?;
/// ```
pub struct Boolean {
    op: BooleanOp,
    solid_a: SolidId,
    solid_b: SolidId,
    params: TessellationParams,
}

impl Boolean {
    #[must_use]
    pub fn new(op: BooleanOp, solid_a: SolidId, solid_b: SolidId) -> Self {
        Self {
            op,
            solid_a,
            solid_b,
            params: TessellationParams::default(),
        }
    }

    /// `a ∪ b`.
    #[must_use]
    pub fn union(solid_a: SolidId, solid_b: SolidId) -> Self {
        Self::new(BooleanOp::Union, solid_a, solid_b)
    }

    /// `a − b`.
    #[must_use]
    pub fn subtract(solid_a: SolidId, solid_b: SolidId) -> Self {
        Self::new(BooleanOp::Subtract, solid_a, solid_b)
    }

    /// `a ∩ b`.
    #[must_use]
    pub fn intersect(solid_a: SolidId, solid_b: SolidId) -> Self {
        Self::new(BooleanOp::Intersect, solid_a, solid_b)
    }

    /// Sets the tessellation used to facet curved operand faces.
    #[must_use]
    pub fn with_params(mut self, params: TessellationParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the operation, creating the result solid in the store.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::EmptyResult`](crate::error::OperationError::EmptyResult)
    /// when nothing is left, or an error if an operand cannot be tessellated.
    pub fn execute(&self, store: &mut TopologyStore) -> Result<SolidId> {
        boolean_execute(store, self.solid_a, self.solid_b, self.op, self.params)
    }
}
