use tracing::debug;

use crate::error::{OperationError, Result};
use crate::operations::query::Aabb;
use crate::tessellation::{TessellateSolid, TessellationParams};
use crate::topology::{SolidId, TopologyStore};

use super::assemble::assemble_polygons;
use super::bsp::{Polygon, PLANE_EPSILON};
use super::select::BooleanOp;

/// Executes a boolean operation on two solids.
///
/// Both operands are tessellated into outward-oriented triangles, combined
/// with BSP clipping and assembled into a new faceted solid. The operands
/// are left untouched.
pub(super) fn boolean_execute(
    store: &mut TopologyStore,
    solid_a: SolidId,
    solid_b: SolidId,
    op: BooleanOp,
    params: TessellationParams,
) -> Result<SolidId> {
    let (polygons_a, aabb_a) = solid_polygons(store, solid_a, params)?;
    let (polygons_b, aabb_b) = solid_polygons(store, solid_b, params)?;

    let result = if aabb_a.intersects(&aabb_b, PLANE_EPSILON) {
        debug!(
            ?op,
            a = polygons_a.len(),
            b = polygons_b.len(),
            "boolean: clipping operands"
        );
        op.apply(polygons_a, polygons_b)
    } else {
        debug!(?op, "boolean: operands are disjoint");
        op.disjoint(polygons_a, polygons_b)
    };

    if result.is_empty() {
        return Err(OperationError::EmptyResult.into());
    }
    debug!(?op, polygons = result.len(), "boolean: assembling result");
    assemble_polygons(store, &result)
}

/// Tessellates a solid into BSP polygons and their bounding box.
fn solid_polygons(
    store: &TopologyStore,
    solid: SolidId,
    params: TessellationParams,
) -> Result<(Vec<Polygon>, Aabb)> {
    let mesh = TessellateSolid::new(solid, params).execute(store)?;
    let aabb = Aabb::from_points(&mesh.vertices).ok_or_else(|| {
        OperationError::InvalidInput("boolean operand has no surface".into())
    })?;
    let polygons = mesh
        .triangles()
        .filter_map(|tri| Polygon::new(tri.to_vec()))
        .collect();
    Ok((polygons, aabb))
}
