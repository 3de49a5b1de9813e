//! Internal volume extraction from a solid and its lids.

use tracing::{debug, info};

use crate::error::{CfdPrepError, OperationError, PipelineError};
use crate::operations::boolean::Boolean;
use crate::operations::query::Volume;
use crate::tessellation::TessellationParams;
use crate::topology::{SolidId, TopologyStore};

use super::config::{ExtractionMode, PipelineConfig};

/// The extracted internal volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InternalVolume {
    pub solid: SolidId,
    pub volume: f64,
    /// Volume of `root ∩ union(lids)`.
    pub contact_volume: f64,
    pub lid_count: usize,
}

/// Unions solids pairwise, level by level, so that the result does not
/// depend on their order beyond tolerance.
///
/// Intermediate unions are removed from the store; the inputs are kept. A
/// single input is returned as is.
///
/// # Errors
///
/// Returns [`PipelineError::NoSelection`] for an empty input, without
/// running any boolean, or [`PipelineError::Kernel`] if a union fails.
pub fn fold_union(
    store: &mut TopologyStore,
    solids: &[SolidId],
    params: TessellationParams,
) -> Result<SolidId, PipelineError> {
    if solids.is_empty() {
        return Err(PipelineError::NoSelection);
    }

    let mut level: Vec<(SolidId, bool)> = solids.iter().map(|&s| (s, false)).collect();
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        for pair in level.chunks(2) {
            match *pair {
                [(a, a_owned), (b, b_owned)] => {
                    let merged = Boolean::union(a, b).with_params(params).execute(store)?;
                    for (solid, owned) in [(a, a_owned), (b, b_owned)] {
                        if owned {
                            store.remove_solid(solid)?;
                        }
                    }
                    next.push((merged, true));
                }
                [single] => next.push(single),
                _ => {}
            }
        }
        debug!(solids = next.len(), "union level merged");
        level = next;
    }
    Ok(level[0].0)
}

/// Extracts the internal volume of `root` closed by `lids`.
///
/// The overlap `root ∩ union(lids)` is always computed; if it is empty the
/// lids do not touch the solid and [`PipelineError::EmptyVolume`] is
/// returned. Otherwise the result follows `config.extraction_mode`.
///
/// # Errors
///
/// Returns [`PipelineError::NoSelection`] without lids,
/// [`PipelineError::EmptyVolume`] when nothing is enclosed, or
/// [`PipelineError::Kernel`] for a failed boolean.
pub fn extract_volume(
    store: &mut TopologyStore,
    root: SolidId,
    lids: &[SolidId],
    config: &PipelineConfig,
) -> Result<InternalVolume, PipelineError> {
    let params = config.tessellation;
    let lid_union = fold_union(store, lids, params)?;
    let owns_union = lids.len() > 1;
    let result = compose(store, root, lid_union, config);
    if owns_union {
        store.remove_solid(lid_union)?;
    }
    let (solid, contact_volume) = result?;

    let volume = Volume::new(solid).with_params(params).execute(store)?;
    info!(
        lids = lids.len(),
        volume,
        contact_volume,
        mode = ?config.extraction_mode,
        "internal volume extracted"
    );
    Ok(InternalVolume {
        solid,
        volume,
        contact_volume,
        lid_count: lids.len(),
    })
}

/// The result solid and the contact volume.
fn compose(
    store: &mut TopologyStore,
    root: SolidId,
    lid_union: SolidId,
    config: &PipelineConfig,
) -> Result<(SolidId, f64), PipelineError> {
    let params = config.tessellation;
    let contact = match Boolean::intersect(root, lid_union).with_params(params).execute(store) {
        Ok(solid) => solid,
        Err(CfdPrepError::Operation(OperationError::EmptyResult)) => {
            return Err(PipelineError::EmptyVolume {
                contact_volume: 0.0,
            });
        }
        Err(e) => return Err(e.into()),
    };

    let contact_volume = Volume::new(contact).with_params(params).execute(store)?;
    if contact_volume <= config.volume_tolerance {
        store.remove_solid(contact)?;
        return Err(PipelineError::EmptyVolume { contact_volume });
    }

    match config.extraction_mode {
        ExtractionMode::Overlap => Ok((contact, contact_volume)),
        ExtractionMode::Trim => {
            store.remove_solid(contact)?;
            match Boolean::subtract(root, lid_union).with_params(params).execute(store) {
                Ok(trimmed) => Ok((trimmed, contact_volume)),
                Err(CfdPrepError::Operation(OperationError::EmptyResult)) => {
                    Err(PipelineError::EmptyVolume { contact_volume })
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}
