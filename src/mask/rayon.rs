//! Rayon-parallel bitmask builder (feature-gated).
//!
//! Rows of the mask are disjoint `col_blocks`-word slices, so each worker
//! fills whole rows through `par_chunks_mut` without any synchronization. The
//! parallel iterator returns only after every row is written, which is the
//! barrier the sequential reduction relies on.

use crate::bbox::BBox;
use crate::mask::pool::pool_for;
use crate::mask::{bitmask_with, fill_row, PairwiseMask};
use crate::util::NmsResult;
use rayon::prelude::*;

/// Row-parallel mask construction on the current rayon pool.
pub fn build_mask_par(boxes: &[BBox], threshold: f32) -> PairwiseMask {
    let mut mask = PairwiseMask::zeroed(boxes.len());
    let col_blocks = mask.col_blocks();
    if col_blocks == 0 {
        return mask;
    }
    mask.words_mut()
        .par_chunks_mut(col_blocks)
        .enumerate()
        .for_each(|(r, row)| fill_row(boxes, r, row, threshold));
    mask
}

/// Runs tiled bitmask suppression with the parallel builder.
///
/// With `num_threads`, the mask is built inside a cached dedicated pool of that
/// size; otherwise the global rayon pool is used.
pub fn bitmask_nms_par(
    boxes: &[BBox],
    threshold: f32,
    scores: Option<&[f32]>,
    limit: Option<usize>,
    num_threads: Option<usize>,
) -> NmsResult<Vec<usize>> {
    bitmask_with(boxes, threshold, scores, limit, |sorted, threshold| {
        match num_threads {
            Some(threads) => {
                let pool = pool_for(threads)?;
                Ok(pool.install(|| build_mask_par(sorted, threshold)))
            }
            None => Ok(build_mask_par(sorted, threshold)),
        }
    })
}
