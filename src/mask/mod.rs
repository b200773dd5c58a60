//! Tiled pairwise-overlap bitmask and its sequential reduction.
//!
//! Boxes (already in priority order) are grouped into tiles of [`TILE`] boxes.
//! For every box `r` the mask stores one `u64` per tile; bit `k` of word
//! `col_tile` is set when `r` overlaps box `col_tile * TILE + k` at or above the
//! threshold. Inside `r`'s own tile only later boxes are tested, so the
//! diagonal block is strictly upper-triangular. Across tiles every pair is
//! tested.
//!
//! Each word is written by exactly one row computation, which makes rows
//! independent and lets the `rayon` builder fill them concurrently. The
//! reduction then walks boxes in priority order and clears suppressed boxes
//! from a per-tile "remaining" bitset, costing `O(R * col_blocks)` rather than
//! re-evaluating overlaps.

use crate::bbox::{permute, BBox};
use crate::order::{map_back, priority_order};
use crate::overlap::overlap_word;
use crate::trace::{trace_event, trace_span};
use crate::util::NmsResult;
use std::borrow::Cow;

#[cfg(feature = "rayon")]
pub(crate) mod pool;
#[cfg(feature = "rayon")]
pub mod rayon;

/// Number of boxes per tile, one bit per box in a mask word.
pub const TILE: usize = u64::BITS as usize;

/// Returns the number of tiles needed for `len` boxes.
#[inline]
pub fn col_blocks(len: usize) -> usize {
    len.div_ceil(TILE)
}

/// Dense `len x col_blocks` matrix of overlap words.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairwiseMask {
    words: Vec<u64>,
    len: usize,
    col_blocks: usize,
}

impl PairwiseMask {
    /// Builds the mask for boxes in priority order on the calling thread.
    pub fn build(boxes: &[BBox], threshold: f32) -> Self {
        let mut mask = Self::zeroed(boxes.len());
        if mask.col_blocks == 0 {
            return mask;
        }
        for (r, row) in mask.words.chunks_mut(mask.col_blocks).enumerate() {
            fill_row(boxes, r, row, threshold);
        }
        mask
    }

    pub(crate) fn zeroed(len: usize) -> Self {
        let col_blocks = col_blocks(len);
        Self {
            words: vec![0u64; len * col_blocks],
            len,
            col_blocks,
        }
    }

    #[cfg_attr(not(feature = "rayon"), allow(dead_code))]
    pub(crate) fn words_mut(&mut self) -> &mut [u64] {
        &mut self.words
    }

    /// Returns the number of boxes covered by the mask.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true when the mask covers no boxes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of words per row.
    pub fn col_blocks(&self) -> usize {
        self.col_blocks
    }

    /// Returns the overlap words of box `r`.
    pub fn row(&self, r: usize) -> Option<&[u64]> {
        if r >= self.len {
            return None;
        }
        let start = r * self.col_blocks;
        self.words.get(start..start + self.col_blocks)
    }

    /// Returns whether box `r` was found to overlap box `c`.
    ///
    /// Only pairs actually tested are reported; inside a tile that means
    /// `c > r`.
    pub fn overlaps(&self, r: usize, c: usize) -> bool {
        if c >= self.len {
            return false;
        }
        self.row(r)
            .map(|row| row[c / TILE] & (1u64 << (c % TILE)) != 0)
            .unwrap_or(false)
    }

    /// Greedily selects boxes from the mask, in priority order.
    ///
    /// Returns positions in priority order, stopping once `limit` are kept.
    pub fn reduce(&self, limit: Option<usize>) -> Vec<usize> {
        let mut selected = Vec::new();
        if limit == Some(0) {
            return selected;
        }

        let mut remaining = vec![u64::MAX; self.col_blocks];
        for i in 0..self.len {
            let tile = i / TILE;
            let bit = 1u64 << (i % TILE);
            if remaining[tile] & bit == 0 {
                continue;
            }

            selected.push(i);
            if limit.is_some_and(|limit| selected.len() >= limit) {
                break;
            }

            let row = &self.words[i * self.col_blocks..(i + 1) * self.col_blocks];
            for (rem, word) in remaining.iter_mut().zip(row) {
                *rem &= !word;
            }
        }
        selected
    }
}

/// Computes all tile words of row `r` into `row`.
pub(crate) fn fill_row(boxes: &[BBox], r: usize, row: &mut [u64], threshold: f32) {
    let cur = &boxes[r];
    let row_tile = r / TILE;
    for (col_tile, word) in row.iter_mut().enumerate() {
        let col_start = col_tile * TILE;
        let col_end = (col_start + TILE).min(boxes.len());
        let start = if col_tile == row_tile {
            r - col_start + 1
        } else {
            0
        };
        *word = overlap_word(cur, &boxes[col_start..col_end], start, threshold);
    }
}

/// Runs tiled bitmask suppression with the single-threaded builder.
///
/// Returns kept indices in acceptance order, same contract as
/// [`crate::greedy::greedy_nms`].
pub fn bitmask_nms(
    boxes: &[BBox],
    threshold: f32,
    scores: Option<&[f32]>,
    limit: Option<usize>,
) -> NmsResult<Vec<usize>> {
    bitmask_with(boxes, threshold, scores, limit, |sorted, threshold| {
        Ok(PairwiseMask::build(sorted, threshold))
    })
}

/// Shared reorder / build / reduce / map-back pipeline.
///
/// `build` must return a fully materialized mask; reduction starts only after
/// it returns.
pub(crate) fn bitmask_with<F>(
    boxes: &[BBox],
    threshold: f32,
    scores: Option<&[f32]>,
    limit: Option<usize>,
    build: F,
) -> NmsResult<Vec<usize>>
where
    F: FnOnce(&[BBox], f32) -> NmsResult<PairwiseMask>,
{
    let order = priority_order(boxes.len(), scores)?;
    if boxes.is_empty() {
        return Ok(Vec::new());
    }

    let sorted: Cow<'_, [BBox]> = match order.as_deref() {
        Some(order) => Cow::Owned(permute(boxes, order)),
        None => Cow::Borrowed(boxes),
    };

    let mask = {
        let _span = trace_span!(
            "build_mask",
            boxes = sorted.len(),
            col_blocks = col_blocks(sorted.len())
        )
        .entered();
        build(&*sorted, threshold)?
    };

    let mut selected = mask.reduce(limit);
    map_back(&mut selected, order.as_deref());

    trace_event!("mask_reduced", count = selected.len());
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::{bitmask_nms, col_blocks, PairwiseMask, TILE};
    use crate::bbox::BBox;

    fn row_of_boxes(n: usize, step: f32) -> Vec<BBox> {
        (0..n)
            .map(|i| {
                let x = i as f32 * step;
                BBox::new(x, 0.0, x + 10.0, 10.0)
            })
            .collect()
    }

    #[test]
    fn col_blocks_rounds_up() {
        assert_eq!(col_blocks(0), 0);
        assert_eq!(col_blocks(1), 1);
        assert_eq!(col_blocks(TILE), 1);
        assert_eq!(col_blocks(TILE + 1), 2);
    }

    #[test]
    fn diagonal_block_is_upper_triangular() {
        let boxes = vec![BBox::new(0.0, 0.0, 10.0, 10.0); 5];
        let mask = PairwiseMask::build(&boxes, 0.5);
        assert_eq!(mask.col_blocks(), 1);
        assert_eq!(mask.row(0).unwrap(), &[0b11110]);
        assert_eq!(mask.row(3).unwrap(), &[0b10000]);
        assert_eq!(mask.row(4).unwrap(), &[0]);
        assert!(mask.overlaps(1, 2));
        assert!(!mask.overlaps(2, 1));
    }

    #[test]
    fn cross_tile_blocks_are_full() {
        let boxes = vec![BBox::new(0.0, 0.0, 10.0, 10.0); TILE + 3];
        let mask = PairwiseMask::build(&boxes, 0.5);
        assert_eq!(mask.col_blocks(), 2);
        // Later tile sees every box of the earlier tile.
        assert_eq!(mask.row(TILE + 1).unwrap()[0], u64::MAX);
        assert_eq!(mask.row(TILE + 1).unwrap()[1], 0b100);
        assert_eq!(mask.row(0).unwrap()[1], 0b111);
    }

    #[test]
    fn reduce_keeps_first_of_each_cluster() {
        // Boxes 0,1 overlap heavily, 2 is alone, 3,4 overlap heavily.
        let boxes = vec![
            BBox::new(0.0, 0.0, 10.0, 10.0),
            BBox::new(0.5, 0.0, 10.5, 10.0),
            BBox::new(50.0, 0.0, 60.0, 10.0),
            BBox::new(100.0, 0.0, 110.0, 10.0),
            BBox::new(100.0, 0.5, 110.0, 10.5),
        ];
        let mask = PairwiseMask::build(&boxes, 0.5);
        assert_eq!(mask.reduce(None), vec![0, 2, 3]);
        assert_eq!(mask.reduce(Some(2)), vec![0, 2]);
        assert!(mask.reduce(Some(0)).is_empty());
    }

    #[test]
    fn suppressed_boxes_do_not_suppress() {
        // 0 suppresses 1; 1 would suppress 2 but is itself gone.
        let boxes = row_of_boxes(3, 4.0);
        let keep = bitmask_nms(&boxes, 0.4, None, None).unwrap();
        assert_eq!(keep, vec![0, 2]);
    }

    #[test]
    fn spans_several_tiles() {
        let boxes = row_of_boxes(3 * TILE + 5, 20.0);
        let keep = bitmask_nms(&boxes, 0.5, None, None).unwrap();
        assert_eq!(keep.len(), boxes.len());
    }

    #[test]
    fn empty_input_builds_empty_mask() {
        let mask = PairwiseMask::build(&[], 0.5);
        assert!(mask.is_empty());
        assert!(mask.reduce(None).is_empty());
        assert!(bitmask_nms(&[], 0.5, None, None).unwrap().is_empty());
    }
}
