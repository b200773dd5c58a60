//! Jaccard overlap (IoU) between boxes.
//!
//! Two intersection formulas are provided. [`iou`] clamps the intersection
//! extents at zero and is what the tiled bitmask builder uses. [`iou_masked`]
//! multiplies the raw extents only when the intersection is non-empty on both
//! axes and is what the greedy selector uses with precomputed areas. For
//! well-formed boxes both return bit-identical values.
//!
//! Neither function special-cases an empty union: two coincident zero-area
//! boxes produce `0 / 0 = NaN`. NaN never compares `>=` a threshold, so such
//! a pair never suppresses. Callers that need other behavior must filter
//! degenerate boxes first.

use crate::bbox::BBox;

#[cfg(feature = "simd")]
pub(crate) mod simd;

/// Returns the IoU of `a` and `b` using the clamped intersection formula.
#[inline]
pub fn iou(a: &BBox, b: &BBox) -> f32 {
    let left = a.x_min.max(b.x_min);
    let right = a.x_max.min(b.x_max);
    let top = a.y_min.max(b.y_min);
    let bottom = a.y_max.min(b.y_max);
    let width = (right - left).max(0.0);
    let height = (bottom - top).max(0.0);
    let inter = width * height;
    inter / (a.area() + b.area() - inter)
}

/// Returns the IoU of `a` and `b` given their precomputed areas.
///
/// The intersection counts only when `left < right` and `top < bottom`.
#[inline]
pub fn iou_masked(a: &BBox, area_a: f32, b: &BBox, area_b: f32) -> f32 {
    let left = a.x_min.max(b.x_min);
    let right = a.x_max.min(b.x_max);
    let top = a.y_min.max(b.y_min);
    let bottom = a.y_max.min(b.y_max);
    let inter = if left < right && top < bottom {
        (right - left) * (bottom - top)
    } else {
        0.0
    };
    inter / (area_a + area_b - inter)
}

/// Packs overlap bits of `cur` against `cols[start..]` into one tile word.
///
/// Bit `k` is set iff `iou(cur, cols[k]) >= threshold`.
#[inline]
pub(crate) fn overlap_word(cur: &BBox, cols: &[BBox], start: usize, threshold: f32) -> u64 {
    #[cfg(feature = "simd")]
    {
        simd::overlap_word_simd(cur, cols, start, threshold)
    }
    #[cfg(not(feature = "simd"))]
    {
        overlap_word_scalar(cur, cols, start, threshold)
    }
}

#[cfg_attr(feature = "simd", allow(dead_code))]
pub(crate) fn overlap_word_scalar(cur: &BBox, cols: &[BBox], start: usize, threshold: f32) -> u64 {
    debug_assert!(cols.len() <= u64::BITS as usize);
    let mut word = 0u64;
    for (k, col) in cols.iter().enumerate().skip(start) {
        if iou(cur, col) >= threshold {
            word |= 1u64 << k;
        }
    }
    word
}
