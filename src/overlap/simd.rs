//! Eight-lane IoU row kernel using the `wide` crate.
//!
//! Column boxes are transposed into structure-of-arrays lanes so a single
//! `f32x8` pass evaluates the clamped IoU of one row box against eight column
//! boxes. Each lane performs the same IEEE operations as [`super::iou`], so the
//! packed bits match the scalar kernel exactly.

use super::iou;
use crate::bbox::BBox;
use wide::f32x8;

const LANES: usize = 8;

/// Transposes 8 boxes into `(x_min, y_min, x_max, y_max)` lanes.
#[inline]
fn load_lanes(cols: &[BBox]) -> (f32x8, f32x8, f32x8, f32x8) {
    let mut x0 = [0.0f32; LANES];
    let mut y0 = [0.0f32; LANES];
    let mut x1 = [0.0f32; LANES];
    let mut y1 = [0.0f32; LANES];
    for (lane, b) in cols.iter().take(LANES).enumerate() {
        x0[lane] = b.x_min;
        y0[lane] = b.y_min;
        x1[lane] = b.x_max;
        y1[lane] = b.y_max;
    }
    (
        f32x8::from(x0),
        f32x8::from(y0),
        f32x8::from(x1),
        f32x8::from(y1),
    )
}

/// SIMD variant of `overlap_word_scalar`.
pub(crate) fn overlap_word_simd(cur: &BBox, cols: &[BBox], start: usize, threshold: f32) -> u64 {
    debug_assert!(cols.len() <= u64::BITS as usize);

    let cx0 = f32x8::splat(cur.x_min);
    let cy0 = f32x8::splat(cur.y_min);
    let cx1 = f32x8::splat(cur.x_max);
    let cy1 = f32x8::splat(cur.y_max);
    let cur_area = f32x8::splat(cur.area());

    let mut word = 0u64;
    let mut k = start;
    while k + LANES <= cols.len() {
        let (bx0, by0, bx1, by1) = load_lanes(&cols[k..k + LANES]);
        let width = (cx1.min(bx1) - cx0.max(bx0)).max(f32x8::ZERO);
        let height = (cy1.min(by1) - cy0.max(by0)).max(f32x8::ZERO);
        let inter = width * height;
        let area_b = (bx1 - bx0) * (by1 - by0);
        let ious = (inter / (cur_area + area_b - inter)).to_array();
        for (lane, value) in ious.iter().enumerate() {
            if *value >= threshold {
                word |= 1u64 << (k + lane);
            }
        }
        k += LANES;
    }

    // Scalar remainder
    while k < cols.len() {
        if iou(cur, &cols[k]) >= threshold {
            word |= 1u64 << k;
        }
        k += 1;
    }
    word
}
