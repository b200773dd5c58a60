//! Axis-aligned bounding boxes.
//!
//! A `BBox` stores `(x_min, y_min, x_max, y_max)` as given. The ordering
//! `x_min <= x_max`, `y_min <= y_max` is expected but never enforced; a
//! malformed box simply has a zero or negative area and takes part in overlap
//! computations with that value.

use crate::util::{NmsError, NmsResult};

/// Axis-aligned box in corner form.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BBox {
    /// Left edge.
    pub x_min: f32,
    /// Top edge.
    pub y_min: f32,
    /// Right edge.
    pub x_max: f32,
    /// Bottom edge.
    pub y_max: f32,
}

impl BBox {
    /// Creates a box from its corner coordinates.
    pub const fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Returns `x_max - x_min` (negative for malformed boxes).
    #[inline]
    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    /// Returns `y_max - y_min` (negative for malformed boxes).
    #[inline]
    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    /// Returns `width * height` without clamping.
    #[inline]
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Returns the coordinates as `[x_min, y_min, x_max, y_max]`.
    pub fn to_array(self) -> [f32; 4] {
        [self.x_min, self.y_min, self.x_max, self.y_max]
    }

    /// Reads boxes from a row-major `(R, 4)` coordinate buffer.
    pub fn from_flat(data: &[f32]) -> NmsResult<Vec<BBox>> {
        if data.len() % 4 != 0 {
            return Err(NmsError::FlatBufferLength { len: data.len() });
        }
        Ok(data
            .chunks_exact(4)
            .map(|c| BBox::new(c[0], c[1], c[2], c[3]))
            .collect())
    }
}

impl From<[f32; 4]> for BBox {
    fn from(value: [f32; 4]) -> Self {
        BBox::new(value[0], value[1], value[2], value[3])
    }
}

impl From<BBox> for [f32; 4] {
    fn from(value: BBox) -> Self {
        value.to_array()
    }
}

/// Gathers `boxes` in the given index order.
pub(crate) fn permute(boxes: &[BBox], order: &[usize]) -> Vec<BBox> {
    order.iter().map(|&idx| boxes[idx]).collect()
}
