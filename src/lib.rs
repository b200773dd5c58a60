//! boxnms is a CPU-first non-maximum suppression library for object detection.
//!
//! Boxes are pruned by Jaccard overlap (IoU), keeping higher-scored boxes
//! first. Two interchangeable algorithms are provided: a greedy scan over box
//! coordinates and a tiled pairwise bitmask that can be built in parallel via
//! the `rayon` feature and vectorized via the `simd` feature.

pub mod bbox;
mod greedy;
pub mod lowlevel;
mod mask;
mod order;
pub mod overlap;
pub mod suppress;
mod trace;
pub mod util;

pub use bbox::BBox;
pub use overlap::iou;
pub use suppress::{non_maximum_suppression, NmsConfig, Strategy, Suppressor};
pub use util::{NmsError, NmsResult};
