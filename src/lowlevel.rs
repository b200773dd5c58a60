//! Low-level building blocks for custom suppression pipelines.
//!
//! These expose the individual selection algorithms and the pairwise mask
//! directly. Most users should prefer [`crate::Suppressor`] or
//! [`crate::non_maximum_suppression`].

pub use crate::greedy::greedy_nms;
pub use crate::mask::{bitmask_nms, col_blocks, PairwiseMask, TILE};
#[cfg(feature = "rayon")]
pub use crate::mask::rayon::{bitmask_nms_par, build_mask_par};
pub use crate::order::priority_order;
pub use crate::overlap::{iou, iou_masked};
