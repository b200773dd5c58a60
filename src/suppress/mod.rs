//! High-level suppression entry points and strategy dispatch.
//!
//! [`Suppressor`] validates an [`NmsConfig`] and routes each call to the
//! greedy selector or to the tiled bitmask pipeline. Both return the same
//! indices in the same acceptance order for well-formed boxes, so the choice
//! is purely a performance concern.

use crate::bbox::BBox;
use crate::greedy::greedy_nms;
use crate::mask::bitmask_nms;
use crate::trace::{trace_event, trace_span};
use crate::util::{NmsError, NmsResult};

/// Which selection algorithm to run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Bitmask when the build runs in parallel, greedy otherwise.
    #[default]
    Auto,
    /// Sequential greedy scan over coordinates.
    Greedy,
    /// Tiled pairwise bitmask followed by sequential reduction.
    Bitmask,
}

/// Configuration for a suppression run.
#[derive(Clone, Debug)]
pub struct NmsConfig {
    /// Minimum IoU at which a lower-priority box is suppressed.
    pub threshold: f32,
    /// Maximum number of boxes to keep.
    pub limit: Option<usize>,
    /// Selection algorithm.
    pub strategy: Strategy,
    /// Build the bitmask on multiple threads (requires the `rayon` feature).
    pub parallel: bool,
    /// Dedicated worker count for parallel builds; `None` uses the global pool.
    pub num_threads: Option<usize>,
    /// Reject thresholds outside `[0, 1]` instead of applying them as given.
    pub validate_threshold: bool,
}

impl Default for NmsConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            limit: None,
            strategy: Strategy::Auto,
            parallel: false,
            num_threads: None,
            validate_threshold: false,
        }
    }
}

impl NmsConfig {
    /// Checks the configuration against this build.
    pub fn validate(&self) -> NmsResult<()> {
        let threshold = self.threshold;
        if threshold.is_nan()
            || (self.validate_threshold && !(0.0..=1.0).contains(&threshold))
        {
            return Err(NmsError::InvalidThreshold { threshold });
        }
        if self.parallel && self.resolve_strategy() == Strategy::Bitmask && !cfg!(feature = "rayon") {
            return Err(NmsError::ParallelUnavailable);
        }
        Ok(())
    }

    /// Resolves `Auto`: the bitmask only pays off when built in parallel.
    pub fn resolve_strategy(&self) -> Strategy {
        match self.strategy {
            Strategy::Auto if self.parallel => Strategy::Bitmask,
            Strategy::Auto => Strategy::Greedy,
            other => other,
        }
    }
}

/// Configured suppression runner.
#[derive(Clone, Debug, Default)]
pub struct Suppressor {
    cfg: NmsConfig,
}

impl Suppressor {
    /// Creates a suppressor with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: NmsConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &NmsConfig {
        &self.cfg
    }

    /// Suppresses `boxes` and returns kept indices in acceptance order.
    ///
    /// `scores`, when given, must have one entry per box.
    pub fn run(&self, boxes: &[BBox], scores: Option<&[f32]>) -> NmsResult<Vec<usize>> {
        let cfg = &self.cfg;
        cfg.validate()?;

        let strategy = cfg.resolve_strategy();
        let _span = trace_span!(
            "nms",
            boxes = boxes.len(),
            strategy = ?strategy,
            parallel = cfg.parallel
        )
        .entered();

        let keep = match strategy {
            Strategy::Greedy => greedy_nms(boxes, cfg.threshold, scores, cfg.limit)?,
            _ if cfg.parallel => self.run_parallel(boxes, scores)?,
            _ => bitmask_nms(boxes, cfg.threshold, scores, cfg.limit)?,
        };

        trace_event!("nms_selected", count = keep.len());
        Ok(keep)
    }

    /// Same as [`Suppressor::run`] for a row-major `(R, 4)` coordinate buffer.
    pub fn run_flat(&self, boxes: &[f32], scores: Option<&[f32]>) -> NmsResult<Vec<usize>> {
        let boxes = BBox::from_flat(boxes)?;
        self.run(&boxes, scores)
    }

    #[cfg(feature = "rayon")]
    fn run_parallel(&self, boxes: &[BBox], scores: Option<&[f32]>) -> NmsResult<Vec<usize>> {
        crate::mask::rayon::bitmask_nms_par(
            boxes,
            self.cfg.threshold,
            scores,
            self.cfg.limit,
            self.cfg.num_threads,
        )
    }

    #[cfg(not(feature = "rayon"))]
    fn run_parallel(&self, _boxes: &[BBox], _scores: Option<&[f32]>) -> NmsResult<Vec<usize>> {
        Err(NmsError::ParallelUnavailable)
    }
}

/// Suppresses boxes by Jaccard overlap.
///
/// Boxes are visited by descending `scores` (ascending index when absent) and
/// a box is kept unless an already kept box overlaps it with IoU at or above
/// `threshold`. At most `limit` indices are returned, in the order they were
/// accepted. Runs the sequential greedy scan.
pub fn non_maximum_suppression(
    boxes: &[BBox],
    threshold: f32,
    scores: Option<&[f32]>,
    limit: Option<usize>,
) -> NmsResult<Vec<usize>> {
    Suppressor::new()
        .with_config(NmsConfig {
            threshold,
            limit,
            ..NmsConfig::default()
        })
        .run(boxes, scores)
}
