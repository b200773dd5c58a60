//! Python bindings for the boxnms suppression library.
//!
//! Boxes come in as `(R, 4)` float32 numpy arrays and selected indices go back
//! out as int32 arrays, in acceptance order.

use numpy::{IntoPyArray, PyArray1, PyReadonlyArray1, PyReadonlyArray2, PyUntypedArrayMethods};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use boxnms::{
    BBox, NmsConfig as RustNmsConfig, NmsError, Strategy as RustStrategy,
    Suppressor as RustSuppressor,
};

/// Convert an NmsError to a Python exception.
fn to_py_err(err: NmsError) -> PyErr {
    match err {
        NmsError::ScoreLengthMismatch { .. }
        | NmsError::FlatBufferLength { .. }
        | NmsError::InvalidThreshold { .. } => PyValueError::new_err(err.to_string()),
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

fn parse_strategy(strategy: &str) -> PyResult<RustStrategy> {
    match strategy.to_lowercase().as_str() {
        "auto" => Ok(RustStrategy::Auto),
        "greedy" => Ok(RustStrategy::Greedy),
        "bitmask" => Ok(RustStrategy::Bitmask),
        _ => Err(PyValueError::new_err(
            "strategy must be 'auto', 'greedy' or 'bitmask'",
        )),
    }
}

fn strategy_name(strategy: RustStrategy) -> &'static str {
    match strategy {
        RustStrategy::Auto => "auto",
        RustStrategy::Greedy => "greedy",
        RustStrategy::Bitmask => "bitmask",
    }
}

/// Read an `(R, 4)` box array.
fn read_boxes(bbox: &PyReadonlyArray2<'_, f32>) -> PyResult<Vec<BBox>> {
    let shape = bbox.shape();
    if shape[1] != 4 {
        return Err(PyValueError::new_err(format!(
            "bbox must have shape (R, 4), got (R, {})",
            shape[1]
        )));
    }
    BBox::from_flat(bbox.as_slice()?).map_err(to_py_err)
}

fn run_to_numpy<'py>(
    py: Python<'py>,
    suppressor: &RustSuppressor,
    bbox: PyReadonlyArray2<'py, f32>,
    score: Option<PyReadonlyArray1<'py, f32>>,
) -> PyResult<Bound<'py, PyArray1<i32>>> {
    let boxes = read_boxes(&bbox)?;
    let scores = match score.as_ref() {
        Some(score) => Some(score.as_slice()?),
        None => None,
    };
    let keep = suppressor.run(&boxes, scores).map_err(to_py_err)?;
    let keep = keep
        .into_iter()
        .map(|idx| {
            i32::try_from(idx).map_err(|_| PyValueError::new_err("box index exceeds int32 range"))
        })
        .collect::<PyResult<Vec<i32>>>()?;
    Ok(keep.into_pyarray(py))
}

/// Configuration for a suppression run.
#[pyclass]
#[derive(Clone)]
pub struct NmsConfig {
    inner: RustNmsConfig,
}

#[pymethods]
impl NmsConfig {
    /// Create a new NmsConfig.
    ///
    /// Args:
    ///     thresh: IoU at or above which a lower-priority box is dropped (default: 0.5)
    ///     limit: Maximum number of boxes to keep (default: None)
    ///     strategy: "auto", "greedy" or "bitmask" (default: "auto")
    ///     parallel: Build the overlap bitmask on multiple threads (default: False)
    ///     num_threads: Dedicated worker count, None for the shared pool (default: None)
    ///     validate_thresh: Reject thresholds outside [0, 1] (default: False)
    #[new]
    #[pyo3(signature = (
        thresh = 0.5,
        limit = None,
        strategy = "auto",
        parallel = false,
        num_threads = None,
        validate_thresh = false
    ))]
    fn new(
        thresh: f32,
        limit: Option<usize>,
        strategy: &str,
        parallel: bool,
        num_threads: Option<usize>,
        validate_thresh: bool,
    ) -> PyResult<Self> {
        let inner = RustNmsConfig {
            threshold: thresh,
            limit,
            strategy: parse_strategy(strategy)?,
            parallel,
            num_threads,
            validate_threshold: validate_thresh,
        };
        inner.validate().map_err(to_py_err)?;
        Ok(Self { inner })
    }

    /// Validate the configuration.
    fn validate(&self) -> PyResult<()> {
        self.inner.validate().map_err(to_py_err)
    }

    fn __repr__(&self) -> String {
        let limit = self
            .inner
            .limit
            .map(|l| l.to_string())
            .unwrap_or_else(|| "None".to_string());
        format!(
            "NmsConfig(thresh={}, limit={}, strategy='{}', parallel={})",
            self.inner.threshold,
            limit,
            strategy_name(self.inner.strategy),
            if self.inner.parallel { "True" } else { "False" }
        )
    }
}

/// Suppress bounding boxes according to their Jaccard overlap.
///
/// Boxes are visited from the highest score (or lowest index when no score
/// is given) and kept unless an already kept box overlaps them with IoU at or
/// above `thresh`.
///
/// Args:
///     bbox: float32 array of shape (R, 4) as (x_min, y_min, x_max, y_max)
///     thresh: Jaccard overlap threshold
///     score: float32 array of shape (R,) (default: None)
///     limit: Maximum number of boxes to return (default: None)
///     strategy: "auto", "greedy" or "bitmask" (default: "auto")
///     parallel: Build the overlap bitmask on multiple threads (default: False)
///
/// Returns:
///     int32 array of selected indices, in selection order
#[pyfunction]
#[pyo3(signature = (bbox, thresh, score = None, limit = None, strategy = "auto", parallel = false))]
fn non_maximum_suppression<'py>(
    py: Python<'py>,
    bbox: PyReadonlyArray2<'py, f32>,
    thresh: f32,
    score: Option<PyReadonlyArray1<'py, f32>>,
    limit: Option<usize>,
    strategy: &str,
    parallel: bool,
) -> PyResult<Bound<'py, PyArray1<i32>>> {
    let suppressor = RustSuppressor::new().with_config(RustNmsConfig {
        threshold: thresh,
        limit,
        strategy: parse_strategy(strategy)?,
        parallel,
        ..RustNmsConfig::default()
    });
    run_to_numpy(py, &suppressor, bbox, score)
}

/// Suppress bounding boxes with a prepared NmsConfig.
///
/// Args:
///     bbox: float32 array of shape (R, 4)
///     score: float32 array of shape (R,) (default: None)
///     config: NmsConfig (default: NmsConfig())
///
/// Returns:
///     int32 array of selected indices, in selection order
#[pyfunction]
#[pyo3(signature = (bbox, score = None, config = None))]
fn suppress<'py>(
    py: Python<'py>,
    bbox: PyReadonlyArray2<'py, f32>,
    score: Option<PyReadonlyArray1<'py, f32>>,
    config: Option<NmsConfig>,
) -> PyResult<Bound<'py, PyArray1<i32>>> {
    let cfg = config.map(|c| c.inner).unwrap_or_default();
    let suppressor = RustSuppressor::new().with_config(cfg);
    run_to_numpy(py, &suppressor, bbox, score)
}

/// Python module for boxnms non-maximum suppression.
#[pymodule]
fn _boxnms(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<NmsConfig>()?;
    m.add_function(wrap_pyfunction!(non_maximum_suppression, m)?)?;
    m.add_function(wrap_pyfunction!(suppress, m)?)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
