// =============================================================================
// Linear Model Fitting (Python Bindings)
// =============================================================================
//
// Two entry points:
// - fit_ols_py: response vector + prebuilt design matrix
// - lm_py:      formula + columns passed as dicts
// =============================================================================

use std::collections::HashMap;

use pyo3::prelude::*;
use numpy::{PyReadonlyArray1, PyReadonlyArray2};
use ndarray::{Array1, Array2};

use tidyreg_core::{lm, Dataset, DesignMatrix, LinearModel, OLSConfig};

use crate::results_py::PyLinearModel;
use crate::value_error;

fn config(confidence_level: f64, rank_tolerance: f64) -> OLSConfig {
    OLSConfig {
        rank_tolerance,
        confidence_level,
    }
}

/// True if some column of `x` is constant one.
fn has_ones_column(x: &Array2<f64>) -> bool {
    x.ncols() > 0 && x.columns().into_iter().any(|c| c.iter().all(|&v| v == 1.0))
}

/// Fit ordinary least squares on a prebuilt design matrix.
///
/// Parameters
/// ----------
/// y : numpy.ndarray
///     Response vector (n,)
/// x : numpy.ndarray
///     Design matrix (n, p). Include a column of ones for an intercept.
/// names : list[str], optional
///     Column names. Default x1..xp.
/// has_intercept : bool, optional
///     Whether x contains an intercept column. Detected when None.
/// confidence_level : float
///     Level for tidy() confidence intervals. Default 0.95.
///
/// Returns
/// -------
/// LinearModel
#[pyfunction]
#[pyo3(name = "fit_ols")]
#[pyo3(signature = (y, x, names=None, has_intercept=None, confidence_level=0.95, rank_tolerance=1e-7))]
pub fn fit_ols_py(
    y: PyReadonlyArray1<f64>,
    x: PyReadonlyArray2<f64>,
    names: Option<Vec<String>>,
    has_intercept: Option<bool>,
    confidence_level: f64,
    rank_tolerance: f64,
) -> PyResult<PyLinearModel> {
    let y_array: Array1<f64> = y.as_array().to_owned();
    let x_array: Array2<f64> = x.as_array().to_owned();
    let intercept = has_intercept.unwrap_or_else(|| has_ones_column(&x_array));

    let design = DesignMatrix::from_matrix(x_array, names, intercept).map_err(value_error)?;
    let model = LinearModel::from_design(y_array, design, &config(confidence_level, rank_tolerance))
        .map_err(value_error)?;
    Ok(model.into())
}

/// Fit a linear model from an R-style formula.
///
/// Parameters
/// ----------
/// formula : str
///     e.g. "sales ~ ads + C(region) + ads:region"
/// numeric : dict[str, array-like]
///     Numeric columns by name.
/// categorical : dict[str, list[str]], optional
///     Categorical columns by name. Levels are sorted unless given in
///     ``levels``; the first level is the reference.
/// levels : dict[str, list[str]], optional
///     Explicit level order for categorical columns.
///
/// Returns
/// -------
/// LinearModel
///
/// Examples
/// --------
/// >>> from tidyreg import _tidyreg as tr
/// >>> m = tr.lm("y ~ x", {"y": [2.0, 4.0, 5.0, 4.0, 5.0], "x": [1.0, 2.0, 3.0, 4.0, 5.0]})
/// >>> m.params
/// array([2.2, 0.6])
#[pyfunction]
#[pyo3(name = "lm")]
#[pyo3(signature = (formula, numeric, categorical=None, levels=None, confidence_level=0.95, rank_tolerance=1e-7))]
pub fn lm_py(
    formula: &str,
    numeric: HashMap<String, Vec<f64>>,
    categorical: Option<HashMap<String, Vec<String>>>,
    levels: Option<HashMap<String, Vec<String>>>,
    confidence_level: f64,
    rank_tolerance: f64,
) -> PyResult<PyLinearModel> {
    let mut levels = levels.unwrap_or_default();

    // Sort names so column order, and therefore error messages, are stable
    let mut numeric: Vec<_> = numeric.into_iter().collect();
    numeric.sort_by(|a, b| a.0.cmp(&b.0));
    let mut categorical: Vec<_> = categorical.unwrap_or_default().into_iter().collect();
    categorical.sort_by(|a, b| a.0.cmp(&b.0));

    let mut dataset = Dataset::new();
    for (name, values) in numeric {
        dataset = dataset.with_numeric(&name, values).map_err(value_error)?;
    }
    for (name, labels) in categorical {
        dataset = match levels.remove(&name) {
            Some(lv) => dataset.with_categorical(&name, &labels, &lv),
            None => dataset.with_factor(&name, &labels),
        }
        .map_err(value_error)?;
    }
    if let Some(name) = levels.keys().next() {
        return Err(value_error(tidyreg_core::TidyRegError::UnknownColumn(name.clone())));
    }

    let model = lm(formula, &dataset, &config(confidence_level, rank_tolerance)).map_err(value_error)?;
    Ok(model.into())
}
