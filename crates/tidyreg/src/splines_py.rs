// =============================================================================
// Spline Basis Functions
// =============================================================================
//
// B-spline basis matrices, the same columns `bs(x, df)` contributes to a
// formula.
// =============================================================================

use pyo3::prelude::*;
use numpy::{IntoPyArray, PyArray2, PyReadonlyArray1};

use tidyreg_core::splines;

use crate::value_error;

/// Compute B-spline basis matrix.
///
/// Interior knots sit at quantiles of ``x``, as in R's ``splines::bs``.
///
/// Parameters
/// ----------
/// x : numpy.ndarray
///     Data points (1D array of length n)
/// df : int
///     Degrees of freedom (number of basis columns returned)
/// degree : int, optional
///     Spline degree. Default 3 (cubic splines).
/// boundary_knots : tuple, optional
///     (min, max) boundary knots. If None, uses data range.
/// include_intercept : bool, optional
///     Whether to keep the first basis function. Default False.
///
/// Returns
/// -------
/// numpy.ndarray
///     Basis matrix of shape (n, df)
///
/// Examples
/// --------
/// >>> from tidyreg import _tidyreg as tr
/// >>> import numpy as np
/// >>> x = np.linspace(0, 10, 100)
/// >>> basis = tr.bs(x, df=5)
/// >>> print(basis.shape)
/// (100, 5)
#[pyfunction]
#[pyo3(name = "bs")]
#[pyo3(signature = (x, df, degree=3, boundary_knots=None, include_intercept=false))]
pub fn bs_py<'py>(
    py: Python<'py>,
    x: PyReadonlyArray1<f64>,
    df: usize,
    degree: usize,
    boundary_knots: Option<(f64, f64)>,
    include_intercept: bool,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let x_array = x.as_array().to_owned();
    let result = splines::bs_basis(&x_array, df, degree, boundary_knots, include_intercept)
        .map_err(value_error)?;
    Ok(result.into_pyarray_bound(py))
}
