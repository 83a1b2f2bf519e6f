// =============================================================================
// Design Matrix Functions
// =============================================================================
//
// Categorical encoding exposed on its own, for callers that assemble their
// own design matrices before `fit_ols`.
// =============================================================================

use pyo3::prelude::*;
use numpy::{IntoPyArray, PyArray1, PyArray2};

use tidyreg_core::design_matrix;

use crate::value_error;

/// Encode a categorical variable as k-1 indicator columns.
///
/// Parameters
/// ----------
/// values : list[str]
///     Label for each observation
/// levels : list[str], optional
///     Ordered levels; the first is the reference. Default: sorted
///     distinct labels.
/// var_name : str
///     Variable name, used as the column-name prefix
///
/// Returns
/// -------
/// tuple[numpy.ndarray, list[str], list[int], list[str]]
///     (dummy_matrix, column_names, level_indices, levels)
///
/// Raises
/// ------
/// ValueError
///     If a label is not one of ``levels``.
#[pyfunction]
#[pyo3(name = "encode_categorical")]
#[pyo3(signature = (values, levels=None, var_name="x"))]
pub fn encode_categorical_py<'py>(
    py: Python<'py>,
    values: Vec<String>,
    levels: Option<Vec<String>>,
    var_name: &str,
) -> PyResult<(Bound<'py, PyArray2<f64>>, Vec<String>, Vec<usize>, Vec<String>)> {
    let levels = levels.unwrap_or_else(|| design_matrix::factorize_strings(&values).0);
    let enc = design_matrix::encode_categorical(&values, &levels, var_name).map_err(value_error)?;
    Ok((
        enc.matrix.into_pyarray_bound(py),
        enc.names,
        enc.indices,
        enc.levels,
    ))
}

/// Categorical factorization: string values → (sorted unique levels, integer codes).
///
/// Parameters
/// ----------
/// values : list[str]
///     String values for each observation
///
/// Returns
/// -------
/// tuple[list[str], numpy.ndarray[uint32]]
///     (sorted_unique_levels, integer_codes) matching np.unique(return_inverse=True) output
#[pyfunction]
#[pyo3(name = "factorize_strings")]
pub fn factorize_strings_py<'py>(
    py: Python<'py>,
    values: Vec<String>,
) -> PyResult<(Vec<String>, Bound<'py, PyArray1<u32>>)> {
    let (levels, codes) = design_matrix::factorize_strings(&values);
    Ok((levels, codes.into_pyarray_bound(py)))
}
