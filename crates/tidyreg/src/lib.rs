// =============================================================================
// TidyReg Python Bindings
// =============================================================================
//
// This module creates the bridge between Rust and Python using PyO3.
// It wraps the pure Rust code from `tidyreg-core` and exposes it as
// the extension module `tidyreg._tidyreg`.
//
// STRUCTURE:
// ----------
// - `fitting_py`:       fit_ols / lm entry points
// - `results_py`:       the `LinearModel` Python class
// - `design_matrix_py`: categorical encoding helpers
// - `formula_py`:       formula parsing
// - `splines_py`:       B-spline basis
//
// FOR MAINTAINERS:
// ----------------
// When adding new functionality:
// 1. Implement the logic in `tidyreg-core` first
// 2. Create a Python wrapper in the matching *_py module
// 3. Add it to the module in the `_tidyreg` function at the bottom
//
// =============================================================================

use pyo3::prelude::*;
use pyo3::exceptions::PyValueError;

use tidyreg_core::TidyRegError;

mod design_matrix_py;
mod fitting_py;
mod formula_py;
mod results_py;
mod splines_py;

use design_matrix_py::{encode_categorical_py, factorize_strings_py};
use fitting_py::{fit_ols_py, lm_py};
use formula_py::parse_formula_py;
use results_py::PyLinearModel;
use splines_py::bs_py;

/// Every core error surfaces in Python as `ValueError`.
pub(crate) fn value_error(e: TidyRegError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

// =============================================================================
// Module Registration
// =============================================================================

/// TidyReg: linear regression with R-style formulas and tidy summaries.
///
/// This is the internal Rust module. Users should import from the
/// Python wrapper: `import tidyreg`
#[pymodule]
fn _tidyreg(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyLinearModel>()?;

    m.add_function(wrap_pyfunction!(fit_ols_py, m)?)?;
    m.add_function(wrap_pyfunction!(lm_py, m)?)?;

    m.add_function(wrap_pyfunction!(encode_categorical_py, m)?)?;
    m.add_function(wrap_pyfunction!(factorize_strings_py, m)?)?;
    m.add_function(wrap_pyfunction!(parse_formula_py, m)?)?;
    m.add_function(wrap_pyfunction!(bs_py, m)?)?;

    Ok(())
}
