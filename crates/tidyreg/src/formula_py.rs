// =============================================================================
// Formula Parsing (Python Bindings)
// =============================================================================
//
// Wraps the Rust formula parser for Python. Returns the parsed formula as a
// dict so callers can inspect term expansion without fitting.
// =============================================================================

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use tidyreg_core::{formula, Term};

use crate::value_error;

fn term_kind(term: &Term) -> &'static str {
    match term {
        Term::Numeric(_) => "numeric",
        Term::Categorical(_) => "categorical",
        Term::Interaction(_) => "interaction",
        Term::Power { .. } => "power",
        Term::Log(_) => "log",
        Term::BSpline { .. } => "bspline",
    }
}

/// Parse a formula string into structured components.
///
/// Parameters
/// ----------
/// formula_str : str
///     R-style formula like "y ~ x1*x2 + C(cat) + bs(age, df=5)"
///
/// Returns
/// -------
/// dict
///     Parsed formula with keys:
///     - response: str
///     - terms: list[dict] with 'label', 'kind' and 'variables', in
///       model-matrix order
///     - has_intercept: bool
#[pyfunction]
#[pyo3(name = "parse_formula")]
pub fn parse_formula_py<'py>(py: Python<'py>, formula_str: &str) -> PyResult<Bound<'py, PyDict>> {
    let parsed = formula::parse_formula(formula_str).map_err(value_error)?;

    let terms = PyList::empty_bound(py);
    for term in parsed.terms() {
        let dict = PyDict::new_bound(py);
        dict.set_item("label", term.to_string())?;
        dict.set_item("kind", term_kind(term))?;
        dict.set_item("variables", term.variables())?;
        terms.append(dict)?;
    }

    let result = PyDict::new_bound(py);
    result.set_item("response", parsed.response.to_string())?;
    result.set_item("terms", terms)?;
    result.set_item("has_intercept", parsed.has_intercept)?;
    Ok(result)
}
