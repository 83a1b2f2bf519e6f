// =============================================================================
// Linear Model Results
// =============================================================================
//
// Python view of a fitted `LinearModel`. Attribute names follow statsmodels
// (`params`, `bse`, `tvalues`, ...) and the summaries follow broom
// (`tidy`, `glance`, `augment`).
// =============================================================================

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray2};

use tidyreg_core::LinearModel;

use crate::value_error;

/// Results from fitting a linear model by ordinary least squares.
#[pyclass(name = "LinearModel")]
#[derive(Clone)]
pub struct PyLinearModel {
    pub(crate) inner: LinearModel,
}

impl From<LinearModel> for PyLinearModel {
    fn from(inner: LinearModel) -> Self {
        Self { inner }
    }
}

#[pymethods]
impl PyLinearModel {
    /// Fitted coefficients, one per column of the design matrix.
    #[getter]
    fn params<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.coefficients().clone().into_pyarray_bound(py)
    }

    /// Standard errors of the coefficients.
    #[getter]
    fn bse<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.std_errors().clone().into_pyarray_bound(py)
    }

    #[getter]
    fn tvalues<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.t_values().clone().into_pyarray_bound(py)
    }

    /// Two-sided p-values from Student's t.
    #[getter]
    fn pvalues<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.p_values().clone().into_pyarray_bound(py)
    }

    #[getter]
    fn fittedvalues<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.fitted_values().clone().into_pyarray_bound(py)
    }

    /// Response residuals y - Xβ.
    #[getter]
    fn resid<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.inner.residuals().clone().into_pyarray_bound(py)
    }

    /// Coefficient covariance matrix σ²(X'X)⁻¹.
    fn cov_params<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.inner.covariance().into_pyarray_bound(py)
    }

    /// Name of each coefficient, e.g. ["(Intercept)", "x", "regionsouth"].
    #[getter]
    fn term_names(&self) -> Vec<String> {
        self.inner.term_names().to_vec()
    }

    #[getter]
    fn formula(&self) -> Option<String> {
        self.inner.formula().map(str::to_string)
    }

    #[getter]
    fn scale(&self) -> f64 {
        self.inner.sigma().powi(2)
    }

    #[getter]
    fn nobs(&self) -> usize {
        self.inner.nobs()
    }

    #[getter]
    fn df_resid(&self) -> usize {
        self.inner.df_residual()
    }

    #[getter]
    fn has_intercept(&self) -> bool {
        self.inner.has_intercept()
    }

    /// Per-coefficient summary.
    ///
    /// Returns
    /// -------
    /// list[dict]
    ///     One dict per coefficient with keys term, estimate, std_error,
    ///     statistic, p_value, conf_low, conf_high.
    fn tidy<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyList>> {
        let rows = PyList::empty_bound(py);
        for row in &self.inner.tidy() {
            let dict = PyDict::new_bound(py);
            dict.set_item("term", &row.term)?;
            dict.set_item("estimate", row.estimate)?;
            dict.set_item("std_error", row.std_error)?;
            dict.set_item("statistic", row.statistic)?;
            dict.set_item("p_value", row.p_value)?;
            dict.set_item("conf_low", row.conf_low)?;
            dict.set_item("conf_high", row.conf_high)?;
            rows.append(dict)?;
        }
        Ok(rows)
    }

    /// Whole-model statistics as a dict.
    fn glance<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let g = self.inner.glance();
        let dict = PyDict::new_bound(py);
        dict.set_item("r_squared", g.r_squared)?;
        dict.set_item("adj_r_squared", g.adj_r_squared)?;
        dict.set_item("sigma", g.sigma)?;
        dict.set_item("statistic", g.statistic)?;
        dict.set_item("p_value", g.p_value)?;
        dict.set_item("df", g.df)?;
        dict.set_item("log_lik", g.log_lik)?;
        dict.set_item("aic", g.aic)?;
        dict.set_item("bic", g.bic)?;
        dict.set_item("deviance", g.deviance)?;
        dict.set_item("df_residual", g.df_residual)?;
        dict.set_item("nobs", g.nobs)?;
        Ok(dict)
    }

    /// Per-observation diagnostics.
    ///
    /// Returns
    /// -------
    /// dict[str, numpy.ndarray]
    ///     Column-oriented, ready for ``pandas.DataFrame(model.augment())``.
    ///     Keys: response, fitted, resid, hat, sigma, cooksd, std_resid.
    fn augment<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let rows = self.inner.augment();
        let column = |f: fn(&tidyreg_core::AugmentRow) -> f64| -> Vec<f64> {
            rows.iter().map(f).collect()
        };
        let dict = PyDict::new_bound(py);
        dict.set_item("response", column(|r| r.response).into_pyarray_bound(py))?;
        dict.set_item("fitted", column(|r| r.fitted).into_pyarray_bound(py))?;
        dict.set_item("resid", column(|r| r.resid).into_pyarray_bound(py))?;
        dict.set_item("hat", column(|r| r.hat).into_pyarray_bound(py))?;
        dict.set_item("sigma", column(|r| r.sigma).into_pyarray_bound(py))?;
        dict.set_item("cooksd", column(|r| r.cooksd).into_pyarray_bound(py))?;
        dict.set_item("std_resid", column(|r| r.std_resid).into_pyarray_bound(py))?;
        Ok(dict)
    }

    /// Predict the response for a new design matrix.
    ///
    /// Parameters
    /// ----------
    /// x : numpy.ndarray
    ///     Matrix with the same columns, in the same order, as the fit.
    fn predict<'py>(&self, py: Python<'py>, x: PyReadonlyArray2<f64>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        let x_array = x.as_array().to_owned();
        let pred = self.inner.predict(&x_array).map_err(value_error)?;
        Ok(pred.into_pyarray_bound(py))
    }

    /// Printable regression summary.
    fn summary(&self) -> String {
        self.inner.to_string()
    }

    fn __repr__(&self) -> String {
        match self.inner.formula() {
            Some(f) => format!("<LinearModel: {}, nobs={}>", f, self.inner.nobs()),
            None => format!(
                "<LinearModel: {} coefficients, nobs={}>",
                self.inner.n_params(),
                self.inner.nobs()
            ),
        }
    }
}
