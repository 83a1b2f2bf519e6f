// =============================================================================
// Linear Models
// =============================================================================
//
// `LinearModel` is the fitted-model record: created once per fit and
// immutable afterwards. It bundles the design matrix (for its shape and
// column names), the OLS solution, and the response it was fitted to.
//
// Three entry points:
//
//   lm(formula, dataset, config)                         formula string
//   lm_terms(dataset, response, terms, intercept, config) explicit terms
//   LinearModel::from_design(y, design, config)           prebuilt matrix
//
// =============================================================================

use std::fmt;

use ndarray::{Array1, Array2};

use crate::data::Dataset;
use crate::design_matrix::{build_design_matrix, evaluate_term, DesignMatrix, Term};
use crate::diagnostics::{
    adjusted_r_squared, aic, bic, cooks_distance, f_statistic, leave_one_out_sigma,
    log_likelihood_gaussian, r_squared, standardized_residuals, total_sum_of_squares,
};
use crate::error::{Result, TidyRegError};
use crate::formula::parse_formula;
use crate::inference::{confidence_interval_t, pvalue_f};
use crate::solvers::{fit_ols, OLSConfig, OLSResult};
use crate::summary::{AugmentRow, Glance, TidyRow, TidyTable};

/// A fitted ordinary-least-squares model.
#[derive(Debug, Clone)]
pub struct LinearModel {
    formula: Option<String>,
    response_name: String,
    y: Array1<f64>,
    design: DesignMatrix,
    fit: OLSResult,
    confidence_level: f64,
}

/// Fit a linear model described by an R-style formula.
///
/// ```
/// use tidyreg_core::{lm, Dataset, OLSConfig};
///
/// let ds = Dataset::new()
///     .with_numeric("y", vec![3.0, 5.0, 7.0, 9.5])?
///     .with_numeric("x", vec![1.0, 2.0, 3.0, 4.0])?;
/// let model = lm("y ~ x", &ds, &OLSConfig::default())?;
/// assert_eq!(model.term_names(), &["(Intercept)", "x"]);
/// # Ok::<(), tidyreg_core::TidyRegError>(())
/// ```
pub fn lm(formula: &str, dataset: &Dataset, config: &OLSConfig) -> Result<LinearModel> {
    let parsed = parse_formula(formula)?;
    let y = evaluate_term(dataset, &parsed.response)?;
    let design = build_design_matrix(dataset, parsed.terms(), parsed.has_intercept)?;

    log::debug!("lm({}): {} observations, {} coefficients", formula, y.len(), design.ncols());

    let mut model = LinearModel::fit(parsed.response.to_string(), y, design, config)?;
    model.formula = Some(formula.trim().to_string());
    Ok(model)
}

/// Fit a linear model from explicit terms, bypassing the formula parser.
pub fn lm_terms(
    dataset: &Dataset,
    response: &str,
    terms: &[Term],
    intercept: bool,
    config: &OLSConfig,
) -> Result<LinearModel> {
    let y = dataset.numeric(response)?;
    let design = build_design_matrix(dataset, terms, intercept)?;
    LinearModel::fit(response.to_string(), y, design, config)
}

impl LinearModel {
    /// Fit `y` on an already-built design matrix.
    pub fn from_design(y: Array1<f64>, design: DesignMatrix, config: &OLSConfig) -> Result<Self> {
        Self::fit("y".to_string(), y, design, config)
    }

    fn fit(response_name: String, y: Array1<f64>, design: DesignMatrix, config: &OLSConfig) -> Result<Self> {
        if !(config.confidence_level > 0.0 && config.confidence_level < 1.0) {
            return Err(TidyRegError::InvalidValue(format!(
                "confidence level must be in (0, 1), got {}",
                config.confidence_level
            )));
        }
        let fit = fit_ols(&y, &design, config)?;
        Ok(Self {
            formula: None,
            response_name,
            y,
            design,
            fit,
            confidence_level: config.confidence_level,
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn formula(&self) -> Option<&str> {
        self.formula.as_deref()
    }

    pub fn response_name(&self) -> &str {
        &self.response_name
    }

    pub fn response(&self) -> &Array1<f64> {
        &self.y
    }

    pub fn coefficients(&self) -> &Array1<f64> {
        &self.fit.coefficients
    }

    /// Coefficient for a named term, e.g. `"regionsouth"`.
    pub fn coefficient(&self, term: &str) -> Option<f64> {
        self.term_names()
            .iter()
            .position(|t| t == term)
            .map(|i| self.fit.coefficients[i])
    }

    pub fn residuals(&self) -> &Array1<f64> {
        &self.fit.residuals
    }

    pub fn fitted_values(&self) -> &Array1<f64> {
        &self.fit.fitted_values
    }

    /// Human-readable name of every coefficient, in coefficient order.
    pub fn term_names(&self) -> &[String] {
        &self.design.column_names
    }

    pub fn std_errors(&self) -> &Array1<f64> {
        &self.fit.std_errors
    }

    pub fn t_values(&self) -> &Array1<f64> {
        &self.fit.t_values
    }

    pub fn p_values(&self) -> &Array1<f64> {
        &self.fit.p_values
    }

    /// (X'X)⁻¹ scaled by σ².
    pub fn covariance(&self) -> Array2<f64> {
        &self.fit.covariance_unscaled * self.fit.sigma.powi(2)
    }

    pub fn leverage(&self) -> &Array1<f64> {
        &self.fit.leverage
    }

    /// Residual standard error.
    pub fn sigma(&self) -> f64 {
        self.fit.sigma
    }

    pub fn rss(&self) -> f64 {
        self.fit.rss
    }

    pub fn df_residual(&self) -> usize {
        self.fit.df_residual
    }

    pub fn nobs(&self) -> usize {
        self.y.len()
    }

    pub fn n_params(&self) -> usize {
        self.fit.coefficients.len()
    }

    pub fn has_intercept(&self) -> bool {
        self.design.has_intercept
    }

    pub fn design_matrix(&self) -> &DesignMatrix {
        &self.design
    }

    // -------------------------------------------------------------------------
    // Prediction
    // -------------------------------------------------------------------------

    /// Xβ for a new design matrix with the same columns as the fit.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.n_params() {
            return Err(TidyRegError::DimensionMismatch(format!(
                "new data has {} columns but the model has {} coefficients",
                x.ncols(),
                self.n_params()
            )));
        }
        Ok(x.dot(&self.fit.coefficients))
    }

    // -------------------------------------------------------------------------
    // Tidy summaries
    // -------------------------------------------------------------------------

    /// One row per coefficient.
    pub fn tidy(&self) -> TidyTable {
        let df = self.fit.df_residual as f64;
        let rows = self
            .term_names()
            .iter()
            .enumerate()
            .map(|(i, term)| {
                let estimate = self.fit.coefficients[i];
                let std_error = self.fit.std_errors[i];
                let (conf_low, conf_high) =
                    confidence_interval_t(estimate, std_error, df, self.confidence_level);
                TidyRow {
                    term: term.clone(),
                    estimate,
                    std_error,
                    statistic: self.fit.t_values[i],
                    p_value: self.fit.p_values[i],
                    conf_low,
                    conf_high,
                }
            })
            .collect();
        TidyTable {
            rows,
            confidence_level: self.confidence_level,
        }
    }

    /// Whole-model goodness of fit.
    pub fn glance(&self) -> Glance {
        let n = self.nobs();
        let p = self.n_params();
        let has_intercept = self.has_intercept();
        let rss = self.fit.rss;

        let tss = total_sum_of_squares(&self.y, has_intercept);
        let r2 = r_squared(rss, tss);
        let df_model = if has_intercept { p - 1 } else { p };
        let statistic = f_statistic(rss, tss, df_model, self.fit.df_residual);
        let log_lik = log_likelihood_gaussian(rss, n);
        // σ² counts as an estimated parameter
        let k = p + 1;

        Glance {
            r_squared: r2,
            adj_r_squared: adjusted_r_squared(r2, n, p, has_intercept),
            sigma: self.fit.sigma,
            statistic,
            p_value: pvalue_f(statistic, df_model as f64, self.fit.df_residual as f64),
            df: df_model,
            log_lik,
            aic: aic(log_lik, k),
            bic: bic(log_lik, k, n),
            deviance: rss,
            df_residual: self.fit.df_residual,
            nobs: n,
        }
    }

    /// One row per observation.
    pub fn augment(&self) -> Vec<AugmentRow> {
        let std_resid = standardized_residuals(&self.fit.residuals, &self.fit.leverage, self.fit.sigma);
        let cooksd = cooks_distance(&std_resid, &self.fit.leverage, self.n_params());
        let sigma_loo = leave_one_out_sigma(
            &self.fit.residuals,
            &self.fit.leverage,
            self.fit.rss,
            self.fit.df_residual,
        );

        (0..self.nobs())
            .map(|i| AugmentRow {
                response: self.y[i],
                fitted: self.fit.fitted_values[i],
                resid: self.fit.residuals[i],
                hat: self.fit.leverage[i],
                sigma: sigma_loo[i],
                cooksd: cooksd[i],
                std_resid: std_resid[i],
            })
            .collect()
    }
}

impl fmt::Display for LinearModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(formula) = &self.formula {
            writeln!(f, "Call: lm({})\n", formula)?;
        }
        writeln!(f, "{}\n", self.tidy())?;
        write!(f, "{}", self.glance())
    }
}

// =============================================================================
// Tests
// =============================================================================
