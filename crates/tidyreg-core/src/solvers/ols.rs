// =============================================================================
// OLS: Ordinary Least Squares
// =============================================================================
//
// Find β minimising the residual sum of squares
//
//     RSS(β) = Σ (y_i - x_i'β)²
//
// HOW WE SOLVE IT
// ---------------
// The textbook route forms the normal equations (X'X)β = X'y. That squares
// the condition number of X. We factor X itself instead:
//
//     X = QR          Q: n × p with orthonormal columns
//                     R: p × p upper triangular
//
// then  X'X = R'R  and the normal equations collapse to
//
//     Rβ = Q'y        (solved by back substitution)
//
// Everything else falls out of the same factorization:
//
//     (X'X)⁻¹ = R⁻¹R⁻ᵀ                   unscaled covariance
//     h_i     = Σ_j Q_ij²                leverage (hat matrix diagonal)
//     σ²      = RSS / (n - p)            residual variance
//     se(β_j) = sqrt(σ² [(X'X)⁻¹]_jj)
//
// RANK
// ----
// Columns are NOT pivoted. With Householder QR, |R_jj| is the distance of
// column j from the span of columns 0..j-1, so a column that is (nearly) a
// linear combination of the ones before it shows up as a tiny diagonal
// entry relative to its own length. We reject the fit when
//
//     |R_jj| <= rank_tolerance × ‖X_j‖
//
// and report the first offending column by name. An all-zero column always
// fails. Rescaling a column does not change the outcome.
//
// =============================================================================

use nalgebra::DMatrix;
use ndarray::{Array1, Array2};

use crate::constants::{DEFAULT_CONFIDENCE, RANK_TOL};
use crate::convert::{to_array1, to_array2, to_dmatrix, to_dvector};
use crate::design_matrix::DesignMatrix;
use crate::error::{Result, TidyRegError};
use crate::inference::pvalue_t;

// =============================================================================
// Configuration
// =============================================================================

/// Options for an OLS fit.
#[derive(Debug, Clone)]
pub struct OLSConfig {
    /// Relative threshold on the QR diagonal for declaring collinearity.
    /// Default: 1e-7
    pub rank_tolerance: f64,

    /// Confidence level for `conf_low` / `conf_high` in tidy output.
    /// Default: 0.95
    pub confidence_level: f64,
}

impl Default for OLSConfig {
    fn default() -> Self {
        Self {
            rank_tolerance: RANK_TOL,
            confidence_level: DEFAULT_CONFIDENCE,
        }
    }
}

// =============================================================================
// Result Structure
// =============================================================================

/// Raw numeric output of an OLS fit.
#[derive(Debug, Clone)]
pub struct OLSResult {
    /// β, one per design column.
    pub coefficients: Array1<f64>,
    /// Xβ.
    pub fitted_values: Array1<f64>,
    /// y - Xβ.
    pub residuals: Array1<f64>,
    /// (X'X)⁻¹.
    pub covariance_unscaled: Array2<f64>,
    /// Diagonal of the hat matrix.
    pub leverage: Array1<f64>,
    /// Σ residual².
    pub rss: f64,
    /// n - p.
    pub df_residual: usize,
    /// sqrt(RSS / (n - p)); NaN when n = p.
    pub sigma: f64,
    pub std_errors: Array1<f64>,
    pub t_values: Array1<f64>,
    /// Two-sided Student-t p-values on `df_residual` degrees of freedom.
    pub p_values: Array1<f64>,
}

// =============================================================================
// Main Fitting Function
// =============================================================================

/// Fit y on the columns of `design` by ordinary least squares.
///
/// # Errors
/// * `DimensionMismatch` - `y.len() != design.nrows()`
/// * `EmptyInput` - no rows or no columns
/// * `InvalidValue` - NaN or infinite entries
/// * `RankDeficiency` - more columns than rows, or collinear columns
pub fn fit_ols(y: &Array1<f64>, design: &DesignMatrix, config: &OLSConfig) -> Result<OLSResult> {
    let x = &design.matrix;
    let n = y.len();
    let p = x.ncols();

    // -------------------------------------------------------------------------
    // Step 0: Validate inputs
    // -------------------------------------------------------------------------
    if x.nrows() != n {
        return Err(TidyRegError::DimensionMismatch(format!(
            "X has {} rows but y has {} elements",
            x.nrows(),
            n
        )));
    }
    if n == 0 {
        return Err(TidyRegError::EmptyInput("y is empty".to_string()));
    }
    if p == 0 {
        return Err(TidyRegError::EmptyInput("X has no columns".to_string()));
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(TidyRegError::InvalidValue("y contains NaN or infinite values".to_string()));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(TidyRegError::InvalidValue("X contains NaN or infinite values".to_string()));
    }
    if p > n {
        // The first column past n is necessarily in the span of the others.
        return Err(TidyRegError::RankDeficiency {
            column: column_name(design, n),
            index: n,
        });
    }

    // -------------------------------------------------------------------------
    // Step 1: Factor X = QR
    // -------------------------------------------------------------------------
    let column_norms: Vec<f64> = x
        .columns()
        .into_iter()
        .map(|c| c.dot(&c).sqrt())
        .collect();
    let qr = to_dmatrix(x.view()).qr();
    let r = qr.r();
    let q = qr.q();

    // -------------------------------------------------------------------------
    // Step 2: Rank check, each R diagonal against its own column norm
    // -------------------------------------------------------------------------
    let deficient = (0..p).find(|&j| r[(j, j)].abs() <= config.rank_tolerance * column_norms[j]);
    if let Some(j) = deficient {
        return Err(TidyRegError::RankDeficiency {
            column: column_name(design, j),
            index: j,
        });
    }

    // -------------------------------------------------------------------------
    // Step 3: Solve Rβ = Q'y and invert R
    // -------------------------------------------------------------------------
    let qty = q.transpose() * to_dvector(y.view());
    let beta = r
        .solve_upper_triangular(&qty)
        .ok_or_else(|| singular_error(design))?;
    let r_inv = r
        .solve_upper_triangular(&DMatrix::identity(p, p))
        .ok_or_else(|| singular_error(design))?;
    let xtx_inv = &r_inv * r_inv.transpose();

    let coefficients = to_array1(&beta);
    let covariance_unscaled = to_array2(&xtx_inv);

    // -------------------------------------------------------------------------
    // Step 4: Fitted values, residuals, leverage
    // -------------------------------------------------------------------------
    let fitted_values = x.dot(&coefficients);
    let residuals = y - &fitted_values;
    let rss = residuals.dot(&residuals);
    let leverage: Array1<f64> = (0..n)
        .map(|i| q.row(i).iter().map(|v| v * v).sum::<f64>())
        .collect();

    // -------------------------------------------------------------------------
    // Step 5: Residual variance and coefficient inference
    // -------------------------------------------------------------------------
    let df_residual = n - p;
    let sigma2 = if df_residual > 0 {
        rss / df_residual as f64
    } else {
        f64::NAN
    };

    let std_errors: Array1<f64> = covariance_unscaled
        .diag()
        .iter()
        .map(|&c| (sigma2 * c).sqrt())
        .collect();
    let t_values: Array1<f64> = coefficients
        .iter()
        .zip(std_errors.iter())
        .map(|(&b, &se)| b / se)
        .collect();
    let p_values = t_values.mapv(|t| pvalue_t(t, df_residual as f64));

    log::debug!(
        "OLS fit: n = {}, p = {}, rss = {:.6e}, sigma = {:.6e}",
        n,
        p,
        rss,
        sigma2.sqrt()
    );
    if df_residual == 0 {
        log::warn!("no residual degrees of freedom (n = p = {}); standard errors are undefined", n);
    } else if rss <= f64::EPSILON * y.dot(y) {
        log::warn!("essentially perfect fit: standard errors and p-values may be unreliable");
    }

    Ok(OLSResult {
        coefficients,
        fitted_values,
        residuals,
        covariance_unscaled,
        leverage,
        rss,
        df_residual,
        sigma: sigma2.sqrt(),
        std_errors,
        t_values,
        p_values,
    })
}

// =============================================================================
// Helper Functions
// =============================================================================

fn column_name(design: &DesignMatrix, j: usize) -> String {
    design
        .column_names
        .get(j)
        .cloned()
        .unwrap_or_else(|| format!("x{}", j + 1))
}

fn singular_error(design: &DesignMatrix) -> TidyRegError {
    let last = design.ncols().saturating_sub(1);
    TidyRegError::RankDeficiency {
        column: column_name(design, last),
        index: last,
    }
}

// =============================================================================
// Tests
// =============================================================================
