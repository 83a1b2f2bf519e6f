// =============================================================================
// Model Diagnostics
// =============================================================================
//
// Per-observation and whole-model quantities reported by `augment` and
// `glance`:
//
// - LEVERAGE-BASED: standardized residuals and Cook's distance
// - GOODNESS OF FIT: R², adjusted R², overall F statistic
// - LIKELIHOOD: Gaussian log-likelihood, AIC, BIC
//
// Formulas follow R's `lm` / `stats` conventions so numbers match
// `broom::glance(lm(...))`.
//
// =============================================================================

use ndarray::Array1;

/// Internally studentized residuals r_i = e_i / (σ sqrt(1 - h_i)).
///
/// Observations with leverage 1 get NaN.
pub fn standardized_residuals(residuals: &Array1<f64>, leverage: &Array1<f64>, sigma: f64) -> Array1<f64> {
    residuals
        .iter()
        .zip(leverage.iter())
        .map(|(&e, &h)| {
            let denom = sigma * (1.0 - h).sqrt();
            if denom > 0.0 { e / denom } else { f64::NAN }
        })
        .collect()
}

/// Cook's distance D_i = r_i² h_i / (p (1 - h_i)).
pub fn cooks_distance(std_resid: &Array1<f64>, leverage: &Array1<f64>, n_params: usize) -> Array1<f64> {
    let p = n_params as f64;
    std_resid
        .iter()
        .zip(leverage.iter())
        .map(|(&r, &h)| r * r * h / (p * (1.0 - h)))
        .collect()
}

/// Residual standard error with observation i left out:
/// sqrt((RSS - e_i² / (1 - h_i)) / (n - p - 1)).
pub fn leave_one_out_sigma(residuals: &Array1<f64>, leverage: &Array1<f64>, rss: f64, df_residual: usize) -> Array1<f64> {
    if df_residual < 2 {
        return Array1::from_elem(residuals.len(), f64::NAN);
    }
    let df = (df_residual - 1) as f64;
    residuals
        .iter()
        .zip(leverage.iter())
        .map(|(&e, &h)| ((rss - e * e / (1.0 - h)) / df).max(0.0).sqrt())
        .collect()
}

/// Total sum of squares used as the R² denominator.
///
/// Centered around the mean for models with an intercept and uncentered
/// (Σ y²) otherwise, as R does.
pub fn total_sum_of_squares(y: &Array1<f64>, has_intercept: bool) -> f64 {
    if has_intercept {
        let mean = y.mean().unwrap_or(0.0);
        y.iter().map(|&v| (v - mean).powi(2)).sum()
    } else {
        y.dot(y)
    }
}

/// R² = 1 - RSS / TSS.
pub fn r_squared(rss: f64, tss: f64) -> f64 {
    if tss > 0.0 { 1.0 - rss / tss } else { f64::NAN }
}

/// Adjusted R² = 1 - (1 - R²)(n - k) / (n - p), with k = 1 when the model
/// has an intercept and 0 otherwise.
pub fn adjusted_r_squared(r2: f64, n: usize, p: usize, has_intercept: bool) -> f64 {
    let k = if has_intercept { 1.0 } else { 0.0 };
    let df_resid = n as f64 - p as f64;
    if df_resid <= 0.0 {
        return f64::NAN;
    }
    1.0 - (1.0 - r2) * (n as f64 - k) / df_resid
}

/// Overall F statistic ((TSS - RSS) / df_model) / (RSS / df_resid).
pub fn f_statistic(rss: f64, tss: f64, df_model: usize, df_residual: usize) -> f64 {
    if df_model == 0 || df_residual == 0 {
        return f64::NAN;
    }
    ((tss - rss) / df_model as f64) / (rss / df_residual as f64)
}

/// Gaussian log-likelihood at the MLE of σ² (= RSS / n).
///
/// ℓ = -n/2 (ln(2π) + ln(RSS/n) + 1)
pub fn log_likelihood_gaussian(rss: f64, n: usize) -> f64 {
    let n = n as f64;
    -0.5 * n * ((2.0 * std::f64::consts::PI).ln() + (rss / n).ln() + 1.0)
}

/// Akaike information criterion, `k` counting σ² as a parameter.
pub fn aic(log_lik: f64, k: usize) -> f64 {
    -2.0 * log_lik + 2.0 * k as f64
}

/// Bayesian information criterion.
pub fn bic(log_lik: f64, k: usize, n: usize) -> f64 {
    -2.0 * log_lik + k as f64 * (n as f64).ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_total_sum_of_squares() {
        let y = array![1.0, 2.0, 3.0];
        assert_abs_diff_eq!(total_sum_of_squares(&y, true), 2.0);
        assert_abs_diff_eq!(total_sum_of_squares(&y, false), 14.0);
    }

    #[test]
    fn test_r_squared_and_adjusted() {
        let r2 = r_squared(2.4, 6.0);
        assert_abs_diff_eq!(r2, 0.6, epsilon = 1e-12);
        // n = 5, p = 2 with intercept: 1 - 0.4 * 4/3
        assert_abs_diff_eq!(adjusted_r_squared(r2, 5, 2, true), 1.0 - 0.4 * 4.0 / 3.0, epsilon = 1e-12);
        assert!(r_squared(1.0, 0.0).is_nan());
    }

    #[test]
    fn test_f_statistic() {
        // (6 - 2.4)/1 / (2.4/3) = 4.5
        assert_abs_diff_eq!(f_statistic(2.4, 6.0, 1, 3), 4.5, epsilon = 1e-12);
        assert!(f_statistic(2.4, 6.0, 0, 3).is_nan());
    }

    #[test]
    fn test_log_likelihood_and_ic() {
        // logLik(lm(c(2,4,5,4,5) ~ I(1:5))) = -5.25977 (df = 3)
        let ll = log_likelihood_gaussian(2.4, 5);
        assert_abs_diff_eq!(ll, -5.259770, epsilon = 1e-5);
        assert_abs_diff_eq!(aic(ll, 3), 16.51954, epsilon = 1e-4);
        assert_abs_diff_eq!(bic(ll, 3, 5), 15.34785, epsilon = 1e-4);
    }

    #[test]
    fn test_standardized_and_cooks() {
        let e = array![1.0, -1.0];
        let h = array![0.5, 1.0];
        let r = standardized_residuals(&e, &h, 2.0);
        assert_abs_diff_eq!(r[0], 1.0 / (2.0 * 0.5_f64.sqrt()), epsilon = 1e-12);
        assert!(r[1].is_nan());

        let d = cooks_distance(&array![1.0], &array![0.5], 2);
        assert_abs_diff_eq!(d[0], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_leave_one_out_sigma() {
        // RSS = 10, e_0 = 2, h_0 = 0.5 -> (10 - 8) / 2 = 1
        let s = leave_one_out_sigma(&array![2.0, 0.0], &array![0.5, 0.2], 10.0, 3);
        assert_abs_diff_eq!(s[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s[1], 5.0_f64.sqrt(), epsilon = 1e-12);
        assert!(leave_one_out_sigma(&array![1.0], &array![0.1], 1.0, 1)[0].is_nan());
    }
}
