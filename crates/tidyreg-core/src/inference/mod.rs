// =============================================================================
// Statistical Inference
// =============================================================================
//
// Distribution lookups behind the tidy summary columns:
//   - two-sided t p-values for individual coefficients
//   - t confidence intervals for coefficients
//   - upper-tail F p-value for the overall regression
//
// In OLS the residual variance is estimated, so coefficient tests use
// Student's t on n - p degrees of freedom rather than the normal.
//
// =============================================================================

use statrs::distribution::{ContinuousCDF, FisherSnedecor, Normal, StudentsT};

/// Above this many degrees of freedom the t distribution is replaced by the
/// standard normal.
const NORMAL_APPROX_DF: f64 = 1e7;

fn t_distribution(df: f64) -> Option<StudentsT> {
    StudentsT::new(0.0, 1.0, df).ok()
}

fn standard_normal() -> Option<Normal> {
    Normal::new(0.0, 1.0).ok()
}

/// Two-sided p-value P(|T| > |t|) for T ~ t(df).
///
/// Returns NaN when `t` is not finite or `df <= 0`.
pub fn pvalue_t(t: f64, df: f64) -> f64 {
    if t.is_nan() || !(df > 0.0) {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }
    let tail = if df > NORMAL_APPROX_DF {
        standard_normal().map(|d| d.sf(t.abs()))
    } else {
        t_distribution(df).map(|d| d.sf(t.abs()))
    };
    tail.map_or(f64::NAN, |p| (2.0 * p).min(1.0))
}

/// Critical value t_{1 - alpha/2, df} for a two-sided interval.
pub fn t_critical(df: f64, confidence: f64) -> f64 {
    if !(df > 0.0) || !(confidence > 0.0 && confidence < 1.0) {
        return f64::NAN;
    }
    let q = 1.0 - (1.0 - confidence) / 2.0;
    let value = if df > NORMAL_APPROX_DF {
        standard_normal().map(|d| d.inverse_cdf(q))
    } else {
        t_distribution(df).map(|d| d.inverse_cdf(q))
    };
    value.unwrap_or(f64::NAN)
}

/// Confidence interval `estimate ± t_crit × se`.
///
/// Returns `(NaN, NaN)` when the standard error is not a usable number.
pub fn confidence_interval_t(estimate: f64, std_error: f64, df: f64, confidence: f64) -> (f64, f64) {
    if !estimate.is_finite() || !std_error.is_finite() || std_error < 0.0 {
        return (f64::NAN, f64::NAN);
    }
    let margin = t_critical(df, confidence) * std_error;
    (estimate - margin, estimate + margin)
}

/// Upper-tail p-value P(F > f) for F ~ F(df1, df2).
pub fn pvalue_f(f: f64, df1: f64, df2: f64) -> f64 {
    if f.is_nan() || !(df1 > 0.0) || !(df2 > 0.0) {
        return f64::NAN;
    }
    if f.is_infinite() {
        return 0.0;
    }
    if f <= 0.0 {
        return 1.0;
    }
    FisherSnedecor::new(df1, df2).map_or(f64::NAN, |d| d.sf(f))
}

/// R-style significance code for a p-value.
pub fn significance_stars(pvalue: f64) -> &'static str {
    match pvalue {
        p if p < 0.001 => "***",
        p if p < 0.01 => "**",
        p if p < 0.05 => "*",
        p if p < 0.1 => ".",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_pvalue_t_zero() {
        assert_abs_diff_eq!(pvalue_t(0.0, 5.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pvalue_t_known_value() {
        // qt(0.975, 10) = 2.228139
        assert_abs_diff_eq!(pvalue_t(2.228139, 10.0), 0.05, epsilon = 1e-5);
        assert_abs_diff_eq!(pvalue_t(-2.228139, 10.0), 0.05, epsilon = 1e-5);
    }

    #[test]
    fn test_pvalue_t_degenerate() {
        assert!(pvalue_t(1.0, 0.0).is_nan());
        assert!(pvalue_t(f64::NAN, 3.0).is_nan());
        assert_eq!(pvalue_t(f64::INFINITY, 3.0), 0.0);
    }

    #[test]
    fn test_t_critical() {
        assert_abs_diff_eq!(t_critical(10.0, 0.95), 2.228139, epsilon = 1e-4);
        assert_abs_diff_eq!(t_critical(1e9, 0.95), 1.959964, epsilon = 1e-4);
    }

    #[test]
    fn test_confidence_interval_symmetric() {
        let (lo, hi) = confidence_interval_t(3.0, 0.5, 20.0, 0.95);
        assert_abs_diff_eq!(3.0 - lo, hi - 3.0, epsilon = 1e-12);
        assert!(lo < 3.0 && hi > 3.0);
    }

    #[test]
    fn test_pvalue_f() {
        // qf(0.95, 2, 10) = 4.102821
        assert_abs_diff_eq!(pvalue_f(4.102821, 2.0, 10.0), 0.05, epsilon = 1e-5);
        assert_eq!(pvalue_f(0.0, 2.0, 10.0), 1.0);
        assert!(pvalue_f(1.0, 0.0, 10.0).is_nan());
    }

    #[test]
    fn test_significance_stars() {
        assert_eq!(significance_stars(0.0001), "***");
        assert_eq!(significance_stars(0.005), "**");
        assert_eq!(significance_stars(0.03), "*");
        assert_eq!(significance_stars(0.08), ".");
        assert_eq!(significance_stars(0.5), "");
        assert_eq!(significance_stars(f64::NAN), "");
    }
}
