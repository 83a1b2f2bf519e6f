// =============================================================================
// Tidy Summaries
// =============================================================================
//
// Three flat views of a fitted model, in the shape of R's `broom` package:
//
//   tidy()    one row per coefficient (term, estimate, std.error, ...)
//   glance()  one row per model (r.squared, sigma, F statistic, AIC, ...)
//   augment() one row per observation (fitted, resid, hat, cooksd, ...)
//
// These are stateless formatting of `LinearModel` fields. All rows derive
// `Serialize` so they can be written out with any serde format.
//
// =============================================================================

use std::fmt;

use serde::Serialize;

use crate::inference::significance_stars;

// =============================================================================
// tidy
// =============================================================================

/// Summary of one coefficient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TidyRow {
    pub term: String,
    pub estimate: f64,
    pub std_error: f64,
    /// t statistic, estimate / std_error.
    pub statistic: f64,
    /// Two-sided p-value from Student's t on the residual df.
    pub p_value: f64,
    pub conf_low: f64,
    pub conf_high: f64,
}

/// Coefficient table returned by `LinearModel::tidy`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TidyTable {
    pub rows: Vec<TidyRow>,
    pub confidence_level: f64,
}

impl TidyTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TidyRow> {
        self.rows.iter()
    }

    /// Row for the named term, if present.
    pub fn term(&self, name: &str) -> Option<&TidyRow> {
        self.rows.iter().find(|r| r.term == name)
    }
}

impl<'a> IntoIterator for &'a TidyTable {
    type Item = &'a TidyRow;
    type IntoIter = std::slice::Iter<'a, TidyRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl fmt::Display for TidyTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .rows
            .iter()
            .map(|r| r.term.len())
            .chain(std::iter::once(4))
            .max()
            .unwrap_or(4);

        writeln!(
            f,
            "{:<width$} {:>12} {:>12} {:>10} {:>11}",
            "term", "estimate", "std.error", "statistic", "p.value",
            width = width
        )?;
        for r in &self.rows {
            writeln!(
                f,
                "{:<width$} {:>12.6} {:>12.6} {:>10.3} {:>11.4e} {}",
                r.term,
                r.estimate,
                r.std_error,
                r.statistic,
                r.p_value,
                significance_stars(r.p_value),
                width = width
            )?;
        }
        write!(f, "---\nSignif. codes:  0 '***' 0.001 '**' 0.01 '*' 0.05 '.' 0.1 ' ' 1")
    }
}

// =============================================================================
// glance
// =============================================================================

/// Whole-model statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Glance {
    pub r_squared: f64,
    pub adj_r_squared: f64,
    /// Residual standard error.
    pub sigma: f64,
    /// Overall F statistic against the intercept-only (or null) model.
    pub statistic: f64,
    pub p_value: f64,
    /// Model degrees of freedom (p minus the intercept).
    pub df: usize,
    pub log_lik: f64,
    pub aic: f64,
    pub bic: f64,
    /// Residual sum of squares.
    pub deviance: f64,
    pub df_residual: usize,
    pub nobs: usize,
}

impl fmt::Display for Glance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Residual standard error: {:.4} on {} degrees of freedom",
            self.sigma, self.df_residual
        )?;
        writeln!(
            f,
            "Multiple R-squared: {:.4},\tAdjusted R-squared: {:.4}",
            self.r_squared, self.adj_r_squared
        )?;
        write!(
            f,
            "F-statistic: {:.4} on {} and {} DF,  p-value: {:.4e}",
            self.statistic, self.df, self.df_residual, self.p_value
        )
    }
}

// =============================================================================
// augment
// =============================================================================

/// Per-observation fit information.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AugmentRow {
    /// Observed response.
    pub response: f64,
    pub fitted: f64,
    pub resid: f64,
    /// Leverage (hat matrix diagonal).
    pub hat: f64,
    /// Residual standard error with this observation dropped.
    pub sigma: f64,
    pub cooksd: f64,
    /// Internally studentized residual.
    pub std_resid: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(term: &str, p: f64) -> TidyRow {
        TidyRow {
            term: term.to_string(),
            estimate: 1.5,
            std_error: 0.5,
            statistic: 3.0,
            p_value: p,
            conf_low: 0.5,
            conf_high: 2.5,
        }
    }

    #[test]
    fn test_lookup_by_term() {
        let table = TidyTable {
            rows: vec![row("(Intercept)", 0.2), row("x", 0.0001)],
            confidence_level: 0.95,
        };
        assert_eq!(table.len(), 2);
        assert_eq!(table.term("x").map(|r| r.p_value), Some(0.0001));
        assert!(table.term("z").is_none());
        assert_eq!(table.iter().count(), 2);
    }

    #[test]
    fn test_display_lists_every_term() {
        let table = TidyTable {
            rows: vec![row("(Intercept)", 0.2), row("regionsouth", 0.0001)],
            confidence_level: 0.95,
        };
        let text = table.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("term"));
        assert!(lines[1].starts_with("(Intercept)"));
        assert!(lines[2].starts_with("regionsouth"));
        assert!(lines[2].trim_end().ends_with("***"));
        assert!(text.contains("Signif. codes"));
    }
}
