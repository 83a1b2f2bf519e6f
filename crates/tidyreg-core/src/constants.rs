//! Numeric constants shared across modules.

/// Relative tolerance on |R_jj| below which a design column is treated as
/// collinear with the columns before it.
pub const RANK_TOL: f64 = 1e-7;

/// Default confidence level for coefficient intervals.
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Name used for the constant column of a design matrix.
pub const INTERCEPT_NAME: &str = "(Intercept)";
