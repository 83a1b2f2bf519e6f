// =============================================================================
// TidyReg Core Library
// =============================================================================
//
// Pure Rust ordinary-least-squares regression with R-style model formulas
// and broom-style tidy summaries. No Python code involved; the `tidyreg`
// crate wraps this library for Python.
//
// STRUCTURE:
// ----------
//   - data:          Named, typed input columns (numeric or categorical)
//   - formula:       Parser for "y ~ x + C(g) + x:z + bs(x, df = 4)"
//   - design_matrix: Term expansion, dummy coding, interactions
//   - splines:       B-spline basis (R's splines::bs)
//   - solvers:       QR-based OLS fitting
//   - inference:     t / F p-values and confidence intervals
//   - diagnostics:   Leverage-based influence measures and fit statistics
//   - model:         The fitted `LinearModel` and the `lm` entry points
//   - summary:       tidy / glance / augment row types
//   - convert:       ndarray <-> nalgebra conversion
//   - error:         Error types used throughout the library
//
// Data flows one way: formula -> terms -> design matrix -> OLS fit ->
// LinearModel -> summaries. Only `model` knows about all of them; the
// Python bindings call `lm`, `LinearModel::from_design` and the
// standalone helpers; none of them call `fit_ols` directly.
//
// =============================================================================

pub mod constants;
pub mod convert;
pub mod data;
pub mod design_matrix;
pub mod diagnostics;
pub mod error;
pub mod formula;
pub mod inference;
pub mod model;
pub mod solvers;
pub mod splines;
pub mod summary;

pub use data::{Column, Dataset};
pub use design_matrix::{
    build_design_matrix, encode_categorical, factorize_strings, CategoricalEncoding,
    DesignMatrix, Term,
};
pub use error::{Result, TidyRegError};
pub use formula::{parse_formula, ParsedFormula};
pub use inference::{confidence_interval_t, pvalue_f, pvalue_t};
pub use model::{lm, lm_terms, LinearModel};
pub use solvers::{fit_ols, OLSConfig, OLSResult};
pub use splines::bs_basis;
pub use summary::{AugmentRow, Glance, TidyRow, TidyTable};
