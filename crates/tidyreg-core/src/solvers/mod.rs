// =============================================================================
// Least-Squares Solvers
// =============================================================================
//
// Given a response y (length n) and a design matrix X (n × p), find the
// coefficient vector β minimising ||y - Xβ||².
//
// The only solver is ordinary least squares via a Householder QR
// factorization (see `ols.rs`). It requires X to have full column rank and
// refuses collinear designs rather than silently dropping columns.
//
// =============================================================================

mod ols;

pub use ols::{fit_ols, OLSConfig, OLSResult};
