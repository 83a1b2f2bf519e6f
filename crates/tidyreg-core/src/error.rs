// =============================================================================
// Error Types
// =============================================================================
//
// Every fallible operation in the library returns `Result<T>`, which is an
// alias for `std::result::Result<T, TidyRegError>`. Errors are reported to
// the caller and never recovered locally.
//
// =============================================================================

use thiserror::Error;

/// Errors produced while building datasets, design matrices, or fits.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TidyRegError {
    /// Two inputs that must agree in length/shape do not.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// The design matrix is not of full column rank.
    ///
    /// `column` names the first column found to be a linear combination of
    /// the columns before it.
    #[error("design matrix is rank deficient: column '{column}' (index {index}) is collinear with earlier columns")]
    RankDeficiency { column: String, index: usize },

    /// A categorical label is not one of the declared levels.
    #[error("unknown level '{label}' in categorical column '{column}'")]
    UnknownLevel { column: String, label: String },

    /// A referenced column does not exist in the dataset.
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// Input had no rows or no columns.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// A value is out of its valid domain (NaN, non-positive for log, ...).
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// A formula string could not be parsed.
    #[error("formula error: {0}")]
    Formula(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TidyRegError>;
