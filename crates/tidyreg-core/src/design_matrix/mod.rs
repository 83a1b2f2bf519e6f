// =============================================================================
// Design Matrix Construction
// =============================================================================
//
// Turns a dataset plus a list of terms into the numeric matrix X used by the
// least-squares solver.
//
//   - Numeric columns are copied as-is.
//   - Categorical columns become k-1 indicator (dummy) columns. The first
//     level is the reference and gets no column, so a reference row is all
//     zeros across the indicators.
//   - Interactions are row-wise products of their factors' columns.
//   - An intercept column of ones is prepended unless the fit is
//     intercept-free.
//
// Column names follow R's `lm` conventions so tidy output reads the same:
// `(Intercept)`, `x`, `regionsouth`, `x:regionsouth`, `I(x^2)`, `bs(x, df = 4)1`.
//
// =============================================================================

use std::collections::HashMap;
use std::fmt;

use ndarray::{Array1, Array2, Axis};

use crate::constants::INTERCEPT_NAME;
use crate::data::{Column, Dataset};
use crate::error::{Result, TidyRegError};
use crate::splines::bs_basis;

// =============================================================================
// Terms
// =============================================================================

/// One right-hand-side term of a model, already resolved to a column
/// transform. The formula compiler produces these. They can also be
/// built by hand.
#[derive(Debug, Clone, PartialEq)]
pub enum Term {
    /// A column used as-is. A categorical column is expanded to indicators.
    Numeric(String),
    /// A column that must be categorical.
    Categorical(String),
    /// Product of two or more terms.
    Interaction(Vec<Term>),
    /// `I(x^k)`.
    Power { name: String, exponent: u32 },
    /// `log(x)`, natural logarithm.
    Log(String),
    /// `bs(x, df, degree)` B-spline basis without intercept.
    BSpline { name: String, df: usize, degree: usize },
}

impl Term {
    /// Source column names referenced by this term.
    pub fn variables(&self) -> Vec<&str> {
        match self {
            Term::Numeric(n) | Term::Categorical(n) | Term::Log(n) => vec![n.as_str()],
            Term::Power { name, .. } | Term::BSpline { name, .. } => vec![name.as_str()],
            Term::Interaction(parts) => parts.iter().flat_map(|t| t.variables()).collect(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Numeric(n) => write!(f, "{}", n),
            Term::Categorical(n) => write!(f, "C({})", n),
            Term::Interaction(parts) => {
                let labels: Vec<String> = parts.iter().map(|t| t.to_string()).collect();
                write!(f, "{}", labels.join(":"))
            }
            Term::Power { name, exponent } => write!(f, "I({}^{})", name, exponent),
            Term::Log(n) => write!(f, "log({})", n),
            Term::BSpline { name, df, degree } if *degree == 3 => {
                write!(f, "bs({}, df = {})", name, df)
            }
            Term::BSpline { name, df, degree } => {
                write!(f, "bs({}, df = {}, degree = {})", name, df, degree)
            }
        }
    }
}

// =============================================================================
// Categorical Encoding
// =============================================================================

/// Indicator encoding of one categorical column.
#[derive(Debug, Clone)]
pub struct CategoricalEncoding {
    /// n × (k-1) indicator matrix.
    pub matrix: Array2<f64>,
    /// Column names, `<var><level>` for each non-reference level.
    pub names: Vec<String>,
    /// Level index of every row (0 = reference).
    pub indices: Vec<usize>,
    /// All levels, reference first.
    pub levels: Vec<String>,
}

/// Encode a categorical column as indicator columns for every non-reference
/// level.
///
/// `levels[0]` is the reference. Labels outside `levels` fail with
/// `UnknownLevel`; a single-level column yields an n × 0 matrix.
pub fn encode_categorical<S: AsRef<str>, L: AsRef<str>>(
    values: &[S],
    levels: &[L],
    var_name: &str,
) -> Result<CategoricalEncoding> {
    let levels: Vec<String> = levels.iter().map(|l| l.as_ref().to_string()).collect();
    if levels.is_empty() {
        return Err(TidyRegError::EmptyInput(format!(
            "categorical column '{}' has no levels",
            var_name
        )));
    }

    let mut lookup: HashMap<&str, usize> = HashMap::with_capacity(levels.len());
    for (i, level) in levels.iter().enumerate() {
        if lookup.insert(level.as_str(), i).is_some() {
            return Err(TidyRegError::InvalidValue(format!(
                "duplicate level '{}' in column '{}'",
                level, var_name
            )));
        }
    }

    let indices = values
        .iter()
        .map(|v| {
            lookup
                .get(v.as_ref())
                .copied()
                .ok_or_else(|| TidyRegError::UnknownLevel {
                    column: var_name.to_string(),
                    label: v.as_ref().to_string(),
                })
        })
        .collect::<Result<Vec<usize>>>()?;

    let k = levels.len();
    let mut matrix = Array2::zeros((indices.len(), k - 1));
    for (row, &idx) in indices.iter().enumerate() {
        if idx > 0 {
            matrix[[row, idx - 1]] = 1.0;
        }
    }

    let names = levels[1..]
        .iter()
        .map(|l| format!("{}{}", var_name, l))
        .collect();

    Ok(CategoricalEncoding {
        matrix,
        names,
        indices,
        levels,
    })
}

/// Sorted distinct levels plus the code of every value.
pub fn factorize_strings<S: AsRef<str>>(values: &[S]) -> (Vec<String>, Vec<u32>) {
    let mut levels: Vec<String> = values.iter().map(|v| v.as_ref().to_string()).collect();
    levels.sort();
    levels.dedup();

    let lookup: HashMap<&str, u32> = levels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i as u32))
        .collect();
    let codes = values.iter().map(|v| lookup[v.as_ref()]).collect();

    (levels, codes)
}

// =============================================================================
// Column Blocks
// =============================================================================

/// Columns contributed by one term, before they are stacked into X.
#[derive(Debug, Clone)]
struct Block {
    matrix: Array2<f64>,
    names: Vec<String>,
}

impl Block {
    fn single(values: Array1<f64>, name: String) -> Self {
        Self {
            matrix: values.insert_axis(Axis(1)),
            names: vec![name],
        }
    }
}

/// Row-wise product of two blocks: every column of `a` times every column
/// of `b`, `a`'s columns varying slowest.
fn interact(a: &Block, b: &Block) -> Block {
    let n = a.matrix.nrows();
    let width = a.names.len() * b.names.len();
    let mut matrix = Array2::zeros((n, width));
    let mut names = Vec::with_capacity(width);

    let mut col = 0;
    for (i, name_a) in a.names.iter().enumerate() {
        for (j, name_b) in b.names.iter().enumerate() {
            let prod = &a.matrix.column(i) * &b.matrix.column(j);
            matrix.column_mut(col).assign(&prod);
            names.push(format!("{}:{}", name_a, name_b));
            col += 1;
        }
    }

    Block { matrix, names }
}

fn numeric_values<'a>(dataset: &'a Dataset, name: &str) -> Result<&'a [f64]> {
    match dataset.column(name)? {
        Column::Numeric(values) => Ok(values),
        Column::Categorical { .. } => Err(TidyRegError::InvalidValue(format!(
            "column '{}' is categorical; it cannot be transformed numerically",
            name
        ))),
    }
}

fn expand_term(dataset: &Dataset, term: &Term) -> Result<Block> {
    match term {
        Term::Numeric(name) => match dataset.column(name)? {
            Column::Numeric(values) => Ok(Block::single(
                Array1::from_vec(values.clone()),
                name.clone(),
            )),
            Column::Categorical { labels, levels } => {
                let enc = encode_categorical(labels, levels, name)?;
                Ok(Block {
                    matrix: enc.matrix,
                    names: enc.names,
                })
            }
        },
        Term::Categorical(name) => match dataset.column(name)? {
            Column::Categorical { labels, levels } => {
                let enc = encode_categorical(labels, levels, name)?;
                Ok(Block {
                    matrix: enc.matrix,
                    names: enc.names,
                })
            }
            Column::Numeric(_) => Err(TidyRegError::InvalidValue(format!(
                "C({}) requires a categorical column; declare it with Dataset::with_factor",
                name
            ))),
        },
        Term::Power { name, exponent } => {
            let k = i32::try_from(*exponent).map_err(|_| {
                TidyRegError::InvalidValue(format!("exponent {} in I({}^k) is too large", exponent, name))
            })?;
            let values = numeric_values(dataset, name)?;
            let powered: Array1<f64> = values.iter().map(|&v| v.powi(k)).collect();
            Ok(Block::single(powered, term.to_string()))
        }
        Term::Log(name) => {
            let values = numeric_values(dataset, name)?;
            if let Some(bad) = values.iter().find(|&&v| !(v > 0.0)) {
                return Err(TidyRegError::InvalidValue(format!(
                    "log({}) requires positive values, found {}",
                    name, bad
                )));
            }
            let logged: Array1<f64> = values.iter().map(|&v| v.ln()).collect();
            Ok(Block::single(logged, term.to_string()))
        }
        Term::BSpline { name, df, degree } => {
            let values = Array1::from_vec(numeric_values(dataset, name)?.to_vec());
            let matrix = bs_basis(&values, *df, *degree, None, false)?;
            let label = term.to_string();
            let names = (1..=matrix.ncols()).map(|i| format!("{}{}", label, i)).collect();
            Ok(Block { matrix, names })
        }
        Term::Interaction(parts) => {
            let mut iter = parts.iter();
            let first = iter.next().ok_or_else(|| {
                TidyRegError::InvalidValue("interaction with no factors".to_string())
            })?;
            let mut acc = expand_term(dataset, first)?;
            for part in iter {
                acc = interact(&acc, &expand_term(dataset, part)?);
            }
            Ok(acc)
        }
    }
}

/// Evaluate a single-column term (a response such as `y`, `log(y)` or
/// `I(y^2)`) to a numeric vector.
pub fn evaluate_term(dataset: &Dataset, term: &Term) -> Result<Array1<f64>> {
    if let Term::Numeric(name) = term {
        return dataset.numeric(name);
    }
    let block = expand_term(dataset, term)?;
    if block.names.len() != 1 {
        return Err(TidyRegError::InvalidValue(format!(
            "'{}' expands to {} columns; a single numeric column is required",
            term,
            block.names.len()
        )));
    }
    Ok(block.matrix.column(0).to_owned())
}

// =============================================================================
// Design Matrix
// =============================================================================

/// Numeric model matrix with per-column names.
#[derive(Debug, Clone)]
pub struct DesignMatrix {
    pub matrix: Array2<f64>,
    pub column_names: Vec<String>,
    pub has_intercept: bool,
}

impl DesignMatrix {
    /// Wrap a prebuilt matrix. Names default to `x1..xp` when not given.
    pub fn from_matrix(
        matrix: Array2<f64>,
        column_names: Option<Vec<String>>,
        has_intercept: bool,
    ) -> Result<Self> {
        let p = matrix.ncols();
        let column_names =
            column_names.unwrap_or_else(|| (1..=p).map(|i| format!("x{}", i)).collect());
        if column_names.len() != p {
            return Err(TidyRegError::DimensionMismatch(format!(
                "{} column names for a matrix with {} columns",
                column_names.len(),
                p
            )));
        }
        Ok(Self {
            matrix,
            column_names,
            has_intercept,
        })
    }

    pub fn nrows(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.matrix.ncols()
    }
}

/// Build the design matrix for `terms` over `dataset`.
///
/// Column count is `intercept as usize` plus the expanded width of every
/// term; row count equals `dataset.nrows()`.
pub fn build_design_matrix(dataset: &Dataset, terms: &[Term], intercept: bool) -> Result<DesignMatrix> {
    let n = dataset.nrows();
    if n == 0 {
        return Err(TidyRegError::EmptyInput("dataset has no rows".to_string()));
    }

    let mut blocks = Vec::with_capacity(terms.len() + 1);
    if intercept {
        blocks.push(Block::single(Array1::ones(n), INTERCEPT_NAME.to_string()));
    }
    for term in terms {
        blocks.push(expand_term(dataset, term)?);
    }

    let width: usize = blocks.iter().map(|b| b.names.len()).sum();
    if width == 0 {
        return Err(TidyRegError::EmptyInput(
            "model has no intercept and no terms".to_string(),
        ));
    }

    let views: Vec<_> = blocks.iter().map(|b| b.matrix.view()).collect();
    let matrix = ndarray::concatenate(Axis(1), &views)
        .map_err(|e| TidyRegError::DimensionMismatch(e.to_string()))?;
    let column_names = blocks.into_iter().flat_map(|b| b.names).collect();

    log::debug!("built design matrix: {} rows x {} columns", n, width);

    Ok(DesignMatrix {
        matrix,
        column_names,
        has_intercept: intercept,
    })
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new()
            .with_numeric("x", vec![1.0, 2.0, 3.0, 4.0])
            .unwrap()
            .with_categorical("g", &["a", "b", "c", "a"], &["a", "b", "c"])
            .unwrap()
    }

    #[test]
    fn test_k_levels_give_k_minus_one_columns() {
        let enc = encode_categorical(&["a", "b", "c", "a"], &["a", "b", "c"], "g").unwrap();
        assert_eq!(enc.matrix.ncols(), 2);
        assert_eq!(enc.names, vec!["gb", "gc"]);
        assert_eq!(enc.indices, vec![0, 1, 2, 0]);
        // Reference rows are all zero
        assert!(enc.matrix.row(0).iter().all(|&v| v == 0.0));
        assert!(enc.matrix.row(3).iter().all(|&v| v == 0.0));
        assert_eq!(enc.matrix[[1, 0]], 1.0);
        assert_eq!(enc.matrix[[2, 1]], 1.0);
    }

    #[test]
    fn test_reference_is_first_supplied_level() {
        let enc = encode_categorical(&["a", "b", "c"], &["c", "a", "b"], "g").unwrap();
        assert_eq!(enc.names, vec!["ga", "gb"]);
        assert!(enc.matrix.row(2).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_unknown_level() {
        let err = encode_categorical(&["a", "d"], &["a", "b"], "g").unwrap_err();
        assert!(matches!(err, TidyRegError::UnknownLevel { ref label, .. } if label == "d"));
    }

    #[test]
    fn test_single_level_has_no_columns() {
        let enc = encode_categorical(&["a", "a"], &["a"], "g").unwrap();
        assert_eq!(enc.matrix.dim(), (2, 0));
    }

    #[test]
    fn test_factorize_strings() {
        let (levels, codes) = factorize_strings(&["z", "a", "z", "m"]);
        assert_eq!(levels, vec!["a", "m", "z"]);
        assert_eq!(codes, vec![2, 0, 2, 1]);
    }

    #[test]
    fn test_design_with_intercept() {
        let ds = sample();
        let dm = build_design_matrix(
            &ds,
            &[Term::Numeric("x".into()), Term::Categorical("g".into())],
            true,
        )
        .unwrap();
        assert_eq!(dm.matrix.dim(), (4, 4));
        assert_eq!(dm.column_names, vec!["(Intercept)", "x", "gb", "gc"]);
        assert!(dm.matrix.column(0).iter().all(|&v| v == 1.0));
    }

    #[test]
    fn test_design_without_intercept() {
        let ds = sample();
        let dm = build_design_matrix(&ds, &[Term::Numeric("x".into())], false).unwrap();
        assert_eq!(dm.column_names, vec!["x"]);
        assert!(!dm.has_intercept);
    }

    #[test]
    fn test_interaction_columns() {
        let ds = sample();
        let term = Term::Interaction(vec![Term::Numeric("x".into()), Term::Numeric("g".into())]);
        let dm = build_design_matrix(&ds, &[term], false).unwrap();
        assert_eq!(dm.column_names, vec!["x:gb", "x:gc"]);
        assert_eq!(dm.matrix[[1, 0]], 2.0);
        assert_eq!(dm.matrix[[2, 1]], 3.0);
        assert_eq!(dm.matrix[[0, 0]], 0.0);
    }

    #[test]
    fn test_power_and_log() {
        let ds = sample();
        let dm = build_design_matrix(
            &ds,
            &[
                Term::Power { name: "x".into(), exponent: 2 },
                Term::Log("x".into()),
            ],
            false,
        )
        .unwrap();
        assert_eq!(dm.column_names, vec!["I(x^2)", "log(x)"]);
        assert_eq!(dm.matrix[[3, 0]], 16.0);
        assert!((dm.matrix[[0, 1]] - 0.0).abs() < 1e-15);
    }

    #[test]
    fn test_power_exponent_out_of_range() {
        let ds = sample();
        let term = Term::Power { name: "x".into(), exponent: 4_000_000_000 };
        assert!(matches!(
            build_design_matrix(&ds, &[term], true),
            Err(TidyRegError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_log_rejects_non_positive() {
        let ds = Dataset::new().with_numeric("x", vec![1.0, 0.0]).unwrap();
        let result = build_design_matrix(&ds, &[Term::Log("x".into())], true);
        assert!(matches!(result, Err(TidyRegError::InvalidValue(_))));
    }

    #[test]
    fn test_categorical_term_on_numeric_column() {
        let ds = sample();
        let result = build_design_matrix(&ds, &[Term::Categorical("x".into())], true);
        assert!(matches!(result, Err(TidyRegError::InvalidValue(_))));
    }

    #[test]
    fn test_unknown_column() {
        let ds = sample();
        let result = build_design_matrix(&ds, &[Term::Numeric("nope".into())], true);
        assert!(matches!(result, Err(TidyRegError::UnknownColumn(_))));
    }

    #[test]
    fn test_evaluate_term() {
        let ds = sample();
        let y = evaluate_term(&ds, &Term::Power { name: "x".into(), exponent: 2 }).unwrap();
        assert_eq!(y.to_vec(), vec![1.0, 4.0, 9.0, 16.0]);
        assert!(evaluate_term(&ds, &Term::Numeric("g".into())).is_err());
        assert!(evaluate_term(&ds, &Term::BSpline { name: "x".into(), df: 3, degree: 3 }).is_err());
    }

    #[test]
    fn test_from_matrix_default_names() {
        let dm = DesignMatrix::from_matrix(Array2::zeros((3, 2)), None, false).unwrap();
        assert_eq!(dm.column_names, vec!["x1", "x2"]);
        assert!(DesignMatrix::from_matrix(Array2::zeros((3, 2)), Some(vec!["a".into()]), false).is_err());
    }
}
