// =============================================================================
// Dataset
// =============================================================================
//
// A dataset is an ordered list of named, row-aligned columns. Each column is
// either numeric or categorical, and that choice is made when the column is
// added. Nothing downstream converts strings into categories on the fly.
//
// =============================================================================

use ndarray::Array1;

use crate::design_matrix::factorize_strings;
use crate::error::{Result, TidyRegError};

/// Values held by a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Continuous values, one per row.
    Numeric(Vec<f64>),
    /// Labels, one per row, plus the ordered level set.
    ///
    /// `levels[0]` is the reference level. Every label is guaranteed to be
    /// one of `levels` (checked at construction).
    Categorical { labels: Vec<String>, levels: Vec<String> },
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(values) => values.len(),
            Column::Categorical { labels, .. } => labels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedColumn {
    pub name: String,
    pub column: Column,
}

/// Row-aligned collection of named columns.
///
/// Built incrementally with the `with_*` methods, each of which checks the
/// equal-length and unique-name invariants.
///
/// ```
/// use tidyreg_core::data::Dataset;
///
/// let ds = Dataset::new()
///     .with_numeric("price", vec![10.0, 12.0, 15.0]).unwrap()
///     .with_factor("region", &["north", "south", "north"]).unwrap();
/// assert_eq!(ds.nrows(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<NamedColumn>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows (0 for a dataset with no columns).
    pub fn nrows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.column.len())
    }

    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn columns(&self) -> &[NamedColumn] {
        &self.columns
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Result<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| &c.column)
            .ok_or_else(|| TidyRegError::UnknownColumn(name.to_string()))
    }

    /// Look up a numeric column and return it as an array.
    pub fn numeric(&self, name: &str) -> Result<Array1<f64>> {
        match self.column(name)? {
            Column::Numeric(values) => Ok(Array1::from_vec(values.clone())),
            Column::Categorical { .. } => Err(TidyRegError::InvalidValue(format!(
                "column '{}' is categorical, expected numeric",
                name
            ))),
        }
    }

    /// Append a numeric column.
    pub fn with_numeric(self, name: &str, values: Vec<f64>) -> Result<Self> {
        self.push(name, Column::Numeric(values))
    }

    /// Append a categorical column with explicit levels.
    ///
    /// The first level is the reference. Fails with `UnknownLevel` if any
    /// label is not in `levels`.
    pub fn with_categorical<S: AsRef<str>, L: AsRef<str>>(
        self,
        name: &str,
        labels: &[S],
        levels: &[L],
    ) -> Result<Self> {
        let labels: Vec<String> = labels.iter().map(|s| s.as_ref().to_string()).collect();
        let levels: Vec<String> = levels.iter().map(|s| s.as_ref().to_string()).collect();
        check_levels(name, &labels, &levels)?;
        self.push(name, Column::Categorical { labels, levels })
    }

    /// Append a categorical column whose levels are the sorted distinct
    /// labels, so the alphabetically first label is the reference.
    pub fn with_factor<S: AsRef<str>>(self, name: &str, labels: &[S]) -> Result<Self> {
        let labels: Vec<String> = labels.iter().map(|s| s.as_ref().to_string()).collect();
        let (levels, _) = factorize_strings(&labels);
        self.push(name, Column::Categorical { labels, levels })
    }

    fn push(mut self, name: &str, column: Column) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(TidyRegError::InvalidValue("column name is empty".to_string()));
        }
        if self.columns.iter().any(|c| c.name == name) {
            return Err(TidyRegError::InvalidValue(format!(
                "duplicate column name '{}'",
                name
            )));
        }
        if !self.columns.is_empty() && column.len() != self.nrows() {
            return Err(TidyRegError::DimensionMismatch(format!(
                "column '{}' has {} rows but dataset has {}",
                name,
                column.len(),
                self.nrows()
            )));
        }
        self.columns.push(NamedColumn {
            name: name.to_string(),
            column,
        });
        Ok(self)
    }
}

fn check_levels(name: &str, labels: &[String], levels: &[String]) -> Result<()> {
    for (i, level) in levels.iter().enumerate() {
        if levels[..i].contains(level) {
            return Err(TidyRegError::InvalidValue(format!(
                "duplicate level '{}' in column '{}'",
                level, name
            )));
        }
    }
    if let Some(bad) = labels.iter().find(|l| !levels.contains(l)) {
        return Err(TidyRegError::UnknownLevel {
            column: name.to_string(),
            label: bad.clone(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_must_align() {
        let result = Dataset::new()
            .with_numeric("x", vec![1.0, 2.0, 3.0])
            .unwrap()
            .with_numeric("y", vec![1.0, 2.0]);
        assert!(matches!(result, Err(TidyRegError::DimensionMismatch(_))));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let result = Dataset::new()
            .with_numeric("x", vec![1.0])
            .unwrap()
            .with_numeric("x", vec![2.0]);
        assert!(matches!(result, Err(TidyRegError::InvalidValue(_))));
    }

    #[test]
    fn test_factor_levels_sorted() {
        let ds = Dataset::new()
            .with_factor("g", &["b", "a", "c", "a"])
            .unwrap();
        match ds.column("g").unwrap() {
            Column::Categorical { levels, .. } => assert_eq!(levels, &["a", "b", "c"]),
            _ => panic!("expected categorical"),
        }
    }

    #[test]
    fn test_categorical_unknown_label() {
        let result = Dataset::new().with_categorical("g", &["a", "z"], &["a", "b"]);
        assert_eq!(
            result.unwrap_err(),
            TidyRegError::UnknownLevel {
                column: "g".to_string(),
                label: "z".to_string()
            }
        );
    }

    #[test]
    fn test_numeric_lookup() {
        let ds = Dataset::new()
            .with_numeric("x", vec![1.0, 2.0])
            .unwrap()
            .with_factor("g", &["a", "b"])
            .unwrap();
        assert_eq!(ds.numeric("x").unwrap().to_vec(), vec![1.0, 2.0]);
        assert!(ds.numeric("g").is_err());
        assert!(matches!(ds.column("nope"), Err(TidyRegError::UnknownColumn(_))));
        assert_eq!(ds.column_names(), vec!["x", "g"]);
    }
}
