// =============================================================================
// B-Spline Basis
// =============================================================================
//
// Non-linear effects of a continuous variable are modelled by replacing x
// with a set of piecewise-polynomial basis columns B_1(x) .. B_df(x). The fit
// stays an ordinary linear regression on those columns.
//
// Knot placement matches R's `splines::bs`:
//
//   - boundary knots default to [min(x), max(x)]
//   - interior knots sit at evenly spaced quantiles of x
//   - the number of interior knots is df - degree (df - degree - 1 when the
//     intercept column is kept)
//
// The full basis has (interior + degree + 1) functions and always sums to 1
// inside the boundary knots. Without an intercept the first function is
// dropped, which leaves exactly `df` columns.
//
// =============================================================================

use ndarray::{Array1, Array2};

use crate::error::{Result, TidyRegError};

/// Compute a B-spline basis matrix.
///
/// # Arguments
/// * `x` - Data points
/// * `df` - Number of returned columns
/// * `degree` - Polynomial degree (3 = cubic)
/// * `boundary_knots` - `(lower, upper)`; defaults to the data range
/// * `include_intercept` - Keep the first basis function
///
/// # Returns
/// An `n × df` matrix.
pub fn bs_basis(
    x: &Array1<f64>,
    df: usize,
    degree: usize,
    boundary_knots: Option<(f64, f64)>,
    include_intercept: bool,
) -> Result<Array2<f64>> {
    if x.is_empty() {
        return Err(TidyRegError::EmptyInput("spline input is empty".to_string()));
    }
    if degree == 0 {
        return Err(TidyRegError::InvalidValue("spline degree must be at least 1".to_string()));
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(TidyRegError::InvalidValue("spline input contains non-finite values".to_string()));
    }

    let min_df = if include_intercept { degree + 1 } else { degree };
    if df < min_df {
        return Err(TidyRegError::InvalidValue(format!(
            "df = {} is too small for degree {} (need at least {})",
            df, degree, min_df
        )));
    }

    let (lower, upper) = match boundary_knots {
        Some(b) => b,
        None => (
            x.iter().copied().fold(f64::INFINITY, f64::min),
            x.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        ),
    };
    if !(upper > lower) {
        return Err(TidyRegError::InvalidValue(format!(
            "boundary knots must satisfy lower < upper, got ({}, {})",
            lower, upper
        )));
    }

    let n_interior = df - min_df;
    let interior = interior_knots(x, n_interior);
    let knots = knot_sequence(lower, upper, &interior, degree);

    let n_basis = interior.len() + degree + 1;
    let skip = if include_intercept { 0 } else { 1 };

    let mut basis = Array2::zeros((x.len(), n_basis - skip));
    for (row, &xi) in x.iter().enumerate() {
        let values = basis_at(xi.clamp(lower, upper), &knots, degree, n_basis);
        for j in skip..n_basis {
            basis[[row, j - skip]] = values[j];
        }
    }

    Ok(basis)
}

/// Evenly spaced quantiles of `x`, excluding 0 and 1 (type-7 quantiles, as
/// R's `quantile` default).
fn interior_knots(x: &Array1<f64>, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    let mut sorted = x.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len();

    (1..=count)
        .map(|i| {
            let p = i as f64 / (count + 1) as f64;
            let h = (n - 1) as f64 * p;
            let lo = h.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
        })
        .collect()
}

/// Full knot vector with the boundary knots repeated `degree + 1` times.
fn knot_sequence(lower: f64, upper: f64, interior: &[f64], degree: usize) -> Vec<f64> {
    let mut knots = Vec::with_capacity(interior.len() + 2 * (degree + 1));
    knots.extend(std::iter::repeat(lower).take(degree + 1));
    knots.extend_from_slice(interior);
    knots.extend(std::iter::repeat(upper).take(degree + 1));
    knots
}

/// All basis functions at one point via the Cox-de Boor recursion.
fn basis_at(x: f64, knots: &[f64], degree: usize, n_basis: usize) -> Vec<f64> {
    let upper = knots[knots.len() - 1];

    // Degree 0: indicator of the knot span containing x. The right boundary
    // belongs to the last non-empty span.
    let mut b: Vec<f64> = (0..knots.len() - 1)
        .map(|i| {
            let (t0, t1) = (knots[i], knots[i + 1]);
            let inside = (t0 <= x && x < t1) || (x == upper && t0 < t1 && t1 == upper);
            if inside { 1.0 } else { 0.0 }
        })
        .collect();

    for d in 1..=degree {
        let next: Vec<f64> = (0..knots.len() - 1 - d)
            .map(|i| {
                let left_den = knots[i + d] - knots[i];
                let right_den = knots[i + d + 1] - knots[i + 1];
                let left = if left_den > 0.0 {
                    (x - knots[i]) / left_den * b[i]
                } else {
                    0.0
                };
                let right = if right_den > 0.0 {
                    (knots[i + d + 1] - x) / right_den * b[i + 1]
                } else {
                    0.0
                };
                left + right
            })
            .collect();
        b = next;
    }

    b.truncate(n_basis);
    b
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn grid() -> Array1<f64> {
        Array1::linspace(0.0, 10.0, 41)
    }

    #[test]
    fn test_shape_matches_df() {
        let basis = bs_basis(&grid(), 5, 3, None, false).unwrap();
        assert_eq!(basis.dim(), (41, 5));

        let basis = bs_basis(&grid(), 5, 3, None, true).unwrap();
        assert_eq!(basis.dim(), (41, 5));
    }

    #[test]
    fn test_partition_of_unity_with_intercept() {
        let basis = bs_basis(&grid(), 6, 3, None, true).unwrap();
        for row in basis.rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_non_negative() {
        let basis = bs_basis(&grid(), 4, 2, None, false).unwrap();
        assert!(basis.iter().all(|&v| v >= -1e-15));
    }

    #[test]
    fn test_endpoints() {
        // At the upper boundary only the last basis function is active.
        let basis = bs_basis(&grid(), 4, 3, None, false).unwrap();
        let last = basis.row(40);
        assert_abs_diff_eq!(last[3], 1.0, epsilon = 1e-12);
        // At the lower boundary the dropped first function carries all mass.
        assert_abs_diff_eq!(basis.row(0).sum(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_df_equal_to_degree_is_polynomial_basis() {
        // No interior knots: cubic Bernstein polynomials minus the first.
        let x = Array1::from_vec(vec![0.0, 0.5, 1.0]);
        let basis = bs_basis(&x, 3, 3, None, false).unwrap();
        // B_3(t) = t^3
        assert_abs_diff_eq!(basis[[1, 2]], 0.125, epsilon = 1e-12);
        // B_1(t) = 3 t (1-t)^2
        assert_abs_diff_eq!(basis[[1, 0]], 0.375, epsilon = 1e-12);
    }

    #[test]
    fn test_interior_knots_are_quantiles() {
        let x = Array1::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(interior_knots(&x, 1), vec![3.0]);
        assert_eq!(interior_knots(&x, 3), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(bs_basis(&grid(), 2, 3, None, false).is_err());
        assert!(bs_basis(&Array1::from_vec(vec![1.0, 1.0]), 3, 3, None, false).is_err());
        assert!(bs_basis(&Array1::zeros(0), 3, 3, None, false).is_err());
    }
}
