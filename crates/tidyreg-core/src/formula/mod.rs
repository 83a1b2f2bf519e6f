//! Formula parsing for R-style model specifications.
//!
//! Compiles formulas like `"log(price) ~ carat * C(cut) + bs(depth, df = 4) - 1"`
//! into a response term plus an ordered list of [`Term`]s for the design
//! matrix builder. The parser knows nothing about the data. Whether a plain
//! name is numeric or categorical is decided by the dataset column it names.
//!
//! Supported syntax:
//! - main effects `x`
//! - forced categoricals `C(g)`
//! - pure interactions `a:b` and crossings `a*b` (= `a + b + a:b`)
//! - intercept control `0 + ...`, `1 + ...`, `... - 1`
//! - transforms `I(x^k)`, `log(x)`, `bs(x, df = k, degree = d)`

use crate::design_matrix::Term;
use crate::error::{Result, TidyRegError};

/// Result of parsing a formula.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFormula {
    /// Left-hand side: a plain column, `log(y)` or `I(y^k)`.
    pub response: Term,
    /// Right-hand side, main effects first, then interactions by order.
    pub terms: Vec<Term>,
    pub has_intercept: bool,
}

impl ParsedFormula {
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }
}

fn formula_err(msg: impl Into<String>) -> TidyRegError {
    TidyRegError::Formula(msg.into())
}

/// Split `s` on any of `seps` at parenthesis depth zero, returning each piece
/// with the separator that preceded it (`None` for the first piece).
fn split_top_level(s: &str, seps: &[char]) -> Result<Vec<(Option<char>, String)>> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut lead = None;
    let mut depth = 0i32;

    for c in s.chars() {
        match c {
            '(' => {
                depth += 1;
                current.push(c);
            }
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(formula_err(format!("unbalanced ')' in '{}'", s)));
                }
                current.push(c);
            }
            c if depth == 0 && seps.contains(&c) => {
                pieces.push((lead, current.trim().to_string()));
                current = String::new();
                lead = Some(c);
            }
            _ => current.push(c),
        }
    }
    if depth != 0 {
        return Err(formula_err(format!("unbalanced '(' in '{}'", s)));
    }
    pieces.push((lead, current.trim().to_string()));
    Ok(pieces)
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '.' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}

fn identifier(s: &str) -> Result<String> {
    let s = s.trim();
    if is_identifier(s) {
        Ok(s.to_string())
    } else {
        Err(formula_err(format!("'{}' is not a valid variable name", s)))
    }
}

/// Strip `name(` ... `)` around a call, returning the inner argument text.
fn call_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    let rest = s.strip_prefix(name)?.trim_start();
    let inner = rest.strip_prefix('(')?.strip_suffix(')')?;
    Some(inner)
}

/// Parse `bs(x, df = 5, degree = 3)`; positional second argument is df.
fn parse_spline(args: &str) -> Result<Term> {
    let parts = split_top_level(args, &[','])?;
    let name = identifier(&parts[0].1)?;
    let mut df = None;
    let mut degree = 3usize;

    for (i, (_, part)) in parts.iter().enumerate().skip(1) {
        let (key, value) = match part.split_once('=') {
            Some((k, v)) => (k.trim(), v.trim()),
            None if i == 1 => ("df", part.as_str()),
            None => return Err(formula_err(format!("unexpected bs() argument '{}'", part))),
        };
        let parsed: usize = value
            .parse()
            .map_err(|_| formula_err(format!("bs() argument {} = '{}' is not an integer", key, value)))?;
        match key {
            "df" => df = Some(parsed),
            "degree" => degree = parsed,
            other => return Err(formula_err(format!("unknown bs() argument '{}'", other))),
        }
    }

    Ok(Term::BSpline {
        name,
        df: df.unwrap_or(degree),
        degree,
    })
}

/// Parse one factor of an interaction: a name or a single call.
fn parse_factor(s: &str) -> Result<Term> {
    let s = s.trim();
    if s.is_empty() {
        return Err(formula_err("empty term"));
    }
    if let Some(inner) = call_args(s, "C") {
        return Ok(Term::Categorical(identifier(inner)?));
    }
    if let Some(inner) = call_args(s, "log") {
        return Ok(Term::Log(identifier(inner)?));
    }
    if let Some(inner) = call_args(s, "bs") {
        return parse_spline(inner);
    }
    if let Some(inner) = call_args(s, "I") {
        let (base, exp) = inner
            .split_once('^')
            .ok_or_else(|| formula_err(format!("I({}) must have the form I(x^k)", inner)))?;
        let exponent: u32 = exp
            .trim()
            .parse()
            .map_err(|_| formula_err(format!("exponent in I({}) must be a positive integer", inner)))?;
        if exponent == 0 || i32::try_from(exponent).is_err() {
            return Err(formula_err(format!(
                "exponent in I({}) must be between 1 and {}",
                inner,
                i32::MAX
            )));
        }
        return Ok(Term::Power {
            name: identifier(base)?,
            exponent,
        });
    }
    Ok(Term::Numeric(identifier(s)?))
}

/// Largest `a*b*...` crossing accepted; k factors expand to 2^k - 1 terms.
const MAX_CROSSED_FACTORS: usize = 10;

/// Expand `a*b*c` into every non-empty subset of the factors.
fn cross(factors: &[Term]) -> Vec<Term> {
    let k = factors.len();
    let mut out = Vec::new();
    for mask in 1u32..(1 << k) {
        let chosen: Vec<Term> = (0..k)
            .filter(|i| mask & (1 << i) != 0)
            .map(|i| factors[i].clone())
            .collect();
        out.push(if chosen.len() == 1 {
            chosen.into_iter().next().unwrap_or_else(|| factors[0].clone())
        } else {
            Term::Interaction(chosen)
        });
    }
    out
}

/// Expand one `+`-separated piece into its terms.
fn parse_piece(piece: &str) -> Result<Vec<Term>> {
    let crossed = split_top_level(piece, &['*'])?;
    let mut expanded: Vec<Vec<Term>> = Vec::with_capacity(crossed.len());
    for (_, part) in &crossed {
        let factors = split_top_level(part, &[':'])?
            .iter()
            .map(|(_, f)| parse_factor(f))
            .collect::<Result<Vec<_>>>()?;
        expanded.push(factors);
    }

    if expanded.len() > MAX_CROSSED_FACTORS {
        return Err(formula_err(format!(
            "'{}' crosses {} factors; at most {} are supported",
            piece.trim(),
            expanded.len(),
            MAX_CROSSED_FACTORS
        )));
    }

    if expanded.len() == 1 {
        let factors = expanded.pop().unwrap_or_default();
        return Ok(vec![if factors.len() == 1 {
            factors.into_iter().next().ok_or_else(|| formula_err("empty term"))?
        } else {
            Term::Interaction(factors)
        }]);
    }

    // a:b * c crosses the blocks {a:b} and {c}.
    let blocks: Vec<Term> = expanded
        .into_iter()
        .map(|f| if f.len() == 1 { f[0].clone() } else { Term::Interaction(f) })
        .collect();
    Ok(cross(&blocks).into_iter().map(flatten).collect())
}

/// Collapse nested interactions into one flat factor list.
fn flatten(term: Term) -> Term {
    match term {
        Term::Interaction(parts) => {
            let mut flat = Vec::new();
            for part in parts {
                match flatten(part) {
                    Term::Interaction(inner) => flat.extend(inner),
                    other => flat.push(other),
                }
            }
            if flat.len() == 1 {
                flat.remove(0)
            } else {
                Term::Interaction(flat)
            }
        }
        other => other,
    }
}

fn order(term: &Term) -> usize {
    match term {
        Term::Interaction(parts) => parts.len(),
        _ => 1,
    }
}

/// Canonical key so `a:b` and `b:a` are recognised as the same term.
fn term_key(term: &Term) -> Vec<String> {
    let mut key: Vec<String> = match term {
        Term::Interaction(parts) => parts.iter().map(|t| t.to_string()).collect(),
        other => vec![other.to_string()],
    };
    key.sort();
    key
}

/// Parse a formula string into a response and right-hand-side terms.
///
/// # Errors
/// `TidyRegError::Formula` for a missing/duplicate `~`, an empty side,
/// unbalanced parentheses, invalid names, or unsupported syntax such as
/// removing a term other than the intercept.
pub fn parse_formula(formula: &str) -> Result<ParsedFormula> {
    let parts: Vec<&str> = formula.split('~').collect();
    if parts.len() != 2 {
        return Err(formula_err(format!("formula must contain exactly one '~': {}", formula)));
    }

    let lhs = parts[0].trim();
    if lhs.is_empty() {
        return Err(formula_err("formula has no response"));
    }
    let response = parse_factor(lhs)?;
    if !matches!(response, Term::Numeric(_) | Term::Log(_) | Term::Power { .. }) {
        return Err(formula_err(format!("unsupported response '{}'", lhs)));
    }

    let rhs = parts[1].trim();
    if rhs.is_empty() {
        return Err(formula_err("formula has no right-hand side"));
    }

    let mut has_intercept = true;
    let mut terms: Vec<Term> = Vec::new();

    let pieces = split_top_level(rhs, &['+', '-'])?;
    for (i, (sign, piece)) in pieces.iter().enumerate() {
        let removing = *sign == Some('-');
        // An empty piece is the unary minus in "-1 + x" or "x + -1"
        let unary_minus = pieces.get(i + 1).map_or(false, |(next, _)| *next == Some('-'));
        match piece.as_str() {
            "" if unary_minus => continue,
            "" => return Err(formula_err(format!("empty term in '{}'", rhs))),
            "0" => has_intercept = removing,
            "1" => has_intercept = !removing,
            _ if removing => {
                return Err(formula_err(format!("removing term '{}' is not supported", piece)));
            }
            _ => {
                for term in parse_piece(piece)? {
                    let key = term_key(&term);
                    if !terms.iter().any(|t| term_key(t) == key) {
                        terms.push(term);
                    }
                }
            }
        }
    }

    // Main effects before two-way interactions before three-way ...
    terms.sort_by_key(order);

    if terms.is_empty() && !has_intercept {
        return Err(formula_err("model has neither terms nor an intercept"));
    }

    Ok(ParsedFormula {
        response,
        terms,
        has_intercept,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(s: &str) -> Term {
        Term::Numeric(s.to_string())
    }

    #[test]
    fn test_parse_simple_formula() {
        let parsed = parse_formula("y ~ x1 + x2").unwrap();
        assert_eq!(parsed.response, num("y"));
        assert_eq!(parsed.terms, vec![num("x1"), num("x2")]);
        assert!(parsed.has_intercept);
    }

    #[test]
    fn test_parse_categorical() {
        let parsed = parse_formula("y ~ x1 + C(region)").unwrap();
        assert_eq!(parsed.terms[1], Term::Categorical("region".to_string()));
    }

    #[test]
    fn test_parse_crossing() {
        let parsed = parse_formula("y ~ x1*x2").unwrap();
        assert_eq!(
            parsed.terms,
            vec![num("x1"), num("x2"), Term::Interaction(vec![num("x1"), num("x2")])]
        );
    }

    #[test]
    fn test_three_way_crossing_ordered_by_degree() {
        let parsed = parse_formula("y ~ a*b*c").unwrap();
        assert_eq!(parsed.terms.len(), 7);
        assert_eq!(&parsed.terms[..3], &[num("a"), num("b"), num("c")]);
        assert!(parsed.terms[3..6].iter().all(|t| order(t) == 2));
        assert_eq!(order(&parsed.terms[6]), 3);
    }

    #[test]
    fn test_crossing_limit() {
        let ten: Vec<String> = (0..10).map(|i| format!("x{}", i)).collect();
        let parsed = parse_formula(&format!("y ~ {}", ten.join("*"))).unwrap();
        assert_eq!(parsed.terms.len(), 1023);

        let forty: Vec<String> = (0..40).map(|i| format!("x{}", i)).collect();
        assert!(matches!(
            parse_formula(&format!("y ~ {}", forty.join("*"))),
            Err(TidyRegError::Formula(_))
        ));
    }

    #[test]
    fn test_pure_interaction_and_dedup() {
        let parsed = parse_formula("y ~ a:b + b:a + a + a").unwrap();
        assert_eq!(
            parsed.terms,
            vec![num("a"), Term::Interaction(vec![num("a"), num("b")])]
        );
    }

    #[test]
    fn test_no_intercept() {
        assert!(!parse_formula("y ~ 0 + x1 + x2").unwrap().has_intercept);
        assert!(!parse_formula("y ~ x1 + x2 - 1").unwrap().has_intercept);
        assert!(!parse_formula("y ~ -1 + x1").unwrap().has_intercept);
        assert!(!parse_formula("y ~ x1 + -1").unwrap().has_intercept);
        assert!(!parse_formula("y ~ x1 + -1 + x2").unwrap().has_intercept);
        assert!(parse_formula("y ~ 1 + x1").unwrap().has_intercept);
    }

    #[test]
    fn test_intercept_only() {
        let parsed = parse_formula("y ~ 1").unwrap();
        assert!(parsed.terms.is_empty());
        assert!(parsed.has_intercept);
        assert!(parse_formula("y ~ 0").is_err());
    }

    #[test]
    fn test_transforms() {
        let parsed = parse_formula("log(y) ~ I(x^2) + log(z) + bs(age, df = 5) + bs(w, 4, degree = 2)").unwrap();
        assert_eq!(parsed.response, Term::Log("y".to_string()));
        assert_eq!(
            parsed.terms,
            vec![
                Term::Power { name: "x".into(), exponent: 2 },
                Term::Log("z".into()),
                Term::BSpline { name: "age".into(), df: 5, degree: 3 },
                Term::BSpline { name: "w".into(), df: 4, degree: 2 },
            ]
        );
    }

    #[test]
    fn test_spline_default_df() {
        let parsed = parse_formula("y ~ bs(x)").unwrap();
        assert_eq!(parsed.terms[0], Term::BSpline { name: "x".into(), df: 3, degree: 3 });
    }

    #[test]
    fn test_complex_formula() {
        let parsed = parse_formula("y ~ bs(age, df=5) + C(region)*income + x1:x2").unwrap();
        assert_eq!(parsed.terms.len(), 5);
        assert_eq!(parsed.terms[1], Term::Categorical("region".into()));
        assert_eq!(parsed.terms[2], num("income"));
        assert_eq!(
            parsed.terms[3],
            Term::Interaction(vec![Term::Categorical("region".into()), num("income")])
        );
    }

    #[test]
    fn test_errors() {
        for bad in [
            "y x",
            "y ~ x ~ z",
            " ~ x",
            "y ~ ",
            "y ~ (x",
            "y ~ x)",
            "y ~ x - z",
            "y ~ I(x)",
            "y ~ I(x^0)",
            "y ~ bs(x, knots = 3)",
            "y ~ 2x",
            "y ~ x + + z",
            "y ~ x + -z",
            "y ~ I(x^4000000000)",
            "C(y) ~ x",
        ] {
            assert!(
                matches!(parse_formula(bad), Err(TidyRegError::Formula(_))),
                "expected formula error for {:?}",
                bad
            );
        }
    }
}
