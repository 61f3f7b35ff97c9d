//! Single-variable equation solving.
//!
//! An equation in `x` is parsed, both sides are expanded into polynomials and
//! the roots of their difference form the solution set.

mod parser;
mod polynomial;

pub use parser::{BinaryOp, Equation, Expr, Function, Parser};
pub use polynomial::{Polynomial, Root};

use tracing::debug;

use crate::error::EquationError;

/// Coefficients smaller than this, relative to the input's scale, are noise
const NOISE_TOL: f64 = 1e-12;

/// Outcome of solving an equation symbolically.
#[derive(Debug, Clone, PartialEq)]
pub enum SolutionSet {
    /// Roots ordered by descending real part; empty when nothing satisfies the equation
    Finite(Vec<Root>),
    /// Every real number is a solution
    Infinite(String),
}

/// Solve `source` for `x` and return its whole solution set.
pub fn solution_set(source: &str) -> Result<SolutionSet, EquationError> {
    let equation = Parser::parse(source)?;
    let lhs = Polynomial::from_expr(&equation.lhs)?;
    let rhs = Polynomial::from_expr(&equation.rhs)?;

    let scale = lhs.magnitude().max(rhs.magnitude()).max(1.0);
    let difference = lhs.sub(&rhs).trimmed(NOISE_TOL * scale);

    debug!(
        component = "equation",
        operation = "normalize",
        status = "success",
        degree = ?difference.degree(),
        "Normalized equation"
    );

    if difference.is_zero() {
        return Ok(SolutionSet::Infinite(format!(
            "'{source}' holds for every real x"
        )));
    }

    Ok(SolutionSet::Finite(difference.roots()))
}

/// First finite real root of `source`, taking roots by descending value.
///
/// # Errors
///
/// - `Parse` for malformed input or symbols other than `x`, `pi`, `e`
/// - `NoFiniteSolutions` when the solution set cannot be listed
/// - `NoRealRoot` when no listed solution is a finite real number
pub fn solve_equation(source: &str) -> Result<f64, EquationError> {
    match solution_set(source)? {
        SolutionSet::Infinite(reason) => Err(EquationError::NoFiniteSolutions(reason)),
        SolutionSet::Finite(roots) => roots
            .iter()
            .find_map(Root::as_real)
            // -0 reads as 0
            .map(|x| x + 0.0)
            .ok_or_else(|| EquationError::NoRealRoot(format!("'{source}' has no real solution"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_default_equation() {
        assert_eq!(solve_equation("x^2 + 7 = 43"), Ok(6.0));
    }

    #[test]
    fn test_no_real_root() {
        let err = solve_equation("x^2 + 1 = 0").unwrap_err();
        assert_eq!(err.kind(), "NoRealRoot");

        let err = solve_equation("x^4 + 1 = 0").unwrap_err();
        assert_eq!(err.kind(), "NoRealRoot");
    }

    #[test]
    fn test_linear() {
        assert_eq!(solve_equation("2x + 3 = 11"), Ok(4.0));
        assert_eq!(solve_equation("3(x - 1) = x + 5"), Ok(4.0));
        assert_eq!(solve_equation("2x = 0"), Ok(0.0));
        assert!(solve_equation("2x = 0").unwrap().is_sign_positive());
    }

    #[test]
    fn test_without_equals_sign() {
        assert_eq!(solve_equation("x - 5"), Ok(5.0));
    }

    #[test]
    fn test_largest_root_first() {
        let root = solve_equation("x^3 - 6x^2 + 11x - 6 = 0").unwrap();
        assert!(close(root, 3.0), "{root}");

        let root = solve_equation("x^3 = 8").unwrap();
        assert!(close(root, 2.0), "{root}");

        assert_eq!(solve_equation("(x - 2)^2 = 0"), Ok(2.0));
    }

    #[test]
    fn test_identity_and_contradiction() {
        let err = solve_equation("x + 1 = 1 + x").unwrap_err();
        assert_eq!(err.kind(), "NoFiniteSolutions");
        assert!(matches!(solution_set("2(x + 1) = 2x + 2"), Ok(SolutionSet::Infinite(_))));

        let err = solve_equation("x + 1 = x").unwrap_err();
        assert_eq!(err.kind(), "NoRealRoot");
        assert_eq!(solution_set("x + 1 = x"), Ok(SolutionSet::Finite(Vec::new())));
    }

    #[test]
    fn test_rounding_noise_is_not_a_term() {
        let err = solve_equation("0.1x + 0.2x = 0.3x").unwrap_err();
        assert_eq!(err.kind(), "NoFiniteSolutions");
    }

    #[test]
    fn test_non_polynomial_equations() {
        for source in ["sin(x) = 0", "1/x = 2", "2^x = 8", "sqrt(x) = 3"] {
            let err = solve_equation(source).unwrap_err();
            assert_eq!(err.kind(), "NoFiniteSolutions", "{source}");
        }
    }

    #[test]
    fn test_constants_and_functions() {
        let root = solve_equation("x = 2pi").unwrap();
        assert!(close(root, 2.0 * std::f64::consts::PI));

        let root = solve_equation("x^2 = sqrt(16) + ln(e)").unwrap();
        assert!(close(root, 5.0_f64.sqrt()));
    }

    #[test]
    fn test_parse_faults() {
        assert_eq!(solve_equation("y + 1 = 0").unwrap_err().kind(), "Parse");
        assert_eq!(solve_equation("x = 1 = 2").unwrap_err().kind(), "Parse");
        assert_eq!(solve_equation("").unwrap_err().kind(), "Parse");
    }

    #[test]
    fn test_complex_roots_are_listed() {
        let set = solution_set("x^2 + 2x + 5 = 0").unwrap();
        assert_eq!(
            set,
            SolutionSet::Finite(vec![
                Root::Complex { re: -1.0, im: 2.0 },
                Root::Complex { re: -1.0, im: -2.0 },
            ])
        );
    }

    #[test]
    fn test_expanded_degree_is_bounded() {
        for source in ["(x^64)^64 = 1", "(x^8)^9 = 1", "x * x^64 = 1", "(x^2 + 1)^40 = 0"] {
            let err = solve_equation(source).unwrap_err();
            assert_eq!(err.kind(), "NoFiniteSolutions", "{source}");
            assert!(err.to_string().contains("exceeds"), "{source}: {err}");
        }

        let root = solve_equation("(x^2)^3 = 64").unwrap();
        assert!(close(root, 2.0), "{root}");
    }

    #[test]
    fn test_deep_input_is_a_parse_fault() {
        let deep = format!("{}x{} = 1", "(".repeat(100_000), ")".repeat(100_000));
        assert_eq!(solve_equation(&deep).unwrap_err().kind(), "Parse");
    }
}
