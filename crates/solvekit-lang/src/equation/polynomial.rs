use std::cmp::Ordering;

use super::parser::{BinaryOp, Expr};
use crate::error::EquationError;

/// Highest power of `x` accepted when expanding
pub const MAX_DEGREE: usize = 64;

/// Relative tolerance for treating a value as zero
const ZERO_TOL: f64 = 1e-12;

/// A root of a polynomial
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Root {
    Real(f64),
    Complex { re: f64, im: f64 },
}

impl Root {
    pub fn real_part(&self) -> f64 {
        match *self {
            Root::Real(v) => v,
            Root::Complex { re, .. } => re,
        }
    }

    /// The value if this root is a finite real number.
    pub fn as_real(&self) -> Option<f64> {
        match *self {
            Root::Real(v) if v.is_finite() => Some(v),
            _ => None,
        }
    }
}

/// Dense univariate polynomial with `f64` coefficients.
///
/// `coeffs[i]` multiplies `x^i`; the leading coefficient is never exactly zero,
/// so the zero polynomial has no coefficients at all.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polynomial {
    coeffs: Vec<f64>,
}

impl Polynomial {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn constant(c: f64) -> Self {
        Self::from_coeffs(vec![c])
    }

    /// The polynomial `x`
    pub fn unknown() -> Self {
        Self::from_coeffs(vec![0.0, 1.0])
    }

    pub fn from_coeffs(mut coeffs: Vec<f64>) -> Self {
        while coeffs.last() == Some(&0.0) {
            coeffs.pop();
        }
        Self { coeffs }
    }

    /// Expand `expr` into a polynomial in `x`.
    ///
    /// # Errors
    ///
    /// `NoFiniteSolutions` when `expr` is not a polynomial (`1/x`, `sin(x)`,
    /// `2^x`, fractional powers of `x`) or divides by zero. `NoRealRoot` when an
    /// `x`-free part evaluates to something that is not a finite real number.
    pub fn from_expr(expr: &Expr) -> Result<Self, EquationError> {
        if !contains_unknown(expr) {
            return Ok(Self::constant(eval_constant(expr)?));
        }

        match expr {
            Expr::Unknown => Ok(Self::unknown()),
            Expr::Number(v) => Ok(Self::constant(*v)),
            Expr::Neg(inner) => Ok(Self::from_expr(inner)?.neg()),
            Expr::Binary { op, left, right } => match op {
                BinaryOp::Add => Ok(Self::from_expr(left)?.add(&Self::from_expr(right)?)),
                BinaryOp::Sub => Ok(Self::from_expr(left)?.sub(&Self::from_expr(right)?)),
                BinaryOp::Mul => {
                    let (left, right) = (Self::from_expr(left)?, Self::from_expr(right)?);
                    check_degree(left.degree().unwrap_or(0) + right.degree().unwrap_or(0))?;
                    Ok(left.mul(&right))
                }
                BinaryOp::Div => {
                    if contains_unknown(right) {
                        return Err(not_polynomial("division by an expression in x"));
                    }
                    let divisor = eval_constant(right)?;
                    if divisor == 0.0 {
                        return Err(EquationError::NoFiniteSolutions(
                            "division by zero".to_string(),
                        ));
                    }
                    Ok(Self::from_expr(left)?.scale(1.0 / divisor))
                }
                BinaryOp::Pow => {
                    if contains_unknown(right) {
                        return Err(not_polynomial("exponent depends on x"));
                    }
                    let exponent = eval_constant(right)?;
                    if exponent < 0.0 || exponent.fract() != 0.0 {
                        return Err(not_polynomial(&format!("x raised to the power {exponent}")));
                    }
                    if exponent > MAX_DEGREE as f64 {
                        return Err(EquationError::NoFiniteSolutions(format!(
                            "degree {exponent} exceeds the supported maximum of {MAX_DEGREE}"
                        )));
                    }
                    let base = Self::from_expr(left)?;
                    let exponent = exponent as usize;
                    check_degree(base.degree().unwrap_or(0) * exponent)?;
                    Ok(base.pow(exponent))
                }
            },
            Expr::Call { function, .. } => {
                Err(not_polynomial(&format!("{function:?} of x").to_lowercase()))
            }
        }
    }

    /// `None` for the zero polynomial
    pub fn degree(&self) -> Option<usize> {
        self.coeffs.len().checked_sub(1)
    }

    pub fn coeff(&self, power: usize) -> f64 {
        self.coeffs.get(power).copied().unwrap_or(0.0)
    }

    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Largest absolute coefficient
    pub fn magnitude(&self) -> f64 {
        self.coeffs.iter().fold(0.0_f64, |m, c| m.max(c.abs()))
    }

    pub fn neg(&self) -> Self {
        self.scale(-1.0)
    }

    pub fn scale(&self, k: f64) -> Self {
        Self::from_coeffs(self.coeffs.iter().map(|c| c * k).collect())
    }

    pub fn add(&self, other: &Self) -> Self {
        let n = self.coeffs.len().max(other.coeffs.len());
        Self::from_coeffs((0..n).map(|i| self.coeff(i) + other.coeff(i)).collect())
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    pub fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero();
        }
        let mut coeffs = vec![0.0; self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        Self::from_coeffs(coeffs)
    }

    pub fn pow(&self, exp: usize) -> Self {
        let mut result = Self::constant(1.0);
        let mut base = self.clone();
        let mut n = exp;
        while n > 0 {
            if n % 2 == 1 {
                result = result.mul(&base);
            }
            base = base.mul(&base);
            n /= 2;
        }
        result
    }

    pub fn derivative(&self) -> Self {
        Self::from_coeffs(
            self.coeffs
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, c)| c * i as f64)
                .collect(),
        )
    }

    /// Horner evaluation
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0_f64, |acc, c| acc * x + c)
    }

    /// Drop leading coefficients whose magnitude is at most `tol`.
    pub fn trimmed(&self, tol: f64) -> Self {
        let mut coeffs = self.coeffs.clone();
        while coeffs.last().is_some_and(|c| c.abs() <= tol) {
            coeffs.pop();
        }
        Self { coeffs }
    }

    /// Roots ordered by descending real part.
    ///
    /// Degrees one and two are solved in closed form, complex pairs included.
    /// Higher degrees only report their real roots.
    pub fn roots(&self) -> Vec<Root> {
        let mut roots = match self.degree() {
            Some(2) => self.quadratic_roots(),
            Some(_) => self.real_roots().into_iter().map(Root::Real).collect(),
            None => Vec::new(),
        };
        roots.sort_by(|a, b| {
            b.real_part()
                .partial_cmp(&a.real_part())
                .unwrap_or(Ordering::Equal)
                .then_with(|| imag_part(b).partial_cmp(&imag_part(a)).unwrap_or(Ordering::Equal))
        });
        roots
    }

    /// Distinct real roots in ascending order.
    pub fn real_roots(&self) -> Vec<f64> {
        match self.degree() {
            None | Some(0) => Vec::new(),
            Some(1) => vec![-self.coeffs[0] / self.coeffs[1]],
            Some(2) => {
                let mut roots: Vec<f64> =
                    self.quadratic_roots().iter().filter_map(Root::as_real).collect();
                roots.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
                roots
            }
            Some(_) => self.isolate_real_roots(),
        }
    }

    /// Numerically stable quadratic formula.
    fn quadratic_roots(&self) -> Vec<Root> {
        let (a, b, c) = (self.coeff(2), self.coeff(1), self.coeff(0));
        let discriminant = b * b - 4.0 * a * c;
        let scale = (b * b).max((4.0 * a * c).abs());

        if discriminant.abs() <= ZERO_TOL * scale {
            return vec![Root::Real(-b / (2.0 * a))];
        }

        if discriminant < 0.0 {
            let re = -b / (2.0 * a);
            let im = ((-discriminant).sqrt() / (2.0 * a)).abs();
            return vec![Root::Complex { re, im }, Root::Complex { re, im: -im }];
        }

        let q = -0.5 * (b + b.signum() * discriminant.sqrt());
        let r1 = q / a;
        let r2 = c / q;
        vec![Root::Real(self.polish(r1)), Root::Real(self.polish(r2))]
    }

    /// Split the real line at the derivative's roots and bisect each monotone
    /// piece inside the Cauchy bound.
    fn isolate_real_roots(&self) -> Vec<f64> {
        let n = self.coeffs.len() - 1;
        let lead = self.coeffs[n];
        let bound = 1.0 + self.coeffs[..n].iter().fold(0.0_f64, |m, c| m.max((c / lead).abs()));

        let critical = self.derivative().real_roots();

        let mut points = vec![-bound];
        points.extend(critical.iter().copied().filter(|c| c.abs() < bound));
        points.push(bound);

        let mut roots: Vec<f64> =
            critical.iter().copied().filter(|&c| self.is_near_root(c)).collect();
        for window in points.windows(2) {
            let (lo, hi) = (window[0], window[1]);
            let (flo, fhi) = (self.evaluate(lo), self.evaluate(hi));
            if flo == 0.0 {
                roots.push(lo);
            } else if flo.signum() != fhi.signum() && fhi != 0.0 {
                roots.push(self.polish(self.bisect(lo, hi)));
            }
        }

        roots.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        roots.dedup_by(|a, b| (*a - *b).abs() <= 1e-9 * b.abs().max(1.0));
        roots
    }

    fn bisect(&self, mut lo: f64, mut hi: f64) -> f64 {
        let mut flo = self.evaluate(lo);
        for _ in 0..200 {
            let mid = lo + (hi - lo) / 2.0;
            if mid <= lo || mid >= hi {
                break;
            }
            let fmid = self.evaluate(mid);
            if fmid == 0.0 {
                return mid;
            }
            if fmid.signum() == flo.signum() {
                lo = mid;
                flo = fmid;
            } else {
                hi = mid;
            }
        }
        lo + (hi - lo) / 2.0
    }

    /// `|p(x)|` is within rounding error of zero.
    fn is_near_root(&self, x: f64) -> bool {
        let bound: f64 = self
            .coeffs
            .iter()
            .enumerate()
            .map(|(i, c)| c.abs() * x.abs().powi(i as i32))
            .sum();
        self.evaluate(x).abs() <= 1e-10 * bound.max(f64::MIN_POSITIVE)
    }

    /// Snap to 12 significant digits when that does not increase the residual.
    fn polish(&self, x: f64) -> f64 {
        if !x.is_finite() || x == 0.0 {
            return x;
        }
        let snapped: f64 = format!("{x:.11e}").parse().unwrap_or(x);
        if self.evaluate(snapped).abs() <= self.evaluate(x).abs() {
            snapped
        } else {
            x
        }
    }
}

fn imag_part(root: &Root) -> f64 {
    match *root {
        Root::Real(_) => 0.0,
        Root::Complex { im, .. } => im,
    }
}

fn check_degree(degree: usize) -> Result<(), EquationError> {
    if degree > MAX_DEGREE {
        return Err(EquationError::NoFiniteSolutions(format!(
            "degree {degree} exceeds the supported maximum of {MAX_DEGREE}"
        )));
    }
    Ok(())
}

fn not_polynomial(what: &str) -> EquationError {
    EquationError::NoFiniteSolutions(format!("not a polynomial in x: {what}"))
}

fn contains_unknown(expr: &Expr) -> bool {
    match expr {
        Expr::Unknown => true,
        Expr::Number(_) => false,
        Expr::Neg(inner) => contains_unknown(inner),
        Expr::Binary { left, right, .. } => contains_unknown(left) || contains_unknown(right),
        Expr::Call { arg, .. } => contains_unknown(arg),
    }
}

/// Evaluate an `x`-free expression.
fn eval_constant(expr: &Expr) -> Result<f64, EquationError> {
    let value = match expr {
        Expr::Number(v) => *v,
        Expr::Unknown => return Err(not_polynomial("unexpected x in constant")),
        Expr::Neg(inner) => -eval_constant(inner)?,
        Expr::Binary { op, left, right } => {
            let (l, r) = (eval_constant(left)?, eval_constant(right)?);
            match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div if r == 0.0 => {
                    return Err(EquationError::NoFiniteSolutions("division by zero".to_string()));
                }
                BinaryOp::Div => l / r,
                BinaryOp::Pow => l.powf(r),
            }
        }
        Expr::Call { function, arg } => function.apply(eval_constant(arg)?),
    };

    if value.is_finite() {
        Ok(value)
    } else {
        Err(EquationError::NoRealRoot(format!("{value} is not a finite real number")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equation::parser::Parser;

    fn poly(source: &str) -> Polynomial {
        Polynomial::from_expr(&Parser::parse(source).unwrap().lhs).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_expand_products_and_powers() {
        assert_eq!(poly("(x + 1)^2"), Polynomial::from_coeffs(vec![1.0, 2.0, 1.0]));
        assert_eq!(poly("2x(x - 3)"), Polynomial::from_coeffs(vec![0.0, -6.0, 2.0]));
        assert_eq!(poly("x^0"), Polynomial::constant(1.0));
        assert_eq!(poly("(x^2)/4 - x/2"), Polynomial::from_coeffs(vec![0.0, -0.5, 0.25]));
        assert_eq!(poly("x^(1 + 1)"), Polynomial::from_coeffs(vec![0.0, 0.0, 1.0]));
    }

    #[test]
    fn test_constant_subexpressions_fold() {
        let p = poly("sqrt(4) x + ln(e)");
        assert!(close(p.coeff(1), 2.0));
        assert!(close(p.coeff(0), 1.0));
    }

    #[test]
    fn test_non_polynomials() {
        for source in ["1/x", "sin(x)", "2^x", "x^0.5", "x^-1", "sqrt(x)", "abs(x)"] {
            let expr = Parser::parse(source).unwrap().lhs;
            let err = Polynomial::from_expr(&expr).unwrap_err();
            assert_eq!(err.kind(), "NoFiniteSolutions", "{source}");
        }
    }

    #[test]
    fn test_non_finite_constants() {
        let expr = Parser::parse("x + sqrt(-1)").unwrap().lhs;
        assert_eq!(Polynomial::from_expr(&expr).unwrap_err().kind(), "NoRealRoot");

        let expr = Parser::parse("x / (2 - 2)").unwrap().lhs;
        assert_eq!(
            Polynomial::from_expr(&expr).unwrap_err(),
            EquationError::NoFiniteSolutions("division by zero".to_string())
        );
    }

    #[test]
    fn test_degree_and_trim() {
        assert_eq!(Polynomial::zero().degree(), None);
        assert_eq!(Polynomial::constant(3.0).degree(), Some(0));
        let noisy = Polynomial::from_coeffs(vec![1.0, 2.0, 1e-17]);
        assert_eq!(noisy.degree(), Some(2));
        assert_eq!(noisy.trimmed(1e-12).degree(), Some(1));
    }

    #[test]
    fn test_quadratic_roots() {
        let roots = poly("x^2 - 36").roots();
        assert_eq!(roots, vec![Root::Real(6.0), Root::Real(-6.0)]);

        let roots = poly("x^2 - 2x + 1").roots();
        assert_eq!(roots, vec![Root::Real(1.0)]);

        let roots = poly("x^2 + 1").roots();
        assert_eq!(
            roots,
            vec![Root::Complex { re: 0.0, im: 1.0 }, Root::Complex { re: 0.0, im: -1.0 }]
        );
        assert!(roots.iter().all(|r| r.as_real().is_none()));
    }

    #[test]
    fn test_cubic_real_roots() {
        let roots = poly("(x - 1)(x - 2)(x - 3)").real_roots();
        assert_eq!(roots.len(), 3);
        assert!(close(roots[0], 1.0) && close(roots[1], 2.0) && close(roots[2], 3.0));

        let roots = poly("x^3 - 8").real_roots();
        assert_eq!(roots.len(), 1);
        assert!(close(roots[0], 2.0));
    }

    #[test]
    fn test_repeated_root_at_critical_point() {
        // (x - 1)^2 (x + 2)
        let roots = poly("x^3 - 3x + 2").real_roots();
        assert_eq!(roots.len(), 2);
        assert!(close(roots[0], -2.0));
        assert!(close(roots[1], 1.0));
    }

    #[test]
    fn test_quartic_without_real_roots() {
        assert!(poly("x^4 + 1").roots().is_empty());
        let roots = poly("x^4 - 5x^2 + 4").roots();
        let values: Vec<f64> = roots.iter().map(Root::real_part).collect();
        assert_eq!(values.len(), 4);
        for (got, want) in values.iter().zip([2.0, 1.0, -1.0, -2.0]) {
            assert!(close(*got, want), "{values:?}");
        }
    }

    #[test]
    fn test_evaluate_and_derivative() {
        let p = poly("3x^3 - x + 4");
        assert!(close(p.evaluate(2.0), 26.0));
        assert_eq!(p.derivative(), Polynomial::from_coeffs(vec![-1.0, 0.0, 9.0]));
    }
}
