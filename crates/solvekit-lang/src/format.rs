use crate::adapter::SolvedModel;
use crate::error::LpError;

/// Renders solved models as `obj=<v>; <name>=<v>; ...`.
///
/// Values print in shortest round-trip form unless a precision is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultFormatter {
    precision: Option<usize>,
}

impl ResultFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Significant digits to keep; `None` prints values untouched.
    ///
    /// Rounding can swallow the strict-inequality offset on large values.
    pub fn with_precision(mut self, precision: Option<usize>) -> Self {
        self.precision = precision;
        self
    }

    pub fn format(&self, solved: &SolvedModel) -> String {
        let mut parts = Vec::with_capacity(solved.values.len() + 1);
        parts.push(format!("obj={}", self.number(solved.objective_value)));
        for (name, value) in &solved.values {
            parts.push(format!("{}={}", name, self.number(*value)));
        }
        parts.join("; ")
    }

    pub fn format_error(&self, err: &LpError) -> String {
        format!("Error: {err}")
    }

    pub fn render(&self, result: &Result<SolvedModel, LpError>) -> String {
        match result {
            Ok(solved) => self.format(solved),
            Err(err) => self.format_error(err),
        }
    }

    /// Shortest round-trip form, after rounding when a precision is set.
    pub fn number(&self, value: f64) -> String {
        let rounded = match self.precision {
            Some(digits) if value.is_finite() => round_significant(value, digits),
            _ => value,
        };
        // -0 prints as "-0"
        if rounded == 0.0 {
            return "0".to_string();
        }
        rounded.to_string()
    }
}

fn round_significant(value: f64, digits: usize) -> f64 {
    let digits = digits.max(1);
    format!("{:.*e}", digits - 1, value).parse().unwrap_or(value)
}
