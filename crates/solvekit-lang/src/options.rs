//! Per-call configuration for the LP tool.

use solvekit_solver::PivotRule;

/// Offset used to turn `<` and `>` into non-strict bounds.
pub const STRICT_EPSILON: f64 = 1e-8;

/// How the objective value of a `Minimize` problem is reported.
///
/// Minimization is always compiled as maximizing the negated objective.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectiveConvention {
    /// Negate the solver's value back to the sense the caller asked for.
    #[default]
    Restore,
    /// Report the solver's maximized value unchanged (sign flipped for `Minimize`).
    Raw,
}

/// Options for compiling, solving and formatting one LP call.
#[derive(Debug, Clone)]
pub struct Options {
    /// Offset for strict inequalities.
    pub epsilon: f64,
    /// Sign convention for minimization objectives.
    pub convention: ObjectiveConvention,
    /// Significant digits for output. `None` (the default) prints the
    /// shortest round-trip form of each `f64`.
    pub precision: Option<usize>,
    /// Simplex pivot tolerance.
    pub tolerance: f64,
    /// Simplex pivot budget.
    pub max_iterations: usize,
    /// Entering-column rule for the simplex backend.
    pub pivot_rule: PivotRule,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            epsilon: STRICT_EPSILON,
            convention: ObjectiveConvention::default(),
            precision: None,
            tolerance: 1e-9,
            max_iterations: 10000,
            pivot_rule: PivotRule::default(),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_convention(mut self, convention: ObjectiveConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn with_precision(mut self, precision: Option<usize>) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_pivot_rule(mut self, rule: PivotRule) -> Self {
        self.pivot_rule = rule;
        self
    }
}
