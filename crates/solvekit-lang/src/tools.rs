//! The two callable tools: `solve_equation` and `solve_lp`.

use tracing::{info, warn};

use crate::adapter::{SolvedModel, SolverAdapter};
use crate::compiler::Compiler;
use crate::error::{EquationError, LpError};
use crate::format::ResultFormatter;
use crate::options::Options;

/// Equation solved when the caller does not supply one
pub const DEFAULT_EQUATION: &str = "x^2 + 7 = 43";

/// Solve an equation in `x` for its first real root.
///
/// Failures are returned to the caller as faults.
pub fn solve_equation(equation: &str) -> Result<f64, EquationError> {
    let result = crate::equation::solve_equation(equation);
    match &result {
        Ok(root) => info!(
            component = "tools",
            operation = "solve_equation",
            status = "success",
            equation,
            root = *root,
            "Solved equation"
        ),
        Err(err) => warn!(
            component = "tools",
            operation = "solve_equation",
            status = "error",
            equation,
            kind = err.kind(),
            error = %err,
            "Equation has no usable root"
        ),
    }
    result
}

/// Solve an LP in compact notation with default options.
///
/// Always returns a line: `obj=...; name=...` on success, `Error: ...` otherwise.
pub fn solve_lp(problem: &str) -> String {
    solve_lp_with(problem, &Options::default())
}

pub fn solve_lp_with(problem: &str, options: &Options) -> String {
    let result = solve_lp_result(problem, options);
    ResultFormatter::new()
        .with_precision(options.precision)
        .render(&result)
}

/// Compile and solve without rendering.
pub fn solve_lp_result(problem: &str, options: &Options) -> Result<SolvedModel, LpError> {
    let result = Compiler::new()
        .with_epsilon(options.epsilon)
        .compile(problem)
        .and_then(|model| SolverAdapter::from_options(options).solve(&model));

    match &result {
        Ok(solved) => info!(
            component = "tools",
            operation = "solve_lp",
            status = "success",
            objective = solved.objective_value,
            variables = solved.values.len() as u64,
            "Solved LP"
        ),
        Err(err) => warn!(
            component = "tools",
            operation = "solve_lp",
            status = "error",
            kind = err.kind(),
            error = %err,
            "LP failed"
        ),
    }
    result
}
