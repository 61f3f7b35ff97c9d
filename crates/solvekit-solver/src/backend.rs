//! Backend abstraction so callers never depend on a concrete solver's API.

use crate::error::SolverError;
use crate::problem::LpProblem;
use crate::solution::Solution;

/// A linear programming backend.
///
/// Solving is split in two steps: `build` turns a problem into a backend-specific
/// handle (validating it on the way) and `solve` consumes that handle. A handle
/// is solved at most once.
pub trait LpBackend {
    /// Backend-owned representation of a prepared problem.
    type Handle;

    /// Validate `problem` and prepare it for solving.
    ///
    /// # Errors
    ///
    /// Returns a `SolverError` when the problem is malformed (dimension
    /// mismatch, non-finite data, inverted bounds).
    fn build(&self, problem: &LpProblem) -> Result<Self::Handle, SolverError>;

    /// Run the backend on a prepared handle.
    fn solve(&self, handle: Self::Handle) -> Solution;

    /// Build and solve in one call.
    fn run(&self, problem: &LpProblem) -> Result<Solution, SolverError> {
        let handle = self.build(problem)?;
        Ok(self.solve(handle))
    }
}
