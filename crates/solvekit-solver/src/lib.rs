mod backend;
mod error;
mod problem;
mod simplex;
mod solution;

pub use backend::LpBackend;
pub use error::SolverError;
pub use problem::{Constraint, ConstraintOp, LpProblem, Objective};
pub use simplex::{PivotRule, Solver, Tableau};
pub use solution::{Solution, SolutionStatus};
