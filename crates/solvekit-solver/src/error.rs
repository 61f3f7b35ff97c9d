use thiserror::Error;

/// Problems that make an [`LpProblem`](crate::LpProblem) unsolvable before any pivoting happens.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("objective has {found} coefficients but the problem has {expected} variables")]
    ObjectiveLength { expected: usize, found: usize },
    #[error("constraint {name} has {found} coefficients but the problem has {expected} variables")]
    ConstraintLength {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("non-finite value in {0}")]
    NonFinite(String),
}
