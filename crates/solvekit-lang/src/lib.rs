pub mod adapter;
pub mod compiler;
pub mod equation;
pub mod error;
pub mod expr;
pub mod format;
pub mod lexer;
pub mod model;
pub mod options;
pub mod tools;

pub use adapter::{SolvedModel, SolverAdapter};
pub use compiler::Compiler;
pub use equation::{Root, SolutionSet, solution_set};
pub use error::{EquationError, LpError};
pub use expr::{LinearExpression, Term};
pub use format::ResultFormatter;
pub use lexer::{Lexer, Span, Token, TokenKind};
pub use model::{Bound, Constraint, LpModel, ObjectiveSense, Relation, Variable};
pub use options::{ObjectiveConvention, Options, STRICT_EPSILON};
pub use solvekit_solver::PivotRule;
pub use tools::{
    DEFAULT_EQUATION, solve_equation, solve_lp, solve_lp_result, solve_lp_with,
};
