use solvekit_solver::SolutionStatus;
use thiserror::Error;

/// Failures of the LP tool. These are rendered as `Error: ...` strings, never raised.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LpError {
    #[error("missing objective: expected Maximize or Minimize at the start of '{clause}'")]
    MissingObjective { clause: String },
    #[error("malformed objective '{clause}': {reason}")]
    MalformedObjective { clause: String, reason: String },
    #[error("malformed constraint '{clause}': {reason}")]
    MalformedConstraint { clause: String, reason: String },
    /// Variables are created on first use, so nothing produces this today.
    #[error("unknown variable: {0}")]
    UnknownVariableReference(String),
    #[error("LP not optimal: solver status is {status}")]
    LpNotOptimal { status: SolutionStatus },
    #[error("invalid number '{literal}' in '{clause}'")]
    NumericParseFailure { literal: String, clause: String },
}

impl LpError {
    /// Stable name of the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            LpError::MissingObjective { .. } => "MissingObjective",
            LpError::MalformedObjective { .. } => "MalformedObjective",
            LpError::MalformedConstraint { .. } => "MalformedConstraint",
            LpError::UnknownVariableReference(_) => "UnknownVariableReference",
            LpError::LpNotOptimal { .. } => "LPNotOptimal",
            LpError::NumericParseFailure { .. } => "NumericParseFailure",
        }
    }
}

/// Failures of the equation tool. These propagate to the caller as faults.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EquationError {
    #[error("cannot parse equation: {0}")]
    Parse(String),
    #[error("solution set is not finite: {0}")]
    NoFiniteSolutions(String),
    #[error("no finite real root: {0}")]
    NoRealRoot(String),
}

impl EquationError {
    /// Stable name of the error category.
    pub fn kind(&self) -> &'static str {
        match self {
            EquationError::Parse(_) => "Parse",
            EquationError::NoFiniteSolutions(_) => "NoFiniteSolutions",
            EquationError::NoRealRoot(_) => "NoRealRoot",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_clause() {
        let err = LpError::MalformedConstraint {
            clause: "A + B".to_string(),
            reason: "no relational operator".to_string(),
        };
        assert_eq!(err.to_string(), "malformed constraint 'A + B': no relational operator");
        assert_eq!(err.kind(), "MalformedConstraint");
    }

    #[test]
    fn test_not_optimal_mentions_status() {
        let err = LpError::LpNotOptimal {
            status: SolutionStatus::Infeasible,
        };
        assert_eq!(err.to_string(), "LP not optimal: solver status is infeasible");
        assert_eq!(err.kind(), "LPNotOptimal");
    }

    #[test]
    fn test_equation_kinds() {
        assert_eq!(EquationError::NoRealRoot(String::new()).kind(), "NoRealRoot");
        assert_eq!(EquationError::NoFiniteSolutions(String::new()).kind(), "NoFiniteSolutions");
        assert_eq!(EquationError::Parse(String::new()).kind(), "Parse");
    }
}
