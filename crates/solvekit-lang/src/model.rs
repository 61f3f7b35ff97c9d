use std::collections::HashMap;

use solvekit_solver::ConstraintOp;
use tracing::debug;

use crate::expr::LinearExpression;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveSense {
    Maximize,
    Minimize,
}

impl ObjectiveSense {
    /// Case-insensitive prefix match on `max` / `min`.
    pub fn from_keyword(word: &str) -> Option<Self> {
        let lower = word.to_ascii_lowercase();
        if lower.starts_with("max") {
            Some(ObjectiveSense::Maximize)
        } else if lower.starts_with("min") {
            Some(ObjectiveSense::Minimize)
        } else {
            None
        }
    }
}

/// Relational operator as written in a constraint clause
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Le,
    Ge,
    Lt,
    Gt,
    Eq,
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Relation::Le => write!(f, "<="),
            Relation::Ge => write!(f, ">="),
            Relation::Lt => write!(f, "<"),
            Relation::Gt => write!(f, ">"),
            Relation::Eq => write!(f, "="),
        }
    }
}

/// The feasible range one constraint imposes on its expression
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Upper(f64),
    Lower(f64),
    Equal(f64),
}

impl Bound {
    /// Strict relations are tightened by `epsilon`.
    pub fn from_relation(relation: Relation, rhs: f64, epsilon: f64) -> Self {
        match relation {
            Relation::Le => Bound::Upper(rhs),
            Relation::Ge => Bound::Lower(rhs),
            Relation::Lt => Bound::Upper(rhs - epsilon),
            Relation::Gt => Bound::Lower(rhs + epsilon),
            Relation::Eq => Bound::Equal(rhs),
        }
    }

    pub fn op(&self) -> ConstraintOp {
        match self {
            Bound::Upper(_) => ConstraintOp::Le,
            Bound::Lower(_) => ConstraintOp::Ge,
            Bound::Equal(_) => ConstraintOp::Eq,
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            Bound::Upper(v) | Bound::Lower(v) | Bound::Equal(v) => v,
        }
    }

    /// `(lower, upper)` with infinities for the open side.
    pub fn range(&self) -> (f64, f64) {
        match *self {
            Bound::Upper(v) => (f64::NEG_INFINITY, v),
            Bound::Lower(v) => (v, f64::INFINITY),
            Bound::Equal(v) => (v, v),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Spelling of the first occurrence
    pub name: String,
    /// Solver column
    pub index: usize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Source clause, for diagnostics
    pub clause: String,
    pub expression: LinearExpression,
    pub bound: Bound,
}

/// A compiled LP: variables, objective and ordered constraints.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct LpModel {
    /// Variables in creation order
    variables: Vec<Variable>,
    /// Lowercased name -> position in `variables`
    lookup: HashMap<String, usize>,
    pub sense: ObjectiveSense,
    pub objective: LinearExpression,
    pub constraints: Vec<Constraint>,
}

impl LpModel {
    pub fn new(sense: ObjectiveSense) -> Self {
        Self {
            variables: Vec::new(),
            lookup: HashMap::new(),
            sense,
            objective: LinearExpression::new(),
            constraints: Vec::new(),
        }
    }

    /// Return the column for `name`, creating the variable on first sight.
    pub fn register(&mut self, name: &str) -> usize {
        let key = name.to_ascii_lowercase();
        if let Some(&index) = self.lookup.get(&key) {
            return index;
        }

        let index = self.variables.len();
        self.variables.push(Variable {
            name: name.to_string(),
            index,
        });
        self.lookup.insert(key, index);
        debug!(
            component = "compiler",
            operation = "register_variable",
            status = "success",
            variable = name,
            index = index as u64,
            "Created variable"
        );
        index
    }

    pub fn set_objective(&mut self, objective: LinearExpression) {
        self.register_all(&objective);
        self.objective = objective;
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.register_all(&constraint.expression);
        self.constraints.push(constraint);
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.lookup
            .get(&name.to_ascii_lowercase())
            .map(|&i| &self.variables[i])
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Variable names in the order they were created
    pub fn creation_order(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(|v| v.name.as_str())
    }

    /// Dense coefficient row for `expr` over the model's columns.
    ///
    /// Every variable in `expr` must already be registered; unknown names are skipped.
    pub fn dense(&self, expr: &LinearExpression) -> Vec<f64> {
        let mut row = vec![0.0; self.variables.len()];
        for term in expr.terms() {
            if let Some(v) = self.variable(&term.name) {
                row[v.index] += term.coefficient;
            }
        }
        row
    }

    /// Objective coefficients for a maximizing solver: negated when minimizing.
    pub fn maximization_objective(&self) -> Vec<f64> {
        match self.sense {
            ObjectiveSense::Maximize => self.dense(&self.objective),
            ObjectiveSense::Minimize => self.dense(&self.objective.negated()),
        }
    }

    fn register_all(&mut self, expr: &LinearExpression) {
        for term in expr.terms() {
            self.register(&term.name);
        }
    }
}
