use std::collections::BTreeMap;

use solvekit_solver::{LpBackend, LpProblem, Solver};
use tracing::{debug, warn};

use crate::error::LpError;
use crate::model::{LpModel, ObjectiveSense};
use crate::options::{ObjectiveConvention, Options};

/// Optimal objective value and variable assignment of a compiled model.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedModel {
    pub objective_value: f64,
    /// Keyed by display name; iteration is byte-wise ordered
    pub values: BTreeMap<String, f64>,
}

/// Bridges [`LpModel`] to any [`LpBackend`].
///
/// Every variable becomes a free continuous column and the backend is always
/// asked to maximize.
#[derive(Debug, Clone)]
pub struct SolverAdapter<B: LpBackend = Solver> {
    backend: B,
    convention: ObjectiveConvention,
}

impl SolverAdapter<Solver> {
    /// Simplex backend configured from `options`.
    pub fn from_options(options: &Options) -> Self {
        let backend = Solver::new()
            .with_tolerance(options.tolerance)
            .with_max_iterations(options.max_iterations)
            .with_pivot_rule(options.pivot_rule);
        Self::new(backend, options.convention)
    }
}

impl Default for SolverAdapter<Solver> {
    fn default() -> Self {
        Self::from_options(&Options::default())
    }
}

impl<B: LpBackend> SolverAdapter<B> {
    pub fn new(backend: B, convention: ObjectiveConvention) -> Self {
        Self { backend, convention }
    }

    /// Lower `model` to the solver's dense problem.
    pub fn to_problem(&self, model: &LpModel) -> LpProblem {
        let names = model.creation_order().map(str::to_string).collect();
        let mut problem = LpProblem::new(names);
        problem.set_objective(model.maximization_objective(), false);

        for constraint in &model.constraints {
            problem.add_constraint(
                constraint.clause.clone(),
                model.dense(&constraint.expression),
                constraint.bound.op(),
                constraint.bound.value(),
            );
        }

        problem
    }

    /// Solve `model`; anything short of an optimum is an [`LpError::LpNotOptimal`].
    pub fn solve(&self, model: &LpModel) -> Result<SolvedModel, LpError> {
        let problem = self.to_problem(model);

        let handle = self.backend.build(&problem).map_err(|err| {
            warn!(
                component = "adapter",
                operation = "build",
                status = "error",
                error = %err,
                "Backend rejected problem"
            );
            LpError::LpNotOptimal {
                status: solvekit_solver::SolutionStatus::Error,
            }
        })?;

        let solution = self.backend.solve(handle);
        debug!(
            component = "adapter",
            operation = "solve",
            status = %solution.status,
            iterations = solution.iterations as u64,
            "Backend finished"
        );

        if !solution.status.is_optimal() {
            return Err(LpError::LpNotOptimal {
                status: solution.status,
            });
        }

        let objective_value = match (self.convention, model.sense) {
            (ObjectiveConvention::Restore, ObjectiveSense::Minimize) => -solution.objective_value,
            _ => solution.objective_value,
        };

        let values = model
            .variables()
            .iter()
            .map(|v| (v.name.clone(), solution.values.get(v.index).copied().unwrap_or(0.0)))
            .collect();

        Ok(SolvedModel {
            objective_value,
            values,
        })
    }
}
