use tracing::{debug, trace, warn};

use crate::backend::LpBackend;
use crate::error::SolverError;
use crate::problem::{ConstraintOp, LpProblem};
use crate::solution::{Solution, SolutionStatus};

/// Rule for choosing the entering column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PivotRule {
    /// Most positive reduced cost
    Dantzig,
    /// Lowest eligible index; cannot cycle on degenerate vertices
    #[default]
    Bland,
}

/// Simplex solver for linear programming problems
#[derive(Debug, Clone)]
pub struct Solver {
    /// Maximum pivots (both phases) before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
    pivot_rule: PivotRule,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
            pivot_rule: PivotRule::default(),
        }
    }
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_pivot_rule(mut self, rule: PivotRule) -> Self {
        self.pivot_rule = rule;
        self
    }

    /// Solve the LP problem using the two-phase simplex method
    ///
    /// Malformed problems come back with [`SolutionStatus::Error`]; use
    /// [`LpBackend::build`] to see why.
    pub fn solve(&self, problem: &LpProblem) -> Solution {
        match LpBackend::run(self, problem) {
            Ok(solution) => solution,
            Err(err) => {
                warn!(
                    component = "solver",
                    operation = "validate",
                    status = "error",
                    error = %err,
                    "Rejected malformed problem"
                );
                Solution::error()
            }
        }
    }

    fn optimize(&self, tableau: &mut Tableau) -> Solution {
        // Phase 1: Find initial basic feasible solution
        if tableau.n_artificial > 0 {
            match self.phase1(tableau) {
                PhaseResult::Done => {}
                PhaseResult::Unbounded | PhaseResult::Infeasible => {
                    return Solution::infeasible(tableau.iterations);
                }
                PhaseResult::IterationLimit => return Solution::iteration_limit(tableau.iterations),
            }
        }

        // Phase 2: Optimize, never letting an artificial re-enter
        let exclude_from = tableau.n_struct + tableau.n_slack;
        match self.iterate(tableau, exclude_from) {
            PhaseResult::Done => {}
            PhaseResult::Unbounded => return Solution::unbounded(tableau.iterations),
            PhaseResult::Infeasible => return Solution::infeasible(tableau.iterations),
            PhaseResult::IterationLimit => return Solution::iteration_limit(tableau.iterations),
        }

        self.extract_solution(tableau)
    }

    fn build_tableau(&self, problem: &LpProblem) -> Tableau {
        // Each free variable becomes the difference of two non-negative columns
        let columns: Vec<Column> = (0..problem.num_variables())
            .map(|j| Column {
                pos: 2 * j,
                neg: 2 * j + 1,
            })
            .collect();
        let n_struct = 2 * columns.len();

        let mut rows: Vec<Row> = problem
            .constraints
            .iter()
            .map(|c| {
                let mut coefficients = vec![0.0; n_struct];
                for (column, &coef) in columns.iter().zip(&c.coefficients) {
                    column.substitute(coef, &mut coefficients);
                }
                Row {
                    coefficients,
                    op: c.op,
                    rhs: c.rhs,
                }
            })
            .collect();

        // RHS must be non-negative for the initial basis
        for row in &mut rows {
            if row.rhs < 0.0 {
                row.rhs = -row.rhs;
                row.op = row.op.flipped();
                for v in &mut row.coefficients {
                    *v = -*v;
                }
            }
        }

        // Count slack and artificial variables needed
        let mut n_slack = 0;
        let mut n_artificial = 0;
        for row in &rows {
            match row.op {
                ConstraintOp::Le => n_slack += 1,
                ConstraintOp::Ge => {
                    n_slack += 1; // surplus
                    n_artificial += 1;
                }
                ConstraintOp::Eq => n_artificial += 1,
            }
        }

        let n_rows = rows.len();
        let total_cols = n_struct + n_slack + n_artificial + 1; // +1 for RHS
        let rhs_col = total_cols - 1;

        let mut data = vec![vec![0.0; total_cols]; n_rows + 1];
        let mut basic_vars = vec![0; n_rows];
        let mut slack_idx = n_struct;
        let mut artificial_idx = n_struct + n_slack;
        let mut rhs_scale: f64 = 0.0;

        for (i, row) in rows.iter().enumerate() {
            data[i][..n_struct].copy_from_slice(&row.coefficients);
            data[i][rhs_col] = row.rhs;
            rhs_scale = rhs_scale.max(row.rhs);

            match row.op {
                ConstraintOp::Le => {
                    data[i][slack_idx] = 1.0;
                    basic_vars[i] = slack_idx;
                    slack_idx += 1;
                }
                ConstraintOp::Ge => {
                    data[i][slack_idx] = -1.0; // surplus
                    slack_idx += 1;
                    data[i][artificial_idx] = 1.0;
                    basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
                ConstraintOp::Eq => {
                    data[i][artificial_idx] = 1.0;
                    basic_vars[i] = artificial_idx;
                    artificial_idx += 1;
                }
            }
        }

        // Objective row (last row). Simplex maximizes, so a minimization
        // stores the negated coefficients.
        let mut objective_row = vec![0.0; n_struct];
        for (j, &coef) in problem.objective.coefficients.iter().enumerate() {
            let c = if problem.objective.minimize { -coef } else { coef };
            columns[j].substitute(c, &mut objective_row);
        }
        data[n_rows][..n_struct].copy_from_slice(&objective_row);

        debug!(
            component = "solver",
            operation = "build",
            status = "success",
            variables = problem.num_variables() as u64,
            constraints = problem.num_constraints() as u64,
            columns = total_cols as u64,
            artificials = n_artificial as u64,
            "Built simplex tableau"
        );

        Tableau {
            data,
            basic_vars,
            n_struct,
            n_slack,
            n_artificial,
            columns,
            objective: problem.objective.coefficients.clone(),
            rhs_scale,
            iterations: 0,
        }
    }

    fn phase1(&self, tableau: &mut Tableau) -> PhaseResult {
        // Auxiliary objective: maximize -sum(artificials)
        let n_constraints = tableau.data.len() - 1;
        let n_cols = tableau.data[0].len();
        let art_start = tableau.n_struct + tableau.n_slack;

        let orig_obj = std::mem::replace(&mut tableau.data[n_constraints], vec![0.0; n_cols]);
        for j in art_start..(art_start + tableau.n_artificial) {
            tableau.data[n_constraints][j] = -1.0;
        }

        // Make objective row consistent with basic artificial variables
        for i in 0..n_constraints {
            if tableau.basic_vars[i] >= art_start {
                for j in 0..n_cols {
                    tableau.data[n_constraints][j] += tableau.data[i][j];
                }
            }
        }

        match self.iterate(tableau, n_cols - 1) {
            PhaseResult::Done => {}
            // Unbounded in phase 1 means infeasible original
            PhaseResult::Unbounded | PhaseResult::Infeasible => return PhaseResult::Infeasible,
            PhaseResult::IterationLimit => return PhaseResult::IterationLimit,
        }

        // Check if all artificials are zero
        let rhs_col = n_cols - 1;
        let feasibility_tol = self.tolerance * (1.0 + tableau.rhs_scale);
        for i in 0..n_constraints {
            if tableau.basic_vars[i] >= art_start && tableau.data[i][rhs_col] > feasibility_tol {
                return PhaseResult::Infeasible;
            }
        }

        self.drive_out_artificials(tableau, art_start);

        // Restore original objective and adjust for basic variables
        tableau.data[n_constraints] = orig_obj;
        for i in 0..n_constraints {
            let basic = tableau.basic_vars[i];
            let ratio = tableau.data[n_constraints][basic];
            if ratio.abs() > self.tolerance {
                for j in 0..n_cols {
                    tableau.data[n_constraints][j] -= ratio * tableau.data[i][j];
                }
            }
        }

        PhaseResult::Done
    }

    /// Replace zero-level artificials still in the basis by real columns.
    /// Rows with no real entry are redundant and keep their artificial.
    fn drive_out_artificials(&self, tableau: &mut Tableau, art_start: usize) {
        let n_constraints = tableau.data.len() - 1;
        for i in 0..n_constraints {
            if tableau.basic_vars[i] < art_start {
                continue;
            }
            let replacement = (0..art_start).find(|&j| tableau.data[i][j].abs() > self.tolerance);
            if let Some(col) = replacement {
                self.pivot(tableau, i, col);
            } else {
                trace!(component = "solver", row = i as u64, "Redundant constraint row");
            }
        }
    }

    /// Pivot until no column below `limit` improves the objective.
    fn iterate(&self, tableau: &mut Tableau, limit: usize) -> PhaseResult {
        loop {
            let Some(pivot_col) = self.find_pivot_column(tableau, limit) else {
                return PhaseResult::Done;
            };
            if tableau.iterations >= self.max_iterations {
                return PhaseResult::IterationLimit;
            }
            let Some(pivot_row) = self.find_pivot_row(tableau, pivot_col) else {
                return PhaseResult::Unbounded;
            };
            self.pivot(tableau, pivot_row, pivot_col);
            tableau.iterations += 1;
        }
    }

    fn find_pivot_column(&self, tableau: &Tableau, limit: usize) -> Option<usize> {
        let obj_row = &tableau.data[tableau.data.len() - 1];

        match self.pivot_rule {
            PivotRule::Bland => (0..limit).find(|&j| obj_row[j] > self.tolerance),
            PivotRule::Dantzig => {
                let mut max_val = self.tolerance;
                let mut max_col = None;
                for (j, &value) in obj_row.iter().enumerate().take(limit) {
                    if value > max_val {
                        max_val = value;
                        max_col = Some(j);
                    }
                }
                max_col
            }
        }
    }

    fn find_pivot_row(&self, tableau: &Tableau, col: usize) -> Option<usize> {
        let n_constraints = tableau.data.len() - 1;
        let rhs_col = tableau.data[0].len() - 1;

        let mut min_ratio = f64::INFINITY;
        let mut min_row: Option<usize> = None;

        for i in 0..n_constraints {
            let val = tableau.data[i][col];
            if val <= self.tolerance {
                continue;
            }
            let ratio = tableau.data[i][rhs_col].max(0.0) / val;
            let better = match min_row {
                None => true,
                Some(current) => {
                    if (ratio - min_ratio).abs() <= self.tolerance {
                        self.pivot_rule == PivotRule::Bland
                            && tableau.basic_vars[i] < tableau.basic_vars[current]
                    } else {
                        ratio < min_ratio
                    }
                }
            };
            if better {
                min_ratio = ratio;
                min_row = Some(i);
            }
        }

        min_row
    }

    fn pivot(&self, tableau: &mut Tableau, row: usize, col: usize) {
        let n_rows = tableau.data.len();
        let n_cols = tableau.data[0].len();

        trace!(
            component = "solver",
            operation = "pivot",
            row = row as u64,
            col = col as u64,
            leaving = tableau.basic_vars[row] as u64,
        );

        tableau.basic_vars[row] = col;

        // Scale pivot row
        let pivot_val = tableau.data[row][col];
        for j in 0..n_cols {
            tableau.data[row][j] /= pivot_val;
        }

        // Eliminate column in other rows
        let pivot_row = tableau.data[row].clone();
        for i in 0..n_rows {
            if i == row {
                continue;
            }
            let factor = tableau.data[i][col];
            if factor == 0.0 {
                continue;
            }
            for j in 0..n_cols {
                tableau.data[i][j] -= factor * pivot_row[j];
            }
        }
    }

    fn extract_solution(&self, tableau: &Tableau) -> Solution {
        let n_constraints = tableau.data.len() - 1;
        let rhs_col = tableau.data[0].len() - 1;

        let mut structural = vec![0.0; tableau.n_struct];
        for i in 0..n_constraints {
            let basic = tableau.basic_vars[i];
            if basic < tableau.n_struct {
                structural[basic] = tableau.data[i][rhs_col];
            }
        }

        let values: Vec<f64> = tableau
            .columns
            .iter()
            .map(|column| column.recover(&structural))
            .collect();

        let objective_value = tableau
            .objective
            .iter()
            .zip(&values)
            .map(|(c, x)| c * x)
            .sum();

        debug!(
            component = "solver",
            operation = "solve",
            status = SolutionStatus::Optimal.as_str(),
            iterations = tableau.iterations as u64,
            objective = objective_value,
            "Simplex finished"
        );

        Solution {
            status: SolutionStatus::Optimal,
            values,
            objective_value,
            iterations: tableau.iterations,
        }
    }
}

impl LpBackend for Solver {
    type Handle = Tableau;

    fn build(&self, problem: &LpProblem) -> Result<Tableau, SolverError> {
        problem.validate()?;
        Ok(self.build_tableau(problem))
    }

    fn solve(&self, mut handle: Tableau) -> Solution {
        let solution = self.optimize(&mut handle);
        if !solution.status.is_optimal() {
            debug!(
                component = "solver",
                operation = "solve",
                status = solution.status.as_str(),
                iterations = solution.iterations as u64,
                "Simplex finished without an optimum"
            );
        }
        solution
    }
}

/// A problem in standard form, ready for the simplex phases.
#[derive(Debug, Clone)]
pub struct Tableau {
    data: Vec<Vec<f64>>,
    basic_vars: Vec<usize>,
    n_struct: usize,
    n_slack: usize,
    n_artificial: usize,
    columns: Vec<Column>,
    objective: Vec<f64>,
    rhs_scale: f64,
    iterations: usize,
}

/// A free variable expressed as `x = x⁺ - x⁻` over two non-negative columns.
#[derive(Debug, Clone, Copy)]
struct Column {
    pos: usize,
    neg: usize,
}

impl Column {
    /// Add `coef * x` to a standard-form row.
    fn substitute(self, coef: f64, row: &mut [f64]) {
        row[self.pos] += coef;
        row[self.neg] -= coef;
    }

    fn recover(self, structural: &[f64]) -> f64 {
        structural[self.pos] - structural[self.neg]
    }
}

struct Row {
    coefficients: Vec<f64>,
    op: ConstraintOp,
    rhs: f64,
}

enum PhaseResult {
    Done,
    Unbounded,
    Infeasible,
    IterationLimit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::LpProblem;

    /// Variables are free, so non-negativity is spelled out as rows.
    fn non_negative(names: &[&str]) -> LpProblem {
        let mut problem = LpProblem::new(names.iter().map(|s| s.to_string()).collect());
        for j in 0..names.len() {
            let mut row = vec![0.0; names.len()];
            row[j] = 1.0;
            problem.add_constraint(format!("{}_min", names[j]), row, ConstraintOp::Ge, 0.0);
        }
        problem
    }

    #[test]
    fn test_simple_maximization() {
        // Maximize: 3x + 2y
        // Subject to:
        //   x + y <= 4
        //   x <= 3
        //   y <= 3
        //   x, y >= 0
        // Optimal: x=3, y=1, obj=11
        let mut problem = non_negative(&["x", "y"]);
        problem.set_objective(vec![3.0, 2.0], false);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Le, 4.0);
        problem.add_constraint("x_max", vec![1.0, 0.0], ConstraintOp::Le, 3.0);
        problem.add_constraint("y_max", vec![0.0, 1.0], ConstraintOp::Le, 3.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.values[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", solution.values[0]);
        assert!((solution.values[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", solution.values[1]);
        assert!(
            (solution.objective_value - 11.0).abs() < 1e-6,
            "obj = {} (expected 11)",
            solution.objective_value
        );
    }

    #[test]
    fn test_minimization_with_ge() {
        // Minimize: 2x + 3y
        // Subject to:
        //   x + y >= 4
        //   x <= 3
        //   y <= 3
        //   x, y >= 0
        // Optimal: x=3, y=1, obj=9
        let mut problem = non_negative(&["x", "y"]);
        problem.set_objective(vec![2.0, 3.0], true);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Ge, 4.0);
        problem.add_constraint("x_max", vec![1.0, 0.0], ConstraintOp::Le, 3.0);
        problem.add_constraint("y_max", vec![0.0, 1.0], ConstraintOp::Le, 3.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.values[0] - 3.0).abs() < 1e-6, "x = {} (expected 3)", solution.values[0]);
        assert!((solution.values[1] - 1.0).abs() < 1e-6, "y = {} (expected 1)", solution.values[1]);
        assert!(
            (solution.objective_value - 9.0).abs() < 1e-6,
            "obj = {} (expected 9)",
            solution.objective_value
        );
    }

    #[test]
    fn test_infeasible() {
        // x >= 5
        // x <= 3
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.set_objective(vec![1.0], true);
        problem.add_constraint("lower", vec![1.0], ConstraintOp::Ge, 5.0);
        problem.add_constraint("upper", vec![1.0], ConstraintOp::Le, 3.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Infeasible);
        assert!(solution.values.is_empty());
    }

    #[test]
    fn test_free_variable_reaches_negative_optimum() {
        // Minimize x subject to x >= -5, x free
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.set_objective(vec![1.0], true);
        problem.add_constraint("floor", vec![1.0], ConstraintOp::Ge, -5.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.values[0] + 5.0).abs() < 1e-9, "x = {}", solution.values[0]);
        assert!((solution.objective_value + 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_free_variable_unbounded() {
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.set_objective(vec![1.0], false);
        problem.add_constraint("floor", vec![1.0], ConstraintOp::Ge, 0.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Unbounded);
    }

    #[test]
    fn test_no_constraints_zero_objective() {
        let problem = LpProblem::new(vec!["x".to_string()]);
        let solution = Solver::new().solve(&problem);
        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert_eq!(solution.values, vec![0.0]);
    }

    #[test]
    fn test_equalities_with_negative_rhs() {
        // x + y = -2, x - y = 0  =>  x = y = -1
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Eq, -2.0);
        problem.add_constraint("diff", vec![1.0, -1.0], ConstraintOp::Eq, 0.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.values[0] + 1.0).abs() < 1e-9);
        assert!((solution.values[1] + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_redundant_equality() {
        let mut problem = non_negative(&["x", "y"]);
        problem.set_objective(vec![1.0, 0.0], false);
        problem.add_constraint("a", vec![1.0, 1.0], ConstraintOp::Eq, 2.0);
        problem.add_constraint("b", vec![1.0, 1.0], ConstraintOp::Eq, 2.0);

        let solution = Solver::new().solve(&problem);

        assert_eq!(solution.status, SolutionStatus::Optimal);
        assert!((solution.values[0] - 2.0).abs() < 1e-9);
        assert!(solution.values[1].abs() < 1e-9);
    }

    #[test]
    fn test_both_pivot_rules_agree() {
        // Maximize 5a + 3b with 8 <= a <= 20, 3 <= b <= 30, a + b <= 40
        for rule in [PivotRule::Bland, PivotRule::Dantzig] {
            let mut problem = LpProblem::new(vec!["a".to_string(), "b".to_string()]);
            problem.set_objective(vec![5.0, 3.0], false);
            problem.add_constraint("a_min", vec![1.0, 0.0], ConstraintOp::Ge, 8.0);
            problem.add_constraint("a_max", vec![1.0, 0.0], ConstraintOp::Le, 20.0);
            problem.add_constraint("b_min", vec![0.0, 1.0], ConstraintOp::Ge, 3.0);
            problem.add_constraint("b_max", vec![0.0, 1.0], ConstraintOp::Le, 30.0);
            problem.add_constraint("budget", vec![1.0, 1.0], ConstraintOp::Le, 40.0);

            let solution = Solver::new().with_pivot_rule(rule).solve(&problem);

            assert_eq!(solution.status, SolutionStatus::Optimal, "{:?}", rule);
            assert!(
                (solution.objective_value - 160.0).abs() < 1e-9,
                "{:?}: {}",
                rule,
                solution.objective_value
            );
            assert!((solution.values[0] - 20.0).abs() < 1e-9);
            assert!((solution.values[1] - 20.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_iteration_limit() {
        let mut problem = non_negative(&["x", "y"]);
        problem.set_objective(vec![3.0, 2.0], false);
        problem.add_constraint("sum", vec![1.0, 1.0], ConstraintOp::Le, 4.0);

        let solution = Solver::new().with_max_iterations(0).solve(&problem);

        assert_eq!(solution.status, SolutionStatus::IterationLimit);
    }

    #[test]
    fn test_build_rejects_malformed_problem() {
        let mut problem = LpProblem::new(vec!["x".to_string()]);
        problem.set_objective(vec![1.0, 2.0], false);

        let solver = Solver::new();
        assert!(matches!(
            solver.build(&problem),
            Err(SolverError::ObjectiveLength { expected: 1, found: 2 })
        ));
        assert_eq!(solver.solve(&problem).status, SolutionStatus::Error);
    }
}
