//! MILP adapter over `good_lp`

use std::time::Instant;

use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, constraint,
    variable,
};

#[cfg(feature = "solver-highs")]
use good_lp::solvers::highs::highs as default_solver;
#[cfg(all(not(feature = "solver-highs"), feature = "solver-microlp"))]
use good_lp::solvers::microlp::microlp as default_solver;

use crate::{
    formulation::{Comparison, Formulation, VariableId, VariableKind},
    solvers::{RawSolution, SolverAdapter, SolverError, Termination},
};

/// Adapter for the bundled `good_lp` backends.
///
/// The bundled backends solve to proven optimality before returning, so the
/// reported best bound equals the objective and the gap is zero. Warm-start
/// hints and the time limit are cooperative: `good_lp`'s portable model
/// surface has no setters for either, so this adapter accepts both and
/// enforces neither. A backend-native adapter honouring them can be dropped
/// in behind [`SolverAdapter`].
#[derive(Debug, Default, Clone, Copy)]
pub struct MilpAdapter;

impl SolverAdapter for MilpAdapter {
    fn solve(&self, formulation: &Formulation) -> Result<RawSolution, SolverError> {
        let mut pb = ProblemVariables::new();

        let variables: Vec<Variable> = formulation
            .variables()
            .iter()
            .map(|kind| match kind {
                VariableKind::Binary => pb.add(variable().binary()),
                VariableKind::UnitInterval => pb.add(variable().min(0).max(1)),
                VariableKind::NonNegative => pb.add(variable().min(0)),
            })
            .collect();

        let objective = linear_expression(&variables, formulation.objective())?;

        let mut model = pb.maximise(objective.clone()).using(default_solver);

        for row in formulation.constraints() {
            let lhs = linear_expression(&variables, row.terms())?;

            model = match row.comparison() {
                Comparison::LessOrEqual => model.with(constraint::leq(lhs, row.rhs())),
                Comparison::Equal => model.with(constraint::eq(lhs, row.rhs())),
            };
        }

        let started = Instant::now();

        let solution = match model.solve() {
            Ok(solution) => solution,
            Err(ResolutionError::Infeasible) => return Err(SolverError::Infeasible),
            Err(ResolutionError::Unbounded) => return Err(SolverError::Unbounded),
            Err(other) => return Err(SolverError::Backend(other)),
        };

        let runtime = started.elapsed();

        let values: Vec<f64> = variables
            .iter()
            .map(|&variable| solution.value(variable))
            .collect();

        let objective_value = solution.eval(&objective);

        // Optimality is proven, so the bound is tight and the gap closed.
        Ok(RawSolution::new(
            values,
            objective_value,
            Some(objective_value),
            Some(0.0),
            runtime,
            Termination::Optimal,
        ))
    }
}

fn lookup(variables: &[Variable], id: VariableId) -> Result<Variable, SolverError> {
    variables
        .get(id.index())
        .copied()
        .ok_or(SolverError::InvariantViolation {
            message: "formulation names an undeclared variable",
        })
}

fn linear_expression(
    variables: &[Variable],
    terms: &[(VariableId, f64)],
) -> Result<Expression, SolverError> {
    let mut expression = Expression::default();

    for &(id, coefficient) in terms {
        expression += lookup(variables, id)? * coefficient;
    }

    Ok(expression)
}
