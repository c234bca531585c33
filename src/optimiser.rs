//! Assortment optimisation entry points

use thiserror::Error;

use crate::{
    formulation::{self, FormulationError},
    problem::{AssortmentProblem, SolveOptions},
    solution::AssortmentSolution,
    solvers::{SolverAdapter, SolverError, milp::MilpAdapter},
};

/// Errors that can occur during a full optimisation run.
#[derive(Debug, Error)]
pub enum OptimiseError {
    /// Wrapped validation or formulation error.
    #[error(transparent)]
    Formulation(#[from] FormulationError),

    /// Wrapped solver error.
    #[error(transparent)]
    Solver(#[from] SolverError),
}

/// Finds the revenue-maximising assortment using the bundled MILP backend.
///
/// Validates the inputs, builds the first-choice formulation, solves it in
/// one blocking call and maps the result back into domain terms.
///
/// # Errors
///
/// Returns an [`OptimiseError`]: validation failures before any model is
/// built, or solver failures (infeasible, unbounded, backend-internal)
/// after the blocking solve.
pub fn optimise(
    problem: &AssortmentProblem,
    options: &SolveOptions,
) -> Result<AssortmentSolution, OptimiseError> {
    optimise_with(&MilpAdapter, problem, options)
}

/// Same as [`optimise`], but with a caller-supplied solver backend.
///
/// # Errors
///
/// Returns an [`OptimiseError`]; see [`optimise`].
pub fn optimise_with(
    adapter: &impl SolverAdapter,
    problem: &AssortmentProblem,
    options: &SolveOptions,
) -> Result<AssortmentSolution, OptimiseError> {
    let (formulation, layout) = formulation::build(problem, options)?;

    let raw = adapter.solve(&formulation)?;

    Ok(AssortmentSolution::extract(
        &raw,
        &layout,
        options.relaxation,
    )?)
}
