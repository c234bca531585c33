//! Solver adapters
//!
//! The MILP/LP engine is an external collaborator. The crate builds a
//! [`Formulation`] and hands it, once, to a [`SolverAdapter`]; the adapter
//! returns a [`RawSolution`] carrying the primal values and the solve
//! diagnostics (objective, best bound, gap, runtime, termination). Any
//! backend satisfying the trait can be substituted.

use std::time::Duration;

use good_lp::ResolutionError;
use serde::Serialize;
use thiserror::Error;

use crate::formulation::{Formulation, VariableId};

pub mod milp;

/// Solver Errors
#[derive(Debug, Error)]
pub enum SolverError {
    /// The formulation admits no feasible assortment (for example,
    /// contradictory side constraints). No partial result is available.
    #[error("formulation is infeasible")]
    Infeasible,

    /// The formulation is unbounded; with `[0, 1]`-bounded assortment
    /// variables this indicates a modelling bug.
    #[error("formulation is unbounded")]
    Unbounded,

    /// Wrapped backend failure, propagated verbatim.
    #[error(transparent)]
    Backend(#[from] ResolutionError),

    /// Internal solver invariant was violated (this is a bug).
    #[error("solver invariant violated: {message}")]
    InvariantViolation {
        /// What invariant was violated
        message: &'static str,
    },
}

/// How a solve terminated.
///
/// Stopping at the time limit is not an error: the backend returns its best
/// incumbent, with a gap still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Termination {
    /// The backend proved optimality.
    Optimal,

    /// The backend hit the time limit and returned its incumbent.
    TimeLimit,
}

/// Raw output of one backend solve.
#[derive(Debug, Clone)]
pub struct RawSolution {
    values: Vec<f64>,
    objective: f64,
    best_bound: Option<f64>,
    gap: Option<f64>,
    runtime: Duration,
    termination: Termination,
}

impl RawSolution {
    /// Creates a raw solution; `values` is indexed by variable declaration
    /// order.
    pub fn new(
        values: Vec<f64>,
        objective: f64,
        best_bound: Option<f64>,
        gap: Option<f64>,
        runtime: Duration,
        termination: Termination,
    ) -> Self {
        Self {
            values,
            objective,
            best_bound,
            gap,
            runtime,
            termination,
        }
    }

    /// Primal value of one declared variable.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::InvariantViolation`] if the backend reported no
    /// value for the variable.
    pub fn value(&self, variable: VariableId) -> Result<f64, SolverError> {
        self.values
            .get(variable.index())
            .copied()
            .ok_or(SolverError::InvariantViolation {
                message: "solution is missing a value for a declared variable",
            })
    }

    /// Objective value of the returned solution.
    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// Best proven bound on the objective, if the backend reports one.
    pub fn best_bound(&self) -> Option<f64> {
        self.best_bound
    }

    /// Relative gap between incumbent and bound, if the backend reports one.
    pub fn gap(&self) -> Option<f64> {
        self.gap
    }

    /// Wall-clock time spent in the blocking solve.
    pub fn runtime(&self) -> Duration {
        self.runtime
    }

    /// How the solve terminated.
    pub fn termination(&self) -> Termination {
        self.termination
    }
}

/// Capabilities required of an external MILP/LP backend.
pub trait SolverAdapter {
    /// Solves the formulation with one blocking call, returning once the
    /// backend terminates (optimal, time limit, or infeasible).
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] distinguishing infeasibility, unboundedness
    /// and backend-internal failures. Time-limit termination is not an error.
    fn solve(&self, formulation: &Formulation) -> Result<RawSolution, SolverError>;
}
