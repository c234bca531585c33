//! Lineup prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    formulation::{
        Comparison, Formulation, FormulationError, LinearConstraint, VariableId, VariableKind,
        VariableLayout, build,
    },
    optimiser::{OptimiseError, optimise, optimise_with},
    problem::{AssortmentProblem, CustomerType, ProblemError, SideConstraint, SolveOptions},
    rankings::{Ranking, RankingError},
    solution::AssortmentSolution,
    solvers::{RawSolution, SolverAdapter, SolverError, Termination, milp::MilpAdapter},
};
