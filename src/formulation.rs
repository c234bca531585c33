//! Solver-agnostic MILP formulation of the assortment problem
//!
//! [`build`] turns a validated [`AssortmentProblem`] into an immutable
//! [`Formulation`] value that a solver adapter consumes in one shot, plus a
//! [`VariableLayout`] that maps the declared variables back onto the domain.
//! Nothing here touches a solver; the formulation is plain data.

use std::time::Duration;

use smallvec::SmallVec;
use thiserror::Error;

use crate::problem::{AssortmentProblem, ProblemError, SolveOptions};

pub mod encoder;

/// Inline capacity for constraint terms; most constraints here touch at most
/// two variables, side constraints and the choice simplex spill to the heap.
pub(crate) const TERM_INLINE: usize = 4;

/// Coefficient terms of one linear expression.
pub type Terms = SmallVec<[(VariableId, f64); TERM_INLINE]>;

/// Errors that can occur while building a formulation.
#[derive(Debug, Error, PartialEq)]
pub enum FormulationError {
    /// Wrapped input validation error.
    #[error(transparent)]
    Problem(#[from] ProblemError),

    /// Internal formulation invariant was violated (this is a bug).
    #[error("formulation invariant violated: {message}")]
    InvariantViolation {
        /// What invariant was violated
        message: &'static str,
    },
}

/// Identifier of one declared decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariableId(pub(crate) usize);

impl VariableId {
    /// Position of the variable in declaration order.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Domain of a declared decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableKind {
    /// Integer variable in `{0, 1}`.
    Binary,

    /// Continuous variable in `[0, 1]`.
    UnitInterval,

    /// Continuous variable in `[0, ∞)`.
    NonNegative,
}

/// Comparison sense of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Left-hand side at most the right-hand side.
    LessOrEqual,

    /// Left-hand side equal to the right-hand side.
    Equal,
}

/// One linear constraint `Σ coefficient · variable {≤,=} rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    terms: Terms,
    comparison: Comparison,
    rhs: f64,
}

impl LinearConstraint {
    /// Creates a `≤` constraint.
    pub fn less_or_equal(terms: Terms, rhs: f64) -> Self {
        Self {
            terms,
            comparison: Comparison::LessOrEqual,
            rhs,
        }
    }

    /// Creates an `=` constraint.
    pub fn equal(terms: Terms, rhs: f64) -> Self {
        Self {
            terms,
            comparison: Comparison::Equal,
            rhs,
        }
    }

    /// The coefficient terms of the left-hand side.
    pub fn terms(&self) -> &[(VariableId, f64)] {
        &self.terms
    }

    /// The comparison sense.
    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    /// The right-hand side.
    pub fn rhs(&self) -> f64 {
        self.rhs
    }
}

/// An immutable formulation, built once and handed once to a solver adapter.
///
/// Carries everything a backend needs for one solve: variable domains,
/// constraints, a maximisation objective, warm-start hints and the time
/// limit. It is discarded after the solve; no solver state outlives it.
#[derive(Debug, Clone)]
pub struct Formulation {
    variables: Vec<VariableKind>,
    constraints: Vec<LinearConstraint>,
    objective: Vec<(VariableId, f64)>,
    warm_start: Vec<(VariableId, f64)>,
    time_limit: Option<Duration>,
}

impl Formulation {
    /// Domains of all declared variables, in declaration order.
    pub fn variables(&self) -> &[VariableKind] {
        &self.variables
    }

    /// All linear constraints.
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Terms of the maximisation objective.
    pub fn objective(&self) -> &[(VariableId, f64)] {
        &self.objective
    }

    /// Warm-start hints; empty unless an integer solve supplied one.
    pub fn warm_start(&self) -> &[(VariableId, f64)] {
        &self.warm_start
    }

    /// Wall-clock budget for the solver, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    /// Number of declared variables.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }
}

/// Where each domain quantity lives in a [`Formulation`]'s variable space.
#[derive(Debug, Clone)]
pub struct VariableLayout {
    assortment: Vec<VariableId>,
    choices: Vec<Vec<VariableId>>,
}

impl VariableLayout {
    /// Assortment variable `x_i` per product.
    pub fn assortment(&self) -> &[VariableId] {
        &self.assortment
    }

    /// Choice variables per customer type; each row has one entry per
    /// alternative, the last being the no-purchase sentinel.
    pub fn choices(&self) -> &[Vec<VariableId>] {
        &self.choices
    }

    /// Number of products.
    pub fn product_count(&self) -> usize {
        self.assortment.len()
    }

    /// Number of customer types.
    pub fn customer_type_count(&self) -> usize {
        self.choices.len()
    }
}

/// Builds the first-choice formulation for one problem instance.
///
/// Declares one assortment variable per product (binary, or `[0, 1]` for the
/// relaxation) and one non-negative choice variable per (customer type,
/// alternative), encodes every customer type's ranking, adds the side
/// constraints, and assembles the expected-revenue objective
/// `Σ_k Σ_i weight_k · revenue_i · y_{k,i}` (the sentinel earns nothing and
/// gets no term).
///
/// # Errors
///
/// Returns a [`FormulationError`] if the problem or options fail validation;
/// all validation happens before any variable is declared.
pub fn build(
    problem: &AssortmentProblem,
    options: &SolveOptions,
) -> Result<(Formulation, VariableLayout), FormulationError> {
    problem.validate()?;
    options.validate(problem.product_count())?;

    let product_count = problem.product_count();
    let type_count = problem.customer_types.len();

    let assortment_kind = if options.relaxation {
        VariableKind::UnitInterval
    } else {
        VariableKind::Binary
    };

    let mut variables = Vec::with_capacity(product_count + type_count * (product_count + 1));

    let assortment: Vec<VariableId> = (0..product_count)
        .map(|_| declare(&mut variables, assortment_kind))
        .collect();

    let choices: Vec<Vec<VariableId>> = (0..type_count)
        .map(|_| {
            (0..=product_count)
                .map(|_| declare(&mut variables, VariableKind::NonNegative))
                .collect()
        })
        .collect();

    // Validation has already rejected warm starts on relaxations, so any hint
    // left here belongs to an integer solve.
    let warm_start: Vec<(VariableId, f64)> = options
        .warm_start
        .as_deref()
        .unwrap_or_default()
        .iter()
        .copied()
        .zip(assortment.iter().copied())
        .map(|(value, variable)| (variable, value))
        .collect();

    let mut constraints = Vec::with_capacity(
        problem.side_constraints.len() + type_count * encoder::constraint_estimate(product_count),
    );

    for side in &problem.side_constraints {
        let terms: Terms = side
            .coefficients
            .iter()
            .copied()
            .zip(assortment.iter().copied())
            .map(|(coefficient, variable)| (variable, coefficient))
            .collect();

        constraints.push(LinearConstraint::less_or_equal(terms, side.rhs));
    }

    for (customer_type, type_choices) in problem.customer_types.iter().zip(&choices) {
        encoder::encode_first_choice(
            &customer_type.ranking,
            &assortment,
            type_choices,
            &mut constraints,
        )?;
    }

    let mut objective = Vec::with_capacity(type_count * product_count);

    for (customer_type, type_choices) in problem.customer_types.iter().zip(&choices) {
        // Zipping against the revenue vector naturally excludes the sentinel,
        // whose choice variable has no revenue.
        for (&choice, &revenue) in type_choices.iter().zip(&problem.revenues) {
            objective.push((choice, customer_type.weight * revenue));
        }
    }

    let formulation = Formulation {
        variables,
        constraints,
        objective,
        warm_start,
        time_limit: options.time_limit,
    };

    let layout = VariableLayout {
        assortment,
        choices,
    };

    Ok((formulation, layout))
}

fn declare(variables: &mut Vec<VariableKind>, kind: VariableKind) -> VariableId {
    let id = VariableId(variables.len());
    variables.push(kind);

    id
}
