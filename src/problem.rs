//! Assortment problem inputs

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rankings::Ranking;

/// Tolerance when checking that customer type weights sum to one.
pub const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Errors detected while validating problem inputs, before any model is
/// constructed.
#[derive(Debug, Error, PartialEq)]
pub enum ProblemError {
    /// The catalog has no products.
    #[error("catalog has no products")]
    EmptyCatalog,

    /// The customer mixture has no types.
    #[error("no customer types provided")]
    NoCustomerTypes,

    /// A customer type has a negative population weight.
    #[error("customer type {index} has negative weight {weight}")]
    NegativeWeight {
        /// Index of the offending customer type
        index: usize,

        /// The negative weight
        weight: f64,
    },

    /// Customer type weights do not form a probability distribution.
    #[error("customer type weights sum to {total}, expected 1")]
    WeightsDoNotSumToOne {
        /// The actual sum of weights
        total: f64,
    },

    /// A ranking was built for a different catalog size.
    #[error("customer type {index} ranks {actual} products but the catalog has {expected}")]
    RankingSizeMismatch {
        /// Index of the offending customer type
        index: usize,

        /// Number of products in the catalog
        expected: usize,

        /// Number of products the ranking covers
        actual: usize,
    },

    /// A side-constraint row has the wrong number of coefficients.
    #[error("side constraint {row} has {actual} coefficients but the catalog has {expected} products")]
    SideConstraintWidthMismatch {
        /// Index of the offending side-constraint row
        row: usize,

        /// Number of products in the catalog
        expected: usize,

        /// Number of coefficients actually supplied
        actual: usize,
    },

    /// A warm start was supplied for a continuous relaxation.
    #[error("warm starts are only accepted for integer solves, not relaxations")]
    WarmStartInRelaxation,

    /// The warm start does not cover every product.
    #[error("warm start has {actual} entries but the catalog has {expected} products")]
    WarmStartLengthMismatch {
        /// Number of products in the catalog
        expected: usize,

        /// Number of warm-start entries actually supplied
        actual: usize,
    },
}

/// One customer type: a population weight and its preference ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerType {
    /// Share of the population holding this ranking; weights sum to one
    /// across the mixture.
    pub weight: f64,

    /// Strict preference order over all products plus no-purchase.
    pub ranking: Ranking,
}

impl CustomerType {
    /// Creates a customer type with the given weight and ranking.
    pub fn new(weight: f64, ranking: Ranking) -> Self {
        Self { weight, ranking }
    }
}

/// One row of the linear side-constraint system `A · x ≤ b` over the
/// assortment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SideConstraint {
    /// One coefficient per product.
    pub coefficients: Vec<f64>,

    /// Right-hand side of the row.
    pub rhs: f64,
}

impl SideConstraint {
    /// Creates a side-constraint row.
    pub fn new(coefficients: Vec<f64>, rhs: f64) -> Self {
        Self { coefficients, rhs }
    }
}

/// A complete product line design instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssortmentProblem {
    /// Per-product margin; entries may be zero or negative.
    pub revenues: Vec<f64>,

    /// The customer mixture.
    pub customer_types: Vec<CustomerType>,

    /// Optional linear side constraints on the assortment; empty means none.
    pub side_constraints: Vec<SideConstraint>,
}

impl AssortmentProblem {
    /// Creates a problem with no side constraints.
    pub fn new(revenues: Vec<f64>, customer_types: Vec<CustomerType>) -> Self {
        Self {
            revenues,
            customer_types,
            side_constraints: Vec::new(),
        }
    }

    /// Adds linear side constraints on the assortment.
    #[must_use]
    pub fn with_side_constraints(mut self, side_constraints: Vec<SideConstraint>) -> Self {
        self.side_constraints = side_constraints;
        self
    }

    /// Number of products in the catalog.
    pub fn product_count(&self) -> usize {
        self.revenues.len()
    }

    /// Checks every structural invariant of the instance.
    ///
    /// # Errors
    ///
    /// Returns a [`ProblemError`] describing the first violated invariant:
    /// empty catalog or mixture, a negative weight, weights not summing to
    /// one (within [`WEIGHT_TOLERANCE`]), a ranking built for a different
    /// catalog size, or a side-constraint row of the wrong width.
    pub fn validate(&self) -> Result<(), ProblemError> {
        if self.revenues.is_empty() {
            return Err(ProblemError::EmptyCatalog);
        }

        if self.customer_types.is_empty() {
            return Err(ProblemError::NoCustomerTypes);
        }

        let expected = self.product_count();
        let mut total = 0.0;

        for (index, customer_type) in self.customer_types.iter().enumerate() {
            if customer_type.weight < 0.0 {
                return Err(ProblemError::NegativeWeight {
                    index,
                    weight: customer_type.weight,
                });
            }

            total += customer_type.weight;

            let actual = customer_type.ranking.product_count();

            if actual != expected {
                return Err(ProblemError::RankingSizeMismatch {
                    index,
                    expected,
                    actual,
                });
            }
        }

        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ProblemError::WeightsDoNotSumToOne { total });
        }

        for (row, constraint) in self.side_constraints.iter().enumerate() {
            let actual = constraint.coefficients.len();

            if actual != expected {
                return Err(ProblemError::SideConstraintWidthMismatch {
                    row,
                    expected,
                    actual,
                });
            }
        }

        Ok(())
    }
}

/// Knobs for one solve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveOptions {
    /// Wall-clock budget for the solver; `None` imposes no limit.
    pub time_limit: Option<Duration>,

    /// Solve the continuous relaxation instead of the integer problem.
    pub relaxation: bool,

    /// Initial assortment hint for the integer solve, one entry per product.
    pub warm_start: Option<Vec<f64>>,
}

impl SolveOptions {
    /// Options for an integer solve with no time limit.
    pub fn integer() -> Self {
        Self::default()
    }

    /// Options for the continuous relaxation.
    pub fn relaxed() -> Self {
        Self {
            relaxation: true,
            ..Self::default()
        }
    }

    /// Sets the wall-clock budget for the solver.
    #[must_use]
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = Some(time_limit);
        self
    }

    /// Attaches an initial assortment hint for the integer solve.
    #[must_use]
    pub fn with_warm_start(mut self, warm_start: Vec<f64>) -> Self {
        self.warm_start = Some(warm_start);
        self
    }

    /// Checks the options against a catalog of `product_count` products.
    ///
    /// # Errors
    ///
    /// Returns a [`ProblemError`] if a warm start is supplied together with
    /// `relaxation`, or if the warm start does not have one entry per
    /// product.
    pub fn validate(&self, product_count: usize) -> Result<(), ProblemError> {
        if let Some(start) = &self.warm_start {
            if self.relaxation {
                return Err(ProblemError::WarmStartInRelaxation);
            }

            if start.len() != product_count {
                return Err(ProblemError::WarmStartLengthMismatch {
                    expected: product_count,
                    actual: start.len(),
                });
            }
        }

        Ok(())
    }
}
