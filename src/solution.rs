//! Solved assortments

use std::time::Duration;

use serde::Serialize;

use crate::{
    formulation::VariableLayout,
    solvers::{RawSolution, SolverError, Termination},
};

/// Binary threshold for determining truthiness
pub const BINARY_THRESHOLD: f64 = 0.5;

/// A solved product line design instance, mapped back into domain terms.
#[derive(Debug, Clone, Serialize)]
pub struct AssortmentSolution {
    /// Assortment values, one per product. Integer solves yield values at 0
    /// or 1 (up to solver tolerance); relaxations may be fractional.
    pub offered: Vec<f64>,

    /// Choice values per customer type, one row per type with one entry per
    /// alternative; the last entry is the no-purchase sentinel.
    pub choice_shares: Vec<Vec<f64>>,

    /// Expected per-customer revenue of the returned assortment.
    pub expected_revenue: f64,

    /// Best proven bound on the optimum. `None` for relaxations, which have
    /// no branch-and-bound bound of their own.
    pub upper_bound: Option<f64>,

    /// Relative optimality gap at termination. `None` for relaxations.
    pub gap: Option<f64>,

    /// Wall-clock time spent in the solver.
    pub solve_time: Duration,

    /// How the solve terminated.
    pub termination: Termination,
}

impl AssortmentSolution {
    /// Maps a backend's raw output into domain terms.
    ///
    /// Bound and gap are taken from the raw solution for integer solves and
    /// reported as `None` for relaxations; the solve time always comes from
    /// the backend.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the raw solution is missing a value for
    /// any variable in the layout.
    pub fn extract(
        raw: &RawSolution,
        layout: &VariableLayout,
        relaxation: bool,
    ) -> Result<Self, SolverError> {
        let offered = layout
            .assortment()
            .iter()
            .map(|&variable| raw.value(variable))
            .collect::<Result<Vec<_>, _>>()?;

        let choice_shares = layout
            .choices()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&variable| raw.value(variable))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        let (upper_bound, gap) = if relaxation {
            (None, None)
        } else {
            (raw.best_bound(), raw.gap())
        };

        Ok(Self {
            offered,
            choice_shares,
            expected_revenue: raw.objective(),
            upper_bound,
            gap,
            solve_time: raw.runtime(),
            termination: raw.termination(),
        })
    }

    /// Indices of the products offered, reading binary values with a 0.5
    /// threshold to tolerate solver noise.
    pub fn offered_products(&self) -> Vec<usize> {
        self.offered
            .iter()
            .enumerate()
            .filter(|&(_, &value)| value > BINARY_THRESHOLD)
            .map(|(index, _)| index)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        formulation,
        problem::{AssortmentProblem, CustomerType, SolveOptions},
        rankings::Ranking,
        solvers::RawSolution,
    };

    use super::*;

    fn raw_for(layout_size: usize, objective: f64) -> RawSolution {
        RawSolution::new(
            (0..layout_size).map(|i| if i == 0 { 1.0 } else { 0.0 }).collect(),
            objective,
            Some(objective + 0.5),
            Some(0.05),
            Duration::from_millis(12),
            Termination::TimeLimit,
        )
    }

    fn single_product_layout() -> TestResult<formulation::VariableLayout> {
        let problem = AssortmentProblem::new(
            vec![10.0],
            vec![CustomerType::new(1.0, Ranking::new(&[0, 1], 1)?)],
        );

        let (_, layout) = formulation::build(&problem, &SolveOptions::integer())?;

        Ok(layout)
    }

    #[test]
    fn integer_extraction_keeps_bound_and_gap() -> TestResult {
        let layout = single_product_layout()?;
        let raw = raw_for(3, 10.0);

        let solution = AssortmentSolution::extract(&raw, &layout, false)?;

        assert_eq!(solution.offered.len(), 1);
        assert_eq!(solution.choice_shares.len(), 1);
        assert!((solution.expected_revenue - 10.0).abs() < f64::EPSILON);
        assert_eq!(solution.upper_bound, Some(10.5));
        assert_eq!(solution.gap, Some(0.05));
        assert_eq!(solution.solve_time, Duration::from_millis(12));
        assert_eq!(solution.termination, Termination::TimeLimit);

        Ok(())
    }

    #[test]
    fn relaxed_extraction_reports_bound_and_gap_as_not_applicable() -> TestResult {
        let layout = single_product_layout()?;
        let raw = raw_for(3, 10.0);

        let solution = AssortmentSolution::extract(&raw, &layout, true)?;

        assert_eq!(solution.upper_bound, None);
        assert_eq!(solution.gap, None);

        Ok(())
    }

    #[test]
    fn offered_products_reads_binaries_with_a_threshold() -> TestResult {
        let layout = single_product_layout()?;
        let raw = raw_for(3, 10.0);

        let solution = AssortmentSolution::extract(&raw, &layout, false)?;

        assert_eq!(solution.offered_products(), vec![0]);

        Ok(())
    }

    #[test]
    fn missing_values_are_an_invariant_violation() -> TestResult {
        let layout = single_product_layout()?;

        // Two values for a three-variable layout.
        let raw = RawSolution::new(
            vec![1.0, 0.0],
            10.0,
            None,
            None,
            Duration::ZERO,
            Termination::Optimal,
        );

        assert!(matches!(
            AssortmentSolution::extract(&raw, &layout, false),
            Err(SolverError::InvariantViolation { .. })
        ));

        Ok(())
    }
}
