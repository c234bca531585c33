//! First-choice ranking encoder
//!
//! Translates one customer type's preference ranking into linear constraints
//! over that type's choice variables `y` and the shared assortment variables
//! `x`, such that in any feasible solution the type's choice can only fall on
//! an alternative with no more-preferred offered alternative above it. The
//! encoding is big-M-free: it relies only on the `[0, 1]` nature of `x` and
//! the order of the ranking.

use smallvec::smallvec;

use crate::{
    formulation::{FormulationError, LinearConstraint, VariableId},
    rankings::Ranking,
};

/// Upper estimate of the constraints emitted per customer type, used to
/// pre-reserve storage. The precedence scan is quadratic in the catalog size;
/// that O(K·n²) count is inherent to the formulation.
pub fn constraint_estimate(product_count: usize) -> usize {
    product_count + 1 + product_count * (product_count + 1) / 2
}

/// Encodes first-choice behaviour for one customer type.
///
/// Emits, into `constraints`:
///
/// 1. `y_i − x_i ≤ 0` for every product `i`: a product can only be chosen if
///    it is offered. The no-purchase sentinel is always available and gets no
///    such bound.
/// 2. `Σ_i y_i = 1` over all alternatives: exactly one choice is realised.
/// 3. For every ranking position holding a product `a`, and every position
///    below it: `y_below + x_a ≤ 1`. Offering `a` forces every less-preferred
///    alternative's choice variable to zero, so the choice lands on the
///    highest-ranked offered alternative.
///
/// If the sentinel occupies a non-final position, everything ranked below it
/// is pinned to zero (`y_below ≤ 0`) instead: the customer would stop
/// searching there. Expected inputs keep the sentinel last, so that arm
/// rarely fires; its semantics are pending domain review and should not be
/// changed without it.
///
/// # Errors
///
/// Returns [`FormulationError::InvariantViolation`] if the variable slices do
/// not match the ranking's catalog size; the builder always passes matching
/// slices.
pub fn encode_first_choice(
    ranking: &Ranking,
    assortment: &[VariableId],
    choices: &[VariableId],
    constraints: &mut Vec<LinearConstraint>,
) -> Result<(), FormulationError> {
    if assortment.len() != ranking.product_count() || choices.len() != ranking.alternative_count() {
        return Err(FormulationError::InvariantViolation {
            message: "variable layout does not match ranking size",
        });
    }

    // Offer bounds. Zipping choices against the assortment stops before the
    // sentinel's choice variable.
    for (&choice, &offered) in choices.iter().zip(assortment) {
        constraints.push(LinearConstraint::less_or_equal(
            smallvec![(choice, 1.0), (offered, -1.0)],
            0.0,
        ));
    }

    // Exactly one realised choice per customer type.
    constraints.push(LinearConstraint::equal(
        choices.iter().map(|&choice| (choice, 1.0)).collect(),
        1.0,
    ));

    let order = ranking.alternatives();

    for (position, &preferred) in order.iter().enumerate() {
        let below = order.get(position + 1..).unwrap_or_default();

        if below.is_empty() {
            continue;
        }

        if preferred < ranking.sentinel() {
            let &offered =
                assortment
                    .get(preferred)
                    .ok_or(FormulationError::InvariantViolation {
                        message: "ranking names a product with no assortment variable",
                    })?;

            for &worse in below {
                let &choice = choices
                    .get(worse)
                    .ok_or(FormulationError::InvariantViolation {
                        message: "ranking names an alternative with no choice variable",
                    })?;

                constraints.push(LinearConstraint::less_or_equal(
                    smallvec![(choice, 1.0), (offered, 1.0)],
                    1.0,
                ));
            }
        } else {
            // Sentinel reached before the final rank.
            for &worse in below {
                let &choice = choices
                    .get(worse)
                    .ok_or(FormulationError::InvariantViolation {
                        message: "ranking names an alternative with no choice variable",
                    })?;

                constraints.push(LinearConstraint::less_or_equal(
                    smallvec![(choice, 1.0)],
                    0.0,
                ));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::formulation::Comparison;

    use super::*;

    fn variables(count: usize, offset: usize) -> Vec<VariableId> {
        (0..count).map(|i| VariableId(offset + i)).collect()
    }

    fn encode(order: &[usize], product_count: usize) -> TestResult<Vec<LinearConstraint>> {
        let ranking = Ranking::new(order, product_count)?;
        let assortment = variables(product_count, 0);
        let choices = variables(product_count + 1, product_count);

        let mut constraints = Vec::new();
        encode_first_choice(&ranking, &assortment, &choices, &mut constraints)?;

        Ok(constraints)
    }

    fn has_le_row(constraints: &[LinearConstraint], terms: &[(usize, f64)], rhs: f64) -> bool {
        constraints.iter().any(|constraint| {
            constraint.comparison() == Comparison::LessOrEqual
                && (constraint.rhs() - rhs).abs() < f64::EPSILON
                && constraint.terms().len() == terms.len()
                && terms.iter().all(|&(index, coefficient)| {
                    constraint.terms().iter().any(|&(variable, actual)| {
                        variable.index() == index && (actual - coefficient).abs() < f64::EPSILON
                    })
                })
        })
    }

    #[test]
    fn emits_offer_bounds_for_products_but_not_the_sentinel() -> TestResult {
        // Products are x_0, x_1; choices are y_0 = 2, y_1 = 3, sentinel = 4.
        let constraints = encode(&[1, 0, 2], 2)?;

        assert!(
            has_le_row(&constraints, &[(2, 1.0), (0, -1.0)], 0.0),
            "y_0 must be bounded by x_0"
        );
        assert!(
            has_le_row(&constraints, &[(3, 1.0), (1, -1.0)], 0.0),
            "y_1 must be bounded by x_1"
        );
        assert!(
            !has_le_row(&constraints, &[(4, 1.0)], 0.0),
            "the sentinel is always available and needs no offer bound"
        );

        Ok(())
    }

    #[test]
    fn emits_one_simplex_row_over_all_alternatives() -> TestResult {
        let constraints = encode(&[1, 0, 2], 2)?;

        let simplex: Vec<_> = constraints
            .iter()
            .filter(|constraint| constraint.comparison() == Comparison::Equal)
            .collect();

        assert_eq!(simplex.len(), 1, "exactly one equality row per type");

        let row = simplex.first().ok_or("missing simplex row")?;

        assert_eq!(row.terms().len(), 3, "simplex spans all alternatives");
        assert!((row.rhs() - 1.0).abs() < f64::EPSILON, "choices sum to one");

        Ok(())
    }

    #[test]
    fn offering_a_product_excludes_everything_ranked_below_it() -> TestResult {
        // Ranking 1 > 0 > sentinel: offering product 1 must pin y_0 and the
        // sentinel choice to zero; offering product 0 pins only the sentinel.
        let constraints = encode(&[1, 0, 2], 2)?;

        assert!(
            has_le_row(&constraints, &[(2, 1.0), (1, 1.0)], 1.0),
            "y_0 + x_1 <= 1 missing"
        );
        assert!(
            has_le_row(&constraints, &[(4, 1.0), (1, 1.0)], 1.0),
            "y_sentinel + x_1 <= 1 missing"
        );
        assert!(
            has_le_row(&constraints, &[(4, 1.0), (0, 1.0)], 1.0),
            "y_sentinel + x_0 <= 1 missing"
        );
        assert!(
            !has_le_row(&constraints, &[(3, 1.0), (0, 1.0)], 1.0),
            "product 0 is ranked below product 1 and must not exclude it"
        );

        Ok(())
    }

    #[test]
    fn constraint_count_matches_estimate_for_sentinel_last() -> TestResult {
        let constraints = encode(&[2, 0, 1, 3], 3)?;

        // 3 offer bounds + 1 simplex + 3 + 2 + 1 precedence rows.
        assert_eq!(constraints.len(), constraint_estimate(3));

        Ok(())
    }

    #[test]
    fn sentinel_before_final_rank_pins_lower_alternatives_to_zero() -> TestResult {
        // Sentinel (2) ranked above product 0: the customer stops searching
        // at no-purchase, so y_0 is pinned to zero unconditionally.
        let constraints = encode(&[1, 2, 0], 2)?;

        assert!(
            has_le_row(&constraints, &[(2, 1.0)], 0.0),
            "alternatives below an early sentinel must be pinned to zero"
        );

        Ok(())
    }

    #[test]
    fn mismatched_layout_is_an_invariant_violation() -> TestResult {
        let ranking = Ranking::new(&[1, 0, 2], 2)?;
        let assortment = variables(1, 0);
        let choices = variables(3, 1);

        let mut constraints = Vec::new();
        let result = encode_first_choice(&ranking, &assortment, &choices, &mut constraints);

        assert!(matches!(
            result,
            Err(FormulationError::InvariantViolation { .. })
        ));

        Ok(())
    }
}
