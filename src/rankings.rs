//! Customer preference rankings

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

/// Inline capacity for ranking storage; larger catalogs spill to the heap.
pub(crate) const RANK_INLINE: usize = 8;

/// Errors that can occur while constructing a [`Ranking`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RankingError {
    /// The ranking does not have one entry per alternative.
    #[error("ranking has {actual} entries but a catalog of {products} products needs {expected}")]
    LengthMismatch {
        /// Number of products in the catalog
        products: usize,

        /// Expected number of entries (products plus the no-purchase sentinel)
        expected: usize,

        /// Number of entries actually supplied
        actual: usize,
    },

    /// An entry is not a valid alternative index.
    #[error("ranking entry {alternative} is out of range for {alternatives} alternatives")]
    AlternativeOutOfRange {
        /// The offending entry
        alternative: usize,

        /// Number of valid alternatives (products plus the sentinel)
        alternatives: usize,
    },

    /// An alternative appears more than once.
    #[error("alternative {alternative} appears more than once in the ranking")]
    DuplicateAlternative {
        /// The repeated alternative index
        alternative: usize,
    },
}

/// A strict preference order over every product plus the no-purchase
/// alternative, most-preferred first.
///
/// For a catalog of `n` products a ranking is a permutation of the
/// alternative indices `0..=n`, where index `n` is the no-purchase sentinel.
/// A customer type holding this ranking buys the first offered alternative it
/// encounters; reaching the sentinel means it buys nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>")]
pub struct Ranking(SmallVec<[usize; RANK_INLINE]>);

impl Ranking {
    /// Creates a ranking for a catalog of `product_count` products.
    ///
    /// # Errors
    ///
    /// Returns a [`RankingError`] if `order` is not a permutation of
    /// `0..=product_count`.
    pub fn new(order: &[usize], product_count: usize) -> Result<Self, RankingError> {
        let expected = product_count + 1;

        if order.len() != expected {
            return Err(RankingError::LengthMismatch {
                products: product_count,
                expected,
                actual: order.len(),
            });
        }

        let mut seen: SmallVec<[bool; RANK_INLINE]> = SmallVec::new();
        seen.resize(expected, false);

        for &alternative in order {
            let Some(flag) = seen.get_mut(alternative) else {
                return Err(RankingError::AlternativeOutOfRange {
                    alternative,
                    alternatives: expected,
                });
            };

            if *flag {
                return Err(RankingError::DuplicateAlternative { alternative });
            }

            *flag = true;
        }

        Ok(Self(SmallVec::from_slice(order)))
    }

    /// The alternatives in preference order, most-preferred first.
    pub fn alternatives(&self) -> &[usize] {
        &self.0
    }

    /// Number of products this ranking was built for.
    pub fn product_count(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Number of alternatives, including the no-purchase sentinel.
    pub fn alternative_count(&self) -> usize {
        self.0.len()
    }

    /// Index of the no-purchase sentinel (always `product_count`).
    pub fn sentinel(&self) -> usize {
        self.product_count()
    }
}

impl TryFrom<Vec<usize>> for Ranking {
    type Error = RankingError;

    fn try_from(order: Vec<usize>) -> Result<Self, RankingError> {
        let product_count = order.len().saturating_sub(1);

        Self::new(&order, product_count)
    }
}
