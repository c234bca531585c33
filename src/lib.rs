//! Lineup
//!
//! Lineup is a revenue-maximising product line design engine. Given a catalog
//! of candidate products with known margins and a finite mixture of customer
//! types, each holding a strict preference ranking over every product plus a
//! no-purchase alternative, it selects the assortment to offer (optionally
//! subject to linear side constraints) that maximises expected per-customer
//! revenue under the first-choice model: every customer type buys its
//! most-preferred offered alternative.

pub mod formulation;
pub mod optimiser;
pub mod prelude;
pub mod problem;
pub mod rankings;
pub mod solution;
pub mod solvers;
