//! Reaction rules and rate constants
//!
//! Species-specific chemistry: which pairs react, which clusters dissociate
//! into which, and the temperature-dependent rate constants weighting them.
//! The construction machinery is crate-internal; the network drives it. The
//! rate formulas are public so external handlers (trap mutation, bursting)
//! can evaluate them against individual clusters.

pub mod rates;

pub(crate) mod connectivity;

pub use rates::{capture_rate, dissociation_rate};
