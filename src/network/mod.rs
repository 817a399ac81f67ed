//! The network aggregate
//!
//! Ownership and lifecycle of the whole cluster set: the typed
//! configuration, the [`ReactionNetwork`] with its composition indices and
//! assembly entry points, and the [`JacobianBuffer`] exchanged with the
//! external time integrator.

pub mod config;
pub mod network;

pub use config::NetworkConfig;
pub use network::{JacobianBuffer, ReactionNetwork};
