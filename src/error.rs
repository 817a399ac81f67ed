//! Error types
//!
//! The network has exactly one hard failure mode: inserting a cluster whose
//! composition is already present. Everything else that can "go wrong" during
//! normal operation — a composition lookup finding nothing, a rate constant
//! underflowing to zero — is an expected branch and is expressed through
//! `Option` or through the effective-subset mechanism, never through errors.

use thiserror::Error;

use crate::chemistry::Composition;

/// Errors raised by the reaction network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// A cluster with this exact composition is already registered.
    ///
    /// This signals a loader or configuration bug; the simulation cannot
    /// proceed and the insert is not retried.
    #[error("duplicate cluster (He={}, V={}, I={}) not added", .0.he, .0.v, .0.i)]
    DuplicateSpecies(Composition),

    /// A caller-provided buffer does not match the network's degrees of
    /// freedom.
    #[error("buffer length {actual} does not match network DOF {expected}")]
    DimensionMismatch { expected: usize, actual: usize },
}
