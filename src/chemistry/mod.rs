//! Chemistry primitives
//!
//! The leaf types of the crate: material constants, species tags and
//! compositions, and the [`Cluster`] itself with its reaction bookkeeping
//! and per-cluster flux math. Everything here is network-agnostic; the
//! aggregate that owns clusters and wires them together lives in
//! [`crate::network`].

pub mod cluster;
pub mod constants;
pub mod species;

pub use cluster::{
    BindingEnergies, Cluster, CombiningPartner, DissociatingPair, EmissionPair, ReactingPair,
    SuperGroup,
};
pub use species::{Composition, Species};
