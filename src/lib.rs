//! defectnet-rs: Cluster Reaction Networks for Irradiated Materials
//!
//! An in-memory reaction network over point-defect clusters (helium,
//! vacancies, interstitials and their mixtures) in a metal lattice under
//! irradiation. The network enumerates the species, wires up which clusters
//! react with and dissociate into which, weights every reaction with
//! temperature-dependent rate constants, and assembles per-grid-point flux
//! vectors and sparse Jacobian rows for an external time integrator.
//!
//! # Architecture
//!
//! defectnet-rs is built on two core principles:
//!
//! 1. **Separation of Chemistry and Bookkeeping**
//!    - Cluster types and rate formulas define the physics (what reacts)
//!    - The network aggregate owns wiring and assembly (how it is computed)
//!
//! 2. **Build Once, Assemble Often**
//!    - Connectivity is structural and built once from composition algebra
//!    - Temperature changes only re-weight it; the per-grid-point hot path
//!      touches nothing but concentrations and preassembled lists
//!
//! # Quick Start
//!
//! ```rust
//! use defectnet_rs::prelude::*;
//! use nalgebra::DVector;
//!
//! # fn main() -> Result<(), NetworkError> {
//! // 1. Populate the network
//! let mut network = ReactionNetwork::new(NetworkConfig::new(8, 10, 4));
//! for n in 1..=8 {
//!     let id = network.add(Cluster::helium(n))?;
//!     assert_eq!(id, n as usize);
//! }
//!
//! // 2. Wire it up and set the temperature
//! network.build_connectivity();
//! network.reinitialize_network();
//! network.set_temperature(1000.0);
//! network.reinitialize_connectivities();
//!
//! // 3. Exchange state and assemble fluxes per grid point
//! let concentrations = DVector::from_element(network.dof(), 1.0e-3);
//! network.update_concentrations(&concentrations)?;
//! let mut fluxes = DVector::zeros(network.dof());
//! network.compute_all_fluxes(&mut fluxes)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`chemistry`]: Cluster types, compositions, material constants
//! - [`reactions`]: Reaction rules and rate-constant formulas
//! - [`network`]: The owning aggregate and its assembly entry points

// Core modules
pub mod chemistry;

pub mod error;
pub mod network;
pub mod reactions;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //!
    //! use defectnet_rs::prelude::*;
    //! ```
    pub use crate::chemistry::{BindingEnergies,
                               Cluster,
                               Composition,
                               Species,
                               SuperGroup};
    pub use crate::error::NetworkError;
    pub use crate::network::{JacobianBuffer,
                             NetworkConfig,
                             ReactionNetwork};
}
