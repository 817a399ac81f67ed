//! Rate-constant formulas
//!
//! The three temperature-dependent quantities of the model, in the units set
//! by [`crate::chemistry::constants`]:
//!
//! - diffusion coefficient `D = D0 · exp(−Em / kB·T)` \[nm²/s\],
//! - capture (reaction) constant `k+ = 4π (r1 + r2)(D1 + D2)` \[nm³/s\],
//! - dissociation constant `k− = k+ / Ω · exp(−Eb / kB·T)` \[1/s\],
//!
//! where Ω is the atomic volume and Eb the parent's binding energy for the
//! emitted single-species defect. Infinite migration or binding energies
//! drive the corresponding constant to exactly zero through `exp(−∞)`, which
//! is what excludes the reaction from the effective subsets.
//!
//! The functions are free and pure; the network's temperature pass applies
//! them to every bookkeeping record.

use crate::chemistry::constants::{ATOMIC_VOLUME, BOLTZMANN_EV_K};
use crate::chemistry::{Cluster, Species};

/// Diffusive capture constant of two clusters: `4π (r1 + r2)(D1 + D2)`.
///
/// Zero when both clusters are immobile, which removes the pair from the
/// effective subsets until a temperature change mobilizes one of them.
#[inline]
pub fn capture_rate(a: &Cluster, b: &Cluster) -> f64 {
    4.0 * std::f64::consts::PI
        * (a.reaction_radius() + b.reaction_radius())
        * (a.diffusion_coefficient() + b.diffusion_coefficient())
}

/// Dissociation constant of `parent → product_a + product_b`, where
/// `emitted` names the single-species family leaving the parent.
///
/// Detailed balance against the reverse capture: the capture constant of the
/// two products, divided by the atomic volume, damped by the parent's
/// binding energy for the emitted family. The capture constant is symmetric
/// in the products, so their order does not matter.
#[inline]
pub fn dissociation_rate(
    parent: &Cluster,
    emitted: Species,
    product_a: &Cluster,
    product_b: &Cluster,
    temperature: f64,
) -> f64 {
    let binding = parent.binding_energies().for_species(emitted);
    let boltzmann = (-binding / (BOLTZMANN_EV_K * temperature)).exp();
    capture_rate(product_a, product_b) / ATOMIC_VOLUME * boltzmann
}
