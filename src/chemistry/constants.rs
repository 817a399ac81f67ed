//! Material and physical constants
//!
//! The values below are for bcc tungsten, the plasma-facing material these
//! networks are typically built for. All lengths are in nanometers, energies
//! in electron-volts, temperatures in kelvin; rate constants therefore come
//! out in nm³/s and diffusion coefficients in nm²/s.

/// Boltzmann constant \[eV/K\].
pub const BOLTZMANN_EV_K: f64 = 8.617_332_4e-5;

/// Tungsten lattice parameter \[nm\].
pub const LATTICE_PARAMETER: f64 = 0.317;

/// Atomic volume of bcc tungsten \[nm³\].
///
/// Two atoms per conventional cell, hence a³/2.
pub const ATOMIC_VOLUME: f64 = 0.5 * LATTICE_PARAMETER * LATTICE_PARAMETER * LATTICE_PARAMETER;

/// Core radius offset for helium clusters \[nm\].
///
/// Empirical offset in the helium reaction-radius fit; see
/// [`crate::chemistry::Cluster::helium`].
pub const HELIUM_CORE_RADIUS: f64 = 0.3;
