//! Cluster: one chemical species instance
//!
//! A [`Cluster`] owns its composition, physical constants, and the reaction
//! bookkeeping built by the connectivity pass. The bookkeeping is a set of
//! lightweight records ([`ReactingPair`], [`CombiningPartner`],
//! [`DissociatingPair`], [`EmissionPair`]) that cache the partners of every
//! reaction this cluster takes part in, together with the current rate
//! constant. The rate constants change only with temperature, so they are
//! stored on the records and refreshed by the network's temperature pass
//! rather than recomputed inside the per-grid-point flux loop.
//!
//! # Two-phase lifecycle
//!
//! Connectivity lists go through exactly two phases:
//!
//! 1. **Structural** — built once from composition algebra after the network
//!    is fully populated. The *set* of partners never changes afterwards.
//! 2. **Weighted** — rate constants filled in on every temperature change,
//!    together with the effective subsets (`eff_*`): the indices of entries
//!    whose rate is numerically significant. Entries whose rate underflows
//!    to zero stay in the structural list so they can reactivate when the
//!    temperature changes again.
//!
//! Computing fluxes before both phases have run is undefined; the network
//! documents (and tests) the required ordering.
//!
//! # Partner references
//!
//! Partners are referenced by their *slot* in the network's dense cluster
//! array, never by ownership. Every cluster can reference any other, so the
//! reference graph is cyclic by construction; plain indices keep it free of
//! ownership cycles.

use std::collections::BTreeSet;
use std::fmt;

use crate::chemistry::constants::{BOLTZMANN_EV_K, HELIUM_CORE_RADIUS, LATTICE_PARAMETER};
use crate::chemistry::{Composition, Species};

// =================================================================================================
// Reaction bookkeeping records
// =================================================================================================

/// A pair of clusters whose combination produces this cluster: A + B → this.
///
/// Distances are the moment distances of each member inside its grouped
/// section; 0.0 for ordinary clusters.
#[derive(Debug, Clone)]
pub struct ReactingPair {
    /// Network slot of the first reactant
    pub first: usize,
    /// Network slot of the second reactant
    pub second: usize,
    /// First reactant helium distance in its group
    pub first_he_distance: f64,
    /// First reactant vacancy distance in its group
    pub first_v_distance: f64,
    /// Second reactant helium distance in its group
    pub second_he_distance: f64,
    /// Second reactant vacancy distance in its group
    pub second_v_distance: f64,
    /// Reaction rate constant k+, refreshed on temperature change
    pub rate: f64,
}

impl ReactingPair {
    pub(crate) fn new(first: usize, second: usize) -> Self {
        Self {
            first,
            second,
            first_he_distance: 0.0,
            first_v_distance: 0.0,
            second_he_distance: 0.0,
            second_v_distance: 0.0,
            rate: 0.0,
        }
    }
}

/// A cluster this one combines with: this + other → product.
#[derive(Debug, Clone)]
pub struct CombiningPartner {
    /// Network slot of the combining cluster
    pub other: usize,
    /// Combining cluster helium distance in its group
    pub he_distance: f64,
    /// Combining cluster vacancy distance in its group
    pub v_distance: f64,
    /// Reaction rate constant k+, refreshed on temperature change
    pub rate: f64,
}

impl CombiningPartner {
    pub(crate) fn new(other: usize) -> Self {
        Self { other, he_distance: 0.0, v_distance: 0.0, rate: 0.0 }
    }
}

/// A dissociation producing this cluster: parent → this + co-emitted.
#[derive(Debug, Clone)]
pub struct DissociatingPair {
    /// Network slot of the dissociating parent
    pub parent: usize,
    /// Network slot of the cluster emitted alongside this one
    pub co_emitted: usize,
    /// Single-species family whose binding energy governs the rate
    pub emitted: Species,
    /// Dissociation rate constant k−, refreshed on temperature change
    pub rate: f64,
}

impl DissociatingPair {
    pub(crate) fn new(parent: usize, co_emitted: usize, emitted: Species) -> Self {
        Self { parent, co_emitted, emitted, rate: 0.0 }
    }
}

/// A dissociation of this cluster: this → first + second.
///
/// `first` is always the single-species size-1 product, so the right binding
/// energy can be selected when the rate is computed.
#[derive(Debug, Clone)]
pub struct EmissionPair {
    /// Network slot of the emitted single-species cluster
    pub first: usize,
    /// Network slot of the other product
    pub second: usize,
    /// Single-species family whose binding energy governs the rate
    pub emitted: Species,
    /// Dissociation rate constant k−, refreshed on temperature change
    pub rate: f64,
}

impl EmissionPair {
    pub(crate) fn new(first: usize, second: usize, emitted: Species) -> Self {
        Self { first, second, emitted, rate: 0.0 }
    }
}

// =================================================================================================
// Binding energies
// =================================================================================================

/// Per-family binding energies \[eV\] of a cluster.
///
/// The binding energy of family X is the energy holding one X defect in this
/// cluster; it enters the dissociation constant as `exp(−Eb/kT)`. An
/// infinite value means the family cannot be emitted, which drives the rate
/// to exactly zero and excludes the pair from the effective subset.
#[derive(Debug, Clone, Copy)]
pub struct BindingEnergies {
    /// Helium binding energy
    pub he: f64,
    /// Vacancy binding energy
    pub v: f64,
    /// Interstitial binding energy
    pub i: f64,
}

impl Default for BindingEnergies {
    fn default() -> Self {
        Self { he: f64::INFINITY, v: f64::INFINITY, i: f64::INFINITY }
    }
}

impl BindingEnergies {
    /// Binding energy for the given single-species family.
    ///
    /// # Panics
    ///
    /// Panics when asked for a mixed family; only single-species defects are
    /// emitted in dissociations.
    pub fn for_species(&self, species: Species) -> f64 {
        match species {
            Species::He => self.he,
            Species::V => self.v,
            Species::I => self.i,
            other => panic!("no binding energy for mixed family {}", other),
        }
    }
}

// =================================================================================================
// Grouped sections (super clusters)
// =================================================================================================

/// Moment data of a grouped helium–vacancy section.
///
/// A super cluster stands for a rectangular section of HeV compositions,
/// represented by the section means and two first-moment ("momentum")
/// concentrations. A member composition inside the section is addressed by
/// its normalized distances from the mean, and its concentration is the
/// moment-weighted value
///
/// ```text
/// c(dHe, dV) = c0 + dHe·mHe + dV·mV
/// ```
#[derive(Debug, Clone)]
pub struct SuperGroup {
    /// Mean helium content of the section
    pub mean_he: f64,
    /// Mean vacancy content of the section
    pub mean_v: f64,
    /// Helium width of the section (number of distinct He counts)
    pub he_width: f64,
    /// Vacancy width of the section
    pub v_width: f64,
    /// First helium moment concentration
    pub he_momentum: f64,
    /// First vacancy moment concentration
    pub v_momentum: f64,
}

impl SuperGroup {
    /// Create the moment data for a section centered on (`mean_he`,
    /// `mean_v`) with the given widths.
    pub fn new(mean_he: f64, mean_v: f64, he_width: f64, v_width: f64) -> Self {
        assert!(he_width >= 1.0 && v_width >= 1.0, "section widths must be at least 1");
        Self { mean_he, mean_v, he_width, v_width, he_momentum: 0.0, v_momentum: 0.0 }
    }

    /// Normalized helium distance of a member count from the section mean.
    ///
    /// Zero for width-1 sections: a degenerate section has no helium spread.
    pub fn he_distance(&self, he: u32) -> f64 {
        if self.he_width <= 1.0 {
            0.0
        } else {
            2.0 * (he as f64 - self.mean_he) / self.he_width
        }
    }

    /// Normalized vacancy distance of a member count from the section mean.
    pub fn v_distance(&self, v: u32) -> f64 {
        if self.v_width <= 1.0 {
            0.0
        } else {
            2.0 * (v as f64 - self.mean_v) / self.v_width
        }
    }

    /// Whether a composition falls inside this section.
    pub fn contains(&self, comp: &Composition) -> bool {
        comp.i == 0
            && comp.he > 0
            && comp.v > 0
            && (comp.he as f64 - self.mean_he).abs() <= self.he_width / 2.0
            && (comp.v as f64 - self.mean_v).abs() <= self.v_width / 2.0
    }
}

// =================================================================================================
// Cluster
// =================================================================================================

/// One chemical species instance tracked by the network.
///
/// Identified by a stable 1-based id assigned at insertion (reassigned by
/// `reinitialize_network`), a [`Species`] tag, and its [`Composition`].
/// Carries the per-cluster physical constants and the reaction bookkeeping
/// described at module level.
#[derive(Debug, Clone)]
pub struct Cluster {
    // ==================== Identity ====================
    pub(crate) id: usize,
    pub(crate) he_momentum_id: usize,
    pub(crate) v_momentum_id: usize,
    species: Species,
    composition: Composition,

    // ==================== Physical state ====================
    concentration: f64,
    reaction_radius: f64,
    diffusion_factor: f64,
    migration_energy: f64,
    diffusion_coefficient: f64,
    binding: BindingEnergies,
    super_group: Option<SuperGroup>,

    // ==================== Reaction bookkeeping ====================
    pub(crate) reacting_pairs: Vec<ReactingPair>,
    pub(crate) combining: Vec<CombiningPartner>,
    pub(crate) dissociating_pairs: Vec<DissociatingPair>,
    pub(crate) emission_pairs: Vec<EmissionPair>,

    // Effective subsets: indices into the lists above whose rate is nonzero.
    pub(crate) eff_reacting: Vec<usize>,
    pub(crate) eff_combining: Vec<usize>,
    pub(crate) eff_dissociating: Vec<usize>,
    pub(crate) eff_emission: Vec<usize>,

    // Connectivity sets (1-based DOF ids), rebuilt from the effective lists.
    pub(crate) reaction_connectivity: BTreeSet<usize>,
    pub(crate) dissociation_connectivity: BTreeSet<usize>,
}

impl Cluster {
    fn with_composition(species: Species, composition: Composition, radius: f64) -> Self {
        Self {
            id: 0,
            he_momentum_id: 0,
            v_momentum_id: 0,
            species,
            composition,
            concentration: 0.0,
            reaction_radius: radius,
            diffusion_factor: 0.0,
            migration_energy: f64::INFINITY,
            diffusion_coefficient: 0.0,
            binding: BindingEnergies::default(),
            super_group: None,
            reacting_pairs: Vec::new(),
            combining: Vec::new(),
            dissociating_pairs: Vec::new(),
            emission_pairs: Vec::new(),
            eff_reacting: Vec::new(),
            eff_combining: Vec::new(),
            eff_dissociating: Vec::new(),
            eff_emission: Vec::new(),
            reaction_connectivity: BTreeSet::new(),
            dissociation_connectivity: BTreeSet::new(),
        }
    }

    /// Create a pure helium cluster He_n.
    ///
    /// The reaction radius follows the helium-bubble fit
    /// `r = 0.3 + ∛(3a³n/40π) − ∛(3a³/40π)` with `a` the lattice parameter.
    ///
    /// # Panics
    ///
    /// Panics when `n == 0`.
    pub fn helium(n: u32) -> Self {
        assert!(n >= 1, "cluster size must be at least 1, got {}", n);
        Self::with_composition(Species::He, Composition::helium(n), helium_radius(n))
    }

    /// Create a pure vacancy cluster V_n.
    ///
    /// # Panics
    ///
    /// Panics when `n == 0`.
    pub fn vacancy(n: u32) -> Self {
        assert!(n >= 1, "cluster size must be at least 1, got {}", n);
        Self::with_composition(Species::V, Composition::vacancy(n), defect_radius(n))
    }

    /// Create a pure interstitial cluster I_n.
    ///
    /// # Panics
    ///
    /// Panics when `n == 0`.
    pub fn interstitial(n: u32) -> Self {
        assert!(n >= 1, "cluster size must be at least 1, got {}", n);
        Self::with_composition(Species::I, Composition::interstitial(n), defect_radius(n))
    }

    /// Create a mixed helium–vacancy cluster He_a V_b.
    ///
    /// The radius is set by the vacancy count: the helium sits inside the
    /// vacancy volume.
    ///
    /// # Panics
    ///
    /// Panics when either count is zero.
    pub fn helium_vacancy(he: u32, v: u32) -> Self {
        assert!(he >= 1 && v >= 1, "mixed cluster needs both components, got He={}, V={}", he, v);
        Self::with_composition(Species::HeV, Composition::new(he, v, 0), defect_radius(v))
    }

    /// Create a mixed helium–interstitial cluster He_a I_b.
    ///
    /// # Panics
    ///
    /// Panics when either count is zero.
    pub fn helium_interstitial(he: u32, i: u32) -> Self {
        assert!(he >= 1 && i >= 1, "mixed cluster needs both components, got He={}, I={}", he, i);
        Self::with_composition(Species::HeI, Composition::new(he, 0, i), defect_radius(i))
    }

    /// Create a grouped helium–vacancy section.
    ///
    /// The composition key is the rounded section mean; the moment data lives
    /// in the attached [`SuperGroup`].
    pub fn grouped(group: SuperGroup) -> Self {
        let comp = Composition::new(group.mean_he.round() as u32, group.mean_v.round() as u32, 0);
        assert!(comp.he >= 1 && comp.v >= 1, "grouped section mean must be a mixed composition");
        let mut cluster =
            Self::with_composition(Species::Super, comp, defect_radius(comp.v));
        cluster.super_group = Some(group);
        cluster
    }

    // ==================== Identity accessors ====================

    /// Stable 1-based id, 0 before insertion.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// DOF id of the helium moment variable (equal to `id` for ordinary
    /// clusters).
    #[inline]
    pub fn he_momentum_id(&self) -> usize {
        self.he_momentum_id
    }

    /// DOF id of the vacancy moment variable.
    #[inline]
    pub fn v_momentum_id(&self) -> usize {
        self.v_momentum_id
    }

    /// Species family tag.
    #[inline]
    pub fn species(&self) -> Species {
        self.species
    }

    /// Composition key.
    #[inline]
    pub fn composition(&self) -> &Composition {
        &self.composition
    }

    /// Total cluster size.
    #[inline]
    pub fn size(&self) -> u32 {
        self.composition.total()
    }

    /// Grouped-section moment data, for super clusters.
    pub fn super_group(&self) -> Option<&SuperGroup> {
        self.super_group.as_ref()
    }

    pub(crate) fn super_group_mut(&mut self) -> Option<&mut SuperGroup> {
        self.super_group.as_mut()
    }

    // ==================== Bookkeeping accessors ====================

    /// Pairs whose combination produces this cluster.
    pub fn reacting_pairs(&self) -> &[ReactingPair] {
        &self.reacting_pairs
    }

    /// Clusters this one combines with.
    pub fn combining_partners(&self) -> &[CombiningPartner] {
        &self.combining
    }

    /// Dissociations producing this cluster.
    pub fn dissociating_pairs(&self) -> &[DissociatingPair] {
        &self.dissociating_pairs
    }

    /// Dissociations of this cluster.
    pub fn emission_pairs(&self) -> &[EmissionPair] {
        &self.emission_pairs
    }

    /// Number of entries per effective subset, in list order (reacting,
    /// combining, dissociating, emission).
    pub fn effective_counts(&self) -> (usize, usize, usize, usize) {
        (
            self.eff_reacting.len(),
            self.eff_combining.len(),
            self.eff_dissociating.len(),
            self.eff_emission.len(),
        )
    }

    // ==================== Physical state ====================

    /// Current concentration at the grid point being processed.
    #[inline]
    pub fn concentration(&self) -> f64 {
        self.concentration
    }

    /// Set the concentration (scratch value, overwritten per grid point).
    pub fn set_concentration(&mut self, value: f64) {
        self.concentration = value;
    }

    /// Moment-weighted concentration at the given section distances.
    ///
    /// Reduces to the plain concentration for ordinary clusters and for
    /// zero distances.
    #[inline]
    pub fn concentration_at(&self, he_distance: f64, v_distance: f64) -> f64 {
        match &self.super_group {
            Some(group) => {
                self.concentration
                    + he_distance * group.he_momentum
                    + v_distance * group.v_momentum
            }
            None => self.concentration,
        }
    }

    /// Geometry-derived reaction radius \[nm\].
    #[inline]
    pub fn reaction_radius(&self) -> f64 {
        self.reaction_radius
    }

    /// Diffusion prefactor D0 \[nm²/s\].
    pub fn diffusion_factor(&self) -> f64 {
        self.diffusion_factor
    }

    /// Set the diffusion prefactor D0.
    pub fn set_diffusion_factor(&mut self, factor: f64) {
        self.diffusion_factor = factor;
    }

    /// Migration energy \[eV\].
    pub fn migration_energy(&self) -> f64 {
        self.migration_energy
    }

    /// Set the migration energy.
    pub fn set_migration_energy(&mut self, energy: f64) {
        self.migration_energy = energy;
    }

    /// Per-family binding energies.
    pub fn binding_energies(&self) -> &BindingEnergies {
        &self.binding
    }

    /// Set the per-family binding energies.
    pub fn set_binding_energies(&mut self, binding: BindingEnergies) {
        self.binding = binding;
    }

    /// Derived diffusion coefficient \[nm²/s\] at the current temperature.
    #[inline]
    pub fn diffusion_coefficient(&self) -> f64 {
        self.diffusion_coefficient
    }

    /// Recompute the diffusion coefficient for a new temperature:
    /// `D = D0 · exp(−Em / kB·T)`.
    pub(crate) fn update_diffusion_coefficient(&mut self, temperature: f64) {
        let exponent = -self.migration_energy / (BOLTZMANN_EV_K * temperature);
        self.diffusion_coefficient = self.diffusion_factor * exponent.exp();
    }

    // ==================== Effective subsets ====================

    /// Rebuild the effective subsets from the current rate constants.
    ///
    /// An entry is effective when its rate is strictly positive; zero rates
    /// (infinite binding energy, immobile reactants) are kept structurally
    /// but skipped by the hot path.
    pub(crate) fn refresh_effective(&mut self) {
        refresh(&mut self.eff_reacting, self.reacting_pairs.iter().map(|p| p.rate));
        refresh(&mut self.eff_combining, self.combining.iter().map(|p| p.rate));
        refresh(&mut self.eff_dissociating, self.dissociating_pairs.iter().map(|p| p.rate));
        refresh(&mut self.eff_emission, self.emission_pairs.iter().map(|p| p.rate));
    }

    /// Clear all bookkeeping (used when connectivity is rebuilt).
    pub(crate) fn clear_connectivity(&mut self) {
        self.reacting_pairs.clear();
        self.combining.clear();
        self.dissociating_pairs.clear();
        self.emission_pairs.clear();
        self.eff_reacting.clear();
        self.eff_combining.clear();
        self.eff_dissociating.clear();
        self.eff_emission.clear();
        self.reaction_connectivity.clear();
        self.dissociation_connectivity.clear();
    }

    // ==================== Flux contributions ====================
    //
    // All accumulation is plain double precision; concentrations may
    // transiently be any real number. The integrator, not this core, keeps
    // them non-negative.

    /// Gain from reacting pairs: Σ k+ · cA · cB.
    pub fn production_flux(&self, clusters: &[Cluster]) -> f64 {
        let mut flux = 0.0;
        for &idx in &self.eff_reacting {
            let pair = &self.reacting_pairs[idx];
            let ca = clusters[pair.first]
                .concentration_at(pair.first_he_distance, pair.first_v_distance);
            let cb = clusters[pair.second]
                .concentration_at(pair.second_he_distance, pair.second_v_distance);
            flux += pair.rate * ca * cb;
        }
        flux
    }

    /// Loss to combining partners: Σ k+ · c_this · c_other.
    pub fn combination_flux(&self, clusters: &[Cluster]) -> f64 {
        let mut sum = 0.0;
        for &idx in &self.eff_combining {
            let partner = &self.combining[idx];
            sum += partner.rate
                * clusters[partner.other].concentration_at(partner.he_distance, partner.v_distance);
        }
        sum * self.concentration
    }

    /// Gain from parents dissociating into this cluster: Σ k− · c_parent.
    pub fn dissociation_flux(&self, clusters: &[Cluster]) -> f64 {
        let mut flux = 0.0;
        for &idx in &self.eff_dissociating {
            let pair = &self.dissociating_pairs[idx];
            flux += pair.rate * clusters[pair.parent].concentration();
        }
        flux
    }

    /// Loss from this cluster's own dissociation: Σ k− · c_this.
    pub fn emission_flux(&self) -> f64 {
        let mut sum = 0.0;
        for &idx in &self.eff_emission {
            sum += self.emission_pairs[idx].rate;
        }
        sum * self.concentration
    }

    /// Total flux: production − combination + dissociation − emission.
    pub fn total_flux(&self, clusters: &[Cluster]) -> f64 {
        self.production_flux(clusters) - self.combination_flux(clusters)
            + self.dissociation_flux(clusters)
            - self.emission_flux()
    }

    /// Combination-plus-emission rate with concentrations stripped out:
    /// Σ k+ · c_other + Σ k−.
    ///
    /// Consumed by the external trap-mutation handler to derive desorption
    /// rates.
    pub fn left_side_rate(&self, clusters: &[Cluster]) -> f64 {
        let mut rate = 0.0;
        for &idx in &self.eff_combining {
            let partner = &self.combining[idx];
            rate += partner.rate * clusters[partner.other].concentration();
        }
        for &idx in &self.eff_emission {
            rate += self.emission_pairs[idx].rate;
        }
        rate
    }

    // ==================== Partial derivatives ====================
    //
    // Product-rule expansion of each flux sum, accumulated into a dense row
    // indexed by 0-based DOF column. The network compresses the row into the
    // caller's sparse buffers afterwards. Moment variables of grouped
    // partners receive the distance-weighted chain-rule terms.

    /// ∂(production)/∂c for every involved cluster.
    pub fn production_partials(&self, clusters: &[Cluster], partials: &mut [f64]) {
        for &idx in &self.eff_reacting {
            let pair = &self.reacting_pairs[idx];
            let first = &clusters[pair.first];
            let second = &clusters[pair.second];
            let ca = first.concentration_at(pair.first_he_distance, pair.first_v_distance);
            let cb = second.concentration_at(pair.second_he_distance, pair.second_v_distance);

            // d/dcA = k·cB, spread over A's base and moment columns
            spread(partials, first, pair.first_he_distance, pair.first_v_distance, pair.rate * cb);
            // d/dcB = k·cA
            spread(
                partials,
                second,
                pair.second_he_distance,
                pair.second_v_distance,
                pair.rate * ca,
            );
        }
    }

    /// ∂(−combination)/∂c for this cluster and every partner.
    pub fn combination_partials(&self, clusters: &[Cluster], partials: &mut [f64]) {
        for &idx in &self.eff_combining {
            let partner = &self.combining[idx];
            let other = &clusters[partner.other];
            let c_other = other.concentration_at(partner.he_distance, partner.v_distance);

            // d/dc_this = −k·c_other
            partials[self.id - 1] -= partner.rate * c_other;
            // d/dc_other = −k·c_this
            spread(
                partials,
                other,
                partner.he_distance,
                partner.v_distance,
                -partner.rate * self.concentration,
            );
        }
    }

    /// ∂(dissociation)/∂c_parent for every dissociating pair.
    pub fn dissociation_partials(&self, clusters: &[Cluster], partials: &mut [f64]) {
        for &idx in &self.eff_dissociating {
            let pair = &self.dissociating_pairs[idx];
            partials[clusters[pair.parent].id - 1] += pair.rate;
        }
    }

    /// ∂(−emission)/∂c_this.
    pub fn emission_partials(&self, partials: &mut [f64]) {
        let mut sum = 0.0;
        for &idx in &self.eff_emission {
            sum += self.emission_pairs[idx].rate;
        }
        partials[self.id - 1] -= sum;
    }

    /// Accumulate all four partial-derivative kinds into a dense row.
    pub fn partial_derivatives(&self, clusters: &[Cluster], partials: &mut [f64]) {
        self.production_partials(clusters, partials);
        self.combination_partials(clusters, partials);
        self.dissociation_partials(clusters, partials);
        self.emission_partials(partials);
    }

    // ==================== Connectivity sets ====================

    /// Compute the (reaction, dissociation) connectivity sets of this
    /// cluster from its effective lists: the 1-based DOF ids whose
    /// concentration this cluster's flux depends on.
    pub(crate) fn connectivity_sets(
        &self,
        clusters: &[Cluster],
    ) -> (BTreeSet<usize>, BTreeSet<usize>) {
        let mut reaction = BTreeSet::new();
        let mut dissociation = BTreeSet::new();

        // A cluster is always connected to itself: any reaction it takes
        // part in changes its own concentration.
        reaction.insert(self.id);

        for &idx in &self.eff_reacting {
            let pair = &self.reacting_pairs[idx];
            insert_dof_ids(&mut reaction, &clusters[pair.first]);
            insert_dof_ids(&mut reaction, &clusters[pair.second]);
        }
        for &idx in &self.eff_combining {
            let partner = &self.combining[idx];
            insert_dof_ids(&mut reaction, &clusters[partner.other]);
        }
        for &idx in &self.eff_dissociating {
            let pair = &self.dissociating_pairs[idx];
            dissociation.insert(clusters[pair.parent].id);
        }
        if !self.eff_emission.is_empty() {
            dissociation.insert(self.id);
        }

        (reaction, dissociation)
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let comp = &self.composition;
        match self.species {
            Species::He | Species::V | Species::I => {
                write!(f, "{}_{}", self.species, comp.total())
            }
            Species::HeV | Species::Super => write!(f, "{}_({},{})", self.species, comp.he, comp.v),
            Species::HeI => write!(f, "HeI_({},{})", comp.he, comp.i),
        }
    }
}

// =================================================================================================
// Helpers
// =================================================================================================

fn refresh(effective: &mut Vec<usize>, rates: impl Iterator<Item = f64>) {
    effective.clear();
    for (idx, rate) in rates.enumerate() {
        if rate > 0.0 {
            effective.push(idx);
        }
    }
}

/// Add `value` to a partner's base column and, for grouped partners, the
/// distance-weighted chain-rule terms to its moment columns.
#[inline]
fn spread(partials: &mut [f64], cluster: &Cluster, he_distance: f64, v_distance: f64, value: f64) {
    partials[cluster.id - 1] += value;
    if cluster.super_group.is_some() {
        if he_distance != 0.0 {
            partials[cluster.he_momentum_id - 1] += he_distance * value;
        }
        if v_distance != 0.0 {
            partials[cluster.v_momentum_id - 1] += v_distance * value;
        }
    }
}

fn insert_dof_ids(set: &mut BTreeSet<usize>, cluster: &Cluster) {
    set.insert(cluster.id);
    if cluster.super_group.is_some() {
        set.insert(cluster.he_momentum_id);
        set.insert(cluster.v_momentum_id);
    }
}

/// Helium-bubble radius fit: `0.3 + ∛(3a³n/40π) − ∛(3a³/40π)`.
fn helium_radius(n: u32) -> f64 {
    let a_cubed = LATTICE_PARAMETER.powi(3);
    let scale = (3.0 / (4.0 * std::f64::consts::PI)) * 0.1 * a_cubed;
    HELIUM_CORE_RADIUS + (scale * n as f64).cbrt() - scale.cbrt()
}

/// Vacancy/interstitial radius: `(√3/4)a + ∛(3a³n/8π) − ∛(3a³/8π)`.
///
/// Also used for mixed clusters with n the defect (V or I) count.
fn defect_radius(n: u32) -> f64 {
    let a_cubed = LATTICE_PARAMETER.powi(3);
    let scale = 3.0 * a_cubed / (8.0 * std::f64::consts::PI);
    (3.0_f64).sqrt() / 4.0 * LATTICE_PARAMETER + (scale * n as f64).cbrt() - scale.cbrt()
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_species_constructors() {
        let he = Cluster::helium(10);
        assert_eq!(he.species(), Species::He);
        assert_eq!(he.size(), 10);
        assert_eq!(he.composition(), &Composition::helium(10));

        let v = Cluster::vacancy(4);
        assert_eq!(v.species(), Species::V);
        assert_eq!(v.to_string(), "V_4");
    }

    #[test]
    #[should_panic(expected = "cluster size must be at least 1")]
    fn test_zero_size_panics() {
        Cluster::helium(0);
    }

    #[test]
    #[should_panic(expected = "mixed cluster needs both components")]
    fn test_mixed_needs_both_components() {
        Cluster::helium_vacancy(3, 0);
    }

    #[test]
    fn test_defect_radius_matches_reference_values() {
        // Reference radii for He_1 I_n, n = 1..5, from the original
        // regression data. The mixed radius depends only on the defect count.
        let expected = [0.1372650265, 0.1778340462, 0.2062922619, 0.2289478080, 0.2480795532];
        for (n, &radius) in expected.iter().enumerate() {
            let cluster = Cluster::helium_interstitial(1, (n + 1) as u32);
            assert!(
                (cluster.reaction_radius() - radius).abs() < 1e-6,
                "HeI(1,{}): got {}, expected {}",
                n + 1,
                cluster.reaction_radius(),
                radius
            );
        }
    }

    #[test]
    fn test_helium_radius_is_monotonic() {
        let mut previous = 0.0;
        for n in 1..=8 {
            let radius = Cluster::helium(n).reaction_radius();
            assert!(radius > previous);
            previous = radius;
        }
    }

    #[test]
    fn test_diffusion_coefficient_is_arrhenius() {
        let mut cluster = Cluster::helium(1);
        cluster.set_diffusion_factor(1.0e10);
        cluster.set_migration_energy(0.13);

        cluster.update_diffusion_coefficient(300.0);
        let d_cold = cluster.diffusion_coefficient();
        cluster.update_diffusion_coefficient(1000.0);
        let d_hot = cluster.diffusion_coefficient();

        assert!(d_cold > 0.0);
        assert!(d_hot > d_cold, "diffusion must increase with temperature");
    }

    #[test]
    fn test_infinite_migration_energy_freezes_cluster() {
        let mut cluster = Cluster::vacancy(3);
        cluster.set_diffusion_factor(1.0e11);
        // Default migration energy is infinite
        cluster.update_diffusion_coefficient(1000.0);
        assert_eq!(cluster.diffusion_coefficient(), 0.0);
    }

    #[test]
    fn test_super_group_distances() {
        let group = SuperGroup::new(10.0, 6.0, 4.0, 2.0);
        assert_eq!(group.he_distance(10), 0.0);
        assert!((group.he_distance(12) - 1.0).abs() < 1e-12);
        assert!((group.v_distance(5) + 1.0).abs() < 1e-12);

        assert!(group.contains(&Composition::new(11, 6, 0)));
        assert!(!group.contains(&Composition::new(20, 6, 0)));
        assert!(!group.contains(&Composition::new(10, 6, 1)));
    }

    #[test]
    fn test_moment_weighted_concentration() {
        let mut group = SuperGroup::new(10.0, 6.0, 4.0, 2.0);
        group.he_momentum = 0.5;
        group.v_momentum = 0.25;
        let mut cluster = Cluster::grouped(group);
        cluster.set_concentration(2.0);

        assert_eq!(cluster.concentration_at(0.0, 0.0), 2.0);
        assert!((cluster.concentration_at(1.0, 0.0) - 2.5).abs() < 1e-12);
        assert!((cluster.concentration_at(0.0, -1.0) - 1.75).abs() < 1e-12);

        // Ordinary clusters ignore distances entirely.
        let mut plain = Cluster::helium(2);
        plain.set_concentration(3.0);
        assert_eq!(plain.concentration_at(1.0, 1.0), 3.0);
    }

    #[test]
    fn test_effective_subset_skips_zero_rates() {
        let mut cluster = Cluster::helium(3);
        cluster.reacting_pairs.push(ReactingPair::new(0, 1));
        cluster.reacting_pairs.push(ReactingPair::new(1, 2));
        cluster.reacting_pairs[1].rate = 4.2;
        cluster.refresh_effective();

        assert_eq!(cluster.eff_reacting, vec![1]);
        // The zero-rate entry stays in the structural list.
        assert_eq!(cluster.reacting_pairs.len(), 2);
    }
}
