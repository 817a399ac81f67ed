//! The reaction network aggregate
//!
//! [`ReactionNetwork`] owns every cluster, the composition and per-family
//! indices over them, and the lifecycle that turns a populated set of
//! clusters into a flux-and-Jacobian assembly engine:
//!
//! ```text
//! insert all clusters
//!   → build_connectivity()          structural pass, composition algebra
//!   → reinitialize_network()        dense id + momentum id assignment
//!   → set_temperature(t)            rate constants + effective subsets
//!   → reinitialize_connectivities() per-cluster dependency sets
//!   → per grid point:
//!       update_concentrations → compute_all_fluxes / compute_all_partials
//!       → fill_concentrations
//! ```
//!
//! Computing fluxes before connectivity and temperature have both been set
//! is undefined; release builds do not re-check the phase discipline on the
//! hot path, but the partials assembly asserts in debug builds that the
//! connectivity sets match the current temperature epoch.
//!
//! The network is not internally thread-safe. One network per process,
//! mutated serially per grid point; the optional `parallel` feature only
//! parallelizes the temperature-change rebuild, which is deterministic and
//! off the hot path.

use std::collections::HashMap;

use nalgebra::DVector;
use ndarray::Array2;

use crate::chemistry::{Cluster, Composition, Species};
use crate::error::NetworkError;
use crate::network::config::NetworkConfig;
use crate::reactions::connectivity::{
    dissociation_connectivity, reaction_connectivity, ConnectivityBuffer, NetworkView,
};
use crate::reactions::rates::{capture_rate, dissociation_rate};

// =================================================================================================
// Jacobian buffer
// =================================================================================================

/// Sparse-per-row Jacobian storage in the layout the external PETSc-style
/// driver expects: `dof × dof` row-major backing arrays for values and
/// column indices, plus a per-row entry count.
///
/// Allocated once per solve and reused across grid points.
#[derive(Debug, Clone)]
pub struct JacobianBuffer {
    values: Vec<f64>,
    indices: Vec<usize>,
    row_sizes: Vec<usize>,
    scratch: Vec<f64>,
    dof: usize,
}

impl JacobianBuffer {
    /// Allocate a buffer for a network with the given degrees of freedom.
    pub fn new(dof: usize) -> Self {
        Self {
            values: vec![0.0; dof * dof],
            indices: vec![0; dof * dof],
            row_sizes: vec![0; dof],
            scratch: vec![0.0; dof],
            dof,
        }
    }

    /// Degrees of freedom this buffer was sized for.
    pub fn dof(&self) -> usize {
        self.dof
    }

    /// Column indices and values of one row (0-based).
    pub fn row(&self, row: usize) -> (&[usize], &[f64]) {
        let n = self.row_sizes[row];
        let start = row * self.dof;
        (&self.indices[start..start + n], &self.values[start..start + n])
    }

    fn reset(&mut self) {
        self.row_sizes.iter_mut().for_each(|n| *n = 0);
    }
}

// =================================================================================================
// Reaction network
// =================================================================================================

/// The in-memory cluster reaction network.
///
/// Cloning deep-copies every cluster together with its bookkeeping; partner
/// references are slot indices, so the clone is immediately consistent and
/// the two networks evolve independently from there.
#[derive(Clone)]
pub struct ReactionNetwork {
    clusters: Vec<Cluster>,
    standard_index: HashMap<Composition, usize>,
    super_index: HashMap<Composition, usize>,
    species_slots: [Vec<usize>; 6],
    config: NetworkConfig,
    temperature: f64,
    temperature_epoch: u64,
    connectivity_epoch: u64,
    counts: [usize; 6],
    max_observed: [u32; 6],
}

impl Default for ReactionNetwork {
    fn default() -> Self {
        Self::new(NetworkConfig::default())
    }
}

impl ReactionNetwork {
    /// Create an empty network with the given configuration.
    pub fn new(config: NetworkConfig) -> Self {
        Self {
            clusters: Vec::new(),
            standard_index: HashMap::new(),
            super_index: HashMap::new(),
            species_slots: Default::default(),
            config,
            temperature: 0.0,
            temperature_epoch: 0,
            connectivity_epoch: 0,
            counts: [0; 6],
            max_observed: [0; 6],
        }
    }

    // ==================== Population ====================

    /// Insert a standard (single or mixed) cluster.
    ///
    /// Assigns the next dense 1-based id and returns it. A duplicate
    /// composition is the network's one hard failure.
    ///
    /// # Panics
    ///
    /// Panics when handed a grouped section; those go through
    /// [`Self::add_super`].
    pub fn add(&mut self, cluster: Cluster) -> Result<usize, NetworkError> {
        assert!(
            cluster.species() != Species::Super,
            "grouped sections are inserted through add_super"
        );
        if self.standard_index.contains_key(cluster.composition()) {
            return Err(NetworkError::DuplicateSpecies(*cluster.composition()));
        }
        Ok(self.insert(cluster, false))
    }

    /// Insert a grouped section.
    ///
    /// Sections live in their own composition index, keyed by the rounded
    /// section mean.
    pub fn add_super(&mut self, cluster: Cluster) -> Result<usize, NetworkError> {
        assert!(
            cluster.species() == Species::Super,
            "add_super only accepts grouped sections"
        );
        if self.super_index.contains_key(cluster.composition()) {
            return Err(NetworkError::DuplicateSpecies(*cluster.composition()));
        }
        Ok(self.insert(cluster, true))
    }

    fn insert(&mut self, mut cluster: Cluster, is_super: bool) -> usize {
        let slot = self.clusters.len();
        let id = slot + 1;
        cluster.id = id;
        cluster.he_momentum_id = id;
        cluster.v_momentum_id = id;

        let species = cluster.species();
        self.species_slots[species.index()].push(slot);
        self.counts[species.index()] += 1;
        let total = cluster.composition().total();
        if total > self.max_observed[species.index()] {
            self.max_observed[species.index()] = total;
        }

        let comp = *cluster.composition();
        if is_super {
            self.super_index.insert(comp, slot);
        } else {
            self.standard_index.insert(comp, slot);
        }
        self.clusters.push(cluster);
        id
    }

    /// Remove a cluster from the network (regrouping path).
    ///
    /// All indices are rebuilt; ids are stale until
    /// [`Self::reinitialize_network`] runs, and connectivity must be rebuilt
    /// before the next assembly. Removing an absent cluster is logged and
    /// ignored.
    pub fn remove(&mut self, species: Species, composition: &Composition) {
        let index =
            if species == Species::Super { &self.super_index } else { &self.standard_index };
        let Some(&slot) = index.get(composition) else {
            log::warn!("remove: no {} cluster at {}", species, composition);
            return;
        };
        if self.clusters[slot].species() != species {
            log::warn!("remove: {} is a {} cluster", composition, self.clusters[slot].species());
            return;
        }
        self.clusters.remove(slot);
        self.rebuild_indices();
    }

    /// Slot shifts after a removal invalidate every index wholesale.
    fn rebuild_indices(&mut self) {
        self.standard_index.clear();
        self.super_index.clear();
        self.species_slots = Default::default();
        self.counts = [0; 6];
        self.max_observed = [0; 6];
        for (slot, cluster) in self.clusters.iter().enumerate() {
            let species = cluster.species();
            self.species_slots[species.index()].push(slot);
            self.counts[species.index()] += 1;
            let total = cluster.composition().total();
            if total > self.max_observed[species.index()] {
                self.max_observed[species.index()] = total;
            }
            let comp = *cluster.composition();
            if species == Species::Super {
                self.super_index.insert(comp, slot);
            } else {
                self.standard_index.insert(comp, slot);
            }
        }
    }

    // ==================== Queries ====================

    /// Look up a single-species cluster by family and size.
    pub fn get(&self, species: Species, size: u32) -> Option<&Cluster> {
        let comp = match species {
            Species::He => Composition::helium(size),
            Species::V => Composition::vacancy(size),
            Species::I => Composition::interstitial(size),
            _ => return None,
        };
        self.standard_index.get(&comp).map(|&slot| &self.clusters[slot])
    }

    /// Mutable single-species lookup (loader path).
    pub fn get_mut(&mut self, species: Species, size: u32) -> Option<&mut Cluster> {
        let comp = match species {
            Species::He => Composition::helium(size),
            Species::V => Composition::vacancy(size),
            Species::I => Composition::interstitial(size),
            _ => return None,
        };
        let slot = *self.standard_index.get(&comp)?;
        Some(&mut self.clusters[slot])
    }

    /// Look up a mixed cluster by exact composition.
    pub fn get_mixed(&self, composition: &Composition) -> Option<&Cluster> {
        self.standard_index.get(composition).map(|&slot| &self.clusters[slot])
    }

    /// Mutable mixed lookup (loader path).
    pub fn get_mixed_mut(&mut self, composition: &Composition) -> Option<&mut Cluster> {
        let slot = *self.standard_index.get(composition)?;
        Some(&mut self.clusters[slot])
    }

    /// Look up a grouped section by its mean composition.
    pub fn get_super(&self, composition: &Composition) -> Option<&Cluster> {
        self.super_index.get(composition).map(|&slot| &self.clusters[slot])
    }

    /// Mutable grouped-section lookup.
    pub fn get_super_mut(&mut self, composition: &Composition) -> Option<&mut Cluster> {
        let slot = *self.super_index.get(composition)?;
        Some(&mut self.clusters[slot])
    }

    /// The grouped section whose bounds contain the given composition.
    pub fn get_super_containing(&self, composition: &Composition) -> Option<&Cluster> {
        self.species_slots[Species::Super.index()]
            .iter()
            .map(|&slot| &self.clusters[slot])
            .find(|cluster| {
                cluster.super_group().map(|group| group.contains(composition)).unwrap_or(false)
            })
    }

    /// All clusters in insertion order.
    pub fn get_all(&self) -> &[Cluster] {
        &self.clusters
    }

    /// All clusters of one family, in insertion order.
    pub fn get_all_of(&self, species: Species) -> impl Iterator<Item = &Cluster> {
        self.species_slots[species.index()].iter().map(move |&slot| &self.clusters[slot])
    }

    /// Number of clusters (grouped sections included).
    pub fn size(&self) -> usize {
        self.clusters.len()
    }

    /// Degrees of freedom: one per cluster plus two moment variables per
    /// grouped section.
    pub fn dof(&self) -> usize {
        self.clusters.len() + 2 * self.counts[Species::Super.index()]
    }

    /// Number of clusters in one family.
    pub fn count_of(&self, species: Species) -> usize {
        self.counts[species.index()]
    }

    /// Largest total composition observed in one family.
    pub fn max_observed_size(&self, species: Species) -> u32 {
        self.max_observed[species.index()]
    }

    /// Current temperature \[K\].
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    /// Temperature epoch counter; the effective subsets are valid for
    /// exactly one epoch.
    pub fn temperature_epoch(&self) -> u64 {
        self.temperature_epoch
    }

    /// The configuration this network was built with.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    // ==================== Lifecycle ====================

    /// Build the structural connectivity of every cluster from composition
    /// algebra. Runs against the fully-populated network; honors the
    /// configuration's reaction and dissociation toggles.
    pub fn build_connectivity(&mut self) {
        for cluster in &mut self.clusters {
            cluster.clear_connectivity();
        }

        let mut buffer = ConnectivityBuffer::default();
        {
            let view = NetworkView {
                clusters: &self.clusters,
                standard: &self.standard_index,
                species_slots: &self.species_slots,
                config: &self.config,
            };
            for slot in 0..self.clusters.len() {
                if self.config.reactions_enabled {
                    reaction_connectivity(slot, &view, &mut buffer);
                }
            }
            for slot in 0..self.clusters.len() {
                if self.config.dissociations_enabled {
                    dissociation_connectivity(slot, &view, &mut buffer);
                }
            }
        }

        for (target, pair) in buffer.reacting {
            self.clusters[target].reacting_pairs.push(pair);
        }
        for (target, partner) in buffer.combining {
            self.clusters[target].combining.push(partner);
        }
        for (target, pair) in buffer.dissociating {
            self.clusters[target].dissociating_pairs.push(pair);
        }
        for (target, pair) in buffer.emission {
            self.clusters[target].emission_pairs.push(pair);
        }

        log::debug!(
            "connectivity built over {} clusters ({} dof)",
            self.clusters.len(),
            self.dof()
        );
    }

    /// Set the temperature and rebuild everything that depends on it:
    /// diffusion coefficients, every rate constant, and the effective
    /// subsets.
    pub fn set_temperature(&mut self, temperature: f64) {
        assert!(temperature > 0.0, "temperature must be positive, got {}", temperature);
        self.temperature = temperature;
        self.temperature_epoch += 1;
        log::debug!("temperature epoch {} at {} K", self.temperature_epoch, temperature);

        for cluster in &mut self.clusters {
            cluster.update_diffusion_coefficient(temperature);
        }

        // Rates read partner clusters immutably, so they are computed into
        // per-cluster batches first and applied in a second sweep.
        let batches = self.compute_rate_batches();
        for (cluster, batch) in self.clusters.iter_mut().zip(batches) {
            for (pair, rate) in cluster.reacting_pairs.iter_mut().zip(batch.reacting) {
                pair.rate = rate;
            }
            for (partner, rate) in cluster.combining.iter_mut().zip(batch.combining) {
                partner.rate = rate;
            }
            for (pair, rate) in cluster.dissociating_pairs.iter_mut().zip(batch.dissociating) {
                pair.rate = rate;
            }
            for (pair, rate) in cluster.emission_pairs.iter_mut().zip(batch.emission) {
                pair.rate = rate;
            }
            cluster.refresh_effective();
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn compute_rate_batches(&self) -> Vec<RateBatch> {
        self.clusters
            .iter()
            .map(|cluster| rate_batch(&self.clusters, self.temperature, cluster))
            .collect()
    }

    #[cfg(feature = "parallel")]
    fn compute_rate_batches(&self) -> Vec<RateBatch> {
        use rayon::prelude::*;
        self.clusters
            .par_iter()
            .map(|cluster| rate_batch(&self.clusters, self.temperature, cluster))
            .collect()
    }

    /// Reassign dense 1-based ids in insertion order, then give every
    /// grouped section its two moment ids in the trailing DOF slots.
    pub fn reinitialize_network(&mut self) {
        let mut id = 0;
        for cluster in &mut self.clusters {
            id += 1;
            cluster.id = id;
            cluster.he_momentum_id = id;
            cluster.v_momentum_id = id;
        }
        for cluster in &mut self.clusters {
            if cluster.species() == Species::Super {
                id += 1;
                cluster.he_momentum_id = id;
                id += 1;
                cluster.v_momentum_id = id;
            }
        }
    }

    /// Rebuild every cluster's connectivity sets from its effective lists.
    ///
    /// Run after `set_temperature`; the sets drive the sparse partials
    /// compression and the diagonal fill, and are valid for exactly one
    /// temperature epoch.
    pub fn reinitialize_connectivities(&mut self) {
        self.connectivity_epoch = self.temperature_epoch;
        let sets: Vec<_> = self
            .clusters
            .iter()
            .map(|cluster| cluster.connectivity_sets(&self.clusters))
            .collect();
        for (cluster, (reaction, dissociation)) in self.clusters.iter_mut().zip(sets) {
            cluster.reaction_connectivity = reaction;
            cluster.dissociation_connectivity = dissociation;
        }
    }

    // ==================== Per-point exchange ====================

    /// Load concentrations from a DOF-sized buffer: base values at `id − 1`,
    /// section moments at the momentum ids.
    pub fn update_concentrations(
        &mut self,
        concentrations: &DVector<f64>,
    ) -> Result<(), NetworkError> {
        self.check_dof(concentrations.len())?;
        for cluster in &mut self.clusters {
            cluster.set_concentration(concentrations[cluster.id - 1]);
            let he_idx = cluster.he_momentum_id - 1;
            let v_idx = cluster.v_momentum_id - 1;
            if let Some(group) = cluster.super_group_mut() {
                group.he_momentum = concentrations[he_idx];
                group.v_momentum = concentrations[v_idx];
            }
        }
        Ok(())
    }

    /// Write current concentrations back into a DOF-sized buffer; exact
    /// inverse of [`Self::update_concentrations`].
    pub fn fill_concentrations(
        &self,
        concentrations: &mut DVector<f64>,
    ) -> Result<(), NetworkError> {
        self.check_dof(concentrations.len())?;
        for cluster in &self.clusters {
            concentrations[cluster.id - 1] = cluster.concentration();
            if let Some(group) = cluster.super_group() {
                concentrations[cluster.he_momentum_id - 1] = group.he_momentum;
                concentrations[cluster.v_momentum_id - 1] = group.v_momentum;
            }
        }
        Ok(())
    }

    /// Assemble the total flux of every cluster into a DOF-sized buffer.
    ///
    /// The buffer is zeroed first; each cluster's
    /// production − combination + dissociation − emission lands at `id − 1`.
    /// Moment rows stay zero: refreshing the moments is the regrouping
    /// pass's job, outside this core.
    pub fn compute_all_fluxes(&self, fluxes: &mut DVector<f64>) -> Result<(), NetworkError> {
        self.check_dof(fluxes.len())?;
        fluxes.fill(0.0);
        for cluster in &self.clusters {
            fluxes[cluster.id - 1] += cluster.total_flux(&self.clusters);
        }
        Ok(())
    }

    /// Assemble the sparse Jacobian rows of every cluster.
    ///
    /// Each cluster's product-rule partials are accumulated densely into the
    /// buffer's scratch row, then compressed through the cluster's
    /// connectivity sets. Requires `reinitialize_connectivities` to have run
    /// for the current temperature epoch.
    pub fn compute_all_partials(&self, buffer: &mut JacobianBuffer) -> Result<(), NetworkError> {
        self.check_dof(buffer.dof)?;
        debug_assert_eq!(
            self.connectivity_epoch, self.temperature_epoch,
            "connectivity sets are stale: reinitialize_connectivities has not run \
             for temperature epoch {}",
            self.temperature_epoch
        );
        buffer.reset();
        for cluster in &self.clusters {
            let row = cluster.id - 1;

            for &dof_id in
                cluster.reaction_connectivity.iter().chain(&cluster.dissociation_connectivity)
            {
                buffer.scratch[dof_id - 1] = 0.0;
            }
            cluster.partial_derivatives(&self.clusters, &mut buffer.scratch);

            let start = row * buffer.dof;
            let mut count = 0;
            for &dof_id in &cluster.reaction_connectivity {
                buffer.indices[start + count] = dof_id - 1;
                buffer.values[start + count] = buffer.scratch[dof_id - 1];
                count += 1;
            }
            for &dof_id in &cluster.dissociation_connectivity {
                if cluster.reaction_connectivity.contains(&dof_id) {
                    continue;
                }
                buffer.indices[start + count] = dof_id - 1;
                buffer.values[start + count] = buffer.scratch[dof_id - 1];
                count += 1;
            }
            buffer.row_sizes[row] = count;

            // Leave scratch clean for the next row.
            for &dof_id in
                cluster.reaction_connectivity.iter().chain(&cluster.dissociation_connectivity)
            {
                buffer.scratch[dof_id - 1] = 0.0;
            }
        }
        Ok(())
    }

    /// Mark the Jacobian sparsity pattern: for every cluster row, the union
    /// of its connectivity sets plus the diagonal; moment rows get their
    /// diagonal so the driver allocates them.
    pub fn diagonal_fill(&self, fill: &mut Array2<u8>) -> Result<(), NetworkError> {
        let dof = self.dof();
        if fill.nrows() != dof || fill.ncols() != dof {
            return Err(NetworkError::DimensionMismatch {
                expected: dof,
                actual: fill.nrows().max(fill.ncols()),
            });
        }
        fill.fill(0);
        for cluster in &self.clusters {
            let row = cluster.id - 1;
            fill[[row, row]] = 1;
            for &dof_id in
                cluster.reaction_connectivity.iter().chain(&cluster.dissociation_connectivity)
            {
                fill[[row, dof_id - 1]] = 1;
            }
            if cluster.super_group().is_some() {
                let he_row = cluster.he_momentum_id - 1;
                let v_row = cluster.v_momentum_id - 1;
                fill[[he_row, he_row]] = 1;
                fill[[v_row, v_row]] = 1;
            }
        }
        Ok(())
    }

    fn check_dof(&self, actual: usize) -> Result<(), NetworkError> {
        let expected = self.dof();
        if actual != expected {
            return Err(NetworkError::DimensionMismatch { expected, actual });
        }
        Ok(())
    }
}

// =================================================================================================
// Rate batches
// =================================================================================================

/// Rate constants of one cluster's bookkeeping lists, computed immutably.
struct RateBatch {
    reacting: Vec<f64>,
    combining: Vec<f64>,
    dissociating: Vec<f64>,
    emission: Vec<f64>,
}

fn rate_batch(clusters: &[Cluster], temperature: f64, cluster: &Cluster) -> RateBatch {
    RateBatch {
        reacting: cluster
            .reacting_pairs
            .iter()
            .map(|p| capture_rate(&clusters[p.first], &clusters[p.second]))
            .collect(),
        combining: cluster
            .combining
            .iter()
            .map(|p| capture_rate(cluster, &clusters[p.other]))
            .collect(),
        dissociating: cluster
            .dissociating_pairs
            .iter()
            .map(|p| {
                dissociation_rate(
                    &clusters[p.parent],
                    p.emitted,
                    cluster,
                    &clusters[p.co_emitted],
                    temperature,
                )
            })
            .collect(),
        emission: cluster
            .emission_pairs
            .iter()
            .map(|p| {
                dissociation_rate(
                    cluster,
                    p.emitted,
                    &clusters[p.first],
                    &clusters[p.second],
                    temperature,
                )
            })
            .collect(),
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::SuperGroup;

    #[test]
    fn test_add_assigns_dense_ids() {
        let mut network = ReactionNetwork::default();
        assert_eq!(network.add(Cluster::helium(1)), Ok(1));
        assert_eq!(network.add(Cluster::helium(2)), Ok(2));
        assert_eq!(network.add(Cluster::vacancy(1)), Ok(3));
        assert_eq!(network.size(), 3);
        assert_eq!(network.dof(), 3);
    }

    #[test]
    fn test_duplicate_add_is_rejected() {
        let mut network = ReactionNetwork::default();
        network.add(Cluster::helium(1)).unwrap();
        assert_eq!(
            network.add(Cluster::helium(1)),
            Err(NetworkError::DuplicateSpecies(Composition::helium(1)))
        );
        assert_eq!(network.size(), 1);
    }

    #[test]
    fn test_counters_track_count_and_max_size() {
        let mut network = ReactionNetwork::default();
        network.add(Cluster::helium(1)).unwrap();
        network.add(Cluster::helium(7)).unwrap();
        network.add(Cluster::helium_vacancy(2, 3)).unwrap();
        assert_eq!(network.count_of(Species::He), 2);
        assert_eq!(network.max_observed_size(Species::He), 7);
        assert_eq!(network.max_observed_size(Species::HeV), 5);
        assert_eq!(network.count_of(Species::V), 0);
    }

    #[test]
    fn test_dof_counts_moment_slots() {
        let mut network = ReactionNetwork::default();
        network.add(Cluster::helium(1)).unwrap();
        network.add_super(Cluster::grouped(SuperGroup::new(10.0, 6.0, 4.0, 2.0))).unwrap();
        assert_eq!(network.size(), 2);
        assert_eq!(network.dof(), 4);
    }

    #[test]
    fn test_reinitialize_assigns_trailing_momentum_ids() {
        let mut network = ReactionNetwork::default();
        network.add(Cluster::helium(1)).unwrap();
        network.add_super(Cluster::grouped(SuperGroup::new(10.0, 6.0, 4.0, 2.0))).unwrap();
        network.add(Cluster::vacancy(1)).unwrap();
        network.reinitialize_network();

        let group = network.get_super(&Composition::new(10, 6, 0)).unwrap();
        assert_eq!(group.id(), 2);
        assert_eq!(group.he_momentum_id(), 4);
        assert_eq!(group.v_momentum_id(), 5);
        // Ordinary clusters alias their own id.
        let he = network.get(Species::He, 1).unwrap();
        assert_eq!(he.he_momentum_id(), he.id());
    }

    #[test]
    fn test_remove_rebuilds_indices() {
        let mut network = ReactionNetwork::default();
        network.add(Cluster::helium(1)).unwrap();
        network.add(Cluster::helium(2)).unwrap();
        network.add(Cluster::vacancy(1)).unwrap();

        network.remove(Species::He, &Composition::helium(1));
        assert_eq!(network.size(), 2);
        assert!(network.get(Species::He, 1).is_none());
        assert!(network.get(Species::He, 2).is_some());
        assert_eq!(network.count_of(Species::He), 1);

        // Removing an absent cluster is a no-op.
        network.remove(Species::He, &Composition::helium(9));
        assert_eq!(network.size(), 2);
    }

    #[test]
    fn test_get_super_containing() {
        let mut network = ReactionNetwork::default();
        network.add_super(Cluster::grouped(SuperGroup::new(10.0, 6.0, 4.0, 2.0))).unwrap();
        assert!(network.get_super_containing(&Composition::new(11, 6, 0)).is_some());
        assert!(network.get_super_containing(&Composition::new(30, 6, 0)).is_none());
    }

    #[test]
    fn test_buffer_dimension_mismatch() {
        let mut network = ReactionNetwork::default();
        network.add(Cluster::helium(1)).unwrap();
        network.add(Cluster::helium(2)).unwrap();

        let mut wrong = DVector::zeros(5);
        assert_eq!(
            network.compute_all_fluxes(&mut wrong),
            Err(NetworkError::DimensionMismatch { expected: 2, actual: 5 })
        );
        assert_eq!(
            network.update_concentrations(&wrong.clone()),
            Err(NetworkError::DimensionMismatch { expected: 2, actual: 5 })
        );
    }
}
