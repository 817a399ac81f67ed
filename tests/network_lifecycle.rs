//! Lifecycle integration tests: population, id assignment, removal,
//! temperature epochs, and concentration exchange.

mod common;

use common::{psi_network, wire};
use defectnet_rs::prelude::*;
use nalgebra::DVector;

#[test]
fn test_population_and_queries() {
    let network = psi_network();

    assert_eq!(network.size(), 16);
    assert_eq!(network.dof(), 16);
    assert_eq!(network.count_of(Species::He), 4);
    assert_eq!(network.count_of(Species::V), 4);
    assert_eq!(network.count_of(Species::I), 2);
    assert_eq!(network.count_of(Species::HeV), 4);
    assert_eq!(network.count_of(Species::HeI), 2);
    assert_eq!(network.max_observed_size(Species::He), 4);
    assert_eq!(network.max_observed_size(Species::HeV), 4);

    assert!(network.get(Species::He, 3).is_some());
    assert!(network.get(Species::He, 9).is_none());
    assert!(network.get_mixed(&Composition::new(2, 2, 0)).is_some());
    assert!(network.get_mixed(&Composition::new(3, 3, 0)).is_none());
    assert!(network.get_super_containing(&Composition::new(2, 2, 0)).is_none());

    // Per-family enumeration preserves insertion order.
    let sizes: Vec<u32> = network.get_all_of(Species::He).map(|c| c.size()).collect();
    assert_eq!(sizes, vec![1, 2, 3, 4]);
}

#[test]
fn test_ids_are_dense_and_stable_after_wiring() {
    let mut network = psi_network();
    wire(&mut network, 1000.0);

    for (position, cluster) in network.get_all().iter().enumerate() {
        assert_eq!(cluster.id(), position + 1);
        // No grouped sections here, so moment ids alias the base id.
        assert_eq!(cluster.he_momentum_id(), cluster.id());
        assert_eq!(cluster.v_momentum_id(), cluster.id());
    }
}

#[test]
fn test_removal_invalidates_then_reinitialize_repairs() {
    let mut network = psi_network();
    let before = network.size();

    network.remove(Species::V, &Composition::vacancy(4));
    assert_eq!(network.size(), before - 1);
    assert!(network.get(Species::V, 4).is_none());
    assert_eq!(network.count_of(Species::V), 3);

    network.build_connectivity();
    network.reinitialize_network();
    for (position, cluster) in network.get_all().iter().enumerate() {
        assert_eq!(cluster.id(), position + 1);
    }
}

#[test]
fn test_temperature_epochs_and_rate_refresh() {
    let mut network = psi_network();
    assert_eq!(network.temperature_epoch(), 0);

    wire(&mut network, 800.0);
    assert_eq!(network.temperature_epoch(), 1);
    assert_eq!(network.temperature(), 800.0);

    network.set_temperature(1200.0);
    assert_eq!(network.temperature_epoch(), 2);

    // Mobile singles diffuse faster at the higher temperature.
    let he1 = network.get(Species::He, 1).unwrap();
    assert!(he1.diffusion_coefficient() > 0.0);
}

#[test]
fn test_structure_is_invariant_under_temperature_changes() {
    let mut network = psi_network();
    wire(&mut network, 600.0);

    let shape: Vec<(usize, usize, usize, usize)> = network
        .get_all()
        .iter()
        .map(|c| {
            (
                c.reacting_pairs().len(),
                c.combining_partners().len(),
                c.dissociating_pairs().len(),
                c.emission_pairs().len(),
            )
        })
        .collect();

    network.set_temperature(1400.0);
    network.set_temperature(300.0);

    let after: Vec<(usize, usize, usize, usize)> = network
        .get_all()
        .iter()
        .map(|c| {
            (
                c.reacting_pairs().len(),
                c.combining_partners().len(),
                c.dissociating_pairs().len(),
                c.emission_pairs().len(),
            )
        })
        .collect();
    assert_eq!(shape, after);
}

#[test]
fn test_effective_subsets_exclude_immobile_pairs() {
    let mut network = psi_network();
    wire(&mut network, 1000.0);

    // V_2 + V_2 → V_4 is wired but both reactants are immobile, so the
    // partner stays out of the effective subset.
    let v2 = network.get(Species::V, 2).unwrap();
    let structural = v2.combining_partners().len();
    let (_, effective, _, _) = v2.effective_counts();
    assert!(structural > effective, "expected an immobile partner to be excluded");
    assert!(effective > 0, "mobile partners must stay effective");
}

#[test]
fn test_concentration_roundtrip_is_exact() {
    let mut network = psi_network();
    wire(&mut network, 1000.0);

    let dof = network.dof();
    let input = DVector::from_fn(dof, |i, _| 1.0e-4 * (i as f64 + 1.0));
    network.update_concentrations(&input).unwrap();

    let mut output = DVector::zeros(dof);
    network.fill_concentrations(&mut output).unwrap();
    assert_eq!(input, output);
}

#[test]
fn test_concentration_roundtrip_covers_moment_slots() {
    let mut network = ReactionNetwork::default();
    network.add(Cluster::helium(1)).unwrap();
    network.add_super(Cluster::grouped(SuperGroup::new(10.0, 6.0, 4.0, 2.0))).unwrap();
    network.reinitialize_network();
    assert_eq!(network.dof(), 4);

    let input = DVector::from_vec(vec![0.1, 0.2, 0.3, 0.4]);
    network.update_concentrations(&input).unwrap();

    let section = network.get_super(&Composition::new(10, 6, 0)).unwrap();
    let group = section.super_group().unwrap();
    assert_eq!(section.concentration(), 0.2);
    assert_eq!(group.he_momentum, 0.3);
    assert_eq!(group.v_momentum, 0.4);

    let mut output = DVector::zeros(4);
    network.fill_concentrations(&mut output).unwrap();
    assert_eq!(input, output);
}

#[test]
fn test_cloned_network_assembles_identical_fluxes_then_diverges() {
    let mut network = psi_network();
    wire(&mut network, 1000.0);
    let dof = network.dof();
    let c = DVector::from_fn(dof, |i, _| 1.0e-4 * (i as f64 + 1.0));

    let mut copy = network.clone();
    assert_eq!(copy.size(), network.size());
    assert_eq!(copy.temperature_epoch(), network.temperature_epoch());

    network.update_concentrations(&c).unwrap();
    copy.update_concentrations(&c).unwrap();
    let mut fluxes = DVector::zeros(dof);
    let mut copy_fluxes = DVector::zeros(dof);
    network.compute_all_fluxes(&mut fluxes).unwrap();
    copy.compute_all_fluxes(&mut copy_fluxes).unwrap();
    assert_eq!(fluxes, copy_fluxes);

    // Independent mutation: reheating the copy leaves the original alone.
    copy.set_temperature(1400.0);
    copy.reinitialize_connectivities();
    copy.compute_all_fluxes(&mut copy_fluxes).unwrap();
    assert_ne!(fluxes, copy_fluxes);
    assert_eq!(network.temperature(), 1000.0);
    let mut again = DVector::zeros(dof);
    network.compute_all_fluxes(&mut again).unwrap();
    assert_eq!(fluxes, again);
}

#[test]
#[should_panic(expected = "connectivity sets are stale")]
fn test_partials_reject_stale_connectivity_sets() {
    let mut network = psi_network();
    wire(&mut network, 1000.0);
    let dof = network.dof();
    let c = DVector::from_fn(dof, |i, _| 1.0e-4 * (i as f64 + 1.0));
    network.update_concentrations(&c).unwrap();

    // A temperature change without the matching set rebuild must not
    // compress through last epoch's sparsity pattern.
    network.set_temperature(1400.0);
    let mut buffer = JacobianBuffer::new(dof);
    let _ = network.compute_all_partials(&mut buffer);
}

#[test]
fn test_disabled_reaction_classes_are_not_wired() {
    let mut network = ReactionNetwork::new(NetworkConfig::new(3, 1, 1).without_dissociations());
    for n in 1..=3 {
        network.add(Cluster::helium(n)).unwrap();
    }
    wire(&mut network, 1000.0);

    for cluster in network.get_all() {
        assert!(cluster.dissociating_pairs().is_empty());
        assert!(cluster.emission_pairs().is_empty());
    }
    // Capture reactions are still there.
    assert!(!network.get(Species::He, 2).unwrap().reacting_pairs().is_empty());

    let mut capture_only = ReactionNetwork::new(NetworkConfig::new(3, 1, 1).without_reactions());
    for n in 1..=3 {
        let mut cluster = Cluster::helium(n);
        cluster.set_binding_energies(BindingEnergies { he: 1.0, ..Default::default() });
        capture_only.add(cluster).unwrap();
    }
    wire(&mut capture_only, 1000.0);
    for cluster in capture_only.get_all() {
        assert!(cluster.reacting_pairs().is_empty());
        assert!(cluster.combining_partners().is_empty());
    }
    assert!(!capture_only.get(Species::He, 2).unwrap().emission_pairs().is_empty());
}
