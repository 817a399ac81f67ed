//! Network builders shared across the integration suites.
//!
//! Physical constants are representative, not fitted: mobile singles with
//! Arrhenius diffusion, immobile larger clusters, finite binding energies
//! wherever a dissociation should actually run.

use defectnet_rs::prelude::*;

/// Give a cluster Arrhenius mobility.
pub fn mobilize(cluster: &mut Cluster, d0: f64, migration_energy: f64) {
    cluster.set_diffusion_factor(d0);
    cluster.set_migration_energy(migration_energy);
}

/// A pure helium chain He_1 ..= He_max, every size mobile, with finite
/// helium binding so the chain also dissociates.
pub fn helium_network(max_size: u32, config: NetworkConfig) -> ReactionNetwork {
    let mut network = ReactionNetwork::new(config);
    for n in 1..=max_size {
        let mut cluster = Cluster::helium(n);
        mobilize(&mut cluster, 2.9e10 / n as f64, 0.13);
        cluster.set_binding_energies(BindingEnergies { he: 1.0, ..Default::default() });
        network.add(cluster).unwrap();
    }
    network
}

/// A small but full-chemistry network: He, V, I chains plus HeV and HeI
/// grids. Covers every reaction family the connectivity pass knows.
pub fn psi_network() -> ReactionNetwork {
    let mut network = ReactionNetwork::new(NetworkConfig::new(4, 4, 2));

    for n in 1..=4 {
        let mut cluster = Cluster::helium(n);
        mobilize(&mut cluster, 1.0e10 / n as f64, 0.13);
        cluster.set_binding_energies(BindingEnergies { he: 1.0, ..Default::default() });
        network.add(cluster).unwrap();
    }
    for n in 1..=4 {
        let mut cluster = Cluster::vacancy(n);
        if n == 1 {
            mobilize(&mut cluster, 5.0e9, 1.3);
        }
        cluster.set_binding_energies(BindingEnergies { v: 1.2, ..Default::default() });
        network.add(cluster).unwrap();
    }
    for n in 1..=2 {
        let mut cluster = Cluster::interstitial(n);
        mobilize(&mut cluster, 1.0e11, 0.01);
        cluster.set_binding_energies(BindingEnergies { i: 1.5, ..Default::default() });
        network.add(cluster).unwrap();
    }
    for he in 1..=2 {
        for v in 1..=2 {
            let mut cluster = Cluster::helium_vacancy(he, v);
            cluster.set_binding_energies(BindingEnergies {
                he: 2.0,
                v: 1.1,
                ..Default::default()
            });
            network.add(cluster).unwrap();
        }
    }
    for he in 1..=2 {
        let mut cluster = Cluster::helium_interstitial(he, 1);
        cluster.set_binding_energies(BindingEnergies { he: 2.2, i: 3.0, ..Default::default() });
        network.add(cluster).unwrap();
    }

    network
}

/// Run the full wiring lifecycle at the given temperature.
pub fn wire(network: &mut ReactionNetwork, temperature: f64) {
    network.build_connectivity();
    network.reinitialize_network();
    network.set_temperature(temperature);
    network.reinitialize_connectivities();
}

/// The cluster a pair slot points at.
pub fn at(network: &ReactionNetwork, slot: usize) -> &Cluster {
    &network.get_all()[slot]
}
