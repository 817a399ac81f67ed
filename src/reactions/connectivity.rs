//! Connectivity construction
//!
//! Builds the structural reaction bookkeeping of every cluster from
//! composition algebra over the fully-populated network. The rules are
//! dispatched by species family through exhaustive `match`, so the full
//! reaction chemistry of a family is readable in one place.
//!
//! # Two passes, delta-collected
//!
//! The build runs a reaction pass and then a dissociation pass over every
//! cluster. Most rules write only to the cluster being processed, but a few
//! cross-write: vacancy–interstitial annihilation and partial replacement
//! record the product's reacting pair from the single-defect side so it is
//! recorded exactly once, and grouped sections mirror their combining
//! partners onto the singles they absorb. Cross-writes into an array we are
//! iterating cannot be applied in place, so every rule pushes
//! `(target slot, record)` deltas into a [`ConnectivityBuffer`] and the
//! network applies the whole batch afterwards.
//!
//! # Lookup fallback for grouped sections
//!
//! Mixed-composition lookups go through [`NetworkView::mixed`]: the exact
//! composition index first, then the grouped sections. A hit inside a
//! section yields the section's slot plus the member's moment distances,
//! which land on the pair record and weight the member concentration during
//! flux assembly.

use crate::chemistry::{
    Cluster, CombiningPartner, Composition, DissociatingPair, EmissionPair, ReactingPair, Species,
};
use crate::network::NetworkConfig;
use std::collections::HashMap;

// =================================================================================================
// Network view and delta buffer
// =================================================================================================

/// Read-only lookup surface over a populated network.
///
/// Borrowed from the network for the duration of one build pass.
pub(crate) struct NetworkView<'a> {
    pub clusters: &'a [Cluster],
    pub standard: &'a HashMap<Composition, usize>,
    pub species_slots: &'a [Vec<usize>; 6],
    pub config: &'a NetworkConfig,
}

/// A mixed-composition lookup hit: the owning slot plus the moment distances
/// of the member inside a grouped section (zero for exact hits).
#[derive(Debug, Clone, Copy)]
pub(crate) struct MixedRef {
    pub slot: usize,
    pub he_distance: f64,
    pub v_distance: f64,
}

impl<'a> NetworkView<'a> {
    fn cluster(&self, slot: usize) -> &Cluster {
        &self.clusters[slot]
    }

    fn slots_of(&self, species: Species) -> &[usize] {
        &self.species_slots[species.index()]
    }

    fn single(&self, species: Species, n: u32) -> Option<usize> {
        let comp = match species {
            Species::He => Composition::helium(n),
            Species::V => Composition::vacancy(n),
            Species::I => Composition::interstitial(n),
            _ => return None,
        };
        self.standard.get(&comp).copied()
    }

    /// Look up a composition among standard clusters, falling back to the
    /// grouped section containing it.
    pub(crate) fn mixed(&self, comp: &Composition) -> Option<MixedRef> {
        if let Some(&slot) = self.standard.get(comp) {
            return Some(MixedRef { slot, he_distance: 0.0, v_distance: 0.0 });
        }
        for &slot in self.slots_of(Species::Super) {
            if let Some(group) = self.clusters[slot].super_group() {
                if group.contains(comp) {
                    return Some(MixedRef {
                        slot,
                        he_distance: group.he_distance(comp.he),
                        v_distance: group.v_distance(comp.v),
                    });
                }
            }
        }
        None
    }

    /// The cluster left behind when one defect of `emitted` leaves `comp`.
    ///
    /// A component reaching zero resolves to the remaining pure cluster; the
    /// whole composition vanishing resolves to nothing.
    fn after_emission(&self, comp: &Composition, emitted: Species) -> Option<MixedRef> {
        let mut smaller = *comp;
        match emitted {
            Species::He if smaller.he >= 1 => smaller.he -= 1,
            Species::V if smaller.v >= 1 => smaller.v -= 1,
            Species::I if smaller.i >= 1 => smaller.i -= 1,
            _ => return None,
        }
        if smaller.total() == 0 {
            return None;
        }
        self.mixed(&smaller)
    }
}

/// Delta batch produced by one build pass, keyed by target slot.
#[derive(Default)]
pub(crate) struct ConnectivityBuffer {
    pub reacting: Vec<(usize, ReactingPair)>,
    pub combining: Vec<(usize, CombiningPartner)>,
    pub dissociating: Vec<(usize, DissociatingPair)>,
    pub emission: Vec<(usize, EmissionPair)>,
}

impl ConnectivityBuffer {
    fn reacting(&mut self, target: usize, first: MixedRef, second: MixedRef) {
        let mut pair = ReactingPair::new(first.slot, second.slot);
        pair.first_he_distance = first.he_distance;
        pair.first_v_distance = first.v_distance;
        pair.second_he_distance = second.he_distance;
        pair.second_v_distance = second.v_distance;
        self.reacting.push((target, pair));
    }

    fn combining(&mut self, target: usize, other: MixedRef) {
        let mut partner = CombiningPartner::new(other.slot);
        partner.he_distance = other.he_distance;
        partner.v_distance = other.v_distance;
        self.combining.push((target, partner));
    }

    fn dissociating(&mut self, target: usize, parent: usize, co: usize, emitted: Species) {
        self.dissociating.push((target, DissociatingPair::new(parent, co, emitted)));
    }

    fn emission(&mut self, target: usize, first: usize, second: usize, emitted: Species) {
        self.emission.push((target, EmissionPair::new(first, second, emitted)));
    }
}

fn exact(slot: usize) -> MixedRef {
    MixedRef { slot, he_distance: 0.0, v_distance: 0.0 }
}

// =================================================================================================
// Reaction pass
// =================================================================================================

/// Build the capture-reaction bookkeeping of one cluster.
pub(crate) fn reaction_connectivity(slot: usize, view: &NetworkView, out: &mut ConnectivityBuffer) {
    let cluster = view.cluster(slot);
    match cluster.species() {
        Species::He => helium_reactions(slot, cluster.size(), view, out),
        Species::V => vacancy_reactions(slot, cluster.size(), view, out),
        Species::I => interstitial_reactions(slot, cluster.size(), view, out),
        Species::HeV => hev_reactions(slot, cluster.composition(), view, out),
        Species::HeI => hei_reactions(slot, cluster.composition(), view, out),
        Species::Super => super_reactions(slot, view, out),
    }
}

/// Splitting productions of a single-species cluster: `A_a + A_(n−a) → A_n`
/// for `1 ≤ a ≤ n/2`. The half bound records each unordered pair once.
fn splitting_productions(
    slot: usize,
    species: Species,
    n: u32,
    view: &NetworkView,
    out: &mut ConnectivityBuffer,
) {
    for a in 1..=n / 2 {
        if let (Some(fa), Some(fb)) = (view.single(species, a), view.single(species, n - a)) {
            out.reacting(slot, exact(fa), exact(fb));
        }
    }
}

/// Same-species growth: this + A_m → A_(n+m), bounded by the family ceiling.
fn same_species_growth(
    slot: usize,
    species: Species,
    n: u32,
    ceiling: u32,
    view: &NetworkView,
    out: &mut ConnectivityBuffer,
) {
    for &other in view.slots_of(species) {
        let m = view.cluster(other).size();
        let Some(product) = n.checked_add(m) else { continue };
        if product <= ceiling && view.single(species, product).is_some() {
            out.combining(slot, exact(other));
        }
    }
}

/// Growth of mixed clusters by absorbing this single: for every cluster of
/// `family`, combine when the grown composition exists (section fallback
/// included).
fn mixed_growth(
    slot: usize,
    absorbed: Species,
    n: u32,
    family: Species,
    view: &NetworkView,
    out: &mut ConnectivityBuffer,
) {
    for &other in view.slots_of(family) {
        let mut product = *view.cluster(other).composition();
        match absorbed {
            Species::He => product.he += n,
            Species::V => product.v += n,
            Species::I => product.i += n,
            _ => return,
        }
        if view.mixed(&product).is_some() {
            out.combining(slot, exact(other));
        }
    }
}

fn helium_reactions(slot: usize, n: u32, view: &NetworkView, out: &mut ConnectivityBuffer) {
    splitting_productions(slot, Species::He, n, view, out);
    same_species_growth(slot, Species::He, n, view.config.max_helium_size, view, out);

    // He_n + V_b → HeV(n, b), when the mixed product is tracked
    for &other in view.slots_of(Species::V) {
        let b = view.cluster(other).size();
        if view.mixed(&Composition::new(n, b, 0)).is_some() {
            out.combining(slot, exact(other));
        }
    }
    // He_n + I_b → HeI(n, b)
    for &other in view.slots_of(Species::I) {
        let b = view.cluster(other).size();
        if view.mixed(&Composition::new(n, 0, b)).is_some() {
            out.combining(slot, exact(other));
        }
    }
    // Absorption by mixed clusters
    mixed_growth(slot, Species::He, n, Species::HeV, view, out);
    mixed_growth(slot, Species::He, n, Species::HeI, view, out);
}

fn vacancy_reactions(slot: usize, n: u32, view: &NetworkView, out: &mut ConnectivityBuffer) {
    splitting_productions(slot, Species::V, n, view, out);
    same_species_growth(slot, Species::V, n, view.config.max_vacancy_size, view, out);

    // V_n + He_a → HeV(a, n)
    for &other in view.slots_of(Species::He) {
        let a = view.cluster(other).size();
        if view.mixed(&Composition::new(a, n, 0)).is_some() {
            out.combining(slot, exact(other));
        }
    }
    // V_n + I_m annihilation: loss recorded here, the product pair is
    // recorded once from the interstitial side.
    for &other in view.slots_of(Species::I) {
        let m = view.cluster(other).size();
        if annihilation_product(n, m, view).is_some() || n == m {
            out.combining(slot, exact(other));
        }
    }
    // Absorption by HeV
    mixed_growth(slot, Species::V, n, Species::HeV, view, out);
    // Replacement in HeI: HeI(a,b) + V_n → HeI(a, b−n); the replacing side
    // records the product pair.
    for &other in view.slots_of(Species::HeI) {
        let comp = *view.cluster(other).composition();
        if comp.i < n {
            continue;
        }
        let remainder = Composition::new(comp.he, 0, comp.i - n);
        if let Some(product) = view.mixed(&remainder) {
            out.combining(slot, exact(other));
            out.reacting(product.slot, exact(other), exact(slot));
        }
    }
}

fn interstitial_reactions(slot: usize, n: u32, view: &NetworkView, out: &mut ConnectivityBuffer) {
    splitting_productions(slot, Species::I, n, view, out);
    same_species_growth(slot, Species::I, n, view.config.max_interstitial_size, view, out);

    // I_n + He_a → HeI(a, n)
    for &other in view.slots_of(Species::He) {
        let a = view.cluster(other).size();
        if view.mixed(&Composition::new(a, 0, n)).is_some() {
            out.combining(slot, exact(other));
        }
    }
    // I_n + V_m annihilation. The surviving remainder (if any) gains a
    // reacting pair, recorded exactly once from this side.
    for &other in view.slots_of(Species::V) {
        let m = view.cluster(other).size();
        if let Some(product) = annihilation_product(m, n, view) {
            out.combining(slot, exact(other));
            out.reacting(product, exact(slot), exact(other));
        } else if n == m {
            // Mutual annihilation leaves nothing behind; still a loss.
            out.combining(slot, exact(other));
        }
    }
    // Replacement in HeV: HeV(a,b) + I_n → HeV(a, b−n)
    for &other in view.slots_of(Species::HeV) {
        let comp = *view.cluster(other).composition();
        if comp.v < n {
            continue;
        }
        let remainder = Composition::new(comp.he, comp.v - n, 0);
        if let Some(product) = view.mixed(&remainder) {
            out.combining(slot, exact(other));
            out.reacting(product.slot, exact(other), exact(slot));
        }
    }
    // Absorption by HeI
    mixed_growth(slot, Species::I, n, Species::HeI, view, out);
}

/// Surviving cluster of `V_v + I_i` annihilation, if the remainder is
/// tracked. Equal sizes annihilate completely (no product).
fn annihilation_product(v: u32, i: u32, view: &NetworkView) -> Option<usize> {
    use std::cmp::Ordering;
    match v.cmp(&i) {
        Ordering::Greater => view.single(Species::V, v - i),
        Ordering::Less => view.single(Species::I, i - v),
        Ordering::Equal => None,
    }
}

fn hev_reactions(slot: usize, comp: &Composition, view: &NetworkView, out: &mut ConnectivityBuffer) {
    let (a, b) = (comp.he, comp.v);

    // Productions: HeV(a−x, b) + He_x, HeV(a, b−y) + V_y, and He_a + V_b.
    for &he_slot in view.slots_of(Species::He) {
        let x = view.cluster(he_slot).size();
        if x < a {
            if let Some(producer) = view.mixed(&Composition::new(a - x, b, 0)) {
                out.reacting(slot, producer, exact(he_slot));
            }
        }
    }
    for &v_slot in view.slots_of(Species::V) {
        let y = view.cluster(v_slot).size();
        if y < b {
            if let Some(producer) = view.mixed(&Composition::new(a, b - y, 0)) {
                out.reacting(slot, producer, exact(v_slot));
            }
        }
    }
    if let (Some(he), Some(v)) = (view.single(Species::He, a), view.single(Species::V, b)) {
        out.reacting(slot, exact(he), exact(v));
    }

    // Growth by absorbing singles
    for &other in view.slots_of(Species::He) {
        let x = view.cluster(other).size();
        if view.mixed(&Composition::new(a + x, b, 0)).is_some() {
            out.combining(slot, exact(other));
        }
    }
    for &other in view.slots_of(Species::V) {
        let y = view.cluster(other).size();
        if view.mixed(&Composition::new(a, b + y, 0)).is_some() {
            out.combining(slot, exact(other));
        }
    }
    // Replacement loss to interstitials; the product pair is recorded from
    // the interstitial side.
    for &other in view.slots_of(Species::I) {
        let z = view.cluster(other).size();
        if b >= z && view.mixed(&Composition::new(a, b - z, 0)).is_some() {
            out.combining(slot, exact(other));
        }
    }
}

fn hei_reactions(slot: usize, comp: &Composition, view: &NetworkView, out: &mut ConnectivityBuffer) {
    let (a, b) = (comp.he, comp.i);

    // Productions: HeI(a−x, b) + He_x, HeI(a, b−y) + I_y, and He_a + I_b.
    for &he_slot in view.slots_of(Species::He) {
        let x = view.cluster(he_slot).size();
        if x < a {
            if let Some(producer) = view.mixed(&Composition::new(a - x, 0, b)) {
                out.reacting(slot, producer, exact(he_slot));
            }
        }
    }
    for &i_slot in view.slots_of(Species::I) {
        let y = view.cluster(i_slot).size();
        if y < b {
            if let Some(producer) = view.mixed(&Composition::new(a, 0, b - y)) {
                out.reacting(slot, producer, exact(i_slot));
            }
        }
    }
    if let (Some(he), Some(i)) = (view.single(Species::He, a), view.single(Species::I, b)) {
        out.reacting(slot, exact(he), exact(i));
    }

    // Growth by absorbing singles
    for &other in view.slots_of(Species::He) {
        let x = view.cluster(other).size();
        if view.mixed(&Composition::new(a + x, 0, b)).is_some() {
            out.combining(slot, exact(other));
        }
    }
    for &other in view.slots_of(Species::I) {
        let y = view.cluster(other).size();
        if view.mixed(&Composition::new(a, 0, b + y)).is_some() {
            out.combining(slot, exact(other));
        }
    }
    // Replacement loss to vacancies
    for &other in view.slots_of(Species::V) {
        let z = view.cluster(other).size();
        if b >= z && view.mixed(&Composition::new(a, 0, b - z)).is_some() {
            out.combining(slot, exact(other));
        }
    }
}

/// Grouped sections absorb He_1 and V_1 while the grown member stays inside
/// the section. The absorbed single mirrors the combining loss.
fn super_reactions(slot: usize, view: &NetworkView, out: &mut ConnectivityBuffer) {
    let cluster = view.cluster(slot);
    let Some(group) = cluster.super_group() else { return };
    let comp = *cluster.composition();

    if let Some(he1) = view.single(Species::He, 1) {
        if group.contains(&Composition::new(comp.he + 1, comp.v, 0)) {
            out.combining(slot, exact(he1));
            out.combining(he1, exact(slot));
        }
    }
    if let Some(v1) = view.single(Species::V, 1) {
        if group.contains(&Composition::new(comp.he, comp.v + 1, 0)) {
            out.combining(slot, exact(v1));
            out.combining(v1, exact(slot));
        }
    }
}

// =================================================================================================
// Dissociation pass
// =================================================================================================

/// Build the dissociation bookkeeping of one cluster.
///
/// Every dissociation is double-entried across two passes: the surviving
/// child records a dissociating pair here, and the parent records the
/// matching emission pair in its own pass.
pub(crate) fn dissociation_connectivity(
    slot: usize,
    view: &NetworkView,
    out: &mut ConnectivityBuffer,
) {
    let cluster = view.cluster(slot);
    match cluster.species() {
        species @ (Species::He | Species::V | Species::I) => {
            single_species_dissociations(slot, species, cluster.size(), view, out);
        }
        Species::HeV => {
            let comp = *cluster.composition();
            mixed_dissociations(slot, &comp, Species::V, view, out);
        }
        Species::HeI => {
            let comp = *cluster.composition();
            mixed_dissociations(slot, &comp, Species::I, view, out);
        }
        Species::Super => super_dissociations(slot, view, out),
    }
}

fn single_species_dissociations(
    slot: usize,
    species: Species,
    n: u32,
    view: &NetworkView,
    out: &mut ConnectivityBuffer,
) {
    if n == 1 {
        // The monomer is produced by every larger same-species cluster.
        for &parent in view.slots_of(species) {
            let x = view.cluster(parent).size();
            if x < 2 {
                continue;
            }
            if let Some(co) = view.single(species, x - 1) {
                out.dissociating(slot, parent, co, species);
            }
        }
        // And by every mixed cluster containing the species. The parent is
        // the cluster actually emitting, whichever family it belongs to.
        for family in [Species::HeV, Species::HeI, Species::Super] {
            for &parent in view.slots_of(family) {
                let comp = *view.cluster(parent).composition();
                if let Some(co) = view.after_emission(&comp, species) {
                    out.dissociating(slot, parent, co.slot, species);
                }
            }
        }
    } else if let Some(parent) = view.single(species, n + 1) {
        if let Some(monomer) = view.single(species, 1) {
            out.dissociating(slot, parent, monomer, species);
        }
    }

    // Parent view: A_n → A_(n−1) + A_1 for n > 1.
    if n > 1 {
        if let (Some(monomer), Some(rest)) =
            (view.single(species, 1), view.single(species, n - 1))
        {
            out.emission(slot, monomer, rest, species);
        }
    }
}

/// Dissociations of a two-component mixed cluster; `defect` is the non-He
/// component family.
fn mixed_dissociations(
    slot: usize,
    comp: &Composition,
    defect: Species,
    view: &NetworkView,
    out: &mut ConnectivityBuffer,
) {
    let monomer_of = |species| view.single(species, 1);

    // Child view: a one-larger parent emits a monomer and leaves this.
    let mut he_parent = *comp;
    he_parent.he += 1;
    if let (Some(parent), Some(he1)) = (view.mixed(&he_parent), monomer_of(Species::He)) {
        out.dissociating(slot, parent.slot, he1, Species::He);
    }
    let mut defect_parent = *comp;
    match defect {
        Species::V => defect_parent.v += 1,
        _ => defect_parent.i += 1,
    }
    if let (Some(parent), Some(d1)) = (view.mixed(&defect_parent), monomer_of(defect)) {
        out.dissociating(slot, parent.slot, d1, defect);
    }

    // Parent view: emit a monomer of either component when both products
    // are tracked.
    for emitted in [Species::He, defect] {
        if let (Some(monomer), Some(rest)) =
            (monomer_of(emitted), view.after_emission(comp, emitted))
        {
            out.emission(slot, monomer, rest.slot, emitted);
        }
    }
}

/// Grouped sections emit He_1; the shrunk member may itself sit in a
/// section.
fn super_dissociations(slot: usize, view: &NetworkView, out: &mut ConnectivityBuffer) {
    let comp = *view.cluster(slot).composition();
    if let (Some(he1), Some(rest)) =
        (view.single(Species::He, 1), view.after_emission(&comp, Species::He))
    {
        out.emission(slot, he1, rest.slot, Species::He);
    }
}
