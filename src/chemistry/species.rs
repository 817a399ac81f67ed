//! Species tags and compositions
//!
//! A cluster species is identified by its [`Composition`] — the ordered
//! triple of helium, vacancy, and interstitial counts — and carries a
//! [`Species`] tag naming the family it belongs to. The tag set is closed:
//! reaction rules are dispatched by exhaustive `match`, so a new family is a
//! compile-time change, not a runtime registration.

use std::fmt;

// =================================================================================================
// Species (closed family tags)
// =================================================================================================

/// The closed set of cluster families tracked by the network.
///
/// Single-species families hold one defect type; mixed families hold two;
/// `Super` marks a grouped section of mixed clusters represented by moment
/// variables instead of individual tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Species {
    /// Pure helium cluster (He_n)
    He,
    /// Pure vacancy cluster (V_n)
    V,
    /// Pure interstitial cluster (I_n)
    I,
    /// Mixed helium–vacancy cluster (He_a V_b)
    HeV,
    /// Mixed helium–interstitial cluster (He_a I_b)
    HeI,
    /// Grouped helium–vacancy section (moment representation)
    Super,
}

impl Species {
    /// All families, in the order used for per-family bookkeeping.
    pub const ALL: [Species; 6] = [
        Species::He,
        Species::V,
        Species::I,
        Species::HeV,
        Species::HeI,
        Species::Super,
    ];

    /// Dense index for per-family tables.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Species::He => 0,
            Species::V => 1,
            Species::I => 2,
            Species::HeV => 3,
            Species::HeI => 4,
            Species::Super => 5,
        }
    }

    /// True for the single-defect families.
    pub fn is_single(self) -> bool {
        matches!(self, Species::He | Species::V | Species::I)
    }

    /// True for the two-defect families (grouped sections included).
    pub fn is_mixed(self) -> bool {
        matches!(self, Species::HeV | Species::HeI | Species::Super)
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Species::He => "He",
            Species::V => "V",
            Species::I => "I",
            Species::HeV => "HeV",
            Species::HeI => "HeI",
            Species::Super => "Super",
        };
        write!(f, "{}", name)
    }
}

// =================================================================================================
// Composition (exact-lookup key)
// =================================================================================================

/// The (He, V, I) defect counts identifying a species.
///
/// Compositions are globally unique per network and serve as the exact-lookup
/// key of the composition indices. The total size of a cluster is the sum of
/// the three components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Composition {
    /// Number of helium atoms
    pub he: u32,
    /// Number of atomic vacancies
    pub v: u32,
    /// Number of interstitial defects
    pub i: u32,
}

impl Composition {
    /// Create a composition from its three components.
    pub fn new(he: u32, v: u32, i: u32) -> Self {
        Self { he, v, i }
    }

    /// Composition of a pure helium cluster.
    pub fn helium(n: u32) -> Self {
        Self::new(n, 0, 0)
    }

    /// Composition of a pure vacancy cluster.
    pub fn vacancy(n: u32) -> Self {
        Self::new(0, n, 0)
    }

    /// Composition of a pure interstitial cluster.
    pub fn interstitial(n: u32) -> Self {
        Self::new(0, 0, n)
    }

    /// Total cluster size (sum of all components).
    #[inline]
    pub fn total(&self) -> u32 {
        self.he + self.v + self.i
    }

    /// Number of non-zero components.
    ///
    /// One for single-species clusters, two for mixed ones.
    pub fn component_count(&self) -> u32 {
        (self.he > 0) as u32 + (self.v > 0) as u32 + (self.i > 0) as u32
    }

    /// The species family this composition belongs to.
    ///
    /// Grouped sections cannot be told apart from plain HeV by composition
    /// alone; they are tagged explicitly at construction.
    pub fn species(&self) -> Species {
        match (self.he > 0, self.v > 0, self.i > 0) {
            (true, false, false) => Species::He,
            (false, true, false) => Species::V,
            (false, false, true) => Species::I,
            (true, true, false) => Species::HeV,
            (true, false, true) => Species::HeI,
            _ => Species::HeV, // degenerate; constructors reject these shapes
        }
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(He={}, V={}, I={})", self.he, self.v, self.i)
    }
}

// =================================================================================================
// Tests
// =================================================================================================
