//! Network configuration
//!
//! A typed, validated configuration struct. Per-family size ceilings bound
//! same-species growth during connectivity construction; the two toggles
//! switch whole reaction classes off for diagnostic runs (a network with
//! dissociations disabled evolves by capture only).
//!
//! Ceilings bound which reactions are *wired*, not which clusters may be
//! inserted; population is the loader's business.

/// Construction-time settings of a reaction network.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Largest pure helium cluster same-species growth may produce
    pub max_helium_size: u32,
    /// Largest pure vacancy cluster same-species growth may produce
    pub max_vacancy_size: u32,
    /// Largest pure interstitial cluster same-species growth may produce
    pub max_interstitial_size: u32,
    /// Wire capture reactions during connectivity construction
    pub reactions_enabled: bool,
    /// Wire dissociation reactions during connectivity construction
    pub dissociations_enabled: bool,
}

impl Default for NetworkConfig {
    /// Unbounded growth with every reaction class enabled.
    fn default() -> Self {
        Self {
            max_helium_size: u32::MAX,
            max_vacancy_size: u32::MAX,
            max_interstitial_size: u32::MAX,
            reactions_enabled: true,
            dissociations_enabled: true,
        }
    }
}

impl NetworkConfig {
    /// Create a configuration with explicit per-family ceilings.
    ///
    /// # Panics
    ///
    /// Panics when any ceiling is zero; a family whose largest cluster is
    /// size 0 cannot exist.
    pub fn new(max_helium_size: u32, max_vacancy_size: u32, max_interstitial_size: u32) -> Self {
        assert!(
            max_helium_size >= 1 && max_vacancy_size >= 1 && max_interstitial_size >= 1,
            "size ceilings must be at least 1, got He={}, V={}, I={}",
            max_helium_size,
            max_vacancy_size,
            max_interstitial_size
        );
        Self {
            max_helium_size,
            max_vacancy_size,
            max_interstitial_size,
            ..Self::default()
        }
    }

    /// Disable capture reactions.
    pub fn without_reactions(mut self) -> Self {
        self.reactions_enabled = false;
        self
    }

    /// Disable dissociation reactions.
    pub fn without_dissociations(mut self) -> Self {
        self.dissociations_enabled = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unbounded_and_enabled() {
        let config = NetworkConfig::default();
        assert_eq!(config.max_helium_size, u32::MAX);
        assert!(config.reactions_enabled);
        assert!(config.dissociations_enabled);
    }

    #[test]
    fn test_builder_toggles() {
        let config = NetworkConfig::new(8, 10, 4).without_dissociations();
        assert_eq!(config.max_helium_size, 8);
        assert!(config.reactions_enabled);
        assert!(!config.dissociations_enabled);
    }

    #[test]
    #[should_panic(expected = "size ceilings must be at least 1")]
    fn test_zero_ceiling_panics() {
        NetworkConfig::new(8, 0, 4);
    }
}
