//! Common utilities for integration tests
#![allow(dead_code)]

pub mod networks;

// Re-export commonly used items
pub use networks::{at, helium_network, mobilize, psi_network, wire};
