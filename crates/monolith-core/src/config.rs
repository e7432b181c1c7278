//! Explicit configuration threaded into constructors.
//!
//! Nothing here is read from ambient global state; hosts build these values
//! and pass them down so the core stays testable without singletons.

use serde::{Deserialize, Serialize};

/// Simulation-wide switches shared by every controller in a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Master switch for the maintenance model. When off, every controller
    /// reports all problems fixed and never accumulates wear.
    pub maintenance_enabled: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            maintenance_enabled: true,
        }
    }
}

/// Per-controller construction options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerOptions {
    /// Whether this machine type participates in maintenance at all.
    /// Types that opt out always read as problem-free.
    pub has_maintenance_mechanics: bool,
    /// Always discard item overflow, regardless of the voiding mode. Set at
    /// construction and never cleared.
    pub item_infinite_sink: bool,
    /// Always discard fluid overflow, regardless of the voiding mode.
    pub fluid_infinite_sink: bool,
    /// Seed for the controller-owned RNG driving problem injection.
    pub rng_seed: u64,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            has_maintenance_mechanics: true,
            item_infinite_sink: false,
            fluid_infinite_sink: false,
            rng_seed: 0,
        }
    }
}
