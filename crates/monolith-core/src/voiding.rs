//! Output-voiding policy: what excess output gets discarded instead of
//! stalling the machine.

use serde::{Deserialize, Serialize};

use crate::config::ControllerOptions;

/// The four voiding policies, in operator-cycle order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VoidingMode {
    #[default]
    None,
    Items,
    Fluids,
    Both,
}

impl VoidingMode {
    pub const ALL: [VoidingMode; 4] = [
        VoidingMode::None,
        VoidingMode::Items,
        VoidingMode::Fluids,
        VoidingMode::Both,
    ];

    /// Persisted ordinal.
    pub fn ordinal(self) -> i32 {
        match self {
            VoidingMode::None => 0,
            VoidingMode::Items => 1,
            VoidingMode::Fluids => 2,
            VoidingMode::Both => 3,
        }
    }

    /// Ordinal to mode. Anything outside the table reads as `None`; old or
    /// damaged saves must not be fatal.
    pub fn from_ordinal(ordinal: i32) -> VoidingMode {
        match ordinal {
            1 => VoidingMode::Items,
            2 => VoidingMode::Fluids,
            3 => VoidingMode::Both,
            _ => VoidingMode::None,
        }
    }

    pub fn voids_items(self) -> bool {
        matches!(self, VoidingMode::Items | VoidingMode::Both)
    }

    pub fn voids_fluids(self) -> bool {
        matches!(self, VoidingMode::Fluids | VoidingMode::Both)
    }

    /// Next mode in the operator cycle.
    pub fn next(self) -> VoidingMode {
        match self {
            VoidingMode::None => VoidingMode::Items,
            VoidingMode::Items => VoidingMode::Fluids,
            VoidingMode::Fluids => VoidingMode::Both,
            VoidingMode::Both => VoidingMode::None,
        }
    }
}

/// The mode plus its cached derived booleans and construction-time
/// infinite-sink overrides.
///
/// The booleans are redundant with the enum and recomputed on every mode
/// change; they exist because they are persisted and synced as separate
/// fields. The sink overrides are set once at construction and never
/// cleared, for machine types that always discard overflow without showing
/// a voiding toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoidingConfig {
    mode: VoidingMode,
    voiding_items: bool,
    voiding_fluids: bool,
    item_infinite_sink: bool,
    fluid_infinite_sink: bool,
}

impl VoidingConfig {
    pub fn new(options: &ControllerOptions) -> Self {
        Self {
            mode: VoidingMode::None,
            voiding_items: false,
            voiding_fluids: false,
            item_infinite_sink: options.item_infinite_sink,
            fluid_infinite_sink: options.fluid_infinite_sink,
        }
    }

    pub fn mode(&self) -> VoidingMode {
        self.mode
    }

    /// Set the mode and recompute both derived booleans.
    pub fn set_mode(&mut self, mode: VoidingMode) {
        self.mode = mode;
        self.voiding_items = mode.voids_items();
        self.voiding_fluids = mode.voids_fluids();
    }

    /// Derived boolean, as persisted and synced.
    pub fn voiding_items(&self) -> bool {
        self.voiding_items
    }

    /// Derived boolean, as persisted and synced.
    pub fn voiding_fluids(&self) -> bool {
        self.voiding_fluids
    }

    /// Whether item overflow may be discarded right now.
    pub fn can_void_items(&self) -> bool {
        self.voiding_items || self.item_infinite_sink
    }

    /// Whether fluid overflow may be discarded right now.
    pub fn can_void_fluids(&self) -> bool {
        self.voiding_fluids || self.fluid_infinite_sink
    }

    /// Restore from a persisted ordinal. The derived booleans are recomputed
    /// from the enum, so saves whose redundant booleans disagree resolve
    /// toward the mode.
    pub fn restore(&mut self, mode_ordinal: i32) {
        self.set_mode(VoidingMode::from_ordinal(mode_ordinal));
    }
}
