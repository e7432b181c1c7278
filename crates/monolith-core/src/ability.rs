//! Capability roles a structure cell can supply, and the typed key sets a
//! formed structure collects.
//!
//! The set of roles is closed: each variant maps to exactly one provider
//! trait and one slotmap in [`ProviderArena`](crate::providers::ProviderArena).
//! A formed controller holds an [`AbilitySet`] of arena keys; the set is
//! rebuilt from scratch on every successful match and dropped wholesale when
//! the structure breaks, so stale keys never outlive a formation.

use serde::{Deserialize, Serialize};

use crate::id::{EnergyKey, FluidKey, ItemExportKey, MaintenanceKey};

/// The role a structure cell plays when it hosts a provider block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    /// Accepts energy and exposes an input voltage.
    EnergyInput,
    /// Holds fluids the machine may drain.
    FluidImport,
    /// Accepts item output from the machine.
    ItemExport,
    /// Carries maintenance state for the structure.
    MaintenanceHatch,
}

/// A typed reference to one provider registered in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderRef {
    Energy(EnergyKey),
    Fluid(FluidKey),
    Item(ItemExportKey),
    Maintenance(MaintenanceKey),
}

impl ProviderRef {
    pub fn kind(&self) -> AbilityKind {
        match self {
            ProviderRef::Energy(_) => AbilityKind::EnergyInput,
            ProviderRef::Fluid(_) => AbilityKind::FluidImport,
            ProviderRef::Item(_) => AbilityKind::ItemExport,
            ProviderRef::Maintenance(_) => AbilityKind::MaintenanceHatch,
        }
    }
}

/// Provider keys discovered by one structure match, grouped by role.
///
/// Keys appear in discovery order (slab by slab, row by row, column by
/// column), which keeps aggregate operations deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbilitySet {
    pub energy_inputs: Vec<EnergyKey>,
    pub fluid_imports: Vec<FluidKey>,
    pub item_exports: Vec<ItemExportKey>,
    pub maintenance_hatches: Vec<MaintenanceKey>,
}

impl AbilitySet {
    pub fn is_empty(&self) -> bool {
        self.energy_inputs.is_empty()
            && self.fluid_imports.is_empty()
            && self.item_exports.is_empty()
            && self.maintenance_hatches.is_empty()
    }

    /// Number of providers collected for a role.
    pub fn count(&self, kind: AbilityKind) -> usize {
        match kind {
            AbilityKind::EnergyInput => self.energy_inputs.len(),
            AbilityKind::FluidImport => self.fluid_imports.len(),
            AbilityKind::ItemExport => self.item_exports.len(),
            AbilityKind::MaintenanceHatch => self.maintenance_hatches.len(),
        }
    }

    /// The maintenance hatch the controller talks to. Structures with more
    /// than one hatch use the first discovered.
    pub fn maintenance_hatch(&self) -> Option<MaintenanceKey> {
        self.maintenance_hatches.first().copied()
    }

    /// File a discovered provider under its role.
    pub fn push(&mut self, provider: ProviderRef) {
        match provider {
            ProviderRef::Energy(key) => self.energy_inputs.push(key),
            ProviderRef::Fluid(key) => self.fluid_imports.push(key),
            ProviderRef::Item(key) => self.item_exports.push(key),
            ProviderRef::Maintenance(key) => self.maintenance_hatches.push(key),
        }
    }
}
