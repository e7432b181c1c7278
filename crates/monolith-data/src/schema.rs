//! Serde data-file structs for machine definitions.
//!
//! These structs define the on-disk format for multiblock machine variants:
//! their tier and running costs plus the structure layout they must be built
//! in. They are deserialized from RON, JSON, or TOML data files and then
//! resolved into engine types by the catalog loader.

use serde::Deserialize;

// ===========================================================================
// Machines
// ===========================================================================

/// A machine variant definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct MachineData {
    pub name: String,
    /// Power tier the machine is built for.
    pub rated_tier: u32,
    /// Energy cost per working tick at the rated tier.
    pub energy_per_tick: i64,
    /// Fluid the machine consumes, by registry name.
    pub drilling_fluid: String,
    /// Fluid cost per working tick before overclock scaling.
    pub fluid_per_tick: u32,
    /// Widest selectable working area, in chunks across. The maximum
    /// radius in blocks is half of this times the chunk size.
    pub max_chunk_diameter: i32,
    #[serde(default)]
    pub fortune: u32,
    pub structure: StructureLayoutData,
}

// ===========================================================================
// Structure layout
// ===========================================================================

/// The structure layout for a machine: slabs of symbol rows plus the
/// predicate bindings for each symbol.
#[derive(Debug, Clone, Deserialize)]
pub struct StructureLayoutData {
    /// Front-to-back slabs; each slab is a list of rows, top first.
    pub slabs: Vec<Vec<String>>,
    pub symbols: Vec<SymbolData>,
}

/// One symbol binding: the layout character and its ordered predicate
/// alternatives.
#[derive(Debug, Clone, Deserialize)]
pub struct SymbolData {
    pub symbol: char,
    pub predicates: Vec<PredicateData>,
}

/// One predicate alternative with optional counting limits.
#[derive(Debug, Clone, Deserialize)]
pub struct PredicateData {
    pub check: CheckData,
    #[serde(default)]
    pub min_global: Option<u32>,
    #[serde(default)]
    pub max_global: Option<u32>,
    #[serde(default)]
    pub max_per_slab: Option<u32>,
    /// Match-context key to record matched positions under.
    #[serde(default)]
    pub collect: Option<String>,
}

/// What a cell may contain. Block names are resolved against the block
/// registry by the loader.
#[derive(Debug, Clone, Deserialize)]
pub enum CheckData {
    Controller,
    Block(String),
    AnyOf(Vec<String>),
    Ability(AbilityData),
    Air,
    Anything,
}

/// Ability roles a cell may require.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbilityData {
    EnergyInput,
    FluidImport,
    ItemExport,
    MaintenanceHatch,
}

// ===========================================================================
// TOML wrappers (TOML does not support top-level arrays)
// ===========================================================================

/// Wrapper for a list of machines in TOML format.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlMachines {
    pub machines: Vec<MachineData>,
}

// ===========================================================================
// Tests
// ===========================================================================
