//! Machine catalog: resolves raw schema data into runnable machine
//! definitions with built structure templates and miner parameters.

use std::collections::HashMap;
use std::path::Path;

use monolith_core::ability::AbilityKind;
use monolith_core::id::{BlockTypeId, FluidTypeId};
use monolith_core::structure::{CellPredicate, StructureTemplate};
use monolith_miner::logic::CHUNK_SIZE;
use monolith_miner::machine::MinerSpec;

use crate::loader::{
    CatalogError, check_duplicate, deserialize_list, require_data_file, resolve_name,
};
use crate::schema::{AbilityData, CheckData, MachineData, PredicateData, StructureLayoutData};

// ===========================================================================
// Registries
// ===========================================================================

/// Name registries supplied by the embedding game. Data files refer to
/// blocks and fluids by name; the catalog resolves those names into ids
/// before any machine runs.
#[derive(Debug, Clone, Default)]
pub struct Registries {
    pub blocks: HashMap<String, BlockTypeId>,
    pub fluids: HashMap<String, FluidTypeId>,
}

// ===========================================================================
// Catalog
// ===========================================================================

/// A fully resolved machine variant, ready to construct a live machine.
#[derive(Debug, Clone)]
pub struct MachineDefinition {
    pub name: String,
    pub spec: MinerSpec,
    pub template: StructureTemplate,
}

/// All machine definitions loaded from a data directory, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct MachineCatalog {
    machines: HashMap<String, MachineDefinition>,
}

impl MachineCatalog {
    pub fn get(&self, name: &str) -> Option<&MachineDefinition> {
        self.machines.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.machines.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }
}

// ===========================================================================
// Loading
// ===========================================================================

/// Load the machine catalog from a data directory. Expects a `machines`
/// data file (RON, TOML, or JSON) and resolves every name reference
/// against the supplied registries.
pub fn load_machine_catalog(
    dir: &Path,
    registries: &Registries,
) -> Result<MachineCatalog, CatalogError> {
    let path = require_data_file(dir, "machines")?;
    let entries: Vec<MachineData> = deserialize_list(&path, "machines")?;

    let mut machines = HashMap::new();
    for data in entries {
        check_duplicate(&machines, &data.name, &path)?;
        let definition = resolve_machine(&data, &path, registries)?;
        machines.insert(data.name, definition);
    }

    Ok(MachineCatalog { machines })
}

fn resolve_machine(
    data: &MachineData,
    file: &Path,
    registries: &Registries,
) -> Result<MachineDefinition, CatalogError> {
    let drilling_fluid = *resolve_name(&registries.fluids, &data.drilling_fluid, file, "fluid")?;
    let template = build_template(&data.structure, file, &data.name, registries)?;

    // The widest selectable diameter is given in chunks; the radius the
    // operator starts from is half of it in blocks.
    let maximum_radius = data.max_chunk_diameter * CHUNK_SIZE / 2;

    Ok(MachineDefinition {
        name: data.name.clone(),
        spec: MinerSpec {
            rated_tier: data.rated_tier,
            energy_per_tick: data.energy_per_tick,
            drilling_fluid,
            fluid_per_tick: data.fluid_per_tick,
            maximum_radius,
            fortune: data.fortune,
        },
        template,
    })
}

fn build_template(
    layout: &StructureLayoutData,
    file: &Path,
    machine: &str,
    registries: &Registries,
) -> Result<StructureTemplate, CatalogError> {
    let mut builder = StructureTemplate::builder();

    for slab in &layout.slabs {
        let rows: Vec<&str> = slab.iter().map(String::as_str).collect();
        builder = builder.slab(&rows);
    }

    for symbol in &layout.symbols {
        let predicates = symbol
            .predicates
            .iter()
            .map(|p| resolve_predicate(p, file, registries))
            .collect::<Result<Vec<_>, _>>()?;
        builder = builder.cell(symbol.symbol, predicates);
    }

    builder.build().map_err(|source| CatalogError::Template {
        file: file.to_path_buf(),
        machine: machine.to_string(),
        source,
    })
}

fn resolve_predicate(
    data: &PredicateData,
    file: &Path,
    registries: &Registries,
) -> Result<CellPredicate, CatalogError> {
    let mut predicate = match &data.check {
        CheckData::Controller => CellPredicate::controller(),
        CheckData::Block(name) => {
            CellPredicate::block(*resolve_name(&registries.blocks, name, file, "block")?)
        }
        CheckData::AnyOf(names) => {
            let ids = names
                .iter()
                .map(|n| resolve_name(&registries.blocks, n, file, "block").map(|id| *id))
                .collect::<Result<Vec<_>, _>>()?;
            CellPredicate::any_of(ids)
        }
        CheckData::Ability(ability) => CellPredicate::ability((*ability).into()),
        CheckData::Air => CellPredicate::air(),
        CheckData::Anything => CellPredicate::anything(),
    };

    if let Some(n) = data.min_global {
        predicate = predicate.with_min_global(n);
    }
    if let Some(n) = data.max_global {
        predicate = predicate.with_max_global(n);
    }
    if let Some(n) = data.max_per_slab {
        predicate = predicate.with_max_per_slab(n);
    }
    if let Some(key) = &data.collect {
        predicate = predicate.collecting(key);
    }

    Ok(predicate)
}

impl From<AbilityData> for AbilityKind {
    fn from(data: AbilityData) -> Self {
        match data {
            AbilityData::EnergyInput => AbilityKind::EnergyInput,
            AbilityData::FluidImport => AbilityKind::FluidImport,
            AbilityData::ItemExport => AbilityKind::ItemExport,
            AbilityData::MaintenanceHatch => AbilityKind::MaintenanceHatch,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
