//! Provider traits, the slotmap arena that owns them, and aggregate
//! operations over key groups.
//!
//! Providers are the seam between the deterministic core and the host world:
//! energy hatches, fluid tanks, item buffers and maintenance hatches all live
//! behind trait objects registered in a [`ProviderArena`]. Controllers never
//! hold providers directly -- they hold typed keys collected at match time,
//! so a broken structure cannot dangle a reference.
//!
//! Aggregate helpers treat a key group as one pool. Every helper takes a
//! `commit` flag: `false` answers "would this succeed" without mutating,
//! `true` applies the change. Simulate-then-commit in the same tick is the
//! contract callers rely on for all-or-nothing resource consumption.

use std::fmt;

use slotmap::SlotMap;

use crate::ability::ProviderRef;
use crate::error::{MachineError, ResourceKind};
use crate::fixed::Fixed64;
use crate::id::{
    BlockTypeId, EnergyKey, FluidKey, FluidTypeId, ItemExportKey, ItemTypeId, MaintenanceKey,
    RecipeId,
};
use crate::pos::Position3;

// ---------------------------------------------------------------------------
// Stacks
// ---------------------------------------------------------------------------

/// A typed quantity of one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ItemStack {
    pub item: ItemTypeId,
    pub count: u32,
}

impl ItemStack {
    pub fn new(item: ItemTypeId, count: u32) -> Self {
        Self { item, count }
    }
}

/// A typed quantity of one fluid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct FluidStack {
    pub fluid: FluidTypeId,
    pub amount: u32,
}

impl FluidStack {
    pub fn new(fluid: FluidTypeId, amount: u32) -> Self {
        Self { fluid, amount }
    }
}

// ---------------------------------------------------------------------------
// Provider traits
// ---------------------------------------------------------------------------

/// Stores energy and advertises the voltage of its supply line.
pub trait EnergyProvider {
    fn stored(&self) -> i64;
    fn capacity(&self) -> i64;
    /// Voltage this input is fed at. Tiering decisions use the highest
    /// voltage across a group, not the sum.
    fn input_voltage(&self) -> i64;
    /// Apply a signed delta, clamped to `[0, capacity]`. Returns the amount
    /// actually applied, with the same sign as `delta`.
    fn change_energy(&mut self, delta: i64) -> i64;
}

/// Holds fluids a machine may drain.
pub trait FluidProvider {
    /// Contents of tank slot `index`, if the slot exists and is non-empty.
    fn contents_at(&self, index: usize) -> Option<FluidStack>;
    /// Drain up to `request.amount` of `request.fluid`, returning the amount
    /// drained. With `commit` false this only reports what would drain.
    fn drain(&mut self, request: FluidStack, commit: bool) -> u32;
}

/// Accepts item output from a machine.
pub trait ItemExport {
    /// Whether the whole stack would fit right now.
    fn can_insert(&self, stack: &ItemStack) -> bool;
    /// Insert as much of the stack as fits. Returns the count left over.
    fn insert(&mut self, stack: ItemStack) -> u32;
}

/// Carries maintenance state for a structure.
///
/// The hatch owns durable storage for the problem bitmask and active-time
/// counter so state survives the structure being broken and re-formed.
pub trait MaintenanceHatch {
    /// Full-auto hatches suppress wear and problem injection entirely.
    fn is_full_auto(&self) -> bool;
    /// Divides the wear-reset interval. Values above one make the interval
    /// elapse sooner. Must be positive.
    fn time_multiplier(&self) -> Fixed64;
    /// Scales recipe duration. `1` when no hatch quality applies.
    fn duration_multiplier(&self) -> Fixed64;
    fn has_stored_data(&self) -> bool;
    /// `(problems bitmask, active time)` captured at the last unform.
    fn read_stored_data(&self) -> (u8, i32);
    fn store_data(&mut self, problems: u8, time_active: i32);
    fn is_taped(&self) -> bool;
    /// Set the duct-tape flag. Returns `true` when the value changed.
    fn set_taped(&mut self, taped: bool) -> bool;
    /// Hatches of sufficient quality start structures problem-free.
    fn starts_without_problems(&self) -> bool;
}

/// Recipe resolution for machines that run map-driven recipes.
///
/// The mining recipe is looked up with an empty input list; a miner that
/// finds no recipe for a cell still consumes its resources and advances.
pub trait RecipeLookup {
    /// Resolve and (when `commit`) consume a recipe for the given inputs.
    fn try_consume(&mut self, inputs: &[ItemStack], commit: bool) -> Option<RecipeId>;
    /// Drops produced by mining one cell of `block` under `recipe`.
    fn cell_yield(
        &self,
        recipe: RecipeId,
        block: BlockTypeId,
        fortune: u32,
        silk_touch: bool,
    ) -> Vec<ItemStack>;
}

/// Read access to the host world, scoped to what structure matching needs.
pub trait WorldView {
    fn block_at(&self, pos: Position3) -> BlockTypeId;
    /// Provider registered at `pos`, if the block there hosts one.
    fn provider_at(&self, pos: Position3) -> Option<ProviderRef>;
}

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

/// Owns every provider in a world, one slotmap per role.
///
/// Keys are handed out at registration and collected into
/// [`AbilitySet`](crate::ability::AbilitySet)s at match time. Removing a
/// provider invalidates its key; lookups through stale keys return `None`
/// and aggregate operations surface that as a configuration error instead
/// of panicking.
#[derive(Default)]
pub struct ProviderArena {
    pub energy: SlotMap<EnergyKey, Box<dyn EnergyProvider>>,
    pub fluids: SlotMap<FluidKey, Box<dyn FluidProvider>>,
    pub items: SlotMap<ItemExportKey, Box<dyn ItemExport>>,
    pub maintenance: SlotMap<MaintenanceKey, Box<dyn MaintenanceHatch>>,
}

impl ProviderArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_energy(&mut self, provider: Box<dyn EnergyProvider>) -> EnergyKey {
        self.energy.insert(provider)
    }

    pub fn add_fluid(&mut self, provider: Box<dyn FluidProvider>) -> FluidKey {
        self.fluids.insert(provider)
    }

    pub fn add_item_export(&mut self, provider: Box<dyn ItemExport>) -> ItemExportKey {
        self.items.insert(provider)
    }

    pub fn add_maintenance(&mut self, provider: Box<dyn MaintenanceHatch>) -> MaintenanceKey {
        self.maintenance.insert(provider)
    }

    pub fn maintenance_mut(&mut self, key: MaintenanceKey) -> Option<&mut dyn MaintenanceHatch> {
        match self.maintenance.get_mut(key) {
            Some(b) => Some(b.as_mut()),
            None => None,
        }
    }
}

impl fmt::Debug for ProviderArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderArena")
            .field("energy", &self.energy.len())
            .field("fluids", &self.fluids.len())
            .field("items", &self.items.len())
            .field("maintenance", &self.maintenance.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Aggregate operations
// ---------------------------------------------------------------------------

/// Total energy stored across the group.
pub fn energy_stored(arena: &ProviderArena, group: &[EnergyKey]) -> i64 {
    group
        .iter()
        .filter_map(|key| arena.energy.get(*key))
        .map(|p| p.stored())
        .sum()
}

/// Total energy capacity across the group.
pub fn energy_capacity(arena: &ProviderArena, group: &[EnergyKey]) -> i64 {
    group
        .iter()
        .filter_map(|key| arena.energy.get(*key))
        .map(|p| p.capacity())
        .sum()
}

/// Highest single input voltage across the group. Parallel hatches of the
/// same tier do not add up to a higher tier.
pub fn supplied_voltage(arena: &ProviderArena, group: &[EnergyKey]) -> i64 {
    group
        .iter()
        .filter_map(|key| arena.energy.get(*key))
        .map(|p| p.input_voltage())
        .max()
        .unwrap_or(0)
}

/// Drain `amount` of energy from the group, front to back.
///
/// Succeeds only when the pooled stored energy covers the full amount;
/// partial drains never happen. With `commit` false nothing is mutated.
pub fn drain_energy(
    arena: &mut ProviderArena,
    group: &[EnergyKey],
    amount: i64,
    commit: bool,
) -> Result<(), MachineError> {
    for key in group {
        if !arena.energy.contains_key(*key) {
            return Err(MachineError::ConfigurationInconsistent {
                detail: "energy group references a removed provider".into(),
            });
        }
    }
    let have = energy_stored(arena, group);
    if have - amount < 0 {
        return Err(MachineError::ResourceInsufficient {
            kind: ResourceKind::Energy,
            need: amount,
            have,
        });
    }
    if commit {
        let mut remaining = amount;
        for key in group {
            if remaining == 0 {
                break;
            }
            let provider = &mut arena.energy[*key];
            let take = remaining.min(provider.stored());
            let applied = provider.change_energy(-take);
            remaining += applied;
        }
    }
    Ok(())
}

/// Drain `request` from the group, front to back, exact fluid type only.
///
/// All-or-nothing across the whole group: the request succeeds only when the
/// pooled amount of the requested fluid covers it.
pub fn drain_fluid(
    arena: &mut ProviderArena,
    group: &[FluidKey],
    request: FluidStack,
    commit: bool,
) -> Result<(), MachineError> {
    for key in group {
        if !arena.fluids.contains_key(*key) {
            return Err(MachineError::ConfigurationInconsistent {
                detail: "fluid group references a removed provider".into(),
            });
        }
    }
    let mut available = 0u64;
    for key in group {
        let probe = FluidStack::new(request.fluid, request.amount);
        available += u64::from(arena.fluids[*key].drain(probe, false));
        if available >= u64::from(request.amount) {
            break;
        }
    }
    if available < u64::from(request.amount) {
        return Err(MachineError::ResourceInsufficient {
            kind: ResourceKind::Fluid,
            need: i64::from(request.amount),
            have: available as i64,
        });
    }
    if commit {
        let mut remaining = request.amount;
        for key in group {
            if remaining == 0 {
                break;
            }
            let drained = arena.fluids[*key].drain(FluidStack::new(request.fluid, remaining), true);
            remaining -= drained;
        }
    }
    Ok(())
}

/// Whether every stack fits somewhere in the export group.
///
/// Checked stack by stack; a stack fits when at least one export accepts it
/// whole. Stacks are not split across the check.
pub fn can_insert_all(
    arena: &ProviderArena,
    group: &[ItemExportKey],
    stacks: &[ItemStack],
) -> bool {
    stacks.iter().all(|stack| {
        group
            .iter()
            .filter_map(|key| arena.items.get(*key))
            .any(|p| p.can_insert(stack))
    })
}

/// Insert stacks into the group, spilling each stack's remainder to the next
/// export. Returns the total count that fit nowhere.
pub fn insert_all(arena: &mut ProviderArena, group: &[ItemExportKey], stacks: &[ItemStack]) -> u32 {
    let mut lost = 0u32;
    for stack in stacks {
        let mut rest = *stack;
        for key in group {
            if rest.count == 0 {
                break;
            }
            if let Some(provider) = arena.items.get_mut(*key) {
                rest.count = provider.insert(rest);
            }
        }
        lost += rest.count;
    }
    lost
}
