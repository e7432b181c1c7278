//! Shared test helpers for unit tests, integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::ability::{AbilityKind, ProviderRef};
use crate::controller::VARIANT_BLOCKS_KEY;
use crate::fixed::Fixed64;
use crate::id::*;
use crate::pos::{Orientation, Position3};
use crate::providers::{
    EnergyProvider, FluidProvider, FluidStack, ItemExport, ItemStack, MaintenanceHatch,
    ProviderArena, RecipeLookup, WorldView,
};
use crate::structure::{CellPredicate, StructureTemplate};

// ===========================================================================
// Fixed-point helper
// ===========================================================================

pub fn fixed(v: f64) -> Fixed64 {
    Fixed64::from_num(v)
}

// ===========================================================================
// Block / item / fluid constructors
// ===========================================================================

pub fn steel_casing() -> BlockTypeId {
    BlockTypeId(1)
}
pub fn hatch_block() -> BlockTypeId {
    BlockTypeId(2)
}
pub fn ore_block() -> BlockTypeId {
    BlockTypeId(3)
}
pub fn variant_casing() -> BlockTypeId {
    BlockTypeId(4)
}

pub fn raw_ore() -> ItemTypeId {
    ItemTypeId(10)
}
pub fn silk_ore() -> ItemTypeId {
    ItemTypeId(11)
}

pub fn drilling_fluid() -> FluidTypeId {
    FluidTypeId(1)
}

// ===========================================================================
// World stub
// ===========================================================================

/// Sparse block/provider map implementing [`WorldView`]. Unset positions
/// read as air.
#[derive(Debug, Clone, Default)]
pub struct TestWorld {
    blocks: HashMap<Position3, BlockTypeId>,
    providers: HashMap<Position3, ProviderRef>,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_block(&mut self, pos: Position3, block: BlockTypeId) {
        if block == AIR {
            self.blocks.remove(&pos);
        } else {
            self.blocks.insert(pos, block);
        }
    }

    /// Place a provider-hosting block: sets the block and registers the
    /// provider reference at the same position.
    pub fn place_provider(&mut self, pos: Position3, block: BlockTypeId, provider: ProviderRef) {
        self.set_block(pos, block);
        self.providers.insert(pos, provider);
    }
}

impl WorldView for TestWorld {
    fn block_at(&self, pos: Position3) -> BlockTypeId {
        self.blocks.get(&pos).copied().unwrap_or(AIR)
    }

    fn provider_at(&self, pos: Position3) -> Option<ProviderRef> {
        self.providers.get(&pos).copied()
    }
}

// ===========================================================================
// Provider stubs
// ===========================================================================

/// Energy store with a fixed input voltage.
#[derive(Debug, Clone)]
pub struct TestEnergyProvider {
    stored: i64,
    capacity: i64,
    voltage: i64,
}

impl TestEnergyProvider {
    pub fn new(stored: i64, capacity: i64, voltage: i64) -> Self {
        Self {
            stored,
            capacity,
            voltage,
        }
    }
}

impl EnergyProvider for TestEnergyProvider {
    fn stored(&self) -> i64 {
        self.stored
    }

    fn capacity(&self) -> i64 {
        self.capacity
    }

    fn input_voltage(&self) -> i64 {
        self.voltage
    }

    fn change_energy(&mut self, delta: i64) -> i64 {
        let next = (self.stored + delta).clamp(0, self.capacity);
        let applied = next - self.stored;
        self.stored = next;
        applied
    }
}

/// Single-slot fluid tank.
#[derive(Debug, Clone)]
pub struct TestFluidTank {
    fluid: FluidTypeId,
    amount: u32,
    capacity: u32,
}

impl TestFluidTank {
    pub fn new(fluid: FluidTypeId, amount: u32, capacity: u32) -> Self {
        Self {
            fluid,
            amount,
            capacity,
        }
    }

    pub fn amount(&self) -> u32 {
        self.amount
    }

    pub fn refill(&mut self, amount: u32) {
        self.amount = (self.amount + amount).min(self.capacity);
    }
}

impl FluidProvider for TestFluidTank {
    fn contents_at(&self, index: usize) -> Option<FluidStack> {
        if index == 0 && self.amount > 0 {
            Some(FluidStack::new(self.fluid, self.amount))
        } else {
            None
        }
    }

    fn drain(&mut self, request: FluidStack, commit: bool) -> u32 {
        if request.fluid != self.fluid {
            return 0;
        }
        let taken = request.amount.min(self.amount);
        if commit {
            self.amount -= taken;
        }
        taken
    }
}

#[derive(Debug, Default)]
struct ItemBufferInner {
    counts: BTreeMap<ItemTypeId, u32>,
    max_total: u32,
}

impl ItemBufferInner {
    fn total(&self) -> u32 {
        self.counts.values().sum()
    }
}

/// Item sink with an optional total-count ceiling. Clones share the same
/// storage, so a test can keep a handle to a buffer it boxed into the
/// arena and inspect what the machine deposited.
#[derive(Debug, Clone)]
pub struct TestItemBuffer {
    inner: Rc<RefCell<ItemBufferInner>>,
}

impl TestItemBuffer {
    /// Effectively unbounded buffer.
    pub fn new() -> Self {
        Self::with_limit(u32::MAX)
    }

    pub fn with_limit(max_total: u32) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ItemBufferInner {
                counts: BTreeMap::new(),
                max_total,
            })),
        }
    }

    pub fn total(&self) -> u32 {
        self.inner.borrow().total()
    }

    pub fn count_of(&self, item: ItemTypeId) -> u32 {
        self.inner.borrow().counts.get(&item).copied().unwrap_or(0)
    }
}

impl Default for TestItemBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemExport for TestItemBuffer {
    fn can_insert(&self, stack: &ItemStack) -> bool {
        let inner = self.inner.borrow();
        inner.total().saturating_add(stack.count) <= inner.max_total
    }

    fn insert(&mut self, stack: ItemStack) -> u32 {
        let mut inner = self.inner.borrow_mut();
        let space = inner.max_total - inner.total();
        let taken = stack.count.min(space);
        if taken > 0 {
            *inner.counts.entry(stack.item).or_insert(0) += taken;
        }
        stack.count - taken
    }
}

/// Maintenance hatch with builder-style configuration.
#[derive(Debug, Clone)]
pub struct TestMaintenanceHatch {
    full_auto: bool,
    time_mult: Fixed64,
    duration_mult: Fixed64,
    stored: Option<(u8, i32)>,
    taped_flag: bool,
    starts_clean: bool,
}

impl TestMaintenanceHatch {
    pub fn new() -> Self {
        Self {
            full_auto: false,
            time_mult: fixed(1.0),
            duration_mult: fixed(1.0),
            stored: None,
            taped_flag: false,
            starts_clean: false,
        }
    }

    pub fn full_auto(mut self) -> Self {
        self.full_auto = true;
        self
    }

    pub fn with_time_multiplier(mut self, mult: f64) -> Self {
        self.time_mult = fixed(mult);
        self
    }

    pub fn with_duration_multiplier(mut self, mult: f64) -> Self {
        self.duration_mult = fixed(mult);
        self
    }

    pub fn taped(mut self) -> Self {
        self.taped_flag = true;
        self
    }

    pub fn starts_clean(mut self) -> Self {
        self.starts_clean = true;
        self
    }
}

impl Default for TestMaintenanceHatch {
    fn default() -> Self {
        Self::new()
    }
}

impl MaintenanceHatch for TestMaintenanceHatch {
    fn is_full_auto(&self) -> bool {
        self.full_auto
    }

    fn time_multiplier(&self) -> Fixed64 {
        self.time_mult
    }

    fn duration_multiplier(&self) -> Fixed64 {
        self.duration_mult
    }

    fn has_stored_data(&self) -> bool {
        self.stored.is_some()
    }

    fn read_stored_data(&self) -> (u8, i32) {
        self.stored.unwrap_or((0, 0))
    }

    fn store_data(&mut self, problems: u8, time_active: i32) {
        self.stored = Some((problems, time_active));
    }

    fn is_taped(&self) -> bool {
        self.taped_flag
    }

    fn set_taped(&mut self, taped: bool) -> bool {
        let changed = self.taped_flag != taped;
        self.taped_flag = taped;
        changed
    }

    fn starts_without_problems(&self) -> bool {
        self.starts_clean
    }
}

/// Recipe source backed by per-block drop tables.
///
/// Fortune scales non-silk drop counts linearly: `count * (1 + fortune)`.
/// Silk-touch drops come from their own table and ignore fortune.
#[derive(Debug, Clone)]
pub struct TestRecipeLookup {
    mining: Option<RecipeId>,
    drops: BTreeMap<BlockTypeId, Vec<ItemStack>>,
    silk: BTreeMap<BlockTypeId, Vec<ItemStack>>,
    consumed: u32,
}

impl TestRecipeLookup {
    pub fn new() -> Self {
        Self {
            mining: Some(RecipeId(0)),
            drops: BTreeMap::new(),
            silk: BTreeMap::new(),
            consumed: 0,
        }
    }

    /// A lookup that resolves no mining recipe at all.
    pub fn barren() -> Self {
        Self {
            mining: None,
            ..Self::new()
        }
    }

    pub fn with_drop(mut self, block: BlockTypeId, drop: ItemStack) -> Self {
        self.drops.entry(block).or_default().push(drop);
        self
    }

    pub fn with_silk_drop(mut self, block: BlockTypeId, drop: ItemStack) -> Self {
        self.silk.entry(block).or_default().push(drop);
        self
    }

    /// Committed consumptions so far.
    pub fn consumed(&self) -> u32 {
        self.consumed
    }
}

impl Default for TestRecipeLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipeLookup for TestRecipeLookup {
    fn try_consume(&mut self, _inputs: &[ItemStack], commit: bool) -> Option<RecipeId> {
        if commit && self.mining.is_some() {
            self.consumed += 1;
        }
        self.mining
    }

    fn cell_yield(
        &self,
        _recipe: RecipeId,
        block: BlockTypeId,
        fortune: u32,
        silk_touch: bool,
    ) -> Vec<ItemStack> {
        if silk_touch {
            return self.silk.get(&block).cloned().unwrap_or_default();
        }
        self.drops
            .get(&block)
            .map(|stacks| {
                stacks
                    .iter()
                    .map(|s| ItemStack::new(s.item, s.count * (1 + fortune)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

// ===========================================================================
// Miner rig: template, world, arena and providers wired together
// ===========================================================================

/// 3x3x3 extraction-machine shape: controller bottom-center of the front
/// slab, hollow middle, one toggleable variant block above the controller.
pub fn miner_template() -> StructureTemplate {
    StructureTemplate::builder()
        .slab(&["CCC", "CVC", "CSC"])
        .slab(&["CCC", "C#C", "CCC"])
        .slab(&["CCC", "CCC", "CCC"])
        .cell(
            'C',
            vec![
                CellPredicate::block(steel_casing()).with_min_global(10),
                CellPredicate::ability(AbilityKind::EnergyInput),
                CellPredicate::ability(AbilityKind::FluidImport),
                CellPredicate::ability(AbilityKind::ItemExport),
                CellPredicate::ability(AbilityKind::MaintenanceHatch).with_max_global(1),
            ],
        )
        .cell('S', vec![CellPredicate::controller()])
        .cell('#', vec![CellPredicate::air()])
        .cell(
            'V',
            vec![CellPredicate::block(variant_casing()).collecting(VARIANT_BLOCKS_KEY)],
        )
        .build()
        .expect("miner template is well formed")
}

/// A complete, matchable miner installation.
#[derive(Debug)]
pub struct MinerRig {
    pub world: TestWorld,
    pub arena: ProviderArena,
    pub template: StructureTemplate,
    pub origin: Position3,
    pub facing: Orientation,
    pub recipes: TestRecipeLookup,
    /// Shared handle to the buffer registered under `items`.
    pub buffer: TestItemBuffer,
    pub energy: EnergyKey,
    pub fluid: FluidKey,
    pub items: ItemExportKey,
    pub maintenance: MaintenanceKey,
}

/// Rig with generous default resources: tier-2 voltage, a deep fluid tank,
/// an unbounded item buffer, and a plain maintenance hatch.
pub fn miner_rig() -> MinerRig {
    miner_rig_with(
        TestEnergyProvider::new(1_000_000, 2_000_000, 128),
        TestFluidTank::new(drilling_fluid(), 100_000, 200_000),
        TestItemBuffer::new(),
    )
}

pub fn miner_rig_with(
    energy: TestEnergyProvider,
    tank: TestFluidTank,
    buffer: TestItemBuffer,
) -> MinerRig {
    miner_rig_full(energy, tank, buffer, TestMaintenanceHatch::new())
}

pub fn miner_rig_full(
    energy: TestEnergyProvider,
    tank: TestFluidTank,
    buffer: TestItemBuffer,
    hatch: TestMaintenanceHatch,
) -> MinerRig {
    let template = miner_template();
    let origin = Position3::new(0, 64, 0);
    let facing = Orientation::North;
    let mut world = TestWorld::new();
    let mut arena = ProviderArena::new();

    let (slabs, rows, cols) = template.dimensions();
    for a in 0..slabs {
        for r in 0..rows {
            for c in 0..cols {
                let pos = template.world_pos(origin, facing, (a, r, c));
                match (a, r, c) {
                    (0, 2, 1) => {} // controller
                    (1, 1, 1) => {} // hollow interior
                    (0, 1, 1) => world.set_block(pos, variant_casing()),
                    _ => world.set_block(pos, steel_casing()),
                }
            }
        }
    }

    let energy_key = arena.add_energy(Box::new(energy));
    let fluid_key = arena.add_fluid(Box::new(tank));
    let item_key = arena.add_item_export(Box::new(buffer.clone()));
    let maintenance_key = arena.add_maintenance(Box::new(hatch));
    world.place_provider(
        template.world_pos(origin, facing, (0, 2, 0)),
        hatch_block(),
        ProviderRef::Energy(energy_key),
    );
    world.place_provider(
        template.world_pos(origin, facing, (0, 2, 2)),
        hatch_block(),
        ProviderRef::Fluid(fluid_key),
    );
    world.place_provider(
        template.world_pos(origin, facing, (2, 2, 1)),
        hatch_block(),
        ProviderRef::Item(item_key),
    );
    world.place_provider(
        template.world_pos(origin, facing, (2, 0, 1)),
        hatch_block(),
        ProviderRef::Maintenance(maintenance_key),
    );

    let recipes = TestRecipeLookup::new()
        .with_drop(ore_block(), ItemStack::new(raw_ore(), 1))
        .with_silk_drop(ore_block(), ItemStack::new(silk_ore(), 1));

    MinerRig {
        world,
        arena,
        template,
        origin,
        facing,
        recipes,
        buffer,
        energy: energy_key,
        fluid: fluid_key,
        items: item_key,
        maintenance: maintenance_key,
    }
}

/// Fill the mining plane (one block below `center`) with ore across a
/// square of the given radius.
pub fn seed_ore_layer(world: &mut TestWorld, center: Position3, radius: i32) {
    for dx in -radius..=radius {
        for dz in -radius..=radius {
            world.set_block(center.offset(dx, -1, dz), ore_block());
        }
    }
}
