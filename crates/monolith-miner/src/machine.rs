//! The large extraction machine: controller, scan logic, and resource
//! gating composed into one tickable unit.
//!
//! [`MinerMachine`] owns a [`MultiblockController`] for the formation
//! lifecycle and a [`MinerLogic`] for the scan. Each tick runs the gate
//! sequence from [`perform_mining`](MinerMachine::tick): done/enabled,
//! energy, fluid, output space, then commit. Every gate is simulated
//! before anything is consumed; a failed gate stalls the machine for the
//! tick and is retried on the next one.

use monolith_core::config::{ControllerOptions, SimConfig};
use monolith_core::controller::{ControllerDiagnostics, ControllerTick, MultiblockController};
use monolith_core::error::{MachineError, OperatorControl, RejectCause};
use monolith_core::id::{DimensionId, FluidTypeId};
use monolith_core::net::SyncOutbox;
use monolith_core::persist::ControllerSaved;
use monolith_core::pos::{Orientation, Position3};
use monolith_core::providers::{
    FluidStack, ProviderArena, RecipeLookup, WorldView, can_insert_all, drain_energy, drain_fluid,
    insert_all, supplied_voltage,
};
use monolith_core::structure::{StructureMatcher, StructureTemplate};
use serde::{Deserialize, Serialize};

use crate::logic::{MinerLogic, MinerStall};
use crate::sync::{MinerFullSync, MinerSync};
use crate::tier;

// ---------------------------------------------------------------------------
// Build parameters
// ---------------------------------------------------------------------------

/// Static parameters for one miner variant, usually loaded from data files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerSpec {
    /// Tier the machine is built for. Feeding higher-tier voltage
    /// overclocks it.
    pub rated_tier: u32,
    /// Energy cost per mining tick at the rated tier.
    pub energy_per_tick: i64,
    /// Fluid the drill consumes.
    pub drilling_fluid: FluidTypeId,
    /// Fluid cost per mining tick before overclock scaling.
    pub fluid_per_tick: u32,
    /// Largest working radius the operator can select, in blocks.
    pub maximum_radius: i32,
    /// Fortune level applied to non-silk yields.
    pub fortune: u32,
}

/// Borrowed collaborators for one tick. The machine owns none of these;
/// the host wires them up per call.
pub struct MinerEnv<'a> {
    pub world: &'a dyn WorldView,
    pub matcher: &'a dyn StructureMatcher,
    pub recipes: &'a mut dyn RecipeLookup,
    pub arena: &'a mut ProviderArena,
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Miner-side persisted fields. The raw cursor keeps its unplaced
/// sentinel, so a save taken before the first advance restores to the
/// same fresh state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerSaved {
    pub chunk_mode: bool,
    pub silk_touch: bool,
    pub current_radius: i32,
    pub cursor_x: i32,
    pub cursor_y: i32,
    pub cursor_z: i32,
    pub done: bool,
}

/// Everything one machine persists: the controller's state plus the
/// miner's own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerMachineSaved {
    pub controller: ControllerSaved,
    pub miner: MinerSaved,
}

// ---------------------------------------------------------------------------
// Diagnostics
// ---------------------------------------------------------------------------

/// Point-in-time readout across both layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinerDiagnostics {
    pub controller: ControllerDiagnostics,
    pub working_enabled: bool,
    pub working: bool,
    pub done: bool,
    pub inventory_full: bool,
    pub stall: Option<MinerStall>,
    pub chunk_mode: bool,
    pub silk_touch: bool,
    pub current_radius: i32,
    /// Working-area edge in cells: blocks or chunks by mode.
    pub area_edge: i32,
    pub cursor: Option<Position3>,
    pub energy_tier: u32,
    pub overclock: u32,
}

// ---------------------------------------------------------------------------
// Machine
// ---------------------------------------------------------------------------

/// One large miner installation.
#[derive(Debug)]
pub struct MinerMachine {
    controller: MultiblockController,
    logic: MinerLogic,
    spec: MinerSpec,
    template: StructureTemplate,
    working_enabled: bool,
    stall: Option<MinerStall>,
    /// Tier and overclock derived from the energy group last tick.
    energy_tier: u32,
    overclock: u32,
    outbox: SyncOutbox<MinerSync>,
}

impl MinerMachine {
    pub fn new(
        position: Position3,
        orientation: Orientation,
        dimension: DimensionId,
        spec: MinerSpec,
        template: StructureTemplate,
        config: &SimConfig,
        options: &ControllerOptions,
    ) -> Self {
        // Miners declare no maintenance mechanics; their problem mask always
        // reads all-fixed and the wear counter never moves.
        let options = ControllerOptions {
            has_maintenance_mechanics: false,
            ..*options
        };
        let controller =
            MultiblockController::new(position, orientation, dimension, config, &options);
        let logic = MinerLogic::new(position, spec.maximum_radius);
        Self {
            controller,
            logic,
            spec,
            template,
            working_enabled: true,
            stall: None,
            energy_tier: spec.rated_tier,
            overclock: 1,
            outbox: SyncOutbox::default(),
        }
    }

    // --- Accessors ---

    pub fn controller(&self) -> &MultiblockController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut MultiblockController {
        &mut self.controller
    }

    pub fn logic(&self) -> &MinerLogic {
        &self.logic
    }

    pub fn spec(&self) -> &MinerSpec {
        &self.spec
    }

    pub fn template(&self) -> &StructureTemplate {
        &self.template
    }

    pub fn working_enabled(&self) -> bool {
        self.working_enabled
    }

    /// Why the last tick did not mine, if it didn't.
    pub fn stall(&self) -> Option<MinerStall> {
        self.stall
    }

    /// Tier the machine ran at last tick.
    pub fn energy_tier(&self) -> u32 {
        self.energy_tier
    }

    /// Cost scale factor applied last tick.
    pub fn overclock(&self) -> u32 {
        self.overclock
    }

    pub fn diagnostics(&self) -> MinerDiagnostics {
        MinerDiagnostics {
            controller: self.controller.diagnostics(),
            working_enabled: self.working_enabled,
            working: self.logic.is_working(),
            done: self.logic.is_done(),
            inventory_full: self.logic.inventory_full(),
            stall: self.stall,
            chunk_mode: self.logic.chunk_mode(),
            silk_touch: self.logic.silk_touch(),
            current_radius: self.logic.current_radius(),
            area_edge: self.logic.working_area_edge(),
            cursor: self.logic.cursor(),
            energy_tier: self.energy_tier,
            overclock: self.overclock,
        }
    }

    // --- Sync ---

    /// Remove and return pending miner messages, oldest first. Controller
    /// broadcasts are drained separately via
    /// [`MultiblockController::drain_sync`].
    pub fn drain_sync(&mut self) -> Vec<MinerSync> {
        self.outbox.drain()
    }

    /// Snapshot for a newly joined observer.
    pub fn full_sync(&self) -> MinerFullSync {
        MinerFullSync {
            chunk_mode: self.logic.chunk_mode(),
            silk_touch: self.logic.silk_touch(),
            current_radius: self.logic.current_radius(),
            cursor: self.logic.cursor(),
            done: self.logic.is_done(),
            working_enabled: self.working_enabled,
            working: self.logic.is_working(),
            inventory_full: self.logic.inventory_full(),
        }
    }

    /// Queue a full snapshot, called when an observer joins.
    pub fn push_full_sync(&mut self) {
        let full = self.full_sync();
        self.outbox.push(MinerSync::Full(full));
    }

    // --- Ticking ---

    /// Advance the machine one tick: settle formation, mine if possible,
    /// then fold the working flag into the controller's active state.
    pub fn tick(&mut self, env: &mut MinerEnv<'_>) -> ControllerTick {
        let formed = self
            .controller
            .begin_tick(env.world, env.matcher, &self.template, env.arena);

        // A voiding-mode change may have unblocked a full output.
        if self.controller.take_output_recheck() && self.logic.set_inventory_full(false) {
            self.outbox.push(MinerSync::InventoryFull { full: false });
        }

        if formed {
            self.perform_mining(env);
        } else {
            self.stall = None;
            self.set_working(false);
        }
        self.controller.finish_tick(self.logic.is_working(), env.arena)
    }

    fn perform_mining(&mut self, env: &mut MinerEnv<'_>) {
        if self.logic.is_done() {
            self.stall = Some(MinerStall::Exhausted);
            self.set_working(false);
            return;
        }
        if !self.working_enabled {
            self.stall = Some(MinerStall::Disabled);
            self.set_working(false);
            return;
        }

        let energy_keys = self.controller.abilities().energy_inputs.clone();
        let fluid_keys = self.controller.abilities().fluid_imports.clone();
        let item_keys = self.controller.abilities().item_exports.clone();

        let supplied = supplied_voltage(env.arena, &energy_keys);
        self.energy_tier = tier::energy_tier(self.spec.rated_tier, supplied);
        self.overclock = tier::overclock_amount(self.spec.rated_tier, supplied);
        let energy_cost = tier::scaled_energy_cost(
            self.spec.energy_per_tick,
            self.spec.rated_tier,
            self.energy_tier,
        ) * i64::from(self.overclock);
        let fluid_request = FluidStack::new(
            self.spec.drilling_fluid,
            self.spec.fluid_per_tick.saturating_mul(self.overclock),
        );

        // Simulate both drains before touching anything.
        if !self.gate(
            drain_energy(env.arena, &energy_keys, energy_cost, false),
            MinerStall::InsufficientEnergy,
            env.arena,
        ) {
            return;
        }
        if !self.gate(
            drain_fluid(env.arena, &fluid_keys, fluid_request, false),
            MinerStall::InsufficientFluid,
            env.arena,
        ) {
            return;
        }

        // Yield at the cell this tick will visit.
        let Some(cell) = self.logic.peek_cursor() else {
            // The radius shrank below the restored cursor's ring.
            self.logic.advance_cursor();
            if self.logic.is_done() {
                self.outbox.push(MinerSync::ScanDone);
            }
            self.stall = Some(MinerStall::Exhausted);
            self.set_working(false);
            return;
        };
        let block = env.world.block_at(cell);
        let mined = match env.recipes.try_consume(&[], false) {
            Some(recipe) => {
                env.recipes
                    .cell_yield(recipe, block, self.spec.fortune, self.logic.silk_touch())
            }
            None => Vec::new(),
        };

        // Output gate. Item voiding turns overflow into discard instead.
        if !mined.is_empty()
            && !self.controller.can_void_items()
            && !can_insert_all(env.arena, &item_keys, &mined)
        {
            if self.logic.set_inventory_full(true) {
                self.outbox.push(MinerSync::InventoryFull { full: true });
            }
            self.stall = Some(MinerStall::OutputFull);
            self.set_working(false);
            return;
        }

        // Commit.
        if !self.gate(
            drain_energy(env.arena, &energy_keys, energy_cost, true),
            MinerStall::InsufficientEnergy,
            env.arena,
        ) {
            return;
        }
        if !self.gate(
            drain_fluid(env.arena, &fluid_keys, fluid_request, true),
            MinerStall::InsufficientFluid,
            env.arena,
        ) {
            return;
        }
        env.recipes.try_consume(&[], true);
        let advanced = self.logic.advance_cursor();
        debug_assert_eq!(advanced, Some(cell));
        if !mined.is_empty() {
            insert_all(env.arena, &item_keys, &mined);
        }
        if self.logic.set_inventory_full(false) {
            self.outbox.push(MinerSync::InventoryFull { full: false });
        }
        if self.logic.is_done() {
            self.outbox.push(MinerSync::ScanDone);
        }
        self.stall = None;
        self.set_working(true);
    }

    /// Fold a drain result into machine state. Shortages stall the tick;
    /// a provider group referencing removed providers is a configuration
    /// inconsistency and unforms the structure.
    fn gate(
        &mut self,
        result: Result<(), MachineError>,
        stall: MinerStall,
        arena: &mut ProviderArena,
    ) -> bool {
        match result {
            Ok(()) => true,
            Err(MachineError::ConfigurationInconsistent { .. }) => {
                self.controller.invalidate_structure(arena);
                self.stall = None;
                self.set_working(false);
                false
            }
            Err(_) => {
                self.stall = Some(stall);
                self.set_working(false);
                false
            }
        }
    }

    fn set_working(&mut self, working: bool) {
        if self.logic.set_working(working) {
            self.outbox.push(MinerSync::WorkingChanged { working });
        }
    }

    // --- Operator controls ---

    /// Toggle whether the machine is allowed to mine at all.
    pub fn set_working_enabled(&mut self, enabled: bool) {
        if self.working_enabled != enabled {
            self.working_enabled = enabled;
            self.outbox.push(MinerSync::WorkingEnabledChanged { enabled });
        }
    }

    /// Cycle through the four mode states: neither, chunk-only,
    /// silk-only, both. Rejected while the machine is actively mining.
    pub fn cycle_modes(&mut self) -> Result<(bool, bool), MachineError> {
        if self.logic.is_working() {
            return Err(MachineError::OperatorRejected {
                control: OperatorControl::ModeCycle,
                cause: RejectCause::Working,
            });
        }
        let (chunk_mode, silk_touch) = self.logic.cycle_modes();
        self.outbox.push(MinerSync::ModesChanged {
            chunk_mode,
            silk_touch,
        });
        Ok((chunk_mode, silk_touch))
    }

    /// Step the working radius down, wrapping to the maximum. Rejected
    /// while mining or while the structure is unformed. Returns the new
    /// radius for the operator announcement.
    pub fn cycle_radius(&mut self) -> Result<i32, MachineError> {
        if !self.controller.is_formed() {
            return Err(MachineError::OperatorRejected {
                control: OperatorControl::RadiusCycle,
                cause: RejectCause::Unformed,
            });
        }
        if self.logic.is_working() {
            return Err(MachineError::OperatorRejected {
                control: OperatorControl::RadiusCycle,
                cause: RejectCause::Working,
            });
        }
        let radius = self.logic.cycle_radius();
        self.outbox.push(MinerSync::RadiusChanged {
            radius,
            area_edge: self.logic.working_area_edge(),
        });
        Ok(radius)
    }

    // --- Persistence ---

    pub fn save(&self) -> MinerMachineSaved {
        let cursor = self.logic.cursor_raw();
        MinerMachineSaved {
            controller: self.controller.save(),
            miner: MinerSaved {
                chunk_mode: self.logic.chunk_mode(),
                silk_touch: self.logic.silk_touch(),
                current_radius: self.logic.current_radius(),
                cursor_x: cursor.x,
                cursor_y: cursor.y,
                cursor_z: cursor.z,
                done: self.logic.is_done(),
            },
        }
    }

    pub fn restore(&mut self, saved: &MinerMachineSaved) {
        self.controller.restore(&saved.controller);
        self.logic.restore_scan(
            saved.miner.chunk_mode,
            saved.miner.silk_touch,
            saved.miner.current_radius,
            Position3::new(saved.miner.cursor_x, saved.miner.cursor_y, saved.miner.cursor_z),
            saved.miner.done,
        );
    }
}
