//! Generic multiblock lifecycle: formed/unformed transitions, maintenance
//! ticking, voiding policy, and change broadcasts.
//!
//! A controller is UNFORMED or FORMED, nothing else, and the transition is
//! re-entrant. While formed it re-validates its structure every tick; while
//! unformed it attempts formation only after a neighbor-change notification,
//! so idle controllers cost nothing. Machine layers (the miner, say) wrap
//! the two tick halves: [`MultiblockController::begin_tick`] settles
//! formation, the layer does its work against the provider arena, and
//! [`MultiblockController::finish_tick`] folds the layer's activity into the
//! active flag, advances maintenance, and publishes display state.
//!
//! Everything observers learn about a controller flows through two one-way
//! surfaces: the [`SyncOutbox`] for transition broadcasts and the
//! [`DisplayMirror`] for polled presentation state.

use crate::ability::AbilitySet;
use crate::config::{ControllerOptions, SimConfig};
use crate::error::MachineError;
use crate::fixed::{Fixed64, Ticks};
use crate::id::DimensionId;
use crate::maintenance::{MaintenanceModel, MaintenanceTick, ProblemKind};
use crate::mirror::{DisplayMirror, DisplaySnapshot};
use crate::net::{SyncMessage, SyncOutbox};
use crate::persist::ControllerSaved;
use crate::pos::{Orientation, Position3};
use crate::providers::{ProviderArena, WorldView};
use crate::rng::SimRng;
use crate::structure::{
    FormedStructure, MatchContext, MatchResult, StructureMatcher, StructureTemplate,
};
use crate::voiding::{VoidingConfig, VoidingMode};

/// Context key under which templates collect toggleable variant blocks.
pub const VARIANT_BLOCKS_KEY: &str = "variant_blocks";

/// Summary of one controller tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerTick {
    pub formed: bool,
    pub active: bool,
    /// The active flag flipped this tick (and was broadcast).
    pub active_changed: bool,
    pub maintenance: MaintenanceTick,
}

/// Point-in-time diagnostic readout, cheap to take every tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerDiagnostics {
    pub tick: Ticks,
    pub formed: bool,
    pub active: bool,
    pub problem_count: u32,
    /// Currently broken slots, in slot order.
    pub broken: Vec<ProblemKind>,
    pub voiding_mode: VoidingMode,
    pub pending_broadcasts: usize,
    pub dropped_broadcasts: u64,
}

/// The generic multiblock lifecycle owner.
#[derive(Debug)]
pub struct MultiblockController {
    position: Position3,
    orientation: Orientation,
    dimension: DimensionId,

    formed: bool,
    last_active: bool,
    /// An adjacent block changed; worth attempting formation while unformed.
    structure_dirty: bool,
    /// A voiding change may have unblocked an output-full stall.
    recheck_outputs: bool,
    /// Persistent state diverged from the last save.
    dirty: bool,
    tick: Ticks,

    maintenance: MaintenanceModel,
    voiding: VoidingConfig,
    abilities: AbilitySet,
    context: MatchContext,
    variant_blocks: Vec<Position3>,

    outbox: SyncOutbox,
    mirror: DisplayMirror,
    rng: SimRng,
}

impl MultiblockController {
    pub fn new(
        position: Position3,
        orientation: Orientation,
        dimension: DimensionId,
        config: &SimConfig,
        options: &ControllerOptions,
    ) -> Self {
        let mut controller = Self {
            position,
            orientation,
            dimension,
            formed: false,
            last_active: false,
            structure_dirty: true,
            recheck_outputs: false,
            dirty: false,
            tick: 0,
            maintenance: MaintenanceModel::new(config, options),
            voiding: VoidingConfig::new(options),
            abilities: AbilitySet::default(),
            context: MatchContext::default(),
            variant_blocks: Vec::new(),
            outbox: SyncOutbox::default(),
            mirror: DisplayMirror::default(),
            rng: SimRng::new(options.rng_seed),
        };
        controller.publish_display();
        controller
    }

    // --- Queries ---

    pub fn position(&self) -> Position3 {
        self.position
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn dimension(&self) -> DimensionId {
        self.dimension
    }

    pub fn is_formed(&self) -> bool {
        self.formed
    }

    pub fn is_active(&self) -> bool {
        self.last_active
    }

    pub fn current_tick(&self) -> Ticks {
        self.tick
    }

    pub fn abilities(&self) -> &AbilitySet {
        &self.abilities
    }

    pub fn context(&self) -> &MatchContext {
        &self.context
    }

    pub fn variant_blocks(&self) -> &[Position3] {
        &self.variant_blocks
    }

    pub fn maintenance(&self) -> &MaintenanceModel {
        &self.maintenance
    }

    pub fn voiding(&self) -> &VoidingConfig {
        &self.voiding
    }

    pub fn can_void_items(&self) -> bool {
        self.voiding.can_void_items()
    }

    pub fn can_void_fluids(&self) -> bool {
        self.voiding.can_void_fluids()
    }

    /// Scale factor the attached hatch applies to operation durations.
    /// One while unformed or when no hatch is present.
    pub fn duration_multiplier(&self, arena: &ProviderArena) -> Fixed64 {
        let hatch = self
            .abilities
            .maintenance_hatch()
            .and_then(|key| arena.maintenance.get(key))
            .map(|b| b.as_ref());
        MaintenanceModel::duration_multiplier(hatch)
    }

    pub fn diagnostics(&self) -> ControllerDiagnostics {
        ControllerDiagnostics {
            tick: self.tick,
            formed: self.formed,
            active: self.last_active,
            problem_count: self.maintenance.problem_count(),
            broken: ProblemKind::ALL
                .into_iter()
                .filter(|kind| !self.maintenance.is_fixed(*kind))
                .collect(),
            voiding_mode: self.voiding.mode(),
            pending_broadcasts: self.outbox.len(),
            dropped_broadcasts: self.outbox.dropped_count(),
        }
    }

    // --- Observer surfaces ---

    /// Remove all pending broadcasts, oldest first.
    pub fn drain_sync(&mut self) -> Vec<SyncMessage> {
        self.outbox.drain()
    }

    pub fn display(&self) -> DisplaySnapshot {
        self.mirror.snapshot()
    }

    pub fn display_revision(&self) -> u64 {
        self.mirror.revision()
    }

    /// Whether persistent state changed since the flag was last taken.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Whether a voiding change requests an output-space re-evaluation.
    pub fn take_output_recheck(&mut self) -> bool {
        std::mem::take(&mut self.recheck_outputs)
    }

    // --- Formation ---

    /// An adjacent block changed; attempt formation on the next tick.
    pub fn notify_neighbor_changed(&mut self) {
        self.structure_dirty = true;
    }

    /// Explicit formation attempt, reporting why it failed. Per-tick
    /// re-validation never surfaces errors; this does.
    pub fn try_form(
        &mut self,
        world: &dyn WorldView,
        matcher: &dyn StructureMatcher,
        template: &StructureTemplate,
        arena: &mut ProviderArena,
    ) -> Result<(), MachineError> {
        match matcher.check_at(world, self.position, self.orientation, template) {
            MatchResult::Formed(formed) => {
                self.apply_formation(formed, arena);
                Ok(())
            }
            MatchResult::NotFormed(failure) => Err(MachineError::StructureInvalid(failure)),
        }
    }

    /// Tear down the formed state: persist maintenance into the hatch, drop
    /// every ability handle, and broadcast deactivation exactly once if the
    /// machine was running.
    pub fn invalidate_structure(&mut self, arena: &mut ProviderArena) {
        if !self.formed {
            return;
        }
        let hatch = self
            .abilities
            .maintenance_hatch()
            .and_then(|key| arena.maintenance_mut(key));
        self.maintenance.on_unformed(hatch);

        if self.last_active {
            self.last_active = false;
            self.push_active_broadcast(false);
        }
        self.formed = false;
        self.abilities = AbilitySet::default();
        self.context = MatchContext::default();
        self.variant_blocks.clear();
        self.dirty = true;
        self.publish_display();
    }

    fn apply_formation(&mut self, formed: FormedStructure, arena: &mut ProviderArena) {
        if self.formed {
            self.invalidate_structure(arena);
        }
        self.formed = true;
        self.abilities = formed.abilities;
        self.context = formed.context;
        self.variant_blocks = self.context.positions(VARIANT_BLOCKS_KEY).to_vec();
        self.last_active = false;
        // Variant blocks from a fresh match start announced as inactive;
        // the first active edge turns them on.
        self.push_variant_broadcast(false);

        let hatch = self
            .abilities
            .maintenance_hatch()
            .and_then(|key| arena.maintenance_mut(key));
        if self.maintenance.on_formed(hatch) {
            self.outbox.push(SyncMessage::TapedStateChanged {
                taped: true,
                tick: self.tick,
            });
        }
        self.dirty = true;
        self.publish_display();
    }

    // --- Ticking ---

    /// First tick half: settle formation. While formed, re-validate and
    /// unform on failure; while unformed, attempt formation only after a
    /// neighbor change. Returns whether the controller is formed afterward.
    pub fn begin_tick(
        &mut self,
        world: &dyn WorldView,
        matcher: &dyn StructureMatcher,
        template: &StructureTemplate,
        arena: &mut ProviderArena,
    ) -> bool {
        self.tick += 1;
        if self.formed {
            if let MatchResult::NotFormed(_) =
                matcher.check_at(world, self.position, self.orientation, template)
            {
                self.invalidate_structure(arena);
            }
        } else if self.structure_dirty {
            self.structure_dirty = false;
            if let MatchResult::Formed(formed) =
                matcher.check_at(world, self.position, self.orientation, template)
            {
                self.apply_formation(formed, arena);
            }
        }
        self.formed
    }

    /// Second tick half: fold the machine layer's activity into the active
    /// flag, broadcast on change, and advance maintenance while active.
    pub fn finish_tick(&mut self, extra_active: bool, arena: &mut ProviderArena) -> ControllerTick {
        let mut out = ControllerTick {
            formed: self.formed,
            ..ControllerTick::default()
        };
        let active = self.formed && extra_active;
        if active != self.last_active {
            self.last_active = active;
            self.dirty = true;
            self.push_active_broadcast(active);
            out.active_changed = true;
        }
        out.active = active;

        if active {
            let hatch = self
                .abilities
                .maintenance_hatch()
                .and_then(|key| arena.maintenance_mut(key));
            let maintenance = self.maintenance.tick(hatch, &mut self.rng);
            if maintenance.taped_cleared {
                self.outbox.push(SyncMessage::TapedStateChanged {
                    taped: false,
                    tick: self.tick,
                });
            }
            if maintenance.problem_rolled.is_some() || maintenance.interval_elapsed {
                self.dirty = true;
            }
            out.maintenance = maintenance;
        }
        self.publish_display();
        out
    }

    /// Convenience for controllers with no machine layer: active equals
    /// formed.
    pub fn update(
        &mut self,
        world: &dyn WorldView,
        matcher: &dyn StructureMatcher,
        template: &StructureTemplate,
        arena: &mut ProviderArena,
    ) -> ControllerTick {
        self.begin_tick(world, matcher, template, arena);
        self.finish_tick(true, arena)
    }

    // --- Operator and repair surface ---

    /// Set the voiding policy. Also requests an output-space re-check, since
    /// loosening the policy can unblock an output-full stall.
    pub fn set_voiding_mode(&mut self, mode: VoidingMode) {
        self.voiding.set_mode(mode);
        self.recheck_outputs = true;
        self.dirty = true;
        self.publish_display();
    }

    /// External repair of one problem slot.
    pub fn repair(&mut self, kind: ProblemKind) {
        self.maintenance.fix(kind);
        self.dirty = true;
        self.publish_display();
    }

    /// Duct-tape repair: fix every slot and tape the hatch. Returns whether
    /// the hatch's taped flag actually changed.
    pub fn apply_duct_tape(&mut self, arena: &mut ProviderArena) -> bool {
        self.maintenance.fix_all();
        self.dirty = true;
        let changed = self
            .abilities
            .maintenance_hatch()
            .and_then(|key| arena.maintenance_mut(key))
            .is_some_and(|hatch| hatch.set_taped(true));
        if changed {
            self.outbox.push(SyncMessage::TapedStateChanged {
                taped: true,
                tick: self.tick,
            });
        }
        self.publish_display();
        changed
    }

    // --- Persistence ---

    pub fn save(&self) -> ControllerSaved {
        ControllerSaved {
            problems: self.maintenance.raw_problems(),
            initial_maintenance_done: self.maintenance.initial_maintenance_done(),
            time_active: self.maintenance.time_active(),
            stored_taped: self.maintenance.stored_taped(),
            voiding_items: self.voiding.voiding_items(),
            voiding_fluids: self.voiding.voiding_fluids(),
            voiding_mode: self.voiding.mode().ordinal(),
        }
    }

    /// Restore persisted fields. Formation state is never persisted; the
    /// next tick re-matches against the live world.
    pub fn restore(&mut self, saved: &ControllerSaved) {
        self.maintenance.restore(
            saved.problems,
            saved.time_active,
            saved.initial_maintenance_done,
            saved.stored_taped,
        );
        self.voiding.restore(saved.voiding_mode);
        self.publish_display();
    }

    // --- Internals ---

    fn push_active_broadcast(&mut self, active: bool) {
        self.outbox.push(SyncMessage::ActiveStateChanged {
            active,
            tick: self.tick,
        });
        self.push_variant_broadcast(active);
    }

    fn push_variant_broadcast(&mut self, active: bool) {
        if !self.variant_blocks.is_empty() {
            self.outbox.push(SyncMessage::VariantBlocksActive {
                dimension: self.dimension,
                active,
                positions: self.variant_blocks.clone(),
                tick: self.tick,
            });
        }
    }

    fn publish_display(&mut self) {
        self.mirror.publish(DisplaySnapshot {
            formed: self.formed,
            active: self.last_active,
            problems: self.maintenance.problems_bitmask(),
            problem_count: self.maintenance.problem_count(),
            voiding_mode: self.voiding.mode(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::AIR;
    use crate::net::SyncKind;
    use crate::structure::TemplateMatcher;
    use crate::test_utils::{
        drilling_fluid, miner_rig, miner_rig_full, steel_casing, MinerRig, TestEnergyProvider,
        TestFluidTank, TestItemBuffer, TestMaintenanceHatch,
    };

    fn controller_for(rig: &MinerRig) -> MultiblockController {
        MultiblockController::new(
            rig.origin,
            rig.facing,
            DimensionId(0),
            &SimConfig::default(),
            &ControllerOptions::default(),
        )
    }

    fn tick(controller: &mut MultiblockController, rig: &mut MinerRig) -> ControllerTick {
        controller.begin_tick(&rig.world, &TemplateMatcher, &rig.template, &mut rig.arena);
        controller.finish_tick(true, &mut rig.arena)
    }

    // === Formation lifecycle ===

    #[test]
    fn forms_after_neighbor_notification_only() {
        let mut rig = miner_rig();
        let mut controller = controller_for(&rig);

        // Construction marks the structure dirty, so the first tick forms.
        let out = tick(&mut controller, &mut rig);
        assert!(out.formed);
        assert!(out.active);
        assert!(out.active_changed);

        // Ten quiet ticks: formed, no further broadcasts.
        controller.drain_sync();
        for _ in 0..10 {
            let out = tick(&mut controller, &mut rig);
            assert!(out.formed);
            assert!(!out.active_changed);
        }
        assert!(controller.drain_sync().is_empty());
    }

    #[test]
    fn formation_announces_variant_blocks_inactive() {
        let mut rig = miner_rig();
        let mut controller = controller_for(&rig);
        controller
            .try_form(&rig.world, &TemplateMatcher, &rig.template, &mut rig.arena)
            .unwrap();

        // Forming resets the variant overlay to off; the active channel
        // stays quiet until the first ticked edge.
        let messages = controller.drain_sync();
        assert!(messages
            .iter()
            .any(|m| matches!(m, SyncMessage::VariantBlocksActive { active: false, .. })));
        assert!(!messages
            .iter()
            .any(|m| m.kind() == SyncKind::ActiveStateChanged));
    }

    #[test]
    fn try_form_reports_the_failure() {
        let mut rig = miner_rig();
        let mut controller = controller_for(&rig);
        let hole = rig.template.world_pos(rig.origin, rig.facing, (2, 2, 2));
        rig.world.set_block(hole, AIR);

        let err = controller
            .try_form(&rig.world, &TemplateMatcher, &rig.template, &mut rig.arena)
            .unwrap_err();
        match err {
            MachineError::StructureInvalid(failure) => assert_eq!(failure.at, hole),
            other => panic!("unexpected error: {other}"),
        }
        assert!(!controller.is_formed());
    }

    #[test]
    fn losing_structure_broadcasts_deactivation_exactly_once() {
        let mut rig = miner_rig();
        let mut controller = controller_for(&rig);
        tick(&mut controller, &mut rig);
        assert!(controller.is_active());
        controller.drain_sync();

        let hole = rig.template.world_pos(rig.origin, rig.facing, (2, 2, 2));
        rig.world.set_block(hole, AIR);
        let out = tick(&mut controller, &mut rig);
        assert!(!out.formed);
        assert!(!controller.is_active());

        let messages = controller.drain_sync();
        let deactivations: Vec<_> = messages
            .iter()
            .filter(|m| matches!(m, SyncMessage::ActiveStateChanged { active: false, .. }))
            .collect();
        assert_eq!(deactivations.len(), 1);

        // Staying broken emits nothing further, and without a neighbor
        // notification no re-formation is attempted.
        tick(&mut controller, &mut rig);
        assert!(controller.drain_sync().is_empty());
        rig.world.set_block(hole, steel_casing());
        tick(&mut controller, &mut rig);
        assert!(!controller.is_formed());
        controller.notify_neighbor_changed();
        let out = tick(&mut controller, &mut rig);
        assert!(out.formed);
    }

    #[test]
    fn unform_persists_maintenance_into_the_hatch() {
        let mut rig = miner_rig();
        let mut controller = controller_for(&rig);
        tick(&mut controller, &mut rig);

        // Accumulate some wear, then break the structure.
        for _ in 0..50 {
            tick(&mut controller, &mut rig);
        }
        assert_eq!(controller.maintenance().time_active(), 51);
        let hole = rig.template.world_pos(rig.origin, rig.facing, (2, 2, 2));
        rig.world.set_block(hole, AIR);
        tick(&mut controller, &mut rig);

        let hatch = rig.arena.maintenance_mut(rig.maintenance).unwrap();
        assert!(hatch.has_stored_data());
        assert_eq!(hatch.read_stored_data().1, 51);
    }

    // === Maintenance integration ===

    #[test]
    fn maintenance_only_advances_while_active() {
        let mut rig = miner_rig();
        let mut controller = controller_for(&rig);
        tick(&mut controller, &mut rig);
        let before = controller.maintenance().time_active();

        // Idle machine layer: formed but not active.
        controller.begin_tick(&rig.world, &TemplateMatcher, &rig.template, &mut rig.arena);
        controller.finish_tick(false, &mut rig.arena);
        assert_eq!(controller.maintenance().time_active(), before);

        controller.begin_tick(&rig.world, &TemplateMatcher, &rig.template, &mut rig.arena);
        controller.finish_tick(true, &mut rig.arena);
        assert_eq!(controller.maintenance().time_active(), before + 1);
    }

    #[test]
    fn duct_tape_fixes_everything_and_broadcasts() {
        let mut rig = miner_rig();
        let mut controller = controller_for(&rig);
        tick(&mut controller, &mut rig);
        controller.drain_sync();
        assert!(controller.maintenance().has_problems());

        assert!(controller.apply_duct_tape(&mut rig.arena));
        assert!(!controller.maintenance().has_problems());
        let messages = controller.drain_sync();
        assert!(messages
            .iter()
            .any(|m| m.kind() == SyncKind::TapedStateChanged));

        // Tape survives unform via the stored flag.
        let hole = rig.template.world_pos(rig.origin, rig.facing, (2, 2, 2));
        rig.world.set_block(hole, AIR);
        tick(&mut controller, &mut rig);
        assert!(controller.maintenance().stored_taped());
    }

    #[test]
    fn duration_multiplier_reads_the_formed_hatch() {
        let mut rig = miner_rig_full(
            TestEnergyProvider::new(1_000_000, 2_000_000, 128),
            TestFluidTank::new(drilling_fluid(), 100_000, 200_000),
            TestItemBuffer::new(),
            TestMaintenanceHatch::new().with_duration_multiplier(0.9),
        );
        let mut controller = controller_for(&rig);
        // No hatch bound while unformed.
        assert_eq!(
            controller.duration_multiplier(&rig.arena),
            Fixed64::from_num(1)
        );

        tick(&mut controller, &mut rig);
        assert_eq!(
            controller.duration_multiplier(&rig.arena),
            Fixed64::from_num(0.9)
        );
    }

    // === Voiding and persistence ===

    #[test]
    fn voiding_mode_round_trips_and_requests_recheck() {
        let mut rig = miner_rig();
        let mut controller = controller_for(&rig);
        assert!(!controller.take_output_recheck());

        for mode in VoidingMode::ALL {
            controller.set_voiding_mode(mode);
            assert_eq!(controller.voiding().mode(), mode);
            assert!(controller.take_output_recheck());
        }
        assert!(!controller.take_output_recheck());
    }

    #[test]
    fn save_restore_round_trips() {
        let mut rig = miner_rig();
        let mut controller = controller_for(&rig);
        tick(&mut controller, &mut rig);
        controller.set_voiding_mode(VoidingMode::Both);
        controller.repair(ProblemKind::LoosePipe);

        let saved = controller.save();
        let mut restored = controller_for(&rig);
        restored.restore(&saved);
        assert_eq!(restored.save(), saved);
        assert_eq!(restored.voiding().mode(), VoidingMode::Both);
        assert!(restored.maintenance().is_fixed(ProblemKind::LoosePipe));
    }

    #[test]
    fn restore_defaults_a_bad_voiding_ordinal() {
        let rig = miner_rig();
        let mut controller = controller_for(&rig);
        let mut saved = controller.save();
        saved.voiding_mode = 42;
        saved.voiding_items = true;
        controller.restore(&saved);
        assert_eq!(controller.voiding().mode(), VoidingMode::None);
        assert!(!controller.voiding().voiding_items());
    }

    // === Display mirror ===

    #[test]
    fn display_revision_settles_once_stable() {
        let mut rig = miner_rig();
        let mut controller = controller_for(&rig);
        tick(&mut controller, &mut rig);
        let revision = controller.display_revision();
        for _ in 0..100 {
            tick(&mut controller, &mut rig);
        }
        assert_eq!(controller.display_revision(), revision);
        assert!(controller.display().formed);
        assert!(controller.display().active);
    }

    #[test]
    fn dirty_flag_tracks_persistent_changes() {
        let mut rig = miner_rig();
        let mut controller = controller_for(&rig);
        assert!(!controller.take_dirty());
        tick(&mut controller, &mut rig);
        assert!(controller.take_dirty());
        controller.repair(ProblemKind::BurnedWiring);
        assert!(controller.take_dirty());
        assert!(!controller.take_dirty());
    }
}
