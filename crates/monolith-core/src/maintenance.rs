//! Progressive degradation: six named problem slots, a wear counter, and
//! probabilistic problem injection.
//!
//! Bit semantics are inverted relative to intuition: a SET bit means the
//! slot is FIXED. A fresh machine starts with every slot broken (mask 0)
//! until a first formation with a sufficiently good hatch clears it. Bits
//! are only ever cleared by [`MaintenanceModel::cause_problem`] and only
//! ever set by an external repair, so the fixed-bit count moves monotonically
//! except at injection points.

use serde::{Deserialize, Serialize};

use crate::config::{ControllerOptions, SimConfig};
use crate::fixed::Fixed64;
use crate::providers::MaintenanceHatch;
use crate::rng::SimRng;

/// Active ticks before the wear counter resets, at time multiplier one.
pub const MAINTENANCE_BASE_INTERVAL: i32 = 1000;

/// One problem is injected per interval reset with probability 1 in this.
pub const PROBLEM_ROLL_BOUND: u32 = 6000;

/// Number of independent problem slots.
pub const PROBLEM_COUNT: u32 = 6;

/// Mask with every slot fixed.
pub const ALL_FIXED: u8 = 0b11_1111;

/// The six things that can go wrong with a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProblemKind {
    LoosePipe,
    DamagedCircuitry,
    JammedMechanism,
    DentedPlating,
    BurnedWiring,
    LoosePaneling,
}

impl ProblemKind {
    pub const ALL: [ProblemKind; PROBLEM_COUNT as usize] = [
        ProblemKind::LoosePipe,
        ProblemKind::DamagedCircuitry,
        ProblemKind::JammedMechanism,
        ProblemKind::DentedPlating,
        ProblemKind::BurnedWiring,
        ProblemKind::LoosePaneling,
    ];

    pub fn index(self) -> u32 {
        match self {
            ProblemKind::LoosePipe => 0,
            ProblemKind::DamagedCircuitry => 1,
            ProblemKind::JammedMechanism => 2,
            ProblemKind::DentedPlating => 3,
            ProblemKind::BurnedWiring => 4,
            ProblemKind::LoosePaneling => 5,
        }
    }

    pub fn from_index(index: u32) -> Option<ProblemKind> {
        Self::ALL.get(index as usize).copied()
    }

    /// Bit in the problems mask. Set means fixed.
    pub fn bit(self) -> u8 {
        1 << self.index()
    }

    pub fn label(self) -> &'static str {
        match self {
            ProblemKind::LoosePipe => "pipe is loose",
            ProblemKind::DamagedCircuitry => "circuitry is damaged",
            ProblemKind::JammedMechanism => "mechanism is jammed",
            ProblemKind::DentedPlating => "plating is dented",
            ProblemKind::BurnedWiring => "wiring is burned",
            ProblemKind::LoosePaneling => "paneling is loose",
        }
    }
}

/// What one maintenance tick did, for the caller to broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaintenanceTick {
    /// The wear counter elapsed and reset this tick.
    pub interval_elapsed: bool,
    /// A problem injection fired, naming the slot it targeted. The slot may
    /// already have been broken; the roll fires regardless.
    pub problem_rolled: Option<ProblemKind>,
    /// The hatch's duct-tape flag was actually cleared this tick.
    pub taped_cleared: bool,
}

/// Maintenance counters for one controller.
///
/// Configuration is captured at construction so queries never consult
/// ambient global state. When maintenance is globally disabled or the
/// machine type opted out, queries report a permanently fixed machine while
/// the underlying counters stay untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceModel {
    problems: u8,
    time_active: i32,
    initial_done: bool,
    stored_taped: bool,
    enabled: bool,
    mechanics: bool,
}

impl MaintenanceModel {
    pub fn new(config: &SimConfig, options: &ControllerOptions) -> Self {
        Self {
            problems: 0,
            time_active: 0,
            initial_done: false,
            stored_taped: false,
            enabled: config.maintenance_enabled,
            mechanics: options.has_maintenance_mechanics,
        }
    }

    fn applies(&self) -> bool {
        self.enabled && self.mechanics
    }

    // --- Queries (gated) ---

    /// Live problems mask, or all-fixed when maintenance does not apply.
    pub fn problems_bitmask(&self) -> u8 {
        if self.applies() {
            self.problems
        } else {
            ALL_FIXED
        }
    }

    /// Number of currently broken slots, 0 to 6.
    pub fn problem_count(&self) -> u32 {
        PROBLEM_COUNT - self.problems_bitmask().count_ones()
    }

    pub fn has_problems(&self) -> bool {
        self.problems_bitmask() < ALL_FIXED
    }

    pub fn is_fixed(&self, kind: ProblemKind) -> bool {
        self.problems_bitmask() & kind.bit() != 0
    }

    /// Scale factor for external operation durations. One absent a hatch.
    pub fn duration_multiplier(hatch: Option<&dyn MaintenanceHatch>) -> Fixed64 {
        match hatch {
            Some(hatch) => hatch.duration_multiplier(),
            None => Fixed64::from_num(1),
        }
    }

    // --- Mutation ---

    /// Break one slot chosen uniformly at random. Picking an already broken
    /// slot changes nothing; that outcome is part of the odds, not a retry.
    pub fn cause_problem(&mut self, rng: &mut SimRng) -> ProblemKind {
        let slot = rng.next_below(PROBLEM_COUNT);
        let kind = ProblemKind::from_index(slot).unwrap_or(ProblemKind::LoosePipe);
        self.problems &= !kind.bit();
        kind
    }

    /// External repair of one slot.
    pub fn fix(&mut self, kind: ProblemKind) {
        self.problems |= kind.bit();
    }

    pub fn fix_all(&mut self) {
        self.problems = ALL_FIXED;
    }

    /// Advance wear by one active tick.
    ///
    /// No-op when maintenance does not apply, no hatch is attached, or the
    /// hatch is full-auto. Otherwise the wear counter climbs; once it
    /// reaches `1000 / time_multiplier` it resets and a 1-in-6000 roll may
    /// inject a problem and strip any duct tape.
    pub fn tick(
        &mut self,
        hatch: Option<&mut dyn MaintenanceHatch>,
        rng: &mut SimRng,
    ) -> MaintenanceTick {
        let mut outcome = MaintenanceTick::default();
        if !self.applies() {
            return outcome;
        }
        let Some(hatch) = hatch else {
            return outcome;
        };
        if hatch.is_full_auto() {
            return outcome;
        }

        self.time_active += 1;
        let threshold = Fixed64::from_num(MAINTENANCE_BASE_INTERVAL) / hatch.time_multiplier();
        if Fixed64::from_num(self.time_active) >= threshold {
            self.time_active = 0;
            outcome.interval_elapsed = true;
            if rng.next_below(PROBLEM_ROLL_BOUND) == 0 {
                outcome.problem_rolled = Some(self.cause_problem(rng));
                outcome.taped_cleared = hatch.set_taped(false);
            }
        }
        outcome
    }

    // --- Formation hooks ---

    /// Apply hatch-held state on formation. Returns `true` when a stored
    /// taped flag was re-applied to the hatch and observers should hear
    /// about it. No-op when maintenance does not apply.
    pub fn on_formed(&mut self, hatch: Option<&mut dyn MaintenanceHatch>) -> bool {
        if !self.applies() {
            return false;
        }
        let Some(hatch) = hatch else {
            return false;
        };
        if hatch.starts_without_problems() && !self.initial_done {
            self.problems = ALL_FIXED;
            self.initial_done = true;
        }
        if hatch.has_stored_data() {
            let (problems, time_active) = hatch.read_stored_data();
            self.problems = problems & ALL_FIXED;
            self.time_active = time_active;
        }
        if self.stored_taped {
            self.stored_taped = false;
            return hatch.set_taped(true);
        }
        false
    }

    /// Hand counters to the hatch for safekeeping at unform, and remember
    /// its taped flag so a re-formation can re-apply it. No-op when
    /// maintenance does not apply.
    pub fn on_unformed(&mut self, hatch: Option<&mut dyn MaintenanceHatch>) {
        if !self.applies() {
            return;
        }
        if let Some(hatch) = hatch {
            self.stored_taped = hatch.is_taped();
            hatch.store_data(self.problems, self.time_active);
        }
    }

    // --- Persistence accessors ---

    /// Ungated mask, exactly as persisted.
    pub fn raw_problems(&self) -> u8 {
        self.problems
    }

    pub fn time_active(&self) -> i32 {
        self.time_active
    }

    pub fn initial_maintenance_done(&self) -> bool {
        self.initial_done
    }

    pub fn stored_taped(&self) -> bool {
        self.stored_taped
    }

    pub fn set_stored_taped(&mut self, taped: bool) {
        self.stored_taped = taped;
    }

    /// Restore persisted counters. Unknown mask bits are dropped.
    pub fn restore(&mut self, problems: u8, time_active: i32, initial_done: bool, stored_taped: bool) {
        self.problems = problems & ALL_FIXED;
        self.time_active = time_active;
        self.initial_done = initial_done;
        self.stored_taped = stored_taped;
    }
}
