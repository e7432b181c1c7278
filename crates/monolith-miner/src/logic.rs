//! Scan-cursor state machine for the extraction area.
//!
//! [`MinerLogic`] owns the geometric side of mining: where the cursor is,
//! how far the area reaches, chunk versus block granularity, and the
//! sticky `done` flag once the spiral is exhausted. Resource gating and
//! provider access live in [`machine`](crate::machine); this type never
//! touches the world.
//!
//! The cursor is a world position on the mining plane, one block below
//! the controller. It starts unplaced; the first advance lands on the
//! center cell. In chunk mode one cell spans a whole chunk and cells are
//! anchored to chunk corners.

use monolith_core::pos::Position3;

use crate::scan;

/// World-units a chunk spans along each horizontal axis.
pub const CHUNK_SIZE: i32 = 16;

/// Radius decrement per operator cycle in chunk mode.
pub const RADIUS_STEP_CHUNK: i32 = 16;
/// Radius decrement per operator cycle in block mode.
pub const RADIUS_STEP_BLOCK: i32 = 8;

/// Cursor coordinate meaning "not placed yet". Survives persistence.
const UNPLACED: i32 = i32::MAX;

/// Why the miner did not work this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinerStall {
    /// The operator switched working off.
    Disabled,
    InsufficientEnergy,
    InsufficientFluid,
    OutputFull,
    /// The scan exhausted the whole area.
    Exhausted,
}

/// Scan state for one miner. Constructed per controller and re-centered
/// whenever the working area changes.
#[derive(Debug, Clone)]
pub struct MinerLogic {
    origin: Position3,
    cursor: Position3,
    done: bool,
    working: bool,
    inventory_full: bool,
    chunk_mode: bool,
    silk_touch: bool,
    current_radius: i32,
    maximum_radius: i32,
}

impl MinerLogic {
    pub fn new(origin: Position3, maximum_radius: i32) -> Self {
        Self {
            origin,
            cursor: Position3::new(UNPLACED, UNPLACED, UNPLACED),
            done: false,
            working: false,
            inventory_full: false,
            chunk_mode: false,
            silk_touch: false,
            current_radius: maximum_radius,
            maximum_radius,
        }
    }

    // -----------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------

    pub fn origin(&self) -> Position3 {
        self.origin
    }

    /// Current cell position, or None before the first advance.
    pub fn cursor(&self) -> Option<Position3> {
        (self.cursor.x != UNPLACED).then_some(self.cursor)
    }

    /// Raw cursor including the unplaced sentinel, for persistence.
    pub(crate) fn cursor_raw(&self) -> Position3 {
        self.cursor
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn is_working(&self) -> bool {
        self.working
    }

    /// Returns true when the flag actually flipped.
    pub fn set_working(&mut self, working: bool) -> bool {
        let changed = self.working != working;
        self.working = working;
        changed
    }

    pub fn inventory_full(&self) -> bool {
        self.inventory_full
    }

    /// Returns true when the flag actually flipped.
    pub fn set_inventory_full(&mut self, full: bool) -> bool {
        let changed = self.inventory_full != full;
        self.inventory_full = full;
        changed
    }

    pub fn chunk_mode(&self) -> bool {
        self.chunk_mode
    }

    pub fn silk_touch(&self) -> bool {
        self.silk_touch
    }

    pub fn current_radius(&self) -> i32 {
        self.current_radius
    }

    pub fn maximum_radius(&self) -> i32 {
        self.maximum_radius
    }

    /// Mode pair packed as a small ordinal: bit 0 chunk, bit 1 silk.
    pub fn mode_ordinal(&self) -> u8 {
        self.chunk_mode as u8 | (self.silk_touch as u8) << 1
    }

    // -----------------------------------------------------------------
    // Geometry
    // -----------------------------------------------------------------

    /// World-units one scan cell spans.
    pub fn grid_step(&self) -> i32 {
        if self.chunk_mode { CHUNK_SIZE } else { 1 }
    }

    /// Whole rings the current radius covers at the current granularity.
    pub fn rings(&self) -> i32 {
        self.current_radius / self.grid_step()
    }

    /// Cells the full scan will visit at the current radius and mode.
    pub fn total_cells(&self) -> i64 {
        scan::cells_within(self.rings())
    }

    /// Cells across the working area at the current radius: block columns
    /// in block mode, whole chunks in chunk mode.
    pub fn working_area_edge(&self) -> i32 {
        2 * self.rings() + 1
    }

    /// World anchor of the center cell: the controller column on the
    /// mining plane, floored to the chunk corner in chunk mode.
    fn center_anchor(&self) -> Position3 {
        let plane_y = self.origin.y - 1;
        if self.chunk_mode {
            Position3::new(
                chunk_floor(self.origin.x),
                plane_y,
                chunk_floor(self.origin.z),
            )
        } else {
            Position3::new(self.origin.x, plane_y, self.origin.z)
        }
    }

    fn cell_to_world(&self, cell: (i32, i32)) -> Position3 {
        let step = self.grid_step();
        self.center_anchor().offset(cell.0 * step, 0, cell.1 * step)
    }

    fn world_to_cell(&self, pos: Position3) -> (i32, i32) {
        // Cursor positions are exact cell anchors, so this divides evenly.
        let step = self.grid_step();
        let anchor = self.center_anchor();
        ((pos.x - anchor.x) / step, (pos.z - anchor.z) / step)
    }

    // -----------------------------------------------------------------
    // Scan control
    // -----------------------------------------------------------------

    /// The cell the next advance will visit, without moving. None when
    /// the next advance would exhaust the area.
    pub fn peek_cursor(&self) -> Option<Position3> {
        if self.done {
            return None;
        }
        let candidate = match self.cursor() {
            None => scan::first_cell(),
            Some(cursor) => scan::next_cell(self.world_to_cell(cursor)),
        };
        (scan::ring_of(candidate) <= self.rings()).then(|| self.cell_to_world(candidate))
    }

    /// Move to the next cell of the spiral and return it, or None once
    /// the area is exhausted. `done` latches on the same call that
    /// returns the final cell, so the number of Some returns from a
    /// fresh reset equals [`total_cells`](Self::total_cells).
    pub fn advance_cursor(&mut self) -> Option<Position3> {
        if self.done {
            return None;
        }
        let rings = self.rings();
        let candidate = match self.cursor() {
            None => scan::first_cell(),
            Some(cursor) => scan::next_cell(self.world_to_cell(cursor)),
        };
        if scan::ring_of(candidate) > rings {
            self.done = true;
            return None;
        }
        self.cursor = self.cell_to_world(candidate);
        if scan::ring_of(scan::next_cell(candidate)) > rings {
            self.done = true;
        }
        Some(self.cursor)
    }

    /// Re-center the scan on `origin` with the current radius. Clears the
    /// cursor and the done latch.
    pub fn reset_area(&mut self, origin: Position3) {
        self.origin = origin;
        self.cursor = Position3::new(UNPLACED, UNPLACED, UNPLACED);
        self.done = false;
    }

    /// Step the radius down by the mode-dependent decrement, wrapping to
    /// the maximum once it would drop to zero or below. Re-centers the
    /// scan. Returns the new radius.
    pub fn cycle_radius(&mut self) -> i32 {
        let step = if self.chunk_mode {
            RADIUS_STEP_CHUNK
        } else {
            RADIUS_STEP_BLOCK
        };
        let next = self.current_radius - step;
        self.current_radius = if next <= 0 { self.maximum_radius } else { next };
        self.reset_area(self.origin);
        self.current_radius
    }

    /// Set both mode flags. A chunk-granularity change invalidates the
    /// cursor grid, so the scan re-centers; a silk-touch-only change
    /// keeps the cursor in place.
    pub fn set_modes(&mut self, chunk_mode: bool, silk_touch: bool) {
        let chunk_changed = self.chunk_mode != chunk_mode;
        self.chunk_mode = chunk_mode;
        self.silk_touch = silk_touch;
        if chunk_changed {
            self.reset_area(self.origin);
        }
    }

    /// Advance to the next of the four mode states:
    /// neither, chunk-only, silk-only, both.
    pub fn cycle_modes(&mut self) -> (bool, bool) {
        let next = (self.mode_ordinal() + 1) & 3;
        self.set_modes(next & 1 != 0, next & 2 != 0);
        (self.chunk_mode, self.silk_touch)
    }

    /// Reinstate persisted scan state verbatim. The radius is clamped to
    /// `[1, maximum]` in case the stored value predates a spec change.
    pub fn restore_scan(
        &mut self,
        chunk_mode: bool,
        silk_touch: bool,
        radius: i32,
        cursor: Position3,
        done: bool,
    ) {
        self.chunk_mode = chunk_mode;
        self.silk_touch = silk_touch;
        self.current_radius = radius.clamp(1, self.maximum_radius);
        self.cursor = cursor;
        self.done = done;
    }
}

/// Largest multiple of [`CHUNK_SIZE`] at or below `v`.
fn chunk_floor(v: i32) -> i32 {
    v & !(CHUNK_SIZE - 1)
}
