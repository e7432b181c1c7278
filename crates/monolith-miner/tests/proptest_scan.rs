//! Property-based tests for the scan geometry and the miner's persisted
//! state.
//!
//! Uses proptest to sweep radii, origins, and mode combinations, then
//! verify the structural invariants: the spiral covers its square exactly
//! once, the cursor visits exactly `total_cells` positions, the radius
//! cycle stays in range, and saves survive the envelope bit for bit.

use std::collections::HashSet;

use monolith_core::persist::{ControllerSaved, decode_with_header, encode_with_header};
use monolith_core::pos::Position3;
use monolith_miner::logic::{MinerLogic, RADIUS_STEP_BLOCK, RADIUS_STEP_CHUNK};
use monolith_miner::machine::{MinerMachineSaved, MinerSaved};
use monolith_miner::scan::{cells_within, ring_of, spiral};
use monolith_miner::tier::{MAX_TIER, energy_tier, floor_tier, scaled_energy_cost, tier_voltage};
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

fn arb_origin() -> impl Strategy<Value = Position3> {
    (-1_000..1_000i32, 0..256i32, -1_000..1_000i32)
        .prop_map(|(x, y, z)| Position3::new(x, y, z))
}

fn arb_controller_saved() -> impl Strategy<Value = ControllerSaved> {
    (
        any::<u8>(),
        any::<bool>(),
        any::<i32>(),
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        any::<i32>(),
    )
        .prop_map(
            |(
                problems,
                initial_maintenance_done,
                time_active,
                stored_taped,
                voiding_items,
                voiding_fluids,
                voiding_mode,
            )| ControllerSaved {
                problems,
                initial_maintenance_done,
                time_active,
                stored_taped,
                voiding_items,
                voiding_fluids,
                voiding_mode,
            },
        )
}

fn arb_miner_saved() -> impl Strategy<Value = MinerSaved> {
    (
        any::<bool>(),
        any::<bool>(),
        any::<i32>(),
        any::<i32>(),
        any::<i32>(),
        any::<i32>(),
        any::<bool>(),
    )
        .prop_map(
            |(chunk_mode, silk_touch, current_radius, cursor_x, cursor_y, cursor_z, done)| {
                MinerSaved {
                    chunk_mode,
                    silk_touch,
                    current_radius,
                    cursor_x,
                    cursor_y,
                    cursor_z,
                    done,
                }
            },
        )
}

fn arb_machine_saved() -> impl Strategy<Value = MinerMachineSaved> {
    (arb_controller_saved(), arb_miner_saved())
        .prop_map(|(controller, miner)| MinerMachineSaved { controller, miner })
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// The spiral enumerates the `(2n+1)^2` square exactly once, with ring
    /// numbers that never decrease along the walk.
    #[test]
    fn spiral_covers_the_square_exactly_once(rings in 0..8i32) {
        let cells: Vec<(i32, i32)> = spiral(rings).collect();
        prop_assert_eq!(cells.len() as i64, cells_within(rings));

        let unique: HashSet<(i32, i32)> = cells.iter().copied().collect();
        prop_assert_eq!(unique.len(), cells.len(), "spiral revisited a cell");

        let mut last_ring = 0;
        for cell in &cells {
            let ring = ring_of(*cell);
            prop_assert!(ring <= rings);
            prop_assert!(ring >= last_ring, "walk left ring {last_ring} for {ring}");
            last_ring = ring;
        }
        for u in -rings..=rings {
            for v in -rings..=rings {
                prop_assert!(unique.contains(&(u, v)), "missing cell ({u}, {v})");
            }
        }
    }

    /// From any origin, in either granularity, the cursor yields exactly
    /// `total_cells` distinct positions on the mining plane and then
    /// latches done.
    #[test]
    fn scan_advances_exactly_total_cells(
        origin in arb_origin(),
        radius in 1..40i32,
        chunk_mode in any::<bool>(),
    ) {
        let mut logic = MinerLogic::new(origin, radius);
        logic.set_modes(chunk_mode, false);
        let expected = logic.total_cells();

        let mut visited = HashSet::new();
        while let Some(cell) = logic.advance_cursor() {
            prop_assert_eq!(cell.y, origin.y - 1, "cell left the mining plane");
            prop_assert!(visited.insert(cell), "cursor revisited {:?}", cell);
            prop_assert!(visited.len() as i64 <= expected, "scan overran its area");
        }
        prop_assert_eq!(visited.len() as i64, expected);
        prop_assert!(logic.is_done());
        prop_assert_eq!(logic.advance_cursor(), None);
        prop_assert_eq!(logic.peek_cursor(), None);
    }

    /// Cycling the radius walks down in mode-sized steps, never leaves
    /// `[1, maximum]`, and returns to the maximum after a full lap.
    #[test]
    fn radius_cycle_stays_in_range_and_wraps(
        maximum in 1..200i32,
        chunk_mode in any::<bool>(),
    ) {
        let mut logic = MinerLogic::new(Position3::new(0, 64, 0), maximum);
        logic.set_modes(chunk_mode, false);
        let step = if chunk_mode { RADIUS_STEP_CHUNK } else { RADIUS_STEP_BLOCK };

        // One full lap: ceil(maximum / step) cycles land back on maximum.
        let lap = (maximum + step - 1) / step;
        let mut radius = maximum;
        for _ in 0..lap {
            logic.advance_cursor();
            radius = logic.cycle_radius();
            prop_assert!((1..=maximum).contains(&radius),
                "radius {radius} left [1, {maximum}]");
            prop_assert_eq!(logic.cursor(), None, "cycle must re-center the scan");
        }
        prop_assert_eq!(radius, maximum);
    }

    /// Any machine save survives the envelope unchanged. Field sanitization
    /// happens on restore, never in the codec.
    #[test]
    fn machine_saves_round_trip(saved in arb_machine_saved()) {
        let blob = encode_with_header(&saved).unwrap();
        let decoded: MinerMachineSaved = decode_with_header(&blob).unwrap();
        prop_assert_eq!(decoded, saved);
    }

    /// `floor_tier` brackets the voltage on the ladder, and the running
    /// tier stays within one step of rated with cost quadrupling per step.
    #[test]
    fn tier_ladder_brackets_the_voltage(
        voltage in 8i64..1_000_000_000,
        rated in 0..12u32,
    ) {
        let tier = floor_tier(voltage);
        prop_assert!(tier_voltage(tier) <= voltage);
        if tier < MAX_TIER {
            prop_assert!(voltage < tier_voltage(tier + 1));
        }

        let running = energy_tier(rated, voltage);
        prop_assert!(running >= rated);
        prop_assert!(running <= rated + 1);
        let cost = scaled_energy_cost(30, rated, running);
        if running == rated {
            prop_assert_eq!(cost, 30);
        } else {
            prop_assert_eq!(cost, 120);
        }
    }
}
