//! Property-based tests for the core controller machinery.
//!
//! Uses proptest to generate random mutation sequences and persisted
//! states, then verify the structural invariants hold: the problems mask
//! never leaves its six bits, voiding ordinals are total, the RNG respects
//! its bound, and saves survive the envelope bit for bit.

use monolith_core::config::{ControllerOptions, SimConfig};
use monolith_core::maintenance::{ALL_FIXED, MaintenanceModel, PROBLEM_COUNT, ProblemKind};
use monolith_core::persist::{ControllerSaved, decode_with_header, encode_with_header};
use monolith_core::rng::SimRng;
use monolith_core::test_utils::TestMaintenanceHatch;
use monolith_core::voiding::VoidingMode;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

/// Mutations an embedding host can apply to the maintenance model.
#[derive(Debug, Clone)]
enum MaintOp {
    Fix(u32),
    FixAll,
    Cause,
    /// Run this many active ticks against a fast-wear hatch.
    Wear(u16),
}

fn arb_maintenance_ops(max_ops: usize) -> impl Strategy<Value = Vec<MaintOp>> {
    proptest::collection::vec(
        prop_oneof![
            (0..PROBLEM_COUNT).prop_map(MaintOp::Fix),
            Just(MaintOp::FixAll),
            Just(MaintOp::Cause),
            (1..200u16).prop_map(MaintOp::Wear),
        ],
        1..=max_ops,
    )
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

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// The problems mask never grows bits outside the six slots, no matter
    /// what sequence of repairs, injections, and wear ticks hits it.
    #[test]
    fn problem_mask_stays_within_six_bits(ops in arb_maintenance_ops(60), seed in any::<u64>()) {
        let mut model = MaintenanceModel::new(&SimConfig::default(), &ControllerOptions::default());
        let mut hatch = TestMaintenanceHatch::new().with_time_multiplier(1000.0);
        let mut rng = SimRng::new(seed);

        for op in ops {
            let before = model.problem_count();
            match op {
                MaintOp::Fix(slot) => {
                    let kind = ProblemKind::from_index(slot).unwrap();
                    model.fix(kind);
                    prop_assert!(model.is_fixed(kind));
                    prop_assert!(model.problem_count() <= before);
                }
                MaintOp::FixAll => {
                    model.fix_all();
                    prop_assert!(!model.has_problems());
                }
                MaintOp::Cause => {
                    model.cause_problem(&mut rng);
                    // Break one slot: at most one more problem, never fewer.
                    prop_assert!(model.problem_count() >= before);
                    prop_assert!(model.problem_count() <= before + 1);
                }
                MaintOp::Wear(ticks) => {
                    for _ in 0..ticks {
                        model.tick(Some(&mut hatch), &mut rng);
                    }
                }
            }
            prop_assert_eq!(model.raw_problems() & !ALL_FIXED, 0,
                "stray bits in mask {:#010b}", model.raw_problems());
            prop_assert!(model.problem_count() <= PROBLEM_COUNT);
        }
    }

    /// Every i32 resolves to a voiding mode, in-range ordinals round-trip,
    /// and anything else reads as no voiding.
    #[test]
    fn voiding_ordinal_is_total(ordinal in any::<i32>()) {
        let mode = VoidingMode::from_ordinal(ordinal);
        prop_assert!(VoidingMode::ALL.contains(&mode));
        if (0..=3).contains(&ordinal) {
            prop_assert_eq!(mode.ordinal(), ordinal);
        } else {
            prop_assert_eq!(mode, VoidingMode::None);
        }
    }

    /// `next_below` never reaches its bound and the stream is a pure
    /// function of the seed.
    #[test]
    fn rng_respects_bound_and_seed(seed in any::<u64>(), bound in 2..10_000u32) {
        let mut a = SimRng::new(seed);
        let mut b = SimRng::new(seed);
        for _ in 0..100 {
            let draw = a.next_below(bound);
            prop_assert!(draw < bound, "draw {draw} reached bound {bound}");
            prop_assert_eq!(draw, b.next_below(bound));
        }
    }

    /// Any controller save survives the envelope unchanged, including
    /// hostile field values; sanitization is restore's job, not the codec's.
    #[test]
    fn controller_saves_round_trip(saved in arb_controller_saved()) {
        let blob = encode_with_header(&saved).unwrap();
        let decoded: ControllerSaved = decode_with_header(&blob).unwrap();
        prop_assert_eq!(decoded, saved);
    }
}
