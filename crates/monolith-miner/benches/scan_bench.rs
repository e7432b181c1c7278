//! Criterion benchmarks for the scan spiral and the headless mining loop.

use criterion::{Criterion, criterion_group, criterion_main};
use monolith_core::config::{ControllerOptions, SimConfig};
use monolith_core::id::DimensionId;
use monolith_core::structure::TemplateMatcher;
use monolith_core::test_utils::*;
use monolith_miner::machine::{MinerEnv, MinerMachine, MinerSpec};
use monolith_miner::scan;

fn bench_spiral(c: &mut Criterion) {
    let mut group = c.benchmark_group("spiral");

    // Benchmark: walk a radius-64 area, 129x129 cells.
    group.bench_function("walk_radius_64", |b| {
        b.iter(|| {
            let visited = scan::spiral(64).count() as i64;
            assert_eq!(visited, scan::cells_within(64));
        });
    });

    group.finish();
}

fn bench_mining(c: &mut Criterion) {
    let mut group = c.benchmark_group("mining");
    group.sample_size(20);

    // Benchmark: form once, then mine a full radius-8 area to exhaustion.
    group.bench_function("mine_out_radius_8", |b| {
        b.iter(|| {
            let mut rig = miner_rig();
            seed_ore_layer(&mut rig.world, rig.origin, 10);
            let spec = MinerSpec {
                rated_tier: 1,
                energy_per_tick: 30,
                drilling_fluid: drilling_fluid(),
                fluid_per_tick: 10,
                maximum_radius: 8,
                fortune: 0,
            };
            let mut machine = MinerMachine::new(
                rig.origin,
                rig.facing,
                DimensionId(0),
                spec,
                miner_template(),
                &SimConfig::default(),
                &ControllerOptions::default(),
            );
            machine.controller_mut().notify_neighbor_changed();

            while !machine.logic().is_done() {
                let mut env = MinerEnv {
                    world: &rig.world,
                    matcher: &TemplateMatcher,
                    recipes: &mut rig.recipes,
                    arena: &mut rig.arena,
                };
                machine.tick(&mut env);
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_spiral, bench_mining);
criterion_main!(benches);
