//! Monolith Core -- the simulation engine for multiblock machines.
//!
//! This crate provides everything a multiblock installation needs to run
//! headless: structure templates and matching, capability discovery,
//! resource drains with simulate/commit semantics, wear-and-problem
//! maintenance, voiding policy, client sync and display mirroring, and
//! versioned persistence. Machine-specific behavior (such as the large
//! miner in `monolith-miner`) composes these pieces.
//!
//! # Two-Phase Tick
//!
//! Each simulation tick drives a [`controller::MultiblockController`]
//! through two calls:
//!
//! 1. **Begin** -- [`controller::MultiblockController::begin_tick`] advances
//!    the tick counter and settles structure state: a formed machine is
//!    re-validated against its template (unforming on mismatch), an unformed
//!    one re-attempts formation if a neighbor change was reported.
//! 2. **Finish** -- [`controller::MultiblockController::finish_tick`] folds
//!    in the machine's own work result, broadcasts active-state transitions,
//!    runs maintenance wear, and refreshes the display mirror.
//!
//! Between the two calls the owning machine performs its work (mining,
//! draining energy and fluid, exporting items) against the providers the
//! structure match discovered.
//!
//! # Simulate Then Commit
//!
//! Every resource operation runs twice: once with `commit = false` to test
//! feasibility and once with `commit = true` to apply it. A tick that fails
//! the simulation leaves all providers untouched.
//!
//! # Key Types
//!
//! - [`controller::MultiblockController`] -- Formation lifecycle, tick
//!   orchestration, sync outbox, and persistence for one machine.
//! - [`structure::StructureTemplate`] -- Slab/row/column shape description
//!   with per-cell predicate alternatives.
//! - [`structure::TemplateMatcher`] -- Walks a template against a
//!   [`providers::WorldView`] and collects abilities and context.
//! - [`providers::ProviderArena`] -- Slotmap-backed ownership of boxed
//!   capability providers; controllers hold only keys.
//! - [`maintenance::MaintenanceModel`] -- Six problem flags, wear clock,
//!   and the per-interval problem roll.
//! - [`voiding::VoidingConfig`] -- Overflow policy for items and fluids.
//! - [`net::SyncOutbox`] -- Bounded ring of state-change messages for a
//!   client layer to drain.
//! - [`persist`] -- Versioned, header-checked bitcode encoding.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic math.

pub mod ability;
pub mod config;
pub mod controller;
pub mod error;
pub mod fixed;
pub mod id;
pub mod maintenance;
pub mod mirror;
pub mod net;
pub mod persist;
pub mod pos;
pub mod providers;
pub mod rng;
pub mod structure;
pub mod voiding;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
