//! Monolith Miner -- the large extraction machine built on Monolith Core.
//!
//! A miner is a multiblock that chews through a square working area one
//! cell per tick, spiraling outward from its controller. Each mining tick
//! gates on energy (tier-scaled, with overclock), drilling fluid, and
//! output space before consuming anything; a failed gate stalls the
//! machine for the tick and is retried on the next.
//!
//! # Key Types
//!
//! - [`machine::MinerMachine`] -- Controller, scan logic, and resource
//!   gating composed into one tickable unit.
//! - [`machine::MinerSpec`] -- Static per-variant parameters (rated tier,
//!   per-tick costs, maximum radius).
//! - [`logic::MinerLogic`] -- Scan cursor, radius cycling, chunk/silk
//!   modes, and the sticky done latch.
//! - [`scan`] -- The expanding-square spiral the cursor follows.
//! - [`tier`] -- Voltage tier ladder and overclock math.
//! - [`sync::MinerSync`] -- Incremental state updates for observers,
//!   keyed by stable wire tags.

pub mod logic;
pub mod machine;
pub mod scan;
pub mod sync;
pub mod tier;
