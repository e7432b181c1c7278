//! Miner-specific sync messages.
//!
//! Queued into the machine's [`SyncOutbox`](monolith_core::net::SyncOutbox)
//! alongside the controller's own broadcasts. A joining observer gets one
//! `Full` snapshot; after that, only incremental updates flow, each keyed
//! by a stable small-integer tag.

use monolith_core::pos::Position3;
use serde::{Deserialize, Serialize};

/// Complete miner state for a newly joined observer: everything persisted
/// plus the transient working flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinerFullSync {
    pub chunk_mode: bool,
    pub silk_touch: bool,
    pub current_radius: i32,
    /// None until the scan has placed its first cell.
    pub cursor: Option<Position3>,
    pub done: bool,
    pub working_enabled: bool,
    pub working: bool,
    pub inventory_full: bool,
}

/// One incremental (or full) miner state update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinerSync {
    Full(MinerFullSync),
    /// `area_edge` is the working-area edge length in cells: blocks in
    /// block mode, chunks in chunk mode.
    RadiusChanged { radius: i32, area_edge: i32 },
    ModesChanged { chunk_mode: bool, silk_touch: bool },
    ScanDone,
    WorkingEnabledChanged { enabled: bool },
    InventoryFull { full: bool },
    WorkingChanged { working: bool },
}

/// Discriminant tag for miner sync messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MinerSyncKind {
    Full,
    RadiusChanged,
    ModesChanged,
    ScanDone,
    WorkingEnabledChanged,
    InventoryFull,
    WorkingChanged,
}

impl MinerSync {
    pub fn kind(&self) -> MinerSyncKind {
        match self {
            MinerSync::Full(_) => MinerSyncKind::Full,
            MinerSync::RadiusChanged { .. } => MinerSyncKind::RadiusChanged,
            MinerSync::ModesChanged { .. } => MinerSyncKind::ModesChanged,
            MinerSync::ScanDone => MinerSyncKind::ScanDone,
            MinerSync::WorkingEnabledChanged { .. } => MinerSyncKind::WorkingEnabledChanged,
            MinerSync::InventoryFull { .. } => MinerSyncKind::InventoryFull,
            MinerSync::WorkingChanged { .. } => MinerSyncKind::WorkingChanged,
        }
    }
}

impl MinerSyncKind {
    /// Stable small-integer wire tag. Never renumber these.
    pub fn tag(self) -> u8 {
        match self {
            MinerSyncKind::Full => 0,
            MinerSyncKind::RadiusChanged => 1,
            MinerSyncKind::ModesChanged => 2,
            MinerSyncKind::ScanDone => 3,
            MinerSyncKind::WorkingEnabledChanged => 4,
            MinerSyncKind::InventoryFull => 5,
            MinerSyncKind::WorkingChanged => 6,
        }
    }

    pub fn from_tag(tag: u8) -> Option<MinerSyncKind> {
        match tag {
            0 => Some(MinerSyncKind::Full),
            1 => Some(MinerSyncKind::RadiusChanged),
            2 => Some(MinerSyncKind::ModesChanged),
            3 => Some(MinerSyncKind::ScanDone),
            4 => Some(MinerSyncKind::WorkingEnabledChanged),
            5 => Some(MinerSyncKind::InventoryFull),
            6 => Some(MinerSyncKind::WorkingChanged),
            _ => None,
        }
    }
}
