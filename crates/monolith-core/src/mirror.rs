//! Read-only display mirror.
//!
//! The tick thread owns the authoritative state; presentation reads a
//! mirrored [`DisplaySnapshot`] instead. Snapshots are pushed only when
//! something actually changed, so a display layer can poll
//! [`DisplayMirror::revision`] cheaply and re-render at most once per real
//! transition. Readers must tolerate staleness of up to one tick; the host
//! decides how the mirror crosses threads.

use serde::{Deserialize, Serialize};

use crate::voiding::VoidingMode;

/// Presentable state of one controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySnapshot {
    pub formed: bool,
    pub active: bool,
    /// Gated problems mask, set bit = fixed.
    pub problems: u8,
    /// Broken slot count derived from the mask.
    pub problem_count: u32,
    pub voiding_mode: VoidingMode,
}

/// Last published snapshot plus a change counter.
#[derive(Debug, Default)]
pub struct DisplayMirror {
    current: DisplaySnapshot,
    revision: u64,
}

impl DisplayMirror {
    pub fn snapshot(&self) -> DisplaySnapshot {
        self.current
    }

    /// Bumps on every accepted publish. Equal revisions mean equal
    /// snapshots.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the snapshot if it differs. Returns whether it did.
    pub fn publish(&mut self, snapshot: DisplaySnapshot) -> bool {
        if snapshot == self.current {
            return false;
        }
        self.current = snapshot;
        self.revision += 1;
        true
    }
}
