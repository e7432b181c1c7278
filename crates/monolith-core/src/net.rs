//! State-change broadcasts and the outbox that queues them.
//!
//! Controllers never talk to a socket. They push logical messages into a
//! [`SyncOutbox`] only when state actually changes; the host drains the
//! outbox after each tick and frames the payloads however it likes. The
//! outbox is a fixed-capacity ring: if a host stops draining, the oldest
//! broadcasts are dropped rather than growing without bound, and the drop
//! count is observable.

use serde::{Deserialize, Serialize};

use crate::fixed::Ticks;
use crate::id::DimensionId;
use crate::pos::Position3;

/// Default outbox capacity. Plenty for the handful of transitions a
/// controller can emit per tick.
pub const DEFAULT_OUTBOX_CAPACITY: usize = 64;

/// One logical broadcast to observers. Every message carries the tick it
/// was emitted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncMessage {
    /// The controller's active flag flipped.
    ActiveStateChanged { active: bool, tick: Ticks },
    /// The maintenance hatch's duct-tape flag flipped.
    TapedStateChanged { taped: bool, tick: Ticks },
    /// Variant blocks captured at match time should toggle their visual
    /// state. Scoped by dimension so observers can filter.
    VariantBlocksActive {
        dimension: DimensionId,
        active: bool,
        positions: Vec<Position3>,
        tick: Ticks,
    },
}

/// Discriminant tag for sync messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncKind {
    ActiveStateChanged,
    TapedStateChanged,
    VariantBlocksActive,
}

impl SyncMessage {
    pub fn kind(&self) -> SyncKind {
        match self {
            SyncMessage::ActiveStateChanged { .. } => SyncKind::ActiveStateChanged,
            SyncMessage::TapedStateChanged { .. } => SyncKind::TapedStateChanged,
            SyncMessage::VariantBlocksActive { .. } => SyncKind::VariantBlocksActive,
        }
    }

    pub fn tick(&self) -> Ticks {
        match self {
            SyncMessage::ActiveStateChanged { tick, .. }
            | SyncMessage::TapedStateChanged { tick, .. }
            | SyncMessage::VariantBlocksActive { tick, .. } => *tick,
        }
    }
}

impl SyncKind {
    /// Stable small-integer wire tag. Never renumber these.
    pub fn tag(self) -> u8 {
        match self {
            SyncKind::ActiveStateChanged => 0,
            SyncKind::TapedStateChanged => 1,
            SyncKind::VariantBlocksActive => 2,
        }
    }

    pub fn from_tag(tag: u8) -> Option<SyncKind> {
        match tag {
            0 => Some(SyncKind::ActiveStateChanged),
            1 => Some(SyncKind::TapedStateChanged),
            2 => Some(SyncKind::VariantBlocksActive),
            _ => None,
        }
    }
}

/// Fixed-capacity ring of pending broadcasts. When full, the oldest message
/// is dropped. Generic over the message type so machine layers can queue
/// their own sync enums through the same ring.
#[derive(Debug)]
pub struct SyncOutbox<M = SyncMessage> {
    messages: Vec<Option<M>>,
    /// Write position (wraps around).
    head: usize,
    len: usize,
    /// Total messages ever pushed, including dropped ones.
    total_written: u64,
    /// Total messages handed out via `drain`.
    drained: u64,
}

impl<M> Default for SyncOutbox<M> {
    fn default() -> Self {
        Self::new(DEFAULT_OUTBOX_CAPACITY)
    }
}

impl<M> SyncOutbox<M> {
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            messages: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
            drained: 0,
        }
    }

    pub fn push(&mut self, message: M) {
        self.messages[self.head] = Some(message);
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.messages.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Messages lost to ring wraparound since creation.
    pub fn dropped_count(&self) -> u64 {
        self.total_written.saturating_sub(self.drained + self.len as u64)
    }

    /// Remove and return all pending messages, oldest first.
    pub fn drain(&mut self) -> Vec<M> {
        let mut out = Vec::with_capacity(self.len);
        let start = if self.len < self.capacity() {
            0
        } else {
            // head is the next write position, so also the oldest entry
            self.head
        };
        for i in 0..self.len {
            let idx = (start + i) % self.capacity();
            if let Some(message) = self.messages[idx].take() {
                out.push(message);
            }
        }
        self.drained += out.len() as u64;
        self.head = 0;
        self.len = 0;
        out
    }
}
