//! Save/restore arena
//!
//! Snapshots live in a fixed number of slots addressed by the token handed
//! out at save time. Restoring a token drops every snapshot saved after it.

use tessel_core::{GraphicsError, Region, RenderingHints, Result};

use crate::transform::TransformPair;

/// Number of snapshot slots per context
pub const MAX_SAVED_STATES: usize = 512;

/// Token returned by a save or container begin
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateToken(u32);

impl StateToken {
    /// Token from its raw value, as received across an FFI boundary
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Complete copy of a context's drawing state
#[derive(Clone, Debug, PartialEq)]
pub struct StateSnapshot {
    pub transforms: TransformPair,
    pub clip: Region,
    pub hints: RenderingHints,
}

/// Bounded arena of snapshots
#[derive(Debug, Default)]
pub struct StateStack {
    slots: Vec<Option<StateSnapshot>>,
    count: usize,
}

impl StateStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live snapshots
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Store a snapshot in the next slot, replacing whatever it held
    pub fn save(&mut self, snapshot: StateSnapshot) -> Result<StateToken> {
        if self.count >= MAX_SAVED_STATES {
            return Err(GraphicsError::OutOfMemory("state stack exhausted"));
        }
        if self.slots.is_empty() {
            self.slots.resize_with(MAX_SAVED_STATES, || None);
        }

        let token = StateToken(self.count as u32);
        self.slots[token.index()] = Some(snapshot);
        self.count += 1;
        Ok(token)
    }

    /// Snapshot saved under `token`. Slots above it are discarded.
    pub fn restore(&mut self, token: StateToken) -> Result<&StateSnapshot> {
        if token.index() >= MAX_SAVED_STATES || token.index() > self.count {
            return Err(GraphicsError::InvalidParameter("unknown state token"));
        }
        let snapshot = self
            .slots
            .get(token.index())
            .and_then(Option::as_ref)
            .ok_or(GraphicsError::InvalidParameter("state slot was never saved"))?;

        self.count = token.index();
        Ok(snapshot)
    }

    /// Release every snapshot
    pub fn clear(&mut self) {
        self.slots.clear();
        self.count = 0;
    }
}
