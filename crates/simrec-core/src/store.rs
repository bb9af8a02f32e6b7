//! Model store abstraction: persists and restores the similarity index
//! snapshot so it survives process restarts without retraining.
//!
//! One snapshot per deployment, addressed by a fixed logical location.
//! `load` returns `None` (not an error) when nothing has been saved yet;
//! callers treat that as "must train first". The application crate provides
//! the on-disk implementation with atomic publish semantics.

use std::sync::RwLock;

use anyhow::Result;

use crate::index::Snapshot;

pub trait ModelStore: Send + Sync {
    /// Persist the snapshot. A concurrent `load` must never observe a
    /// partially written snapshot.
    fn save(&self, snapshot: &Snapshot) -> Result<()>;

    /// Read the most recently saved snapshot, or `None` if none exists.
    fn load(&self) -> Result<Option<Snapshot>>;
}

/// In-memory [`ModelStore`] for tests.
#[derive(Default)]
pub struct MemoryModelStore {
    slot: RwLock<Option<Snapshot>>,
}

impl MemoryModelStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelStore for MemoryModelStore {
    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        *self.slot.write().unwrap() = Some(snapshot.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<Snapshot>> {
        Ok(self.slot.read().unwrap().clone())
    }
}
