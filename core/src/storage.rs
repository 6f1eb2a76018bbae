//! Persistence seam. The engine hands encoded snapshots to a
//! [`SnapshotStore`] and never depends on where they end up.

use thiserror::Error;

/// Key (or file stem) under which the current game is stored.
pub const STORAGE_KEY: &str = "2048-game-state";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("snapshot storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

pub trait SnapshotStore {
    /// The stored snapshot, if any.
    fn load(&mut self) -> Result<Option<String>, StoreError>;

    fn save(&mut self, snapshot: &str) -> Result<(), StoreError>;

    /// Forget the stored snapshot. Clearing an empty store is not an error.
    fn clear(&mut self) -> Result<(), StoreError>;
}

/// In-memory store, for tests and hosts that persist on their own schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    pub snapshot: Option<String>,
    pub saves: usize,
}

impl MemoryStore {
    pub fn with_snapshot(snapshot: impl Into<String>) -> Self {
        MemoryStore {
            snapshot: Some(snapshot.into()),
            saves: 0,
        }
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&mut self) -> Result<Option<String>, StoreError> {
        Ok(self.snapshot.clone())
    }

    fn save(&mut self, snapshot: &str) -> Result<(), StoreError> {
        self.snapshot = Some(snapshot.to_owned());
        self.saves += 1;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.snapshot = None;
        Ok(())
    }
}

/// Stores whose owner opted out of persistence.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStore;

impl SnapshotStore for NoStore {
    fn load(&mut self) -> Result<Option<String>, StoreError> {
        Ok(None)
    }

    fn save(&mut self, _snapshot: &str) -> Result<(), StoreError> {
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for Box<S> {
    fn load(&mut self) -> Result<Option<String>, StoreError> {
        (**self).load()
    }

    fn save(&mut self, snapshot: &str) -> Result<(), StoreError> {
        (**self).save(snapshot)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        (**self).clear()
    }
}
