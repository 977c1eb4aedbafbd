//! # Output Registry
//!
//! Generated files (QR PNGs, watermarked PDFs) kept in memory until the
//! front end is done with them.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Output Lifecycle                                     │
//! │                                                                         │
//! │  registry.insert(output) ──► OutputHandle (owns the entry)              │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │  tool slot.store(handle) ───► previous handle dropped ──► entry removed │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │  release_output(id) ────────► handle taken and dropped ─► entry removed │
//! │                                                                         │
//! │  Every entry in the registry has exactly one live handle.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

/// A generated file.
#[derive(Debug, Clone)]
pub struct StoredOutput {
    pub bytes: Arc<Vec<u8>>,
    pub mime_type: &'static str,
    pub file_name: String,
    /// Where the file was also written, if anywhere.
    pub path: Option<PathBuf>,
    pub created_at: DateTime<Utc>,
}

impl StoredOutput {
    pub fn new(bytes: Vec<u8>, mime_type: &'static str, file_name: impl Into<String>) -> Self {
        StoredOutput {
            bytes: Arc::new(bytes),
            mime_type,
            file_name: file_name.into(),
            path: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = Some(path);
        self
    }
}

/// Shared map of live outputs.
#[derive(Debug, Clone, Default)]
pub struct OutputRegistry {
    entries: Arc<Mutex<HashMap<Uuid, StoredOutput>>>,
}

impl OutputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `output`; it lives as long as the returned handle.
    pub fn insert(&self, output: StoredOutput) -> OutputHandle {
        let id = Uuid::new_v4();
        self.lock().insert(id, output);
        debug!(%id, "Registered output");
        OutputHandle {
            id,
            registry: self.clone(),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<StoredOutput> {
        self.lock().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn remove(&self, id: Uuid) {
        if self.lock().remove(&id).is_some() {
            debug!(%id, "Released output");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, StoredOutput>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owner of one registry entry. Dropping it releases the entry.
#[derive(Debug)]
pub struct OutputHandle {
    id: Uuid,
    registry: OutputRegistry,
}

impl OutputHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for OutputHandle {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}

/// The current output of one tool. Holds at most one handle.
#[derive(Debug, Clone, Default)]
pub struct OutputSlot {
    current: Arc<Mutex<Option<OutputHandle>>>,
}

impl OutputSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `handle` if `is_current()` still holds, releasing the
    /// previous output. The check and the swap happen under one lock.
    ///
    /// Returns false (and releases `handle`) when the check fails.
    pub fn store_if<F>(&self, handle: OutputHandle, is_current: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        let previous = {
            let mut current = self.lock();
            if !is_current() {
                return false;
            }
            current.replace(handle)
        };
        drop(previous);
        true
    }

    /// Removes the handle if it owns `id`.
    pub fn take_if(&self, id: Uuid) -> Option<OutputHandle> {
        let mut current = self.lock();
        match current.as_ref() {
            Some(handle) if handle.id == id => current.take(),
            _ => None,
        }
    }

    pub fn current_id(&self) -> Option<Uuid> {
        self.lock().as_ref().map(OutputHandle::id)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<OutputHandle>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(name: &str) -> StoredOutput {
        StoredOutput::new(name.as_bytes().to_vec(), "text/plain", name)
    }

    #[test]
    fn test_dropping_handle_releases_entry() {
        let registry = OutputRegistry::new();
        let handle = registry.insert(output("a.txt"));
        let id = handle.id();

        assert_eq!(registry.get(id).unwrap().file_name, "a.txt");
        drop(handle);
        assert!(registry.get(id).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_storing_in_slot_releases_previous() {
        let registry = OutputRegistry::new();
        let slot = OutputSlot::new();

        let first = registry.insert(output("1"));
        let first_id = first.id();
        assert!(slot.store_if(first, || true));

        let second = registry.insert(output("2"));
        let second_id = second.id();
        assert!(slot.store_if(second, || true));

        assert!(registry.get(first_id).is_none());
        assert!(registry.get(second_id).is_some());
        assert_eq!(registry.len(), 1);
        assert_eq!(slot.current_id(), Some(second_id));
    }

    #[test]
    fn test_rejected_store_keeps_current_output() {
        let registry = OutputRegistry::new();
        let slot = OutputSlot::new();

        let kept = registry.insert(output("kept"));
        let kept_id = kept.id();
        slot.store_if(kept, || true);

        let stale = registry.insert(output("stale"));
        assert!(!slot.store_if(stale, || false));

        assert_eq!(slot.current_id(), Some(kept_id));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_take_if_only_matches_own_id() {
        let registry = OutputRegistry::new();
        let slot = OutputSlot::new();
        let handle = registry.insert(output("x"));
        let id = handle.id();
        slot.store_if(handle, || true);

        assert!(slot.take_if(Uuid::new_v4()).is_none());
        let taken = slot.take_if(id).unwrap();
        drop(taken);

        assert!(slot.current_id().is_none());
        assert!(registry.is_empty());
    }
}
