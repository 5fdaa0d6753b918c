// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-memory profile store for tests that should not touch the filesystem.

use graft_config::{ConfigError, ProfileName, ProfileStore};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Default)]
struct Shelf {
    documents: BTreeMap<ProfileName, Vec<u8>>,
    reads: usize,
    writes: usize,
    unavailable: bool,
}

/// [`ProfileStore`] over a shared map of documents.
///
/// Clones share the same documents, so a test can hand one clone to
/// [`RuleSystemProfiles`](graft_config::RuleSystemProfiles) and inspect the
/// other.
///
/// # Example
///
/// ```
/// use graft_config::{ProfileName, RuleSystemProfiles};
/// use graft_dry_tests::InMemoryProfileStore;
///
/// let store = InMemoryProfileStore::new();
/// let profiles = RuleSystemProfiles::new(store.clone());
/// let name = ProfileName::default();
///
/// let config = profiles.load(&name).unwrap();
/// profiles.save(&name, &config).unwrap();
/// assert_eq!((store.reads(), store.writes()), (1, 1));
/// ```
#[derive(Clone, Default)]
pub struct InMemoryProfileStore {
    shelf: Arc<Mutex<Shelf>>,
}

impl InMemoryProfileStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a stored document, valid or not.
    pub fn with_document(self, name: ProfileName, json: impl Into<Vec<u8>>) -> Self {
        self.shelf().documents.insert(name, json.into());
        self
    }

    /// Makes every read and write fail as if the backing medium were gone.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.shelf().unavailable = unavailable;
    }

    /// Stored document for `name`, as text.
    pub fn document(&self, name: &ProfileName) -> Option<String> {
        self.shelf()
            .documents
            .get(name)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read attempts so far, failed ones included.
    pub fn reads(&self) -> usize {
        self.shelf().reads
    }

    /// Write attempts so far, failed ones included.
    pub fn writes(&self) -> usize {
        self.shelf().writes
    }

    fn shelf(&self) -> MutexGuard<'_, Shelf> {
        self.shelf.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn unavailable() -> ConfigError {
    ConfigError::Io(std::io::Error::other("profile store unavailable"))
}

impl ProfileStore for InMemoryProfileStore {
    fn read(&self, name: &ProfileName) -> Result<Option<Vec<u8>>, ConfigError> {
        let mut shelf = self.shelf();
        shelf.reads += 1;
        if shelf.unavailable {
            return Err(unavailable());
        }
        Ok(shelf.documents.get(name).cloned())
    }

    fn write(&self, name: &ProfileName, json: &[u8]) -> Result<(), ConfigError> {
        let mut shelf = self.shelf();
        shelf.writes += 1;
        if shelf.unavailable {
            return Err(unavailable());
        }
        shelf.documents.insert(name.clone(), json.to_vec());
        Ok(())
    }

    fn names(&self) -> Result<Vec<ProfileName>, ConfigError> {
        let shelf = self.shelf();
        if shelf.unavailable {
            return Err(unavailable());
        }
        Ok(shelf.documents.keys().cloned().collect())
    }
}
