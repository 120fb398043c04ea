//! Local cache backend over the browser's localStorage. Three JSON array blobs
//! under the keys the presentation layer has always used.

use crate::cache::{
    CacheError, ENTRIES_KEY, OPTIONS_KEY, PENDING_KEY, SnapshotCache, decode_list, encode_list,
};
use crate::model::{GradeStrandSection, PendingMutation, TardinessRecord};

pub struct WebStorageCache {
    storage: Option<web_sys::Storage>,
}

impl WebStorageCache {
    /// Grab the window's localStorage. A page running with storage denied
    /// (private-mode quirks, blocked third-party frames) still gets a cache; every
    /// operation on it reports `Unavailable` and the engine degrades to
    /// memory-only operation instead of the session failing.
    pub fn new() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            log::error!("localStorage unavailable, running memory-only");
        }
        Self { storage }
    }

    fn storage(&self) -> Result<&web_sys::Storage, CacheError> {
        self.storage
            .as_ref()
            .ok_or_else(|| CacheError::Unavailable("localStorage denied".to_string()))
    }

    fn load<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, CacheError> {
        let raw = self
            .storage()?
            .get_item(key)
            .map_err(|e| CacheError::Unavailable(format!("{e:?}")))?;
        decode_list(raw.as_deref(), key)
    }

    fn save<T: serde::Serialize>(&mut self, key: &str, items: &[T]) -> Result<(), CacheError> {
        let blob = encode_list(items, key)?;
        // set_item fails on quota exhaustion
        self.storage()?
            .set_item(key, &blob)
            .map_err(|e| CacheError::Unavailable(format!("{e:?}")))
    }
}

impl SnapshotCache for WebStorageCache {
    fn load_entries(&self) -> Result<Vec<TardinessRecord>, CacheError> {
        self.load(ENTRIES_KEY)
    }

    fn save_entries(&mut self, entries: &[TardinessRecord]) -> Result<(), CacheError> {
        self.save(ENTRIES_KEY, entries)
    }

    fn load_options(&self) -> Result<Vec<GradeStrandSection>, CacheError> {
        self.load(OPTIONS_KEY)
    }

    fn save_options(&mut self, options: &[GradeStrandSection]) -> Result<(), CacheError> {
        self.save(OPTIONS_KEY, options)
    }

    fn load_pending(&self) -> Result<Vec<PendingMutation>, CacheError> {
        self.load(PENDING_KEY)
    }

    fn save_pending(&mut self, pending: &[PendingMutation]) -> Result<(), CacheError> {
        self.save(PENDING_KEY, pending)
    }
}
