//! The durable browser-local side of the system: three JSON array blobs under
//! well-known keys (tardiness records, options, pending mutations). Synchronous,
//! no network. There is no versioning or migration scheme; a shape change is a
//! breaking change for existing stored data.

use crate::model::{GradeStrandSection, PendingMutation, TardinessRecord};

pub const ENTRIES_KEY: &str = "tardinessData";
pub const OPTIONS_KEY: &str = "gradeStrandSections";
pub const PENDING_KEY: &str = "pendingSync";

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The storage area itself could not be reached (denied, quota, missing).
    #[error("local storage unavailable: {0}")]
    Unavailable(String),
    /// The stored blob under `key` was present but not parseable.
    #[error("stored blob under `{key}` is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Contract for the local snapshot store. Absent keys load as empty lists;
/// a present-but-unparseable blob loads as `CacheError::Corrupt`, which the
/// engine downgrades to an empty list plus a degraded-mode flag.
pub trait SnapshotCache {
    fn load_entries(&self) -> Result<Vec<TardinessRecord>, CacheError>;
    fn save_entries(&mut self, entries: &[TardinessRecord]) -> Result<(), CacheError>;

    fn load_options(&self) -> Result<Vec<GradeStrandSection>, CacheError>;
    fn save_options(&mut self, options: &[GradeStrandSection]) -> Result<(), CacheError>;

    fn load_pending(&self) -> Result<Vec<PendingMutation>, CacheError>;
    fn save_pending(&mut self, pending: &[PendingMutation]) -> Result<(), CacheError>;
}

/// Decode one stored blob. `None` (absent key) is an empty list.
pub(crate) fn decode_list<T: serde::de::DeserializeOwned>(
    raw: Option<&str>,
    key: &str,
) -> Result<Vec<T>, CacheError> {
    match raw {
        None => Ok(Vec::new()),
        Some(blob) => serde_json::from_str(blob).map_err(|e| CacheError::Corrupt {
            key: key.to_string(),
            reason: e.to_string(),
        }),
    }
}

pub(crate) fn encode_list<T: serde::Serialize>(items: &[T], key: &str) -> Result<String, CacheError> {
    serde_json::to_string(items).map_err(|e| CacheError::Corrupt {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

/// In-memory cache holding raw string blobs, parsed through the same codec as the
/// browser-backed cache. Used by the engine tests, including the ones that feed it
/// deliberately corrupt blobs.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryCache {
    blobs: std::collections::BTreeMap<&'static str, String>,
    pub fail_writes: bool,
}

#[cfg(test)]
impl MemoryCache {
    pub fn with_blob(key: &'static str, blob: &str) -> Self {
        let mut cache = Self::default();
        cache.blobs.insert(key, blob.to_string());
        cache
    }

    fn load<T: serde::de::DeserializeOwned>(&self, key: &'static str) -> Result<Vec<T>, CacheError> {
        decode_list(self.blobs.get(key).map(String::as_str), key)
    }

    fn save<T: serde::Serialize>(&mut self, key: &'static str, items: &[T]) -> Result<(), CacheError> {
        if self.fail_writes {
            return Err(CacheError::Unavailable("writes disabled".to_string()));
        }
        self.blobs.insert(key, encode_list(items, key)?);
        Ok(())
    }
}

#[cfg(test)]
impl SnapshotCache for MemoryCache {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_key_loads_empty() {
        let cache = MemoryCache::default();
        assert!(cache.load_entries().unwrap().is_empty());
        assert!(cache.load_options().unwrap().is_empty());
        assert!(cache.load_pending().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_blob_is_reported_not_panicked() {
        let cache = MemoryCache::with_blob(ENTRIES_KEY, "{not json[");
        let err = cache.load_entries().unwrap_err();
        assert!(matches!(err, CacheError::Corrupt { .. }));
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let mut cache = MemoryCache::default();
        let options = vec![GradeStrandSection {
            grade: 12,
            strand: "HUMSS".to_string(),
            section: "B".to_string(),
        }];
        cache.save_options(&options).unwrap();
        assert_eq!(cache.load_options().unwrap(), options);
    }
}
