//! The reconciliation engine's synchronous half: the canonical in-memory
//! collections, the duplicate gate, the pending-mutation queue, and persistence
//! into the local cache. Everything that touches the network lives in
//! [`crate::sync`]; this type never awaits.
//!
//! The engine is an explicit context object owned by the application entry point.
//! The presentation layer only ever sees snapshot clones; every mutation routes
//! through the methods here.

use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::{DateTime, Local, Utc};
use slotmap::SlotMap;

use crate::cache::{CacheError, SnapshotCache};
use crate::model::{
    GradeStrandSection, NewEntry, PendingMutation, SyncStatus, TardinessRecord, normalize_name,
};

slotmap::new_key_type! {
    /// Key for a registered change listener.
    pub struct ListenerKey;
}

/// Result of the same-day duplicate scan that gates entry creation.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateCheck {
    pub is_duplicate: bool,
    /// Which late entry of the day this would be, for ordinal display
    /// ("2nd late entry today"). Existing matches plus one.
    pub count: usize,
    /// The most recent matching record from earlier today, if any.
    pub previous: Option<TardinessRecord>,
}

/// Whether a commit runs the duplicate gate. `Force` is the second, explicit
/// confirm call after the caller showed the duplicate warning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DuplicatePolicy {
    Check,
    Force,
}

/// Outcome of [`Reconciler::commit_entry`].
#[derive(Clone, Debug)]
pub enum Staged {
    Committed(TardinessRecord),
    /// Nothing was inserted; the caller decides whether to confirm.
    Duplicate(DuplicateCheck),
}

#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    #[error("no record with id `{0}`")]
    UnknownId(String),
    #[error("no option `{0}`")]
    UnknownOption(String),
}

/// An add-option request that collides with an existing triple. Rejection is
/// final: nothing is inserted and nothing is queued.
#[derive(Debug, thiserror::Error)]
#[error("option `{}` already exists", .0.doc_id())]
pub struct DuplicateOption(pub GradeStrandSection);

/// The canonical state holder. Owns the two record collections, the pending
/// queue, and the per-record sync status map.
pub struct Reconciler<C> {
    cache: C,
    entries: im::Vector<TardinessRecord>,
    options: im::Vector<GradeStrandSection>,
    pending: Vec<PendingMutation>,
    statuses: BTreeMap<String, SyncStatus>,
    listeners: SlotMap<ListenerKey, Rc<dyn Fn()>>,
    online: bool,
    degraded: bool,
    id_seq: u64,
}

impl<C: SnapshotCache> Reconciler<C> {
    pub fn new(cache: C, online: bool) -> Self {
        Self {
            cache,
            entries: im::Vector::new(),
            options: im::Vector::new(),
            pending: Vec::new(),
            statuses: BTreeMap::new(),
            listeners: SlotMap::with_key(),
            online,
            degraded: false,
            id_seq: 0,
        }
    }

    /// Populate the collections from the local cache. Corrupt or unreachable
    /// storage degrades to empty collections rather than failing the session.
    pub fn load_local(&mut self) {
        self.entries = self
            .load_or_default(SnapshotCache::load_entries, "entries")
            .into();
        self.options = self
            .load_or_default(SnapshotCache::load_options, "options")
            .into();
        self.pending = self.load_or_default(SnapshotCache::load_pending, "pending");
        self.recompute_statuses();
    }

    fn load_or_default<T>(
        &mut self,
        load: impl Fn(&C) -> Result<Vec<T>, CacheError>,
        what: &str,
    ) -> Vec<T> {
        match load(&self.cache) {
            Ok(items) => items,
            Err(e) => {
                log::error!("Loading {what} from local cache failed, starting empty: {e}");
                self.degraded = true;
                Vec::new()
            }
        }
    }

    /// Load-time overlay of the remote snapshot. By identity: unknown remote
    /// documents are inserted, colliding ones overwrite the local copy. This is a
    /// cache refresh, not a conflict-resolution policy; it only runs against a
    /// freshly fetched snapshot. Merging the same snapshot twice is a no-op the
    /// second time.
    pub fn merge_remote(
        &mut self,
        remote_entries: Vec<TardinessRecord>,
        remote_options: Vec<GradeStrandSection>,
    ) {
        for remote in remote_entries {
            match self.entries.iter().position(|e| e.id == remote.id) {
                Some(i) => {
                    self.entries.set(i, remote);
                }
                None => self.entries.push_back(remote),
            }
        }
        self.entries
            .sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        for remote in remote_options {
            match self.options.iter().position(|o| *o == remote) {
                Some(_) => {}
                None => self.options.push_back(remote),
            }
        }
        self.options.sort();

        self.recompute_statuses();
        self.persist_entries();
        self.persist_options();
    }

    /// Scan today's records (local midnight to next local midnight) for the same
    /// student in the same grade/strand/section. Name comparison is
    /// case-insensitive; the categorical fields must match exactly.
    pub fn check_duplicate(&self, candidate: &NewEntry, now: DateTime<Utc>) -> DuplicateCheck {
        let normalized = NewEntry {
            full_name: normalize_name(&candidate.full_name),
            ..candidate.clone()
        };
        let today = now.with_timezone(&Local).date_naive();
        // entries are newest-first, so the first match is the most recent one
        let matches: Vec<&TardinessRecord> = self
            .entries
            .iter()
            .filter(|e| e.timestamp.with_timezone(&Local).date_naive() == today)
            .filter(|e| normalized.matches(e))
            .collect();

        DuplicateCheck {
            is_duplicate: !matches.is_empty(),
            count: matches.len() + 1,
            previous: matches.first().map(|e| (*e).clone()),
        }
    }

    /// Commit a candidate entry: duplicate gate (unless forced), fresh id,
    /// timestamp now, prepend, persist. The record starts `LocalOnly`; the caller
    /// settles its status once the remote write resolves.
    pub fn commit_entry(
        &mut self,
        candidate: NewEntry,
        policy: DuplicatePolicy,
        now: DateTime<Utc>,
    ) -> Staged {
        if policy == DuplicatePolicy::Check {
            let check = self.check_duplicate(&candidate, now);
            if check.is_duplicate {
                return Staged::Duplicate(check);
            }
        }

        let record = TardinessRecord {
            id: self.generate_id(now),
            full_name: normalize_name(&candidate.full_name),
            grade: candidate.grade,
            strand: candidate.strand,
            section: candidate.section,
            timestamp: now,
        };
        self.entries.push_front(record.clone());
        self.statuses
            .insert(record.id.clone(), SyncStatus::LocalOnly);
        self.persist_entries();
        Staged::Committed(record)
    }

    /// Replace the fields of the record with `id`. The timestamp becomes the edit
    /// instant, overwriting the original occurrence time; id and position in the
    /// collection are unchanged.
    pub fn commit_edit(
        &mut self,
        id: &str,
        fields: NewEntry,
        now: DateTime<Utc>,
    ) -> Result<TardinessRecord, CommitError> {
        let i = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| CommitError::UnknownId(id.to_string()))?;

        let record = TardinessRecord {
            id: id.to_string(),
            full_name: normalize_name(&fields.full_name),
            grade: fields.grade,
            strand: fields.strand,
            section: fields.section,
            timestamp: now,
        };
        self.entries.set(i, record.clone());
        self.statuses
            .insert(record.id.clone(), SyncStatus::LocalOnly);
        self.persist_entries();
        Ok(record)
    }

    /// Remove the record with `id` from memory and the local cache, unconditionally.
    pub fn commit_delete(&mut self, id: &str) -> Result<TardinessRecord, CommitError> {
        let i = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| CommitError::UnknownId(id.to_string()))?;
        let removed = self.entries.remove(i);
        self.statuses.remove(id);
        self.persist_entries();
        Ok(removed)
    }

    /// Insert a new option. A colliding triple is rejected outright; the option
    /// set keeps its (grade, strand, section) order.
    pub fn commit_add_option(
        &mut self,
        option: GradeStrandSection,
    ) -> Result<(), DuplicateOption> {
        if self.options.contains(&option) {
            return Err(DuplicateOption(option));
        }
        self.options.push_back(option);
        self.options.sort();
        self.persist_options();
        Ok(())
    }

    pub fn commit_delete_option(
        &mut self,
        option: &GradeStrandSection,
    ) -> Result<(), CommitError> {
        let i = self
            .options
            .iter()
            .position(|o| o == option)
            .ok_or_else(|| CommitError::UnknownOption(option.doc_id()))?;
        self.options.remove(i);
        self.persist_options();
        Ok(())
    }

    /// Append a mutation that could not be applied remotely. The queue is durable:
    /// it survives a page reload through the local cache.
    pub fn enqueue(&mut self, mutation: PendingMutation) {
        if let Some(id) = mutation.entry_id()
            && self.statuses.contains_key(id)
        {
            self.statuses.insert(id.to_string(), SyncStatus::LocalOnly);
        }
        self.pending.push(mutation);
        self.persist_pending();
    }

    /// Drop exactly the first `n` queued mutations after a fully successful replay
    /// pass. Mutations enqueued while the replay's remote calls were in flight
    /// stay queued.
    pub fn clear_pending(&mut self, n: usize) {
        for mutation in self.pending.drain(..n.min(self.pending.len())) {
            if let Some(id) = mutation.entry_id()
                && self.statuses.contains_key(id)
            {
                self.statuses.insert(id.to_string(), SyncStatus::Synced);
            }
        }
        self.persist_pending();
    }

    pub fn mark_syncing(&mut self, id: &str) {
        if self.statuses.contains_key(id) {
            self.statuses.insert(id.to_string(), SyncStatus::Syncing);
        }
    }

    pub fn mark_synced(&mut self, id: &str) {
        if self.statuses.contains_key(id) {
            self.statuses.insert(id.to_string(), SyncStatus::Synced);
        }
    }

    /// Record a connectivity transition. Returns true when this call moved the
    /// engine from offline to online, which is the caller's cue to replay.
    pub fn set_online(&mut self, online: bool) -> bool {
        let went_online = online && !self.online;
        self.online = online;
        went_online
    }

    pub fn is_online(&self) -> bool {
        self.online
    }

    /// True once any local-cache operation has failed; the session keeps running
    /// in memory but the user should see a degraded-mode notice.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn entries(&self) -> im::Vector<TardinessRecord> {
        self.entries.clone()
    }

    pub fn options(&self) -> im::Vector<GradeStrandSection> {
        self.options.clone()
    }

    pub fn pending(&self) -> Vec<PendingMutation> {
        self.pending.clone()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn status(&self, id: &str) -> Option<SyncStatus> {
        self.statuses.get(id).copied()
    }

    pub fn subscribe(&mut self, listener: Rc<dyn Fn()>) -> ListenerKey {
        self.listeners.insert(listener)
    }

    pub fn unsubscribe(&mut self, key: ListenerKey) {
        self.listeners.remove(key);
    }

    /// Clones of the registered listeners, so the caller can invoke them after
    /// releasing its borrow. A listener may immediately re-read the engine.
    pub fn listener_snapshot(&self) -> Vec<Rc<dyn Fn()>> {
        self.listeners.values().cloned().collect()
    }

    /// A time-based component plus a hashed one, both base36. Process-local
    /// uniqueness is guaranteed by the sequence counter; cross-session collision
    /// would need two sessions in the same millisecond hashing to the same value,
    /// which we treat as negligible.
    fn generate_id(&mut self, now: DateTime<Utc>) -> String {
        self.id_seq = self.id_seq.wrapping_add(1);
        let millis = now.timestamp_millis().max(0) as u64;
        let mut seed = [0u8; 16];
        seed[..8].copy_from_slice(&millis.to_le_bytes());
        seed[8..].copy_from_slice(&self.id_seq.to_le_bytes());
        let entropy = xxhash_rust::xxh3::xxh3_64(&seed);
        format!("{}{}", to_base36(millis), to_base36(entropy))
    }

    /// Statuses derived from queue membership: a record with a queued create or
    /// update is `LocalOnly`, everything else present is `Synced`. Used after
    /// load and merge, when no in-flight remote call can contradict it.
    fn recompute_statuses(&mut self) {
        self.statuses = self
            .entries
            .iter()
            .map(|e| {
                let queued = self
                    .pending
                    .iter()
                    .any(|m| m.entry_id() == Some(e.id.as_str()));
                let status = if queued {
                    SyncStatus::LocalOnly
                } else {
                    SyncStatus::Synced
                };
                (e.id.clone(), status)
            })
            .collect();
    }

    fn persist_entries(&mut self) {
        let entries: Vec<_> = self.entries.iter().cloned().collect();
        if let Err(e) = self.cache.save_entries(&entries) {
            log::error!("Saving entries to local cache failed: {e}");
            self.degraded = true;
        }
    }

    fn persist_options(&mut self) {
        let options: Vec<_> = self.options.iter().cloned().collect();
        if let Err(e) = self.cache.save_options(&options) {
            log::error!("Saving options to local cache failed: {e}");
            self.degraded = true;
        }
    }

    fn persist_pending(&mut self) {
        if let Err(e) = self.cache.save_pending(&self.pending) {
            log::error!("Saving pending queue to local cache failed: {e}");
            self.degraded = true;
        }
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut buf = [0u8; 13];
    let mut i = buf.len();
    while value > 0 {
        i -= 1;
        buf[i] = DIGITS[(value % 36) as usize];
        value /= 36;
    }
    String::from_utf8_lossy(&buf[i..]).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{ENTRIES_KEY, MemoryCache};

    fn engine() -> Reconciler<MemoryCache> {
        let mut r = Reconciler::new(MemoryCache::default(), false);
        r.load_local();
        r
    }

    fn candidate(name: &str, grade: u8, strand: &str, section: &str) -> NewEntry {
        NewEntry {
            full_name: name.to_string(),
            grade,
            strand: strand.to_string(),
            section: section.to_string(),
        }
    }

    fn committed(staged: Staged) -> TardinessRecord {
        match staged {
            Staged::Committed(record) => record,
            Staged::Duplicate(check) => panic!("unexpected duplicate: {check:?}"),
        }
    }

    #[test]
    fn test_ids_are_unique_across_adds() {
        let mut r = engine();
        let now = Utc::now();
        let mut seen = std::collections::BTreeSet::new();
        for i in 0..200 {
            let record = committed(r.commit_entry(
                candidate(&format!("Student {i}"), 11, "STEM", "A"),
                DuplicatePolicy::Check,
                now,
            ));
            assert!(seen.insert(record.id.clone()), "duplicate id {}", record.id);
        }
        assert_eq!(r.entries().len(), 200);
    }

    #[test]
    fn test_duplicate_detected_same_day_same_fields() {
        let mut r = engine();
        let now = Utc::now();
        committed(r.commit_entry(
            candidate("Juan Dela Cruz", 11, "STEM", "A"),
            DuplicatePolicy::Check,
            now,
        ));

        // same four fields, case-insensitive name
        let check = r.check_duplicate(&candidate("JUAN DELA CRUZ", 11, "STEM", "A"), now);
        assert!(check.is_duplicate);
        assert_eq!(check.count, 2);
        assert_eq!(check.previous.unwrap().full_name, "Juan Dela Cruz");

        // different section is not a duplicate
        let check = r.check_duplicate(&candidate("Juan Dela Cruz", 11, "STEM", "B"), now);
        assert!(!check.is_duplicate);
        assert_eq!(check.count, 1);
    }

    #[test]
    fn test_duplicate_gate_blocks_insert_and_force_bypasses() {
        let mut r = engine();
        let now = Utc::now();
        committed(r.commit_entry(
            candidate("Juan Dela Cruz", 11, "STEM", "A"),
            DuplicatePolicy::Check,
            now,
        ));

        let staged = r.commit_entry(
            candidate("Juan Dela Cruz", 11, "STEM", "A"),
            DuplicatePolicy::Check,
            now,
        );
        assert!(matches!(staged, Staged::Duplicate(_)));
        assert_eq!(r.entries().len(), 1);

        committed(r.commit_entry(
            candidate("Juan Dela Cruz", 11, "STEM", "A"),
            DuplicatePolicy::Force,
            now,
        ));
        assert_eq!(r.entries().len(), 2);
    }

    #[test]
    fn test_yesterdays_record_is_not_a_duplicate() {
        let mut r = engine();
        let yesterday = Utc::now() - chrono::Duration::days(1);
        committed(r.commit_entry(
            candidate("Juan Dela Cruz", 11, "STEM", "A"),
            DuplicatePolicy::Check,
            yesterday,
        ));

        let check = r.check_duplicate(&candidate("Juan Dela Cruz", 11, "STEM", "A"), Utc::now());
        assert!(!check.is_duplicate);
    }

    #[test]
    fn test_new_entries_are_prepended() {
        let mut r = engine();
        let now = Utc::now();
        committed(r.commit_entry(candidate("First", 11, "STEM", "A"), DuplicatePolicy::Check, now));
        committed(r.commit_entry(candidate("Second", 11, "STEM", "A"), DuplicatePolicy::Check, now));
        let entries = r.entries();
        assert_eq!(entries[0].full_name, "Second");
        assert_eq!(entries[1].full_name, "First");
    }

    #[test]
    fn test_edit_preserves_id_and_position() {
        let mut r = engine();
        let now = Utc::now();
        committed(r.commit_entry(candidate("Aaa", 11, "STEM", "A"), DuplicatePolicy::Check, now));
        let target = committed(r.commit_entry(
            candidate("Bbb", 11, "STEM", "A"),
            DuplicatePolicy::Check,
            now,
        ));
        committed(r.commit_entry(candidate("Ccc", 11, "STEM", "A"), DuplicatePolicy::Check, now));

        let later = now + chrono::Duration::minutes(5);
        let edited = r
            .commit_edit(&target.id, candidate("Renamed", 12, "HUMSS", "B"), later)
            .unwrap();
        assert_eq!(edited.id, target.id);
        assert_eq!(edited.timestamp, later);

        let entries = r.entries();
        assert_eq!(entries.len(), 3);
        // position unchanged: Ccc, Renamed, Aaa
        assert_eq!(entries[1].id, target.id);
        assert_eq!(entries[1].full_name, "Renamed");
        assert_eq!(entries[1].grade, 12);
    }

    #[test]
    fn test_edit_unknown_id_fails() {
        let mut r = engine();
        let err = r
            .commit_edit("nope", candidate("X", 11, "STEM", "A"), Utc::now())
            .unwrap_err();
        assert!(matches!(err, CommitError::UnknownId(_)));
    }

    #[test]
    fn test_delete_removes_record_and_status() {
        let mut r = engine();
        let record = committed(r.commit_entry(
            candidate("Juan", 11, "STEM", "A"),
            DuplicatePolicy::Check,
            Utc::now(),
        ));
        r.commit_delete(&record.id).unwrap();
        assert!(r.entries().is_empty());
        assert_eq!(r.status(&record.id), None);
    }

    #[test]
    fn test_duplicate_option_rejected_set_unchanged() {
        let mut r = engine();
        let gss = GradeStrandSection {
            grade: 11,
            strand: "STEM".to_string(),
            section: "A".to_string(),
        };
        r.commit_add_option(gss.clone()).unwrap();
        let before = r.options();

        assert!(r.commit_add_option(gss).is_err());
        assert_eq!(r.options(), before);
    }

    #[test]
    fn test_options_stay_sorted_by_triple() {
        let mut r = engine();
        for (grade, strand, section) in [(12, "HUMSS", "B"), (11, "STEM", "A"), (11, "ABM", "C")] {
            r.commit_add_option(GradeStrandSection {
                grade,
                strand: strand.to_string(),
                section: section.to_string(),
            })
            .unwrap();
        }
        let triples: Vec<_> = r
            .options()
            .iter()
            .map(|o| (o.grade, o.strand.clone()))
            .collect();
        assert_eq!(
            triples,
            vec![
                (11, "ABM".to_string()),
                (11, "STEM".to_string()),
                (12, "HUMSS".to_string())
            ]
        );
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut r = engine();
        let now = Utc::now();
        let local = committed(r.commit_entry(
            candidate("Local Only", 11, "STEM", "A"),
            DuplicatePolicy::Check,
            now,
        ));

        let remote = vec![
            TardinessRecord {
                id: local.id.clone(),
                full_name: "Remote Wins".to_string(),
                grade: 11,
                strand: "STEM".to_string(),
                section: "A".to_string(),
                timestamp: now,
            },
            TardinessRecord {
                id: "remote1".to_string(),
                full_name: "Only Remote".to_string(),
                grade: 12,
                strand: "ABM".to_string(),
                section: "C".to_string(),
                timestamp: now - chrono::Duration::hours(1),
            },
        ];

        r.merge_remote(remote.clone(), vec![]);
        let once = r.entries();
        r.merge_remote(remote, vec![]);
        assert_eq!(r.entries(), once);

        assert_eq!(once.len(), 2);
        // remote overwrote the colliding record
        assert!(once.iter().any(|e| e.full_name == "Remote Wins"));
        assert!(!once.iter().any(|e| e.full_name == "Local Only"));
    }

    #[test]
    fn test_merge_sorts_entries_newest_first() {
        let mut r = engine();
        let now = Utc::now();
        let remote = vec![
            TardinessRecord {
                id: "old".to_string(),
                full_name: "Old".to_string(),
                grade: 11,
                strand: "STEM".to_string(),
                section: "A".to_string(),
                timestamp: now - chrono::Duration::hours(2),
            },
            TardinessRecord {
                id: "new".to_string(),
                full_name: "New".to_string(),
                grade: 11,
                strand: "STEM".to_string(),
                section: "A".to_string(),
                timestamp: now,
            },
        ];
        r.merge_remote(remote, vec![]);
        let entries = r.entries();
        assert_eq!(entries[0].id, "new");
        assert_eq!(entries[1].id, "old");
    }

    #[test]
    fn test_corrupt_local_blob_degrades_to_empty() {
        let mut r = Reconciler::new(MemoryCache::with_blob(ENTRIES_KEY, "!! not json"), false);
        r.load_local();
        assert!(r.entries().is_empty());
        assert!(r.is_degraded());
    }

    #[test]
    fn test_failed_cache_write_keeps_in_memory_state() {
        let mut cache = MemoryCache::default();
        cache.fail_writes = true;
        let mut r = Reconciler::new(cache, false);
        r.load_local();

        committed(r.commit_entry(
            candidate("Juan", 11, "STEM", "A"),
            DuplicatePolicy::Check,
            Utc::now(),
        ));
        assert_eq!(r.entries().len(), 1);
        assert!(r.is_degraded());
    }

    #[test]
    fn test_queue_membership_drives_loaded_statuses() {
        let mut first = engine();
        let now = Utc::now();
        let queued = committed(first.commit_entry(
            candidate("Queued", 11, "STEM", "A"),
            DuplicatePolicy::Check,
            now,
        ));
        let synced = committed(first.commit_entry(
            candidate("Synced", 11, "STEM", "B"),
            DuplicatePolicy::Check,
            now,
        ));
        first.enqueue(PendingMutation::CreateEntry {
            entry: queued.clone(),
        });
        first.recompute_statuses();

        assert_eq!(first.status(&queued.id), Some(SyncStatus::LocalOnly));
        assert_eq!(first.status(&synced.id), Some(SyncStatus::Synced));
    }

    #[test]
    fn test_clear_pending_only_drops_the_replayed_batch() {
        let mut r = engine();
        let now = Utc::now();
        let a = committed(r.commit_entry(candidate("A", 11, "STEM", "A"), DuplicatePolicy::Check, now));
        let b = committed(r.commit_entry(candidate("B", 11, "STEM", "B"), DuplicatePolicy::Check, now));
        r.enqueue(PendingMutation::CreateEntry { entry: a.clone() });
        r.enqueue(PendingMutation::CreateEntry { entry: b.clone() });

        r.clear_pending(1);
        assert_eq!(r.pending_len(), 1);
        assert_eq!(r.status(&a.id), Some(SyncStatus::Synced));
        assert_eq!(r.status(&b.id), Some(SyncStatus::LocalOnly));
    }

    #[test]
    fn test_set_online_reports_the_transition() {
        let mut r = engine();
        assert!(r.set_online(true));
        assert!(!r.set_online(true));
        assert!(!r.set_online(false));
        assert!(r.set_online(true));
    }

    #[test]
    fn test_base36_matches_known_values() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }
}
