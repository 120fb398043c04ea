//! The reconciliation engine's async half: orchestration of engine commits
//! against the remote store. Free functions over a `RefCell`'d engine and a
//! remote client, because the wasm boundary owns the engine behind a `RefCell`
//! and we must never hold a borrow across an `.await` (doing so would make any
//! re-entrant UI callback panic).
//!
//! Failure semantics: a remote failure during a live operation silently falls
//! back to the pending queue. Only a replay pass surfaces remote failure to the
//! caller, and even then the queue survives for a later retry.

use std::cell::RefCell;

use chrono::Utc;

use crate::cache::SnapshotCache;
use crate::engine::{CommitError, DuplicateCheck, DuplicateOption, DuplicatePolicy, Reconciler, Staged};
use crate::model::{GradeStrandSection, NewEntry, PendingMutation, TardinessRecord};
use crate::remote::{Collection, OrderBy, RemoteError, RemoteStore};

/// Outcome of an add: either the committed record, or the duplicate report the
/// caller must confirm before anything is inserted.
#[derive(Clone, Debug)]
pub enum AddOutcome {
    Added(TardinessRecord),
    Duplicate(DuplicateCheck),
}

/// A replay pass that aborted. `applied` remote operations succeeded before the
/// failure; the queue is left fully intact, so those operations will be sent
/// again on the next pass.
#[derive(Debug, thiserror::Error)]
#[error("replay aborted after {applied} applied mutation(s): {source}")]
pub struct ReplayError {
    pub applied: usize,
    #[source]
    pub source: RemoteError,
}

/// Populate from the local cache, then overlay the remote snapshot if we're
/// online. A remote failure skips the overlay and the session continues on
/// local data alone.
pub async fn startup_load<C: SnapshotCache, R: RemoteStore>(
    state: &RefCell<Reconciler<C>>,
    remote: &R,
) {
    state.borrow_mut().load_local();
    notify(state);

    if !state.borrow().is_online() {
        log::info!("Offline - using local data only");
        return;
    }

    match fetch_remote_snapshot(remote).await {
        Ok((entries, options)) => {
            log::info!(
                "Merging remote snapshot: {} entries, {} options",
                entries.len(),
                options.len()
            );
            state.borrow_mut().merge_remote(entries, options);
            notify(state);
        }
        Err(e) => {
            log::warn!("Remote snapshot unavailable, continuing with local data: {e}");
        }
    }
}

async fn fetch_remote_snapshot<R: RemoteStore>(
    remote: &R,
) -> Result<(Vec<TardinessRecord>, Vec<GradeStrandSection>), RemoteError> {
    let entry_docs = remote
        .fetch_all(Collection::Tardiness, Some(OrderBy::timestamp_desc()))
        .await?;
    let option_docs = remote
        .fetch_all(Collection::GradeStrandSections, None)
        .await?;
    Ok((
        decode_docs(entry_docs, Collection::Tardiness),
        decode_docs(option_docs, Collection::GradeStrandSections),
    ))
}

/// Malformed remote documents are skipped with a log rather than failing the
/// whole overlay.
fn decode_docs<T: serde::de::DeserializeOwned>(
    docs: Vec<serde_json::Value>,
    collection: Collection,
) -> Vec<T> {
    docs.into_iter()
        .filter_map(|doc| match serde_json::from_value(doc) {
            Ok(item) => Some(item),
            Err(e) => {
                log::warn!("Skipping malformed document in `{}`: {e}", collection.name());
                None
            }
        })
        .collect()
}

/// Add a candidate entry. Runs the duplicate gate; a duplicate is reported back
/// without inserting anything. Remote failure or offline queues the create.
pub async fn add_entry<C: SnapshotCache, R: RemoteStore>(
    state: &RefCell<Reconciler<C>>,
    remote: &R,
    candidate: NewEntry,
) -> AddOutcome {
    commit_and_push(state, remote, candidate, DuplicatePolicy::Check).await
}

/// The second, explicit call after the caller confirmed the duplicate warning.
/// Inserts without re-running the gate.
pub async fn confirm_add_entry<C: SnapshotCache, R: RemoteStore>(
    state: &RefCell<Reconciler<C>>,
    remote: &R,
    candidate: NewEntry,
) -> TardinessRecord {
    match commit_and_push(state, remote, candidate, DuplicatePolicy::Force).await {
        AddOutcome::Added(record) => record,
        // Force never reports a duplicate
        AddOutcome::Duplicate(check) => unreachable!("forced add reported duplicate: {check:?}"),
    }
}

async fn commit_and_push<C: SnapshotCache, R: RemoteStore>(
    state: &RefCell<Reconciler<C>>,
    remote: &R,
    candidate: NewEntry,
    policy: DuplicatePolicy,
) -> AddOutcome {
    let staged = state
        .borrow_mut()
        .commit_entry(candidate, policy, Utc::now());
    let record = match staged {
        Staged::Duplicate(check) => return AddOutcome::Duplicate(check),
        Staged::Committed(record) => record,
    };
    notify(state);

    push_or_queue(
        state,
        remote,
        PendingMutation::CreateEntry {
            entry: record.clone(),
        },
    )
    .await;
    AddOutcome::Added(record)
}

/// Replace the fields of an existing entry, then push or queue the update.
pub async fn edit_entry<C: SnapshotCache, R: RemoteStore>(
    state: &RefCell<Reconciler<C>>,
    remote: &R,
    id: &str,
    fields: NewEntry,
) -> Result<TardinessRecord, CommitError> {
    let record = state.borrow_mut().commit_edit(id, fields, Utc::now())?;
    notify(state);

    push_or_queue(
        state,
        remote,
        PendingMutation::UpdateEntry {
            entry: record.clone(),
        },
    )
    .await;
    Ok(record)
}

/// Remove an entry locally, then push or queue the delete.
pub async fn delete_entry<C: SnapshotCache, R: RemoteStore>(
    state: &RefCell<Reconciler<C>>,
    remote: &R,
    id: &str,
) -> Result<(), CommitError> {
    state.borrow_mut().commit_delete(id)?;
    notify(state);

    push_or_queue(
        state,
        remote,
        PendingMutation::DeleteEntry { id: id.to_string() },
    )
    .await;
    Ok(())
}

/// Add an option. A duplicate triple is rejected before any remote traffic;
/// rejection is final and nothing is queued.
pub async fn add_option<C: SnapshotCache, R: RemoteStore>(
    state: &RefCell<Reconciler<C>>,
    remote: &R,
    option: GradeStrandSection,
) -> Result<(), DuplicateOption> {
    state.borrow_mut().commit_add_option(option.clone())?;
    notify(state);

    push_or_queue(state, remote, PendingMutation::AddOption { option }).await;
    Ok(())
}

pub async fn delete_option<C: SnapshotCache, R: RemoteStore>(
    state: &RefCell<Reconciler<C>>,
    remote: &R,
    option: GradeStrandSection,
) -> Result<(), CommitError> {
    state.borrow_mut().commit_delete_option(&option)?;
    notify(state);

    push_or_queue(state, remote, PendingMutation::DeleteOption { option }).await;
    Ok(())
}

/// Attempt the remote write for a freshly committed mutation; fall back to the
/// queue when offline or when the store is unreachable. Never fails: remote
/// unavailability is not an operation failure.
async fn push_or_queue<C: SnapshotCache, R: RemoteStore>(
    state: &RefCell<Reconciler<C>>,
    remote: &R,
    mutation: PendingMutation,
) {
    if !state.borrow().is_online() {
        state.borrow_mut().enqueue(mutation);
        notify(state);
        return;
    }

    if let Some(id) = mutation.entry_id() {
        state.borrow_mut().mark_syncing(id);
    }

    match apply_mutation(remote, &mutation).await {
        Ok(()) => {
            if let Some(id) = mutation.entry_id() {
                state.borrow_mut().mark_synced(id);
            }
        }
        Err(e) => {
            log::warn!("Remote write failed, queueing mutation for replay: {e}");
            state.borrow_mut().enqueue(mutation);
        }
    }
    notify(state);
}

/// Replay the pending queue in insertion order, one awaited remote call at a
/// time. The first failure aborts the whole pass; no partial trimming of the
/// queue happens. On full success the batch is cleared at once.
pub async fn replay_pending<C: SnapshotCache, R: RemoteStore>(
    state: &RefCell<Reconciler<C>>,
    remote: &R,
) -> Result<usize, ReplayError> {
    let queue = state.borrow().pending();
    if queue.is_empty() {
        return Ok(0);
    }
    log::info!("Replaying {} pending mutation(s)", queue.len());

    for (applied, mutation) in queue.iter().enumerate() {
        if let Some(id) = mutation.entry_id() {
            state.borrow_mut().mark_syncing(id);
        }
        if let Err(source) = apply_mutation(remote, mutation).await {
            log::warn!("Replay aborted, queue preserved for retry: {source}");
            return Err(ReplayError { applied, source });
        }
    }

    state.borrow_mut().clear_pending(queue.len());
    notify(state);
    Ok(queue.len())
}

/// Record a connectivity transition; on offline-to-online, replay the queue.
pub async fn handle_online<C: SnapshotCache, R: RemoteStore>(
    state: &RefCell<Reconciler<C>>,
    remote: &R,
    online: bool,
) -> Result<usize, ReplayError> {
    let went_online = state.borrow_mut().set_online(online);
    notify(state);
    if went_online {
        replay_pending(state, remote).await
    } else {
        Ok(0)
    }
}

/// Map one queued mutation onto the remote verb it stands for. Shared by the
/// live path and the replay pass so both speak the same wire protocol.
async fn apply_mutation<R: RemoteStore>(
    remote: &R,
    mutation: &PendingMutation,
) -> Result<(), RemoteError> {
    match mutation {
        PendingMutation::CreateEntry { entry } => {
            let doc = serde_json::to_value(entry)
                .map_err(|e| RemoteError::Malformed(e.to_string()))?;
            remote.put(Collection::Tardiness, &entry.id, &doc).await
        }
        PendingMutation::UpdateEntry { entry } => {
            let doc = serde_json::to_value(entry)
                .map_err(|e| RemoteError::Malformed(e.to_string()))?;
            remote.update(Collection::Tardiness, &entry.id, &doc).await
        }
        PendingMutation::DeleteEntry { id } => remote.delete(Collection::Tardiness, id).await,
        PendingMutation::AddOption { option } => {
            let doc = serde_json::to_value(option)
                .map_err(|e| RemoteError::Malformed(e.to_string()))?;
            remote
                .put(Collection::GradeStrandSections, &option.doc_id(), &doc)
                .await
        }
        PendingMutation::DeleteOption { option } => {
            remote
                .delete(Collection::GradeStrandSections, &option.doc_id())
                .await
        }
    }
}

/// Invoke the registered listeners with no engine borrow held, so a listener can
/// immediately re-read the engine.
pub fn notify<C: SnapshotCache>(state: &RefCell<Reconciler<C>>) {
    let listeners = state.borrow().listener_snapshot();
    for listener in listeners {
        listener();
    }
}
