//! This is a library for keeping a browser-resident record collection consistent across
//! a local cache, a remote document store, and an offline mutation queue.
//! It was created for a school tardiness logging tool, so it doesn't include much that
//! was not needed for that project.
//!
//! Reconciliation strategy:
//! 1. On startup, the local cache is read synchronously so the UI can populate immediately.
//! 2. If the network is up, the remote snapshot is fetched and merged over the local one.
//!    Merge is by record identity: unknown remote documents are inserted, colliding ones
//!    overwrite the local copy (remote wins during the load-time merge only).
//! 3. Every mutation commits to the in-memory collections and the local cache first.
//!    The remote write is attempted afterwards; if it fails or we're offline, the
//!    mutation is queued instead. The user is never blocked by remote unavailability.
//! 4. When connectivity returns, the queue is replayed against the remote store in
//!    insertion order. The first failure aborts the whole pass and leaves the queue
//!    intact for a later retry; on full success the batch is cleared at once.
//!
//! Sounds simple, but there are a few tricky parts that this library handles.

pub mod cache;
pub mod engine;
pub mod model;
pub mod remote;
pub mod report;
pub mod sync;

#[cfg(feature = "supabase")]
pub mod supabase;

#[cfg(target_arch = "wasm32")]
#[cfg(feature = "web-storage")]
pub mod web_storage;

pub use engine::{DuplicateCheck, DuplicatePolicy, Reconciler};
pub use model::{GradeStrandSection, NewEntry, PendingMutation, SyncStatus, TardinessRecord};
