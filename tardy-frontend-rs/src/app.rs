use std::cell::RefCell;
use std::rc::Rc;
use std::sync::LazyLock;

use bellwether::engine::{ListenerKey, Reconciler};
use bellwether::model::{GradeStrandSection, NewEntry, TardinessRecord};
use bellwether::report::{self, EntryFilter};
use bellwether::supabase::{SupabaseClient, SupabaseConfig};
use bellwether::sync::{self, AddOutcome};
use bellwether::web_storage::WebStorageCache;
use chrono::Utc;
use slotmap_key::key_from_ffi;
use wasm_bindgen::prelude::*;

use crate::connectivity;

// putting this inside LOGGER prevents us from accidentally initializing the logger more than once
#[allow(clippy::declare_interior_mutable_const)]
const LOGGER: LazyLock<()> = LazyLock::new(|| {
    crate::utils::set_panic_hook();

    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Logging initialized");
});

/// What `add_entry` hands back to the JS shell: either the committed record or
/// the duplicate report it must confirm (via `confirm_add_entry`) before
/// anything is inserted.
#[derive(serde::Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum AddOutcomeDto {
    Added { record: TardinessRecord },
    Duplicate { check: bellwether::engine::DuplicateCheck },
}

impl From<AddOutcome> for AddOutcomeDto {
    fn from(outcome: AddOutcome) -> Self {
        match outcome {
            AddOutcome::Added(record) => AddOutcomeDto::Added { record },
            AddOutcome::Duplicate(check) => AddOutcomeDto::Duplicate { check },
        }
    }
}

#[wasm_bindgen]
pub struct TardinessApp {
    // we never hold a borrow across an .await. by avoiding this, we guarantee the absence of "borrow while locked" panics
    state: RefCell<Reconciler<WebStorageCache>>,
    remote: SupabaseClient,
}

#[wasm_bindgen]
impl TardinessApp {
    /// Build the engine over localStorage and the Supabase-backed remote store,
    /// then run the startup load: local cache synchronously, remote overlay if
    /// the network is up.
    #[wasm_bindgen(constructor)]
    pub async fn new(config: SupabaseConfig) -> TardinessApp {
        // used to only initialize the logger once
        #[allow(clippy::borrow_interior_mutable_const)]
        *LOGGER;

        let cache = WebStorageCache::new();
        let online = connectivity::is_online();
        let app = TardinessApp {
            state: RefCell::new(Reconciler::new(cache, online)),
            remote: SupabaseClient::new(config),
        };
        sync::startup_load(&app.state, &app.remote).await;
        app
    }

    /// Register a change callback; fires after every mutation of the canonical
    /// collections. Returns a key for `unsubscribe`.
    pub fn subscribe(&self, callback: js_sys::Function) -> f64 {
        let key = self.state.borrow_mut().subscribe(Rc::new(move || {
            let _ = callback.call0(&JsValue::null());
        }));
        slotmap_key::key_to_ffi(key)
    }

    pub fn unsubscribe(&self, key: f64) {
        self.state.borrow_mut().unsubscribe(key_from_ffi(key));
    }

    // --- snapshots -------------------------------------------------------

    pub fn entries(&self) -> Result<JsValue, JsValue> {
        let entries: Vec<TardinessRecord> = self.state.borrow().entries().iter().cloned().collect();
        to_js(&entries)
    }

    pub fn options(&self) -> Result<JsValue, JsValue> {
        let options: Vec<GradeStrandSection> =
            self.state.borrow().options().iter().cloned().collect();
        to_js(&options)
    }

    /// Apply a filter selection (search, grade/strand/section, date range, sort)
    /// to the current snapshot. This is the same view the export files render.
    pub fn filtered_entries(&self, filter: JsValue) -> Result<JsValue, JsValue> {
        let filter: EntryFilter = from_js(filter)?;
        let filtered = report::filter_entries(&self.state.borrow().entries(), &filter);
        let filtered: Vec<TardinessRecord> = filtered.iter().cloned().collect();
        to_js(&filtered)
    }

    /// Today / past-week / past-month / total counts for the summary bar.
    pub fn summary(&self) -> Result<JsValue, JsValue> {
        to_js(&report::summarize(
            &self.state.borrow().entries(),
            Utc::now(),
        ))
    }

    /// Per-(grade, strand, section) tallies of a filtered snapshot, for the
    /// grouped export views.
    pub fn group_counts(&self, filter: JsValue) -> Result<JsValue, JsValue> {
        let filter: EntryFilter = from_js(filter)?;
        let filtered = report::filter_entries(&self.state.borrow().entries(), &filter);
        to_js(&report::group_counts(&filtered))
    }

    // --- mutations -------------------------------------------------------

    pub async fn add_entry(&self, candidate: JsValue) -> Result<JsValue, JsValue> {
        let candidate: NewEntry = from_js(candidate)?;
        let outcome = sync::add_entry(&self.state, &self.remote, candidate).await;
        to_js(&AddOutcomeDto::from(outcome))
    }

    /// The explicit second call after the user confirmed the duplicate warning.
    pub async fn confirm_add_entry(&self, candidate: JsValue) -> Result<JsValue, JsValue> {
        let candidate: NewEntry = from_js(candidate)?;
        let record = sync::confirm_add_entry(&self.state, &self.remote, candidate).await;
        to_js(&record)
    }

    pub async fn edit_entry(&self, id: String, fields: JsValue) -> Result<JsValue, JsValue> {
        let fields: NewEntry = from_js(fields)?;
        let record = sync::edit_entry(&self.state, &self.remote, &id, fields)
            .await
            .map_err(err_to_js)?;
        to_js(&record)
    }

    pub async fn delete_entry(&self, id: String) -> Result<(), JsValue> {
        sync::delete_entry(&self.state, &self.remote, &id)
            .await
            .map_err(err_to_js)
    }

    /// Rejects a duplicate triple outright; the rejection is final.
    pub async fn add_option(&self, option: JsValue) -> Result<(), JsValue> {
        let option: GradeStrandSection = from_js(option)?;
        sync::add_option(&self.state, &self.remote, option)
            .await
            .map_err(err_to_js)
    }

    pub async fn delete_option(&self, option: JsValue) -> Result<(), JsValue> {
        let option: GradeStrandSection = from_js(option)?;
        sync::delete_option(&self.state, &self.remote, option)
            .await
            .map_err(err_to_js)
    }

    // --- connectivity ----------------------------------------------------

    /// Called by the shell's online/offline listeners. An offline-to-online
    /// transition replays the pending queue; the error carries how many
    /// mutations were still applied before the pass aborted, so the shell can
    /// tell the user synchronization failed and will be retried.
    pub async fn handle_connectivity(&self, online: bool) -> Result<usize, JsValue> {
        sync::handle_online(&self.state, &self.remote, online)
            .await
            .map_err(err_to_js)
    }

    /// Manual retry of the pending queue, independent of a transition.
    pub async fn replay_pending(&self) -> Result<usize, JsValue> {
        sync::replay_pending(&self.state, &self.remote)
            .await
            .map_err(err_to_js)
    }

    pub fn is_online(&self) -> bool {
        self.state.borrow().is_online()
    }

    /// True once any local-cache operation has failed; the shell shows the
    /// degraded/local-only notice.
    pub fn is_degraded(&self) -> bool {
        self.state.borrow().is_degraded()
    }

    pub fn pending_count(&self) -> usize {
        self.state.borrow().pending_len()
    }

    /// `"localOnly"` / `"syncing"` / `"synced"`, or undefined for an unknown id.
    pub fn sync_status(&self, id: String) -> Result<JsValue, JsValue> {
        to_js(&self.state.borrow().status(&id))
    }
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value)
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e:?}")))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Deserialization error: {e:?}")))
}

fn err_to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// slotmap keys crossing the wasm ABI as plain numbers.
mod slotmap_key {
    use super::ListenerKey;
    use slotmap::{Key, KeyData};

    pub fn key_to_ffi(key: ListenerKey) -> f64 {
        key.data().as_ffi() as f64
    }

    pub fn key_from_ffi(raw: f64) -> ListenerKey {
        KeyData::from_ffi(raw as u64).into()
    }
}
