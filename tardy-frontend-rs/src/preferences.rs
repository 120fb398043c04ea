//! The user-preferences blob: theme and last-used input mode, stored under its
//! own localStorage key next to the two record collections. Corrupt content
//! falls back to defaults; preferences are never worth failing the session over.

use wasm_bindgen::prelude::*;

pub const PREFERENCES_KEY: &str = "preferences";

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub theme: Option<String>,
    /// Which entry mode (manual form or quick-select) the user last used.
    #[serde(default)]
    pub current_mode: Option<String>,
}

#[wasm_bindgen]
pub fn load_preferences() -> Preferences {
    let Some(storage) = local_storage() else {
        return Preferences::default();
    };
    match storage.get_item(PREFERENCES_KEY) {
        Ok(Some(blob)) => serde_json::from_str(&blob).unwrap_or_else(|e| {
            log::warn!("Stored preferences are corrupt, using defaults: {e}");
            Preferences::default()
        }),
        Ok(None) => Preferences::default(),
        Err(e) => {
            log::warn!("Reading preferences failed, using defaults: {e:?}");
            Preferences::default()
        }
    }
}

#[wasm_bindgen]
pub fn save_preferences(preferences: Preferences) {
    let Some(storage) = local_storage() else {
        return;
    };
    let blob = match serde_json::to_string(&preferences) {
        Ok(blob) => blob,
        Err(e) => {
            log::warn!("Serializing preferences failed: {e}");
            return;
        }
    };
    if let Err(e) = storage.set_item(PREFERENCES_KEY, &blob) {
        log::warn!("Saving preferences failed: {e:?}");
    }
}

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}
