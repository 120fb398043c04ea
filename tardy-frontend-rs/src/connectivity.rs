//! Best-effort connectivity monitoring. `navigator.onLine` says what the local
//! network stack believes, not whether the remote store is actually reachable;
//! a remote call can still fail while this reads true, which the engine treats
//! as being offline for that one operation.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

pub fn is_online() -> bool {
    web_sys::window()
        .map(|w| w.navigator().on_line())
        .unwrap_or(true)
}

/// Install `online`/`offline` listeners on the window. The callback receives the
/// new state as a bool; the JS shell forwards it to
/// `TardinessApp::handle_connectivity`, which replays the pending queue on an
/// offline-to-online transition.
#[wasm_bindgen]
pub fn watch_connectivity(callback: js_sys::Function) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;

    for (event, online) in [("online", true), ("offline", false)] {
        let callback = callback.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            log::info!("Connectivity changed: online={online}");
            let _ = callback.call1(&JsValue::null(), &JsValue::from_bool(online));
        });
        window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        // page-scoped listener, lives until the page goes away
        closure.forget();
    }
    Ok(())
}
