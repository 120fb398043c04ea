#![deny(clippy::string_slice)]

//! Wasm boundary for the tardiness logger. The JS shell owns the DOM, the
//! modals, and the export rendering; everything stateful routes through
//! [`app::TardinessApp`] here, which in turn owns the reconciliation engine.

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod connectivity;
#[cfg(target_arch = "wasm32")]
mod preferences;
#[cfg(target_arch = "wasm32")]
mod utils;

#[cfg(target_arch = "wasm32")]
pub use app::TardinessApp;
#[cfg(target_arch = "wasm32")]
pub use connectivity::watch_connectivity;
#[cfg(target_arch = "wasm32")]
pub use preferences::{Preferences, load_preferences, save_preferences};
