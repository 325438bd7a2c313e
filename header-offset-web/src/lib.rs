#![cfg(target_arch = "wasm32")]
use std::cell::RefCell;
use std::sync::Once;

use header_offset::{HeaderOffsetSync, Settings};
use wasm_bindgen::prelude::*;

mod host;

pub use host::{WebHost, WebSubscription, WebTimer};

thread_local! {
    // page-scoped singleton, replaced by `start_with_config`
    static SYNC: RefCell<Option<HeaderOffsetSync<WebHost>>> = const { RefCell::new(None) };
}

static LOGGING: Once = Once::new();

fn init_logging() {
    LOGGING.call_once(|| {
        let level = if cfg!(debug_assertions) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        };
        let config = tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(level)
            .set_report_logs_in_timings(false)
            .build();
        tracing_wasm::set_as_global_default_with_config(config);
    });
}

/// Stops whatever sync is running and starts a new one with `settings`.
pub fn install(settings: Settings) -> Result<(), JsValue> {
    let host = WebHost::new()?;
    if let Some(previous) = SYNC.with(|slot| slot.borrow_mut().take()) {
        previous.stop();
    }

    let sync = HeaderOffsetSync::new(host, settings);
    sync.start();
    SYNC.with(|slot| *slot.borrow_mut() = Some(sync));
    Ok(())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    init_logging();
    install(Settings::default())
}

/// Restarts the sync with JSON settings, e.g.
/// `{"banner_selector": null, "debounce_ms": 150}`. Missing fields keep their defaults.
#[wasm_bindgen]
pub fn start_with_config(config: &str) -> Result<(), JsValue> {
    let settings = Settings::from_json(config).map_err(|err| JsValue::from_str(&err.to_string()))?;
    install(settings)
}

#[wasm_bindgen]
pub fn stop() {
    if let Some(sync) = SYNC.with(|slot| slot.borrow_mut().take()) {
        sync.stop();
    }
}

/// Forces a recompute outside the resize and mutation triggers.
#[wasm_bindgen]
pub fn recompute() {
    let sync = SYNC.with(|slot| slot.borrow().clone());
    if let Some(sync) = sync {
        sync.recompute();
    }
}
