//! WASM API - `#[wasm_bindgen]` exports for the browser editor.
//!
//! This module is only compiled when targeting `wasm32`. It provides:
//! - `init_editor` / `destroy_editor`: session lifecycle
//! - `add_block` / `remove_block` / `reorder_block`: document edits
//! - `select_block`: selection
//! - `update_content` / `set_style` / `remove_style`: property panel edits
//! - `get_document` / `get_selection` / `get_palette`: reads
//! - `set_view_mode`: canvas viewport
//! - `set_change_listener`: callback fired with the document after each change
//!
//! Every export returns a JSON string: either the requested payload or
//! `{"error": "...", "code": "..."}`.

use std::cell::RefCell;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::Config;
use crate::core::block::BlockError;
use crate::core::palette::{BlockPalette, PaletteEntry};
use crate::core::store::DocumentSnapshot;
use crate::core::style::StyleKey;
use crate::core::BlockId;
use crate::session::{EditorSession, ViewMode};

// ── Global state ────────────────────────────────────────────────────────────

thread_local! {
    static SESSION: RefCell<Option<EditorSession>> = RefCell::new(None);
    static LISTENER: RefCell<Option<js_sys::Function>> = RefCell::new(None);
}

fn with_session<R>(f: impl FnOnce(&EditorSession) -> R) -> Result<R, ApiError> {
    SESSION.with(|cell| match cell.borrow().as_ref() {
        Some(session) => Ok(f(session)),
        None => Err(ApiError::new(
            "NotInitialized",
            "Editor not initialized. Call init_editor() first.",
        )),
    })
}

// ── JSON interchange types ──────────────────────────────────────────────────

#[derive(Serialize)]
struct ApiError {
    error: String,
    code: &'static str,
}

impl ApiError {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code,
        }
    }
}

impl From<BlockError> for ApiError {
    fn from(err: BlockError) -> Self {
        let code = match err {
            BlockError::InvalidKind(_) => "InvalidKind",
            BlockError::IndexOutOfRange { .. } => "IndexOutOfRange",
            BlockError::UnknownBlockId(_) => "UnknownBlockId",
            BlockError::DuplicateBlockId(_) => "DuplicateBlockId",
        };
        ApiError::new(code, err.to_string())
    }
}

#[derive(Serialize)]
struct IdResponse {
    id: String,
}

#[derive(Serialize)]
struct DocumentResponse {
    #[serde(rename = "siteId")]
    site_id: String,
    blocks: DocumentSnapshot,
    selected: Option<String>,
    #[serde(rename = "viewMode")]
    view_mode: ViewMode,
    dirty: bool,
}

#[derive(Serialize)]
struct StyleResponse {
    previous: Option<String>,
}

#[derive(Serialize)]
struct RemovedResponse {
    removed: bool,
}

fn respond<T: Serialize>(result: Result<T, ApiError>) -> String {
    let json = match &result {
        Ok(value) => serde_json::to_string(value),
        Err(err) => serde_json::to_string(err),
    };
    json.unwrap_or_else(|e| format!("{{\"error\":\"{}\",\"code\":\"Serialization\"}}", e))
}

/// Run an edit and respond, notifying the change listener only if the
/// session revision moved.
fn respond_changed<T: Serialize>(edit: impl FnOnce() -> Result<T, ApiError>) -> String {
    let before = revision();
    let result = edit();
    if revision() != before {
        notify();
    }
    respond(result)
}

fn revision() -> Option<u64> {
    with_session(EditorSession::revision).ok()
}

fn notify() {
    // Cloned out so the callback may call back into this module
    let callback = LISTENER.with(|cell| cell.borrow().clone());
    if let Some(callback) = callback {
        let payload = respond::<Option<DocumentResponse>>(Ok(document_response()));
        // Listener errors are ignored
        let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(&payload));
    }
}

fn flatten<T>(result: Result<Result<T, BlockError>, ApiError>) -> Result<T, ApiError> {
    result?.map_err(ApiError::from)
}

// ── Exported functions ──────────────────────────────────────────────────────

/// Open a session. `config_toml` may carry an `[editor]` section; when it is
/// absent the defaults apply.
#[wasm_bindgen]
pub fn init_editor(site_id: &str, config_toml: Option<String>) -> String {
    console_error_panic_hook::set_once();

    let config = match config_toml.as_deref() {
        Some(raw) => match Config::from_toml_str(raw) {
            Ok(config) => config,
            Err(err) => {
                return respond::<()>(Err(ApiError::new("InvalidConfig", format!("{err:#}"))));
            }
        },
        None => Config::default(),
    };

    SESSION.with(|cell| {
        *cell.borrow_mut() = Some(EditorSession::open_with_config(site_id, &config.editor));
    });
    respond(Ok(document_response()))
}

/// Tear down the session, returning the final document.
#[wasm_bindgen]
pub fn destroy_editor() -> String {
    let session = SESSION.with(|cell| cell.borrow_mut().take());
    match session {
        Some(session) => respond::<DocumentSnapshot>(Ok(session.close())),
        None => respond::<DocumentSnapshot>(Err(ApiError::new(
            "NotInitialized",
            "Editor not initialized.",
        ))),
    }
}

#[wasm_bindgen]
pub fn add_block(kind: &str) -> String {
    respond_changed(|| {
        flatten(with_session(|s| s.add_block_named(kind)))
            .map(|id| IdResponse { id: id.to_string() })
    })
}

/// Removing an unknown ID succeeds with `removed: false`.
#[wasm_bindgen]
pub fn remove_block(id: &str) -> String {
    respond_changed(|| {
        with_session(|s| match BlockId::parse(id) {
            Ok(id) => s.remove_block(&id).is_some(),
            Err(_) => false,
        })
        .map(|removed| RemovedResponse { removed })
    })
}

#[wasm_bindgen]
pub fn reorder_block(from_index: usize, to_index: usize) -> String {
    respond_changed(|| {
        flatten(with_session(|s| s.reorder_block(from_index, to_index)))
            .map(|()| document_response())
    })
}

/// Pass `undefined` / `null` to clear the selection.
#[wasm_bindgen]
pub fn select_block(id: Option<String>) -> String {
    respond_changed(|| {
        flatten(with_session(|s| match id.as_deref() {
            None => s.select_block(None),
            Some(raw) => BlockId::parse(raw).and_then(|id| s.select_block(Some(&id))),
        }))
        .map(|()| selection())
    })
}

#[wasm_bindgen]
pub fn update_content(id: &str, content: &str) -> String {
    respond_changed(|| {
        flatten(with_session(|s| {
            BlockId::parse(id).and_then(|id| s.update_content(&id, content))
        }))
        .map(|()| IdResponse { id: id.to_string() })
    })
}

#[wasm_bindgen]
pub fn set_style(id: &str, key: &str, value: &str) -> String {
    respond_changed(|| {
        flatten(with_session(|s| {
            BlockId::parse(id).and_then(|id| s.set_style(&id, StyleKey::from_name(key), value))
        }))
        .map(|previous| StyleResponse { previous })
    })
}

#[wasm_bindgen]
pub fn remove_style(id: &str, key: &str) -> String {
    respond_changed(|| {
        flatten(with_session(|s| {
            BlockId::parse(id).and_then(|id| s.remove_style(&id, &StyleKey::from_name(key)))
        }))
        .map(|previous| StyleResponse { previous })
    })
}

/// Register a callback receiving the document JSON after every successful
/// edit. Pass `undefined` / `null` to unregister.
#[wasm_bindgen]
pub fn set_change_listener(callback: Option<js_sys::Function>) {
    LISTENER.with(|cell| *cell.borrow_mut() = callback);
}

#[wasm_bindgen]
pub fn get_document() -> String {
    respond(with_session(|_| ()).map(|()| document_response()))
}

#[wasm_bindgen]
pub fn get_selection() -> String {
    respond(with_session(|_| ()).map(|()| selection()))
}

#[wasm_bindgen]
pub fn get_palette() -> String {
    let entries: &[PaletteEntry] = BlockPalette::new().all();
    respond::<&[PaletteEntry]>(Ok(entries))
}

#[wasm_bindgen]
pub fn set_view_mode(mode: &str) -> String {
    respond_changed(|| {
        let view_mode = mode.parse::<ViewMode>().map_err(|_| {
            ApiError::new(
                "InvalidViewMode",
                format!("Unknown view mode: '{}'. Available: desktop, tablet, mobile", mode),
            )
        })?;
        with_session(|s| s.set_view_mode(view_mode)).map(|()| document_response())
    })
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn document_response() -> Option<DocumentResponse> {
    with_session(|s| DocumentResponse {
        site_id: s.site_id().to_string(),
        blocks: s.snapshot(),
        selected: s.selected().map(|id| id.to_string()),
        view_mode: s.view_mode(),
        dirty: s.is_dirty(),
    })
    .ok()
}

fn selection() -> Option<crate::core::block::Block> {
    with_session(|s| s.selected_block()).ok().flatten()
}
