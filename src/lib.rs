//! Page Builder - block model for the site admin visual editor
//!
//! This crate provides the in-memory page document used by the visual editor
//! (typed blocks, default content and styles, ordering, selection), the
//! session that owns it, and the contracts with the hosted persistence and
//! text generation services used by the editor and the assistant panel.

pub mod config;
pub mod core;
pub mod services;
pub mod session;
mod tests;

#[cfg(not(target_arch = "wasm32"))]
pub mod assistant;

#[cfg(target_arch = "wasm32")]
pub mod wasm_api;

// Re-export commonly used types
pub use crate::config::Config;
pub use crate::core::{Block, BlockError, BlockId, BlockKind, BlockStore, DocumentSnapshot, StyleKey, Styles};
pub use crate::session::{EditorSession, ViewMode};

#[cfg(not(target_arch = "wasm32"))]
pub use crate::assistant::Assistant;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
