//! Editor session - the session-scoped owner of a page's block store
//!
//! A session is created when the editor opens a page and discarded when it
//! closes. All mutations go through one write lock, so readers always see a
//! fully applied state. The session also carries the UI state that lives
//! alongside the document: the viewport mode and the unsaved-changes flag.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use tracing::{debug, info};

use crate::config::EditorConfig;
use crate::core::block::{Block, BlockError, BlockKind};
use crate::core::store::{BlockStore, DocumentSnapshot};
use crate::core::style::StyleKey;
use crate::core::BlockId;
use crate::services::persistence::{PersistenceError, PersistenceService};

/// Canvas viewport
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl ViewMode {
    /// Max-width class applied to the canvas
    pub fn viewport_class(&self) -> &'static str {
        match self {
            ViewMode::Desktop => "max-w-full",
            ViewMode::Tablet => "max-w-2xl",
            ViewMode::Mobile => "max-w-sm",
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    store: BlockStore,
    view_mode: ViewMode,
    dirty: bool,
    revision: u64,
}

impl SessionState {
    /// Record a document change.
    fn touch(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }
}

/// One editing session over one page
#[derive(Debug)]
pub struct EditorSession {
    site_id: String,
    state: RwLock<SessionState>,
}

impl EditorSession {
    /// Open a session on an empty document.
    pub fn open(site_id: impl Into<String>) -> Self {
        let site_id = site_id.into();
        info!(site_id = %site_id, "editor session opened");
        Self {
            site_id,
            state: RwLock::new(SessionState::default()),
        }
    }

    /// Open a session with a starting viewport.
    pub fn open_with_view(site_id: impl Into<String>, view_mode: ViewMode) -> Self {
        let session = Self::open(site_id);
        session.state.write().view_mode = view_mode;
        session
    }

    /// Open a session with the editor settings from config.
    pub fn open_with_config(site_id: impl Into<String>, config: &EditorConfig) -> Self {
        Self::open_with_view(site_id, config.default_view_mode)
    }

    /// Open a session on the document previously saved for `site_id`.
    pub async fn load(
        site_id: impl Into<String>,
        persistence: &dyn PersistenceService,
    ) -> Result<Self, PersistenceError> {
        let site_id = site_id.into();
        let snapshot = persistence.load(&site_id).await?;
        let store = BlockStore::from_snapshot(snapshot)?;
        info!(site_id = %site_id, blocks = store.len(), "editor session loaded");
        Ok(Self {
            site_id,
            state: RwLock::new(SessionState {
                store,
                ..SessionState::default()
            }),
        })
    }

    /// Close the session, returning the final document.
    pub fn close(self) -> DocumentSnapshot {
        let state = self.state.into_inner();
        if state.dirty {
            info!(site_id = %self.site_id, "editor session closed with unsaved changes");
        } else {
            info!(site_id = %self.site_id, "editor session closed");
        }
        state.store.snapshot()
    }

    /// Save the current document and clear the unsaved-changes flag.
    ///
    /// The flag is only cleared if no mutation happened while the save was in
    /// flight.
    pub async fn save(&self, persistence: &dyn PersistenceService) -> Result<(), PersistenceError> {
        let snapshot = self.snapshot();
        persistence.save(&self.site_id, &snapshot).await?;

        let mut state = self.state.write();
        if state.store.snapshot() == snapshot {
            state.dirty = false;
        }
        info!(site_id = %self.site_id, blocks = snapshot.len(), "document saved");
        Ok(())
    }

    /// Clear the unsaved-changes flag without saving.
    pub fn mark_saved(&self) {
        self.state.write().dirty = false;
    }

    pub fn site_id(&self) -> &str {
        &self.site_id
    }

    // ── Mutations ───────────────────────────────────────────────────────────

    pub fn add_block(&self, kind: BlockKind) -> BlockId {
        let mut state = self.state.write();
        let id = state.store.add_block(kind);
        state.touch();
        id
    }

    pub fn add_block_named(&self, kind: &str) -> Result<BlockId, BlockError> {
        self.mutate(|store| store.add_block_named(kind))
    }

    /// Remove a block; `None` when the ID was not present.
    pub fn remove_block(&self, id: &BlockId) -> Option<Block> {
        let mut state = self.state.write();
        let removed = state.store.remove_block(id);
        if removed.is_some() {
            state.touch();
        }
        removed
    }

    pub fn reorder_block(&self, from: usize, to: usize) -> Result<(), BlockError> {
        self.mutate(|store| store.reorder_block(from, to))
    }

    /// Selection is UI state and does not mark the document dirty.
    pub fn select_block(&self, id: Option<&BlockId>) -> Result<(), BlockError> {
        let mut state = self.state.write();
        state.store.select_block(id)?;
        state.revision += 1;
        Ok(())
    }

    pub fn update_content(&self, id: &BlockId, content: impl Into<String>) -> Result<(), BlockError> {
        self.mutate(|store| store.update_content(id, content))
    }

    pub fn set_style(
        &self,
        id: &BlockId,
        key: StyleKey,
        value: impl Into<String>,
    ) -> Result<Option<String>, BlockError> {
        self.mutate(|store| store.set_style(id, key, value))
    }

    pub fn remove_style(&self, id: &BlockId, key: &StyleKey) -> Result<Option<String>, BlockError> {
        self.mutate(|store| store.remove_style(id, key))
    }

    pub fn set_view_mode(&self, view_mode: ViewMode) {
        debug!(%view_mode, "view mode changed");
        let mut state = self.state.write();
        state.view_mode = view_mode;
        state.revision += 1;
    }

    // ── Reads ───────────────────────────────────────────────────────────────

    /// Run `f` against a consistent view of the store.
    pub fn read<R>(&self, f: impl FnOnce(&BlockStore) -> R) -> R {
        f(&self.state.read().store)
    }

    pub fn snapshot(&self) -> DocumentSnapshot {
        self.read(BlockStore::snapshot)
    }

    pub fn selected(&self) -> Option<BlockId> {
        self.read(BlockStore::selected)
    }

    pub fn selected_block(&self) -> Option<Block> {
        self.read(|store| store.selected_block().cloned())
    }

    pub fn len(&self) -> usize {
        self.read(BlockStore::len)
    }

    pub fn is_empty(&self) -> bool {
        self.read(BlockStore::is_empty)
    }

    pub fn view_mode(&self) -> ViewMode {
        self.state.read().view_mode
    }

    /// Whether the document changed since it was opened or last saved
    pub fn is_dirty(&self) -> bool {
        self.state.read().dirty
    }

    /// Counter bumped by every successful change to session state, selection
    /// and view mode included. Failed calls and removal of an absent block
    /// leave it unchanged.
    pub fn revision(&self) -> u64 {
        self.state.read().revision
    }

    fn mutate<R, E>(&self, f: impl FnOnce(&mut BlockStore) -> Result<R, E>) -> Result<R, E> {
        let mut state = self.state.write();
        let result = f(&mut state.store)?;
        state.touch();
        Ok(result)
    }
}
