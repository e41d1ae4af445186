//! Block Store - ordered document and selection for the page under edit
//!
//! The store is a plain owned value: every mutation takes `&mut self` and
//! either applies fully or returns a [`BlockError`] having changed nothing.
//! It maintains these invariants:
//! - block IDs are unique within the document
//! - the selection, when set, names a block that exists
//!
//! Callers that share a store across an event-driven UI should go through
//! [`crate::session::EditorSession`], which serializes writers.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use super::block::{Block, BlockError, BlockKind};
use super::style::StyleKey;
use super::BlockId;

/// Ordered document plus selection
#[derive(Debug, Clone, Default)]
pub struct BlockStore {
    blocks: Vec<Block>,
    selected: Option<BlockId>,
}

impl BlockStore {
    /// Create an empty store
    ///
    /// # Example
    /// ```
    /// use page_builder::core::store::BlockStore;
    ///
    /// let store = BlockStore::new();
    /// assert!(store.is_empty());
    /// ```
    pub fn new() -> Self {
        Self {
            blocks: Vec::new(),
            selected: None,
        }
    }

    /// Rebuild a store from a persisted snapshot.
    ///
    /// Selection starts cleared. Fails if two blocks share an ID.
    pub fn from_snapshot(snapshot: DocumentSnapshot) -> Result<Self, BlockError> {
        snapshot.validate()?;
        Ok(Self {
            blocks: snapshot.blocks,
            selected: None,
        })
    }

    /// Append a new block of `kind` with default content and styles.
    ///
    /// # Returns
    /// The ID of the new block
    ///
    /// # Example
    /// ```
    /// use page_builder::core::{BlockKind, BlockStore};
    ///
    /// let mut store = BlockStore::new();
    /// let id = store.add_block(BlockKind::Text);
    /// assert_eq!(store.len(), 1);
    /// assert_eq!(store.position(&id), Some(0));
    /// ```
    pub fn add_block(&mut self, kind: BlockKind) -> BlockId {
        let block = Block::new(kind);
        let id = block.id;
        self.blocks.push(block);
        debug!(block_id = %id, %kind, len = self.blocks.len(), "block added");
        id
    }

    /// Append a new block whose kind arrives as a name.
    ///
    /// # Returns
    /// * `Ok(BlockId)` for a kind in the closed set
    /// * `Err(BlockError::InvalidKind)` otherwise, with the document unchanged
    pub fn add_block_named(&mut self, kind: &str) -> Result<BlockId, BlockError> {
        let kind = BlockKind::parse(kind)?;
        Ok(self.add_block(kind))
    }

    /// Remove a block by ID.
    ///
    /// Removing an ID that is not present is a no-op. If the removed block is
    /// selected, the selection is cleared in the same call.
    ///
    /// # Returns
    /// The removed block, or `None` if nothing was removed
    pub fn remove_block(&mut self, id: &BlockId) -> Option<Block> {
        let index = self.position(id)?;
        let removed = self.blocks.remove(index);
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        debug!(block_id = %id, index, len = self.blocks.len(), "block removed");
        Some(removed)
    }

    /// Move the block at `from` so that it ends up at `to`.
    ///
    /// The block is removed first, then inserted at `to` in the shortened
    /// sequence. Both indices must be in `[0, len)`.
    ///
    /// # Example
    /// ```
    /// use page_builder::core::{BlockKind, BlockStore};
    ///
    /// let mut store = BlockStore::new();
    /// store.add_block(BlockKind::Text);
    /// store.add_block(BlockKind::Image);
    /// store.add_block(BlockKind::Button);
    ///
    /// store.reorder_block(0, 2).unwrap();
    /// assert_eq!(
    ///     store.kinds(),
    ///     vec![BlockKind::Image, BlockKind::Button, BlockKind::Text]
    /// );
    /// ```
    pub fn reorder_block(&mut self, from: usize, to: usize) -> Result<(), BlockError> {
        let len = self.blocks.len();
        for index in [from, to] {
            if index >= len {
                return Err(BlockError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }

        let block = self.blocks.remove(from);
        self.blocks.insert(to, block);
        debug!(from, to, "block reordered");
        Ok(())
    }

    /// Set or clear the selection.
    ///
    /// `None` always succeeds. `Some(id)` fails with `UnknownBlockId` when no
    /// such block exists, leaving the current selection as it was.
    pub fn select_block(&mut self, id: Option<&BlockId>) -> Result<(), BlockError> {
        match id {
            None => {
                self.selected = None;
                Ok(())
            }
            Some(id) => {
                self.require(id)?;
                self.selected = Some(*id);
                debug!(block_id = %id, "block selected");
                Ok(())
            }
        }
    }

    /// Replace the content string of a block.
    pub fn update_content(
        &mut self,
        id: &BlockId,
        content: impl Into<String>,
    ) -> Result<(), BlockError> {
        let index = self.require(id)?;
        self.blocks[index].content = content.into();
        debug!(block_id = %id, "block content updated");
        Ok(())
    }

    /// Set one style property on a block.
    ///
    /// # Returns
    /// The previous value of the property, if any
    pub fn set_style(
        &mut self,
        id: &BlockId,
        key: StyleKey,
        value: impl Into<String>,
    ) -> Result<Option<String>, BlockError> {
        let index = self.require(id)?;
        debug!(block_id = %id, key = %key, "block style set");
        Ok(self.blocks[index].styles.set(key, value))
    }

    /// Remove one style property from a block.
    pub fn remove_style(
        &mut self,
        id: &BlockId,
        key: &StyleKey,
    ) -> Result<Option<String>, BlockError> {
        let index = self.require(id)?;
        Ok(self.blocks[index].styles.remove(key))
    }

    /// Remove every block and clear the selection.
    pub fn clear(&mut self) {
        self.blocks.clear();
        self.selected = None;
    }

    pub fn get(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| &b.id == id)
    }

    /// Index of a block in document order
    pub fn position(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| &b.id == id)
    }

    /// Blocks in document order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Kinds in document order
    pub fn kinds(&self) -> Vec<BlockKind> {
        self.blocks.iter().map(|b| b.kind).collect()
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Currently selected block ID
    pub fn selected(&self) -> Option<BlockId> {
        self.selected
    }

    /// Currently selected block
    pub fn selected_block(&self) -> Option<&Block> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    /// Owned copy of the ordered blocks. Selection is not included.
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            blocks: self.blocks.clone(),
        }
    }

    fn require(&self, id: &BlockId) -> Result<usize, BlockError> {
        self.position(id)
            .ok_or_else(|| BlockError::UnknownBlockId(id.to_string()))
    }
}

/// Serializable form of a document: an ordered list of blocks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentSnapshot {
    pub blocks: Vec<Block>,
}

impl DocumentSnapshot {
    /// Check that no two blocks share an ID.
    pub fn validate(&self) -> Result<(), BlockError> {
        let mut seen = HashSet::with_capacity(self.blocks.len());
        for block in &self.blocks {
            if !seen.insert(block.id) {
                return Err(BlockError::DuplicateBlockId(block.id.to_string()));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(kinds: &[BlockKind]) -> (BlockStore, Vec<BlockId>) {
        let mut store = BlockStore::new();
        let ids = kinds.iter().map(|k| store.add_block(*k)).collect();
        (store, ids)
    }

    #[test]
    fn test_store_starts_empty() {
        let store = BlockStore::new();
        assert!(store.is_empty());
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn test_add_block_appends() {
        let (store, ids) = store_with(&[BlockKind::Text, BlockKind::Video]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.position(&ids[0]), Some(0));
        assert_eq!(store.position(&ids[1]), Some(1));
    }

    #[test]
    fn test_add_block_named_invalid_kind() {
        let (mut store, _) = store_with(&[BlockKind::Text]);
        let result = store.add_block_named("slider");
        assert!(matches!(result, Err(BlockError::InvalidKind(ref k)) if k == "slider"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (mut store, ids) = store_with(&[BlockKind::Text, BlockKind::Image]);
        assert!(store.remove_block(&ids[0]).is_some());
        assert!(store.remove_block(&ids[0]).is_none());
        assert_eq!(store.len(), 1);
        assert_eq!(store.blocks()[0].id, ids[1]);
    }

    #[test]
    fn test_remove_selected_clears_selection() {
        let (mut store, ids) = store_with(&[BlockKind::Text, BlockKind::Image]);
        store.select_block(Some(&ids[1])).unwrap();
        store.remove_block(&ids[1]);
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn test_remove_other_keeps_selection() {
        let (mut store, ids) = store_with(&[BlockKind::Text, BlockKind::Image]);
        store.select_block(Some(&ids[1])).unwrap();
        store.remove_block(&ids[0]);
        assert_eq!(store.selected(), Some(ids[1]));
    }

    #[test]
    fn test_reorder_move_semantics() {
        let (mut store, ids) = store_with(&[
            BlockKind::Text,
            BlockKind::Image,
            BlockKind::Button,
            BlockKind::Video,
        ]);
        store.reorder_block(3, 1).unwrap();
        let order: Vec<_> = store.blocks().iter().map(|b| b.id).collect();
        assert_eq!(order, vec![ids[0], ids[3], ids[1], ids[2]]);
    }

    #[test]
    fn test_reorder_out_of_range() {
        let (mut store, _) = store_with(&[BlockKind::Text, BlockKind::Image]);
        let before = store.snapshot();

        assert_eq!(
            store.reorder_block(2, 0),
            Err(BlockError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            store.reorder_block(0, 5),
            Err(BlockError::IndexOutOfRange { index: 5, len: 2 })
        );
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_reorder_on_empty_document() {
        let mut store = BlockStore::new();
        assert!(matches!(
            store.reorder_block(0, 0),
            Err(BlockError::IndexOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_reorder_same_index_is_noop() {
        let (mut store, _) = store_with(&[BlockKind::Text, BlockKind::Image]);
        let before = store.snapshot();
        store.reorder_block(1, 1).unwrap();
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_select_unknown_keeps_selection() {
        let (mut store, ids) = store_with(&[BlockKind::Text]);
        store.select_block(Some(&ids[0])).unwrap();

        let stranger = BlockId::new();
        let result = store.select_block(Some(&stranger));
        assert!(matches!(result, Err(BlockError::UnknownBlockId(_))));
        assert_eq!(store.selected(), Some(ids[0]));
    }

    #[test]
    fn test_select_none_clears() {
        let (mut store, ids) = store_with(&[BlockKind::Text]);
        store.select_block(Some(&ids[0])).unwrap();
        store.select_block(None).unwrap();
        assert_eq!(store.selected(), None);
        assert!(store.selected_block().is_none());
    }

    #[test]
    fn test_update_content_and_styles() {
        let (mut store, ids) = store_with(&[BlockKind::Button]);
        store.update_content(&ids[0], "Comprar").unwrap();
        let previous = store
            .set_style(&ids[0], StyleKey::BackgroundColor, "#ef4444")
            .unwrap();
        assert_eq!(previous.as_deref(), Some("#3b82f6"));

        let block = store.get(&ids[0]).unwrap();
        assert_eq!(block.content, "Comprar");
        assert_eq!(block.styles.get(&StyleKey::BackgroundColor), Some("#ef4444"));
        assert_eq!(block.kind, BlockKind::Button);

        assert_eq!(
            store.remove_style(&ids[0], &StyleKey::TextAlign).unwrap(),
            Some("center".to_string())
        );
    }

    #[test]
    fn test_edits_on_unknown_block_fail() {
        let (mut store, _) = store_with(&[BlockKind::Text]);
        let before = store.snapshot();
        let stranger = BlockId::new();

        assert!(store.update_content(&stranger, "x").is_err());
        assert!(store.set_style(&stranger, StyleKey::Color, "red").is_err());
        assert!(store.remove_style(&stranger, &StyleKey::Color).is_err());
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn test_snapshot_round_trip_through_json() {
        let (store, _) = store_with(&[BlockKind::Text, BlockKind::Container]);
        let json = store.snapshot().to_json().unwrap();
        let snapshot = DocumentSnapshot::from_json(&json).unwrap();
        let restored = BlockStore::from_snapshot(snapshot).unwrap();
        assert_eq!(restored.blocks(), store.blocks());
        assert_eq!(restored.selected(), None);
    }

    #[test]
    fn test_custom_alias_of_known_style_survives_json() {
        let (mut store, ids) = store_with(&[BlockKind::Button]);
        let previous = store
            .set_style(&ids[0], StyleKey::Custom("backgroundColor".into()), "#111827")
            .unwrap();
        assert_eq!(previous.as_deref(), Some("#3b82f6"));

        let json = store.snapshot().to_json().unwrap();
        assert_eq!(json.matches("backgroundColor").count(), 1);
        let restored = DocumentSnapshot::from_json(&json).unwrap();
        assert_eq!(restored, store.snapshot());
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let (store, ids) = store_with(&[BlockKind::Text]);
        let value = serde_json::to_value(store.snapshot()).unwrap();
        let first = &value[0];
        assert_eq!(first["id"], ids[0].to_string());
        assert_eq!(first["kind"], "text");
        assert_eq!(first["content"], "Clique para editar este texto");
        assert_eq!(first["styles"]["borderRadius"], "8px");
    }

    #[test]
    fn test_from_snapshot_rejects_duplicates() {
        let block = Block::new(BlockKind::Text);
        let snapshot = DocumentSnapshot {
            blocks: vec![block.clone(), block],
        };
        assert!(matches!(
            BlockStore::from_snapshot(snapshot),
            Err(BlockError::DuplicateBlockId(_))
        ));
    }

    #[test]
    fn test_clear() {
        let (mut store, ids) = store_with(&[BlockKind::Text, BlockKind::Image]);
        store.select_block(Some(&ids[0])).unwrap();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.selected(), None);
    }
}
