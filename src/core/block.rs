//! Block type and related definitions
//!
//! A block is one placeable unit on a page: a closed kind, a single content
//! string whose meaning depends on the kind, and a bag of presentation styles.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use super::defaults::{default_content_for, default_styles_for};
use super::style::Styles;
use super::BlockId;

/// Block kinds
///
/// The set is closed. A block's kind is fixed at creation; changing it means
/// deleting the block and adding a new one.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BlockKind {
    /// Plain editable text
    Text,
    /// Image; content is a resource locator
    Image,
    /// Button; content is the label
    Button,
    /// Visual grouping box; content is the label. Holds no children.
    Container,
    /// Video; content is a resource locator
    Video,
}

impl BlockKind {
    /// Parse a kind name coming from outside the type system.
    pub fn parse(name: &str) -> Result<Self, BlockError> {
        BlockKind::from_str(name).map_err(|_| BlockError::InvalidKind(name.to_string()))
    }

    /// All kinds in palette order.
    pub fn all() -> impl Iterator<Item = BlockKind> {
        BlockKind::iter()
    }

    /// Whether `content` is interpreted as a resource locator.
    pub fn is_media(&self) -> bool {
        matches!(self, BlockKind::Image | BlockKind::Video)
    }
}

/// One block on the page under edit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Stable identifier
    pub id: BlockId,
    /// Block kind
    pub kind: BlockKind,
    /// Payload, interpreted according to `kind`
    pub content: String,
    /// Presentation-only properties
    pub styles: Styles,
}

impl Block {
    /// Create a block of the given kind with a fresh ID and the default
    /// content and styles for that kind.
    pub fn new(kind: BlockKind) -> Self {
        Self {
            id: BlockId::new(),
            kind,
            content: default_content_for(kind).to_string(),
            styles: default_styles_for(kind),
        }
    }

    /// Kind accessor; there is no setter.
    pub fn kind(&self) -> BlockKind {
        self.kind
    }
}

/// Block store errors
///
/// Every variant is local and recoverable. The operation that returns one has
/// not mutated anything.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BlockError {
    /// Kind name outside the closed set
    #[error("Invalid block kind: {0}")]
    InvalidKind(String),

    /// Reorder index outside `[0, len)`
    #[error("Index {index} out of range for document of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// No block with this ID in the document
    #[error("Unknown block ID: {0}")]
    UnknownBlockId(String),

    /// Two blocks in a snapshot share an ID
    #[error("Duplicate block ID: {0}")]
    DuplicateBlockId(String),
}
