//! Core page block model
//!
//! This module defines the block types, the default-value policy for new
//! blocks, the style model, the editor palette and the block store that owns
//! the ordered document and the selection.

pub mod block;
pub mod defaults;
pub mod palette;
pub mod store;
pub mod style;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub use block::{Block, BlockError, BlockKind};
pub use store::{BlockStore, DocumentSnapshot};
pub use style::{StyleKey, Styles};

/// Unique identifier for a block
///
/// Generated once when the block is created and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(pub Uuid);

impl BlockId {
    /// Generate a new random block ID
    pub fn new() -> Self {
        BlockId(Uuid::new_v4())
    }

    /// Parse an ID received from the presentation layer.
    ///
    /// A string that is not a well-formed ID cannot name any block, so it is
    /// reported the same way as an ID that is simply absent.
    pub fn parse(raw: &str) -> Result<Self, BlockError> {
        Uuid::parse_str(raw)
            .map(BlockId)
            .map_err(|_| BlockError::UnknownBlockId(raw.to_string()))
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BlockId {
    type Err = BlockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
