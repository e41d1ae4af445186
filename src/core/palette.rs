//! Block palette - the catalog of placeable kinds shown in the editor sidebar
//!
//! Each kind has exactly one entry carrying its display label, icon identifier
//! and color class. The palette supports:
//! - listing entries in sidebar order
//! - lookup by kind
//! - case-insensitive search over labels and kind names

use serde::Serialize;

use super::block::BlockKind;

/// Palette entry for one block kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaletteEntry {
    pub kind: BlockKind,
    /// Human-readable label
    pub label: &'static str,
    /// Icon identifier for the UI
    pub icon: &'static str,
    /// Color classes for the UI badge
    pub color: &'static str,
}

const ENTRIES: [PaletteEntry; 5] = [
    PaletteEntry {
        kind: BlockKind::Text,
        label: "Texto",
        icon: "type",
        color: "bg-blue-100 text-blue-600",
    },
    PaletteEntry {
        kind: BlockKind::Image,
        label: "Imagem",
        icon: "image",
        color: "bg-green-100 text-green-600",
    },
    PaletteEntry {
        kind: BlockKind::Button,
        label: "Botão",
        icon: "square",
        color: "bg-purple-100 text-purple-600",
    },
    PaletteEntry {
        kind: BlockKind::Container,
        label: "Container",
        icon: "layout",
        color: "bg-orange-100 text-orange-600",
    },
    PaletteEntry {
        kind: BlockKind::Video,
        label: "Vídeo",
        icon: "play",
        color: "bg-red-100 text-red-600",
    },
];

/// Read-only catalog of block kinds
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockPalette;

impl BlockPalette {
    pub fn new() -> Self {
        BlockPalette
    }

    /// All entries in sidebar order
    pub fn all(&self) -> &'static [PaletteEntry] {
        &ENTRIES
    }

    /// Entry for a kind. Total over the closed set.
    pub fn get(&self, kind: BlockKind) -> &'static PaletteEntry {
        match kind {
            BlockKind::Text => &ENTRIES[0],
            BlockKind::Image => &ENTRIES[1],
            BlockKind::Button => &ENTRIES[2],
            BlockKind::Container => &ENTRIES[3],
            BlockKind::Video => &ENTRIES[4],
        }
    }

    /// Search entries by label or kind name (case-insensitive)
    ///
    /// # Arguments
    /// * `query` - Substring to look for; an empty query matches everything
    pub fn search(&self, query: &str) -> Vec<&'static PaletteEntry> {
        let query = query.to_lowercase();
        ENTRIES
            .iter()
            .filter(|entry| {
                entry.label.to_lowercase().contains(&query)
                    || entry.kind.as_ref().contains(query.as_str())
            })
            .collect()
    }

    pub fn count(&self) -> usize {
        ENTRIES.len()
    }
}
