//! Default content and styles for new blocks
//!
//! Both functions are pure and total over [`BlockKind`]. They are applied
//! once, when a block is created, and never re-applied to existing blocks.

use super::block::BlockKind;
use super::style::{StyleKey, Styles};

pub const BASE_PADDING: &str = "16px";
pub const BASE_MARGIN: &str = "8px 0";
pub const BASE_BORDER_RADIUS: &str = "8px";

/// Placeholder content for a freshly added block.
pub fn default_content_for(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Text => "Clique para editar este texto",
        BlockKind::Image => "/placeholder.svg?height=200&width=400",
        BlockKind::Button => "Clique aqui",
        BlockKind::Container => "Container",
        BlockKind::Video => "https://example.com/video.mp4",
    }
}

/// Styles shared by every kind.
pub fn base_styles() -> Styles {
    Styles::new()
        .with(StyleKey::Padding, BASE_PADDING)
        .with(StyleKey::Margin, BASE_MARGIN)
        .with(StyleKey::BorderRadius, BASE_BORDER_RADIUS)
}

/// Base styles plus the kind-specific extras.
pub fn default_styles_for(kind: BlockKind) -> Styles {
    let base = base_styles();
    match kind {
        BlockKind::Text => base
            .with(StyleKey::FontSize, "16px")
            .with(StyleKey::Color, "#000000"),
        BlockKind::Button => base
            .with(StyleKey::BackgroundColor, "#3b82f6")
            .with(StyleKey::Color, "#ffffff")
            .with(StyleKey::TextAlign, "center"),
        BlockKind::Container => base
            .with(StyleKey::Border, "2px dashed #e5e7eb")
            .with(StyleKey::MinHeight, "100px"),
        BlockKind::Image | BlockKind::Video => base,
    }
}
