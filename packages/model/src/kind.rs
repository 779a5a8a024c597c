//! # Block Kinds
//!
//! The closed set of block variants and their capabilities.
//!
//! Every capability question ("can this kind own children?", "which
//! palette group does it belong to?") is answered by [`BLOCK_KINDS`].
//! Nothing else in the workspace keeps its own list of container kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::content::BlockContent;
use crate::error::ModelError;

/// Block variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Text,
    Heading,
    Image,
    Hero,
    Button,
    Carousel,
    Container,
    Section,
    Grid,
    FlexRow,
    FlexColumn,
    Divider,
    Spacer,
    Dynamic,
    ProductList,
    ProductDetail,
    Video,
}

/// Palette grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockCategory {
    Basic,
    Media,
    Layout,
    Commerce,
    Advanced,
}

/// One row of the kind table
#[derive(Debug, Clone, Copy)]
pub struct KindInfo {
    pub kind: BlockKind,
    /// Wire name (`"flex-row"`)
    pub name: &'static str,
    /// Human label shown in the palette
    pub label: &'static str,
    pub category: BlockCategory,
    /// May own child blocks
    pub container: bool,
}

pub const BLOCK_KINDS: &[KindInfo] = &[
    KindInfo { kind: BlockKind::Text, name: "text", label: "Text", category: BlockCategory::Basic, container: false },
    KindInfo { kind: BlockKind::Heading, name: "heading", label: "Heading", category: BlockCategory::Basic, container: false },
    KindInfo { kind: BlockKind::Button, name: "button", label: "Button", category: BlockCategory::Basic, container: false },
    KindInfo { kind: BlockKind::Divider, name: "divider", label: "Divider", category: BlockCategory::Basic, container: false },
    KindInfo { kind: BlockKind::Spacer, name: "spacer", label: "Spacer", category: BlockCategory::Basic, container: false },
    KindInfo { kind: BlockKind::Image, name: "image", label: "Image", category: BlockCategory::Media, container: false },
    KindInfo { kind: BlockKind::Hero, name: "hero", label: "Hero Banner", category: BlockCategory::Media, container: false },
    KindInfo { kind: BlockKind::Carousel, name: "carousel", label: "Carousel", category: BlockCategory::Media, container: false },
    KindInfo { kind: BlockKind::Video, name: "video", label: "Video", category: BlockCategory::Media, container: false },
    KindInfo { kind: BlockKind::Container, name: "container", label: "Container", category: BlockCategory::Layout, container: true },
    KindInfo { kind: BlockKind::Section, name: "section", label: "Section", category: BlockCategory::Layout, container: true },
    KindInfo { kind: BlockKind::Grid, name: "grid", label: "Grid", category: BlockCategory::Layout, container: true },
    KindInfo { kind: BlockKind::FlexRow, name: "flex-row", label: "Row", category: BlockCategory::Layout, container: true },
    KindInfo { kind: BlockKind::FlexColumn, name: "flex-column", label: "Column", category: BlockCategory::Layout, container: true },
    KindInfo { kind: BlockKind::ProductList, name: "product-list", label: "Product List", category: BlockCategory::Commerce, container: false },
    KindInfo { kind: BlockKind::ProductDetail, name: "product-detail", label: "Product Detail", category: BlockCategory::Commerce, container: false },
    KindInfo { kind: BlockKind::Dynamic, name: "dynamic", label: "Dynamic Content", category: BlockCategory::Advanced, container: false },
];

impl BlockKind {
    /// Every kind, in table order
    pub fn all() -> impl Iterator<Item = BlockKind> {
        BLOCK_KINDS.iter().map(|info| info.kind)
    }

    pub fn info(self) -> &'static KindInfo {
        // Every variant has exactly one row; the table test enforces it.
        BLOCK_KINDS
            .iter()
            .find(|info| info.kind == self)
            .unwrap_or(&BLOCK_KINDS[0])
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn label(self) -> &'static str {
        self.info().label
    }

    pub fn category(self) -> BlockCategory {
        self.info().category
    }

    /// Whether blocks of this kind may own children
    pub fn is_container(self) -> bool {
        self.info().container
    }

    /// Payload a freshly created block of this kind starts with
    pub fn default_content(self) -> BlockContent {
        BlockContent::default_for(self)
    }

    pub fn from_name(name: &str) -> Option<BlockKind> {
        BLOCK_KINDS
            .iter()
            .find(|info| info.name == name)
            .map(|info| info.kind)
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BlockKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BlockKind::from_name(s).ok_or_else(|| ModelError::UnknownKind(s.to_string()))
    }
}

impl BlockCategory {
    pub const ALL: [BlockCategory; 5] = [
        BlockCategory::Basic,
        BlockCategory::Media,
        BlockCategory::Layout,
        BlockCategory::Commerce,
        BlockCategory::Advanced,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BlockCategory::Basic => "Basic",
            BlockCategory::Media => "Media",
            BlockCategory::Layout => "Layout",
            BlockCategory::Commerce => "Commerce",
            BlockCategory::Advanced => "Advanced",
        }
    }
}

/// Kind table grouped by category, for the block palette
pub fn palette() -> Vec<(BlockCategory, Vec<&'static KindInfo>)> {
    BlockCategory::ALL
        .iter()
        .map(|category| {
            let entries = BLOCK_KINDS
                .iter()
                .filter(|info| info.category == *category)
                .collect();
            (*category, entries)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_one_row() {
        let variants = [
            BlockKind::Text,
            BlockKind::Heading,
            BlockKind::Image,
            BlockKind::Hero,
            BlockKind::Button,
            BlockKind::Carousel,
            BlockKind::Container,
            BlockKind::Section,
            BlockKind::Grid,
            BlockKind::FlexRow,
            BlockKind::FlexColumn,
            BlockKind::Divider,
            BlockKind::Spacer,
            BlockKind::Dynamic,
            BlockKind::ProductList,
            BlockKind::ProductDetail,
            BlockKind::Video,
        ];

        for kind in variants {
            let rows = BLOCK_KINDS.iter().filter(|info| info.kind == kind).count();
            assert_eq!(rows, 1, "{:?} should appear exactly once", kind);
        }
        assert_eq!(BLOCK_KINDS.len(), variants.len());
    }

    #[test]
    fn test_container_kinds() {
        let containers: Vec<_> = BlockKind::all().filter(|k| k.is_container()).collect();
        assert_eq!(
            containers,
            vec![
                BlockKind::Container,
                BlockKind::Section,
                BlockKind::Grid,
                BlockKind::FlexRow,
                BlockKind::FlexColumn,
            ]
        );
    }

    #[test]
    fn test_names_match_serde() {
        for kind in BlockKind::all() {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.name()));
            assert_eq!(kind.name().parse::<BlockKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_name() {
        assert!("marquee".parse::<BlockKind>().is_err());
    }

    #[test]
    fn test_palette_covers_table() {
        let total: usize = palette().iter().map(|(_, entries)| entries.len()).sum();
        assert_eq!(total, BLOCK_KINDS.len());
    }
}
