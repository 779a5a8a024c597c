use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::content::BlockContent;
use crate::kind::BlockKind;
use crate::style::BlockStyle;

/// Backend-assigned block identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for BlockId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single content or layout unit on a page.
///
/// Blocks are stored flat; `parent_id` links a block to the container
/// that owns it. `depth` is set at creation time and is not recomputed
/// when a block is reparented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBlock", into = "RawBlock")]
pub struct Block {
    pub id: BlockId,
    pub content: BlockContent,
    pub style: BlockStyle,
    pub order: i32,
    pub parent_id: Option<BlockId>,
    pub depth: u32,
    pub is_visible: bool,
}

impl Block {
    /// Root-level block with default content for `kind`
    pub fn new(id: impl Into<BlockId>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            content: kind.default_content(),
            style: BlockStyle::default(),
            order: 0,
            parent_id: None,
            depth: 0,
            is_visible: true,
        }
    }

    pub fn with_content(mut self, content: BlockContent) -> Self {
        self.content = content;
        self
    }

    pub fn with_style(mut self, style: BlockStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<BlockId>, depth: u32) -> Self {
        self.parent_id = Some(parent_id.into());
        self.depth = depth;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_visible = false;
        self
    }

    /// `None` for wire types this build does not know
    pub fn kind(&self) -> Option<BlockKind> {
        self.content.kind()
    }

    pub fn type_name(&self) -> &str {
        self.content.type_name()
    }

    pub fn is_container(&self) -> bool {
        self.kind().is_some_and(BlockKind::is_container)
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// Wire representation: `type` and `content` side by side
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBlock {
    id: BlockId,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    content: Value,
    #[serde(default)]
    style: BlockStyle,
    #[serde(default)]
    order: i32,
    #[serde(default)]
    parent_id: Option<BlockId>,
    #[serde(default)]
    depth: u32,
    #[serde(default = "default_visible")]
    is_visible: bool,
}

fn default_visible() -> bool {
    true
}

impl TryFrom<RawBlock> for Block {
    type Error = serde_json::Error;

    fn try_from(raw: RawBlock) -> Result<Self, Self::Error> {
        Ok(Block {
            content: BlockContent::from_raw(&raw.type_name, raw.content)?,
            id: raw.id,
            style: raw.style,
            order: raw.order,
            parent_id: raw.parent_id,
            depth: raw.depth,
            is_visible: raw.is_visible,
        })
    }
}

impl From<Block> for RawBlock {
    fn from(block: Block) -> Self {
        RawBlock {
            type_name: block.type_name().to_string(),
            content: block.content.to_raw(),
            id: block.id,
            style: block.style,
            order: block.order,
            parent_id: block.parent_id,
            depth: block.depth,
            is_visible: block.is_visible,
        }
    }
}
