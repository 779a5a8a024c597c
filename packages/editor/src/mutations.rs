//! # Mutation Requests
//!
//! Payloads the gateway sends to the page API. Each request carries only
//! what the backend needs; the backend answers with its own view of the
//! block, and the gateway refetches the page afterwards.

use pagecraft_model::{BlockContent, BlockId, BlockStyle, PageId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Create a block on a page
#[derive(Debug, Clone, PartialEq)]
pub struct CreateBlockInput {
    pub page_id: PageId,
    pub content: BlockContent,
    pub style: BlockStyle,
    pub parent_id: Option<BlockId>,
    /// Left empty for root blocks so the backend assigns the next slot
    pub order: Option<i32>,
    pub depth: u32,
    pub is_visible: bool,
}

/// Partial block update; `None` fields are left untouched
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpdateBlockInput {
    pub content: Option<BlockContent>,
    pub style: Option<BlockStyle>,
    /// `Some(None)` moves the block to the root list
    pub parent_id: Option<Option<BlockId>>,
    pub order: Option<i32>,
    pub depth: Option<u32>,
    pub is_visible: Option<bool>,
}

impl UpdateBlockInput {
    pub fn content(content: BlockContent, style: Option<BlockStyle>) -> Self {
        Self {
            content: Some(content),
            style,
            ..Default::default()
        }
    }

    pub fn visibility(is_visible: bool) -> Self {
        Self {
            is_visible: Some(is_visible),
            ..Default::default()
        }
    }

    pub fn reparent(parent_id: Option<BlockId>, depth: u32, order: i32) -> Self {
        Self {
            parent_id: Some(parent_id),
            depth: Some(depth),
            order: Some(order),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == UpdateBlockInput::default()
    }
}

/// One entry of a batch order update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockOrderUpdate {
    pub id: BlockId,
    pub order: i32,
}

impl BlockOrderUpdate {
    pub fn new(id: impl Into<BlockId>, order: i32) -> Self {
        Self {
            id: id.into(),
            order,
        }
    }
}

/// Index in `ids` becomes the new order
pub fn orders_from_sequence<'a>(ids: impl IntoIterator<Item = &'a BlockId>) -> Vec<BlockOrderUpdate> {
    ids.into_iter()
        .enumerate()
        .map(|(index, id)| BlockOrderUpdate {
            id: id.clone(),
            order: index as i32,
        })
        .collect()
}

/// What an activity log entry or notification is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MutationKind {
    LoadPage,
    SavePage,
    Refetch,
    AddBlock,
    UpdateBlock,
    DeleteBlock,
    ReorderBlocks,
    MoveBlock,
    DuplicateBlock,
    SetVisibility,
    ApplyTemplate,
    Drop,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationKind::LoadPage => "load page",
            MutationKind::SavePage => "save page",
            MutationKind::Refetch => "refetch",
            MutationKind::AddBlock => "add block",
            MutationKind::UpdateBlock => "update block",
            MutationKind::DeleteBlock => "delete block",
            MutationKind::ReorderBlocks => "reorder blocks",
            MutationKind::MoveBlock => "move block",
            MutationKind::DuplicateBlock => "duplicate block",
            MutationKind::SetVisibility => "set visibility",
            MutationKind::ApplyTemplate => "apply template",
            MutationKind::Drop => "drop",
        };
        f.write_str(name)
    }
}
