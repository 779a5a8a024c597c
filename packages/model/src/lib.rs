//! # Pagecraft Model
//!
//! Block and page types for the page builder, plus the read side of the
//! block tree.
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ backend: Page { blocks: [Block] } (flat)    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ tree: selectors + materialize → Forest      │
//! │  - root/children selectors                  │
//! │  - cycle-guarded lookups                    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ renderer / editor                           │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Block payloads are a tagged union ([`BlockContent`]) keyed by
//! [`BlockKind`]; container capability lives in one table
//! ([`BLOCK_KINDS`]).

pub mod block;
pub mod content;
pub mod error;
pub mod integrity;
pub mod kind;
pub mod page;
pub mod style;
pub mod tree;
pub mod visitor;

pub use block::{Block, BlockId};
pub use content::*;
pub use error::{ModelError, TreeError};
pub use integrity::{check_blocks, check_page, has_errors, IntegrityIssue, Severity};
pub use kind::{palette, BlockCategory, BlockKind, KindInfo, BLOCK_KINDS};
pub use page::{LayoutSettings, Page, PageDraft, PageId, PageStatus, SeoSettings};
pub use style::BlockStyle;
pub use tree::{
    children_of, descendant_ids, find_block, find_by_id, is_descendant, materialize,
    materialize_with_limit, root_blocks, siblings, sort_by_order, BlockNode, Forest,
    MAX_TREE_DEPTH,
};
pub use visitor::{outline, walk_forest, walk_node, BlockVisitor};
