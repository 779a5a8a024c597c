//! # State Stores
//!
//! Explicit, independently owned state slices. The gateway and the drag
//! controller receive the slices they need by `Arc` instead of looking
//! them up from ambient context.
//!
//! - [`PageStore`]: the local cache of the server's page
//! - [`UiState`]: selection, preview mode, hover target
//!
//! Locks are only held for the duration of a read or a write, never
//! across an `.await`.

use pagecraft_model::{
    children_of, find_block, materialize_with_limit, Block, BlockId, Forest, Page, PageId,
    MAX_TREE_DEPTH,
};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::mutations::BlockOrderUpdate;

#[derive(Debug, Default)]
struct PageState {
    page: Option<Page>,
    /// Bumped on every replace or local edit
    version: u64,
}

/// Local copy of the page being edited
#[derive(Debug)]
pub struct PageStore {
    state: RwLock<PageState>,
    depth_limit: usize,
}

impl Default for PageStore {
    fn default() -> Self {
        Self {
            state: RwLock::new(PageState::default()),
            depth_limit: MAX_TREE_DEPTH,
        }
    }
}

impl PageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nesting limit used when materializing the forest
    pub fn with_depth_limit(mut self, limit: usize) -> Self {
        self.depth_limit = limit.max(1);
        self
    }

    pub fn with_page(page: Page) -> Self {
        let store = Self::new();
        store.replace(page);
        store
    }

    fn read(&self) -> RwLockReadGuard<'_, PageState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, PageState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the page
    pub fn page(&self) -> Option<Page> {
        self.read().page.clone()
    }

    /// `None` until the page has been saved once
    pub fn page_id(&self) -> Option<PageId> {
        self.read().page.as_ref().map(|p| p.id.clone())
    }

    pub fn version(&self) -> u64 {
        self.read().version
    }

    /// Snapshot of the flat block list
    pub fn blocks(&self) -> Vec<Block> {
        self.read()
            .page
            .as_ref()
            .map(|p| p.blocks.clone())
            .unwrap_or_default()
    }

    pub fn block(&self, id: &BlockId) -> Option<Block> {
        let state = self.read();
        let page = state.page.as_ref()?;
        find_block(&page.blocks, id).cloned()
    }

    pub fn child_count(&self, parent_id: &BlockId) -> usize {
        let state = self.read();
        state
            .page
            .as_ref()
            .map(|p| children_of(&p.blocks, parent_id).len())
            .unwrap_or(0)
    }

    pub fn forest(&self) -> Forest {
        let state = self.read();
        state
            .page
            .as_ref()
            .map(|p| materialize_with_limit(&p.blocks, self.depth_limit))
            .unwrap_or_default()
    }

    /// Swap in the server's copy; the last caller wins
    pub fn replace(&self, page: Page) {
        let mut state = self.write();
        state.page = Some(page);
        state.version += 1;
    }

    pub fn clear(&self) {
        let mut state = self.write();
        state.page = None;
        state.version += 1;
    }

    /// Optimistically set new sibling orders. Unknown ids are skipped.
    pub fn apply_orders(&self, updates: &[BlockOrderUpdate]) {
        let mut state = self.write();
        let Some(page) = state.page.as_mut() else {
            return;
        };

        for update in updates {
            if let Some(block) = page.block_mut(&update.id) {
                block.order = update.order;
            }
        }
        state.version += 1;
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct UiSnapshot {
    selected: Option<BlockId>,
    hovered: Option<BlockId>,
    preview: bool,
}

/// Editor UI state
#[derive(Debug, Default)]
pub struct UiState {
    state: RwLock<UiSnapshot>,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, UiSnapshot> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, UiSnapshot> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn selected(&self) -> Option<BlockId> {
        self.read().selected.clone()
    }

    pub fn select(&self, id: Option<BlockId>) {
        self.write().selected = id;
    }

    pub fn is_selected(&self, id: &BlockId) -> bool {
        self.read().selected.as_ref() == Some(id)
    }

    /// Drop the selection if it points at one of `ids`
    pub fn forget(&self, ids: &[BlockId]) {
        let mut state = self.write();
        if state.selected.as_ref().is_some_and(|s| ids.contains(s)) {
            state.selected = None;
        }
        if state.hovered.as_ref().is_some_and(|h| ids.contains(h)) {
            state.hovered = None;
        }
    }

    pub fn hovered(&self) -> Option<BlockId> {
        self.read().hovered.clone()
    }

    pub fn hover(&self, id: Option<BlockId>) {
        self.write().hovered = id;
    }

    pub fn is_preview(&self) -> bool {
        self.read().preview
    }

    pub fn set_preview(&self, preview: bool) {
        let mut state = self.write();
        state.preview = preview;
        if preview {
            state.hovered = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_model::BlockKind;

    fn store_page() -> Page {
        Page::new("p1", "Home", "home").with_blocks(vec![
            Block::new("a", BlockKind::Section),
            Block::new("a1", BlockKind::Text).with_parent("a", 1),
            Block::new("b", BlockKind::Text).with_order(1),
        ])
    }

    fn store() -> PageStore {
        PageStore::with_page(store_page())
    }

    #[test]
    fn test_empty_store_has_no_page_id() {
        let store = PageStore::new();
        assert!(store.page_id().is_none());
        assert!(store.blocks().is_empty());
        assert!(store.forest().is_empty());
    }

    #[test]
    fn test_apply_orders_is_local_only() {
        let store = store();
        let before = store.version();

        store.apply_orders(&[BlockOrderUpdate::new("b", 0), BlockOrderUpdate::new("a", 1)]);

        assert_eq!(store.block(&BlockId::from("b")).unwrap().order, 0);
        assert_eq!(store.block(&BlockId::from("a")).unwrap().order, 1);
        assert_eq!(store.version(), before + 1);
    }

    #[test]
    fn test_depth_limit_detaches_nested_blocks() {
        let store = PageStore::new().with_depth_limit(1);
        store.replace(store_page());
        let forest = store.forest();
        assert_eq!(forest.detached, vec![BlockId::from("a1")]);
    }

    #[test]
    fn test_child_count() {
        assert_eq!(store().child_count(&BlockId::from("a")), 1);
        assert_eq!(store().child_count(&BlockId::from("b")), 0);
    }

    #[test]
    fn test_forget_clears_selection() {
        let ui = UiState::new();
        ui.select(Some(BlockId::from("a1")));
        ui.forget(&[BlockId::from("zzz")]);
        assert!(ui.is_selected(&BlockId::from("a1")));

        ui.forget(&[BlockId::from("a"), BlockId::from("a1")]);
        assert_eq!(ui.selected(), None);
    }

    #[test]
    fn test_preview_clears_hover() {
        let ui = UiState::new();
        ui.hover(Some(BlockId::from("a")));
        ui.set_preview(true);
        assert!(ui.is_preview());
        assert_eq!(ui.hovered(), None);
    }
}
