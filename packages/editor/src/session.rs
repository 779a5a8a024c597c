//! # Builder Session
//!
//! [`PageBuilder`] owns one editing session: the state slices, the
//! gateway wired to them, the drag controller and the template store.
//! Each slice is its own object; the builder only hands out references.

use pagecraft_model::{descendant_ids, outline, Block, BlockId, BlockNode, Page, PageDraft, PageId};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::activity::ActivityLog;
use crate::api::PageApi;
use crate::config::BuilderConfig;
use crate::drag::DragController;
use crate::errors::TemplateError;
use crate::gateway::{GatewayResult, MutationGateway};
use crate::notify::Notifications;
use crate::store::{PageStore, UiState};
use crate::templates::{apply_template, SavedBlock, TemplateStore};

pub struct PageBuilder {
    pages: Arc<PageStore>,
    ui: Arc<UiState>,
    templates: Arc<TemplateStore>,
    gateway: Arc<MutationGateway>,
    drag: DragController,
}

impl PageBuilder {
    pub fn new(api: Arc<dyn PageApi>, templates: TemplateStore, config: &BuilderConfig) -> Self {
        let pages = Arc::new(PageStore::new().with_depth_limit(config.max_tree_depth));
        let ui = Arc::new(UiState::new());
        let gateway = Arc::new(MutationGateway::new(
            api,
            pages.clone(),
            Arc::new(ActivityLog::new(config.activity_log_capacity)),
            Arc::new(Notifications::new(config.notification_capacity)),
        ));
        let drag = DragController::new(gateway.clone(), ui.clone());

        Self {
            pages,
            ui,
            templates: Arc::new(templates),
            gateway,
            drag,
        }
    }

    /// Default config and an in-memory template store
    pub fn with_api(api: Arc<dyn PageApi>) -> Self {
        Self::new(api, TemplateStore::in_memory(), &BuilderConfig::default())
    }

    pub fn pages(&self) -> &Arc<PageStore> {
        &self.pages
    }

    pub fn ui(&self) -> &Arc<UiState> {
        &self.ui
    }

    pub fn gateway(&self) -> &Arc<MutationGateway> {
        &self.gateway
    }

    pub fn templates(&self) -> &Arc<TemplateStore> {
        &self.templates
    }

    pub fn activity(&self) -> &Arc<ActivityLog> {
        self.gateway.activity()
    }

    pub fn notifications(&self) -> &Arc<Notifications> {
        self.gateway.notifications()
    }

    pub fn drag(&mut self) -> &mut DragController {
        &mut self.drag
    }

    pub fn page(&self) -> Option<Page> {
        self.pages.page()
    }

    /// Load a page and start with nothing selected
    pub async fn open(&self, id: &PageId) -> GatewayResult<Page> {
        let page = self.gateway.load_page(id).await?;
        self.ui.select(None);
        Ok(page)
    }

    pub async fn save(&self, draft: PageDraft) -> GatewayResult<Page> {
        self.gateway.save_page(draft).await
    }

    /// Select a block by id, or clear with `None`.
    ///
    /// Unknown ids and selection in preview mode are ignored.
    pub fn select_block(&self, id: Option<BlockId>) -> bool {
        match id {
            None => {
                self.ui.select(None);
                true
            }
            Some(_) if self.ui.is_preview() => false,
            Some(id) if self.pages.block(&id).is_some() => {
                debug!(block_id = %id, "Selected block");
                self.ui.select(Some(id));
                true
            }
            Some(id) => {
                warn!(block_id = %id, "Ignoring selection of unknown block");
                false
            }
        }
    }

    /// The selected block with its subtree, if it is still on the page
    pub fn selected_block(&self) -> Option<BlockNode> {
        let id = self.ui.selected()?;
        match self.pages.forest().find(&id) {
            Ok(node) => Some(node.clone()),
            Err(error) => {
                debug!(block_id = %id, error = %error, "Selected block is not in the tree");
                None
            }
        }
    }

    /// Toggle preview mode. Entering preview drops the selection.
    pub fn set_preview(&self, preview: bool) {
        self.ui.set_preview(preview);
        if preview {
            self.ui.select(None);
        }
    }

    pub fn toggle_preview(&self) -> bool {
        let preview = !self.ui.is_preview();
        self.set_preview(preview);
        preview
    }

    /// Delete a block; selection inside the removed subtree is cleared
    pub async fn delete_block(&self, id: &BlockId) -> GatewayResult<()> {
        let mut removed = descendant_ids(&self.pages.blocks(), id);
        removed.push(id.clone());

        self.gateway.delete_block(id).await?;
        self.ui.forget(&removed);
        Ok(())
    }

    pub async fn delete_selected(&self) -> GatewayResult<bool> {
        match self.ui.selected() {
            Some(id) => self.delete_block(&id).await.map(|_| true),
            None => Ok(false),
        }
    }

    pub async fn apply_template(&self, id: &str) -> Result<Vec<Block>, TemplateError> {
        let template = self
            .templates
            .get(id)
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))?;
        apply_template(&self.gateway, &template).await
    }

    /// Keep the selected subtree for reuse
    pub fn save_selected(&self, name: &str) -> Result<Option<SavedBlock>, TemplateError> {
        match self.selected_block() {
            Some(node) => self.templates.save_block(name, &node).map(Some),
            None => Ok(None),
        }
    }

    /// Insert a saved block combination at the end of the page
    pub async fn insert_saved(&self, id: &str) -> Result<Vec<Block>, TemplateError> {
        let saved = self
            .templates
            .saved_blocks()
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))?;
        apply_template(&self.gateway, &saved.as_template()).await
    }

    /// Indented text outline of the current tree
    pub fn outline(&self) -> String {
        outline(&self.pages.forest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryPageApi;
    use pagecraft_model::BlockKind;

    fn page() -> Page {
        Page::new("p1", "Home", "home").with_blocks(vec![
            Block::new("s", BlockKind::Section),
            Block::new("t", BlockKind::Text).with_parent("s", 1),
            Block::new("d", BlockKind::Divider).with_order(1),
        ])
    }

    async fn builder() -> PageBuilder {
        let builder = PageBuilder::with_api(Arc::new(InMemoryPageApi::with_page(page())));
        builder.open(&PageId::from("p1")).await.unwrap();
        builder
    }

    #[tokio::test]
    async fn test_select_known_block_only() {
        let builder = builder().await;

        assert!(builder.select_block(Some(BlockId::from("t"))));
        assert!(!builder.select_block(Some(BlockId::from("ghost"))));
        assert_eq!(builder.ui().selected(), Some(BlockId::from("t")));
        assert_eq!(builder.selected_block().unwrap().block.id, BlockId::from("t"));
    }

    #[tokio::test]
    async fn test_deleting_ancestor_clears_selection() {
        let builder = builder().await;
        builder.select_block(Some(BlockId::from("t")));

        builder.delete_block(&BlockId::from("s")).await.unwrap();

        assert_eq!(builder.ui().selected(), None);
        assert_eq!(builder.pages().blocks().len(), 1);
    }

    #[tokio::test]
    async fn test_preview_drops_selection() {
        let builder = builder().await;
        builder.select_block(Some(BlockId::from("d")));

        assert!(builder.toggle_preview());
        assert_eq!(builder.ui().selected(), None);
        assert!(!builder.select_block(Some(BlockId::from("d"))));
    }

    #[tokio::test]
    async fn test_save_and_reinsert_selection() {
        let builder = builder().await;
        builder.select_block(Some(BlockId::from("s")));

        let saved = builder.save_selected("Intro").unwrap().unwrap();
        let created = builder.insert_saved(&saved.id).await.unwrap();

        assert_eq!(created.len(), 2);
        assert_eq!(created[1].parent_id.as_ref(), Some(&created[0].id));
        assert_eq!(builder.pages().blocks().len(), 5);
    }
}
