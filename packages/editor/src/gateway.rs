//! # Mutation Gateway
//!
//! The single path by which a tree edit reaches the backend, and the
//! single path by which local state is refreshed afterwards.
//!
//! ## Semantics
//!
//! - Every operation refetches the page once the backend call resolves;
//!   local state is never patched from the response.
//! - `reorder_blocks` is the one exception: new orders are written to the
//!   local store before the batch is sent, so drags feel immediate. A
//!   failed batch triggers a reconciling refetch.
//! - Failures are logged, recorded in the activity log and posted as a
//!   notification before the `Err` is returned. Callers may drop it.
//! - Nothing is queued or locked between operations. Concurrent edits
//!   race; whichever refetch completes last is what the store shows.

use pagecraft_model::{
    descendant_ids, is_descendant, siblings, Block, BlockContent, BlockId, BlockKind, BlockStyle,
    Page, PageDraft, PageId,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::activity::{ActivityLog, Outcome};
use crate::api::PageApi;
use crate::errors::{ApiError, GatewayError};
use crate::mutations::{
    orders_from_sequence, BlockOrderUpdate, CreateBlockInput, MutationKind, UpdateBlockInput,
};
use crate::notify::Notifications;
use crate::store::PageStore;

pub type GatewayResult<T> = Result<T, GatewayError>;

pub struct MutationGateway {
    api: Arc<dyn PageApi>,
    pages: Arc<PageStore>,
    log: Arc<ActivityLog>,
    notifications: Arc<Notifications>,
    in_flight: AtomicUsize,
}

/// Decrements the in-flight counter when an operation settles
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MutationGateway {
    pub fn new(
        api: Arc<dyn PageApi>,
        pages: Arc<PageStore>,
        log: Arc<ActivityLog>,
        notifications: Arc<Notifications>,
    ) -> Self {
        Self {
            api,
            pages,
            log,
            notifications,
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn pages(&self) -> &Arc<PageStore> {
        &self.pages
    }

    pub fn activity(&self) -> &Arc<ActivityLog> {
        &self.log
    }

    pub fn notifications(&self) -> &Arc<Notifications> {
        &self.notifications
    }

    /// Operations that have not settled yet; the UI shows these as loading
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Report the outcome of an operation and hand it back
    fn settle<T>(
        &self,
        kind: MutationKind,
        block_id: Option<&BlockId>,
        result: GatewayResult<T>,
        success: impl FnOnce(&T) -> String,
    ) -> GatewayResult<T> {
        match &result {
            Ok(value) => {
                self.log.record(kind, Outcome::Succeeded, block_id, success(value));
            }
            Err(error) => {
                let outcome = match error {
                    GatewayError::Api(_) => Outcome::Failed,
                    _ => Outcome::Rejected,
                };
                warn!(%kind, error = %error, "Mutation failed");
                self.log.record(kind, outcome, block_id, error.to_string());
                self.notifications.error(error.user_message());
            }
        }
        result
    }

    fn require_page(&self) -> GatewayResult<PageId> {
        self.pages.page_id().ok_or(GatewayError::PageNotSaved)
    }

    fn require_block(&self, id: &BlockId) -> GatewayResult<Block> {
        self.pages
            .block(id)
            .ok_or_else(|| GatewayError::BlockNotFound(id.clone()))
    }

    /// Pull the server's copy into the store.
    ///
    /// A failure is reported but leaves the last-known-good page in place.
    async fn refresh(&self, page_id: &PageId) -> bool {
        match self.api.get_page(page_id).await {
            Ok(page) => {
                debug!(page_id = %page_id, blocks = page.blocks.len(), "Refetched page");
                self.pages.replace(page);
                true
            }
            Err(error) => {
                warn!(page_id = %page_id, error = %error, "Refetch failed");
                self.log
                    .record(MutationKind::Refetch, Outcome::Failed, None, error.to_string());
                self.notifications
                    .error(GatewayError::from(error).user_message());
                false
            }
        }
    }

    #[instrument(skip(self), fields(page_id = %id))]
    pub async fn load_page(&self, id: &PageId) -> GatewayResult<Page> {
        let _guard = InFlight::enter(&self.in_flight);
        let result = self.api.get_page(id).await.map_err(GatewayError::from);
        if let Ok(page) = &result {
            self.pages.replace(page.clone());
        }
        self.settle(MutationKind::LoadPage, None, result, |page| {
            format!("Loaded page '{}' with {} blocks", page.title, page.blocks.len())
        })
    }

    /// Refetch the current page
    pub async fn refetch(&self) -> GatewayResult<()> {
        let _guard = InFlight::enter(&self.in_flight);
        let page_id = match self.require_page() {
            Ok(id) => id,
            Err(error) => return self.settle(MutationKind::Refetch, None, Err(error), |_| String::new()),
        };
        if self.refresh(&page_id).await {
            self.log
                .record(MutationKind::Refetch, Outcome::Succeeded, None, "Page refetched");
        }
        Ok(())
    }

    /// Create the page if it has no id yet, otherwise update its metadata
    #[instrument(skip(self, draft), fields(slug = %draft.slug))]
    pub async fn save_page(&self, draft: PageDraft) -> GatewayResult<Page> {
        let _guard = InFlight::enter(&self.in_flight);
        let result = match self.pages.page_id() {
            Some(id) => self.api.update_page(&id, draft).await,
            None => self.api.create_page(draft).await,
        }
        .map_err(GatewayError::from);

        let result = match result {
            Ok(saved) => {
                // Metadata calls don't echo blocks reliably; keep ours until refetch.
                self.refresh(&saved.id).await;
                Ok(self.pages.page().unwrap_or(saved))
            }
            Err(error) => Err(error),
        };

        self.settle(MutationKind::SavePage, None, result, |page| {
            format!("Saved page '{}'", page.title)
        })
    }

    /// Create a block. See [`MutationGateway::add_block_with_style`].
    pub async fn add_block(
        &self,
        kind: BlockKind,
        content: Option<BlockContent>,
        parent_id: Option<&BlockId>,
        order: Option<i32>,
    ) -> GatewayResult<Block> {
        self.add_block_with_style(kind, content, BlockStyle::default(), parent_id, order)
            .await
    }

    /// Create a block with default content for `kind` unless `content` is
    /// given.
    ///
    /// Under a parent, `order` defaults to the current sibling count and
    /// `depth` is the parent's depth + 1. Root blocks leave `order` to the
    /// backend unless it is explicit. Without a saved page nothing is sent.
    #[instrument(skip(self, content, style), fields(kind = %kind, parent = ?parent_id))]
    pub async fn add_block_with_style(
        &self,
        kind: BlockKind,
        content: Option<BlockContent>,
        style: BlockStyle,
        parent_id: Option<&BlockId>,
        order: Option<i32>,
    ) -> GatewayResult<Block> {
        let _guard = InFlight::enter(&self.in_flight);
        let result = self
            .try_add_block(kind, content, style, parent_id, order)
            .await;
        let subject = result.as_ref().ok().map(|b| b.id.clone());
        self.settle(MutationKind::AddBlock, subject.as_ref(), result, |block| {
            format!("Added {} block at order {}", block.type_name(), block.order)
        })
    }

    async fn try_add_block(
        &self,
        kind: BlockKind,
        content: Option<BlockContent>,
        style: BlockStyle,
        parent_id: Option<&BlockId>,
        order: Option<i32>,
    ) -> GatewayResult<Block> {
        let page_id = self.require_page()?;

        let content = content.unwrap_or_else(|| kind.default_content());
        if content.kind() != Some(kind) {
            return Err(GatewayError::ContentMismatch {
                kind: kind.to_string(),
                content: content.type_name().to_string(),
            });
        }

        let (order, depth) = match parent_id {
            Some(parent_id) => {
                let parent = self
                    .pages
                    .block(parent_id)
                    .ok_or_else(|| GatewayError::ParentNotFound(parent_id.clone()))?;
                if !parent.is_container() {
                    return Err(GatewayError::NotAContainer(parent.type_name().to_string()));
                }
                let order = order.unwrap_or(self.pages.child_count(parent_id) as i32);
                (Some(order), parent.depth + 1)
            }
            None => (order, 0),
        };

        let created = self
            .api
            .create_block(CreateBlockInput {
                page_id: page_id.clone(),
                content,
                style,
                parent_id: parent_id.cloned(),
                order,
                depth,
                is_visible: true,
            })
            .await?;

        self.refresh(&page_id).await;
        Ok(created)
    }

    /// Add a block under a live parent
    pub async fn add_child_block(&self, parent_id: &BlockId, kind: BlockKind) -> GatewayResult<Block> {
        self.add_block(kind, None, Some(parent_id), None).await
    }

    /// Replace a block's content (and optionally style).
    ///
    /// The store keeps the old content until the refetch lands.
    #[instrument(skip(self, content, style), fields(block_id = %id))]
    pub async fn update_block(
        &self,
        id: &BlockId,
        content: BlockContent,
        style: Option<BlockStyle>,
    ) -> GatewayResult<Block> {
        let _guard = InFlight::enter(&self.in_flight);
        let result = self
            .try_update(id, UpdateBlockInput::content(content, style))
            .await;
        self.settle(MutationKind::UpdateBlock, Some(id), result, |block| {
            format!("Updated {} block", block.type_name())
        })
    }

    pub async fn update_style(&self, id: &BlockId, style: BlockStyle) -> GatewayResult<Block> {
        let _guard = InFlight::enter(&self.in_flight);
        let input = UpdateBlockInput {
            style: Some(style),
            ..Default::default()
        };
        let result = self.try_update(id, input).await;
        self.settle(MutationKind::UpdateBlock, Some(id), result, |_| {
            "Updated block style".to_string()
        })
    }

    #[instrument(skip(self), fields(block_id = %id))]
    pub async fn set_visibility(&self, id: &BlockId, visible: bool) -> GatewayResult<Block> {
        let _guard = InFlight::enter(&self.in_flight);
        let result = self.try_update(id, UpdateBlockInput::visibility(visible)).await;
        self.settle(MutationKind::SetVisibility, Some(id), result, |block| {
            if block.is_visible {
                "Block shown".to_string()
            } else {
                "Block hidden".to_string()
            }
        })
    }

    async fn try_update(&self, id: &BlockId, input: UpdateBlockInput) -> GatewayResult<Block> {
        let page_id = self.require_page()?;
        let updated = self.api.update_block(id, input).await?;
        self.refresh(&page_id).await;
        Ok(updated)
    }

    /// Delete by id. Descendants are the backend's concern; the refetch
    /// shows whatever it left behind.
    #[instrument(skip(self), fields(block_id = %id))]
    pub async fn delete_block(&self, id: &BlockId) -> GatewayResult<()> {
        let _guard = InFlight::enter(&self.in_flight);
        let result = self.try_delete(id).await;
        self.settle(MutationKind::DeleteBlock, Some(id), result, |_| {
            "Deleted block".to_string()
        })
    }

    async fn try_delete(&self, id: &BlockId) -> GatewayResult<()> {
        let page_id = self.require_page()?;
        self.api.delete_block(id).await?;
        self.refresh(&page_id).await;
        Ok(())
    }

    /// Persist `ordered` as a sibling sequence: index becomes order.
    ///
    /// The new orders are applied to the store before the batch is sent.
    #[instrument(skip(self, ordered), fields(count = ordered.len()))]
    pub async fn reorder_blocks(&self, ordered: &[Block]) -> GatewayResult<Vec<BlockOrderUpdate>> {
        let _guard = InFlight::enter(&self.in_flight);
        let result = self.try_reorder(ordered).await;
        self.settle(MutationKind::ReorderBlocks, None, result, |updates| {
            format!("Reordered {} blocks", updates.len())
        })
    }

    async fn try_reorder(&self, ordered: &[Block]) -> GatewayResult<Vec<BlockOrderUpdate>> {
        let page_id = self.require_page()?;
        let updates = orders_from_sequence(ordered.iter().map(|b| &b.id));

        self.pages.apply_orders(&updates);

        if let Err(error) = self.api.reorder_blocks(updates.clone()).await {
            // Roll the optimistic orders back to whatever the server has.
            self.refresh(&page_id).await;
            return Err(error.into());
        }

        self.refresh(&page_id).await;
        Ok(updates)
    }

    /// Reparent `id` under `new_parent` (root list when `None`) at `index`.
    ///
    /// Both the old and the new sibling lists are renumbered in one batch.
    /// Descendant depths are not recomputed.
    #[instrument(skip(self), fields(block_id = %id, parent = ?new_parent))]
    pub async fn move_block(
        &self,
        id: &BlockId,
        new_parent: Option<&BlockId>,
        index: usize,
    ) -> GatewayResult<()> {
        let _guard = InFlight::enter(&self.in_flight);
        let result = self.try_move(id, new_parent, index).await;
        self.settle(MutationKind::MoveBlock, Some(id), result, |_| match new_parent {
            Some(parent) => format!("Moved block into {}", parent),
            None => "Moved block to page root".to_string(),
        })
    }

    async fn try_move(
        &self,
        id: &BlockId,
        new_parent: Option<&BlockId>,
        index: usize,
    ) -> GatewayResult<()> {
        let page_id = self.require_page()?;
        let blocks = self.pages.blocks();
        let block = self.require_block(id)?;

        let depth = match new_parent {
            Some(parent_id) => {
                if parent_id == id || is_descendant(&blocks, id, parent_id) {
                    return Err(GatewayError::WouldCreateCycle(id.clone()));
                }
                let parent = self
                    .pages
                    .block(parent_id)
                    .ok_or_else(|| GatewayError::ParentNotFound(parent_id.clone()))?;
                if !parent.is_container() {
                    return Err(GatewayError::NotAContainer(parent.type_name().to_string()));
                }
                parent.depth + 1
            }
            None => 0,
        };

        let mut target: Vec<BlockId> = siblings(&blocks, new_parent)
            .into_iter()
            .filter(|b| &b.id != id)
            .map(|b| b.id.clone())
            .collect();
        let index = index.min(target.len());
        target.insert(index, id.clone());

        let mut updates = orders_from_sequence(&target);
        if block.parent_id.as_ref() != new_parent {
            let old: Vec<BlockId> = siblings(&blocks, block.parent_id.as_ref())
                .into_iter()
                .filter(|b| &b.id != id)
                .map(|b| b.id.clone())
                .collect();
            updates.extend(orders_from_sequence(&old));
        }

        let reparent = UpdateBlockInput::reparent(new_parent.cloned(), depth, index as i32);
        let written = self.write_move(id, reparent, updates).await;

        // The reparent may have landed even when the batch did not.
        self.refresh(&page_id).await;
        written.map_err(GatewayError::from)
    }

    async fn write_move(
        &self,
        id: &BlockId,
        reparent: UpdateBlockInput,
        updates: Vec<BlockOrderUpdate>,
    ) -> Result<(), ApiError> {
        self.api.update_block(id, reparent).await?;
        self.api.reorder_blocks(updates).await
    }

    /// Copy a block and its subtree; the copy lands right after the
    /// original among its siblings.
    #[instrument(skip(self), fields(block_id = %id))]
    pub async fn duplicate_block(&self, id: &BlockId) -> GatewayResult<Block> {
        let _guard = InFlight::enter(&self.in_flight);
        let result = self.try_duplicate(id).await;
        let subject = result.as_ref().ok().map(|b| b.id.clone());
        self.settle(MutationKind::DuplicateBlock, subject.as_ref(), result, |block| {
            format!("Duplicated {} block", block.type_name())
        })
    }

    async fn try_duplicate(&self, id: &BlockId) -> GatewayResult<Block> {
        let page_id = self.require_page()?;
        let blocks = self.pages.blocks();
        let source = self.require_block(id)?;

        let written = self.write_duplicate(&page_id, &blocks, &source).await;

        // Copies created before a failed call are still on the server.
        self.refresh(&page_id).await;
        written.map_err(GatewayError::from)
    }

    async fn write_duplicate(
        &self,
        page_id: &PageId,
        blocks: &[Block],
        source: &Block,
    ) -> Result<Block, ApiError> {
        let id = &source.id;
        let copy = self
            .api
            .create_block(CreateBlockInput {
                page_id: page_id.clone(),
                content: source.content.clone(),
                style: source.style.clone(),
                parent_id: source.parent_id.clone(),
                order: Some(source.order + 1),
                depth: source.depth,
                is_visible: source.is_visible,
            })
            .await?;

        // Parents are always created before their children.
        let mut new_ids: HashMap<BlockId, BlockId> = HashMap::new();
        new_ids.insert(source.id.clone(), copy.id.clone());
        let subtree = descendant_ids(blocks, id);
        for old_id in &subtree {
            let Some(original) = blocks.iter().find(|b| &b.id == old_id) else {
                continue;
            };
            let Some(parent) = original.parent_id.as_ref().and_then(|p| new_ids.get(p)) else {
                continue;
            };
            let created = self
                .api
                .create_block(CreateBlockInput {
                    page_id: page_id.clone(),
                    content: original.content.clone(),
                    style: original.style.clone(),
                    parent_id: Some(parent.clone()),
                    order: Some(original.order),
                    depth: original.depth,
                    is_visible: original.is_visible,
                })
                .await?;
            new_ids.insert(original.id.clone(), created.id);
        }

        let mut sequence: Vec<BlockId> = siblings(blocks, source.parent_id.as_ref())
            .into_iter()
            .map(|b| b.id.clone())
            .collect();
        let position = sequence
            .iter()
            .position(|sibling| sibling == id)
            .map(|i| i + 1)
            .unwrap_or(sequence.len());
        sequence.insert(position, copy.id.clone());
        self.api.reorder_blocks(orders_from_sequence(&sequence)).await?;

        info!(copies = new_ids.len(), "Duplicated subtree");
        Ok(copy)
    }
}
