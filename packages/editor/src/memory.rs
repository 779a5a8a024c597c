//! # In-Memory Page API
//!
//! A [`PageApi`] backed by a map of pages. Used by tests and the CLI.
//!
//! Every call is recorded so tests can assert exactly what the gateway
//! sent; failures can be queued per operation to exercise error paths.

use async_trait::async_trait;
use chrono::Utc;
use pagecraft_model::{descendant_ids, Block, BlockId, Page, PageDraft, PageId};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

use crate::api::PageApi;
use crate::errors::ApiError;
use crate::mutations::{BlockOrderUpdate, CreateBlockInput, UpdateBlockInput};

/// Operation selector for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiOp {
    GetPage,
    CreatePage,
    UpdatePage,
    CreateBlock,
    UpdateBlock,
    DeleteBlock,
    ReorderBlocks,
}

/// A recorded call
#[derive(Debug, Clone, PartialEq)]
pub enum ApiCall {
    GetPage(PageId),
    CreatePage(PageDraft),
    UpdatePage(PageId, PageDraft),
    CreateBlock(CreateBlockInput),
    UpdateBlock(BlockId, UpdateBlockInput),
    DeleteBlock(BlockId),
    ReorderBlocks(Vec<BlockOrderUpdate>),
}

impl ApiCall {
    /// Everything except reads
    pub fn is_mutation(&self) -> bool {
        !matches!(self, ApiCall::GetPage(_))
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    pages: HashMap<PageId, Page>,
    calls: Vec<ApiCall>,
    failures: HashMap<ApiOp, VecDeque<ApiError>>,
    next_page: u64,
}

#[derive(Debug, Default)]
pub struct InMemoryPageApi {
    state: Mutex<MemoryState>,
    latency: Option<Duration>,
}

impl InMemoryPageApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with an existing page
    pub fn with_page(page: Page) -> Self {
        let api = Self::new();
        api.insert_page(page);
        api
    }

    /// Delay every call, to keep requests in flight during tests
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn insert_page(&self, page: Page) {
        self.lock().pages.insert(page.id.clone(), page);
    }

    /// Backend's current copy of a page
    pub fn page(&self, id: &PageId) -> Option<Page> {
        self.lock().pages.get(id).cloned()
    }

    /// Queue a failure for the next call of `op`
    pub fn fail_next(&self, op: ApiOp, error: ApiError) {
        self.lock().failures.entry(op).or_default().push_back(error);
    }

    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    pub fn mutation_calls(&self) -> Vec<ApiCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.is_mutation())
            .cloned()
            .collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record the call, then honour latency and queued failures
    async fn begin(&self, op: ApiOp, call: ApiCall) -> Result<(), ApiError> {
        debug!(?op, "In-memory API call");
        self.lock().calls.push(call);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        match self.lock().failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl MemoryState {
    fn page_of_block(&mut self, id: &BlockId) -> Result<&mut Page, ApiError> {
        self.pages
            .values_mut()
            .find(|page| page.blocks.iter().any(|b| &b.id == id))
            .ok_or_else(|| ApiError::BlockNotFound(id.clone()))
    }
}

#[async_trait]
impl PageApi for InMemoryPageApi {
    async fn get_page(&self, id: &PageId) -> Result<Page, ApiError> {
        self.begin(ApiOp::GetPage, ApiCall::GetPage(id.clone())).await?;

        self.lock()
            .pages
            .get(id)
            .cloned()
            .ok_or_else(|| ApiError::PageNotFound(id.clone()))
    }

    async fn create_page(&self, draft: PageDraft) -> Result<Page, ApiError> {
        self.begin(ApiOp::CreatePage, ApiCall::CreatePage(draft.clone())).await?;

        if draft.slug.trim().is_empty() {
            return Err(ApiError::Validation("slug is required".to_string()));
        }

        let mut state = self.lock();
        if state.pages.values().any(|p| p.slug == draft.slug) {
            return Err(ApiError::Validation(format!(
                "slug '{}' is already taken",
                draft.slug
            )));
        }

        state.next_page += 1;
        let id = PageId::new(format!("page-{}", state.next_page));
        let mut page = Page::from_draft(id.clone(), draft);
        let now = Utc::now();
        page.created_at = Some(now);
        page.updated_at = Some(now);

        state.pages.insert(id, page.clone());
        Ok(page)
    }

    async fn update_page(&self, id: &PageId, draft: PageDraft) -> Result<Page, ApiError> {
        self.begin(ApiOp::UpdatePage, ApiCall::UpdatePage(id.clone(), draft.clone()))
            .await?;

        let mut state = self.lock();
        let page = state
            .pages
            .get_mut(id)
            .ok_or_else(|| ApiError::PageNotFound(id.clone()))?;
        page.apply_draft(draft);
        page.updated_at = Some(Utc::now());
        Ok(page.clone())
    }

    async fn create_block(&self, input: CreateBlockInput) -> Result<Block, ApiError> {
        self.begin(ApiOp::CreateBlock, ApiCall::CreateBlock(input.clone()))
            .await?;

        let mut state = self.lock();
        let page = state
            .pages
            .get_mut(&input.page_id)
            .ok_or_else(|| ApiError::PageNotFound(input.page_id.clone()))?;

        if let Some(parent_id) = &input.parent_id {
            if page.block(parent_id).is_none() {
                return Err(ApiError::Validation(format!(
                    "parent {} does not exist",
                    parent_id
                )));
            }
        }

        let order = input.order.unwrap_or_else(|| {
            page.blocks
                .iter()
                .filter(|b| b.parent_id == input.parent_id)
                .map(|b| b.order + 1)
                .max()
                .unwrap_or(0)
        });

        let block = Block {
            id: BlockId::new(uuid::Uuid::new_v4().to_string()),
            content: input.content,
            style: input.style,
            order,
            parent_id: input.parent_id,
            depth: input.depth,
            is_visible: input.is_visible,
        };

        page.blocks.push(block.clone());
        page.updated_at = Some(Utc::now());
        Ok(block)
    }

    async fn update_block(&self, id: &BlockId, input: UpdateBlockInput) -> Result<Block, ApiError> {
        self.begin(ApiOp::UpdateBlock, ApiCall::UpdateBlock(id.clone(), input.clone()))
            .await?;

        let mut state = self.lock();
        let page = state.page_of_block(id)?;

        if let Some(Some(parent_id)) = &input.parent_id {
            if page.block(parent_id).is_none() {
                return Err(ApiError::Validation(format!(
                    "parent {} does not exist",
                    parent_id
                )));
            }
        }

        let block = page
            .block_mut(id)
            .ok_or_else(|| ApiError::BlockNotFound(id.clone()))?;

        if let Some(content) = input.content {
            block.content = content;
        }
        if let Some(style) = input.style {
            block.style = style;
        }
        if let Some(parent_id) = input.parent_id {
            block.parent_id = parent_id;
        }
        if let Some(order) = input.order {
            block.order = order;
        }
        if let Some(depth) = input.depth {
            block.depth = depth;
        }
        if let Some(is_visible) = input.is_visible {
            block.is_visible = is_visible;
        }

        let updated = block.clone();
        page.updated_at = Some(Utc::now());
        Ok(updated)
    }

    async fn delete_block(&self, id: &BlockId) -> Result<(), ApiError> {
        self.begin(ApiOp::DeleteBlock, ApiCall::DeleteBlock(id.clone()))
            .await?;

        let mut state = self.lock();
        let page = state.page_of_block(id)?;

        let mut doomed = descendant_ids(&page.blocks, id);
        doomed.push(id.clone());
        page.blocks.retain(|b| !doomed.contains(&b.id));
        page.updated_at = Some(Utc::now());

        debug!(block_id = %id, removed = doomed.len(), "Deleted block with descendants");
        Ok(())
    }

    async fn reorder_blocks(&self, updates: Vec<BlockOrderUpdate>) -> Result<(), ApiError> {
        self.begin(ApiOp::ReorderBlocks, ApiCall::ReorderBlocks(updates.clone()))
            .await?;

        let mut state = self.lock();

        // Validate the whole batch before touching anything
        for update in &updates {
            state.page_of_block(&update.id)?;
        }

        for update in updates {
            let page = state.page_of_block(&update.id)?;
            if let Some(block) = page.block_mut(&update.id) {
                block.order = update.order;
            }
            page.updated_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_model::BlockKind;

    fn input(page_id: &PageId, parent: Option<&str>, order: Option<i32>) -> CreateBlockInput {
        CreateBlockInput {
            page_id: page_id.clone(),
            content: BlockKind::Text.default_content(),
            style: Default::default(),
            parent_id: parent.map(BlockId::from),
            order,
            depth: if parent.is_some() { 1 } else { 0 },
            is_visible: true,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_order() {
        let api = InMemoryPageApi::with_page(Page::new("p1", "Home", "home"));
        let page_id = PageId::from("p1");

        let first = api.create_block(input(&page_id, None, None)).await.unwrap();
        let second = api.create_block(input(&page_id, None, None)).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(first.order, 0);
        assert_eq!(second.order, 1);
        assert_eq!(api.page(&page_id).unwrap().blocks.len(), 2);
    }

    #[tokio::test]
    async fn test_delete_cascades_to_descendants() {
        let page = Page::new("p1", "Home", "home").with_blocks(vec![
            Block::new("s", BlockKind::Section),
            Block::new("g", BlockKind::Grid).with_parent("s", 1),
            Block::new("t", BlockKind::Text).with_parent("g", 2),
            Block::new("other", BlockKind::Text).with_order(1),
        ]);
        let api = InMemoryPageApi::with_page(page);

        api.delete_block(&BlockId::from("s")).await.unwrap();

        let remaining: Vec<_> = api
            .page(&PageId::from("p1"))
            .unwrap()
            .blocks
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(remaining, vec![BlockId::from("other")]);
    }

    #[tokio::test]
    async fn test_reorder_rejects_whole_batch_on_unknown_id() {
        let page = Page::new("p1", "Home", "home")
            .with_blocks(vec![Block::new("a", BlockKind::Text)]);
        let api = InMemoryPageApi::with_page(page);

        let result = api
            .reorder_blocks(vec![
                BlockOrderUpdate::new("a", 5),
                BlockOrderUpdate::new("ghost", 6),
            ])
            .await;

        assert_eq!(result, Err(ApiError::BlockNotFound(BlockId::from("ghost"))));
        assert_eq!(api.page(&PageId::from("p1")).unwrap().blocks[0].order, 0);
    }

    #[tokio::test]
    async fn test_injected_failure_is_consumed_once() {
        let api = InMemoryPageApi::with_page(Page::new("p1", "Home", "home"));
        api.fail_next(ApiOp::GetPage, ApiError::Network("offline".to_string()));

        let page_id = PageId::from("p1");
        assert!(api.get_page(&page_id).await.is_err());
        assert!(api.get_page(&page_id).await.is_ok());
        assert_eq!(api.calls().len(), 2);
        assert!(api.mutation_calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_page_requires_unique_slug() {
        let api = InMemoryPageApi::with_page(Page::new("p1", "Home", "home"));
        let draft = PageDraft {
            title: "Home again".to_string(),
            slug: "home".to_string(),
            ..Default::default()
        };

        assert!(matches!(
            api.create_page(draft).await,
            Err(ApiError::Validation(_))
        ));
    }
}
