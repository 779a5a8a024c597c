use async_trait::async_trait;
use pagecraft_model::{Block, BlockId, Page, PageDraft, PageId};

use crate::errors::ApiError;
use crate::mutations::{BlockOrderUpdate, CreateBlockInput, UpdateBlockInput};

/// Remote page API
///
/// The backend owns pages and their flat block lists. Implementations
/// are expected to:
/// - assign block ids on creation
/// - assign `order` when a create request leaves it empty
/// - remove a deleted container's descendants
#[async_trait]
pub trait PageApi: Send + Sync {
    async fn get_page(&self, id: &PageId) -> Result<Page, ApiError>;

    async fn create_page(&self, draft: PageDraft) -> Result<Page, ApiError>;

    async fn update_page(&self, id: &PageId, draft: PageDraft) -> Result<Page, ApiError>;

    async fn create_block(&self, input: CreateBlockInput) -> Result<Block, ApiError>;

    async fn update_block(&self, id: &BlockId, input: UpdateBlockInput) -> Result<Block, ApiError>;

    async fn delete_block(&self, id: &BlockId) -> Result<(), ApiError>;

    /// Batch order update; rejected as a whole if any id is unknown
    async fn reorder_blocks(&self, updates: Vec<BlockOrderUpdate>) -> Result<(), ApiError>;
}
