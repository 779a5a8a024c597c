//! Error types for the editor

use pagecraft_model::{BlockId, ModelError, PageId};
use thiserror::Error;

/// Failures reported by the remote page API
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Page not found: {0}")]
    PageNotFound(PageId),

    #[error("Block not found: {0}")]
    BlockNotFound(BlockId),
}

/// Failures surfaced by the mutation gateway.
///
/// By the time a caller sees one of these it has already been logged,
/// recorded in the activity log and posted as a notification.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    #[error("Save the page before adding blocks")]
    PageNotSaved,

    #[error("Parent block not found: {0}")]
    ParentNotFound(BlockId),

    #[error("Block not found: {0}")]
    BlockNotFound(BlockId),

    #[error("{0} blocks cannot contain other blocks")]
    NotAContainer(String),

    #[error("Cannot move {0} into its own subtree")]
    WouldCreateCycle(BlockId),

    #[error("Content of type {content} does not match block type {kind}")]
    ContentMismatch { kind: String, content: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl GatewayError {
    /// Text shown to the user in a notification
    pub fn user_message(&self) -> String {
        match self {
            GatewayError::PageNotSaved => "Please save the page first".to_string(),
            GatewayError::Api(ApiError::Network(_)) => {
                "Could not reach the server. Please try again.".to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Why a drop could not be turned into a mutation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DropError {
    #[error("Dragged block no longer exists: {0}")]
    SourceNotFound(BlockId),

    #[error("Drop target no longer exists: {0}")]
    TargetNotFound(BlockId),

    #[error("{0} is not a container")]
    NotAContainer(BlockId),

    #[error("Cannot drop {0} inside itself")]
    IntoOwnSubtree(BlockId),
}

impl DropError {
    pub fn block_id(&self) -> &BlockId {
        match self {
            DropError::SourceNotFound(id)
            | DropError::TargetNotFound(id)
            | DropError::NotAContainer(id)
            | DropError::IntoOwnSubtree(id) => id,
        }
    }
}

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Built-in templates cannot be modified: {0}")]
    BuiltIn(String),

    #[error("Invalid template block: {0}")]
    InvalidBlock(#[from] ModelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}
