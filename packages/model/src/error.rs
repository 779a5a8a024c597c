//! Error types for the block model

use thiserror::Error;

use crate::block::BlockId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Unknown block type: {0}")]
    UnknownKind(String),

    #[error("Invalid content for {type_name}: {message}")]
    InvalidContent { type_name: String, message: String },
}

/// Failures while walking a materialized block tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Block not found: {0}")]
    NotFound(BlockId),

    #[error("Block {0} appears inside its own subtree")]
    CycleDetected(BlockId),

    #[error("Tree deeper than {limit} levels")]
    DepthLimitExceeded { limit: usize },
}
