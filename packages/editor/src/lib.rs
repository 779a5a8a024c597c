//! # Pagecraft Editor
//!
//! Editing core for the page builder.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ PageBuilder: session coordinator            │
//! │  - PageStore / UiState / TemplateStore      │
//! │  - DragController (gesture → plan)          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ MutationGateway                             │
//! │  - validate, call PageApi, refetch          │
//! │  - activity log + notifications             │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ PageApi (remote backend / InMemoryPageApi)  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Server authority**: local state is replaced by a refetch after
//!    every mutation, never patched from a response
//! 2. **Optimistic reorder only**: drag reorders update the store first
//! 3. **Failures are reported, not thrown**: the gateway logs, records and
//!    notifies before handing back an `Err`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pagecraft_editor::{InMemoryPageApi, PageBuilder};
//! use pagecraft_model::{BlockKind, PageId};
//!
//! let builder = PageBuilder::with_api(Arc::new(InMemoryPageApi::new()));
//! builder.open(&PageId::from("home")).await?;
//! builder.gateway().add_block(BlockKind::Hero, None, None, None).await?;
//! ```

pub mod activity;
pub mod api;
pub mod config;
pub mod drag;
pub mod errors;
pub mod gateway;
pub mod memory;
pub mod mutations;
pub mod notify;
pub mod session;
pub mod store;
pub mod templates;

pub use activity::{ActivityEntry, ActivityLog, Outcome};
pub use api::PageApi;
pub use config::{BuilderConfig, RenderSettings, DEFAULT_CONFIG_NAME};
pub use drag::{plan_drop, DragController, DragSource, DragState, DropPlan, DropTarget, IgnoreReason};
pub use errors::{ApiError, ConfigError, DropError, GatewayError, TemplateError};
pub use gateway::{GatewayResult, MutationGateway};
pub use memory::{ApiCall, ApiOp, InMemoryPageApi};
pub use mutations::{BlockOrderUpdate, CreateBlockInput, MutationKind, UpdateBlockInput};
pub use notify::{Notification, NotificationLevel, Notifications};
pub use session::PageBuilder;
pub use store::{PageStore, UiState};
pub use templates::{
    apply_template, built_in_templates, SavedBlock, Template, TemplateBlock, TemplateLibrary,
    TemplateStore,
};
