//! # Pagecraft Renderer
//!
//! Turns a page's flat block list into HTML, for the live site (preview)
//! or for the builder canvas (edit).
//!
//! ```rust,ignore
//! let registry = ComponentRegistry::with_defaults();
//! let mut boundaries = ErrorBoundaries::new();
//! let rendered = render_page(&page, &RenderOptions::default(), &registry, &mut boundaries);
//! ```

mod boundary;
pub mod components;
mod context;
mod error;
mod registry;
mod render;

pub use boundary::ErrorBoundaries;
pub use components::{Children, Component};
pub use context::{block_attrs, styled_block_attrs, Attrs, Context, RenderMode, RenderOptions};
pub use error::RenderError;
pub use registry::{ComponentFactory, ComponentRegistry};
pub use render::{render_blocks, render_page, RenderFailure, RenderedPage};
