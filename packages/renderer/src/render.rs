//! # Page Rendering
//!
//! Walks the materialized block tree and writes HTML.
//!
//! ## Isolation
//!
//! Every block renders into its own buffer. If its component returns an
//! error or panics, that buffer is thrown away and replaced with an error
//! affordance carrying a retry action; the block's boundary stays tripped
//! until [`ErrorBoundaries::retry`]. Siblings and ancestors are unaffected.
//!
//! ## Edit mode
//!
//! Each block is wrapped in a selectable `div` carrying `data-block-id`
//! and `data-action="select"`. Grid items are the exception: they get the
//! same attributes on their own root element, so the grid's direct
//! children stay the items themselves.

use pagecraft_model::{materialize_with_limit, Block, BlockId, BlockKind, BlockNode, Page};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, instrument, warn};

use crate::boundary::ErrorBoundaries;
use crate::components::Children;
use crate::context::{Attrs, Context, RenderOptions};
use crate::error::RenderError;
use crate::registry::ComponentRegistry;

/// A block whose subtree was replaced by an error affordance
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFailure {
    pub block_id: BlockId,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    pub html: String,
    /// Ids carrying a select action, in document order. Empty in preview.
    pub selectable: Vec<BlockId>,
    pub failures: Vec<RenderFailure>,
}

const EDIT_STYLES: [&str; 4] = [
    ".pb-block { position: relative; cursor: pointer; }",
    ".pb-selected, [data-selected] { outline: 2px solid #3b82f6; outline-offset: 2px; }",
    ".pb-hidden, [data-hidden] { opacity: 0.4; }",
    ".pb-render-error { border: 1px dashed #dc2626; padding: 1rem; color: #991b1b; }",
];

struct Renderer<'r> {
    registry: &'r ComponentRegistry,
    boundaries: &'r mut ErrorBoundaries,
    selectable: Vec<BlockId>,
    failures: Vec<RenderFailure>,
}

struct NodeChildren<'a, 'r> {
    renderer: &'a mut Renderer<'r>,
    nodes: &'a [BlockNode],
    grid: bool,
}

impl Children for NodeChildren<'_, '_> {
    fn render_into(&mut self, ctx: &mut Context<'_>) {
        for node in self.nodes {
            self.renderer.render_node(node, ctx, self.grid);
        }
    }

    fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Wrapper around a selectable block in edit mode
fn selection_wrapper(block: &Block, selected: bool) -> Attrs {
    let mut class = String::from("pb-block");
    if selected {
        class.push_str(" pb-selected");
    }
    if !block.is_visible {
        class.push_str(" pb-hidden");
    }
    Attrs::new()
        .with("class", class)
        .with("data-block-id", block.id.to_string())
        .with("data-block-type", block.type_name().to_string())
        .with("data-action", "select")
}

/// Selection attributes merged into a grid item's own root element
fn grid_item_attrs(block: &Block, selected: bool) -> Attrs {
    Attrs::new()
        .with("data-block-id", block.id.to_string())
        .with("data-action", "select")
        .flag("data-selected", selected)
        .flag("data-hidden", !block.is_visible)
}

fn error_affordance(ctx: &mut Context<'_>, block: &Block, message: &str) {
    ctx.open(
        "div",
        &Attrs::new()
            .with("class", "pb-render-error")
            .with("role", "alert")
            .with("data-error-for", block.id.to_string()),
    );
    ctx.element(
        "p",
        &Attrs::new(),
        &format!("This {} block could not be displayed: {}", block.type_name(), message),
    );
    ctx.element(
        "button",
        &Attrs::new()
            .with("type", "button")
            .with("data-action", "retry")
            .with("data-block-id", block.id.to_string()),
        "Retry",
    );
    ctx.close("div");
}

impl<'r> Renderer<'r> {
    fn new(registry: &'r ComponentRegistry, boundaries: &'r mut ErrorBoundaries) -> Self {
        Self {
            registry,
            boundaries,
            selectable: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn render_nodes(&mut self, nodes: &[BlockNode], ctx: &mut Context<'_>) {
        for node in nodes {
            self.render_node(node, ctx, false);
        }
    }

    fn render_node(&mut self, node: &BlockNode, ctx: &mut Context<'_>, grid_item: bool) {
        let block = &node.block;
        let edit = ctx.options().mode.is_edit();
        let selected = ctx.options().mode.is_selected(&block.id);

        if !block.is_visible && !edit {
            debug!(block_id = %block.id, "Skipping hidden block");
            return;
        }

        let wrapped = edit && !grid_item;
        let inner_depth = ctx.depth() + usize::from(wrapped);
        let selectable_mark = self.selectable.len();
        let failures_mark = self.failures.len();
        if edit {
            self.selectable.push(block.id.clone());
        }

        let mut inner = ctx.fork(inner_depth);
        if edit && grid_item {
            inner.set_root_attrs(grid_item_attrs(block, selected));
        }

        let outcome = match self.boundaries.error(&block.id) {
            Some(message) => Err(message.to_string()),
            None => {
                let registry = self.registry;
                let component = registry.get(block.type_name());
                let mut children = NodeChildren {
                    renderer: self,
                    nodes: &node.children,
                    grid: block.kind() == Some(BlockKind::Grid),
                };
                let result = catch_unwind(AssertUnwindSafe(|| {
                    component.render(block, &mut inner, &mut children)
                }));
                match result {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(error)) => Err(error.to_string()),
                    Err(payload) => {
                        Err(RenderError::Panicked(panic_message(payload.as_ref())).to_string())
                    }
                }
            }
        };

        if let Err(message) = outcome {
            if !self.boundaries.is_tripped(&block.id) {
                warn!(
                    block_id = %block.id,
                    block_type = block.type_name(),
                    error = %message,
                    "Block failed to render"
                );
                self.boundaries.trip(&block.id, message.clone());
            }

            self.selectable.truncate(selectable_mark);
            self.failures.truncate(failures_mark);
            if edit {
                self.selectable.push(block.id.clone());
            }
            self.failures.push(RenderFailure {
                block_id: block.id.clone(),
                message: message.clone(),
            });

            inner = ctx.fork(inner_depth);
            if edit && grid_item {
                inner.set_root_attrs(grid_item_attrs(block, selected));
            }
            error_affordance(&mut inner, block, &message);
        }

        if wrapped {
            ctx.open("div", &selection_wrapper(block, selected));
            ctx.append(inner);
            ctx.close("div");
        } else {
            ctx.append(inner);
        }
    }

    fn finish(self, html: String) -> RenderedPage {
        RenderedPage {
            html,
            selectable: self.selectable,
            failures: self.failures,
        }
    }
}

fn render_head(page: &Page, ctx: &mut Context<'_>) {
    ctx.open("head", &Attrs::new());
    ctx.add_line("<meta charset=\"UTF-8\">");
    ctx.add_line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">");

    let title = page.seo.title.as_deref().unwrap_or(&page.title);
    ctx.element("title", &Attrs::new(), title);

    if let Some(description) = &page.seo.description {
        let attrs = Attrs::new()
            .with("name", "description")
            .with("content", description.clone());
        ctx.add_line(&format!("<meta{}>", attrs.render()));
    }
    if !page.seo.keywords.is_empty() {
        let attrs = Attrs::new()
            .with("name", "keywords")
            .with("content", page.seo.keywords.join(", "));
        ctx.add_line(&format!("<meta{}>", attrs.render()));
    }

    if ctx.options().mode.is_edit() {
        ctx.open("style", &Attrs::new());
        for rule in EDIT_STYLES {
            ctx.add_line(rule);
        }
        ctx.close("style");
    }
    ctx.close("head");
}

/// Render a page as a full document or, with `full_document` off, as
/// the block markup alone.
#[instrument(skip_all, fields(page_id = %page.id, blocks = page.blocks.len()))]
pub fn render_page(
    page: &Page,
    options: &RenderOptions,
    registry: &ComponentRegistry,
    boundaries: &mut ErrorBoundaries,
) -> RenderedPage {
    let forest = materialize_with_limit(&page.blocks, options.max_depth);
    if !forest.detached.is_empty() {
        warn!(
            detached = forest.detached.len(),
            "Skipping blocks that are not reachable from a root"
        );
    }

    let mut ctx = Context::new(options);
    let mut renderer = Renderer::new(registry, boundaries);

    if !options.full_document {
        renderer.render_nodes(&forest.roots, &mut ctx);
        return renderer.finish(ctx.get_output());
    }

    ctx.add_line("<!DOCTYPE html>");
    ctx.open("html", &Attrs::new().with("lang", "en"));
    render_head(page, &mut ctx);
    ctx.open("body", &Attrs::new());

    let layout = &page.layout_settings;
    if layout.show_header {
        let attrs = Attrs::new()
            .with("class", "pb-page-header")
            .with_opt("style", layout.header_style.as_ref());
        ctx.open("header", &attrs);
        ctx.element("a", &Attrs::new().with("href", "/").with("class", "pb-site-title"), &page.title);
        ctx.close("header");
    }

    ctx.open(
        "main",
        &Attrs::new()
            .with("class", "pb-page")
            .with("data-page-id", page.id.to_string())
            .with("data-slug", page.slug.clone()),
    );
    renderer.render_nodes(&forest.roots, &mut ctx);
    ctx.close("main");

    if layout.show_footer {
        let attrs = Attrs::new()
            .with("class", "pb-page-footer")
            .with_opt("style", layout.footer_style.as_ref());
        ctx.element("footer", &attrs, &page.title);
    }

    ctx.close("body");
    ctx.close("html");

    renderer.finish(ctx.get_output())
}

/// Render a list of blocks without any page chrome
pub fn render_blocks(
    blocks: &[Block],
    options: &RenderOptions,
    registry: &ComponentRegistry,
    boundaries: &mut ErrorBoundaries,
) -> RenderedPage {
    let forest = materialize_with_limit(blocks, options.max_depth);
    let mut ctx = Context::new(options);
    let mut renderer = Renderer::new(registry, boundaries);
    renderer.render_nodes(&forest.roots, &mut ctx);
    renderer.finish(ctx.get_output())
}
