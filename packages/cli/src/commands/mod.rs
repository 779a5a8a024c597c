pub mod check;
pub mod init;
pub mod new;
pub mod render;
pub mod templates;
pub mod tree;

pub use check::{check, CheckArgs};
pub use init::{init, InitArgs};
pub use new::{new_page, NewArgs};
pub use render::{render, RenderArgs};
pub use templates::{templates, TemplatesCommand};
pub use tree::{tree, TreeArgs};

use anyhow::{Context, Result};
use pagecraft_model::Page;
use std::fs;
use std::path::Path;

/// Read a page as the backend returns it
pub fn read_page(path: &Path) -> Result<Page> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("Invalid page JSON in {}", path.display()))
}
