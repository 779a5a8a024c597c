use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_editor::BuilderConfig;
use pagecraft_model::{materialize_with_limit, outline};
use std::path::{Path, PathBuf};

use super::read_page;

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Page JSON file
    pub page: PathBuf,
}

pub fn tree(args: TreeArgs, cwd: &Path) -> Result<()> {
    let config = BuilderConfig::load(cwd)?;
    let page = read_page(&args.page)?;
    let forest = materialize_with_limit(&page.blocks, config.max_tree_depth);

    println!("{} ({})", page.title.bold(), page.slug);
    print!("{}", outline(&forest));

    if !forest.detached.is_empty() {
        println!();
        println!(
            "{} {} block(s) not reachable from a root:",
            "⚠️".yellow(),
            forest.detached.len()
        );
        for id in &forest.detached {
            println!("  - {}", id);
        }
    }

    Ok(())
}
