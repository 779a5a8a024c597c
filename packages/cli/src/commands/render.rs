use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_editor::BuilderConfig;
use pagecraft_model::BlockId;
use pagecraft_renderer::{render_page, ComponentRegistry, ErrorBoundaries, RenderOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use super::read_page;

#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Page JSON file
    pub page: PathBuf,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Render the builder canvas instead of the published page
    #[arg(long)]
    pub edit: bool,

    /// Block to mark as selected (implies --edit)
    #[arg(long)]
    pub selected: Option<String>,

    /// Block markup only, without the document shell
    #[arg(long)]
    pub fragment: bool,

    /// Skip pretty printing
    #[arg(long)]
    pub compact: bool,
}

pub fn render_options(args: &RenderArgs, config: &BuilderConfig) -> RenderOptions {
    let mut options = if args.edit || args.selected.is_some() {
        RenderOptions::edit(args.selected.as_deref().map(BlockId::from))
    } else {
        RenderOptions::default()
    };
    options.pretty = config.render.pretty && !args.compact;
    options.indent = config.render.indent.clone();
    options.full_document = !args.fragment;
    options.with_max_depth(config.max_tree_depth)
}

pub fn render(args: RenderArgs, cwd: &Path) -> Result<()> {
    let config = BuilderConfig::load(cwd)?;
    let page = read_page(&args.page)?;

    if let Some(selected) = &args.selected {
        if page.block(&BlockId::from(selected.as_str())).is_none() {
            bail!("Block {} is not on page {}", selected, page.id);
        }
    }

    let options = render_options(&args, &config);
    let registry = ComponentRegistry::with_defaults();
    let mut boundaries = ErrorBoundaries::new();
    let rendered = render_page(&page, &options, &registry, &mut boundaries);
    info!(
        page_id = %page.id,
        components = registry.loaded_count(),
        failures = rendered.failures.len(),
        "Rendered page"
    );

    for failure in &rendered.failures {
        eprintln!(
            "  {} block {} - {}",
            "✗".red(),
            failure.block_id,
            failure.message.red()
        );
    }

    match &args.output {
        Some(output) => {
            if let Some(parent) = output.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(output, &rendered.html)?;
            println!(
                "{} {} → {}",
                "✓".green(),
                args.page.display(),
                output.display()
            );
        }
        None => print!("{}", rendered.html),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(page: PathBuf) -> RenderArgs {
        RenderArgs {
            page,
            output: None,
            edit: false,
            selected: None,
            fragment: false,
            compact: false,
        }
    }

    #[test]
    fn test_selected_implies_edit() {
        let mut args = args(PathBuf::from("page.json"));
        args.selected = Some("b1".to_string());

        let options = render_options(&args, &BuilderConfig::default());
        assert!(options.mode.is_selected(&BlockId::from("b1")));
        assert!(options.full_document);
    }

    #[test]
    fn test_config_controls_pretty_printing() {
        let mut config = BuilderConfig::default();
        config.render.indent = "\t".to_string();
        let mut args = args(PathBuf::from("page.json"));

        let options = render_options(&args, &config);
        assert!(options.pretty);
        assert_eq!(options.indent, "\t");

        args.compact = true;
        args.fragment = true;
        let options = render_options(&args, &config);
        assert!(!options.pretty);
        assert!(!options.full_document);
    }

    #[test]
    fn test_config_depth_limit_reaches_renderer() {
        let mut config = BuilderConfig::default();
        config.max_tree_depth = 1;

        let options = render_options(&args(PathBuf::from("page.json")), &config);
        assert_eq!(options.max_depth, 1);
    }

    #[test]
    fn test_render_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let page_path = dir.path().join("page.json");
        fs::write(
            &page_path,
            r#"{
                "id": "p1",
                "title": "Home",
                "slug": "home",
                "blocks": [
                    { "id": "b1", "type": "text", "content": { "content": "Hello" }, "order": 0 }
                ]
            }"#,
        )
        .unwrap();

        let mut args = args(page_path);
        let output = dir.path().join("out/home.html");
        args.output = Some(output.clone());
        render(args, dir.path()).unwrap();

        let html = fs::read_to_string(output).unwrap();
        assert!(html.contains("<title>Home</title>"));
        assert!(html.contains("Hello"));
    }

    #[test]
    fn test_unknown_selection_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let page_path = dir.path().join("page.json");
        fs::write(&page_path, r#"{ "id": "p1", "title": "Home", "slug": "home" }"#).unwrap();

        let mut args = args(page_path);
        args.selected = Some("missing".to_string());
        assert!(render(args, dir.path()).is_err());
    }
}
