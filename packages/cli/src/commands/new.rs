use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{BuilderConfig, InMemoryPageApi, PageBuilder};
use pagecraft_model::{Page, PageDraft};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::templates::open_store;

#[derive(Args, Debug)]
pub struct NewArgs {
    /// Page title
    pub title: String,

    /// URL slug (derived from the title when omitted)
    #[arg(short, long)]
    pub slug: Option<String>,

    /// Template to start from
    #[arg(short, long, default_value = "blank")]
    pub template: String,

    /// Output file (defaults to <slug>.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn slugify(title: &str) -> String {
    let mut slug = String::new();
    for c in title.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("page");
    }
    slug
}

/// Save a page and expand a template into it, entirely in memory
pub async fn build_page(builder: &PageBuilder, draft: PageDraft, template: &str) -> Result<Page> {
    builder.save(draft).await?;
    builder.apply_template(template).await?;
    builder
        .page()
        .ok_or_else(|| anyhow!("Page was not loaded after saving"))
}

pub fn new_page(args: NewArgs, cwd: &Path) -> Result<()> {
    let config = BuilderConfig::load(cwd)?;
    let store = open_store(cwd)?;
    if store.get(&args.template).is_none() {
        return Err(anyhow!("Unknown template: {}", args.template));
    }

    let slug = args.slug.clone().unwrap_or_else(|| slugify(&args.title));
    let draft = PageDraft {
        title: args.title.clone(),
        slug: slug.clone(),
        ..Default::default()
    };

    let builder = PageBuilder::new(Arc::new(InMemoryPageApi::new()), store, &config);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let page = runtime.block_on(build_page(&builder, draft, &args.template))?;

    let output = args
        .output
        .unwrap_or_else(|| cwd.join(format!("{}.json", slug)));
    fs::write(&output, serde_json::to_string_pretty(&page)?)?;

    println!(
        "{} Created {} from {} ({} blocks) → {}",
        "✓".green(),
        page.title.bold(),
        args.template,
        page.blocks.len(),
        output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_model::check_page;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Summer Sale 2024!"), "summer-sale-2024");
        assert_eq!(slugify("  --  "), "page");
        assert_eq!(slugify("Über uns"), "ber-uns");
    }

    #[tokio::test]
    async fn test_build_page_from_landing() {
        let builder = PageBuilder::with_api(Arc::new(InMemoryPageApi::new()));
        let draft = PageDraft {
            title: "Home".to_string(),
            slug: "home".to_string(),
            ..Default::default()
        };

        let page = build_page(&builder, draft, "landing").await.unwrap();

        assert_eq!(page.blocks.len(), 8);
        assert!(check_page(&page).is_empty());
    }

    #[test]
    fn test_new_writes_page_file() {
        let dir = tempfile::tempdir().unwrap();
        new_page(
            NewArgs {
                title: "Shop Front".to_string(),
                slug: None,
                template: "storefront".to_string(),
                output: None,
            },
            dir.path(),
        )
        .unwrap();

        let raw = fs::read_to_string(dir.path().join("shop-front.json")).unwrap();
        let page: Page = serde_json::from_str(&raw).unwrap();
        assert_eq!(page.slug, "shop-front");
        assert!(!page.blocks.is_empty());
    }

    #[test]
    fn test_unknown_template_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let result = new_page(
            NewArgs {
                title: "Home".to_string(),
                slug: None,
                template: "nope".to_string(),
                output: None,
            },
            dir.path(),
        );
        assert!(result.is_err());
    }
}
