use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_model::{check_page, has_errors, Severity};
use std::path::PathBuf;

use super::read_page;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Page JSON file to check
    pub page: PathBuf,
}

pub fn check(args: CheckArgs) -> Result<()> {
    let page = read_page(&args.page)?;
    println!("🔍 {} {} ({} blocks)", "Checking".green().bold(), page.slug, page.blocks.len());

    let issues = check_page(&page);
    let mut errors = 0;
    let mut warnings = 0;

    for issue in &issues {
        match issue.severity() {
            Severity::Error => {
                errors += 1;
                println!("  {} {}", "error:".red().bold(), issue);
            }
            Severity::Warning => {
                warnings += 1;
                println!("  {} {}", "warning:".yellow().bold(), issue);
            }
        }
    }

    println!();
    if issues.is_empty() {
        println!("{} No issues found", "✅".green());
    } else {
        if errors > 0 {
            println!("   {} {}", "Errors:".red(), errors);
        }
        if warnings > 0 {
            println!("   {} {}", "Warnings:".yellow(), warnings);
        }
    }

    if has_errors(&issues) {
        bail!("{} has {} structural error(s)", args.page.display(), errors);
    }
    Ok(())
}
