use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{BuilderConfig, DEFAULT_CONFIG_NAME};
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Pagecraft project...".bright_blue().bold());

    let config = BuilderConfig::default();
    config.write(cwd)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);

    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Run: pagecraft new \"Home\" --template landing -o home.json");
    println!("  2. Run: pagecraft render home.json -o home.html");
    println!("  3. Custom templates are kept in {}", config.templates_path);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_default_config() {
        let dir = tempfile::tempdir().unwrap();
        init(InitArgs { force: false }, dir.path()).unwrap();

        let config = BuilderConfig::load(dir.path()).unwrap();
        assert_eq!(config, BuilderConfig::default());
    }

    #[test]
    fn test_init_keeps_existing_config_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_NAME);
        std::fs::write(&path, r#"{ "activityLogCapacity": 5 }"#).unwrap();

        init(InitArgs { force: false }, dir.path()).unwrap();
        assert_eq!(BuilderConfig::load(dir.path()).unwrap().activity_log_capacity, 5);

        init(InitArgs { force: true }, dir.path()).unwrap();
        assert_eq!(BuilderConfig::load(dir.path()).unwrap().activity_log_capacity, 100);
    }
}
