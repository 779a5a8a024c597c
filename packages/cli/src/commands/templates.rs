use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use pagecraft_editor::{BuilderConfig, TemplateStore};
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum TemplatesCommand {
    /// List built-in and custom templates
    List,

    /// Write a template to a standalone JSON file
    Export {
        /// Template id
        id: String,

        /// Destination file
        file: PathBuf,
    },

    /// Add a template from a JSON file
    Import {
        /// Template file
        file: PathBuf,
    },

    /// Delete a custom template
    Remove {
        /// Template id
        id: String,
    },
}

pub fn open_store(cwd: &Path) -> Result<TemplateStore> {
    let config = BuilderConfig::load(cwd)?;
    Ok(TemplateStore::load(config.get_templates_path(cwd))?)
}

pub fn templates(command: TemplatesCommand, cwd: &Path) -> Result<()> {
    let store = open_store(cwd)?;

    match command {
        TemplatesCommand::List => {
            for template in store.list() {
                let origin = if template.built_in {
                    "built-in".dimmed()
                } else {
                    "custom".cyan()
                };
                println!(
                    "  {} {} ({} blocks, {})",
                    template.id.bold(),
                    template.name,
                    template.block_count(),
                    origin
                );
                if !template.description.is_empty() {
                    println!("      {}", template.description.dimmed());
                }
            }
            let saved = store.saved_blocks();
            if !saved.is_empty() {
                println!();
                println!("{}", "Saved blocks".bold());
                for block in saved {
                    println!("  {} {}", block.id.bold(), block.name);
                }
            }
        }
        TemplatesCommand::Export { id, file } => {
            store.export(&id, &file)?;
            println!("{} {} → {}", "✓".green(), id, file.display());
        }
        TemplatesCommand::Import { file } => {
            let template = store.import(&file)?;
            println!(
                "{} Imported {} ({} blocks)",
                "✓".green(),
                template.id.bold(),
                template.block_count()
            );
        }
        TemplatesCommand::Remove { id } => {
            let template = store.remove(&id)?;
            println!("{} Removed {}", "✓".green(), template.id);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_then_import_under_new_id() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("landing.json");

        templates(
            TemplatesCommand::Export {
                id: "landing".to_string(),
                file: file.clone(),
            },
            dir.path(),
        )
        .unwrap();

        let mut value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&file).unwrap()).unwrap();
        value["id"] = serde_json::Value::String("my-landing".to_string());
        std::fs::write(&file, value.to_string()).unwrap();

        templates(TemplatesCommand::Import { file }, dir.path()).unwrap();

        let store = open_store(dir.path()).unwrap();
        let imported = store.get("my-landing").unwrap();
        assert!(!imported.built_in);
        assert_eq!(imported.block_count(), 8);
    }

    #[test]
    fn test_built_in_templates_cannot_be_removed() {
        let dir = tempfile::tempdir().unwrap();
        let result = templates(
            TemplatesCommand::Remove {
                id: "blank".to_string(),
            },
            dir.path(),
        );
        assert!(result.is_err());
    }
}
