//! # Templates
//!
//! Reusable block arrangements. A template is a nested list of
//! [`TemplateBlock`]s; applying one expands it through the
//! [`MutationGateway`] parent-first, so every child is created under a
//! parent id the backend already knows.
//!
//! Custom templates and saved block combinations persist to a single JSON
//! file. Built-in starters are compiled in and cannot be replaced.

use chrono::{DateTime, Utc};
use pagecraft_model::{
    Block, BlockContent, BlockId, BlockKind, BlockNode, BlockStyle, ButtonContent, DividerContent,
    GridContent, HeadingContent, HeroContent, ModelError, ProductListContent, SectionContent,
    TextContent,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, instrument};

use crate::activity::Outcome;
use crate::errors::TemplateError;
use crate::gateway::MutationGateway;
use crate::mutations::MutationKind;

/// One node of a template's block tree, in wire form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateBlock {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub content: Value,
    #[serde(default, skip_serializing_if = "BlockStyle::is_empty")]
    pub style: BlockStyle,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TemplateBlock>,
}

impl TemplateBlock {
    pub fn new(content: BlockContent) -> Self {
        Self {
            type_name: content.type_name().to_string(),
            content: content.to_raw(),
            style: BlockStyle::default(),
            children: Vec::new(),
        }
    }

    pub fn with_style(mut self, style: BlockStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_children(mut self, children: Vec<TemplateBlock>) -> Self {
        self.children = children;
        self
    }

    /// Capture a live subtree
    pub fn from_node(node: &BlockNode) -> Self {
        Self {
            type_name: node.block.type_name().to_string(),
            content: node.block.content.to_raw(),
            style: node.block.style.clone(),
            children: node.children.iter().map(TemplateBlock::from_node).collect(),
        }
    }

    /// Number of blocks including this one
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TemplateBlock::count).sum::<usize>()
    }

    /// Resolve the wire form into a typed kind and payload
    pub fn resolve(&self) -> Result<(BlockKind, BlockContent), ModelError> {
        let kind: BlockKind = self.type_name.parse()?;
        let content = BlockContent::from_raw(&self.type_name, self.content.clone()).map_err(
            |err| ModelError::InvalidContent {
                type_name: self.type_name.clone(),
                message: err.to_string(),
            },
        )?;
        Ok((kind, content))
    }

    fn validate(&self) -> Result<(), ModelError> {
        self.resolve()?;
        self.children.iter().try_for_each(TemplateBlock::validate)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub blocks: Vec<TemplateBlock>,
    #[serde(skip)]
    pub built_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Template {
    pub fn new(id: impl Into<String>, name: impl Into<String>, blocks: Vec<TemplateBlock>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            blocks,
            built_in: false,
            created_at: Some(Utc::now()),
        }
    }

    pub fn block_count(&self) -> usize {
        self.blocks.iter().map(TemplateBlock::count).sum()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        self.blocks.iter().try_for_each(TemplateBlock::validate)
    }
}

/// A block and its subtree kept for reuse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedBlock {
    pub id: String,
    pub name: String,
    pub block: TemplateBlock,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl SavedBlock {
    pub fn as_template(&self) -> Template {
        Template {
            id: self.id.clone(),
            name: self.name.clone(),
            description: String::new(),
            blocks: vec![self.block.clone()],
            built_in: false,
            created_at: self.created_at,
        }
    }
}

/// On-disk layout of the templates file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateLibrary {
    #[serde(default)]
    pub templates: Vec<Template>,
    #[serde(default)]
    pub saved_blocks: Vec<SavedBlock>,
}

pub struct TemplateStore {
    path: Option<PathBuf>,
    library: RwLock<TemplateLibrary>,
}

impl TemplateStore {
    /// Not backed by a file; nothing is persisted
    pub fn in_memory() -> Self {
        Self {
            path: None,
            library: RwLock::new(TemplateLibrary::default()),
        }
    }

    /// Load from `path`. A missing file is an empty library.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, TemplateError> {
        let path = path.into();
        let library = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let library: TemplateLibrary = serde_json::from_str(&raw)?;
            debug!(
                path = %path.display(),
                templates = library.templates.len(),
                saved = library.saved_blocks.len(),
                "Loaded template library"
            );
            library
        } else {
            TemplateLibrary::default()
        };

        Ok(Self {
            path: Some(path),
            library: RwLock::new(library),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn read(&self) -> RwLockReadGuard<'_, TemplateLibrary> {
        self.library.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TemplateLibrary> {
        self.library.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self) -> Result<(), TemplateError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(&*self.read())?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Built-ins first, then custom templates in insertion order
    pub fn list(&self) -> Vec<Template> {
        let mut all = built_in_templates();
        all.extend(self.read().templates.iter().cloned());
        all
    }

    pub fn custom(&self) -> Vec<Template> {
        self.read().templates.clone()
    }

    pub fn get(&self, id: &str) -> Option<Template> {
        self.list().into_iter().find(|t| t.id == id)
    }

    /// Add or replace a custom template
    pub fn add(&self, mut template: Template) -> Result<(), TemplateError> {
        if is_built_in(&template.id) {
            return Err(TemplateError::BuiltIn(template.id));
        }
        template.validate()?;
        template.built_in = false;

        {
            let mut library = self.write();
            library.templates.retain(|t| t.id != template.id);
            library.templates.push(template);
        }
        self.persist()
    }

    pub fn remove(&self, id: &str) -> Result<Template, TemplateError> {
        if is_built_in(id) {
            return Err(TemplateError::BuiltIn(id.to_string()));
        }
        let removed = {
            let mut library = self.write();
            let index = library
                .templates
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| TemplateError::NotFound(id.to_string()))?;
            library.templates.remove(index)
        };
        self.persist()?;
        Ok(removed)
    }

    /// Write one template to a standalone `.json` file
    pub fn export(&self, id: &str, path: &Path) -> Result<(), TemplateError> {
        let template = self
            .get(id)
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))?;
        fs::write(path, serde_json::to_string_pretty(&template)?)?;
        info!(id, path = %path.display(), "Exported template");
        Ok(())
    }

    /// Read a template file and add it. An empty id gets a fresh one.
    pub fn import(&self, path: &Path) -> Result<Template, TemplateError> {
        let raw = fs::read_to_string(path)?;
        let mut template: Template = serde_json::from_str(&raw)?;
        if template.id.trim().is_empty() {
            template.id = format!("custom-{}", uuid::Uuid::new_v4());
        }
        if template.created_at.is_none() {
            template.created_at = Some(Utc::now());
        }
        self.add(template.clone())?;
        info!(id = %template.id, blocks = template.block_count(), "Imported template");
        Ok(template)
    }

    /// Keep a live subtree as a saved block combination
    pub fn save_block(&self, name: impl Into<String>, node: &BlockNode) -> Result<SavedBlock, TemplateError> {
        let saved = SavedBlock {
            id: format!("saved-{}", uuid::Uuid::new_v4()),
            name: name.into(),
            block: TemplateBlock::from_node(node),
            created_at: Some(Utc::now()),
        };
        self.write().saved_blocks.push(saved.clone());
        self.persist()?;
        Ok(saved)
    }

    pub fn saved_blocks(&self) -> Vec<SavedBlock> {
        self.read().saved_blocks.clone()
    }

    pub fn remove_saved(&self, id: &str) -> Result<SavedBlock, TemplateError> {
        let removed = {
            let mut library = self.write();
            let index = library
                .saved_blocks
                .iter()
                .position(|s| s.id == id)
                .ok_or_else(|| TemplateError::NotFound(id.to_string()))?;
            library.saved_blocks.remove(index)
        };
        self.persist()?;
        Ok(removed)
    }
}

struct Pending<'a> {
    node: &'a TemplateBlock,
    kind: BlockKind,
    content: BlockContent,
    parent: Option<BlockId>,
}

/// Expand `template` onto the current page, appending its roots.
///
/// The whole template is validated before the first call. A gateway
/// failure stops the expansion; blocks created so far stay.
#[instrument(skip(gateway, template), fields(template = %template.id))]
pub async fn apply_template(
    gateway: &MutationGateway,
    template: &Template,
) -> Result<Vec<Block>, TemplateError> {
    template.validate()?;

    let mut created = Vec::with_capacity(template.block_count());
    let mut stack: Vec<Pending<'_>> = Vec::new();
    for node in template.blocks.iter().rev() {
        let (kind, content) = node.resolve()?;
        stack.push(Pending {
            node,
            kind,
            content,
            parent: None,
        });
    }

    while let Some(pending) = stack.pop() {
        let block = gateway
            .add_block_with_style(
                pending.kind,
                Some(pending.content),
                pending.node.style.clone(),
                pending.parent.as_ref(),
                None,
            )
            .await?;

        for child in pending.node.children.iter().rev() {
            let (kind, content) = child.resolve()?;
            stack.push(Pending {
                node: child,
                kind,
                content,
                parent: Some(block.id.clone()),
            });
        }
        created.push(block);
    }

    gateway.activity().record(
        MutationKind::ApplyTemplate,
        Outcome::Succeeded,
        None,
        format!("Applied template '{}' ({} blocks)", template.name, created.len()),
    );
    gateway
        .notifications()
        .success(format!("Template '{}' applied", template.name));
    Ok(created)
}

const BUILT_IN_IDS: [&str; 3] = ["blank", "landing", "storefront"];

fn is_built_in(id: &str) -> bool {
    BUILT_IN_IDS.contains(&id)
}

fn text(content: &str) -> TemplateBlock {
    TemplateBlock::new(BlockContent::Text(TextContent {
        content: content.to_string(),
    }))
}

fn heading(text: &str, level: u8) -> TemplateBlock {
    TemplateBlock::new(BlockContent::Heading(HeadingContent {
        text: text.to_string(),
        level,
    }))
}

fn built_in(id: &str, name: &str, description: &str, blocks: Vec<TemplateBlock>) -> Template {
    Template {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        blocks,
        built_in: true,
        created_at: None,
    }
}

/// Starter templates shipped with the editor
pub fn built_in_templates() -> Vec<Template> {
    let landing = vec![
        TemplateBlock::new(BlockContent::Hero(HeroContent {
            title: "Welcome".to_string(),
            subtitle: "Tell visitors what you do".to_string(),
            cta_text: Some("Get started".to_string()),
            cta_link: Some("#features".to_string()),
            ..Default::default()
        })),
        TemplateBlock::new(BlockContent::Section(SectionContent {
            title: Some("Features".to_string()),
            ..Default::default()
        }))
        .with_children(vec![TemplateBlock::new(BlockContent::Grid(GridContent {
            columns: 3,
            ..Default::default()
        }))
        .with_children(vec![
            text("Fast to set up"),
            text("Easy to edit"),
            text("Ready to publish"),
        ])]),
        TemplateBlock::new(BlockContent::Divider(DividerContent::default())),
        TemplateBlock::new(BlockContent::Button(ButtonContent {
            text: "Contact us".to_string(),
            link: "/contact".to_string(),
            ..Default::default()
        })),
    ];

    let storefront = vec![
        heading("Shop", 1),
        TemplateBlock::new(BlockContent::ProductList(ProductListContent {
            title: "Featured products".to_string(),
            ..Default::default()
        })),
    ];

    vec![
        built_in("blank", "Blank", "An empty page", Vec::new()),
        built_in(
            "landing",
            "Landing page",
            "Hero, feature grid and a call to action",
            landing,
        ),
        built_in("storefront", "Storefront", "Product listing page", storefront),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagecraft_model::materialize;

    #[test]
    fn test_built_ins_are_valid() {
        for template in built_in_templates() {
            assert!(template.built_in);
            template.validate().unwrap();
        }
        assert_eq!(built_in_templates()[1].block_count(), 8);
    }

    #[test]
    fn test_built_ins_cannot_be_replaced() {
        let store = TemplateStore::in_memory();
        let result = store.add(Template::new("landing", "Mine", Vec::new()));
        assert!(matches!(result, Err(TemplateError::BuiltIn(_))));
        assert!(matches!(store.remove("blank"), Err(TemplateError::BuiltIn(_))));
    }

    #[test]
    fn test_unknown_type_is_invalid() {
        let template = Template::new(
            "odd",
            "Odd",
            vec![TemplateBlock {
                type_name: "marquee".to_string(),
                content: Value::Null,
                style: BlockStyle::default(),
                children: Vec::new(),
            }],
        );
        let store = TemplateStore::in_memory();
        assert!(matches!(
            store.add(template),
            Err(TemplateError::InvalidBlock(ModelError::UnknownKind(_)))
        ));
    }

    #[test]
    fn test_persists_across_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("templates.json");

        let store = TemplateStore::load(&path).unwrap();
        store
            .add(Template::new("hello", "Hello", vec![heading("Hi", 2)]))
            .unwrap();

        let reloaded = TemplateStore::load(&path).unwrap();
        assert_eq!(reloaded.custom().len(), 1);
        assert_eq!(reloaded.get("hello").unwrap().blocks[0].type_name, "heading");
        assert_eq!(reloaded.list().len(), BUILT_IN_IDS.len() + 1);
    }

    #[test]
    fn test_export_then_import_assigns_missing_id() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("landing.json");
        let store = TemplateStore::in_memory();
        store.export("landing", &file).unwrap();

        let mut exported: Value = serde_json::from_str(&fs::read_to_string(&file).unwrap()).unwrap();
        exported["id"] = Value::String(String::new());
        fs::write(&file, exported.to_string()).unwrap();

        let imported = store.import(&file).unwrap();
        assert!(imported.id.starts_with("custom-"));
        assert_eq!(imported.block_count(), 8);
        assert!(!imported.built_in);
    }

    #[test]
    fn test_save_block_captures_subtree() {
        let blocks = vec![
            Block::new("s", BlockKind::Section),
            Block::new("t", BlockKind::Text).with_parent("s", 1),
        ];
        let forest = materialize(&blocks);
        let store = TemplateStore::in_memory();

        let saved = store.save_block("Section with text", &forest.roots[0]).unwrap();

        assert_eq!(saved.block.count(), 2);
        assert_eq!(store.saved_blocks().len(), 1);
        assert_eq!(saved.as_template().block_count(), 2);
        store.remove_saved(&saved.id).unwrap();
        assert!(store.saved_blocks().is_empty());
    }
}
