use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::block::{Block, BlockId};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

impl PageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SeoSettings {
    #[serde(rename = "seoTitle", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "seoDescription", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "seoKeywords", skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutSettings {
    pub show_header: bool,
    pub show_footer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_style: Option<String>,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            show_header: true,
            show_footer: true,
            header_style: None,
            footer_style: None,
        }
    }
}

/// Page metadata that can be edited without touching blocks
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDraft {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub status: PageStatus,
    #[serde(flatten)]
    pub seo: SeoSettings,
    #[serde(default)]
    pub layout_settings: LayoutSettings,
}

/// A page and its flat, backend-owned block list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: PageId,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub status: PageStatus,
    #[serde(flatten)]
    pub seo: SeoSettings,
    #[serde(default)]
    pub layout_settings: LayoutSettings,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Page {
    pub fn new(id: impl Into<String>, title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: PageId::new(id),
            title: title.into(),
            slug: slug.into(),
            status: PageStatus::Draft,
            seo: SeoSettings::default(),
            layout_settings: LayoutSettings::default(),
            blocks: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn from_draft(id: PageId, draft: PageDraft) -> Self {
        Self {
            id,
            title: draft.title,
            slug: draft.slug,
            status: draft.status,
            seo: draft.seo,
            layout_settings: draft.layout_settings,
            blocks: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn draft(&self) -> PageDraft {
        PageDraft {
            title: self.title.clone(),
            slug: self.slug.clone(),
            status: self.status,
            seo: self.seo.clone(),
            layout_settings: self.layout_settings.clone(),
        }
    }

    pub fn apply_draft(&mut self, draft: PageDraft) {
        self.title = draft.title;
        self.slug = draft.slug;
        self.status = draft.status;
        self.seo = draft.seo;
        self.layout_settings = draft.layout_settings;
    }

    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| &b.id == id)
    }

    pub fn block_mut(&mut self, id: &BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| &b.id == id)
    }

    pub fn with_blocks(mut self, blocks: Vec<Block>) -> Self {
        self.blocks = blocks;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::BlockKind;
    use serde_json::json;

    #[test]
    fn test_page_wire_format() {
        let page: Page = serde_json::from_value(json!({
            "id": "p1",
            "title": "Home",
            "slug": "home",
            "status": "published",
            "seoTitle": "Home | Shop",
            "seoKeywords": ["shop", "home"],
            "layoutSettings": { "showHeader": false },
            "blocks": [
                { "id": "b1", "type": "text", "content": { "content": "Hi" } }
            ]
        }))
        .unwrap();

        assert_eq!(page.status, PageStatus::Published);
        assert_eq!(page.seo.title.as_deref(), Some("Home | Shop"));
        assert_eq!(page.seo.keywords.len(), 2);
        assert!(!page.layout_settings.show_header);
        assert!(page.layout_settings.show_footer);
        assert_eq!(page.blocks.len(), 1);
        assert_eq!(page.blocks[0].kind(), Some(BlockKind::Text));
    }

    #[test]
    fn test_draft_round_trip() {
        let mut page = Page::new("p1", "Home", "home");
        let mut draft = page.draft();
        draft.title = "Landing".to_string();
        draft.status = PageStatus::Archived;

        page.apply_draft(draft);
        assert_eq!(page.title, "Landing");
        assert_eq!(page.status, PageStatus::Archived);
    }
}
