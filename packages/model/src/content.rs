//! # Block Content
//!
//! Per-kind payloads. Each kind has its own schema; the wire format
//! keeps the payload next to a `type` string, and [`BlockContent`]
//! pairs the two back up into one tagged value.
//!
//! Types the model does not know are kept as [`BlockContent::Unknown`]
//! so a newer backend never makes a page unloadable.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::kind::BlockKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextContent {
    pub content: String,
}

impl Default for TextContent {
    fn default() -> Self {
        Self {
            content: "Enter your text here".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeadingContent {
    pub text: String,
    /// 1..=6
    pub level: u8,
}

impl Default for HeadingContent {
    fn default() -> Self {
        Self {
            text: "Heading".to_string(),
            level: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageContent {
    pub src: String,
    pub alt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeroContent {
    pub title: String,
    pub subtitle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta_link: Option<String>,
}

impl Default for HeroContent {
    fn default() -> Self {
        Self {
            title: "Welcome".to_string(),
            subtitle: "Tell visitors what this page is about".to_string(),
            background_image: None,
            cta_text: Some("Get started".to_string()),
            cta_link: Some("#".to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    #[default]
    Primary,
    Secondary,
    Outline,
    Link,
}

impl ButtonVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            ButtonVariant::Primary => "primary",
            ButtonVariant::Secondary => "secondary",
            ButtonVariant::Outline => "outline",
            ButtonVariant::Link => "link",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ButtonContent {
    pub text: String,
    pub link: String,
    pub variant: ButtonVariant,
    pub open_in_new_tab: bool,
}

impl Default for ButtonContent {
    fn default() -> Self {
        Self {
            text: "Click me".to_string(),
            link: "#".to_string(),
            variant: ButtonVariant::Primary,
            open_in_new_tab: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarouselSlide {
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarouselContent {
    pub slides: Vec<CarouselSlide>,
    pub autoplay: bool,
    pub interval_ms: u32,
    pub show_indicators: bool,
}

impl Default for CarouselContent {
    fn default() -> Self {
        Self {
            slides: Vec::new(),
            autoplay: true,
            interval_ms: 5000,
            show_indicators: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContainerContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_width: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SectionContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    pub full_width: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridContent {
    pub columns: u8,
    pub gap: String,
}

impl Default for GridContent {
    fn default() -> Self {
        Self {
            columns: 3,
            gap: "1rem".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlexContent {
    pub gap: String,
    pub justify: String,
    pub align: String,
    pub wrap: bool,
}

impl Default for FlexContent {
    fn default() -> Self {
        Self {
            gap: "1rem".to_string(),
            justify: "flex-start".to_string(),
            align: "stretch".to_string(),
            wrap: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DividerContent {
    pub thickness: String,
    pub color: String,
    pub line_style: String,
}

impl Default for DividerContent {
    fn default() -> Self {
        Self {
            thickness: "1px".to_string(),
            color: "#e5e7eb".to_string(),
            line_style: "solid".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpacerContent {
    pub height: String,
}

impl Default for SpacerContent {
    fn default() -> Self {
        Self {
            height: "2rem".to_string(),
        }
    }
}

/// Content resolved at view time from a named data source
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DynamicContent {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductListContent {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub limit: u32,
    pub columns: u8,
    pub show_price: bool,
}

impl Default for ProductListContent {
    fn default() -> Self {
        Self {
            title: "Products".to_string(),
            category: None,
            limit: 8,
            columns: 4,
            show_price: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductDetailContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    pub show_gallery: bool,
    pub show_add_to_cart: bool,
}

impl Default for ProductDetailContent {
    fn default() -> Self {
        Self {
            product_id: None,
            show_gallery: true,
            show_add_to_cart: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoContent {
    pub url: String,
    pub autoplay: bool,
    pub controls: bool,
    pub muted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

impl Default for VideoContent {
    fn default() -> Self {
        Self {
            url: String::new(),
            autoplay: false,
            controls: true,
            muted: false,
            poster: None,
        }
    }
}

/// Tagged block payload
#[derive(Debug, Clone, PartialEq)]
pub enum BlockContent {
    Text(TextContent),
    Heading(HeadingContent),
    Image(ImageContent),
    Hero(HeroContent),
    Button(ButtonContent),
    Carousel(CarouselContent),
    Container(ContainerContent),
    Section(SectionContent),
    Grid(GridContent),
    FlexRow(FlexContent),
    FlexColumn(FlexContent),
    Divider(DividerContent),
    Spacer(SpacerContent),
    Dynamic(DynamicContent),
    ProductList(ProductListContent),
    ProductDetail(ProductDetailContent),
    Video(VideoContent),

    /// A `type` this build does not know, kept verbatim
    Unknown { type_name: String, raw: Value },
}

impl BlockContent {
    pub fn default_for(kind: BlockKind) -> Self {
        match kind {
            BlockKind::Text => BlockContent::Text(TextContent::default()),
            BlockKind::Heading => BlockContent::Heading(HeadingContent::default()),
            BlockKind::Image => BlockContent::Image(ImageContent::default()),
            BlockKind::Hero => BlockContent::Hero(HeroContent::default()),
            BlockKind::Button => BlockContent::Button(ButtonContent::default()),
            BlockKind::Carousel => BlockContent::Carousel(CarouselContent::default()),
            BlockKind::Container => BlockContent::Container(ContainerContent::default()),
            BlockKind::Section => BlockContent::Section(SectionContent::default()),
            BlockKind::Grid => BlockContent::Grid(GridContent::default()),
            BlockKind::FlexRow => BlockContent::FlexRow(FlexContent::default()),
            BlockKind::FlexColumn => BlockContent::FlexColumn(FlexContent {
                align: "flex-start".to_string(),
                ..FlexContent::default()
            }),
            BlockKind::Divider => BlockContent::Divider(DividerContent::default()),
            BlockKind::Spacer => BlockContent::Spacer(SpacerContent::default()),
            BlockKind::Dynamic => BlockContent::Dynamic(DynamicContent::default()),
            BlockKind::ProductList => BlockContent::ProductList(ProductListContent::default()),
            BlockKind::ProductDetail => {
                BlockContent::ProductDetail(ProductDetailContent::default())
            }
            BlockKind::Video => BlockContent::Video(VideoContent::default()),
        }
    }

    /// Kind of this payload; `None` for unknown wire types
    pub fn kind(&self) -> Option<BlockKind> {
        Some(match self {
            BlockContent::Text(_) => BlockKind::Text,
            BlockContent::Heading(_) => BlockKind::Heading,
            BlockContent::Image(_) => BlockKind::Image,
            BlockContent::Hero(_) => BlockKind::Hero,
            BlockContent::Button(_) => BlockKind::Button,
            BlockContent::Carousel(_) => BlockKind::Carousel,
            BlockContent::Container(_) => BlockKind::Container,
            BlockContent::Section(_) => BlockKind::Section,
            BlockContent::Grid(_) => BlockKind::Grid,
            BlockContent::FlexRow(_) => BlockKind::FlexRow,
            BlockContent::FlexColumn(_) => BlockKind::FlexColumn,
            BlockContent::Divider(_) => BlockKind::Divider,
            BlockContent::Spacer(_) => BlockKind::Spacer,
            BlockContent::Dynamic(_) => BlockKind::Dynamic,
            BlockContent::ProductList(_) => BlockKind::ProductList,
            BlockContent::ProductDetail(_) => BlockKind::ProductDetail,
            BlockContent::Video(_) => BlockKind::Video,
            BlockContent::Unknown { .. } => return None,
        })
    }

    /// Wire `type` string
    pub fn type_name(&self) -> &str {
        match self {
            BlockContent::Unknown { type_name, .. } => type_name,
            other => other.kind().map(BlockKind::name).unwrap_or_default(),
        }
    }

    /// Rebuild a payload from its wire `type` and JSON body.
    ///
    /// A `null` body is treated as the kind's default content.
    pub fn from_raw(type_name: &str, raw: Value) -> Result<Self, serde_json::Error> {
        let Some(kind) = BlockKind::from_name(type_name) else {
            return Ok(BlockContent::Unknown {
                type_name: type_name.to_string(),
                raw,
            });
        };

        if raw.is_null() {
            return Ok(BlockContent::default_for(kind));
        }

        Ok(match kind {
            BlockKind::Text => BlockContent::Text(serde_json::from_value(raw)?),
            BlockKind::Heading => BlockContent::Heading(serde_json::from_value(raw)?),
            BlockKind::Image => BlockContent::Image(serde_json::from_value(raw)?),
            BlockKind::Hero => BlockContent::Hero(serde_json::from_value(raw)?),
            BlockKind::Button => BlockContent::Button(serde_json::from_value(raw)?),
            BlockKind::Carousel => BlockContent::Carousel(serde_json::from_value(raw)?),
            BlockKind::Container => BlockContent::Container(serde_json::from_value(raw)?),
            BlockKind::Section => BlockContent::Section(serde_json::from_value(raw)?),
            BlockKind::Grid => BlockContent::Grid(serde_json::from_value(raw)?),
            BlockKind::FlexRow => BlockContent::FlexRow(serde_json::from_value(raw)?),
            BlockKind::FlexColumn => BlockContent::FlexColumn(serde_json::from_value(raw)?),
            BlockKind::Divider => BlockContent::Divider(serde_json::from_value(raw)?),
            BlockKind::Spacer => BlockContent::Spacer(serde_json::from_value(raw)?),
            BlockKind::Dynamic => BlockContent::Dynamic(serde_json::from_value(raw)?),
            BlockKind::ProductList => BlockContent::ProductList(serde_json::from_value(raw)?),
            BlockKind::ProductDetail => {
                BlockContent::ProductDetail(serde_json::from_value(raw)?)
            }
            BlockKind::Video => BlockContent::Video(serde_json::from_value(raw)?),
        })
    }

    /// JSON body for the wire format
    pub fn to_raw(&self) -> Value {
        let encoded = match self {
            BlockContent::Text(c) => serde_json::to_value(c),
            BlockContent::Heading(c) => serde_json::to_value(c),
            BlockContent::Image(c) => serde_json::to_value(c),
            BlockContent::Hero(c) => serde_json::to_value(c),
            BlockContent::Button(c) => serde_json::to_value(c),
            BlockContent::Carousel(c) => serde_json::to_value(c),
            BlockContent::Container(c) => serde_json::to_value(c),
            BlockContent::Section(c) => serde_json::to_value(c),
            BlockContent::Grid(c) => serde_json::to_value(c),
            BlockContent::FlexRow(c) | BlockContent::FlexColumn(c) => serde_json::to_value(c),
            BlockContent::Divider(c) => serde_json::to_value(c),
            BlockContent::Spacer(c) => serde_json::to_value(c),
            BlockContent::Dynamic(c) => serde_json::to_value(c),
            BlockContent::ProductList(c) => serde_json::to_value(c),
            BlockContent::ProductDetail(c) => serde_json::to_value(c),
            BlockContent::Video(c) => serde_json::to_value(c),
            BlockContent::Unknown { raw, .. } => return raw.clone(),
        };
        // Plain structs of strings, numbers and options always encode.
        encoded.unwrap_or(Value::Null)
    }
}
