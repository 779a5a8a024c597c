use serde::{Deserialize, Serialize};

/// Per-block style overrides
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    /// Space separated class names
    #[serde(skip_serializing_if = "String::is_empty")]
    pub custom_classes: String,
    /// Raw declarations appended after the generated ones
    #[serde(skip_serializing_if = "String::is_empty")]
    pub custom_css: String,
}

impl BlockStyle {
    pub fn is_empty(&self) -> bool {
        *self == BlockStyle::default()
    }

    /// Inline `style` attribute value
    pub fn to_css(&self) -> String {
        let mut declarations = Vec::new();

        let pairs = [
            ("padding", &self.padding),
            ("margin", &self.margin),
            ("background-color", &self.background_color),
            ("color", &self.text_color),
            ("text-align", &self.text_align),
        ];
        for (property, value) in pairs {
            if let Some(value) = value {
                declarations.push(format!("{}: {};", property, value.trim()));
            }
        }

        let custom = self.custom_css.trim();
        if !custom.is_empty() {
            if custom.ends_with(';') {
                declarations.push(custom.to_string());
            } else {
                declarations.push(format!("{};", custom));
            }
        }

        declarations.join(" ")
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.custom_classes.split_whitespace()
    }

    /// Overlay `other`'s set fields on top of `self`
    pub fn merged_with(&self, other: &BlockStyle) -> BlockStyle {
        BlockStyle {
            padding: other.padding.clone().or_else(|| self.padding.clone()),
            margin: other.margin.clone().or_else(|| self.margin.clone()),
            background_color: other
                .background_color
                .clone()
                .or_else(|| self.background_color.clone()),
            text_color: other.text_color.clone().or_else(|| self.text_color.clone()),
            text_align: other.text_align.clone().or_else(|| self.text_align.clone()),
            custom_classes: if other.custom_classes.is_empty() {
                self.custom_classes.clone()
            } else {
                other.custom_classes.clone()
            },
            custom_css: if other.custom_css.is_empty() {
                self.custom_css.clone()
            } else {
                other.custom_css.clone()
            },
        }
    }
}
