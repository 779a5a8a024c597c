use html_escape::{encode_double_quoted_attribute, encode_text};
use pagecraft_model::{Block, BlockId, MAX_TREE_DEPTH};
use std::borrow::Cow;

/// Rendering mode
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RenderMode {
    /// What visitors see; hidden blocks are skipped
    #[default]
    Preview,
    /// Builder canvas; blocks are selectable and hidden ones are dimmed
    Edit { selected: Option<BlockId> },
}

impl RenderMode {
    pub fn is_edit(&self) -> bool {
        matches!(self, RenderMode::Edit { .. })
    }

    pub fn is_selected(&self, id: &BlockId) -> bool {
        matches!(self, RenderMode::Edit { selected: Some(selected) } if selected == id)
    }
}

/// Options for HTML rendering
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub mode: RenderMode,
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
    /// Wrap in `<html>` with head meta, header and footer
    pub full_document: bool,
    /// Blocks nested deeper than this are left out
    pub max_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            mode: RenderMode::Preview,
            pretty: true,
            indent: "  ".to_string(),
            full_document: true,
            max_depth: MAX_TREE_DEPTH,
        }
    }
}

impl RenderOptions {
    pub fn edit(selected: Option<BlockId>) -> Self {
        Self {
            mode: RenderMode::Edit { selected },
            ..Default::default()
        }
    }

    pub fn fragment(mut self) -> Self {
        self.full_document = false;
        self
    }

    pub fn compact(mut self) -> Self {
        self.pretty = false;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }
}

/// Attribute list for one element
#[derive(Debug, Clone, Default)]
pub struct Attrs {
    items: Vec<(Cow<'static, str>, Option<String>)>,
}

impl Attrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
        self.items.push((name.into(), Some(value.into())));
        self
    }

    pub fn with_opt(self, name: &'static str, value: Option<&String>) -> Self {
        match value {
            Some(value) => self.with(name, value.clone()),
            None => self,
        }
    }

    /// Boolean attribute, written without a value
    pub fn flag(mut self, name: &'static str, on: bool) -> Self {
        if on {
            self.items.push((name.into(), None));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.items {
            out.push(' ');
            out.push_str(name);
            if let Some(value) = value {
                out.push_str("=\"");
                out.push_str(&encode_double_quoted_attribute(value));
                out.push('"');
            }
        }
        out
    }
}

/// `class` and `style` for a block's root element
pub fn block_attrs(block: &Block, base_class: &str) -> Attrs {
    styled_block_attrs(block, base_class, "")
}

/// Like [`block_attrs`], with layout declarations ahead of the block's own
pub fn styled_block_attrs(block: &Block, base_class: &str, layout_css: &str) -> Attrs {
    let mut classes = vec![base_class.to_string()];
    classes.extend(block.style.classes().map(str::to_string));

    let attrs = Attrs::new().with("class", classes.join(" "));
    let css = [layout_css.trim(), block.style.to_css().as_str()]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");
    if css.is_empty() {
        attrs
    } else {
        attrs.with("style", css)
    }
}

/// Output buffer plus indentation state
pub struct Context<'o> {
    options: &'o RenderOptions,
    depth: usize,
    buffer: String,
    /// Extra attributes for the next element opened, used to mark grid
    /// items selectable without a wrapper element
    root_attrs: Option<Attrs>,
}

impl<'o> Context<'o> {
    pub fn new(options: &'o RenderOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
            root_attrs: None,
        }
    }

    /// Empty buffer at `depth` with the same options
    pub fn fork(&self, depth: usize) -> Context<'o> {
        Context {
            options: self.options,
            depth,
            buffer: String::new(),
            root_attrs: None,
        }
    }

    pub fn options(&self) -> &RenderOptions {
        self.options
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    pub(crate) fn set_root_attrs(&mut self, attrs: Attrs) {
        self.root_attrs = Some(attrs);
    }

    fn attrs_with_root(&mut self, attrs: &Attrs) -> String {
        let mut rendered = attrs.render();
        if let Some(root) = self.root_attrs.take() {
            rendered.push_str(&root.render());
        }
        rendered
    }

    /// `<tag ...>` on its own line; following output is indented
    pub fn open(&mut self, tag: &str, attrs: &Attrs) {
        let attrs = self.attrs_with_root(attrs);
        self.add_line(&format!("<{}{}>", tag, attrs));
        self.indent();
    }

    pub fn close(&mut self, tag: &str) {
        self.dedent();
        self.add_line(&format!("</{}>", tag));
    }

    /// `<tag ...>text</tag>` on one line; `text` is escaped
    pub fn element(&mut self, tag: &str, attrs: &Attrs, text: &str) {
        let attrs = self.attrs_with_root(attrs);
        self.add_line(&format!("<{}{}>{}</{}>", tag, attrs, encode_text(text), tag));
    }

    /// Self-closing element
    pub fn void(&mut self, tag: &str, attrs: &Attrs) {
        let attrs = self.attrs_with_root(attrs);
        self.add_line(&format!("<{}{} />", tag, attrs));
    }

    /// Escaped text on its own line
    pub fn text(&mut self, text: &str) {
        self.add_line(&encode_text(text));
    }

    /// Append a forked buffer's output
    pub fn append(&mut self, other: Context<'_>) {
        self.buffer.push_str(&other.buffer);
    }

    pub fn get_output(self) -> String {
        self.buffer
    }
}
