//! Built-in block components
//!
//! Each component writes one block's markup. Container components decide
//! where their children go by calling [`Children::render_into`]; the
//! renderer owns how each child is isolated and wrapped.

use pagecraft_model::{Block, BlockContent, BlockKind};

use crate::context::{block_attrs, styled_block_attrs, Attrs, Context};
use crate::error::RenderError;

/// Child list of the block being rendered
pub trait Children {
    fn render_into(&mut self, ctx: &mut Context<'_>);

    fn is_empty(&self) -> bool;
}

pub trait Component: Send + Sync {
    fn render(
        &self,
        block: &Block,
        ctx: &mut Context<'_>,
        children: &mut dyn Children,
    ) -> Result<(), RenderError>;
}

fn mismatch(block: &Block, expected: BlockKind) -> RenderError {
    RenderError::invalid(
        expected.name(),
        format!("content of type {} given", block.type_name()),
    )
}

fn class_for(kind: BlockKind) -> String {
    format!("pb-{}", kind.name())
}

/// Muted placeholder shown for blocks that have nothing to display yet
fn placeholder(ctx: &mut Context<'_>, block: &Block, kind: BlockKind, message: &str) {
    let attrs = block_attrs(block, &class_for(kind)).with("data-placeholder", "true");
    ctx.element("div", &attrs, message);
}

pub struct TextComponent;

impl Component for TextComponent {
    fn render(&self, block: &Block, ctx: &mut Context<'_>, _: &mut dyn Children) -> Result<(), RenderError> {
        let BlockContent::Text(text) = &block.content else {
            return Err(mismatch(block, BlockKind::Text));
        };
        let attrs = block_attrs(block, "pb-text");
        if text.content.contains('\n') {
            ctx.open("div", &attrs);
            for paragraph in text.content.split("\n\n").filter(|p| !p.trim().is_empty()) {
                ctx.element("p", &Attrs::new(), paragraph.trim());
            }
            ctx.close("div");
        } else {
            ctx.element("p", &attrs, &text.content);
        }
        Ok(())
    }
}

pub struct HeadingComponent;

impl Component for HeadingComponent {
    fn render(&self, block: &Block, ctx: &mut Context<'_>, _: &mut dyn Children) -> Result<(), RenderError> {
        let BlockContent::Heading(heading) = &block.content else {
            return Err(mismatch(block, BlockKind::Heading));
        };
        let tag = format!("h{}", heading.level.clamp(1, 6));
        ctx.element(&tag, &block_attrs(block, "pb-heading"), &heading.text);
        Ok(())
    }
}

pub struct ImageComponent;

impl Component for ImageComponent {
    fn render(&self, block: &Block, ctx: &mut Context<'_>, _: &mut dyn Children) -> Result<(), RenderError> {
        let BlockContent::Image(image) = &block.content else {
            return Err(mismatch(block, BlockKind::Image));
        };
        if image.src.trim().is_empty() {
            placeholder(ctx, block, BlockKind::Image, "No image selected");
            return Ok(());
        }

        ctx.open("figure", &block_attrs(block, "pb-image"));
        if let Some(link) = &image.link {
            ctx.open("a", &Attrs::new().with("href", link.clone()));
        }
        ctx.void(
            "img",
            &Attrs::new()
                .with("src", image.src.clone())
                .with("alt", image.alt.clone())
                .with("loading", "lazy"),
        );
        if image.link.is_some() {
            ctx.close("a");
        }
        if let Some(caption) = &image.caption {
            ctx.element("figcaption", &Attrs::new(), caption);
        }
        ctx.close("figure");
        Ok(())
    }
}

pub struct HeroComponent;

impl Component for HeroComponent {
    fn render(&self, block: &Block, ctx: &mut Context<'_>, _: &mut dyn Children) -> Result<(), RenderError> {
        let BlockContent::Hero(hero) = &block.content else {
            return Err(mismatch(block, BlockKind::Hero));
        };
        let mut attrs = block_attrs(block, "pb-hero");
        if let Some(image) = &hero.background_image {
            attrs = attrs.with("data-background", image.clone());
        }

        ctx.open("section", &attrs);
        ctx.element("h1", &Attrs::new(), &hero.title);
        if !hero.subtitle.is_empty() {
            ctx.element("p", &Attrs::new().with("class", "pb-hero-subtitle"), &hero.subtitle);
        }
        if let (Some(text), Some(link)) = (&hero.cta_text, &hero.cta_link) {
            ctx.element(
                "a",
                &Attrs::new()
                    .with("class", "pb-button pb-button-primary")
                    .with("href", link.clone()),
                text,
            );
        }
        ctx.close("section");
        Ok(())
    }
}

pub struct ButtonComponent;

impl Component for ButtonComponent {
    fn render(&self, block: &Block, ctx: &mut Context<'_>, _: &mut dyn Children) -> Result<(), RenderError> {
        let BlockContent::Button(button) = &block.content else {
            return Err(mismatch(block, BlockKind::Button));
        };
        let class = format!("pb-button pb-button-{}", button.variant.as_str());
        let mut attrs = block_attrs(block, &class).with("href", button.link.clone());
        if button.open_in_new_tab {
            attrs = attrs
                .with("target", "_blank")
                .with("rel", "noopener noreferrer");
        }
        ctx.element("a", &attrs, &button.text);
        Ok(())
    }
}

pub struct CarouselComponent;

impl Component for CarouselComponent {
    fn render(&self, block: &Block, ctx: &mut Context<'_>, _: &mut dyn Children) -> Result<(), RenderError> {
        let BlockContent::Carousel(carousel) = &block.content else {
            return Err(mismatch(block, BlockKind::Carousel));
        };
        if carousel.slides.is_empty() {
            placeholder(ctx, block, BlockKind::Carousel, "Add slides to this carousel");
            return Ok(());
        }
        if carousel.autoplay && carousel.interval_ms == 0 {
            return Err(RenderError::invalid(
                "carousel",
                "autoplay needs an interval above zero",
            ));
        }

        let attrs = block_attrs(block, "pb-carousel")
            .with("data-autoplay", carousel.autoplay.to_string())
            .with("data-interval", carousel.interval_ms.to_string());
        ctx.open("div", &attrs);
        for (index, slide) in carousel.slides.iter().enumerate() {
            ctx.open(
                "div",
                &Attrs::new()
                    .with("class", "pb-carousel-slide")
                    .with("data-index", index.to_string()),
            );
            let alt = slide.caption.clone().unwrap_or_default();
            let img = Attrs::new()
                .with("src", slide.image.clone())
                .with("alt", alt);
            match &slide.link {
                Some(link) => {
                    ctx.open("a", &Attrs::new().with("href", link.clone()));
                    ctx.void("img", &img);
                    ctx.close("a");
                }
                None => ctx.void("img", &img),
            }
            if let Some(caption) = &slide.caption {
                ctx.element("p", &Attrs::new().with("class", "pb-carousel-caption"), caption);
            }
            ctx.close("div");
        }
        if carousel.show_indicators {
            ctx.open("ol", &Attrs::new().with("class", "pb-carousel-indicators"));
            for index in 0..carousel.slides.len() {
                ctx.element(
                    "li",
                    &Attrs::new().with("data-slide-to", index.to_string()),
                    "",
                );
            }
            ctx.close("ol");
        }
        ctx.close("div");
        Ok(())
    }
}

/// `container` and `section`
pub struct BoxComponent;

impl Component for BoxComponent {
    fn render(
        &self,
        block: &Block,
        ctx: &mut Context<'_>,
        children: &mut dyn Children,
    ) -> Result<(), RenderError> {
        match &block.content {
            BlockContent::Container(container) => {
                let layout = container
                    .max_width
                    .as_ref()
                    .map(|width| format!("max-width: {}; margin: 0 auto;", width))
                    .unwrap_or_default();
                ctx.open("div", &styled_block_attrs(block, "pb-container", &layout));
                children.render_into(ctx);
                ctx.close("div");
            }
            BlockContent::Section(section) => {
                let class = if section.full_width {
                    "pb-section pb-full-width"
                } else {
                    "pb-section"
                };
                let mut attrs = block_attrs(block, class);
                if let Some(image) = &section.background_image {
                    attrs = attrs.with("data-background", image.clone());
                }
                ctx.open("section", &attrs);
                if let Some(title) = &section.title {
                    ctx.element("h2", &Attrs::new(), title);
                }
                children.render_into(ctx);
                ctx.close("section");
            }
            _ => return Err(mismatch(block, BlockKind::Container)),
        }
        Ok(())
    }
}

pub struct GridComponent;

impl Component for GridComponent {
    fn render(
        &self,
        block: &Block,
        ctx: &mut Context<'_>,
        children: &mut dyn Children,
    ) -> Result<(), RenderError> {
        let BlockContent::Grid(grid) = &block.content else {
            return Err(mismatch(block, BlockKind::Grid));
        };
        if grid.columns == 0 {
            return Err(RenderError::invalid("grid", "a grid needs at least one column"));
        }
        let layout = format!(
            "display: grid; grid-template-columns: repeat({}, minmax(0, 1fr)); gap: {};",
            grid.columns, grid.gap
        );
        ctx.open("div", &styled_block_attrs(block, "pb-grid", &layout));
        children.render_into(ctx);
        ctx.close("div");
        Ok(())
    }
}

/// `flex-row` and `flex-column`
pub struct FlexComponent;

impl Component for FlexComponent {
    fn render(
        &self,
        block: &Block,
        ctx: &mut Context<'_>,
        children: &mut dyn Children,
    ) -> Result<(), RenderError> {
        let (flex, class, direction) = match &block.content {
            BlockContent::FlexRow(flex) => (flex, "pb-flex-row", "row"),
            BlockContent::FlexColumn(flex) => (flex, "pb-flex-column", "column"),
            _ => return Err(mismatch(block, BlockKind::FlexRow)),
        };
        let mut layout = format!(
            "display: flex; flex-direction: {}; gap: {}; justify-content: {}; align-items: {};",
            direction, flex.gap, flex.justify, flex.align
        );
        if flex.wrap {
            layout.push_str(" flex-wrap: wrap;");
        }
        ctx.open("div", &styled_block_attrs(block, class, &layout));
        children.render_into(ctx);
        ctx.close("div");
        Ok(())
    }
}

pub struct DividerComponent;

impl Component for DividerComponent {
    fn render(&self, block: &Block, ctx: &mut Context<'_>, _: &mut dyn Children) -> Result<(), RenderError> {
        let BlockContent::Divider(divider) = &block.content else {
            return Err(mismatch(block, BlockKind::Divider));
        };
        let layout = format!(
            "border: none; border-top: {} {} {};",
            divider.thickness, divider.line_style, divider.color
        );
        ctx.void("hr", &styled_block_attrs(block, "pb-divider", &layout));
        Ok(())
    }
}

pub struct SpacerComponent;

impl Component for SpacerComponent {
    fn render(&self, block: &Block, ctx: &mut Context<'_>, _: &mut dyn Children) -> Result<(), RenderError> {
        let BlockContent::Spacer(spacer) = &block.content else {
            return Err(mismatch(block, BlockKind::Spacer));
        };
        let layout = format!("height: {};", spacer.height);
        let attrs = styled_block_attrs(block, "pb-spacer", &layout).with("aria-hidden", "true");
        ctx.element("div", &attrs, "");
        Ok(())
    }
}

pub struct DynamicComponent;

impl Component for DynamicComponent {
    fn render(&self, block: &Block, ctx: &mut Context<'_>, _: &mut dyn Children) -> Result<(), RenderError> {
        let BlockContent::Dynamic(dynamic) = &block.content else {
            return Err(mismatch(block, BlockKind::Dynamic));
        };
        if dynamic.source.trim().is_empty() {
            placeholder(ctx, block, BlockKind::Dynamic, "Choose a data source");
            return Ok(());
        }
        let mut attrs = block_attrs(block, "pb-dynamic").with("data-source", dynamic.source.clone());
        attrs = attrs.with_opt("data-template", dynamic.template.as_ref());
        if let Some(limit) = dynamic.limit {
            attrs = attrs.with("data-limit", limit.to_string());
        }
        ctx.element("div", &attrs, "");
        Ok(())
    }
}

pub struct ProductListComponent;

impl Component for ProductListComponent {
    fn render(&self, block: &Block, ctx: &mut Context<'_>, _: &mut dyn Children) -> Result<(), RenderError> {
        let BlockContent::ProductList(list) = &block.content else {
            return Err(mismatch(block, BlockKind::ProductList));
        };
        ctx.open("section", &block_attrs(block, "pb-product-list"));
        if !list.title.is_empty() {
            ctx.element("h2", &Attrs::new(), &list.title);
        }
        let grid = Attrs::new()
            .with("class", "pb-product-grid")
            .with_opt("data-category", list.category.as_ref())
            .with("data-limit", list.limit.to_string())
            .with("data-columns", list.columns.to_string())
            .with("data-show-price", list.show_price.to_string());
        ctx.element("div", &grid, "");
        ctx.close("section");
        Ok(())
    }
}

pub struct ProductDetailComponent;

impl Component for ProductDetailComponent {
    fn render(&self, block: &Block, ctx: &mut Context<'_>, _: &mut dyn Children) -> Result<(), RenderError> {
        let BlockContent::ProductDetail(detail) = &block.content else {
            return Err(mismatch(block, BlockKind::ProductDetail));
        };
        let Some(product_id) = &detail.product_id else {
            placeholder(ctx, block, BlockKind::ProductDetail, "Choose a product");
            return Ok(());
        };
        let attrs = block_attrs(block, "pb-product-detail")
            .with("data-product-id", product_id.clone())
            .with("data-show-gallery", detail.show_gallery.to_string())
            .with("data-show-add-to-cart", detail.show_add_to_cart.to_string());
        ctx.element("div", &attrs, "");
        Ok(())
    }
}

pub struct VideoComponent;

impl VideoComponent {
    /// Embed URL for hosted players, `None` for direct files
    fn embed_url(url: &str) -> Option<String> {
        if let Some(id) = url
            .strip_prefix("https://www.youtube.com/watch?v=")
            .or_else(|| url.strip_prefix("https://youtu.be/"))
        {
            let id = id.split('&').next().unwrap_or(id);
            return Some(format!("https://www.youtube.com/embed/{}", id));
        }
        url.strip_prefix("https://vimeo.com/")
            .map(|id| format!("https://player.vimeo.com/video/{}", id))
    }
}

impl Component for VideoComponent {
    fn render(&self, block: &Block, ctx: &mut Context<'_>, _: &mut dyn Children) -> Result<(), RenderError> {
        let BlockContent::Video(video) = &block.content else {
            return Err(mismatch(block, BlockKind::Video));
        };
        let url = video.url.trim();
        if url.is_empty() {
            placeholder(ctx, block, BlockKind::Video, "No video selected");
            return Ok(());
        }
        if !(url.starts_with("https://") || url.starts_with("http://") || url.starts_with('/')) {
            return Err(RenderError::UnsupportedFeature(format!("video source '{}'", url)));
        }

        let attrs = block_attrs(block, "pb-video");
        match Self::embed_url(url) {
            Some(embed) => {
                ctx.open("div", &attrs);
                ctx.element(
                    "iframe",
                    &Attrs::new()
                        .with("src", embed)
                        .with("allow", "autoplay; fullscreen")
                        .flag("allowfullscreen", true),
                    "",
                );
                ctx.close("div");
            }
            None => {
                let player = attrs
                    .with("src", url.to_string())
                    .with_opt("poster", video.poster.as_ref())
                    .flag("controls", video.controls)
                    .flag("autoplay", video.autoplay)
                    .flag("muted", video.muted)
                    .flag("playsinline", true);
                ctx.element("video", &player, "");
            }
        }
        Ok(())
    }
}

/// Rendered for any `type` without a registered component
pub struct UnknownComponent;

impl Component for UnknownComponent {
    fn render(&self, block: &Block, ctx: &mut Context<'_>, _: &mut dyn Children) -> Result<(), RenderError> {
        let attrs = Attrs::new()
            .with("class", "pb-unknown")
            .with("data-type", block.type_name().to_string());
        ctx.element(
            "div",
            &attrs,
            &format!("Unknown block type: {}", block.type_name()),
        );
        Ok(())
    }
}
