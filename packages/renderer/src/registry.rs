//! Component lookup by block `type`.
//!
//! Components are built from their factory the first time a block of
//! that type is rendered and reused afterwards.

use pagecraft_model::BlockKind;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::debug;

use crate::components::*;

pub type ComponentFactory = Box<dyn Fn() -> Box<dyn Component> + Send + Sync>;

struct Entry {
    factory: ComponentFactory,
    instance: OnceLock<Box<dyn Component>>,
}

impl Entry {
    fn new(factory: ComponentFactory) -> Self {
        Self {
            factory,
            instance: OnceLock::new(),
        }
    }

    fn get(&self, type_name: &str) -> &dyn Component {
        self.instance
            .get_or_init(|| {
                debug!(type_name, "Loading component");
                (self.factory)()
            })
            .as_ref()
    }
}

pub struct ComponentRegistry {
    entries: HashMap<String, Entry>,
    fallback: Entry,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ComponentRegistry {
    /// No components; every type renders as unknown
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
            fallback: Entry::new(Box::new(|| Box::new(UnknownComponent))),
        }
    }

    /// A component for every built-in kind
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        for kind in BlockKind::all() {
            registry.register(kind.name(), default_factory(kind));
        }
        registry
    }

    /// Add or replace the component for `type_name`
    pub fn register(&mut self, type_name: &str, factory: ComponentFactory) {
        self.entries.insert(type_name.to_string(), Entry::new(factory));
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    /// Component for `type_name`, or the unknown-type placeholder
    pub fn get(&self, type_name: &str) -> &dyn Component {
        match self.entries.get(type_name) {
            Some(entry) => entry.get(type_name),
            None => self.fallback.get(type_name),
        }
    }

    /// Whether the component for `type_name` has been built yet
    pub fn is_loaded(&self, type_name: &str) -> bool {
        self.entries
            .get(type_name)
            .is_some_and(|entry| entry.instance.get().is_some())
    }

    pub fn loaded_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.instance.get().is_some())
            .count()
    }
}

fn default_factory(kind: BlockKind) -> ComponentFactory {
    match kind {
        BlockKind::Text => Box::new(|| Box::new(TextComponent)),
        BlockKind::Heading => Box::new(|| Box::new(HeadingComponent)),
        BlockKind::Image => Box::new(|| Box::new(ImageComponent)),
        BlockKind::Hero => Box::new(|| Box::new(HeroComponent)),
        BlockKind::Button => Box::new(|| Box::new(ButtonComponent)),
        BlockKind::Carousel => Box::new(|| Box::new(CarouselComponent)),
        BlockKind::Container | BlockKind::Section => Box::new(|| Box::new(BoxComponent)),
        BlockKind::Grid => Box::new(|| Box::new(GridComponent)),
        BlockKind::FlexRow | BlockKind::FlexColumn => Box::new(|| Box::new(FlexComponent)),
        BlockKind::Divider => Box::new(|| Box::new(DividerComponent)),
        BlockKind::Spacer => Box::new(|| Box::new(SpacerComponent)),
        BlockKind::Dynamic => Box::new(|| Box::new(DynamicComponent)),
        BlockKind::ProductList => Box::new(|| Box::new(ProductListComponent)),
        BlockKind::ProductDetail => Box::new(|| Box::new(ProductDetailComponent)),
        BlockKind::Video => Box::new(|| Box::new(VideoComponent)),
    }
}
