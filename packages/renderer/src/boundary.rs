use pagecraft_model::BlockId;
use std::collections::HashMap;

/// Per-block error flags.
///
/// Once a block's render fails its boundary stays tripped, and the block
/// renders as an error affordance until [`ErrorBoundaries::retry`] clears
/// the flag.
#[derive(Debug, Default, Clone)]
pub struct ErrorBoundaries {
    tripped: HashMap<BlockId, String>,
}

impl ErrorBoundaries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tripped(&self, id: &BlockId) -> bool {
        self.tripped.contains_key(id)
    }

    pub fn error(&self, id: &BlockId) -> Option<&str> {
        self.tripped.get(id).map(String::as_str)
    }

    pub(crate) fn trip(&mut self, id: &BlockId, message: String) {
        self.tripped.insert(id.clone(), message);
    }

    /// Clear the flag so the next render tries again
    pub fn retry(&mut self, id: &BlockId) -> bool {
        self.tripped.remove(id).is_some()
    }

    pub fn reset(&mut self) {
        self.tripped.clear();
    }

    pub fn tripped(&self) -> impl Iterator<Item = &BlockId> {
        self.tripped.keys()
    }

    pub fn len(&self) -> usize {
        self.tripped.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tripped.is_empty()
    }
}
