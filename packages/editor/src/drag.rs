//! # Drag and Drop
//!
//! Turns a completed drag gesture into at most one gateway operation.
//!
//! ```text
//!   drag_start ──► Dragging { source, over } ──► drag_end(target)
//!        ▲                 │                          │
//!        └──── cancel ◄────┘                 plan_drop (pure)
//!                                                     │
//!                                          MutationGateway call
//! ```
//!
//! Planning is a pure function of the flat block list, so every drop rule
//! can be tested without a backend.

use pagecraft_model::{find_block, is_descendant, siblings, Block, BlockId, BlockKind};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::activity::Outcome;
use crate::errors::{DropError, GatewayError};
use crate::gateway::MutationGateway;
use crate::mutations::MutationKind;
use crate::store::UiState;

#[derive(Debug, Clone, PartialEq)]
pub enum DragSource {
    /// An existing block on the canvas
    Block(BlockId),
    /// A new block from the palette
    Palette(BlockKind),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropTarget {
    /// Empty canvas area; appends to the root list
    Canvas,
    /// Onto a block, taking its place among its siblings
    Block(BlockId),
    /// Into a container's child list
    Container(BlockId),
}

impl DropTarget {
    fn block_id(&self) -> Option<&BlockId> {
        match self {
            DropTarget::Canvas => None,
            DropTarget::Block(id) | DropTarget::Container(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source: DragSource,
        over: Option<DropTarget>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NoTarget,
    SameTarget,
    NotDragging,
    Unchanged,
}

/// The single mutation a drop resolves to
#[derive(Debug, Clone, PartialEq)]
pub enum DropPlan {
    Ignore(IgnoreReason),
    Reject(DropError),
    /// New block at `position` in the sibling list of `parent_id`
    Insert {
        kind: BlockKind,
        parent_id: Option<BlockId>,
        position: usize,
    },
    /// New block at the end of a container
    InsertChild { kind: BlockKind, parent_id: BlockId },
    /// Full sibling sequence after the move; index becomes order
    Reorder { blocks: Vec<BlockId> },
    Move {
        block_id: BlockId,
        parent_id: Option<BlockId>,
        index: usize,
    },
}

impl DropPlan {
    pub fn is_mutation(&self) -> bool {
        !matches!(self, DropPlan::Ignore(_) | DropPlan::Reject(_))
    }
}

fn sibling_ids(blocks: &[Block], parent_id: Option<&BlockId>) -> Vec<BlockId> {
    siblings(blocks, parent_id)
        .into_iter()
        .map(|b| b.id.clone())
        .collect()
}

/// Remove `id` from `sequence` and insert it at `index`
fn move_within(mut sequence: Vec<BlockId>, id: &BlockId, index: usize) -> Vec<BlockId> {
    sequence.retain(|other| other != id);
    let index = index.min(sequence.len());
    sequence.insert(index, id.clone());
    sequence
}

fn reorder_or_unchanged(before: Vec<BlockId>, id: &BlockId, index: usize) -> DropPlan {
    let after = move_within(before.clone(), id, index);
    if after == before {
        DropPlan::Ignore(IgnoreReason::Unchanged)
    } else {
        DropPlan::Reorder { blocks: after }
    }
}

/// Decide what a drop does without touching any state
pub fn plan_drop(blocks: &[Block], source: &DragSource, target: Option<&DropTarget>) -> DropPlan {
    let Some(target) = target else {
        return DropPlan::Ignore(IgnoreReason::NoTarget);
    };

    let target_block = match target.block_id() {
        Some(id) => match find_block(blocks, id) {
            Some(block) => Some(block),
            None => return DropPlan::Reject(DropError::TargetNotFound(id.clone())),
        },
        None => None,
    };

    if let (DropTarget::Container(id), Some(block)) = (target, target_block) {
        if !block.is_container() {
            return DropPlan::Reject(DropError::NotAContainer(id.clone()));
        }
    }

    match source {
        DragSource::Palette(kind) => match (target, target_block) {
            (DropTarget::Canvas, _) => DropPlan::Insert {
                kind: *kind,
                parent_id: None,
                position: siblings(blocks, None).len(),
            },
            (DropTarget::Container(id), _) => DropPlan::InsertChild {
                kind: *kind,
                parent_id: id.clone(),
            },
            (DropTarget::Block(id), Some(block)) => {
                let sequence = sibling_ids(blocks, block.parent_id.as_ref());
                let position = sequence
                    .iter()
                    .position(|other| other == id)
                    .map(|index| index + 1)
                    .unwrap_or(sequence.len());
                DropPlan::Insert {
                    kind: *kind,
                    parent_id: block.parent_id.clone(),
                    position,
                }
            }
            (DropTarget::Block(id), None) => {
                DropPlan::Reject(DropError::TargetNotFound(id.clone()))
            }
        },
        DragSource::Block(source_id) => {
            let Some(dragged) = find_block(blocks, source_id) else {
                return DropPlan::Reject(DropError::SourceNotFound(source_id.clone()));
            };
            if target.block_id() == Some(source_id) {
                return DropPlan::Ignore(IgnoreReason::SameTarget);
            }
            if let Some(target_id) = target.block_id() {
                if is_descendant(blocks, source_id, target_id) {
                    return DropPlan::Reject(DropError::IntoOwnSubtree(source_id.clone()));
                }
            }

            match (target, target_block) {
                (DropTarget::Canvas, _) => {
                    if dragged.is_root() {
                        let roots = sibling_ids(blocks, None);
                        let end = roots.len();
                        reorder_or_unchanged(roots, source_id, end)
                    } else {
                        DropPlan::Move {
                            block_id: source_id.clone(),
                            parent_id: None,
                            index: siblings(blocks, None).len(),
                        }
                    }
                }
                (DropTarget::Container(container_id), _) => {
                    let children = sibling_ids(blocks, Some(container_id));
                    if dragged.parent_id.as_ref() == Some(container_id) {
                        let end = children.len();
                        reorder_or_unchanged(children, source_id, end)
                    } else {
                        DropPlan::Move {
                            block_id: source_id.clone(),
                            parent_id: Some(container_id.clone()),
                            index: children.len(),
                        }
                    }
                }
                (DropTarget::Block(target_id), Some(over)) => {
                    let sequence = sibling_ids(blocks, over.parent_id.as_ref());
                    let index = sequence
                        .iter()
                        .position(|other| other == target_id)
                        .unwrap_or(sequence.len());
                    if dragged.parent_id == over.parent_id {
                        reorder_or_unchanged(sequence, source_id, index)
                    } else {
                        DropPlan::Move {
                            block_id: source_id.clone(),
                            parent_id: over.parent_id.clone(),
                            index,
                        }
                    }
                }
                (DropTarget::Block(target_id), None) => {
                    DropPlan::Reject(DropError::TargetNotFound(target_id.clone()))
                }
            }
        }
    }
}

/// Gesture state machine; one gesture at a time
pub struct DragController {
    gateway: Arc<MutationGateway>,
    ui: Arc<UiState>,
    state: DragState,
}

impl DragController {
    pub fn new(gateway: Arc<MutationGateway>, ui: Arc<UiState>) -> Self {
        Self {
            gateway,
            ui,
            state: DragState::Idle,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn drag_start(&mut self, source: DragSource) {
        debug!(?source, "Drag started");
        self.state = DragState::Dragging { source, over: None };
    }

    /// Track the hovered target for highlighting
    pub fn drag_over(&mut self, target: Option<DropTarget>) {
        if let DragState::Dragging { over, .. } = &mut self.state {
            self.ui.hover(target.as_ref().and_then(DropTarget::block_id).cloned());
            *over = target;
        }
    }

    pub fn cancel(&mut self) {
        if self.is_dragging() {
            debug!("Drag cancelled");
        }
        self.state = DragState::Idle;
        self.ui.hover(None);
    }

    /// Finish the gesture and run its plan.
    ///
    /// Ignored and rejected drops return `Ok` with the plan and make no
    /// gateway call.
    #[instrument(skip(self))]
    pub async fn drag_end(&mut self, target: Option<DropTarget>) -> Result<DropPlan, GatewayError> {
        let source = match std::mem::take(&mut self.state) {
            DragState::Idle => return Ok(DropPlan::Ignore(IgnoreReason::NotDragging)),
            DragState::Dragging { source, .. } => source,
        };
        self.ui.hover(None);

        let blocks = self.gateway.pages().blocks();
        let plan = plan_drop(&blocks, &source, target.as_ref());
        debug!(?plan, "Planned drop");

        match &plan {
            DropPlan::Ignore(_) => {}
            DropPlan::Reject(error) => {
                warn!(?source, ?target, error = %error, "Drop rejected");
                self.gateway.activity().record(
                    MutationKind::Drop,
                    Outcome::Rejected,
                    Some(error.block_id()),
                    error.to_string(),
                );
                self.gateway.notifications().warning(error.to_string());
            }
            DropPlan::Insert {
                kind,
                parent_id,
                position,
            } => {
                let count_before = siblings(&blocks, parent_id.as_ref()).len();
                let created = self
                    .gateway
                    .add_block(*kind, None, parent_id.as_ref(), None)
                    .await?;
                if *position < count_before {
                    self.place_new_block(&created.id, parent_id.as_ref(), *position)
                        .await?;
                }
            }
            DropPlan::InsertChild { kind, parent_id } => {
                self.gateway.add_child_block(parent_id, *kind).await?;
            }
            DropPlan::Reorder { blocks: sequence } => {
                let ordered: Vec<Block> = sequence
                    .iter()
                    .filter_map(|id| find_block(&blocks, id).cloned())
                    .collect();
                self.gateway.reorder_blocks(&ordered).await?;
            }
            DropPlan::Move {
                block_id,
                parent_id,
                index,
            } => {
                self.gateway
                    .move_block(block_id, parent_id.as_ref(), *index)
                    .await?;
            }
        }

        Ok(plan)
    }

    /// Renumber siblings so a freshly appended block sits at `position`
    async fn place_new_block(
        &self,
        id: &BlockId,
        parent_id: Option<&BlockId>,
        position: usize,
    ) -> Result<(), GatewayError> {
        let blocks = self.gateway.pages().blocks();
        let sequence = move_within(sibling_ids(&blocks, parent_id), id, position);
        let ordered: Vec<Block> = sequence
            .iter()
            .filter_map(|sibling| find_block(&blocks, sibling).cloned())
            .collect();
        self.gateway.reorder_blocks(&ordered).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<BlockId> {
        names.iter().map(|n| BlockId::from(*n)).collect()
    }

    fn canvas() -> Vec<Block> {
        vec![
            Block::new("a", BlockKind::Text).with_order(0),
            Block::new("b", BlockKind::Image).with_order(1),
            Block::new("c", BlockKind::Button).with_order(2),
            Block::new("box", BlockKind::Container).with_order(3),
            Block::new("x", BlockKind::Text).with_parent("box", 1),
        ]
    }

    fn block(id: &str) -> DragSource {
        DragSource::Block(BlockId::from(id))
    }

    #[test]
    fn test_no_target_is_ignored() {
        let plan = plan_drop(&canvas(), &block("a"), None);
        assert_eq!(plan, DropPlan::Ignore(IgnoreReason::NoTarget));
    }

    #[test]
    fn test_drop_on_self_is_ignored() {
        let plan = plan_drop(&canvas(), &block("a"), Some(&DropTarget::Block("a".into())));
        assert_eq!(plan, DropPlan::Ignore(IgnoreReason::SameTarget));
    }

    #[test]
    fn test_sibling_drop_moves_to_target_index() {
        let plan = plan_drop(&canvas(), &block("a"), Some(&DropTarget::Block("c".into())));
        assert_eq!(
            plan,
            DropPlan::Reorder {
                blocks: ids(&["b", "c", "a", "box"])
            }
        );
    }

    #[test]
    fn test_sibling_drop_upwards() {
        let plan = plan_drop(&canvas(), &block("c"), Some(&DropTarget::Block("a".into())));
        assert_eq!(
            plan,
            DropPlan::Reorder {
                blocks: ids(&["c", "a", "b", "box"])
            }
        );
    }

    #[test]
    fn test_palette_on_block_inserts_after_it() {
        let plan = plan_drop(
            &canvas(),
            &DragSource::Palette(BlockKind::Hero),
            Some(&DropTarget::Block("a".into())),
        );
        assert_eq!(
            plan,
            DropPlan::Insert {
                kind: BlockKind::Hero,
                parent_id: None,
                position: 1
            }
        );
    }

    #[test]
    fn test_palette_on_canvas_appends() {
        let plan = plan_drop(
            &canvas(),
            &DragSource::Palette(BlockKind::Divider),
            Some(&DropTarget::Canvas),
        );
        assert_eq!(
            plan,
            DropPlan::Insert {
                kind: BlockKind::Divider,
                parent_id: None,
                position: 4
            }
        );
    }

    #[test]
    fn test_palette_on_container_inserts_child() {
        let plan = plan_drop(
            &canvas(),
            &DragSource::Palette(BlockKind::Text),
            Some(&DropTarget::Container("box".into())),
        );
        assert_eq!(
            plan,
            DropPlan::InsertChild {
                kind: BlockKind::Text,
                parent_id: "box".into()
            }
        );
    }

    #[test]
    fn test_container_target_must_be_a_container() {
        let plan = plan_drop(
            &canvas(),
            &DragSource::Palette(BlockKind::Text),
            Some(&DropTarget::Container("b".into())),
        );
        assert_eq!(plan, DropPlan::Reject(DropError::NotAContainer("b".into())));
    }

    #[test]
    fn test_block_into_container_moves_to_end() {
        let plan = plan_drop(&canvas(), &block("a"), Some(&DropTarget::Container("box".into())));
        assert_eq!(
            plan,
            DropPlan::Move {
                block_id: "a".into(),
                parent_id: Some("box".into()),
                index: 1
            }
        );
    }

    #[test]
    fn test_nested_block_onto_root_block_moves_out() {
        let plan = plan_drop(&canvas(), &block("x"), Some(&DropTarget::Block("b".into())));
        assert_eq!(
            plan,
            DropPlan::Move {
                block_id: "x".into(),
                parent_id: None,
                index: 1
            }
        );
    }

    #[test]
    fn test_container_into_own_child_is_rejected() {
        let mut blocks = canvas();
        blocks.push(Block::new("inner", BlockKind::Grid).with_parent("box", 1).with_order(1));

        let plan = plan_drop(&blocks, &block("box"), Some(&DropTarget::Container("inner".into())));
        assert_eq!(plan, DropPlan::Reject(DropError::IntoOwnSubtree("box".into())));
    }

    #[test]
    fn test_unknown_ids_are_rejected() {
        let plan = plan_drop(&canvas(), &block("ghost"), Some(&DropTarget::Canvas));
        assert_eq!(plan, DropPlan::Reject(DropError::SourceNotFound("ghost".into())));

        let plan = plan_drop(&canvas(), &block("a"), Some(&DropTarget::Block("ghost".into())));
        assert_eq!(plan, DropPlan::Reject(DropError::TargetNotFound("ghost".into())));
    }

    #[test]
    fn test_last_root_on_canvas_is_unchanged() {
        let plan = plan_drop(&canvas(), &block("box"), Some(&DropTarget::Canvas));
        assert_eq!(plan, DropPlan::Ignore(IgnoreReason::Unchanged));
    }

    #[test]
    fn test_root_on_canvas_moves_to_end() {
        let plan = plan_drop(&canvas(), &block("a"), Some(&DropTarget::Canvas));
        assert_eq!(
            plan,
            DropPlan::Reorder {
                blocks: ids(&["b", "c", "box", "a"])
            }
        );
    }
}
