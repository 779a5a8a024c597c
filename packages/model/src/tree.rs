//! # Tree Reader
//!
//! Render-ready views over a page's flat block list.
//!
//! The backend stores blocks flat with parent references. Selectors work
//! on that list directly; [`materialize`] turns it into an owned nested
//! tree for rendering and selection lookups.
//!
//! Neither path trusts the data to be acyclic: a block listed as its own
//! ancestor terminates the walk instead of recursing forever.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::block::{Block, BlockId};
use crate::error::TreeError;

/// Nesting limit for every recursive walk
pub const MAX_TREE_DEPTH: usize = 64;

/// Blocks without a parent, in input sequence.
///
/// The backend does not guarantee sorted output; use [`sort_by_order`]
/// before rendering.
pub fn root_blocks(all: &[Block]) -> Vec<&Block> {
    all.iter().filter(|b| b.parent_id.is_none()).collect()
}

/// Blocks whose parent is `parent_id`, in input sequence
pub fn children_of<'a>(all: &'a [Block], parent_id: &BlockId) -> Vec<&'a Block> {
    all.iter()
        .filter(|b| b.parent_id.as_ref() == Some(parent_id))
        .collect()
}

/// Stable sort by `order`
pub fn sort_by_order(mut blocks: Vec<&Block>) -> Vec<&Block> {
    blocks.sort_by_key(|b| b.order);
    blocks
}

/// Sorted siblings under `parent_id` (`None` for the root list)
pub fn siblings<'a>(all: &'a [Block], parent_id: Option<&BlockId>) -> Vec<&'a Block> {
    let blocks = match parent_id {
        Some(parent_id) => children_of(all, parent_id),
        None => root_blocks(all),
    };
    sort_by_order(blocks)
}

/// Lookup in the flat list
pub fn find_block<'a>(all: &'a [Block], id: &BlockId) -> Option<&'a Block> {
    all.iter().find(|b| &b.id == id)
}

/// Every block below `id`, breadth first. `id` itself is never included.
pub fn descendant_ids(all: &[Block], id: &BlockId) -> Vec<BlockId> {
    let mut seen: HashSet<&BlockId> = HashSet::new();
    seen.insert(id);

    let mut queue = VecDeque::from([id]);
    let mut result = Vec::new();

    while let Some(current) = queue.pop_front() {
        for child in children_of(all, current) {
            if seen.insert(&child.id) {
                result.push(child.id.clone());
                queue.push_back(&child.id);
            }
        }
    }

    result
}

/// Whether `candidate` sits somewhere below `ancestor`
pub fn is_descendant(all: &[Block], ancestor: &BlockId, candidate: &BlockId) -> bool {
    let mut seen = HashSet::new();
    let mut current = find_block(all, candidate).and_then(|b| b.parent_id.as_ref());

    while let Some(parent) = current {
        if parent == ancestor {
            return true;
        }
        if !seen.insert(parent) {
            return false;
        }
        current = find_block(all, parent).and_then(|b| b.parent_id.as_ref());
    }

    false
}

/// A block with its children materialized
#[derive(Debug, Clone, PartialEq)]
pub struct BlockNode {
    pub block: Block,
    pub children: Vec<BlockNode>,
}

impl BlockNode {
    pub fn leaf(block: Block) -> Self {
        Self {
            block,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> &BlockId {
        &self.block.id
    }

    /// Number of nodes in this subtree, including `self`
    pub fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(BlockNode::subtree_size).sum::<usize>()
    }
}

/// Materialized page tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Forest {
    pub roots: Vec<BlockNode>,
    /// Blocks unreachable from any root: dangling parents, parent
    /// cycles, duplicate ids, or nesting past [`MAX_TREE_DEPTH`]
    pub detached: Vec<BlockId>,
}

impl Forest {
    pub fn find(&self, id: &BlockId) -> Result<&BlockNode, TreeError> {
        find_by_id(&self.roots, id)
    }

    pub fn len(&self) -> usize {
        self.roots.iter().map(BlockNode::subtree_size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Build the nested tree from a flat list. Children are sorted by order.
pub fn materialize(all: &[Block]) -> Forest {
    materialize_with_limit(all, MAX_TREE_DEPTH)
}

/// [`materialize`] with a custom nesting limit; deeper blocks are detached
pub fn materialize_with_limit(all: &[Block], max_depth: usize) -> Forest {
    let mut by_parent: HashMap<&BlockId, Vec<&Block>> = HashMap::new();
    for block in all {
        if let Some(parent_id) = &block.parent_id {
            by_parent.entry(parent_id).or_default().push(block);
        }
    }

    let mut placed: HashSet<&BlockId> = HashSet::new();
    let mut roots = Vec::new();

    for root in sort_by_order(root_blocks(all)) {
        if let Some(node) = build_node(root, &by_parent, &mut placed, 0, max_depth) {
            roots.push(node);
        }
    }

    // Duplicate ids are reported on every appearance after the placed one.
    let mut seen = HashSet::new();
    let detached = all
        .iter()
        .filter(|b| !(seen.insert(&b.id) && placed.contains(&b.id)))
        .map(|b| b.id.clone())
        .collect();

    Forest { roots, detached }
}

fn build_node<'a>(
    block: &'a Block,
    by_parent: &HashMap<&BlockId, Vec<&'a Block>>,
    placed: &mut HashSet<&'a BlockId>,
    depth: usize,
    max_depth: usize,
) -> Option<BlockNode> {
    if depth >= max_depth || !placed.insert(&block.id) {
        return None;
    }

    let mut children = Vec::new();
    if let Some(kids) = by_parent.get(&block.id) {
        for child in sort_by_order(kids.clone()) {
            if let Some(node) = build_node(child, by_parent, placed, depth + 1, max_depth) {
                children.push(node);
            }
        }
    }

    Some(BlockNode {
        block: block.clone(),
        children,
    })
}

/// Depth-first search over a materialized tree.
///
/// Tracks the ids on the current path; a node whose id already appears
/// among its ancestors aborts the search with [`TreeError::CycleDetected`].
pub fn find_by_id<'a>(tree: &'a [BlockNode], id: &BlockId) -> Result<&'a BlockNode, TreeError> {
    let mut path = Vec::new();
    for node in tree {
        if let Some(found) = search(node, id, &mut path)? {
            return Ok(found);
        }
    }
    Err(TreeError::NotFound(id.clone()))
}

fn search<'a>(
    node: &'a BlockNode,
    id: &BlockId,
    path: &mut Vec<&'a BlockId>,
) -> Result<Option<&'a BlockNode>, TreeError> {
    if path.len() >= MAX_TREE_DEPTH {
        return Err(TreeError::DepthLimitExceeded {
            limit: MAX_TREE_DEPTH,
        });
    }
    if path.contains(&node.id()) {
        return Err(TreeError::CycleDetected(node.id().clone()));
    }
    if node.id() == id {
        return Ok(Some(node));
    }

    path.push(node.id());
    for child in &node.children {
        if let Some(found) = search(child, id, path)? {
            return Ok(Some(found));
        }
    }
    path.pop();

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::BlockKind;

    fn sample() -> Vec<Block> {
        vec![
            Block::new("c", BlockKind::Text).with_order(2),
            Block::new("a", BlockKind::Section).with_order(0),
            Block::new("a2", BlockKind::Text).with_order(1).with_parent("a", 1),
            Block::new("a1", BlockKind::Text).with_order(0).with_parent("a", 1),
            Block::new("b", BlockKind::Divider).with_order(1),
        ]
    }

    fn ids(blocks: &[&Block]) -> Vec<String> {
        blocks.iter().map(|b| b.id.to_string()).collect()
    }

    #[test]
    fn test_root_blocks_preserve_input_sequence() {
        let all = sample();
        assert_eq!(ids(&root_blocks(&all)), vec!["c", "a", "b"]);
        assert_eq!(ids(&sort_by_order(root_blocks(&all))), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_children_of() {
        let all = sample();
        let parent = BlockId::from("a");
        assert_eq!(ids(&children_of(&all, &parent)), vec!["a2", "a1"]);
        assert_eq!(ids(&siblings(&all, Some(&parent))), vec!["a1", "a2"]);
    }

    #[test]
    fn test_materialize_sorts_children() {
        let forest = materialize(&sample());
        let root_ids: Vec<_> = forest.roots.iter().map(|n| n.id().to_string()).collect();
        assert_eq!(root_ids, vec!["a", "b", "c"]);

        let child_ids: Vec<_> = forest.roots[0]
            .children
            .iter()
            .map(|n| n.id().to_string())
            .collect();
        assert_eq!(child_ids, vec!["a1", "a2"]);
        assert!(forest.detached.is_empty());
        assert_eq!(forest.len(), 5);
    }

    #[test]
    fn test_materialize_terminates_on_parent_cycle() {
        let all = vec![
            Block::new("root", BlockKind::Container),
            Block::new("x", BlockKind::Container).with_parent("y", 1),
            Block::new("y", BlockKind::Container).with_parent("x", 1),
        ];

        let forest = materialize(&all);
        assert_eq!(forest.roots.len(), 1);
        assert_eq!(forest.detached, vec![BlockId::from("x"), BlockId::from("y")]);
    }

    #[test]
    fn test_materialize_reports_dangling_parent() {
        let all = vec![Block::new("orphan", BlockKind::Text).with_parent("gone", 1)];
        let forest = materialize(&all);
        assert!(forest.roots.is_empty());
        assert_eq!(forest.detached, vec![BlockId::from("orphan")]);
    }

    #[test]
    fn test_materialize_with_limit_detaches_deep_blocks() {
        let forest = materialize_with_limit(&sample(), 1);
        assert_eq!(forest.roots.len(), 3);
        assert!(forest.roots.iter().all(|n| n.children.is_empty()));
        assert_eq!(forest.detached.len(), 2);
    }

    #[test]
    fn test_find_by_id_nested() {
        let forest = materialize(&sample());
        let found = forest.find(&BlockId::from("a2")).unwrap();
        assert_eq!(found.block.order, 1);
    }

    #[test]
    fn test_find_by_id_not_found() {
        let forest = materialize(&sample());
        assert_eq!(
            forest.find(&BlockId::from("zzz")),
            Err(TreeError::NotFound(BlockId::from("zzz")))
        );
    }

    #[test]
    fn test_find_by_id_terminates_on_cycle() {
        // A node that lists itself as its own descendant
        let a = Block::new("a", BlockKind::Container);
        let tree = vec![BlockNode {
            block: a.clone(),
            children: vec![BlockNode {
                block: Block::new("b", BlockKind::Container),
                children: vec![BlockNode::leaf(a)],
            }],
        }];

        let result = find_by_id(&tree, &BlockId::from("missing"));
        assert_eq!(result, Err(TreeError::CycleDetected(BlockId::from("a"))));
    }

    #[test]
    fn test_find_by_id_depth_limit() {
        let mut node = BlockNode::leaf(Block::new("n0", BlockKind::Container));
        for i in 1..=MAX_TREE_DEPTH + 1 {
            node = BlockNode {
                block: Block::new(format!("n{}", i), BlockKind::Container),
                children: vec![node],
            };
        }

        let result = find_by_id(std::slice::from_ref(&node), &BlockId::from("missing"));
        assert_eq!(
            result,
            Err(TreeError::DepthLimitExceeded {
                limit: MAX_TREE_DEPTH
            })
        );
    }

    #[test]
    fn test_descendant_ids() {
        let mut all = sample();
        all.push(Block::new("a1x", BlockKind::Text).with_parent("a1", 2));

        let mut found = descendant_ids(&all, &BlockId::from("a"));
        found.sort();
        assert_eq!(
            found,
            vec![BlockId::from("a1"), BlockId::from("a1x"), BlockId::from("a2")]
        );
        assert!(is_descendant(&all, &BlockId::from("a"), &BlockId::from("a1x")));
        assert!(!is_descendant(&all, &BlockId::from("a1"), &BlockId::from("a")));
    }

    #[test]
    fn test_descendant_ids_with_cycle() {
        let all = vec![
            Block::new("x", BlockKind::Container).with_parent("y", 1),
            Block::new("y", BlockKind::Container).with_parent("x", 1),
        ];
        assert_eq!(descendant_ids(&all, &BlockId::from("x")), vec![BlockId::from("y")]);
        assert!(!is_descendant(&all, &BlockId::from("z"), &BlockId::from("x")));
    }
}
