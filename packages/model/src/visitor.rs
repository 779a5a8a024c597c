use crate::tree::{BlockNode, Forest};

/// Visitor over a materialized block tree
///
/// Default methods walk the whole tree. Override `visit_node` to act on
/// each block; call `walk_node` from the override to keep descending.
pub trait BlockVisitor: Sized {
    fn visit_forest(&mut self, forest: &Forest) {
        walk_forest(self, forest);
    }

    fn visit_node(&mut self, node: &BlockNode, depth: usize) {
        walk_node(self, node, depth);
    }
}

pub fn walk_forest<V: BlockVisitor>(visitor: &mut V, forest: &Forest) {
    for root in &forest.roots {
        visitor.visit_node(root, 0);
    }
}

pub fn walk_node<V: BlockVisitor>(visitor: &mut V, node: &BlockNode, depth: usize) {
    for child in &node.children {
        visitor.visit_node(child, depth + 1);
    }
}

/// Renders a tree as an indented outline, one block per line
#[derive(Debug, Default)]
pub struct OutlinePrinter {
    pub output: String,
}

impl BlockVisitor for OutlinePrinter {
    fn visit_node(&mut self, node: &BlockNode, depth: usize) {
        let block = &node.block;
        self.output.push_str(&"  ".repeat(depth));
        self.output
            .push_str(&format!("- {} [{}] order={}", block.type_name(), block.id, block.order));
        if !block.is_visible {
            self.output.push_str(" (hidden)");
        }
        self.output.push('\n');
        walk_node(self, node, depth);
    }
}

pub fn outline(forest: &Forest) -> String {
    let mut printer = OutlinePrinter::default();
    printer.visit_forest(forest);
    printer.output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;
    use crate::kind::BlockKind;
    use crate::tree::materialize;

    struct CountingVisitor {
        count: usize,
        max_depth: usize,
    }

    impl BlockVisitor for CountingVisitor {
        fn visit_node(&mut self, node: &BlockNode, depth: usize) {
            self.count += 1;
            self.max_depth = self.max_depth.max(depth);
            walk_node(self, node, depth);
        }
    }

    #[test]
    fn test_visitor_walks_every_node() {
        let forest = materialize(&[
            Block::new("g", BlockKind::Grid),
            Block::new("c", BlockKind::FlexColumn).with_parent("g", 1),
            Block::new("t", BlockKind::Text).with_parent("c", 2),
        ]);

        let mut visitor = CountingVisitor {
            count: 0,
            max_depth: 0,
        };
        visitor.visit_forest(&forest);

        assert_eq!(visitor.count, 3);
        assert_eq!(visitor.max_depth, 2);
    }

    #[test]
    fn test_outline() {
        let forest = materialize(&[
            Block::new("s", BlockKind::Section),
            Block::new("t", BlockKind::Text).with_parent("s", 1).hidden(),
        ]);

        assert_eq!(
            outline(&forest),
            "- section [s] order=0\n  - text [t] order=0 (hidden)\n"
        );
    }
}
