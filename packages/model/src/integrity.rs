//! # Integrity Checks
//!
//! Structural rules a page's flat block list should satisfy. The backend
//! owns the data, so nothing here repairs anything; callers decide what
//! to do with the findings.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::block::{Block, BlockId};
use crate::page::Page;
use crate::tree::find_block;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IntegrityIssue {
    /// `parent_id` points at a block that is not on the page
    DanglingParent { block: BlockId, parent: BlockId },
    /// Parent exists but its kind cannot own children
    ParentNotContainer { block: BlockId, parent: BlockId },
    DuplicateId(BlockId),
    /// Following parent links from `block` comes back to it
    ParentCycle { block: BlockId },
    DuplicateSiblingOrder {
        parent: Option<BlockId>,
        order: i32,
        blocks: Vec<BlockId>,
    },
    /// `depth` disagrees with the parent's depth + 1
    StaleDepth { block: BlockId, expected: u32, actual: u32 },
}

impl IntegrityIssue {
    pub fn severity(&self) -> Severity {
        match self {
            IntegrityIssue::DanglingParent { .. }
            | IntegrityIssue::ParentNotContainer { .. }
            | IntegrityIssue::DuplicateId(_)
            | IntegrityIssue::ParentCycle { .. } => Severity::Error,
            IntegrityIssue::DuplicateSiblingOrder { .. } | IntegrityIssue::StaleDepth { .. } => {
                Severity::Warning
            }
        }
    }
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::DanglingParent { block, parent } => {
                write!(f, "block {} references missing parent {}", block, parent)
            }
            IntegrityIssue::ParentNotContainer { block, parent } => {
                write!(f, "block {} is nested in non-container {}", block, parent)
            }
            IntegrityIssue::DuplicateId(id) => write!(f, "duplicate block id {}", id),
            IntegrityIssue::ParentCycle { block } => {
                write!(f, "block {} is its own ancestor", block)
            }
            IntegrityIssue::DuplicateSiblingOrder { parent, order, blocks } => {
                let ids: Vec<_> = blocks.iter().map(BlockId::as_str).collect();
                match parent {
                    Some(parent) => write!(
                        f,
                        "siblings under {} share order {}: {}",
                        parent,
                        order,
                        ids.join(", ")
                    ),
                    None => write!(f, "root blocks share order {}: {}", order, ids.join(", ")),
                }
            }
            IntegrityIssue::StaleDepth { block, expected, actual } => write!(
                f,
                "block {} has depth {} but its parent implies {}",
                block, actual, expected
            ),
        }
    }
}

pub fn check_page(page: &Page) -> Vec<IntegrityIssue> {
    check_blocks(&page.blocks)
}

pub fn check_blocks(all: &[Block]) -> Vec<IntegrityIssue> {
    let mut issues = Vec::new();

    let mut seen = HashSet::new();
    for block in all {
        if !seen.insert(&block.id) {
            issues.push(IntegrityIssue::DuplicateId(block.id.clone()));
        }
    }

    for block in all {
        let Some(parent_id) = &block.parent_id else {
            continue;
        };

        match find_block(all, parent_id) {
            None => issues.push(IntegrityIssue::DanglingParent {
                block: block.id.clone(),
                parent: parent_id.clone(),
            }),
            Some(parent) => {
                if !parent.is_container() {
                    issues.push(IntegrityIssue::ParentNotContainer {
                        block: block.id.clone(),
                        parent: parent_id.clone(),
                    });
                }
                if block.depth != parent.depth + 1 {
                    issues.push(IntegrityIssue::StaleDepth {
                        block: block.id.clone(),
                        expected: parent.depth + 1,
                        actual: block.depth,
                    });
                }
            }
        }

        if has_parent_cycle(all, block) {
            issues.push(IntegrityIssue::ParentCycle {
                block: block.id.clone(),
            });
        }
    }

    let mut groups: HashMap<(Option<&BlockId>, i32), Vec<BlockId>> = HashMap::new();
    for block in all {
        groups
            .entry((block.parent_id.as_ref(), block.order))
            .or_default()
            .push(block.id.clone());
    }
    let mut duplicates: Vec<_> = groups
        .into_iter()
        .filter(|(_, blocks)| blocks.len() > 1)
        .map(|((parent, order), blocks)| IntegrityIssue::DuplicateSiblingOrder {
            parent: parent.cloned(),
            order,
            blocks,
        })
        .collect();
    duplicates.sort_by_key(|issue| issue.to_string());
    issues.extend(duplicates);

    issues
}

pub fn has_errors(issues: &[IntegrityIssue]) -> bool {
    issues.iter().any(|i| i.severity() == Severity::Error)
}

fn has_parent_cycle(all: &[Block], block: &Block) -> bool {
    let mut seen = HashSet::new();
    seen.insert(&block.id);

    let mut current = block.parent_id.as_ref();
    while let Some(parent_id) = current {
        if !seen.insert(parent_id) {
            return parent_id == &block.id;
        }
        current = find_block(all, parent_id).and_then(|b| b.parent_id.as_ref());
    }
    false
}
