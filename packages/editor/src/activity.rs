//! # Activity Log
//!
//! Bounded history of recent editor operations. Entries past the
//! capacity evict the oldest one. Every entry is mirrored to `tracing`
//! at debug level.

use chrono::{DateTime, Utc};
use pagecraft_model::BlockId;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::mutations::MutationKind;

pub const DEFAULT_ACTIVITY_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Succeeded,
    Failed,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub at: DateTime<Utc>,
    pub kind: MutationKind,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<BlockId>,
    pub message: String,
}

#[derive(Debug)]
pub struct ActivityLog {
    entries: Mutex<VecDeque<ActivityEntry>>,
    capacity: usize,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new(DEFAULT_ACTIVITY_CAPACITY)
    }
}

impl ActivityLog {
    /// A capacity of zero is treated as one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<ActivityEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn record(
        &self,
        kind: MutationKind,
        outcome: Outcome,
        block_id: Option<&BlockId>,
        message: impl Into<String>,
    ) {
        let entry = ActivityEntry {
            at: Utc::now(),
            kind,
            outcome,
            block_id: block_id.cloned(),
            message: message.into(),
        };

        debug!(
            kind = %entry.kind,
            outcome = ?entry.outcome,
            block_id = entry.block_id.as_ref().map(BlockId::as_str),
            "{}",
            entry.message
        );

        let mut entries = self.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Oldest first
    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.lock().iter().cloned().collect()
    }

    /// Newest first, at most `n`
    pub fn recent(&self, n: usize) -> Vec<ActivityEntry> {
        self.lock().iter().rev().take(n).cloned().collect()
    }

    pub fn failures(&self) -> Vec<ActivityEntry> {
        self.lock()
            .iter()
            .filter(|e| e.outcome != Outcome::Succeeded)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest_past_capacity() {
        let log = ActivityLog::new(3);
        for i in 0..5 {
            log.record(MutationKind::AddBlock, Outcome::Succeeded, None, format!("op {}", i));
        }

        let messages: Vec<_> = log.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["op 2", "op 3", "op 4"]);
        assert_eq!(log.len(), log.capacity());
    }

    #[test]
    fn test_recent_is_newest_first() {
        let log = ActivityLog::new(10);
        log.record(MutationKind::AddBlock, Outcome::Succeeded, None, "first");
        log.record(MutationKind::DeleteBlock, Outcome::Failed, None, "second");

        let recent = log.recent(1);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].message, "second");
        assert_eq!(log.failures().len(), 1);
    }

    #[test]
    fn test_zero_capacity_keeps_latest() {
        let log = ActivityLog::new(0);
        log.record(MutationKind::Refetch, Outcome::Succeeded, None, "a");
        log.record(MutationKind::Refetch, Outcome::Succeeded, None, "b");
        assert_eq!(log.entries()[0].message, "b");
    }
}
