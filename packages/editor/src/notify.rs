//! User-facing transient notifications (toasts)

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub level: NotificationLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Queue of undismissed notifications. The oldest is dropped when full.
#[derive(Debug)]
pub struct Notifications {
    queue: Mutex<VecDeque<Notification>>,
    capacity: usize,
    next_id: AtomicU64,
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_CAPACITY)
    }
}

impl Notifications {
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            next_id: AtomicU64::new(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Notification>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, level: NotificationLevel, message: impl Into<String>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut queue = self.lock();
        while queue.len() >= self.capacity {
            queue.pop_front();
        }
        queue.push_back(Notification {
            id,
            level,
            message: message.into(),
            at: Utc::now(),
        });
        id
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.push(NotificationLevel::Success, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.push(NotificationLevel::Warning, message)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(NotificationLevel::Error, message)
    }

    pub fn dismiss(&self, id: u64) -> bool {
        let mut queue = self.lock();
        let before = queue.len();
        queue.retain(|n| n.id != id);
        queue.len() != before
    }

    pub fn active(&self) -> Vec<Notification> {
        self.lock().iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<Notification> {
        self.lock().back().cloned()
    }

    pub fn errors(&self) -> Vec<Notification> {
        self.lock()
            .iter()
            .filter(|n| n.level == NotificationLevel::Error)
            .cloned()
            .collect()
    }

    /// Remove and return everything
    pub fn drain(&self) -> Vec<Notification> {
        self.lock().drain(..).collect()
    }
}
