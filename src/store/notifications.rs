//! Notification Queue Module
//!
//! Short-lived user messages, each with its own auto-dismiss timer.

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tokio::task::AbortHandle;
use tracing::debug;

use crate::clock::SharedClock;

/// Lifetime used when a notification does not specify one.
pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

// == Notification ==
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
    /// Zero means the notification stays until dismissed
    pub duration: Duration,
}

struct Slot {
    notification: Notification,
    timer: Option<AbortHandle>,
}

#[derive(Default)]
struct QueueInner {
    next_id: u64,
    slots: Vec<Slot>,
}

impl QueueInner {
    fn take(&mut self, id: u64) -> Option<Slot> {
        let index = self.slots.iter().position(|s| s.notification.id == id)?;
        Some(self.slots.remove(index))
    }
}

// == Notification Queue ==
/// Cloneable handle to a queue of transient notifications.
///
/// Timers run as tokio tasks holding only a weak reference, so a dropped
/// queue lets them lapse quietly.
#[derive(Clone)]
pub struct NotificationQueue {
    inner: Arc<Mutex<QueueInner>>,
    clock: SharedClock,
    default_duration: Duration,
}

impl NotificationQueue {
    pub fn new(clock: SharedClock, default_duration: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(QueueInner::default())),
            clock,
            default_duration,
        }
    }

    // == Push ==
    /// Appends a notification and schedules its removal.
    ///
    /// `None` uses the queue's default lifetime. Must be called from within
    /// a tokio runtime.
    pub fn push(
        &self,
        kind: NotificationKind,
        message: impl Into<String>,
        duration: Option<Duration>,
    ) -> u64 {
        let duration = duration.unwrap_or(self.default_duration);

        let id = {
            let mut inner = self.inner.lock();
            inner.next_id += 1;
            let id = inner.next_id;
            inner.slots.push(Slot {
                notification: Notification {
                    id,
                    kind,
                    message: message.into(),
                    created_at: self.clock.now(),
                    duration,
                },
                timer: None,
            });
            id
        };

        if !duration.is_zero() {
            let timer = spawn_expiry(Arc::downgrade(&self.inner), id, duration);
            let mut inner = self.inner.lock();
            match inner.slots.iter_mut().find(|s| s.notification.id == id) {
                Some(slot) => slot.timer = Some(timer),
                None => timer.abort(),
            }
        }

        id
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Info, message, None)
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Success, message, None)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Warning, message, None)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(NotificationKind::Error, message, None)
    }

    // == Dismiss ==
    /// Removes a notification now and cancels its timer.
    ///
    /// Returns false if it was already gone.
    pub fn dismiss(&self, id: u64) -> bool {
        let slot = self.inner.lock().take(id);
        match slot {
            Some(slot) => {
                if let Some(timer) = slot.timer {
                    timer.abort();
                }
                true
            }
            None => false,
        }
    }

    /// Dismisses everything.
    pub fn clear(&self) {
        let slots = std::mem::take(&mut self.inner.lock().slots);
        for timer in slots.into_iter().filter_map(|s| s.timer) {
            timer.abort();
        }
    }

    /// Snapshot of the live notifications in insertion order.
    pub fn active(&self) -> Vec<Notification> {
        self.inner
            .lock()
            .slots
            .iter()
            .map(|s| s.notification.clone())
            .collect()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.inner.lock().slots.iter().any(|s| s.notification.id == id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().slots.is_empty()
    }
}

impl std::fmt::Debug for NotificationQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationQueue")
            .field("active", &self.len())
            .field("default_duration", &self.default_duration)
            .finish()
    }
}

fn spawn_expiry(inner: Weak<Mutex<QueueInner>>, id: u64, after: Duration) -> AbortHandle {
    tokio::spawn(async move {
        tokio::time::sleep(after).await;
        if let Some(inner) = inner.upgrade() {
            if inner.lock().take(id).is_some() {
                debug!(id, "notification expired");
            }
        }
    })
    .abort_handle()
}
