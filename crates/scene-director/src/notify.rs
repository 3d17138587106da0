//! Transient user notifications with a fixed auto-expiry window.
//!
//! `notify` replaces any pending notification and restarts the countdown;
//! the expiry task clears the slot only if no newer notification has
//! superseded it. Pure timer discipline, no business logic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// How long a notification stays visible unless superseded.
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

/// One ephemeral user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub text: String,
    pub kind: NotificationKind,
}

/// Shared notification slot with self-expiring entries.
#[derive(Clone)]
pub struct Notifier {
    slot: Arc<Mutex<Option<Notification>>>,
    seq: Arc<AtomicU64>,
    ttl: Duration,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::with_ttl(NOTIFICATION_TTL)
    }
}

impl Notifier {
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
            seq: Arc::new(AtomicU64::new(0)),
            ttl,
        }
    }

    /// Replace any pending notification and restart the expiry countdown.
    pub async fn notify(&self, text: impl Into<String>, kind: NotificationKind) {
        let id = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        *self.slot.lock().await = Some(Notification {
            text: text.into(),
            kind,
        });

        let slot = Arc::clone(&self.slot);
        let seq = Arc::clone(&self.seq);
        let ttl = self.ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            // A newer notification owns the slot now; leave it alone.
            if seq.load(Ordering::SeqCst) == id {
                slot.lock().await.take();
            }
        });
    }

    pub async fn error(&self, text: impl Into<String>) {
        self.notify(text, NotificationKind::Error).await;
    }

    /// The currently visible notification, if any.
    pub async fn current(&self) -> Option<Notification> {
        self.slot.lock().await.clone()
    }

    /// Total notifications emitted so far. Test support.
    #[cfg(test)]
    pub fn emitted(&self) -> u64 {
        self.seq.load(Ordering::SeqCst)
    }
}
