// Timed, typed user notifications ("toasts").
//
// Every notification starts `Active` and ends `Dismissed`, either when its
// own timer fires or when it is dismissed explicitly. Expiry is enforced both
// by a per-notification tokio task (when a runtime is available) and lazily on
// every read, so the queue never reports a notification past its deadline.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::task::AbortHandle;
use tokio::time::Instant;

/// Default lifetime of a notification.
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(5);

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    pub fn title(&self) -> &'static str {
        match self {
            NotificationKind::Success => "Success",
            NotificationKind::Error => "Error",
            NotificationKind::Warning => "Warning",
            NotificationKind::Info => "Information",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            NotificationKind::Success => "✓",
            NotificationKind::Error => "✕",
            NotificationKind::Warning => "⚠",
            NotificationKind::Info => "ℹ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub u64);

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    Expired,
    Dismissed,
}

/// Change feed for renderers.
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    Shown(Notification),
    Dismissed {
        id: NotificationId,
        reason: DismissReason,
    },
}

#[derive(Debug)]
struct Entry {
    notification: Notification,
    expires_at: Instant,
    timer: Option<AbortHandle>,
}

#[derive(Debug)]
struct Inner {
    queue: Mutex<Vec<Entry>>,
    ttl: Duration,
    next_id: AtomicU64,
    events: broadcast::Sender<NotificationEvent>,
}

impl Inner {
    fn remove(&self, id: NotificationId, reason: DismissReason) -> bool {
        let removed = {
            let mut queue = self.queue.lock();
            queue
                .iter()
                .position(|entry| entry.notification.id == id)
                .map(|index| queue.remove(index))
        };

        match removed {
            Some(entry) => {
                if reason == DismissReason::Dismissed {
                    if let Some(timer) = entry.timer {
                        timer.abort();
                    }
                }
                let _ = self.events.send(NotificationEvent::Dismissed { id, reason });
                true
            }
            None => false,
        }
    }

    fn purge_expired(&self) {
        let now = Instant::now();
        let expired: Vec<Entry> = {
            let mut queue = self.queue.lock();
            let (expired, active): (Vec<Entry>, Vec<Entry>) =
                queue.drain(..).partition(|entry| entry.expires_at <= now);
            *queue = active;
            expired
        };

        for entry in expired {
            if let Some(timer) = entry.timer {
                timer.abort();
            }
            let _ = self.events.send(NotificationEvent::Dismissed {
                id: entry.notification.id,
                reason: DismissReason::Expired,
            });
        }
    }
}

/// In-memory notification queue shared by every screen.
#[derive(Debug, Clone)]
pub struct NotificationCenter {
    inner: Arc<Inner>,
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                queue: Mutex::new(Vec::new()),
                ttl,
                next_id: AtomicU64::new(1),
                events,
            }),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_NOTIFICATION_TTL)
    }

    pub fn ttl(&self) -> Duration {
        self.inner.ttl
    }

    /// Enqueue a notification and schedule its expiry. Never blocks.
    pub fn notify(&self, message: impl Into<String>, kind: NotificationKind) -> NotificationId {
        let id = NotificationId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let notification = Notification {
            id,
            message: message.into(),
            kind,
            created_at: Utc::now(),
        };
        let expires_at = Instant::now() + self.inner.ttl;

        self.inner.queue.lock().push(Entry {
            notification: notification.clone(),
            expires_at,
            timer: None,
        });
        tracing::debug!(%id, ?kind, message = %notification.message, "notification shown");
        let _ = self.inner.events.send(NotificationEvent::Shown(notification));

        if let Some(timer) = spawn_expiry(Arc::downgrade(&self.inner), id, expires_at) {
            let mut queue = self.inner.queue.lock();
            match queue.iter_mut().find(|entry| entry.notification.id == id) {
                Some(entry) => entry.timer = Some(timer),
                None => timer.abort(),
            }
        }

        id
    }

    pub fn success(&self, message: impl Into<String>) -> NotificationId {
        self.notify(message, NotificationKind::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> NotificationId {
        self.notify(message, NotificationKind::Error)
    }

    pub fn warning(&self, message: impl Into<String>) -> NotificationId {
        self.notify(message, NotificationKind::Warning)
    }

    pub fn info(&self, message: impl Into<String>) -> NotificationId {
        self.notify(message, NotificationKind::Info)
    }

    /// Dismiss an active notification. Returns `false` when it was already gone.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        self.inner.purge_expired();
        self.inner.remove(id, DismissReason::Dismissed)
    }

    /// Active notifications in creation order.
    pub fn active(&self) -> Vec<Notification> {
        self.inner.purge_expired();
        self.inner
            .queue
            .lock()
            .iter()
            .map(|entry| entry.notification.clone())
            .collect()
    }

    pub fn is_active(&self, id: NotificationId) -> bool {
        self.active().iter().any(|n| n.id == id)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.inner.events.subscribe()
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::with_defaults()
    }
}

fn spawn_expiry(inner: Weak<Inner>, id: NotificationId, deadline: Instant) -> Option<AbortHandle> {
    let handle = tokio::runtime::Handle::try_current().ok()?;
    let task = handle.spawn(async move {
        tokio::time::sleep_until(deadline).await;
        if let Some(inner) = inner.upgrade() {
            if inner.remove(id, DismissReason::Expired) {
                tracing::debug!(%id, "notification expired");
            }
        }
    });
    Some(task.abort_handle())
}
