use crate::notify::Notifier;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
    Warning,
    Info,
}

/// Transient notification. A toast is created, stays visible until dismissed
/// explicitly or by its timer, and is then gone for good.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: Uuid,
    pub level: ToastLevel,
    pub title: String,
    pub description: Option<String>,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct ToastOptions {
    pub level: ToastLevel,
    pub title: String,
    pub description: Option<String>,
    /// Explicit override; otherwise the level picks the store default.
    pub duration: Option<Duration>,
}

#[derive(Debug, Clone)]
pub struct ToastConfig {
    pub max_visible: usize,
    pub default_duration: Duration,
    /// Errors stay up longer than the rest.
    pub error_duration: Duration,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            max_visible: 3,
            default_duration: Duration::from_secs(5),
            error_duration: Duration::from_secs(10),
        }
    }
}

/// Bounded toast queue with per-toast auto-dismiss timers.
///
/// Each timer is tracked by toast id so it can be aborted individually (on
/// dismiss or eviction) or in bulk (on teardown). A zero duration makes a
/// toast sticky.
#[derive(Clone)]
pub struct ToastStore {
    inner: Arc<RwLock<ToastInner>>,
    config: ToastConfig,
    notifier: Notifier,
}

#[derive(Default)]
struct ToastInner {
    toasts: Vec<Toast>,
    timers: HashMap<Uuid, JoinHandle<()>>,
}

impl ToastStore {
    pub fn new(config: ToastConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ToastInner::default())),
            config,
            notifier: Notifier::new(),
        }
    }

    pub fn subscribe(&self) -> UnboundedReceiver<()> {
        self.notifier.subscribe()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.inner.read().toasts.clone()
    }

    /// Append a toast, evicting the oldest one (timer included) when the
    /// queue is full, and schedule auto-dismiss for positive durations.
    pub fn push(&self, options: ToastOptions) -> Uuid {
        let duration = options.duration.unwrap_or(match options.level {
            ToastLevel::Error => self.config.error_duration,
            _ => self.config.default_duration,
        });
        let toast = Toast {
            id: Uuid::new_v4(),
            level: options.level,
            title: options.title,
            description: options.description,
            duration,
        };
        let id = toast.id;
        let evicted = {
            let mut inner = self.inner.write();
            let evicted = if inner.toasts.len() >= self.config.max_visible {
                let oldest = inner.toasts.remove(0);
                inner.timers.remove(&oldest.id)
            } else {
                None
            };
            inner.toasts.push(toast);
            if !duration.is_zero() {
                let store = self.clone();
                inner.timers.insert(
                    id,
                    tokio::spawn(async move {
                        tokio::time::sleep(duration).await;
                        store.dismiss(id);
                    }),
                );
            }
            evicted
        };
        if let Some(timer) = evicted {
            timer.abort();
        }
        self.notifier.notify();
        id
    }

    pub fn success(&self, title: impl Into<String>, description: Option<String>) -> Uuid {
        self.push_with_level(ToastLevel::Success, title.into(), description)
    }

    pub fn error(&self, title: impl Into<String>, description: Option<String>) -> Uuid {
        self.push_with_level(ToastLevel::Error, title.into(), description)
    }

    pub fn warning(&self, title: impl Into<String>, description: Option<String>) -> Uuid {
        self.push_with_level(ToastLevel::Warning, title.into(), description)
    }

    pub fn info(&self, title: impl Into<String>, description: Option<String>) -> Uuid {
        self.push_with_level(ToastLevel::Info, title.into(), description)
    }

    /// Remove a toast and abort its timer. Already-removed ids are a no-op.
    pub fn dismiss(&self, id: Uuid) {
        let (removed, timer) = {
            let mut inner = self.inner.write();
            let timer = inner.timers.remove(&id);
            let before = inner.toasts.len();
            inner.toasts.retain(|toast| toast.id != id);
            (inner.toasts.len() != before, timer)
        };
        if let Some(timer) = timer {
            timer.abort();
        }
        if removed {
            self.notifier.notify();
        }
    }

    pub fn dismiss_all(&self) {
        let timers = {
            let mut inner = self.inner.write();
            inner.toasts.clear();
            std::mem::take(&mut inner.timers)
        };
        for timer in timers.into_values() {
            timer.abort();
        }
        self.notifier.notify();
    }

    /// Teardown: no timer may outlive the store and fire against a UI that is
    /// gone.
    pub fn dispose(&self) {
        self.dismiss_all();
    }

    fn push_with_level(&self, level: ToastLevel, title: String, description: Option<String>) -> Uuid {
        self.push(ToastOptions {
            level,
            title,
            description,
            duration: None,
        })
    }
}
