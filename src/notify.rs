//! Transient notifications.
//!
//! The HTTP client publishes errors here and the UI drains them into a toast
//! area, so every failure is shown the same way no matter which call raised it.

use std::collections::VecDeque;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// How long a toast stays on screen.
pub const TOAST_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub text: String,
}

impl Notification {
    pub fn success(text: impl Into<String>) -> Self {
        Self { level: Level::Success, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { level: Level::Error, text: text.into() }
    }
}

/// Cloneable sending half handed to anything that needs to raise a toast.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: UnboundedSender<Notification>,
}

impl Notifier {
    pub fn channel() -> (Self, Toasts) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, Toasts::new(rx))
    }

    pub fn send(&self, notification: Notification) {
        // Receiver gone means the UI has shut down.
        let _ = self.tx.send(notification);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.send(Notification::error(text));
    }

    pub fn success(&self, text: impl Into<String>) {
        self.send(Notification::success(text));
    }
}

#[derive(Debug)]
struct Toast {
    notification: Notification,
    shown_at: Instant,
}

/// Receiving half: the visible toast stack.
#[derive(Debug)]
pub struct Toasts {
    rx: UnboundedReceiver<Notification>,
    visible: VecDeque<Toast>,
    ttl: Duration,
}

impl Toasts {
    fn new(rx: UnboundedReceiver<Notification>) -> Self {
        Self { rx, visible: VecDeque::new(), ttl: TOAST_TTL }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Pull pending notifications and drop expired ones.
    pub fn tick(&mut self, now: Instant) {
        while let Ok(notification) = self.rx.try_recv() {
            self.visible.push_back(Toast { notification, shown_at: now });
        }
        let ttl = self.ttl;
        self.visible.retain(|t| now.duration_since(t.shown_at) < ttl);
    }

    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.visible.iter().map(|t| &t.notification)
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toasts_show_sent_notifications_in_order() {
        let (notifier, mut toasts) = Notifier::channel();
        notifier.error("boom");
        notifier.success("posted");

        toasts.tick(Instant::now());
        let shown: Vec<_> = toasts.visible().cloned().collect();
        assert_eq!(shown, vec![Notification::error("boom"), Notification::success("posted")]);
    }

    #[test]
    fn test_toasts_expire_after_ttl() {
        let (notifier, toasts) = Notifier::channel();
        let mut toasts = toasts.with_ttl(Duration::from_millis(50));
        let start = Instant::now();
        notifier.error("transient");

        toasts.tick(start);
        assert!(!toasts.is_empty());

        toasts.tick(start + Duration::from_millis(60));
        assert!(toasts.is_empty());
    }

    #[test]
    fn test_sending_after_ui_shutdown_is_harmless() {
        let (notifier, toasts) = Notifier::channel();
        drop(toasts);
        notifier.error("nobody listening");
    }
}
