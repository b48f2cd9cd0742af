//! Notifications
//!
//! Fire-and-forget toasts raised by mutating commands and completions.
//! They are a side channel for the presentation layer and never part of
//! the store state.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            message: message.into(),
        }
    }
}

/// Sink for notifications
///
/// Implementations must not block: notifications are raised from inside
/// scheduled completions.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Emits notifications as tracing events
#[derive(Debug, Clone, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        info!(level = ?notification.level, "{}", notification.message);
    }
}

/// Forwards notifications into an unbounded channel
///
/// The receiving side (a shell, a test) drains them at its own pace.
/// Notifications raised after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: mpsc::UnboundedSender<Notification>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notification: Notification) {
        let _ = self.sender.send(notification);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_notifier_delivers_in_order() {
        let (notifier, mut receiver) = ChannelNotifier::new();
        notifier.notify(Notification::success("first"));
        notifier.notify(Notification::error("second"));

        assert_eq!(receiver.try_recv().unwrap(), Notification::success("first"));
        assert_eq!(receiver.try_recv().unwrap().level, NotificationLevel::Error);
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_channel_notifier_ignores_closed_receiver() {
        let (notifier, receiver) = ChannelNotifier::new();
        drop(receiver);
        notifier.notify(Notification::info("nobody listening"));
    }
}
