//! User-facing success/error notifications

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;
use tracing::{error, info};

/// A notification raised by a reorder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", content = "message", rename_all = "lowercase")]
pub enum Notification {
    Success(String),
    Error(String),
}

impl Notification {
    pub fn message(&self) -> &str {
        match self {
            Self::Success(message) | Self::Error(message) => message,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

/// Sink for notifications, implemented by the host UI
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Writes notifications to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!(target: "kanban_reorder::notify", "{message}");
    }

    fn error(&self, message: &str) {
        error!(target: "kanban_reorder::notify", "{message}");
    }
}

/// Keeps every notification in order until drained
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    items: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything received so far
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn push(&self, notification: Notification) {
        self.lock().push(notification);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Notification>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Notifier for NotificationQueue {
    fn success(&self, message: &str) {
        self.push(Notification::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(Notification::Error(message.to_string()));
    }
}

/// Fans notifications out to any number of receivers.
///
/// Sending with no live receivers is not an error; the notification is
/// simply dropped.
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    sender: broadcast::Sender<Notification>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to notifications sent from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    fn send(&self, notification: Notification) {
        let _ = self.sender.send(notification);
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Notifier for BroadcastNotifier {
    fn success(&self, message: &str) {
        self.send(Notification::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.send(Notification::Error(message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_queue_keeps_order_and_drains() {
        let queue = NotificationQueue::new();
        queue.success("SUCCESS: List moved.");
        queue.error("ERROR: Failed to move list: offline");

        assert_eq!(queue.len(), 2);
        let drained = queue.drain();
        assert_eq!(
            drained,
            vec![
                Notification::Success("SUCCESS: List moved.".into()),
                Notification::Error("ERROR: Failed to move list: offline".into()),
            ]
        );
        assert!(drained[1].is_error());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_notification_wire_shape() {
        let json = serde_json::to_value(Notification::Error("boom".into())).unwrap();
        assert_eq!(json, serde_json::json!({"level": "error", "message": "boom"}));
    }

    #[tokio::test]
    async fn test_broadcast_reaches_subscribers() {
        let notifier = BroadcastNotifier::default();
        let mut rx = notifier.subscribe();
        notifier.success("done");
        assert_eq!(rx.recv().await.unwrap(), Notification::Success("done".into()));
    }

    #[test]
    fn test_broadcast_without_receivers() {
        BroadcastNotifier::new(4).error("nobody listening");
    }

    #[traced_test]
    #[test]
    fn test_tracing_notifier_logs() {
        TracingNotifier.error("ERROR: Failed to move card: offline");
        assert!(logs_contain("Failed to move card: offline"));
    }
}
