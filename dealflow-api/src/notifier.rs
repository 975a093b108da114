//! Notifier that forwards service notifications to the log.

use dealflow_core::{Notification, NotificationLevel, Notifier};

/// Emits every notification as a `tracing` event at a matching level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let message = notification.message.as_str();
        match notification.level {
            NotificationLevel::Info | NotificationLevel::Success => {
                tracing::info!(kind = %notification.level, "{}", message)
            }
            NotificationLevel::Warning => {
                tracing::warn!(kind = %notification.level, "{}", message)
            }
            NotificationLevel::Error => {
                tracing::error!(kind = %notification.level, "{}", message)
            }
        }
    }
}
