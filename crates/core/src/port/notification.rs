// Notification Ports

use crate::domain::{NewNotification, Notification};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for stored notifications
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    async fn create_notification(&self, notification: &Notification) -> Result<Notification>;

    async fn get_notification(&self, id: &str) -> Result<Option<Notification>>;

    /// Newest first
    async fn get_notifications(&self, user_id: &str) -> Result<Vec<Notification>>;

    async fn get_unread_count(&self, user_id: &str) -> Result<i64>;

    /// Idempotent: marking an already-read notification succeeds
    async fn mark_notification_as_read(&self, id: &str) -> Result<Notification>;

    /// Returns how many notifications flipped to read
    async fn mark_all_as_read(&self, user_id: &str) -> Result<u64>;
}

/// Notification delivery (persisted, pushed, ...).
///
/// Both item and pickup-request flows raise notifications through this port.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, notification: NewNotification) -> Result<()>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Records every notification; optionally fails each delivery
    #[derive(Default)]
    pub struct RecordingNotificationSink {
        sent: Mutex<Vec<NewNotification>>,
        fail: bool,
    }

    impl RecordingNotificationSink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub fn sent(&self) -> Vec<NewNotification> {
            self.sent.lock().unwrap().clone()
        }

        pub fn sent_to(&self, user_id: &str) -> Vec<NewNotification> {
            self.sent()
                .into_iter()
                .filter(|n| n.user_id == user_id)
                .collect()
        }
    }

    #[async_trait]
    impl NotificationSink for RecordingNotificationSink {
        async fn notify(&self, notification: NewNotification) -> Result<()> {
            self.sent.lock().unwrap().push(notification);
            if self.fail {
                return Err(crate::error::AppError::Internal(
                    "push gateway unavailable".to_string(),
                ));
            }
            Ok(())
        }
    }
}
