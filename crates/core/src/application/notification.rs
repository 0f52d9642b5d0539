// Notification delivery and inbox use cases

use crate::domain::{Actor, NewNotification, Notification};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, NotificationRepository, NotificationSink, TimeProvider};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Best-effort delivery: a failing sink never fails the calling use case
pub(crate) async fn deliver(sink: &dyn NotificationSink, notification: NewNotification) {
    let user_id = notification.user_id.clone();
    let kind = notification.kind;

    if let Err(e) = sink.notify(notification).await {
        warn!(
            error = %e,
            user_id = %user_id,
            kind = %kind,
            "Notification delivery failed (ignored)"
        );
    }
}

/// Sink that stores notifications in the `notifications` table
pub struct PersistedNotificationSink {
    repo: Arc<dyn NotificationRepository>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl PersistedNotificationSink {
    pub fn new(
        repo: Arc<dyn NotificationRepository>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            repo,
            id_provider,
            time_provider,
        }
    }
}

#[async_trait]
impl NotificationSink for PersistedNotificationSink {
    async fn notify(&self, notification: NewNotification) -> Result<()> {
        let stored = Notification {
            id: self.id_provider.generate_id("notif"),
            user_id: notification.user_id,
            title: notification.title,
            message: notification.message,
            kind: notification.kind,
            related_id: notification.related_id,
            is_read: false,
            created_at: self.time_provider.now_millis(),
        };

        let stored = self.repo.create_notification(&stored).await?;
        debug!(
            notification_id = %stored.id,
            user_id = %stored.user_id,
            kind = %stored.kind,
            "Notification stored"
        );
        Ok(())
    }
}

/// Inbox use cases for the acting user
pub struct NotificationService {
    repo: Arc<dyn NotificationRepository>,
}

impl NotificationService {
    pub fn new(repo: Arc<dyn NotificationRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self, actor: &Actor) -> Result<Vec<Notification>> {
        self.repo.get_notifications(&actor.user_id).await
    }

    pub async fn unread_count(&self, actor: &Actor) -> Result<i64> {
        self.repo.get_unread_count(&actor.user_id).await
    }

    pub async fn mark_as_read(&self, actor: &Actor, notification_id: &str) -> Result<Notification> {
        let notification = self
            .repo
            .get_notification(notification_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Notification {} not found", notification_id))
            })?;

        if notification.user_id != actor.user_id {
            return Err(AppError::Forbidden(format!(
                "Notification {} belongs to another user",
                notification_id
            )));
        }

        self.repo.mark_notification_as_read(notification_id).await
    }

    pub async fn mark_all_as_read(&self, actor: &Actor) -> Result<u64> {
        self.repo.mark_all_as_read(&actor.user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NotificationKind;
    use crate::port::notification::MockNotificationSink;

    #[tokio::test]
    async fn test_deliver_swallows_sink_errors() {
        let mut sink = MockNotificationSink::new();
        sink.expect_notify()
            .times(1)
            .returning(|_| Err(AppError::Internal("push gateway down".to_string())));

        // Must return normally
        deliver(
            &sink,
            NewNotification::new("customer_1", NotificationKind::ItemAccepted, "t", "m"),
        )
        .await;
    }

    #[tokio::test]
    async fn test_deliver_passes_notification_through() {
        let mut sink = MockNotificationSink::new();
        sink.expect_notify()
            .withf(|n| n.user_id == "dealer_1" && n.related_id.as_deref() == Some("pickup_1"))
            .times(1)
            .returning(|_| Ok(()));

        deliver(
            &sink,
            NewNotification::new("dealer_1", NotificationKind::OfferAccepted, "t", "m")
                .related_to("pickup_1"),
        )
        .await;
    }

    #[tokio::test]
    async fn test_inbox_without_database() {
        let service = NotificationService::new(Arc::new(crate::port::UnconfiguredStore));
        let result = service.unread_count(&Actor::customer("c")).await;
        tokio_test::assert_err!(result);
    }
}
