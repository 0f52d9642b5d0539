// Notification Domain Model

use crate::domain::error::{DomainError, Result};
use crate::domain::user::UserId;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Notification ID (`notif_<millis>_<suffix>`)
pub type NotificationId = String;

/// What happened; stored in the `type` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    ItemAccepted,
    RiderAssigned,
    ItemPickedUp,
    ItemCompleted,
    OfferReceived,
    OfferAccepted,
    PickupAssigned,
    PickupCompleted,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::ItemAccepted => "item_accepted",
            NotificationKind::RiderAssigned => "rider_assigned",
            NotificationKind::ItemPickedUp => "item_picked_up",
            NotificationKind::ItemCompleted => "item_completed",
            NotificationKind::OfferReceived => "offer_received",
            NotificationKind::OfferAccepted => "offer_accepted",
            NotificationKind::PickupAssigned => "pickup_assigned",
            NotificationKind::PickupCompleted => "pickup_completed",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "item_accepted" => Ok(NotificationKind::ItemAccepted),
            "rider_assigned" => Ok(NotificationKind::RiderAssigned),
            "item_picked_up" => Ok(NotificationKind::ItemPickedUp),
            "item_completed" => Ok(NotificationKind::ItemCompleted),
            "offer_received" => Ok(NotificationKind::OfferReceived),
            "offer_accepted" => Ok(NotificationKind::OfferAccepted),
            "pickup_assigned" => Ok(NotificationKind::PickupAssigned),
            "pickup_completed" => Ok(NotificationKind::PickupCompleted),
            other => Err(DomainError::ValidationError(format!(
                "unknown notification type: {other}"
            ))),
        }
    }
}

/// Stored notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub related_id: Option<String>,
    pub is_read: bool,
    pub created_at: i64, // epoch ms
}

/// Notification as raised by a use case, before id/time assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: UserId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub related_id: Option<String>,
}

impl NewNotification {
    pub fn new(
        user_id: impl Into<String>,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            title: title.into(),
            message: message.into(),
            kind,
            related_id: None,
        }
    }

    pub fn related_to(mut self, related_id: impl Into<String>) -> Self {
        self.related_id = Some(related_id.into());
        self
    }
}
