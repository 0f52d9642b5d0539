// Domain Layer - Pure business logic and entities

pub mod error;
pub mod item;
pub mod notification;
pub mod pickup_request;
pub mod transaction;
pub mod user;

// Re-exports
pub use error::DomainError;
pub use item::{AcceptedItem, Item, ItemId, ItemListing, ItemStatus};
pub use notification::{NewNotification, Notification, NotificationId, NotificationKind};
pub use pickup_request::{PickupRequest, PickupRequestId, PickupRequestListing, PickupStatus};
pub use transaction::{Transaction, TransactionId};
pub use user::{Actor, UpsertUser, User, UserId, UserRole};
