// Application Layer - Use Cases and Business Logic

pub mod item;
pub mod notification;
pub mod pickup_request;
pub mod user;

// Re-exports
pub use item::{ItemService, NewItem};
pub use notification::{NotificationService, PersistedNotificationSink};
pub use pickup_request::{NewPickupRequest, PickupRequestService};
pub use user::{ExternalIdentity, IdentityMetadata, UserService};
