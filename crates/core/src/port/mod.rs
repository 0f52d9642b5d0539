// Port Layer - Interfaces for external dependencies

pub mod id_provider; // For deterministic testing
pub mod item_repository;
pub mod notification;
pub mod pickup_request_repository;
pub mod time_provider;
pub mod transaction;
pub mod unconfigured;
pub mod user_repository;

// Re-exports
pub use id_provider::IdProvider;
pub use item_repository::{ItemRepository, TransactionRepository};
pub use notification::{NotificationRepository, NotificationSink};
pub use pickup_request_repository::PickupRequestRepository;
pub use time_provider::TimeProvider;
pub use transaction::{ItemRepositoryTransaction, StoreTransaction, TransactionalItemRepository};
pub use unconfigured::UnconfiguredStore;
pub use user_repository::UserRepository;

use std::sync::Arc;

/// Every persistence port, as wired by the composition root
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub items: Arc<dyn ItemRepository>,
    pub item_transactions: Arc<dyn TransactionalItemRepository>,
    pub transactions: Arc<dyn TransactionRepository>,
    pub pickup_requests: Arc<dyn PickupRequestRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
}

impl Repositories {
    /// All ports backed by [`UnconfiguredStore`]
    pub fn unconfigured() -> Self {
        let store = Arc::new(UnconfiguredStore);
        Self {
            users: store.clone(),
            items: store.clone(),
            item_transactions: store.clone(),
            transactions: store.clone(),
            pickup_requests: store.clone(),
            notifications: store,
        }
    }
}
