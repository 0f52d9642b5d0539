// Wires every SQLite adapter onto one pool

use crate::{
    SqliteItemRepository, SqliteNotificationRepository, SqlitePickupRequestRepository,
    SqliteUserRepository,
};
use sajilo_core::port::{Repositories, TimeProvider};
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct SqliteStore;

impl SqliteStore {
    /// Build the full port set over a migrated pool
    pub fn repositories(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Repositories {
        let items = Arc::new(SqliteItemRepository::new(
            pool.clone(),
            time_provider.clone(),
        ));

        Repositories {
            users: Arc::new(SqliteUserRepository::new(
                pool.clone(),
                time_provider.clone(),
            )),
            items: items.clone(),
            item_transactions: items.clone(),
            transactions: items,
            pickup_requests: Arc::new(SqlitePickupRequestRepository::new(
                pool.clone(),
                time_provider,
            )),
            notifications: Arc::new(SqliteNotificationRepository::new(pool)),
        }
    }
}
