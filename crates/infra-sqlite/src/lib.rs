// Sajilo Infrastructure - SQLite Persistence Gateway
// Implements every repository port of sajilo-core, one SQL statement per operation

mod connection;
mod error;
mod item_repository;
mod migration;
mod notification_repository;
mod pickup_request_repository;
mod store;
mod transaction;
mod user_repository;

pub use connection::{create_pool, create_pool_with, PoolSettings, DEFAULT_MAX_CONNECTIONS};
pub use item_repository::SqliteItemRepository;
pub use migration::run_migrations;
pub use notification_repository::SqliteNotificationRepository;
pub use pickup_request_repository::SqlitePickupRequestRepository;
pub use store::SqliteStore;
pub use transaction::SqliteItemTransaction;
pub use user_repository::SqliteUserRepository;

// Note: sqlx::Error conversion is handled by wrapping in helper functions
// due to Rust's orphan rules (cannot implement From<sqlx::Error> for AppError here)
