// Item Repository Port (Interface)

use crate::domain::{Item, ItemListing, Transaction};
use crate::error::Result;
use async_trait::async_trait;

/// Repository interface for Item reads and inserts.
///
/// Status transitions run through [`crate::port::ItemRepositoryTransaction`].
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Insert a new item; returns the stored row
    async fn create_item(&self, item: &Item) -> Result<Item>;

    /// Find item by ID
    async fn get_item(&self, id: &str) -> Result<Option<Item>>;

    /// Items still open for dealers, joined with the poster's name
    async fn get_available_items(&self) -> Result<Vec<ItemListing>>;

    /// Items posted by a customer
    async fn get_items_by_user(&self, user_id: &str) -> Result<Vec<Item>>;

    /// Items accepted by a dealer
    async fn get_items_by_dealer(&self, dealer_id: &str) -> Result<Vec<Item>>;

    /// Items assigned to a rider
    async fn get_items_by_rider(&self, rider_id: &str) -> Result<Vec<Item>>;
}

/// Read access to transaction rows
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Transactions where the user is customer, dealer or rider
    async fn get_transactions_for_user(&self, user_id: &str) -> Result<Vec<Transaction>>;

    /// The transaction recorded for an item, if accepted
    async fn get_transaction_for_item(&self, item_id: &str) -> Result<Option<Transaction>>;
}
