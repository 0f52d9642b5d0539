// Store transaction port for atomic multi-step item writes

use crate::domain::{Item, ItemStatus, Transaction};
use crate::error::Result;
use async_trait::async_trait;

/// Store transaction for atomic multi-step operations
#[async_trait]
pub trait StoreTransaction: Send {
    /// Commit the transaction
    async fn commit(self: Box<Self>) -> Result<()>;

    /// Rollback the transaction
    async fn rollback(self: Box<Self>) -> Result<()>;
}

/// Transactional item operations
#[async_trait]
pub trait TransactionalItemRepository: Send + Sync {
    /// Begin a new store transaction
    async fn begin_transaction(&self) -> Result<Box<dyn ItemRepositoryTransaction>>;
}

/// Guarded item writes within a store transaction.
///
/// Every status write is a conditional update on the expected prior state.
/// Zero affected rows surface as NotFound, Conflict or InvalidState.
#[async_trait]
pub trait ItemRepositoryTransaction: StoreTransaction {
    /// `available -> accepted`, setting `dealer_id`
    async fn accept_item(&mut self, item_id: &str, dealer_id: &str) -> Result<Item>;

    /// Record the customer/dealer link for an accepted item
    async fn create_transaction(&mut self, transaction: &Transaction) -> Result<Transaction>;

    /// Set `rider_id` on an accepted item owned by `dealer_id` (status unchanged)
    async fn assign_rider(&mut self, item_id: &str, dealer_id: &str, rider_id: &str)
        -> Result<Item>;

    /// `from -> to`, only when the row currently holds `from`
    async fn update_item_status(
        &mut self,
        item_id: &str,
        from: ItemStatus,
        to: ItemStatus,
    ) -> Result<Item>;

    /// Copy the item's rider and status onto its transaction row
    async fn sync_transaction(&mut self, item: &Item) -> Result<()>;
}
