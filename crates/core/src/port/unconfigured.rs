// Store adapter used when no database URL is configured.
//
// Every call fails with a configuration error instead of crashing the process.

use crate::domain::{
    Item, ItemListing, Notification, PickupRequest, PickupRequestListing, Transaction, UpsertUser,
    User, UserRole,
};
use crate::error::{AppError, Result};
use crate::port::{
    ItemRepository, ItemRepositoryTransaction, NotificationRepository, PickupRequestRepository,
    TransactionRepository, TransactionalItemRepository, UserRepository,
};
use async_trait::async_trait;
use rust_decimal::Decimal;

#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredStore;

fn fail<T>() -> Result<T> {
    tracing::error!("Persistence call rejected: database not configured");
    Err(AppError::not_configured())
}

#[async_trait]
impl UserRepository for UnconfiguredStore {
    async fn upsert_user(&self, _data: &UpsertUser) -> Result<User> {
        fail()
    }
    async fn get_user(&self, _id: &str) -> Result<Option<User>> {
        fail()
    }
    async fn get_users_by_role(&self, _role: UserRole) -> Result<Vec<User>> {
        fail()
    }
    async fn update_user_role(&self, _id: &str, _role: UserRole) -> Result<User> {
        fail()
    }
    async fn delete_user(&self, _id: &str) -> Result<bool> {
        fail()
    }
}

#[async_trait]
impl ItemRepository for UnconfiguredStore {
    async fn create_item(&self, _item: &Item) -> Result<Item> {
        fail()
    }
    async fn get_item(&self, _id: &str) -> Result<Option<Item>> {
        fail()
    }
    async fn get_available_items(&self) -> Result<Vec<ItemListing>> {
        fail()
    }
    async fn get_items_by_user(&self, _user_id: &str) -> Result<Vec<Item>> {
        fail()
    }
    async fn get_items_by_dealer(&self, _dealer_id: &str) -> Result<Vec<Item>> {
        fail()
    }
    async fn get_items_by_rider(&self, _rider_id: &str) -> Result<Vec<Item>> {
        fail()
    }
}

#[async_trait]
impl TransactionalItemRepository for UnconfiguredStore {
    async fn begin_transaction(&self) -> Result<Box<dyn ItemRepositoryTransaction>> {
        fail()
    }
}

#[async_trait]
impl TransactionRepository for UnconfiguredStore {
    async fn get_transactions_for_user(&self, _user_id: &str) -> Result<Vec<Transaction>> {
        fail()
    }
    async fn get_transaction_for_item(&self, _item_id: &str) -> Result<Option<Transaction>> {
        fail()
    }
}

#[async_trait]
impl PickupRequestRepository for UnconfiguredStore {
    async fn create_pickup_request(&self, _request: &PickupRequest) -> Result<PickupRequest> {
        fail()
    }
    async fn get_pickup_request(&self, _id: &str) -> Result<Option<PickupRequest>> {
        fail()
    }
    async fn get_pickup_requests_by_user(&self, _user_id: &str) -> Result<Vec<PickupRequest>> {
        fail()
    }
    async fn get_pending_pickup_requests(&self) -> Result<Vec<PickupRequestListing>> {
        fail()
    }
    async fn get_pickup_requests_by_dealer(&self, _dealer_id: &str) -> Result<Vec<PickupRequest>> {
        fail()
    }
    async fn get_pickup_requests_by_rider(&self, _rider_id: &str) -> Result<Vec<PickupRequest>> {
        fail()
    }
    async fn make_offer(&self, _id: &str, _dealer_id: &str, _price: Decimal) -> Result<PickupRequest> {
        fail()
    }
    async fn accept_offer(&self, _id: &str, _customer_id: &str) -> Result<PickupRequest> {
        fail()
    }
    async fn assign_rider_to_pickup_request(
        &self,
        _id: &str,
        _dealer_id: &str,
        _rider_id: &str,
    ) -> Result<PickupRequest> {
        fail()
    }
    async fn complete_pickup_request(&self, _id: &str) -> Result<PickupRequest> {
        fail()
    }
}

#[async_trait]
impl NotificationRepository for UnconfiguredStore {
    async fn create_notification(&self, _notification: &Notification) -> Result<Notification> {
        fail()
    }
    async fn get_notification(&self, _id: &str) -> Result<Option<Notification>> {
        fail()
    }
    async fn get_notifications(&self, _user_id: &str) -> Result<Vec<Notification>> {
        fail()
    }
    async fn get_unread_count(&self, _user_id: &str) -> Result<i64> {
        fail()
    }
    async fn mark_notification_as_read(&self, _id: &str) -> Result<Notification> {
        fail()
    }
    async fn mark_all_as_read(&self, _user_id: &str) -> Result<u64> {
        fail()
    }
}
