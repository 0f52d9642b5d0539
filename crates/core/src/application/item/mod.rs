// Item Service - customer listings and their dealer/rider lifecycle

pub mod create;
mod create_test;

pub use create::NewItem;

use crate::application::notification::deliver;
use crate::domain::{
    AcceptedItem, Actor, Item, ItemListing, ItemStatus, NewNotification, NotificationKind,
    Transaction, UserRole,
};
use crate::error::{AppError, Result};
use crate::port::{
    IdProvider, ItemRepository, NotificationSink, Repositories, TimeProvider,
    TransactionRepository, TransactionalItemRepository, UserRepository,
};
use std::sync::Arc;
use tracing::info;

pub struct ItemService {
    items: Arc<dyn ItemRepository>,
    item_tx: Arc<dyn TransactionalItemRepository>,
    transactions: Arc<dyn TransactionRepository>,
    users: Arc<dyn UserRepository>,
    notifier: Arc<dyn NotificationSink>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl ItemService {
    pub fn new(
        repos: &Repositories,
        notifier: Arc<dyn NotificationSink>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            items: repos.items.clone(),
            item_tx: repos.item_transactions.clone(),
            transactions: repos.transactions.clone(),
            users: repos.users.clone(),
            notifier,
            id_provider,
            time_provider,
        }
    }

    /// Post a new listing (customer)
    pub async fn create_new_item(&self, actor: &Actor, req: NewItem) -> Result<Item> {
        create::execute(
            self.items.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            actor,
            req,
        )
        .await
    }

    /// Dealer takes an available item.
    ///
    /// The guarded acceptance and the transaction row commit together; at most
    /// one dealer wins a race, the rest get a Conflict.
    pub async fn accept_item_by_dealer(&self, actor: &Actor, item_id: &str) -> Result<AcceptedItem> {
        actor.require_role(UserRole::Dealer)?;

        // Dropping an uncommitted transaction rolls it back
        let mut tx = self.item_tx.begin_transaction().await?;
        let item = tx.accept_item(item_id, &actor.user_id).await?;

        let now = self.time_provider.now_millis();
        let transaction = Transaction {
            id: self.id_provider.generate_id("txn"),
            item_id: item.id.clone(),
            customer_id: item.user_id.clone(),
            dealer_id: actor.user_id.clone(),
            rider_id: None,
            amount: item.price,
            status: item.status,
            created_at: now,
            updated_at: now,
        };
        let transaction = tx.create_transaction(&transaction).await?;
        tx.commit().await?;

        info!(
            item_id = %item.id,
            dealer_id = %actor.user_id,
            transaction_id = %transaction.id,
            "Item accepted"
        );

        deliver(
            self.notifier.as_ref(),
            NewNotification::new(
                &item.user_id,
                NotificationKind::ItemAccepted,
                "Item accepted",
                format!("A dealer accepted your item \"{}\"", item.title),
            )
            .related_to(&item.id),
        )
        .await;

        Ok(AcceptedItem { item, transaction })
    }

    /// Dealer hands an accepted item to one of the riders (status unchanged)
    pub async fn assign_rider_to_item(
        &self,
        actor: &Actor,
        item_id: &str,
        rider_id: &str,
    ) -> Result<Item> {
        actor.require_role(UserRole::Dealer)?;

        let rider = self
            .users
            .get_user(rider_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rider {} not found", rider_id)))?;
        if rider.role != UserRole::Rider {
            return Err(AppError::Validation(format!(
                "User {} is a {}, not a rider",
                rider_id, rider.role
            )));
        }

        let mut tx = self.item_tx.begin_transaction().await?;
        let item = tx.assign_rider(item_id, &actor.user_id, rider_id).await?;
        tx.sync_transaction(&item).await?;
        tx.commit().await?;

        info!(item_id = %item.id, rider_id = %rider_id, "Rider assigned");

        deliver(
            self.notifier.as_ref(),
            NewNotification::new(
                rider_id,
                NotificationKind::RiderAssigned,
                "New pickup assigned",
                format!("Pick up \"{}\"", item.title),
            )
            .related_to(&item.id),
        )
        .await;
        deliver(
            self.notifier.as_ref(),
            NewNotification::new(
                &item.user_id,
                NotificationKind::RiderAssigned,
                "Rider assigned",
                format!("{} is on the way for \"{}\"", rider.display_name(), item.title),
            )
            .related_to(&item.id),
        )
        .await;

        Ok(item)
    }

    /// Assigned rider collected the item
    pub async fn pickup_item(&self, actor: &Actor, item_id: &str) -> Result<Item> {
        actor.require_role(UserRole::Rider)?;
        self.update_item_status(actor, item_id, ItemStatus::PickedUp)
            .await
    }

    /// Delivery finished (assigned rider or owning dealer)
    pub async fn complete_item(&self, actor: &Actor, item_id: &str) -> Result<Item> {
        self.update_item_status(actor, item_id, ItemStatus::Completed)
            .await
    }

    /// Guarded forward move to `picked_up` or `completed`.
    ///
    /// Rejects illegal jumps such as `available -> completed`.
    pub async fn update_item_status(
        &self,
        actor: &Actor,
        item_id: &str,
        to: ItemStatus,
    ) -> Result<Item> {
        let from = match to {
            ItemStatus::PickedUp | ItemStatus::Completed => to.predecessor(),
            ItemStatus::Available | ItemStatus::Accepted => None,
        }
        .ok_or_else(|| {
            AppError::Validation(format!("Items cannot be moved to {} directly", to))
        })?;

        let current = self.get_item(item_id).await?;
        current.status.check_transition(to)?;
        check_participant(actor, &current, to)?;

        let mut tx = self.item_tx.begin_transaction().await?;
        let item = tx.update_item_status(item_id, from, to).await?;
        tx.sync_transaction(&item).await?;
        tx.commit().await?;

        info!(item_id = %item.id, from = %from, to = %to, "Item status updated");

        let (kind, title, verb) = match to {
            ItemStatus::PickedUp => (NotificationKind::ItemPickedUp, "Item picked up", "was picked up"),
            _ => (NotificationKind::ItemCompleted, "Pickup completed", "has been completed"),
        };
        let recipients = [Some(&item.user_id), item.dealer_id.as_ref()];
        for user_id in recipients.into_iter().flatten() {
            deliver(
                self.notifier.as_ref(),
                NewNotification::new(
                    user_id,
                    kind,
                    title,
                    format!("\"{}\" {}", item.title, verb),
                )
                .related_to(&item.id),
            )
            .await;
        }

        Ok(item)
    }

    pub async fn get_item(&self, item_id: &str) -> Result<Item> {
        self.items
            .get_item(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Item {} not found", item_id)))
    }

    pub async fn get_available_items(&self) -> Result<Vec<ItemListing>> {
        self.items.get_available_items().await
    }

    pub async fn get_items_by_user(&self, user_id: &str) -> Result<Vec<Item>> {
        self.items.get_items_by_user(user_id).await
    }

    pub async fn get_items_for_dealer(&self, actor: &Actor) -> Result<Vec<Item>> {
        actor.require_role(UserRole::Dealer)?;
        self.items.get_items_by_dealer(&actor.user_id).await
    }

    pub async fn get_items_for_rider(&self, actor: &Actor) -> Result<Vec<Item>> {
        actor.require_role(UserRole::Rider)?;
        self.items.get_items_by_rider(&actor.user_id).await
    }

    pub async fn get_transactions(&self, actor: &Actor) -> Result<Vec<Transaction>> {
        self.transactions
            .get_transactions_for_user(&actor.user_id)
            .await
    }
}

/// Only the assigned rider picks up; the rider or the owning dealer completes
fn check_participant(actor: &Actor, item: &Item, to: ItemStatus) -> Result<()> {
    if item.rider_id.is_none() {
        return Err(AppError::InvalidState(format!(
            "Item {} has no rider assigned",
            item.id
        )));
    }

    let allowed = match to {
        ItemStatus::PickedUp => actor.is(item.rider_id.as_deref()),
        _ => actor.is(item.rider_id.as_deref()) || actor.is(item.dealer_id.as_deref()),
    };

    if !allowed {
        return Err(AppError::Forbidden(format!(
            "User {} is not assigned to item {}",
            actor.user_id, item.id
        )));
    }
    Ok(())
}
