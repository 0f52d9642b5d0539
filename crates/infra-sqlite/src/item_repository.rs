// SQLite ItemRepository Implementation

use crate::error::{invalid_row, map_sqlx_error};
use crate::transaction::SqliteItemTransaction;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sajilo_core::domain::{Item, ItemListing, ItemStatus, Transaction};
use sajilo_core::error::Result;
use sajilo_core::port::{
    ItemRepository, ItemRepositoryTransaction, TimeProvider, TransactionRepository,
    TransactionalItemRepository,
};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

pub struct SqliteItemRepository {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqliteItemRepository {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }

    async fn fetch_items(&self, sql: &str, bind: &str) -> Result<Vec<Item>> {
        let rows: Vec<ItemRow> = sqlx::query_as(sql)
            .bind(bind)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(ItemRow::into_item).collect()
    }
}

#[async_trait]
impl ItemRepository for SqliteItemRepository {
    async fn create_item(&self, item: &Item) -> Result<Item> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            INSERT INTO items (
                id, user_id, title, description, price, location_lat, location_lng,
                category, quantity, image_url, status, dealer_id, rider_id,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&item.id)
        .bind(&item.user_id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.price.to_string())
        .bind(item.location_lat)
        .bind(item.location_lng)
        .bind(&item.category)
        .bind(&item.quantity)
        .bind(&item.image_url)
        .bind(item.status.as_str())
        .bind(&item.dealer_id)
        .bind(&item.rider_id)
        .bind(item.created_at)
        .bind(item.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(item_id = %item.id, "Item row inserted");
        row.into_item()
    }

    async fn get_item(&self, id: &str) -> Result<Option<Item>> {
        let row = sqlx::query_as::<_, ItemRow>("SELECT * FROM items WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(ItemRow::into_item).transpose()
    }

    async fn get_available_items(&self) -> Result<Vec<ItemListing>> {
        let rows: Vec<ItemListingRow> = sqlx::query_as(
            r#"
            SELECT items.*,
                   NULLIF(TRIM(COALESCE(users.first_name, '') || ' ' || COALESCE(users.last_name, '')), '')
                       AS poster_name
            FROM items
            LEFT JOIN users ON users.id = items.user_id
            WHERE items.status = 'available'
            ORDER BY items.created_at DESC, items.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|row| {
                Ok(ItemListing {
                    item: row.item.into_item()?,
                    poster_name: row.poster_name,
                })
            })
            .collect()
    }

    async fn get_items_by_user(&self, user_id: &str) -> Result<Vec<Item>> {
        self.fetch_items(
            "SELECT * FROM items WHERE user_id = ? ORDER BY created_at DESC, id DESC",
            user_id,
        )
        .await
    }

    async fn get_items_by_dealer(&self, dealer_id: &str) -> Result<Vec<Item>> {
        self.fetch_items(
            "SELECT * FROM items WHERE dealer_id = ? ORDER BY created_at DESC, id DESC",
            dealer_id,
        )
        .await
    }

    async fn get_items_by_rider(&self, rider_id: &str) -> Result<Vec<Item>> {
        self.fetch_items(
            "SELECT * FROM items WHERE rider_id = ? ORDER BY created_at DESC, id DESC",
            rider_id,
        )
        .await
    }
}

#[async_trait]
impl TransactionRepository for SqliteItemRepository {
    async fn get_transactions_for_user(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let rows: Vec<TransactionRow> = sqlx::query_as(
            r#"
            SELECT * FROM transactions
            WHERE customer_id = ?1 OR dealer_id = ?1 OR rider_id = ?1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(TransactionRow::into_transaction).collect()
    }

    async fn get_transaction_for_item(&self, item_id: &str) -> Result<Option<Transaction>> {
        let row = sqlx::query_as::<_, TransactionRow>(
            "SELECT * FROM transactions WHERE item_id = ?",
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(TransactionRow::into_transaction).transpose()
    }
}

#[async_trait]
impl TransactionalItemRepository for SqliteItemRepository {
    async fn begin_transaction(&self) -> Result<Box<dyn ItemRepositoryTransaction>> {
        let tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        Ok(Box::new(SqliteItemTransaction::new(
            tx,
            self.time_provider.clone(),
        )))
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ItemRow {
    id: String,
    user_id: String,
    title: String,
    description: String,
    price: String,
    location_lat: f64,
    location_lng: f64,
    category: Option<String>,
    quantity: Option<String>,
    image_url: Option<String>,
    status: String,
    dealer_id: Option<String>,
    rider_id: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl ItemRow {
    pub(crate) fn into_item(self) -> Result<Item> {
        let status = ItemStatus::from_str(&self.status)
            .map_err(|e| invalid_row("items", &self.id, e))?;
        let price = Decimal::from_str(&self.price)
            .map_err(|e| invalid_row("items", &self.id, format!("price: {}", e)))?;

        let item = Item {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            description: self.description,
            price,
            location_lat: self.location_lat,
            location_lng: self.location_lng,
            category: self.category,
            quantity: self.quantity,
            image_url: self.image_url,
            status,
            dealer_id: self.dealer_id,
            rider_id: self.rider_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        item.check_invariants()
            .map_err(|e| invalid_row("items", &item.id, e))?;
        Ok(item)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ItemListingRow {
    #[sqlx(flatten)]
    item: ItemRow,
    poster_name: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TransactionRow {
    id: String,
    item_id: String,
    customer_id: String,
    dealer_id: String,
    rider_id: Option<String>,
    amount: String,
    status: String,
    created_at: i64,
    updated_at: i64,
}

impl TransactionRow {
    pub(crate) fn into_transaction(self) -> Result<Transaction> {
        let status = ItemStatus::from_str(&self.status)
            .map_err(|e| invalid_row("transactions", &self.id, e))?;
        let amount = Decimal::from_str(&self.amount)
            .map_err(|e| invalid_row("transactions", &self.id, format!("amount: {}", e)))?;

        Ok(Transaction {
            id: self.id,
            item_id: self.item_id,
            customer_id: self.customer_id,
            dealer_id: self.dealer_id,
            rider_id: self.rider_id,
            amount,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
