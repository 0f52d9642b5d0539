// SQLite PickupRequestRepository Implementation

use crate::error::{invalid_row, map_sqlx_error};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use sajilo_core::domain::{PickupRequest, PickupRequestListing, PickupStatus};
use sajilo_core::error::{AppError, Result};
use sajilo_core::port::{PickupRequestRepository, TimeProvider};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::sync::Arc;
use tracing::warn;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// The party a guarded update is restricted to
enum Party<'a> {
    Customer(&'a str),
    Dealer(&'a str),
}

pub struct SqlitePickupRequestRepository {
    pool: SqlitePool,
    time_provider: Arc<dyn TimeProvider>,
}

impl SqlitePickupRequestRepository {
    pub fn new(pool: SqlitePool, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            pool,
            time_provider,
        }
    }

    async fn fetch_requests(&self, sql: &str, bind: &str) -> Result<Vec<PickupRequest>> {
        let rows: Vec<PickupRequestRow> = sqlx::query_as(sql)
            .bind(bind)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        rows.into_iter().map(PickupRequestRow::into_request).collect()
    }

    /// Turn a zero-row guarded update into the matching error
    async fn explain_miss(
        &self,
        id: &str,
        expected: PickupStatus,
        party: Option<Party<'_>>,
    ) -> AppError {
        let current = sqlx::query_as::<_, PickupRequestRow>(
            "SELECT * FROM pickup_requests WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        let row = match current {
            Ok(Some(row)) => row,
            Ok(None) => return AppError::NotFound(format!("Pickup request {} not found", id)),
            Err(e) => return map_sqlx_error(e),
        };

        if let Some(party) = party {
            let (user_id, actual) = match party {
                Party::Customer(uid) => (uid, Some(row.user_id.as_str())),
                Party::Dealer(uid) => (uid, row.dealer_id.as_deref()),
            };
            if actual != Some(user_id) {
                return AppError::Forbidden(format!(
                    "User {} does not own pickup request {}",
                    user_id, id
                ));
            }
        }

        warn!(pickup_request_id = id, status = %row.status, expected = %expected, "Guarded update missed");
        // Only the open offer slot is contested; any other miss is a wrong-state call
        if expected == PickupStatus::Pending {
            AppError::Conflict(format!(
                "Pickup request {} is {}, expected {}",
                id, row.status, expected
            ))
        } else {
            AppError::InvalidState(format!(
                "Pickup request {} is {}, expected {}",
                id, row.status, expected
            ))
        }
    }
}

#[async_trait]
impl PickupRequestRepository for SqlitePickupRequestRepository {
    async fn create_pickup_request(&self, request: &PickupRequest) -> Result<PickupRequest> {
        let row = sqlx::query_as::<_, PickupRequestRow>(
            r#"
            INSERT INTO pickup_requests (
                id, user_id, selected_items, quantities, pickup_date, pickup_time,
                location, images, status, dealer_id, rider_id, offered_price,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&request.id)
        .bind(&request.user_id)
        .bind(serde_json::to_string(&request.selected_items)?)
        .bind(serde_json::to_string(&request.quantities)?)
        .bind(request.pickup_date.format(DATE_FORMAT).to_string())
        .bind(request.pickup_time.format(TIME_FORMAT).to_string())
        .bind(&request.location)
        .bind(serde_json::to_string(&request.images)?)
        .bind(request.status.as_str())
        .bind(&request.dealer_id)
        .bind(&request.rider_id)
        .bind(request.offered_price.map(|p| p.to_string()))
        .bind(request.created_at)
        .bind(request.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.into_request()
    }

    async fn get_pickup_request(&self, id: &str) -> Result<Option<PickupRequest>> {
        let row = sqlx::query_as::<_, PickupRequestRow>(
            "SELECT * FROM pickup_requests WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(PickupRequestRow::into_request).transpose()
    }

    async fn get_pickup_requests_by_user(&self, user_id: &str) -> Result<Vec<PickupRequest>> {
        self.fetch_requests(
            "SELECT * FROM pickup_requests WHERE user_id = ? ORDER BY created_at DESC, id DESC",
            user_id,
        )
        .await
    }

    async fn get_pending_pickup_requests(&self) -> Result<Vec<PickupRequestListing>> {
        let rows: Vec<PickupRequestListingRow> = sqlx::query_as(
            r#"
            SELECT pickup_requests.*,
                   NULLIF(TRIM(COALESCE(users.first_name, '') || ' ' || COALESCE(users.last_name, '')), '')
                       AS requester_name
            FROM pickup_requests
            LEFT JOIN users ON users.id = pickup_requests.user_id
            WHERE pickup_requests.status = 'pending'
            ORDER BY pickup_requests.created_at DESC, pickup_requests.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|row| {
                Ok(PickupRequestListing {
                    request: row.request.into_request()?,
                    requester_name: row.requester_name,
                })
            })
            .collect()
    }

    async fn get_pickup_requests_by_dealer(&self, dealer_id: &str) -> Result<Vec<PickupRequest>> {
        self.fetch_requests(
            "SELECT * FROM pickup_requests WHERE dealer_id = ? ORDER BY created_at DESC, id DESC",
            dealer_id,
        )
        .await
    }

    async fn get_pickup_requests_by_rider(&self, rider_id: &str) -> Result<Vec<PickupRequest>> {
        self.fetch_requests(
            "SELECT * FROM pickup_requests WHERE rider_id = ? ORDER BY created_at DESC, id DESC",
            rider_id,
        )
        .await
    }

    async fn make_offer(&self, id: &str, dealer_id: &str, price: Decimal) -> Result<PickupRequest> {
        let row = sqlx::query_as::<_, PickupRequestRow>(
            r#"
            UPDATE pickup_requests
            SET status = 'offered', dealer_id = ?, offered_price = ?, updated_at = ?
            WHERE id = ? AND status = 'pending'
            RETURNING *
            "#,
        )
        .bind(dealer_id)
        .bind(price.to_string())
        .bind(self.time_provider.now_millis())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => row.into_request(),
            None => Err(self.explain_miss(id, PickupStatus::Pending, None).await),
        }
    }

    async fn accept_offer(&self, id: &str, customer_id: &str) -> Result<PickupRequest> {
        let row = sqlx::query_as::<_, PickupRequestRow>(
            r#"
            UPDATE pickup_requests
            SET status = 'accepted', updated_at = ?
            WHERE id = ? AND status = 'offered' AND user_id = ?
            RETURNING *
            "#,
        )
        .bind(self.time_provider.now_millis())
        .bind(id)
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => row.into_request(),
            None => Err(self
                .explain_miss(id, PickupStatus::Offered, Some(Party::Customer(customer_id)))
                .await),
        }
    }

    async fn assign_rider_to_pickup_request(
        &self,
        id: &str,
        dealer_id: &str,
        rider_id: &str,
    ) -> Result<PickupRequest> {
        let row = sqlx::query_as::<_, PickupRequestRow>(
            r#"
            UPDATE pickup_requests
            SET status = 'assigned', rider_id = ?, updated_at = ?
            WHERE id = ? AND status = 'accepted' AND dealer_id = ?
            RETURNING *
            "#,
        )
        .bind(rider_id)
        .bind(self.time_provider.now_millis())
        .bind(id)
        .bind(dealer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => row.into_request(),
            None => Err(self
                .explain_miss(id, PickupStatus::Accepted, Some(Party::Dealer(dealer_id)))
                .await),
        }
    }

    async fn complete_pickup_request(&self, id: &str) -> Result<PickupRequest> {
        let row = sqlx::query_as::<_, PickupRequestRow>(
            r#"
            UPDATE pickup_requests
            SET status = 'completed', updated_at = ?
            WHERE id = ? AND status = 'assigned'
            RETURNING *
            "#,
        )
        .bind(self.time_provider.now_millis())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => row.into_request(),
            None => Err(self.explain_miss(id, PickupStatus::Assigned, None).await),
        }
    }
}

/// SQLite row representation; JSON and date columns stay as text until validated
#[derive(Debug, sqlx::FromRow)]
struct PickupRequestRow {
    id: String,
    user_id: String,
    selected_items: String,
    quantities: String,
    pickup_date: String,
    pickup_time: String,
    location: String,
    images: String,
    status: String,
    dealer_id: Option<String>,
    rider_id: Option<String>,
    offered_price: Option<String>,
    created_at: i64,
    updated_at: i64,
}

impl PickupRequestRow {
    fn into_request(self) -> Result<PickupRequest> {
        let bad = |reason: String| invalid_row("pickup_requests", &self.id, reason);

        let status = PickupStatus::from_str(&self.status).map_err(|e| bad(e.to_string()))?;
        let selected_items = serde_json::from_str(&self.selected_items)
            .map_err(|e| bad(format!("selected_items: {}", e)))?;
        let quantities = serde_json::from_str(&self.quantities)
            .map_err(|e| bad(format!("quantities: {}", e)))?;
        let images =
            serde_json::from_str(&self.images).map_err(|e| bad(format!("images: {}", e)))?;
        let pickup_date = NaiveDate::parse_from_str(&self.pickup_date, DATE_FORMAT)
            .map_err(|e| bad(format!("pickup_date: {}", e)))?;
        let pickup_time = NaiveTime::parse_from_str(&self.pickup_time, TIME_FORMAT)
            .map_err(|e| bad(format!("pickup_time: {}", e)))?;
        let offered_price = self
            .offered_price
            .as_deref()
            .map(Decimal::from_str)
            .transpose()
            .map_err(|e| bad(format!("offered_price: {}", e)))?;

        let request = PickupRequest {
            id: self.id.clone(),
            user_id: self.user_id,
            selected_items,
            quantities,
            pickup_date,
            pickup_time,
            location: self.location,
            images,
            status,
            dealer_id: self.dealer_id,
            rider_id: self.rider_id,
            offered_price,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        request
            .check_invariants()
            .map_err(|e| invalid_row("pickup_requests", &request.id, e))?;
        Ok(request)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PickupRequestListingRow {
    #[sqlx(flatten)]
    request: PickupRequestRow,
    requester_name: Option<String>,
}
