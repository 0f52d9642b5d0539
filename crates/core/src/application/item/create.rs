// Create Item Use Case

use crate::domain::{Actor, Item, ItemStatus, UserRole};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, ItemRepository, TimeProvider};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

const MAX_TITLE_LEN: usize = 120;

/// Customer-supplied listing fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub location_lat: f64,
    pub location_lng: f64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Caller-side checks, run before any store write
pub fn validate_request(req: &NewItem) -> Result<()> {
    if req.title.trim().is_empty() {
        return Err(AppError::Validation("Item title cannot be empty".to_string()));
    }

    if req.title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::Validation(format!(
            "Item title too long (max {} characters)",
            MAX_TITLE_LEN
        )));
    }

    if req.price <= Decimal::ZERO {
        return Err(AppError::Validation(format!(
            "Item price must be positive, got {}",
            req.price
        )));
    }

    if !(-90.0..=90.0).contains(&req.location_lat) {
        return Err(AppError::Validation(format!(
            "Latitude out of range: {}",
            req.location_lat
        )));
    }

    if !(-180.0..=180.0).contains(&req.location_lng) {
        return Err(AppError::Validation(format!(
            "Longitude out of range: {}",
            req.location_lng
        )));
    }

    Ok(())
}

/// Execute create use case
///
/// # Arguments
///
/// * `items` - Item repository
/// * `id_provider` - ID generator (injected for determinism)
/// * `time_provider` - Time provider (injected for determinism)
/// * `actor` - Posting customer
/// * `req` - Listing fields
pub async fn execute(
    items: &dyn ItemRepository,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    actor: &Actor,
    req: NewItem,
) -> Result<Item> {
    actor.require_role(UserRole::Customer)?;
    validate_request(&req)?;

    let now = time_provider.now_millis();
    let item = Item {
        id: id_provider.generate_id("item"),
        user_id: actor.user_id.clone(),
        title: req.title,
        description: req.description,
        price: req.price,
        location_lat: req.location_lat,
        location_lng: req.location_lng,
        category: req.category,
        quantity: req.quantity,
        image_url: req.image_url,
        status: ItemStatus::Available,
        dealer_id: None,
        rider_id: None,
        created_at: now,
        updated_at: now,
    };

    let stored = items.create_item(&item).await?;

    info!(
        item_id = %stored.id,
        user_id = %stored.user_id,
        price = %stored.price,
        "Item posted"
    );

    Ok(stored)
}
