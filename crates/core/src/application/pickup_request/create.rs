// Create Pickup Request Use Case

use crate::domain::{Actor, PickupRequest, PickupStatus, UserRole};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, PickupRequestRepository, TimeProvider};
use chrono::{DateTime, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Customer-supplied pickup fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPickupRequest {
    pub selected_items: BTreeSet<String>,
    #[serde(default)]
    pub quantities: BTreeMap<String, u32>,
    pub pickup_date: NaiveDate,
    pub pickup_time: NaiveTime,
    pub location: String,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Caller-side checks, run before any store write
pub fn validate_request(req: &NewPickupRequest, today: NaiveDate) -> Result<()> {
    if req.selected_items.is_empty() {
        return Err(AppError::Validation(
            "Select at least one waste category".to_string(),
        ));
    }

    if req.selected_items.iter().any(|c| c.trim().is_empty()) {
        return Err(AppError::Validation("Category id cannot be empty".to_string()));
    }

    for (category, count) in &req.quantities {
        if !req.selected_items.contains(category) {
            return Err(AppError::Validation(format!(
                "Quantity given for unselected category {}",
                category
            )));
        }
        if *count == 0 {
            return Err(AppError::Validation(format!(
                "Quantity for {} must be at least 1",
                category
            )));
        }
    }

    if req.location.trim().is_empty() {
        return Err(AppError::Validation("Pickup location cannot be empty".to_string()));
    }

    if req.pickup_date < today {
        return Err(AppError::Validation(format!(
            "Pickup date {} is in the past",
            req.pickup_date
        )));
    }

    if req.images.iter().any(|url| url.trim().is_empty()) {
        return Err(AppError::Validation("Image URL cannot be empty".to_string()));
    }

    Ok(())
}

pub async fn execute(
    requests: &dyn PickupRequestRepository,
    id_provider: &dyn IdProvider,
    time_provider: &dyn TimeProvider,
    actor: &Actor,
    req: NewPickupRequest,
) -> Result<PickupRequest> {
    actor.require_role(UserRole::Customer)?;

    let now = time_provider.now_millis();
    let today = DateTime::from_timestamp_millis(now)
        .ok_or_else(|| AppError::Internal(format!("Clock out of range: {}", now)))?
        .date_naive();
    validate_request(&req, today)?;

    let request = PickupRequest {
        id: id_provider.generate_id("pickup"),
        user_id: actor.user_id.clone(),
        selected_items: req.selected_items,
        quantities: req.quantities,
        pickup_date: req.pickup_date,
        pickup_time: req.pickup_time,
        location: req.location,
        images: req.images,
        status: PickupStatus::Pending,
        dealer_id: None,
        rider_id: None,
        offered_price: None,
        created_at: now,
        updated_at: now,
    };

    let stored = requests.create_pickup_request(&request).await?;

    info!(
        pickup_request_id = %stored.id,
        user_id = %stored.user_id,
        categories = stored.selected_items.len(),
        "Pickup request created"
    );

    Ok(stored)
}
