// Pickup Request Domain Model
//
// Multi-category pickup with a dealer price offer:
// pending -> offered -> accepted -> assigned -> completed

use crate::domain::error::{DomainError, Result};
use crate::domain::user::UserId;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// Pickup request ID (`pickup_<millis>_<suffix>`)
pub type PickupRequestId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PickupStatus {
    Pending,
    Offered,
    Accepted,
    Assigned,
    /// Declared by the schema; no transition produces it
    PickedUp,
    Completed,
}

impl PickupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PickupStatus::Pending => "pending",
            PickupStatus::Offered => "offered",
            PickupStatus::Accepted => "accepted",
            PickupStatus::Assigned => "assigned",
            PickupStatus::PickedUp => "picked_up",
            PickupStatus::Completed => "completed",
        }
    }

    pub fn predecessor(&self) -> Option<PickupStatus> {
        match self {
            PickupStatus::Pending | PickupStatus::PickedUp => None,
            PickupStatus::Offered => Some(PickupStatus::Pending),
            PickupStatus::Accepted => Some(PickupStatus::Offered),
            PickupStatus::Assigned => Some(PickupStatus::Accepted),
            PickupStatus::Completed => Some(PickupStatus::Assigned),
        }
    }

    pub fn check_transition(&self, next: PickupStatus) -> Result<()> {
        if next.predecessor() != Some(*self) {
            return Err(DomainError::InvalidStateTransition {
                from: self.to_string(),
                to: next.to_string(),
            });
        }
        Ok(())
    }

    /// Statuses that carry a dealer offer (`dealer_id` + `offered_price`)
    pub fn has_offer(&self) -> bool {
        !matches!(self, PickupStatus::Pending)
    }

    /// Statuses that carry an assigned rider
    pub fn has_rider(&self) -> bool {
        matches!(
            self,
            PickupStatus::Assigned | PickupStatus::PickedUp | PickupStatus::Completed
        )
    }
}

impl std::fmt::Display for PickupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PickupStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(PickupStatus::Pending),
            "offered" => Ok(PickupStatus::Offered),
            "accepted" => Ok(PickupStatus::Accepted),
            "assigned" => Ok(PickupStatus::Assigned),
            "picked_up" => Ok(PickupStatus::PickedUp),
            "completed" => Ok(PickupStatus::Completed),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// Pickup Request Entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupRequest {
    pub id: PickupRequestId,
    pub user_id: UserId,
    pub selected_items: BTreeSet<String>,
    pub quantities: BTreeMap<String, u32>,
    pub pickup_date: NaiveDate,
    pub pickup_time: NaiveTime,
    pub location: String,
    pub images: Vec<String>,
    pub status: PickupStatus,
    pub dealer_id: Option<UserId>,
    pub rider_id: Option<UserId>,
    pub offered_price: Option<Decimal>,
    pub created_at: i64, // epoch ms
    pub updated_at: i64,
}

impl PickupRequest {
    /// `offered_price` and `dealer_id` travel together with the offer;
    /// `rider_id` appears only once the request is assigned
    pub fn check_invariants(&self) -> Result<()> {
        let has_offer = self.status.has_offer();
        if self.offered_price.is_some() != has_offer || self.dealer_id.is_some() != has_offer {
            return Err(DomainError::ValidationError(format!(
                "pickup request {} is {} but offer fields are inconsistent",
                self.id, self.status
            )));
        }
        if self.rider_id.is_some() != self.status.has_rider() {
            return Err(DomainError::ValidationError(format!(
                "pickup request {} is {} but rider_id is {}",
                self.id,
                self.status,
                if self.rider_id.is_some() { "set" } else { "unset" }
            )));
        }
        Ok(())
    }
}

/// Pending request joined with the requester's name (dealer marketplace view)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickupRequestListing {
    #[serde(flatten)]
    pub request: PickupRequest,
    pub requester_name: Option<String>,
}
