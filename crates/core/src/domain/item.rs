// Item Domain Model

use crate::domain::error::{DomainError, Result};
use crate::domain::transaction::Transaction;
use crate::domain::user::UserId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Item ID (`item_<millis>_<suffix>`)
pub type ItemId = String;

/// Item lifecycle: available -> accepted -> picked_up -> completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Available,
    Accepted,
    PickedUp,
    Completed,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Available => "available",
            ItemStatus::Accepted => "accepted",
            ItemStatus::PickedUp => "picked_up",
            ItemStatus::Completed => "completed",
        }
    }

    /// The only status a row may hold immediately before entering `self`
    pub fn predecessor(&self) -> Option<ItemStatus> {
        match self {
            ItemStatus::Available => None,
            ItemStatus::Accepted => Some(ItemStatus::Available),
            ItemStatus::PickedUp => Some(ItemStatus::Accepted),
            ItemStatus::Completed => Some(ItemStatus::PickedUp),
        }
    }

    pub fn can_transition_to(&self, next: ItemStatus) -> bool {
        next.predecessor() == Some(*self)
    }

    pub fn check_transition(&self, next: ItemStatus) -> Result<()> {
        if !self.can_transition_to(next) {
            return Err(DomainError::InvalidStateTransition {
                from: self.to_string(),
                to: next.to_string(),
            });
        }
        Ok(())
    }

    /// Statuses in which a dealer owns the item
    pub fn has_dealer(&self) -> bool {
        !matches!(self, ItemStatus::Available)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemStatus::Completed)
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "available" => Ok(ItemStatus::Available),
            "accepted" => Ok(ItemStatus::Accepted),
            "picked_up" => Ok(ItemStatus::PickedUp),
            "completed" => Ok(ItemStatus::Completed),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

/// Item Entity: a single customer-posted waste listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub user_id: UserId,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub location_lat: f64,
    pub location_lng: f64,
    pub category: Option<String>,
    pub quantity: Option<String>,
    pub image_url: Option<String>,
    pub status: ItemStatus,
    pub dealer_id: Option<UserId>,
    pub rider_id: Option<UserId>,
    pub created_at: i64, // epoch ms
    pub updated_at: i64,
}

impl Item {
    /// Ownership invariants:
    /// - `dealer_id` is set iff the status is past `available`
    /// - `rider_id` is only set once `dealer_id` is
    pub fn check_invariants(&self) -> Result<()> {
        if self.dealer_id.is_some() != self.status.has_dealer() {
            return Err(DomainError::ValidationError(format!(
                "item {} is {} but dealer_id is {}",
                self.id,
                self.status,
                if self.dealer_id.is_some() { "set" } else { "unset" }
            )));
        }
        if self.rider_id.is_some() && self.dealer_id.is_none() {
            return Err(DomainError::ValidationError(format!(
                "item {} has a rider without a dealer",
                self.id
            )));
        }
        Ok(())
    }
}

/// Available item joined with its poster's name (dealer marketplace view)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemListing {
    #[serde(flatten)]
    pub item: Item,
    pub poster_name: Option<String>,
}

/// Result of a dealer acceptance: the item and the transaction row recorded with it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcceptedItem {
    pub item: Item,
    pub transaction: Transaction,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(status: ItemStatus, dealer: Option<&str>, rider: Option<&str>) -> Item {
        Item {
            id: "item_1".to_string(),
            user_id: "customer_1".to_string(),
            title: "Plastic bottles".to_string(),
            description: String::new(),
            price: Decimal::new(50, 0),
            location_lat: 27.7,
            location_lng: 85.3,
            category: None,
            quantity: None,
            image_url: None,
            status,
            dealer_id: dealer.map(str::to_string),
            rider_id: rider.map(str::to_string),
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_forward_transitions_only() {
        assert!(ItemStatus::Available.can_transition_to(ItemStatus::Accepted));
        assert!(ItemStatus::Accepted.can_transition_to(ItemStatus::PickedUp));
        assert!(ItemStatus::PickedUp.can_transition_to(ItemStatus::Completed));

        assert!(!ItemStatus::Available.can_transition_to(ItemStatus::Completed));
        assert!(!ItemStatus::Accepted.can_transition_to(ItemStatus::Available));
        assert!(!ItemStatus::Completed.can_transition_to(ItemStatus::Completed));
    }

    #[test]
    fn test_illegal_jump_names_both_states() {
        let err = ItemStatus::Available
            .check_transition(ItemStatus::Completed)
            .unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidStateTransition {
                from: "available".to_string(),
                to: "completed".to_string(),
            }
        );
    }

    #[test]
    fn test_status_parsing_rejects_unknown() {
        assert_eq!("picked_up".parse::<ItemStatus>().unwrap(), ItemStatus::PickedUp);
        assert!("cancelled".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn test_ownership_invariants() {
        assert!(item(ItemStatus::Available, None, None).check_invariants().is_ok());
        assert!(item(ItemStatus::Accepted, Some("d"), None).check_invariants().is_ok());
        assert!(item(ItemStatus::Completed, Some("d"), Some("r"))
            .check_invariants()
            .is_ok());

        assert!(item(ItemStatus::Available, Some("d"), None).check_invariants().is_err());
        assert!(item(ItemStatus::Accepted, None, None).check_invariants().is_err());
        assert!(item(ItemStatus::Available, None, Some("r")).check_invariants().is_err());
    }
}
