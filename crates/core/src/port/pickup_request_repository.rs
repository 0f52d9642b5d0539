// Pickup Request Repository Port (Interface)

use crate::domain::{PickupRequest, PickupRequestListing};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Repository interface for PickupRequest persistence.
///
/// Each transition is a single conditional update guarded on the prior status.
#[async_trait]
pub trait PickupRequestRepository: Send + Sync {
    /// Insert a new request; returns the stored row
    async fn create_pickup_request(&self, request: &PickupRequest) -> Result<PickupRequest>;

    /// Find request by ID
    async fn get_pickup_request(&self, id: &str) -> Result<Option<PickupRequest>>;

    /// Requests created by a customer
    async fn get_pickup_requests_by_user(&self, user_id: &str) -> Result<Vec<PickupRequest>>;

    /// Pending requests with the requester's name
    async fn get_pending_pickup_requests(&self) -> Result<Vec<PickupRequestListing>>;

    /// Requests a dealer has offered on
    async fn get_pickup_requests_by_dealer(&self, dealer_id: &str) -> Result<Vec<PickupRequest>>;

    /// Requests assigned to a rider
    async fn get_pickup_requests_by_rider(&self, rider_id: &str) -> Result<Vec<PickupRequest>>;

    /// `pending -> offered`, setting `dealer_id` and `offered_price` together
    async fn make_offer(&self, id: &str, dealer_id: &str, price: Decimal)
        -> Result<PickupRequest>;

    /// `offered -> accepted`, only for the owning customer
    async fn accept_offer(&self, id: &str, customer_id: &str) -> Result<PickupRequest>;

    /// `accepted -> assigned`, only for the offering dealer
    async fn assign_rider_to_pickup_request(
        &self,
        id: &str,
        dealer_id: &str,
        rider_id: &str,
    ) -> Result<PickupRequest>;

    /// `assigned -> completed`
    async fn complete_pickup_request(&self, id: &str) -> Result<PickupRequest>;
}
