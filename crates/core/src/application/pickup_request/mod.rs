// Pickup Request Service - multi-category pickups with a dealer price offer

pub mod create;

pub use create::NewPickupRequest;

use crate::application::notification::deliver;
use crate::domain::{
    Actor, NewNotification, NotificationKind, PickupRequest, PickupRequestListing, UserRole,
};
use crate::error::{AppError, Result};
use crate::port::{
    IdProvider, NotificationSink, PickupRequestRepository, Repositories, TimeProvider,
    UserRepository,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

pub struct PickupRequestService {
    requests: Arc<dyn PickupRequestRepository>,
    users: Arc<dyn UserRepository>,
    notifier: Arc<dyn NotificationSink>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl PickupRequestService {
    pub fn new(
        repos: &Repositories,
        notifier: Arc<dyn NotificationSink>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            requests: repos.pickup_requests.clone(),
            users: repos.users.clone(),
            notifier,
            id_provider,
            time_provider,
        }
    }

    pub async fn create_pickup_request(
        &self,
        actor: &Actor,
        req: NewPickupRequest,
    ) -> Result<PickupRequest> {
        create::execute(
            self.requests.as_ref(),
            self.id_provider.as_ref(),
            self.time_provider.as_ref(),
            actor,
            req,
        )
        .await
    }

    /// Dealer quotes a price on a pending request
    pub async fn make_offer(
        &self,
        actor: &Actor,
        request_id: &str,
        price: Decimal,
    ) -> Result<PickupRequest> {
        actor.require_role(UserRole::Dealer)?;
        if price <= Decimal::ZERO {
            return Err(AppError::Validation(format!(
                "Offered price must be positive, got {}",
                price
            )));
        }

        let request = self
            .requests
            .make_offer(request_id, &actor.user_id, price)
            .await?;

        info!(
            pickup_request_id = %request.id,
            dealer_id = %actor.user_id,
            price = %price,
            "Offer made"
        );

        deliver(
            self.notifier.as_ref(),
            NewNotification::new(
                &request.user_id,
                NotificationKind::OfferReceived,
                "New offer",
                format!("A dealer offered Rs. {} for your pickup request", price),
            )
            .related_to(&request.id),
        )
        .await;

        Ok(request)
    }

    /// Requesting customer takes the dealer's offer
    pub async fn accept_offer(&self, actor: &Actor, request_id: &str) -> Result<PickupRequest> {
        actor.require_role(UserRole::Customer)?;

        let request = self
            .requests
            .accept_offer(request_id, &actor.user_id)
            .await?;

        info!(pickup_request_id = %request.id, "Offer accepted");

        if let Some(dealer_id) = &request.dealer_id {
            let price = request
                .offered_price
                .map(|p| p.to_string())
                .unwrap_or_default();
            deliver(
                self.notifier.as_ref(),
                NewNotification::new(
                    dealer_id,
                    NotificationKind::OfferAccepted,
                    "Offer accepted",
                    format!("Your offer of Rs. {} was accepted", price),
                )
                .related_to(&request.id),
            )
            .await;
        }

        Ok(request)
    }

    /// Offering dealer assigns a rider to an accepted request
    pub async fn assign_rider(
        &self,
        actor: &Actor,
        request_id: &str,
        rider_id: &str,
    ) -> Result<PickupRequest> {
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

        let request = self
            .requests
            .assign_rider_to_pickup_request(request_id, &actor.user_id, rider_id)
            .await?;

        info!(pickup_request_id = %request.id, rider_id = %rider_id, "Rider assigned");

        deliver(
            self.notifier.as_ref(),
            NewNotification::new(
                rider_id,
                NotificationKind::PickupAssigned,
                "New pickup assigned",
                format!("Pickup at {} on {}", request.location, request.pickup_date),
            )
            .related_to(&request.id),
        )
        .await;
        deliver(
            self.notifier.as_ref(),
            NewNotification::new(
                &request.user_id,
                NotificationKind::PickupAssigned,
                "Rider assigned",
                format!("{} will collect your pickup", rider.display_name()),
            )
            .related_to(&request.id),
        )
        .await;

        Ok(request)
    }

    /// Assigned rider or offering dealer closes the request
    pub async fn complete(&self, actor: &Actor, request_id: &str) -> Result<PickupRequest> {
        let current = self.get_pickup_request(request_id).await?;
        if !actor.is(current.rider_id.as_deref()) && !actor.is(current.dealer_id.as_deref()) {
            return Err(AppError::Forbidden(format!(
                "User {} is not assigned to pickup request {}",
                actor.user_id, request_id
            )));
        }

        let request = self.requests.complete_pickup_request(request_id).await?;

        info!(pickup_request_id = %request.id, "Pickup request completed");

        deliver(
            self.notifier.as_ref(),
            NewNotification::new(
                &request.user_id,
                NotificationKind::PickupCompleted,
                "Pickup completed",
                "Your waste has been collected",
            )
            .related_to(&request.id),
        )
        .await;

        Ok(request)
    }

    pub async fn get_pickup_request(&self, request_id: &str) -> Result<PickupRequest> {
        self.requests
            .get_pickup_request(request_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Pickup request {} not found", request_id))
            })
    }

    pub async fn get_pickup_requests_by_user(&self, user_id: &str) -> Result<Vec<PickupRequest>> {
        self.requests.get_pickup_requests_by_user(user_id).await
    }

    pub async fn get_pending_pickup_requests(&self) -> Result<Vec<PickupRequestListing>> {
        self.requests.get_pending_pickup_requests().await
    }

    pub async fn get_pickup_requests_for_dealer(&self, actor: &Actor) -> Result<Vec<PickupRequest>> {
        actor.require_role(UserRole::Dealer)?;
        self.requests
            .get_pickup_requests_by_dealer(&actor.user_id)
            .await
    }

    pub async fn get_pickup_requests_for_rider(&self, actor: &Actor) -> Result<Vec<PickupRequest>> {
        actor.require_role(UserRole::Rider)?;
        self.requests
            .get_pickup_requests_by_rider(&actor.user_id)
            .await
    }
}
