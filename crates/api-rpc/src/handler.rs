//! RPC Method Handlers
//!
//! Thin adapters from RPC params onto the core services. Mutating methods
//! draw from the shared rate limiter before touching a service.

use crate::error::{throttled, to_rpc_error};
use crate::rate_limiter::RateLimiter;
use crate::types::{
    ActorRequest, AssignItemRiderRequest, AssignPickupRiderRequest, CreateItemRequest,
    CreatePickupRequest, GetItemRequest, GetPickupRequest, ItemActionRequest, MakeOfferRequest,
    MarkAllReadResponse, MarkReadRequest, PickupActionRequest, SyncUserRequest,
    UnreadCountResponse, UpdateItemStatusRequest, UpdateRoleRequest, UserRef,
};
use jsonrpsee::types::ErrorObjectOwned;
use sajilo_core::application::{
    ItemService, NotificationService, PersistedNotificationSink, PickupRequestService,
    UserService,
};
use sajilo_core::domain::{
    AcceptedItem, Item, ItemListing, Notification, PickupRequest, PickupRequestListing,
    Transaction, User,
};
use sajilo_core::port::{IdProvider, NotificationSink, Repositories, TimeProvider};
use std::sync::Arc;
use tracing::debug;

type RpcResult<T> = Result<T, ErrorObjectOwned>;

/// RPC Handler with injected services
pub struct RpcHandler {
    users: UserService,
    items: ItemService,
    pickups: PickupRequestService,
    notifications: NotificationService,
    rate_limiter: RateLimiter,
}

impl RpcHandler {
    /// Wire the services over one port set; notifications are persisted
    pub fn new(
        repos: &Repositories,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
        rate_limiter: RateLimiter,
    ) -> Self {
        let notifier: Arc<dyn NotificationSink> = Arc::new(PersistedNotificationSink::new(
            repos.notifications.clone(),
            id_provider.clone(),
            time_provider.clone(),
        ));

        Self {
            users: UserService::new(repos.users.clone()),
            items: ItemService::new(
                repos,
                notifier.clone(),
                id_provider.clone(),
                time_provider.clone(),
            ),
            pickups: PickupRequestService::new(repos, notifier, id_provider, time_provider),
            notifications: NotificationService::new(repos.notifications.clone()),
            rate_limiter,
        }
    }

    fn throttle(&self, method: &str) -> RpcResult<()> {
        if self.rate_limiter.try_acquire() {
            Ok(())
        } else {
            debug!(method, "Request throttled");
            Err(throttled())
        }
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    /// user.sync.v1
    pub async fn sync_user(&self, params: SyncUserRequest) -> RpcResult<User> {
        self.throttle("user.sync.v1")?;
        self.users
            .sync_user_to_database(&params.identity)
            .await
            .map_err(to_rpc_error)
    }

    /// user.update_role.v1
    pub async fn update_user_role(&self, params: UpdateRoleRequest) -> RpcResult<User> {
        self.throttle("user.update_role.v1")?;
        self.users
            .update_user_role_in_database(&params.user_id, params.role)
            .await
            .map_err(to_rpc_error)
    }

    /// user.get.v1
    pub async fn get_user(&self, params: UserRef) -> RpcResult<Option<User>> {
        self.users
            .get_user_from_database(&params.user_id)
            .await
            .map_err(to_rpc_error)
    }

    /// user.riders.v1
    pub async fn riders(&self) -> RpcResult<Vec<User>> {
        self.users.get_riders().await.map_err(to_rpc_error)
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    /// item.create.v1
    pub async fn create_item(&self, params: CreateItemRequest) -> RpcResult<Item> {
        self.throttle("item.create.v1")?;
        self.items
            .create_new_item(&params.actor, params.item)
            .await
            .map_err(to_rpc_error)
    }

    /// item.get.v1
    pub async fn get_item(&self, params: GetItemRequest) -> RpcResult<Item> {
        self.items.get_item(&params.item_id).await.map_err(to_rpc_error)
    }

    /// item.available.v1
    pub async fn available_items(&self) -> RpcResult<Vec<ItemListing>> {
        self.items.get_available_items().await.map_err(to_rpc_error)
    }

    /// item.by_user.v1
    pub async fn items_by_user(&self, params: UserRef) -> RpcResult<Vec<Item>> {
        self.items
            .get_items_by_user(&params.user_id)
            .await
            .map_err(to_rpc_error)
    }

    /// item.for_dealer.v1
    pub async fn items_for_dealer(&self, params: ActorRequest) -> RpcResult<Vec<Item>> {
        self.items
            .get_items_for_dealer(&params.actor)
            .await
            .map_err(to_rpc_error)
    }

    /// item.for_rider.v1
    pub async fn items_for_rider(&self, params: ActorRequest) -> RpcResult<Vec<Item>> {
        self.items
            .get_items_for_rider(&params.actor)
            .await
            .map_err(to_rpc_error)
    }

    /// item.accept.v1
    pub async fn accept_item(&self, params: ItemActionRequest) -> RpcResult<AcceptedItem> {
        self.throttle("item.accept.v1")?;
        self.items
            .accept_item_by_dealer(&params.actor, &params.item_id)
            .await
            .map_err(to_rpc_error)
    }

    /// item.assign_rider.v1
    pub async fn assign_item_rider(&self, params: AssignItemRiderRequest) -> RpcResult<Item> {
        self.throttle("item.assign_rider.v1")?;
        self.items
            .assign_rider_to_item(&params.actor, &params.item_id, &params.rider_id)
            .await
            .map_err(to_rpc_error)
    }

    /// item.pickup.v1
    pub async fn pickup_item(&self, params: ItemActionRequest) -> RpcResult<Item> {
        self.throttle("item.pickup.v1")?;
        self.items
            .pickup_item(&params.actor, &params.item_id)
            .await
            .map_err(to_rpc_error)
    }

    /// item.complete.v1
    pub async fn complete_item(&self, params: ItemActionRequest) -> RpcResult<Item> {
        self.throttle("item.complete.v1")?;
        self.items
            .complete_item(&params.actor, &params.item_id)
            .await
            .map_err(to_rpc_error)
    }

    /// item.update_status.v1
    pub async fn update_item_status(&self, params: UpdateItemStatusRequest) -> RpcResult<Item> {
        self.throttle("item.update_status.v1")?;
        self.items
            .update_item_status(&params.actor, &params.item_id, params.status)
            .await
            .map_err(to_rpc_error)
    }

    /// transaction.list.v1
    pub async fn transactions(&self, params: ActorRequest) -> RpcResult<Vec<Transaction>> {
        self.items
            .get_transactions(&params.actor)
            .await
            .map_err(to_rpc_error)
    }

    // ------------------------------------------------------------------
    // Pickup requests
    // ------------------------------------------------------------------

    /// pickup.create.v1
    pub async fn create_pickup(&self, params: CreatePickupRequest) -> RpcResult<PickupRequest> {
        self.throttle("pickup.create.v1")?;
        self.pickups
            .create_pickup_request(&params.actor, params.request)
            .await
            .map_err(to_rpc_error)
    }

    /// pickup.get.v1
    pub async fn get_pickup(&self, params: GetPickupRequest) -> RpcResult<PickupRequest> {
        self.pickups
            .get_pickup_request(&params.request_id)
            .await
            .map_err(to_rpc_error)
    }

    /// pickup.by_user.v1
    pub async fn pickups_by_user(&self, params: UserRef) -> RpcResult<Vec<PickupRequest>> {
        self.pickups
            .get_pickup_requests_by_user(&params.user_id)
            .await
            .map_err(to_rpc_error)
    }

    /// pickup.pending.v1
    pub async fn pending_pickups(&self) -> RpcResult<Vec<PickupRequestListing>> {
        self.pickups
            .get_pending_pickup_requests()
            .await
            .map_err(to_rpc_error)
    }

    /// pickup.for_dealer.v1
    pub async fn pickups_for_dealer(&self, params: ActorRequest) -> RpcResult<Vec<PickupRequest>> {
        self.pickups
            .get_pickup_requests_for_dealer(&params.actor)
            .await
            .map_err(to_rpc_error)
    }

    /// pickup.for_rider.v1
    pub async fn pickups_for_rider(&self, params: ActorRequest) -> RpcResult<Vec<PickupRequest>> {
        self.pickups
            .get_pickup_requests_for_rider(&params.actor)
            .await
            .map_err(to_rpc_error)
    }

    /// pickup.offer.v1
    pub async fn make_offer(&self, params: MakeOfferRequest) -> RpcResult<PickupRequest> {
        self.throttle("pickup.offer.v1")?;
        self.pickups
            .make_offer(&params.actor, &params.request_id, params.price)
            .await
            .map_err(to_rpc_error)
    }

    /// pickup.accept_offer.v1
    pub async fn accept_offer(&self, params: PickupActionRequest) -> RpcResult<PickupRequest> {
        self.throttle("pickup.accept_offer.v1")?;
        self.pickups
            .accept_offer(&params.actor, &params.request_id)
            .await
            .map_err(to_rpc_error)
    }

    /// pickup.assign_rider.v1
    pub async fn assign_pickup_rider(
        &self,
        params: AssignPickupRiderRequest,
    ) -> RpcResult<PickupRequest> {
        self.throttle("pickup.assign_rider.v1")?;
        self.pickups
            .assign_rider(&params.actor, &params.request_id, &params.rider_id)
            .await
            .map_err(to_rpc_error)
    }

    /// pickup.complete.v1
    pub async fn complete_pickup(&self, params: PickupActionRequest) -> RpcResult<PickupRequest> {
        self.throttle("pickup.complete.v1")?;
        self.pickups
            .complete(&params.actor, &params.request_id)
            .await
            .map_err(to_rpc_error)
    }

    // ------------------------------------------------------------------
    // Notifications
    // ------------------------------------------------------------------

    /// notification.list.v1
    pub async fn notifications(&self, params: ActorRequest) -> RpcResult<Vec<Notification>> {
        self.notifications
            .list(&params.actor)
            .await
            .map_err(to_rpc_error)
    }

    /// notification.unread_count.v1
    pub async fn unread_count(&self, params: ActorRequest) -> RpcResult<UnreadCountResponse> {
        let count = self
            .notifications
            .unread_count(&params.actor)
            .await
            .map_err(to_rpc_error)?;
        Ok(UnreadCountResponse { count })
    }

    /// notification.mark_read.v1
    pub async fn mark_read(&self, params: MarkReadRequest) -> RpcResult<Notification> {
        self.throttle("notification.mark_read.v1")?;
        self.notifications
            .mark_as_read(&params.actor, &params.notification_id)
            .await
            .map_err(to_rpc_error)
    }

    /// notification.mark_all_read.v1
    pub async fn mark_all_read(&self, params: ActorRequest) -> RpcResult<MarkAllReadResponse> {
        self.throttle("notification.mark_all_read.v1")?;
        let updated = self
            .notifications
            .mark_all_as_read(&params.actor)
            .await
            .map_err(to_rpc_error)?;
        Ok(MarkAllReadResponse { updated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::code;
    use sajilo_core::domain::Actor;
    use sajilo_core::port::id_provider::mocks::SequentialIdProvider;
    use sajilo_core::port::time_provider::mocks::FixedTimeProvider;

    fn handler(burst: u32) -> RpcHandler {
        RpcHandler::new(
            &Repositories::unconfigured(),
            Arc::new(SequentialIdProvider::new()),
            Arc::new(FixedTimeProvider::new(0)),
            RateLimiter::new(burst, 0),
        )
    }

    #[tokio::test]
    async fn test_unconfigured_store_surfaces_code() {
        let err = handler(10).available_items().await.unwrap_err();
        assert_eq!(err.code(), code::NOT_CONFIGURED);
        assert_eq!(err.message(), "Database not configured");
    }

    #[tokio::test]
    async fn test_mutations_are_throttled_reads_are_not() {
        let handler = handler(1);
        let accept = || ItemActionRequest {
            actor: Actor::dealer("dealer_1"),
            item_id: "item_1".to_string(),
        };

        // First call spends the only token and reaches the store
        let err = handler.accept_item(accept()).await.unwrap_err();
        assert_eq!(err.code(), code::NOT_CONFIGURED);

        let err = handler.accept_item(accept()).await.unwrap_err();
        assert_eq!(err.code(), code::THROTTLED);

        let err = handler.pending_pickups().await.unwrap_err();
        assert_eq!(err.code(), code::NOT_CONFIGURED);
    }

    #[tokio::test]
    async fn test_role_violation_maps_to_forbidden() {
        let err = handler(10)
            .accept_item(ItemActionRequest {
                actor: Actor::customer("customer_1"),
                item_id: "item_1".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), code::FORBIDDEN);
    }
}
