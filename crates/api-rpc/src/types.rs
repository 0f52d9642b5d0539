//! RPC Request/Response Types
//!
//! Parameters are passed by name. Results are the core domain records
//! serialized as-is, except where a method returns a bare count.

use rust_decimal::Decimal;
use sajilo_core::application::{ExternalIdentity, NewItem, NewPickupRequest};
use sajilo_core::domain::{Actor, ItemStatus, UserRole};
use serde::{Deserialize, Serialize};

/// Methods scoped to the acting user only
/// (`item.for_dealer.v1`, `notification.list.v1`, ...)
#[derive(Debug, Deserialize)]
pub struct ActorRequest {
    pub actor: Actor,
}

/// user.sync.v1 - Mirror an identity-provider user
#[derive(Debug, Deserialize)]
pub struct SyncUserRequest {
    pub identity: ExternalIdentity,
}

/// user.update_role.v1
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub user_id: String,
    pub role: UserRole,
}

/// user.get.v1, item.by_user.v1, pickup.by_user.v1
#[derive(Debug, Deserialize)]
pub struct UserRef {
    pub user_id: String,
}

/// item.create.v1
#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub actor: Actor,
    pub item: NewItem,
}

/// item.get.v1
#[derive(Debug, Deserialize)]
pub struct GetItemRequest {
    pub item_id: String,
}

/// item.accept.v1, item.pickup.v1, item.complete.v1
#[derive(Debug, Deserialize)]
pub struct ItemActionRequest {
    pub actor: Actor,
    pub item_id: String,
}

/// item.assign_rider.v1
#[derive(Debug, Deserialize)]
pub struct AssignItemRiderRequest {
    pub actor: Actor,
    pub item_id: String,
    pub rider_id: String,
}

/// item.update_status.v1
#[derive(Debug, Deserialize)]
pub struct UpdateItemStatusRequest {
    pub actor: Actor,
    pub item_id: String,
    pub status: ItemStatus,
}

/// pickup.create.v1
#[derive(Debug, Deserialize)]
pub struct CreatePickupRequest {
    pub actor: Actor,
    pub request: NewPickupRequest,
}

/// pickup.get.v1
#[derive(Debug, Deserialize)]
pub struct GetPickupRequest {
    pub request_id: String,
}

/// pickup.accept_offer.v1, pickup.complete.v1
#[derive(Debug, Deserialize)]
pub struct PickupActionRequest {
    pub actor: Actor,
    pub request_id: String,
}

/// pickup.offer.v1
#[derive(Debug, Deserialize)]
pub struct MakeOfferRequest {
    pub actor: Actor,
    pub request_id: String,
    pub price: Decimal,
}

/// pickup.assign_rider.v1
#[derive(Debug, Deserialize)]
pub struct AssignPickupRiderRequest {
    pub actor: Actor,
    pub request_id: String,
    pub rider_id: String,
}

/// notification.mark_read.v1
#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub actor: Actor,
    pub notification_id: String,
}

/// notification.unread_count.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

/// notification.mark_all_read.v1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkAllReadResponse {
    pub updated: u64,
}
