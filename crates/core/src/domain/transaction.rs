// Transaction Domain Model
//
// Links an item's customer, dealer and rider. Recorded together with the
// dealer acceptance; its status mirrors the item's.

use crate::domain::item::{ItemId, ItemStatus};
use crate::domain::user::UserId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Transaction ID (`txn_<millis>_<suffix>`)
pub type TransactionId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub item_id: ItemId,
    pub customer_id: UserId,
    pub dealer_id: UserId,
    pub rider_id: Option<UserId>,
    pub amount: Decimal,
    pub status: ItemStatus,
    pub created_at: i64, // epoch ms
    pub updated_at: i64,
}
