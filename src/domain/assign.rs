//! Assignment records binding operators to work.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Binds a purchase to an operator; one row per purchase.
///
/// Presence of the row with an operator flips the purchase to Assigned;
/// without an operator it flips to Reviewed. `is_accept` is never set
/// through any actor-facing path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseAssigned {
    pub id: i64,
    pub uuid: Uuid,
    pub purchase_id: i64,
    pub operator: Option<Uuid>,
    pub is_done: bool,
    pub is_accept: bool,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

/// Binds a goods item to an operator with three independent outcome flags.
///
/// is_skip / is_done are operator-set; is_accept is the customer
/// confirmation, legal only once the purchase is Done.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodsAssigned {
    pub id: i64,
    pub uuid: Uuid,
    pub goods_id: i64,
    pub operator: Uuid,
    pub is_skip: bool,
    pub is_done: bool,
    pub is_accept: bool,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}
