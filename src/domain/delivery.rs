//! Shipping addresses and purchase deliveries.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer-owned shipping address.
///
/// At most one default per customer; setting a new default un-defaults the
/// previous one in the same transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub id: i64,
    pub uuid: Uuid,
    pub customer: Uuid,
    /// E.g. "Home", "Office".
    pub label: String,
    pub recipient: String,
    pub telephone: String,
    pub address: String,
    pub postal_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// E.g. "Put in garage".
    pub notes: String,
    pub is_default: bool,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

/// Fields for creating a shipping address.
#[derive(Debug, Clone)]
pub struct NewShippingAddress {
    pub label: String,
    pub recipient: String,
    pub telephone: String,
    pub address: String,
    pub postal_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub notes: String,
    pub is_default: bool,
}

/// Full delivery schedule; all three fields are meaningful together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliverySchedule {
    pub date: NaiveDate,
    pub time_start: NaiveTime,
    pub time_end: NaiveTime,
}

/// Delivery target and optional schedule for a purchase; 0 or 1 per purchase.
///
/// A schedule date in the past, observed while the purchase is still Draft,
/// is auto-cleared on the next read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseDelivery {
    pub id: i64,
    pub uuid: Uuid,
    pub purchase_id: i64,
    pub shipping_address: Option<Uuid>,
    pub schedule: Option<DeliverySchedule>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}
