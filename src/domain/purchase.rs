//! Purchase and its status change log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::delivery::DeliverySchedule;
use super::status::PurchaseStatus;

/// A top-level shopping task owned by a customer.
///
/// The customer is immutable after creation; status only moves along the
/// legal transition graph enforced by the lifecycle service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub id: i64,
    pub uuid: Uuid,
    pub customer: Uuid,
    pub label: String,
    pub excerpt: Option<String>,
    pub description: String,
    /// When the customer wants the shopping done.
    pub schedule: DateTime<Utc>,
    /// Shopping place preferred by the customer.
    pub merchant: String,
    pub status: PurchaseStatus,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

/// Fields for creating a purchase. Status is always Draft on create.
#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub label: String,
    pub excerpt: Option<String>,
    pub description: String,
    pub schedule: DateTime<Utc>,
    pub merchant: String,
    /// Shipping address to attach as the delivery target, if any.
    pub shipping_address: Option<Uuid>,
}

/// Content fields the owner may change while the purchase is editable.
#[derive(Debug, Clone, Default)]
pub struct PurchaseUpdate {
    pub label: Option<String>,
    pub excerpt: Option<Option<String>>,
    pub description: Option<String>,
    pub schedule: Option<DateTime<Utc>>,
    pub merchant: Option<String>,
    pub shipping_address: Option<Uuid>,
    /// Outer None leaves the schedule alone; Some(None) clears it.
    pub delivery_schedule: Option<Option<DeliverySchedule>>,
}

/// Immutable change-log entry written with every status change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseStatusChange {
    pub id: i64,
    pub uuid: Uuid,
    pub purchase_id: i64,
    /// Actor that caused the change; None for system-applied effects.
    pub changed_by: Option<Uuid>,
    pub old_status: PurchaseStatus,
    pub new_status: PurchaseStatus,
    pub date_created: DateTime<Utc>,
}

/// Derived read-side values for a purchase. Recomputed on every call,
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseAggregates {
    /// Sum of goods bills, null bills counted as zero.
    pub bill_summary: i64,
    pub has_operator: bool,
    pub has_delivery: bool,
    /// A delivery row exists with all three schedule fields set.
    pub has_schedule: bool,
}

/// Derived per-necessary counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NecessaryAggregates {
    pub total_count: i64,
    pub done_count: i64,
    pub skip_count: i64,
    pub accept_count: i64,
    /// Goods not yet processed by an operator.
    pub left_count: i64,
}
