//! Purchase lifecycle status.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle status of a purchase.
///
/// Happy path: Draft -> Submitted -> Reviewed -> Assigned -> Processed ->
/// Done -> Accept. Rejected is terminal for the unhappy path; from there the
/// purchase may only be deleted. Reviewed and Assigned are never written
/// directly - they are side effects of operator assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseStatus {
    Draft,
    Submitted,
    Reviewed,
    Accept,
    Assigned,
    Processed,
    Rejected,
    Done,
}

impl PurchaseStatus {
    /// Stored/wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseStatus::Draft => "draft",
            PurchaseStatus::Submitted => "submitted",
            PurchaseStatus::Reviewed => "reviewed",
            PurchaseStatus::Accept => "accept",
            PurchaseStatus::Assigned => "assigned",
            PurchaseStatus::Processed => "processed",
            PurchaseStatus::Rejected => "rejected",
            PurchaseStatus::Done => "done",
        }
    }

    /// Parse a stored status value.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(PurchaseStatus::Draft),
            "submitted" => Some(PurchaseStatus::Submitted),
            "reviewed" => Some(PurchaseStatus::Reviewed),
            "accept" => Some(PurchaseStatus::Accept),
            "assigned" => Some(PurchaseStatus::Assigned),
            "processed" => Some(PurchaseStatus::Processed),
            "rejected" => Some(PurchaseStatus::Rejected),
            "done" => Some(PurchaseStatus::Done),
            _ => None,
        }
    }

    /// Statuses from which a purchase may be deleted.
    pub fn deletable(&self) -> bool {
        matches!(self, PurchaseStatus::Draft | PurchaseStatus::Rejected)
    }

    /// Statuses in which the customer may still edit purchase content.
    pub fn editable(&self) -> bool {
        matches!(self, PurchaseStatus::Draft)
    }
}

impl fmt::Display for PurchaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for status in [
            PurchaseStatus::Draft,
            PurchaseStatus::Submitted,
            PurchaseStatus::Reviewed,
            PurchaseStatus::Accept,
            PurchaseStatus::Assigned,
            PurchaseStatus::Processed,
            PurchaseStatus::Rejected,
            PurchaseStatus::Done,
        ] {
            assert_eq!(PurchaseStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(PurchaseStatus::parse("shipped"), None);
        assert_eq!(PurchaseStatus::parse(""), None);
    }

    #[test]
    fn test_deletable() {
        assert!(PurchaseStatus::Draft.deletable());
        assert!(PurchaseStatus::Rejected.deletable());
        assert!(!PurchaseStatus::Submitted.deletable());
        assert!(!PurchaseStatus::Done.deletable());
        assert!(!PurchaseStatus::Accept.deletable());
    }
}
