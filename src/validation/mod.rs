//! Input validation for data crossing the service boundary.
//!
//! Centralized checks for fields arriving from the excluded marshaling
//! layer. Everything returns [`CoreError::Validation`] so the boundary can
//! map failures uniformly.

use crate::domain::{Metric, PurchaseStatus};
use crate::error::CoreError;

/// Length limits for validated fields.
pub mod limits {
    /// Maximum label length (purchases, necessaries, goods, addresses).
    pub const MAX_LABEL_LENGTH: usize = 255;
    /// Maximum excerpt length.
    pub const MAX_EXCERPT_LENGTH: usize = 255;
    /// Maximum free-text length (description, merchant, address, notes).
    pub const MAX_TEXT_LENGTH: usize = 4096;
    /// Maximum goods quantity per line item.
    pub const MAX_QUANTITY: i64 = 1_000_000;
}

/// Error constants for validation failures.
pub mod errmsg {
    pub const LABEL_EMPTY: &str = "label cannot be empty";
    pub const LABEL_TOO_LONG: &str = "label exceeds maximum length";
    pub const EXCERPT_TOO_LONG: &str = "excerpt exceeds maximum length";
    pub const TEXT_TOO_LONG: &str = "text exceeds maximum length";
    pub const QUANTITY_NOT_POSITIVE: &str = "quantity must be greater than zero";
    pub const QUANTITY_TOO_LARGE: &str = "quantity exceeds maximum";
    pub const UNKNOWN_METRIC: &str = "unknown metric";
    pub const UNKNOWN_STATUS: &str = "unknown status";
    pub const STATUS_FILTER_EMPTY: &str = "status filter cannot be empty";
}

/// Validate a label field.
///
/// Rules:
/// - Must not be empty (after trimming)
/// - Maximum 255 characters
pub fn validate_label(label: &str) -> Result<(), CoreError> {
    if label.trim().is_empty() {
        return Err(CoreError::validation(errmsg::LABEL_EMPTY));
    }
    if label.len() > limits::MAX_LABEL_LENGTH {
        return Err(CoreError::validation(format!(
            "{} (max: {}, got: {})",
            errmsg::LABEL_TOO_LONG,
            limits::MAX_LABEL_LENGTH,
            label.len()
        )));
    }
    Ok(())
}

/// Validate an optional excerpt field.
pub fn validate_excerpt(excerpt: Option<&str>) -> Result<(), CoreError> {
    if let Some(excerpt) = excerpt {
        if excerpt.len() > limits::MAX_EXCERPT_LENGTH {
            return Err(CoreError::validation(format!(
                "{} (max: {}, got: {})",
                errmsg::EXCERPT_TOO_LONG,
                limits::MAX_EXCERPT_LENGTH,
                excerpt.len()
            )));
        }
    }
    Ok(())
}

/// Validate a free-text field (description, merchant, notes).
pub fn validate_text(text: &str) -> Result<(), CoreError> {
    if text.len() > limits::MAX_TEXT_LENGTH {
        return Err(CoreError::validation(format!(
            "{} (max: {}, got: {})",
            errmsg::TEXT_TOO_LONG,
            limits::MAX_TEXT_LENGTH,
            text.len()
        )));
    }
    Ok(())
}

/// Validate a goods quantity.
pub fn validate_quantity(quantity: i64) -> Result<(), CoreError> {
    if quantity <= 0 {
        return Err(CoreError::validation(errmsg::QUANTITY_NOT_POSITIVE));
    }
    if quantity > limits::MAX_QUANTITY {
        return Err(CoreError::validation(format!(
            "{} (max: {}, got: {})",
            errmsg::QUANTITY_TOO_LARGE,
            limits::MAX_QUANTITY,
            quantity
        )));
    }
    Ok(())
}

/// Parse a stored metric value, rejecting unknown slugs.
pub fn parse_metric(value: &str) -> Result<Metric, CoreError> {
    Metric::parse(value)
        .ok_or_else(|| CoreError::validation(format!("{}: {}", errmsg::UNKNOWN_METRIC, value)))
}

/// Parse a comma-separated status filter (e.g. "submitted,draft").
pub fn parse_status_filter(filter: &str) -> Result<Vec<PurchaseStatus>, CoreError> {
    let mut statuses = Vec::new();
    for part in filter.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let status = PurchaseStatus::parse(part)
            .ok_or_else(|| CoreError::validation(format!("{}: {}", errmsg::UNKNOWN_STATUS, part)))?;
        if !statuses.contains(&status) {
            statuses.push(status);
        }
    }
    if statuses.is_empty() {
        return Err(CoreError::validation(errmsg::STATUS_FILTER_EMPTY));
    }
    Ok(statuses)
}
