//! Necessaries and goods line items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Measurement unit for a goods quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    Kilogram,
    Hectogram,
    Gram,
    Milligram,
    Liter,
    Pack,
    Pouch,
    Piece,
    Bunch,
    Sack,
    Unit,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Kilogram => "kg",
            Metric::Hectogram => "hg",
            Metric::Gram => "g",
            Metric::Milligram => "mg",
            Metric::Liter => "liter",
            Metric::Pack => "pack",
            Metric::Pouch => "pouch",
            Metric::Piece => "piece",
            Metric::Bunch => "bunch",
            Metric::Sack => "sack",
            Metric::Unit => "unit",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "kg" => Some(Metric::Kilogram),
            "hg" => Some(Metric::Hectogram),
            "g" => Some(Metric::Gram),
            "mg" => Some(Metric::Milligram),
            "liter" => Some(Metric::Liter),
            "pack" => Some(Metric::Pack),
            "pouch" => Some(Metric::Pouch),
            "piece" => Some(Metric::Piece),
            "bunch" => Some(Metric::Bunch),
            "sack" => Some(Metric::Sack),
            "unit" => Some(Metric::Unit),
            _ => None,
        }
    }
}

/// A named grouping of goods within a purchase (e.g. "kitchen supplies").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Necessary {
    pub id: i64,
    pub uuid: Uuid,
    pub customer: Uuid,
    pub purchase_id: i64,
    pub label: String,
    pub excerpt: Option<String>,
    pub description: String,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

/// Fields for creating a necessary under a purchase.
#[derive(Debug, Clone)]
pub struct NewNecessary {
    pub purchase: Uuid,
    pub label: String,
    pub excerpt: Option<String>,
    pub description: String,
}

/// Content fields the owner may change on a necessary.
#[derive(Debug, Clone, Default)]
pub struct NecessaryUpdate {
    pub label: Option<String>,
    pub excerpt: Option<Option<String>>,
    pub description: Option<String>,
}

/// A single line item within a necessary.
///
/// `purchase_id` is denormalized from the parent necessary and re-derived on
/// every save; price and bill are operator-set (bill = price x quantity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goods {
    pub id: i64,
    pub uuid: Uuid,
    pub customer: Uuid,
    pub purchase_id: i64,
    pub necessary_id: i64,
    pub label: String,
    pub excerpt: Option<String>,
    pub description: String,
    pub quantity: i64,
    pub metric: Metric,
    pub price: Option<i64>,
    pub bill: Option<i64>,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

/// Where a new goods item gets its label from.
#[derive(Debug, Clone)]
pub enum GoodsSource {
    /// Customer types the label in.
    Manual { label: String },
    /// Label prefilled from a published catalog entry; also records the
    /// goods-catalog link.
    Catalog { catalog: Uuid },
}

/// Fields for creating a goods item.
#[derive(Debug, Clone)]
pub struct NewGoods {
    pub necessary: Uuid,
    pub source: GoodsSource,
    pub excerpt: Option<String>,
    pub description: String,
    pub quantity: i64,
    pub metric: Metric,
}

/// Content fields the owner may change on a goods item.
#[derive(Debug, Clone, Default)]
pub struct GoodsUpdate {
    pub label: Option<String>,
    pub excerpt: Option<Option<String>>,
    pub description: Option<String>,
    pub quantity: Option<i64>,
    pub metric: Option<Metric>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_round_trip() {
        for metric in [
            Metric::Kilogram,
            Metric::Hectogram,
            Metric::Gram,
            Metric::Milligram,
            Metric::Liter,
            Metric::Pack,
            Metric::Pouch,
            Metric::Piece,
            Metric::Bunch,
            Metric::Sack,
            Metric::Unit,
        ] {
            assert_eq!(Metric::parse(metric.as_str()), Some(metric));
        }
    }

    #[test]
    fn test_metric_unknown() {
        assert_eq!(Metric::parse("tonne"), None);
    }
}
