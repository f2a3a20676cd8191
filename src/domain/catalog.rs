//! Product catalog and its link to goods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::goods::Metric;

/// Publication state of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogStatus {
    Draft,
    Publish,
}

impl CatalogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CatalogStatus::Draft => "draft",
            CatalogStatus::Publish => "publish",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(CatalogStatus::Draft),
            "publish" => Some(CatalogStatus::Publish),
            _ => None,
        }
    }
}

/// A shared product reference usable to prefill a goods item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub id: i64,
    pub uuid: Uuid,
    pub label: String,
    pub metric: Metric,
    pub status: CatalogStatus,
    pub date_created: DateTime<Utc>,
    pub date_updated: DateTime<Utc>,
}

/// Fields for creating a catalog entry.
#[derive(Debug, Clone)]
pub struct NewCatalog {
    pub label: String,
    pub metric: Metric,
    pub status: CatalogStatus,
}

/// Join row recording that a goods item was sourced from a catalog entry.
///
/// One per goods; the same catalog entry cannot be selected twice within
/// one necessary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoodsCatalog {
    pub id: i64,
    pub uuid: Uuid,
    pub goods_id: i64,
    pub catalog_id: i64,
    pub date_created: DateTime<Utc>,
}
