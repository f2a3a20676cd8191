//! Domain entities and enums.
//!
//! Pure data: persisted records plus the enums that constrain them. All
//! behavior (transition guards, side effects, aggregates) lives in
//! [`crate::services`].

mod actor;
mod assign;
mod catalog;
mod delivery;
mod goods;
mod purchase;
mod status;

pub use actor::{Actor, Role};
pub use assign::{GoodsAssigned, PurchaseAssigned};
pub use catalog::{Catalog, CatalogStatus, GoodsCatalog, NewCatalog};
pub use delivery::{DeliverySchedule, NewShippingAddress, PurchaseDelivery, ShippingAddress};
pub use goods::{
    Goods, GoodsSource, GoodsUpdate, Metric, Necessary, NecessaryUpdate, NewGoods, NewNecessary,
};
pub use purchase::{
    NecessaryAggregates, NewPurchase, Purchase, PurchaseAggregates, PurchaseStatusChange,
    PurchaseUpdate,
};
pub use status::PurchaseStatus;
