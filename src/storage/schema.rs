//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query
//! building, plus the DDL used to initialize a fresh database.

use sea_query::Iden;

/// Purchases table schema.
#[derive(Iden)]
pub enum Purchases {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "uuid"]
    Uuid,
    #[iden = "customer"]
    Customer,
    #[iden = "label"]
    Label,
    #[iden = "excerpt"]
    Excerpt,
    #[iden = "description"]
    Description,
    #[iden = "schedule"]
    Schedule,
    #[iden = "merchant"]
    Merchant,
    #[iden = "status"]
    Status,
    #[iden = "date_created"]
    DateCreated,
    #[iden = "date_updated"]
    DateUpdated,
}

/// Purchase status change-log table schema.
#[derive(Iden)]
pub enum PurchaseStatusChanges {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "uuid"]
    Uuid,
    #[iden = "purchase_id"]
    PurchaseId,
    #[iden = "changed_by"]
    ChangedBy,
    #[iden = "old_status"]
    OldStatus,
    #[iden = "new_status"]
    NewStatus,
    #[iden = "date_created"]
    DateCreated,
}

/// Necessaries table schema.
#[derive(Iden)]
pub enum Necessaries {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "uuid"]
    Uuid,
    #[iden = "customer"]
    Customer,
    #[iden = "purchase_id"]
    PurchaseId,
    #[iden = "label"]
    Label,
    #[iden = "excerpt"]
    Excerpt,
    #[iden = "description"]
    Description,
    #[iden = "date_created"]
    DateCreated,
    #[iden = "date_updated"]
    DateUpdated,
}

/// Goods table schema.
#[derive(Iden)]
pub enum GoodsTable {
    #[iden = "goods"]
    Table,
    #[iden = "id"]
    Id,
    #[iden = "uuid"]
    Uuid,
    #[iden = "customer"]
    Customer,
    #[iden = "purchase_id"]
    PurchaseId,
    #[iden = "necessary_id"]
    NecessaryId,
    #[iden = "label"]
    Label,
    #[iden = "excerpt"]
    Excerpt,
    #[iden = "description"]
    Description,
    #[iden = "quantity"]
    Quantity,
    #[iden = "metric"]
    Metric,
    #[iden = "price"]
    Price,
    #[iden = "bill"]
    Bill,
    #[iden = "date_created"]
    DateCreated,
    #[iden = "date_updated"]
    DateUpdated,
}

/// Purchase assignment table schema.
#[derive(Iden)]
pub enum PurchaseAssignments {
    #[iden = "purchase_assigned"]
    Table,
    #[iden = "id"]
    Id,
    #[iden = "uuid"]
    Uuid,
    #[iden = "purchase_id"]
    PurchaseId,
    #[iden = "operator"]
    Operator,
    #[iden = "is_done"]
    IsDone,
    #[iden = "is_accept"]
    IsAccept,
    #[iden = "date_created"]
    DateCreated,
    #[iden = "date_updated"]
    DateUpdated,
}

/// Goods assignment table schema.
#[derive(Iden)]
pub enum GoodsAssignments {
    #[iden = "goods_assigned"]
    Table,
    #[iden = "id"]
    Id,
    #[iden = "uuid"]
    Uuid,
    #[iden = "goods_id"]
    GoodsId,
    #[iden = "operator"]
    Operator,
    #[iden = "is_skip"]
    IsSkip,
    #[iden = "is_done"]
    IsDone,
    #[iden = "is_accept"]
    IsAccept,
    #[iden = "date_created"]
    DateCreated,
    #[iden = "date_updated"]
    DateUpdated,
}

/// Purchase deliveries table schema.
#[derive(Iden)]
pub enum PurchaseDeliveries {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "uuid"]
    Uuid,
    #[iden = "purchase_id"]
    PurchaseId,
    #[iden = "shipping_address"]
    ShippingAddress,
    #[iden = "schedule_date"]
    ScheduleDate,
    #[iden = "schedule_time_start"]
    ScheduleTimeStart,
    #[iden = "schedule_time_end"]
    ScheduleTimeEnd,
    #[iden = "date_created"]
    DateCreated,
    #[iden = "date_updated"]
    DateUpdated,
}

/// Shipping addresses table schema.
#[derive(Iden)]
pub enum ShippingAddresses {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "uuid"]
    Uuid,
    #[iden = "customer"]
    Customer,
    #[iden = "label"]
    Label,
    #[iden = "recipient"]
    Recipient,
    #[iden = "telephone"]
    Telephone,
    #[iden = "address"]
    Address,
    #[iden = "postal_code"]
    PostalCode,
    #[iden = "latitude"]
    Latitude,
    #[iden = "longitude"]
    Longitude,
    #[iden = "notes"]
    Notes,
    #[iden = "is_default"]
    IsDefault,
    #[iden = "date_created"]
    DateCreated,
    #[iden = "date_updated"]
    DateUpdated,
}

/// Catalogs table schema.
#[derive(Iden)]
pub enum Catalogs {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "uuid"]
    Uuid,
    #[iden = "label"]
    Label,
    #[iden = "metric"]
    Metric,
    #[iden = "status"]
    Status,
    #[iden = "date_created"]
    DateCreated,
    #[iden = "date_updated"]
    DateUpdated,
}

/// Goods-catalog link table schema.
#[derive(Iden)]
pub enum GoodsCatalogs {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "uuid"]
    Uuid,
    #[iden = "goods_id"]
    GoodsId,
    #[iden = "catalog_id"]
    CatalogId,
    #[iden = "date_created"]
    DateCreated,
}

/// SQL for creating all tables.
pub const CREATE_TABLES: &[&str] = &[
    r#"
CREATE TABLE IF NOT EXISTS purchases (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid TEXT NOT NULL UNIQUE,
    customer TEXT NOT NULL,
    label TEXT NOT NULL,
    excerpt TEXT,
    description TEXT NOT NULL DEFAULT '',
    schedule TEXT NOT NULL,
    merchant TEXT NOT NULL DEFAULT '',
    status TEXT NOT NULL DEFAULT 'draft',
    date_created TEXT NOT NULL,
    date_updated TEXT NOT NULL
);
"#,
    "CREATE INDEX IF NOT EXISTS idx_purchases_customer ON purchases(customer, status);",
    r#"
CREATE TABLE IF NOT EXISTS purchase_status_changes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid TEXT NOT NULL UNIQUE,
    purchase_id INTEGER NOT NULL REFERENCES purchases(id) ON DELETE CASCADE,
    changed_by TEXT,
    old_status TEXT NOT NULL,
    new_status TEXT NOT NULL,
    date_created TEXT NOT NULL
);
"#,
    "CREATE INDEX IF NOT EXISTS idx_status_changes_purchase ON purchase_status_changes(purchase_id);",
    r#"
CREATE TABLE IF NOT EXISTS necessaries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid TEXT NOT NULL UNIQUE,
    customer TEXT NOT NULL,
    purchase_id INTEGER NOT NULL REFERENCES purchases(id) ON DELETE CASCADE,
    label TEXT NOT NULL,
    excerpt TEXT,
    description TEXT NOT NULL DEFAULT '',
    date_created TEXT NOT NULL,
    date_updated TEXT NOT NULL
);
"#,
    "CREATE INDEX IF NOT EXISTS idx_necessaries_purchase ON necessaries(purchase_id);",
    r#"
CREATE TABLE IF NOT EXISTS goods (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid TEXT NOT NULL UNIQUE,
    customer TEXT NOT NULL,
    purchase_id INTEGER NOT NULL REFERENCES purchases(id) ON DELETE CASCADE,
    necessary_id INTEGER NOT NULL REFERENCES necessaries(id) ON DELETE CASCADE,
    label TEXT NOT NULL,
    excerpt TEXT,
    description TEXT NOT NULL DEFAULT '',
    quantity INTEGER NOT NULL,
    metric TEXT NOT NULL,
    price INTEGER,
    bill INTEGER,
    date_created TEXT NOT NULL,
    date_updated TEXT NOT NULL
);
"#,
    "CREATE INDEX IF NOT EXISTS idx_goods_necessary ON goods(necessary_id);",
    "CREATE INDEX IF NOT EXISTS idx_goods_purchase ON goods(purchase_id);",
    r#"
CREATE TABLE IF NOT EXISTS purchase_assigned (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid TEXT NOT NULL UNIQUE,
    purchase_id INTEGER NOT NULL UNIQUE REFERENCES purchases(id) ON DELETE CASCADE,
    operator TEXT,
    is_done INTEGER NOT NULL DEFAULT 0,
    is_accept INTEGER NOT NULL DEFAULT 0,
    date_created TEXT NOT NULL,
    date_updated TEXT NOT NULL
);
"#,
    r#"
CREATE TABLE IF NOT EXISTS goods_assigned (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid TEXT NOT NULL UNIQUE,
    goods_id INTEGER NOT NULL REFERENCES goods(id) ON DELETE CASCADE,
    operator TEXT NOT NULL,
    is_skip INTEGER NOT NULL DEFAULT 0,
    is_done INTEGER NOT NULL DEFAULT 0,
    is_accept INTEGER NOT NULL DEFAULT 0,
    date_created TEXT NOT NULL,
    date_updated TEXT NOT NULL,
    UNIQUE (goods_id, operator)
);
"#,
    "CREATE INDEX IF NOT EXISTS idx_goods_assigned_goods ON goods_assigned(goods_id);",
    r#"
CREATE TABLE IF NOT EXISTS purchase_deliveries (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid TEXT NOT NULL UNIQUE,
    purchase_id INTEGER NOT NULL UNIQUE REFERENCES purchases(id) ON DELETE CASCADE,
    shipping_address TEXT,
    schedule_date TEXT,
    schedule_time_start TEXT,
    schedule_time_end TEXT,
    date_created TEXT NOT NULL,
    date_updated TEXT NOT NULL
);
"#,
    r#"
CREATE TABLE IF NOT EXISTS shipping_addresses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid TEXT NOT NULL UNIQUE,
    customer TEXT NOT NULL,
    label TEXT NOT NULL,
    recipient TEXT NOT NULL DEFAULT '',
    telephone TEXT NOT NULL,
    address TEXT NOT NULL,
    postal_code TEXT NOT NULL DEFAULT '',
    latitude REAL,
    longitude REAL,
    notes TEXT NOT NULL DEFAULT '',
    is_default INTEGER NOT NULL DEFAULT 0,
    date_created TEXT NOT NULL,
    date_updated TEXT NOT NULL
);
"#,
    "CREATE INDEX IF NOT EXISTS idx_shipping_customer ON shipping_addresses(customer);",
    r#"
CREATE TABLE IF NOT EXISTS catalogs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid TEXT NOT NULL UNIQUE,
    label TEXT NOT NULL,
    metric TEXT NOT NULL,
    status TEXT NOT NULL DEFAULT 'draft',
    date_created TEXT NOT NULL,
    date_updated TEXT NOT NULL
);
"#,
    r#"
CREATE TABLE IF NOT EXISTS goods_catalogs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uuid TEXT NOT NULL UNIQUE,
    goods_id INTEGER NOT NULL UNIQUE REFERENCES goods(id) ON DELETE CASCADE,
    catalog_id INTEGER NOT NULL REFERENCES catalogs(id) ON DELETE CASCADE,
    date_created TEXT NOT NULL,
    UNIQUE (goods_id, catalog_id)
);
"#,
];
