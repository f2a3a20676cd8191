//! Read-side queries and row mapping.
//!
//! Connection-level functions run against whatever executor the caller
//! holds (a pooled read or an open transaction); the `&self` wrappers
//! acquire a pooled connection for lock-free reads.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_query::{Expr, Order, Query, SqliteQueryBuilder};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};
use uuid::Uuid;

use crate::domain::{
    Catalog, CatalogStatus, DeliverySchedule, Goods, GoodsAssigned, GoodsCatalog, Metric,
    Necessary, Purchase, PurchaseAssigned, PurchaseDelivery, PurchaseStatus, PurchaseStatusChange,
    ShippingAddress,
};
use crate::error::{CoreError, Result};
use crate::storage::schema::{
    Catalogs, GoodsAssignments, GoodsCatalogs, GoodsTable, Necessaries, PurchaseAssignments,
    PurchaseDeliveries, PurchaseStatusChanges, Purchases, ShippingAddresses,
};

use super::SqliteStore;

// ============================================================================
// Value parsing
// ============================================================================

pub(crate) fn parse_ts(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| CoreError::InvalidData(format!("timestamp '{value}': {e}")))
}

pub(crate) fn parse_status(value: &str) -> Result<PurchaseStatus> {
    PurchaseStatus::parse(value)
        .ok_or_else(|| CoreError::InvalidData(format!("purchase status '{value}'")))
}

pub(crate) fn parse_metric_col(value: &str) -> Result<Metric> {
    Metric::parse(value).ok_or_else(|| CoreError::InvalidData(format!("metric '{value}'")))
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| CoreError::InvalidData(format!("date '{value}': {e}")))
}

fn parse_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .map_err(|e| CoreError::InvalidData(format!("time '{value}': {e}")))
}

fn parse_uuid(value: &str) -> Result<Uuid> {
    Ok(Uuid::parse_str(value)?)
}

// ============================================================================
// Row mapping
// ============================================================================

pub(crate) fn purchase_from_row(row: &SqliteRow) -> Result<Purchase> {
    Ok(Purchase {
        id: row.try_get("id")?,
        uuid: parse_uuid(row.try_get("uuid")?)?,
        customer: parse_uuid(row.try_get("customer")?)?,
        label: row.try_get("label")?,
        excerpt: row.try_get("excerpt")?,
        description: row.try_get("description")?,
        schedule: parse_ts(row.try_get("schedule")?)?,
        merchant: row.try_get("merchant")?,
        status: parse_status(row.try_get("status")?)?,
        date_created: parse_ts(row.try_get("date_created")?)?,
        date_updated: parse_ts(row.try_get("date_updated")?)?,
    })
}

fn necessary_from_row(row: &SqliteRow) -> Result<Necessary> {
    Ok(Necessary {
        id: row.try_get("id")?,
        uuid: parse_uuid(row.try_get("uuid")?)?,
        customer: parse_uuid(row.try_get("customer")?)?,
        purchase_id: row.try_get("purchase_id")?,
        label: row.try_get("label")?,
        excerpt: row.try_get("excerpt")?,
        description: row.try_get("description")?,
        date_created: parse_ts(row.try_get("date_created")?)?,
        date_updated: parse_ts(row.try_get("date_updated")?)?,
    })
}

fn goods_from_row(row: &SqliteRow) -> Result<Goods> {
    Ok(Goods {
        id: row.try_get("id")?,
        uuid: parse_uuid(row.try_get("uuid")?)?,
        customer: parse_uuid(row.try_get("customer")?)?,
        purchase_id: row.try_get("purchase_id")?,
        necessary_id: row.try_get("necessary_id")?,
        label: row.try_get("label")?,
        excerpt: row.try_get("excerpt")?,
        description: row.try_get("description")?,
        quantity: row.try_get("quantity")?,
        metric: parse_metric_col(row.try_get("metric")?)?,
        price: row.try_get("price")?,
        bill: row.try_get("bill")?,
        date_created: parse_ts(row.try_get("date_created")?)?,
        date_updated: parse_ts(row.try_get("date_updated")?)?,
    })
}

fn purchase_assigned_from_row(row: &SqliteRow) -> Result<PurchaseAssigned> {
    let operator: Option<String> = row.try_get("operator")?;
    Ok(PurchaseAssigned {
        id: row.try_get("id")?,
        uuid: parse_uuid(row.try_get("uuid")?)?,
        purchase_id: row.try_get("purchase_id")?,
        operator: operator.as_deref().map(parse_uuid).transpose()?,
        is_done: row.try_get("is_done")?,
        is_accept: row.try_get("is_accept")?,
        date_created: parse_ts(row.try_get("date_created")?)?,
        date_updated: parse_ts(row.try_get("date_updated")?)?,
    })
}

fn goods_assigned_from_row(row: &SqliteRow) -> Result<GoodsAssigned> {
    Ok(GoodsAssigned {
        id: row.try_get("id")?,
        uuid: parse_uuid(row.try_get("uuid")?)?,
        goods_id: row.try_get("goods_id")?,
        operator: parse_uuid(row.try_get("operator")?)?,
        is_skip: row.try_get("is_skip")?,
        is_done: row.try_get("is_done")?,
        is_accept: row.try_get("is_accept")?,
        date_created: parse_ts(row.try_get("date_created")?)?,
        date_updated: parse_ts(row.try_get("date_updated")?)?,
    })
}

fn delivery_from_row(row: &SqliteRow) -> Result<PurchaseDelivery> {
    let shipping_address: Option<String> = row.try_get("shipping_address")?;
    let date: Option<String> = row.try_get("schedule_date")?;
    let time_start: Option<String> = row.try_get("schedule_time_start")?;
    let time_end: Option<String> = row.try_get("schedule_time_end")?;

    // All three or none; anything partial is treated as no schedule.
    let schedule = match (date, time_start, time_end) {
        (Some(date), Some(start), Some(end)) => Some(DeliverySchedule {
            date: parse_date(&date)?,
            time_start: parse_time(&start)?,
            time_end: parse_time(&end)?,
        }),
        _ => None,
    };

    Ok(PurchaseDelivery {
        id: row.try_get("id")?,
        uuid: parse_uuid(row.try_get("uuid")?)?,
        purchase_id: row.try_get("purchase_id")?,
        shipping_address: shipping_address.as_deref().map(parse_uuid).transpose()?,
        schedule,
        date_created: parse_ts(row.try_get("date_created")?)?,
        date_updated: parse_ts(row.try_get("date_updated")?)?,
    })
}

fn shipping_address_from_row(row: &SqliteRow) -> Result<ShippingAddress> {
    Ok(ShippingAddress {
        id: row.try_get("id")?,
        uuid: parse_uuid(row.try_get("uuid")?)?,
        customer: parse_uuid(row.try_get("customer")?)?,
        label: row.try_get("label")?,
        recipient: row.try_get("recipient")?,
        telephone: row.try_get("telephone")?,
        address: row.try_get("address")?,
        postal_code: row.try_get("postal_code")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        notes: row.try_get("notes")?,
        is_default: row.try_get("is_default")?,
        date_created: parse_ts(row.try_get("date_created")?)?,
        date_updated: parse_ts(row.try_get("date_updated")?)?,
    })
}

fn catalog_from_row(row: &SqliteRow) -> Result<Catalog> {
    let status: String = row.try_get("status")?;
    Ok(Catalog {
        id: row.try_get("id")?,
        uuid: parse_uuid(row.try_get("uuid")?)?,
        label: row.try_get("label")?,
        metric: parse_metric_col(row.try_get("metric")?)?,
        status: CatalogStatus::parse(&status)
            .ok_or_else(|| CoreError::InvalidData(format!("catalog status '{status}'")))?,
        date_created: parse_ts(row.try_get("date_created")?)?,
        date_updated: parse_ts(row.try_get("date_updated")?)?,
    })
}

fn goods_catalog_from_row(row: &SqliteRow) -> Result<GoodsCatalog> {
    Ok(GoodsCatalog {
        id: row.try_get("id")?,
        uuid: parse_uuid(row.try_get("uuid")?)?,
        goods_id: row.try_get("goods_id")?,
        catalog_id: row.try_get("catalog_id")?,
        date_created: parse_ts(row.try_get("date_created")?)?,
    })
}

fn status_change_from_row(row: &SqliteRow) -> Result<PurchaseStatusChange> {
    let changed_by: Option<String> = row.try_get("changed_by")?;
    Ok(PurchaseStatusChange {
        id: row.try_get("id")?,
        uuid: parse_uuid(row.try_get("uuid")?)?,
        purchase_id: row.try_get("purchase_id")?,
        changed_by: changed_by.as_deref().map(parse_uuid).transpose()?,
        old_status: parse_status(row.try_get("old_status")?)?,
        new_status: parse_status(row.try_get("new_status")?)?,
        date_created: parse_ts(row.try_get("date_created")?)?,
    })
}

// ============================================================================
// Connection-level queries
// ============================================================================

impl SqliteStore {
    pub(crate) async fn purchase_by_uuid(
        conn: &mut SqliteConnection,
        uuid: Uuid,
    ) -> Result<Option<Purchase>> {
        let query = Query::select()
            .columns([
                Purchases::Id,
                Purchases::Uuid,
                Purchases::Customer,
                Purchases::Label,
                Purchases::Excerpt,
                Purchases::Description,
                Purchases::Schedule,
                Purchases::Merchant,
                Purchases::Status,
                Purchases::DateCreated,
                Purchases::DateUpdated,
            ])
            .from(Purchases::Table)
            .and_where(Expr::col(Purchases::Uuid).eq(uuid.to_string()))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&mut *conn).await?;
        row.as_ref().map(purchase_from_row).transpose()
    }

    pub(crate) async fn purchase_by_id(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<Purchase>> {
        let query = Query::select()
            .columns([
                Purchases::Id,
                Purchases::Uuid,
                Purchases::Customer,
                Purchases::Label,
                Purchases::Excerpt,
                Purchases::Description,
                Purchases::Schedule,
                Purchases::Merchant,
                Purchases::Status,
                Purchases::DateCreated,
                Purchases::DateUpdated,
            ])
            .from(Purchases::Table)
            .and_where(Expr::col(Purchases::Id).eq(id))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&mut *conn).await?;
        row.as_ref().map(purchase_from_row).transpose()
    }

    pub(crate) async fn purchases_for_customer(
        conn: &mut SqliteConnection,
        customer: Uuid,
        statuses: &[PurchaseStatus],
    ) -> Result<Vec<Purchase>> {
        let query = Query::select()
            .columns([
                Purchases::Id,
                Purchases::Uuid,
                Purchases::Customer,
                Purchases::Label,
                Purchases::Excerpt,
                Purchases::Description,
                Purchases::Schedule,
                Purchases::Merchant,
                Purchases::Status,
                Purchases::DateCreated,
                Purchases::DateUpdated,
            ])
            .from(Purchases::Table)
            .and_where(Expr::col(Purchases::Customer).eq(customer.to_string()))
            .and_where(
                Expr::col(Purchases::Status).is_in(statuses.iter().map(|s| s.as_str())),
            )
            .order_by(Purchases::DateCreated, Order::Desc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&mut *conn).await?;
        rows.iter().map(purchase_from_row).collect()
    }

    pub(crate) async fn purchases_for_operator(
        conn: &mut SqliteConnection,
        operator: Uuid,
        statuses: &[PurchaseStatus],
    ) -> Result<Vec<Purchase>> {
        let query = Query::select()
            .columns([
                (Purchases::Table, Purchases::Id),
                (Purchases::Table, Purchases::Uuid),
                (Purchases::Table, Purchases::Customer),
                (Purchases::Table, Purchases::Label),
                (Purchases::Table, Purchases::Excerpt),
                (Purchases::Table, Purchases::Description),
                (Purchases::Table, Purchases::Schedule),
                (Purchases::Table, Purchases::Merchant),
                (Purchases::Table, Purchases::Status),
                (Purchases::Table, Purchases::DateCreated),
                (Purchases::Table, Purchases::DateUpdated),
            ])
            .from(Purchases::Table)
            .inner_join(
                PurchaseAssignments::Table,
                Expr::col((PurchaseAssignments::Table, PurchaseAssignments::PurchaseId))
                    .equals((Purchases::Table, Purchases::Id)),
            )
            .and_where(
                Expr::col((PurchaseAssignments::Table, PurchaseAssignments::Operator))
                    .eq(operator.to_string()),
            )
            .and_where(
                Expr::col((Purchases::Table, Purchases::Status))
                    .is_in(statuses.iter().map(|s| s.as_str())),
            )
            .order_by((Purchases::Table, Purchases::DateCreated), Order::Desc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&mut *conn).await?;
        rows.iter().map(purchase_from_row).collect()
    }

    pub(crate) async fn necessary_by_uuid(
        conn: &mut SqliteConnection,
        uuid: Uuid,
    ) -> Result<Option<Necessary>> {
        let query = Query::select()
            .columns([
                Necessaries::Id,
                Necessaries::Uuid,
                Necessaries::Customer,
                Necessaries::PurchaseId,
                Necessaries::Label,
                Necessaries::Excerpt,
                Necessaries::Description,
                Necessaries::DateCreated,
                Necessaries::DateUpdated,
            ])
            .from(Necessaries::Table)
            .and_where(Expr::col(Necessaries::Uuid).eq(uuid.to_string()))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&mut *conn).await?;
        row.as_ref().map(necessary_from_row).transpose()
    }

    pub(crate) async fn necessaries_for_purchase(
        conn: &mut SqliteConnection,
        purchase_id: i64,
    ) -> Result<Vec<Necessary>> {
        let query = Query::select()
            .columns([
                Necessaries::Id,
                Necessaries::Uuid,
                Necessaries::Customer,
                Necessaries::PurchaseId,
                Necessaries::Label,
                Necessaries::Excerpt,
                Necessaries::Description,
                Necessaries::DateCreated,
                Necessaries::DateUpdated,
            ])
            .from(Necessaries::Table)
            .and_where(Expr::col(Necessaries::PurchaseId).eq(purchase_id))
            .order_by(Necessaries::Id, Order::Asc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&mut *conn).await?;
        rows.iter().map(necessary_from_row).collect()
    }

    pub(crate) async fn goods_by_uuid(
        conn: &mut SqliteConnection,
        uuid: Uuid,
    ) -> Result<Option<Goods>> {
        let query = goods_select()
            .and_where(Expr::col(GoodsTable::Uuid).eq(uuid.to_string()))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&mut *conn).await?;
        row.as_ref().map(goods_from_row).transpose()
    }

    pub(crate) async fn goods_by_id(
        conn: &mut SqliteConnection,
        id: i64,
    ) -> Result<Option<Goods>> {
        let query = goods_select()
            .and_where(Expr::col(GoodsTable::Id).eq(id))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&mut *conn).await?;
        row.as_ref().map(goods_from_row).transpose()
    }

    pub(crate) async fn goods_for_necessary(
        conn: &mut SqliteConnection,
        necessary_id: i64,
    ) -> Result<Vec<Goods>> {
        let query = goods_select()
            .and_where(Expr::col(GoodsTable::NecessaryId).eq(necessary_id))
            .order_by(GoodsTable::Id, Order::Asc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&mut *conn).await?;
        rows.iter().map(goods_from_row).collect()
    }

    pub(crate) async fn goods_for_purchase(
        conn: &mut SqliteConnection,
        purchase_id: i64,
    ) -> Result<Vec<Goods>> {
        let query = goods_select()
            .and_where(Expr::col(GoodsTable::PurchaseId).eq(purchase_id))
            .order_by(GoodsTable::Id, Order::Asc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&mut *conn).await?;
        rows.iter().map(goods_from_row).collect()
    }

    pub(crate) async fn assignment_for_purchase(
        conn: &mut SqliteConnection,
        purchase_id: i64,
    ) -> Result<Option<PurchaseAssigned>> {
        let query = Query::select()
            .columns([
                PurchaseAssignments::Id,
                PurchaseAssignments::Uuid,
                PurchaseAssignments::PurchaseId,
                PurchaseAssignments::Operator,
                PurchaseAssignments::IsDone,
                PurchaseAssignments::IsAccept,
                PurchaseAssignments::DateCreated,
                PurchaseAssignments::DateUpdated,
            ])
            .from(PurchaseAssignments::Table)
            .and_where(Expr::col(PurchaseAssignments::PurchaseId).eq(purchase_id))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&mut *conn).await?;
        row.as_ref().map(purchase_assigned_from_row).transpose()
    }

    pub(crate) async fn goods_assigned_by_uuid(
        conn: &mut SqliteConnection,
        uuid: Uuid,
    ) -> Result<Option<GoodsAssigned>> {
        let query = goods_assigned_select()
            .and_where(Expr::col(GoodsAssignments::Uuid).eq(uuid.to_string()))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&mut *conn).await?;
        row.as_ref().map(goods_assigned_from_row).transpose()
    }

    pub(crate) async fn goods_assigned_for_purchase(
        conn: &mut SqliteConnection,
        purchase_id: i64,
    ) -> Result<Vec<GoodsAssigned>> {
        let query = Query::select()
            .columns([
                (GoodsAssignments::Table, GoodsAssignments::Id),
                (GoodsAssignments::Table, GoodsAssignments::Uuid),
                (GoodsAssignments::Table, GoodsAssignments::GoodsId),
                (GoodsAssignments::Table, GoodsAssignments::Operator),
                (GoodsAssignments::Table, GoodsAssignments::IsSkip),
                (GoodsAssignments::Table, GoodsAssignments::IsDone),
                (GoodsAssignments::Table, GoodsAssignments::IsAccept),
                (GoodsAssignments::Table, GoodsAssignments::DateCreated),
                (GoodsAssignments::Table, GoodsAssignments::DateUpdated),
            ])
            .from(GoodsAssignments::Table)
            .inner_join(
                GoodsTable::Table,
                Expr::col((GoodsTable::Table, GoodsTable::Id))
                    .equals((GoodsAssignments::Table, GoodsAssignments::GoodsId)),
            )
            .and_where(Expr::col((GoodsTable::Table, GoodsTable::PurchaseId)).eq(purchase_id))
            .order_by((GoodsAssignments::Table, GoodsAssignments::Id), Order::Asc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&mut *conn).await?;
        rows.iter().map(goods_assigned_from_row).collect()
    }

    pub(crate) async fn delivery_for_purchase(
        conn: &mut SqliteConnection,
        purchase_id: i64,
    ) -> Result<Option<PurchaseDelivery>> {
        let query = Query::select()
            .columns([
                PurchaseDeliveries::Id,
                PurchaseDeliveries::Uuid,
                PurchaseDeliveries::PurchaseId,
                PurchaseDeliveries::ShippingAddress,
                PurchaseDeliveries::ScheduleDate,
                PurchaseDeliveries::ScheduleTimeStart,
                PurchaseDeliveries::ScheduleTimeEnd,
                PurchaseDeliveries::DateCreated,
                PurchaseDeliveries::DateUpdated,
            ])
            .from(PurchaseDeliveries::Table)
            .and_where(Expr::col(PurchaseDeliveries::PurchaseId).eq(purchase_id))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&mut *conn).await?;
        row.as_ref().map(delivery_from_row).transpose()
    }

    pub(crate) async fn shipping_address_by_uuid(
        conn: &mut SqliteConnection,
        uuid: Uuid,
    ) -> Result<Option<ShippingAddress>> {
        let query = shipping_address_select()
            .and_where(Expr::col(ShippingAddresses::Uuid).eq(uuid.to_string()))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&mut *conn).await?;
        row.as_ref().map(shipping_address_from_row).transpose()
    }

    pub(crate) async fn shipping_addresses_for_customer(
        conn: &mut SqliteConnection,
        customer: Uuid,
    ) -> Result<Vec<ShippingAddress>> {
        let query = shipping_address_select()
            .and_where(Expr::col(ShippingAddresses::Customer).eq(customer.to_string()))
            .order_by(ShippingAddresses::DateCreated, Order::Desc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&mut *conn).await?;
        rows.iter().map(shipping_address_from_row).collect()
    }

    pub(crate) async fn catalog_by_uuid(
        conn: &mut SqliteConnection,
        uuid: Uuid,
    ) -> Result<Option<Catalog>> {
        let query = catalog_select()
            .and_where(Expr::col(Catalogs::Uuid).eq(uuid.to_string()))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&mut *conn).await?;
        row.as_ref().map(catalog_from_row).transpose()
    }

    pub(crate) async fn list_catalogs_conn(
        conn: &mut SqliteConnection,
        publish_only: bool,
    ) -> Result<Vec<Catalog>> {
        let mut query = catalog_select();
        if publish_only {
            query.and_where(Expr::col(Catalogs::Status).eq(CatalogStatus::Publish.as_str()));
        }
        let query = query
            .order_by(Catalogs::Label, Order::Asc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&mut *conn).await?;
        rows.iter().map(catalog_from_row).collect()
    }

    pub(crate) async fn goods_catalog_for_goods(
        conn: &mut SqliteConnection,
        goods_id: i64,
    ) -> Result<Option<GoodsCatalog>> {
        let query = Query::select()
            .columns([
                GoodsCatalogs::Id,
                GoodsCatalogs::Uuid,
                GoodsCatalogs::GoodsId,
                GoodsCatalogs::CatalogId,
                GoodsCatalogs::DateCreated,
            ])
            .from(GoodsCatalogs::Table)
            .and_where(Expr::col(GoodsCatalogs::GoodsId).eq(goods_id))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&mut *conn).await?;
        row.as_ref().map(goods_catalog_from_row).transpose()
    }

    pub(crate) async fn goods_catalogs_for_purchase(
        conn: &mut SqliteConnection,
        purchase_id: i64,
    ) -> Result<Vec<GoodsCatalog>> {
        let query = Query::select()
            .columns([
                (GoodsCatalogs::Table, GoodsCatalogs::Id),
                (GoodsCatalogs::Table, GoodsCatalogs::Uuid),
                (GoodsCatalogs::Table, GoodsCatalogs::GoodsId),
                (GoodsCatalogs::Table, GoodsCatalogs::CatalogId),
                (GoodsCatalogs::Table, GoodsCatalogs::DateCreated),
            ])
            .from(GoodsCatalogs::Table)
            .inner_join(
                GoodsTable::Table,
                Expr::col((GoodsTable::Table, GoodsTable::Id))
                    .equals((GoodsCatalogs::Table, GoodsCatalogs::GoodsId)),
            )
            .and_where(Expr::col((GoodsTable::Table, GoodsTable::PurchaseId)).eq(purchase_id))
            .order_by((GoodsCatalogs::Table, GoodsCatalogs::Id), Order::Asc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&mut *conn).await?;
        rows.iter().map(goods_catalog_from_row).collect()
    }

    /// True when this catalog entry is already linked to any goods under the
    /// given necessary.
    pub(crate) async fn catalog_used_in_necessary(
        conn: &mut SqliteConnection,
        necessary_id: i64,
        catalog_id: i64,
    ) -> Result<bool> {
        let query = Query::select()
            .expr(Expr::col((GoodsCatalogs::Table, GoodsCatalogs::Id)).count())
            .from(GoodsCatalogs::Table)
            .inner_join(
                GoodsTable::Table,
                Expr::col((GoodsTable::Table, GoodsTable::Id))
                    .equals((GoodsCatalogs::Table, GoodsCatalogs::GoodsId)),
            )
            .and_where(Expr::col((GoodsTable::Table, GoodsTable::NecessaryId)).eq(necessary_id))
            .and_where(Expr::col((GoodsCatalogs::Table, GoodsCatalogs::CatalogId)).eq(catalog_id))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_one(&mut *conn).await?;
        let count: i64 = row.try_get(0)?;
        Ok(count > 0)
    }

    pub(crate) async fn status_changes_for_purchase(
        conn: &mut SqliteConnection,
        purchase_id: i64,
    ) -> Result<Vec<PurchaseStatusChange>> {
        let query = Query::select()
            .columns([
                PurchaseStatusChanges::Id,
                PurchaseStatusChanges::Uuid,
                PurchaseStatusChanges::PurchaseId,
                PurchaseStatusChanges::ChangedBy,
                PurchaseStatusChanges::OldStatus,
                PurchaseStatusChanges::NewStatus,
                PurchaseStatusChanges::DateCreated,
            ])
            .from(PurchaseStatusChanges::Table)
            .and_where(Expr::col(PurchaseStatusChanges::PurchaseId).eq(purchase_id))
            .order_by(PurchaseStatusChanges::Id, Order::Desc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&mut *conn).await?;
        rows.iter().map(status_change_from_row).collect()
    }
}

// ============================================================================
// Pool wrappers
// ============================================================================

impl SqliteStore {
    pub async fn fetch_purchase(&self, uuid: Uuid) -> Result<Option<Purchase>> {
        let mut conn = self.pool().acquire().await?;
        Self::purchase_by_uuid(&mut conn, uuid).await
    }

    pub async fn fetch_purchases_for_customer(
        &self,
        customer: Uuid,
        statuses: &[PurchaseStatus],
    ) -> Result<Vec<Purchase>> {
        let mut conn = self.pool().acquire().await?;
        Self::purchases_for_customer(&mut conn, customer, statuses).await
    }

    pub async fn fetch_purchases_for_operator(
        &self,
        operator: Uuid,
        statuses: &[PurchaseStatus],
    ) -> Result<Vec<Purchase>> {
        let mut conn = self.pool().acquire().await?;
        Self::purchases_for_operator(&mut conn, operator, statuses).await
    }

    pub async fn fetch_necessary(&self, uuid: Uuid) -> Result<Option<Necessary>> {
        let mut conn = self.pool().acquire().await?;
        Self::necessary_by_uuid(&mut conn, uuid).await
    }

    pub async fn fetch_necessaries(&self, purchase_id: i64) -> Result<Vec<Necessary>> {
        let mut conn = self.pool().acquire().await?;
        Self::necessaries_for_purchase(&mut conn, purchase_id).await
    }

    pub async fn fetch_goods(&self, uuid: Uuid) -> Result<Option<Goods>> {
        let mut conn = self.pool().acquire().await?;
        Self::goods_by_uuid(&mut conn, uuid).await
    }

    pub async fn fetch_goods_for_necessary(&self, necessary_id: i64) -> Result<Vec<Goods>> {
        let mut conn = self.pool().acquire().await?;
        Self::goods_for_necessary(&mut conn, necessary_id).await
    }

    pub async fn fetch_goods_for_purchase(&self, purchase_id: i64) -> Result<Vec<Goods>> {
        let mut conn = self.pool().acquire().await?;
        Self::goods_for_purchase(&mut conn, purchase_id).await
    }

    pub async fn fetch_assignment(&self, purchase_id: i64) -> Result<Option<PurchaseAssigned>> {
        let mut conn = self.pool().acquire().await?;
        Self::assignment_for_purchase(&mut conn, purchase_id).await
    }

    pub async fn fetch_goods_assigned(&self, uuid: Uuid) -> Result<Option<GoodsAssigned>> {
        let mut conn = self.pool().acquire().await?;
        Self::goods_assigned_by_uuid(&mut conn, uuid).await
    }

    pub async fn fetch_goods_assigned_for_purchase(
        &self,
        purchase_id: i64,
    ) -> Result<Vec<GoodsAssigned>> {
        let mut conn = self.pool().acquire().await?;
        Self::goods_assigned_for_purchase(&mut conn, purchase_id).await
    }

    pub async fn fetch_delivery(&self, purchase_id: i64) -> Result<Option<PurchaseDelivery>> {
        let mut conn = self.pool().acquire().await?;
        Self::delivery_for_purchase(&mut conn, purchase_id).await
    }

    pub async fn fetch_shipping_address(&self, uuid: Uuid) -> Result<Option<ShippingAddress>> {
        let mut conn = self.pool().acquire().await?;
        Self::shipping_address_by_uuid(&mut conn, uuid).await
    }

    pub async fn fetch_shipping_addresses(&self, customer: Uuid) -> Result<Vec<ShippingAddress>> {
        let mut conn = self.pool().acquire().await?;
        Self::shipping_addresses_for_customer(&mut conn, customer).await
    }

    pub async fn fetch_catalog(&self, uuid: Uuid) -> Result<Option<Catalog>> {
        let mut conn = self.pool().acquire().await?;
        Self::catalog_by_uuid(&mut conn, uuid).await
    }

    pub async fn list_catalogs(&self, publish_only: bool) -> Result<Vec<Catalog>> {
        let mut conn = self.pool().acquire().await?;
        Self::list_catalogs_conn(&mut conn, publish_only).await
    }

    pub async fn fetch_goods_catalog(&self, goods_id: i64) -> Result<Option<GoodsCatalog>> {
        let mut conn = self.pool().acquire().await?;
        Self::goods_catalog_for_goods(&mut conn, goods_id).await
    }

    pub async fn fetch_goods_catalogs_for_purchase(
        &self,
        purchase_id: i64,
    ) -> Result<Vec<GoodsCatalog>> {
        let mut conn = self.pool().acquire().await?;
        Self::goods_catalogs_for_purchase(&mut conn, purchase_id).await
    }

    pub async fn fetch_status_changes(&self, purchase_id: i64) -> Result<Vec<PurchaseStatusChange>> {
        let mut conn = self.pool().acquire().await?;
        Self::status_changes_for_purchase(&mut conn, purchase_id).await
    }
}

// ============================================================================
// Shared select builders
// ============================================================================

fn goods_select() -> sea_query::SelectStatement {
    let mut query = Query::select();
    query
        .columns([
            GoodsTable::Id,
            GoodsTable::Uuid,
            GoodsTable::Customer,
            GoodsTable::PurchaseId,
            GoodsTable::NecessaryId,
            GoodsTable::Label,
            GoodsTable::Excerpt,
            GoodsTable::Description,
            GoodsTable::Quantity,
            GoodsTable::Metric,
            GoodsTable::Price,
            GoodsTable::Bill,
            GoodsTable::DateCreated,
            GoodsTable::DateUpdated,
        ])
        .from(GoodsTable::Table);
    query
}

fn goods_assigned_select() -> sea_query::SelectStatement {
    let mut query = Query::select();
    query
        .columns([
            GoodsAssignments::Id,
            GoodsAssignments::Uuid,
            GoodsAssignments::GoodsId,
            GoodsAssignments::Operator,
            GoodsAssignments::IsSkip,
            GoodsAssignments::IsDone,
            GoodsAssignments::IsAccept,
            GoodsAssignments::DateCreated,
            GoodsAssignments::DateUpdated,
        ])
        .from(GoodsAssignments::Table);
    query
}

fn shipping_address_select() -> sea_query::SelectStatement {
    let mut query = Query::select();
    query
        .columns([
            ShippingAddresses::Id,
            ShippingAddresses::Uuid,
            ShippingAddresses::Customer,
            ShippingAddresses::Label,
            ShippingAddresses::Recipient,
            ShippingAddresses::Telephone,
            ShippingAddresses::Address,
            ShippingAddresses::PostalCode,
            ShippingAddresses::Latitude,
            ShippingAddresses::Longitude,
            ShippingAddresses::Notes,
            ShippingAddresses::IsDefault,
            ShippingAddresses::DateCreated,
            ShippingAddresses::DateUpdated,
        ])
        .from(ShippingAddresses::Table);
    query
}

fn catalog_select() -> sea_query::SelectStatement {
    let mut query = Query::select();
    query
        .columns([
            Catalogs::Id,
            Catalogs::Uuid,
            Catalogs::Label,
            Catalogs::Metric,
            Catalogs::Status,
            Catalogs::DateCreated,
            Catalogs::DateUpdated,
        ])
        .from(Catalogs::Table);
    query
}
