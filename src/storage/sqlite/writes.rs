//! Write-side helpers.
//!
//! Every function here takes `&mut SqliteConnection` and is meant to run
//! inside the transaction opened by [`SqliteStore::begin`]; callers own the
//! commit/rollback decision. Insert helpers return the new rowid.

use chrono::{DateTime, Utc};
use sea_query::{Expr, OnConflict, Query, SqliteQueryBuilder};
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::domain::{
    DeliverySchedule, GoodsUpdate, NecessaryUpdate, NewCatalog, NewPurchase, NewShippingAddress,
    PurchaseStatus, PurchaseUpdate,
};
use crate::error::Result;
use crate::storage::schema::{
    Catalogs, GoodsAssignments, GoodsCatalogs, GoodsTable, Necessaries, PurchaseAssignments,
    PurchaseDeliveries, PurchaseStatusChanges, Purchases, ShippingAddresses,
};

use super::SqliteStore;

impl SqliteStore {
    pub(crate) async fn insert_purchase(
        conn: &mut SqliteConnection,
        uuid: Uuid,
        customer: Uuid,
        new: &NewPurchase,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let query = Query::insert()
            .into_table(Purchases::Table)
            .columns([
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
            .values_panic([
                uuid.to_string().into(),
                customer.to_string().into(),
                new.label.clone().into(),
                new.excerpt.clone().into(),
                new.description.clone().into(),
                new.schedule.to_rfc3339().into(),
                new.merchant.clone().into(),
                PurchaseStatus::Draft.as_str().into(),
                now.to_rfc3339().into(),
                now.to_rfc3339().into(),
            ])
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query).execute(&mut *conn).await?;
        Ok(result.last_insert_rowid())
    }

    pub(crate) async fn update_purchase_fields(
        conn: &mut SqliteConnection,
        purchase_id: i64,
        update: &PurchaseUpdate,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut stmt = Query::update();
        stmt.table(Purchases::Table)
            .value(Purchases::DateUpdated, now.to_rfc3339())
            .and_where(Expr::col(Purchases::Id).eq(purchase_id));

        if let Some(label) = &update.label {
            stmt.value(Purchases::Label, label.clone());
        }
        if let Some(excerpt) = &update.excerpt {
            stmt.value(Purchases::Excerpt, excerpt.clone());
        }
        if let Some(description) = &update.description {
            stmt.value(Purchases::Description, description.clone());
        }
        if let Some(schedule) = &update.schedule {
            stmt.value(Purchases::Schedule, schedule.to_rfc3339());
        }
        if let Some(merchant) = &update.merchant {
            stmt.value(Purchases::Merchant, merchant.clone());
        }

        let query = stmt.to_string(SqliteQueryBuilder);
        sqlx::query(&query).execute(&mut *conn).await?;
        Ok(())
    }

    pub(crate) async fn set_purchase_status(
        conn: &mut SqliteConnection,
        purchase_id: i64,
        status: PurchaseStatus,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let query = Query::update()
            .table(Purchases::Table)
            .value(Purchases::Status, status.as_str())
            .value(Purchases::DateUpdated, now.to_rfc3339())
            .and_where(Expr::col(Purchases::Id).eq(purchase_id))
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query).execute(&mut *conn).await?;
        Ok(())
    }

    pub(crate) async fn insert_status_change(
        conn: &mut SqliteConnection,
        purchase_id: i64,
        changed_by: Option<Uuid>,
        old_status: PurchaseStatus,
        new_status: PurchaseStatus,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let query = Query::insert()
            .into_table(PurchaseStatusChanges::Table)
            .columns([
                PurchaseStatusChanges::Uuid,
                PurchaseStatusChanges::PurchaseId,
                PurchaseStatusChanges::ChangedBy,
                PurchaseStatusChanges::OldStatus,
                PurchaseStatusChanges::NewStatus,
                PurchaseStatusChanges::DateCreated,
            ])
            .values_panic([
                Uuid::new_v4().to_string().into(),
                purchase_id.into(),
                changed_by.map(|u| u.to_string()).into(),
                old_status.as_str().into(),
                new_status.as_str().into(),
                now.to_rfc3339().into(),
            ])
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query).execute(&mut *conn).await?;
        Ok(())
    }

    /// Delete a purchase row. Children go with it via ON DELETE CASCADE.
    pub(crate) async fn delete_purchase(
        conn: &mut SqliteConnection,
        purchase_id: i64,
    ) -> Result<()> {
        let query = Query::delete()
            .from_table(Purchases::Table)
            .and_where(Expr::col(Purchases::Id).eq(purchase_id))
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query).execute(&mut *conn).await?;
        Ok(())
    }

    pub(crate) async fn insert_necessary(
        conn: &mut SqliteConnection,
        uuid: Uuid,
        customer: Uuid,
        purchase_id: i64,
        label: &str,
        excerpt: Option<&str>,
        description: &str,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let query = Query::insert()
            .into_table(Necessaries::Table)
            .columns([
                Necessaries::Uuid,
                Necessaries::Customer,
                Necessaries::PurchaseId,
                Necessaries::Label,
                Necessaries::Excerpt,
                Necessaries::Description,
                Necessaries::DateCreated,
                Necessaries::DateUpdated,
            ])
            .values_panic([
                uuid.to_string().into(),
                customer.to_string().into(),
                purchase_id.into(),
                label.into(),
                excerpt.map(str::to_owned).into(),
                description.into(),
                now.to_rfc3339().into(),
                now.to_rfc3339().into(),
            ])
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query).execute(&mut *conn).await?;
        Ok(result.last_insert_rowid())
    }

    pub(crate) async fn update_necessary_fields(
        conn: &mut SqliteConnection,
        necessary_id: i64,
        update: &NecessaryUpdate,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut stmt = Query::update();
        stmt.table(Necessaries::Table)
            .value(Necessaries::DateUpdated, now.to_rfc3339())
            .and_where(Expr::col(Necessaries::Id).eq(necessary_id));

        if let Some(label) = &update.label {
            stmt.value(Necessaries::Label, label.clone());
        }
        if let Some(excerpt) = &update.excerpt {
            stmt.value(Necessaries::Excerpt, excerpt.clone());
        }
        if let Some(description) = &update.description {
            stmt.value(Necessaries::Description, description.clone());
        }

        let query = stmt.to_string(SqliteQueryBuilder);
        sqlx::query(&query).execute(&mut *conn).await?;
        Ok(())
    }

    pub(crate) async fn delete_necessary(
        conn: &mut SqliteConnection,
        necessary_id: i64,
    ) -> Result<()> {
        let query = Query::delete()
            .from_table(Necessaries::Table)
            .and_where(Expr::col(Necessaries::Id).eq(necessary_id))
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query).execute(&mut *conn).await?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) async fn insert_goods(
        conn: &mut SqliteConnection,
        uuid: Uuid,
        customer: Uuid,
        purchase_id: i64,
        necessary_id: i64,
        label: &str,
        excerpt: Option<&str>,
        description: &str,
        quantity: i64,
        metric: &str,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let query = Query::insert()
            .into_table(GoodsTable::Table)
            .columns([
                GoodsTable::Uuid,
                GoodsTable::Customer,
                GoodsTable::PurchaseId,
                GoodsTable::NecessaryId,
                GoodsTable::Label,
                GoodsTable::Excerpt,
                GoodsTable::Description,
                GoodsTable::Quantity,
                GoodsTable::Metric,
                GoodsTable::DateCreated,
                GoodsTable::DateUpdated,
            ])
            .values_panic([
                uuid.to_string().into(),
                customer.to_string().into(),
                purchase_id.into(),
                necessary_id.into(),
                label.into(),
                excerpt.map(str::to_owned).into(),
                description.into(),
                quantity.into(),
                metric.into(),
                now.to_rfc3339().into(),
                now.to_rfc3339().into(),
            ])
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query).execute(&mut *conn).await?;
        Ok(result.last_insert_rowid())
    }

    pub(crate) async fn update_goods_fields(
        conn: &mut SqliteConnection,
        goods_id: i64,
        update: &GoodsUpdate,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut stmt = Query::update();
        stmt.table(GoodsTable::Table)
            .value(GoodsTable::DateUpdated, now.to_rfc3339())
            .and_where(Expr::col(GoodsTable::Id).eq(goods_id));

        if let Some(label) = &update.label {
            stmt.value(GoodsTable::Label, label.clone());
        }
        if let Some(excerpt) = &update.excerpt {
            stmt.value(GoodsTable::Excerpt, excerpt.clone());
        }
        if let Some(description) = &update.description {
            stmt.value(GoodsTable::Description, description.clone());
        }
        if let Some(quantity) = update.quantity {
            stmt.value(GoodsTable::Quantity, quantity);
        }
        if let Some(metric) = update.metric {
            stmt.value(GoodsTable::Metric, metric.as_str());
        }

        let query = stmt.to_string(SqliteQueryBuilder);
        sqlx::query(&query).execute(&mut *conn).await?;
        Ok(())
    }

    pub(crate) async fn delete_goods(conn: &mut SqliteConnection, goods_id: i64) -> Result<()> {
        let query = Query::delete()
            .from_table(GoodsTable::Table)
            .and_where(Expr::col(GoodsTable::Id).eq(goods_id))
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query).execute(&mut *conn).await?;
        Ok(())
    }

    /// Operator prices a goods item; bill is stored alongside so reads never
    /// recompute it.
    pub(crate) async fn set_goods_price(
        conn: &mut SqliteConnection,
        goods_id: i64,
        price: i64,
        bill: i64,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let query = Query::update()
            .table(GoodsTable::Table)
            .value(GoodsTable::Price, price)
            .value(GoodsTable::Bill, bill)
            .value(GoodsTable::DateUpdated, now.to_rfc3339())
            .and_where(Expr::col(GoodsTable::Id).eq(goods_id))
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query).execute(&mut *conn).await?;
        Ok(())
    }

    /// Create or replace the single assignment row for a purchase.
    pub(crate) async fn upsert_purchase_assigned(
        conn: &mut SqliteConnection,
        uuid: Uuid,
        purchase_id: i64,
        operator: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let query = Query::insert()
            .into_table(PurchaseAssignments::Table)
            .columns([
                PurchaseAssignments::Uuid,
                PurchaseAssignments::PurchaseId,
                PurchaseAssignments::Operator,
                PurchaseAssignments::IsDone,
                PurchaseAssignments::IsAccept,
                PurchaseAssignments::DateCreated,
                PurchaseAssignments::DateUpdated,
            ])
            .values_panic([
                uuid.to_string().into(),
                purchase_id.into(),
                operator.map(|u| u.to_string()).into(),
                false.into(),
                false.into(),
                now.to_rfc3339().into(),
                now.to_rfc3339().into(),
            ])
            .on_conflict(
                OnConflict::column(PurchaseAssignments::PurchaseId)
                    .update_columns([
                        PurchaseAssignments::Operator,
                        PurchaseAssignments::DateUpdated,
                    ])
                    .to_owned(),
            )
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query).execute(&mut *conn).await?;
        Ok(())
    }

    pub(crate) async fn insert_goods_assigned(
        conn: &mut SqliteConnection,
        uuid: Uuid,
        goods_id: i64,
        operator: Uuid,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let query = Query::insert()
            .into_table(GoodsAssignments::Table)
            .columns([
                GoodsAssignments::Uuid,
                GoodsAssignments::GoodsId,
                GoodsAssignments::Operator,
                GoodsAssignments::IsSkip,
                GoodsAssignments::IsDone,
                GoodsAssignments::IsAccept,
                GoodsAssignments::DateCreated,
                GoodsAssignments::DateUpdated,
            ])
            .values_panic([
                uuid.to_string().into(),
                goods_id.into(),
                operator.to_string().into(),
                false.into(),
                false.into(),
                false.into(),
                now.to_rfc3339().into(),
                now.to_rfc3339().into(),
            ])
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query).execute(&mut *conn).await?;
        Ok(result.last_insert_rowid())
    }

    pub(crate) async fn update_goods_assigned_flags(
        conn: &mut SqliteConnection,
        goods_assigned_id: i64,
        is_skip: Option<bool>,
        is_done: Option<bool>,
        is_accept: Option<bool>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut stmt = Query::update();
        stmt.table(GoodsAssignments::Table)
            .value(GoodsAssignments::DateUpdated, now.to_rfc3339())
            .and_where(Expr::col(GoodsAssignments::Id).eq(goods_assigned_id));

        if let Some(is_skip) = is_skip {
            stmt.value(GoodsAssignments::IsSkip, is_skip);
        }
        if let Some(is_done) = is_done {
            stmt.value(GoodsAssignments::IsDone, is_done);
        }
        if let Some(is_accept) = is_accept {
            stmt.value(GoodsAssignments::IsAccept, is_accept);
        }

        let query = stmt.to_string(SqliteQueryBuilder);
        sqlx::query(&query).execute(&mut *conn).await?;
        Ok(())
    }

    /// Flip `is_accept` on every not-yet-accepted assignment under the
    /// purchase. Returns the number of rows touched.
    pub(crate) async fn bulk_accept_goods(
        conn: &mut SqliteConnection,
        purchase_id: i64,
        now: DateTime<Utc>,
    ) -> Result<u64> {
        let goods_ids = Query::select()
            .column(GoodsTable::Id)
            .from(GoodsTable::Table)
            .and_where(Expr::col(GoodsTable::PurchaseId).eq(purchase_id))
            .to_owned();

        let query = Query::update()
            .table(GoodsAssignments::Table)
            .value(GoodsAssignments::IsAccept, true)
            .value(GoodsAssignments::DateUpdated, now.to_rfc3339())
            .and_where(Expr::col(GoodsAssignments::GoodsId).in_subquery(goods_ids))
            .and_where(Expr::col(GoodsAssignments::IsAccept).eq(false))
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query).execute(&mut *conn).await?;
        Ok(result.rows_affected())
    }

    /// Create or replace the single delivery row for a purchase.
    pub(crate) async fn upsert_delivery(
        conn: &mut SqliteConnection,
        uuid: Uuid,
        purchase_id: i64,
        shipping_address: Option<Uuid>,
        schedule: Option<DeliverySchedule>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let query = Query::insert()
            .into_table(PurchaseDeliveries::Table)
            .columns([
                PurchaseDeliveries::Uuid,
                PurchaseDeliveries::PurchaseId,
                PurchaseDeliveries::ShippingAddress,
                PurchaseDeliveries::ScheduleDate,
                PurchaseDeliveries::ScheduleTimeStart,
                PurchaseDeliveries::ScheduleTimeEnd,
                PurchaseDeliveries::DateCreated,
                PurchaseDeliveries::DateUpdated,
            ])
            .values_panic([
                uuid.to_string().into(),
                purchase_id.into(),
                shipping_address.map(|u| u.to_string()).into(),
                schedule.map(|s| s.date.format("%Y-%m-%d").to_string()).into(),
                schedule
                    .map(|s| s.time_start.format("%H:%M:%S").to_string())
                    .into(),
                schedule
                    .map(|s| s.time_end.format("%H:%M:%S").to_string())
                    .into(),
                now.to_rfc3339().into(),
                now.to_rfc3339().into(),
            ])
            .on_conflict(
                OnConflict::column(PurchaseDeliveries::PurchaseId)
                    .update_columns([
                        PurchaseDeliveries::ShippingAddress,
                        PurchaseDeliveries::ScheduleDate,
                        PurchaseDeliveries::ScheduleTimeStart,
                        PurchaseDeliveries::ScheduleTimeEnd,
                        PurchaseDeliveries::DateUpdated,
                    ])
                    .to_owned(),
            )
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query).execute(&mut *conn).await?;
        Ok(())
    }

    pub(crate) async fn clear_delivery_schedule(
        conn: &mut SqliteConnection,
        purchase_id: i64,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let query = Query::update()
            .table(PurchaseDeliveries::Table)
            .value(PurchaseDeliveries::ScheduleDate, Option::<String>::None)
            .value(PurchaseDeliveries::ScheduleTimeStart, Option::<String>::None)
            .value(PurchaseDeliveries::ScheduleTimeEnd, Option::<String>::None)
            .value(PurchaseDeliveries::DateUpdated, now.to_rfc3339())
            .and_where(Expr::col(PurchaseDeliveries::PurchaseId).eq(purchase_id))
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query).execute(&mut *conn).await?;
        Ok(())
    }

    pub(crate) async fn insert_shipping_address(
        conn: &mut SqliteConnection,
        uuid: Uuid,
        customer: Uuid,
        new: &NewShippingAddress,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let query = Query::insert()
            .into_table(ShippingAddresses::Table)
            .columns([
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
            .values_panic([
                uuid.to_string().into(),
                customer.to_string().into(),
                new.label.clone().into(),
                new.recipient.clone().into(),
                new.telephone.clone().into(),
                new.address.clone().into(),
                new.postal_code.clone().into(),
                new.latitude.into(),
                new.longitude.into(),
                new.notes.clone().into(),
                new.is_default.into(),
                now.to_rfc3339().into(),
                now.to_rfc3339().into(),
            ])
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query).execute(&mut *conn).await?;
        Ok(result.last_insert_rowid())
    }

    pub(crate) async fn update_shipping_address(
        conn: &mut SqliteConnection,
        address_id: i64,
        new: &NewShippingAddress,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let query = Query::update()
            .table(ShippingAddresses::Table)
            .value(ShippingAddresses::Label, new.label.clone())
            .value(ShippingAddresses::Recipient, new.recipient.clone())
            .value(ShippingAddresses::Telephone, new.telephone.clone())
            .value(ShippingAddresses::Address, new.address.clone())
            .value(ShippingAddresses::PostalCode, new.postal_code.clone())
            .value(ShippingAddresses::Latitude, new.latitude)
            .value(ShippingAddresses::Longitude, new.longitude)
            .value(ShippingAddresses::Notes, new.notes.clone())
            .value(ShippingAddresses::IsDefault, new.is_default)
            .value(ShippingAddresses::DateUpdated, now.to_rfc3339())
            .and_where(Expr::col(ShippingAddresses::Id).eq(address_id))
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query).execute(&mut *conn).await?;
        Ok(())
    }

    /// Un-default every address of the customer, ahead of setting a new one.
    pub(crate) async fn clear_default_addresses(
        conn: &mut SqliteConnection,
        customer: Uuid,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let query = Query::update()
            .table(ShippingAddresses::Table)
            .value(ShippingAddresses::IsDefault, false)
            .value(ShippingAddresses::DateUpdated, now.to_rfc3339())
            .and_where(Expr::col(ShippingAddresses::Customer).eq(customer.to_string()))
            .and_where(Expr::col(ShippingAddresses::IsDefault).eq(true))
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query).execute(&mut *conn).await?;
        Ok(())
    }

    pub(crate) async fn delete_shipping_address(
        conn: &mut SqliteConnection,
        address_id: i64,
    ) -> Result<()> {
        let query = Query::delete()
            .from_table(ShippingAddresses::Table)
            .and_where(Expr::col(ShippingAddresses::Id).eq(address_id))
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query).execute(&mut *conn).await?;
        Ok(())
    }

    pub(crate) async fn insert_catalog(
        conn: &mut SqliteConnection,
        uuid: Uuid,
        new: &NewCatalog,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let query = Query::insert()
            .into_table(Catalogs::Table)
            .columns([
                Catalogs::Uuid,
                Catalogs::Label,
                Catalogs::Metric,
                Catalogs::Status,
                Catalogs::DateCreated,
                Catalogs::DateUpdated,
            ])
            .values_panic([
                uuid.to_string().into(),
                new.label.clone().into(),
                new.metric.as_str().into(),
                new.status.as_str().into(),
                now.to_rfc3339().into(),
                now.to_rfc3339().into(),
            ])
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query).execute(&mut *conn).await?;
        Ok(result.last_insert_rowid())
    }

    pub(crate) async fn insert_goods_catalog(
        conn: &mut SqliteConnection,
        uuid: Uuid,
        goods_id: i64,
        catalog_id: i64,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let query = Query::insert()
            .into_table(GoodsCatalogs::Table)
            .columns([
                GoodsCatalogs::Uuid,
                GoodsCatalogs::GoodsId,
                GoodsCatalogs::CatalogId,
                GoodsCatalogs::DateCreated,
            ])
            .values_panic([
                uuid.to_string().into(),
                goods_id.into(),
                catalog_id.into(),
                now.to_rfc3339().into(),
            ])
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query).execute(&mut *conn).await?;
        Ok(result.last_insert_rowid())
    }
}
