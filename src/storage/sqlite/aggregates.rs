//! Derived counts and sums.
//!
//! Aggregates are recomputed from the base tables on every call; nothing
//! here is persisted. Counts are over distinct goods so that a goods item
//! with several assignment rows is never counted twice.

use sea_query::{Expr, Func, Query, SimpleExpr, SqliteQueryBuilder};
use sqlx::{Row, SqliteConnection};

use crate::domain::{NecessaryAggregates, PurchaseAggregates};
use crate::error::Result;
use crate::storage::schema::{GoodsAssignments, GoodsTable, PurchaseAssignments, PurchaseDeliveries};

use super::SqliteStore;

impl SqliteStore {
    /// Per-necessary goods counts by assignment outcome.
    pub(crate) async fn necessary_counts(
        conn: &mut SqliteConnection,
        necessary_id: i64,
    ) -> Result<NecessaryAggregates> {
        let total = {
            let query = Query::select()
                .expr(Expr::col(GoodsTable::Id).count())
                .from(GoodsTable::Table)
                .and_where(Expr::col(GoodsTable::NecessaryId).eq(necessary_id))
                .to_string(SqliteQueryBuilder);
            scalar_i64(conn, &query).await?
        };

        let done_count = flagged_goods_count(
            conn,
            necessary_id,
            Expr::col((GoodsAssignments::Table, GoodsAssignments::IsDone)).eq(true),
        )
        .await?;
        let skip_count = flagged_goods_count(
            conn,
            necessary_id,
            Expr::col((GoodsAssignments::Table, GoodsAssignments::IsSkip)).eq(true),
        )
        .await?;
        let accept_count = flagged_goods_count(
            conn,
            necessary_id,
            Expr::col((GoodsAssignments::Table, GoodsAssignments::IsAccept)).eq(true),
        )
        .await?;

        Ok(NecessaryAggregates {
            total_count: total,
            done_count,
            skip_count,
            accept_count,
            left_count: total - done_count,
        })
    }

    /// Purchase-level read-side values: bill sum and presence flags.
    pub(crate) async fn purchase_aggregates(
        conn: &mut SqliteConnection,
        purchase_id: i64,
    ) -> Result<PurchaseAggregates> {
        let bill_summary = {
            let query = Query::select()
                .expr(Func::coalesce([
                    Expr::col(GoodsTable::Bill).sum(),
                    Expr::val(0i64).into(),
                ]))
                .from(GoodsTable::Table)
                .and_where(Expr::col(GoodsTable::PurchaseId).eq(purchase_id))
                .to_string(SqliteQueryBuilder);
            scalar_i64(conn, &query).await?
        };

        // An assignment row means the purchase has been taken up, even while
        // the operator slot is still empty (review).
        let has_operator = {
            let query = Query::select()
                .expr(Expr::col(PurchaseAssignments::Id).count())
                .from(PurchaseAssignments::Table)
                .and_where(Expr::col(PurchaseAssignments::PurchaseId).eq(purchase_id))
                .to_string(SqliteQueryBuilder);
            scalar_i64(conn, &query).await? > 0
        };

        let has_delivery = {
            let query = Query::select()
                .expr(Expr::col(PurchaseDeliveries::Id).count())
                .from(PurchaseDeliveries::Table)
                .and_where(Expr::col(PurchaseDeliveries::PurchaseId).eq(purchase_id))
                .to_string(SqliteQueryBuilder);
            scalar_i64(conn, &query).await? > 0
        };

        let has_schedule = {
            let query = Query::select()
                .expr(Expr::col(PurchaseDeliveries::Id).count())
                .from(PurchaseDeliveries::Table)
                .and_where(Expr::col(PurchaseDeliveries::PurchaseId).eq(purchase_id))
                .and_where(Expr::col(PurchaseDeliveries::ScheduleDate).is_not_null())
                .and_where(Expr::col(PurchaseDeliveries::ScheduleTimeStart).is_not_null())
                .and_where(Expr::col(PurchaseDeliveries::ScheduleTimeEnd).is_not_null())
                .to_string(SqliteQueryBuilder);
            scalar_i64(conn, &query).await? > 0
        };

        Ok(PurchaseAggregates {
            bill_summary,
            has_operator,
            has_delivery,
            has_schedule,
        })
    }
}

/// COUNT(DISTINCT goods.id) under a necessary, filtered by an assignment
/// flag condition.
async fn flagged_goods_count(
    conn: &mut SqliteConnection,
    necessary_id: i64,
    condition: SimpleExpr,
) -> Result<i64> {
    let query = Query::select()
        .expr(Expr::col((GoodsTable::Table, GoodsTable::Id)).count_distinct())
        .from(GoodsTable::Table)
        .inner_join(
            GoodsAssignments::Table,
            Expr::col((GoodsAssignments::Table, GoodsAssignments::GoodsId))
                .equals((GoodsTable::Table, GoodsTable::Id)),
        )
        .and_where(Expr::col((GoodsTable::Table, GoodsTable::NecessaryId)).eq(necessary_id))
        .and_where(condition)
        .to_string(SqliteQueryBuilder);

    scalar_i64(conn, &query).await
}

async fn scalar_i64(conn: &mut SqliteConnection, query: &str) -> Result<i64> {
    let row = sqlx::query(query).fetch_one(&mut *conn).await?;
    Ok(row.try_get(0)?)
}
