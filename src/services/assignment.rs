//! Assignment engine: binding operators to purchases and goods.

use std::sync::Arc;

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::info;
use uuid::Uuid;

use crate::domain::{Actor, GoodsAssigned, PurchaseAssigned, PurchaseStatus, Role};
use crate::error::{CoreError, Result};
use crate::storage::SqliteStore;

use super::policy::{self, errmsg};

/// Creates and updates assignment rows; purchase status side effects land in
/// the same transaction as the assignment write.
pub struct AssignmentService {
    store: Arc<SqliteStore>,
}

impl AssignmentService {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self { store }
    }

    /// Create or update the purchase's assignment row.
    ///
    /// With an operator the purchase becomes Assigned; without one it
    /// becomes Reviewed (taken for review, nobody shopping yet). Either way
    /// the status write appends a change-log row.
    pub async fn assign_operator(
        &self,
        purchase_uuid: Uuid,
        operator: Option<&Actor>,
        acting: &Actor,
    ) -> Result<PurchaseAssigned> {
        policy::require_role(acting, Role::Operator)?;
        if let Some(operator) = operator {
            policy::require_role(operator, Role::Operator)?;
        }

        let mut conn = self.store.begin().await?;
        match Self::assign_tx(&mut conn, purchase_uuid, operator.map(|o| o.id), acting).await {
            Ok(assignment) => {
                SqliteStore::commit(&mut conn).await?;
                info!(
                    purchase = %purchase_uuid,
                    operator = ?assignment.operator,
                    "Purchase assignment updated"
                );
                Ok(assignment)
            }
            Err(e) => {
                SqliteStore::rollback(&mut conn).await;
                Err(e)
            }
        }
    }

    async fn assign_tx(
        conn: &mut SqliteConnection,
        purchase_uuid: Uuid,
        operator: Option<Uuid>,
        acting: &Actor,
    ) -> Result<PurchaseAssigned> {
        let purchase = SqliteStore::purchase_by_uuid(conn, purchase_uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("purchase", purchase_uuid))?;

        // Assignment only makes sense once the customer has handed the
        // purchase over and before the shopping is finished.
        match purchase.status {
            PurchaseStatus::Submitted | PurchaseStatus::Reviewed | PurchaseStatus::Assigned => {}
            other => {
                return Err(CoreError::validation(format!(
                    "purchase in status {other} cannot be assigned"
                )))
            }
        }

        let now = Utc::now();
        SqliteStore::upsert_purchase_assigned(conn, Uuid::new_v4(), purchase.id, operator, now)
            .await?;

        let new_status = if operator.is_some() {
            PurchaseStatus::Assigned
        } else {
            PurchaseStatus::Reviewed
        };
        if purchase.status != new_status {
            SqliteStore::set_purchase_status(conn, purchase.id, new_status, now).await?;
            SqliteStore::insert_status_change(
                conn,
                purchase.id,
                Some(acting.id),
                purchase.status,
                new_status,
                now,
            )
            .await?;
        }

        SqliteStore::assignment_for_purchase(conn, purchase.id)
            .await?
            .ok_or_else(|| CoreError::not_found("purchase assignment", purchase_uuid))
    }

    /// Record that an operator picked up a goods item.
    pub async fn assign_goods(&self, goods_uuid: Uuid, operator: &Actor) -> Result<GoodsAssigned> {
        policy::require_role(operator, Role::Operator)?;

        let mut conn = self.store.begin().await?;
        match Self::assign_goods_tx(&mut conn, goods_uuid, operator).await {
            Ok(assignment) => {
                SqliteStore::commit(&mut conn).await?;
                Ok(assignment)
            }
            Err(e) => {
                SqliteStore::rollback(&mut conn).await;
                Err(e)
            }
        }
    }

    async fn assign_goods_tx(
        conn: &mut SqliteConnection,
        goods_uuid: Uuid,
        operator: &Actor,
    ) -> Result<GoodsAssigned> {
        let goods = SqliteStore::goods_by_uuid(conn, goods_uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("goods", goods_uuid))?;

        let assignment = SqliteStore::assignment_for_purchase(conn, goods.purchase_id).await?;
        if assignment.and_then(|a| a.operator) != Some(operator.id) {
            return Err(CoreError::permission(
                "goods can only be picked up by the assigned operator",
            ));
        }

        let uuid = Uuid::new_v4();
        SqliteStore::insert_goods_assigned(conn, uuid, goods.id, operator.id, Utc::now()).await?;
        SqliteStore::goods_assigned_by_uuid(conn, uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("goods assignment", uuid))
    }

    /// Operator marks a goods item skipped and/or done.
    pub async fn mark_goods_outcome(
        &self,
        goods_assigned_uuid: Uuid,
        operator: &Actor,
        is_skip: Option<bool>,
        is_done: Option<bool>,
    ) -> Result<GoodsAssigned> {
        policy::require_role(operator, Role::Operator)?;

        let mut conn = self.store.begin().await?;
        match Self::mark_outcome_tx(&mut conn, goods_assigned_uuid, operator, is_skip, is_done)
            .await
        {
            Ok(assignment) => {
                SqliteStore::commit(&mut conn).await?;
                Ok(assignment)
            }
            Err(e) => {
                SqliteStore::rollback(&mut conn).await;
                Err(e)
            }
        }
    }

    async fn mark_outcome_tx(
        conn: &mut SqliteConnection,
        goods_assigned_uuid: Uuid,
        operator: &Actor,
        is_skip: Option<bool>,
        is_done: Option<bool>,
    ) -> Result<GoodsAssigned> {
        let assignment = SqliteStore::goods_assigned_by_uuid(conn, goods_assigned_uuid)
            .await?
            .filter(|a| a.operator == operator.id)
            .ok_or_else(|| CoreError::not_found("goods assignment", goods_assigned_uuid))?;

        SqliteStore::update_goods_assigned_flags(
            conn,
            assignment.id,
            is_skip,
            is_done,
            None,
            Utc::now(),
        )
        .await?;

        SqliteStore::goods_assigned_by_uuid(conn, goods_assigned_uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("goods assignment", goods_assigned_uuid))
    }

    /// Customer confirms a single goods item; legal only while the owning
    /// purchase is Done.
    pub async fn accept_goods(
        &self,
        goods_assigned_uuid: Uuid,
        customer: &Actor,
    ) -> Result<GoodsAssigned> {
        let mut conn = self.store.begin().await?;
        match Self::accept_goods_tx(&mut conn, goods_assigned_uuid, customer).await {
            Ok(assignment) => {
                SqliteStore::commit(&mut conn).await?;
                Ok(assignment)
            }
            Err(e) => {
                SqliteStore::rollback(&mut conn).await;
                Err(e)
            }
        }
    }

    async fn accept_goods_tx(
        conn: &mut SqliteConnection,
        goods_assigned_uuid: Uuid,
        customer: &Actor,
    ) -> Result<GoodsAssigned> {
        let assignment = SqliteStore::goods_assigned_by_uuid(conn, goods_assigned_uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("goods assignment", goods_assigned_uuid))?;

        let goods = SqliteStore::goods_by_id(conn, assignment.goods_id)
            .await?
            .filter(|g| g.customer == customer.id)
            .ok_or_else(|| CoreError::not_found("goods assignment", goods_assigned_uuid))?;

        let purchase = SqliteStore::purchase_by_id(conn, goods.purchase_id)
            .await?
            .ok_or_else(|| CoreError::not_found("goods assignment", goods_assigned_uuid))?;
        if purchase.status != PurchaseStatus::Done {
            return Err(CoreError::validation(errmsg::NOT_DONE));
        }

        SqliteStore::update_goods_assigned_flags(
            conn,
            assignment.id,
            None,
            None,
            Some(true),
            Utc::now(),
        )
        .await?;

        SqliteStore::goods_assigned_by_uuid(conn, goods_assigned_uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("goods assignment", goods_assigned_uuid))
    }
}
