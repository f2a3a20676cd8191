//! Purchase lifecycle: creation, content edits, status transitions, delete.

use std::sync::Arc;

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::{
    Actor, NewPurchase, Purchase, PurchaseStatus, PurchaseStatusChange, PurchaseUpdate, Role,
};
use crate::error::{CoreError, Result};
use crate::storage::SqliteStore;
use crate::validation;

use super::policy::{self, errmsg};

/// Owns every path that reads or writes `Purchase.status`.
pub struct LifecycleService {
    store: Arc<SqliteStore>,
}

impl LifecycleService {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self { store }
    }

    /// Create a purchase in Draft, optionally attaching a delivery target.
    pub async fn create_purchase(&self, actor: &Actor, new: NewPurchase) -> Result<Purchase> {
        policy::require_role(actor, Role::Customer)?;
        validation::validate_label(&new.label)?;
        validation::validate_excerpt(new.excerpt.as_deref())?;
        validation::validate_text(&new.description)?;
        validation::validate_text(&new.merchant)?;

        let uuid = Uuid::new_v4();
        let mut conn = self.store.begin().await?;
        match Self::create_tx(&mut conn, uuid, actor.id, &new).await {
            Ok(purchase) => {
                SqliteStore::commit(&mut conn).await?;
                info!(purchase = %uuid, customer = %actor.id, "Purchase created");
                Ok(purchase)
            }
            Err(e) => {
                SqliteStore::rollback(&mut conn).await;
                Err(e)
            }
        }
    }

    async fn create_tx(
        conn: &mut SqliteConnection,
        uuid: Uuid,
        customer: Uuid,
        new: &NewPurchase,
    ) -> Result<Purchase> {
        let now = Utc::now();

        if let Some(address_uuid) = new.shipping_address {
            let address = SqliteStore::shipping_address_by_uuid(conn, address_uuid)
                .await?
                .filter(|a| a.customer == customer)
                .ok_or_else(|| CoreError::not_found("shipping address", address_uuid))?;

            let purchase_id = SqliteStore::insert_purchase(conn, uuid, customer, new, now).await?;
            SqliteStore::upsert_delivery(
                conn,
                Uuid::new_v4(),
                purchase_id,
                Some(address.uuid),
                None,
                now,
            )
            .await?;
        } else {
            SqliteStore::insert_purchase(conn, uuid, customer, new, now).await?;
        }

        SqliteStore::purchase_by_uuid(conn, uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("purchase", uuid))
    }

    /// Fetch a purchase visible to the actor.
    ///
    /// A delivery schedule whose date has passed while the purchase is still
    /// Draft is cleared here, so stale schedules never survive a read.
    pub async fn get_purchase(&self, uuid: Uuid, actor: &Actor) -> Result<Purchase> {
        let purchase = self
            .store
            .fetch_purchase(uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("purchase", uuid))?;

        let assignment = self.store.fetch_assignment(purchase.id).await?;
        if !policy::can_view(&purchase, assignment.as_ref(), actor) {
            return Err(CoreError::not_found("purchase", uuid));
        }

        if purchase.status == PurchaseStatus::Draft {
            self.clear_stale_schedule(&purchase).await?;
        }

        Ok(purchase)
    }

    async fn clear_stale_schedule(&self, purchase: &Purchase) -> Result<()> {
        let Some(delivery) = self.store.fetch_delivery(purchase.id).await? else {
            return Ok(());
        };
        let Some(schedule) = delivery.schedule else {
            return Ok(());
        };
        if schedule.date >= Utc::now().date_naive() {
            return Ok(());
        }

        let mut conn = self.store.begin().await?;
        match SqliteStore::clear_delivery_schedule(&mut conn, purchase.id, Utc::now()).await {
            Ok(()) => {
                SqliteStore::commit(&mut conn).await?;
                debug!(purchase = %purchase.uuid, "Cleared stale delivery schedule");
                Ok(())
            }
            Err(e) => {
                SqliteStore::rollback(&mut conn).await;
                Err(e)
            }
        }
    }

    /// List purchases for the actor, newest first. Customers see their own;
    /// operators see the ones assigned to them.
    pub async fn list_purchases(
        &self,
        actor: &Actor,
        statuses: &[PurchaseStatus],
    ) -> Result<Vec<Purchase>> {
        if actor.has_role(Role::Customer) {
            self.store
                .fetch_purchases_for_customer(actor.id, statuses)
                .await
        } else if actor.has_role(Role::Operator) {
            self.store
                .fetch_purchases_for_operator(actor.id, statuses)
                .await
        } else {
            Ok(Vec::new())
        }
    }

    /// Update content fields; legal only while the purchase is Draft.
    pub async fn update_purchase(
        &self,
        uuid: Uuid,
        actor: &Actor,
        update: PurchaseUpdate,
    ) -> Result<Purchase> {
        if let Some(label) = &update.label {
            validation::validate_label(label)?;
        }
        if let Some(excerpt) = &update.excerpt {
            validation::validate_excerpt(excerpt.as_deref())?;
        }
        if let Some(description) = &update.description {
            validation::validate_text(description)?;
        }
        if let Some(merchant) = &update.merchant {
            validation::validate_text(merchant)?;
        }

        let mut conn = self.store.begin().await?;
        match Self::update_tx(&mut conn, uuid, actor, &update).await {
            Ok(purchase) => {
                SqliteStore::commit(&mut conn).await?;
                Ok(purchase)
            }
            Err(e) => {
                SqliteStore::rollback(&mut conn).await;
                Err(e)
            }
        }
    }

    async fn update_tx(
        conn: &mut SqliteConnection,
        uuid: Uuid,
        actor: &Actor,
        update: &PurchaseUpdate,
    ) -> Result<Purchase> {
        let purchase = SqliteStore::purchase_by_uuid(conn, uuid)
            .await?
            .filter(|p| p.customer == actor.id)
            .ok_or_else(|| CoreError::not_found("purchase", uuid))?;

        if !purchase.status.editable() {
            return Err(CoreError::validation(errmsg::NOT_EDITABLE));
        }

        let now = Utc::now();
        SqliteStore::update_purchase_fields(conn, purchase.id, update, now).await?;

        if update.shipping_address.is_some() || update.delivery_schedule.is_some() {
            let existing = SqliteStore::delivery_for_purchase(conn, purchase.id).await?;

            // Untouched delivery fields carry over from the existing row.
            let address = match update.shipping_address {
                Some(address_uuid) => {
                    let address = SqliteStore::shipping_address_by_uuid(conn, address_uuid)
                        .await?
                        .filter(|a| a.customer == actor.id)
                        .ok_or_else(|| CoreError::not_found("shipping address", address_uuid))?;
                    Some(address.uuid)
                }
                None => existing.as_ref().and_then(|d| d.shipping_address),
            };
            let schedule = match update.delivery_schedule {
                Some(schedule) => schedule,
                None => existing.as_ref().and_then(|d| d.schedule),
            };
            let delivery_uuid = existing
                .as_ref()
                .map(|d| d.uuid)
                .unwrap_or_else(Uuid::new_v4);

            SqliteStore::upsert_delivery(conn, delivery_uuid, purchase.id, address, schedule, now)
                .await?;
        }

        SqliteStore::purchase_by_uuid(conn, uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("purchase", uuid))
    }

    /// Delete a purchase and everything under it. Draft or Rejected only.
    pub async fn delete_purchase(&self, uuid: Uuid, actor: &Actor) -> Result<()> {
        let mut conn = self.store.begin().await?;
        match Self::delete_tx(&mut conn, uuid, actor).await {
            Ok(()) => {
                SqliteStore::commit(&mut conn).await?;
                info!(purchase = %uuid, "Purchase deleted");
                Ok(())
            }
            Err(e) => {
                SqliteStore::rollback(&mut conn).await;
                Err(e)
            }
        }
    }

    async fn delete_tx(conn: &mut SqliteConnection, uuid: Uuid, actor: &Actor) -> Result<()> {
        let purchase = SqliteStore::purchase_by_uuid(conn, uuid)
            .await?
            .filter(|p| p.customer == actor.id)
            .ok_or_else(|| CoreError::not_found("purchase", uuid))?;

        if !purchase.status.deletable() {
            return Err(CoreError::validation(errmsg::NOT_DELETABLE));
        }

        SqliteStore::delete_purchase(conn, purchase.id).await
    }

    /// Write a new status.
    ///
    /// Guards run inside the write transaction against the committed status;
    /// a successful write appends a change-log row, and writing Accept also
    /// flips every not-yet-accepted goods assignment under the purchase.
    pub async fn transition_status(
        &self,
        uuid: Uuid,
        actor: &Actor,
        new_status: PurchaseStatus,
    ) -> Result<Purchase> {
        let mut conn = self.store.begin().await?;
        match Self::transition_tx(&mut conn, uuid, actor, new_status).await {
            Ok((purchase, old_status)) => {
                SqliteStore::commit(&mut conn).await?;
                info!(
                    purchase = %uuid,
                    from = %old_status,
                    to = %new_status,
                    actor = %actor.id,
                    "Purchase status changed"
                );
                Ok(purchase)
            }
            Err(e) => {
                SqliteStore::rollback(&mut conn).await;
                Err(e)
            }
        }
    }

    async fn transition_tx(
        conn: &mut SqliteConnection,
        uuid: Uuid,
        actor: &Actor,
        new_status: PurchaseStatus,
    ) -> Result<(Purchase, PurchaseStatus)> {
        let purchase = SqliteStore::purchase_by_uuid(conn, uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("purchase", uuid))?;

        // Customers only ever touch their own purchases. Operators may act
        // while no operator is bound yet (review rejection); once the
        // purchase is routed to an operator, only that operator's writes
        // count.
        if purchase.customer != actor.id {
            if !actor.has_role(Role::Operator) {
                return Err(CoreError::not_found("purchase", uuid));
            }
            let assignment = SqliteStore::assignment_for_purchase(conn, purchase.id).await?;
            if let Some(bound) = assignment.and_then(|a| a.operator) {
                if bound != actor.id {
                    return Err(CoreError::not_found("purchase", uuid));
                }
            }
        }

        let old_status = purchase.status;
        policy::check_transition(actor, old_status, new_status)?;

        let now = Utc::now();
        SqliteStore::set_purchase_status(conn, purchase.id, new_status, now).await?;
        SqliteStore::insert_status_change(
            conn,
            purchase.id,
            Some(actor.id),
            old_status,
            new_status,
            now,
        )
        .await?;

        if new_status == PurchaseStatus::Accept {
            let flipped = SqliteStore::bulk_accept_goods(conn, purchase.id, now).await?;
            debug!(purchase = %uuid, flipped, "Propagated accept to goods assignments");
        }

        let purchase = SqliteStore::purchase_by_uuid(conn, uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("purchase", uuid))?;
        Ok((purchase, old_status))
    }

    /// Change-log entries for a purchase, newest first.
    pub async fn list_status_changes(
        &self,
        uuid: Uuid,
        actor: &Actor,
    ) -> Result<Vec<PurchaseStatusChange>> {
        let purchase = self.get_purchase(uuid, actor).await?;
        self.store.fetch_status_changes(purchase.id).await
    }
}
