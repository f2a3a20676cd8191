//! Read-side aggregate computation.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Actor, NecessaryAggregates, PurchaseAggregates};
use crate::error::{CoreError, Result};
use crate::storage::SqliteStore;

use super::policy;

/// Derives counts and sums from the base tables on demand. Calls are
/// lock-free pool reads; nothing is cached or persisted, so two calls with
/// no intervening write always agree.
pub struct AggregateService {
    store: Arc<SqliteStore>,
}

impl AggregateService {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self { store }
    }

    /// Per-necessary goods counts by assignment outcome.
    pub async fn compute_necessary_aggregates(
        &self,
        necessary_uuid: Uuid,
        actor: &Actor,
    ) -> Result<NecessaryAggregates> {
        let mut conn = self.store.pool().acquire().await?;

        let necessary = SqliteStore::necessary_by_uuid(&mut conn, necessary_uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("necessary", necessary_uuid))?;
        self.check_purchase_access(&mut conn, necessary.purchase_id, necessary_uuid, actor)
            .await?;

        SqliteStore::necessary_counts(&mut conn, necessary.id).await
    }

    /// Purchase-level bill sum and presence flags.
    pub async fn compute_purchase_aggregates(
        &self,
        purchase_uuid: Uuid,
        actor: &Actor,
    ) -> Result<PurchaseAggregates> {
        let mut conn = self.store.pool().acquire().await?;

        let purchase = SqliteStore::purchase_by_uuid(&mut conn, purchase_uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("purchase", purchase_uuid))?;
        let assignment = SqliteStore::assignment_for_purchase(&mut conn, purchase.id).await?;
        if !policy::can_view(&purchase, assignment.as_ref(), actor) {
            return Err(CoreError::not_found("purchase", purchase_uuid));
        }

        SqliteStore::purchase_aggregates(&mut conn, purchase.id).await
    }

    async fn check_purchase_access(
        &self,
        conn: &mut sqlx::SqliteConnection,
        purchase_id: i64,
        entity_uuid: Uuid,
        actor: &Actor,
    ) -> Result<()> {
        let purchase = SqliteStore::purchase_by_id(conn, purchase_id)
            .await?
            .ok_or_else(|| CoreError::not_found("necessary", entity_uuid))?;
        let assignment = SqliteStore::assignment_for_purchase(conn, purchase.id).await?;
        if policy::can_view(&purchase, assignment.as_ref(), actor) {
            Ok(())
        } else {
            Err(CoreError::not_found("necessary", entity_uuid))
        }
    }
}
