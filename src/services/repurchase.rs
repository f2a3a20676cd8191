//! Repurchase: deep-clone a finished purchase into a fresh draft.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::info;
use uuid::Uuid;

use crate::domain::{Actor, NewPurchase, Purchase, PurchaseStatus};
use crate::error::{CoreError, Result};
use crate::storage::SqliteStore;

/// Clones a Done/Accept purchase and its whole tree into a new Draft.
pub struct RepurchaseService {
    store: Arc<SqliteStore>,
}

impl RepurchaseService {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self { store }
    }

    /// Deep-copy the source purchase for the owning customer.
    ///
    /// Foreign keys are remapped through explicit old-id to new-id maps, so
    /// goods land under the cloned necessary and catalog links point at the
    /// cloned goods regardless of iteration order. Price, bill, and the
    /// delivery schedule reset to empty; assignments and the change log are
    /// not copied.
    pub async fn clone_purchase(&self, source_uuid: Uuid, customer: &Actor) -> Result<Purchase> {
        let mut conn = self.store.begin().await?;
        match Self::clone_tx(&mut conn, source_uuid, customer).await {
            Ok(purchase) => {
                SqliteStore::commit(&mut conn).await?;
                info!(source = %source_uuid, clone = %purchase.uuid, "Purchase cloned");
                Ok(purchase)
            }
            Err(e) => {
                SqliteStore::rollback(&mut conn).await;
                Err(e)
            }
        }
    }

    async fn clone_tx(
        conn: &mut SqliteConnection,
        source_uuid: Uuid,
        customer: &Actor,
    ) -> Result<Purchase> {
        let source = SqliteStore::purchase_by_uuid(conn, source_uuid)
            .await?
            .filter(|p| p.customer == customer.id)
            .filter(|p| {
                matches!(p.status, PurchaseStatus::Done | PurchaseStatus::Accept)
            })
            .ok_or_else(|| CoreError::not_found("purchase", source_uuid))?;

        let now = Utc::now();
        let new_uuid = Uuid::new_v4();
        let new_purchase_id = SqliteStore::insert_purchase(
            conn,
            new_uuid,
            customer.id,
            &NewPurchase {
                label: source.label.clone(),
                excerpt: source.excerpt.clone(),
                description: source.description.clone(),
                schedule: source.schedule,
                merchant: source.merchant.clone(),
                shipping_address: None,
            },
            now,
        )
        .await?;

        let mut necessary_ids = HashMap::new();
        for necessary in SqliteStore::necessaries_for_purchase(conn, source.id).await? {
            let new_id = SqliteStore::insert_necessary(
                conn,
                Uuid::new_v4(),
                customer.id,
                new_purchase_id,
                &necessary.label,
                necessary.excerpt.as_deref(),
                &necessary.description,
                now,
            )
            .await?;
            necessary_ids.insert(necessary.id, new_id);
        }

        // Price and bill stay unset on the clone; the new purchase has not
        // been shopped yet.
        let mut goods_ids = HashMap::new();
        for goods in SqliteStore::goods_for_purchase(conn, source.id).await? {
            let necessary_id = necessary_ids.get(&goods.necessary_id).copied().ok_or_else(
                || CoreError::InvalidData(format!("goods {} under foreign necessary", goods.uuid)),
            )?;
            let new_id = SqliteStore::insert_goods(
                conn,
                Uuid::new_v4(),
                customer.id,
                new_purchase_id,
                necessary_id,
                &goods.label,
                goods.excerpt.as_deref(),
                &goods.description,
                goods.quantity,
                goods.metric.as_str(),
                now,
            )
            .await?;
            goods_ids.insert(goods.id, new_id);
        }

        for link in SqliteStore::goods_catalogs_for_purchase(conn, source.id).await? {
            let goods_id = goods_ids.get(&link.goods_id).copied().ok_or_else(|| {
                CoreError::InvalidData(format!("catalog link {} to foreign goods", link.uuid))
            })?;
            SqliteStore::insert_goods_catalog(conn, Uuid::new_v4(), goods_id, link.catalog_id, now)
                .await?;
        }

        if let Some(delivery) = SqliteStore::delivery_for_purchase(conn, source.id).await? {
            SqliteStore::upsert_delivery(
                conn,
                Uuid::new_v4(),
                new_purchase_id,
                delivery.shipping_address,
                None,
                now,
            )
            .await?;
        }

        SqliteStore::purchase_by_uuid(conn, new_uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("purchase", new_uuid))
    }
}
