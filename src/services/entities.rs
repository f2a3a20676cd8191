//! CRUD for the entities hanging off a purchase: necessaries, goods,
//! shipping addresses, and the catalog pool.
//!
//! Content edits follow the purchase's editability (Draft only); pricing is
//! the assigned operator's path and is legal regardless of edit state.

use std::sync::Arc;

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::info;
use uuid::Uuid;

use crate::domain::{
    Actor, Catalog, CatalogStatus, Goods, GoodsSource, GoodsUpdate, Necessary, NecessaryUpdate,
    NewCatalog, NewGoods, NewNecessary, NewShippingAddress, Purchase, Role, ShippingAddress,
};
use crate::error::{CoreError, Result};
use crate::storage::SqliteStore;
use crate::validation;

use super::policy::{self, errmsg};

pub struct EntityService {
    store: Arc<SqliteStore>,
}

impl EntityService {
    pub fn new(store: Arc<SqliteStore>) -> Self {
        Self { store }
    }

    // ------------------------------------------------------------------
    // Necessaries
    // ------------------------------------------------------------------

    pub async fn create_necessary(&self, actor: &Actor, new: NewNecessary) -> Result<Necessary> {
        validation::validate_label(&new.label)?;
        validation::validate_excerpt(new.excerpt.as_deref())?;
        validation::validate_text(&new.description)?;

        let mut conn = self.store.begin().await?;
        match Self::create_necessary_tx(&mut conn, actor, &new).await {
            Ok(necessary) => {
                SqliteStore::commit(&mut conn).await?;
                Ok(necessary)
            }
            Err(e) => {
                SqliteStore::rollback(&mut conn).await;
                Err(e)
            }
        }
    }

    async fn create_necessary_tx(
        conn: &mut SqliteConnection,
        actor: &Actor,
        new: &NewNecessary,
    ) -> Result<Necessary> {
        let purchase = editable_purchase(conn, new.purchase, actor).await?;

        let uuid = Uuid::new_v4();
        SqliteStore::insert_necessary(
            conn,
            uuid,
            actor.id,
            purchase.id,
            &new.label,
            new.excerpt.as_deref(),
            &new.description,
            Utc::now(),
        )
        .await?;

        SqliteStore::necessary_by_uuid(conn, uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("necessary", uuid))
    }

    pub async fn update_necessary(
        &self,
        uuid: Uuid,
        actor: &Actor,
        update: NecessaryUpdate,
    ) -> Result<Necessary> {
        if let Some(label) = &update.label {
            validation::validate_label(label)?;
        }
        if let Some(excerpt) = &update.excerpt {
            validation::validate_excerpt(excerpt.as_deref())?;
        }
        if let Some(description) = &update.description {
            validation::validate_text(description)?;
        }

        let mut conn = self.store.begin().await?;
        let result = Self::update_necessary_tx(&mut conn, uuid, actor, &update).await;
        finish(&mut conn, result).await
    }

    async fn update_necessary_tx(
        conn: &mut SqliteConnection,
        uuid: Uuid,
        actor: &Actor,
        update: &NecessaryUpdate,
    ) -> Result<Necessary> {
        let necessary = owned_necessary(conn, uuid, actor).await?;
        editable_purchase_by_id(conn, necessary.purchase_id, uuid).await?;

        SqliteStore::update_necessary_fields(conn, necessary.id, update, Utc::now()).await?;
        SqliteStore::necessary_by_uuid(conn, uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("necessary", uuid))
    }

    pub async fn delete_necessary(&self, uuid: Uuid, actor: &Actor) -> Result<()> {
        let mut conn = self.store.begin().await?;
        let result = async {
            let necessary = owned_necessary(&mut *conn, uuid, actor).await?;
            editable_purchase_by_id(&mut *conn, necessary.purchase_id, uuid).await?;
            SqliteStore::delete_necessary(&mut *conn, necessary.id).await
        }
        .await;
        finish(&mut conn, result).await
    }

    pub async fn list_necessaries(
        &self,
        purchase_uuid: Uuid,
        actor: &Actor,
    ) -> Result<Vec<Necessary>> {
        let mut conn = self.store.pool().acquire().await?;
        let purchase = viewable_purchase(&mut conn, purchase_uuid, actor).await?;
        SqliteStore::necessaries_for_purchase(&mut conn, purchase.id).await
    }

    // ------------------------------------------------------------------
    // Goods
    // ------------------------------------------------------------------

    pub async fn create_goods(&self, actor: &Actor, new: NewGoods) -> Result<Goods> {
        validation::validate_excerpt(new.excerpt.as_deref())?;
        validation::validate_text(&new.description)?;
        validation::validate_quantity(new.quantity)?;
        if let GoodsSource::Manual { label } = &new.source {
            validation::validate_label(label)?;
        }

        let mut conn = self.store.begin().await?;
        match Self::create_goods_tx(&mut conn, actor, &new).await {
            Ok(goods) => {
                SqliteStore::commit(&mut conn).await?;
                Ok(goods)
            }
            Err(e) => {
                SqliteStore::rollback(&mut conn).await;
                Err(e)
            }
        }
    }

    async fn create_goods_tx(
        conn: &mut SqliteConnection,
        actor: &Actor,
        new: &NewGoods,
    ) -> Result<Goods> {
        let necessary = owned_necessary(conn, new.necessary, actor).await?;
        editable_purchase_by_id(conn, necessary.purchase_id, new.necessary).await?;

        // Resolve the label and, for catalog-sourced goods, the link target.
        let (label, catalog_id) = match &new.source {
            GoodsSource::Manual { label } => (label.clone(), None),
            GoodsSource::Catalog { catalog } => {
                let entry = SqliteStore::catalog_by_uuid(conn, *catalog)
                    .await?
                    .filter(|c| c.status == CatalogStatus::Publish)
                    .ok_or_else(|| CoreError::not_found("catalog", *catalog))?;
                if SqliteStore::catalog_used_in_necessary(conn, necessary.id, entry.id).await? {
                    return Err(CoreError::validation(
                        "catalog entry already selected in this necessary",
                    ));
                }
                (entry.label.clone(), Some(entry.id))
            }
        };

        let now = Utc::now();
        let uuid = Uuid::new_v4();
        let goods_id = SqliteStore::insert_goods(
            conn,
            uuid,
            actor.id,
            necessary.purchase_id,
            necessary.id,
            &label,
            new.excerpt.as_deref(),
            &new.description,
            new.quantity,
            new.metric.as_str(),
            now,
        )
        .await?;

        if let Some(catalog_id) = catalog_id {
            SqliteStore::insert_goods_catalog(conn, Uuid::new_v4(), goods_id, catalog_id, now)
                .await?;
        }

        SqliteStore::goods_by_uuid(conn, uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("goods", uuid))
    }

    pub async fn update_goods(
        &self,
        uuid: Uuid,
        actor: &Actor,
        update: GoodsUpdate,
    ) -> Result<Goods> {
        if let Some(label) = &update.label {
            validation::validate_label(label)?;
        }
        if let Some(excerpt) = &update.excerpt {
            validation::validate_excerpt(excerpt.as_deref())?;
        }
        if let Some(description) = &update.description {
            validation::validate_text(description)?;
        }
        if let Some(quantity) = update.quantity {
            validation::validate_quantity(quantity)?;
        }

        let mut conn = self.store.begin().await?;
        let result = async {
            let goods = owned_goods(&mut *conn, uuid, actor).await?;
            editable_purchase_by_id(&mut *conn, goods.purchase_id, uuid).await?;

            SqliteStore::update_goods_fields(&mut *conn, goods.id, &update, Utc::now()).await?;
            SqliteStore::goods_by_uuid(&mut *conn, uuid)
                .await?
                .ok_or_else(|| CoreError::not_found("goods", uuid))
        }
        .await;
        finish(&mut conn, result).await
    }

    pub async fn delete_goods(&self, uuid: Uuid, actor: &Actor) -> Result<()> {
        let mut conn = self.store.begin().await?;
        let result = async {
            let goods = owned_goods(&mut *conn, uuid, actor).await?;
            editable_purchase_by_id(&mut *conn, goods.purchase_id, uuid).await?;
            SqliteStore::delete_goods(&mut *conn, goods.id).await
        }
        .await;
        finish(&mut conn, result).await
    }

    pub async fn list_goods(&self, necessary_uuid: Uuid, actor: &Actor) -> Result<Vec<Goods>> {
        let mut conn = self.store.pool().acquire().await?;
        let necessary = SqliteStore::necessary_by_uuid(&mut conn, necessary_uuid)
            .await?
            .ok_or_else(|| CoreError::not_found("necessary", necessary_uuid))?;
        let purchase = SqliteStore::purchase_by_id(&mut conn, necessary.purchase_id)
            .await?
            .ok_or_else(|| CoreError::not_found("necessary", necessary_uuid))?;
        let assignment = SqliteStore::assignment_for_purchase(&mut conn, purchase.id).await?;
        if !policy::can_view(&purchase, assignment.as_ref(), actor) {
            return Err(CoreError::not_found("necessary", necessary_uuid));
        }
        SqliteStore::goods_for_necessary(&mut conn, necessary.id).await
    }

    /// Assigned operator records the shop price; bill is price times
    /// quantity, stored so reads never recompute it.
    pub async fn price_goods(&self, uuid: Uuid, operator: &Actor, price: i64) -> Result<Goods> {
        policy::require_role(operator, Role::Operator)?;
        if price < 0 {
            return Err(CoreError::validation("price cannot be negative"));
        }

        let mut conn = self.store.begin().await?;
        let result = async {
            let goods = SqliteStore::goods_by_uuid(&mut *conn, uuid)
                .await?
                .ok_or_else(|| CoreError::not_found("goods", uuid))?;

            let assignment =
                SqliteStore::assignment_for_purchase(&mut *conn, goods.purchase_id).await?;
            if assignment.and_then(|a| a.operator) != Some(operator.id) {
                return Err(CoreError::permission(
                    "goods can only be priced by the assigned operator",
                ));
            }

            let bill = price * goods.quantity;
            SqliteStore::set_goods_price(&mut *conn, goods.id, price, bill, Utc::now()).await?;
            SqliteStore::goods_by_uuid(&mut *conn, uuid)
                .await?
                .ok_or_else(|| CoreError::not_found("goods", uuid))
        }
        .await;
        finish(&mut conn, result).await
    }

    // ------------------------------------------------------------------
    // Shipping addresses
    // ------------------------------------------------------------------

    pub async fn create_shipping_address(
        &self,
        actor: &Actor,
        new: NewShippingAddress,
    ) -> Result<ShippingAddress> {
        policy::require_role(actor, Role::Customer)?;
        validate_address(&new)?;

        let mut conn = self.store.begin().await?;
        let result = async {
            let now = Utc::now();
            if new.is_default {
                SqliteStore::clear_default_addresses(&mut *conn, actor.id, now).await?;
            }
            let uuid = Uuid::new_v4();
            SqliteStore::insert_shipping_address(&mut *conn, uuid, actor.id, &new, now).await?;
            SqliteStore::shipping_address_by_uuid(&mut *conn, uuid)
                .await?
                .ok_or_else(|| CoreError::not_found("shipping address", uuid))
        }
        .await;
        finish(&mut conn, result).await
    }

    pub async fn update_shipping_address(
        &self,
        uuid: Uuid,
        actor: &Actor,
        new: NewShippingAddress,
    ) -> Result<ShippingAddress> {
        validate_address(&new)?;

        let mut conn = self.store.begin().await?;
        let result = async {
            let address = SqliteStore::shipping_address_by_uuid(&mut *conn, uuid)
                .await?
                .filter(|a| a.customer == actor.id)
                .ok_or_else(|| CoreError::not_found("shipping address", uuid))?;

            let now = Utc::now();
            if new.is_default && !address.is_default {
                SqliteStore::clear_default_addresses(&mut *conn, actor.id, now).await?;
            }
            SqliteStore::update_shipping_address(&mut *conn, address.id, &new, now).await?;
            SqliteStore::shipping_address_by_uuid(&mut *conn, uuid)
                .await?
                .ok_or_else(|| CoreError::not_found("shipping address", uuid))
        }
        .await;
        finish(&mut conn, result).await
    }

    pub async fn delete_shipping_address(&self, uuid: Uuid, actor: &Actor) -> Result<()> {
        let mut conn = self.store.begin().await?;
        let result = async {
            let address = SqliteStore::shipping_address_by_uuid(&mut *conn, uuid)
                .await?
                .filter(|a| a.customer == actor.id)
                .ok_or_else(|| CoreError::not_found("shipping address", uuid))?;
            SqliteStore::delete_shipping_address(&mut *conn, address.id).await
        }
        .await;
        finish(&mut conn, result).await
    }

    pub async fn list_shipping_addresses(&self, actor: &Actor) -> Result<Vec<ShippingAddress>> {
        self.store.fetch_shipping_addresses(actor.id).await
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    pub async fn create_catalog(&self, actor: &Actor, new: NewCatalog) -> Result<Catalog> {
        policy::require_role(actor, Role::Operator)?;
        validation::validate_label(&new.label)?;

        let mut conn = self.store.begin().await?;
        let result = async {
            let uuid = Uuid::new_v4();
            SqliteStore::insert_catalog(&mut *conn, uuid, &new, Utc::now()).await?;
            SqliteStore::catalog_by_uuid(&mut *conn, uuid)
                .await?
                .ok_or_else(|| CoreError::not_found("catalog", uuid))
        }
        .await;
        let catalog = finish(&mut conn, result).await?;
        info!(catalog = %catalog.uuid, label = %catalog.label, "Catalog entry created");
        Ok(catalog)
    }

    /// Catalog pool; customers only ever see published entries.
    pub async fn list_catalogs(&self, publish_only: bool) -> Result<Vec<Catalog>> {
        self.store.list_catalogs(publish_only).await
    }
}

fn validate_address(new: &NewShippingAddress) -> Result<()> {
    validation::validate_label(&new.label)?;
    validation::validate_text(&new.recipient)?;
    validation::validate_text(&new.telephone)?;
    validation::validate_text(&new.address)?;
    validation::validate_text(&new.postal_code)?;
    validation::validate_text(&new.notes)?;
    Ok(())
}

/// Commit on Ok, roll back on Err.
async fn finish<T>(
    conn: &mut sqlx::pool::PoolConnection<sqlx::Sqlite>,
    result: Result<T>,
) -> Result<T> {
    match result {
        Ok(value) => {
            SqliteStore::commit(conn).await?;
            Ok(value)
        }
        Err(e) => {
            SqliteStore::rollback(conn).await;
            Err(e)
        }
    }
}

async fn viewable_purchase(
    conn: &mut SqliteConnection,
    uuid: Uuid,
    actor: &Actor,
) -> Result<Purchase> {
    let purchase = SqliteStore::purchase_by_uuid(conn, uuid)
        .await?
        .ok_or_else(|| CoreError::not_found("purchase", uuid))?;
    let assignment = SqliteStore::assignment_for_purchase(conn, purchase.id).await?;
    if policy::can_view(&purchase, assignment.as_ref(), actor) {
        Ok(purchase)
    } else {
        Err(CoreError::not_found("purchase", uuid))
    }
}

async fn editable_purchase(
    conn: &mut SqliteConnection,
    uuid: Uuid,
    actor: &Actor,
) -> Result<Purchase> {
    let purchase = SqliteStore::purchase_by_uuid(conn, uuid)
        .await?
        .filter(|p| p.customer == actor.id)
        .ok_or_else(|| CoreError::not_found("purchase", uuid))?;
    if !purchase.status.editable() {
        return Err(CoreError::validation(errmsg::NOT_EDITABLE));
    }
    Ok(purchase)
}

async fn editable_purchase_by_id(
    conn: &mut SqliteConnection,
    purchase_id: i64,
    entity_uuid: Uuid,
) -> Result<Purchase> {
    let purchase = SqliteStore::purchase_by_id(conn, purchase_id)
        .await?
        .ok_or_else(|| CoreError::not_found("purchase", entity_uuid))?;
    if !purchase.status.editable() {
        return Err(CoreError::validation(errmsg::NOT_EDITABLE));
    }
    Ok(purchase)
}

async fn owned_necessary(
    conn: &mut SqliteConnection,
    uuid: Uuid,
    actor: &Actor,
) -> Result<Necessary> {
    SqliteStore::necessary_by_uuid(conn, uuid)
        .await?
        .filter(|n| n.customer == actor.id)
        .ok_or_else(|| CoreError::not_found("necessary", uuid))
}

async fn owned_goods(conn: &mut SqliteConnection, uuid: Uuid, actor: &Actor) -> Result<Goods> {
    SqliteStore::goods_by_uuid(conn, uuid)
        .await?
        .filter(|g| g.customer == actor.id)
        .ok_or_else(|| CoreError::not_found("goods", uuid))
}
