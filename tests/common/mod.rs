//! Shared fixtures for integration tests.
//!
//! Each test gets its own tempdir-backed SQLite database, so tests are
//! isolated and need no cleanup between runs.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use tempfile::TempDir;
use uuid::Uuid;

use marketrun::config::StorageConfig;
use marketrun::domain::{
    Actor, Goods, GoodsSource, Metric, Necessary, NewGoods, NewNecessary, NewPurchase,
    NewShippingAddress, Purchase, PurchaseStatus,
};
use marketrun::services::{
    AggregateService, AssignmentService, EntityService, LifecycleService, RepurchaseService,
};
use marketrun::storage::{init_storage, SqliteStore};

pub struct TestApp {
    pub store: Arc<SqliteStore>,
    pub lifecycle: LifecycleService,
    pub assignment: AssignmentService,
    pub entities: EntityService,
    pub aggregates: AggregateService,
    pub repurchase: RepurchaseService,
    _dir: TempDir,
}

pub async fn test_app() -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create tempdir");
    let config = StorageConfig {
        path: dir.path().join("test.db").to_string_lossy().into_owned(),
        max_connections: 5,
    };
    let store = init_storage(&config).await.expect("Failed to init storage");

    TestApp {
        lifecycle: LifecycleService::new(store.clone()),
        assignment: AssignmentService::new(store.clone()),
        entities: EntityService::new(store.clone()),
        aggregates: AggregateService::new(store.clone()),
        repurchase: RepurchaseService::new(store.clone()),
        store,
        _dir: dir,
    }
}

pub fn customer() -> Actor {
    Actor::customer(Uuid::new_v4())
}

pub fn operator() -> Actor {
    Actor::operator(Uuid::new_v4())
}

pub fn new_purchase(label: &str) -> NewPurchase {
    NewPurchase {
        label: label.to_string(),
        excerpt: None,
        description: "weekly grocery run".to_string(),
        schedule: Utc::now() + Duration::days(2),
        merchant: "central market".to_string(),
        shipping_address: None,
    }
}

pub fn new_necessary(purchase: Uuid, label: &str) -> NewNecessary {
    NewNecessary {
        purchase,
        label: label.to_string(),
        excerpt: None,
        description: String::new(),
    }
}

pub fn new_goods(necessary: Uuid, label: &str) -> NewGoods {
    NewGoods {
        necessary,
        source: GoodsSource::Manual {
            label: label.to_string(),
        },
        excerpt: None,
        description: String::new(),
        quantity: 2,
        metric: Metric::Kilogram,
    }
}

pub fn new_address(label: &str, is_default: bool) -> NewShippingAddress {
    NewShippingAddress {
        label: label.to_string(),
        recipient: "Alex".to_string(),
        telephone: "+62-811-000-111".to_string(),
        address: "1 Market Street".to_string(),
        postal_code: "40111".to_string(),
        latitude: None,
        longitude: None,
        notes: String::new(),
        is_default,
    }
}

/// Create a purchase with one necessary and `goods_labels` goods, then
/// submit it.
pub async fn submitted_purchase(
    app: &TestApp,
    customer: &Actor,
    goods_labels: &[&str],
) -> (Purchase, Necessary, Vec<Goods>) {
    let purchase = app
        .lifecycle
        .create_purchase(customer, new_purchase("Groceries"))
        .await
        .expect("create purchase");
    let necessary = app
        .entities
        .create_necessary(customer, new_necessary(purchase.uuid, "Kitchen"))
        .await
        .expect("create necessary");

    let mut goods = Vec::new();
    for label in goods_labels {
        goods.push(
            app.entities
                .create_goods(customer, new_goods(necessary.uuid, label))
                .await
                .expect("create goods"),
        );
    }

    let purchase = app
        .lifecycle
        .transition_status(purchase.uuid, customer, PurchaseStatus::Submitted)
        .await
        .expect("submit purchase");

    (purchase, necessary, goods)
}

/// Drive a submitted purchase through assignment to Done: the operator picks
/// up every goods item, marks it done, and walks the status chain.
pub async fn done_purchase(
    app: &TestApp,
    customer: &Actor,
    operator: &Actor,
    goods_labels: &[&str],
) -> (Purchase, Necessary, Vec<Goods>) {
    let (purchase, necessary, goods) = submitted_purchase(app, customer, goods_labels).await;

    app.assignment
        .assign_operator(purchase.uuid, Some(operator), operator)
        .await
        .expect("assign operator");

    for item in &goods {
        let assigned = app
            .assignment
            .assign_goods(item.uuid, operator)
            .await
            .expect("assign goods");
        app.assignment
            .mark_goods_outcome(assigned.uuid, operator, None, Some(true))
            .await
            .expect("mark goods done");
    }

    app.lifecycle
        .transition_status(purchase.uuid, operator, PurchaseStatus::Processed)
        .await
        .expect("mark processed");
    let purchase = app
        .lifecycle
        .transition_status(purchase.uuid, operator, PurchaseStatus::Done)
        .await
        .expect("mark done");

    (purchase, necessary, goods)
}
