//! Shipping address and delivery integration tests.

mod common;

use chrono::{Duration, NaiveTime, Utc};
use common::*;
use marketrun::domain::{DeliverySchedule, PurchaseUpdate};
use marketrun::CoreError;

#[tokio::test]
async fn test_single_default_address() {
    let app = test_app().await;
    let alice = customer();

    let home = app
        .entities
        .create_shipping_address(&alice, new_address("Home", true))
        .await
        .expect("home");
    assert!(home.is_default);

    let office = app
        .entities
        .create_shipping_address(&alice, new_address("Office", true))
        .await
        .expect("office");
    assert!(office.is_default);

    let addresses = app
        .entities
        .list_shipping_addresses(&alice)
        .await
        .expect("list");
    assert_eq!(addresses.len(), 2);
    let defaults: Vec<_> = addresses.iter().filter(|a| a.is_default).collect();
    assert_eq!(defaults.len(), 1);
    assert_eq!(defaults[0].label, "Office");
}

#[tokio::test]
async fn test_default_flip_scoped_to_customer() {
    let app = test_app().await;
    let alice = customer();
    let bob = customer();

    app.entities
        .create_shipping_address(&alice, new_address("Alice home", true))
        .await
        .expect("alice");
    app.entities
        .create_shipping_address(&bob, new_address("Bob home", true))
        .await
        .expect("bob");

    let alices = app
        .entities
        .list_shipping_addresses(&alice)
        .await
        .expect("list");
    assert!(alices[0].is_default);
}

#[tokio::test]
async fn test_address_hidden_from_other_customers() {
    let app = test_app().await;
    let alice = customer();
    let address = app
        .entities
        .create_shipping_address(&alice, new_address("Home", false))
        .await
        .expect("address");

    let result = app
        .entities
        .delete_shipping_address(address.uuid, &customer())
        .await;
    assert!(matches!(result, Err(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn test_attach_address_on_update() {
    let app = test_app().await;
    let alice = customer();
    let purchase = app
        .lifecycle
        .create_purchase(&alice, new_purchase("Groceries"))
        .await
        .expect("create");
    let address = app
        .entities
        .create_shipping_address(&alice, new_address("Home", true))
        .await
        .expect("address");

    app.lifecycle
        .update_purchase(
            purchase.uuid,
            &alice,
            PurchaseUpdate {
                shipping_address: Some(address.uuid),
                ..Default::default()
            },
        )
        .await
        .expect("attach");

    let delivery = app
        .store
        .fetch_delivery(purchase.id)
        .await
        .expect("fetch")
        .expect("delivery");
    assert_eq!(delivery.shipping_address, Some(address.uuid));
}

#[tokio::test]
async fn test_cannot_attach_foreign_address() {
    let app = test_app().await;
    let alice = customer();
    let bob = customer();
    let purchase = app
        .lifecycle
        .create_purchase(&alice, new_purchase("Groceries"))
        .await
        .expect("create");
    let address = app
        .entities
        .create_shipping_address(&bob, new_address("Bob home", true))
        .await
        .expect("address");

    let result = app
        .lifecycle
        .update_purchase(
            purchase.uuid,
            &alice,
            PurchaseUpdate {
                shipping_address: Some(address.uuid),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn test_stale_schedule_cleared_on_read() {
    let app = test_app().await;
    let alice = customer();
    let purchase = app
        .lifecycle
        .create_purchase(&alice, new_purchase("Groceries"))
        .await
        .expect("create");
    let address = app
        .entities
        .create_shipping_address(&alice, new_address("Home", true))
        .await
        .expect("address");

    let stale = DeliverySchedule {
        date: (Utc::now() - Duration::days(3)).date_naive(),
        time_start: NaiveTime::from_hms_opt(9, 0, 0).expect("time"),
        time_end: NaiveTime::from_hms_opt(11, 0, 0).expect("time"),
    };
    app.lifecycle
        .update_purchase(
            purchase.uuid,
            &alice,
            PurchaseUpdate {
                shipping_address: Some(address.uuid),
                delivery_schedule: Some(Some(stale)),
                ..Default::default()
            },
        )
        .await
        .expect("set schedule");

    // The read notices the past date and clears all three fields; the
    // address survives.
    app.lifecycle
        .get_purchase(purchase.uuid, &alice)
        .await
        .expect("get");

    let delivery = app
        .store
        .fetch_delivery(purchase.id)
        .await
        .expect("fetch")
        .expect("delivery");
    assert_eq!(delivery.schedule, None);
    assert_eq!(delivery.shipping_address, Some(address.uuid));
}

#[tokio::test]
async fn test_future_schedule_survives_read() {
    let app = test_app().await;
    let alice = customer();
    let purchase = app
        .lifecycle
        .create_purchase(&alice, new_purchase("Groceries"))
        .await
        .expect("create");

    let upcoming = DeliverySchedule {
        date: (Utc::now() + Duration::days(3)).date_naive(),
        time_start: NaiveTime::from_hms_opt(9, 0, 0).expect("time"),
        time_end: NaiveTime::from_hms_opt(11, 0, 0).expect("time"),
    };
    app.lifecycle
        .update_purchase(
            purchase.uuid,
            &alice,
            PurchaseUpdate {
                delivery_schedule: Some(Some(upcoming)),
                ..Default::default()
            },
        )
        .await
        .expect("set schedule");

    app.lifecycle
        .get_purchase(purchase.uuid, &alice)
        .await
        .expect("get");

    let delivery = app
        .store
        .fetch_delivery(purchase.id)
        .await
        .expect("fetch")
        .expect("delivery");
    assert_eq!(delivery.schedule, Some(upcoming));
}
