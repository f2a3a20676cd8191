//! Aggregate computation integration tests.

mod common;

use common::*;
use marketrun::CoreError;

#[tokio::test]
async fn test_necessary_counts() {
    let app = test_app().await;
    let alice = customer();
    let ops = operator();
    let (purchase, necessary, goods) =
        submitted_purchase(&app, &alice, &["Rice", "Beans", "Salt"]).await;
    app.assignment
        .assign_operator(purchase.uuid, Some(&ops), &ops)
        .await
        .expect("assign");

    let rice = app
        .assignment
        .assign_goods(goods[0].uuid, &ops)
        .await
        .expect("assign rice");
    app.assignment
        .mark_goods_outcome(rice.uuid, &ops, None, Some(true))
        .await
        .expect("rice done");

    let beans = app
        .assignment
        .assign_goods(goods[1].uuid, &ops)
        .await
        .expect("assign beans");
    app.assignment
        .mark_goods_outcome(beans.uuid, &ops, Some(true), None)
        .await
        .expect("beans skipped");

    let counts = app
        .aggregates
        .compute_necessary_aggregates(necessary.uuid, &alice)
        .await
        .expect("counts");
    assert_eq!(counts.total_count, 3);
    assert_eq!(counts.done_count, 1);
    assert_eq!(counts.skip_count, 1);
    assert_eq!(counts.accept_count, 0);
    assert_eq!(counts.left_count, 2);
}

#[tokio::test]
async fn test_necessary_counts_empty() {
    let app = test_app().await;
    let alice = customer();
    let (_, necessary, _) = submitted_purchase(&app, &alice, &[]).await;

    let counts = app
        .aggregates
        .compute_necessary_aggregates(necessary.uuid, &alice)
        .await
        .expect("counts");
    assert_eq!(counts.total_count, 0);
    assert_eq!(counts.left_count, 0);
}

#[tokio::test]
async fn test_bill_summary_sums_goods_bills() {
    let app = test_app().await;
    let alice = customer();
    let ops = operator();
    let (purchase, _, goods) =
        submitted_purchase(&app, &alice, &["Rice", "Beans", "Salt"]).await;
    app.assignment
        .assign_operator(purchase.uuid, Some(&ops), &ops)
        .await
        .expect("assign");

    // Two priced items (quantity is 2 in the fixture), one left unpriced.
    app.entities
        .price_goods(goods[0].uuid, &ops, 1500)
        .await
        .expect("price rice");
    app.entities
        .price_goods(goods[1].uuid, &ops, 800)
        .await
        .expect("price beans");

    let aggregates = app
        .aggregates
        .compute_purchase_aggregates(purchase.uuid, &alice)
        .await
        .expect("aggregates");
    assert_eq!(aggregates.bill_summary, 2 * 1500 + 2 * 800);
}

#[tokio::test]
async fn test_purchase_aggregates_idempotent() {
    let app = test_app().await;
    let alice = customer();
    let ops = operator();
    let (purchase, _, goods) = submitted_purchase(&app, &alice, &["Rice"]).await;
    app.assignment
        .assign_operator(purchase.uuid, Some(&ops), &ops)
        .await
        .expect("assign");
    app.entities
        .price_goods(goods[0].uuid, &ops, 1000)
        .await
        .expect("price");

    let first = app
        .aggregates
        .compute_purchase_aggregates(purchase.uuid, &alice)
        .await
        .expect("first");
    let second = app
        .aggregates
        .compute_purchase_aggregates(purchase.uuid, &alice)
        .await
        .expect("second");
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_presence_flags() {
    let app = test_app().await;
    let alice = customer();
    let ops = operator();

    let address = app
        .entities
        .create_shipping_address(&alice, new_address("Home", true))
        .await
        .expect("address");
    let mut fields = new_purchase("Groceries");
    fields.shipping_address = Some(address.uuid);
    let purchase = app
        .lifecycle
        .create_purchase(&alice, fields)
        .await
        .expect("create");

    let aggregates = app
        .aggregates
        .compute_purchase_aggregates(purchase.uuid, &alice)
        .await
        .expect("aggregates");
    assert!(!aggregates.has_operator);
    assert!(aggregates.has_delivery);
    assert!(!aggregates.has_schedule);

    app.lifecycle
        .transition_status(purchase.uuid, &alice, marketrun::domain::PurchaseStatus::Submitted)
        .await
        .expect("submit");
    app.assignment
        .assign_operator(purchase.uuid, Some(&ops), &ops)
        .await
        .expect("assign");

    let aggregates = app
        .aggregates
        .compute_purchase_aggregates(purchase.uuid, &alice)
        .await
        .expect("aggregates");
    assert!(aggregates.has_operator);
}

#[tokio::test]
async fn test_has_operator_set_once_reviewed() {
    let app = test_app().await;
    let alice = customer();
    let ops = operator();
    let (purchase, _, _) = submitted_purchase(&app, &alice, &[]).await;

    // Review creates the assignment row without binding an operator; the
    // flag reports the row, not the operator slot.
    app.assignment
        .assign_operator(purchase.uuid, None, &ops)
        .await
        .expect("review");

    let aggregates = app
        .aggregates
        .compute_purchase_aggregates(purchase.uuid, &alice)
        .await
        .expect("aggregates");
    assert!(aggregates.has_operator);
}

#[tokio::test]
async fn test_aggregates_hidden_from_strangers() {
    let app = test_app().await;
    let alice = customer();
    let (purchase, necessary, _) = submitted_purchase(&app, &alice, &["Rice"]).await;

    let mallory = customer();
    assert!(matches!(
        app.aggregates
            .compute_purchase_aggregates(purchase.uuid, &mallory)
            .await,
        Err(CoreError::NotFound { .. })
    ));
    assert!(matches!(
        app.aggregates
            .compute_necessary_aggregates(necessary.uuid, &mallory)
            .await,
        Err(CoreError::NotFound { .. })
    ));
}
