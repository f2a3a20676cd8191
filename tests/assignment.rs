//! Assignment engine integration tests: operator binding side effects,
//! goods outcomes, and accept propagation.

mod common;

use common::*;
use marketrun::domain::PurchaseStatus;
use marketrun::CoreError;

#[tokio::test]
async fn test_assign_without_operator_reviews() {
    let app = test_app().await;
    let alice = customer();
    let ops = operator();
    let (purchase, _, _) = submitted_purchase(&app, &alice, &[]).await;

    let assignment = app
        .assignment
        .assign_operator(purchase.uuid, None, &ops)
        .await
        .expect("assign");
    assert_eq!(assignment.operator, None);

    let purchase = app
        .lifecycle
        .get_purchase(purchase.uuid, &alice)
        .await
        .expect("get");
    assert_eq!(purchase.status, PurchaseStatus::Reviewed);
}

#[tokio::test]
async fn test_assign_with_operator_assigns() {
    let app = test_app().await;
    let alice = customer();
    let ops = operator();
    let (purchase, _, _) = submitted_purchase(&app, &alice, &[]).await;

    let assignment = app
        .assignment
        .assign_operator(purchase.uuid, Some(&ops), &ops)
        .await
        .expect("assign");
    assert_eq!(assignment.operator, Some(ops.id));

    let purchase = app
        .lifecycle
        .get_purchase(purchase.uuid, &alice)
        .await
        .expect("get");
    assert_eq!(purchase.status, PurchaseStatus::Assigned);
}

#[tokio::test]
async fn test_assign_update_path_flips_reviewed_to_assigned() {
    let app = test_app().await;
    let alice = customer();
    let ops = operator();
    let (purchase, _, _) = submitted_purchase(&app, &alice, &[]).await;

    // Create path: review without an operator.
    app.assignment
        .assign_operator(purchase.uuid, None, &ops)
        .await
        .expect("review");

    // Update path: same row, now with an operator.
    let assignment = app
        .assignment
        .assign_operator(purchase.uuid, Some(&ops), &ops)
        .await
        .expect("assign");
    assert_eq!(assignment.operator, Some(ops.id));

    let purchase = app
        .lifecycle
        .get_purchase(purchase.uuid, &alice)
        .await
        .expect("get");
    assert_eq!(purchase.status, PurchaseStatus::Assigned);

    let changes = app
        .lifecycle
        .list_status_changes(purchase.uuid, &alice)
        .await
        .expect("change log");
    let edges: Vec<(PurchaseStatus, PurchaseStatus)> = changes
        .iter()
        .map(|c| (c.old_status, c.new_status))
        .collect();
    assert_eq!(
        edges,
        vec![
            (PurchaseStatus::Reviewed, PurchaseStatus::Assigned),
            (PurchaseStatus::Submitted, PurchaseStatus::Reviewed),
            (PurchaseStatus::Draft, PurchaseStatus::Submitted),
        ]
    );
}

#[tokio::test]
async fn test_assign_rejects_non_operator_target() {
    let app = test_app().await;
    let alice = customer();
    let ops = operator();
    let (purchase, _, _) = submitted_purchase(&app, &alice, &[]).await;

    let result = app
        .assignment
        .assign_operator(purchase.uuid, Some(&alice), &ops)
        .await;
    assert!(matches!(result, Err(CoreError::PermissionDenied(_))));
}

#[tokio::test]
async fn test_assign_rejects_draft_purchase() {
    let app = test_app().await;
    let alice = customer();
    let ops = operator();
    let purchase = app
        .lifecycle
        .create_purchase(&alice, new_purchase("Still drafting"))
        .await
        .expect("create");

    let result = app
        .assignment
        .assign_operator(purchase.uuid, Some(&ops), &ops)
        .await;
    assert!(matches!(result, Err(CoreError::Validation(_))));
}

#[tokio::test]
async fn test_mark_outcome_requires_owning_operator() {
    let app = test_app().await;
    let alice = customer();
    let ops = operator();
    let (purchase, _, goods) = submitted_purchase(&app, &alice, &["Rice"]).await;
    app.assignment
        .assign_operator(purchase.uuid, Some(&ops), &ops)
        .await
        .expect("assign operator");

    let assigned = app
        .assignment
        .assign_goods(goods[0].uuid, &ops)
        .await
        .expect("assign goods");

    let intruder = operator();
    let result = app
        .assignment
        .mark_goods_outcome(assigned.uuid, &intruder, Some(true), None)
        .await;
    assert!(matches!(result, Err(CoreError::NotFound { .. })));

    let assigned = app
        .assignment
        .mark_goods_outcome(assigned.uuid, &ops, Some(true), None)
        .await
        .expect("mark skip");
    assert!(assigned.is_skip);
    assert!(!assigned.is_done);
}

#[tokio::test]
async fn test_accept_goods_requires_done_purchase() {
    let app = test_app().await;
    let alice = customer();
    let ops = operator();
    let (purchase, _, goods) = submitted_purchase(&app, &alice, &["Rice"]).await;
    app.assignment
        .assign_operator(purchase.uuid, Some(&ops), &ops)
        .await
        .expect("assign");
    let assigned = app
        .assignment
        .assign_goods(goods[0].uuid, &ops)
        .await
        .expect("assign goods");

    let err = app
        .assignment
        .accept_goods(assigned.uuid, &alice)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Purchase isn't done yet.");

    // Flag unchanged after the failed attempt.
    let rows = app
        .store
        .fetch_goods_assigned(assigned.uuid)
        .await
        .expect("fetch")
        .expect("row");
    assert!(!rows.is_accept);
}

#[tokio::test]
async fn test_accept_goods_after_done() {
    let app = test_app().await;
    let alice = customer();
    let ops = operator();
    let (purchase, _, _) = done_purchase(&app, &alice, &ops, &["Rice"]).await;

    let assignments = app
        .store
        .fetch_goods_assigned_for_purchase(purchase.id)
        .await
        .expect("fetch");
    let assigned = app
        .assignment
        .accept_goods(assignments[0].uuid, &alice)
        .await
        .expect("accept goods");
    assert!(assigned.is_accept);
}

#[tokio::test]
async fn test_bulk_accept_propagation() {
    let app = test_app().await;
    let alice = customer();
    let ops = operator();
    let (purchase, _, _) =
        done_purchase(&app, &alice, &ops, &["Rice", "Beans", "Salt"]).await;

    let before = app
        .store
        .fetch_goods_assigned_for_purchase(purchase.id)
        .await
        .expect("fetch");
    assert_eq!(before.len(), 3);
    assert!(before.iter().all(|a| !a.is_accept));

    app.lifecycle
        .transition_status(purchase.uuid, &alice, PurchaseStatus::Accept)
        .await
        .expect("accept");

    let after = app
        .store
        .fetch_goods_assigned_for_purchase(purchase.id)
        .await
        .expect("fetch");
    assert!(after.iter().all(|a| a.is_accept));
}
