//! Purchase lifecycle integration tests: CRUD, the status graph, the change
//! log, and serialization of concurrent transitions.

mod common;

use common::*;
use marketrun::domain::{PurchaseStatus, PurchaseUpdate};
use marketrun::CoreError;

#[tokio::test]
async fn test_create_starts_draft() {
    let app = test_app().await;
    let alice = customer();

    let purchase = app
        .lifecycle
        .create_purchase(&alice, new_purchase("Groceries"))
        .await
        .expect("create purchase");

    assert_eq!(purchase.status, PurchaseStatus::Draft);
    assert_eq!(purchase.customer, alice.id);
    assert_eq!(purchase.label, "Groceries");
}

#[tokio::test]
async fn test_create_rejects_empty_label() {
    let app = test_app().await;
    let result = app
        .lifecycle
        .create_purchase(&customer(), new_purchase("   "))
        .await;
    assert!(matches!(result, Err(CoreError::Validation(_))));
}

#[tokio::test]
async fn test_get_purchase_hidden_from_strangers() {
    let app = test_app().await;
    let alice = customer();
    let purchase = app
        .lifecycle
        .create_purchase(&alice, new_purchase("Groceries"))
        .await
        .expect("create purchase");

    assert!(app.lifecycle.get_purchase(purchase.uuid, &alice).await.is_ok());

    let result = app.lifecycle.get_purchase(purchase.uuid, &customer()).await;
    assert!(matches!(result, Err(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn test_list_purchases_filters_by_status() {
    let app = test_app().await;
    let alice = customer();

    let first = app
        .lifecycle
        .create_purchase(&alice, new_purchase("First"))
        .await
        .expect("create");
    app.lifecycle
        .create_purchase(&alice, new_purchase("Second"))
        .await
        .expect("create");
    app.lifecycle
        .transition_status(first.uuid, &alice, PurchaseStatus::Submitted)
        .await
        .expect("submit");

    let drafts = app
        .lifecycle
        .list_purchases(&alice, &[PurchaseStatus::Draft])
        .await
        .expect("list");
    assert_eq!(drafts.len(), 1);
    assert_eq!(drafts[0].label, "Second");

    let all = app
        .lifecycle
        .list_purchases(&alice, &[PurchaseStatus::Draft, PurchaseStatus::Submitted])
        .await
        .expect("list");
    assert_eq!(all.len(), 2);

    // Another customer sees nothing.
    let other = app
        .lifecycle
        .list_purchases(&customer(), &[PurchaseStatus::Draft])
        .await
        .expect("list");
    assert!(other.is_empty());
}

#[tokio::test]
async fn test_update_only_while_draft() {
    let app = test_app().await;
    let alice = customer();
    let purchase = app
        .lifecycle
        .create_purchase(&alice, new_purchase("Groceries"))
        .await
        .expect("create");

    let updated = app
        .lifecycle
        .update_purchase(
            purchase.uuid,
            &alice,
            PurchaseUpdate {
                label: Some("Weekend groceries".to_string()),
                ..Default::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.label, "Weekend groceries");

    app.lifecycle
        .transition_status(purchase.uuid, &alice, PurchaseStatus::Submitted)
        .await
        .expect("submit");

    let result = app
        .lifecycle
        .update_purchase(
            purchase.uuid,
            &alice,
            PurchaseUpdate {
                label: Some("Too late".to_string()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(CoreError::Validation(_))));
}

#[tokio::test]
async fn test_delete_only_draft_or_rejected() {
    let app = test_app().await;
    let alice = customer();
    let ops = operator();

    let draft = app
        .lifecycle
        .create_purchase(&alice, new_purchase("Draft"))
        .await
        .expect("create");
    app.lifecycle
        .delete_purchase(draft.uuid, &alice)
        .await
        .expect("delete draft");

    let (submitted, _, _) = submitted_purchase(&app, &alice, &[]).await;
    let result = app.lifecycle.delete_purchase(submitted.uuid, &alice).await;
    assert!(matches!(result, Err(CoreError::Validation(_))));

    app.lifecycle
        .transition_status(submitted.uuid, &ops, PurchaseStatus::Rejected)
        .await
        .expect("reject");
    app.lifecycle
        .delete_purchase(submitted.uuid, &alice)
        .await
        .expect("delete rejected");

    let result = app.lifecycle.get_purchase(submitted.uuid, &alice).await;
    assert!(matches!(result, Err(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn test_submit_and_pull_back() {
    let app = test_app().await;
    let alice = customer();
    let purchase = app
        .lifecycle
        .create_purchase(&alice, new_purchase("Groceries"))
        .await
        .expect("create");

    let purchase = app
        .lifecycle
        .transition_status(purchase.uuid, &alice, PurchaseStatus::Submitted)
        .await
        .expect("submit");
    assert_eq!(purchase.status, PurchaseStatus::Submitted);

    let purchase = app
        .lifecycle
        .transition_status(purchase.uuid, &alice, PurchaseStatus::Draft)
        .await
        .expect("pull back");
    assert_eq!(purchase.status, PurchaseStatus::Draft);
}

#[tokio::test]
async fn test_accept_requires_done() {
    let app = test_app().await;
    let alice = customer();
    let (purchase, _, _) = submitted_purchase(&app, &alice, &["Rice"]).await;

    let err = app
        .lifecycle
        .transition_status(purchase.uuid, &alice, PurchaseStatus::Accept)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Purchase isn't finished yet.");
}

#[tokio::test]
async fn test_done_requires_processed() {
    let app = test_app().await;
    let alice = customer();
    let ops = operator();
    let (purchase, _, _) = submitted_purchase(&app, &alice, &[]).await;
    app.assignment
        .assign_operator(purchase.uuid, Some(&ops), &ops)
        .await
        .expect("assign");

    let err = app
        .lifecycle
        .transition_status(purchase.uuid, &ops, PurchaseStatus::Done)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Purchase isn't processed yet.");
}

#[tokio::test]
async fn test_assignment_driven_statuses_rejected_as_direct_writes() {
    let app = test_app().await;
    let alice = customer();
    let ops = operator();
    let (purchase, _, _) = submitted_purchase(&app, &alice, &[]).await;

    for target in [PurchaseStatus::Reviewed, PurchaseStatus::Assigned] {
        for actor in [&alice, &ops] {
            let result = app
                .lifecycle
                .transition_status(purchase.uuid, actor, target)
                .await;
            assert!(matches!(result, Err(CoreError::Validation(_))));
        }
    }
}

#[tokio::test]
async fn test_foreign_operator_cannot_transition() {
    let app = test_app().await;
    let alice = customer();
    let ops = operator();
    let (purchase, _, _) = submitted_purchase(&app, &alice, &[]).await;
    app.assignment
        .assign_operator(purchase.uuid, Some(&ops), &ops)
        .await
        .expect("assign");

    let intruder = operator();
    let result = app
        .lifecycle
        .transition_status(purchase.uuid, &intruder, PurchaseStatus::Processed)
        .await;
    assert!(matches!(result, Err(CoreError::NotFound { .. })));

    // The bound operator proceeds normally; the intruder stays locked out
    // at the next step too.
    app.lifecycle
        .transition_status(purchase.uuid, &ops, PurchaseStatus::Processed)
        .await
        .expect("processed");
    let result = app
        .lifecycle
        .transition_status(purchase.uuid, &intruder, PurchaseStatus::Done)
        .await;
    assert!(matches!(result, Err(CoreError::NotFound { .. })));

    let purchase = app
        .lifecycle
        .get_purchase(purchase.uuid, &alice)
        .await
        .expect("get");
    assert_eq!(purchase.status, PurchaseStatus::Processed);
}

#[tokio::test]
async fn test_happy_path_scenario() {
    let app = test_app().await;
    let alice = customer();
    let ops = operator();

    let (purchase, _, _) = done_purchase(&app, &alice, &ops, &["Rice", "Beans"]).await;
    assert_eq!(purchase.status, PurchaseStatus::Done);

    let purchase = app
        .lifecycle
        .transition_status(purchase.uuid, &alice, PurchaseStatus::Accept)
        .await
        .expect("accept");
    assert_eq!(purchase.status, PurchaseStatus::Accept);

    // Every logged transition is an edge of the legal graph, newest first:
    // done->accept, processed->done, assigned->processed, submitted->assigned,
    // draft->submitted.
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
            (PurchaseStatus::Done, PurchaseStatus::Accept),
            (PurchaseStatus::Processed, PurchaseStatus::Done),
            (PurchaseStatus::Assigned, PurchaseStatus::Processed),
            (PurchaseStatus::Submitted, PurchaseStatus::Assigned),
            (PurchaseStatus::Draft, PurchaseStatus::Submitted),
        ]
    );
}

#[tokio::test]
async fn test_reordered_steps_fail() {
    let app = test_app().await;
    let alice = customer();
    let ops = operator();
    let (purchase, _, _) = submitted_purchase(&app, &alice, &[]).await;
    app.assignment
        .assign_operator(purchase.uuid, Some(&ops), &ops)
        .await
        .expect("assign");

    // Accept straight from Assigned.
    assert!(app
        .lifecycle
        .transition_status(purchase.uuid, &alice, PurchaseStatus::Accept)
        .await
        .is_err());
    // Done before Processed.
    assert!(app
        .lifecycle
        .transition_status(purchase.uuid, &ops, PurchaseStatus::Done)
        .await
        .is_err());
    // Failed attempts leave the status and the log untouched.
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
    assert_eq!(changes.len(), 2);
}

#[tokio::test]
async fn test_concurrent_submits_serialize() {
    let app = test_app().await;
    let alice = customer();
    let purchase = app
        .lifecycle
        .create_purchase(&alice, new_purchase("Race"))
        .await
        .expect("create");

    let (a, b) = tokio::join!(
        app.lifecycle
            .transition_status(purchase.uuid, &alice, PurchaseStatus::Submitted),
        app.lifecycle
            .transition_status(purchase.uuid, &alice, PurchaseStatus::Submitted),
    );

    // Exactly one wins; the loser re-reads Submitted and fails its guard
    // (or surfaces lock contention).
    assert!(a.is_ok() != b.is_ok());
    let loser = if a.is_ok() { b } else { a };
    match loser.unwrap_err() {
        CoreError::Validation(_) | CoreError::Conflict(_) => {}
        other => panic!("unexpected error: {other}"),
    }

    let changes = app
        .lifecycle
        .list_status_changes(purchase.uuid, &alice)
        .await
        .expect("change log");
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].old_status, PurchaseStatus::Draft);
    assert_eq!(changes[0].new_status, PurchaseStatus::Submitted);
}
