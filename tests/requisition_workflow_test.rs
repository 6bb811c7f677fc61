mod common;

use common::TestApp;
use rust_decimal_macros::dec;
use supplydesk_api::{
    auth::Actor,
    entities::{requisition::RequisitionStatus, supply::SupplyUnit},
    errors::ServiceError,
    services::cart::CartLineInput,
    services::requisitions::{
        ArchiveOutcome, DecisionOutcome, RequisitionLineInput, SubmitRequisitionInput,
    },
};
use uuid::Uuid;

fn line(supply_id: i64, quantity: i32) -> RequisitionLineInput {
    RequisitionLineInput {
        supply_id,
        quantity,
        price_per_unit: None,
        needed_by: None,
    }
}

fn submission(items: Vec<RequisitionLineInput>) -> SubmitRequisitionInput {
    SubmitRequisitionInput {
        requester_name: "Alex Reyes".to_string(),
        organization_name: "EMP-1042".to_string(),
        department: "Records".to_string(),
        notes: String::new(),
        items,
    }
}

#[tokio::test]
async fn submission_creates_pending_requisition_and_clears_cart() {
    let app = TestApp::new().await;
    let pens = app.seed_supply("Ballpoint pen", SupplyUnit::Pc, 2, 12).await;

    app.services
        .cart
        .set_items(
            app.requester.id,
            vec![CartLineInput {
                supply_id: pens.id,
                quantity: 4,
            }],
        )
        .await
        .expect("stage cart");

    let mut input = submission(vec![line(pens.id, 4)]);
    input.items[0].price_per_unit = Some(dec!(8.50));
    let created = app
        .services
        .requisitions
        .submit(&app.requester, input)
        .await
        .expect("submit");

    assert_eq!(created.status, RequisitionStatus::Pending);
    assert_eq!(created.user_id, app.requester.id);
    assert!(created.decided_by.is_none());

    // Submission consumes the staged cart
    let cart = app
        .services
        .cart
        .get_items(app.requester.id)
        .await
        .expect("cart");
    assert!(cart.is_empty());

    // Submission alone never touches stock
    assert_eq!(app.reload_supply(pens.id).await.quantity, 24);

    let detail = app
        .services
        .requisitions
        .detail(&app.staff, created.id)
        .await
        .expect("detail");
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].quantity, 4);
    assert_eq!(detail.items[0].total_cost, Some(dec!(34.00)));
}

#[tokio::test]
async fn submission_with_shortage_persists_nothing() {
    let app = TestApp::new().await;
    let pens = app.seed_supply("Ballpoint pen", SupplyUnit::Pc, 1, 10).await;

    let err = app
        .services
        .requisitions
        .submit(&app.requester, submission(vec![line(pens.id, 50)]))
        .await
        .expect_err("shortage should fail");
    assert!(matches!(err, ServiceError::InsufficientStock(_)));

    let history = app
        .services
        .requisitions
        .history_for_user(&app.requester)
        .await
        .expect("history");
    assert!(history.requests.is_empty());
}

#[tokio::test]
async fn submission_validates_header_and_lines() {
    let app = TestApp::new().await;
    let pens = app.seed_supply("Ballpoint pen", SupplyUnit::Pc, 1, 10).await;

    let err = app
        .services
        .requisitions
        .submit(&app.requester, submission(vec![]))
        .await
        .expect_err("empty selection should fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let mut missing_name = submission(vec![line(pens.id, 1)]);
    missing_name.requester_name = String::new();
    let err = app
        .services
        .requisitions
        .submit(&app.requester, missing_name)
        .await
        .expect_err("empty name should fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    // Whitespace-only fields are as missing as empty ones.
    let mut blank_department = submission(vec![line(pens.id, 1)]);
    blank_department.department = "   ".to_string();
    let err = app
        .services
        .requisitions
        .submit(&app.requester, blank_department)
        .await
        .expect_err("blank department should fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let err = app
        .services
        .requisitions
        .submit(&app.requester, submission(vec![line(pens.id, 0)]))
        .await
        .expect_err("zero quantity should fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let mut negative_price = submission(vec![line(pens.id, 1)]);
    negative_price.items[0].price_per_unit = Some(dec!(-1.00));
    let err = app
        .services
        .requisitions
        .submit(&app.requester, negative_price)
        .await
        .expect_err("negative price should fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn approval_deducts_loose_unit_stock() {
    let app = TestApp::new().await;
    let pens = app.seed_supply("Ballpoint pen", SupplyUnit::Pc, 1, 10).await;
    assert_eq!(pens.quantity, 10);

    let created = app
        .services
        .requisitions
        .submit(&app.requester, submission(vec![line(pens.id, 4)]))
        .await
        .expect("submit");

    let outcome = app
        .services
        .requisitions
        .approve(&app.staff, created.id)
        .await
        .expect("approve");
    let approved = match outcome {
        DecisionOutcome::Applied(requisition) => requisition,
        other => panic!("expected applied decision, got {:?}", other),
    };

    assert_eq!(approved.status, RequisitionStatus::Approved);
    assert_eq!(approved.decided_by, Some(app.staff.id));
    assert!(approved.decision_at.is_some());
    assert_eq!(app.reload_supply(pens.id).await.quantity, 6);
}

#[tokio::test]
async fn approval_deducts_boxed_stock_for_reams() {
    let app = TestApp::new().await;
    let paper = app.seed_supply("Bond paper", SupplyUnit::Ream, 5, 0).await;
    assert_eq!(paper.quantity, 5);

    let created = app
        .services
        .requisitions
        .submit(&app.requester, submission(vec![line(paper.id, 2)]))
        .await
        .expect("submit");
    app.services
        .requisitions
        .approve(&app.staff, created.id)
        .await
        .expect("approve");

    let reloaded = app.reload_supply(paper.id).await;
    assert_eq!(reloaded.boxes_count, 3);
    assert_eq!(reloaded.quantity, 3);
    assert_eq!(reloaded.quantity, reloaded.boxes_count);
}

#[tokio::test]
async fn approval_is_all_or_nothing_across_items() {
    let app = TestApp::new().await;
    let folders = app.seed_supply("Folder", SupplyUnit::Pc, 1, 5).await;
    let tape = app.seed_supply("Packing tape", SupplyUnit::Pc, 1, 2).await;
    assert_eq!(folders.quantity, 5);
    assert_eq!(tape.quantity, 2);

    // Both lines fit at submission time...
    let created = app
        .services
        .requisitions
        .submit(
            &app.requester,
            submission(vec![line(folders.id, 5), line(tape.id, 2)]),
        )
        .await
        .expect("submit");

    // ...but tape runs down before the decision.
    let drain = app
        .services
        .requisitions
        .submit(&app.requester, submission(vec![line(tape.id, 1)]))
        .await
        .expect("submit drain");
    app.services
        .requisitions
        .approve(&app.staff, drain.id)
        .await
        .expect("approve drain");
    assert_eq!(app.reload_supply(tape.id).await.quantity, 1);

    let err = app
        .services
        .requisitions
        .approve(&app.staff, created.id)
        .await
        .expect_err("short line must abort the whole approval");
    assert!(matches!(err, ServiceError::InsufficientStock(_)));

    // Neither line was deducted and the requisition is still pending.
    assert_eq!(app.reload_supply(folders.id).await.quantity, 5);
    assert_eq!(app.reload_supply(tape.id).await.quantity, 1);
    let detail = app
        .services
        .requisitions
        .detail(&app.staff, created.id)
        .await
        .expect("detail");
    assert_eq!(detail.requisition.status, RequisitionStatus::Pending);
    assert!(detail.items.iter().any(|item| item.is_shortage));
}

#[tokio::test]
async fn rejection_never_mutates_stock() {
    let app = TestApp::new().await;
    let pens = app.seed_supply("Ballpoint pen", SupplyUnit::Pc, 1, 10).await;

    let created = app
        .services
        .requisitions
        .submit(&app.requester, submission(vec![line(pens.id, 4)]))
        .await
        .expect("submit");
    let outcome = app
        .services
        .requisitions
        .reject(&app.staff, created.id)
        .await
        .expect("reject");

    let rejected = match outcome {
        DecisionOutcome::Applied(requisition) => requisition,
        other => panic!("expected applied decision, got {:?}", other),
    };
    assert_eq!(rejected.status, RequisitionStatus::Rejected);
    assert_eq!(app.reload_supply(pens.id).await.quantity, 10);
}

#[tokio::test]
async fn decisions_on_decided_requisitions_are_no_ops() {
    let app = TestApp::new().await;
    let pens = app.seed_supply("Ballpoint pen", SupplyUnit::Pc, 1, 10).await;

    let created = app
        .services
        .requisitions
        .submit(&app.requester, submission(vec![line(pens.id, 4)]))
        .await
        .expect("submit");
    let first = match app
        .services
        .requisitions
        .approve(&app.staff, created.id)
        .await
        .expect("first approve")
    {
        DecisionOutcome::Applied(requisition) => requisition,
        other => panic!("expected applied decision, got {:?}", other),
    };

    // Re-approving must not deduct again or touch decision fields.
    let second = app
        .services
        .requisitions
        .approve(&app.staff, created.id)
        .await
        .expect("second approve");
    match second {
        DecisionOutcome::AlreadyProcessed(requisition) => {
            assert_eq!(requisition.status, RequisitionStatus::Approved);
            assert_eq!(requisition.decided_by, first.decided_by);
            assert_eq!(requisition.decision_at, first.decision_at);
        }
        other => panic!("expected already-processed outcome, got {:?}", other),
    }
    assert_eq!(app.reload_supply(pens.id).await.quantity, 6);

    // Rejecting an approved requisition is also a no-op.
    let rejected = app
        .services
        .requisitions
        .reject(&app.staff, created.id)
        .await
        .expect("reject after approve");
    assert!(matches!(rejected, DecisionOutcome::AlreadyProcessed(r) if r.status == RequisitionStatus::Approved));
}

#[tokio::test]
async fn archiving_is_blocked_while_pending_and_idempotent_after() {
    let app = TestApp::new().await;
    let pens = app.seed_supply("Ballpoint pen", SupplyUnit::Pc, 1, 10).await;

    let created = app
        .services
        .requisitions
        .submit(&app.requester, submission(vec![line(pens.id, 2)]))
        .await
        .expect("submit");

    let err = app
        .services
        .requisitions
        .archive(&app.staff, created.id)
        .await
        .expect_err("pending cannot be archived");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    app.services
        .requisitions
        .reject(&app.staff, created.id)
        .await
        .expect("reject");

    let first = app
        .services
        .requisitions
        .archive(&app.staff, created.id)
        .await
        .expect("archive");
    assert!(matches!(first, ArchiveOutcome::Archived(r) if r.is_archived));

    let second = app
        .services
        .requisitions
        .archive(&app.staff, created.id)
        .await
        .expect("re-archive");
    assert!(matches!(second, ArchiveOutcome::AlreadyArchived(_)));
}

#[tokio::test]
async fn decisions_require_staff() {
    let app = TestApp::new().await;
    let pens = app.seed_supply("Ballpoint pen", SupplyUnit::Pc, 1, 10).await;
    let created = app
        .services
        .requisitions
        .submit(&app.requester, submission(vec![line(pens.id, 1)]))
        .await
        .expect("submit");

    let err = app
        .services
        .requisitions
        .approve(&app.requester, created.id)
        .await
        .expect_err("non-staff approve");
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let err = app
        .services
        .requisitions
        .reject(&app.requester, created.id)
        .await
        .expect_err("non-staff reject");
    assert!(matches!(err, ServiceError::Forbidden(_)));
}

#[tokio::test]
async fn receipt_requires_approval_and_ownership() {
    let app = TestApp::new().await;
    let pens = app.seed_supply("Ballpoint pen", SupplyUnit::Pc, 1, 10).await;
    let created = app
        .services
        .requisitions
        .submit(&app.requester, submission(vec![line(pens.id, 2)]))
        .await
        .expect("submit");

    let err = app
        .services
        .requisitions
        .receipt(&app.requester, created.id)
        .await
        .expect_err("no receipt before approval");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    app.services
        .requisitions
        .approve(&app.staff, created.id)
        .await
        .expect("approve");

    let receipt = app
        .services
        .requisitions
        .receipt(&app.requester, created.id)
        .await
        .expect("owner receipt");
    assert_eq!(receipt.items.len(), 1);

    let stranger = Actor::requester(Uuid::new_v4());
    let err = app
        .services
        .requisitions
        .receipt(&stranger, created.id)
        .await
        .expect_err("strangers cannot read receipts");
    assert!(matches!(err, ServiceError::Forbidden(_)));

    // Staff can always read receipts.
    app.services
        .requisitions
        .receipt(&app.staff, created.id)
        .await
        .expect("staff receipt");
}

#[tokio::test]
async fn board_splits_by_status_and_scopes_non_staff_to_their_own() {
    let app = TestApp::new().await;
    let pens = app.seed_supply("Ballpoint pen", SupplyUnit::Pc, 10, 10).await;
    let other = Actor::requester(Uuid::new_v4());

    let mine = app
        .services
        .requisitions
        .submit(&app.requester, submission(vec![line(pens.id, 1)]))
        .await
        .expect("mine");
    let theirs = app
        .services
        .requisitions
        .submit(&other, submission(vec![line(pens.id, 1)]))
        .await
        .expect("theirs");
    app.services
        .requisitions
        .approve(&app.staff, theirs.id)
        .await
        .expect("approve theirs");

    let staff_board = app
        .services
        .requisitions
        .board(&app.staff)
        .await
        .expect("staff board");
    assert_eq!(staff_board.pending.len(), 1);
    assert_eq!(staff_board.approved.len(), 1);
    assert!(staff_board.rejected.is_empty());

    let my_board = app
        .services
        .requisitions
        .board(&app.requester)
        .await
        .expect("own board");
    assert_eq!(my_board.pending.len(), 1);
    assert_eq!(my_board.pending[0].requisition.id, mine.id);
    assert!(my_board.approved.is_empty());

    // Archived requisitions drop off the board but stay in history.
    app.services
        .requisitions
        .archive(&app.staff, theirs.id)
        .await
        .expect("archive");
    let staff_board = app
        .services
        .requisitions
        .board(&app.staff)
        .await
        .expect("staff board after archive");
    assert!(staff_board.approved.is_empty());

    let groups = app
        .services
        .requisitions
        .history_all(&app.staff)
        .await
        .expect("history");
    assert_eq!(groups.len(), 2);
    let their_group = groups
        .iter()
        .find(|g| g.user_id == other.id)
        .expect("their group");
    assert_eq!(their_group.counts.approved, 1);

    let my_history = app
        .services
        .requisitions
        .history_for_user(&app.requester)
        .await
        .expect("my history");
    assert_eq!(my_history.counts.pending, 1);
    assert_eq!(my_history.requests.len(), 1);
}
