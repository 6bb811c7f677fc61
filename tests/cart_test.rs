mod common;

use common::TestApp;
use supplydesk_api::{
    entities::supply::SupplyUnit, errors::ServiceError, services::cart::CartLineInput,
};
use uuid::Uuid;

#[tokio::test]
async fn cart_replaces_previous_selection() {
    let app = TestApp::new().await;
    let pens = app.seed_supply("Ballpoint pen", SupplyUnit::Pc, 2, 12).await;
    let paper = app.seed_supply("Bond paper", SupplyUnit::Ream, 5, 0).await;
    let user_id = app.requester.id;

    app.services
        .cart
        .set_items(
            user_id,
            vec![CartLineInput {
                supply_id: pens.id,
                quantity: 3,
            }],
        )
        .await
        .expect("first selection");

    let lines = app
        .services
        .cart
        .set_items(
            user_id,
            vec![CartLineInput {
                supply_id: paper.id,
                quantity: 2,
            }],
        )
        .await
        .expect("replacement selection");

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].supply.id, paper.id);
    assert_eq!(lines[0].quantity, 2);
}

#[tokio::test]
async fn cart_rejects_invalid_lines_without_saving() {
    let app = TestApp::new().await;
    let pens = app.seed_supply("Ballpoint pen", SupplyUnit::Pc, 1, 10).await;
    let user_id = app.requester.id;

    // Over availability
    let err = app
        .services
        .cart
        .set_items(
            user_id,
            vec![CartLineInput {
                supply_id: pens.id,
                quantity: 999,
            }],
        )
        .await
        .expect_err("over availability should fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    // Unknown supply and non-positive quantity
    let err = app
        .services
        .cart
        .set_items(
            user_id,
            vec![
                CartLineInput {
                    supply_id: 424_242,
                    quantity: 1,
                },
                CartLineInput {
                    supply_id: pens.id,
                    quantity: 0,
                },
            ],
        )
        .await
        .expect_err("bad lines should fail");
    assert!(matches!(err, ServiceError::ValidationError(_)));

    let lines = app.services.cart.get_items(user_id).await.expect("get");
    assert!(lines.is_empty(), "failed selection must persist nothing");
}

#[tokio::test]
async fn carts_are_scoped_per_user() {
    let app = TestApp::new().await;
    let pens = app.seed_supply("Ballpoint pen", SupplyUnit::Pc, 2, 12).await;
    let other_user = Uuid::new_v4();

    app.services
        .cart
        .set_items(
            app.requester.id,
            vec![CartLineInput {
                supply_id: pens.id,
                quantity: 2,
            }],
        )
        .await
        .expect("set");

    let other_lines = app
        .services
        .cart
        .get_items(other_user)
        .await
        .expect("other user's cart");
    assert!(other_lines.is_empty());

    app.services
        .cart
        .clear(app.requester.id)
        .await
        .expect("clear");
    let lines = app
        .services
        .cart
        .get_items(app.requester.id)
        .await
        .expect("get after clear");
    assert!(lines.is_empty());
}
