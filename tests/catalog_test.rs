mod common;

use common::TestApp;
use supplydesk_api::{
    entities::supply::{SupplyCategory, SupplyUnit},
    errors::ServiceError,
    services::catalog::{SupplyInput, SupplyListQuery},
};

fn input(name: &str, unit: SupplyUnit, boxes_count: i32, items_per_box: i32) -> SupplyInput {
    SupplyInput {
        name: name.to_string(),
        size_spec: String::new(),
        description: String::new(),
        category: SupplyCategory::PaperSupplies,
        unit,
        boxes_count,
        items_per_box,
    }
}

#[tokio::test]
async fn create_derives_quantity_from_unit_type() {
    let app = TestApp::new().await;

    let ream = app
        .services
        .catalog
        .create_supply(&app.staff, input("Bond paper", SupplyUnit::Ream, 3, 500))
        .await
        .expect("create ream supply");
    assert_eq!(ream.quantity, 3);
    assert_eq!(ream.quantity, ream.boxes_count);
    assert_eq!(ream.available_units(), 3);

    let pens = app
        .services
        .catalog
        .create_supply(&app.staff, input("Ballpoint pen", SupplyUnit::Pc, 2, 12))
        .await
        .expect("create pc supply");
    assert_eq!(pens.quantity, 24);
    assert_eq!(pens.available_units(), 24);
}

#[tokio::test]
async fn duplicate_name_and_size_is_a_conflict() {
    let app = TestApp::new().await;
    app.services
        .catalog
        .create_supply(&app.staff, input("Stapler", SupplyUnit::Pc, 1, 5))
        .await
        .expect("first create");

    let err = app
        .services
        .catalog
        .create_supply(&app.staff, input("Stapler", SupplyUnit::Pc, 1, 5))
        .await
        .expect_err("duplicate should fail");
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn catalog_mutations_require_staff() {
    let app = TestApp::new().await;
    let err = app
        .services
        .catalog
        .create_supply(&app.requester, input("Folder", SupplyUnit::Pc, 1, 10))
        .await
        .expect_err("non-staff create should fail");
    assert!(matches!(err, ServiceError::Forbidden(_)));
}

#[tokio::test]
async fn update_rederives_quantity() {
    let app = TestApp::new().await;
    let supply = app
        .services
        .catalog
        .create_supply(&app.staff, input("Notebook", SupplyUnit::Pc, 2, 10))
        .await
        .expect("create");
    assert_eq!(supply.quantity, 20);

    let updated = app
        .services
        .catalog
        .update_supply(&app.staff, supply.id, input("Notebook", SupplyUnit::Pc, 5, 10))
        .await
        .expect("update");
    assert_eq!(updated.quantity, 50);
}

#[tokio::test]
async fn delete_removes_the_supply() {
    let app = TestApp::new().await;
    let supply = app.seed_supply("Binder clip", SupplyUnit::Pc, 1, 12).await;

    app.services
        .catalog
        .delete_supply(&app.staff, supply.id)
        .await
        .expect("delete");
    let err = app
        .services
        .catalog
        .get_supply(supply.id)
        .await
        .expect_err("deleted supply should be gone");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn listing_supports_search_and_category_filter() {
    let app = TestApp::new().await;
    app.services
        .catalog
        .create_supply(&app.staff, input("Bond paper A4", SupplyUnit::Ream, 4, 0))
        .await
        .expect("create paper");
    let mut marker_input = input("Whiteboard marker", SupplyUnit::Pc, 2, 10);
    marker_input.category = SupplyCategory::WritingSupplies;
    app.services
        .catalog
        .create_supply(&app.staff, marker_input)
        .await
        .expect("create marker");

    let found = app
        .services
        .catalog
        .list_supplies(&SupplyListQuery {
            q: Some("marker".into()),
            ..Default::default()
        })
        .await
        .expect("search");
    assert_eq!(found.total, 1);
    assert_eq!(found.supplies[0].name, "Whiteboard marker");

    let by_category = app
        .services
        .catalog
        .list_supplies(&SupplyListQuery {
            category: Some(SupplyCategory::PaperSupplies),
            ..Default::default()
        })
        .await
        .expect("filter");
    assert_eq!(by_category.total, 1);
    assert_eq!(by_category.supplies[0].name, "Bond paper A4");
}

#[tokio::test]
async fn listing_reports_the_effective_paging() {
    let app = TestApp::new().await;
    app.seed_supply("Binder clip", SupplyUnit::Pc, 1, 12).await;

    let page = app
        .services
        .catalog
        .list_supplies(&SupplyListQuery::default())
        .await
        .expect("defaults");
    assert_eq!(page.page, 1);
    assert_eq!(page.per_page, 50);

    let page = app
        .services
        .catalog
        .list_supplies(&SupplyListQuery {
            page: Some(0),
            per_page: Some(1_000),
            ..Default::default()
        })
        .await
        .expect("clamped");
    assert_eq!(page.page, 1);
    assert_eq!(page.per_page, 200);
}
