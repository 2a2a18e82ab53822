//! Integration tests for the cart-consistency core: the per-(user, product)
//! uniqueness invariant, the product-delete cascade, and the stock-flag
//! fan-out with its deliberate snapshot staleness.
//!
//! Run with: `cargo test -p bazaar-integration-tests -- --ignored`
//! (requires a running server, database, and admin account; see crate docs)

use std::str::FromStr;

use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use bazaar_integration_tests::{TestContext, admin_context};

/// Create a product through the admin multipart endpoint.
async fn create_product(admin: &TestContext, name: &str, price: &str, in_stock: bool) -> Value {
    let image = reqwest::multipart::Part::bytes(b"\x89PNG not really".to_vec())
        .file_name("integration.png");
    let form = reqwest::multipart::Form::new()
        .text("name", name.to_owned())
        .text("desc", "integration test product")
        .text("price", price.to_owned())
        .text("inStock", in_stock.to_string())
        .part("image", image);

    let resp = admin
        .client
        .post(admin.url("/product"))
        .multipart(form)
        .send()
        .await
        .expect("product create request failed");
    assert_eq!(resp.status(), StatusCode::OK, "product create failed");

    TestContext::body(resp).await["product"].clone()
}

/// Add a product to the context's cart.
async fn add_to_cart(ctx: &TestContext, product_key: &str, quantity: i32) -> reqwest::Response {
    ctx.client
        .post(ctx.url("/carts"))
        .json(&json!({ "productId": product_key, "quantity": quantity }))
        .send()
        .await
        .expect("add-to-cart request failed")
}

/// Fetch the context's cart line for a product, if any.
async fn cart_line_for(ctx: &TestContext, product_key: &str) -> Option<Value> {
    let resp = ctx
        .client
        .get(ctx.url("/carts"))
        .send()
        .await
        .expect("carts request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    TestContext::body(resp).await["cart"]
        .as_array()
        .expect("cart array")
        .iter()
        .find(|line| line["productId"] == product_key)
        .cloned()
}

fn price_of(line: &Value) -> Decimal {
    Decimal::from_str(line["price"].as_str().expect("price string")).expect("decimal price")
}

#[tokio::test]
#[ignore = "Requires a running server, PostgreSQL, and an admin account"]
async fn test_duplicate_add_is_rejected() {
    let admin = admin_context().await;
    let product = create_product(&admin, "Duplicate Mug", "25", true).await;
    let key = product["productId"].as_str().expect("product key");

    let ctx = TestContext::new();
    ctx.signed_in_user("dupe-add").await;

    let resp = add_to_cart(&ctx, key, 1).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = add_to_cart(&ctx, key, 1).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = TestContext::body(resp).await;
    assert_eq!(body["success"], false);

    // Still exactly one line for this product.
    assert!(cart_line_for(&ctx, key).await.is_some());
}

#[tokio::test]
#[ignore = "Requires a running server, PostgreSQL, and an admin account"]
async fn test_product_delete_cascades_across_users() {
    let admin = admin_context().await;
    let product = create_product(&admin, "Doomed Mug", "10", true).await;
    let key = product["productId"].as_str().expect("product key");
    let id = product["id"].as_i64().expect("product id");

    let alice = TestContext::new();
    alice.signed_in_user("cascade-alice").await;
    let bob = TestContext::new();
    bob.signed_in_user("cascade-bob").await;

    assert_eq!(add_to_cart(&alice, key, 1).await.status(), StatusCode::OK);
    assert_eq!(add_to_cart(&bob, key, 2).await.status(), StatusCode::OK);

    let resp = admin
        .client
        .delete(admin.url(&format!("/product/{id}")))
        .send()
        .await
        .expect("product delete request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    // Every referencing line is gone, for both users.
    assert!(cart_line_for(&alice, key).await.is_none());
    assert!(cart_line_for(&bob, key).await.is_none());
}

#[tokio::test]
#[ignore = "Requires a running server, PostgreSQL, and an admin account"]
async fn test_bulk_update_counts_and_spares_snapshots() {
    let admin = admin_context().await;
    let product = create_product(&admin, "Bulk Mug", "42", true).await;
    let key = product["productId"].as_str().expect("product key");

    let alice = TestContext::new();
    alice.signed_in_user("bulk-alice").await;
    let bob = TestContext::new();
    bob.signed_in_user("bulk-bob").await;

    assert_eq!(add_to_cart(&alice, key, 3).await.status(), StatusCode::OK);
    assert_eq!(add_to_cart(&bob, key, 5).await.status(), StatusCode::OK);

    let resp = admin
        .client
        .put(admin.url(&format!("/carts/product/{key}")))
        .json(&json!({ "inStock": false, "quantity": 1 }))
        .send()
        .await
        .expect("bulk update request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = TestContext::body(resp).await;
    assert_eq!(body["modifiedCount"], 2);

    for ctx in [&alice, &bob] {
        let line = cart_line_for(ctx, key).await.expect("line survives");
        assert_eq!(line["inStock"], false);
        assert_eq!(line["quantity"], 1);
        // Snapshot fields are untouched by the fan-out.
        assert_eq!(line["name"], "Bulk Mug");
        assert_eq!(price_of(&line), Decimal::from(42));
        assert!(line["image"].is_string());
    }
}

#[tokio::test]
#[ignore = "Requires a running server, PostgreSQL, and an admin account"]
async fn test_product_edit_propagates_stock_but_not_price() {
    let admin = admin_context().await;
    let product = create_product(&admin, "Mug", "100", true).await;
    let key = product["productId"].as_str().expect("product key");
    let id = product["id"].as_i64().expect("product id");

    let ctx = TestContext::new();
    ctx.signed_in_user("staleness").await;
    assert_eq!(add_to_cart(&ctx, key, 1).await.status(), StatusCode::OK);

    // Admin edits the product: out of stock, and a new price.
    let form = reqwest::multipart::Form::new()
        .text("inStock", "false")
        .text("price", "250");
    let resp = admin
        .client
        .put(admin.url(&format!("/product/{id}")))
        .multipart(form)
        .send()
        .await
        .expect("product update request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    // The stock flag fanned out; the denormalized price did not.
    let line = cart_line_for(&ctx, key).await.expect("line survives");
    assert_eq!(line["inStock"], false);
    assert_eq!(price_of(&line), Decimal::from(100));

    // The product itself carries the new price.
    let resp = ctx
        .client
        .get(ctx.url(&format!("/single-product/{id}")))
        .send()
        .await
        .expect("single-product request failed");
    let body = TestContext::body(resp).await;
    assert_eq!(price_of(&body["product"]), Decimal::from(250));
}

#[tokio::test]
#[ignore = "Requires a running server, PostgreSQL, and an admin account"]
async fn test_cart_mutation_requires_ownership() {
    let admin = admin_context().await;
    let product = create_product(&admin, "Guarded Mug", "15", true).await;
    let key = product["productId"].as_str().expect("product key");

    let owner = TestContext::new();
    owner.signed_in_user("owner").await;
    assert_eq!(add_to_cart(&owner, key, 1).await.status(), StatusCode::OK);
    let line = cart_line_for(&owner, key).await.expect("line exists");
    let line_id = line["id"].as_i64().expect("line id");

    // A different user may neither mutate nor delete the line.
    let intruder = TestContext::new();
    intruder.signed_in_user("intruder").await;

    let resp = intruder
        .client
        .put(intruder.url(&format!("/carts/{line_id}")))
        .json(&json!({ "quantity": 99 }))
        .send()
        .await
        .expect("cart update request failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = intruder
        .client
        .delete(intruder.url(&format!("/carts/{line_id}")))
        .send()
        .await
        .expect("cart delete request failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // The owner still can.
    let resp = owner
        .client
        .put(owner.url(&format!("/carts/{line_id}")))
        .json(&json!({ "quantity": 2 }))
        .send()
        .await
        .expect("cart update request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = TestContext::body(resp).await;
    assert_eq!(body["cart"]["quantity"], 2);
}

#[tokio::test]
#[ignore = "Requires a running server, PostgreSQL, and an admin account"]
async fn test_clear_cart() {
    let admin = admin_context().await;
    let first = create_product(&admin, "Clear Mug A", "5", true).await;
    let second = create_product(&admin, "Clear Mug B", "6", true).await;

    let ctx = TestContext::new();
    ctx.signed_in_user("clear").await;
    for product in [&first, &second] {
        let key = product["productId"].as_str().expect("product key");
        assert_eq!(add_to_cart(&ctx, key, 1).await.status(), StatusCode::OK);
    }

    let resp = ctx
        .client
        .delete(ctx.url("/carts"))
        .send()
        .await
        .expect("clear cart request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = TestContext::body(resp).await;
    assert_eq!(body["removedCount"], 2);

    let key = first["productId"].as_str().expect("product key");
    assert!(cart_line_for(&ctx, key).await.is_none());
}
