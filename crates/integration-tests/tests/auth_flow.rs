//! Integration tests for registration, login, and session resolution.
//!
//! Run with: `cargo test -p bazaar-integration-tests -- --ignored`
//! (requires a running server and database; see the crate docs)

use reqwest::StatusCode;

use bazaar_integration_tests::{TestContext, unique_email};

#[tokio::test]
#[ignore = "Requires a running server and PostgreSQL"]
async fn test_register_then_login() {
    let ctx = TestContext::new();
    let email = unique_email("login");

    let resp = ctx.register(&email, "secret1", "Login Tester").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = TestContext::body(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], email.as_str());
    assert_eq!(body["user"]["role"], "user");

    let resp = ctx.login(&email, "secret1").await;
    assert_eq!(resp.status(), StatusCode::OK);

    // The session cookie is now in the jar; the session resolves.
    let resp = ctx
        .client
        .get(ctx.url("/loginVerify"))
        .send()
        .await
        .expect("loginVerify request failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body = TestContext::body(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], email.as_str());
    assert!(body["token"].is_string());
}

#[tokio::test]
#[ignore = "Requires a running server and PostgreSQL"]
async fn test_wrong_password_rejected() {
    let ctx = TestContext::new();
    let email = unique_email("wrongpw");

    ctx.register(&email, "secret1", "Wrong PW").await;

    let resp = ctx.login(&email, "wrong").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = TestContext::body(resp).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore = "Requires a running server and PostgreSQL"]
async fn test_unknown_email_is_not_found() {
    let ctx = TestContext::new();

    let resp = ctx.login(&unique_email("ghost"), "whatever").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires a running server and PostgreSQL"]
async fn test_duplicate_registration_conflicts() {
    let ctx = TestContext::new();
    let email = unique_email("dupe");

    let resp = ctx.register(&email, "secret1", "First").await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ctx.register(&email, "other-password", "Second").await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = TestContext::body(resp).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
#[ignore = "Requires a running server and PostgreSQL"]
async fn test_missing_fields_rejected() {
    let ctx = TestContext::new();

    let resp = ctx
        .client
        .post(ctx.url("/user"))
        .json(&serde_json::json!({ "email": unique_email("nopw") }))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires a running server and PostgreSQL"]
async fn test_user_responses_never_carry_hashes() {
    let ctx = TestContext::new();
    ctx.signed_in_user("nohash").await;

    let resp = ctx
        .client
        .get(ctx.url("/loginVerify"))
        .send()
        .await
        .expect("loginVerify request failed");
    let body = TestContext::body(resp).await;

    let user = body["user"].as_object().expect("user object");
    assert!(!user.contains_key("passwordHash"));
    assert!(!user.contains_key("password_hash"));
    assert!(!user.contains_key("password"));
}

#[tokio::test]
#[ignore = "Requires a running server and PostgreSQL"]
async fn test_logout_clears_session() {
    let ctx = TestContext::new();
    ctx.signed_in_user("logout").await;

    let resp = ctx
        .client
        .get(ctx.url("/remove-cookie"))
        .send()
        .await
        .expect("logout request failed");
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ctx
        .client
        .get(ctx.url("/loginVerify"))
        .send()
        .await
        .expect("loginVerify request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires a running server and PostgreSQL"]
async fn test_unauthenticated_cart_rejected() {
    let ctx = TestContext::new();

    let resp = ctx
        .client
        .get(ctx.url("/carts"))
        .send()
        .await
        .expect("carts request failed");
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}
