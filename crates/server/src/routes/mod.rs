//! HTTP route handlers.
//!
//! Every response is the JSON envelope `{success, <entity>, message?}`;
//! failures go through [`crate::error::AppError`] and come out as
//! `{success: false, message}` with the matching status code.
//!
//! # Route Structure
//!
//! ```text
//! # Users (credential CRUD)
//! GET    /user              - List users (admin)
//! POST   /user              - Register
//! GET    /user/{id}         - Get one user (self or admin)
//! PUT    /user/{id}         - Update profile/role (self or admin; role admin-only)
//! DELETE /user/{id}         - Delete user (self or admin)
//!
//! # Session
//! POST   /compare           - Login; sets the authToken cookie
//! GET    /remove-cookie     - Logout; clears the cookie
//! GET    /loginVerify       - Resolve the current session to a user
//! GET    /getuser/{token}   - Resolve a user by raw token value (legacy)
//!
//! # Catalog
//! GET    /product           - List products (public)
//! GET    /single-product/{id} - Get one product (public)
//! POST   /product           - Create product (admin, multipart)
//! PUT    /product/{id}      - Update product + stock fan-out (admin, multipart)
//! DELETE /product/{id}      - Delete product + cart cascade (admin)
//!
//! # Carts
//! GET    /carts             - List own cart (admins see all carts)
//! POST   /carts             - Add a product to the cart
//! PUT    /carts/{id}        - Update quantity/stock on one line (owner/admin)
//! DELETE /carts/{id}        - Remove one line (owner/admin)
//! DELETE /carts             - Clear own cart
//! PUT    /carts/product/{key} - Bulk update all lines for a product (admin)
//! ```

pub mod carts;
pub mod products;
pub mod session;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Credential CRUD
        .route("/user", get(users::list).post(users::register))
        .route(
            "/user/{id}",
            get(users::show).put(users::update).delete(users::remove),
        )
        // Session
        .route("/compare", post(session::login))
        .route("/remove-cookie", get(session::logout))
        .route("/loginVerify", get(session::verify))
        .route("/getuser/{token}", get(session::user_by_token))
        // Catalog
        .route("/product", get(products::list).post(products::create))
        .route("/single-product/{id}", get(products::show))
        .route(
            "/product/{id}",
            put(products::update).delete(products::remove),
        )
        // Carts
        .route(
            "/carts",
            get(carts::list).post(carts::add).delete(carts::clear),
        )
        .route("/carts/{id}", put(carts::update).delete(carts::remove))
        .route("/carts/product/{key}", put(carts::update_by_product))
}
