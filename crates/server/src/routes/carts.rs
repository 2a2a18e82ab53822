//! Cart route handlers.
//!
//! The cart a request sees is always derived from its session - a
//! client-supplied user id is never trusted. Line mutations check ownership
//! (owner or admin); the bulk product update is the admin fan-out.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use bazaar_core::{CartLineId, ProductKey};

use crate::db::{CartLineRepository, ProductRepository, cart_lines::NewCartLine};
use crate::error::{AppError, Result};
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::CartLineView;
use crate::state::AppState;

/// Envelope for a single cart line.
#[derive(Debug, Serialize)]
pub struct CartEnvelope {
    pub success: bool,
    pub cart: CartLineView,
}

/// Envelope for a cart listing. The entity key stays singular (`cart`),
/// matching the SPA contract.
#[derive(Debug, Serialize)]
pub struct CartListEnvelope {
    pub success: bool,
    pub cart: Vec<CartLineView>,
}

/// Envelope for the bulk product fan-out.
#[derive(Debug, Serialize)]
pub struct BulkUpdateEnvelope {
    pub success: bool,
    #[serde(rename = "modifiedCount")]
    pub modified_count: u64,
    pub message: String,
}

/// Envelope for clearing a cart.
#[derive(Debug, Serialize)]
pub struct ClearCartEnvelope {
    pub success: bool,
    #[serde(rename = "removedCount")]
    pub removed_count: u64,
}

/// Add-to-cart request body. The snapshot is built server-side from the
/// current product; clients send only the key and a quantity.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    #[serde(rename = "productId")]
    pub product_key: Option<ProductKey>,
    pub quantity: Option<i32>,
}

/// Single-line update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateCartLineRequest {
    pub quantity: Option<i32>,
    #[serde(rename = "inStock")]
    pub in_stock: Option<bool>,
}

/// Bulk product update request body.
#[derive(Debug, Deserialize)]
pub struct UpdateByProductRequest {
    #[serde(rename = "inStock")]
    pub in_stock: Option<bool>,
    pub quantity: Option<i32>,
}

fn validate_quantity(quantity: Option<i32>) -> Result<()> {
    if let Some(quantity) = quantity
        && quantity < 1
    {
        return Err(AppError::Validation(
            "quantity must be at least 1".to_owned(),
        ));
    }
    Ok(())
}

/// `GET /carts` - list the session user's cart; admins see every cart.
pub async fn list(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<CartListEnvelope>> {
    let repo = CartLineRepository::new(state.pool());
    let lines = if session.role.is_admin() {
        repo.list_all().await?
    } else {
        repo.list_by_user(session.id).await?
    };

    Ok(Json(CartListEnvelope {
        success: true,
        cart: lines.into_iter().map(CartLineView::from).collect(),
    }))
}

/// `POST /carts` - add a product to the session user's cart.
///
/// Snapshots the product's current display fields into the line. At most
/// one line per (user, product): a duplicate add is rejected with a 409 by
/// the store's unique constraint, so concurrent adds cannot slip through.
pub async fn add(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<CartEnvelope>> {
    let key = body
        .product_key
        .ok_or_else(|| AppError::Validation("productId is required".to_owned()))?;
    let quantity = body.quantity.unwrap_or(1);
    validate_quantity(Some(quantity))?;

    let product = ProductRepository::new(state.pool())
        .get_by_key(&key)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;

    let line = CartLineRepository::new(state.pool())
        .insert(&NewCartLine {
            user_id: session.id,
            product_key: product.key,
            name: product.name,
            description: product.description,
            image: product.image,
            price: product.price,
            quantity,
            in_stock: product.in_stock,
        })
        .await?;

    Ok(Json(CartEnvelope {
        success: true,
        cart: line.into(),
    }))
}

/// `PUT /carts/{id}` - update quantity and/or stock flag on one line.
///
/// Owner or admin only; other fields of the snapshot are immutable.
pub async fn update(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<CartLineId>,
    Json(body): Json<UpdateCartLineRequest>,
) -> Result<Json<CartEnvelope>> {
    validate_quantity(body.quantity)?;

    let repo = CartLineRepository::new(state.pool());
    let line = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("cart item not found".to_owned()))?;

    if !session.can_act_for(line.user_id) {
        return Err(AppError::Forbidden("not your cart item".to_owned()));
    }

    let updated = repo.update_one(id, body.quantity, body.in_stock).await?;

    Ok(Json(CartEnvelope {
        success: true,
        cart: updated.into(),
    }))
}

/// `DELETE /carts/{id}` - remove one line. Owner or admin only.
pub async fn remove(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<CartLineId>,
) -> Result<Json<CartEnvelope>> {
    let repo = CartLineRepository::new(state.pool());
    let line = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("cart item not found".to_owned()))?;

    if !session.can_act_for(line.user_id) {
        return Err(AppError::Forbidden("not your cart item".to_owned()));
    }

    let removed = repo.delete_one(id).await?;

    Ok(Json(CartEnvelope {
        success: true,
        cart: removed.into(),
    }))
}

/// `DELETE /carts` - clear the session user's cart.
pub async fn clear(
    RequireAuth(session): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<ClearCartEnvelope>> {
    let removed_count = CartLineRepository::new(state.pool())
        .delete_by_user(session.id)
        .await?;

    Ok(Json(ClearCartEnvelope {
        success: true,
        removed_count,
    }))
}

/// `PUT /carts/product/{key}` - bulk update every line for a product.
///
/// The admin fan-out: applies `inStock` and/or `quantity` across all users'
/// lines referencing the product and reports how many were modified.
/// Snapshot fields (`name`/`price`/`desc`/`image`) are never touched.
pub async fn update_by_product(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(key): Path<ProductKey>,
    Json(body): Json<UpdateByProductRequest>,
) -> Result<Json<BulkUpdateEnvelope>> {
    if body.in_stock.is_none() && body.quantity.is_none() {
        return Err(AppError::Validation(
            "nothing to update: provide inStock and/or quantity".to_owned(),
        ));
    }
    validate_quantity(body.quantity)?;

    let modified_count = CartLineRepository::new(state.pool())
        .update_by_product(&key, body.in_stock, body.quantity)
        .await?;

    Ok(Json(BulkUpdateEnvelope {
        success: true,
        modified_count,
        message: format!("{modified_count} cart items updated"),
    }))
}
