//! Product route handlers - catalog reads and admin mutations.
//!
//! Create and update take multipart bodies (`name`, `desc`, `price`,
//! `inStock` text fields plus an `image` file field). Reads are public;
//! mutations are admin-only and run through the catalog service so the
//! cart fan-out and delete cascade always happen.

use std::str::FromStr;

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use rust_decimal::Decimal;
use serde::Serialize;

use bazaar_core::ProductId;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::ProductView;
use crate::services::catalog::{CatalogService, ImageUpload, NewProduct, ProductEdit};
use crate::state::AppState;

/// Envelope for a single product.
#[derive(Debug, Serialize)]
pub struct ProductEnvelope {
    pub success: bool,
    pub product: ProductView,
}

/// Envelope for the catalog listing. The entity key stays singular
/// (`product`), matching the SPA contract.
#[derive(Debug, Serialize)]
pub struct ProductListEnvelope {
    pub success: bool,
    pub product: Vec<ProductView>,
}

/// Envelope for product updates.
#[derive(Debug, Serialize)]
pub struct ProductUpdateEnvelope {
    pub success: bool,
    pub product: ProductView,
    pub message: String,
}

/// Text fields accepted by the multipart form.
#[derive(Debug, Default)]
struct ProductForm {
    name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
    in_stock: Option<bool>,
}

/// Drain a multipart body into form fields plus an optional image upload.
async fn parse_form(mut multipart: Multipart) -> Result<(ProductForm, Option<ImageUpload>)> {
    let mut form = ProductForm::default();
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let Some(name) = field.name().map(ToOwned::to_owned) else {
            continue;
        };

        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or("upload").to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("invalid image upload: {e}")))?;
                image = Some(ImageUpload { filename, bytes });
            }
            "name" => form.name = Some(read_text(field, "name").await?),
            "desc" => form.description = Some(read_text(field, "desc").await?),
            "price" => {
                let raw = read_text(field, "price").await?;
                let price = Decimal::from_str(raw.trim()).map_err(|_| {
                    AppError::Validation("price must be a decimal number".to_owned())
                })?;
                form.price = Some(price);
            }
            "inStock" => {
                let raw = read_text(field, "inStock").await?;
                form.in_stock = Some(match raw.trim() {
                    "true" => true,
                    "false" => false,
                    _ => {
                        return Err(AppError::Validation(
                            "inStock must be true or false".to_owned(),
                        ));
                    }
                });
            }
            // Unknown fields are ignored, matching lenient form handling.
            _ => {}
        }
    }

    Ok((form, image))
}

async fn read_text(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("invalid {name} field: {e}")))
}

/// `GET /product` - list the catalog. Public.
pub async fn list(State(state): State<AppState>) -> Result<Json<ProductListEnvelope>> {
    let products = ProductRepository::new(state.pool()).list().await?;

    Ok(Json(ProductListEnvelope {
        success: true,
        product: products.into_iter().map(ProductView::from).collect(),
    }))
}

/// `GET /single-product/{id}` - fetch one product. Public.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductEnvelope>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;

    Ok(Json(ProductEnvelope {
        success: true,
        product: product.into(),
    }))
}

/// `POST /product` - create a product. Admin; multipart with required image.
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ProductEnvelope>> {
    let (form, image) = parse_form(multipart).await?;

    let name = form
        .name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::Validation("name is required".to_owned()))?;
    let price = form
        .price
        .ok_or_else(|| AppError::Validation("price is required".to_owned()))?;
    let image = image.ok_or_else(|| AppError::Validation("image is required".to_owned()))?;

    let input = NewProduct {
        name,
        description: form.description.unwrap_or_default(),
        price,
        in_stock: form.in_stock.unwrap_or(true),
        created_by: Some(admin.id),
    };

    let catalog = CatalogService::new(state.pool(), state.images());
    let product = catalog.create_product(input, image).await?;

    tracing::info!(product_id = %product.id, product_key = %product.key, "product created");

    Ok(Json(ProductEnvelope {
        success: true,
        product: product.into(),
    }))
}

/// `PUT /product/{id}` - update a product. Admin; multipart, all fields
/// optional.
///
/// The catalog service fans the resulting stock flag out to every cart line
/// referencing the product; denormalized snapshot fields stay as added.
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    multipart: Multipart,
) -> Result<Json<ProductUpdateEnvelope>> {
    let (form, image) = parse_form(multipart).await?;

    let edit = ProductEdit {
        name: form.name,
        description: form.description,
        price: form.price,
        in_stock: form.in_stock,
    };

    let catalog = CatalogService::new(state.pool(), state.images());
    let (product, reconciled) = catalog.update_product(id, edit, image).await?;

    Ok(Json(ProductUpdateEnvelope {
        success: true,
        product: product.into(),
        message: format!("product updated, {reconciled} cart items reconciled"),
    }))
}

/// `DELETE /product/{id}` - delete a product. Admin.
///
/// Cascades into every cart line referencing the product (one transaction),
/// then removes the image blob.
pub async fn remove(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductEnvelope>> {
    let catalog = CatalogService::new(state.pool(), state.images());
    let (product, cascaded) = catalog.delete_product(id).await?;

    tracing::info!(product_id = %product.id, cascaded, "product deleted");

    Ok(Json(ProductEnvelope {
        success: true,
        product: product.into(),
    }))
}
