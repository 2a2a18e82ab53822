//! Product domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use bazaar_core::{ProductId, ProductKey, UserId};

/// A catalog product (domain type).
#[derive(Debug, Clone)]
pub struct Product {
    /// Storage-assigned row ID.
    pub id: ProductId,
    /// Stable public identifier; cart lines reference this.
    pub key: ProductKey,
    /// Display name.
    pub name: String,
    /// Long description.
    pub description: String,
    /// Unit price.
    pub price: Decimal,
    /// Filename of the product image in the blob store.
    pub image: Option<String>,
    /// Whether the product is currently purchasable.
    pub in_stock: bool,
    /// Admin who created the product, if still present.
    pub created_by: Option<UserId>,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

/// The client-facing projection of a [`Product`].
///
/// Field names follow the SPA contract (`productId`, `desc`, `inStock`).
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub id: ProductId,
    #[serde(rename = "productId")]
    pub key: ProductKey,
    pub name: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub price: Decimal,
    pub image: Option<String>,
    #[serde(rename = "inStock")]
    pub in_stock: bool,
}

impl From<Product> for ProductView {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            key: product.key,
            name: product.name,
            description: product.description,
            price: product.price,
            image: product.image,
            in_stock: product.in_stock,
        }
    }
}
