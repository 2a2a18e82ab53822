//! Cart line domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use bazaar_core::{CartLineId, ProductKey, UserId};

/// One user's pending quantity of one product (domain type).
///
/// `name`, `description`, `image`, and `price` are a snapshot of the product
/// at the moment it was added; they are not refreshed when the product
/// changes. `in_stock` and `quantity` are the only fields mutated after
/// creation - by the owning user, or by the admin fan-out.
#[derive(Debug, Clone)]
pub struct CartLine {
    /// Storage-assigned row ID.
    pub id: CartLineId,
    /// Owning user.
    pub user_id: UserId,
    /// Public identifier of the product this line references.
    pub product_key: ProductKey,
    /// Product name at add time.
    pub name: String,
    /// Product description at add time.
    pub description: String,
    /// Product image filename at add time.
    pub image: Option<String>,
    /// Unit price at add time.
    pub price: Decimal,
    /// Quantity the user intends to purchase.
    pub quantity: i32,
    /// Stock flag, kept consistent with the product by the fan-out.
    pub in_stock: bool,
    /// When the line was added.
    pub created_at: DateTime<Utc>,
}

/// The client-facing projection of a [`CartLine`].
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub id: CartLineId,
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(rename = "productId")]
    pub product_key: ProductKey,
    pub name: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub image: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    #[serde(rename = "inStock")]
    pub in_stock: bool,
}

impl From<CartLine> for CartLineView {
    fn from(line: CartLine) -> Self {
        Self {
            id: line.id,
            user_id: line.user_id,
            product_key: line.product_key,
            name: line.name,
            description: line.description,
            image: line.image,
            price: line.price,
            quantity: line.quantity,
            in_stock: line.in_stock,
        }
    }
}
