//! Cart line repository - the cart aggregator.
//!
//! The `(user_id, product_key)` unique constraint is the uniqueness
//! invariant: adding a product a user already has is a single conditional
//! INSERT that the database rejects, not a check-then-act read.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use bazaar_core::{CartLineId, ProductKey, UserId};

use super::RepositoryError;
use crate::models::CartLine;

/// Raw row shape; validated into [`CartLine`] on the way out.
#[derive(sqlx::FromRow)]
struct CartLineRow {
    id: i32,
    user_id: i32,
    product_key: String,
    name: String,
    description: String,
    image: Option<String>,
    price: Decimal,
    quantity: i32,
    in_stock: bool,
    created_at: DateTime<Utc>,
}

impl CartLineRow {
    fn into_cart_line(self) -> Result<CartLine, RepositoryError> {
        let product_key = ProductKey::parse(&self.product_key).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid product key in database: {e}"))
        })?;

        Ok(CartLine {
            id: CartLineId::new(self.id),
            user_id: UserId::new(self.user_id),
            product_key,
            name: self.name,
            description: self.description,
            image: self.image,
            price: self.price,
            quantity: self.quantity,
            in_stock: self.in_stock,
            created_at: self.created_at,
        })
    }
}

/// A snapshot of a product, ready to be inserted as a cart line.
///
/// Built server-side from the current product record; clients supply only
/// the product key and a quantity.
#[derive(Debug)]
pub struct NewCartLine {
    pub user_id: UserId,
    pub product_key: ProductKey,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub price: Decimal,
    pub quantity: i32,
    pub in_stock: bool,
}

/// Repository for cart line database operations.
pub struct CartLineRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartLineRepository<'a> {
    /// Create a new cart line repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every cart line in the store (admin view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT id, user_id, product_key, name, description, image, price,
                   quantity, in_stock, created_at
            FROM cart_lines
            ORDER BY created_at ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(CartLineRow::into_cart_line).collect()
    }

    /// List one user's cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT id, user_id, product_key, name, description, image, price,
                   quantity, in_stock, created_at
            FROM cart_lines
            WHERE user_id = $1
            ORDER BY created_at ASC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(CartLineRow::into_cart_line).collect()
    }

    /// Get a single cart line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CartLineId) -> Result<Option<CartLine>, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT id, user_id, product_key, name, description, image, price,
                   quantity, in_stock, created_at
            FROM cart_lines
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(CartLineRow::into_cart_line).transpose()
    }

    /// Insert a cart line.
    ///
    /// A single atomic INSERT: the `(user_id, product_key)` unique constraint
    /// rejects a duplicate add even under concurrent requests.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the user already has this
    /// product in their cart.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(&self, line: &NewCartLine) -> Result<CartLine, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(
            r"
            INSERT INTO cart_lines (user_id, product_key, name, description, image,
                                    price, quantity, in_stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, product_key, name, description, image, price,
                      quantity, in_stock, created_at
            ",
        )
        .bind(line.user_id)
        .bind(&line.product_key)
        .bind(&line.name)
        .bind(&line.description)
        .bind(line.image.as_deref())
        .bind(line.price)
        .bind(line.quantity)
        .bind(line.in_stock)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("product already in cart".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_cart_line()
    }

    /// Apply a partial update to one cart line.
    ///
    /// Only `quantity` and `in_stock` are mutable after creation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_one(
        &self,
        id: CartLineId,
        quantity: Option<i32>,
        in_stock: Option<bool>,
    ) -> Result<CartLine, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(
            r"
            UPDATE cart_lines
            SET quantity = COALESCE($2, quantity),
                in_stock = COALESCE($3, in_stock)
            WHERE id = $1
            RETURNING id, user_id, product_key, name, description, image, price,
                      quantity, in_stock, created_at
            ",
        )
        .bind(id)
        .bind(quantity)
        .bind(in_stock)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.into_cart_line()
    }

    /// Bulk update every cart line referencing a product, across all users.
    ///
    /// This is the fan-out a product edit triggers. Cache policy: only
    /// `in_stock` and `quantity` are reconciled here - the denormalized
    /// `name`/`description`/`image`/`price` snapshot deliberately stays as it
    /// was at add time.
    ///
    /// Returns the number of lines modified.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_by_product(
        &self,
        key: &ProductKey,
        in_stock: Option<bool>,
        quantity: Option<i32>,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE cart_lines
            SET in_stock = COALESCE($2, in_stock),
                quantity = COALESCE($3, quantity)
            WHERE product_key = $1
            ",
        )
        .bind(key)
        .bind(in_stock)
        .bind(quantity)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete one cart line, returning the removed record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete_one(&self, id: CartLineId) -> Result<CartLine, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(
            r"
            DELETE FROM cart_lines
            WHERE id = $1
            RETURNING id, user_id, product_key, name, description, image, price,
                      quantity, in_stock, created_at
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.into_cart_line()
    }

    /// Clear a user's cart. Returns the number of lines removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_by_user(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM cart_lines
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete every cart line referencing a product, inside an open
    /// transaction. Returns the number of lines removed.
    ///
    /// Associated function rather than a method so the catalog service can
    /// run the product-delete cascade atomically with the product row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_by_product_in(
        conn: &mut PgConnection,
        key: &ProductKey,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM cart_lines
            WHERE product_key = $1
            ",
        )
        .bind(key)
        .execute(conn)
        .await?;

        Ok(result.rows_affected())
    }
}
