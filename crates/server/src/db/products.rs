//! Product repository.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use bazaar_core::{ProductId, ProductKey, UserId};

use super::RepositoryError;
use crate::models::Product;

/// Raw row shape; validated into [`Product`] on the way out.
#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    product_key: String,
    name: String,
    description: String,
    price: Decimal,
    image: Option<String>,
    in_stock: bool,
    created_by: Option<i32>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Result<Product, RepositoryError> {
        let key = ProductKey::parse(&self.product_key).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid product key in database: {e}"))
        })?;

        Ok(Product {
            id: ProductId::new(self.id),
            key,
            name: self.name,
            description: self.description,
            price: self.price,
            image: self.image,
            in_stock: self.in_stock,
            created_by: self.created_by.map(UserId::new),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// A fully specified product record for insertion.
#[derive(Debug)]
pub struct NewProductRecord {
    pub key: ProductKey,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub in_stock: bool,
    pub created_by: Option<UserId>,
}

/// Partial update for a product. `None` fields are left untouched.
///
/// `image` only ever replaces a filename; the API never clears an image back
/// to NULL.
#[derive(Debug, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub in_stock: Option<bool>,
    pub image: Option<String>,
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the whole catalog, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, product_key, name, description, price, image, in_stock,
                   created_by, created_at, updated_at
            FROM products
            ORDER BY created_at ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Get a product by its row ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, product_key, name, description, price, image, in_stock,
                   created_by, created_at, updated_at
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Get a product by its public key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_key(&self, key: &ProductKey) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            SELECT id, product_key, name, description, price, image, in_stock,
                   created_by, created_at, updated_at
            FROM products
            WHERE product_key = $1
            ",
        )
        .bind(key)
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Insert a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the product key collides
    /// (vanishingly unlikely; the constraint is a backstop).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(&self, record: &NewProductRecord) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            INSERT INTO products (product_key, name, description, price, image, in_stock, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, product_key, name, description, price, image, in_stock,
                      created_by, created_at, updated_at
            ",
        )
        .bind(&record.key)
        .bind(&record.name)
        .bind(&record.description)
        .bind(record.price)
        .bind(record.image.as_deref())
        .bind(record.in_stock)
        .bind(record.created_by)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("product key already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_product()
    }

    /// Apply a partial update to a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            UPDATE products
            SET name        = COALESCE($2, name),
                description = COALESCE($3, description),
                price       = COALESCE($4, price),
                in_stock    = COALESCE($5, in_stock),
                image       = COALESCE($6, image),
                updated_at  = now()
            WHERE id = $1
            RETURNING id, product_key, name, description, price, image, in_stock,
                      created_by, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.price)
        .bind(changes.in_stock)
        .bind(changes.image.as_deref())
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.into_product()
    }

    /// Delete a product inside an open transaction, returning the removed
    /// record.
    ///
    /// Associated function rather than a method so the catalog service can
    /// run it in the same transaction as the cart-line cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete_in(
        conn: &mut PgConnection,
        id: ProductId,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            r"
            DELETE FROM products
            WHERE id = $1
            RETURNING id, product_key, name, description, price, image, in_stock,
                      created_by, created_at, updated_at
            ",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.into_product()
    }
}
