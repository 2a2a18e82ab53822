//! Catalog service - product mutations and cart consistency.
//!
//! Product writes are never just a row update: creating stores a blob first,
//! editing fans the stock flag out to every cart referencing the product, and
//! deleting cascades into cart lines atomically with the product row. This
//! module owns that orchestration; the repositories stay single-table.

use axum::body::Bytes;
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use bazaar_core::{ProductId, ProductKey, UserId};

use crate::db::{
    CartLineRepository, ProductRepository, RepositoryError,
    products::{NewProductRecord, ProductChanges},
};
use crate::models::Product;
use crate::storage::{ImageStore, StorageError};

/// Errors that can occur during catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Product not found.
    #[error("product not found")]
    NotFound,

    /// Repository/database error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Blob store error.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// An uploaded image: the client's filename (for its extension) plus bytes.
#[derive(Debug)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Bytes,
}

/// Metadata for a new product.
#[derive(Debug)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub in_stock: bool,
    pub created_by: Option<UserId>,
}

/// Partial edit of an existing product. `None` fields are left untouched.
#[derive(Debug, Default)]
pub struct ProductEdit {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub in_stock: Option<bool>,
}

/// Catalog service.
pub struct CatalogService<'a> {
    pool: &'a PgPool,
    images: &'a ImageStore,
}

impl<'a> CatalogService<'a> {
    /// Create a new catalog service.
    #[must_use]
    pub const fn new(pool: &'a PgPool, images: &'a ImageStore) -> Self {
        Self { pool, images }
    }

    fn products(&self) -> ProductRepository<'_> {
        ProductRepository::new(self.pool)
    }

    fn cart_lines(&self) -> CartLineRepository<'_> {
        CartLineRepository::new(self.pool)
    }

    /// Create a product from uploaded metadata and image.
    ///
    /// The blob is written first; if the insert then fails, the blob is
    /// removed again so a failed create leaves nothing behind. The public
    /// key is generated here, once, and never regenerated.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the blob cannot be written and
    /// `CatalogError::Repository` if the insert fails.
    pub async fn create_product(
        &self,
        input: NewProduct,
        image: ImageUpload,
    ) -> Result<Product, CatalogError> {
        let filename = self.images.save(&image.filename, &image.bytes).await?;

        let record = NewProductRecord {
            key: ProductKey::generate(),
            name: input.name,
            description: input.description,
            price: input.price,
            image: Some(filename.clone()),
            in_stock: input.in_stock,
            created_by: input.created_by,
        };

        match self.products().insert(&record).await {
            Ok(product) => Ok(product),
            Err(e) => {
                if let Err(cleanup) = self.images.remove(&filename).await {
                    tracing::warn!(%filename, error = %cleanup, "orphaned image after failed product insert");
                }
                Err(e.into())
            }
        }
    }

    /// Edit a product, optionally replacing its image, and fan the stock
    /// flag out to every cart line referencing it.
    ///
    /// Ordering: a replacement blob is written before the metadata update,
    /// and the prior blob is deleted only after the update has committed - a
    /// failure can orphan the new blob but never lose the old one. The
    /// fan-out touches `in_stock` only; denormalized cart snapshots keep
    /// their add-time `price`/`name`/`description`/`image`.
    ///
    /// Returns the updated product and the number of cart lines reconciled.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product doesn't exist.
    pub async fn update_product(
        &self,
        id: ProductId,
        edit: ProductEdit,
        new_image: Option<ImageUpload>,
    ) -> Result<(Product, u64), CatalogError> {
        let existing = self.products().get(id).await?.ok_or(CatalogError::NotFound)?;

        let new_filename = match new_image {
            Some(image) => Some(self.images.save(&image.filename, &image.bytes).await?),
            None => None,
        };

        let changes = ProductChanges {
            name: edit.name,
            description: edit.description,
            price: edit.price,
            in_stock: edit.in_stock,
            image: new_filename.clone(),
        };

        let updated = match self.products().update(id, &changes).await {
            Ok(product) => product,
            Err(e) => {
                if let Some(filename) = new_filename {
                    if let Err(cleanup) = self.images.remove(&filename).await {
                        tracing::warn!(%filename, error = %cleanup, "orphaned image after failed product update");
                    }
                }
                return Err(match e {
                    RepositoryError::NotFound => CatalogError::NotFound,
                    other => other.into(),
                });
            }
        };

        let reconciled = self
            .cart_lines()
            .update_by_product(&updated.key, Some(updated.in_stock), None)
            .await?;

        if reconciled > 0 {
            tracing::debug!(product_key = %updated.key, reconciled, "fanned stock flag out to carts");
        }

        if new_filename.is_some()
            && let Some(old) = existing.image
            && updated.image.as_deref() != Some(old.as_str())
        {
            if let Err(e) = self.images.remove(&old).await {
                tracing::warn!(filename = %old, error = %e, "failed to remove replaced product image");
            }
        }

        Ok((updated, reconciled))
    }

    /// Delete a product and cascade into every cart line referencing it.
    ///
    /// The cart lines and the product row go in one transaction, so a
    /// concurrent request observes either both or neither. The blob is
    /// removed after commit; an already-absent blob is a no-op and any other
    /// storage failure is logged, not surfaced - the catalog delete has
    /// already committed.
    ///
    /// Returns the removed product and the number of cart lines cascaded.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the product doesn't exist.
    pub async fn delete_product(&self, id: ProductId) -> Result<(Product, u64), CatalogError> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let product = match ProductRepository::delete_in(&mut *tx, id).await {
            Ok(product) => product,
            Err(RepositoryError::NotFound) => return Err(CatalogError::NotFound),
            Err(e) => return Err(e.into()),
        };
        let cascaded = CartLineRepository::delete_by_product_in(&mut *tx, &product.key).await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        if cascaded > 0 {
            tracing::info!(product_key = %product.key, cascaded, "cascaded product delete into carts");
        }

        if let Some(image) = &product.image {
            if let Err(e) = self.images.remove(image).await {
                tracing::warn!(filename = %image, error = %e, "failed to remove image of deleted product");
            }
        }

        Ok((product, cascaded))
    }
}
