use sqlx::{PgPool, Postgres, Transaction};

use crate::catalog::Product;

/// Repository for catalog reads and stock reservation
#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a product by ID
    pub async fn find_by_id(&self, id: i32) -> Result<Option<Product>, sqlx::Error> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, title, regular_price, discounted_price, sizes, stock,
                   image_url, is_active, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Decrement stock within the caller's transaction, only when enough
    /// stock remains. Returns false when the reservation failed.
    pub async fn reserve_stock(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product_id: i32,
        quantity: i32,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - $2, updated_at = NOW()
            WHERE id = $1 AND stock >= $2
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
