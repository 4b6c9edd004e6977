use sqlx::{Postgres, Transaction};

use crate::cart::models::{CartItem, CartItemDetail};
use crate::db::DbPool;

/// Repository for cart rows
#[derive(Clone)]
pub struct CartRepository {
    pool: DbPool,
}

impl CartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a cart row, merging quantities when the (user, product, size)
    /// row already exists.
    pub async fn upsert(
        &self,
        user_id: i32,
        product_id: i32,
        size: &str,
        quantity: i32,
    ) -> Result<CartItem, sqlx::Error> {
        sqlx::query_as::<_, CartItem>(
            r#"
            INSERT INTO cart_items (user_id, product_id, size, quantity)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, product_id, size)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity,
                          updated_at = NOW()
            RETURNING id, user_id, product_id, size, quantity, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(size)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await
    }

    /// The row an add would merge into, if any
    pub async fn find_line(
        &self,
        user_id: i32,
        product_id: i32,
        size: &str,
    ) -> Result<Option<CartItem>, sqlx::Error> {
        sqlx::query_as::<_, CartItem>(
            r#"
            SELECT id, user_id, product_id, size, quantity, created_at, updated_at
            FROM cart_items
            WHERE user_id = $1 AND product_id = $2 AND size = $3
            "#,
        )
        .bind(user_id)
        .bind(product_id)
        .bind(size)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_by_id(
        &self,
        item_id: i32,
        user_id: i32,
    ) -> Result<Option<CartItem>, sqlx::Error> {
        sqlx::query_as::<_, CartItem>(
            r#"
            SELECT id, user_id, product_id, size, quantity, created_at, updated_at
            FROM cart_items
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(item_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn set_quantity(
        &self,
        item_id: i32,
        user_id: i32,
        quantity: i32,
    ) -> Result<Option<CartItem>, sqlx::Error> {
        sqlx::query_as::<_, CartItem>(
            r#"
            UPDATE cart_items
            SET quantity = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, product_id, size, quantity, created_at, updated_at
            "#,
        )
        .bind(item_id)
        .bind(user_id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete(&self, item_id: i32, user_id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
            .bind(item_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Cart rows joined with live product data, active products only
    pub async fn find_details(&self, user_id: i32) -> Result<Vec<CartItemDetail>, sqlx::Error> {
        sqlx::query_as::<_, CartItemDetail>(
            r#"
            SELECT ci.id,
                   ci.product_id,
                   p.title,
                   ci.size,
                   ci.quantity,
                   COALESCE(p.discounted_price, p.regular_price) AS unit_price,
                   p.image_url,
                   p.stock
            FROM cart_items ci
            JOIN products p ON p.id = ci.product_id
            WHERE ci.user_id = $1 AND p.is_active = TRUE
            ORDER BY ci.created_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count_items(&self, user_id: i32) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COALESCE(SUM(quantity), 0) FROM cart_items WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }

    pub async fn clear(&self, user_id: i32) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Clear the cart inside the order-commit transaction
    pub async fn clear_in_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: i32,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }
}
