use rust_decimal::Decimal;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use crate::db::DbPool;
use crate::orders::models::{Order, OrderItem, OrderStatus, PaymentMethod, PaymentStatus};
use crate::pricing::PriceBreakdown;

const ORDER_COLUMNS: &str = "id, user_id, subtotal, gst_amount, shipping_charge, coupon_code, \
     coupon_discount, total, payment_method, payment_status, order_status, tracking_id, \
     courier, delivery_address, created_at, updated_at";

/// Input for one order line, captured before the transaction opens
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i32,
    pub product_title: String,
    pub size: String,
    pub quantity: i32,
    pub price_snapshot: Decimal,
}

/// Repository for orders and order items
#[derive(Clone)]
pub struct OrderRepository {
    pool: DbPool,
}

impl OrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Insert the order row with its frozen breakdown, inside the commit
    /// transaction.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: i32,
        breakdown: &PriceBreakdown,
        payment_method: PaymentMethod,
        payment_status: PaymentStatus,
        order_status: OrderStatus,
        delivery_address: &serde_json::Value,
    ) -> Result<Order, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders (user_id, subtotal, gst_amount, shipping_charge,
                                coupon_code, coupon_discount, total,
                                payment_method, payment_status, order_status,
                                delivery_address)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(breakdown.subtotal)
        .bind(breakdown.gst_amount)
        .bind(breakdown.shipping_charge)
        .bind(&breakdown.coupon_code)
        .bind(breakdown.discount_amount)
        .bind(breakdown.total)
        .bind(payment_method)
        .bind(payment_status)
        .bind(order_status)
        .bind(delivery_address)
        .fetch_one(&mut **tx)
        .await
    }

    pub async fn insert_items(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order_id: Uuid,
        items: &[NewOrderItem],
    ) -> Result<(), sqlx::Error> {
        for item in items {
            let line_subtotal = item.price_snapshot * Decimal::from(item.quantity);
            sqlx::query(
                r#"
                INSERT INTO order_items (order_id, product_id, product_title, size,
                                         quantity, price_snapshot, subtotal)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(order_id)
            .bind(item.product_id)
            .bind(&item.product_title)
            .bind(&item.size)
            .bind(item.quantity)
            .bind(item.price_snapshot)
            .bind(line_subtotal)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    pub async fn find_by_id(&self, order_id: Uuid) -> Result<Option<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn find_by_user(&self, user_id: i32) -> Result<Vec<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_all(
        &self,
        status: Option<OrderStatus>,
        limit: i64,
    ) -> Result<Vec<Order>, sqlx::Error> {
        match status {
            Some(status) => {
                sqlx::query_as::<_, Order>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders WHERE order_status = $1 \
                     ORDER BY created_at DESC LIMIT $2"
                ))
                .bind(status)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, Order>(&format!(
                    "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC LIMIT $1"
                ))
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
    }

    pub async fn find_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>, sqlx::Error> {
        sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, product_title, size, quantity,
                   price_snapshot, subtotal
            FROM order_items
            WHERE order_id = $1
            ORDER BY id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn update_status(
        &self,
        order_id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders
            SET order_status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
    }

    /// Attach tracking details and move the order to Shipped
    pub async fn update_tracking(
        &self,
        order_id: Uuid,
        tracking_id: &str,
        courier: &str,
    ) -> Result<Option<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders
            SET tracking_id = $2, courier = $3, order_status = 'shipped',
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order_id)
        .bind(tracking_id)
        .bind(courier)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn update_payment_status(
        &self,
        order_id: Uuid,
        payment_status: PaymentStatus,
    ) -> Result<Option<Order>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders
            SET payment_status = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order_id)
        .bind(payment_status)
        .fetch_optional(&self.pool)
        .await
    }
}
