// Database-backed tests for the commit path and cart semantics.
// These run against the database named by DATABASE_URL and are skipped when
// it is not set. Each test owns disjoint user ids and coupon codes so the
// suite can run in parallel against one database.

use super::*;
use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{Claims, Role};
use crate::cart::{AddToCartRequest, CartError};
use crate::coupons::{CouponError, CouponType};
use crate::orders::{
    DeliveryAddress, OrderError, OrderStatus, PaymentMethod, PaymentStatus, PlaceOrderRequest,
};

// ============================================================================
// Test Helpers
// ============================================================================

/// Connect to the test database and run migrations. Returns None (skipping
/// the test) when DATABASE_URL is not set.
async fn create_test_pool() -> Option<PgPool> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set; skipping database-backed test");
            return None;
        }
    };

    let pool = crate::db::create_pool(&database_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

/// Remove leftovers from earlier runs for this test's users and codes
async fn clean_test_data(pool: &PgPool, user_ids: &[i32], coupon_codes: &[&str]) {
    let codes: Vec<String> = coupon_codes.iter().map(|c| c.to_string()).collect();

    sqlx::query("DELETE FROM coupon_redemptions WHERE user_id = ANY($1)")
        .bind(user_ids)
        .execute(pool)
        .await
        .expect("Failed to clean redemptions");
    sqlx::query("DELETE FROM orders WHERE user_id = ANY($1)")
        .bind(user_ids)
        .execute(pool)
        .await
        .expect("Failed to clean orders");
    sqlx::query("DELETE FROM cart_items WHERE user_id = ANY($1)")
        .bind(user_ids)
        .execute(pool)
        .await
        .expect("Failed to clean cart items");
    sqlx::query("DELETE FROM coupons WHERE code = ANY($1)")
        .bind(&codes)
        .execute(pool)
        .await
        .expect("Failed to clean coupons");
}

async fn seed_product(pool: &PgPool, title: &str, price: Decimal, stock: i32) -> i32 {
    let (id,): (i32,) = sqlx::query_as(
        r#"
        INSERT INTO products (title, regular_price, sizes, stock, image_url)
        VALUES ($1, $2, '{"M"}', $3, '')
        RETURNING id
        "#,
    )
    .bind(title)
    .bind(price)
    .bind(stock)
    .fetch_one(pool)
    .await
    .expect("Failed to seed product");
    id
}

#[allow(clippy::too_many_arguments)]
async fn seed_coupon(
    pool: &PgPool,
    code: &str,
    coupon_type: CouponType,
    value: Decimal,
    usage_limit: Option<i32>,
    one_time_per_user: bool,
) -> Uuid {
    let (id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO coupons (code, coupon_type, discount_value, usage_limit, one_time_per_user)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id
        "#,
    )
    .bind(code)
    .bind(coupon_type)
    .bind(value)
    .bind(usage_limit)
    .bind(one_time_per_user)
    .fetch_one(pool)
    .await
    .expect("Failed to seed coupon");
    id
}

async fn seed_cart_line(pool: &PgPool, user_id: i32, product_id: i32, quantity: i32) {
    sqlx::query(
        r#"
        INSERT INTO cart_items (user_id, product_id, size, quantity)
        VALUES ($1, $2, 'M', $3)
        "#,
    )
    .bind(user_id)
    .bind(product_id)
    .bind(quantity)
    .execute(pool)
    .await
    .expect("Failed to seed cart line");
}

async fn coupon_used_count(pool: &PgPool, coupon_id: Uuid) -> i32 {
    let (count,): (i32,) = sqlx::query_as("SELECT used_count FROM coupons WHERE id = $1")
        .bind(coupon_id)
        .fetch_one(pool)
        .await
        .expect("Failed to read used_count");
    count
}

async fn count_orders(pool: &PgPool, user_ids: &[i32]) -> i64 {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM orders WHERE user_id = ANY($1)")
            .bind(user_ids)
            .fetch_one(pool)
            .await
            .expect("Failed to count orders");
    count
}

async fn count_redemptions(pool: &PgPool, coupon_id: Uuid) -> i64 {
    let (count,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM coupon_redemptions WHERE coupon_id = $1")
            .bind(coupon_id)
            .fetch_one(pool)
            .await
            .expect("Failed to count redemptions");
    count
}

async fn product_stock(pool: &PgPool, product_id: i32) -> i32 {
    let (stock,): (i32,) = sqlx::query_as("SELECT stock FROM products WHERE id = $1")
        .bind(product_id)
        .fetch_one(pool)
        .await
        .expect("Failed to read stock");
    stock
}

fn delivery_address() -> DeliveryAddress {
    DeliveryAddress {
        name: "Asha Rao".to_string(),
        phone: "9876543210".to_string(),
        address_line: "14 Marine Drive".to_string(),
        city: "Mumbai".to_string(),
        state: "Maharashtra".to_string(),
        pincode: "400001".to_string(),
    }
}

fn place_order_request(coupon_code: Option<&str>) -> PlaceOrderRequest {
    PlaceOrderRequest {
        payment_method: PaymentMethod::Cod,
        delivery_address: delivery_address(),
        coupon_code: coupon_code.map(|c| c.to_string()),
    }
}

fn issue_token(secret: &str, user_id: i32) -> String {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        email: format!("user{}@example.com", user_id),
        role: Role::User,
        exp: now + 900,
        iat: now,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("Failed to issue test token")
}

// ============================================================================
// Order commit guard
// ============================================================================

/// A committed order freezes the full breakdown, decrements stock, and
/// clears the cart atomically.
#[tokio::test]
async fn test_place_order_freezes_breakdown_and_clears_cart() {
    let Some(pool) = create_test_pool().await else {
        return;
    };
    let user_id = 9001;
    clean_test_data(&pool, &[user_id], &[]).await;

    let product_id = seed_product(&pool, "Linen Oversized Shirt", dec!(600), 10).await;
    seed_cart_line(&pool, user_id, product_id, 2).await;

    let state = AppState::new(pool.clone());
    let placed = state
        .order_service
        .place_order(user_id, place_order_request(None))
        .await
        .expect("Order should commit");

    // No tiers configured: subtotal 1200 is above the free threshold
    assert_eq!(placed.order.subtotal, dec!(1200));
    assert_eq!(placed.order.gst_amount, dec!(216.00));
    assert_eq!(placed.order.shipping_charge, dec!(0));
    assert_eq!(placed.order.coupon_discount, dec!(0));
    assert_eq!(placed.order.total, dec!(1416.00));
    assert_eq!(placed.order.order_status, OrderStatus::Confirmed);
    assert_eq!(placed.order.payment_status, PaymentStatus::Pending);

    assert_eq!(placed.items.len(), 1);
    assert_eq!(placed.items[0].price_snapshot, dec!(600));
    assert_eq!(placed.items[0].quantity, 2);
    assert_eq!(placed.items[0].subtotal, dec!(1200));

    assert_eq!(product_stock(&pool, product_id).await, 8);
    let remaining = state
        .cart_service
        .item_count(user_id)
        .await
        .expect("Cart count should succeed");
    assert_eq!(remaining, 0);
}

/// Concurrent commits against a coupon with one usage slot: exactly one
/// order wins; every loser fails without leaving an order, a redemption, or
/// a used_count increment behind.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_usage_limit_race_allows_single_redemption() {
    let Some(pool) = create_test_pool().await else {
        return;
    };
    let user_ids = [9101, 9102, 9103, 9104];
    clean_test_data(&pool, &user_ids, &["RACELIMIT"]).await;

    let product_id = seed_product(&pool, "Cotton Kurta", dec!(500), 100).await;
    let coupon_id = seed_coupon(
        &pool,
        "RACELIMIT",
        CouponType::Percentage,
        dec!(10),
        Some(1),
        false,
    )
    .await;
    for user_id in user_ids {
        seed_cart_line(&pool, user_id, product_id, 1).await;
    }

    let state = AppState::new(pool.clone());
    let mut handles = Vec::new();
    for user_id in user_ids {
        let order_service = state.order_service.clone();
        handles.push(tokio::spawn(async move {
            order_service
                .place_order(user_id, place_order_request(Some("RACELIMIT")))
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.expect("Task panicked") {
            Ok(placed) => {
                successes += 1;
                assert!(placed.order.coupon_discount > Decimal::ZERO);
            }
            Err(err) => match err {
                // Lost the slot inside the transaction, or saw the winner's
                // commit already at validation time
                OrderError::CouponRaceLost
                | OrderError::CouponRejected(CouponError::UsageLimitReached) => {}
                other => panic!("Unexpected failure: {:?}", other),
            },
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(coupon_used_count(&pool, coupon_id).await, 1);
    assert_eq!(count_redemptions(&pool, coupon_id).await, 1);
    assert_eq!(count_orders(&pool, &user_ids).await, 1);
}

/// A failed stock reservation aborts the whole commit: no order, no
/// redemption, no used_count change, cart untouched.
#[tokio::test]
async fn test_out_of_stock_rolls_back_whole_commit() {
    let Some(pool) = create_test_pool().await else {
        return;
    };
    let user_id = 9201;
    clean_test_data(&pool, &[user_id], &["ROLLBACK10"]).await;

    let product_id = seed_product(&pool, "Silk Scarf", dec!(800), 1).await;
    let coupon_id = seed_coupon(
        &pool,
        "ROLLBACK10",
        CouponType::Fixed,
        dec!(50),
        Some(10),
        false,
    )
    .await;
    // Seeded past available stock so the in-transaction reservation fails
    seed_cart_line(&pool, user_id, product_id, 3).await;

    let state = AppState::new(pool.clone());
    let result = state
        .order_service
        .place_order(user_id, place_order_request(Some("ROLLBACK10")))
        .await;

    match result {
        Err(OrderError::OutOfStock {
            product_id: failed_id,
        }) => assert_eq!(failed_id, product_id),
        other => panic!("Expected OutOfStock, got {:?}", other),
    }

    assert_eq!(count_orders(&pool, &[user_id]).await, 0);
    assert_eq!(coupon_used_count(&pool, coupon_id).await, 0);
    assert_eq!(count_redemptions(&pool, coupon_id).await, 0);
    assert_eq!(product_stock(&pool, product_id).await, 1);
    let cart = state
        .cart_service
        .item_count(user_id)
        .await
        .expect("Cart count should succeed");
    assert_eq!(cart, 3);
}

/// One-time-per-user coupon: the second order attempt by the same user is
/// rejected and consumes nothing.
#[tokio::test]
async fn test_one_time_coupon_rejected_on_second_order() {
    let Some(pool) = create_test_pool().await else {
        return;
    };
    let user_id = 9301;
    clean_test_data(&pool, &[user_id], &["ONCE10"]).await;

    let product_id = seed_product(&pool, "Denim Jacket", dec!(2000), 10).await;
    let coupon_id = seed_coupon(
        &pool,
        "ONCE10",
        CouponType::Percentage,
        dec!(10),
        None,
        true,
    )
    .await;
    seed_cart_line(&pool, user_id, product_id, 1).await;

    let state = AppState::new(pool.clone());
    let first = state
        .order_service
        .place_order(user_id, place_order_request(Some("ONCE10")))
        .await
        .expect("First redemption should commit");
    assert!(first.order.coupon_discount > Decimal::ZERO);
    assert_eq!(coupon_used_count(&pool, coupon_id).await, 1);

    seed_cart_line(&pool, user_id, product_id, 1).await;
    let second = state
        .order_service
        .place_order(user_id, place_order_request(Some("ONCE10")))
        .await;

    match second {
        Err(OrderError::CouponRejected(CouponError::AlreadyUsedByUser)) => {}
        other => panic!("Expected AlreadyUsedByUser, got {:?}", other),
    }
    assert_eq!(coupon_used_count(&pool, coupon_id).await, 1);
    assert_eq!(count_redemptions(&pool, coupon_id).await, 1);
    assert_eq!(count_orders(&pool, &[user_id]).await, 1);
}

// ============================================================================
// Cart semantics
// ============================================================================

/// Adding into an existing line is rejected outright when the merged
/// quantity would exceed stock; the existing line stays as it was.
#[tokio::test]
async fn test_cart_add_merging_beyond_stock_is_rejected() {
    let Some(pool) = create_test_pool().await else {
        return;
    };
    let user_id = 9401;
    clean_test_data(&pool, &[user_id], &[]).await;

    let product_id = seed_product(&pool, "Wool Beanie", dec!(350), 5).await;
    let state = AppState::new(pool.clone());

    let first = state
        .cart_service
        .add_item(
            user_id,
            AddToCartRequest {
                product_id,
                size: "M".to_string(),
                quantity: 4,
            },
        )
        .await
        .expect("First add within stock should succeed");
    assert_eq!(first.quantity, 4);

    let second = state
        .cart_service
        .add_item(
            user_id,
            AddToCartRequest {
                product_id,
                size: "M".to_string(),
                quantity: 3,
            },
        )
        .await;

    match second {
        Err(CartError::InsufficientStock { available }) => assert_eq!(available, 5),
        other => panic!("Expected InsufficientStock, got {:?}", other),
    }

    // The merge target was not touched by the rejected add
    let summary = state
        .cart_service
        .summary(user_id)
        .await
        .expect("Summary should succeed");
    assert_eq!(summary.items.len(), 1);
    assert_eq!(summary.items[0].quantity, 4);
}

// ============================================================================
// Checkout preview over HTTP
// ============================================================================

/// The preview endpoint returns the same breakdown the commit would freeze.
#[tokio::test]
async fn test_checkout_preview_matches_commit_totals() {
    let Some(pool) = create_test_pool().await else {
        return;
    };
    let user_id = 9501;
    clean_test_data(&pool, &[user_id], &[]).await;

    std::env::set_var("JWT_SECRET", "test-secret");
    let token = issue_token("test-secret", user_id);

    let product_id = seed_product(&pool, "Linen Trousers", dec!(600), 10).await;
    seed_cart_line(&pool, user_id, product_id, 2).await;

    let server = TestServer::new(create_router(pool.clone())).unwrap();
    let response = server
        .post("/api/checkout/preview")
        .add_header(
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        )
        .json(&serde_json::json!({}))
        .await;

    assert_eq!(response.status_code(), axum::http::StatusCode::OK);
    let body: serde_json::Value = response.json();

    let field = |name: &str| -> Decimal {
        body[name]
            .as_str()
            .unwrap_or_else(|| panic!("{} missing from preview", name))
            .parse()
            .unwrap()
    };
    assert_eq!(field("subtotal"), dec!(1200));
    assert_eq!(field("gst_amount"), dec!(216));
    assert_eq!(field("shipping_charge"), dec!(0));
    assert_eq!(field("total"), dec!(1416));

    let state = AppState::new(pool);
    let placed = state
        .order_service
        .place_order(user_id, place_order_request(None))
        .await
        .expect("Commit should match the preview");
    assert_eq!(placed.order.total, dec!(1416.00));
}
