mod auth;
mod cart;
mod catalog;
mod coupons;
mod db;
mod orders;
mod pricing;
mod shipping;

use axum::{
    routing::{get, post, put},
    Router,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use cart::{CartRepository, CartService};
use catalog::CatalogRepository;
use coupons::{CouponRepository, CouponService};
use orders::{OrderRepository, OrderService};
use pricing::{GstSettingsRepository, PricingService};
use shipping::{ShippingService, ShippingTierRepository};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        shipping::handlers::calculate_shipping_handler,
        coupons::handlers::validate_coupon_handler,
        coupons::handlers::auto_apply_handler,
        cart::handlers::get_cart_handler,
        cart::handlers::add_to_cart_handler,
        pricing::handlers::checkout_preview_handler,
        orders::handlers::place_order_handler,
        orders::handlers::my_orders_handler,
    ),
    components(
        schemas(
            catalog::Product,
            cart::CartItem,
            cart::CartItemDetail,
            cart::CartSummary,
            cart::AddToCartRequest,
            cart::UpdateQuantityRequest,
            coupons::Coupon,
            coupons::CouponType,
            coupons::AppliedType,
            coupons::CouponValidation,
            coupons::ValidateCouponRequest,
            coupons::CreateCouponRequest,
            coupons::UpdateCouponRequest,
            shipping::ShippingTier,
            shipping::CreateTierRequest,
            shipping::UpdateTierRequest,
            pricing::PriceBreakdown,
            pricing::GstSettings,
            pricing::UpdateGstRequest,
            pricing::handlers::CheckoutPreviewRequest,
            pricing::handlers::CheckoutPreviewResponse,
            orders::Order,
            orders::OrderItem,
            orders::OrderWithItems,
            orders::OrderStatus,
            orders::PaymentMethod,
            orders::PaymentStatus,
            orders::DeliveryAddress,
            orders::PlaceOrderRequest,
            orders::UpdateStatusRequest,
            orders::UpdateTrackingRequest,
        )
    ),
    tags(
        (name = "shipping", description = "Shipping tier resolution and administration"),
        (name = "coupons", description = "Coupon validation and administration"),
        (name = "cart", description = "Shopping cart"),
        (name = "checkout", description = "Checkout price preview"),
        (name = "orders", description = "Order placement and history")
    ),
    info(
        title = "Storefront API",
        version = "1.0.0",
        description = "Order pricing, coupons, shipping tiers, and checkout for the storefront"
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: db::DbPool,
    pub cart_service: CartService,
    pub coupon_service: CouponService,
    pub shipping_service: ShippingService,
    pub pricing_service: PricingService,
    pub order_service: OrderService,
}

impl AppState {
    pub fn new(db: db::DbPool) -> Self {
        let catalog_repo = CatalogRepository::new(db.clone());
        let cart_service = CartService::new(CartRepository::new(db.clone()), catalog_repo.clone());

        let coupon_repo = CouponRepository::new(db.clone());
        let coupon_service = CouponService::new(coupon_repo.clone());

        let shipping_repo = ShippingTierRepository::new(db.clone());
        let shipping_service = ShippingService::new(shipping_repo.clone());

        let pricing_service = PricingService::new(
            GstSettingsRepository::new(db.clone()),
            shipping_repo,
            coupon_service.clone(),
        );

        let order_service = OrderService::new(
            OrderRepository::new(db.clone()),
            cart_service.clone(),
            catalog_repo,
            coupon_repo,
            pricing_service.clone(),
        );

        Self {
            db,
            cart_service,
            coupon_service,
            shipping_service,
            pricing_service,
            order_service,
        }
    }
}

fn create_router(db: db::DbPool) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let state = AppState::new(db);

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Shipping (public)
        .route(
            "/api/shipping-tiers/calculate",
            get(shipping::handlers::calculate_shipping_handler),
        )
        .route(
            "/api/shipping-tiers",
            get(shipping::handlers::get_active_tiers_handler),
        )
        // Coupons (customer)
        .route(
            "/api/coupons/validate",
            post(coupons::handlers::validate_coupon_handler),
        )
        .route(
            "/api/coupons/auto-apply",
            get(coupons::handlers::auto_apply_handler),
        )
        // Cart
        .route(
            "/api/cart",
            get(cart::handlers::get_cart_handler)
                .post(cart::handlers::add_to_cart_handler)
                .delete(cart::handlers::clear_cart_handler),
        )
        .route("/api/cart/count", get(cart::handlers::cart_count_handler))
        .route(
            "/api/cart/:item_id",
            put(cart::handlers::update_cart_item_handler)
                .delete(cart::handlers::remove_cart_item_handler),
        )
        // Checkout
        .route(
            "/api/checkout/preview",
            post(pricing::handlers::checkout_preview_handler),
        )
        // Orders
        .route(
            "/api/orders",
            post(orders::handlers::place_order_handler).get(orders::handlers::my_orders_handler),
        )
        .route(
            "/api/orders/:order_id",
            get(orders::handlers::order_detail_handler),
        )
        .route(
            "/api/orders/:order_id/payment",
            post(orders::handlers::payment_callback_handler),
        )
        // Admin: shipping tiers
        .route(
            "/api/admin/shipping-tiers",
            get(shipping::handlers::admin_list_tiers_handler)
                .post(shipping::handlers::admin_create_tier_handler),
        )
        .route(
            "/api/admin/shipping-tiers/:tier_id",
            put(shipping::handlers::admin_update_tier_handler)
                .delete(shipping::handlers::admin_delete_tier_handler),
        )
        .route(
            "/api/admin/shipping-tiers/:tier_id/toggle",
            put(shipping::handlers::admin_toggle_tier_handler),
        )
        // Admin: coupons
        .route(
            "/api/admin/coupons",
            get(coupons::handlers::admin_list_coupons_handler)
                .post(coupons::handlers::admin_create_coupon_handler),
        )
        .route(
            "/api/admin/coupons/:coupon_id",
            get(coupons::handlers::admin_coupon_details_handler)
                .put(coupons::handlers::admin_update_coupon_handler)
                .delete(coupons::handlers::admin_delete_coupon_handler),
        )
        .route(
            "/api/admin/coupons/:coupon_id/toggle",
            put(coupons::handlers::admin_toggle_coupon_handler),
        )
        // Admin: GST settings
        .route(
            "/api/admin/settings/gst",
            get(pricing::handlers::get_gst_handler).put(pricing::handlers::update_gst_handler),
        )
        // Admin: orders
        .route(
            "/api/admin/orders",
            get(orders::handlers::admin_list_orders_handler),
        )
        .route(
            "/api/admin/orders/:order_id",
            get(orders::handlers::admin_order_detail_handler),
        )
        .route(
            "/api/admin/orders/:order_id/status",
            put(orders::handlers::admin_update_status_handler),
        )
        .route(
            "/api/admin/orders/:order_id/tracking",
            put(orders::handlers::admin_update_tracking_handler),
        )
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    tracing::info!("Storefront API - Starting...");

    // Get configuration from environment variables
    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");
    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    // Create the application router
    let app = create_router(db_pool);

    // Start the Axum server
    let addr = format!("{}:{}", host, port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Storefront API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await.expect("Server error");
}

#[cfg(test)]
mod tests;
