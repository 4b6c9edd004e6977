use uuid::Uuid;
use validator::Validate;

use crate::cart::{CartError, CartService};
use crate::catalog::CatalogRepository;
use crate::coupons::CouponRepository;
use crate::orders::error::OrderError;
use crate::orders::models::{
    Order, OrderStatus, OrderWithItems, PaymentMethod, PaymentStatus, PlaceOrderRequest,
    UpdateStatusRequest, UpdateTrackingRequest,
};
use crate::orders::repository::{NewOrderItem, OrderRepository};
use crate::pricing::{PricingError, PricingService};

/// Service guarding order placement and the order lifecycle
#[derive(Clone)]
pub struct OrderService {
    repo: OrderRepository,
    cart_service: CartService,
    catalog: CatalogRepository,
    coupon_repo: CouponRepository,
    pricing_service: PricingService,
}

impl OrderService {
    pub fn new(
        repo: OrderRepository,
        cart_service: CartService,
        catalog: CatalogRepository,
        coupon_repo: CouponRepository,
        pricing_service: PricingService,
    ) -> Self {
        Self {
            repo,
            cart_service,
            catalog,
            coupon_repo,
            pricing_service,
        }
    }

    /// Commit the caller's cart as an order.
    ///
    /// The quote is recomputed from live data at the moment of commit, and
    /// the writes that depend on it run in one transaction: order row and
    /// frozen line items, per-line stock reservation, the coupon usage slot,
    /// the redemption record, and the cart wipe. A failed stock reservation
    /// or a lost coupon slot rolls everything back, so no partial order can
    /// exist.
    pub async fn place_order(
        &self,
        user_id: i32,
        request: PlaceOrderRequest,
    ) -> Result<OrderWithItems, OrderError> {
        request.validate()?;

        let (cart_items, lines) = match self.cart_service.priced_lines(user_id).await {
            Ok(priced) => priced,
            Err(CartError::EmptyCart) => return Err(OrderError::EmptyOrder),
            Err(err) => return Err(OrderError::DatabaseError(err.to_string())),
        };

        let quote = self
            .pricing_service
            .quote(&lines, user_id, request.coupon_code.as_deref())
            .await
            .map_err(|err| match err {
                PricingError::Coupon(reason) => OrderError::CouponRejected(reason),
                other => OrderError::DatabaseError(other.to_string()),
            })?;

        let order_items: Vec<NewOrderItem> = cart_items
            .iter()
            .map(|item| NewOrderItem {
                product_id: item.product_id,
                product_title: item.title.clone(),
                size: item.size.clone(),
                quantity: item.quantity,
                price_snapshot: item.unit_price,
            })
            .collect();

        // COD has no payment step to wait on, so the order confirms on
        // commit; gateway orders stay pending until the payment callback
        let order_status = match request.payment_method {
            PaymentMethod::Cod => OrderStatus::Confirmed,
            PaymentMethod::Razorpay => OrderStatus::Pending,
        };

        let address = serde_json::to_value(&request.delivery_address)
            .map_err(|err| OrderError::ValidationError(err.to_string()))?;

        let mut tx = self.repo.pool().begin().await?;

        let order = self
            .repo
            .insert(
                &mut tx,
                user_id,
                &quote.breakdown,
                request.payment_method,
                PaymentStatus::Pending,
                order_status,
                &address,
            )
            .await?;

        self.repo.insert_items(&mut tx, order.id, &order_items).await?;

        for item in &order_items {
            let reserved = self
                .catalog
                .reserve_stock(&mut tx, item.product_id, item.quantity)
                .await?;
            if !reserved {
                tx.rollback().await?;
                return Err(OrderError::OutOfStock {
                    product_id: item.product_id,
                });
            }
        }

        if let Some(quoted) = &quote.coupon {
            let consumed = self
                .coupon_repo
                .try_consume(&mut tx, quoted.coupon.id)
                .await?;
            if !consumed {
                // Another order took the last usage slot since the quote
                tx.rollback().await?;
                return Err(OrderError::CouponRaceLost);
            }

            self.coupon_repo
                .insert_redemption(
                    &mut tx,
                    quoted.coupon.id,
                    &quoted.coupon.code,
                    user_id,
                    order.id,
                    quoted.discount_amount,
                    quote.breakdown.subtotal,
                    quoted.applied_type,
                )
                .await?;
        }

        self.cart_service
            .repository()
            .clear_in_tx(&mut tx, user_id)
            .await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            user_id,
            total = %order.total,
            coupon = order.coupon_code.as_deref().unwrap_or("-"),
            "Order placed"
        );

        let items = self.repo.find_items(order.id).await?;
        Ok(OrderWithItems { order, items })
    }

    pub async fn my_orders(&self, user_id: i32) -> Result<Vec<Order>, OrderError> {
        Ok(self.repo.find_by_user(user_id).await?)
    }

    /// Fetch one order with its items, owner-checked unless the caller is
    /// an admin.
    pub async fn order_detail(
        &self,
        order_id: Uuid,
        user_id: i32,
        is_admin: bool,
    ) -> Result<OrderWithItems, OrderError> {
        let order = self
            .repo
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        if !is_admin && order.user_id != user_id {
            return Err(OrderError::Forbidden);
        }

        let items = self.repo.find_items(order_id).await?;
        Ok(OrderWithItems { order, items })
    }

    pub async fn all_orders(
        &self,
        status: Option<OrderStatus>,
        limit: Option<i64>,
    ) -> Result<Vec<Order>, OrderError> {
        let limit = limit.unwrap_or(100).clamp(1, 500);
        Ok(self.repo.find_all(status, limit).await?)
    }

    /// Admin status update, validated against the transition table.
    /// Cancellation never returns the coupon usage slot.
    pub async fn update_status(
        &self,
        order_id: Uuid,
        request: UpdateStatusRequest,
    ) -> Result<Order, OrderError> {
        let order = self
            .repo
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        if !order.order_status.can_transition_to(request.order_status) {
            return Err(OrderError::InvalidTransition {
                from: format!("{:?}", order.order_status).to_lowercase(),
                to: format!("{:?}", request.order_status).to_lowercase(),
            });
        }

        self.repo
            .update_status(order_id, request.order_status)
            .await?
            .ok_or(OrderError::NotFound)
    }

    /// Attach tracking details; the order moves to Shipped
    pub async fn update_tracking(
        &self,
        order_id: Uuid,
        request: UpdateTrackingRequest,
    ) -> Result<Order, OrderError> {
        request.validate()?;

        let order = self
            .repo
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        if !order.order_status.can_transition_to(OrderStatus::Shipped) {
            return Err(OrderError::InvalidTransition {
                from: format!("{:?}", order.order_status).to_lowercase(),
                to: "shipped".to_string(),
            });
        }

        self.repo
            .update_tracking(order_id, &request.tracking_id, &request.courier)
            .await?
            .ok_or(OrderError::NotFound)
    }

    /// Payment gateway callback: success confirms a pending order, failure
    /// records the failed payment and leaves the order pending for retry.
    pub async fn record_payment(
        &self,
        order_id: Uuid,
        success: bool,
    ) -> Result<Order, OrderError> {
        let order = self
            .repo
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::NotFound)?;

        let payment_status = if success {
            PaymentStatus::Success
        } else {
            PaymentStatus::Failed
        };

        let updated = self
            .repo
            .update_payment_status(order_id, payment_status)
            .await?
            .ok_or(OrderError::NotFound)?;

        if success && order.order_status == OrderStatus::Pending {
            return self
                .repo
                .update_status(order_id, OrderStatus::Confirmed)
                .await?
                .ok_or(OrderError::NotFound);
        }

        Ok(updated)
    }
}
