use rust_decimal::Decimal;
use validator::Validate;

use crate::cart::error::CartError;
use crate::cart::models::{
    AddToCartRequest, CartItem, CartItemDetail, CartSummary, UpdateQuantityRequest,
};
use crate::cart::repository::CartRepository;
use crate::catalog::{CatalogRepository, Product};
use crate::pricing::PricedLine;

/// Service for cart mutations and cart pricing input
#[derive(Clone)]
pub struct CartService {
    repo: CartRepository,
    catalog: CatalogRepository,
}

impl CartService {
    pub fn new(repo: CartRepository, catalog: CatalogRepository) -> Self {
        Self { repo, catalog }
    }

    pub fn repository(&self) -> &CartRepository {
        &self.repo
    }

    /// Add a product to the cart, merging with an existing row for the same
    /// size. An add whose merged quantity would exceed current stock is
    /// rejected outright, leaving the existing row untouched.
    pub async fn add_item(
        &self,
        user_id: i32,
        request: AddToCartRequest,
    ) -> Result<CartItem, CartError> {
        request.validate()?;

        let product = self.fetch_sellable_product(request.product_id).await?;
        if !product.sizes.contains(&request.size) {
            return Err(CartError::SizeUnavailable(request.size));
        }

        let in_cart = self
            .repo
            .find_line(user_id, request.product_id, &request.size)
            .await?
            .map(|line| line.quantity)
            .unwrap_or(0);
        if in_cart + request.quantity > product.stock {
            return Err(CartError::InsufficientStock {
                available: product.stock,
            });
        }

        let item = self
            .repo
            .upsert(user_id, request.product_id, &request.size, request.quantity)
            .await?;

        Ok(item)
    }

    pub async fn update_quantity(
        &self,
        user_id: i32,
        item_id: i32,
        request: UpdateQuantityRequest,
    ) -> Result<CartItem, CartError> {
        request.validate()?;

        let item = self
            .repo
            .find_by_id(item_id, user_id)
            .await?
            .ok_or(CartError::ItemNotFound)?;

        let product = self.fetch_sellable_product(item.product_id).await?;
        if product.stock < request.quantity {
            return Err(CartError::InsufficientStock {
                available: product.stock,
            });
        }

        self.repo
            .set_quantity(item_id, user_id, request.quantity)
            .await?
            .ok_or(CartError::ItemNotFound)
    }

    pub async fn remove_item(&self, user_id: i32, item_id: i32) -> Result<(), CartError> {
        if self.repo.delete(item_id, user_id).await? {
            Ok(())
        } else {
            Err(CartError::ItemNotFound)
        }
    }

    pub async fn clear(&self, user_id: i32) -> Result<u64, CartError> {
        Ok(self.repo.clear(user_id).await?)
    }

    pub async fn summary(&self, user_id: i32) -> Result<CartSummary, CartError> {
        let items = self.repo.find_details(user_id).await?;
        let subtotal: Decimal = items.iter().map(CartItemDetail::line_total).sum();
        let item_count = items.iter().map(|item| i64::from(item.quantity)).sum();

        Ok(CartSummary {
            items,
            item_count,
            subtotal,
        })
    }

    pub async fn item_count(&self, user_id: i32) -> Result<i64, CartError> {
        Ok(self.repo.count_items(user_id).await?)
    }

    /// The cart as pricing input. Errors when empty so the checkout preview
    /// and the order commit reject empty carts the same way.
    pub async fn priced_lines(
        &self,
        user_id: i32,
    ) -> Result<(Vec<CartItemDetail>, Vec<PricedLine>), CartError> {
        let items = self.repo.find_details(user_id).await?;
        if items.is_empty() {
            return Err(CartError::EmptyCart);
        }

        let lines = items
            .iter()
            .map(|item| PricedLine {
                unit_price: item.unit_price,
                quantity: item.quantity,
            })
            .collect();

        Ok((items, lines))
    }

    async fn fetch_sellable_product(&self, product_id: i32) -> Result<Product, CartError> {
        let product = self
            .catalog
            .find_by_id(product_id)
            .await?
            .ok_or(CartError::ProductNotFound)?;

        if !product.is_active {
            return Err(CartError::ProductNotFound);
        }

        Ok(product)
    }
}
