use std::sync::Arc;

use marketplace_shared::{
    AddToCartRequest, CheckoutRequest, RemoveFromCartRequest, UpdateCartItemRequest, ERROR_CART_ITEM_NOT_FOUND,
    ERROR_CART_NOT_FOUND, ERROR_ITEM_NOT_FOUND, ERROR_NOTHING_SELECTED, ERROR_NOT_ENOUGH_STOCK, Variation,
};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::Actor;
use crate::error::AppError;
use crate::models::{Cart, CartItem, CartLine, CartView, NewCartItem, NewOrder, Order};
use crate::repositories::{finish, Repository, UnitOfWork};


/// Per-user cart and the checkout that turns it into orders.
#[derive(Clone)]
pub struct CartService {
    repo: Arc<dyn Repository>,
}

impl CartService {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// The caller's cart, created on first access.
    pub async fn get_cart(&self, actor: &Actor) -> Result<CartView, AppError> {
        let mut uow = self.repo.begin().await?;
        let result = async {
            let cart = Self::ensure_cart(uow.as_mut(), actor.user_id).await?;
            Self::load_view(uow.as_mut(), &cart).await
        }
        .await;
        finish(uow, result).await
    }

    /// Add `quantity` of an item in one variation, merging with an existing line.
    pub async fn add_to_cart(&self, actor: &Actor, request: AddToCartRequest) -> Result<CartLine, AppError> {
        request.validate()?;

        let mut uow = self.repo.begin().await?;
        let result = Self::add_in(uow.as_mut(), actor.user_id, request).await;
        let line = finish(uow, result).await?;

        info!(user_id = %actor.user_id, item_id = %line.item.id, quantity = line.entry.quantity, "Cart updated");
        Ok(line)
    }

    async fn add_in(uow: &mut dyn UnitOfWork, user_id: Uuid, request: AddToCartRequest) -> Result<CartLine, AppError> {
        let item = uow
            .find_item(request.item_id)
            .await?
            .filter(|item| item.is_active())
            .ok_or_else(|| AppError::NotFound(ERROR_ITEM_NOT_FOUND.to_string()))?;

        if request.quantity > item.stock {
            return Err(AppError::InsufficientStock(ERROR_NOT_ENOUGH_STOCK.to_string()));
        }

        let cart = Self::ensure_cart(uow, user_id).await?;
        let entry = match uow.find_cart_item(cart.id, item.id, &request.variation).await? {
            Some(mut existing) => {
                // The merged quantity must still fit; it is never clamped.
                let combined = existing
                    .quantity
                    .checked_add(request.quantity)
                    .filter(|combined| *combined <= item.stock)
                    .ok_or_else(|| AppError::InsufficientStock(ERROR_NOT_ENOUGH_STOCK.to_string()))?;
                existing.quantity = combined;
                uow.save_cart_item(&existing).await?
            }
            None => {
                uow.insert_cart_item(NewCartItem {
                    cart_id: cart.id,
                    item_id: item.id,
                    variation: request.variation,
                    quantity: request.quantity,
                })
                .await?
            }
        };

        Ok(CartLine::new(entry, item))
    }

    /// Change the quantity and optionally the `selected` flag of one line.
    pub async fn update_cart_item(
        &self,
        actor: &Actor,
        item_id: Uuid,
        request: UpdateCartItemRequest,
    ) -> Result<CartLine, AppError> {
        request.validate()?;

        let mut uow = self.repo.begin().await?;
        let result = Self::update_in(uow.as_mut(), actor.user_id, item_id, request).await;
        finish(uow, result).await
    }

    async fn update_in(
        uow: &mut dyn UnitOfWork,
        user_id: Uuid,
        item_id: Uuid,
        request: UpdateCartItemRequest,
    ) -> Result<CartLine, AppError> {
        let mut entry = Self::find_line(uow, user_id, item_id, &request.variation).await?;
        let item = uow
            .find_item(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(ERROR_ITEM_NOT_FOUND.to_string()))?;

        if request.quantity != entry.quantity {
            if request.quantity > item.stock {
                return Err(AppError::InsufficientStock(ERROR_NOT_ENOUGH_STOCK.to_string()));
            }
            entry.quantity = request.quantity;
        }
        if let Some(selected) = request.selected {
            entry.selected = selected;
        }

        let entry = uow.save_cart_item(&entry).await?;
        Ok(CartLine::new(entry, item))
    }

    pub async fn remove_from_cart(
        &self,
        actor: &Actor,
        item_id: Uuid,
        request: RemoveFromCartRequest,
    ) -> Result<(), AppError> {
        request.validate()?;

        let mut uow = self.repo.begin().await?;
        let result = async {
            let entry = Self::find_line(uow.as_mut(), actor.user_id, item_id, &request.variation).await?;
            uow.delete_cart_item(entry.id).await
        }
        .await;
        finish(uow, result).await
    }

    /// Turn every selected line into a pending order.
    ///
    /// All or nothing: one line short on stock fails the whole checkout and
    /// leaves the cart, orders and stock exactly as they were.
    pub async fn checkout(&self, actor: &Actor, request: CheckoutRequest) -> Result<Vec<Order>, AppError> {
        request.validate()?;

        let mut uow = self.repo.begin().await?;
        let result = Self::checkout_in(uow.as_mut(), actor.user_id, &request).await;
        let orders = finish(uow, result).await.map_err(|err| {
            warn!(user_id = %actor.user_id, error = %err, "Checkout failed");
            err
        })?;

        info!(user_id = %actor.user_id, orders = orders.len(), "Checkout completed");
        Ok(orders)
    }

    async fn checkout_in(
        uow: &mut dyn UnitOfWork,
        user_id: Uuid,
        request: &CheckoutRequest,
    ) -> Result<Vec<Order>, AppError> {
        let nothing_selected = || AppError::EmptyCart(ERROR_NOTHING_SELECTED.to_string());
        let cart = uow.find_cart(user_id).await?.ok_or_else(nothing_selected)?;
        let selected: Vec<CartItem> = uow
            .list_cart_items(cart.id)
            .await?
            .into_iter()
            .filter(|entry| entry.selected)
            .collect();
        if selected.is_empty() {
            return Err(nothing_selected());
        }

        let mut orders = Vec::with_capacity(selected.len());
        for entry in selected {
            let item = uow
                .find_item(entry.item_id)
                .await?
                .ok_or_else(|| AppError::NotFound(ERROR_ITEM_NOT_FOUND.to_string()))?;
            if !item.is_active() {
                return Err(AppError::InvalidState(format!(
                    "Checkout failed: {} is no longer available",
                    item.name
                )));
            }
            let total_price = Order::total_for(item.price, entry.quantity)?;
            if !uow.decrement_stock(item.id, entry.quantity).await? {
                return Err(AppError::InsufficientStock(format!(
                    "Checkout failed: Not enough stock for {}",
                    item.name
                )));
            }

            let order = uow
                .insert_order(NewOrder {
                    user_id,
                    item_id: item.id,
                    quantity: entry.quantity,
                    total_price,
                    shipping_address: request.shipping_address.trim().to_string(),
                    variation: Some(entry.variation.clone()),
                    payment_method: Some(request.payment_method.clone()),
                })
                .await?;
            uow.delete_cart_item(entry.id).await?;
            orders.push(order);
        }

        Ok(orders)
    }

    async fn ensure_cart(uow: &mut dyn UnitOfWork, user_id: Uuid) -> Result<Cart, AppError> {
        match uow.find_cart(user_id).await? {
            Some(cart) => Ok(cart),
            None => uow.insert_cart(user_id).await,
        }
    }

    async fn find_line(
        uow: &mut dyn UnitOfWork,
        user_id: Uuid,
        item_id: Uuid,
        variation: &Variation,
    ) -> Result<CartItem, AppError> {
        let cart = uow
            .find_cart(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(ERROR_CART_NOT_FOUND.to_string()))?;
        uow.find_cart_item(cart.id, item_id, variation)
            .await?
            .ok_or_else(|| AppError::NotFound(ERROR_CART_ITEM_NOT_FOUND.to_string()))
    }

    async fn load_view(uow: &mut dyn UnitOfWork, cart: &Cart) -> Result<CartView, AppError> {
        let entries = uow.list_cart_items(cart.id).await?;
        let mut lines = Vec::with_capacity(entries.len());
        for entry in entries {
            if let Some(item) = uow.find_item(entry.item_id).await? {
                lines.push(CartLine::new(entry, item));
            }
        }
        Ok(CartView::new(cart, lines))
    }
}
