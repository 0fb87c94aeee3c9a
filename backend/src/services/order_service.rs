use std::sync::Arc;

use marketplace_shared::{
    OrderStatus, PageQuery, PlaceOrderRequest, UpdateOrderStatusRequest, UserRole, ERROR_ITEM_NOT_FOUND,
    ERROR_NOT_ENOUGH_STOCK, ERROR_ORDER_NOT_FOUND,
};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::Actor;
use crate::error::AppError;
use crate::models::{NewOrder, Order, OrderDetail, Page, Pagination};
use crate::repositories::{finish, Repository, UnitOfWork};

#[cfg(test)]
mod tests;

/// Order ledger and the stock movements tied to it.
#[derive(Clone)]
pub struct OrderService {
    repo: Arc<dyn Repository>,
}

impl OrderService {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// Direct purchase of one item, bypassing the cart.
    pub async fn place_order(
        &self,
        actor: &Actor,
        item_id: Uuid,
        request: PlaceOrderRequest,
    ) -> Result<OrderDetail, AppError> {
        request.validate()?;
        if let Some(variation) = &request.variation {
            variation.validate()?;
        }

        let mut uow = self.repo.begin().await?;
        let result = Self::place_in(uow.as_mut(), actor.user_id, item_id, request).await;
        let detail = finish(uow, result).await?;

        info!(order_id = %detail.order.id, user_id = %actor.user_id, "Order placed");
        Ok(detail)
    }

    async fn place_in(
        uow: &mut dyn UnitOfWork,
        user_id: Uuid,
        item_id: Uuid,
        request: PlaceOrderRequest,
    ) -> Result<OrderDetail, AppError> {
        let item = uow
            .find_item(item_id)
            .await?
            .filter(|item| item.is_active())
            .ok_or_else(|| AppError::NotFound(ERROR_ITEM_NOT_FOUND.to_string()))?;

        let total_price = Order::total_for(item.price, request.quantity)?;
        if !uow.decrement_stock(item.id, request.quantity).await? {
            return Err(AppError::InsufficientStock(ERROR_NOT_ENOUGH_STOCK.to_string()));
        }

        let order = uow
            .insert_order(NewOrder {
                user_id,
                item_id: item.id,
                quantity: request.quantity,
                total_price,
                shipping_address: request.shipping_address.trim().to_string(),
                variation: request.variation,
                payment_method: None,
            })
            .await?;

        let item = uow.find_item(item.id).await?;
        Ok(OrderDetail { order, item })
    }

    /// Seller-driven status change.
    ///
    /// Only the seller owning the order's item may move it, terminal orders
    /// never move again, and a rejection hands the quantity back to stock.
    pub async fn update_order_status(
        &self,
        actor: &Actor,
        order_id: Uuid,
        request: UpdateOrderStatusRequest,
    ) -> Result<OrderDetail, AppError> {
        actor.require(UserRole::Seller)?;
        if request.status == OrderStatus::Pending {
            return Err(AppError::Validation(
                "status must be one of approved, rejected, completed".to_string(),
            ));
        }

        let mut uow = self.repo.begin().await?;
        let result = Self::update_status_in(uow.as_mut(), actor, order_id, request.status).await;
        let detail = finish(uow, result).await?;

        info!(order_id = %order_id, status = %detail.order.status, "Order status updated");
        Ok(detail)
    }

    async fn update_status_in(
        uow: &mut dyn UnitOfWork,
        actor: &Actor,
        order_id: Uuid,
        next: OrderStatus,
    ) -> Result<OrderDetail, AppError> {
        let order = uow
            .find_order(order_id)
            .await?
            .ok_or_else(|| AppError::NotFound(ERROR_ORDER_NOT_FOUND.to_string()))?;
        let item = uow.find_item(order.item_id).await?;

        let owns_item = item.as_ref().map_or(false, |item| item.is_owned_by(actor.user_id));
        if !owns_item {
            return Err(AppError::Authorization(
                "Only the seller of this item can update the order".to_string(),
            ));
        }

        if !order.status.can_transition_to(next) {
            warn!(order_id = %order_id, from = %order.status, to = %next, "Rejected order transition");
            return Err(AppError::InvalidState(format!(
                "Cannot change order status from {} to {}",
                order.status, next
            )));
        }

        let order = uow
            .transition_order(order.id, order.status, next)
            .await?
            .ok_or_else(|| AppError::InvalidState("Order status changed concurrently".to_string()))?;

        if next == OrderStatus::Rejected {
            uow.increment_stock(order.item_id, order.quantity).await?;
        }

        let item = uow.find_item(order.item_id).await?;
        Ok(OrderDetail { order, item })
    }

    /// The caller's own orders, newest first.
    pub async fn list_orders(&self, actor: &Actor, query: PageQuery) -> Result<Page<Order>, AppError> {
        let pagination = Pagination::new(query.page, query.per_page);
        let mut uow = self.repo.begin().await?;
        let result = uow.list_orders_by_user(actor.user_id, pagination).await;
        finish(uow, result).await
    }

    /// Orders placed against the caller's items.
    pub async fn seller_orders(&self, actor: &Actor, query: PageQuery) -> Result<Page<Order>, AppError> {
        actor.require(UserRole::Seller)?;
        let pagination = Pagination::new(query.page, query.per_page);
        let mut uow = self.repo.begin().await?;
        let result = uow.list_orders_by_seller(actor.user_id, pagination).await;
        finish(uow, result).await
    }

    /// Visible to the buyer and to the item's seller; anyone else gets `NotFound`.
    pub async fn get_order(&self, actor: &Actor, order_id: Uuid) -> Result<OrderDetail, AppError> {
        let mut uow = self.repo.begin().await?;
        let result = async {
            let order = uow.find_order(order_id).await?;
            match order {
                Some(order) => {
                    let item = uow.find_item(order.item_id).await?;
                    Ok((order, item))
                }
                None => Err(AppError::NotFound(ERROR_ORDER_NOT_FOUND.to_string())),
            }
        }
        .await;
        let (order, item) = finish(uow, result).await?;

        let is_buyer = order.user_id == actor.user_id;
        let is_seller = item.as_ref().map_or(false, |item| item.is_owned_by(actor.user_id));
        if !is_buyer && !is_seller {
            return Err(AppError::NotFound(ERROR_ORDER_NOT_FOUND.to_string()));
        }
        Ok(OrderDetail { order, item })
    }
}
