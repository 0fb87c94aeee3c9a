use async_trait::async_trait;
use marketplace_shared::{OrderStatus, ReportStatus, ShopApproval, UserRole, Variation};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{Repository, UnitOfWork};
use crate::error::AppError;
use crate::models::{
    Address, Cart, CartItem, Item, ItemFilter, ItemListing, ItemVariation, NewAddress, NewCartItem, NewItem,
    NewOrder, NewReport, NewReview, NewShop, NewUser, NewVariation, Order, Page, Pagination, Report, Review, Shop,
    User, UserListing,
};

/// Postgres-backed storage; each unit of work is one database transaction.
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        self.tx.rollback().await?;
        Ok(())
    }

    async fn insert_user(&mut self, new: NewUser) -> Result<User, AppError> {
        User::create(&mut self.tx, new).await
    }

    async fn find_user(&mut self, id: Uuid) -> Result<Option<User>, AppError> {
        User::find_by_id(&mut self.tx, id).await
    }

    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, AppError> {
        User::find_by_email(&mut self.tx, email).await
    }

    async fn list_users(&mut self) -> Result<Vec<UserListing>, AppError> {
        User::list_with_shops(&mut self.tx).await
    }

    async fn update_user_role(&mut self, id: Uuid, role: UserRole) -> Result<(), AppError> {
        User::update_role(&mut self.tx, id, role).await
    }

    async fn delete_user(&mut self, id: Uuid) -> Result<(), AppError> {
        User::delete(&mut self.tx, id).await
    }

    async fn insert_shop(&mut self, new: NewShop) -> Result<Shop, AppError> {
        Shop::create(&mut self.tx, new).await
    }

    async fn find_shop(&mut self, id: Uuid) -> Result<Option<Shop>, AppError> {
        Shop::find_by_id(&mut self.tx, id).await
    }

    async fn find_shop_by_user(&mut self, user_id: Uuid) -> Result<Option<Shop>, AppError> {
        Shop::find_by_user(&mut self.tx, user_id).await
    }

    async fn list_shops(&mut self, approval: Option<ShopApproval>) -> Result<Vec<Shop>, AppError> {
        Shop::list(&mut self.tx, approval).await
    }

    async fn save_shop(&mut self, shop: &Shop) -> Result<Shop, AppError> {
        Shop::save(&mut self.tx, shop).await
    }

    async fn delete_shops_by_user(&mut self, user_id: Uuid) -> Result<(), AppError> {
        Shop::delete_by_user(&mut self.tx, user_id).await
    }

    async fn insert_address(&mut self, new: NewAddress) -> Result<Address, AppError> {
        Address::create(&mut self.tx, new).await
    }

    async fn find_address(&mut self, id: Uuid) -> Result<Option<Address>, AppError> {
        Address::find_by_id(&mut self.tx, id).await
    }

    async fn list_addresses(&mut self, user_id: Uuid) -> Result<Vec<Address>, AppError> {
        Address::list_by_user(&mut self.tx, user_id).await
    }

    async fn save_address(&mut self, address: &Address) -> Result<Address, AppError> {
        Address::save(&mut self.tx, address).await
    }

    async fn delete_address(&mut self, id: Uuid) -> Result<(), AppError> {
        Address::delete(&mut self.tx, id).await
    }

    async fn clear_default_address(&mut self, user_id: Uuid) -> Result<(), AppError> {
        Address::clear_default(&mut self.tx, user_id).await
    }

    async fn delete_addresses_by_user(&mut self, user_id: Uuid) -> Result<(), AppError> {
        Address::delete_by_user(&mut self.tx, user_id).await
    }

    async fn insert_item(&mut self, new: NewItem) -> Result<Item, AppError> {
        Item::create(&mut self.tx, new).await
    }

    async fn insert_variation(&mut self, new: NewVariation) -> Result<ItemVariation, AppError> {
        ItemVariation::create(&mut self.tx, new).await
    }

    async fn find_item(&mut self, id: Uuid) -> Result<Option<Item>, AppError> {
        Item::find_by_id(&mut self.tx, id).await
    }

    async fn save_item(&mut self, item: &Item) -> Result<Item, AppError> {
        Item::save(&mut self.tx, item).await
    }

    async fn find_variation(&mut self, id: Uuid) -> Result<Option<ItemVariation>, AppError> {
        ItemVariation::find_by_id(&mut self.tx, id).await
    }

    async fn save_variation(&mut self, variation: &ItemVariation) -> Result<ItemVariation, AppError> {
        ItemVariation::save(&mut self.tx, variation).await
    }

    async fn delete_variation(&mut self, id: Uuid) -> Result<(), AppError> {
        ItemVariation::delete(&mut self.tx, id).await
    }

    async fn list_variations(&mut self, item_id: Uuid) -> Result<Vec<ItemVariation>, AppError> {
        ItemVariation::find_by_item(&mut self.tx, item_id).await
    }

    async fn list_items(&mut self, filter: &ItemFilter) -> Result<Page<ItemListing>, AppError> {
        let (items, total) = Item::list_active(&mut self.tx, filter).await?;
        Ok(Page::new(items, total, filter.pagination))
    }

    async fn list_seller_items(
        &mut self,
        seller_id: Uuid,
        pagination: Pagination,
    ) -> Result<Page<ItemListing>, AppError> {
        let (items, total) = Item::list_by_seller(&mut self.tx, seller_id, pagination).await?;
        Ok(Page::new(items, total, pagination))
    }

    async fn decrement_stock(&mut self, item_id: Uuid, amount: i32) -> Result<bool, AppError> {
        Item::decrease_stock(&mut self.tx, item_id, amount).await
    }

    async fn increment_stock(&mut self, item_id: Uuid, amount: i32) -> Result<(), AppError> {
        Item::increase_stock(&mut self.tx, item_id, amount).await
    }

    async fn remove_items_by_seller(&mut self, seller_id: Uuid) -> Result<(), AppError> {
        Item::remove_by_seller(&mut self.tx, seller_id).await
    }

    async fn find_cart(&mut self, user_id: Uuid) -> Result<Option<Cart>, AppError> {
        Cart::find_by_user(&mut self.tx, user_id).await
    }

    async fn insert_cart(&mut self, user_id: Uuid) -> Result<Cart, AppError> {
        Cart::create(&mut self.tx, user_id).await
    }

    async fn list_cart_items(&mut self, cart_id: Uuid) -> Result<Vec<CartItem>, AppError> {
        CartItem::list_by_cart(&mut self.tx, cart_id).await
    }

    async fn find_cart_item(
        &mut self,
        cart_id: Uuid,
        item_id: Uuid,
        variation: &Variation,
    ) -> Result<Option<CartItem>, AppError> {
        CartItem::find(&mut self.tx, cart_id, item_id, variation).await
    }

    async fn insert_cart_item(&mut self, new: NewCartItem) -> Result<CartItem, AppError> {
        CartItem::create(&mut self.tx, new).await
    }

    async fn save_cart_item(&mut self, entry: &CartItem) -> Result<CartItem, AppError> {
        CartItem::save(&mut self.tx, entry).await
    }

    async fn delete_cart_item(&mut self, id: Uuid) -> Result<(), AppError> {
        CartItem::delete(&mut self.tx, id).await
    }

    async fn delete_cart(&mut self, user_id: Uuid) -> Result<(), AppError> {
        Cart::delete_by_user(&mut self.tx, user_id).await
    }

    async fn insert_order(&mut self, new: NewOrder) -> Result<Order, AppError> {
        Order::create(&mut self.tx, new).await
    }

    async fn find_order(&mut self, id: Uuid) -> Result<Option<Order>, AppError> {
        Order::find_by_id(&mut self.tx, id).await
    }

    async fn transition_order(
        &mut self,
        id: Uuid,
        current: OrderStatus,
        next: OrderStatus,
    ) -> Result<Option<Order>, AppError> {
        Order::transition(&mut self.tx, id, current, next).await
    }

    async fn list_orders_by_user(&mut self, user_id: Uuid, pagination: Pagination) -> Result<Page<Order>, AppError> {
        let (orders, total) = Order::list_by_user(&mut self.tx, user_id, pagination).await?;
        Ok(Page::new(orders, total, pagination))
    }

    async fn list_orders_by_seller(
        &mut self,
        seller_id: Uuid,
        pagination: Pagination,
    ) -> Result<Page<Order>, AppError> {
        let (orders, total) = Order::list_by_seller(&mut self.tx, seller_id, pagination).await?;
        Ok(Page::new(orders, total, pagination))
    }

    async fn list_open_orders_by_user(&mut self, user_id: Uuid) -> Result<Vec<Order>, AppError> {
        Order::list_open_by_user(&mut self.tx, user_id).await
    }

    async fn delete_orders_by_user(&mut self, user_id: Uuid) -> Result<(), AppError> {
        Order::delete_by_user(&mut self.tx, user_id).await
    }

    async fn insert_review(&mut self, new: NewReview) -> Result<Review, AppError> {
        Review::create(&mut self.tx, new).await
    }

    async fn find_review(&mut self, id: Uuid) -> Result<Option<Review>, AppError> {
        Review::find_by_id(&mut self.tx, id).await
    }

    async fn find_review_by_user_item(&mut self, user_id: Uuid, item_id: Uuid) -> Result<Option<Review>, AppError> {
        Review::find_by_user_and_item(&mut self.tx, user_id, item_id).await
    }

    async fn save_review(&mut self, review: &Review) -> Result<Review, AppError> {
        Review::save(&mut self.tx, review).await
    }

    async fn delete_review(&mut self, id: Uuid) -> Result<(), AppError> {
        Review::delete(&mut self.tx, id).await
    }

    async fn list_reviews_for_item(&mut self, item_id: Uuid) -> Result<Vec<Review>, AppError> {
        Review::list_by_item(&mut self.tx, item_id).await
    }

    async fn delete_reviews_by_user(&mut self, user_id: Uuid) -> Result<(), AppError> {
        Review::delete_by_user(&mut self.tx, user_id).await
    }

    async fn anonymize_reviews_by_user(&mut self, user_id: Uuid, comment: &str) -> Result<(), AppError> {
        Review::anonymize_by_user(&mut self.tx, user_id, comment).await
    }

    async fn insert_report(&mut self, new: NewReport) -> Result<Report, AppError> {
        Report::create(&mut self.tx, new).await
    }

    async fn find_report(&mut self, id: Uuid) -> Result<Option<Report>, AppError> {
        Report::find_by_id(&mut self.tx, id).await
    }

    async fn find_pending_report(&mut self, user_id: Uuid, item_id: Uuid) -> Result<Option<Report>, AppError> {
        Report::find_pending(&mut self.tx, user_id, item_id).await
    }

    async fn save_report(&mut self, report: &Report) -> Result<Report, AppError> {
        Report::save(&mut self.tx, report).await
    }

    async fn list_reports(
        &mut self,
        status: Option<ReportStatus>,
        pagination: Pagination,
    ) -> Result<Page<Report>, AppError> {
        let (reports, total) = Report::list(&mut self.tx, status, pagination).await?;
        Ok(Page::new(reports, total, pagination))
    }

    async fn delete_reports_by_user(&mut self, user_id: Uuid) -> Result<(), AppError> {
        Report::delete_by_user(&mut self.tx, user_id).await
    }
}
