//! Repository layer for the marketplace.
//!
//! Services talk to storage through a [`UnitOfWork`]: every read and
//! write made through one unit either commits together or is discarded.
//! Two backends implement it: Postgres for production and an in-memory
//! store used by tests and local runs.

use async_trait::async_trait;
use marketplace_shared::{OrderStatus, ReportStatus, ShopApproval, UserRole, Variation};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    Address, Cart, CartItem, Item, ItemFilter, ItemListing, ItemVariation, NewAddress, NewCartItem, NewItem,
    NewOrder, NewReport, NewReview, NewShop, NewUser, NewVariation, Order, Page, Pagination, Report, Review, Shop,
    User, UserListing,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

/// Entry point to storage: hands out units of work.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError>;
}

/// A transactional view over the whole store.
///
/// Dropping a unit without calling [`UnitOfWork::commit`] discards its writes.
#[async_trait]
pub trait UnitOfWork: Send {
    async fn commit(self: Box<Self>) -> Result<(), AppError>;
    async fn rollback(self: Box<Self>) -> Result<(), AppError>;

    // Users
    async fn insert_user(&mut self, new: NewUser) -> Result<User, AppError>;
    async fn find_user(&mut self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, AppError>;
    async fn list_users(&mut self) -> Result<Vec<UserListing>, AppError>;
    async fn update_user_role(&mut self, id: Uuid, role: UserRole) -> Result<(), AppError>;
    async fn delete_user(&mut self, id: Uuid) -> Result<(), AppError>;

    // Shops
    async fn insert_shop(&mut self, new: NewShop) -> Result<Shop, AppError>;
    async fn find_shop(&mut self, id: Uuid) -> Result<Option<Shop>, AppError>;
    async fn find_shop_by_user(&mut self, user_id: Uuid) -> Result<Option<Shop>, AppError>;
    async fn list_shops(&mut self, approval: Option<ShopApproval>) -> Result<Vec<Shop>, AppError>;
    async fn save_shop(&mut self, shop: &Shop) -> Result<Shop, AppError>;
    async fn delete_shops_by_user(&mut self, user_id: Uuid) -> Result<(), AppError>;

    // Addresses
    async fn insert_address(&mut self, new: NewAddress) -> Result<Address, AppError>;
    async fn find_address(&mut self, id: Uuid) -> Result<Option<Address>, AppError>;
    async fn list_addresses(&mut self, user_id: Uuid) -> Result<Vec<Address>, AppError>;
    async fn save_address(&mut self, address: &Address) -> Result<Address, AppError>;
    async fn delete_address(&mut self, id: Uuid) -> Result<(), AppError>;
    /// Unset the default flag on every address the user has.
    async fn clear_default_address(&mut self, user_id: Uuid) -> Result<(), AppError>;
    async fn delete_addresses_by_user(&mut self, user_id: Uuid) -> Result<(), AppError>;

    // Items
    async fn insert_item(&mut self, new: NewItem) -> Result<Item, AppError>;
    async fn insert_variation(&mut self, new: NewVariation) -> Result<ItemVariation, AppError>;
    async fn find_item(&mut self, id: Uuid) -> Result<Option<Item>, AppError>;
    async fn save_item(&mut self, item: &Item) -> Result<Item, AppError>;
    async fn find_variation(&mut self, id: Uuid) -> Result<Option<ItemVariation>, AppError>;
    async fn save_variation(&mut self, variation: &ItemVariation) -> Result<ItemVariation, AppError>;
    async fn delete_variation(&mut self, id: Uuid) -> Result<(), AppError>;
    async fn list_variations(&mut self, item_id: Uuid) -> Result<Vec<ItemVariation>, AppError>;
    async fn list_items(&mut self, filter: &ItemFilter) -> Result<Page<ItemListing>, AppError>;
    async fn list_seller_items(&mut self, seller_id: Uuid, pagination: Pagination)
        -> Result<Page<ItemListing>, AppError>;
    /// Take `amount` off the item's stock only if enough remains.
    async fn decrement_stock(&mut self, item_id: Uuid, amount: i32) -> Result<bool, AppError>;
    async fn increment_stock(&mut self, item_id: Uuid, amount: i32) -> Result<(), AppError>;
    async fn remove_items_by_seller(&mut self, seller_id: Uuid) -> Result<(), AppError>;

    // Carts
    async fn find_cart(&mut self, user_id: Uuid) -> Result<Option<Cart>, AppError>;
    async fn insert_cart(&mut self, user_id: Uuid) -> Result<Cart, AppError>;
    async fn list_cart_items(&mut self, cart_id: Uuid) -> Result<Vec<CartItem>, AppError>;
    async fn find_cart_item(
        &mut self,
        cart_id: Uuid,
        item_id: Uuid,
        variation: &Variation,
    ) -> Result<Option<CartItem>, AppError>;
    async fn insert_cart_item(&mut self, new: NewCartItem) -> Result<CartItem, AppError>;
    async fn save_cart_item(&mut self, entry: &CartItem) -> Result<CartItem, AppError>;
    async fn delete_cart_item(&mut self, id: Uuid) -> Result<(), AppError>;
    async fn delete_cart(&mut self, user_id: Uuid) -> Result<(), AppError>;

    // Orders
    async fn insert_order(&mut self, new: NewOrder) -> Result<Order, AppError>;
    async fn find_order(&mut self, id: Uuid) -> Result<Option<Order>, AppError>;
    /// Move an order from `current` to `next`; `None` if it is not in `current`.
    async fn transition_order(
        &mut self,
        id: Uuid,
        current: OrderStatus,
        next: OrderStatus,
    ) -> Result<Option<Order>, AppError>;
    async fn list_orders_by_user(&mut self, user_id: Uuid, pagination: Pagination) -> Result<Page<Order>, AppError>;
    async fn list_orders_by_seller(&mut self, seller_id: Uuid, pagination: Pagination)
        -> Result<Page<Order>, AppError>;
    /// Pending and approved orders, the ones still holding stock.
    async fn list_open_orders_by_user(&mut self, user_id: Uuid) -> Result<Vec<Order>, AppError>;
    async fn delete_orders_by_user(&mut self, user_id: Uuid) -> Result<(), AppError>;

    // Reviews
    async fn insert_review(&mut self, new: NewReview) -> Result<Review, AppError>;
    async fn find_review(&mut self, id: Uuid) -> Result<Option<Review>, AppError>;
    async fn find_review_by_user_item(&mut self, user_id: Uuid, item_id: Uuid) -> Result<Option<Review>, AppError>;
    async fn save_review(&mut self, review: &Review) -> Result<Review, AppError>;
    async fn delete_review(&mut self, id: Uuid) -> Result<(), AppError>;
    async fn list_reviews_for_item(&mut self, item_id: Uuid) -> Result<Vec<Review>, AppError>;
    async fn delete_reviews_by_user(&mut self, user_id: Uuid) -> Result<(), AppError>;
    /// Detach the user's reviews and replace their comments; ratings stay.
    async fn anonymize_reviews_by_user(&mut self, user_id: Uuid, comment: &str) -> Result<(), AppError>;

    // Reports
    async fn insert_report(&mut self, new: NewReport) -> Result<Report, AppError>;
    async fn find_report(&mut self, id: Uuid) -> Result<Option<Report>, AppError>;
    async fn find_pending_report(&mut self, user_id: Uuid, item_id: Uuid) -> Result<Option<Report>, AppError>;
    async fn save_report(&mut self, report: &Report) -> Result<Report, AppError>;
    async fn list_reports(&mut self, status: Option<ReportStatus>, pagination: Pagination)
        -> Result<Page<Report>, AppError>;
    async fn delete_reports_by_user(&mut self, user_id: Uuid) -> Result<(), AppError>;
}

/// Commit on success, roll back on failure and hand back the original error.
pub async fn finish<T>(uow: Box<dyn UnitOfWork>, result: Result<T, AppError>) -> Result<T, AppError> {
    match result {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = uow.rollback().await {
                tracing::warn!(error = %rollback_err, "Rollback failed");
            }
            Err(err)
        }
    }
}
