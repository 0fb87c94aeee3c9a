use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use marketplace_shared::{
    ItemSort, ItemStatus, OrderStatus, ReportStatus, ShopApproval, UserRole, Variation, ERROR_ALREADY_REPORTED,
    ERROR_ALREADY_REVIEWED, ERROR_DUPLICATE_VARIATION, ERROR_EMAIL_ALREADY_EXISTS, ERROR_STOCK_OVERFLOW,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{Repository, UnitOfWork};
use crate::error::AppError;
use crate::models::{
    Address, Cart, CartItem, Item, ItemFilter, ItemListing, ItemVariation, NewAddress, NewCartItem, NewItem,
    NewOrder, NewReport, NewReview, NewShop, NewUser, NewVariation, Order, Page, Pagination, Report, Review, Shop,
    User, UserListing,
};

/// Every table of the marketplace held in process.
#[derive(Debug, Clone, Default)]
pub struct MarketState {
    pub users: Vec<User>,
    pub shops: Vec<Shop>,
    pub addresses: Vec<Address>,
    pub items: Vec<Item>,
    pub variations: Vec<ItemVariation>,
    pub carts: Vec<Cart>,
    pub cart_items: Vec<CartItem>,
    pub orders: Vec<Order>,
    pub reviews: Vec<Review>,
    pub reports: Vec<Report>,
}

/// In-memory storage.
///
/// A unit of work holds the store lock for its whole lifetime and edits a
/// private copy, so units are serialized and a failed one leaves no trace.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    state: Arc<Mutex<MarketState>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the committed state.
    pub async fn snapshot(&self) -> MarketState {
        self.state.lock().await.clone()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, AppError> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(MemoryUnitOfWork { guard, working }))
    }
}

pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MarketState>,
    working: MarketState,
}

impl MemoryUnitOfWork {
    fn not_found(what: &str) -> AppError {
        AppError::NotFound(format!("{} not found", what))
    }

    fn listing(&self, item: &Item) -> ItemListing {
        let ratings: Vec<Review> = self
            .working
            .reviews
            .iter()
            .filter(|r| r.item_id == item.id)
            .cloned()
            .collect();
        let orders_count = self.working.orders.iter().filter(|o| o.item_id == item.id).count() as i64;

        ItemListing {
            item: item.clone(),
            average_rating: Review::average(&ratings),
            orders_count,
        }
    }

    fn seller_of(&self, item_id: Uuid) -> Option<Uuid> {
        self.working
            .items
            .iter()
            .find(|i| i.id == item_id)
            .and_then(|i| i.seller_id)
    }
}

fn newest_first<T>(rows: &mut [T], created_at: impl Fn(&T) -> chrono::DateTime<chrono::Utc>) {
    rows.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
}

fn compare_listings(sort: ItemSort, a: &ItemListing, b: &ItemListing) -> Ordering {
    match sort {
        ItemSort::PriceAsc => a.item.price.cmp(&b.item.price),
        ItemSort::PriceDesc => b.item.price.cmp(&a.item.price),
        ItemSort::NameAsc => a.item.name.cmp(&b.item.name),
        ItemSort::NameDesc => b.item.name.cmp(&a.item.name),
        ItemSort::DateAsc => a.item.created_at.cmp(&b.item.created_at),
        ItemSort::DateDesc => b.item.created_at.cmp(&a.item.created_at),
        ItemSort::Rating => b
            .average_rating
            .partial_cmp(&a.average_rating)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.item.created_at.cmp(&a.item.created_at)),
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let MemoryUnitOfWork { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), AppError> {
        Ok(())
    }

    async fn insert_user(&mut self, new: NewUser) -> Result<User, AppError> {
        if self
            .working
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&new.email))
        {
            return Err(AppError::Duplicate(ERROR_EMAIL_ALREADY_EXISTS.to_string()));
        }
        let user = User::from_new(new);
        self.working.users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&mut self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.working.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .working
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_users(&mut self) -> Result<Vec<UserListing>, AppError> {
        let mut users: Vec<UserListing> = self
            .working
            .users
            .iter()
            .map(|user| UserListing {
                user: user.clone(),
                shop_name: self
                    .working
                    .shops
                    .iter()
                    .find(|s| s.user_id == user.id)
                    .map(|s| s.name.clone()),
            })
            .collect();
        newest_first(&mut users, |u| u.user.created_at);
        Ok(users)
    }

    async fn update_user_role(&mut self, id: Uuid, role: UserRole) -> Result<(), AppError> {
        let user = self
            .working
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| Self::not_found("User"))?;
        user.role = role;
        user.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn delete_user(&mut self, id: Uuid) -> Result<(), AppError> {
        let state = &mut self.working;
        state.users.retain(|u| u.id != id);

        // Mirror the schema's foreign-key actions.
        let cart_ids: Vec<Uuid> = state.carts.iter().filter(|c| c.user_id == id).map(|c| c.id).collect();
        state.cart_items.retain(|ci| !cart_ids.contains(&ci.cart_id));
        state.carts.retain(|c| c.user_id != id);
        state.shops.retain(|s| s.user_id != id);
        state.addresses.retain(|a| a.user_id != id);
        state.orders.retain(|o| o.user_id != id);
        state.reports.retain(|r| r.user_id != id);
        for review in state.reviews.iter_mut().filter(|r| r.user_id == Some(id)) {
            review.user_id = None;
        }
        for shop in state.shops.iter_mut().filter(|s| s.approved_by == Some(id)) {
            shop.approved_by = None;
        }
        for report in state.reports.iter_mut().filter(|r| r.reviewed_by == Some(id)) {
            report.reviewed_by = None;
        }
        for item in state.items.iter_mut().filter(|i| i.seller_id == Some(id)) {
            item.seller_id = None;
        }
        Ok(())
    }

    async fn insert_shop(&mut self, new: NewShop) -> Result<Shop, AppError> {
        if self.working.shops.iter().any(|s| s.user_id == new.user_id) {
            return Err(AppError::Duplicate("User already has a shop".to_string()));
        }
        let shop = Shop::from_new(new);
        self.working.shops.push(shop.clone());
        Ok(shop)
    }

    async fn find_shop(&mut self, id: Uuid) -> Result<Option<Shop>, AppError> {
        Ok(self.working.shops.iter().find(|s| s.id == id).cloned())
    }

    async fn find_shop_by_user(&mut self, user_id: Uuid) -> Result<Option<Shop>, AppError> {
        Ok(self.working.shops.iter().find(|s| s.user_id == user_id).cloned())
    }

    async fn list_shops(&mut self, approval: Option<ShopApproval>) -> Result<Vec<Shop>, AppError> {
        let mut shops: Vec<Shop> = self
            .working
            .shops
            .iter()
            .filter(|s| approval.map_or(true, |a| s.approval_status == a))
            .cloned()
            .collect();
        newest_first(&mut shops, |s| s.created_at);
        Ok(shops)
    }

    async fn save_shop(&mut self, shop: &Shop) -> Result<Shop, AppError> {
        let stored = self
            .working
            .shops
            .iter_mut()
            .find(|s| s.id == shop.id)
            .ok_or_else(|| Self::not_found("Shop"))?;
        *stored = shop.clone();
        stored.updated_at = chrono::Utc::now();
        Ok(stored.clone())
    }

    async fn delete_shops_by_user(&mut self, user_id: Uuid) -> Result<(), AppError> {
        self.working.shops.retain(|s| s.user_id != user_id);
        Ok(())
    }

    async fn insert_address(&mut self, new: NewAddress) -> Result<Address, AppError> {
        let address = Address::from_new(new);
        self.working.addresses.push(address.clone());
        Ok(address)
    }

    async fn find_address(&mut self, id: Uuid) -> Result<Option<Address>, AppError> {
        Ok(self.working.addresses.iter().find(|a| a.id == id).cloned())
    }

    async fn list_addresses(&mut self, user_id: Uuid) -> Result<Vec<Address>, AppError> {
        let mut addresses: Vec<Address> = self
            .working
            .addresses
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        addresses.sort_by(|a, b| {
            b.is_default
                .cmp(&a.is_default)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });
        Ok(addresses)
    }

    async fn save_address(&mut self, address: &Address) -> Result<Address, AppError> {
        let stored = self
            .working
            .addresses
            .iter_mut()
            .find(|a| a.id == address.id)
            .ok_or_else(|| Self::not_found("Address"))?;
        *stored = Address {
            updated_at: chrono::Utc::now(),
            ..address.clone()
        };
        Ok(stored.clone())
    }

    async fn delete_address(&mut self, id: Uuid) -> Result<(), AppError> {
        self.working.addresses.retain(|a| a.id != id);
        Ok(())
    }

    async fn clear_default_address(&mut self, user_id: Uuid) -> Result<(), AppError> {
        for address in self
            .working
            .addresses
            .iter_mut()
            .filter(|a| a.user_id == user_id && a.is_default)
        {
            address.is_default = false;
            address.updated_at = chrono::Utc::now();
        }
        Ok(())
    }

    async fn delete_addresses_by_user(&mut self, user_id: Uuid) -> Result<(), AppError> {
        self.working.addresses.retain(|a| a.user_id != user_id);
        Ok(())
    }

    async fn insert_item(&mut self, new: NewItem) -> Result<Item, AppError> {
        let item = Item::from_new(new);
        self.working.items.push(item.clone());
        Ok(item)
    }

    async fn insert_variation(&mut self, new: NewVariation) -> Result<ItemVariation, AppError> {
        if self
            .working
            .variations
            .iter()
            .any(|v| v.item_id == new.item_id && v.color == new.color && v.size == new.size)
        {
            return Err(AppError::Duplicate(ERROR_DUPLICATE_VARIATION.to_string()));
        }
        let variation = ItemVariation::from_new(new);
        self.working.variations.push(variation.clone());
        Ok(variation)
    }

    async fn find_item(&mut self, id: Uuid) -> Result<Option<Item>, AppError> {
        Ok(self.working.items.iter().find(|i| i.id == id).cloned())
    }

    async fn save_item(&mut self, item: &Item) -> Result<Item, AppError> {
        let stored = self
            .working
            .items
            .iter_mut()
            .find(|i| i.id == item.id)
            .ok_or_else(|| Self::not_found("Item"))?;
        *stored = item.clone();
        stored.updated_at = chrono::Utc::now();
        Ok(stored.clone())
    }

    async fn find_variation(&mut self, id: Uuid) -> Result<Option<ItemVariation>, AppError> {
        Ok(self.working.variations.iter().find(|v| v.id == id).cloned())
    }

    async fn save_variation(&mut self, variation: &ItemVariation) -> Result<ItemVariation, AppError> {
        if self.working.variations.iter().any(|v| {
            v.id != variation.id
                && v.item_id == variation.item_id
                && v.color == variation.color
                && v.size == variation.size
        }) {
            return Err(AppError::Duplicate(ERROR_DUPLICATE_VARIATION.to_string()));
        }
        let stored = self
            .working
            .variations
            .iter_mut()
            .find(|v| v.id == variation.id)
            .ok_or_else(|| Self::not_found("Variation"))?;
        *stored = variation.clone();
        Ok(stored.clone())
    }

    async fn delete_variation(&mut self, id: Uuid) -> Result<(), AppError> {
        self.working.variations.retain(|v| v.id != id);
        Ok(())
    }

    async fn list_variations(&mut self, item_id: Uuid) -> Result<Vec<ItemVariation>, AppError> {
        let mut variations: Vec<ItemVariation> = self
            .working
            .variations
            .iter()
            .filter(|v| v.item_id == item_id)
            .cloned()
            .collect();
        variations.sort_by(|a, b| a.color.cmp(&b.color).then_with(|| a.size.cmp(&b.size)));
        Ok(variations)
    }

    async fn list_items(&mut self, filter: &ItemFilter) -> Result<Page<ItemListing>, AppError> {
        let mut listings: Vec<ItemListing> = self
            .working
            .items
            .iter()
            .filter(|i| i.status == ItemStatus::Active && filter.matches(i))
            .map(|i| self.listing(i))
            .collect();
        listings.sort_by(|a, b| compare_listings(filter.sort, a, b));

        let total = listings.len() as i64;
        Ok(Page::new(filter.pagination.slice(&listings), total, filter.pagination))
    }

    async fn list_seller_items(
        &mut self,
        seller_id: Uuid,
        pagination: Pagination,
    ) -> Result<Page<ItemListing>, AppError> {
        let mut listings: Vec<ItemListing> = self
            .working
            .items
            .iter()
            .filter(|i| i.seller_id == Some(seller_id))
            .map(|i| self.listing(i))
            .collect();
        listings.sort_by(|a, b| compare_listings(ItemSort::DateDesc, a, b));

        let total = listings.len() as i64;
        Ok(Page::new(pagination.slice(&listings), total, pagination))
    }

    async fn decrement_stock(&mut self, item_id: Uuid, amount: i32) -> Result<bool, AppError> {
        match self.working.items.iter_mut().find(|i| i.id == item_id) {
            Some(item) if item.stock >= amount => {
                item.stock -= amount;
                item.updated_at = chrono::Utc::now();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn increment_stock(&mut self, item_id: Uuid, amount: i32) -> Result<(), AppError> {
        if let Some(item) = self.working.items.iter_mut().find(|i| i.id == item_id) {
            item.stock = item
                .stock
                .checked_add(amount)
                .ok_or_else(|| AppError::InsufficientStock(ERROR_STOCK_OVERFLOW.to_string()))?;
            item.updated_at = chrono::Utc::now();
        }
        Ok(())
    }

    async fn remove_items_by_seller(&mut self, seller_id: Uuid) -> Result<(), AppError> {
        for item in self
            .working
            .items
            .iter_mut()
            .filter(|i| i.seller_id == Some(seller_id))
        {
            item.status = ItemStatus::Removed;
            item.seller_id = None;
            item.updated_at = chrono::Utc::now();
        }
        Ok(())
    }

    async fn find_cart(&mut self, user_id: Uuid) -> Result<Option<Cart>, AppError> {
        Ok(self.working.carts.iter().find(|c| c.user_id == user_id).cloned())
    }

    async fn insert_cart(&mut self, user_id: Uuid) -> Result<Cart, AppError> {
        if let Some(cart) = self.working.carts.iter().find(|c| c.user_id == user_id) {
            return Ok(cart.clone());
        }
        let cart = Cart::for_user(user_id);
        self.working.carts.push(cart.clone());
        Ok(cart)
    }

    async fn list_cart_items(&mut self, cart_id: Uuid) -> Result<Vec<CartItem>, AppError> {
        Ok(self
            .working
            .cart_items
            .iter()
            .filter(|ci| ci.cart_id == cart_id)
            .cloned()
            .collect())
    }

    async fn find_cart_item(
        &mut self,
        cart_id: Uuid,
        item_id: Uuid,
        variation: &Variation,
    ) -> Result<Option<CartItem>, AppError> {
        Ok(self
            .working
            .cart_items
            .iter()
            .find(|ci| ci.cart_id == cart_id && ci.item_id == item_id && &ci.variation == variation)
            .cloned())
    }

    async fn insert_cart_item(&mut self, new: NewCartItem) -> Result<CartItem, AppError> {
        let entry = CartItem::from_new(new);
        self.working.cart_items.push(entry.clone());
        Ok(entry)
    }

    async fn save_cart_item(&mut self, entry: &CartItem) -> Result<CartItem, AppError> {
        let stored = self
            .working
            .cart_items
            .iter_mut()
            .find(|ci| ci.id == entry.id)
            .ok_or_else(|| Self::not_found("Cart item"))?;
        stored.quantity = entry.quantity;
        stored.selected = entry.selected;
        stored.updated_at = chrono::Utc::now();
        Ok(stored.clone())
    }

    async fn delete_cart_item(&mut self, id: Uuid) -> Result<(), AppError> {
        self.working.cart_items.retain(|ci| ci.id != id);
        Ok(())
    }

    async fn delete_cart(&mut self, user_id: Uuid) -> Result<(), AppError> {
        let cart_ids: Vec<Uuid> = self
            .working
            .carts
            .iter()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.id)
            .collect();
        self.working.cart_items.retain(|ci| !cart_ids.contains(&ci.cart_id));
        self.working.carts.retain(|c| c.user_id != user_id);
        Ok(())
    }

    async fn insert_order(&mut self, new: NewOrder) -> Result<Order, AppError> {
        let order = Order::from_new(new);
        self.working.orders.push(order.clone());
        Ok(order)
    }

    async fn find_order(&mut self, id: Uuid) -> Result<Option<Order>, AppError> {
        Ok(self.working.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn transition_order(
        &mut self,
        id: Uuid,
        current: OrderStatus,
        next: OrderStatus,
    ) -> Result<Option<Order>, AppError> {
        match self
            .working
            .orders
            .iter_mut()
            .find(|o| o.id == id && o.status == current)
        {
            Some(order) => {
                order.status = next;
                order.updated_at = chrono::Utc::now();
                Ok(Some(order.clone()))
            }
            None => Ok(None),
        }
    }

    async fn list_orders_by_user(&mut self, user_id: Uuid, pagination: Pagination) -> Result<Page<Order>, AppError> {
        let mut orders: Vec<Order> = self
            .working
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut orders, |o| o.created_at);

        let total = orders.len() as i64;
        Ok(Page::new(pagination.slice(&orders), total, pagination))
    }

    async fn list_orders_by_seller(
        &mut self,
        seller_id: Uuid,
        pagination: Pagination,
    ) -> Result<Page<Order>, AppError> {
        let mut orders: Vec<Order> = self
            .working
            .orders
            .iter()
            .filter(|o| self.seller_of(o.item_id) == Some(seller_id))
            .cloned()
            .collect();
        newest_first(&mut orders, |o| o.created_at);

        let total = orders.len() as i64;
        Ok(Page::new(pagination.slice(&orders), total, pagination))
    }

    async fn list_open_orders_by_user(&mut self, user_id: Uuid) -> Result<Vec<Order>, AppError> {
        Ok(self
            .working
            .orders
            .iter()
            .filter(|o| o.user_id == user_id && matches!(o.status, OrderStatus::Pending | OrderStatus::Approved))
            .cloned()
            .collect())
    }

    async fn delete_orders_by_user(&mut self, user_id: Uuid) -> Result<(), AppError> {
        self.working.orders.retain(|o| o.user_id != user_id);
        Ok(())
    }

    async fn insert_review(&mut self, new: NewReview) -> Result<Review, AppError> {
        if self
            .working
            .reviews
            .iter()
            .any(|r| r.is_written_by(new.user_id) && r.item_id == new.item_id)
        {
            return Err(AppError::Duplicate(ERROR_ALREADY_REVIEWED.to_string()));
        }
        let review = Review::from_new(new);
        self.working.reviews.push(review.clone());
        Ok(review)
    }

    async fn find_review(&mut self, id: Uuid) -> Result<Option<Review>, AppError> {
        Ok(self.working.reviews.iter().find(|r| r.id == id).cloned())
    }

    async fn find_review_by_user_item(&mut self, user_id: Uuid, item_id: Uuid) -> Result<Option<Review>, AppError> {
        Ok(self
            .working
            .reviews
            .iter()
            .find(|r| r.is_written_by(user_id) && r.item_id == item_id)
            .cloned())
    }

    async fn save_review(&mut self, review: &Review) -> Result<Review, AppError> {
        let stored = self
            .working
            .reviews
            .iter_mut()
            .find(|r| r.id == review.id)
            .ok_or_else(|| Self::not_found("Review"))?;
        stored.rating = review.rating;
        stored.comment = review.comment.clone();
        stored.updated_at = chrono::Utc::now();
        Ok(stored.clone())
    }

    async fn delete_review(&mut self, id: Uuid) -> Result<(), AppError> {
        self.working.reviews.retain(|r| r.id != id);
        Ok(())
    }

    async fn list_reviews_for_item(&mut self, item_id: Uuid) -> Result<Vec<Review>, AppError> {
        let mut reviews: Vec<Review> = self
            .working
            .reviews
            .iter()
            .filter(|r| r.item_id == item_id)
            .cloned()
            .collect();
        newest_first(&mut reviews, |r| r.created_at);
        Ok(reviews)
    }

    async fn delete_reviews_by_user(&mut self, user_id: Uuid) -> Result<(), AppError> {
        self.working.reviews.retain(|r| !r.is_written_by(user_id));
        Ok(())
    }

    async fn anonymize_reviews_by_user(&mut self, user_id: Uuid, comment: &str) -> Result<(), AppError> {
        for review in self.working.reviews.iter_mut().filter(|r| r.is_written_by(user_id)) {
            review.user_id = None;
            review.comment = comment.to_string();
            review.updated_at = chrono::Utc::now();
        }
        Ok(())
    }

    async fn insert_report(&mut self, new: NewReport) -> Result<Report, AppError> {
        if self.working.reports.iter().any(|r| {
            r.user_id == new.user_id && r.item_id == new.item_id && r.status == ReportStatus::Pending
        }) {
            return Err(AppError::Duplicate(ERROR_ALREADY_REPORTED.to_string()));
        }
        let report = Report::from_new(new);
        self.working.reports.push(report.clone());
        Ok(report)
    }

    async fn find_report(&mut self, id: Uuid) -> Result<Option<Report>, AppError> {
        Ok(self.working.reports.iter().find(|r| r.id == id).cloned())
    }

    async fn find_pending_report(&mut self, user_id: Uuid, item_id: Uuid) -> Result<Option<Report>, AppError> {
        Ok(self
            .working
            .reports
            .iter()
            .find(|r| r.user_id == user_id && r.item_id == item_id && r.status == ReportStatus::Pending)
            .cloned())
    }

    async fn save_report(&mut self, report: &Report) -> Result<Report, AppError> {
        let stored = self
            .working
            .reports
            .iter_mut()
            .find(|r| r.id == report.id)
            .ok_or_else(|| Self::not_found("Report"))?;
        stored.status = report.status;
        stored.admin_notes = report.admin_notes.clone();
        stored.reviewed_by = report.reviewed_by;
        stored.reviewed_at = report.reviewed_at;
        stored.updated_at = chrono::Utc::now();
        Ok(stored.clone())
    }

    async fn list_reports(
        &mut self,
        status: Option<ReportStatus>,
        pagination: Pagination,
    ) -> Result<Page<Report>, AppError> {
        let mut reports: Vec<Report> = self
            .working
            .reports
            .iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect();
        newest_first(&mut reports, |r| r.created_at);

        let total = reports.len() as i64;
        Ok(Page::new(pagination.slice(&reports), total, pagination))
    }

    async fn delete_reports_by_user(&mut self, user_id: Uuid) -> Result<(), AppError> {
        self.working.reports.retain(|r| r.user_id != user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn new_item(seller_id: Uuid, stock: i32) -> NewItem {
        NewItem {
            seller_id,
            name: "Linen shirt".to_string(),
            description: None,
            price: Decimal::from(20),
            stock,
            category: None,
        }
    }

    #[tokio::test]
    async fn dropped_unit_discards_writes() {
        let repo = MemoryRepository::new();

        let mut uow = repo.begin().await.unwrap();
        uow.insert_item(new_item(Uuid::new_v4(), 3)).await.unwrap();
        drop(uow);
        assert!(repo.snapshot().await.items.is_empty());

        let mut uow = repo.begin().await.unwrap();
        let item = uow.insert_item(new_item(Uuid::new_v4(), 3)).await.unwrap();
        uow.commit().await.unwrap();
        assert_eq!(repo.snapshot().await.items[0].id, item.id);
    }

    #[tokio::test]
    async fn decrement_refuses_to_go_negative() {
        let repo = MemoryRepository::new();
        let mut uow = repo.begin().await.unwrap();
        let item = uow.insert_item(new_item(Uuid::new_v4(), 2)).await.unwrap();

        assert!(!uow.decrement_stock(item.id, 3).await.unwrap());
        assert!(uow.decrement_stock(item.id, 2).await.unwrap());
        assert_eq!(uow.find_item(item.id).await.unwrap().unwrap().stock, 0);
        assert!(!uow.decrement_stock(Uuid::new_v4(), 1).await.unwrap());
    }

    #[tokio::test]
    async fn increment_refuses_to_overflow() {
        let repo = MemoryRepository::new();
        let mut uow = repo.begin().await.unwrap();
        let item = uow.insert_item(new_item(Uuid::new_v4(), i32::MAX - 1)).await.unwrap();

        uow.increment_stock(item.id, 1).await.unwrap();
        let err = uow.increment_stock(item.id, 1).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock(_)));
        assert_eq!(uow.find_item(item.id).await.unwrap().unwrap().stock, i32::MAX);
    }

    #[tokio::test]
    async fn deleting_a_user_anonymises_their_reviews() {
        let repo = MemoryRepository::new();
        let mut uow = repo.begin().await.unwrap();
        let (user_id, item_id) = (Uuid::new_v4(), Uuid::new_v4());
        let review = uow
            .insert_review(NewReview {
                user_id,
                item_id,
                rating: 4,
                comment: "Fits well".to_string(),
            })
            .await
            .unwrap();

        uow.delete_user(user_id).await.unwrap();
        let kept = uow.find_review(review.id).await.unwrap().unwrap();
        assert_eq!(kept.user_id, None);
        assert_eq!(kept.rating, 4);
        assert!(uow.find_review_by_user_item(user_id, item_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn only_one_pending_report_per_user_and_item() {
        let repo = MemoryRepository::new();
        let mut uow = repo.begin().await.unwrap();
        let (user_id, item_id) = (Uuid::new_v4(), Uuid::new_v4());
        let new_report = || NewReport {
            item_id,
            user_id,
            reason: "counterfeit".to_string(),
            description: None,
        };

        let mut report = uow.insert_report(new_report()).await.unwrap();
        assert!(matches!(uow.insert_report(new_report()).await, Err(AppError::Duplicate(_))));

        report.status = ReportStatus::Resolved;
        uow.save_report(&report).await.unwrap();
        assert!(uow.insert_report(new_report()).await.is_ok());
    }
}
