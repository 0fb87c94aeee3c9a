//! Database models for the marketplace
//!
//! Each model corresponds to a table and carries its Postgres queries.
//! Queries take a `&mut PgConnection` so they can run inside the
//! transaction owned by a unit of work.

pub mod address;
pub mod cart;
pub mod item;
pub mod order;
pub mod report;
pub mod review;
pub mod shop;
pub mod user;

pub use address::{Address, NewAddress};
pub use cart::{Cart, CartItem, CartLine, CartView, NewCartItem};
pub use item::{fits_money_column, max_money, Item, ItemDetail, ItemFilter, ItemListing, ItemVariation, NewItem, NewVariation};
pub use order::{NewOrder, Order, OrderDetail};
pub use report::{NewReport, Report};
pub use review::{NewReview, Review};
pub use shop::{NewShop, Shop};
pub use user::{NewUser, User, UserListing};

use crate::error::AppError;
use marketplace_shared::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Pagination helper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub per_page: i64,
}

impl Pagination {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self::with_default(page, per_page, DEFAULT_PAGE_SIZE)
    }

    pub fn with_default(page: Option<i64>, per_page: Option<i64>, default_per_page: i64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(default_per_page).clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    /// Slice an already ordered in-memory result set.
    pub fn slice<T: Clone>(&self, rows: &[T]) -> Vec<T> {
        rows.iter()
            .skip(self.offset() as usize)
            .take(self.limit() as usize)
            .cloned()
            .collect()
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// One page of rows plus the total row count.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: i64, pagination: Pagination) -> Self {
        Self {
            data,
            total,
            pagination,
        }
    }

    pub fn total_pages(&self) -> i64 {
        (self.total + self.pagination.per_page - 1) / self.pagination.per_page
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            pagination: self.pagination,
        }
    }

    pub fn into_response(self) -> marketplace_shared::PaginatedResponse<T> {
        let total_pages = self.total_pages();
        marketplace_shared::PaginatedResponse {
            data: self.data,
            total: self.total,
            page: self.pagination.page,
            per_page: self.pagination.per_page,
            total_pages,
        }
    }
}

/// Turn a unique-constraint violation into a `Duplicate` error.
pub(crate) fn unique_violation(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Duplicate(message.to_string()),
        _ => AppError::Database(err),
    }
}
