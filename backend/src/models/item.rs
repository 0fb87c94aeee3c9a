use chrono::{DateTime, Utc};
use marketplace_shared::{
    ItemQuery, ItemSort, ItemStatus, CATALOG_PAGE_SIZE, ERROR_DUPLICATE_VARIATION, ERROR_STOCK_OVERFLOW,
    MAX_PRICE_CENTS, PRICE_SCALE,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{Pagination, Review};
use crate::error::AppError;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub seller_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub status: ItemStatus,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ItemVariation {
    pub id: Uuid,
    pub item_id: Uuid,
    pub color: String,
    pub size: String,
    pub stock: i32,
    pub price_adjustment: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub seller_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub category: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewVariation {
    pub item_id: Uuid,
    pub color: String,
    pub size: String,
    pub stock: i32,
    pub price_adjustment: Decimal,
}

/// Catalog row with its aggregates.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ItemListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub item: Item,
    pub average_rating: f64,
    pub orders_count: i64,
}

/// Full product page.
#[derive(Debug, Clone, Serialize)]
pub struct ItemDetail {
    #[serde(flatten)]
    pub item: Item,
    pub average_rating: f64,
    pub variations: Vec<ItemVariation>,
    pub reviews: Vec<Review>,
}

#[derive(Debug, Clone)]
pub struct ItemFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub price_range: Option<(Decimal, Decimal)>,
    pub sort: ItemSort,
    pub pagination: Pagination,
}

impl ItemFilter {
    pub fn from_query(query: &ItemQuery) -> Self {
        let sort = query.sort_by.unwrap_or(match query.filter.as_deref() {
            Some("top_rated") => ItemSort::Rating,
            _ => ItemSort::DateDesc,
        });
        // Both bounds are needed for the price filter to apply.
        let price_range = match (query.min_price, query.max_price) {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        };

        Self {
            search: non_blank(query.search.as_deref()),
            category: non_blank(query.category.as_deref()),
            price_range,
            sort,
            pagination: Pagination::with_default(query.page, query.per_page, CATALOG_PAGE_SIZE),
        }
    }

    /// In-process equivalent of the SQL `WHERE` clause (status excluded).
    pub fn matches(&self, item: &Item) -> bool {
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_name = item.name.to_lowercase().contains(&needle);
            let in_description = item
                .description
                .as_deref()
                .map(|d| d.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !in_name && !in_description {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if item.category.as_deref() != Some(category.as_str()) {
                return false;
            }
        }
        if let Some((min, max)) = self.price_range {
            if item.price < min || item.price > max {
                return false;
            }
        }
        true
    }
}

/// Largest amount a NUMERIC(10,2) money column holds.
pub fn max_money() -> Decimal {
    Decimal::new(MAX_PRICE_CENTS, PRICE_SCALE)
}

/// Prices and adjustments must fit the money columns exactly, never rounded.
pub fn fits_money_column(amount: Decimal) -> bool {
    amount.abs() <= max_money() && amount.normalize().scale() <= PRICE_SCALE
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

const ITEM_COLUMNS: &str = "id, seller_id, name, description, price, stock, status, category, created_at, updated_at";

const LISTING_SELECT: &str = r#"
    SELECT i.id, i.seller_id, i.name, i.description, i.price, i.stock, i.status, i.category,
           i.created_at, i.updated_at,
           COALESCE(AVG(r.rating)::float8, 0) AS average_rating,
           (SELECT COUNT(*) FROM orders o WHERE o.item_id = i.id) AS orders_count
    FROM items i
    LEFT JOIN reviews r ON r.item_id = i.id
"#;

impl Item {
    pub fn from_new(new: NewItem) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            seller_id: Some(new.seller_id),
            name: new.name,
            description: new.description,
            price: new.price,
            stock: new.stock,
            status: ItemStatus::Active,
            category: new.category,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ItemStatus::Active
    }

    pub fn is_owned_by(&self, seller_id: Uuid) -> bool {
        self.seller_id == Some(seller_id)
    }

    pub async fn create(conn: &mut PgConnection, new: NewItem) -> Result<Self, AppError> {
        let item = Self::from_new(new);
        let item = sqlx::query_as::<_, Item>(&format!(
            "INSERT INTO items ({ITEM_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {ITEM_COLUMNS}"
        ))
        .bind(item.id)
        .bind(item.seller_id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(item.stock)
        .bind(item.status)
        .bind(&item.category)
        .bind(item.created_at)
        .bind(item.updated_at)
        .fetch_one(conn)
        .await?;
        Ok(item)
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, AppError> {
        let item = sqlx::query_as::<_, Item>(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"))
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(item)
    }

    /// Persist every mutable column of `item`. Stock is written as given;
    /// checkout and rejection use `decrease_stock` / `increase_stock` instead.
    pub async fn save(conn: &mut PgConnection, item: &Item) -> Result<Self, AppError> {
        let saved = sqlx::query_as::<_, Item>(&format!(
            r#"
            UPDATE items SET
                name = $2, description = $3, price = $4, stock = $5, status = $6, category = $7,
                seller_id = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(item.stock)
        .bind(item.status)
        .bind(&item.category)
        .bind(item.seller_id)
        .fetch_one(conn)
        .await?;
        Ok(saved)
    }

    /// Conditional decrement; `false` means the stock could not cover `amount`.
    pub async fn decrease_stock(conn: &mut PgConnection, id: Uuid, amount: i32) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE items
            SET stock = stock - $1, updated_at = NOW()
            WHERE id = $2 AND stock >= $1
            "#,
        )
        .bind(amount)
        .bind(id)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn increase_stock(conn: &mut PgConnection, id: Uuid, amount: i32) -> Result<(), AppError> {
        sqlx::query("UPDATE items SET stock = stock + $1, updated_at = NOW() WHERE id = $2")
            .bind(amount)
            .bind(id)
            .execute(conn)
            .await
            .map_err(stock_overflow)?;
        Ok(())
    }

    /// Detach a departing seller's items and take them off the catalog.
    pub async fn remove_by_seller(conn: &mut PgConnection, seller_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE items SET status = 'removed', seller_id = NULL, updated_at = NOW() WHERE seller_id = $1")
            .bind(seller_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn list_active(
        conn: &mut PgConnection,
        filter: &ItemFilter,
    ) -> Result<(Vec<ItemListing>, i64), AppError> {
        let mut query = QueryBuilder::<Postgres>::new(LISTING_SELECT);
        push_catalog_filters(&mut query, filter);
        query.push(" GROUP BY i.id ORDER BY ");
        query.push(order_clause(filter.sort));
        query
            .push(" LIMIT ")
            .push_bind(filter.pagination.limit())
            .push(" OFFSET ")
            .push_bind(filter.pagination.offset());

        let items = query.build_query_as::<ItemListing>().fetch_all(&mut *conn).await?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM items i");
        push_catalog_filters(&mut count, filter);
        let total: i64 = count.build_query_scalar::<i64>().fetch_one(&mut *conn).await?;

        Ok((items, total))
    }

    pub async fn list_by_seller(
        conn: &mut PgConnection,
        seller_id: Uuid,
        pagination: Pagination,
    ) -> Result<(Vec<ItemListing>, i64), AppError> {
        let mut query = QueryBuilder::<Postgres>::new(LISTING_SELECT);
        query
            .push(" WHERE i.seller_id = ")
            .push_bind(seller_id)
            .push(" GROUP BY i.id ORDER BY i.created_at DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let items = query.build_query_as::<ItemListing>().fetch_all(&mut *conn).await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE seller_id = $1")
            .bind(seller_id)
            .fetch_one(&mut *conn)
            .await?;

        Ok((items, total))
    }
}

impl ItemVariation {
    pub fn from_new(new: NewVariation) -> Self {
        Self {
            id: Uuid::new_v4(),
            item_id: new.item_id,
            color: new.color,
            size: new.size,
            stock: new.stock,
            price_adjustment: new.price_adjustment,
            created_at: Utc::now(),
        }
    }

    pub async fn create(conn: &mut PgConnection, new: NewVariation) -> Result<Self, AppError> {
        let variation = Self::from_new(new);
        let variation = sqlx::query_as::<_, ItemVariation>(
            r#"
            INSERT INTO item_variations (id, item_id, color, size, stock, price_adjustment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, item_id, color, size, stock, price_adjustment, created_at
            "#,
        )
        .bind(variation.id)
        .bind(variation.item_id)
        .bind(&variation.color)
        .bind(&variation.size)
        .bind(variation.stock)
        .bind(variation.price_adjustment)
        .bind(variation.created_at)
        .fetch_one(conn)
        .await
        .map_err(|e| super::unique_violation(e, ERROR_DUPLICATE_VARIATION))?;
        Ok(variation)
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, AppError> {
        let variation = sqlx::query_as::<_, ItemVariation>(
            "SELECT id, item_id, color, size, stock, price_adjustment, created_at FROM item_variations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;
        Ok(variation)
    }

    pub async fn save(conn: &mut PgConnection, variation: &ItemVariation) -> Result<Self, AppError> {
        let saved = sqlx::query_as::<_, ItemVariation>(
            r#"
            UPDATE item_variations SET color = $2, size = $3, stock = $4, price_adjustment = $5
            WHERE id = $1
            RETURNING id, item_id, color, size, stock, price_adjustment, created_at
            "#,
        )
        .bind(variation.id)
        .bind(&variation.color)
        .bind(&variation.size)
        .bind(variation.stock)
        .bind(variation.price_adjustment)
        .fetch_one(conn)
        .await
        .map_err(|e| super::unique_violation(e, ERROR_DUPLICATE_VARIATION))?;
        Ok(saved)
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM item_variations WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn find_by_item(conn: &mut PgConnection, item_id: Uuid) -> Result<Vec<Self>, AppError> {
        let variations = sqlx::query_as::<_, ItemVariation>(
            r#"
            SELECT id, item_id, color, size, stock, price_adjustment, created_at
            FROM item_variations
            WHERE item_id = $1
            ORDER BY color, size
            "#,
        )
        .bind(item_id)
        .fetch_all(conn)
        .await?;
        Ok(variations)
    }
}

// 22003 is numeric_value_out_of_range.
fn stock_overflow(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("22003") => {
            AppError::InsufficientStock(ERROR_STOCK_OVERFLOW.to_string())
        }
        _ => AppError::Database(err),
    }
}

fn push_catalog_filters(query: &mut QueryBuilder<'_, Postgres>, filter: &ItemFilter) {
    query.push(" WHERE i.status = 'active'");

    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        query
            .push(" AND (i.name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR i.description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(category) = &filter.category {
        query.push(" AND i.category = ").push_bind(category.clone());
    }
    if let Some((min, max)) = filter.price_range {
        query
            .push(" AND i.price BETWEEN ")
            .push_bind(min)
            .push(" AND ")
            .push_bind(max);
    }
}

fn order_clause(sort: ItemSort) -> &'static str {
    match sort {
        ItemSort::PriceAsc => "i.price ASC",
        ItemSort::PriceDesc => "i.price DESC",
        ItemSort::NameAsc => "i.name ASC",
        ItemSort::NameDesc => "i.name DESC",
        ItemSort::DateAsc => "i.created_at ASC",
        ItemSort::DateDesc => "i.created_at DESC",
        ItemSort::Rating => "average_rating DESC, i.created_at DESC",
    }
}
