use chrono::{DateTime, Utc};
use marketplace_shared::{OrderStatus, PaymentStatus, Variation, ERROR_TOTAL_TOO_LARGE};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgConnection, Row};
use uuid::Uuid;

use super::{max_money, Item, Pagination};
use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub quantity: i32,
    pub total_price: Decimal,
    pub shipping_address: String,
    pub variation: Option<Variation>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for Order {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let color: Option<String> = row.try_get("variation_color")?;
        let size: Option<String> = row.try_get("variation_size")?;
        let variation = match (color, size) {
            (Some(color), Some(size)) => Some(Variation { color, size }),
            _ => None,
        };

        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            item_id: row.try_get("item_id")?,
            quantity: row.try_get("quantity")?,
            total_price: row.try_get("total_price")?,
            shipping_address: row.try_get("shipping_address")?,
            variation,
            status: row.try_get("status")?,
            payment_status: row.try_get("payment_status")?,
            payment_method: row.try_get("payment_method")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub quantity: i32,
    pub total_price: Decimal,
    pub shipping_address: String,
    pub variation: Option<Variation>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub item: Option<Item>,
}

const ORDER_COLUMNS: &str = "id, user_id, item_id, quantity, total_price, shipping_address, \
    variation_color, variation_size, status, payment_status, payment_method, created_at, updated_at";

impl Order {
    /// Line total for `quantity` units; it must fit `orders.total_price`.
    pub fn total_for(price: Decimal, quantity: i32) -> Result<Decimal, AppError> {
        price
            .checked_mul(Decimal::from(quantity))
            .filter(|total| *total <= max_money())
            .ok_or_else(|| AppError::Validation(ERROR_TOTAL_TOO_LARGE.to_string()))
    }

    pub fn from_new(new: NewOrder) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            item_id: new.item_id,
            quantity: new.quantity,
            total_price: new.total_price,
            shipping_address: new.shipping_address,
            variation: new.variation,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            payment_method: new.payment_method,
            created_at: now,
            updated_at: now,
        }
    }

    pub async fn create(conn: &mut PgConnection, new: NewOrder) -> Result<Self, AppError> {
        let order = Self::from_new(new);
        let (color, size) = match &order.variation {
            Some(v) => (Some(v.color.clone()), Some(v.size.clone())),
            None => (None, None),
        };

        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders ({ORDER_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(order.id)
        .bind(order.user_id)
        .bind(order.item_id)
        .bind(order.quantity)
        .bind(order.total_price)
        .bind(&order.shipping_address)
        .bind(color)
        .bind(size)
        .bind(order.status)
        .bind(order.payment_status)
        .bind(&order.payment_method)
        .bind(order.created_at)
        .bind(order.updated_at)
        .fetch_one(conn)
        .await?;
        Ok(order)
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, AppError> {
        let order = sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(order)
    }

    /// Compare-and-set on the status column; `None` when the order is gone
    /// or no longer in `current`.
    pub async fn transition(
        conn: &mut PgConnection,
        id: Uuid,
        current: OrderStatus,
        next: OrderStatus,
    ) -> Result<Option<Self>, AppError> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET status = $1, updated_at = NOW() WHERE id = $2 AND status = $3 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(next)
        .bind(id)
        .bind(current)
        .fetch_optional(conn)
        .await?;
        Ok(order)
    }

    pub async fn list_by_user(
        conn: &mut PgConnection,
        user_id: Uuid,
        pagination: Pagination,
    ) -> Result<(Vec<Self>, i64), AppError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(user_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&mut *conn)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *conn)
            .await?;

        Ok((orders, total))
    }

    /// Orders placed against items the seller currently owns.
    pub async fn list_by_seller(
        conn: &mut PgConnection,
        seller_id: Uuid,
        pagination: Pagination,
    ) -> Result<(Vec<Self>, i64), AppError> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT o.id, o.user_id, o.item_id, o.quantity, o.total_price, o.shipping_address,
                   o.variation_color, o.variation_size, o.status, o.payment_status, o.payment_method,
                   o.created_at, o.updated_at
            FROM orders o
            JOIN items i ON i.id = o.item_id
            WHERE i.seller_id = $1
            ORDER BY o.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(seller_id)
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&mut *conn)
        .await?;

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders o JOIN items i ON i.id = o.item_id WHERE i.seller_id = $1",
        )
        .bind(seller_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok((orders, total))
    }

    /// Orders still holding reserved stock: pending and approved.
    pub async fn list_open_by_user(conn: &mut PgConnection, user_id: Uuid) -> Result<Vec<Self>, AppError> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 AND status IN ('pending', 'approved')"
        ))
        .bind(user_id)
        .fetch_all(conn)
        .await?;
        Ok(orders)
    }

    pub async fn delete_by_user(conn: &mut PgConnection, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM orders WHERE user_id = $1")
            .bind(user_id)
            .execute(conn)
            .await?;
        Ok(())
    }
}
