use chrono::{DateTime, Utc};
use marketplace_shared::Variation;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgConnection, Row};
use uuid::Uuid;

use super::Item;
use crate::error::AppError;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// One cart line, keyed by (cart, item, variation).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub item_id: Uuid,
    pub variation: Variation,
    pub quantity: i32,
    pub selected: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for CartItem {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            cart_id: row.try_get("cart_id")?,
            item_id: row.try_get("item_id")?,
            variation: Variation {
                color: row.try_get("color")?,
                size: row.try_get("size")?,
            },
            quantity: row.try_get("quantity")?,
            selected: row.try_get("selected")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewCartItem {
    pub cart_id: Uuid,
    pub item_id: Uuid,
    pub variation: Variation,
    pub quantity: i32,
}

/// A cart line joined with its item for display.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    #[serde(flatten)]
    pub entry: CartItem,
    pub item: Item,
    pub subtotal: Decimal,
}

impl CartLine {
    pub fn new(entry: CartItem, item: Item) -> Self {
        // Display only; checkout recomputes with a hard bound.
        let subtotal = item.price.saturating_mul(Decimal::from(entry.quantity));
        Self { entry, item, subtotal }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub cart_id: Uuid,
    pub items: Vec<CartLine>,
    pub total_quantity: i32,
    /// Sum over selected lines only; that is what checkout would charge.
    pub selected_total: Decimal,
}

impl CartView {
    pub fn new(cart: &Cart, items: Vec<CartLine>) -> Self {
        let total_quantity = items
            .iter()
            .fold(0i32, |total, line| total.saturating_add(line.entry.quantity));
        let selected_total = items
            .iter()
            .filter(|line| line.entry.selected)
            .fold(Decimal::ZERO, |total, line| total.saturating_add(line.subtotal));
        Self {
            cart_id: cart.id,
            items,
            total_quantity,
            selected_total,
        }
    }
}

const CART_ITEM_COLUMNS: &str = "id, cart_id, item_id, color, size, quantity, selected, created_at, updated_at";

impl Cart {
    pub fn for_user(user_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
        }
    }

    pub async fn find_by_user(conn: &mut PgConnection, user_id: Uuid) -> Result<Option<Self>, AppError> {
        let cart = sqlx::query_as::<_, Cart>("SELECT id, user_id, created_at FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(conn)
            .await?;
        Ok(cart)
    }

    /// Insert-or-fetch; concurrent first visits resolve to the same cart.
    pub async fn create(conn: &mut PgConnection, user_id: Uuid) -> Result<Self, AppError> {
        let cart = Self::for_user(user_id);
        let cart = sqlx::query_as::<_, Cart>(
            r#"
            INSERT INTO carts (id, user_id, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id, user_id, created_at
            "#,
        )
        .bind(cart.id)
        .bind(cart.user_id)
        .bind(cart.created_at)
        .fetch_one(conn)
        .await?;
        Ok(cart)
    }

    pub async fn delete_by_user(conn: &mut PgConnection, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM carts WHERE user_id = $1")
            .bind(user_id)
            .execute(conn)
            .await?;
        Ok(())
    }
}

impl CartItem {
    pub fn from_new(new: NewCartItem) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            cart_id: new.cart_id,
            item_id: new.item_id,
            variation: new.variation,
            quantity: new.quantity,
            selected: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub async fn list_by_cart(conn: &mut PgConnection, cart_id: Uuid) -> Result<Vec<Self>, AppError> {
        let items = sqlx::query_as::<_, CartItem>(&format!(
            "SELECT {CART_ITEM_COLUMNS} FROM cart_items WHERE cart_id = $1 ORDER BY created_at"
        ))
        .bind(cart_id)
        .fetch_all(conn)
        .await?;
        Ok(items)
    }

    pub async fn find(
        conn: &mut PgConnection,
        cart_id: Uuid,
        item_id: Uuid,
        variation: &Variation,
    ) -> Result<Option<Self>, AppError> {
        let item = sqlx::query_as::<_, CartItem>(&format!(
            "SELECT {CART_ITEM_COLUMNS} FROM cart_items \
             WHERE cart_id = $1 AND item_id = $2 AND color = $3 AND size = $4"
        ))
        .bind(cart_id)
        .bind(item_id)
        .bind(&variation.color)
        .bind(&variation.size)
        .fetch_optional(conn)
        .await?;
        Ok(item)
    }

    pub async fn create(conn: &mut PgConnection, new: NewCartItem) -> Result<Self, AppError> {
        let entry = Self::from_new(new);
        let entry = sqlx::query_as::<_, CartItem>(&format!(
            "INSERT INTO cart_items ({CART_ITEM_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {CART_ITEM_COLUMNS}"
        ))
        .bind(entry.id)
        .bind(entry.cart_id)
        .bind(entry.item_id)
        .bind(&entry.variation.color)
        .bind(&entry.variation.size)
        .bind(entry.quantity)
        .bind(entry.selected)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .fetch_one(conn)
        .await?;
        Ok(entry)
    }

    pub async fn save(conn: &mut PgConnection, entry: &CartItem) -> Result<Self, AppError> {
        let saved = sqlx::query_as::<_, CartItem>(&format!(
            "UPDATE cart_items SET quantity = $2, selected = $3, updated_at = NOW() \
             WHERE id = $1 RETURNING {CART_ITEM_COLUMNS}"
        ))
        .bind(entry.id)
        .bind(entry.quantity)
        .bind(entry.selected)
        .fetch_one(conn)
        .await?;
        Ok(saved)
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM cart_items WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }
}
