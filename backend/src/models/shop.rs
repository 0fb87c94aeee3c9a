use chrono::{DateTime, Utc};
use marketplace_shared::ShopApproval;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::error::AppError;

/// A seller's business profile, subject to admin approval.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Shop {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub approval_status: ShopApproval,
    pub approval_date: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewShop {
    pub user_id: Uuid,
    pub name: String,
    pub is_active: bool,
}

impl NewShop {
    /// Placeholder shop named after its owner.
    pub fn placeholder(user_id: Uuid, owner_name: &str, is_active: bool) -> Self {
        Self {
            user_id,
            name: format!("{}'s Shop", owner_name),
            is_active,
        }
    }
}

const SHOP_COLUMNS: &str = "id, user_id, name, description, contact_email, contact_phone, address, \
    is_active, approval_status, approval_date, approved_by, rejection_reason, created_at, updated_at";

impl Shop {
    pub fn from_new(new: NewShop) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            name: new.name,
            description: None,
            contact_email: None,
            contact_phone: None,
            address: None,
            is_active: new.is_active,
            approval_status: ShopApproval::Pending,
            approval_date: None,
            approved_by: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub async fn create(conn: &mut PgConnection, new: NewShop) -> Result<Self, AppError> {
        let shop = Self::from_new(new);
        let shop = sqlx::query_as::<_, Shop>(&format!(
            "INSERT INTO shops ({SHOP_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {SHOP_COLUMNS}"
        ))
        .bind(shop.id)
        .bind(shop.user_id)
        .bind(&shop.name)
        .bind(&shop.description)
        .bind(&shop.contact_email)
        .bind(&shop.contact_phone)
        .bind(&shop.address)
        .bind(shop.is_active)
        .bind(shop.approval_status)
        .bind(shop.approval_date)
        .bind(shop.approved_by)
        .bind(&shop.rejection_reason)
        .bind(shop.created_at)
        .bind(shop.updated_at)
        .fetch_one(conn)
        .await?;
        Ok(shop)
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, AppError> {
        let shop = sqlx::query_as::<_, Shop>(&format!("SELECT {SHOP_COLUMNS} FROM shops WHERE id = $1"))
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(shop)
    }

    pub async fn find_by_user(conn: &mut PgConnection, user_id: Uuid) -> Result<Option<Self>, AppError> {
        let shop = sqlx::query_as::<_, Shop>(&format!("SELECT {SHOP_COLUMNS} FROM shops WHERE user_id = $1"))
            .bind(user_id)
            .fetch_optional(conn)
            .await?;
        Ok(shop)
    }

    pub async fn list(conn: &mut PgConnection, approval: Option<ShopApproval>) -> Result<Vec<Self>, AppError> {
        let shops = match approval {
            Some(approval) => {
                sqlx::query_as::<_, Shop>(&format!(
                    "SELECT {SHOP_COLUMNS} FROM shops WHERE approval_status = $1 ORDER BY created_at DESC"
                ))
                .bind(approval)
                .fetch_all(conn)
                .await?
            }
            None => {
                sqlx::query_as::<_, Shop>(&format!("SELECT {SHOP_COLUMNS} FROM shops ORDER BY created_at DESC"))
                    .fetch_all(conn)
                    .await?
            }
        };
        Ok(shops)
    }

    /// Persist every mutable column of `shop`.
    pub async fn save(conn: &mut PgConnection, shop: &Shop) -> Result<Self, AppError> {
        let saved = sqlx::query_as::<_, Shop>(&format!(
            r#"
            UPDATE shops SET
                name = $2, description = $3, contact_email = $4, contact_phone = $5, address = $6,
                is_active = $7, approval_status = $8, approval_date = $9, approved_by = $10,
                rejection_reason = $11, updated_at = NOW()
            WHERE id = $1
            RETURNING {SHOP_COLUMNS}
            "#
        ))
        .bind(shop.id)
        .bind(&shop.name)
        .bind(&shop.description)
        .bind(&shop.contact_email)
        .bind(&shop.contact_phone)
        .bind(&shop.address)
        .bind(shop.is_active)
        .bind(shop.approval_status)
        .bind(shop.approval_date)
        .bind(shop.approved_by)
        .bind(&shop.rejection_reason)
        .fetch_one(conn)
        .await?;
        Ok(saved)
    }

    pub async fn delete_by_user(conn: &mut PgConnection, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM shops WHERE user_id = $1")
            .bind(user_id)
            .execute(conn)
            .await?;
        Ok(())
    }
}
