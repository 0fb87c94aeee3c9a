use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use crate::error::AppError;

/// One entry of a customer's address book.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Address {
    pub id: Uuid,
    pub user_id: Uuid,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewAddress {
    pub user_id: Uuid,
    pub address_line1: String,
    pub address_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub is_default: bool,
}

const ADDRESS_COLUMNS: &str = "id, user_id, address_line1, address_line2, city, state, postal_code, country, \
    is_default, created_at, updated_at";

impl Address {
    pub fn from_new(new: NewAddress) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            address_line1: new.address_line1,
            address_line2: new.address_line2,
            city: new.city,
            state: new.state,
            postal_code: new.postal_code,
            country: new.country,
            is_default: new.is_default,
            created_at: now,
            updated_at: now,
        }
    }

    pub async fn create(conn: &mut PgConnection, new: NewAddress) -> Result<Self, AppError> {
        let address = Self::from_new(new);
        let address = sqlx::query_as::<_, Address>(&format!(
            "INSERT INTO user_addresses ({ADDRESS_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {ADDRESS_COLUMNS}"
        ))
        .bind(address.id)
        .bind(address.user_id)
        .bind(&address.address_line1)
        .bind(&address.address_line2)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.postal_code)
        .bind(&address.country)
        .bind(address.is_default)
        .bind(address.created_at)
        .bind(address.updated_at)
        .fetch_one(conn)
        .await?;
        Ok(address)
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, AppError> {
        let address =
            sqlx::query_as::<_, Address>(&format!("SELECT {ADDRESS_COLUMNS} FROM user_addresses WHERE id = $1"))
                .bind(id)
                .fetch_optional(conn)
                .await?;
        Ok(address)
    }

    /// Default address first, then oldest first.
    pub async fn list_by_user(conn: &mut PgConnection, user_id: Uuid) -> Result<Vec<Self>, AppError> {
        let addresses = sqlx::query_as::<_, Address>(&format!(
            "SELECT {ADDRESS_COLUMNS} FROM user_addresses WHERE user_id = $1 ORDER BY is_default DESC, created_at"
        ))
        .bind(user_id)
        .fetch_all(conn)
        .await?;
        Ok(addresses)
    }

    pub async fn save(conn: &mut PgConnection, address: &Address) -> Result<Self, AppError> {
        let saved = sqlx::query_as::<_, Address>(&format!(
            r#"
            UPDATE user_addresses SET
                address_line1 = $2, address_line2 = $3, city = $4, state = $5, postal_code = $6,
                country = $7, is_default = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING {ADDRESS_COLUMNS}
            "#
        ))
        .bind(address.id)
        .bind(&address.address_line1)
        .bind(&address.address_line2)
        .bind(&address.city)
        .bind(&address.state)
        .bind(&address.postal_code)
        .bind(&address.country)
        .bind(address.is_default)
        .fetch_one(conn)
        .await?;
        Ok(saved)
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_addresses WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn clear_default(conn: &mut PgConnection, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE user_addresses SET is_default = FALSE, updated_at = NOW() WHERE user_id = $1 AND is_default")
            .bind(user_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn delete_by_user(conn: &mut PgConnection, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM user_addresses WHERE user_id = $1")
            .bind(user_id)
            .execute(conn)
            .await?;
        Ok(())
    }
}
