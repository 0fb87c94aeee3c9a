use chrono::{DateTime, Utc};
use marketplace_shared::ERROR_ALREADY_REVIEWED;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use super::unique_violation;
use crate::error::AppError;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    /// `None` once the author has deleted their account.
    pub user_id: Option<Uuid>,
    pub item_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub rating: i32,
    pub comment: String,
}

const REVIEW_COLUMNS: &str = "id, user_id, item_id, rating, comment, created_at, updated_at";

impl Review {
    pub fn from_new(new: NewReview) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id: Some(new.user_id),
            item_id: new.item_id,
            rating: new.rating,
            comment: new.comment,
            created_at: now,
            updated_at: now,
        }
    }

    pub async fn create(conn: &mut PgConnection, new: NewReview) -> Result<Self, AppError> {
        let review = Self::from_new(new);
        sqlx::query_as::<_, Review>(&format!(
            "INSERT INTO reviews ({REVIEW_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(review.id)
        .bind(review.user_id)
        .bind(review.item_id)
        .bind(review.rating)
        .bind(&review.comment)
        .bind(review.created_at)
        .bind(review.updated_at)
        .fetch_one(conn)
        .await
        .map_err(|e| unique_violation(e, ERROR_ALREADY_REVIEWED))
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, AppError> {
        let review = sqlx::query_as::<_, Review>(&format!("SELECT {REVIEW_COLUMNS} FROM reviews WHERE id = $1"))
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(review)
    }

    pub async fn find_by_user_and_item(
        conn: &mut PgConnection,
        user_id: Uuid,
        item_id: Uuid,
    ) -> Result<Option<Self>, AppError> {
        let review = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE user_id = $1 AND item_id = $2"
        ))
        .bind(user_id)
        .bind(item_id)
        .fetch_optional(conn)
        .await?;
        Ok(review)
    }

    pub async fn list_by_item(conn: &mut PgConnection, item_id: Uuid) -> Result<Vec<Self>, AppError> {
        let reviews = sqlx::query_as::<_, Review>(&format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE item_id = $1 ORDER BY created_at DESC"
        ))
        .bind(item_id)
        .fetch_all(conn)
        .await?;
        Ok(reviews)
    }

    pub async fn save(conn: &mut PgConnection, review: &Review) -> Result<Self, AppError> {
        let saved = sqlx::query_as::<_, Review>(&format!(
            "UPDATE reviews SET rating = $2, comment = $3, updated_at = NOW() WHERE id = $1 RETURNING {REVIEW_COLUMNS}"
        ))
        .bind(review.id)
        .bind(review.rating)
        .bind(&review.comment)
        .fetch_one(conn)
        .await?;
        Ok(saved)
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn delete_by_user(conn: &mut PgConnection, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM reviews WHERE user_id = $1")
            .bind(user_id)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn anonymize_by_user(conn: &mut PgConnection, user_id: Uuid, comment: &str) -> Result<(), AppError> {
        sqlx::query("UPDATE reviews SET user_id = NULL, comment = $2, updated_at = NOW() WHERE user_id = $1")
            .bind(user_id)
            .bind(comment)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub fn is_written_by(&self, user_id: Uuid) -> bool {
        self.user_id == Some(user_id)
    }

    /// Mean rating, or 0 when there are no reviews.
    pub fn average(reviews: &[Review]) -> f64 {
        if reviews.is_empty() {
            return 0.0;
        }
        let sum: i64 = reviews.iter().map(|r| i64::from(r.rating)).sum();
        sum as f64 / reviews.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_of_no_reviews_is_zero() {
        assert_eq!(Review::average(&[]), 0.0);

        let item_id = Uuid::new_v4();
        let reviews: Vec<Review> = [5, 4]
            .iter()
            .map(|&rating| {
                Review::from_new(NewReview {
                    user_id: Uuid::new_v4(),
                    item_id,
                    rating,
                    comment: "ok".to_string(),
                })
            })
            .collect();
        assert_eq!(Review::average(&reviews), 4.5);
    }
}
