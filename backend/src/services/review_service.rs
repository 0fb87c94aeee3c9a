use std::sync::Arc;

use marketplace_shared::{ReviewRequest, ERROR_ALREADY_REVIEWED, ERROR_ITEM_NOT_FOUND};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::Actor;
use crate::error::AppError;
use crate::models::{NewReview, Review};
use crate::repositories::{finish, Repository, UnitOfWork};

const ERROR_REVIEW_NOT_FOUND: &str = "Review not found";

#[derive(Clone)]
pub struct ReviewService {
    repo: Arc<dyn Repository>,
}

impl ReviewService {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// One review per user and item.
    pub async fn add_review(&self, actor: &Actor, item_id: Uuid, request: ReviewRequest) -> Result<Review, AppError> {
        request.validate()?;

        let mut uow = self.repo.begin().await?;
        let result = Self::add_in(uow.as_mut(), actor.user_id, item_id, request).await;
        let review = finish(uow, result).await?;

        info!(review_id = %review.id, item_id = %item_id, rating = review.rating, "Review added");
        Ok(review)
    }

    async fn add_in(
        uow: &mut dyn UnitOfWork,
        user_id: Uuid,
        item_id: Uuid,
        request: ReviewRequest,
    ) -> Result<Review, AppError> {
        if uow.find_item(item_id).await?.is_none() {
            return Err(AppError::NotFound(ERROR_ITEM_NOT_FOUND.to_string()));
        }
        if uow.find_review_by_user_item(user_id, item_id).await?.is_some() {
            return Err(AppError::Duplicate(ERROR_ALREADY_REVIEWED.to_string()));
        }

        uow.insert_review(NewReview {
            user_id,
            item_id,
            rating: request.rating,
            comment: request.comment,
        })
        .await
    }

    pub async fn update_review(
        &self,
        actor: &Actor,
        review_id: Uuid,
        request: ReviewRequest,
    ) -> Result<Review, AppError> {
        request.validate()?;

        let mut uow = self.repo.begin().await?;
        let result = async {
            let mut review = Self::own_review(uow.as_mut(), actor.user_id, review_id).await?;
            review.rating = request.rating;
            review.comment = request.comment;
            uow.save_review(&review).await
        }
        .await;
        finish(uow, result).await
    }

    pub async fn delete_review(&self, actor: &Actor, review_id: Uuid) -> Result<(), AppError> {
        let mut uow = self.repo.begin().await?;
        let result = async {
            let review = Self::own_review(uow.as_mut(), actor.user_id, review_id).await?;
            uow.delete_review(review.id).await
        }
        .await;
        finish(uow, result).await?;

        info!(review_id = %review_id, "Review deleted");
        Ok(())
    }

    // Someone else's review is reported as missing.
    async fn own_review(uow: &mut dyn UnitOfWork, user_id: Uuid, review_id: Uuid) -> Result<Review, AppError> {
        uow.find_review(review_id)
            .await?
            .filter(|review| review.is_written_by(user_id))
            .ok_or_else(|| AppError::NotFound(ERROR_REVIEW_NOT_FOUND.to_string()))
    }
}
