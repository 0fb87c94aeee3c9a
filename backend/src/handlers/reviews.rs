use actix_web::{delete, post, put, web, HttpResponse};
use marketplace_shared::{
    MessageResponse, ReportItemRequest, ReviewRequest, SUCCESS_REPORT_CREATED, SUCCESS_REVIEW_CREATED,
    SUCCESS_REVIEW_DELETED, SUCCESS_REVIEW_UPDATED,
};
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::services::{ReportService, ReviewService};

#[post("/items/{item_id}/reviews")]
pub async fn add_review(
    reviews: web::Data<ReviewService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<ReviewRequest>,
) -> Result<HttpResponse, AppError> {
    let review = reviews
        .add_review(&user.actor(), path.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(json!({ "message": SUCCESS_REVIEW_CREATED, "review": review })))
}

#[put("/reviews/{review_id}")]
pub async fn update_review(
    reviews: web::Data<ReviewService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<ReviewRequest>,
) -> Result<HttpResponse, AppError> {
    let review = reviews
        .update_review(&user.actor(), path.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": SUCCESS_REVIEW_UPDATED, "review": review })))
}

#[delete("/reviews/{review_id}")]
pub async fn delete_review(
    reviews: web::Data<ReviewService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    reviews.delete_review(&user.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new(SUCCESS_REVIEW_DELETED)))
}

/// Flag an item for moderation
#[post("/items/{item_id}/report")]
pub async fn report_item(
    reports: web::Data<ReportService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<ReportItemRequest>,
) -> Result<HttpResponse, AppError> {
    let report = reports
        .report_item(&user.actor(), path.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(json!({ "message": SUCCESS_REPORT_CREATED, "report": report })))
}
