use actix_web::{delete, get, put, web, HttpResponse};
use marketplace_shared::{
    BusinessQuery, MessageResponse, RejectBusinessRequest, ReportQuery, ReviewReportRequest, UpdateUserRoleRequest,
    SUCCESS_BUSINESS_APPROVED, SUCCESS_BUSINESS_REJECTED, SUCCESS_REPORT_REVIEWED, SUCCESS_ROLE_UPDATED,
    SUCCESS_USER_DELETED,
};
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::services::{AdminService, ReportService};

#[get("/users")]
pub async fn list_users(admin: web::Data<AdminService>, user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    let users = admin.list_users(&user.actor()).await?;
    Ok(HttpResponse::Ok().json(json!({ "users": users })))
}

#[put("/users/{user_id}/role")]
pub async fn update_user_role(
    admin: web::Data<AdminService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateUserRoleRequest>,
) -> Result<HttpResponse, AppError> {
    let updated = admin
        .update_user_role(&user.actor(), path.into_inner(), req.role)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": SUCCESS_ROLE_UPDATED, "user": updated.to_response() })))
}

#[delete("/users/{user_id}")]
pub async fn delete_user(
    admin: web::Data<AdminService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    admin.delete_user(&user.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new(SUCCESS_USER_DELETED)))
}

/// Reports awaiting moderation (pending unless `status` says otherwise)
#[get("/reports")]
pub async fn list_reports(
    reports: web::Data<ReportService>,
    user: AuthenticatedUser,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, AppError> {
    let page = reports.list_reports(&user.actor(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(page.into_response()))
}

#[put("/reports/{report_id}/review")]
pub async fn review_report(
    reports: web::Data<ReportService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<ReviewReportRequest>,
) -> Result<HttpResponse, AppError> {
    let report = reports
        .review_report(&user.actor(), path.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": SUCCESS_REPORT_REVIEWED, "report": report })))
}

#[get("/businesses")]
pub async fn list_businesses(
    admin: web::Data<AdminService>,
    user: AuthenticatedUser,
    query: web::Query<BusinessQuery>,
) -> Result<HttpResponse, AppError> {
    let shops = admin.list_businesses(&user.actor(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "businesses": shops })))
}

#[get("/businesses/{shop_id}")]
pub async fn get_business(
    admin: web::Data<AdminService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let shop = admin.get_business(&user.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(shop))
}

#[put("/businesses/{shop_id}/approve")]
pub async fn approve_business(
    admin: web::Data<AdminService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let shop = admin.approve_business(&user.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": SUCCESS_BUSINESS_APPROVED, "business": shop })))
}

#[put("/businesses/{shop_id}/reject")]
pub async fn reject_business(
    admin: web::Data<AdminService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<RejectBusinessRequest>,
) -> Result<HttpResponse, AppError> {
    let shop = admin
        .reject_business(&user.actor(), path.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": SUCCESS_BUSINESS_REJECTED, "business": shop })))
}
