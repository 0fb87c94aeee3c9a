use actix_web::{get, post, web, HttpResponse};
use marketplace_shared::{LoginRequest, MessageResponse, RegisterRequest, UserRole, SUCCESS_LOGOUT};
use serde_json::json;

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::services::AuthService;

/// Register a customer, seller or admin account
#[post("/register/{role}")]
pub async fn register(
    auth_service: web::Data<AuthService>,
    role: web::Path<String>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let role: UserRole = role.parse().map_err(AppError::Validation)?;
    let response = auth_service.register(role, req.into_inner()).await?;
    Ok(HttpResponse::Created().json(response))
}

#[post("/login")]
pub async fn login(
    auth_service: web::Data<AuthService>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let response = auth_service.login(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/logout")]
pub async fn logout(auth_service: web::Data<AuthService>, user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    auth_service.logout(&user.claims)?;
    Ok(HttpResponse::Ok().json(MessageResponse::new(SUCCESS_LOGOUT)))
}

#[get("/me")]
pub async fn me(auth_service: web::Data<AuthService>, user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    let profile = auth_service.me(user.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "user": profile })))
}
