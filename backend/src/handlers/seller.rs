use actix_web::{get, put, web, HttpResponse};
use marketplace_shared::{UpdateShopRequest, SUCCESS_PROFILE_UPDATED};
use serde_json::json;

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::services::SellerService;

#[get("/profile")]
pub async fn get_profile(seller: web::Data<SellerService>, user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    let profile = seller.get_profile(&user.actor()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

#[put("/profile")]
pub async fn update_profile(
    seller: web::Data<SellerService>,
    user: AuthenticatedUser,
    req: web::Json<UpdateShopRequest>,
) -> Result<HttpResponse, AppError> {
    let shop = seller.update_profile(&user.actor(), req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": SUCCESS_PROFILE_UPDATED, "shop": shop })))
}
