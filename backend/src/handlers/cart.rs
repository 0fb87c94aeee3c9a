use actix_web::{delete, get, post, put, web, HttpResponse};
use marketplace_shared::{
    AddToCartRequest, CheckoutRequest, MessageResponse, RemoveFromCartRequest, UpdateCartItemRequest,
    SUCCESS_CART_ADDED, SUCCESS_CART_REMOVED, SUCCESS_CART_UPDATED, SUCCESS_CHECKOUT,
};
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::services::CartService;

#[get("")]
pub async fn get_cart(cart: web::Data<CartService>, user: AuthenticatedUser) -> Result<HttpResponse, AppError> {
    let view = cart.get_cart(&user.actor()).await?;
    Ok(HttpResponse::Ok().json(view))
}

#[post("/add")]
pub async fn add_to_cart(
    cart: web::Data<CartService>,
    user: AuthenticatedUser,
    req: web::Json<AddToCartRequest>,
) -> Result<HttpResponse, AppError> {
    let line = cart.add_to_cart(&user.actor(), req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": SUCCESS_CART_ADDED, "cart_item": line })))
}

#[put("/update/{item_id}")]
pub async fn update_cart_item(
    cart: web::Data<CartService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let line = cart
        .update_cart_item(&user.actor(), path.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": SUCCESS_CART_UPDATED, "cart_item": line })))
}

#[delete("/remove/{item_id}")]
pub async fn remove_from_cart(
    cart: web::Data<CartService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<RemoveFromCartRequest>,
) -> Result<HttpResponse, AppError> {
    cart.remove_from_cart(&user.actor(), path.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new(SUCCESS_CART_REMOVED)))
}

/// Turn every selected cart line into an order
#[post("/checkout")]
pub async fn checkout(
    cart: web::Data<CartService>,
    user: AuthenticatedUser,
    req: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let orders = cart.checkout(&user.actor(), req.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({ "message": SUCCESS_CHECKOUT, "orders": orders })))
}
