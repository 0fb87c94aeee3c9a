use actix_web::{get, post, put, web, HttpResponse};
use marketplace_shared::{PageQuery, PlaceOrderRequest, UpdateOrderStatusRequest, SUCCESS_ORDER_PLACED, SUCCESS_ORDER_STATUS};
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::services::OrderService;

/// Buy a single item directly, bypassing the cart
#[post("/items/{item_id}/orders")]
pub async fn place_order(
    orders: web::Data<OrderService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<PlaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let order = orders
        .place_order(&user.actor(), path.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(json!({ "message": SUCCESS_ORDER_PLACED, "order": order })))
}

#[get("/orders")]
pub async fn list_orders(
    orders: web::Data<OrderService>,
    user: AuthenticatedUser,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let page = orders.list_orders(&user.actor(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(page.into_response()))
}

#[get("/orders/{order_id}")]
pub async fn get_order(
    orders: web::Data<OrderService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order = orders.get_order(&user.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(order))
}

#[put("/orders/{order_id}/status")]
pub async fn update_order_status(
    orders: web::Data<OrderService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateOrderStatusRequest>,
) -> Result<HttpResponse, AppError> {
    let order = orders
        .update_order_status(&user.actor(), path.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": SUCCESS_ORDER_STATUS, "order": order })))
}

/// Orders placed against the seller's items
#[get("/orders")]
pub async fn seller_orders(
    orders: web::Data<OrderService>,
    user: AuthenticatedUser,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let page = orders.seller_orders(&user.actor(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(page.into_response()))
}
