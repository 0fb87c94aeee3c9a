use actix_web::{delete, get, post, put, web, HttpResponse};
use marketplace_shared::{
    CreateItemRequest, CreateVariationRequest, ItemQuery, MessageResponse, PageQuery, UpdateItemRequest,
    UpdateVariationRequest, SUCCESS_ITEM_CREATED, SUCCESS_ITEM_DELETED, SUCCESS_ITEM_UPDATED,
    SUCCESS_VARIATION_ADDED, SUCCESS_VARIATION_DELETED, SUCCESS_VARIATION_UPDATED,
};
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::services::CatalogService;

/// Browse active items
#[get("/items")]
pub async fn list_items(
    catalog: web::Data<CatalogService>,
    query: web::Query<ItemQuery>,
) -> Result<HttpResponse, AppError> {
    let page = catalog.list_items(&query).await?;
    Ok(HttpResponse::Ok().json(page.into_response()))
}

#[get("/items/{item_id}")]
pub async fn get_item(catalog: web::Data<CatalogService>, path: web::Path<Uuid>) -> Result<HttpResponse, AppError> {
    let item = catalog.get_item(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(item))
}

#[post("/items")]
pub async fn create_item(
    catalog: web::Data<CatalogService>,
    user: AuthenticatedUser,
    req: web::Json<CreateItemRequest>,
) -> Result<HttpResponse, AppError> {
    let item = catalog.create_item(&user.actor(), req.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({ "message": SUCCESS_ITEM_CREATED, "item": item })))
}

#[put("/items/{item_id}")]
pub async fn update_item(
    catalog: web::Data<CatalogService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateItemRequest>,
) -> Result<HttpResponse, AppError> {
    let item = catalog
        .update_item(&user.actor(), path.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": SUCCESS_ITEM_UPDATED, "item": item })))
}

#[delete("/items/{item_id}")]
pub async fn delete_item(
    catalog: web::Data<CatalogService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    catalog.delete_item(&user.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new(SUCCESS_ITEM_DELETED)))
}

/// The seller's own items in every status
#[get("/items")]
pub async fn seller_items(
    catalog: web::Data<CatalogService>,
    user: AuthenticatedUser,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, AppError> {
    let page = catalog.seller_items(&user.actor(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(page.into_response()))
}

#[post("/items/{item_id}/variations")]
pub async fn add_variation(
    catalog: web::Data<CatalogService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<CreateVariationRequest>,
) -> Result<HttpResponse, AppError> {
    let variation = catalog
        .add_variation(&user.actor(), path.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(json!({ "message": SUCCESS_VARIATION_ADDED, "variation": variation })))
}

#[put("/items/{item_id}/variations/{variation_id}")]
pub async fn update_variation(
    catalog: web::Data<CatalogService>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
    req: web::Json<UpdateVariationRequest>,
) -> Result<HttpResponse, AppError> {
    let (item_id, variation_id) = path.into_inner();
    let variation = catalog
        .update_variation(&user.actor(), item_id, variation_id, req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": SUCCESS_VARIATION_UPDATED, "variation": variation })))
}

#[delete("/items/{item_id}/variations/{variation_id}")]
pub async fn delete_variation(
    catalog: web::Data<CatalogService>,
    user: AuthenticatedUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (item_id, variation_id) = path.into_inner();
    catalog.delete_variation(&user.actor(), item_id, variation_id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new(SUCCESS_VARIATION_DELETED)))
}
