use actix_web::{delete, get, post, put, web, HttpResponse};
use marketplace_shared::{
    AddressRequest, DeleteAccountRequest, MessageResponse, UpdateAddressRequest, SUCCESS_ACCOUNT_DELETED,
    SUCCESS_ADDRESS_ADDED, SUCCESS_ADDRESS_DELETED, SUCCESS_ADDRESS_UPDATED,
};
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::services::AccountService;

#[get("/addresses")]
pub async fn list_addresses(
    accounts: web::Data<AccountService>,
    user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
    let addresses = accounts.list_addresses(&user.actor()).await?;
    Ok(HttpResponse::Ok().json(addresses))
}

#[post("/addresses")]
pub async fn add_address(
    accounts: web::Data<AccountService>,
    user: AuthenticatedUser,
    req: web::Json<AddressRequest>,
) -> Result<HttpResponse, AppError> {
    let address = accounts.add_address(&user.actor(), req.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({ "message": SUCCESS_ADDRESS_ADDED, "address": address })))
}

#[put("/addresses/{address_id}")]
pub async fn update_address(
    accounts: web::Data<AccountService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
    req: web::Json<UpdateAddressRequest>,
) -> Result<HttpResponse, AppError> {
    let address = accounts
        .update_address(&user.actor(), path.into_inner(), req.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": SUCCESS_ADDRESS_UPDATED, "address": address })))
}

#[delete("/addresses/{address_id}")]
pub async fn delete_address(
    accounts: web::Data<AccountService>,
    user: AuthenticatedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    accounts.delete_address(&user.actor(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new(SUCCESS_ADDRESS_DELETED)))
}

/// Delete the caller's own account; the password is asked for again.
#[delete("")]
pub async fn delete_account(
    accounts: web::Data<AccountService>,
    user: AuthenticatedUser,
    req: web::Json<DeleteAccountRequest>,
) -> Result<HttpResponse, AppError> {
    accounts.delete_account(&user.actor(), req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new(SUCCESS_ACCOUNT_DELETED)))
}
