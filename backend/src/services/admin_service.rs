use std::sync::Arc;

use chrono::Utc;
use marketplace_shared::{BusinessQuery, RejectBusinessRequest, ShopApproval, UserRole};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::account_service::{purge_user, AuthoredReviews};
use super::Actor;
use crate::error::AppError;
use crate::models::{NewShop, Shop, User, UserListing};
use crate::repositories::{finish, Repository, UnitOfWork};

const ERROR_USER_NOT_FOUND: &str = "User not found";
const ERROR_BUSINESS_NOT_FOUND: &str = "Business not found";

/// User and business administration. Every operation requires an admin.
#[derive(Clone)]
pub struct AdminService {
    repo: Arc<dyn Repository>,
}

impl AdminService {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    pub async fn list_users(&self, actor: &Actor) -> Result<Vec<UserListing>, AppError> {
        actor.require(UserRole::Admin)?;
        let mut uow = self.repo.begin().await?;
        let result = uow.list_users().await;
        finish(uow, result).await
    }

    /// Change a user's role and keep their shop consistent with it.
    pub async fn update_user_role(&self, actor: &Actor, user_id: Uuid, role: UserRole) -> Result<User, AppError> {
        actor.require(UserRole::Admin)?;

        let mut uow = self.repo.begin().await?;
        let result = Self::update_role_in(uow.as_mut(), user_id, role).await;
        let user = finish(uow, result).await.map_err(|err| {
            warn!(user_id = %user_id, error = %err, "Failed to update user role");
            err
        })?;

        info!(user_id = %user_id, role = %role, "User role updated");
        Ok(user)
    }

    async fn update_role_in(uow: &mut dyn UnitOfWork, user_id: Uuid, role: UserRole) -> Result<User, AppError> {
        let mut user = uow
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(ERROR_USER_NOT_FOUND.to_string()))?;
        let old_role = user.role;
        uow.update_user_role(user_id, role).await?;

        if old_role == UserRole::Seller && role != UserRole::Seller {
            if let Some(mut shop) = uow.find_shop_by_user(user_id).await? {
                shop.is_active = false;
                uow.save_shop(&shop).await?;
            }
        } else if old_role != UserRole::Seller && role == UserRole::Seller {
            if uow.find_shop_by_user(user_id).await?.is_none() {
                uow.insert_shop(NewShop::placeholder(user_id, &user.name, true)).await?;
            }
        }

        user.role = role;
        Ok(user)
    }

    /// Delete a user together with everything they own, reviews included.
    ///
    /// Stock held by their pending and approved orders goes back on sale.
    pub async fn delete_user(&self, actor: &Actor, user_id: Uuid) -> Result<(), AppError> {
        actor.require(UserRole::Admin)?;
        if actor.user_id == user_id {
            return Err(AppError::InvalidState("Admins cannot delete their own account".to_string()));
        }

        let mut uow = self.repo.begin().await?;
        let result = Self::delete_user_in(uow.as_mut(), user_id).await;
        finish(uow, result).await?;

        info!(user_id = %user_id, "User deleted");
        Ok(())
    }

    async fn delete_user_in(uow: &mut dyn UnitOfWork, user_id: Uuid) -> Result<(), AppError> {
        if uow.find_user(user_id).await?.is_none() {
            return Err(AppError::NotFound(ERROR_USER_NOT_FOUND.to_string()));
        }
        purge_user(uow, user_id, AuthoredReviews::Delete).await
    }

    /// Shops filtered by approval status (`all` by default).
    pub async fn list_businesses(&self, actor: &Actor, query: BusinessQuery) -> Result<Vec<Shop>, AppError> {
        actor.require(UserRole::Admin)?;
        let approval = match query.status.as_deref().unwrap_or("all") {
            "all" => None,
            "pending" => Some(ShopApproval::Pending),
            "approved" => Some(ShopApproval::Approved),
            "rejected" => Some(ShopApproval::Rejected),
            other => return Err(AppError::Validation(format!("Unknown business status '{}'", other))),
        };

        let mut uow = self.repo.begin().await?;
        let result = uow.list_shops(approval).await;
        finish(uow, result).await
    }

    pub async fn get_business(&self, actor: &Actor, shop_id: Uuid) -> Result<Shop, AppError> {
        actor.require(UserRole::Admin)?;
        let mut uow = self.repo.begin().await?;
        let result = Self::find_business(uow.as_mut(), shop_id).await;
        finish(uow, result).await
    }

    pub async fn approve_business(&self, actor: &Actor, shop_id: Uuid) -> Result<Shop, AppError> {
        actor.require(UserRole::Admin)?;

        let mut uow = self.repo.begin().await?;
        let result = async {
            let mut shop = Self::find_business(uow.as_mut(), shop_id).await?;
            if shop.approval_status == ShopApproval::Approved {
                return Err(AppError::InvalidState("Business is already approved".to_string()));
            }
            shop.approval_status = ShopApproval::Approved;
            shop.is_active = true;
            shop.approval_date = Some(Utc::now());
            shop.approved_by = Some(actor.user_id);
            shop.rejection_reason = None;
            uow.save_shop(&shop).await
        }
        .await;
        let shop = finish(uow, result).await?;

        info!(shop_id = %shop.id, admin_id = %actor.user_id, "Business approved");
        Ok(shop)
    }

    pub async fn reject_business(
        &self,
        actor: &Actor,
        shop_id: Uuid,
        request: RejectBusinessRequest,
    ) -> Result<Shop, AppError> {
        actor.require(UserRole::Admin)?;
        request.validate()?;

        let mut uow = self.repo.begin().await?;
        let result = async {
            let mut shop = Self::find_business(uow.as_mut(), shop_id).await?;
            if shop.approval_status == ShopApproval::Rejected {
                return Err(AppError::InvalidState("Business is already rejected".to_string()));
            }
            shop.approval_status = ShopApproval::Rejected;
            shop.is_active = false;
            shop.rejection_reason = Some(request.reason.trim().to_string());
            uow.save_shop(&shop).await
        }
        .await;
        let shop = finish(uow, result).await?;

        info!(shop_id = %shop.id, admin_id = %actor.user_id, "Business rejected");
        Ok(shop)
    }

    async fn find_business(uow: &mut dyn UnitOfWork, shop_id: Uuid) -> Result<Shop, AppError> {
        uow.find_shop(shop_id)
            .await?
            .ok_or_else(|| AppError::NotFound(ERROR_BUSINESS_NOT_FOUND.to_string()))
    }
}
