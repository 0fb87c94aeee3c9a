use std::sync::Arc;

use marketplace_shared::{UpdateShopRequest, UserResponse, UserRole};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::Actor;
use crate::error::AppError;
use crate::models::{NewShop, Shop};
use crate::repositories::{finish, Repository, UnitOfWork};

#[derive(Debug, Clone, Serialize)]
pub struct SellerProfile {
    pub user: UserResponse,
    pub shop: Shop,
}

/// A seller's own business profile.
#[derive(Clone)]
pub struct SellerService {
    repo: Arc<dyn Repository>,
}

impl SellerService {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    pub async fn get_profile(&self, actor: &Actor) -> Result<SellerProfile, AppError> {
        actor.require(UserRole::Seller)?;
        let mut uow = self.repo.begin().await?;
        let result = Self::profile_in(uow.as_mut(), actor.user_id).await;
        finish(uow, result).await
    }

    pub async fn update_profile(&self, actor: &Actor, request: UpdateShopRequest) -> Result<Shop, AppError> {
        actor.require(UserRole::Seller)?;
        request.validate()?;

        let mut uow = self.repo.begin().await?;
        let result = async {
            let mut shop = Self::profile_in(uow.as_mut(), actor.user_id).await?.shop;
            if let Some(name) = request.name {
                shop.name = name.trim().to_string();
            }
            if let Some(description) = request.description {
                shop.description = Some(description);
            }
            if let Some(contact_email) = request.contact_email {
                shop.contact_email = Some(contact_email);
            }
            if let Some(contact_phone) = request.contact_phone {
                shop.contact_phone = Some(contact_phone);
            }
            if let Some(address) = request.address {
                shop.address = Some(address);
            }
            uow.save_shop(&shop).await
        }
        .await;
        let shop = finish(uow, result).await?;

        info!(shop_id = %shop.id, "Shop profile updated");
        Ok(shop)
    }

    // Sellers promoted before shops existed get one on first visit.
    async fn profile_in(uow: &mut dyn UnitOfWork, user_id: Uuid) -> Result<SellerProfile, AppError> {
        let user = uow
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
        let shop = match uow.find_shop_by_user(user_id).await? {
            Some(shop) => shop,
            None => uow.insert_shop(NewShop::placeholder(user_id, &user.name, true)).await?,
        };

        Ok(SellerProfile {
            user: user.to_response(),
            shop,
        })
    }
}
