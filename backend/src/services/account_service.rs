use std::sync::Arc;

use marketplace_shared::{
    AddressRequest, DeleteAccountRequest, UpdateAddressRequest, UserRole, ANONYMIZED_REVIEW_COMMENT,
    ERROR_ADDRESS_NOT_FOUND, ERROR_INCORRECT_PASSWORD,
};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::Actor;
use crate::error::AppError;
use crate::models::{Address, NewAddress};
use crate::repositories::{finish, Repository, UnitOfWork};
use crate::utils::verify_password;

/// What happens to the reviews of a departing user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthoredReviews {
    Delete,
    Anonymize,
}

/// Remove a user and everything hanging off them inside `uow`.
///
/// Open orders hand their stock back before they go. Items the user sells
/// leave the catalog but stay in place for other buyers' orders.
pub(crate) async fn purge_user(
    uow: &mut dyn UnitOfWork,
    user_id: Uuid,
    reviews: AuthoredReviews,
) -> Result<(), AppError> {
    for order in uow.list_open_orders_by_user(user_id).await? {
        uow.increment_stock(order.item_id, order.quantity).await?;
    }

    uow.delete_shops_by_user(user_id).await?;
    uow.delete_addresses_by_user(user_id).await?;
    uow.delete_cart(user_id).await?;
    match reviews {
        AuthoredReviews::Delete => uow.delete_reviews_by_user(user_id).await?,
        AuthoredReviews::Anonymize => {
            uow.anonymize_reviews_by_user(user_id, ANONYMIZED_REVIEW_COMMENT)
                .await?
        }
    }
    uow.delete_reports_by_user(user_id).await?;
    uow.delete_orders_by_user(user_id).await?;
    uow.remove_items_by_seller(user_id).await?;
    uow.delete_user(user_id).await
}

/// A customer's address book and self-service account removal.
#[derive(Clone)]
pub struct AccountService {
    repo: Arc<dyn Repository>,
}

impl AccountService {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// Default address first.
    pub async fn list_addresses(&self, actor: &Actor) -> Result<Vec<Address>, AppError> {
        actor.require(UserRole::Customer)?;
        let mut uow = self.repo.begin().await?;
        let result = uow.list_addresses(actor.user_id).await;
        finish(uow, result).await
    }

    pub async fn add_address(&self, actor: &Actor, request: AddressRequest) -> Result<Address, AppError> {
        actor.require(UserRole::Customer)?;
        request.validate()?;

        let mut uow = self.repo.begin().await?;
        let result = async {
            if request.is_default {
                uow.clear_default_address(actor.user_id).await?;
            }
            uow.insert_address(NewAddress {
                user_id: actor.user_id,
                address_line1: request.address_line1.trim().to_string(),
                address_line2: request.address_line2,
                city: request.city.trim().to_string(),
                state: request.state.trim().to_string(),
                postal_code: request.postal_code.trim().to_string(),
                country: request.country.trim().to_string(),
                is_default: request.is_default,
            })
            .await
        }
        .await;
        let address = finish(uow, result).await?;

        info!(user_id = %actor.user_id, address_id = %address.id, "Address added");
        Ok(address)
    }

    pub async fn update_address(
        &self,
        actor: &Actor,
        address_id: Uuid,
        request: UpdateAddressRequest,
    ) -> Result<Address, AppError> {
        actor.require(UserRole::Customer)?;
        request.validate()?;

        let mut uow = self.repo.begin().await?;
        let result = async {
            let mut address = Self::own_address(uow.as_mut(), actor.user_id, address_id).await?;
            if let Some(line1) = request.address_line1 {
                address.address_line1 = line1.trim().to_string();
            }
            if let Some(line2) = request.address_line2 {
                address.address_line2 = Some(line2);
            }
            if let Some(city) = request.city {
                address.city = city.trim().to_string();
            }
            if let Some(state) = request.state {
                address.state = state.trim().to_string();
            }
            if let Some(postal_code) = request.postal_code {
                address.postal_code = postal_code.trim().to_string();
            }
            if let Some(country) = request.country {
                address.country = country.trim().to_string();
            }
            if let Some(is_default) = request.is_default {
                if is_default && !address.is_default {
                    uow.clear_default_address(actor.user_id).await?;
                }
                address.is_default = is_default;
            }
            uow.save_address(&address).await
        }
        .await;
        let address = finish(uow, result).await?;

        info!(address_id = %address.id, "Address updated");
        Ok(address)
    }

    pub async fn delete_address(&self, actor: &Actor, address_id: Uuid) -> Result<(), AppError> {
        actor.require(UserRole::Customer)?;

        let mut uow = self.repo.begin().await?;
        let result = async {
            let address = Self::own_address(uow.as_mut(), actor.user_id, address_id).await?;
            uow.delete_address(address.id).await
        }
        .await;
        finish(uow, result).await?;

        info!(address_id = %address_id, "Address deleted");
        Ok(())
    }

    /// Delete the caller's own account after re-checking their password.
    ///
    /// Reviews survive without an author; the rest of the account goes.
    pub async fn delete_account(&self, actor: &Actor, request: DeleteAccountRequest) -> Result<(), AppError> {
        request.validate()?;

        let mut uow = self.repo.begin().await?;
        let result = async {
            let user = uow
                .find_user(actor.user_id)
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
            if !verify_password(&request.password, &user.password_hash)? {
                return Err(AppError::Authorization(ERROR_INCORRECT_PASSWORD.to_string()));
            }
            purge_user(uow.as_mut(), user.id, AuthoredReviews::Anonymize).await
        }
        .await;
        finish(uow, result).await.map_err(|err| {
            warn!(user_id = %actor.user_id, error = %err, "Account deletion failed");
            err
        })?;

        info!(user_id = %actor.user_id, "Account deleted by its owner");
        Ok(())
    }

    async fn own_address(uow: &mut dyn UnitOfWork, user_id: Uuid, address_id: Uuid) -> Result<Address, AppError> {
        uow.find_address(address_id)
            .await?
            .filter(|address| address.user_id == user_id)
            .ok_or_else(|| AppError::NotFound(ERROR_ADDRESS_NOT_FOUND.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::TestMarket;
    use marketplace_shared::{
        AddToCartRequest, CheckoutRequest, RegisterRequest, ReportItemRequest, ReviewRequest, Variation,
    };

    fn home(is_default: bool) -> AddressRequest {
        AddressRequest {
            address_line1: "1 Main St".to_string(),
            address_line2: None,
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            postal_code: "62701".to_string(),
            country: "US".to_string(),
            is_default,
        }
    }

    async fn registered_customer(market: &TestMarket) -> Actor {
        let response = market
            .auth
            .register(
                UserRole::Customer,
                RegisterRequest {
                    name: "Dana".to_string(),
                    email: format!("dana-{}@example.com", Uuid::new_v4()),
                    password: "password123".to_string(),
                },
            )
            .await
            .unwrap();
        Actor::new(response.user.id, UserRole::Customer)
    }

    #[tokio::test]
    async fn only_one_address_stays_default() {
        let market = TestMarket::new();
        let customer = market.customer().await;

        let first = market.accounts.add_address(&customer, home(true)).await.unwrap();
        let second = market.accounts.add_address(&customer, home(true)).await.unwrap();

        let book = market.accounts.list_addresses(&customer).await.unwrap();
        assert_eq!(book.len(), 2);
        assert_eq!(book[0].id, second.id);
        assert_eq!(book.iter().filter(|a| a.is_default).count(), 1);

        let updated = market
            .accounts
            .update_address(
                &customer,
                first.id,
                UpdateAddressRequest {
                    city: Some("Shelbyville".to_string()),
                    is_default: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.city, "Shelbyville");
        assert_eq!(updated.address_line1, "1 Main St");

        let book = market.accounts.list_addresses(&customer).await.unwrap();
        let defaults: Vec<Uuid> = book.iter().filter(|a| a.is_default).map(|a| a.id).collect();
        assert_eq!(defaults, vec![first.id]);
    }

    #[tokio::test]
    async fn other_users_addresses_read_as_missing() {
        let market = TestMarket::new();
        let owner = market.customer().await;
        let stranger = market.customer().await;
        let address = market.accounts.add_address(&owner, home(false)).await.unwrap();

        let err = market
            .accounts
            .update_address(&stranger, address.id, UpdateAddressRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        let err = market.accounts.delete_address(&stranger, address.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(market.accounts.list_addresses(&stranger).await.unwrap().is_empty());

        market.accounts.delete_address(&owner, address.id).await.unwrap();
        assert!(market.accounts.list_addresses(&owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn address_fields_are_validated() {
        let market = TestMarket::new();
        let customer = market.customer().await;
        let mut request = home(false);
        request.postal_code = "1".repeat(21);

        let err = market.accounts.add_address(&customer, request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let seller = market.seller_actor().await;
        let err = market.accounts.add_address(&seller, home(false)).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[tokio::test]
    async fn account_deletion_needs_the_password() {
        let market = TestMarket::new();
        let customer = registered_customer(&market).await;

        let err = market
            .accounts
            .delete_account(
                &customer,
                DeleteAccountRequest {
                    password: "not-my-password".to_string(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
        assert!(market.repo.snapshot().await.users.iter().any(|u| u.id == customer.user_id));
    }

    #[tokio::test]
    async fn account_deletion_keeps_reviews_without_their_author() {
        let market = TestMarket::new();
        let seller = market.seller_actor().await;
        let customer = registered_customer(&market).await;
        let item = market.item(&seller, "Lamp", 30, 5).await;
        let variation = Variation::new("brass", "std");

        market
            .cart
            .add_to_cart(
                &customer,
                AddToCartRequest {
                    item_id: item.id,
                    quantity: 3,
                    variation: variation.clone(),
                },
            )
            .await
            .unwrap();
        market
            .cart
            .checkout(
                &customer,
                CheckoutRequest {
                    shipping_address: "1 Main St".to_string(),
                    payment_method: "card".to_string(),
                },
            )
            .await
            .unwrap();
        market
            .cart
            .add_to_cart(
                &customer,
                AddToCartRequest {
                    item_id: item.id,
                    quantity: 1,
                    variation,
                },
            )
            .await
            .unwrap();
        let review = market
            .reviews
            .add_review(
                &customer,
                item.id,
                ReviewRequest {
                    rating: 4,
                    comment: "Warm light".to_string(),
                },
            )
            .await
            .unwrap();
        market
            .reports
            .report_item(
                &customer,
                item.id,
                ReportItemRequest {
                    reason: "Wrong colour".to_string(),
                    description: None,
                },
            )
            .await
            .unwrap();
        market.accounts.add_address(&customer, home(true)).await.unwrap();
        assert_eq!(market.stock_of(item.id).await, 2);

        market
            .accounts
            .delete_account(
                &customer,
                DeleteAccountRequest {
                    password: "password123".to_string(),
                },
            )
            .await
            .unwrap();

        let state = market.repo.snapshot().await;
        assert!(state.users.iter().all(|u| u.id != customer.user_id));
        assert!(state.addresses.is_empty());
        assert!(state.carts.is_empty());
        assert!(state.cart_items.is_empty());
        assert!(state.reports.is_empty());
        assert!(state.orders.is_empty());

        let kept = state.reviews.iter().find(|r| r.id == review.id).unwrap();
        assert_eq!(kept.user_id, None);
        assert_eq!(kept.rating, 4);
        assert_eq!(kept.comment, ANONYMIZED_REVIEW_COMMENT);
        assert_eq!(market.stock_of(item.id).await, 5);
    }
}
