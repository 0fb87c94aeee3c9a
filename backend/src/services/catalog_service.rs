use std::sync::Arc;

use marketplace_shared::{
    CreateItemRequest, CreateVariationRequest, ItemQuery, ItemStatus, PageQuery, UpdateItemRequest,
    UpdateVariationRequest, UserRole, ERROR_ITEM_NOT_FOUND, ERROR_VARIATION_NOT_FOUND,
};
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use super::Actor;
use crate::error::AppError;
use crate::models::{
    fits_money_column, Item, ItemDetail, ItemFilter, ItemListing, ItemVariation, NewItem, NewVariation, Page,
    Pagination, Review,
};
use crate::repositories::{finish, Repository, UnitOfWork};

/// Item catalog: public browsing plus seller-side listing management.
#[derive(Clone)]
pub struct CatalogService {
    repo: Arc<dyn Repository>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    /// Active items only, filtered, sorted and paginated.
    pub async fn list_items(&self, query: &ItemQuery) -> Result<Page<ItemListing>, AppError> {
        let filter = ItemFilter::from_query(query);
        debug!(?filter, "Listing catalog items");

        let mut uow = self.repo.begin().await?;
        let result = uow.list_items(&filter).await;
        finish(uow, result).await
    }

    pub async fn get_item(&self, item_id: Uuid) -> Result<ItemDetail, AppError> {
        let mut uow = self.repo.begin().await?;
        let result = Self::load_detail(uow.as_mut(), item_id).await;
        finish(uow, result).await
    }

    async fn load_detail(uow: &mut dyn UnitOfWork, item_id: Uuid) -> Result<ItemDetail, AppError> {
        let item = uow
            .find_item(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound(ERROR_ITEM_NOT_FOUND.to_string()))?;
        let variations = uow.list_variations(item_id).await?;
        let reviews = uow.list_reviews_for_item(item_id).await?;

        Ok(ItemDetail {
            average_rating: Review::average(&reviews),
            item,
            variations,
            reviews,
        })
    }

    pub async fn create_item(&self, actor: &Actor, request: CreateItemRequest) -> Result<ItemDetail, AppError> {
        actor.require(UserRole::Seller)?;
        request.validate()?;
        for variation in &request.variations {
            variation.validate()?;
            ensure_adjustment(variation.price_adjustment)?;
        }
        ensure_price(request.price)?;

        let mut uow = self.repo.begin().await?;
        let result = Self::create_item_in(uow.as_mut(), actor.user_id, request).await;
        let detail = finish(uow, result).await?;

        info!(item_id = %detail.item.id, seller_id = %actor.user_id, "Item created");
        Ok(detail)
    }

    async fn create_item_in(
        uow: &mut dyn UnitOfWork,
        seller_id: Uuid,
        request: CreateItemRequest,
    ) -> Result<ItemDetail, AppError> {
        let item = uow
            .insert_item(NewItem {
                seller_id,
                name: request.name.trim().to_string(),
                description: request.description,
                price: request.price,
                stock: request.stock,
                category: request.category,
            })
            .await?;

        let mut variations = Vec::with_capacity(request.variations.len());
        for variation in request.variations {
            variations.push(
                uow.insert_variation(NewVariation {
                    item_id: item.id,
                    color: variation.color.trim().to_string(),
                    size: variation.size.trim().to_string(),
                    stock: variation.stock,
                    price_adjustment: variation.price_adjustment,
                })
                .await?,
            );
        }

        Ok(ItemDetail {
            item,
            average_rating: 0.0,
            variations,
            reviews: Vec::new(),
        })
    }

    /// Partial update by the owning seller. Items of other sellers read as missing.
    pub async fn update_item(
        &self,
        actor: &Actor,
        item_id: Uuid,
        request: UpdateItemRequest,
    ) -> Result<Item, AppError> {
        actor.require(UserRole::Seller)?;
        request.validate()?;
        if let Some(price) = request.price {
            ensure_price(price)?;
        }

        let mut uow = self.repo.begin().await?;
        let result = Self::update_item_in(uow.as_mut(), actor.user_id, item_id, request).await;
        let item = finish(uow, result).await?;

        info!(item_id = %item.id, "Item updated");
        Ok(item)
    }

    async fn update_item_in(
        uow: &mut dyn UnitOfWork,
        seller_id: Uuid,
        item_id: Uuid,
        request: UpdateItemRequest,
    ) -> Result<Item, AppError> {
        let mut item = Self::owned_item(uow, seller_id, item_id).await?;

        if let Some(name) = request.name {
            item.name = name.trim().to_string();
        }
        if let Some(description) = request.description {
            item.description = Some(description);
        }
        if let Some(price) = request.price {
            item.price = price;
        }
        if let Some(stock) = request.stock {
            item.stock = stock;
        }
        if let Some(category) = request.category {
            item.category = Some(category);
        }
        if let Some(status) = request.status {
            item.status = status;
        }

        uow.save_item(&item).await
    }

    /// Soft delete: the item leaves the catalog, its orders and reviews stay.
    pub async fn delete_item(&self, actor: &Actor, item_id: Uuid) -> Result<(), AppError> {
        actor.require(UserRole::Seller)?;

        let mut uow = self.repo.begin().await?;
        let result = async {
            let mut item = Self::owned_item(uow.as_mut(), actor.user_id, item_id).await?;
            item.status = ItemStatus::Removed;
            uow.save_item(&item).await
        }
        .await;
        finish(uow, result).await?;

        info!(item_id = %item_id, "Item removed by seller");
        Ok(())
    }

    /// The seller's own items in any status, with order counts.
    pub async fn seller_items(&self, actor: &Actor, query: PageQuery) -> Result<Page<ItemListing>, AppError> {
        actor.require(UserRole::Seller)?;
        let pagination = Pagination::new(query.page, query.per_page);

        let mut uow = self.repo.begin().await?;
        let result = uow.list_seller_items(actor.user_id, pagination).await;
        finish(uow, result).await
    }

    pub async fn add_variation(
        &self,
        actor: &Actor,
        item_id: Uuid,
        request: CreateVariationRequest,
    ) -> Result<ItemVariation, AppError> {
        actor.require(UserRole::Seller)?;
        request.validate()?;
        ensure_adjustment(request.price_adjustment)?;

        let mut uow = self.repo.begin().await?;
        let result = async {
            let item = Self::owned_item(uow.as_mut(), actor.user_id, item_id).await?;
            uow.insert_variation(NewVariation {
                item_id: item.id,
                color: request.color.trim().to_string(),
                size: request.size.trim().to_string(),
                stock: request.stock,
                price_adjustment: request.price_adjustment,
            })
            .await
        }
        .await;
        let variation = finish(uow, result).await?;

        info!(item_id = %item_id, variation_id = %variation.id, "Variation added");
        Ok(variation)
    }

    pub async fn update_variation(
        &self,
        actor: &Actor,
        item_id: Uuid,
        variation_id: Uuid,
        request: UpdateVariationRequest,
    ) -> Result<ItemVariation, AppError> {
        actor.require(UserRole::Seller)?;
        request.validate()?;
        if let Some(adjustment) = request.price_adjustment {
            ensure_adjustment(adjustment)?;
        }

        let mut uow = self.repo.begin().await?;
        let result = async {
            let mut variation = Self::owned_variation(uow.as_mut(), actor.user_id, item_id, variation_id).await?;
            if let Some(color) = request.color {
                variation.color = color.trim().to_string();
            }
            if let Some(size) = request.size {
                variation.size = size.trim().to_string();
            }
            if let Some(stock) = request.stock {
                variation.stock = stock;
            }
            if let Some(adjustment) = request.price_adjustment {
                variation.price_adjustment = adjustment;
            }
            uow.save_variation(&variation).await
        }
        .await;
        let variation = finish(uow, result).await?;

        info!(item_id = %item_id, variation_id = %variation.id, "Variation updated");
        Ok(variation)
    }

    pub async fn delete_variation(&self, actor: &Actor, item_id: Uuid, variation_id: Uuid) -> Result<(), AppError> {
        actor.require(UserRole::Seller)?;

        let mut uow = self.repo.begin().await?;
        let result = async {
            let variation = Self::owned_variation(uow.as_mut(), actor.user_id, item_id, variation_id).await?;
            uow.delete_variation(variation.id).await
        }
        .await;
        finish(uow, result).await?;

        info!(item_id = %item_id, variation_id = %variation_id, "Variation deleted");
        Ok(())
    }

    /// A variation of one of the seller's items; anything else reads as missing.
    async fn owned_variation(
        uow: &mut dyn UnitOfWork,
        seller_id: Uuid,
        item_id: Uuid,
        variation_id: Uuid,
    ) -> Result<ItemVariation, AppError> {
        let item = Self::owned_item(uow, seller_id, item_id).await?;
        uow.find_variation(variation_id)
            .await?
            .filter(|variation| variation.item_id == item.id)
            .ok_or_else(|| AppError::NotFound(ERROR_VARIATION_NOT_FOUND.to_string()))
    }

    async fn owned_item(uow: &mut dyn UnitOfWork, seller_id: Uuid, item_id: Uuid) -> Result<Item, AppError> {
        uow.find_item(item_id)
            .await?
            .filter(|item| item.is_owned_by(seller_id))
            .ok_or_else(|| AppError::NotFound(ERROR_ITEM_NOT_FOUND.to_string()))
    }
}

fn ensure_price(price: Decimal) -> Result<(), AppError> {
    if price < Decimal::ZERO {
        return Err(AppError::Validation("price must be at least 0".to_string()));
    }
    if !fits_money_column(price) {
        return Err(AppError::Validation(
            "price must be at most 99999999.99 with at most 2 decimal places".to_string(),
        ));
    }
    Ok(())
}

fn ensure_adjustment(adjustment: Decimal) -> Result<(), AppError> {
    if !fits_money_column(adjustment) {
        return Err(AppError::Validation(
            "price_adjustment must be within 99999999.99 with at most 2 decimal places".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::TestMarket;
    use marketplace_shared::ItemSort;

    #[tokio::test]
    async fn customers_cannot_create_items() {
        let market = TestMarket::new();
        let customer = market.customer().await;
        let request = CreateItemRequest {
            name: "Hat".to_string(),
            description: None,
            price: Decimal::from(5),
            stock: 1,
            category: None,
            variations: Vec::new(),
        };

        let err = market.catalog.create_item(&customer, request).await.unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[tokio::test]
    async fn negative_price_is_rejected() {
        let market = TestMarket::new();
        let seller = market.seller_actor().await;
        let request = CreateItemRequest {
            name: "Hat".to_string(),
            description: None,
            price: Decimal::from(-1),
            stock: 1,
            category: None,
            variations: Vec::new(),
        };

        let err = market.catalog.create_item(&seller, request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(market.repo.snapshot().await.items.is_empty());
    }

    #[tokio::test]
    async fn item_detail_includes_variations() {
        let market = TestMarket::new();
        let seller = market.seller_actor().await;
        let created = market
            .catalog
            .create_item(
                &seller,
                CreateItemRequest {
                    name: "Tee".to_string(),
                    description: None,
                    price: Decimal::from(12),
                    stock: 4,
                    category: None,
                    variations: vec![CreateVariationRequest {
                        color: "red".to_string(),
                        size: "M".to_string(),
                        stock: 4,
                        price_adjustment: Decimal::ZERO,
                    }],
                },
            )
            .await
            .unwrap();

        let detail = market.catalog.get_item(created.item.id).await.unwrap();
        assert_eq!(detail.variations.len(), 1);
        assert_eq!(detail.average_rating, 0.0);
        assert!(matches!(
            market.catalog.get_item(Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn removed_items_leave_the_catalog() {
        let market = TestMarket::new();
        let seller = market.seller_actor().await;
        let cheap = market.item(&seller, "Socks", 3, 10).await;
        let dear = market.item(&seller, "Coat", 90, 1).await;

        market.catalog.delete_item(&seller, cheap.id).await.unwrap();

        let page = market
            .catalog
            .list_items(&ItemQuery {
                sort_by: Some(ItemSort::PriceAsc),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].item.id, dear.id);

        let own = market.catalog.seller_items(&seller, PageQuery::default()).await.unwrap();
        assert_eq!(own.total, 2);
    }

    #[tokio::test]
    async fn other_sellers_items_read_as_missing() {
        let market = TestMarket::new();
        let owner = market.seller_actor().await;
        let intruder = market.seller_actor().await;
        let item = market.item(&owner, "Scarf", 15, 2).await;

        let err = market
            .catalog
            .update_item(
                &intruder,
                item.id,
                UpdateItemRequest {
                    stock: Some(100),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(market.stock_of(item.id).await, 2);

        let updated = market
            .catalog
            .update_item(
                &owner,
                item.id,
                UpdateItemRequest {
                    stock: Some(7),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.stock, 7);
    }

    fn hat(price: Decimal) -> CreateItemRequest {
        CreateItemRequest {
            name: "Hat".to_string(),
            description: None,
            price,
            stock: 1,
            category: None,
            variations: Vec::new(),
        }
    }

    #[tokio::test]
    async fn prices_must_fit_the_money_column() {
        let market = TestMarket::new();
        let seller = market.seller_actor().await;

        for price in [Decimal::MAX, Decimal::new(10_000_000_000, 2), Decimal::new(1999, 3)] {
            let err = market.catalog.create_item(&seller, hat(price)).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{} accepted", price);
        }
        assert!(market.repo.snapshot().await.items.is_empty());

        let item = market
            .catalog
            .create_item(&seller, hat(Decimal::new(9_999_999_999, 2)))
            .await
            .unwrap()
            .item;
        let err = market
            .catalog
            .update_item(
                &seller,
                item.id,
                UpdateItemRequest {
                    price: Some(Decimal::MAX),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    fn red_medium(stock: i32) -> CreateVariationRequest {
        CreateVariationRequest {
            color: "red".to_string(),
            size: "M".to_string(),
            stock,
            price_adjustment: Decimal::ZERO,
        }
    }

    #[tokio::test]
    async fn sellers_manage_variations_of_their_items() {
        let market = TestMarket::new();
        let seller = market.seller_actor().await;
        let item = market.item(&seller, "Tee", 12, 4).await;

        let variation = market
            .catalog
            .add_variation(&seller, item.id, red_medium(3))
            .await
            .unwrap();
        assert_eq!(variation.item_id, item.id);

        let err = market
            .catalog
            .add_variation(&seller, item.id, red_medium(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Duplicate(_)));

        let updated = market
            .catalog
            .update_variation(
                &seller,
                item.id,
                variation.id,
                UpdateVariationRequest {
                    size: Some("L".to_string()),
                    price_adjustment: Some(Decimal::new(250, 2)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.size, "L");
        assert_eq!(updated.color, "red");
        assert_eq!(updated.stock, 3);
        assert_eq!(updated.price_adjustment, Decimal::new(250, 2));

        market
            .catalog
            .delete_variation(&seller, item.id, variation.id)
            .await
            .unwrap();
        let detail = market.catalog.get_item(item.id).await.unwrap();
        assert!(detail.variations.is_empty());
    }

    #[tokio::test]
    async fn variations_of_other_items_read_as_missing() {
        let market = TestMarket::new();
        let owner = market.seller_actor().await;
        let intruder = market.seller_actor().await;
        let item = market.item(&owner, "Tee", 12, 4).await;
        let other = market.item(&owner, "Cap", 8, 2).await;
        let variation = market
            .catalog
            .add_variation(&owner, item.id, red_medium(3))
            .await
            .unwrap();

        let err = market
            .catalog
            .add_variation(&intruder, item.id, red_medium(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = market
            .catalog
            .delete_variation(&intruder, item.id, variation.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        // Right owner, wrong item.
        let err = market
            .catalog
            .update_variation(&owner, other.id, variation.id, UpdateVariationRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        assert_eq!(market.repo.snapshot().await.variations.len(), 1);
    }
}
