use std::sync::Arc;

use marketplace_shared::{CreateItemRequest, UserRole};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::*;
use crate::models::{Item, NewShop, NewUser};
use crate::repositories::{MemoryRepository, Repository, UnitOfWork};
use crate::utils::jwt::JwtService;

pub(crate) const TEST_SECRET: &str = "test-secret-key-for-testing-only-0123456789";

/// Every service wired to one in-memory store.
pub(crate) struct TestMarket {
    pub repo: MemoryRepository,
    pub jwt: JwtService,
    pub auth: AuthService,
    pub accounts: AccountService,
    pub catalog: CatalogService,
    pub cart: CartService,
    pub orders: OrderService,
    pub reviews: ReviewService,
    pub reports: ReportService,
    pub admin: AdminService,
    pub seller: SellerService,
}

impl TestMarket {
    pub fn new() -> Self {
        let repo = MemoryRepository::new();
        let shared: Arc<dyn Repository> = Arc::new(repo.clone());
        let jwt = JwtService::new(TEST_SECRET, 60).expect("jwt service");

        Self {
            auth: AuthService::new(shared.clone(), jwt.clone(), 4),
            accounts: AccountService::new(shared.clone()),
            catalog: CatalogService::new(shared.clone()),
            cart: CartService::new(shared.clone()),
            orders: OrderService::new(shared.clone()),
            reviews: ReviewService::new(shared.clone()),
            reports: ReportService::new(shared.clone()),
            admin: AdminService::new(shared.clone()),
            seller: SellerService::new(shared),
            repo,
            jwt,
        }
    }

    /// Insert a user straight into the store; the password hash is not usable.
    pub async fn user(&self, name: &str, role: UserRole) -> Actor {
        let mut uow = self.repo.begin().await.unwrap();
        let user = uow
            .insert_user(NewUser {
                name: name.to_string(),
                email: format!("{}-{}@example.com", name.to_lowercase(), Uuid::new_v4()),
                password_hash: "unused".to_string(),
                role,
            })
            .await
            .unwrap();
        if role == UserRole::Seller {
            uow.insert_shop(NewShop::placeholder(user.id, name, false)).await.unwrap();
        }
        uow.commit().await.unwrap();
        Actor::new(user.id, role)
    }

    pub async fn customer(&self) -> Actor {
        self.user("Carol", UserRole::Customer).await
    }

    pub async fn seller_actor(&self) -> Actor {
        self.user("Sam", UserRole::Seller).await
    }

    pub async fn admin_actor(&self) -> Actor {
        self.user("Alex", UserRole::Admin).await
    }

    pub async fn item(&self, seller: &Actor, name: &str, price: i64, stock: i32) -> Item {
        self.catalog
            .create_item(
                seller,
                CreateItemRequest {
                    name: name.to_string(),
                    description: Some(format!("{} description", name)),
                    price: Decimal::from(price),
                    stock,
                    category: Some("apparel".to_string()),
                    variations: Vec::new(),
                },
            )
            .await
            .unwrap()
            .item
    }

    /// Edit a stored item directly, skipping the catalog's request validation.
    pub async fn overwrite_item(&self, item_id: Uuid, edit: impl FnOnce(&mut Item)) {
        let mut uow = self.repo.begin().await.unwrap();
        let mut item = uow.find_item(item_id).await.unwrap().unwrap();
        edit(&mut item);
        uow.save_item(&item).await.unwrap();
        uow.commit().await.unwrap();
    }

    pub async fn stock_of(&self, item_id: Uuid) -> i32 {
        self.repo
            .snapshot()
            .await
            .items
            .iter()
            .find(|i| i.id == item_id)
            .map(|i| i.stock)
            .unwrap()
    }
}
