use std::sync::Arc;

use actix_web::web;
use marketplace_backend::handlers;
use marketplace_backend::repositories::{MemoryRepository, Repository};
use marketplace_backend::services::{
    AccountService, AdminService, AuthService, CartService, CatalogService, OrderService, ReportService,
    ReviewService, SellerService,
};
use marketplace_backend::utils::jwt::JwtService;
use marketplace_shared::{RegisterRequest, UserRole};
use uuid::Uuid;

pub const TEST_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Call the app and decode the JSON body.
macro_rules! send {
    ($app:expr, $req:expr) => {{
        let resp = actix_web::test::call_service(&$app, $req.to_request()).await;
        let status = resp.status().as_u16();
        let body: serde_json::Value = actix_web::test::read_body_json(resp).await;
        (status, body)
    }};
}

pub struct TestContext {
    pub repo: MemoryRepository,
    pub jwt: JwtService,
    auth: AuthService,
    accounts: AccountService,
    catalog: CatalogService,
    cart: CartService,
    orders: OrderService,
    reviews: ReviewService,
    reports: ReportService,
    admin: AdminService,
    seller: SellerService,
}

impl TestContext {
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

    /// Same wiring as the server binary.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.jwt.clone()))
            .app_data(web::Data::new(self.auth.clone()))
            .app_data(web::Data::new(self.accounts.clone()))
            .app_data(web::Data::new(self.catalog.clone()))
            .app_data(web::Data::new(self.cart.clone()))
            .app_data(web::Data::new(self.orders.clone()))
            .app_data(web::Data::new(self.reviews.clone()))
            .app_data(web::Data::new(self.reports.clone()))
            .app_data(web::Data::new(self.admin.clone()))
            .app_data(web::Data::new(self.seller.clone()));
        handlers::configure(cfg, &self.jwt);
    }

    /// Register an account and return its bearer header value and id.
    pub async fn register(&self, role: UserRole, name: &str) -> (String, Uuid) {
        let response = self
            .auth
            .register(
                role,
                RegisterRequest {
                    name: name.to_string(),
                    email: format!("{}@example.com", name.to_lowercase()),
                    password: "password123".to_string(),
                },
            )
            .await
            .expect("register");
        (format!("Bearer {}", response.token), response.user.id)
    }
}
