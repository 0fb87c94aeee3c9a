use actix_cors::Cors;
use actix_web::{http::header, web, App, HttpServer};
use std::sync::Arc;
use tracing::info;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

use marketplace_backend::config::{AppConfig, StorageBackend};
use marketplace_backend::database::{Database, DatabaseConfig};
use marketplace_backend::error::AppError;
use marketplace_backend::handlers;
use marketplace_backend::repositories::{MemoryRepository, PgRepository, Repository};
use marketplace_backend::services::{
    AccountService, AdminService, AuthService, CartService, CatalogService, OrderService, ReportService,
    ReviewService, SellerService,
};
use marketplace_backend::utils::jwt::JwtService;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;
    info!("Starting marketplace backend on {}:{}", config.host, config.port);

    let repo: Arc<dyn Repository> = match config.storage {
        StorageBackend::Postgres => {
            let database = Database::connect(&DatabaseConfig::new(
                config.database_url.clone(),
                config.database_max_connections,
            ))
            .await?;
            database.migrate().await?;
            Arc::new(PgRepository::new(database.pool().clone()))
        }
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on shutdown");
            Arc::new(MemoryRepository::new())
        }
    };

    let jwt_service = JwtService::new(&config.jwt_secret, config.access_token_ttl_minutes)?;

    let auth_service = AuthService::new(repo.clone(), jwt_service.clone(), config.bcrypt_cost);
    let account_service = AccountService::new(repo.clone());
    let catalog_service = CatalogService::new(repo.clone());
    let cart_service = CartService::new(repo.clone());
    let order_service = OrderService::new(repo.clone());
    let review_service = ReviewService::new(repo.clone());
    let report_service = ReportService::new(repo.clone());
    let admin_service = AdminService::new(repo.clone());
    let seller_service = SellerService::new(repo);

    let cors_origin = config.cors_allowed_origin.clone();

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&cors_origin)
            .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
            .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(3600);
        let jwt = jwt_service.clone();

        App::new()
            .wrap(cors)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(jwt_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(account_service.clone()))
            .app_data(web::Data::new(catalog_service.clone()))
            .app_data(web::Data::new(cart_service.clone()))
            .app_data(web::Data::new(order_service.clone()))
            .app_data(web::Data::new(review_service.clone()))
            .app_data(web::Data::new(report_service.clone()))
            .app_data(web::Data::new(admin_service.clone()))
            .app_data(web::Data::new(seller_service.clone()))
            .configure(move |cfg| handlers::configure(cfg, &jwt))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
    .map_err(AppError::from)
}
