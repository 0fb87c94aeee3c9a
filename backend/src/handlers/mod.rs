//! HTTP surface. Handlers only translate between JSON and services;
//! authorization decisions live in the services.

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod health;
pub mod items;
pub mod orders;
pub mod reviews;
pub mod seller;

use actix_web::web;
use marketplace_shared::UserRole;

use crate::middleware::AuthMiddleware;
use crate::utils::jwt::JwtService;

/// Mount every route under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig, jwt_service: &JwtService) {
    cfg.service(
        web::scope("/api")
            .service(health::health_check)
            .service(auth::register)
            .service(auth::login)
            .service(auth::logout)
            .service(auth::me)
            .service(
                web::scope("/cart")
                    .wrap(AuthMiddleware::new(jwt_service.clone()))
                    .service(cart::get_cart)
                    .service(cart::add_to_cart)
                    .service(cart::update_cart_item)
                    .service(cart::remove_from_cart)
                    .service(cart::checkout),
            )
            .service(
                web::scope("/account")
                    .wrap(AuthMiddleware::new(jwt_service.clone()))
                    .service(account::list_addresses)
                    .service(account::add_address)
                    .service(account::update_address)
                    .service(account::delete_address)
                    .service(account::delete_account),
            )
            .service(
                web::scope("/seller")
                    .wrap(AuthMiddleware::new(jwt_service.clone()).require_role(UserRole::Seller))
                    .service(items::seller_items)
                    .service(orders::seller_orders)
                    .service(seller::get_profile)
                    .service(seller::update_profile),
            )
            .service(
                web::scope("/admin")
                    .wrap(AuthMiddleware::new(jwt_service.clone()).require_role(UserRole::Admin))
                    .service(admin::list_users)
                    .service(admin::update_user_role)
                    .service(admin::delete_user)
                    .service(admin::list_reports)
                    .service(admin::review_report)
                    .service(admin::list_businesses)
                    .service(admin::get_business)
                    .service(admin::approve_business)
                    .service(admin::reject_business),
            )
            .service(items::list_items)
            .service(items::get_item)
            .service(items::create_item)
            .service(items::update_item)
            .service(items::delete_item)
            .service(items::add_variation)
            .service(items::update_variation)
            .service(items::delete_variation)
            .service(orders::place_order)
            .service(reviews::add_review)
            .service(reviews::report_item)
            .service(orders::list_orders)
            .service(orders::get_order)
            .service(orders::update_order_status)
            .service(reviews::update_review)
            .service(reviews::delete_review),
    );
}
