#[macro_use]
mod common;

use actix_web::{test, App};
use marketplace_shared::UserRole;
use serde_json::json;

use common::TestContext;

#[actix_web::test]
async fn health_check_reports_healthy() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let (status, body) = send!(app, test::TestRequest::get().uri("/api/health"));
    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn checkout_and_rejection_keep_stock_consistent() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;
    let (seller, _) = ctx.register(UserRole::Seller, "Sam").await;
    let (customer, _) = ctx.register(UserRole::Customer, "Carol").await;

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/items")
            .insert_header(("Authorization", seller.clone()))
            .set_json(json!({
                "name": "Tee",
                "description": "Cotton tee",
                "price": 20.0,
                "stock": 5,
                "category": "apparel",
                "variations": [{ "color": "red", "size": "M", "stock": 5 }]
            }))
    );
    assert_eq!(status, 201);
    let item_id = body["item"]["id"].as_str().unwrap().to_string();

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/cart/add")
            .insert_header(("Authorization", customer.clone()))
            .set_json(json!({ "item_id": item_id, "quantity": 2, "variation": { "color": "red", "size": "M" } }))
    );
    assert_eq!(status, 200);

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/cart")
            .insert_header(("Authorization", customer.clone()))
    );
    assert_eq!(status, 200);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["total_quantity"], 2);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/cart/checkout")
            .insert_header(("Authorization", customer.clone()))
            .set_json(json!({ "shipping_address": "1 Main St", "payment_method": "cash_on_delivery" }))
    );
    assert_eq!(status, 201);
    let orders = body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["status"], "pending");
    let order_id = orders[0]["id"].as_str().unwrap().to_string();

    let (_, body) = send!(app, test::TestRequest::get().uri(&format!("/api/items/{}", item_id)));
    assert_eq!(body["stock"], 3);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/cart/checkout")
            .insert_header(("Authorization", customer.clone()))
            .set_json(json!({ "shipping_address": "1 Main St", "payment_method": "cash_on_delivery" }))
    );
    assert_eq!(status, 400);
    assert_eq!(body["error"], "empty_cart");

    let reject = json!({ "status": "rejected" });
    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/orders/{}/status", order_id))
            .insert_header(("Authorization", seller.clone()))
            .set_json(&reject)
    );
    assert_eq!(status, 200);
    assert_eq!(body["order"]["status"], "rejected");

    let (_, body) = send!(app, test::TestRequest::get().uri(&format!("/api/items/{}", item_id)));
    assert_eq!(body["stock"], 5);

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/orders/{}/status", order_id))
            .insert_header(("Authorization", seller.clone()))
            .set_json(&reject)
    );
    assert_eq!(status, 400);
    assert_eq!(body["error"], "invalid_state");

    let (_, body) = send!(app, test::TestRequest::get().uri(&format!("/api/items/{}", item_id)));
    assert_eq!(body["stock"], 5);

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/orders")
            .insert_header(("Authorization", customer.clone()))
    );
    assert_eq!(status, 200);
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["status"], "rejected");

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/seller/orders")
            .insert_header(("Authorization", seller))
    );
    assert_eq!(status, 200);
    assert_eq!(body["total"], 1);
}

#[actix_web::test]
async fn accounts_and_role_gates() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

    let signup = json!({ "name": "Dana", "email": "Dana@Example.com", "password": "password123" });
    let (status, body) = send!(
        app,
        test::TestRequest::post().uri("/api/register/customer").set_json(&signup)
    );
    assert_eq!(status, 201);
    assert_eq!(body["user"]["email"], "dana@example.com");
    let customer = format!("Bearer {}", body["token"].as_str().unwrap());

    let (status, body) = send!(
        app,
        test::TestRequest::post().uri("/api/register/customer").set_json(&signup)
    );
    assert_eq!(status, 400);
    assert_eq!(body["error"], "duplicate");

    let (status, _) = send!(
        app,
        test::TestRequest::post().uri("/api/register/superuser").set_json(&signup)
    );
    assert_eq!(status, 400);

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "email": "dana@example.com", "password": "wrong-password" }))
    );
    assert_eq!(status, 401);

    let (status, _) = send!(app, test::TestRequest::get().uri("/api/cart"));
    assert_eq!(status, 401);

    let (status, _) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/admin/users")
            .insert_header(("Authorization", customer.clone()))
    );
    assert_eq!(status, 403);

    let (status, _) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/seller/orders")
            .insert_header(("Authorization", customer.clone()))
    );
    assert_eq!(status, 403);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/items")
            .insert_header(("Authorization", customer.clone()))
            .set_json(json!({ "name": "Lamp", "price": 10.0, "stock": 1 }))
    );
    assert_eq!(status, 403);
    assert_eq!(body["error"], "authorization_error");

    let (admin, _) = ctx.register(UserRole::Admin, "Alex").await;
    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/admin/users")
            .insert_header(("Authorization", admin))
    );
    assert_eq!(status, 200);
    assert_eq!(body["users"].as_array().unwrap().len(), 2);

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", customer.clone()))
    );
    assert_eq!(status, 200);
    assert_eq!(body["user"]["name"], "Dana");

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/logout")
            .insert_header(("Authorization", customer.clone()))
    );
    assert_eq!(status, 200);

    let (status, _) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/me")
            .insert_header(("Authorization", customer))
    );
    assert_eq!(status, 401);
}

#[actix_web::test]
async fn reviews_and_report_moderation() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;
    let (seller, _) = ctx.register(UserRole::Seller, "Sam").await;
    let (customer, _) = ctx.register(UserRole::Customer, "Carol").await;
    let (admin, _) = ctx.register(UserRole::Admin, "Alex").await;

    let (_, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/items")
            .insert_header(("Authorization", seller))
            .set_json(json!({ "name": "Watch", "price": 99.5, "stock": 2 }))
    );
    let item_id = body["item"]["id"].as_str().unwrap().to_string();

    let review_uri = format!("/api/items/{}/reviews", item_id);
    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri(&review_uri)
            .insert_header(("Authorization", customer.clone()))
            .set_json(json!({ "rating": 6, "comment": "Too good" }))
    );
    assert_eq!(status, 400);

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri(&review_uri)
            .insert_header(("Authorization", customer.clone()))
            .set_json(json!({ "rating": 4, "comment": "Keeps time" }))
    );
    assert_eq!(status, 201);

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri(&review_uri)
            .insert_header(("Authorization", customer.clone()))
            .set_json(json!({ "rating": 5, "comment": "Again" }))
    );
    assert_eq!(status, 400);
    assert_eq!(body["error"], "duplicate");

    let (_, body) = send!(app, test::TestRequest::get().uri(&format!("/api/items/{}", item_id)));
    assert_eq!(body["average_rating"], 4.0);
    assert_eq!(body["reviews"].as_array().unwrap().len(), 1);

    let report_uri = format!("/api/items/{}/report", item_id);
    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri(&report_uri)
            .insert_header(("Authorization", customer.clone()))
            .set_json(json!({ "reason": "Counterfeit" }))
    );
    assert_eq!(status, 201);
    let report_id = body["report"]["id"].as_str().unwrap().to_string();

    let (status, _) = send!(
        app,
        test::TestRequest::post()
            .uri(&report_uri)
            .insert_header(("Authorization", customer))
            .set_json(json!({ "reason": "Still counterfeit" }))
    );
    assert_eq!(status, 400);

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/admin/reports")
            .insert_header(("Authorization", admin.clone()))
    );
    assert_eq!(status, 200);
    assert_eq!(body["total"], 1);

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/admin/reports/{}/review", report_id))
            .insert_header(("Authorization", admin.clone()))
            .set_json(json!({ "status": "resolved", "admin_notes": "Listing taken down", "remove_item": true }))
    );
    assert_eq!(status, 200);
    assert_eq!(body["report"]["status"], "resolved");

    let (_, body) = send!(app, test::TestRequest::get().uri("/api/items"));
    assert_eq!(body["total"], 0);

    let (status, body) = send!(app, test::TestRequest::get().uri(&format!("/api/items/{}", item_id)));
    assert_eq!(status, 200);
    assert_eq!(body["status"], "removed");

    let (_, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/admin/reports")
            .insert_header(("Authorization", admin.clone()))
    );
    assert_eq!(body["total"], 0);

    let (_, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/admin/reports?status=all")
            .insert_header(("Authorization", admin))
    );
    assert_eq!(body["total"], 1);
}

#[actix_web::test]
async fn business_approval_over_http() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;
    let (seller, _) = ctx.register(UserRole::Seller, "Sam").await;
    let (admin, _) = ctx.register(UserRole::Admin, "Alex").await;

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/seller/profile")
            .insert_header(("Authorization", seller.clone()))
    );
    assert_eq!(status, 200);
    assert_eq!(body["shop"]["name"], "Sam's Shop");
    assert_eq!(body["shop"]["is_active"], false);
    let shop_id = body["shop"]["id"].as_str().unwrap().to_string();

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/admin/businesses?status=pending")
            .insert_header(("Authorization", admin.clone()))
    );
    assert_eq!(status, 200);
    assert_eq!(body["businesses"].as_array().unwrap().len(), 1);

    let approve_uri = format!("/api/admin/businesses/{}/approve", shop_id);
    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri(&approve_uri)
            .insert_header(("Authorization", admin.clone()))
    );
    assert_eq!(status, 200);
    assert_eq!(body["business"]["approval_status"], "approved");
    assert_eq!(body["business"]["is_active"], true);

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri(&approve_uri)
            .insert_header(("Authorization", admin))
    );
    assert_eq!(status, 400);
    assert_eq!(body["error"], "invalid_state");

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri("/api/seller/profile")
            .insert_header(("Authorization", seller))
            .set_json(json!({ "contact_phone": "555-0100" }))
    );
    assert_eq!(status, 200);
    assert_eq!(body["shop"]["contact_phone"], "555-0100");
    assert_eq!(body["shop"]["name"], "Sam's Shop");
}

#[actix_web::test]
async fn address_book_and_account_deletion() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;
    let (customer, customer_id) = ctx.register(UserRole::Customer, "Dana").await;

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/account/addresses")
            .insert_header(("Authorization", customer.clone()))
            .set_json(json!({
                "address_line1": "1 Main St",
                "city": "Springfield",
                "state": "IL",
                "postal_code": "62701",
                "country": "US",
                "is_default": true
            }))
    );
    assert_eq!(status, 201);
    assert_eq!(body["address"]["is_default"], true);
    let address_id = body["address"]["id"].as_str().unwrap().to_string();

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/account/addresses/{}", address_id))
            .insert_header(("Authorization", customer.clone()))
            .set_json(json!({ "city": "Shelbyville" }))
    );
    assert_eq!(status, 200);
    assert_eq!(body["address"]["city"], "Shelbyville");

    let (status, body) = send!(
        app,
        test::TestRequest::get()
            .uri("/api/account/addresses")
            .insert_header(("Authorization", customer.clone()))
    );
    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send!(
        app,
        test::TestRequest::delete()
            .uri("/api/account")
            .insert_header(("Authorization", customer.clone()))
            .set_json(json!({ "password": "wrong-password" }))
    );
    assert_eq!(status, 403);
    assert_eq!(body["message"], "Incorrect password");

    let (status, body) = send!(
        app,
        test::TestRequest::delete()
            .uri("/api/account")
            .insert_header(("Authorization", customer.clone()))
            .set_json(json!({ "password": "password123" }))
    );
    assert_eq!(status, 200);
    assert_eq!(body["message"], "Account deleted successfully");

    let state = ctx.repo.snapshot().await;
    assert!(state.users.iter().all(|u| u.id != customer_id));
    assert!(state.addresses.is_empty());
}

#[actix_web::test]
async fn sellers_manage_variations_over_http() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;
    let (seller, _) = ctx.register(UserRole::Seller, "Sam").await;
    let (other, _) = ctx.register(UserRole::Seller, "Sid").await;

    let (_, body) = send!(
        app,
        test::TestRequest::post()
            .uri("/api/items")
            .insert_header(("Authorization", seller.clone()))
            .set_json(json!({ "name": "Tee", "price": 20.0, "stock": 5 }))
    );
    let item_id = body["item"]["id"].as_str().unwrap().to_string();

    let (status, body) = send!(
        app,
        test::TestRequest::post()
            .uri(&format!("/api/items/{}/variations", item_id))
            .insert_header(("Authorization", seller.clone()))
            .set_json(json!({ "color": "blue", "size": "S", "stock": 2, "price_adjustment": 1.5 }))
    );
    assert_eq!(status, 201);
    assert_eq!(body["message"], "Variation added successfully");
    let variation_id = body["variation"]["id"].as_str().unwrap().to_string();

    let (status, _) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/items/{}/variations/{}", item_id, variation_id))
            .insert_header(("Authorization", other.clone()))
            .set_json(json!({ "stock": 99 }))
    );
    assert_eq!(status, 404);

    let (status, body) = send!(
        app,
        test::TestRequest::put()
            .uri(&format!("/api/items/{}/variations/{}", item_id, variation_id))
            .insert_header(("Authorization", seller.clone()))
            .set_json(json!({ "stock": 4 }))
    );
    assert_eq!(status, 200);
    assert_eq!(body["variation"]["stock"], 4);

    let (status, _) = send!(
        app,
        test::TestRequest::delete()
            .uri(&format!("/api/items/{}/variations/{}", item_id, variation_id))
            .insert_header(("Authorization", seller.clone()))
    );
    assert_eq!(status, 200);

    let (_, body) = send!(app, test::TestRequest::get().uri(&format!("/api/items/{}", item_id)));
    assert!(body["variations"].as_array().unwrap().is_empty());
}
