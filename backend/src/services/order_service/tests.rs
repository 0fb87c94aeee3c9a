use super::*;
use crate::services::test_support::TestMarket;
use marketplace_shared::Variation;
use rust_decimal::Decimal;

fn direct(quantity: i32) -> PlaceOrderRequest {
    PlaceOrderRequest {
        quantity,
        shipping_address: "1 Main St".to_string(),
        variation: None,
    }
}

fn status(status: OrderStatus) -> UpdateOrderStatusRequest {
    UpdateOrderStatusRequest { status }
}

#[tokio::test]
async fn test_place_order_decrements_stock() {
    let market = TestMarket::new();
    let seller = market.seller_actor().await;
    let buyer = market.customer().await;
    let item = market.item(&seller, "Lamp", 25, 3).await;

    let detail = market.orders.place_order(&buyer, item.id, direct(2)).await.unwrap();
    assert_eq!(detail.order.total_price, Decimal::from(50));
    assert_eq!(detail.order.status, OrderStatus::Pending);
    assert_eq!(detail.item.map(|i| i.stock), Some(1));

    let err = market.orders.place_order(&buyer, item.id, direct(2)).await.unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock(_)));
    assert_eq!(market.stock_of(item.id).await, 1);
}

#[tokio::test]
async fn test_place_order_validates_variation() {
    let market = TestMarket::new();
    let seller = market.seller_actor().await;
    let buyer = market.customer().await;
    let item = market.item(&seller, "Lamp", 25, 3).await;

    let mut request = direct(1);
    request.variation = Some(Variation::new("", "L"));
    let err = market.orders.place_order(&buyer, item.id, request).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(market.stock_of(item.id).await, 3);
}

#[tokio::test]
async fn test_rejection_restores_stock_exactly_once() {
    let market = TestMarket::new();
    let seller = market.seller_actor().await;
    let buyer = market.customer().await;
    let item = market.item(&seller, "Vase", 30, 2).await;

    let order = market.orders.place_order(&buyer, item.id, direct(2)).await.unwrap().order;
    assert_eq!(market.stock_of(item.id).await, 0);

    let rejected = market
        .orders
        .update_order_status(&seller, order.id, status(OrderStatus::Rejected))
        .await
        .unwrap();
    assert_eq!(rejected.order.status, OrderStatus::Rejected);
    assert_eq!(market.stock_of(item.id).await, 2);

    let err = market
        .orders
        .update_order_status(&seller, order.id, status(OrderStatus::Rejected))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
    let err = market
        .orders
        .update_order_status(&seller, order.id, status(OrderStatus::Approved))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
    assert_eq!(market.stock_of(item.id).await, 2);
}

#[tokio::test]
async fn test_approve_then_complete_leaves_stock_alone() {
    let market = TestMarket::new();
    let seller = market.seller_actor().await;
    let buyer = market.customer().await;
    let item = market.item(&seller, "Rug", 60, 4).await;
    let order = market.orders.place_order(&buyer, item.id, direct(1)).await.unwrap().order;

    for next in [OrderStatus::Approved, OrderStatus::Completed] {
        market
            .orders
            .update_order_status(&seller, order.id, status(next))
            .await
            .unwrap();
    }
    assert_eq!(market.stock_of(item.id).await, 3);

    let err = market
        .orders
        .update_order_status(&seller, order.id, status(OrderStatus::Rejected))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidState(_)));
    assert_eq!(market.stock_of(item.id).await, 3);
}

#[tokio::test]
async fn test_only_item_seller_can_update_status() {
    let market = TestMarket::new();
    let seller = market.seller_actor().await;
    let other_seller = market.seller_actor().await;
    let buyer = market.customer().await;
    let item = market.item(&seller, "Clock", 20, 1).await;
    let order = market.orders.place_order(&buyer, item.id, direct(1)).await.unwrap().order;

    let err = market
        .orders
        .update_order_status(&other_seller, order.id, status(OrderStatus::Rejected))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)));

    let err = market
        .orders
        .update_order_status(&buyer, order.id, status(OrderStatus::Approved))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Authorization(_)));

    let err = market
        .orders
        .update_order_status(&seller, order.id, status(OrderStatus::Pending))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(market.stock_of(item.id).await, 0);
}

#[tokio::test]
async fn test_order_visibility() {
    let market = TestMarket::new();
    let seller = market.seller_actor().await;
    let buyer = market.customer().await;
    let stranger = market.customer().await;
    let item = market.item(&seller, "Mug", 8, 5).await;
    let order = market.orders.place_order(&buyer, item.id, direct(1)).await.unwrap().order;

    assert!(market.orders.get_order(&buyer, order.id).await.is_ok());
    assert!(market.orders.get_order(&seller, order.id).await.is_ok());
    assert!(matches!(
        market.orders.get_order(&stranger, order.id).await,
        Err(AppError::NotFound(_))
    ));

    let mine = market.orders.list_orders(&buyer, PageQuery::default()).await.unwrap();
    assert_eq!(mine.total, 1);
    let sold = market.orders.seller_orders(&seller, PageQuery::default()).await.unwrap();
    assert_eq!(sold.data[0].id, order.id);
    assert_eq!(
        market.orders.list_orders(&stranger, PageQuery::default()).await.unwrap().total,
        0
    );
}

#[tokio::test]
async fn test_place_order_rejects_totals_beyond_the_money_column() {
    let market = TestMarket::new();
    let seller = market.seller_actor().await;
    let buyer = market.customer().await;
    let item = market.item(&seller, "Yacht", 1, 5).await;
    market.overwrite_item(item.id, |item| item.price = Decimal::MAX).await;

    let err = market.orders.place_order(&buyer, item.id, direct(2)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(market.stock_of(item.id).await, 5);

    let err = market.orders.place_order(&buyer, item.id, direct(i32::MAX)).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}
