pub mod auth_routes;
pub mod cart_routes;
pub mod category_routes;
pub mod group_routes;
pub mod menu_item_routes;
pub mod order_routes;
pub mod reservation_routes;
pub mod review_routes;

use axum::{Extension, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use {
    auth_routes::auth_routes,
    cart_routes::cart_routes,
    category_routes::{category_routes, staff_category_routes},
    group_routes::group_routes,
    menu_item_routes::{menu_item_routes, staff_menu_item_routes},
    order_routes::{order_routes, staff_order_routes},
    reservation_routes::{reservation_routes, staff_reservation_routes},
    review_routes::{customer_review_routes, review_routes},
};

pub fn api_router(db: Arc<DatabaseConnection>) -> Router {
    let auth_routes = auth_routes();
    let category_routes = category_routes();
    let staff_category_routes = staff_category_routes();
    let menu_item_routes = menu_item_routes();
    let staff_menu_item_routes = staff_menu_item_routes();
    let review_routes = review_routes();
    let customer_review_routes = customer_review_routes();
    let cart_routes = cart_routes();
    let order_routes = order_routes();
    let staff_order_routes = staff_order_routes();
    let reservation_routes = reservation_routes();
    let staff_reservation_routes = staff_reservation_routes();
    let group_routes = group_routes();

    Router::new()
        .merge(auth_routes)
        .nest("/api", category_routes)
        .nest("/api", staff_category_routes)
        .nest("/api", menu_item_routes)
        .nest("/api", staff_menu_item_routes)
        .nest("/api", review_routes)
        .nest("/api", customer_review_routes)
        .nest("/api", cart_routes)
        .nest("/api", order_routes)
        .nest("/api", staff_order_routes)
        .nest("/api", reservation_routes)
        .nest("/api", staff_reservation_routes)
        .nest("/api", group_routes)
        .layer(Extension(db))
}
