use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::{get, patch},
    Json, Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::entities::user::{self, Role};
use crate::entities::{
    cart, cart::Entity as CartEntity, order, order::Entity as OrderEntity, order_item,
    order_item::Entity as OrderItemEntity,
};
use crate::middleware::{
    auth::{auth_middleware, Claims},
    logging::{to_response, ApiError},
};

//ROUTERS
pub fn order_routes() -> Router {
    Router::new()
        .route("/orders", get(get_orders).post(place_order))
        .route("/orders/:id", get(get_order))
        .layer(axum::middleware::from_fn_with_state(
            Role::Customer,
            auth_middleware,
        ))
}

pub fn staff_order_routes() -> Router {
    Router::new()
        .route("/orders/:id", patch(patch_order))
        .layer(axum::middleware::from_fn_with_state(
            Role::Delivery,
            auth_middleware,
        ))
}

//ROUTES
async fn get_orders(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    //Customers see their own orders, delivery crew the ones assigned to
    //them, managers and admins everything.
    let mut query = OrderEntity::find();
    match claims.role() {
        Role::Customer => {
            query = query.filter(order::Column::UserId.eq(claims.user_id));
        }
        Role::Delivery => {
            query = query.filter(order::Column::DeliveryCrewId.eq(claims.user_id));
        }
        Role::Manager | Role::Admin => {}
    }

    match query.find_with_related(OrderItemEntity).all(&*db).await {
        Ok(orders) => {
            let response: Vec<OrderResponse> = orders
                .into_iter()
                .map(|(order, items)| OrderResponse { order, items })
                .collect();
            to_response(Json(response), Ok(()))
        }
        Err(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            ),
            Err(ApiError::DbError(err.to_string())),
        ),
    }
}

/// Checkout: turns the caller's cart into an order plus one order item per
/// cart line, then clears the cart. Runs inside a single transaction.
async fn place_order(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    let user_id = claims.user_id;
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::TransactionCreationFailed),
            );
        }
    };

    let lines = match CartEntity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .all(&txn)
        .await
    {
        Ok(lines) => lines,
        Err(err) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::DbError(err.to_string())),
            );
        }
    };

    //An empty cart is answered with a plain message, not an error status.
    if lines.is_empty() {
        return to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "message": "no item in cart"
                })),
            ),
            Ok(()),
        );
    }

    let total: Decimal = lines.iter().map(|line| line.price).sum();

    let new_order = order::ActiveModel {
        user_id: Set(user_id),
        delivery_crew_id: Set(None),
        status: Set(false),
        total: Set(total),
        date: Set(Utc::now().date_naive()),
        ..Default::default()
    };

    let placed = match new_order.insert(&txn).await {
        Ok(placed) => placed,
        Err(err) => {
            let _ = txn.rollback().await;
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::DbError(err.to_string())),
            );
        }
    };

    let items: Vec<order_item::ActiveModel> = lines
        .iter()
        .map(|line| order_item::ActiveModel {
            order_id: Set(placed.id),
            menuitem_id: Set(line.menuitem_id),
            quantity: Set(line.quantity),
            price: Set(line.price),
            ..Default::default()
        })
        .collect();

    if let Err(err) = OrderItemEntity::insert_many(items).exec(&txn).await {
        let _ = txn.rollback().await;
        return to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            ),
            Err(ApiError::DbError(err.to_string())),
        );
    }

    if let Err(err) = CartEntity::delete_many()
        .filter(cart::Column::UserId.eq(user_id))
        .exec(&txn)
        .await
    {
        let _ = txn.rollback().await;
        return to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            ),
            Err(ApiError::DbError(err.to_string())),
        );
    }

    match txn.commit().await {
        Ok(_) => {
            let items = match OrderItemEntity::find()
                .filter(order_item::Column::OrderId.eq(placed.id))
                .all(&*db)
                .await
            {
                Ok(items) => items,
                Err(err) => {
                    return to_response(
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            Json(json!({
                                "error": "Internal server error"
                            })),
                        ),
                        Err(ApiError::DbError(err.to_string())),
                    );
                }
            };
            to_response(
                (
                    StatusCode::CREATED,
                    Json(json!(OrderResponse {
                        order: placed,
                        items
                    })),
                ),
                Ok(()),
            )
        }
        Err(err) => to_response(
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            ),
            Err(ApiError::DbError(err.to_string())),
        ),
    }
}

async fn get_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    let order = match OrderEntity::find_by_id(id).one(&*db).await {
        Ok(Some(order)) => order,
        Ok(None) => {
            return to_response(
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "error": format!("No order with {} id was found", id)
                    })),
                ),
                Err(ApiError::General("unknown order".into())),
            );
        }
        Err(err) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::DbError(err.to_string())),
            );
        }
    };

    //Orders outside the caller's scope look like they do not exist.
    let visible = match claims.role() {
        Role::Customer => order.user_id == claims.user_id,
        Role::Delivery => order.delivery_crew_id == Some(claims.user_id),
        Role::Manager | Role::Admin => true,
    };
    if !visible {
        return to_response(
            (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("No order with {} id was found", id)
                })),
            ),
            Err(ApiError::General("order outside caller scope".into())),
        );
    }

    let items = match OrderItemEntity::find()
        .filter(order_item::Column::OrderId.eq(order.id))
        .all(&*db)
        .await
    {
        Ok(items) => items,
        Err(err) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::DbError(err.to_string())),
            );
        }
    };

    to_response(Json(json!(OrderResponse { order, items })), Ok(()))
}

async fn patch_order(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchOrder>,
) -> Response {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::TransactionCreationFailed),
            );
        }
    };

    let entry = match OrderEntity::find_by_id(id).one(&txn).await {
        Ok(Some(entry)) => entry,
        Ok(None) => {
            return to_response(
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "error": format!("No order with {} id was found", id)
                    })),
                ),
                Err(ApiError::General("unknown order".into())),
            );
        }
        Err(err) => {
            return to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::DbError(err.to_string())),
            );
        }
    };

    //An assignment must point at an actual delivery crew member.
    if let Some(delivery_crew_id) = payload.delivery_crew_id {
        match user::Entity::find_by_id(delivery_crew_id)
            .filter(user::Column::Role.eq(Role::Delivery))
            .one(&txn)
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => {
                return to_response(
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": format!(
                                "User {} is not a delivery crew member",
                                delivery_crew_id
                            )
                        })),
                    ),
                    Err(ApiError::ValidationFail("assignee is not delivery crew".into())),
                );
            }
            Err(err) => {
                return to_response(
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "error": "Internal server error"
                        })),
                    ),
                    Err(ApiError::DbError(err.to_string())),
                );
            }
        }
    }

    let mut entry: order::ActiveModel = entry.into();
    if let Some(status) = payload.status {
        entry.status = Set(status);
    }
    if let Some(delivery_crew_id) = payload.delivery_crew_id {
        entry.delivery_crew_id = Set(Some(delivery_crew_id));
    }

    match entry.update(&txn).await {
        Ok(updated) => {
            let _ = txn.commit().await;
            to_response((StatusCode::OK, Json(json!(updated))), Ok(()))
        }
        Err(err) => {
            let _ = txn.rollback().await;
            to_response(
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "Failed to patch this resource"
                    })),
                ),
                Err(ApiError::DbError(err.to_string())),
            )
        }
    }
}

//Structs
#[derive(Serialize)]
struct OrderResponse {
    #[serde(flatten)]
    order: order::Model,
    items: Vec<order_item::Model>,
}

#[derive(Deserialize, Debug)]
struct PatchOrder {
    status: Option<bool>,
    delivery_crew_id: Option<i32>,
}
