use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::{get, put},
    Json, Router,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::entities::user::Role;
use crate::entities::{cart, cart::Entity as CartEntity, menu_item};
use crate::middleware::{
    auth::{auth_middleware, Claims},
    logging::{to_response, ApiError},
};

//ROUTERS
pub fn cart_routes() -> Router {
    Router::new()
        .route("/cart/menu-items", get(get_cart).post(add_item).delete(clear_cart))
        .route(
            "/cart/menu-items/:menuitem_id",
            put(set_quantity).delete(remove_item),
        )
        .layer(axum::middleware::from_fn_with_state(
            Role::Customer,
            auth_middleware,
        ))
}

//ROUTES
async fn get_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    let user_id = claims.user_id;

    match CartEntity::find()
        .filter(cart::Column::UserId.eq(user_id))
        .join(JoinType::InnerJoin, cart::Relation::MenuItem.def())
        .column_as(menu_item::Column::Title, "title")
        .into_model::<CartResponse>()
        .all(&*db)
        .await
    {
        Ok(items) => to_response(Json(items), Ok(())),
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

async fn add_item(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<AddItem>,
) -> Response {
    let user_id = claims.user_id;
    let quantity = payload.quantity.unwrap_or(1);

    if quantity == 0 {
        return to_response(
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Quantity should be greater than 0"
                })),
            ),
            Err(ApiError::ValidationFail("quantity is zero".into())),
        );
    }

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

    let item = match menu_item::Entity::find_by_id(payload.menuitem_id).one(&txn).await {
        Ok(Some(item)) => item,
        Ok(None) => {
            return to_response(
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "error": format!("No menu item with {} id was found", payload.menuitem_id)
                    })),
                ),
                Err(ApiError::General("unknown menu item".into())),
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

    //If the pair already exists we bump the quantity instead of creating a
    //second line; price is recomputed from the snapshotted unit price.
    if let Ok(Some(entry)) = CartEntity::find()
        .filter(cart::Column::MenuitemId.eq(payload.menuitem_id))
        .filter(cart::Column::UserId.eq(user_id))
        .one(&txn)
        .await
    {
        let unit_price = entry.unit_price;
        let new_quantity = entry.quantity + quantity;
        let mut entry: cart::ActiveModel = entry.into();
        entry.quantity = Set(new_quantity);
        entry.price = Set(Decimal::from(new_quantity) * unit_price);
        return match entry.update(&txn).await {
            Ok(_) => match txn.commit().await {
                Ok(_) => to_response(
                    (
                        StatusCode::OK,
                        Json(json!({
                            "message": "Item already exists, quantity updated"
                        })),
                    ),
                    Ok(()),
                ),
                Err(err) => to_response(
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "error": "Internal server error"
                        })),
                    ),
                    Err(ApiError::DbError(err.to_string())),
                ),
            },
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
        };
    }

    let new_entry = cart::ActiveModel {
        user_id: Set(user_id),
        menuitem_id: Set(payload.menuitem_id),
        quantity: Set(quantity),
        unit_price: Set(item.price),
        price: Set(Decimal::from(quantity) * item.price),
        ..Default::default()
    };

    match CartEntity::insert(new_entry).exec(&txn).await {
        Ok(_) => match txn.commit().await {
            Ok(_) => to_response(
                (
                    StatusCode::CREATED,
                    Json(json!({
                        "message": "Item added to cart"
                    })),
                ),
                Ok(()),
            ),
            Err(err) => to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::DbError(err.to_string())),
            ),
        },
        Err(err) => {
            let _ = txn.rollback().await;
            to_response(
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                ),
                Err(ApiError::DbError(err.to_string())),
            )
        }
    }
}

async fn clear_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    let user_id = claims.user_id;

    match CartEntity::delete_many()
        .filter(cart::Column::UserId.eq(user_id))
        .exec(&*db)
        .await
    {
        Ok(_) => to_response(
            (
                StatusCode::OK,
                Json(json!({
                    "message": "Cart cleared"
                })),
            ),
            Ok(()),
        ),
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

async fn set_quantity(
    Path(menuitem_id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<PatchCart>,
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

    match CartEntity::find()
        .filter(cart::Column::MenuitemId.eq(menuitem_id))
        .filter(cart::Column::UserId.eq(user_id))
        .one(&txn)
        .await
    {
        Ok(Some(entry)) => {
            //Quantity below 1 removes the line entirely.
            if payload.quantity == 0 {
                let entry: cart::ActiveModel = entry.into();
                return match entry.delete(&txn).await {
                    Ok(_) => {
                        let _ = txn.commit().await;
                        to_response(StatusCode::NO_CONTENT, Ok(()))
                    }
                    Err(err) => {
                        let _ = txn.rollback().await;
                        to_response(
                            (
                                StatusCode::BAD_REQUEST,
                                Json(json!({
                                    "error": "Failed to delete this resource"
                                })),
                            ),
                            Err(ApiError::DbError(err.to_string())),
                        )
                    }
                };
            }

            let unit_price = entry.unit_price;
            let mut entry: cart::ActiveModel = entry.into();
            entry.quantity = Set(payload.quantity);
            entry.price = Set(Decimal::from(payload.quantity) * unit_price);
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
        Ok(None) => to_response(
            (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("No cart line for menu item {} was found", menuitem_id)
                })),
            ),
            Err(ApiError::General("unknown cart line".into())),
        ),
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

async fn remove_item(
    Path(menuitem_id): Path<i32>,
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

    match CartEntity::find()
        .filter(cart::Column::MenuitemId.eq(menuitem_id))
        .filter(cart::Column::UserId.eq(user_id))
        .one(&txn)
        .await
    {
        Ok(Some(entry)) => {
            let entry: cart::ActiveModel = entry.into();
            match entry.delete(&txn).await {
                Ok(_) => {
                    let _ = txn.commit().await;
                    to_response(StatusCode::NO_CONTENT, Ok(()))
                }
                Err(err) => {
                    let _ = txn.rollback().await;
                    to_response(
                        (
                            StatusCode::BAD_REQUEST,
                            Json(json!({
                                "error": "Failed to delete this resource"
                            })),
                        ),
                        Err(ApiError::DbError(err.to_string())),
                    )
                }
            }
        }
        Ok(None) => to_response(
            (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("No cart line for menu item {} was found", menuitem_id)
                })),
            ),
            Err(ApiError::General("unknown cart line".into())),
        ),
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

//Structs
#[derive(Deserialize, Debug)]
struct AddItem {
    menuitem_id: i32,
    quantity: Option<u32>,
}

#[derive(Deserialize, Debug)]
struct PatchCart {
    quantity: u32,
}

#[derive(Serialize, FromQueryResult)]
struct CartResponse {
    id: i32,
    menuitem_id: i32,
    title: String,
    quantity: u32,
    unit_price: Decimal,
    price: Decimal,
}
