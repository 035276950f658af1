use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, FromQueryResult,
    JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::entities::user::Role;
use crate::entities::{category, menu_item, menu_item::Entity as MenuItemEntity};
use crate::middleware::auth::auth_middleware;

//ROUTERS
pub fn menu_item_routes() -> Router {
    Router::new()
        .route("/menu-items", get(get_menu_items))
        .route("/menu-items/:id", get(get_menu_item))
}

pub fn staff_menu_item_routes() -> Router {
    Router::new()
        .route("/menu-items", post(create_menu_item))
        .route(
            "/menu-items/:id",
            put(update_menu_item)
                .patch(update_menu_item)
                .delete(delete_menu_item),
        )
        .layer(axum::middleware::from_fn_with_state(
            Role::Manager,
            auth_middleware,
        ))
}

//ROUTES
async fn get_menu_items(
    Query(query): Query<MenuItemQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    let mut condition = Condition::all();

    //Filter zone
    if let Some(category_title) = query.category {
        condition = condition.add(category::Column::Title.eq(category_title));
    }
    if let Some(featured) = query.featured {
        condition = condition.add(menu_item::Column::Featured.eq(featured));
    }
    if let Some(search) = query.query {
        condition = condition.add(
            Condition::any()
                .add(menu_item::Column::Title.contains(&search))
                .add(category::Column::Title.contains(&search)),
        );
    }

    //Sorting zone
    let order = match query.order.as_deref() {
        Some("desc") => sea_orm::Order::Desc,
        _ => sea_orm::Order::Asc,
    };

    let sort_column = match query.sort_by.as_deref() {
        Some("price") => menu_item::Column::Price,
        _ => menu_item::Column::Title,
    };

    let sort_category_column = match query.sort_by.as_deref() {
        Some("category") => Some(category::Column::Title),
        _ => None,
    };

    //Pagination zone
    let page: u64 = query.page.unwrap_or(1).max(1);
    let page_size: u64 = query.page_size.unwrap_or(10);

    let mut half_items = MenuItemEntity::find()
        .filter(condition)
        .join(JoinType::InnerJoin, menu_item::Relation::Category.def())
        .column_as(category::Column::Title, "category_title");

    if let Some(col) = sort_category_column {
        half_items = half_items.order_by(col, order)
    } else {
        half_items = half_items.order_by(sort_column, order)
    }

    match half_items
        .limit(page_size)
        .offset((page - 1) * page_size)
        .into_model::<MenuItemResponse>()
        .all(&*db)
        .await
    {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error"
            })),
        )
            .into_response(),
    }
}

async fn get_menu_item(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match MenuItemEntity::find_by_id(id).one(&*db).await {
        Ok(Some(item)) => (StatusCode::OK, Json(json!(item))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("No menu item with {} id was found", id)
            })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error"
            })),
        ),
    }
}

async fn create_menu_item(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateMenuItem>,
) -> impl IntoResponse {
    debug!(title = %payload.title, "Called `create_menu_item()`");

    if payload.price < Decimal::ZERO {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "Price can not be negative"
            })),
        );
    }

    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            );
        }
    };

    match category::Entity::find_by_id(payload.category_id).one(&txn).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("Category with id {} not found", payload.category_id)
                })),
            );
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            );
        }
    }

    //IF MODEL CHANGES DEFAULT VALUE -> NEED TO CHANGE HERE TOO
    let new_item = menu_item::ActiveModel {
        title: Set(payload.title),
        price: Set(payload.price),
        featured: Set(payload.featured.unwrap_or(false)),
        image: Set(payload.image.unwrap_or_else(|| "default_image.jpg".to_string())),
        category_id: Set(payload.category_id),
        ..Default::default()
    };

    match menu_item::Entity::insert(new_item).exec(&txn).await {
        Ok(_) => match txn.commit().await {
            Ok(_) => (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Menu item created successfully"
                })),
            ),
            Err(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            ),
        },
        Err(err) => {
            debug!(error = ?err, "Menu item insert rejected");
            let _ = txn.rollback().await;
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Failed to create menu item"
                })),
            )
        }
    }
}

async fn update_menu_item(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchMenuItem>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            );
        }
    };

    let entry = match MenuItemEntity::find_by_id(id).one(&txn).await {
        Ok(Some(entry)) => entry,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("No menu item with {} id was found", id)
                })),
            );
        }
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            );
        }
    };

    if let Some(category_id) = payload.category_id {
        match category::Entity::find_by_id(category_id).one(&txn).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "error": format!("Category with id {} not found", category_id)
                    })),
                );
            }
            Err(_) => {
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal server error"
                    })),
                );
            }
        }
    }

    if let Some(price) = payload.price {
        if price < Decimal::ZERO {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Price can not be negative"
                })),
            );
        }
    }

    let mut entry: menu_item::ActiveModel = entry.into();
    if let Some(title) = payload.title {
        entry.title = Set(title);
    }
    if let Some(price) = payload.price {
        entry.price = Set(price);
    }
    if let Some(featured) = payload.featured {
        entry.featured = Set(featured);
    }
    if let Some(image) = payload.image {
        entry.image = Set(image);
    }
    if let Some(category_id) = payload.category_id {
        entry.category_id = Set(category_id);
    }

    match entry.update(&txn).await {
        Ok(_) => match txn.commit().await {
            Ok(_) => (
                StatusCode::OK,
                Json(json!({
                    "message": "Resource patched successfully"
                })),
            ),
            Err(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            ),
        },
        Err(_) => {
            let _ = txn.rollback().await;
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Failed to patch this resource"
                })),
            )
        }
    }
}

async fn delete_menu_item(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    let txn = match db.begin().await {
        Ok(txn) => txn,
        Err(_) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            );
        }
    };

    match MenuItemEntity::find_by_id(id).one(&txn).await {
        Ok(Some(entry)) => {
            let entry: menu_item::ActiveModel = entry.into();
            match entry.delete(&txn).await {
                Ok(_) => {
                    let _ = txn.commit().await;
                    (
                        StatusCode::OK,
                        Json(json!({
                            "message": "Resource deleted successfully"
                        })),
                    )
                }
                Err(_) => {
                    let _ = txn.rollback().await;
                    (
                        StatusCode::BAD_REQUEST,
                        Json(json!({
                            "error": "Failed to delete this resource"
                        })),
                    )
                }
            }
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("No menu item with {} id was found", id)
            })),
        ),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error"
            })),
        ),
    }
}

//Structs
#[derive(Deserialize, Debug)]
struct MenuItemQuery {
    category: Option<String>,
    featured: Option<bool>,
    query: Option<String>,
    sort_by: Option<String>,
    order: Option<String>,
    page: Option<u64>,
    page_size: Option<u64>,
}

#[derive(Serialize, FromQueryResult)]
struct MenuItemResponse {
    id: i32,
    title: String,
    price: Decimal,
    featured: bool,
    image: String,
    category_id: i32,
    category_title: String,
}

#[derive(Deserialize, Debug)]
struct CreateMenuItem {
    title: String,
    price: Decimal,
    featured: Option<bool>,
    image: Option<String>,
    category_id: i32,
}

#[derive(Deserialize, Debug)]
struct PatchMenuItem {
    title: Option<String>,
    price: Option<Decimal>,
    featured: Option<bool>,
    image: Option<String>,
    category_id: Option<i32>,
}
