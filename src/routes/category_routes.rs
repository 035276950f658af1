use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use sea_orm::{DatabaseConnection, EntityTrait, Set, TransactionTrait};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::entities::category::{self, Entity as CategoryEntity};
use crate::entities::user::Role;
use crate::middleware::auth::auth_middleware;

//ROUTERS
pub fn category_routes() -> Router {
    Router::new().route("/categories", get(get_categories))
}

pub fn staff_category_routes() -> Router {
    Router::new()
        .route("/categories", post(create_category))
        .layer(axum::middleware::from_fn_with_state(
            Role::Manager,
            auth_middleware,
        ))
}

//ROUTES
async fn get_categories(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match CategoryEntity::find().all(&*db).await {
        Ok(categories) => (StatusCode::OK, Json(json!(categories))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error"
            })),
        ),
    }
}

async fn create_category(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateCategory>,
) -> impl IntoResponse {
    debug!(slug = %payload.slug, "Called `create_category()`");

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

    let new_category = category::ActiveModel {
        slug: Set(payload.slug),
        title: Set(payload.title),
        ..Default::default()
    };

    match category::Entity::insert(new_category).exec(&txn).await {
        Ok(_) => match txn.commit().await {
            Ok(_) => (
                StatusCode::CREATED,
                Json(json!({
                    "message": "Category created successfully"
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
            debug!(error = ?err, "Category insert rejected");
            let _ = txn.rollback().await;
            (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "Category already exists"
                })),
            )
        }
    }
}

//Structs
#[derive(Deserialize, Debug)]
struct CreateCategory {
    slug: String,
    title: String,
}
