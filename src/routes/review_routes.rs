use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, JoinType,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::entities::user::Role;
use crate::entities::{
    menu_item, review, review::Entity as ReviewEntity, user,
};
use crate::middleware::auth::{auth_middleware, Claims};

//ROUTERS
pub fn review_routes() -> Router {
    Router::new().route("/menu-items/:id/reviews", get(get_reviews))
}

pub fn customer_review_routes() -> Router {
    Router::new()
        .route("/menu-items/:id/reviews", post(create_review))
        .layer(axum::middleware::from_fn_with_state(
            Role::Customer,
            auth_middleware,
        ))
}

//ROUTES
async fn get_reviews(
    Path(menuitem_id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match menu_item::Entity::find_by_id(menuitem_id).one(&*db).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("No menu item with {} id was found", menuitem_id)
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

    match ReviewEntity::find()
        .filter(review::Column::MenuitemId.eq(menuitem_id))
        .join(JoinType::InnerJoin, review::Relation::User.def())
        .column_as(user::Column::Username, "username")
        .order_by_desc(review::Column::CreatedAt)
        .into_model::<ReviewResponse>()
        .all(&*db)
        .await
    {
        Ok(reviews) => (StatusCode::OK, Json(json!(reviews))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error"
            })),
        ),
    }
}

async fn create_review(
    Path(menuitem_id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateReview>,
) -> impl IntoResponse {
    if let Err(err) = payload.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!("Invalid review: {}", err)
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

    match menu_item::Entity::find_by_id(menuitem_id).one(&txn).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("No menu item with {} id was found", menuitem_id)
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

    //The author is always the caller, never taken from the payload.
    let new_review = review::ActiveModel {
        user_id: Set(claims.user_id),
        menuitem_id: Set(menuitem_id),
        rating: Set(payload.rating),
        comment: Set(payload.comment.unwrap_or_default()),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    match new_review.insert(&txn).await {
        Ok(created) => match txn.commit().await {
            Ok(_) => (StatusCode::CREATED, Json(json!(created))),
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
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            )
        }
    }
}

//Structs
#[derive(Deserialize, Debug, Validate)]
struct CreateReview {
    #[validate(range(min = 1, max = 5))]
    rating: i32,
    comment: Option<String>,
}

#[derive(Serialize, FromQueryResult)]
struct ReviewResponse {
    id: i32,
    user_id: i32,
    username: String,
    rating: i32,
    comment: String,
    created_at: DateTime<Utc>,
}
