use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter,
    QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::entities::user::{self, Entity as UserEntity, Role};
use crate::middleware::auth::auth_middleware;

//ROUTERS
pub fn group_routes() -> Router {
    let manager_group = Router::new()
        .route(
            "/groups/manager/users",
            get(get_managers).post(add_manager).delete(remove_manager),
        )
        .layer(axum::middleware::from_fn_with_state(
            Role::Admin,
            auth_middleware,
        ));

    let delivery_group = Router::new()
        .route(
            "/groups/delivery-crew/users",
            get(get_delivery_crew)
                .post(add_delivery_crew)
                .delete(remove_delivery_crew),
        )
        .layer(axum::middleware::from_fn_with_state(
            Role::Manager,
            auth_middleware,
        ));

    manager_group.merge(delivery_group)
}

//ROUTES
async fn get_managers(Extension(db): Extension<Arc<DatabaseConnection>>) -> impl IntoResponse {
    list_group(db, Role::Manager).await
}

async fn add_manager(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<GroupMember>,
) -> impl IntoResponse {
    change_role(db, payload.username, Role::Customer, Role::Manager).await
}

async fn remove_manager(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<GroupMember>,
) -> impl IntoResponse {
    change_role(db, payload.username, Role::Manager, Role::Customer).await
}

async fn get_delivery_crew(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    list_group(db, Role::Delivery).await
}

async fn add_delivery_crew(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<GroupMember>,
) -> impl IntoResponse {
    change_role(db, payload.username, Role::Customer, Role::Delivery).await
}

async fn remove_delivery_crew(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<GroupMember>,
) -> impl IntoResponse {
    change_role(db, payload.username, Role::Delivery, Role::Customer).await
}

async fn list_group(db: Arc<DatabaseConnection>, role: Role) -> (StatusCode, Json<serde_json::Value>) {
    match UserEntity::find()
        .filter(user::Column::Role.eq(role))
        .select_only()
        .column(user::Column::Id)
        .column(user::Column::Username)
        .into_model::<GroupUserResponse>()
        .all(&*db)
        .await
    {
        Ok(users) => (StatusCode::OK, Json(json!(users))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error"
            })),
        ),
    }
}

/// Moves a user from one role to another. Membership is a role column
/// here, so "adding to a group" promotes and "removing" demotes back to
/// customer; a user already holding some other role is left untouched.
async fn change_role(
    db: Arc<DatabaseConnection>,
    username: String,
    from: Role,
    to: Role,
) -> (StatusCode, Json<serde_json::Value>) {
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

    let entry = match UserEntity::find()
        .filter(user::Column::Username.eq(&username))
        .one(&txn)
        .await
    {
        Ok(Some(entry)) => entry,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": format!("No user named {} was found", username)
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

    if entry.role != from {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!("User {} does not hold the {} role", username, from)
            })),
        );
    }

    let mut entry: user::ActiveModel = entry.into();
    entry.role = Set(to);

    match entry.update(&txn).await {
        Ok(_) => match txn.commit().await {
            Ok(_) => (
                StatusCode::OK,
                Json(json!({
                    "message": format!("User {} now holds the {} role", username, to)
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
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal server error"
                })),
            )
        }
    }
}

//Structs
#[derive(Deserialize, Debug)]
struct GroupMember {
    username: String,
}

#[derive(Serialize, FromQueryResult)]
struct GroupUserResponse {
    id: i32,
    username: String,
}
