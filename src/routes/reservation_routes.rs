use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::entities::reservation::{self, Entity as ReservationEntity};
use crate::entities::user::Role;
use crate::middleware::auth::auth_middleware;

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?[0-9][0-9 \-]{5,13}[0-9]$").expect("Failed to compile phone regex")
});

//ROUTERS
pub fn reservation_routes() -> Router {
    Router::new()
        .route("/reservations", post(create_reservation))
        .layer(axum::middleware::from_fn_with_state(
            Role::Customer,
            auth_middleware,
        ))
}

pub fn staff_reservation_routes() -> Router {
    Router::new()
        .route("/reservations", get(get_reservations))
        .route(
            "/reservations/:id",
            get(get_reservation).patch(patch_reservation),
        )
        .layer(axum::middleware::from_fn_with_state(
            Role::Manager,
            auth_middleware,
        ))
}

//ROUTES
async fn create_reservation(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<CreateReservation>,
) -> impl IntoResponse {
    if let Err(err) = payload.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!("Invalid reservation: {}", err)
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

    let new_reservation = reservation::ActiveModel {
        date: Set(payload.date),
        time: Set(payload.time),
        phone_number: Set(payload.phone_number),
        number_of_guests: Set(payload.number_of_guests),
        message: Set(payload.message.unwrap_or_default()),
        ..Default::default()
    };

    match new_reservation.insert(&txn).await {
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

async fn get_reservations(
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match ReservationEntity::find().all(&*db).await {
        Ok(reservations) => (StatusCode::OK, Json(json!(reservations))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "Internal server error"
            })),
        ),
    }
}

async fn get_reservation(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> impl IntoResponse {
    match ReservationEntity::find_by_id(id).one(&*db).await {
        Ok(Some(reservation)) => (StatusCode::OK, Json(json!(reservation))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("No reservation with {} id was found", id)
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

async fn patch_reservation(
    Path(id): Path<i32>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Json(payload): Json<PatchReservation>,
) -> impl IntoResponse {
    if let Err(err) = payload.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!("Invalid reservation: {}", err)
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

    match ReservationEntity::find_by_id(id).one(&txn).await {
        Ok(Some(entry)) => {
            let mut entry: reservation::ActiveModel = entry.into();
            if let Some(date) = payload.date {
                entry.date = Set(date);
            }
            if let Some(time) = payload.time {
                entry.time = Set(time);
            }
            if let Some(phone_number) = payload.phone_number {
                entry.phone_number = Set(phone_number);
            }
            if let Some(number_of_guests) = payload.number_of_guests {
                entry.number_of_guests = Set(number_of_guests);
            }
            if let Some(message) = payload.message {
                entry.message = Set(message);
            }

            match entry.update(&txn).await {
                Ok(updated) => {
                    let _ = txn.commit().await;
                    (StatusCode::OK, Json(json!(updated)))
                }
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
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": format!("No reservation with {} id was found", id)
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
#[derive(Deserialize, Debug, Validate)]
struct CreateReservation {
    date: NaiveDate,
    time: NaiveTime,
    #[validate(regex(path = *PHONE_REGEX))]
    phone_number: String,
    #[validate(range(min = 1))]
    number_of_guests: i32,
    message: Option<String>,
}

#[derive(Deserialize, Debug, Validate)]
struct PatchReservation {
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    #[validate(regex(path = *PHONE_REGEX))]
    phone_number: Option<String>,
    #[validate(range(min = 1))]
    number_of_guests: Option<i32>,
    message: Option<String>,
}
