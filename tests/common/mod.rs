use reqwest::{header, StatusCode};
use sea_orm::{ConnectOptions, Database};
use std::sync::Arc;

use rust_bistro::create_app;
use rust_bistro::entities::{primary_setup, setup_schema};

pub const ADMIN_PASSWORD: &str = "Kitchen15";

/// Boots the whole app over an in-memory sqlite database on an ephemeral
/// port and returns the base url. One connection only, so every request
/// in the test sees the same database.
pub async fn spawn_app() -> String {
    std::env::set_var("SECRET", "integration-test-secret");

    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options)
        .await
        .expect("Failed to connect to sqlite");
    setup_schema(&db).await;

    let db = Arc::new(db);
    primary_setup(db.clone()).await;

    let app = create_app(db);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server crashed");
    });

    format!("http://{}", addr)
}

/// Boots the app over a database with no schema, so every query fails.
#[allow(dead_code)]
pub async fn spawn_bare_app() -> String {
    std::env::set_var("SECRET", "integration-test-secret");

    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options)
        .await
        .expect("Failed to connect to sqlite");

    let app = create_app(Arc::new(db));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server crashed");
    });

    format!("http://{}", addr)
}

pub async fn register(client: &reqwest::Client, base: &str, username: &str, password: &str) {
    let payload = serde_json::json!({
        "username": username,
        "password": password
    });

    let response = client
        .post(format!("{}/register", base))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), StatusCode::CREATED);
}

pub async fn login(client: &reqwest::Client, base: &str, username: &str, password: &str) -> String {
    let payload = serde_json::json!({
        "username": username,
        "password": password
    });

    let response = client
        .post(format!("{}/login", base))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), StatusCode::OK);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse login response JSON");

    body["token"]
        .as_str()
        .expect("Token not found in login response")
        .to_string()
}

pub fn bearer(token: &str) -> header::HeaderMap {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token))
            .expect("Failed to create Authorization header"),
    );
    headers
}

/// Decimals come over the wire as strings; parse them for comparisons.
pub fn decimal(value: &serde_json::Value) -> f64 {
    value
        .as_str()
        .expect("Expected a decimal string")
        .parse()
        .expect("Failed to parse decimal string")
}

/// Seeds one category and one menu item through the staff endpoints and
/// returns the menu item id.
pub async fn seed_menu_item(
    client: &reqwest::Client,
    base: &str,
    admin_token: &str,
    title: &str,
    price: &str,
) -> i64 {
    let category_payload = serde_json::json!({
        "slug": format!("{}-category", title),
        "title": format!("{} category", title)
    });
    let response = client
        .post(format!("{}/api/categories", base))
        .headers(bearer(admin_token))
        .json(&category_payload)
        .send()
        .await
        .expect("Failed to send create category request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let categories = client
        .get(format!("{}/api/categories", base))
        .send()
        .await
        .expect("Failed to list categories")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse categories JSON");
    let category_id = categories
        .as_array()
        .expect("Expected a category array")
        .iter()
        .find(|c| c["slug"] == format!("{}-category", title))
        .expect("Seeded category missing")["id"]
        .as_i64()
        .expect("Category id missing");

    let item_payload = serde_json::json!({
        "title": title,
        "price": price,
        "category_id": category_id
    });
    let response = client
        .post(format!("{}/api/menu-items", base))
        .headers(bearer(admin_token))
        .json(&item_payload)
        .send()
        .await
        .expect("Failed to send create menu item request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let items = client
        .get(format!("{}/api/menu-items", base))
        .send()
        .await
        .expect("Failed to list menu items")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse menu items JSON");
    items
        .as_array()
        .expect("Expected a menu item array")
        .iter()
        .find(|i| i["title"] == title)
        .expect("Seeded menu item missing")["id"]
        .as_i64()
        .expect("Menu item id missing")
}
