mod common;

use common::{bearer, login, register, spawn_app, ADMIN_PASSWORD};
use reqwest::StatusCode;
use serde_json::json;
use tokio;

#[tokio::test]
async fn test_register_and_login() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    register(&client, &base, "alice", "Muzion15").await;
    let token = login(&client, &base, "alice", "Muzion15").await;
    assert!(!token.is_empty());
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    register(&client, &base, "bob", "Muzion15").await;

    let payload = json!({
        "username": "bob",
        "password": "Another15"
    });
    let response = client
        .post(format!("{}/register", base))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send register request");

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    register(&client, &base, "carol", "Muzion15").await;

    let payload = json!({
        "username": "carol",
        "password": "wrong"
    });
    let response = client
        .post(format!("{}/login", base))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/cart/menu-items", base))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_customer_is_forbidden_from_staff_routes() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    register(&client, &base, "dave", "Muzion15").await;
    let token = login(&client, &base, "dave", "Muzion15").await;

    let payload = json!({
        "slug": "mains",
        "title": "Mains"
    });
    let response = client
        .post(format!("{}/api/categories", base))
        .headers(bearer(&token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_can_use_staff_routes() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let token = login(&client, &base, "admin", ADMIN_PASSWORD).await;

    let payload = json!({
        "slug": "starters",
        "title": "Starters"
    });
    let response = client
        .post(format!("{}/api/categories", base))
        .headers(bearer(&token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
}
