mod common;

use common::{bearer, decimal, login, register, seed_menu_item, spawn_app, ADMIN_PASSWORD};
use reqwest::StatusCode;
use serde_json::json;
use tokio;

#[tokio::test]
async fn test_get_cart_starts_empty() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    register(&client, &base, "user", "Muzion15").await;
    let token = login(&client, &base, "user", "Muzion15").await;

    let response = client
        .get(format!("{}/api/cart/menu-items", base))
        .headers(bearer(&token))
        .send()
        .await
        .expect("Failed to send get cart request");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse get cart response JSON");
    assert_eq!(body, serde_json::Value::Array(vec![]));
}

#[tokio::test]
async fn test_add_item_computes_price() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let admin_token = login(&client, &base, "admin", ADMIN_PASSWORD).await;
    let item_id = seed_menu_item(&client, &base, &admin_token, "Margherita", "6.50").await;

    register(&client, &base, "user", "Muzion15").await;
    let token = login(&client, &base, "user", "Muzion15").await;

    let payload = json!({
        "menuitem_id": item_id,
        "quantity": 2
    });
    let response = client
        .post(format!("{}/api/cart/menu-items", base))
        .headers(bearer(&token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send add item request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = client
        .get(format!("{}/api/cart/menu-items", base))
        .headers(bearer(&token))
        .send()
        .await
        .expect("Failed to send get cart request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse get cart response JSON");

    let lines = body.as_array().expect("Expected a cart array");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 2);
    assert_eq!(decimal(&lines[0]["unit_price"]), 6.5);
    assert_eq!(decimal(&lines[0]["price"]), 13.0);
}

#[tokio::test]
async fn test_repeated_add_increments_quantity() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let admin_token = login(&client, &base, "admin", ADMIN_PASSWORD).await;
    let item_id = seed_menu_item(&client, &base, &admin_token, "Carbonara", "9.00").await;

    register(&client, &base, "user", "Muzion15").await;
    let token = login(&client, &base, "user", "Muzion15").await;

    let payload = json!({
        "menuitem_id": item_id,
        "quantity": 1
    });
    let response = client
        .post(format!("{}/api/cart/menu-items", base))
        .headers(bearer(&token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send add item request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let payload = json!({
        "menuitem_id": item_id,
        "quantity": 2
    });
    let response = client
        .post(format!("{}/api/cart/menu-items", base))
        .headers(bearer(&token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send add item request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = client
        .get(format!("{}/api/cart/menu-items", base))
        .headers(bearer(&token))
        .send()
        .await
        .expect("Failed to send get cart request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse get cart response JSON");

    //Still one line for the pair, with price recomputed.
    let lines = body.as_array().expect("Expected a cart array");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 3);
    assert_eq!(decimal(&lines[0]["price"]), 27.0);
}

#[tokio::test]
async fn test_add_zero_quantity_is_rejected() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let admin_token = login(&client, &base, "admin", ADMIN_PASSWORD).await;
    let item_id = seed_menu_item(&client, &base, &admin_token, "Focaccia", "3.00").await;

    register(&client, &base, "user", "Muzion15").await;
    let token = login(&client, &base, "user", "Muzion15").await;

    let payload = json!({
        "menuitem_id": item_id,
        "quantity": 0
    });
    let response = client
        .post(format!("{}/api/cart/menu-items", base))
        .headers(bearer(&token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send add item request");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_unknown_menu_item() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    register(&client, &base, "user", "Muzion15").await;
    let token = login(&client, &base, "user", "Muzion15").await;

    let payload = json!({
        "menuitem_id": 404,
        "quantity": 1
    });
    let response = client
        .post(format!("{}/api/cart/menu-items", base))
        .headers(bearer(&token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send add item request");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_set_quantity_recomputes_price() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let admin_token = login(&client, &base, "admin", ADMIN_PASSWORD).await;
    let item_id = seed_menu_item(&client, &base, &admin_token, "Risotto", "12.00").await;

    register(&client, &base, "user", "Muzion15").await;
    let token = login(&client, &base, "user", "Muzion15").await;

    let payload = json!({
        "menuitem_id": item_id,
        "quantity": 1
    });
    let response = client
        .post(format!("{}/api/cart/menu-items", base))
        .headers(bearer(&token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send add item request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let payload = json!({ "quantity": 4 });
    let response = client
        .put(format!("{}/api/cart/menu-items/{}", base, item_id))
        .headers(bearer(&token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send set quantity request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = response
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse set quantity response JSON");
    assert_eq!(body["quantity"], 4);
    assert_eq!(decimal(&body["price"]), 48.0);
}

#[tokio::test]
async fn test_set_quantity_to_zero_removes_line() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let admin_token = login(&client, &base, "admin", ADMIN_PASSWORD).await;
    let item_id = seed_menu_item(&client, &base, &admin_token, "Gnocchi", "10.00").await;

    register(&client, &base, "user", "Muzion15").await;
    let token = login(&client, &base, "user", "Muzion15").await;

    let payload = json!({
        "menuitem_id": item_id,
        "quantity": 2
    });
    let response = client
        .post(format!("{}/api/cart/menu-items", base))
        .headers(bearer(&token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send add item request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let payload = json!({ "quantity": 0 });
    let response = client
        .put(format!("{}/api/cart/menu-items/{}", base, item_id))
        .headers(bearer(&token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send set quantity request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = client
        .get(format!("{}/api/cart/menu-items", base))
        .headers(bearer(&token))
        .send()
        .await
        .expect("Failed to send get cart request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse get cart response JSON");
    assert_eq!(body, serde_json::Value::Array(vec![]));
}

#[tokio::test]
async fn test_remove_single_line() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let admin_token = login(&client, &base, "admin", ADMIN_PASSWORD).await;
    let kept = seed_menu_item(&client, &base, &admin_token, "Lasagna", "11.00").await;
    let removed = seed_menu_item(&client, &base, &admin_token, "Tiramisu", "4.50").await;

    register(&client, &base, "user", "Muzion15").await;
    let token = login(&client, &base, "user", "Muzion15").await;

    for item_id in [kept, removed] {
        let payload = json!({
            "menuitem_id": item_id,
            "quantity": 1
        });
        let response = client
            .post(format!("{}/api/cart/menu-items", base))
            .headers(bearer(&token))
            .json(&payload)
            .send()
            .await
            .expect("Failed to send add item request");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = client
        .delete(format!("{}/api/cart/menu-items/{}", base, removed))
        .headers(bearer(&token))
        .send()
        .await
        .expect("Failed to send remove line request");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = client
        .get(format!("{}/api/cart/menu-items", base))
        .headers(bearer(&token))
        .send()
        .await
        .expect("Failed to send get cart request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse get cart response JSON");

    let lines = body.as_array().expect("Expected a cart array");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["menuitem_id"], kept);
}

#[tokio::test]
async fn test_clear_cart() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let admin_token = login(&client, &base, "admin", ADMIN_PASSWORD).await;
    let first = seed_menu_item(&client, &base, &admin_token, "Panzanella", "7.00").await;
    let second = seed_menu_item(&client, &base, &admin_token, "Arancini", "5.00").await;

    register(&client, &base, "user", "Muzion15").await;
    let token = login(&client, &base, "user", "Muzion15").await;

    for item_id in [first, second] {
        let payload = json!({
            "menuitem_id": item_id,
            "quantity": 1
        });
        let response = client
            .post(format!("{}/api/cart/menu-items", base))
            .headers(bearer(&token))
            .json(&payload)
            .send()
            .await
            .expect("Failed to send add item request");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = client
        .delete(format!("{}/api/cart/menu-items", base))
        .headers(bearer(&token))
        .send()
        .await
        .expect("Failed to send clear cart request");
    assert_eq!(response.status(), StatusCode::OK);

    let body = client
        .get(format!("{}/api/cart/menu-items", base))
        .headers(bearer(&token))
        .send()
        .await
        .expect("Failed to send get cart request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse get cart response JSON");
    assert_eq!(body, serde_json::Value::Array(vec![]));
}

#[tokio::test]
async fn test_carts_are_scoped_per_user() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    let admin_token = login(&client, &base, "admin", ADMIN_PASSWORD).await;
    let item_id = seed_menu_item(&client, &base, &admin_token, "Polenta", "6.00").await;

    register(&client, &base, "first", "Muzion15").await;
    register(&client, &base, "second", "Muzion15").await;
    let first_token = login(&client, &base, "first", "Muzion15").await;
    let second_token = login(&client, &base, "second", "Muzion15").await;

    let payload = json!({
        "menuitem_id": item_id,
        "quantity": 1
    });
    let response = client
        .post(format!("{}/api/cart/menu-items", base))
        .headers(bearer(&first_token))
        .json(&payload)
        .send()
        .await
        .expect("Failed to send add item request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = client
        .get(format!("{}/api/cart/menu-items", base))
        .headers(bearer(&second_token))
        .send()
        .await
        .expect("Failed to send get cart request")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse get cart response JSON");
    assert_eq!(body, serde_json::Value::Array(vec![]));
}
