use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use cafe_order::{
    AppState,
    config::Settings,
    models::{NewMeal, NewOrder, OrderStatus},
    routes,
    services::{memory_store::MemoryStore, store::Store},
};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tower::ServiceExt;

const ENDPOINT: &str = "/api/v1/meals";

async fn test_state() -> AppState {
    AppState::new(Settings::default(), Arc::new(MemoryStore::new()))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };

    let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn add_meal(state: &AppState, name: &str, cents: i64) -> i64 {
    state
        .store
        .insert_meal(NewMeal {
            name: name.to_string(),
            price: Decimal::new(cents, 2),
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn create_meal_returns_the_stored_meal() {
    let state = test_state().await;
    let app = routes::app(state.clone());

    let (status, body) = call(&app, "POST", ENDPOINT, Some(json!({ "name": "Pasta", "price": "130.00" }))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], json!("Pasta"));
    assert_eq!(body["price"], json!("130.00"));
    let id = body["id"].as_i64().unwrap();
    assert!(state.store.get_meal(id).await.unwrap().is_some());
}

#[tokio::test]
async fn create_meal_normalizes_the_price() {
    let app = routes::app(test_state().await);

    let (status, body) = call(&app, "POST", ENDPOINT, Some(json!({ "name": "  Soup ", "price": 5 }))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], json!("Soup"));
    assert_eq!(body["price"], json!("5.00"));
}

#[tokio::test]
async fn create_meal_with_invalid_fields() {
    let state = test_state().await;
    let app = routes::app(state.clone());

    let (status, body) = call(&app, "POST", ENDPOINT, Some(json!({ "name": "", "price": "-500" }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["name"][0], json!("This field may not be blank."));
    assert_eq!(body["price"][0], json!("Ensure this value is greater than or equal to 0."));
    assert!(state.store.list_meals().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_meal_rejects_too_precise_and_too_large_prices() {
    let app = routes::app(test_state().await);

    let (status, body) = call(&app, "POST", ENDPOINT, Some(json!({ "name": "Tea", "price": "1.005" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("price").is_some());

    let (status, body) = call(&app, "POST", ENDPOINT, Some(json!({ "name": "Tea", "price": "10000" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("price").is_some());
}

#[tokio::test]
async fn list_and_get_meals() {
    let state = test_state().await;
    let soup = add_meal(&state, "Soup", 500).await;
    add_meal(&state, "Steak", 2500).await;
    let app = routes::app(state);

    let (status, body) = call(&app, "GET", ENDPOINT, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, body) = call(&app, "GET", &format!("{ENDPOINT}/{soup}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], json!("Soup"));

    let (status, body) = call(&app, "GET", &format!("{ENDPOINT}/999"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Not found." }));
}

#[tokio::test]
async fn patch_and_put_meal() {
    let state = test_state().await;
    let soup = add_meal(&state, "Soup", 500).await;
    let app = routes::app(state);

    let (status, body) = call(&app, "PATCH", &format!("{ENDPOINT}/{soup}"), Some(json!({ "price": "6.5" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], json!("Soup"));
    assert_eq!(body["price"], json!("6.50"));

    let (status, body) = call(&app, "PUT", &format!("{ENDPOINT}/{soup}"), Some(json!({ "price": "7" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["name"][0], json!("This field is required."));

    let (status, body) = call(
        &app,
        "PUT",
        &format!("{ENDPOINT}/{soup}"),
        Some(json!({ "name": "Borscht", "price": "7" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], json!("Borscht"));
    assert_eq!(body["price"], json!("7.00"));
}

#[tokio::test]
async fn deleting_a_meal_drops_it_from_orders() {
    let state = test_state().await;
    let soup = add_meal(&state, "Soup", 500).await;
    let steak = add_meal(&state, "Steak", 2500).await;
    let order = state
        .store
        .insert_order(NewOrder {
            table_number: 3,
            items: vec![soup, steak],
            status: OrderStatus::Waiting,
            created_at: 1_700_000_000,
        })
        .await
        .unwrap();
    let app = routes::app(state.clone());

    let (status, _) = call(&app, "DELETE", &format!("{ENDPOINT}/{soup}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(state.store.get_meal(soup).await.unwrap().is_none());

    let (status, body) = call(&app, "GET", &format!("/api/v1/orders/{}", order.id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["total_price"], json!("25.00"));

    let (status, _) = call(&app, "DELETE", &format!("{ENDPOINT}/{soup}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn wrong_types_are_reported_per_field() {
    let state = test_state().await;
    let soup = add_meal(&state, "Soup", 500).await;
    let app = routes::app(state.clone());

    let (status, body) = call(&app, "POST", ENDPOINT, Some(json!({ "name": "Tea", "price": "abc" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "price": ["A valid number is required."] }));

    let (status, body) = call(&app, "POST", ENDPOINT, Some(json!({ "name": ["Tea"], "price": "1.50" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "name": ["Not a valid string."] }));

    // a bad price on PATCH is not replaced by the stored one
    let (status, body) = call(&app, "PATCH", &format!("{ENDPOINT}/{soup}"), Some(json!({ "price": true }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["price"], json!(["A valid number is required."]));

    assert_eq!(state.store.list_meals().await.unwrap().len(), 1);
}

#[tokio::test]
async fn non_numeric_meal_id_is_404() {
    let app = routes::app(test_state().await);

    for method in ["GET", "DELETE"] {
        let (status, body) = call(&app, method, &format!("{ENDPOINT}/abc"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "detail": "Not found." }));
    }

    let (status, _) = call(&app, "PUT", &format!("{ENDPOINT}/1.5"), Some(json!({ "name": "Tea", "price": "1" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
