use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use cafe_order::{
    AppState,
    config::{Settings, StorageBackend},
    models::{NewMeal, NewOrder, OrderStatus},
    routes,
    services::{memory_store::MemoryStore, store::Store},
};
use chrono::Utc;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use tower::ServiceExt;

async fn test_state() -> AppState {
    let settings = Settings {
        storage: StorageBackend::Memory,
        max_tables: 20,
        ..Settings::default()
    };
    AppState::new(settings, Arc::new(MemoryStore::new()))
}

async fn response_body_string(res: Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn get(app: &Router, uri: &str) -> Response {
    let req = Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(req).await.unwrap()
}

async fn post_form(app: &Router, uri: &str, form: &str) -> Response {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

fn location(res: &Response) -> &str {
    res.headers().get(header::LOCATION).unwrap().to_str().unwrap()
}

fn set_cookie(res: &Response) -> String {
    res.headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default()
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

async fn add_order(state: &AppState, table: u16, items: Vec<i64>, status: OrderStatus) -> i64 {
    state
        .store
        .insert_order(NewOrder {
            table_number: table,
            items,
            status,
            created_at: Utc::now().timestamp(),
        })
        .await
        .unwrap()
        .id
}

/// Borscht at table 1 (waiting), Pelmeni at table 2 (ready), Blini at table 2 (paid).
async fn seeded() -> (AppState, Vec<i64>) {
    let state = test_state().await;
    let borscht = add_meal(&state, "Borscht", 5000).await;
    let pelmeni = add_meal(&state, "Pelmeni", 7500).await;
    let blini = add_meal(&state, "Blini", 2000).await;

    let ids = vec![
        add_order(&state, 1, vec![borscht], OrderStatus::Waiting).await,
        add_order(&state, 2, vec![pelmeni], OrderStatus::Ready).await,
        add_order(&state, 2, vec![blini], OrderStatus::PaidFor).await,
    ];
    (state, ids)
}

#[tokio::test]
async fn order_list_shows_every_order() {
    let (state, _) = seeded().await;
    let app = routes::app(state);

    let res = get(&app, "/").await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Borscht"));
    assert!(body.contains("Pelmeni"));
    assert!(body.contains("Blini"));
}

#[tokio::test]
async fn order_list_without_orders() {
    let app = routes::app(test_state().await);

    let body = response_body_string(get(&app, "/").await).await;
    assert!(body.contains("No orders found."));
}

#[tokio::test]
async fn filter_by_table_number() {
    let (state, _) = seeded().await;
    let app = routes::app(state);

    let body = response_body_string(post_form(&app, "/", "table_number=2&status=").await).await;
    assert!(!body.contains("Borscht"));
    assert!(body.contains("Pelmeni"));
    assert!(body.contains("Blini"));
}

#[tokio::test]
async fn filter_by_status() {
    let (state, _) = seeded().await;
    let app = routes::app(state);

    let body = response_body_string(post_form(&app, "/", "table_number=&status=WAITING").await).await;
    assert!(body.contains("Borscht"));
    assert!(!body.contains("Pelmeni"));
    assert!(!body.contains("Blini"));
}

#[tokio::test]
async fn filter_by_table_and_status() {
    let (state, _) = seeded().await;
    let app = routes::app(state);

    let body = response_body_string(post_form(&app, "/", "table_number=2&status=PAID_FOR").await).await;
    assert!(!body.contains("Borscht"));
    assert!(!body.contains("Pelmeni"));
    assert!(body.contains("Blini"));
}

#[tokio::test]
async fn zero_table_number_does_not_filter() {
    let (state, _) = seeded().await;
    let app = routes::app(state);

    let body = response_body_string(post_form(&app, "/", "table_number=0&status=").await).await;
    assert!(body.contains("Borscht"));
    assert!(body.contains("Blini"));
}

#[tokio::test]
async fn invalid_filter_lists_nothing() {
    let (state, _) = seeded().await;
    let app = routes::app(state);

    let res = post_form(&app, "/", "table_number=abc&status=").await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Enter a whole number."));
    assert!(body.contains("No orders found."));
    assert!(!body.contains("Borscht"));
}

#[tokio::test]
async fn htmx_search_returns_only_the_rows() {
    let (state, _) = seeded().await;
    let app = routes::app(state);

    let req = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("HX-Request", "true")
        .body(Body::from("table_number=1&status="))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(!body.contains("<html"));
    assert!(body.contains("order-rows"));
    assert!(body.contains("Borscht"));
    assert!(!body.contains("Pelmeni"));
}

#[tokio::test]
async fn htmx_search_with_invalid_criteria_keeps_the_errors() {
    let (state, _) = seeded().await;
    let app = routes::app(state);

    let req = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header("HX-Request", "true")
        .body(Body::from("table_number=abc&status=LOST"))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(!body.contains("<html"));
    assert!(body.contains("Enter a whole number."));
    assert!(body.contains("Select a valid choice. LOST is not one of the available choices."));
    assert!(body.contains("No orders found."));
    assert!(!body.contains("Borscht"));
}

#[tokio::test]
async fn create_form_lists_meals() {
    let (state, _) = seeded().await;
    let app = routes::app(state);

    let res = get(&app, "/order").await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = response_body_string(res).await;
    assert!(body.contains("Pelmeni"));
    assert!(body.contains("name=\"items\""));
}

#[tokio::test]
async fn create_order_redirects_back_to_the_form() {
    let state = test_state().await;
    let soup = add_meal(&state, "Soup", 500).await;
    let tea = add_meal(&state, "Tea", 150).await;
    let app = routes::app(state.clone());

    let res = post_form(&app, "/order", &format!("table_number=3&items={soup}&items={tea}")).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/order");

    let orders = state.store.list_orders(&Default::default()).await.unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].table_number, 3);
    assert_eq!(orders[0].items, vec![soup, tea]);
    assert_eq!(orders[0].status, OrderStatus::Waiting);
}

#[tokio::test]
async fn create_order_with_invalid_data_rerenders_the_form() {
    let state = test_state().await;
    add_meal(&state, "Soup", 500).await;
    let app = routes::app(state.clone());

    let res = post_form(&app, "/order", "table_number=-1").await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("Ensure this value is greater than or equal to 1."));
    // no meal chosen
    assert!(body.contains("This list may not be empty."));
    assert!(state.store.list_orders(&Default::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn update_order() {
    let (state, ids) = seeded().await;
    let app = routes::app(state.clone());

    let res = get(&app, &format!("/order/{}/change", ids[0])).await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = post_form(
        &app,
        &format!("/order/{}/change", ids[0]),
        "table_number=5&items=2&items=3&status=READY",
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");

    let order = state.store.get_order(ids[0]).await.unwrap().unwrap();
    assert_eq!(order.table_number, 5);
    assert_eq!(order.items, vec![2, 3]);
    assert_eq!(order.status, OrderStatus::Ready);
}

#[tokio::test]
async fn update_unknown_order_is_404() {
    let app = routes::app(test_state().await);

    let res = get(&app, "/order/999/change").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = get(&app, "/order/abc/change").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = post_form(&app, "/order/abc/delete", "").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_without_meals_asks_for_a_non_empty_list() {
    let (state, ids) = seeded().await;
    let app = routes::app(state.clone());
    let before = state.store.get_order(ids[0]).await.unwrap();

    let res = post_form(
        &app,
        &format!("/order/{}/change", ids[0]),
        "table_number=5&status=READY",
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = response_body_string(res).await;
    assert!(body.contains("This list may not be empty."));
    assert!(!body.contains("This field is required."));
    assert_eq!(state.store.get_order(ids[0]).await.unwrap(), before);
}

#[tokio::test]
async fn update_paid_order_is_refused_with_a_notice() {
    let (state, ids) = seeded().await;
    let app = routes::app(state.clone());
    let before = state.store.get_order(ids[2]).await.unwrap();

    let res = get(&app, &format!("/order/{}/change", ids[2])).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(set_cookie(&res).contains("flash=update_prohibited"));

    let res = post_form(
        &app,
        &format!("/order/{}/change", ids[2]),
        "table_number=9&items=1&status=WAITING",
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    assert!(set_cookie(&res).contains("flash=update_prohibited"));

    assert_eq!(state.store.get_order(ids[2]).await.unwrap(), before);
}

#[tokio::test]
async fn delete_order() {
    let (state, ids) = seeded().await;
    let app = routes::app(state.clone());

    let res = get(&app, &format!("/order/{}/delete", ids[1])).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(response_body_string(res).await.contains("Pelmeni"));

    let res = post_form(&app, &format!("/order/{}/delete", ids[1]), "").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    assert!(state.store.get_order(ids[1]).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_paid_order_is_refused_with_a_notice() {
    let (state, ids) = seeded().await;
    let app = routes::app(state.clone());

    let res = post_form(&app, &format!("/order/{}/delete", ids[2]), "").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/");
    assert!(set_cookie(&res).contains("flash=delete_prohibited"));
    assert!(state.store.get_order(ids[2]).await.unwrap().is_some());
}

#[tokio::test]
async fn notice_is_shown_once() {
    let (state, _) = seeded().await;
    let app = routes::app(state);

    let req = Request::builder()
        .method("GET")
        .uri("/")
        .header(header::COOKIE, "flash=delete_prohibited")
        .body(Body::empty())
        .unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    // the cookie is cleared on the way out
    assert!(set_cookie(&res).starts_with("flash="));
    assert!(!set_cookie(&res).contains("delete_prohibited"));

    let body = response_body_string(res).await;
    assert!(body.contains("Deleting a paid order is prohibited."));

    let body = response_body_string(get(&app, "/").await).await;
    assert!(!body.contains("Deleting a paid order is prohibited."));
}

#[tokio::test]
async fn revenue_page_shows_todays_total() {
    let state = test_state().await;
    let fifty = add_meal(&state, "Set menu", 5000).await;
    let seventy_five = add_meal(&state, "Tasting menu", 7500).await;
    add_order(&state, 1, vec![fifty], OrderStatus::PaidFor).await;
    add_order(&state, 2, vec![seventy_five], OrderStatus::PaidFor).await;
    add_order(&state, 3, vec![seventy_five], OrderStatus::Ready).await;
    let app = routes::app(state);

    let res = get(&app, "/revenue").await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(response_body_string(res).await.contains("125.00"));
}

#[tokio::test]
async fn unknown_page_is_404() {
    let app = routes::app(test_state().await);

    let res = get(&app, "/no-such-page").await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
