use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::json;
use utoipa::OpenApi;

use crate::{
    AppState,
    models::{Meal, OrderStatus, OrderView},
    render,
};

use super::{
    api_meals_controller::{self, MealPayload},
    api_orders_controller::{self, OrderPayload, RevenueReport},
};

pub const SCHEMA_PATH: &str = "/api/v1/doc/schema";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cafe Order API",
        description = "Cafe order management system.",
        version = "1.0.0"
    ),
    paths(
        api_meals_controller::list_meals,
        api_meals_controller::get_meal,
        api_meals_controller::create_meal,
        api_meals_controller::put_meal,
        api_meals_controller::patch_meal,
        api_meals_controller::delete_meal,
        api_orders_controller::list_orders,
        api_orders_controller::get_order,
        api_orders_controller::create_order,
        api_orders_controller::put_order,
        api_orders_controller::patch_order,
        api_orders_controller::delete_order,
        api_orders_controller::get_revenue,
    ),
    components(schemas(Meal, MealPayload, OrderStatus, OrderView, OrderPayload, RevenueReport)),
    tags(
        (name = "meals", description = "Menu items"),
        (name = "orders", description = "Table orders, revenue and search")
    )
)]
pub struct ApiDoc;

// GET /api/v1/doc/schema
pub async fn schema() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

// GET /api/v1/doc
pub async fn swagger_ui(State(state): State<AppState>) -> Response {
    match render::render_page(&state, "pages/api_docs", &json!({ "schema_url": SCHEMA_PATH })) {
        Ok(html) => (StatusCode::OK, Html(html)).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
    }
}
