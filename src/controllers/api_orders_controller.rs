use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::{
    AppState,
    error::FieldErrors,
    models::{OrderStatus, OrderView},
    services::{
        WriteMode,
        order_service::{self, OrderInput},
        revenue_service, search_service,
        store::OrderQuery,
    },
};

use super::{json_fields, json_rejection, path_id};

/// Order fields; omitted ones keep their value on PATCH. `status` is
/// optional even on PUT.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct OrderPayload {
    #[serde(default, deserialize_with = "json_fields::present")]
    #[schema(value_type = Option<i64>, example = 4)]
    pub table_number: Option<Value>,
    /// Meal ids.
    #[serde(default, deserialize_with = "json_fields::present")]
    #[schema(value_type = Option<Vec<i64>>)]
    pub items: Option<Value>,
    #[serde(default, deserialize_with = "json_fields::present")]
    #[schema(value_type = Option<OrderStatus>)]
    pub status: Option<Value>,
}

impl From<OrderPayload> for OrderInput {
    fn from(p: OrderPayload) -> Self {
        let mut rejected = FieldErrors::new();
        let table_number = json_fields::take(p.table_number, "table_number", &mut rejected, json_fields::integer);
        let items = json_fields::take_ids(p.items, "items", &mut rejected);
        let status = json_fields::take(p.status, "status", &mut rejected, json_fields::choice);

        OrderInput {
            table_number,
            items,
            status,
            rejected,
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Terms matched against table number and status code.
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RevenueParams {
    /// `YYYY-MM-DD`; today when omitted.
    pub date: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevenueReport {
    #[schema(value_type = String, example = "125.00")]
    pub revenue_per_shift: Decimal,
}

fn id_or_404(path: Result<Path<i64>, PathRejection>) -> Result<i64, Response> {
    path_id(path, "order").map_err(IntoResponse::into_response)
}

#[utoipa::path(
    get,
    path = "/api/v1/orders",
    tag = "orders",
    params(ListParams),
    responses((status = 200, description = "Orders with their meals, by id", body = [OrderView]))
)]
pub async fn list_orders(State(state): State<AppState>, Query(params): Query<ListParams>) -> Response {
    let result = match params.search.as_deref().map(str::trim) {
        Some(q) if !q.is_empty() => search_service::text_search(&state, q).await,
        _ => order_service::list_orders(&state, &OrderQuery::default()).await,
    };

    match result {
        Ok(orders) => Json(orders).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    tag = "orders",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 200, description = "The order", body = OrderView),
        (status = 404, description = "No such order")
    )
)]
pub async fn get_order(State(state): State<AppState>, path: Result<Path<i64>, PathRejection>) -> Response {
    let id = match id_or_404(path) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match order_service::get_order(&state, id).await {
        Ok(order) => Json(order).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tag = "orders",
    request_body = OrderPayload,
    responses(
        (status = 201, description = "Created, status WAITING unless given", body = OrderView),
        (status = 400, description = "Messages keyed by field name")
    )
)]
pub async fn create_order(
    State(state): State<AppState>,
    payload: Result<Json<OrderPayload>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(p) => p,
        Err(rej) => return json_rejection(rej),
    };

    match order_service::create_order(&state, body.into()).await {
        Ok(order) => (StatusCode::CREATED, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn update(
    state: AppState,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<OrderPayload>, JsonRejection>,
    mode: WriteMode,
) -> Response {
    let id = match id_or_404(path) {
        Ok(id) => id,
        Err(res) => return res,
    };
    let Json(body) = match payload {
        Ok(p) => p,
        Err(rej) => return json_rejection(rej),
    };

    match order_service::update_order(&state, id, body.into(), mode).await {
        Ok(order) => Json(order).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/orders/{id}",
    tag = "orders",
    params(("id" = i64, Path, description = "Order id")),
    request_body = OrderPayload,
    responses(
        (status = 200, description = "Replaced", body = OrderView),
        (status = 400, description = "Field messages, or a one-message list when the order is paid for"),
        (status = 404, description = "No such order")
    )
)]
pub async fn put_order(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<OrderPayload>, JsonRejection>,
) -> Response {
    update(state, path, payload, WriteMode::Full).await
}

#[utoipa::path(
    patch,
    path = "/api/v1/orders/{id}",
    tag = "orders",
    params(("id" = i64, Path, description = "Order id")),
    request_body = OrderPayload,
    responses(
        (status = 200, description = "Updated", body = OrderView),
        (status = 400, description = "Field messages, or a one-message list when the order is paid for"),
        (status = 404, description = "No such order")
    )
)]
pub async fn patch_order(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<OrderPayload>, JsonRejection>,
) -> Response {
    update(state, path, payload, WriteMode::Partial).await
}

#[utoipa::path(
    delete,
    path = "/api/v1/orders/{id}",
    tag = "orders",
    params(("id" = i64, Path, description = "Order id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "The order is paid for"),
        (status = 404, description = "No such order")
    )
)]
pub async fn delete_order(State(state): State<AppState>, path: Result<Path<i64>, PathRejection>) -> Response {
    let id = match id_or_404(path) {
        Ok(id) => id,
        Err(res) => return res,
    };

    match order_service::delete_order(&state, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/orders/revenue",
    tag = "orders",
    params(RevenueParams),
    responses(
        (status = 200, description = "Total of the orders paid for that day", body = RevenueReport),
        (status = 400, description = "Malformed date")
    )
)]
pub async fn get_revenue(State(state): State<AppState>, Query(params): Query<RevenueParams>) -> Response {
    let date = match params.date.as_deref() {
        Some(raw) if !raw.trim().is_empty() => match revenue_service::parse_date(raw) {
            Ok(d) => Some(d),
            Err(e) => return e.into_response(),
        },
        _ => None,
    };

    match revenue_service::revenue_for_day(&state, date).await {
        Ok(revenue_per_shift) => Json(RevenueReport { revenue_per_shift }).into_response(),
        Err(e) => e.into_response(),
    }
}
