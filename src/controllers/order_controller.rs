use axum::{
    extract::{Path, State, rejection::PathRejection},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::{CookieJar, Form};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{
    AppState,
    error::{FieldErrors, ServiceError, add_error},
    flash,
    models::{Meal, OrderStatus, OrderView, StatusFilter},
    render,
    services::{
        WriteMode,
        guard::GuardedAction,
        meal_service,
        order_service::{self, OrderInput},
        revenue_service,
        search_service::{self, SearchCriteria},
    },
};

use super::{error_page, is_htmx, page, path_id};

// ---------------- View models ----------------

fn status_options(selected: &str, with_any: bool) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::new();
    if with_any {
        out.push(json!({
            "value": StatusFilter::Any.code(),
            "label": StatusFilter::ANY_LABEL,
            "selected": selected.is_empty(),
        }));
    }
    for s in OrderStatus::ALL {
        out.push(json!({
            "value": s.as_str(),
            "label": s.label(),
            "selected": s.as_str() == selected,
        }));
    }
    out
}

fn meal_options(meals: &[Meal], selected: &[String]) -> Vec<Value> {
    meals
        .iter()
        .map(|m| {
            json!({
                "id": m.id,
                "name": m.name,
                "price": m.price.to_string(),
                "selected": selected.iter().any(|s| s.trim() == m.id.to_string()),
            })
        })
        .collect()
}

fn order_rows(state: &AppState, orders: &[OrderView]) -> Vec<Value> {
    let tz = state.settings.time_zone();
    orders
        .iter()
        .map(|o| {
            json!({
                "id": o.id,
                "table_number": o.table_number,
                "items": o.items.iter().map(|m| m.name.clone()).collect::<Vec<_>>(),
                "total_price": o.total_price.to_string(),
                "status": o.status.as_str(),
                "status_label": o.status.label(),
                "is_paid": o.status.is_final(),
                "created_at": o.created_at.with_timezone(&tz).format("%Y-%m-%d %H:%M").to_string(),
            })
        })
        .collect()
}

// ---------------- Order list + search ----------------

#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub table_number: String,
    #[serde(default)]
    pub status: String,
}

fn list_context(state: &AppState, form: &SearchForm, orders: &[OrderView], errors: &FieldErrors) -> Value {
    let rows = order_rows(state, orders);
    json!({
        "table_number": form.table_number,
        "status_options": status_options(form.status.trim(), true),
        "errors": errors,
        "has_orders": !rows.is_empty(),
        "orders": rows,
    })
}

// GET /
pub async fn get_order_list(State(state): State<AppState>, jar: CookieJar) -> Response {
    let (jar, notice) = flash::take_notice(jar);

    let orders = match search_service::search_orders(&state, SearchCriteria::default()).await {
        Ok(v) => v,
        Err(e) => return error_page(&state, &e),
    };

    let ctx = list_context(&state, &SearchForm::default(), &orders, &FieldErrors::new());
    let res = page(&state, StatusCode::OK, "Orders", "pages/order_list", &ctx, notice);
    (jar, res).into_response()
}

// POST /
pub async fn post_order_list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<SearchForm>,
) -> Response {
    let (orders, errors) = match search_service::parse_criteria(&form.table_number, &form.status) {
        Ok(criteria) => match search_service::search_orders(&state, criteria).await {
            Ok(v) => (v, FieldErrors::new()),
            Err(e) => return error_page(&state, &e),
        },
        // invalid criteria filter nothing in
        Err(errs) => (Vec::new(), errs),
    };

    let ctx = list_context(&state, &form, &orders, &errors);

    if is_htmx(&headers) {
        return match render::render_page(&state, "partials/order_rows", &ctx) {
            Ok(html) => (StatusCode::OK, Html(html)).into_response(),
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Html(e)).into_response(),
        };
    }

    page(&state, StatusCode::OK, "Orders", "pages/order_list", &ctx, None)
}

// ---------------- Create / update forms ----------------

#[derive(Debug, Default, Deserialize)]
pub struct OrderForm {
    #[serde(default)]
    pub table_number: String,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl OrderForm {
    /// Converts the raw strings; conversion failures travel in `rejected`.
    fn to_input(&self) -> OrderInput {
        let mut errs = FieldErrors::new();

        let raw_table = self.table_number.trim();
        let table_number = if raw_table.is_empty() {
            None
        } else {
            match raw_table.parse::<i64>() {
                Ok(n) => Some(n),
                Err(_) => {
                    add_error(&mut errs, "table_number", "Enter a whole number.");
                    None
                }
            }
        };

        let mut ids: Vec<i64> = Vec::with_capacity(self.items.len());
        for raw in &self.items {
            match raw.trim().parse::<i64>() {
                Ok(id) => ids.push(id),
                Err(_) => add_error(&mut errs, "items", format!("\"{}\" is not a valid value.", raw.trim())),
            }
        }
        // a multi-select with nothing chosen posts no key at all
        let items = if errs.contains_key("items") { None } else { Some(ids) };

        OrderInput {
            table_number,
            items,
            status: self.status.clone(),
            rejected: errs,
        }
    }
}

fn form_context(form: &OrderForm, meals: &[Meal], errors: &FieldErrors) -> Value {
    json!({
        "table_number": form.table_number,
        "meals": meal_options(meals, &form.items),
        "has_meals": !meals.is_empty(),
        "status_options": status_options(form.status.as_deref().unwrap_or(""), false),
        "errors": errors,
    })
}

fn render_order_form(
    state: &AppState,
    title: &str,
    tpl: &str,
    mut ctx: Value,
    order_id: Option<i64>,
) -> Response {
    if let (Some(id), Some(obj)) = (order_id, ctx.as_object_mut()) {
        obj.insert("order_id".into(), json!(id));
    }
    page(state, StatusCode::OK, title, tpl, &ctx, None)
}

// GET /order
pub async fn get_order_create(State(state): State<AppState>) -> Response {
    let meals = match meal_service::list_meals(&state).await {
        Ok(v) => v,
        Err(e) => return error_page(&state, &e),
    };
    let ctx = form_context(&OrderForm::default(), &meals, &FieldErrors::new());
    render_order_form(&state, "New order", "pages/order_create", ctx, None)
}

// POST /order
pub async fn post_order_create(State(state): State<AppState>, Form(form): Form<OrderForm>) -> Response {
    let mut input = form.to_input();
    // status is not part of the create form
    input.status = None;

    match order_service::create_order(&state, input).await {
        Ok(_) => Redirect::to("/order").into_response(),
        Err(ServiceError::Validation(errs)) => {
            let meals = match meal_service::list_meals(&state).await {
                Ok(v) => v,
                Err(e) => return error_page(&state, &e),
            };
            let ctx = form_context(&form, &meals, &errs);
            render_order_form(&state, "New order", "pages/order_create", ctx, None)
        }
        Err(e) => error_page(&state, &e),
    }
}

fn guard_redirect(jar: CookieJar, action: GuardedAction) -> Response {
    (flash::set_guard_notice(jar, action), Redirect::to("/")).into_response()
}

// GET /order/:id/change
pub async fn get_order_update(
    State(state): State<AppState>,
    jar: CookieJar,
    path: Result<Path<i64>, PathRejection>,
) -> Response {
    let id = match path_id(path, "order") {
        Ok(id) => id,
        Err(e) => return error_page(&state, &e),
    };
    let order = match order_service::get_mutable_order(&state, id, GuardedAction::Update).await {
        Ok(o) => o,
        Err(ServiceError::Guard(v)) => return guard_redirect(jar, v.action),
        Err(e) => return error_page(&state, &e),
    };
    let meals = match meal_service::list_meals(&state).await {
        Ok(v) => v,
        Err(e) => return error_page(&state, &e),
    };

    let form = OrderForm {
        table_number: order.table_number.to_string(),
        items: order.items.iter().map(|m| m.id.to_string()).collect(),
        status: Some(order.status.as_str().to_string()),
    };
    let ctx = form_context(&form, &meals, &FieldErrors::new());
    render_order_form(&state, "Edit order", "pages/order_update", ctx, Some(id))
}

// POST /order/:id/change
pub async fn post_order_update(
    State(state): State<AppState>,
    jar: CookieJar,
    path: Result<Path<i64>, PathRejection>,
    Form(form): Form<OrderForm>,
) -> Response {
    let id = match path_id(path, "order") {
        Ok(id) => id,
        Err(e) => return error_page(&state, &e),
    };
    let mut input = form.to_input();
    if input.status.is_none() {
        // the edit form always posts a status
        input.status = Some(String::new());
    }

    match order_service::update_order(&state, id, input, WriteMode::Full).await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(ServiceError::Guard(v)) => guard_redirect(jar, v.action),
        Err(ServiceError::Validation(errs)) => {
            let meals = match meal_service::list_meals(&state).await {
                Ok(v) => v,
                Err(e) => return error_page(&state, &e),
            };
            let ctx = form_context(&form, &meals, &errs);
            render_order_form(&state, "Edit order", "pages/order_update", ctx, Some(id))
        }
        Err(e) => error_page(&state, &e),
    }
}

// ---------------- Delete ----------------

// GET /order/:id/delete
pub async fn get_order_delete(
    State(state): State<AppState>,
    jar: CookieJar,
    path: Result<Path<i64>, PathRejection>,
) -> Response {
    let id = match path_id(path, "order") {
        Ok(id) => id,
        Err(e) => return error_page(&state, &e),
    };
    let order = match order_service::get_mutable_order(&state, id, GuardedAction::Delete).await {
        Ok(o) => o,
        Err(ServiceError::Guard(v)) => return guard_redirect(jar, v.action),
        Err(e) => return error_page(&state, &e),
    };

    let rows = order_rows(&state, std::slice::from_ref(&order));
    let ctx = json!({ "order": rows.first() });
    page(&state, StatusCode::OK, "Delete order", "pages/order_delete", &ctx, None)
}

// POST /order/:id/delete
pub async fn post_order_delete(
    State(state): State<AppState>,
    jar: CookieJar,
    path: Result<Path<i64>, PathRejection>,
) -> Response {
    let id = match path_id(path, "order") {
        Ok(id) => id,
        Err(e) => return error_page(&state, &e),
    };
    match order_service::delete_order(&state, id).await {
        Ok(()) => Redirect::to("/").into_response(),
        Err(ServiceError::Guard(v)) => guard_redirect(jar, v.action),
        Err(e) => error_page(&state, &e),
    }
}

// ---------------- Revenue ----------------

// GET /revenue
pub async fn get_revenue(State(state): State<AppState>) -> Response {
    let tz = state.settings.time_zone();
    let revenue = match revenue_service::revenue_for_day(&state, None).await {
        Ok(v) => v,
        Err(e) => return error_page(&state, &e),
    };

    let ctx = json!({
        "revenue": revenue.to_string(),
        "date": revenue_service::today(tz).format("%Y-%m-%d").to_string(),
    });
    page(&state, StatusCode::OK, "Revenue", "pages/revenue", &ctx, None)
}
