use axum::{
    extract::{Path, rejection::PathRejection},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::{AppState, error::ServiceError, render};

pub mod home_controller;
pub mod meal_controller;
pub mod order_controller;

pub mod api_docs_controller;
pub mod api_meals_controller;
pub mod api_orders_controller;
pub mod json_fields;

pub(crate) fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// An id that does not parse names no record.
pub(crate) fn path_id(path: Result<Path<i64>, PathRejection>, what: &'static str) -> Result<i64, ServiceError> {
    path.map(|Path(id)| id).map_err(|_| ServiceError::NotFound(what))
}

/// Renders `tpl` inside the base layout with the given status.
pub(crate) fn page(
    state: &AppState,
    status: StatusCode,
    title: &str,
    tpl: &str,
    ctx: &impl Serialize,
    notice: Option<&str>,
) -> Response {
    match render::render_in_layout(state, title, tpl, ctx, notice) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(format!("template error: {e}")),
        )
            .into_response(),
    }
}

/// HTML rendition of a failure that has no form to go back to.
pub(crate) fn error_page(state: &AppState, err: &ServiceError) -> Response {
    match err {
        ServiceError::NotFound(what) => page(
            state,
            StatusCode::NOT_FOUND,
            "404",
            "pages/not_found",
            &json!({ "what": what }),
            None,
        ),
        ServiceError::Storage(e) => {
            tracing::error!("storage failure: {e}");
            page(
                state,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error",
                "pages/error",
                &json!({ "message": "The order database is unavailable." }),
                None,
            )
        }
        other => page(
            state,
            StatusCode::BAD_REQUEST,
            "Error",
            "pages/error",
            &json!({ "message": other.to_string() }),
            None,
        ),
    }
}

/// Malformed JSON bodies are a client error like any other validation failure.
pub(crate) fn json_rejection(rej: axum::extract::rejection::JsonRejection) -> Response {
    (
        StatusCode::BAD_REQUEST,
        axum::Json(json!({ "detail": rej.body_text() })),
    )
        .into_response()
}
