use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::{
    AppState,
    error::FieldErrors,
    models::Meal,
    services::{
        WriteMode,
        meal_service::{self, MealInput},
    },
};

use super::{json_fields, json_rejection, path_id};

/// Meal fields; omitted ones keep their value on PATCH.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MealPayload {
    #[serde(default, deserialize_with = "json_fields::present")]
    #[schema(value_type = Option<String>, example = "Pasta")]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "json_fields::present")]
    #[schema(value_type = Option<String>, example = "130.00")]
    pub price: Option<Value>,
}

impl From<MealPayload> for MealInput {
    fn from(p: MealPayload) -> Self {
        let mut rejected = FieldErrors::new();
        let name = json_fields::take(p.name, "name", &mut rejected, json_fields::text);
        let price = json_fields::take(p.price, "price", &mut rejected, json_fields::decimal);

        MealInput {
            name,
            price,
            rejected,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/meals",
    tag = "meals",
    responses((status = 200, description = "Every meal, by id", body = [Meal]))
)]
pub async fn list_meals(State(state): State<AppState>) -> Response {
    match meal_service::list_meals(&state).await {
        Ok(meals) => Json(meals).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/meals/{id}",
    tag = "meals",
    params(("id" = i64, Path, description = "Meal id")),
    responses(
        (status = 200, description = "The meal", body = Meal),
        (status = 404, description = "No such meal")
    )
)]
pub async fn get_meal(State(state): State<AppState>, path: Result<Path<i64>, PathRejection>) -> Response {
    let id = match path_id(path, "meal") {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match meal_service::get_meal(&state, id).await {
        Ok(meal) => Json(meal).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/meals",
    tag = "meals",
    request_body = MealPayload,
    responses(
        (status = 201, description = "Created", body = Meal),
        (status = 400, description = "Messages keyed by field name")
    )
)]
pub async fn create_meal(
    State(state): State<AppState>,
    payload: Result<Json<MealPayload>, JsonRejection>,
) -> Response {
    let Json(body) = match payload {
        Ok(p) => p,
        Err(rej) => return json_rejection(rej),
    };

    match meal_service::create_meal(&state, body.into()).await {
        Ok(meal) => (StatusCode::CREATED, Json(meal)).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn update(
    state: AppState,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<MealPayload>, JsonRejection>,
    mode: WriteMode,
) -> Response {
    let id = match path_id(path, "meal") {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    let Json(body) = match payload {
        Ok(p) => p,
        Err(rej) => return json_rejection(rej),
    };

    match meal_service::update_meal(&state, id, body.into(), mode).await {
        Ok(meal) => Json(meal).into_response(),
        Err(e) => e.into_response(),
    }
}

#[utoipa::path(
    put,
    path = "/api/v1/meals/{id}",
    tag = "meals",
    params(("id" = i64, Path, description = "Meal id")),
    request_body = MealPayload,
    responses(
        (status = 200, description = "Replaced", body = Meal),
        (status = 400, description = "Messages keyed by field name"),
        (status = 404, description = "No such meal")
    )
)]
pub async fn put_meal(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<MealPayload>, JsonRejection>,
) -> Response {
    update(state, path, payload, WriteMode::Full).await
}

#[utoipa::path(
    patch,
    path = "/api/v1/meals/{id}",
    tag = "meals",
    params(("id" = i64, Path, description = "Meal id")),
    request_body = MealPayload,
    responses(
        (status = 200, description = "Updated", body = Meal),
        (status = 400, description = "Messages keyed by field name"),
        (status = 404, description = "No such meal")
    )
)]
pub async fn patch_meal(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<MealPayload>, JsonRejection>,
) -> Response {
    update(state, path, payload, WriteMode::Partial).await
}

#[utoipa::path(
    delete,
    path = "/api/v1/meals/{id}",
    tag = "meals",
    params(("id" = i64, Path, description = "Meal id")),
    responses(
        (status = 204, description = "Deleted, and dropped from every order"),
        (status = 404, description = "No such meal")
    )
)]
pub async fn delete_meal(State(state): State<AppState>, path: Result<Path<i64>, PathRejection>) -> Response {
    let id = match path_id(path, "meal") {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };

    match meal_service::delete_meal(&state, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
