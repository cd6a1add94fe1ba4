use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use serde::Deserialize;
use serde_json::json;

use crate::{
    AppState,
    error::{FieldErrors, ServiceError, add_error},
    models::Meal,
    services::meal_service::{self, MealInput},
};

use super::{error_page, page};

#[derive(Debug, Default, Deserialize)]
pub struct MealForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
}

fn render_meal_form(state: &AppState, form: &MealForm, meals: &[Meal], errors: &FieldErrors) -> Response {
    let meals: Vec<_> = meals
        .iter()
        .map(|m| json!({ "id": m.id, "name": m.name, "price": m.price.to_string() }))
        .collect();

    let ctx = json!({
        "name": form.name,
        "price": form.price,
        "errors": errors,
        "has_meals": !meals.is_empty(),
        "meals": meals,
    });
    page(state, StatusCode::OK, "New meal", "pages/meal_create", &ctx, None)
}

// GET /meal
pub async fn get_meal_create(State(state): State<AppState>) -> Response {
    match meal_service::list_meals(&state).await {
        Ok(meals) => render_meal_form(&state, &MealForm::default(), &meals, &FieldErrors::new()),
        Err(e) => error_page(&state, &e),
    }
}

// POST /meal
pub async fn post_meal_create(State(state): State<AppState>, Form(form): Form<MealForm>) -> Response {
    let mut rejected = FieldErrors::new();

    let price = if form.price.trim().is_empty() {
        None
    } else {
        match meal_service::parse_price(&form.price) {
            Ok(p) => Some(p),
            Err(msg) => {
                add_error(&mut rejected, "price", msg);
                None
            }
        }
    };

    let input = MealInput {
        name: Some(form.name.clone()),
        price,
        rejected,
    };

    match meal_service::create_meal(&state, input).await {
        Ok(_) => Redirect::to("/meal").into_response(),
        Err(ServiceError::Validation(errs)) => match meal_service::list_meals(&state).await {
            Ok(meals) => render_meal_form(&state, &form, &meals, &errs),
            Err(e) => error_page(&state, &e),
        },
        Err(e) => error_page(&state, &e),
    }
}
