use axum::{Router, routing::get};
use crate::{AppState, controllers::meal_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router.route("/meal", get(meal_controller::get_meal_create).post(meal_controller::post_meal_create))
}
