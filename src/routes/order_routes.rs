use axum::{Router, routing::get};
use crate::{AppState, controllers::order_controller};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/", get(order_controller::get_order_list).post(order_controller::post_order_list))
        .route("/order", get(order_controller::get_order_create).post(order_controller::post_order_create))
        .route(
            "/order/:id/change",
            get(order_controller::get_order_update).post(order_controller::post_order_update),
        )
        .route(
            "/order/:id/delete",
            get(order_controller::get_order_delete).post(order_controller::post_order_delete),
        )
        .route("/revenue", get(order_controller::get_revenue))
}
