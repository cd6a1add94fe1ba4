use axum::{Router, routing::get};
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use crate::{
    AppState,
    controllers::{
        api_docs_controller::{self as docs, ApiDoc},
        api_meals_controller as meals,
        api_orders_controller as orders,
    },
};

pub fn add_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(docs::SCHEMA_PATH, get(docs::schema))
        .route("/api/v1/doc", get(docs::swagger_ui))
        .merge(Redoc::with_url("/api/v1/redoc", ApiDoc::openapi()))
        .route("/api/v1/meals", get(meals::list_meals).post(meals::create_meal))
        .route(
            "/api/v1/meals/:id",
            get(meals::get_meal)
                .put(meals::put_meal)
                .patch(meals::patch_meal)
                .delete(meals::delete_meal),
        )
        .route("/api/v1/orders", get(orders::list_orders).post(orders::create_order))
        // static segment, takes priority over `:id`
        .route("/api/v1/orders/revenue", get(orders::get_revenue))
        .route(
            "/api/v1/orders/:id",
            get(orders::get_order)
                .put(orders::put_order)
                .patch(orders::patch_order)
                .delete(orders::delete_order),
        )
}
