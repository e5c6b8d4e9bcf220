use axum::{
    Router,
    routing::get,
};

use appointment_cell::handlers::AppState;
use appointment_cell::router::appointment_routes;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Dental Clinic API is running!" }))
        .nest("/appointments", appointment_routes(state))
}
