// libs/appointment-cell/src/router.rs
use axum::{
    Router,
    routing::{delete, get, patch},
};

use crate::handlers::{self, AppState};

pub fn appointment_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::list_appointments).post(handlers::book_appointment))
        .route("/availability", get(handlers::get_availability))
        .route("/{appointment_id}", patch(handlers::update_appointment))
        .route("/{appointment_id}", delete(handlers::delete_appointment))
        .with_state(state)
}
