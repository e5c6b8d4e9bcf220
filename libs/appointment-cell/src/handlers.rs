// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use uuid::Uuid;

use shared_models::error::AppError;

use crate::models::{
    Appointment, AvailabilityQuery, AvailabilityResponse, BookAppointmentRequest, Service,
    UpdateAppointmentRequest,
};
use crate::services::availability::AvailabilityService;
use crate::services::booking::BookingService;
use crate::store::AppointmentStore;

/// Shared per-process state: the injected store and the write guard
/// that serializes booking writes.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AppointmentStore>,
    pub write_guard: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self {
            store,
            write_guard: Arc::new(Mutex::new(())),
        }
    }

    fn booking_service(&self) -> BookingService {
        BookingService::new(self.store.clone(), self.write_guard.clone())
    }
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Appointment>>, AppError> {
    let appointments = state.booking_service().list_appointments().await?;
    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let service: Option<Service> = match query.service.as_deref() {
        Some(raw) => Some(raw.parse().map_err(AppError::from)?),
        None => None,
    };

    let availability = AvailabilityService::new(state.store.clone())
        .get_availability(
            query.date.as_deref().unwrap_or(""),
            service,
            query.tz_offset_minutes(),
        )
        .await?;

    Ok(Json(availability))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<AppState>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = state.booking_service().book_appointment(request).await?;
    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = state
        .booking_service()
        .update_appointment(appointment_id, request)
        .await?;
    Ok(Json(appointment))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    state
        .booking_service()
        .delete_appointment(appointment_id)
        .await?;

    Ok(Json(json!({
        "message": "Appointment deleted"
    })))
}
