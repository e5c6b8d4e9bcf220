// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

use shared_models::error::AppError;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

/// A persisted booking. Field names follow the store schema exactly
/// (`phoneNumber`, `start`, `end`), hence the camelCase rename.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: Uuid,
    pub name: String,
    pub phone_number: String,
    pub service: Service,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// The closed set of bookable services. Durations live here so the
/// mapping is exhaustively checked at compile time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Consultation,
    Treatment,
    Extraction,
    Prosthetics,
}

impl Service {
    pub fn duration_minutes(&self) -> i64 {
        match self {
            Service::Consultation => 15,
            Service::Treatment => 45,
            Service::Extraction => 45,
            Service::Prosthetics => 45,
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Service::Consultation => write!(f, "consultation"),
            Service::Treatment => write!(f, "treatment"),
            Service::Extraction => write!(f, "extraction"),
            Service::Prosthetics => write!(f, "prosthetics"),
        }
    }
}

impl FromStr for Service {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "consultation" => Ok(Service::Consultation),
            "treatment" => Ok(Service::Treatment),
            "extraction" => Ok(Service::Extraction),
            "prosthetics" => Ok(Service::Prosthetics),
            other => Err(BookingError::InvalidInput(format!(
                "Unknown service: {}", other
            ))),
        }
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

/// Body of `POST /appointments`. Required fields are `Option` so that
/// a missing field surfaces as an `InvalidInput` validation error
/// rather than a deserialization rejection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub service: Option<String>,
    pub start: Option<String>,
    pub tz_offset: Option<i32>,
}

/// Body of `PATCH /appointments/{id}` - any subset of fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub service: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub tz_offset: Option<i32>,
}

/// Query string of `GET /appointments/availability`. `tzOffset` is kept
/// as raw text so an unparseable value degrades to UTC instead of
/// rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub date: Option<String>,
    pub service: Option<String>,
    pub tz_offset: Option<String>,
}

impl AvailabilityQuery {
    pub fn tz_offset_minutes(&self) -> i32 {
        self.tz_offset
            .as_deref()
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub available_slots: Vec<DateTime<Utc>>,
    pub busy_slots: Vec<DateTime<Utc>>,
    pub working_slots: Vec<DateTime<Utc>>,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, thiserror::Error)]
pub enum BookingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Outside working hours: {0}")]
    OutOfWindow(String),

    #[error("Requested slot is already booked")]
    SlotBusy,

    #[error("Appointment not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::InvalidInput(msg) => AppError::BadRequest(msg),
            BookingError::OutOfWindow(msg) => AppError::BadRequest(msg),
            BookingError::SlotBusy => {
                AppError::Conflict("Requested slot is already booked".to_string())
            }
            BookingError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            BookingError::Database(msg) => AppError::Database(msg),
        }
    }
}
