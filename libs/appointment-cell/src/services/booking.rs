// libs/appointment-cell/src/services/booking.rs
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{
    Appointment, BookAppointmentRequest, BookingError, Service, UpdateAppointmentRequest,
};
use crate::services::schedule;
use crate::store::{AppointmentPatch, AppointmentStore, NewAppointment};

pub struct BookingService {
    store: Arc<dyn AppointmentStore>,
    // Serializes the overlap probe with the following write; without
    // it two concurrent requests for the same slot can both pass the
    // check before either persists.
    write_guard: Arc<Mutex<()>>,
}

impl BookingService {
    pub fn new(store: Arc<dyn AppointmentStore>, write_guard: Arc<Mutex<()>>) -> Self {
        Self { store, write_guard }
    }

    pub async fn list_appointments(&self) -> Result<Vec<Appointment>, BookingError> {
        self.store.list_all().await
    }

    /// Validate and persist a new booking: working-hours containment,
    /// then overlap against existing bookings, then insert.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, BookingError> {
        let name = required_text(request.name, "name")?;
        let phone_number = required_text(request.phone_number, "phoneNumber")?;
        let service: Service = required_text(request.service, "service")?.parse()?;
        let start = parse_instant(required_text(request.start, "start")?.as_str(), "start")?;
        let tz_offset = request.tz_offset.unwrap_or(0);

        let end = start + Duration::minutes(service.duration_minutes());
        check_working_window(start, end, tz_offset)?;

        let _guard = self.write_guard.lock().await;

        if self.store.overlap_exists(start, end, None).await? {
            warn!("Rejecting booking at {}: slot already taken", start);
            return Err(BookingError::SlotBusy);
        }

        debug!("Booking {} for {} at {}", service, name, start);
        self.store
            .insert(NewAppointment { name, phone_number, service, start, end })
            .await
    }

    /// Partial update. Moving `start` re-validates the booking and
    /// re-derives `end` from the effective service; otherwise fields
    /// (including a caller-supplied `end`) pass through unchanged.
    pub async fn update_appointment(
        &self,
        id: Uuid,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, BookingError> {
        let existing = self
            .store
            .find_by_id(id)
            .await?
            .ok_or(BookingError::NotFound)?;

        let service: Option<Service> = match request.service.as_deref() {
            Some(raw) => Some(raw.parse()?),
            None => None,
        };

        let mut patch = AppointmentPatch {
            service,
            ..AppointmentPatch::default()
        };
        if let Some(name) = request.name {
            patch.name = Some(non_empty(name, "name")?);
        }
        if let Some(phone_number) = request.phone_number {
            patch.phone_number = Some(non_empty(phone_number, "phoneNumber")?);
        }

        if let Some(raw_start) = request.start.as_deref() {
            let start = parse_instant(raw_start, "start")?;
            let tz_offset = request.tz_offset.unwrap_or(0);
            let effective_service = service.unwrap_or(existing.service);
            let end = start + Duration::minutes(effective_service.duration_minutes());

            check_working_window(start, end, tz_offset)?;

            let _guard = self.write_guard.lock().await;

            if self.store.overlap_exists(start, end, Some(id)).await? {
                warn!("Rejecting reschedule of {} to {}: slot already taken", id, start);
                return Err(BookingError::SlotBusy);
            }

            patch.start = Some(start);
            patch.end = Some(end);
            return self.store.update(id, patch).await;
        }

        if let Some(raw_end) = request.end.as_deref() {
            patch.end = Some(parse_instant(raw_end, "end")?);
        }

        if patch.is_empty() {
            return Ok(existing);
        }

        self.store.update(id, patch).await
    }

    pub async fn delete_appointment(&self, id: Uuid) -> Result<(), BookingError> {
        debug!("Deleting appointment {}", id);
        self.store.delete(id).await
    }
}

/// The booking must fit entirely inside its local day's working
/// window; touching the boundary is fine, crossing it is not.
pub fn check_working_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    tz_offset_minutes: i32,
) -> Result<(), BookingError> {
    let date = schedule::local_date(start, tz_offset_minutes);
    let midnight = schedule::local_midnight(date, tz_offset_minutes);
    let window = schedule::working_window(date);

    let day_start = midnight + Duration::hours(window.start_hour);
    let day_end = midnight + Duration::hours(window.end_hour);

    if start < day_start || end > day_end {
        return Err(BookingError::OutOfWindow(format!(
            "Appointments on {} must fall between {:02}:00 and {:02}:00 local time",
            date, window.start_hour, window.end_hour
        )));
    }

    Ok(())
}

fn required_text(value: Option<String>, field: &str) -> Result<String, BookingError> {
    match value {
        Some(v) => non_empty(v, field),
        None => Err(BookingError::InvalidInput(format!("{} is required", field))),
    }
}

fn non_empty(value: String, field: &str) -> Result<String, BookingError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(BookingError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(trimmed.to_string())
}

fn parse_instant(raw: &str, field: &str) -> Result<DateTime<Utc>, BookingError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| {
            BookingError::InvalidInput(format!("{} must be a valid ISO-8601 instant", field))
        })
}
