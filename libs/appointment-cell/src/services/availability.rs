// libs/appointment-cell/src/services/availability.rs
use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::debug;

use crate::models::{Appointment, AvailabilityResponse, BookingError, Service};
use crate::services::schedule::{self, SLOT_MINUTES};
use crate::store::AppointmentStore;

/// Duration assumed when no service is given. Most services run 45
/// minutes; this is a deliberate approximation and may under-offer
/// slots for a 15-minute consultation.
pub const DEFAULT_DURATION_MINUTES: i64 = 45;

pub struct AvailabilityService {
    store: Arc<dyn AppointmentStore>,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn AppointmentStore>) -> Self {
        Self { store }
    }

    /// Available, busy and working slots for one local calendar day.
    /// Read-only against the store.
    pub async fn get_availability(
        &self,
        date: &str,
        service: Option<Service>,
        tz_offset_minutes: i32,
    ) -> Result<AvailabilityResponse, BookingError> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|_| BookingError::InvalidInput("Invalid or missing date".to_string()))?;

        debug!("Computing availability for {} (tz offset {})", date, tz_offset_minutes);

        let midnight = schedule::local_midnight(date, tz_offset_minutes);
        let appointments = self
            .store
            .find_overlapping(midnight, midnight + Duration::hours(24))
            .await?;

        let duration_minutes = service
            .map(|s| s.duration_minutes())
            .unwrap_or(DEFAULT_DURATION_MINUTES);

        Ok(compute_availability(
            date,
            tz_offset_minutes,
            duration_minutes,
            &appointments,
            Utc::now(),
        ))
    }
}

/// The pure part of the engine: slot sets for a day given the bookings
/// that touch it. `now` is passed in so past-slot filtering is
/// deterministic under test.
pub fn compute_availability(
    date: NaiveDate,
    tz_offset_minutes: i32,
    duration_minutes: i64,
    appointments: &[Appointment],
    now: DateTime<Utc>,
) -> AvailabilityResponse {
    let midnight = schedule::local_midnight(date, tz_offset_minutes);
    let window = schedule::working_window(date);
    let day_start = midnight + Duration::hours(window.start_hour);
    let day_end = midnight + Duration::hours(window.end_hour);

    // Full 15-minute grid: total theoretical capacity for the day.
    let working_slots = schedule::slot_starts(day_start, day_end, SLOT_MINUTES, SLOT_MINUTES);

    // A grid point is busy when some booking's [start, end) contains it.
    let busy_slots: Vec<DateTime<Utc>> = working_slots
        .iter()
        .copied()
        .filter(|slot| appointments.iter().any(|a| a.start <= *slot && *slot < a.end))
        .collect();
    let busy_set: HashSet<DateTime<Utc>> = busy_slots.iter().copied().collect();

    // A candidate is available only if every 15-minute chunk it spans
    // is free, not just its start instant.
    let chunks = (duration_minutes + SLOT_MINUTES - 1) / SLOT_MINUTES;
    let is_today = schedule::local_date(now, tz_offset_minutes) == date;

    let available_slots = schedule::slot_starts(day_start, day_end, SLOT_MINUTES, duration_minutes)
        .into_iter()
        .filter(|slot| {
            (0..chunks).all(|i| !busy_set.contains(&(*slot + Duration::minutes(i * SLOT_MINUTES))))
        })
        .filter(|slot| !is_today || *slot > now)
        .collect();

    AvailabilityResponse {
        available_slots,
        busy_slots,
        working_slots,
    }
}
