// libs/appointment-cell/src/store.rs
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Appointment, BookingError, Service};

/// Insert payload; the store assigns the id.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub name: String,
    pub phone_number: String,
    pub service: Service,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Partial update; only present fields are sent to the store.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Service>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl AppointmentPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone_number.is_none()
            && self.service.is_none()
            && self.start.is_none()
            && self.end.is_none()
    }
}

/// Repository seam over the appointment store. Injected into the
/// availability and booking services so they never touch transport
/// concerns directly.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    /// All appointments, most recent start first.
    async fn list_all(&self) -> Result<Vec<Appointment>, BookingError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, BookingError>;

    /// Appointments whose `[start, end)` interval overlaps `[from, to)`.
    async fn find_overlapping(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, BookingError>;

    /// Whether any appointment overlaps `[start, end)`, optionally
    /// excluding one id (the booking being updated).
    async fn overlap_exists(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, BookingError>;

    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment, BookingError>;

    async fn update(
        &self,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> Result<Appointment, BookingError>;

    async fn delete(&self, id: Uuid) -> Result<(), BookingError>;
}

// ==============================================================================
// SUPABASE (POSTGREST) IMPLEMENTATION
// ==============================================================================

pub struct SupabaseAppointmentStore {
    supabase: SupabaseClient,
}

impl SupabaseAppointmentStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    fn representation_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }
}

fn fmt_instant(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[async_trait]
impl AppointmentStore for SupabaseAppointmentStore {
    async fn list_all(&self) -> Result<Vec<Appointment>, BookingError> {
        let path = "/rest/v1/appointments?order=start.desc";

        self.supabase
            .request(Method::GET, path, None)
            .await
            .map_err(|e| BookingError::Database(e.to_string()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, BookingError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", id);

        let result: Vec<Appointment> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        Ok(result.into_iter().next())
    }

    async fn find_overlapping(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, BookingError> {
        debug!("Fetching appointments overlapping {} to {}", from, to);

        // Half-open overlap: existing.start < to AND existing.end > from
        let path = format!(
            "/rest/v1/appointments?start=lt.{}&end=gt.{}&order=start.asc",
            fmt_instant(to),
            fmt_instant(from),
        );

        self.supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| BookingError::Database(e.to_string()))
    }

    async fn overlap_exists(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, BookingError> {
        let mut path = format!(
            "/rest/v1/appointments?start=lt.{}&end=gt.{}",
            fmt_instant(end),
            fmt_instant(start),
        );

        if let Some(id) = exclude_id {
            path.push_str(&format!("&id=neq.{}", id));
        }
        path.push_str("&limit=1");

        let result: Vec<Appointment> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        Ok(!result.is_empty())
    }

    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment, BookingError> {
        debug!("Inserting appointment starting at {}", appointment.start);

        let body = serde_json::to_value(&appointment)
            .map_err(|e| BookingError::Database(e.to_string()))?;

        let result: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(body),
                Some(Self::representation_headers()),
            )
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        result
            .into_iter()
            .next()
            .ok_or_else(|| BookingError::Database("Insert returned no rows".to_string()))
    }

    async fn update(
        &self,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> Result<Appointment, BookingError> {
        debug!("Updating appointment {}", id);

        let path = format!("/rest/v1/appointments?id=eq.{}", id);
        let body = serde_json::to_value(&patch)
            .map_err(|e| BookingError::Database(e.to_string()))?;

        let result: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(body),
                Some(Self::representation_headers()),
            )
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        // PostgREST returns an empty representation for an unknown id.
        result.into_iter().next().ok_or(BookingError::NotFound)
    }

    async fn delete(&self, id: Uuid) -> Result<(), BookingError> {
        debug!("Deleting appointment {}", id);

        let path = format!("/rest/v1/appointments?id=eq.{}", id);

        let result: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::DELETE,
                &path,
                None,
                Some(Self::representation_headers()),
            )
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        if result.is_empty() {
            return Err(BookingError::NotFound);
        }

        Ok(())
    }
}
