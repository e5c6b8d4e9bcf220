#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use appointment_cell::models::{Appointment, BookingError, Service};
use appointment_cell::store::{AppointmentPatch, AppointmentStore, NewAppointment};

/// In-memory stand-in for the appointment store, enough to exercise
/// the availability and booking services without a live PostgREST.
pub struct InMemoryStore {
    appointments: Mutex<Vec<Appointment>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            appointments: Mutex::new(Vec::new()),
        }
    }

    pub fn with_appointments(seed: Vec<Appointment>) -> Self {
        Self {
            appointments: Mutex::new(seed),
        }
    }

    pub fn snapshot(&self) -> Vec<Appointment> {
        self.appointments.lock().unwrap().clone()
    }
}

#[async_trait]
impl AppointmentStore for InMemoryStore {
    async fn list_all(&self) -> Result<Vec<Appointment>, BookingError> {
        let mut all = self.snapshot();
        all.sort_by(|a, b| b.start.cmp(&a.start));
        Ok(all)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, BookingError> {
        Ok(self.snapshot().into_iter().find(|a| a.id == id))
    }

    async fn find_overlapping(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, BookingError> {
        let mut hits: Vec<Appointment> = self
            .snapshot()
            .into_iter()
            .filter(|a| a.start < to && a.end > from)
            .collect();
        hits.sort_by(|a, b| a.start.cmp(&b.start));
        Ok(hits)
    }

    async fn overlap_exists(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude_id: Option<Uuid>,
    ) -> Result<bool, BookingError> {
        Ok(self
            .snapshot()
            .iter()
            .any(|a| Some(a.id) != exclude_id && a.start < end && a.end > start))
    }

    async fn insert(&self, appointment: NewAppointment) -> Result<Appointment, BookingError> {
        let created = Appointment {
            id: Uuid::new_v4(),
            name: appointment.name,
            phone_number: appointment.phone_number,
            service: appointment.service,
            start: appointment.start,
            end: appointment.end,
        };
        self.appointments.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> Result<Appointment, BookingError> {
        let mut all = self.appointments.lock().unwrap();
        let appointment = all
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(BookingError::NotFound)?;

        if let Some(name) = patch.name {
            appointment.name = name;
        }
        if let Some(phone_number) = patch.phone_number {
            appointment.phone_number = phone_number;
        }
        if let Some(service) = patch.service {
            appointment.service = service;
        }
        if let Some(start) = patch.start {
            appointment.start = start;
        }
        if let Some(end) = patch.end {
            appointment.end = end;
        }

        Ok(appointment.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), BookingError> {
        let mut all = self.appointments.lock().unwrap();
        let before = all.len();
        all.retain(|a| a.id != id);

        if all.len() == before {
            return Err(BookingError::NotFound);
        }
        Ok(())
    }
}

pub fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

pub fn appointment(service: Service, start: DateTime<Utc>) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        name: "Maria Ivanova".to_string(),
        phone_number: "+359888700112".to_string(),
        service,
        start,
        end: start + Duration::minutes(service.duration_minutes()),
    }
}
