//! In-memory backend stand-in shared by the tool unit tests.

use async_trait::async_trait;
use portcall_core::backend::PortBackend;
use portcall_core::booking::{Booking, BookingStatus, PortSchedule, ScheduleSlot, Timeslot};
use portcall_core::error::BackendError;
use std::collections::HashMap;

/// A scriptable backend: bookings keyed by id with an owning user,
/// schedules keyed by date, and an optional forced failure.
#[derive(Default)]
pub(crate) struct MockBackend {
    pub bookings: HashMap<String, (String, Booking)>,
    pub schedules: HashMap<String, PortSchedule>,
    pub fail_with: Option<BackendError>,
}

impl MockBackend {
    pub fn with_booking(mut self, owner: &str, booking: Booking) -> Self {
        self.bookings
            .insert(booking.booking_id.clone(), (owner.to_string(), booking));
        self
    }

    pub fn with_schedule(mut self, schedule: PortSchedule) -> Self {
        self.schedules.insert(schedule.date.clone(), schedule);
        self
    }

    pub fn failing(error: BackendError) -> Self {
        Self {
            fail_with: Some(error),
            ..Self::default()
        }
    }
}

pub(crate) fn booking(id: &str, status: BookingStatus, date: &str, hour: &str) -> Booking {
    Booking {
        booking_id: id.to_string(),
        timeslot: Timeslot {
            date: date.to_string(),
            hour_start: hour.to_string(),
        },
        status,
    }
}

pub(crate) fn slot(hour: &str, max: i64, booked: i64) -> ScheduleSlot {
    ScheduleSlot {
        hour_start: hour.to_string(),
        max_capacity: max,
        booked_capacity: booked,
    }
}

#[async_trait]
impl PortBackend for MockBackend {
    async fn booking_status(
        &self,
        booking_id: &str,
        user_id: &str,
    ) -> Result<Booking, BackendError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        match self.bookings.get(booking_id) {
            Some((owner, booking)) if owner == user_id => Ok(booking.clone()),
            Some(_) => Err(BackendError::Forbidden(
                "booking belongs to another user".into(),
            )),
            None => Err(BackendError::NotFound(format!("booking {booking_id}"))),
        }
    }

    async fn user_bookings(
        &self,
        user_id: &str,
        date: &str,
        hour: &str,
    ) -> Result<Vec<Booking>, BackendError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        let mut matches: Vec<Booking> = self
            .bookings
            .values()
            .filter(|(owner, b)| {
                owner == user_id && b.timeslot.date == date && b.timeslot.hour_start == hour
            })
            .map(|(_, b)| b.clone())
            .collect();
        matches.sort_by(|a, b| a.booking_id.cmp(&b.booking_id));
        Ok(matches)
    }

    async fn port_schedule(&self, date: &str) -> Result<PortSchedule, BackendError> {
        if let Some(err) = &self.fail_with {
            return Err(err.clone());
        }
        // Unknown dates are an empty schedule, not an error.
        Ok(self
            .schedules
            .get(date)
            .cloned()
            .unwrap_or_else(|| PortSchedule {
                date: date.to_string(),
                schedule: Vec::new(),
            }))
    }
}
