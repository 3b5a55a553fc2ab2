//! Booking and schedule domain types, mirroring the backend's JSON bodies.

use serde::{Deserialize, Serialize};

/// An hour-granularity window on a given date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeslot {
    pub date: String,
    pub hour_start: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Pending,
    Cancelled,
}

/// A single port booking as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: String,
    pub timeslot: Timeslot,
    pub status: BookingStatus,
}

/// Capacity window for one hour of a terminal's schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub hour_start: String,
    pub max_capacity: i64,
    pub booked_capacity: i64,
}

impl ScheduleSlot {
    /// Remaining capacity. Whatever the backend sent is passed through —
    /// a negative value is not clamped here.
    pub fn available(&self) -> i64 {
        self.max_capacity - self.booked_capacity
    }
}

/// A terminal's schedule for one date. An empty `schedule` is a valid
/// answer for dates the backend has no data for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortSchedule {
    pub date: String,
    pub schedule: Vec<ScheduleSlot>,
}
