use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Modified,
    Cancelled,
}

/// Signal from the booking subsystem. Never persisted by the engine.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookingEvent {
    pub booking_id: String,
    pub property_id: String,
    pub property_name: String,
    pub guest_name: String,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub status: BookingStatus,
    pub special_instructions: Option<String>,
}

/// Field changes carried by a booking modification. Absent fields are left
/// untouched on the jobs.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct BookingChanges {
    pub check_in_date: Option<DateTime<Utc>>,
    pub check_out_date: Option<DateTime<Utc>>,
    pub guest_name: Option<String>,
    pub property_name: Option<String>,
    pub special_instructions: Option<String>,
    /// Re-derive priority from the new checkout. Off unless asked for.
    pub recompute_priority: bool,
}

impl BookingChanges {
    pub fn is_empty(&self) -> bool {
        self.check_in_date.is_none()
            && self.check_out_date.is_none()
            && self.guest_name.is_none()
            && self.property_name.is_none()
            && self.special_instructions.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookingModification {
    pub booking_id: String,
    pub changes: BookingChanges,
}
