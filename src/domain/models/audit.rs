use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;
use std::str::FromStr;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    JobsCreatedFromBooking,
    JobsModifiedFromBooking,
    JobsCancelledFromBooking,
    JobStatusUpdated,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEventType::JobsCreatedFromBooking => "jobs_created_from_booking",
            AuditEventType::JobsModifiedFromBooking => "jobs_modified_from_booking",
            AuditEventType::JobsCancelledFromBooking => "jobs_cancelled_from_booking",
            AuditEventType::JobStatusUpdated => "job_status_updated",
        }
    }
}

impl FromStr for AuditEventType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jobs_created_from_booking" => Ok(AuditEventType::JobsCreatedFromBooking),
            "jobs_modified_from_booking" => Ok(AuditEventType::JobsModifiedFromBooking),
            "jobs_cancelled_from_booking" => Ok(AuditEventType::JobsCancelledFromBooking),
            "job_status_updated" => Ok(AuditEventType::JobStatusUpdated),
            other => Err(AppError::Validation(format!("Unknown audit event type: {}", other))),
        }
    }
}

impl TryFrom<String> for AuditEventType {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct AuditEvent {
    pub id: String,
    #[sqlx(try_from = "String")]
    pub event_type: AuditEventType,
    /// Booking id for batch events, job id for status updates.
    pub entity_id: String,
    pub actor_id: Option<String>,
    pub payload: Json<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(event_type: AuditEventType, entity_id: &str, actor_id: Option<&str>, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_type,
            entity_id: entity_id.to_string(),
            actor_id: actor_id.map(str::to_string),
            payload: Json(payload),
            created_at: Utc::now(),
        }
    }
}
