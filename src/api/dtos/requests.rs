use crate::domain::models::{
    audit::AuditEventType,
    job::{CompletionData, JobStatus},
};
use crate::domain::services::state_machine::TransitionExtra;
use serde::Deserialize;

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct CancelBookingRequest {
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateJobStatusRequest {
    pub status: JobStatus,
    pub assigned_staff_id: Option<String>,
    pub completion: Option<CompletionData>,
    pub reason: Option<String>,
}

impl UpdateJobStatusRequest {
    pub fn into_parts(self) -> (JobStatus, TransitionExtra) {
        (
            self.status,
            TransitionExtra {
                assigned_staff_id: self.assigned_staff_id,
                completion: self.completion,
                reason: self.reason,
            },
        )
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct AuditQuery {
    pub event_type: Option<AuditEventType>,
    pub entity_id: Option<String>,
    pub limit: Option<i64>,
}
