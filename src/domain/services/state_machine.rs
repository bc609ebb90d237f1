//! Job lifecycle transitions.
//!
//! ```text
//! pending -> offered | assigned | cancelled
//! offered -> assigned | pending | cancelled
//! assigned -> in_progress | pending | cancelled
//! in_progress -> completed | cancelled
//! ```
//!
//! `completed` and `cancelled` are terminal. Everything here is pure: callers
//! persist the returned job with a version check and record the audit event.

use chrono::{DateTime, Utc};
use crate::domain::models::job::{CompletionData, Job, JobStatus};
use crate::error::AppError;

pub const DEFAULT_CANCELLATION_REASON: &str = "cancelled";

pub fn can_transition(from: JobStatus, to: JobStatus) -> bool {
    use JobStatus::*;
    matches!(
        (from, to),
        (Pending, Offered)
            | (Pending, Assigned)
            | (Pending, Cancelled)
            | (Offered, Assigned)
            | (Offered, Pending)
            | (Offered, Cancelled)
            | (Assigned, InProgress)
            | (Assigned, Pending)
            | (Assigned, Cancelled)
            | (InProgress, Completed)
            | (InProgress, Cancelled)
    )
}

/// Status-specific inputs for a transition.
#[derive(Debug, Clone, Default)]
pub struct TransitionExtra {
    pub assigned_staff_id: Option<String>,
    pub completion: Option<CompletionData>,
    pub reason: Option<String>,
}

pub fn apply_transition(job: &Job, to: JobStatus, extra: TransitionExtra, now: DateTime<Utc>) -> Result<Job, AppError> {
    if !can_transition(job.status, to) {
        return Err(AppError::InvalidTransition { from: job.status, to });
    }

    let mut next = job.clone();
    match to {
        JobStatus::Pending => {
            next.assigned_staff_id = None;
            next.assigned_at = None;
        }
        JobStatus::Offered => {
            next.assigned_staff_id = non_empty(extra.assigned_staff_id);
        }
        JobStatus::Assigned => {
            let staff_id = non_empty(extra.assigned_staff_id)
                .ok_or_else(|| AppError::Validation("assigned_staff_id is required to assign a job".into()))?;
            next.assigned_staff_id = Some(staff_id);
            next.assigned_at = Some(now);
        }
        JobStatus::InProgress => {
            next.started_at = Some(now);
        }
        JobStatus::Completed => {
            let completion = extra.completion
                .ok_or_else(|| AppError::Validation("Completion data is required to complete a job".into()))?;
            validate_completion(&completion)?;
            next.completion_notes = Some(completion.notes);
            next.rating = completion.rating;
            next.issues = completion.issues;
            next.photos_uploaded = completion.photos_uploaded;
            next.completed_at = Some(now);
        }
        JobStatus::Cancelled => {
            next.assigned_staff_id = None;
            next.cancelled_at = Some(now);
            next.cancellation_reason = Some(
                non_empty(extra.reason).unwrap_or_else(|| DEFAULT_CANCELLATION_REASON.to_string())
            );
        }
    }

    next.status = to;
    next.updated_at = now;
    Ok(next)
}

/// Cancellation from any non-terminal state. Returns `None` for jobs that are
/// already completed or cancelled so batch callers can skip them.
pub fn cancel(job: &Job, reason: &str, now: DateTime<Utc>) -> Option<Job> {
    if job.status.is_terminal() {
        return None;
    }
    let extra = TransitionExtra { reason: Some(reason.to_string()), ..Default::default() };
    apply_transition(job, JobStatus::Cancelled, extra, now).ok()
}

/// Moves the job onto a new window. An `assigned` job goes back to `pending`
/// because the assignment was accepted against the old window. Terminal jobs
/// are returned as `None`.
pub fn reschedule(job: &Job, start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> Option<(Job, bool)> {
    if job.status.is_terminal() {
        return None;
    }

    let (mut next, unassigned) = if job.status == JobStatus::Assigned {
        (apply_transition(job, JobStatus::Pending, TransitionExtra::default(), now).ok()?, true)
    } else {
        (job.clone(), false)
    };

    next.scheduled_start = start;
    next.scheduled_end = end;
    next.updated_at = now;
    Some((next, unassigned))
}

fn validate_completion(completion: &CompletionData) -> Result<(), AppError> {
    if completion.notes.trim().is_empty() {
        return Err(AppError::Validation("Completion notes are required".into()));
    }
    if let Some(rating) = completion.rating
        && !(1..=5).contains(&rating) {
        return Err(AppError::Validation("Rating must be between 1 and 5".into()));
    }
    if completion.photos_uploaded < 0 {
        return Err(AppError::Validation("photos_uploaded cannot be negative".into()));
    }
    Ok(())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
