use std::collections::BTreeMap;
use std::sync::Arc;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::domain::models::{
    booking::{BookingEvent, BookingModification, BookingStatus},
    job::{JobStatus, JobType},
    staff::Actor,
};
use crate::domain::ports::JobRepository;
use crate::domain::services::job_engine::{
    CancellationOutcome, CreateJobsRequest, JobEngine, JobsCreated, ModificationOutcome,
};
use crate::error::AppError;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct NextDueJob {
    pub job_id: String,
    pub job_type: JobType,
    pub status: JobStatus,
    pub scheduled_start: DateTime<Utc>,
    pub assigned_staff_id: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BookingJobsSummary {
    pub booking_id: String,
    pub total_jobs: usize,
    pub by_status: BTreeMap<JobStatus, usize>,
    pub next_due: Option<NextDueJob>,
    /// Every job that was not cancelled has been completed.
    pub ready: bool,
}

/// Pre-flight check for live bookings. Stricter than the engine: a checkout in
/// the past is rejected here instead of producing a warning.
pub fn validate_booking_for_jobs(booking: &BookingEvent, now: DateTime<Utc>) -> Result<(), AppError> {
    let mut problems = Vec::new();

    for (name, value) in [
        ("booking_id", &booking.booking_id),
        ("property_id", &booking.property_id),
        ("property_name", &booking.property_name),
        ("guest_name", &booking.guest_name),
    ] {
        if value.trim().is_empty() {
            problems.push(format!("{} is required", name));
        }
    }
    if booking.check_out_date <= booking.check_in_date {
        problems.push("check_out_date must be after check_in_date".to_string());
    }
    if booking.check_out_date <= now {
        problems.push("check_out_date must be in the future".to_string());
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(problems.join("; ")))
    }
}

pub struct BookingLifecycleHook {
    engine: Arc<JobEngine>,
    job_repo: Arc<dyn JobRepository>,
}

impl BookingLifecycleHook {
    pub fn new(engine: Arc<JobEngine>, job_repo: Arc<dyn JobRepository>) -> Self {
        Self { engine, job_repo }
    }

    pub async fn on_booking_confirmed(&self, booking: &BookingEvent) -> Result<JobsCreated, AppError> {
        if booking.status != BookingStatus::Confirmed {
            return Err(AppError::Validation(format!(
                "Jobs are only created for confirmed bookings (got {:?})", booking.status
            )));
        }
        validate_booking_for_jobs(booking, Utc::now())?;

        info!("Booking {} confirmed, creating turnover jobs", booking.booking_id);
        self.engine.create_jobs_from_booking(&CreateJobsRequest::from(booking)).await
    }

    /// Applies the modification, then re-offers any job that lost its worker.
    pub async fn on_booking_modified(&self, modification: &BookingModification, actor: &Actor) -> Result<ModificationOutcome, AppError> {
        if modification.booking_id.trim().is_empty() {
            return Err(AppError::Validation("booking_id is required".into()));
        }
        if let Some(checkout) = modification.changes.check_out_date
            && checkout <= Utc::now() {
            return Err(AppError::Validation("check_out_date must be in the future".into()));
        }
        if modification.changes.is_empty() {
            info!("Booking {} modification carries no job-relevant changes", modification.booking_id);
            return Ok(ModificationOutcome { booking_id: modification.booking_id.clone(), ..Default::default() });
        }

        let mut outcome = self.engine
            .handle_booking_modification(&modification.booking_id, &modification.changes, actor)
            .await?;

        if !outcome.unassigned_job_ids.is_empty() {
            let redispatched = self.engine.redispatch(&outcome.unassigned_job_ids).await;
            outcome.side_effects.extend(redispatched);
        }
        Ok(outcome)
    }

    pub async fn on_booking_cancelled(&self, booking_id: &str, reason: Option<&str>, actor: &Actor) -> Result<CancellationOutcome, AppError> {
        self.engine.handle_booking_cancellation(booking_id, reason, actor).await
    }

    pub async fn get_booking_jobs_summary(&self, booking_id: &str) -> Result<BookingJobsSummary, AppError> {
        let jobs = self.job_repo.find_by_booking(booking_id).await?;

        let mut by_status = BTreeMap::new();
        for job in &jobs {
            *by_status.entry(job.status).or_insert(0) += 1;
        }

        let next_due = jobs.iter()
            .filter(|j| matches!(j.status, JobStatus::Pending | JobStatus::Assigned))
            .min_by_key(|j| j.scheduled_start)
            .map(|j| NextDueJob {
                job_id: j.id.clone(),
                job_type: j.job_type,
                status: j.status,
                scheduled_start: j.scheduled_start,
                assigned_staff_id: j.assigned_staff_id.clone(),
            });

        let live: Vec<_> = jobs.iter().filter(|j| j.status != JobStatus::Cancelled).collect();
        let ready = !live.is_empty() && live.iter().all(|j| j.status == JobStatus::Completed);

        Ok(BookingJobsSummary {
            booking_id: booking_id.to_string(),
            total_jobs: jobs.len(),
            by_status,
            next_due,
            ready,
        })
    }
}
