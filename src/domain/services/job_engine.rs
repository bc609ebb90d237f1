use std::collections::BTreeMap;
use std::sync::Arc;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, info_span, warn, Instrument};

use crate::config::WorkflowConfig;
use crate::domain::models::{
    audit::{AuditEvent, AuditEventType},
    booking::{BookingChanges, BookingEvent},
    job::{Job, JobFilters, JobStatus, JobType, NewJobParams},
    staff::{Actor, ActorRole, StaffRole},
};
use crate::domain::ports::{AuditRepository, DispatchService, JobRepository};
use crate::domain::services::requirements::{derive_priority, requirements_for};
use crate::domain::services::state_machine::{self, apply_transition, TransitionExtra};
use crate::domain::services::timing::compute_schedule;
use crate::error::AppError;

const MAX_CAS_ATTEMPTS: usize = 3;
pub const BOOKING_CANCELLED_REASON: &str = "booking cancelled";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CreateJobsRequest {
    pub booking_id: String,
    pub property_id: String,
    pub property_name: String,
    pub guest_name: String,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub special_instructions: Option<String>,
}

impl From<&BookingEvent> for CreateJobsRequest {
    fn from(event: &BookingEvent) -> Self {
        Self {
            booking_id: event.booking_id.clone(),
            property_id: event.property_id.clone(),
            property_name: event.property_name.clone(),
            guest_name: event.guest_name.clone(),
            check_in_date: event.check_in_date,
            check_out_date: event.check_out_date,
            special_instructions: event.special_instructions.clone(),
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SideEffectKind {
    Dispatch,
    Audit,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SideEffectStatus {
    Done { detail: Option<String> },
    Skipped { reason: String },
    Failed { error: String },
}

/// Result of a best-effort call. Reported next to the core outcome and never
/// turned into an operation failure.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct SideEffectOutcome {
    pub kind: SideEffectKind,
    pub job_id: Option<String>,
    pub status: SideEffectStatus,
}

impl SideEffectOutcome {
    pub fn failed(&self) -> bool {
        matches!(self.status, SideEffectStatus::Failed { .. })
    }
}

#[derive(Debug, Serialize, Clone)]
pub struct JobsCreated {
    pub booking_id: String,
    pub job_ids: Vec<String>,
    pub jobs: Vec<Job>,
    pub warnings: Vec<String>,
    pub side_effects: Vec<SideEffectOutcome>,
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct ModificationOutcome {
    pub booking_id: String,
    pub rescheduled: bool,
    pub modified_job_ids: Vec<String>,
    pub unassigned_job_ids: Vec<String>,
    pub side_effects: Vec<SideEffectOutcome>,
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct CancellationOutcome {
    pub booking_id: String,
    pub cancelled_job_ids: Vec<String>,
    pub released_staff_ids: Vec<String>,
    pub side_effects: Vec<SideEffectOutcome>,
}

#[derive(Debug, Serialize, Clone, Default)]
pub struct JobListing {
    pub total: usize,
    pub by_status: BTreeMap<JobStatus, usize>,
    pub by_type: BTreeMap<JobType, usize>,
    pub jobs: Vec<Job>,
}

pub struct JobEngine {
    job_repo: Arc<dyn JobRepository>,
    audit_repo: Arc<dyn AuditRepository>,
    dispatch: Arc<dyn DispatchService>,
    workflow: WorkflowConfig,
}

impl JobEngine {
    pub fn new(
        job_repo: Arc<dyn JobRepository>,
        audit_repo: Arc<dyn AuditRepository>,
        dispatch: Arc<dyn DispatchService>,
        workflow: WorkflowConfig,
    ) -> Self {
        Self { job_repo, audit_repo, dispatch, workflow }
    }

    pub async fn create_jobs_from_booking(&self, request: &CreateJobsRequest) -> Result<JobsCreated, AppError> {
        let now = Utc::now();
        let mut warnings = validate_create_request(request, now)?;
        let span = info_span!("create_jobs_from_booking", booking_id = %request.booking_id);

        async move {
            let schedule = compute_schedule(request.check_out_date, &self.workflow)?;
            let existing = self.job_repo.find_by_booking(&request.booking_id).await?;
            let priority = derive_priority(request.check_out_date, now);

            let mut jobs = Vec::new();
            let mut side_effects = Vec::new();

            for &job_type in &self.workflow.steps {
                if let Some(found) = existing.iter().find(|j| j.job_type == job_type) {
                    warnings.push(format!("{} job already exists ({}), not created again", job_type, found.id));
                    continue;
                }

                let window = schedule.window(job_type);
                let estimated_duration_min = i32::try_from(self.workflow.duration_for(job_type))
                    .map_err(|_| AppError::Validation(format!("Duration for {} does not fit in minutes", job_type)))?;
                let job = Job::new(NewJobParams {
                    booking_id: request.booking_id.clone(),
                    property_id: request.property_id.clone(),
                    job_type,
                    required_role: self.workflow.role_for(job_type),
                    scheduled_start: window.start,
                    scheduled_end: window.end,
                    priority,
                    estimated_duration_min,
                    guest_name: request.guest_name.clone(),
                    property_name: request.property_name.clone(),
                    check_in_date: request.check_in_date,
                    check_out_date: request.check_out_date,
                    requirements: requirements_for(job_type),
                    special_instructions: request.special_instructions.clone(),
                }, now);

                let saved = self.job_repo.create(&job).await?;
                info!("Created {} job {} ({:?} priority) starting {}", job_type, saved.id, saved.priority, saved.scheduled_start);

                side_effects.push(self.dispatch_new_job(&saved).await);
                jobs.push(saved);
            }

            for warning in &warnings {
                warn!("{}", warning);
            }

            let job_ids: Vec<String> = jobs.iter().map(|j| j.id.clone()).collect();
            let payload = json!({
                "booking_id": request.booking_id,
                "property_id": request.property_id,
                "job_ids": job_ids,
                "job_types": jobs.iter().map(|j| j.job_type).collect::<Vec<_>>(),
                "check_out_date": request.check_out_date,
                "warnings": warnings,
            });
            side_effects.push(self.record_audit(AuditEventType::JobsCreatedFromBooking, &request.booking_id, None, payload).await);

            Ok(JobsCreated {
                booking_id: request.booking_id.clone(),
                job_ids,
                jobs,
                warnings,
                side_effects,
            })
        }
            .instrument(span)
            .await
    }

    pub async fn handle_booking_modification(&self, booking_id: &str, changes: &BookingChanges, actor: &Actor) -> Result<ModificationOutcome, AppError> {
        if booking_id.trim().is_empty() {
            return Err(AppError::Validation("booking_id is required".into()));
        }
        let span = info_span!("handle_booking_modification", booking_id = %booking_id);

        async move {
            let schedule = changes.check_out_date
                .map(|checkout| compute_schedule(checkout, &self.workflow))
                .transpose()?;
            let jobs = self.job_repo.find_by_booking(booking_id).await?;
            if jobs.is_empty() {
                info!("No jobs for booking yet, nothing to modify");
                return Ok(ModificationOutcome { booking_id: booking_id.to_string(), ..Default::default() });
            }

            let now = Utc::now();
            let rescheduled = changes.check_out_date.is_some();

            if changes.check_in_date.is_some() || changes.check_out_date.is_some() {
                for job in &jobs {
                    let check_in = changes.check_in_date.unwrap_or(job.check_in_date);
                    let check_out = changes.check_out_date.unwrap_or(job.check_out_date);
                    if check_out <= check_in {
                        return Err(AppError::Validation("check_out_date must be after check_in_date".into()));
                    }
                }
            }

            let mutate = |job: &Job| -> Option<Job> {
                match (schedule, changes.check_out_date) {
                    (Some(schedule), Some(checkout)) => {
                        let window = schedule.window(job.job_type);
                        let (mut next, _) = state_machine::reschedule(job, window.start, window.end, now)?;
                        next.check_out_date = checkout;
                        if changes.recompute_priority {
                            next.priority = derive_priority(checkout, now);
                        }
                        patch_snapshot(&mut next, changes);
                        Some(next)
                    }
                    _ => {
                        let mut next = job.clone();
                        patch_snapshot(&mut next, changes);
                        if next == *job {
                            return None;
                        }
                        next.updated_at = now;
                        Some(next)
                    }
                }
            };

            let results = join_all(jobs.into_iter().map(|job| self.update_with_retry(job, &mutate))).await;

            let mut outcome = ModificationOutcome {
                booking_id: booking_id.to_string(),
                rescheduled,
                ..Default::default()
            };
            let mut first_error = None;
            for result in results {
                match result {
                    Ok(Some((before, after))) => {
                        if before.status == JobStatus::Assigned && after.status == JobStatus::Pending {
                            info!("Job {} unassigned from {:?} after reschedule", after.id, before.assigned_staff_id);
                            outcome.unassigned_job_ids.push(after.id.clone());
                        }
                        outcome.modified_job_ids.push(after.id);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!("Failed to apply booking modification to a job: {}", e);
                        first_error.get_or_insert(e);
                    }
                }
            }
            if let Some(e) = first_error {
                return Err(e);
            }

            let payload = json!({
                "booking_id": booking_id,
                "rescheduled": rescheduled,
                "changes": changes,
                "modified_job_ids": outcome.modified_job_ids,
                "unassigned_job_ids": outcome.unassigned_job_ids,
            });
            outcome.side_effects.push(
                self.record_audit(AuditEventType::JobsModifiedFromBooking, booking_id, Some(&actor.id), payload).await
            );

            info!("Booking modification touched {} jobs, unassigned {}", outcome.modified_job_ids.len(), outcome.unassigned_job_ids.len());
            Ok(outcome)
        }
            .instrument(span)
            .await
    }

    pub async fn handle_booking_cancellation(&self, booking_id: &str, reason: Option<&str>, actor: &Actor) -> Result<CancellationOutcome, AppError> {
        if booking_id.trim().is_empty() {
            return Err(AppError::Validation("booking_id is required".into()));
        }
        let reason = reason.filter(|r| !r.trim().is_empty()).unwrap_or(BOOKING_CANCELLED_REASON);
        let span = info_span!("handle_booking_cancellation", booking_id = %booking_id);

        async move {
            let jobs = self.job_repo.find_by_booking(booking_id).await?;
            let now = Utc::now();
            let mutate = |job: &Job| state_machine::cancel(job, reason, now);

            let results = join_all(jobs.into_iter().map(|job| self.update_with_retry(job, &mutate))).await;

            let mut outcome = CancellationOutcome { booking_id: booking_id.to_string(), ..Default::default() };
            let mut first_error = None;
            for result in results {
                match result {
                    Ok(Some((before, after))) => {
                        if let Some(staff_id) = before.assigned_staff_id
                            && !outcome.released_staff_ids.contains(&staff_id) {
                            outcome.released_staff_ids.push(staff_id);
                        }
                        outcome.cancelled_job_ids.push(after.id);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        warn!("Failed to cancel a job: {}", e);
                        first_error.get_or_insert(e);
                    }
                }
            }
            if let Some(e) = first_error {
                return Err(e);
            }

            if !outcome.cancelled_job_ids.is_empty() {
                let payload = json!({
                    "booking_id": booking_id,
                    "reason": reason,
                    "cancelled_job_ids": outcome.cancelled_job_ids,
                    "released_staff_ids": outcome.released_staff_ids,
                });
                outcome.side_effects.push(
                    self.record_audit(AuditEventType::JobsCancelledFromBooking, booking_id, Some(&actor.id), payload).await
                );
            }

            info!("Cancelled {} jobs, released {} staff", outcome.cancelled_job_ids.len(), outcome.released_staff_ids.len());
            Ok(outcome)
        }
            .instrument(span)
            .await
    }

    /// The single entry point for advancing a job. A lost compare-and-swap
    /// surfaces as `Conflict`; the caller re-reads and decides.
    pub async fn update_job_status(&self, job_id: &str, new_status: JobStatus, actor: &Actor, mut extra: TransitionExtra) -> Result<Job, AppError> {
        let job = self.job_repo.find_by_id(job_id).await?
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))?;

        authorize_transition(&job, new_status, actor, &mut extra)?;

        let next = apply_transition(&job, new_status, extra, Utc::now())?;
        let saved = self.job_repo.update(&next, job.version).await?;
        info!("Job {} moved {} -> {} by {}", saved.id, job.status, saved.status, actor.id);

        let payload = json!({
            "job_id": saved.id,
            "booking_id": saved.booking_id,
            "job_type": saved.job_type,
            "old_status": job.status,
            "new_status": saved.status,
            "actor_id": actor.id,
            "actor_role": actor.role.as_str(),
            "assigned_staff_id": saved.assigned_staff_id,
        });
        self.record_audit(AuditEventType::JobStatusUpdated, &saved.id, Some(&actor.id), payload).await;

        Ok(saved)
    }

    /// Role-enforced read. Client filters narrow the result but can never widen
    /// it past the caller's role and assignment.
    pub async fn get_jobs_for_role(&self, staff_id: Option<&str>, role: StaffRole, filters: &JobFilters) -> Result<Vec<Job>, AppError> {
        let mut scoped = filters.clone();
        scoped.required_role = Some(role);
        scoped.assigned_staff_id = staff_id.map(str::to_string);

        let mut jobs = self.job_repo.query(&scoped).await?;
        jobs.retain(|j| scoped.matches(j));
        Ok(jobs)
    }

    pub async fn get_all_jobs(&self, filters: &JobFilters) -> Result<JobListing, AppError> {
        let jobs = self.job_repo.query(filters).await?;

        let mut by_status = BTreeMap::new();
        let mut by_type = BTreeMap::new();
        for job in &jobs {
            *by_status.entry(job.status).or_insert(0) += 1;
            *by_type.entry(job.job_type).or_insert(0) += 1;
        }

        Ok(JobListing { total: jobs.len(), by_status, by_type, jobs })
    }

    /// Single job lookup honoring the same visibility rules as the list reads.
    pub async fn get_job(&self, job_id: &str, actor: &Actor) -> Result<Job, AppError> {
        let job = self.job_repo.find_by_id(job_id).await?
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", job_id)))?;

        match actor.role {
            ActorRole::Admin | ActorRole::System => Ok(job),
            ActorRole::Staff(role) if job.required_role == role && job.assigned_staff_id.as_deref() == Some(actor.id.as_str()) => Ok(job),
            ActorRole::Staff(_) => Err(AppError::NotFound(format!("Job {} not found", job_id))),
        }
    }

    /// Re-offers jobs that went back to `pending`, e.g. after a reschedule.
    pub async fn redispatch(&self, job_ids: &[String]) -> Vec<SideEffectOutcome> {
        let mut outcomes = Vec::new();
        for job_id in job_ids {
            let outcome = match self.job_repo.find_by_id(job_id).await {
                Ok(Some(job)) if job.status == JobStatus::Pending => self.dispatch_new_job(&job).await,
                Ok(Some(job)) => SideEffectOutcome {
                    kind: SideEffectKind::Dispatch,
                    job_id: Some(job.id),
                    status: SideEffectStatus::Skipped { reason: format!("job is {}", job.status) },
                },
                Ok(None) => SideEffectOutcome {
                    kind: SideEffectKind::Dispatch,
                    job_id: Some(job_id.clone()),
                    status: SideEffectStatus::Skipped { reason: "job not found".into() },
                },
                Err(e) => {
                    warn!("Could not load job {} for re-dispatch: {}", job_id, e);
                    SideEffectOutcome {
                        kind: SideEffectKind::Dispatch,
                        job_id: Some(job_id.clone()),
                        status: SideEffectStatus::Failed { error: e.to_string() },
                    }
                }
            };
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn update_with_retry<F>(&self, job: Job, mutate: &F) -> Result<Option<(Job, Job)>, AppError>
    where
        F: Fn(&Job) -> Option<Job> + Sync,
    {
        let mut current = job;
        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let Some(next) = mutate(&current) else {
                return Ok(None);
            };
            match self.job_repo.update(&next, current.version).await {
                Ok(saved) => return Ok(Some((current, saved))),
                Err(AppError::Conflict(msg)) if attempt < MAX_CAS_ATTEMPTS => {
                    warn!("Version conflict on job {} (attempt {}): {}", current.id, attempt, msg);
                    current = self.job_repo.find_by_id(&current.id).await?
                        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", current.id)))?;
                }
                Err(e) => return Err(e),
            }
        }
        Err(AppError::Conflict(format!("Job {} kept changing underneath the update", current.id)))
    }

    async fn dispatch_new_job(&self, job: &Job) -> SideEffectOutcome {
        let status = match self.dispatch.should_trigger_auto_dispatch(job).await {
            Ok(decision) if !decision.should_trigger => {
                info!("Auto-dispatch skipped for job {}: {}", job.id, decision.reason);
                SideEffectStatus::Skipped { reason: decision.reason }
            }
            Ok(_) => match self.dispatch.trigger_offer_creation(job).await {
                Ok(offer) if offer.success => {
                    info!("Offer {:?} created for job {}", offer.offer_id, job.id);
                    SideEffectStatus::Done { detail: offer.offer_id }
                }
                Ok(offer) => {
                    let error = offer.error.unwrap_or_else(|| "offer creation rejected".to_string());
                    warn!("Offer creation failed for job {}: {}", job.id, error);
                    SideEffectStatus::Failed { error }
                }
                Err(e) => {
                    warn!("Offer creation failed for job {}: {}", job.id, e);
                    SideEffectStatus::Failed { error: e.to_string() }
                }
            },
            Err(e) => {
                warn!("Auto-dispatch check failed for job {}: {}", job.id, e);
                SideEffectStatus::Failed { error: e.to_string() }
            }
        };

        SideEffectOutcome { kind: SideEffectKind::Dispatch, job_id: Some(job.id.clone()), status }
    }

    async fn record_audit(&self, event_type: AuditEventType, entity_id: &str, actor_id: Option<&str>, payload: serde_json::Value) -> SideEffectOutcome {
        let event = AuditEvent::new(event_type, entity_id, actor_id, payload);
        let status = match self.audit_repo.record(&event).await {
            Ok(()) => SideEffectStatus::Done { detail: Some(event.id) },
            Err(e) => {
                warn!("Failed to record audit event {}: {}", event_type.as_str(), e);
                SideEffectStatus::Failed { error: e.to_string() }
            }
        };
        SideEffectOutcome { kind: SideEffectKind::Audit, job_id: None, status }
    }
}

fn patch_snapshot(job: &mut Job, changes: &BookingChanges) {
    if let Some(name) = &changes.guest_name {
        job.guest_name = name.clone();
    }
    if let Some(name) = &changes.property_name {
        job.property_name = name.clone();
    }
    if let Some(instructions) = &changes.special_instructions {
        job.special_instructions = Some(instructions.clone());
    }
    if let Some(check_in) = changes.check_in_date {
        job.check_in_date = check_in;
    }
}

/// Required fields and date ordering are hard errors. A checkout in the past
/// only produces a warning since historical bookings are replayed too.
pub fn validate_create_request(request: &CreateJobsRequest, now: DateTime<Utc>) -> Result<Vec<String>, AppError> {
    let required = [
        ("booking_id", &request.booking_id),
        ("property_id", &request.property_id),
        ("property_name", &request.property_name),
        ("guest_name", &request.guest_name),
    ];
    let missing: Vec<&str> = required.iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!("Missing required fields: {}", missing.join(", "))));
    }

    if request.check_out_date <= request.check_in_date {
        return Err(AppError::Validation("check_out_date must be after check_in_date".into()));
    }

    let mut warnings = Vec::new();
    if request.check_out_date < now {
        warnings.push(format!("Checkout {} is in the past", request.check_out_date.to_rfc3339()));
    }
    Ok(warnings)
}

/// Staff may only touch jobs of their own role: self-assign an open or
/// offered-to-them job, then move only jobs assigned to them.
fn authorize_transition(job: &Job, to: JobStatus, actor: &Actor, extra: &mut TransitionExtra) -> Result<(), AppError> {
    let role = match actor.role {
        ActorRole::Admin | ActorRole::System => return Ok(()),
        ActorRole::Staff(role) => role,
    };

    if job.required_role != role {
        return Err(AppError::Forbidden(format!("Job requires the {} role", job.required_role)));
    }

    let holds_job = job.assigned_staff_id.as_deref() == Some(actor.id.as_str());
    match to {
        JobStatus::Assigned => {
            match extra.assigned_staff_id.as_deref() {
                None => extra.assigned_staff_id = Some(actor.id.clone()),
                Some(id) if id == actor.id => {}
                Some(_) => return Err(AppError::Forbidden("Staff can only assign jobs to themselves".into())),
            }
            if job.status == JobStatus::Offered && job.assigned_staff_id.is_some() && !holds_job {
                return Err(AppError::Forbidden("Job was offered to another staff member".into()));
            }
            Ok(())
        }
        JobStatus::Pending | JobStatus::InProgress | JobStatus::Completed if holds_job => Ok(()),
        JobStatus::Pending | JobStatus::InProgress | JobStatus::Completed => {
            Err(AppError::Forbidden("Job is not assigned to you".into()))
        }
        JobStatus::Offered | JobStatus::Cancelled => {
            Err(AppError::Forbidden(format!("Only administrators can move jobs to {}", to)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::domain::models::job::JobPriority;

    fn request() -> CreateJobsRequest {
        let checkout = Utc::now() + Duration::days(2);
        CreateJobsRequest {
            booking_id: "B1".into(),
            property_id: "P1".into(),
            property_name: "Villa Sol".into(),
            guest_name: "Ana".into(),
            check_in_date: checkout - Duration::days(5),
            check_out_date: checkout,
            special_instructions: None,
        }
    }

    fn job(status: JobStatus, staff: Option<&str>) -> Job {
        let now = Utc::now();
        let mut j = Job::new(NewJobParams {
            booking_id: "B1".into(),
            property_id: "P1".into(),
            job_type: JobType::Cleaning,
            required_role: StaffRole::Housekeeper,
            scheduled_start: now,
            scheduled_end: now + Duration::hours(2),
            priority: JobPriority::Low,
            estimated_duration_min: 120,
            guest_name: "Ana".into(),
            property_name: "Villa Sol".into(),
            check_in_date: now - Duration::days(2),
            check_out_date: now,
            requirements: vec![],
            special_instructions: None,
        }, now);
        j.status = status;
        j.assigned_staff_id = staff.map(str::to_string);
        j
    }

    #[test]
    fn test_validate_create_request() {
        let now = Utc::now();
        assert!(validate_create_request(&request(), now).unwrap().is_empty());

        let mut missing = request();
        missing.guest_name = " ".into();
        missing.property_id = String::new();
        match validate_create_request(&missing, now) {
            Err(AppError::Validation(msg)) => {
                assert!(msg.contains("guest_name"));
                assert!(msg.contains("property_id"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        let mut inverted = request();
        inverted.check_in_date = inverted.check_out_date + Duration::hours(1);
        assert!(validate_create_request(&inverted, now).is_err());

        let mut past = request();
        past.check_out_date = now - Duration::days(1);
        past.check_in_date = now - Duration::days(4);
        let warnings = validate_create_request(&past, now).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("in the past"));
    }

    #[test]
    fn test_admin_can_request_any_transition() {
        let admin = Actor::new("admin-1", ActorRole::Admin);
        let mut extra = TransitionExtra::default();
        assert!(authorize_transition(&job(JobStatus::Pending, None), JobStatus::Offered, &admin, &mut extra).is_ok());
    }

    #[test]
    fn test_staff_self_assignment_fills_staff_id() {
        let me = Actor::new("hk-1", ActorRole::Staff(StaffRole::Housekeeper));
        let mut extra = TransitionExtra::default();
        authorize_transition(&job(JobStatus::Pending, None), JobStatus::Assigned, &me, &mut extra).unwrap();
        assert_eq!(extra.assigned_staff_id.as_deref(), Some("hk-1"));

        let mut other = TransitionExtra { assigned_staff_id: Some("hk-2".into()), ..Default::default() };
        let res = authorize_transition(&job(JobStatus::Pending, None), JobStatus::Assigned, &me, &mut other);
        assert!(matches!(res, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn test_staff_cannot_touch_other_roles_or_others_jobs() {
        let inspector = Actor::new("in-1", ActorRole::Staff(StaffRole::Inspector));
        let res = authorize_transition(&job(JobStatus::Pending, None), JobStatus::Assigned, &inspector, &mut TransitionExtra::default());
        assert!(matches!(res, Err(AppError::Forbidden(_))));

        let me = Actor::new("hk-1", ActorRole::Staff(StaffRole::Housekeeper));
        let theirs = job(JobStatus::Assigned, Some("hk-2"));
        let res = authorize_transition(&theirs, JobStatus::InProgress, &me, &mut TransitionExtra::default());
        assert!(matches!(res, Err(AppError::Forbidden(_))));

        let offered_elsewhere = job(JobStatus::Offered, Some("hk-2"));
        let res = authorize_transition(&offered_elsewhere, JobStatus::Assigned, &me, &mut TransitionExtra::default());
        assert!(matches!(res, Err(AppError::Forbidden(_))));

        let mine = job(JobStatus::InProgress, Some("hk-1"));
        assert!(authorize_transition(&mine, JobStatus::Completed, &me, &mut TransitionExtra::default()).is_ok());
        let res = authorize_transition(&mine, JobStatus::Cancelled, &me, &mut TransitionExtra::default());
        assert!(matches!(res, Err(AppError::Forbidden(_))));
    }
}
