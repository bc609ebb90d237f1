use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;
use std::fmt;
use std::str::FromStr;
use crate::domain::models::staff::StaffRole;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Cleaning,
    Inspection,
    Maintenance,
}

impl JobType {
    pub const ALL: [JobType; 3] = [JobType::Cleaning, JobType::Inspection, JobType::Maintenance];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::Cleaning => "cleaning",
            JobType::Inspection => "inspection",
            JobType::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cleaning" => Ok(JobType::Cleaning),
            "inspection" => Ok(JobType::Inspection),
            "maintenance" => Ok(JobType::Maintenance),
            other => Err(AppError::Validation(format!("Unknown job type: {}", other))),
        }
    }
}

impl TryFrom<String> for JobType {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Offered,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub const ALL: [JobStatus; 6] = [
        JobStatus::Pending,
        JobStatus::Offered,
        JobStatus::Assigned,
        JobStatus::InProgress,
        JobStatus::Completed,
        JobStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Offered => "offered",
            JobStatus::Assigned => "assigned",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Cancelled)
    }

    /// States in which `assigned_staff_id` may be set.
    pub fn bears_assignment(&self) -> bool {
        matches!(self, JobStatus::Offered | JobStatus::Assigned | JobStatus::InProgress)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "offered" => Ok(JobStatus::Offered),
            "assigned" => Ok(JobStatus::Assigned),
            "in_progress" => Ok(JobStatus::InProgress),
            "completed" => Ok(JobStatus::Completed),
            "cancelled" => Ok(JobStatus::Cancelled),
            other => Err(AppError::Validation(format!("Unknown job status: {}", other))),
        }
    }
}

impl TryFrom<String> for JobStatus {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl JobPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobPriority::Low => "low",
            JobPriority::Medium => "medium",
            JobPriority::High => "high",
            JobPriority::Critical => "critical",
        }
    }
}

impl FromStr for JobPriority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(JobPriority::Low),
            "medium" => Ok(JobPriority::Medium),
            "high" => Ok(JobPriority::High),
            "critical" => Ok(JobPriority::Critical),
            other => Err(AppError::Validation(format!("Unknown job priority: {}", other))),
        }
    }
}

impl TryFrom<String> for JobPriority {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A scheduled unit of turnover work derived from a booking.
///
/// Booking fields (`guest_name`, `property_name`, check-in/out) are a snapshot
/// taken at creation and only change through an explicit modification patch.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Job {
    pub id: String,
    pub booking_id: String,
    pub property_id: String,
    #[sqlx(try_from = "String")]
    pub job_type: JobType,
    #[sqlx(try_from = "String")]
    pub required_role: StaffRole,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    #[sqlx(try_from = "String")]
    pub status: JobStatus,
    pub assigned_staff_id: Option<String>,
    #[sqlx(try_from = "String")]
    pub priority: JobPriority,
    pub estimated_duration_min: i32,
    pub guest_name: String,
    pub property_name: String,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    #[sqlx(json)]
    pub requirements: Vec<String>,
    pub special_instructions: Option<String>,
    pub completion_notes: Option<String>,
    pub rating: Option<i32>,
    #[sqlx(json)]
    pub issues: Vec<String>,
    pub photos_uploaded: i32,
    pub cancellation_reason: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

pub struct NewJobParams {
    pub booking_id: String,
    pub property_id: String,
    pub job_type: JobType,
    pub required_role: StaffRole,
    pub scheduled_start: DateTime<Utc>,
    pub scheduled_end: DateTime<Utc>,
    pub priority: JobPriority,
    pub estimated_duration_min: i32,
    pub guest_name: String,
    pub property_name: String,
    pub check_in_date: DateTime<Utc>,
    pub check_out_date: DateTime<Utc>,
    pub requirements: Vec<String>,
    pub special_instructions: Option<String>,
}

impl Job {
    pub fn new(params: NewJobParams, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id: params.booking_id,
            property_id: params.property_id,
            job_type: params.job_type,
            required_role: params.required_role,
            scheduled_start: params.scheduled_start,
            scheduled_end: params.scheduled_end,
            status: JobStatus::Pending,
            assigned_staff_id: None,
            priority: params.priority,
            estimated_duration_min: params.estimated_duration_min,
            guest_name: params.guest_name,
            property_name: params.property_name,
            check_in_date: params.check_in_date,
            check_out_date: params.check_out_date,
            requirements: params.requirements,
            special_instructions: params.special_instructions,
            completion_notes: None,
            rating: None,
            issues: Vec::new(),
            photos_uploaded: 0,
            cancellation_reason: None,
            version: 1,
            created_at: now,
            updated_at: now,
            assigned_at: None,
            started_at: None,
            completed_at: None,
            cancelled_at: None,
        }
    }
}

/// Payload required to move a job into `completed`.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct CompletionData {
    pub notes: String,
    pub rating: Option<i32>,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub photos_uploaded: i32,
}

/// Conjunctive filter set shared by the admin and role-scoped reads.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct JobFilters {
    pub booking_id: Option<String>,
    pub property_id: Option<String>,
    pub status: Option<JobStatus>,
    pub job_type: Option<JobType>,
    pub required_role: Option<StaffRole>,
    pub assigned_staff_id: Option<String>,
    pub scheduled_from: Option<DateTime<Utc>>,
    pub scheduled_to: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

impl JobFilters {
    /// Evaluates the filter against a job already in memory.
    pub fn matches(&self, job: &Job) -> bool {
        self.booking_id.as_ref().is_none_or(|b| &job.booking_id == b)
            && self.property_id.as_ref().is_none_or(|p| &job.property_id == p)
            && self.status.is_none_or(|s| job.status == s)
            && self.job_type.is_none_or(|t| job.job_type == t)
            && self.required_role.is_none_or(|r| job.required_role == r)
            && self.assigned_staff_id.as_ref().is_none_or(|s| job.assigned_staff_id.as_ref() == Some(s))
            && self.scheduled_from.is_none_or(|from| job.scheduled_start >= from)
            && self.scheduled_to.is_none_or(|to| job.scheduled_start <= to)
    }
}
