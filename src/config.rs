use std::env;
use crate::domain::models::job::JobType;
use crate::domain::models::staff::StaffRole;
use crate::error::AppError;

/// Upper bound for any configured offset or duration (one week).
pub const MAX_WORKFLOW_MINUTES: i64 = 7 * 24 * 60;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub auth_issuer: String,
    pub auth_audience: String,
    pub dispatch_url: Option<String>,
    pub dispatch_token: String,
    pub workflow: WorkflowConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "https://auth.villa-ops.local".to_string()),
            auth_audience: env::var("AUTH_AUDIENCE").unwrap_or_else(|_| "turnover-engine".to_string()),
            dispatch_url: env::var("DISPATCH_SERVICE_URL").ok().filter(|u| !u.is_empty()),
            dispatch_token: env::var("DISPATCH_SERVICE_TOKEN").unwrap_or_default(),
            workflow: WorkflowConfig::from_env(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StepSettings {
    pub duration_min: i64,
    pub required_role: StaffRole,
}

/// Timing offsets, durations, workflow sequence and role mapping. Built once
/// and handed to the engine; nothing in here changes at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowConfig {
    pub steps: Vec<JobType>,
    pub cleaning_delay_min: i64,
    pub inter_job_buffer_min: i64,
    pub maintenance_delay_min: i64,
    pub cleaning: StepSettings,
    pub inspection: StepSettings,
    pub maintenance: StepSettings,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            steps: vec![JobType::Cleaning, JobType::Inspection],
            cleaning_delay_min: 15,
            inter_job_buffer_min: 15,
            maintenance_delay_min: 60,
            cleaning: StepSettings { duration_min: 120, required_role: StaffRole::Housekeeper },
            inspection: StepSettings { duration_min: 30, required_role: StaffRole::Inspector },
            maintenance: StepSettings { duration_min: 60, required_role: StaffRole::Maintenance },
        }
    }
}

impl WorkflowConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let mut steps = defaults.steps.clone();
        if env_flag("WORKFLOW_INCLUDE_MAINTENANCE") {
            steps.push(JobType::Maintenance);
        }

        Self {
            steps,
            cleaning_delay_min: env_minutes("CLEANING_DELAY_MINUTES", defaults.cleaning_delay_min),
            inter_job_buffer_min: env_minutes("INTER_JOB_BUFFER_MINUTES", defaults.inter_job_buffer_min),
            maintenance_delay_min: env_minutes("MAINTENANCE_DELAY_MINUTES", defaults.maintenance_delay_min),
            cleaning: StepSettings {
                duration_min: env_minutes("CLEANING_DURATION_MINUTES", defaults.cleaning.duration_min),
                ..defaults.cleaning
            },
            inspection: StepSettings {
                duration_min: env_minutes("INSPECTION_DURATION_MINUTES", defaults.inspection.duration_min),
                ..defaults.inspection
            },
            maintenance: StepSettings {
                duration_min: env_minutes("MAINTENANCE_DURATION_MINUTES", defaults.maintenance.duration_min),
                ..defaults.maintenance
            },
        }
    }

    pub fn with_maintenance(mut self) -> Self {
        if !self.steps.contains(&JobType::Maintenance) {
            self.steps.push(JobType::Maintenance);
        }
        self
    }

    pub fn step(&self, job_type: JobType) -> &StepSettings {
        match job_type {
            JobType::Cleaning => &self.cleaning,
            JobType::Inspection => &self.inspection,
            JobType::Maintenance => &self.maintenance,
        }
    }

    pub fn role_for(&self, job_type: JobType) -> StaffRole {
        self.step(job_type).required_role
    }

    pub fn duration_for(&self, job_type: JobType) -> i64 {
        self.step(job_type).duration_min
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.steps.is_empty() {
            return Err(AppError::Validation("Workflow must contain at least one step".into()));
        }
        for (i, step) in self.steps.iter().enumerate() {
            if self.steps[..i].contains(step) {
                return Err(AppError::Validation(format!("Workflow step {} listed twice", step)));
            }
        }
        if self.steps.contains(&JobType::Inspection) && !self.steps.contains(&JobType::Cleaning) {
            return Err(AppError::Validation("Inspection step requires a cleaning step".into()));
        }
        for job_type in JobType::ALL {
            let duration = self.duration_for(job_type);
            if duration <= 0 {
                return Err(AppError::Validation(format!("Duration for {} must be positive", job_type)));
            }
            if duration > MAX_WORKFLOW_MINUTES {
                return Err(AppError::Validation(format!(
                    "Duration for {} must be at most {} minutes", job_type, MAX_WORKFLOW_MINUTES
                )));
            }
        }
        let offsets = [self.cleaning_delay_min, self.inter_job_buffer_min, self.maintenance_delay_min];
        if offsets.iter().any(|m| *m < 0) {
            return Err(AppError::Validation("Workflow offsets must not be negative".into()));
        }
        if offsets.iter().any(|m| *m > MAX_WORKFLOW_MINUTES) {
            return Err(AppError::Validation(format!(
                "Workflow offsets must be at most {} minutes", MAX_WORKFLOW_MINUTES
            )));
        }
        Ok(())
    }
}

fn env_minutes(key: &str, default: i64) -> i64 {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("{} is not a number ({}), using default {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|v| matches!(v.as_str(), "1" | "true" | "yes")).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_workflow_is_valid() {
        let cfg = WorkflowConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.steps, vec![JobType::Cleaning, JobType::Inspection]);
        assert_eq!(cfg.role_for(JobType::Cleaning), StaffRole::Housekeeper);
        assert_eq!(cfg.duration_for(JobType::Inspection), 30);
    }

    #[test]
    fn test_with_maintenance_is_idempotent() {
        let cfg = WorkflowConfig::default().with_maintenance().with_maintenance();
        assert_eq!(cfg.steps.len(), 3);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_invalid_workflows_rejected() {
        let mut cfg = WorkflowConfig::default();
        cfg.cleaning.duration_min = 0;
        assert!(cfg.validate().is_err(), "Zero duration accepted");

        let mut cfg = WorkflowConfig::default();
        cfg.steps = vec![JobType::Cleaning, JobType::Cleaning];
        assert!(cfg.validate().is_err(), "Duplicate step accepted");

        let mut cfg = WorkflowConfig::default();
        cfg.steps = vec![JobType::Inspection];
        assert!(cfg.validate().is_err(), "Inspection without cleaning accepted");

        let mut cfg = WorkflowConfig::default();
        cfg.inter_job_buffer_min = -5;
        assert!(cfg.validate().is_err(), "Negative buffer accepted");
    }

    #[test]
    fn test_oversized_minutes_rejected() {
        let mut cfg = WorkflowConfig::default();
        cfg.cleaning_delay_min = i64::MAX;
        assert!(cfg.validate().is_err(), "Huge delay accepted");

        let mut cfg = WorkflowConfig::default();
        cfg.maintenance.duration_min = i64::from(i32::MAX) + 1;
        assert!(cfg.validate().is_err(), "Duration past i32 accepted");

        let mut cfg = WorkflowConfig::default();
        cfg.inspection.duration_min = MAX_WORKFLOW_MINUTES;
        cfg.inter_job_buffer_min = MAX_WORKFLOW_MINUTES;
        assert!(cfg.validate().is_ok(), "Week-long bounds should still be accepted");
    }
}
