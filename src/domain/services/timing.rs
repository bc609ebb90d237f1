use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use crate::config::WorkflowConfig;
use crate::domain::models::job::JobType;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    fn starting_at(start: DateTime<Utc>, duration_min: i64) -> Option<Self> {
        let end = start.checked_add_signed(Duration::try_minutes(duration_min)?)?;
        Some(Self { start, end })
    }
}

/// Per-step windows for one checkout. Maintenance hangs off checkout directly
/// and is independent of the cleaning -> inspection chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Schedule {
    pub cleaning: TimeWindow,
    pub inspection: TimeWindow,
    pub maintenance: TimeWindow,
}

impl Schedule {
    pub fn window(&self, job_type: JobType) -> TimeWindow {
        match job_type {
            JobType::Cleaning => self.cleaning,
            JobType::Inspection => self.inspection,
            JobType::Maintenance => self.maintenance,
        }
    }
}

fn offset(from: DateTime<Utc>, minutes: i64) -> Option<DateTime<Utc>> {
    from.checked_add_signed(Duration::try_minutes(minutes)?)
}

/// Fails with `Validation` when a window would fall outside the representable
/// date range.
pub fn compute_schedule(checkout: DateTime<Utc>, config: &WorkflowConfig) -> Result<Schedule, AppError> {
    let windows = || -> Option<Schedule> {
        let cleaning = TimeWindow::starting_at(
            offset(checkout, config.cleaning_delay_min)?,
            config.duration_for(JobType::Cleaning),
        )?;
        let inspection = TimeWindow::starting_at(
            offset(cleaning.end, config.inter_job_buffer_min)?,
            config.duration_for(JobType::Inspection),
        )?;
        let maintenance = TimeWindow::starting_at(
            offset(checkout, config.maintenance_delay_min)?,
            config.duration_for(JobType::Maintenance),
        )?;
        Some(Schedule { cleaning, inspection, maintenance })
    };

    windows().ok_or_else(|| AppError::Validation(format!(
        "check_out_date {} is too far out to schedule turnover jobs", checkout.to_rfc3339()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn checkout() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 7, 12, 11, 0, 0).unwrap()
    }

    #[test]
    fn test_default_schedule_matches_turnover_plan() {
        let t = checkout();
        let s = compute_schedule(t, &WorkflowConfig::default()).unwrap();

        assert_eq!(s.cleaning.start, t + Duration::minutes(15));
        assert_eq!(s.cleaning.end, t + Duration::minutes(135));
        assert_eq!(s.inspection.start, t + Duration::minutes(150));
        assert_eq!(s.inspection.end, t + Duration::minutes(180));
        assert_eq!(s.maintenance.start, t + Duration::minutes(60));
        assert_eq!(s.maintenance.end, t + Duration::minutes(120));
    }

    #[test]
    fn test_inspection_never_precedes_cleaning_plus_buffer() {
        let base = checkout();
        let configs = [
            WorkflowConfig::default(),
            WorkflowConfig { cleaning_delay_min: 0, inter_job_buffer_min: 0, ..WorkflowConfig::default() },
            WorkflowConfig { cleaning_delay_min: 240, inter_job_buffer_min: 90, ..WorkflowConfig::default() },
        ];

        for cfg in &configs {
            for offset_min in [-600_i64, -1, 0, 7, 1439, 10_000] {
                let s = compute_schedule(base + Duration::minutes(offset_min), cfg).unwrap();
                assert!(s.inspection.start >= s.cleaning.end + Duration::minutes(cfg.inter_job_buffer_min));
                assert!(s.cleaning.end > s.cleaning.start);
                assert!(s.inspection.end > s.inspection.start);
                assert!(s.maintenance.end > s.maintenance.start);
            }
        }
    }

    #[test]
    fn test_schedule_is_deterministic() {
        let cfg = WorkflowConfig::default();
        assert_eq!(compute_schedule(checkout(), &cfg).unwrap(), compute_schedule(checkout(), &cfg).unwrap());
    }

    #[test]
    fn test_custom_durations_are_used() {
        let mut cfg = WorkflowConfig::default();
        cfg.cleaning.duration_min = 45;
        cfg.inspection.duration_min = 10;
        let s = compute_schedule(checkout(), &cfg).unwrap();

        assert_eq!(s.window(JobType::Cleaning).end - s.cleaning.start, Duration::minutes(45));
        assert_eq!(s.window(JobType::Inspection).end - s.inspection.start, Duration::minutes(10));
    }

    #[test]
    fn test_checkout_at_end_of_time_is_rejected() {
        let last = DateTime::<Utc>::MAX_UTC;
        match compute_schedule(last, &WorkflowConfig::default()) {
            Err(AppError::Validation(msg)) => assert!(msg.contains("too far out")),
            other => panic!("expected validation error, got {:?}", other),
        }

        let near_end = last - Duration::minutes(100);
        assert!(compute_schedule(near_end, &WorkflowConfig::default()).is_err(), "Inspection would overflow");
    }
}
