use chrono::{DateTime, Utc};
use crate::domain::models::job::{JobPriority, JobType};

/// Urgency band from the time left until checkout, evaluated once at creation.
pub fn derive_priority(checkout: DateTime<Utc>, now: DateTime<Utc>) -> JobPriority {
    let minutes_left = (checkout - now).num_minutes();

    if minutes_left < 2 * 60 {
        JobPriority::Critical
    } else if minutes_left < 12 * 60 {
        JobPriority::High
    } else if minutes_left < 24 * 60 {
        JobPriority::Medium
    } else {
        JobPriority::Low
    }
}

const CLEANING_CHECKLIST: &[&str] = &[
    "Strip and remake all beds with fresh linen",
    "Clean and sanitize bathrooms",
    "Clean kitchen surfaces and appliances",
    "Empty all bins and replace liners",
    "Vacuum and mop all floors",
    "Restock toiletries and consumables",
    "Upload after-cleaning photos",
];

const INSPECTION_CHECKLIST: &[&str] = &[
    "Verify cleaning checklist completion",
    "Check for damage or missing inventory",
    "Test lights, appliances and air conditioning",
    "Confirm pool and outdoor areas are guest-ready",
    "Record issues requiring maintenance",
];

const MAINTENANCE_CHECKLIST: &[&str] = &[
    "Review reported issues",
    "Inspect pool equipment and water quality",
    "Check plumbing and electrical fixtures",
    "Log repairs and parts used",
];

/// Ordered checklist the worker app walks through for a job type.
pub fn requirements_for(job_type: JobType) -> Vec<String> {
    let list = match job_type {
        JobType::Cleaning => CLEANING_CHECKLIST,
        JobType::Inspection => INSPECTION_CHECKLIST,
        JobType::Maintenance => MAINTENANCE_CHECKLIST,
    };
    list.iter().map(|s| s.to_string()).collect()
}
