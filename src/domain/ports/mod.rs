use crate::domain::models::{
    job::{Job, JobFilters},
    audit::{AuditEvent, AuditEventType},
};
use crate::error::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &Job) -> Result<Job, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Job>, AppError>;
    async fn find_by_booking(&self, booking_id: &str) -> Result<Vec<Job>, AppError>;
    async fn query(&self, filters: &JobFilters) -> Result<Vec<Job>, AppError>;
    /// Compare-and-swap write. Fails with `AppError::Conflict` when the stored
    /// version no longer equals `expected_version`. The returned job carries
    /// the bumped version.
    async fn update(&self, job: &Job, expected_version: i64) -> Result<Job, AppError>;
}

#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn record(&self, event: &AuditEvent) -> Result<(), AppError>;
    async fn list(&self, event_type: Option<AuditEventType>, entity_id: Option<&str>, limit: i64) -> Result<Vec<AuditEvent>, AppError>;
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DispatchDecision {
    pub should_trigger: bool,
    pub reason: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct OfferResult {
    pub success: bool,
    pub offer_id: Option<String>,
    pub error: Option<String>,
}

/// Auto-dispatch/offer subsystem. Matching logic lives on the other side.
#[async_trait]
pub trait DispatchService: Send + Sync {
    async fn should_trigger_auto_dispatch(&self, job: &Job) -> Result<DispatchDecision, AppError>;
    async fn trigger_offer_creation(&self, job: &Job) -> Result<OfferResult, AppError>;
}
