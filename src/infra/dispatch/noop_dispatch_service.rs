use crate::domain::models::job::Job;
use crate::domain::ports::{DispatchDecision, DispatchService, OfferResult};
use crate::error::AppError;
use async_trait::async_trait;

/// Used when no dispatch service is configured. Jobs stay `pending` until
/// someone picks them up by hand.
pub struct NoopDispatchService;

#[async_trait]
impl DispatchService for NoopDispatchService {
    async fn should_trigger_auto_dispatch(&self, _job: &Job) -> Result<DispatchDecision, AppError> {
        Ok(DispatchDecision {
            should_trigger: false,
            reason: "auto-dispatch disabled".to_string(),
        })
    }

    async fn trigger_offer_creation(&self, job: &Job) -> Result<OfferResult, AppError> {
        Ok(OfferResult {
            success: false,
            offer_id: None,
            error: Some(format!("auto-dispatch disabled, job {} not offered", job.id)),
        })
    }
}
