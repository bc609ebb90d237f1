use crate::domain::models::job::{Job, JobPriority, JobType};
use crate::domain::models::staff::StaffRole;
use crate::domain::ports::{DispatchDecision, DispatchService, OfferResult};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::error;

/// Talks to the external offer/dispatch service over HTTP.
pub struct HttpDispatchService {
    client: Client,
    base_url: String,
    api_token: String,
}

impl HttpDispatchService {
    pub fn new(base_url: String, api_token: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        }
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, payload: &JobPayload<'_>) -> Result<T, AppError> {
        let url = format!("{}{}", self.base_url, path);
        let res = self.client.post(&url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Dispatch service connection error: {}", e);
                error!("{}", msg);
                AppError::Dispatch(msg)
            })?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Dispatch service failed. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::Dispatch(msg));
        }

        res.json::<T>().await.map_err(|e| {
            let msg = format!("Dispatch service returned an unreadable body: {}", e);
            error!("{}", msg);
            AppError::Dispatch(msg)
        })
    }
}

#[derive(Serialize)]
struct JobPayload<'a> {
    job_id: &'a str,
    booking_id: &'a str,
    property_id: &'a str,
    job_type: JobType,
    required_role: StaffRole,
    priority: JobPriority,
    scheduled_start: DateTime<Utc>,
    scheduled_end: DateTime<Utc>,
    estimated_duration_min: i32,
}

impl<'a> From<&'a Job> for JobPayload<'a> {
    fn from(job: &'a Job) -> Self {
        Self {
            job_id: &job.id,
            booking_id: &job.booking_id,
            property_id: &job.property_id,
            job_type: job.job_type,
            required_role: job.required_role,
            priority: job.priority,
            scheduled_start: job.scheduled_start,
            scheduled_end: job.scheduled_end,
            estimated_duration_min: job.estimated_duration_min,
        }
    }
}

#[async_trait]
impl DispatchService for HttpDispatchService {
    async fn should_trigger_auto_dispatch(&self, job: &Job) -> Result<DispatchDecision, AppError> {
        self.post("/api/v1/dispatch/should-trigger", &JobPayload::from(job)).await
    }

    async fn trigger_offer_creation(&self, job: &Job) -> Result<OfferResult, AppError> {
        self.post("/api/v1/offers", &JobPayload::from(job)).await
    }
}
