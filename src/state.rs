use std::sync::Arc;
use crate::domain::ports::{AuditRepository, DispatchService, JobRepository};
use crate::domain::services::{booking_hook::BookingLifecycleHook, job_engine::JobEngine};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub job_repo: Arc<dyn JobRepository>,
    pub audit_repo: Arc<dyn AuditRepository>,
    pub dispatch_service: Arc<dyn DispatchService>,
    pub job_engine: Arc<JobEngine>,
    pub booking_hook: Arc<BookingLifecycleHook>,
}

impl AppState {
    /// Wires the engine and the lifecycle hook on top of the given adapters.
    pub fn new(
        config: Config,
        job_repo: Arc<dyn JobRepository>,
        audit_repo: Arc<dyn AuditRepository>,
        dispatch_service: Arc<dyn DispatchService>,
    ) -> Self {
        let job_engine = Arc::new(JobEngine::new(
            job_repo.clone(),
            audit_repo.clone(),
            dispatch_service.clone(),
            config.workflow.clone(),
        ));
        let booking_hook = Arc::new(BookingLifecycleHook::new(job_engine.clone(), job_repo.clone()));

        Self { config, job_repo, audit_repo, dispatch_service, job_engine, booking_hook }
    }
}
