use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::UpdateJobStatusRequest;
use crate::domain::models::job::{JobFilters, JobStatus};
use crate::error::AppError;
use std::sync::Arc;
use tracing::{info_span, Instrument};

pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(filters): Query<JobFilters>,
) -> Result<impl IntoResponse, AppError> {
    user.require_privileged()?;
    let listing = state.job_engine.get_all_jobs(&filters).await?;
    Ok(Json(listing))
}

pub async fn get_job(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(job_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let job = state.job_engine.get_job(&job_id, &user.0).await?;
    Ok(Json(job))
}

pub async fn update_job_status(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(job_id): Path<String>,
    Json(payload): Json<UpdateJobStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (status, extra) = payload.into_parts();

    let span = info_span!("update_job_status", job_id = %job_id, to = %status);
    let job = state.job_engine.update_job_status(&job_id, status, &user.0, extra)
        .instrument(span)
        .await?;

    Ok(Json(job))
}

/// Jobs assigned to the calling worker.
pub async fn my_jobs(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(filters): Query<JobFilters>,
) -> Result<impl IntoResponse, AppError> {
    let role = user.staff_role()?;
    let jobs = state.job_engine.get_jobs_for_role(Some(&user.0.id), role, &filters).await?;
    Ok(Json(jobs))
}

/// Unclaimed jobs of the worker's role, open for self-assignment.
pub async fn open_jobs(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(mut filters): Query<JobFilters>,
) -> Result<impl IntoResponse, AppError> {
    let role = user.staff_role()?;
    filters.status = Some(JobStatus::Pending);
    let jobs = state.job_engine.get_jobs_for_role(None, role, &filters).await?;
    Ok(Json(jobs))
}
