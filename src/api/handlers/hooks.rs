use axum::{extract::{State, Path}, http::StatusCode, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::CancelBookingRequest;
use crate::domain::models::booking::{BookingChanges, BookingEvent, BookingModification};
use crate::error::AppError;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};

pub async fn booking_confirmed(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(payload): Json<BookingEvent>,
) -> Result<impl IntoResponse, AppError> {
    user.require_privileged()?;

    let span = info_span!("booking_confirmed", booking_id = %payload.booking_id);
    let created = state.booking_hook.on_booking_confirmed(&payload)
        .instrument(span)
        .await?;

    info!("Created {} jobs for booking {}", created.job_ids.len(), created.booking_id);
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn booking_modified(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(booking_id): Path<String>,
    Json(changes): Json<BookingChanges>,
) -> Result<impl IntoResponse, AppError> {
    user.require_privileged()?;

    let modification = BookingModification { booking_id: booking_id.clone(), changes };
    let span = info_span!("booking_modified", booking_id = %booking_id);
    let outcome = state.booking_hook.on_booking_modified(&modification, &user.0)
        .instrument(span)
        .await?;

    Ok(Json(outcome))
}

pub async fn booking_cancelled(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(booking_id): Path<String>,
    Json(payload): Json<CancelBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    user.require_privileged()?;

    let span = info_span!("booking_cancelled", booking_id = %booking_id);
    let outcome = state.booking_hook.on_booking_cancelled(&booking_id, payload.reason.as_deref(), &user.0)
        .instrument(span)
        .await?;

    Ok(Json(outcome))
}

pub async fn booking_jobs_summary(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    user.require_privileged()?;
    let summary = state.booking_hook.get_booking_jobs_summary(&booking_id).await?;
    Ok(Json(summary))
}
