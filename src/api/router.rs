use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, hooks, jobs, audit};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Booking lifecycle hooks
        .route("/api/v1/hooks/bookings/confirmed", post(hooks::booking_confirmed))
        .route("/api/v1/hooks/bookings/{booking_id}/modified", post(hooks::booking_modified))
        .route("/api/v1/hooks/bookings/{booking_id}/cancelled", post(hooks::booking_cancelled))
        .route("/api/v1/bookings/{booking_id}/jobs/summary", get(hooks::booking_jobs_summary))

        // Jobs
        .route("/api/v1/jobs", get(jobs::list_jobs))
        .route("/api/v1/jobs/{job_id}", get(jobs::get_job))
        .route("/api/v1/jobs/{job_id}/status", put(jobs::update_job_status))

        // Worker views
        .route("/api/v1/me/jobs", get(jobs::my_jobs))
        .route("/api/v1/me/jobs/open", get(jobs::open_jobs))

        // Audit
        .route("/api/v1/audit-events", get(audit::list_audit_events))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        actor_id = tracing::field::Empty,
                        actor_role = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
