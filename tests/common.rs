use turnover_engine::{
    api::router::create_router,
    state::AppState,
    config::{Config, WorkflowConfig},
    infra::repositories::{
        sqlite_job_repo::SqliteJobRepo,
        sqlite_audit_repo::SqliteAuditRepo,
    },
    domain::models::{
        auth::Claims,
        booking::{BookingEvent, BookingStatus},
        job::Job,
    },
    domain::ports::{DispatchDecision, DispatchService, OfferResult},
    error::AppError,
};
use sqlx::{sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    Router,
};
use chrono::{DateTime, Duration, Utc};
use std::str::FromStr;
use async_trait::async_trait;
use jsonwebtoken::{encode, EncodingKey, Header};
use tower::ServiceExt;
use serde_json::Value;

pub const TEST_SECRET: &str = "test-secret-for-turnover-engine";
pub const TEST_ISSUER: &str = "test-issuer";
pub const TEST_AUDIENCE: &str = "turnover-engine";

#[derive(Clone, Copy, PartialEq)]
pub enum DispatchMode {
    Accept,
    Decline,
    Fail,
}

/// Records every job it is asked to offer.
pub struct MockDispatchService {
    pub mode: DispatchMode,
    pub offered: Mutex<Vec<String>>,
}

impl MockDispatchService {
    pub fn new(mode: DispatchMode) -> Self {
        Self { mode, offered: Mutex::new(Vec::new()) }
    }

    pub fn offered_jobs(&self) -> Vec<String> {
        self.offered.lock().unwrap().clone()
    }
}

#[async_trait]
impl DispatchService for MockDispatchService {
    async fn should_trigger_auto_dispatch(&self, _job: &Job) -> Result<DispatchDecision, AppError> {
        match self.mode {
            DispatchMode::Decline => Ok(DispatchDecision { should_trigger: false, reason: "no staff on shift".into() }),
            _ => Ok(DispatchDecision { should_trigger: true, reason: "auto-dispatch enabled".into() }),
        }
    }

    async fn trigger_offer_creation(&self, job: &Job) -> Result<OfferResult, AppError> {
        match self.mode {
            DispatchMode::Fail => Err(AppError::Dispatch("offer service unreachable".into())),
            _ => {
                self.offered.lock().unwrap().push(job.id.clone());
                Ok(OfferResult { success: true, offer_id: Some(format!("offer-{}", job.id)), error: None })
            }
        }
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub dispatch: Arc<MockDispatchService>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        Self::with_options(DispatchMode::Accept, WorkflowConfig::default()).await
    }

    pub async fn with_dispatch(mode: DispatchMode) -> Self {
        Self::with_options(mode, WorkflowConfig::default()).await
    }

    pub async fn with_options(mode: DispatchMode, workflow: WorkflowConfig) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(StdDuration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_secret: TEST_SECRET.to_string(),
            auth_issuer: TEST_ISSUER.to_string(),
            auth_audience: TEST_AUDIENCE.to_string(),
            dispatch_url: None,
            dispatch_token: String::new(),
            workflow,
        };

        let dispatch = Arc::new(MockDispatchService::new(mode));
        let state = Arc::new(AppState::new(
            config,
            Arc::new(SqliteJobRepo::new(pool.clone())),
            Arc::new(SqliteAuditRepo::new(pool.clone())),
            dispatch.clone(),
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            dispatch,
        }
    }

    pub fn token(&self, sub: &str, role: &str) -> String {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            iss: TEST_ISSUER.to_string(),
            sub: sub.to_string(),
            aud: TEST_AUDIENCE.to_string(),
            exp: now + 3600,
            iat: now,
            role: role.to_string(),
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(TEST_SECRET.as_bytes())).unwrap()
    }

    pub fn system_token(&self) -> String {
        self.token("booking-service", "system")
    }

    pub fn admin_token(&self) -> String {
        self.token("admin-1", "admin")
    }

    pub async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        (status, parse_body(response).await)
    }

    /// Confirms a booking through the hook endpoint and returns the response body.
    pub async fn confirm(&self, booking: &BookingEvent) -> Value {
        let token = self.system_token();
        let (status, body) = self.send(
            "POST",
            "/api/v1/hooks/bookings/confirmed",
            Some(&token),
            Some(serde_json::to_value(booking).unwrap()),
        ).await;
        assert_eq!(status, StatusCode::CREATED, "Confirm failed: {}", body);
        body
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}

#[allow(dead_code)]
pub fn booking(booking_id: &str, check_out: DateTime<Utc>) -> BookingEvent {
    BookingEvent {
        booking_id: booking_id.to_string(),
        property_id: "prop-villa-sol".to_string(),
        property_name: "Villa Sol".to_string(),
        guest_name: "Ana Costa".to_string(),
        check_in_date: check_out - Duration::days(4),
        check_out_date: check_out,
        status: BookingStatus::Confirmed,
        special_instructions: Some("Guest has a dog".to_string()),
    }
}

/// A checkout three days out, truncated to the minute.
#[allow(dead_code)]
pub fn future_checkout() -> DateTime<Utc> {
    let t = Utc::now() + Duration::days(3);
    DateTime::from_timestamp(t.timestamp() - t.timestamp() % 60, 0).unwrap()
}

#[allow(dead_code)]
pub async fn parse_body(response: axum::response::Response) -> Value {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if body_bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
}

#[allow(dead_code)]
pub fn job_of_type<'a>(jobs: &'a [Job], job_type: &str) -> &'a Job {
    jobs.iter()
        .find(|j| j.job_type.as_str() == job_type)
        .unwrap_or_else(|| panic!("no {} job", job_type))
}
