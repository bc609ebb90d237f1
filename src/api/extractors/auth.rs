use axum::{
    extract::{FromRequestParts, FromRef},
    http::{header, request::Parts},
};
use crate::state::AppState;
use crate::domain::models::auth::Claims;
use crate::domain::models::staff::{Actor, ActorRole, StaffRole};
use crate::error::AppError;
use std::sync::Arc;
use tower_cookies::Cookies;
use jsonwebtoken::{decode, DecodingKey, Validation, Algorithm};
use tracing::{debug, Span};

/// Authenticated caller, taken from a Bearer header or the `access_token` cookie.
pub struct AuthUser(pub Actor);

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        match self.0.role {
            ActorRole::Admin => Ok(()),
            _ => Err(AppError::Forbidden("Administrator role required".into())),
        }
    }

    pub fn require_privileged(&self) -> Result<(), AppError> {
        if self.0.role.is_privileged() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Booking system or administrator role required".into()))
        }
    }

    pub fn staff_role(&self) -> Result<StaffRole, AppError> {
        match self.0.role {
            ActorRole::Staff(role) => Ok(role),
            _ => Err(AppError::Forbidden("Only staff accounts have a personal job list".into())),
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts.headers.get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let access_token = match bearer_token(parts) {
            Some(token) => token,
            None => parts.extensions.get::<Cookies>()
                .and_then(|cookies| cookies.get("access_token"))
                .map(|c| c.value().to_string())
                .ok_or(AppError::Unauthorized)?,
        };

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);

        let decoding_key = DecodingKey::from_secret(app_state.config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[app_state.config.auth_audience.as_str()]);
        validation.set_issuer(&[app_state.config.auth_issuer.as_str()]);

        let token_data = decode::<Claims>(&access_token, &decoding_key, &validation)
            .map_err(|e| {
                debug!("Rejected access token: {}", e);
                AppError::Unauthorized
            })?;

        let role: ActorRole = token_data.claims.role.parse()
            .map_err(|_| AppError::Forbidden(format!("Unknown role {}", token_data.claims.role)))?;
        let actor = Actor::new(token_data.claims.sub, role);

        Span::current().record("actor_id", actor.id.as_str());
        Span::current().record("actor_role", actor.role.as_str());

        Ok(AuthUser(actor))
    }
}
