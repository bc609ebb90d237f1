use crate::domain::{models::audit::{AuditEvent, AuditEventType}, ports::AuditRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

pub struct PostgresAuditRepo {
    pool: PgPool,
}

impl PostgresAuditRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepo {
    async fn record(&self, event: &AuditEvent) -> Result<(), AppError> {
        sqlx::query("INSERT INTO audit_events (id, event_type, entity_id, actor_id, payload, created_at) VALUES ($1, $2, $3, $4, $5, $6)")
            .bind(&event.id)
            .bind(event.event_type.as_str())
            .bind(&event.entity_id)
            .bind(&event.actor_id)
            .bind(&event.payload)
            .bind(event.created_at)
            .execute(&self.pool)
            .await
            .map_err(AppError::Persistence)?;
        Ok(())
    }

    async fn list(&self, event_type: Option<AuditEventType>, entity_id: Option<&str>, limit: i64) -> Result<Vec<AuditEvent>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM audit_events WHERE TRUE");
        if let Some(event_type) = event_type {
            qb.push(" AND event_type = ").push_bind(event_type.as_str());
        }
        if let Some(entity_id) = entity_id {
            qb.push(" AND entity_id = ").push_bind(entity_id.to_string());
        }
        qb.push(" ORDER BY created_at DESC LIMIT ").push_bind(limit);

        qb.build_query_as::<AuditEvent>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Persistence)
    }
}
