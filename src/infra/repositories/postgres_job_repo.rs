use crate::domain::{models::job::{Job, JobFilters}, ports::JobRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use sqlx::types::Json;

pub struct PostgresJobRepo {
    pool: PgPool,
}

impl PostgresJobRepo {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl JobRepository for PostgresJobRepo {
    async fn create(&self, job: &Job) -> Result<Job, AppError> {
        sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs (id, booking_id, property_id, job_type, required_role, scheduled_start, scheduled_end, status, assigned_staff_id, priority, estimated_duration_min,
                guest_name, property_name, check_in_date, check_out_date, requirements, special_instructions, completion_notes, rating, issues, photos_uploaded,
                cancellation_reason, version, created_at, updated_at, assigned_at, started_at, completed_at, cancelled_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29)
            RETURNING *
            "#
        )
            .bind(&job.id).bind(&job.booking_id).bind(&job.property_id).bind(job.job_type.as_str())
            .bind(job.required_role.as_str()).bind(job.scheduled_start).bind(job.scheduled_end).bind(job.status.as_str())
            .bind(&job.assigned_staff_id).bind(job.priority.as_str()).bind(job.estimated_duration_min)
            .bind(&job.guest_name).bind(&job.property_name).bind(job.check_in_date).bind(job.check_out_date)
            .bind(Json(&job.requirements)).bind(&job.special_instructions).bind(&job.completion_notes).bind(job.rating)
            .bind(Json(&job.issues)).bind(job.photos_uploaded).bind(&job.cancellation_reason).bind(job.version)
            .bind(job.created_at).bind(job.updated_at).bind(job.assigned_at).bind(job.started_at)
            .bind(job.completed_at).bind(job.cancelled_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Persistence)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Job>, AppError> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Persistence)
    }

    async fn find_by_booking(&self, booking_id: &str) -> Result<Vec<Job>, AppError> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE booking_id = $1 ORDER BY scheduled_start ASC")
            .bind(booking_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Persistence)
    }

    async fn query(&self, filters: &JobFilters) -> Result<Vec<Job>, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM jobs WHERE TRUE");

        if let Some(booking_id) = &filters.booking_id {
            qb.push(" AND booking_id = ").push_bind(booking_id.clone());
        }
        if let Some(property_id) = &filters.property_id {
            qb.push(" AND property_id = ").push_bind(property_id.clone());
        }
        if let Some(status) = filters.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(job_type) = filters.job_type {
            qb.push(" AND job_type = ").push_bind(job_type.as_str());
        }
        if let Some(role) = filters.required_role {
            qb.push(" AND required_role = ").push_bind(role.as_str());
        }
        if let Some(staff_id) = &filters.assigned_staff_id {
            qb.push(" AND assigned_staff_id = ").push_bind(staff_id.clone());
        }
        if let Some(from) = filters.scheduled_from {
            qb.push(" AND scheduled_start >= ").push_bind(from);
        }
        if let Some(to) = filters.scheduled_to {
            qb.push(" AND scheduled_start <= ").push_bind(to);
        }

        qb.push(" ORDER BY scheduled_start ASC");
        if let Some(limit) = filters.limit {
            qb.push(" LIMIT ").push_bind(limit);
        }

        qb.build_query_as::<Job>()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Persistence)
    }

    async fn update(&self, job: &Job, expected_version: i64) -> Result<Job, AppError> {
        let updated = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs SET scheduled_start = $1, scheduled_end = $2, status = $3, assigned_staff_id = $4, priority = $5,
                guest_name = $6, property_name = $7, check_in_date = $8, check_out_date = $9, special_instructions = $10,
                completion_notes = $11, rating = $12, issues = $13, photos_uploaded = $14, cancellation_reason = $15,
                updated_at = $16, assigned_at = $17, started_at = $18, completed_at = $19, cancelled_at = $20,
                version = version + 1
            WHERE id = $21 AND version = $22
            RETURNING *
            "#
        )
            .bind(job.scheduled_start).bind(job.scheduled_end).bind(job.status.as_str()).bind(&job.assigned_staff_id)
            .bind(job.priority.as_str()).bind(&job.guest_name).bind(&job.property_name).bind(job.check_in_date)
            .bind(job.check_out_date).bind(&job.special_instructions).bind(&job.completion_notes).bind(job.rating)
            .bind(Json(&job.issues)).bind(job.photos_uploaded).bind(&job.cancellation_reason)
            .bind(job.updated_at).bind(job.assigned_at).bind(job.started_at).bind(job.completed_at).bind(job.cancelled_at)
            .bind(&job.id).bind(expected_version)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Persistence)?;

        match updated {
            Some(job) => Ok(job),
            None if self.find_by_id(&job.id).await?.is_some() => {
                Err(AppError::Conflict(format!("Job {} was modified concurrently", job.id)))
            }
            None => Err(AppError::NotFound(format!("Job {} not found", job.id))),
        }
    }
}
