use crate::domain::{models::job::{Job, JobFilters}, ports::JobRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use sqlx::types::Json;

pub struct SqliteJobRepo {
    pool: SqlitePool,
}

impl SqliteJobRepo {
    pub fn new(pool: SqlitePool) -> Self { Self { pool } }
}

#[async_trait]
impl JobRepository for SqliteJobRepo {
    async fn create(&self, job: &Job) -> Result<Job, AppError> {
        sqlx::query_as::<_, Job>(
            "INSERT INTO jobs (id, booking_id, property_id, job_type, required_role, scheduled_start, scheduled_end, status, assigned_staff_id, priority, estimated_duration_min,
                guest_name, property_name, check_in_date, check_out_date, requirements, special_instructions, completion_notes, rating, issues, photos_uploaded,
                cancellation_reason, version, created_at, updated_at, assigned_at, started_at, completed_at, cancelled_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
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
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Persistence)
    }

    async fn find_by_booking(&self, booking_id: &str) -> Result<Vec<Job>, AppError> {
        sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE booking_id = ? ORDER BY scheduled_start ASC")
            .bind(booking_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Persistence)
    }

    async fn query(&self, filters: &JobFilters) -> Result<Vec<Job>, AppError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM jobs WHERE 1 = 1");

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
            "UPDATE jobs SET scheduled_start = ?, scheduled_end = ?, status = ?, assigned_staff_id = ?, priority = ?,
                guest_name = ?, property_name = ?, check_in_date = ?, check_out_date = ?, special_instructions = ?,
                completion_notes = ?, rating = ?, issues = ?, photos_uploaded = ?, cancellation_reason = ?,
                updated_at = ?, assigned_at = ?, started_at = ?, completed_at = ?, cancelled_at = ?,
                version = version + 1
             WHERE id = ? AND version = ?
             RETURNING *"
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
