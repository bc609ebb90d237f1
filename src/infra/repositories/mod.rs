pub mod sqlite_job_repo;
pub mod sqlite_audit_repo;

pub mod postgres_job_repo;
pub mod postgres_audit_repo;
