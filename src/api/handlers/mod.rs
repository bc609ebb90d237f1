pub mod audit;
pub mod health;
pub mod hooks;
pub mod jobs;
