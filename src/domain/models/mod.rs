pub mod audit;
pub mod auth;
pub mod booking;
pub mod job;
pub mod staff;
