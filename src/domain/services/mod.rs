pub mod booking_hook;
pub mod job_engine;
pub mod requirements;
pub mod state_machine;
pub mod timing;
