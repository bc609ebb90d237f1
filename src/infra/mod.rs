pub mod dispatch;
pub mod factory;
pub mod repositories;
