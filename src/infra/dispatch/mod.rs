pub mod http_dispatch_service;
pub mod noop_dispatch_service;
