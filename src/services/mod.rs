pub mod auth;
pub mod fault_log;
