/*
 * Responsibility
 * - Extractors shared by v1 handlers
 */
pub mod auth_ctx;

pub use auth_ctx::CurrentPrincipal;
