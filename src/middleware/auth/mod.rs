pub mod access;
pub mod requirement;

pub use access::{AccessDenied, UnauthenticatedReason, evaluate, protect};
pub use requirement::AuthorizationRequirement;
