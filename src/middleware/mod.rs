/*
 * Responsibility
 * - Public interface of the middleware layers
 * - auth: bearer token + role requirement per route
 * - exception: fault boundary around every route
 * - http: transport concerns (request id, tracing, limits)
 */
pub mod auth;
pub mod exception;
pub mod http;
