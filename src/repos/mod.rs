/*
 * Responsibility
 * - Persistence stand-ins for the protected resources
 */
pub mod employee_repo;
