/*
 * Responsibility
 * - Shared context bound to the Router (AppState)
 * - Clone is cheap (Arc / Clone-cheap handles inside)
 * - Holds only process-wide, read-only services plus the resource store
 */
use std::sync::Arc;

use crate::repos::employee_repo::EmployeeRepo;
use crate::services::auth::{AuthServices, AuthenticationService, TokenCodec};
use crate::services::fault_log::FaultLog;

#[derive(Clone, Debug)]
pub struct AppState {
    pub codec: Arc<TokenCodec>,
    pub auth: Arc<AuthenticationService>,
    pub fault_log: FaultLog,
    pub employees: EmployeeRepo,
}

impl AppState {
    pub fn new(auth: AuthServices, fault_log: FaultLog, employees: EmployeeRepo) -> Self {
        Self {
            codec: auth.codec,
            auth: auth.authentication,
            fault_log,
            employees,
        }
    }
}
