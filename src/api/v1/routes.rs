/*
 * Responsibility
 * - URL structure of v1
 * - Every protected registration declares its AuthorizationRequirement right here,
 *   so the whole access policy is readable in one place
 */
use axum::{
    Router,
    routing::{get, post, put},
};

use crate::api::v1::handlers::{
    auth::{login, me, refresh},
    employees::{
        admin_only, admin_or_poc, create_employee, delete_employee, get_employee, list_employees,
        update_employee,
    },
};
use crate::middleware::auth::{AuthorizationRequirement, protect};
use crate::state::AppState;

pub fn routes(state: &AppState) -> Router<AppState> {
    let any = AuthorizationRequirement::authenticated;
    let admin = || AuthorizationRequirement::parse("Admin");

    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", protect(post(refresh), state, any()))
        .route("/auth/me", protect(get(me), state, any()))
        .route(
            "/employees",
            protect(get(list_employees), state, any())
                .merge(protect(post(create_employee), state, admin())),
        )
        .route(
            "/employees/admin-only",
            protect(get(admin_only), state, admin()),
        )
        .route(
            "/employees/admin-or-poc",
            protect(
                get(admin_or_poc),
                state,
                AuthorizationRequirement::parse("Admin,POC"),
            ),
        )
        .route(
            "/employees/{id}",
            protect(get(get_employee), state, any()).merge(protect(
                put(update_employee).delete(delete_employee),
                state,
                admin(),
            )),
        )
}
