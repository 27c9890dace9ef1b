/*
 * Responsibility
 * - /employees handlers
 * - Path/Json via extractors, DTO validation -> repo
 * - Role checks are NOT done here; routes.rs declares them per registration
 */
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    api::v1::{
        dto::employees::{
            CreateEmployeeRequest, EmployeeResponse, Envelope, MessageResponse, RequestedBy,
            UpdateEmployeeRequest,
        },
        extractors::CurrentPrincipal,
    },
    error::AppError,
    state::AppState,
};

pub async fn list_employees(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> Json<Envelope<Vec<EmployeeResponse>>> {
    let rows = state.employees.list().await;

    Json(Envelope {
        requested_by: RequestedBy::from(&principal),
        data: rows.into_iter().map(EmployeeResponse::from).collect(),
    })
}

pub async fn get_employee(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<u32>,
) -> Result<Json<Envelope<EmployeeResponse>>, AppError> {
    let row = state
        .employees
        .get(id)
        .await
        .ok_or(AppError::not_found("employee"))?;

    Ok(Json(Envelope {
        requested_by: RequestedBy::from(&principal),
        data: row.into(),
    }))
}

pub async fn create_employee(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Json(req): Json<CreateEmployeeRequest>,
) -> Result<(StatusCode, Json<EmployeeResponse>), AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_EMPLOYEE", msg))?;

    let row = state
        .employees
        .create(&req.name, &req.position, &req.department)
        .await;
    tracing::info!(employee_id = row.id, by = %principal.subject(), "employee created");

    Ok((StatusCode::CREATED, Json(row.into())))
}

pub async fn update_employee(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<u32>,
    Json(req): Json<UpdateEmployeeRequest>,
) -> Result<Json<EmployeeResponse>, AppError> {
    req.validate()
        .map_err(|msg| AppError::bad_request("INVALID_EMPLOYEE", msg))?;

    let row = state
        .employees
        .update(
            id,
            req.name.as_deref(),
            req.position.as_deref(),
            req.department.as_deref(),
        )
        .await
        .ok_or(AppError::not_found("employee"))?;
    tracing::info!(employee_id = id, by = %principal.subject(), "employee updated");

    Ok(Json(row.into()))
}

pub async fn delete_employee(
    State(state): State<AppState>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(id): Path<u32>,
) -> Result<StatusCode, AppError> {
    if !state.employees.delete(id).await {
        return Err(AppError::not_found("employee"));
    }
    tracing::info!(employee_id = id, by = %principal.subject(), "employee deleted");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn admin_only() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "This endpoint is only accessible by Admin users",
    })
}

pub async fn admin_or_poc() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "This endpoint is accessible by Admin or POC users",
    })
}
