/*
 * Responsibility
 * - Employee request/response DTOs
 * - validate() for shape checks before the repo is touched
 */
use serde::{Deserialize, Serialize};

use crate::repos::employee_repo::EmployeeRow;
use crate::services::auth::ClaimsPrincipal;

const MAX_FIELD_LEN: usize = 128;

fn check(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} is required"));
    }
    if value.len() > MAX_FIELD_LEN {
        return Err(format!("{field} must be <= {MAX_FIELD_LEN} chars"));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub name: String,
    pub position: String,
    pub department: String,
}

impl CreateEmployeeRequest {
    pub fn validate(&self) -> Result<(), String> {
        check("name", &self.name)?;
        check("position", &self.position)?;
        check("department", &self.department)
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeRequest {
    pub name: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
}

impl UpdateEmployeeRequest {
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("name", &self.name),
            ("position", &self.position),
            ("department", &self.department),
        ] {
            if let Some(value) = value {
                check(field, value)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct EmployeeResponse {
    pub id: u32,
    pub name: String,
    pub position: String,
    pub department: String,
}

impl From<EmployeeRow> for EmployeeResponse {
    fn from(row: EmployeeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            position: row.position,
            department: row.department,
        }
    }
}

/// Who asked, as read from the request's principal.
#[derive(Debug, Serialize)]
pub struct RequestedBy {
    pub subject: String,
    pub role: String,
}

impl From<&ClaimsPrincipal> for RequestedBy {
    fn from(principal: &ClaimsPrincipal) -> Self {
        Self {
            subject: principal.subject().to_string(),
            role: principal.role().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub requested_by: RequestedBy,
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_every_field() {
        let req = CreateEmployeeRequest {
            name: "Ada".into(),
            position: " ".into(),
            department: "R&D".into(),
        };
        assert_eq!(req.validate(), Err("position is required".to_string()));
    }

    #[test]
    fn update_checks_only_present_fields() {
        let ok = UpdateEmployeeRequest {
            name: None,
            position: Some("Lead".into()),
            department: None,
        };
        assert!(ok.validate().is_ok());

        let too_long = UpdateEmployeeRequest {
            name: Some("x".repeat(MAX_FIELD_LEN + 1)),
            position: None,
            department: None,
        };
        assert!(too_long.validate().is_err());
    }
}
