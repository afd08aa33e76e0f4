//! Read-side helpers backing the check-in form.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/employees/{emp_id}` | Directory pre-check for the form |
//! | `GET`  | `/status/{meeting_id}/{emp_id}` | Has this pair registered |

use axum::{Json, extract::{Path, State}};
use serde::Serialize;

use rollcall_core::{employee::Employee, store::RegistryStore};

use crate::{error::ApiError, CheckinState};

#[derive(Debug, Serialize)]
pub struct EmployeeCheck {
  pub exists:   bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub employee: Option<Employee>,
}

/// `GET /employees/{emp_id}` — the form's AJAX pre-check, with the same
/// zero-tolerant lookup as the submission path.
pub async fn check<S>(
  State(state): State<CheckinState<S>>,
  Path(emp_id): Path<String>,
) -> Result<Json<EmployeeCheck>, ApiError>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let employee = state
    .store
    .find_employee(&emp_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(EmployeeCheck {
    exists: employee.is_some(),
    employee,
  }))
}

#[derive(Debug, Serialize)]
pub struct RegistrationStatus {
  pub registered: bool,
}

/// `GET /status/{meeting_id}/{emp_id}`
pub async fn status<S>(
  State(state): State<CheckinState<S>>,
  Path((meeting_id, emp_id)): Path<(i64, String)>,
) -> Result<Json<RegistrationStatus>, ApiError>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let registered = state
    .store
    .is_registered(meeting_id, &emp_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(RegistrationStatus { registered }))
}
