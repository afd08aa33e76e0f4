//! Handlers for the attendee check-in flow.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/meeting` | The meeting currently open, via the resolver |
//! | `POST` | `/checkin` | Form field `emp_id`; directory-backed check-in |
//! | `POST` | `/checkin/manual` | Free-text fields after a directory miss |
//!
//! Every normal outcome — including duplicates and directory misses — is a
//! tagged JSON body, not an error; only storage faults surface as 500s.

use axum::{
  Form, Json,
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use rollcall_core::{
  employee::MIN_EMP_ID_LEN,
  meeting::Meeting,
  notify::NotificationJob,
  registration::{InsertOutcome, NewRegistration, Registration},
  store::RegistryStore,
};

use crate::{error::ApiError, CheckinState};

// ─── Request / response shapes ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CheckinForm {
  pub emp_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ManualCheckinForm {
  pub emp_id:      String,
  pub name:        String,
  pub position:    Option<String>,
  pub unit:        Option<String>,
  pub cost_center: Option<String>,
}

/// Outcome of a check-in attempt, tagged for the presentation layer.
#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckinResponse {
  Registered {
    meeting:      Meeting,
    registration: Registration,
  },
  AlreadyRegistered {
    meeting: Meeting,
  },
  /// Directory miss — the client offers the manual form.
  EmployeeNotFound {
    emp_id:  String,
    meeting: Meeting,
  },
  NoMeetingOpen,
  InvalidEmployeeId {
    reason: String,
  },
  MissingName,
}

impl IntoResponse for CheckinResponse {
  fn into_response(self) -> Response {
    let status = match &self {
      Self::Registered { .. } => StatusCode::CREATED,
      Self::AlreadyRegistered { .. } | Self::EmployeeNotFound { .. } => {
        StatusCode::OK
      }
      Self::NoMeetingOpen => StatusCode::CONFLICT,
      Self::InvalidEmployeeId { .. } | Self::MissingName => {
        StatusCode::BAD_REQUEST
      }
    };
    (status, Json(self)).into_response()
  }
}

// ─── GET /meeting ────────────────────────────────────────────────────────────

/// `GET /meeting`
pub async fn active_meeting<S>(State(state): State<CheckinState<S>>) -> Response
where
  S: RegistryStore + Clone + Send + Sync + 'static,
{
  match state.resolver.resolve().await {
    Some(meeting) => Json(meeting).into_response(),
    None => CheckinResponse::NoMeetingOpen.into_response(),
  }
}

// ─── POST /checkin ───────────────────────────────────────────────────────────

/// `POST /checkin` — body: `emp_id=<code>`
pub async fn submit<S>(
  State(state): State<CheckinState<S>>,
  Form(form): Form<CheckinForm>,
) -> Result<CheckinResponse, ApiError>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let emp_id = form.emp_id.trim().to_owned();
  if let Some(reason) = identifier_problem(&emp_id) {
    return Ok(CheckinResponse::InvalidEmployeeId { reason });
  }

  let Some(meeting) = state.resolver.resolve().await else {
    return Ok(CheckinResponse::NoMeetingOpen);
  };

  let employee = state
    .store
    .find_employee(&emp_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let Some(employee) = employee else {
    return Ok(CheckinResponse::EmployeeNotFound { emp_id, meeting });
  };

  // Friendly pre-check; the constraint in `register` remains the authority.
  if state
    .store
    .is_registered(meeting.id, &employee.emp_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
  {
    return Ok(CheckinResponse::AlreadyRegistered { meeting });
  }

  let input = NewRegistration::for_employee(meeting.id, &employee);
  register(&state, meeting, input).await
}

// ─── POST /checkin/manual ────────────────────────────────────────────────────

/// `POST /checkin/manual` — free-text fields typed in after a directory miss.
pub async fn submit_manual<S>(
  State(state): State<CheckinState<S>>,
  Form(form): Form<ManualCheckinForm>,
) -> Result<CheckinResponse, ApiError>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let emp_id = form.emp_id.trim().to_owned();
  if let Some(reason) = identifier_problem(&emp_id) {
    return Ok(CheckinResponse::InvalidEmployeeId { reason });
  }

  let name = form.name.trim().to_owned();
  if name.is_empty() {
    return Ok(CheckinResponse::MissingName);
  }

  let Some(meeting) = state.resolver.resolve().await else {
    return Ok(CheckinResponse::NoMeetingOpen);
  };

  let input = NewRegistration::manual(
    meeting.id,
    emp_id,
    name,
    none_if_blank(form.position),
    none_if_blank(form.unit),
    none_if_blank(form.cost_center),
  );
  register(&state, meeting, input).await
}

// ─── Shared write path ───────────────────────────────────────────────────────

/// Insert the row, mapping the constraint-backed duplicate outcome, and
/// enqueue the notification best-effort: a full or closed queue is logged and
/// swallowed, never failing the check-in.
async fn register<S>(
  state: &CheckinState<S>,
  meeting: Meeting,
  input: NewRegistration,
) -> Result<CheckinResponse, ApiError>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let outcome = state
    .store
    .insert_registration(input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let registration = match outcome {
    InsertOutcome::Inserted(registration) => registration,
    InsertOutcome::Duplicate => {
      return Ok(CheckinResponse::AlreadyRegistered { meeting });
    }
  };

  let job = NotificationJob::Registration {
    meeting:      meeting.clone(),
    registration: registration.clone(),
  };
  if let Err(e) = state.notifications.try_send(job) {
    tracing::warn!("failed to enqueue registration notification: {e}");
  }

  Ok(CheckinResponse::Registered { meeting, registration })
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn identifier_problem(emp_id: &str) -> Option<String> {
  if emp_id.is_empty() {
    return Some("employee id is required".to_owned());
  }
  if emp_id.len() < MIN_EMP_ID_LEN {
    return Some(format!(
      "employee id must have at least {MIN_EMP_ID_LEN} characters (got {})",
      emp_id.len(),
    ));
  }
  None
}

fn none_if_blank(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}
