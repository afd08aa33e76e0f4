//! Admin surface — meeting management, attendance, directory import.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/admin/meetings` | Newest first, `?limit=&offset=` |
//! | `POST`   | `/admin/meetings` | `is_active` claims the single slot |
//! | `PUT`    | `/admin/meetings/{id}` | Replace editable fields |
//! | `POST`   | `/admin/meetings/{id}/toggle` | Flip active status |
//! | `DELETE` | `/admin/meetings/{id}` | 409 while registrations exist |
//! | `GET`    | `/admin/meetings/{id}/registrations` | |
//! | `GET`    | `/admin/meetings/{id}/export` | CSV attachment |
//! | `DELETE` | `/admin/registrations/{id}` | |
//! | `GET`    | `/admin/stats` | Totals + active-meeting breakdown |
//! | `GET`    | `/admin/employees` | `?search=&limit=&offset=` |
//! | `POST`   | `/admin/employees/import` | CSV body, upserts directory |
//!
//! All requests authenticate with HTTP Basic against the configured admin
//! credentials. Every meeting mutation invalidates the active-meeting cache.

use axum::{
  Json, Router,
  extract::{Path, Query, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::{delete, get, post, put},
};
use serde::{Deserialize, Serialize};

use rollcall_core::{
  employee::{Employee, ImportSummary},
  meeting::{DeleteMeetingOutcome, Meeting},
  registration::{Registration, RegistrationBreakdown},
  store::{DirectoryQuery, RegistryStore},
};

use crate::{
  AppState,
  auth::AdminAuthed,
  error::Error,
  handlers::{csv_download, MeetingBody, PageParams},
};

pub fn router<S>(state: AppState<S>) -> Router<()>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route(
      "/admin/meetings",
      get(list_meetings::<S>).post(create_meeting::<S>),
    )
    .route("/admin/meetings/{id}", put(update_meeting::<S>).delete(delete_meeting::<S>))
    .route("/admin/meetings/{id}/toggle", post(toggle_meeting::<S>))
    .route(
      "/admin/meetings/{id}/registrations",
      get(list_registrations::<S>),
    )
    .route("/admin/meetings/{id}/export", get(export_registrations::<S>))
    .route("/admin/registrations/{id}", delete(delete_registration::<S>))
    .route("/admin/stats", get(stats::<S>))
    .route("/admin/employees", get(list_employees::<S>))
    .route("/admin/employees/import", post(import_employees::<S>))
    .with_state(state)
}

fn store_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
  Error::Store(Box::new(e))
}

// ─── Meetings ────────────────────────────────────────────────────────────────

/// `GET /admin/meetings`
pub async fn list_meetings<S>(
  _auth: AdminAuthed,
  State(state): State<AppState<S>>,
  Query(page): Query<PageParams>,
) -> Result<Json<Vec<Meeting>>, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let meetings = state
    .store
    .list_meetings(page.limit.unwrap_or(50), page.offset.unwrap_or(0))
    .await
    .map_err(store_err)?;
  Ok(Json(meetings))
}

/// `POST /admin/meetings`
pub async fn create_meeting<S>(
  _auth: AdminAuthed,
  State(state): State<AppState<S>>,
  Json(body): Json<MeetingBody>,
) -> Result<impl IntoResponse, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let meeting = state
    .store
    .create_meeting(body.into_new_meeting(None))
    .await
    .map_err(store_err)?;

  state.resolver.invalidate().await;
  Ok((StatusCode::CREATED, Json(meeting)))
}

/// `PUT /admin/meetings/{id}`
pub async fn update_meeting<S>(
  _auth: AdminAuthed,
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Json(body): Json<MeetingBody>,
) -> Result<Json<Meeting>, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let meeting = state
    .store
    .update_meeting(id, body.into_update())
    .await
    .map_err(store_err)?
    .ok_or(Error::NotFound)?;

  state.resolver.invalidate().await;
  Ok(Json(meeting))
}

/// `POST /admin/meetings/{id}/toggle`
pub async fn toggle_meeting<S>(
  _auth: AdminAuthed,
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Meeting>, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let meeting = state
    .store
    .get_meeting(id)
    .await
    .map_err(store_err)?
    .ok_or(Error::NotFound)?;

  let toggled = state
    .store
    .set_meeting_active(id, !meeting.is_active)
    .await
    .map_err(store_err)?
    .ok_or(Error::NotFound)?;

  state.resolver.invalidate().await;
  Ok(Json(toggled))
}

/// `DELETE /admin/meetings/{id}`
pub async fn delete_meeting<S>(
  _auth: AdminAuthed,
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Response, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  match state.store.delete_meeting(id).await.map_err(store_err)? {
    DeleteMeetingOutcome::Deleted => {
      state.resolver.invalidate().await;
      Ok(StatusCode::NO_CONTENT.into_response())
    }
    DeleteMeetingOutcome::NotFound => Err(Error::NotFound),
    DeleteMeetingOutcome::HasRegistrations(count) => Err(Error::Conflict(
      format!("meeting has {count} registrations"),
    )),
  }
}

// ─── Registrations ───────────────────────────────────────────────────────────

/// `GET /admin/meetings/{id}/registrations`
pub async fn list_registrations<S>(
  _auth: AdminAuthed,
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Vec<Registration>>, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .get_meeting(id)
    .await
    .map_err(store_err)?
    .ok_or(Error::NotFound)?;

  let rows = state
    .store
    .list_registrations(id)
    .await
    .map_err(store_err)?;
  Ok(Json(rows))
}

/// `GET /admin/meetings/{id}/export`
pub async fn export_registrations<S>(
  _auth: AdminAuthed,
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Response, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let meeting = state
    .store
    .get_meeting(id)
    .await
    .map_err(store_err)?
    .ok_or(Error::NotFound)?;

  let rows = state
    .store
    .list_registrations(id)
    .await
    .map_err(store_err)?;

  Ok(csv_download(&meeting, &rows))
}

/// `DELETE /admin/registrations/{id}`
pub async fn delete_registration<S>(
  _auth: AdminAuthed,
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let deleted = state
    .store
    .delete_registration(id)
    .await
    .map_err(store_err)?;

  if deleted {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(Error::NotFound)
  }
}

// ─── Statistics ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Stats {
  pub employees:      u64,
  pub meetings:       u64,
  pub active_meeting: Option<Meeting>,
  /// Attendance aggregates for the active meeting, when one is open.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub registrations:  Option<u64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub breakdown:      Option<RegistrationBreakdown>,
}

/// `GET /admin/stats`
pub async fn stats<S>(
  _auth: AdminAuthed,
  State(state): State<AppState<S>>,
) -> Result<Json<Stats>, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let employees = state.store.count_employees().await.map_err(store_err)?;
  let meetings  = state.store.count_meetings().await.map_err(store_err)?;

  let active_meeting = state.resolver.resolve().await;

  let (registrations, breakdown) = match &active_meeting {
    Some(meeting) => {
      let count = state
        .store
        .count_registrations(meeting.id)
        .await
        .map_err(store_err)?;
      let breakdown = state
        .store
        .registration_breakdown(meeting.id)
        .await
        .map_err(store_err)?;
      (Some(count), Some(breakdown))
    }
    None => (None, None),
  };

  Ok(Json(Stats {
    employees,
    meetings,
    active_meeting,
    registrations,
    breakdown,
  }))
}

// ─── Directory ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Default)]
pub struct DirectoryParams {
  pub search: Option<String>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

/// `GET /admin/employees`
pub async fn list_employees<S>(
  _auth: AdminAuthed,
  State(state): State<AppState<S>>,
  Query(params): Query<DirectoryParams>,
) -> Result<Json<Vec<Employee>>, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let query = DirectoryQuery {
    search: params.search,
    limit:  params.limit,
    offset: params.offset,
  };
  let employees = state
    .store
    .list_employees(&query)
    .await
    .map_err(store_err)?;
  Ok(Json(employees))
}

/// `POST /admin/employees/import` — raw CSV body.
pub async fn import_employees<S>(
  _auth: AdminAuthed,
  State(state): State<AppState<S>>,
  body: String,
) -> Result<Json<ImportSummary>, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let rows    = rollcall_csv::parse_employees(&body)?;
  let summary = state
    .store
    .upsert_employees(rows)
    .await
    .map_err(store_err)?;
  Ok(Json(summary))
}
