//! Organizer surface — self-service meeting management over bearer sessions.
//!
//! Mirrors the admin meeting operations, scoped to meetings the signed-in
//! organizer owns. Ownership is checked by fetch-and-compare; a meeting owned
//! by someone else reads as not found.

use axum::{
  Json, Router,
  extract::{Path, State},
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::{get, post, put},
};

use rollcall_core::{
  meeting::{DeleteMeetingOutcome, Meeting},
  registration::Registration,
  store::RegistryStore,
};

use crate::{
  AppState,
  auth::CurrentUser,
  error::Error,
  handlers::{csv_download, MeetingBody},
};

pub fn router<S>(state: AppState<S>) -> Router<()>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route(
      "/organizer/meetings",
      get(list_meetings::<S>).post(create_meeting::<S>),
    )
    .route(
      "/organizer/meetings/{id}",
      put(update_meeting::<S>).delete(delete_meeting::<S>),
    )
    .route("/organizer/meetings/{id}/toggle", post(toggle_meeting::<S>))
    .route(
      "/organizer/meetings/{id}/registrations",
      get(list_registrations::<S>),
    )
    .route(
      "/organizer/meetings/{id}/export",
      get(export_registrations::<S>),
    )
    .with_state(state)
}

fn store_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
  Error::Store(Box::new(e))
}

/// Fetch a meeting and require it to belong to `organizer_id`.
async fn owned_meeting<S>(
  state: &AppState<S>,
  organizer_id: i64,
  meeting_id: i64,
) -> Result<Meeting, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  state
    .store
    .get_meeting(meeting_id)
    .await
    .map_err(store_err)?
    .filter(|m| m.organizer_id == Some(organizer_id))
    .ok_or(Error::NotFound)
}

// ─── Meetings ────────────────────────────────────────────────────────────────

/// `GET /organizer/meetings`
pub async fn list_meetings<S>(
  CurrentUser(user): CurrentUser,
  State(state): State<AppState<S>>,
) -> Result<Json<Vec<Meeting>>, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let meetings = state
    .store
    .list_meetings_by_organizer(user.id)
    .await
    .map_err(store_err)?;
  Ok(Json(meetings))
}

/// `POST /organizer/meetings`
pub async fn create_meeting<S>(
  CurrentUser(user): CurrentUser,
  State(state): State<AppState<S>>,
  Json(body): Json<MeetingBody>,
) -> Result<impl IntoResponse, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let meeting = state
    .store
    .create_meeting(body.into_new_meeting(Some(user.id)))
    .await
    .map_err(store_err)?;

  state.resolver.invalidate().await;
  Ok((StatusCode::CREATED, Json(meeting)))
}

/// `PUT /organizer/meetings/{id}`
pub async fn update_meeting<S>(
  CurrentUser(user): CurrentUser,
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
  Json(body): Json<MeetingBody>,
) -> Result<Json<Meeting>, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  owned_meeting(&state, user.id, id).await?;

  let meeting = state
    .store
    .update_meeting(id, body.into_update())
    .await
    .map_err(store_err)?
    .ok_or(Error::NotFound)?;

  state.resolver.invalidate().await;
  Ok(Json(meeting))
}

/// `POST /organizer/meetings/{id}/toggle`
pub async fn toggle_meeting<S>(
  CurrentUser(user): CurrentUser,
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Meeting>, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let meeting = owned_meeting(&state, user.id, id).await?;

  let toggled = state
    .store
    .set_meeting_active(id, !meeting.is_active)
    .await
    .map_err(store_err)?
    .ok_or(Error::NotFound)?;

  state.resolver.invalidate().await;
  Ok(Json(toggled))
}

/// `DELETE /organizer/meetings/{id}`
pub async fn delete_meeting<S>(
  CurrentUser(user): CurrentUser,
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Response, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  owned_meeting(&state, user.id, id).await?;

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

// ─── Attendance ──────────────────────────────────────────────────────────────

/// `GET /organizer/meetings/{id}/registrations`
pub async fn list_registrations<S>(
  CurrentUser(user): CurrentUser,
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Vec<Registration>>, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  owned_meeting(&state, user.id, id).await?;

  let rows = state
    .store
    .list_registrations(id)
    .await
    .map_err(store_err)?;
  Ok(Json(rows))
}

/// `GET /organizer/meetings/{id}/export`
pub async fn export_registrations<S>(
  CurrentUser(user): CurrentUser,
  State(state): State<AppState<S>>,
  Path(id): Path<i64>,
) -> Result<Response, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let meeting = owned_meeting(&state, user.id, id).await?;

  let rows = state
    .store
    .list_registrations(id)
    .await
    .map_err(store_err)?;
  Ok(csv_download(&meeting, &rows))
}
