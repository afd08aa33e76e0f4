//! Email-OTP signup and login for organizers.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/signup` | `{email, name}` — issues a signup OTP |
//! | `POST` | `/auth/login`  | `{email}` — issues a login OTP |
//! | `POST` | `/auth/verify` | `{email, code, purpose}` — trades the code for a bearer token |
//! | `POST` | `/auth/logout` | Deletes the presented session |
//!
//! OTP delivery rides the notification queue; the endpoints answer before
//! anything is sent, and a delivery failure never surfaces here.

use axum::{
  Json, Router,
  extract::State,
  http::{HeaderMap, StatusCode},
  response::{IntoResponse, Response},
  routing::post,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use rollcall_core::{
  notify::NotificationJob,
  store::RegistryStore,
  user::{NewOtp, OtpOutcome, OtpPurpose, User},
};

use crate::{
  AppState,
  auth::{generate_otp_code, hash_otp_code, is_domain_allowed, looks_like_email},
  error::Error,
};

pub fn router<S>(state: AppState<S>) -> Router<()>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/auth/signup", post(signup::<S>))
    .route("/auth/login", post(login::<S>))
    .route("/auth/verify", post(verify::<S>))
    .route("/auth/logout", post(logout::<S>))
    .with_state(state)
}

fn store_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
  Error::Store(Box::new(e))
}

// ─── Request / response shapes ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SignupBody {
  pub email: String,
  pub name:  String,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyBody {
  pub email:   String,
  pub code:    String,
  pub purpose: OtpPurpose,
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum VerifyResponse {
  Verified {
    token:      Uuid,
    expires_at: DateTime<Utc>,
    user:       User,
  },
  InvalidCode,
  Expired,
  TooManyAttempts,
  NoPendingCode,
}

impl IntoResponse for VerifyResponse {
  fn into_response(self) -> Response {
    let status = match &self {
      Self::Verified { .. } => StatusCode::OK,
      Self::InvalidCode | Self::Expired => StatusCode::UNAUTHORIZED,
      Self::TooManyAttempts => StatusCode::TOO_MANY_REQUESTS,
      Self::NoPendingCode => StatusCode::NOT_FOUND,
    };
    (status, Json(self)).into_response()
  }
}

// ─── OTP issue ───────────────────────────────────────────────────────────────

fn normalize_email(raw: &str) -> String {
  raw.trim().to_lowercase()
}

/// Persist a hashed code and queue its delivery.
async fn issue_otp<S>(
  state: &AppState<S>,
  email: &str,
  name: &str,
  purpose: OtpPurpose,
) -> Result<(), Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let code = generate_otp_code();

  state
    .store
    .store_otp(NewOtp {
      email:      email.to_owned(),
      code_hash:  hash_otp_code(&code),
      purpose,
      expires_at: Utc::now() + state.config.otp_validity(),
    })
    .await
    .map_err(store_err)?;

  let job = NotificationJob::Otp {
    email: email.to_owned(),
    name:  name.to_owned(),
    code,
    purpose,
  };
  if let Err(e) = state.notifications.try_send(job) {
    tracing::warn!("failed to enqueue otp notification: {e}");
  }

  Ok(())
}

fn otp_sent() -> Response {
  (
    StatusCode::ACCEPTED,
    Json(serde_json::json!({ "outcome": "otp_sent" })),
  )
    .into_response()
}

// ─── Handlers ────────────────────────────────────────────────────────────────

/// `POST /auth/signup`
pub async fn signup<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<SignupBody>,
) -> Result<Response, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let email = normalize_email(&body.email);
  let name  = body.name.trim().to_owned();

  if !looks_like_email(&email) {
    return Err(Error::BadRequest("invalid email address".to_owned()));
  }
  if !is_domain_allowed(&email, &state.config.allowed_email_domains) {
    return Err(Error::BadRequest("email domain not allowed".to_owned()));
  }
  if name.is_empty() {
    return Err(Error::BadRequest("name is required".to_owned()));
  }

  let Some(user) = state
    .store
    .upsert_pending_user(&email, &name)
    .await
    .map_err(store_err)?
  else {
    return Err(Error::Conflict("email already registered".to_owned()));
  };

  issue_otp(&state, &email, &user.name, OtpPurpose::Signup).await?;
  Ok(otp_sent())
}

/// `POST /auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<LoginBody>,
) -> Result<Response, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let email = normalize_email(&body.email);

  let user = state
    .store
    .find_user_by_email(&email)
    .await
    .map_err(store_err)?
    .filter(|u| u.is_active)
    .ok_or(Error::NotFound)?;

  issue_otp(&state, &email, &user.name, OtpPurpose::Login).await?;
  Ok(otp_sent())
}

/// `POST /auth/verify`
pub async fn verify<S>(
  State(state): State<AppState<S>>,
  Json(body): Json<VerifyBody>,
) -> Result<VerifyResponse, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let email = normalize_email(&body.email);

  let outcome = state
    .store
    .consume_otp(
      &email,
      &hash_otp_code(body.code.trim()),
      body.purpose,
      state.config.otp_max_attempts,
    )
    .await
    .map_err(store_err)?;

  match outcome {
    OtpOutcome::Accepted => {}
    OtpOutcome::Incorrect => return Ok(VerifyResponse::InvalidCode),
    OtpOutcome::Expired => return Ok(VerifyResponse::Expired),
    OtpOutcome::AttemptsExceeded => return Ok(VerifyResponse::TooManyAttempts),
    OtpOutcome::NonePending => return Ok(VerifyResponse::NoPendingCode),
  }

  let user = state
    .store
    .find_user_by_email(&email)
    .await
    .map_err(store_err)?
    .ok_or(Error::NotFound)?;

  let user = match body.purpose {
    OtpPurpose::Signup => state
      .store
      .activate_user(user.id)
      .await
      .map_err(store_err)?
      .ok_or(Error::NotFound)?,
    OtpPurpose::Login => user,
  };

  let expires_at = Utc::now() + state.config.session_duration();
  let session = state
    .store
    .create_session(user.id, Uuid::new_v4(), expires_at)
    .await
    .map_err(store_err)?;

  state.store.record_login(user.id).await.map_err(store_err)?;

  Ok(VerifyResponse::Verified {
    token: session.token,
    expires_at: session.expires_at,
    user,
  })
}

/// `POST /auth/logout`
pub async fn logout<S>(
  State(state): State<AppState<S>>,
  headers: HeaderMap,
) -> Result<StatusCode, Error>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let token = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .and_then(|t| Uuid::parse_str(t.trim()).ok())
    .ok_or(Error::SessionRequired)?;

  state
    .store
    .delete_session(token)
    .await
    .map_err(store_err)?;

  Ok(StatusCode::NO_CONTENT)
}
