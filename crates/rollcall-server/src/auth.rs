//! Authentication: HTTP Basic for admins, email-OTP bearer sessions for
//! organizers.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use rand_core::{OsRng, RngCore as _};
use sha2::{Digest as _, Sha256};
use uuid::Uuid;

use rollcall_core::{store::RegistryStore, user::User};

use crate::{AppState, error::Error};

// ─── Admin Basic auth ────────────────────────────────────────────────────────

/// Credentials accepted as valid for this server instance.
#[derive(Clone)]
pub struct AdminAuth {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Zero-size marker: present in the handler means the request was
/// authenticated as the admin.
pub struct AdminAuthed;

/// Verify credentials directly from headers.
pub fn verify_admin(headers: &HeaderMap, config: &AdminAuth) -> Result<(), Error> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(Error::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;

  if username != config.username {
    return Err(Error::Unauthorized);
  }

  let parsed_hash = PasswordHash::new(&config.password_hash)
    .map_err(|_| Error::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)?;

  Ok(())
}

impl<S> FromRequestParts<AppState<S>> for AdminAuthed
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    verify_admin(&parts.headers, &state.auth)?;
    Ok(AdminAuthed)
  }
}

// ─── Organizer bearer sessions ───────────────────────────────────────────────

/// The organizer resolved from the request's bearer token.
pub struct CurrentUser(pub User);

fn bearer_token(headers: &HeaderMap) -> Option<Uuid> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)?
    .to_str()
    .ok()?;
  let token = header_val.strip_prefix("Bearer ")?;
  Uuid::parse_str(token.trim()).ok()
}

impl<S> FromRequestParts<AppState<S>> for CurrentUser
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(&parts.headers).ok_or(Error::SessionRequired)?;

    let user = state
      .store
      .session_user(token)
      .await
      .map_err(|e| Error::Store(Box::new(e)))?
      .ok_or(Error::SessionRequired)?;

    Ok(CurrentUser(user))
  }
}

// ─── OTP primitives ──────────────────────────────────────────────────────────

/// A fresh 6-digit one-time code.
pub fn generate_otp_code() -> String {
  format!("{:06}", OsRng.next_u32() % 1_000_000)
}

/// Hex SHA-256 of a code; the only form that reaches storage.
pub fn hash_otp_code(code: &str) -> String {
  hex::encode(Sha256::digest(code.as_bytes()))
}

// ─── Email checks ────────────────────────────────────────────────────────────

/// Minimal shape check; strict validation belongs to the delivery gateway.
pub fn looks_like_email(email: &str) -> bool {
  let Some((local, domain)) = email.split_once('@') else {
    return false;
  };
  !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
}

/// An empty allowlist admits every domain.
pub fn is_domain_allowed(email: &str, allowed: &[String]) -> bool {
  if allowed.is_empty() {
    return true;
  }
  let Some((_, domain)) = email.split_once('@') else {
    return false;
  };
  allowed.iter().any(|d| d.eq_ignore_ascii_case(domain))
}
