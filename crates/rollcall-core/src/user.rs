//! Organizer accounts and their email-OTP login primitives.
//!
//! Accounts are created inactive at signup and activated by the first
//! verified OTP, so an abandoned signup never blocks the email address.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An organizer account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id:         i64,
  pub email:      String,
  pub name:       String,
  pub is_active:  bool,
  pub created_at: DateTime<Utc>,
  pub last_login: Option<DateTime<Utc>>,
}

/// What a one-time code was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpPurpose {
  Signup,
  Login,
}

impl OtpPurpose {
  /// The discriminant string stored in the `purpose` column.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Signup => "signup",
      Self::Login => "login",
    }
  }
}

/// Input to [`crate::store::RegistryStore::store_otp`]. The code itself never
/// reaches storage — only its hash.
#[derive(Debug, Clone)]
pub struct NewOtp {
  pub email:      String,
  pub code_hash:  String,
  pub purpose:    OtpPurpose,
  pub expires_at: DateTime<Utc>,
}

/// Result of checking a submitted code against the latest pending OTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpOutcome {
  /// The code matched; the token is now consumed.
  Accepted,
  /// The code did not match; the attempt was counted.
  Incorrect,
  Expired,
  AttemptsExceeded,
  /// No pending token exists for this email and purpose.
  NonePending,
}

/// A bearer-token login session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  pub token:      Uuid,
  pub user_id:    i64,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}
