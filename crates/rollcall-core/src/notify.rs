//! Notification job payloads handed to the dispatch queue.
//!
//! Jobs are fire-and-forget: the check-in and auth flows enqueue them and
//! move on, and a delivery failure never surfaces to the caller. The `kind`
//! tag lets a gateway route registrations to a spreadsheet and OTPs to mail.

use serde::Serialize;

use crate::{
  meeting::Meeting,
  registration::Registration,
  user::OtpPurpose,
};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationJob {
  /// A successful check-in, with the meeting it belongs to.
  Registration {
    meeting:      Meeting,
    registration: Registration,
  },
  /// A one-time code to deliver to an organizer.
  Otp {
    email:   String,
    name:    String,
    code:    String,
    purpose: OtpPurpose,
  },
}

impl NotificationJob {
  /// Short label for log lines.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Registration { .. } => "registration",
      Self::Otp { .. } => "otp",
    }
  }
}
