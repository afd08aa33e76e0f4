//! Meeting — a scheduled session attendees can check in to.
//!
//! At most one meeting is open for check-in at a time. The store enforces
//! this with a single atomic activation statement, never a
//! deactivate-then-activate pair.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meeting {
  pub id:           i64,
  pub topic:        String,
  pub meeting_date: NaiveDate,
  pub start_time:   NaiveTime,
  pub end_time:     NaiveTime,
  pub room:         Option<String>,
  pub floor:        Option<String>,
  pub building:     Option<String>,
  /// Owning organizer account, if the meeting was created through the
  /// organizer surface. Admin-created meetings have none.
  pub organizer_id: Option<i64>,
  pub is_active:    bool,
  pub created_at:   DateTime<Utc>,
  pub updated_at:   DateTime<Utc>,
}

/// Input to meeting creation. Timestamps and the id are set by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMeeting {
  pub topic:        String,
  pub meeting_date: NaiveDate,
  pub start_time:   NaiveTime,
  pub end_time:     NaiveTime,
  pub room:         Option<String>,
  pub floor:        Option<String>,
  pub building:     Option<String>,
  pub organizer_id: Option<i64>,
  /// When set, the new meeting becomes the single active one.
  pub is_active:    bool,
}

/// Full replacement of a meeting's editable fields. Activation is a separate
/// operation so the single-active invariant has exactly one write path.
#[derive(Debug, Clone, Deserialize)]
pub struct MeetingUpdate {
  pub topic:        String,
  pub meeting_date: NaiveDate,
  pub start_time:   NaiveTime,
  pub end_time:     NaiveTime,
  pub room:         Option<String>,
  pub floor:        Option<String>,
  pub building:     Option<String>,
}

/// Result of a meeting deletion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMeetingOutcome {
  Deleted,
  NotFound,
  /// Refused: attendance rows still reference the meeting.
  HasRegistrations(u64),
}
