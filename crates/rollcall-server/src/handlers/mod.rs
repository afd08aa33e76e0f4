//! Route handlers for the admin, organizer, and auth surfaces.

pub mod admin;
pub mod auth;
pub mod organizer;

use axum::{
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

use rollcall_core::{
  meeting::{Meeting, MeetingUpdate, NewMeeting},
  registration::Registration,
};

// ─── Shared request shapes ───────────────────────────────────────────────────

/// JSON body shared by meeting create and edit, for both surfaces.
#[derive(Debug, Deserialize)]
pub struct MeetingBody {
  pub topic:        String,
  pub meeting_date: NaiveDate,
  pub start_time:   NaiveTime,
  pub end_time:     NaiveTime,
  pub room:         Option<String>,
  pub floor:        Option<String>,
  pub building:     Option<String>,
  /// Create only: activate on creation. Ignored on edit.
  #[serde(default)]
  pub is_active:    bool,
}

impl MeetingBody {
  pub fn into_new_meeting(self, organizer_id: Option<i64>) -> NewMeeting {
    NewMeeting {
      topic:        self.topic,
      meeting_date: self.meeting_date,
      start_time:   self.start_time,
      end_time:     self.end_time,
      room:         self.room,
      floor:        self.floor,
      building:     self.building,
      organizer_id,
      is_active:    self.is_active,
    }
  }

  pub fn into_update(self) -> MeetingUpdate {
    MeetingUpdate {
      topic:        self.topic,
      meeting_date: self.meeting_date,
      start_time:   self.start_time,
      end_time:     self.end_time,
      room:         self.room,
      floor:        self.floor,
      building:     self.building,
    }
  }
}

#[derive(Debug, Deserialize, Default)]
pub struct PageParams {
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

// ─── CSV download response ───────────────────────────────────────────────────

/// Attendance sheet as a CSV attachment.
pub fn csv_download(meeting: &Meeting, registrations: &[Registration]) -> Response {
  let body     = rollcall_csv::attendance_sheet(registrations);
  let filename = rollcall_csv::export_filename(meeting);

  (
    StatusCode::OK,
    [
      (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
      (
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{filename}\""),
      ),
    ],
    body,
  )
    .into_response()
}
