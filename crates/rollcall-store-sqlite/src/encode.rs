//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings, calendar dates as
//! `YYYY-MM-DD`, times of day as `HH:MM`. UUIDs are stored as hyphenated
//! lowercase strings.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rollcall_core::{
  employee::Employee,
  meeting::Meeting,
  registration::Registration,
  user::{OtpPurpose, User},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate / NaiveTime ───────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_time(t: NaiveTime) -> String { t.format("%H:%M").to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, "%H:%M")
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── OtpPurpose ──────────────────────────────────────────────────────────────

pub fn encode_purpose(p: OtpPurpose) -> &'static str { p.as_str() }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `employees` row.
pub struct RawEmployee {
  pub emp_id:      String,
  pub name:        String,
  pub position:    Option<String>,
  pub unit:        Option<String>,
  pub cost_center: Option<String>,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawEmployee {
  pub fn into_employee(self) -> Result<Employee> {
    Ok(Employee {
      emp_id:      self.emp_id,
      name:        self.name,
      position:    self.position,
      unit:        self.unit,
      cost_center: self.cost_center,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `meetings` row.
pub struct RawMeeting {
  pub id:           i64,
  pub topic:        String,
  pub meeting_date: String,
  pub start_time:   String,
  pub end_time:     String,
  pub room:         Option<String>,
  pub floor:        Option<String>,
  pub building:     Option<String>,
  pub organizer_id: Option<i64>,
  pub is_active:    bool,
  pub created_at:   String,
  pub updated_at:   String,
}

impl RawMeeting {
  pub fn into_meeting(self) -> Result<Meeting> {
    Ok(Meeting {
      id:           self.id,
      topic:        self.topic,
      meeting_date: decode_date(&self.meeting_date)?,
      start_time:   decode_time(&self.start_time)?,
      end_time:     decode_time(&self.end_time)?,
      room:         self.room,
      floor:        self.floor,
      building:     self.building,
      organizer_id: self.organizer_id,
      is_active:    self.is_active,
      created_at:   decode_dt(&self.created_at)?,
      updated_at:   decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw strings read directly from a `registrations` row.
pub struct RawRegistration {
  pub id:            i64,
  pub meeting_id:    i64,
  pub emp_id:        String,
  pub name:          String,
  pub position:      Option<String>,
  pub unit:          Option<String>,
  pub cost_center:   Option<String>,
  pub registered_at: String,
  pub is_manual:     bool,
}

impl RawRegistration {
  pub fn into_registration(self) -> Result<Registration> {
    Ok(Registration {
      id:            self.id,
      meeting_id:    self.meeting_id,
      emp_id:        self.emp_id,
      name:          self.name,
      position:      self.position,
      unit:          self.unit,
      cost_center:   self.cost_center,
      registered_at: decode_dt(&self.registered_at)?,
      is_manual:     self.is_manual,
    })
  }
}

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub id:         i64,
  pub email:      String,
  pub name:       String,
  pub is_active:  bool,
  pub created_at: String,
  pub last_login: Option<String>,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:         self.id,
      email:      self.email,
      name:       self.name,
      is_active:  self.is_active,
      created_at: decode_dt(&self.created_at)?,
      last_login: self.last_login.as_deref().map(decode_dt).transpose()?,
    })
  }
}
