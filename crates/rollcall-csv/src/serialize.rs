//! Attendance-sheet CSV serializer.
//!
//! Output starts with a UTF-8 BOM — spreadsheet applications otherwise guess
//! a legacy encoding for non-ASCII names.

use rollcall_core::{meeting::Meeting, registration::Registration};

/// Byte-order mark prefixed to every export.
const BOM: &str = "\u{feff}";

const HEADER: &[&str] = &[
  "No",
  "Employee ID",
  "Name",
  "Position",
  "Unit",
  "Cost center",
  "Registered at",
  "Manual entry",
];

// ─── Field quoting ────────────────────────────────────────────────────────────

/// Quote a field per RFC 4180: wrap when it contains a delimiter, quote, or
/// line break, doubling embedded quotes.
pub(crate) fn csv_field(s: &str) -> String {
  if s.contains([',', '"', '\n', '\r']) {
    format!("\"{}\"", s.replace('"', "\"\""))
  } else {
    s.to_owned()
  }
}

fn record(fields: &[String]) -> String {
  let mut line = fields
    .iter()
    .map(|f| csv_field(f))
    .collect::<Vec<_>>()
    .join(",");
  line.push_str("\r\n");
  line
}

// ─── Export ───────────────────────────────────────────────────────────────────

/// Render the attendance sheet for one meeting.
pub fn attendance_sheet(registrations: &[Registration]) -> String {
  let mut out = String::from(BOM);
  out.push_str(&record(
    &HEADER.iter().map(|h| (*h).to_owned()).collect::<Vec<_>>(),
  ));

  for (idx, reg) in registrations.iter().enumerate() {
    out.push_str(&record(&[
      (idx + 1).to_string(),
      reg.emp_id.clone(),
      reg.name.clone(),
      reg.position.clone().unwrap_or_default(),
      reg.unit.clone().unwrap_or_default(),
      reg.cost_center.clone().unwrap_or_default(),
      reg.registered_at.format("%Y-%m-%d %H:%M:%S").to_string(),
      if reg.is_manual { "yes" } else { "no" }.to_owned(),
    ]));
  }

  out
}

/// Download filename for a meeting's attendance sheet.
pub fn export_filename(meeting: &Meeting) -> String {
  format!(
    "registrations_{}_{}.csv",
    meeting.id,
    meeting.meeting_date.format("%Y%m%d"),
  )
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, TimeZone, Utc};
  use rollcall_core::registration::Registration;

  use super::*;

  fn reg(emp_id: &str, name: &str) -> Registration {
    Registration {
      id:            1,
      meeting_id:    7,
      emp_id:        emp_id.to_owned(),
      name:          name.to_owned(),
      position:      Some("Analyst".to_owned()),
      unit:          None,
      cost_center:   None,
      registered_at: Utc.with_ymd_and_hms(2026, 3, 2, 9, 15, 0).unwrap(),
      is_manual:     false,
    }
  }

  #[test]
  fn plain_fields_are_not_quoted() {
    assert_eq!(csv_field("00123456"), "00123456");
  }

  #[test]
  fn delimiters_force_quoting() {
    assert_eq!(csv_field("Liddell, Alice"), "\"Liddell, Alice\"");
    assert_eq!(csv_field("line\nbreak"), "\"line\nbreak\"");
  }

  #[test]
  fn embedded_quotes_are_doubled() {
    assert_eq!(csv_field("the \"big\" room"), "\"the \"\"big\"\" room\"");
  }

  #[test]
  fn sheet_starts_with_bom_and_header() {
    let sheet = attendance_sheet(&[]);
    assert!(sheet.starts_with('\u{feff}'));
    assert!(sheet.contains("No,Employee ID,Name"));
  }

  #[test]
  fn rows_are_numbered_and_formatted() {
    let sheet = attendance_sheet(&[reg("00123456", "Alice")]);
    let lines: Vec<&str> = sheet.trim_end().split("\r\n").collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
      lines[1],
      "1,00123456,Alice,Analyst,,,2026-03-02 09:15:00,no",
    );
  }

  #[test]
  fn comma_in_name_survives() {
    let sheet = attendance_sheet(&[reg("00123456", "Liddell, Alice")]);
    assert!(sheet.contains("\"Liddell, Alice\""));
  }

  #[test]
  fn filename_includes_id_and_date() {
    let meeting = rollcall_core::meeting::Meeting {
      id:           7,
      topic:        "Town hall".to_owned(),
      meeting_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
      start_time:   chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
      end_time:     chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
      room:         None,
      floor:        None,
      building:     None,
      organizer_id: None,
      is_active:    true,
      created_at:   Utc::now(),
      updated_at:   Utc::now(),
    };
    assert_eq!(export_filename(&meeting), "registrations_7_20260302.csv");
  }
}
