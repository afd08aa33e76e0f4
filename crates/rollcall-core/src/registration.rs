//! Registration — one attendance row per `(meeting, employee code)` pair.
//!
//! The row snapshots the attendee's directory attributes at check-in time so
//! later directory imports don't rewrite history. Uniqueness of the pair is
//! guaranteed by the storage layer, not by application locking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::employee::Employee;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
  pub id:            i64,
  pub meeting_id:    i64,
  /// The code the attendance row was recorded under. Free text for manual
  /// entries, so this intentionally carries no foreign key to the directory.
  pub emp_id:        String,
  pub name:          String,
  pub position:      Option<String>,
  pub unit:          Option<String>,
  pub cost_center:   Option<String>,
  pub registered_at: DateTime<Utc>,
  pub is_manual:     bool,
}

/// Input to [`crate::store::RegistryStore::insert_registration`].
/// `registered_at` is always set by the store; it is not accepted from
/// callers.
#[derive(Debug, Clone)]
pub struct NewRegistration {
  pub meeting_id:  i64,
  pub emp_id:      String,
  pub name:        String,
  pub position:    Option<String>,
  pub unit:        Option<String>,
  pub cost_center: Option<String>,
  pub is_manual:   bool,
}

impl NewRegistration {
  /// Attendance row for a directory hit — snapshots the employee record.
  pub fn for_employee(meeting_id: i64, employee: &Employee) -> Self {
    Self {
      meeting_id,
      emp_id:      employee.emp_id.clone(),
      name:        employee.name.clone(),
      position:    employee.position.clone(),
      unit:        employee.unit.clone(),
      cost_center: employee.cost_center.clone(),
      is_manual:   false,
    }
  }

  /// Attendance row typed in by the attendee after a directory miss.
  pub fn manual(
    meeting_id: i64,
    emp_id: String,
    name: String,
    position: Option<String>,
    unit: Option<String>,
    cost_center: Option<String>,
  ) -> Self {
    Self {
      meeting_id,
      emp_id,
      name,
      position,
      unit,
      cost_center,
      is_manual: true,
    }
  }
}

/// Result of an attendance insert.
///
/// A duplicate is a normal outcome, not an error: the uniqueness constraint
/// is expected to fire under concurrent submissions and the caller renders
/// it as "already registered".
#[derive(Debug, Clone)]
pub enum InsertOutcome {
  Inserted(Registration),
  /// The `(meeting, employee code)` pair already had a row.
  Duplicate,
}

/// Aggregates for the admin statistics endpoint.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistrationBreakdown {
  /// Attendance count per organizational unit, descending. `None` collects
  /// rows with no unit label (typically manual entries).
  pub by_unit:   Vec<(Option<String>, u64)>,
  pub directory: u64,
  pub manual:    u64,
}
