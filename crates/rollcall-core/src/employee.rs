//! Employee — a row in the imported company directory.
//!
//! Identity is the employee code assigned by the HR system. Attribute columns
//! are overwritten wholesale by periodic bulk imports; nothing else writes
//! them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum length for a submitted employee code. Shorter input is rejected
/// before any directory lookup happens.
pub const MIN_EMP_ID_LEN: usize = 6;

/// Canonical width of machine-issued employee codes. Shorter codes are
/// zero-padded to this width as a lookup fallback.
pub const EMP_ID_PAD_WIDTH: usize = 8;

/// A directory record, keyed by employee code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
  pub emp_id:      String,
  pub name:        String,
  pub position:    Option<String>,
  /// Short label of the organizational unit.
  pub unit:        Option<String>,
  pub cost_center: Option<String>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// Input to a directory bulk import. Timestamps are set by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
  pub emp_id:      String,
  pub name:        String,
  pub position:    Option<String>,
  pub unit:        Option<String>,
  pub cost_center: Option<String>,
}

/// Outcome counts of a directory bulk import.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ImportSummary {
  pub inserted: u64,
  pub updated:  u64,
}

/// The lookup forms tried against the directory, in order.
///
/// Badge scanners and keyboards disagree about leading zeros, so a submitted
/// code is tried as:
///
/// 1. the trimmed input, verbatim;
/// 2. the input with leading zeros stripped, if that form still has at least
///    [`MIN_EMP_ID_LEN`] characters;
/// 3. the input zero-padded to [`EMP_ID_PAD_WIDTH`], if it was shorter.
///
/// Duplicate forms are emitted once. The first form with a directory hit
/// wins.
pub fn lookup_candidates(raw: &str) -> Vec<String> {
  let trimmed = raw.trim();
  let mut candidates = vec![trimmed.to_owned()];

  let stripped = trimmed.trim_start_matches('0');
  if stripped.len() >= MIN_EMP_ID_LEN && stripped != trimmed {
    candidates.push(stripped.to_owned());
  }

  if trimmed.len() < EMP_ID_PAD_WIDTH {
    let width  = EMP_ID_PAD_WIDTH;
    let padded = format!("{trimmed:0>width$}");
    if !candidates.iter().any(|c| c == &padded) {
      candidates.push(padded);
    }
  }

  candidates
}
