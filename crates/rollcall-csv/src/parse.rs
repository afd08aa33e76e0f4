//! Employee-directory CSV parser for bulk imports.
//!
//! The header row names the columns; order is free. `emp_id` and `name` are
//! required, the attribute columns optional. Empty attribute cells become
//! `None`.

use rollcall_core::employee::NewEmployee;

use crate::error::{Error, Result};

// ─── Line-level parsing ───────────────────────────────────────────────────────

/// Split one CSV record into fields, honouring RFC 4180 quoting.
fn split_record(line: &str, number: usize) -> Result<Vec<String>> {
  let mut fields    = Vec::new();
  let mut field     = String::new();
  let mut chars     = line.chars().peekable();
  let mut in_quotes = false;

  while let Some(c) = chars.next() {
    match c {
      '"' if in_quotes => {
        // Either an escaped quote or the closing one.
        if chars.peek() == Some(&'"') {
          chars.next();
          field.push('"');
        } else {
          in_quotes = false;
        }
      }
      '"' if field.is_empty() => in_quotes = true,
      '"' => {
        return Err(Error::Line {
          number,
          reason: "quote inside unquoted field".to_owned(),
        });
      }
      ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
      c => field.push(c),
    }
  }

  if in_quotes {
    return Err(Error::Line {
      number,
      reason: "unterminated quoted field".to_owned(),
    });
  }

  fields.push(field);
  Ok(fields)
}

// ─── Header mapping ───────────────────────────────────────────────────────────

struct Columns {
  emp_id:      usize,
  name:        usize,
  position:    Option<usize>,
  unit:        Option<usize>,
  cost_center: Option<usize>,
}

impl Columns {
  fn from_header(header: &[String]) -> Result<Self> {
    let find = |wanted: &str| {
      header
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(wanted))
    };

    Ok(Self {
      emp_id:      find("emp_id").ok_or(Error::MissingColumn("emp_id"))?,
      name:        find("name").ok_or(Error::MissingColumn("name"))?,
      position:    find("position"),
      unit:        find("unit"),
      cost_center: find("cost_center"),
    })
  }
}

fn optional(fields: &[String], idx: Option<usize>) -> Option<String> {
  let value = fields.get(idx?)?.trim();
  if value.is_empty() {
    None
  } else {
    Some(value.to_owned())
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

/// Parse a directory import. Blank lines are skipped; a leading UTF-8 BOM is
/// tolerated since exports carry one.
pub fn parse_employees(input: &str) -> Result<Vec<NewEmployee>> {
  let input = input.strip_prefix('\u{feff}').unwrap_or(input);

  let mut lines = input
    .lines()
    .enumerate()
    .map(|(i, l)| (i + 1, l.trim_end_matches('\r')))
    .filter(|(_, l)| !l.trim().is_empty());

  let Some((header_no, header_line)) = lines.next() else {
    return Err(Error::MissingHeader);
  };
  let columns = Columns::from_header(&split_record(header_line, header_no)?)?;

  let mut rows = Vec::new();
  for (number, line) in lines {
    let fields = split_record(line, number)?;

    let emp_id = fields
      .get(columns.emp_id)
      .map(|f| f.trim())
      .filter(|f| !f.is_empty())
      .ok_or_else(|| Error::Line {
        number,
        reason: "empty emp_id".to_owned(),
      })?;
    let name = fields
      .get(columns.name)
      .map(|f| f.trim())
      .filter(|f| !f.is_empty())
      .ok_or_else(|| Error::Line {
        number,
        reason: "empty name".to_owned(),
      })?;

    rows.push(NewEmployee {
      emp_id:      emp_id.to_owned(),
      name:        name.to_owned(),
      position:    optional(&fields, columns.position),
      unit:        optional(&fields, columns.unit),
      cost_center: optional(&fields, columns.cost_center),
    });
  }

  Ok(rows)
}
