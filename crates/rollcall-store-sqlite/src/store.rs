//! [`SqliteStore`] — the SQLite implementation of [`RegistryStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use rollcall_core::{
  employee::{lookup_candidates, Employee, ImportSummary, NewEmployee},
  meeting::{DeleteMeetingOutcome, Meeting, MeetingUpdate, NewMeeting},
  registration::{
    InsertOutcome, NewRegistration, Registration, RegistrationBreakdown,
  },
  store::{ActiveMeetingSource, DirectoryQuery, RegistryStore},
  user::{NewOtp, OtpOutcome, OtpPurpose, Session, User},
};

use crate::{
  encode::{
    decode_dt, encode_date, encode_dt, encode_purpose, encode_time,
    encode_uuid, RawEmployee, RawMeeting, RawRegistration, RawUser,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Row readers ─────────────────────────────────────────────────────────────

const MEETING_COLUMNS: &str = "id, topic, meeting_date, start_time, end_time, \
   room, floor, building, organizer_id, is_active, created_at, updated_at";

const REGISTRATION_COLUMNS: &str = "id, meeting_id, emp_id, name, position, \
   unit, cost_center, registered_at, is_manual";

fn employee_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEmployee> {
  Ok(RawEmployee {
    emp_id:      row.get(0)?,
    name:        row.get(1)?,
    position:    row.get(2)?,
    unit:        row.get(3)?,
    cost_center: row.get(4)?,
    created_at:  row.get(5)?,
    updated_at:  row.get(6)?,
  })
}

fn meeting_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawMeeting> {
  Ok(RawMeeting {
    id:           row.get(0)?,
    topic:        row.get(1)?,
    meeting_date: row.get(2)?,
    start_time:   row.get(3)?,
    end_time:     row.get(4)?,
    room:         row.get(5)?,
    floor:        row.get(6)?,
    building:     row.get(7)?,
    organizer_id: row.get(8)?,
    is_active:    row.get(9)?,
    created_at:   row.get(10)?,
    updated_at:   row.get(11)?,
  })
}

fn registration_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRegistration> {
  Ok(RawRegistration {
    id:            row.get(0)?,
    meeting_id:    row.get(1)?,
    emp_id:        row.get(2)?,
    name:          row.get(3)?,
    position:      row.get(4)?,
    unit:          row.get(5)?,
    cost_center:   row.get(6)?,
    registered_at: row.get(7)?,
    is_manual:     row.get(8)?,
  })
}

fn user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawUser> {
  Ok(RawUser {
    id:         row.get(0)?,
    email:      row.get(1)?,
    name:       row.get(2)?,
    is_active:  row.get(3)?,
    created_at: row.get(4)?,
    last_login: row.get(5)?,
  })
}

/// `true` for the UNIQUE-constraint rejection specifically, so a foreign-key
/// failure is never misread as a duplicate.
fn is_unique_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A rollcall registry backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn get_meeting_raw(&self, id: i64) -> Result<Option<RawMeeting>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {MEETING_COLUMNS} FROM meetings WHERE id = ?1"),
              rusqlite::params![id],
              meeting_row,
            )
            .optional()?,
        )
      })
      .await?;
    Ok(raw)
  }
}

// ─── ActiveMeetingSource impl ────────────────────────────────────────────────

impl ActiveMeetingSource for SqliteStore {
  type Error = Error;

  async fn active_meeting(&self) -> Result<Option<Meeting>> {
    let raw: Option<RawMeeting> = self
      .conn
      .call(|conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {MEETING_COLUMNS} FROM meetings
                 WHERE is_active = 1
                 ORDER BY created_at DESC, id DESC
                 LIMIT 1"
              ),
              [],
              meeting_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawMeeting::into_meeting).transpose()
  }
}

// ─── RegistryStore impl ──────────────────────────────────────────────────────

impl RegistryStore for SqliteStore {
  // ── Directory ─────────────────────────────────────────────────────────────

  async fn find_employee(&self, raw_id: &str) -> Result<Option<Employee>> {
    for candidate in lookup_candidates(raw_id) {
      if let Some(employee) = self.get_employee(&candidate).await? {
        return Ok(Some(employee));
      }
    }
    Ok(None)
  }

  async fn get_employee(&self, emp_id: &str) -> Result<Option<Employee>> {
    let emp_id = emp_id.to_owned();

    let raw: Option<RawEmployee> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT emp_id, name, position, unit, cost_center, created_at, updated_at
               FROM employees WHERE emp_id = ?1",
              rusqlite::params![emp_id],
              employee_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEmployee::into_employee).transpose()
  }

  async fn upsert_employees(&self, rows: Vec<NewEmployee>) -> Result<ImportSummary> {
    let now_str = encode_dt(Utc::now());

    let summary = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut summary = ImportSummary::default();

        for row in &rows {
          let exists: bool = tx
            .query_row(
              "SELECT 1 FROM employees WHERE emp_id = ?1",
              rusqlite::params![row.emp_id],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);

          if exists {
            tx.execute(
              "UPDATE employees
               SET name = ?2, position = ?3, unit = ?4, cost_center = ?5,
                   updated_at = ?6
               WHERE emp_id = ?1",
              rusqlite::params![
                row.emp_id,
                row.name,
                row.position,
                row.unit,
                row.cost_center,
                now_str,
              ],
            )?;
            summary.updated += 1;
          } else {
            tx.execute(
              "INSERT INTO employees
                 (emp_id, name, position, unit, cost_center, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
              rusqlite::params![
                row.emp_id,
                row.name,
                row.position,
                row.unit,
                row.cost_center,
                now_str,
              ],
            )?;
            summary.inserted += 1;
          }
        }

        tx.commit()?;
        Ok(summary)
      })
      .await?;

    Ok(summary)
  }

  async fn list_employees(&self, query: &DirectoryQuery) -> Result<Vec<Employee>> {
    let pattern    = query.search.as_deref().map(|s| format!("%{s}%"));
    let limit_val  = query.limit.unwrap_or(100) as i64;
    let offset_val = query.offset.unwrap_or(0) as i64;

    let raws: Vec<RawEmployee> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(p) = pattern {
          let mut stmt = conn.prepare(
            "SELECT emp_id, name, position, unit, cost_center, created_at, updated_at
             FROM employees
             WHERE emp_id LIKE ?1 OR name LIKE ?1 OR position LIKE ?1
                OR unit LIKE ?1 OR cost_center LIKE ?1
             ORDER BY emp_id
             LIMIT ?2 OFFSET ?3",
          )?;
          stmt
            .query_map(rusqlite::params![p, limit_val, offset_val], employee_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(
            "SELECT emp_id, name, position, unit, cost_center, created_at, updated_at
             FROM employees
             ORDER BY emp_id
             LIMIT ?1 OFFSET ?2",
          )?;
          stmt
            .query_map(rusqlite::params![limit_val, offset_val], employee_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEmployee::into_employee).collect()
  }

  async fn count_employees(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM employees", [], |r| r.get(0))?)
      })
      .await?;
    Ok(count as u64)
  }

  // ── Meetings ──────────────────────────────────────────────────────────────

  async fn create_meeting(&self, input: NewMeeting) -> Result<Meeting> {
    let now_str  = encode_dt(Utc::now());
    let date_str = encode_date(input.meeting_date);
    let start    = encode_time(input.start_time);
    let end      = encode_time(input.end_time);

    let raw: RawMeeting = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        tx.execute(
          "INSERT INTO meetings
             (topic, meeting_date, start_time, end_time, room, floor, building,
              organizer_id, is_active, created_at, updated_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?9)",
          rusqlite::params![
            input.topic,
            date_str,
            start,
            end,
            input.room,
            input.floor,
            input.building,
            input.organizer_id,
            now_str,
          ],
        )?;
        let id = tx.last_insert_rowid();

        if input.is_active {
          // Single atomic statement: the new meeting becomes the one active
          // row, every other row is deactivated in the same write.
          tx.execute(
            "UPDATE meetings SET is_active = (id = ?1)",
            rusqlite::params![id],
          )?;
        }

        let raw = tx.query_row(
          &format!("SELECT {MEETING_COLUMNS} FROM meetings WHERE id = ?1"),
          rusqlite::params![id],
          meeting_row,
        )?;

        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.into_meeting()
  }

  async fn get_meeting(&self, id: i64) -> Result<Option<Meeting>> {
    self
      .get_meeting_raw(id)
      .await?
      .map(RawMeeting::into_meeting)
      .transpose()
  }

  async fn list_meetings(&self, limit: usize, offset: usize) -> Result<Vec<Meeting>> {
    let limit_val  = limit as i64;
    let offset_val = offset as i64;

    let raws: Vec<RawMeeting> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MEETING_COLUMNS} FROM meetings
           ORDER BY created_at DESC, id DESC
           LIMIT ?1 OFFSET ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val, offset_val], meeting_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMeeting::into_meeting).collect()
  }

  async fn list_meetings_by_organizer(&self, organizer_id: i64) -> Result<Vec<Meeting>> {
    let raws: Vec<RawMeeting> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MEETING_COLUMNS} FROM meetings
           WHERE organizer_id = ?1
           ORDER BY created_at DESC, id DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![organizer_id], meeting_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMeeting::into_meeting).collect()
  }

  async fn update_meeting(
    &self,
    id: i64,
    update: MeetingUpdate,
  ) -> Result<Option<Meeting>> {
    let now_str  = encode_dt(Utc::now());
    let date_str = encode_date(update.meeting_date);
    let start    = encode_time(update.start_time);
    let end      = encode_time(update.end_time);

    let raw: Option<RawMeeting> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let changed = tx.execute(
          "UPDATE meetings
           SET topic = ?2, meeting_date = ?3, start_time = ?4, end_time = ?5,
               room = ?6, floor = ?7, building = ?8, updated_at = ?9
           WHERE id = ?1",
          rusqlite::params![
            id,
            update.topic,
            date_str,
            start,
            end,
            update.room,
            update.floor,
            update.building,
            now_str,
          ],
        )?;

        if changed == 0 {
          return Ok(None);
        }

        let raw = tx.query_row(
          &format!("SELECT {MEETING_COLUMNS} FROM meetings WHERE id = ?1"),
          rusqlite::params![id],
          meeting_row,
        )?;

        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawMeeting::into_meeting).transpose()
  }

  async fn set_meeting_active(
    &self,
    id: i64,
    active: bool,
  ) -> Result<Option<Meeting>> {
    let now_str = encode_dt(Utc::now());

    let raw: Option<RawMeeting> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let exists: bool = tx
          .query_row(
            "SELECT 1 FROM meetings WHERE id = ?1",
            rusqlite::params![id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if !exists {
          return Ok(None);
        }

        if active {
          // One statement flips the whole table: target on, everything else
          // off. There is no window in which two rows are active.
          tx.execute(
            "UPDATE meetings SET is_active = (id = ?1)",
            rusqlite::params![id],
          )?;
          tx.execute(
            "UPDATE meetings SET updated_at = ?2 WHERE id = ?1",
            rusqlite::params![id, now_str],
          )?;
        } else {
          tx.execute(
            "UPDATE meetings SET is_active = 0, updated_at = ?2 WHERE id = ?1",
            rusqlite::params![id, now_str],
          )?;
        }

        let raw = tx.query_row(
          &format!("SELECT {MEETING_COLUMNS} FROM meetings WHERE id = ?1"),
          rusqlite::params![id],
          meeting_row,
        )?;

        tx.commit()?;
        Ok(Some(raw))
      })
      .await?;

    raw.map(RawMeeting::into_meeting).transpose()
  }

  async fn delete_meeting(&self, id: i64) -> Result<DeleteMeetingOutcome> {
    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let count: i64 = tx.query_row(
          "SELECT COUNT(*) FROM registrations WHERE meeting_id = ?1",
          rusqlite::params![id],
          |r| r.get(0),
        )?;
        if count > 0 {
          return Ok(DeleteMeetingOutcome::HasRegistrations(count as u64));
        }

        let changed =
          tx.execute("DELETE FROM meetings WHERE id = ?1", rusqlite::params![id])?;
        if changed == 0 {
          return Ok(DeleteMeetingOutcome::NotFound);
        }

        tx.commit()?;
        Ok(DeleteMeetingOutcome::Deleted)
      })
      .await?;

    Ok(outcome)
  }

  async fn count_meetings(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM meetings", [], |r| r.get(0))?)
      })
      .await?;
    Ok(count as u64)
  }

  // ── Registrations ─────────────────────────────────────────────────────────

  async fn insert_registration(&self, input: NewRegistration) -> Result<InsertOutcome> {
    let registered_at = Utc::now();
    let at_str        = encode_dt(registered_at);
    let row           = input.clone();

    let inserted: Option<i64> = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO registrations
             (meeting_id, emp_id, name, position, unit, cost_center,
              registered_at, is_manual)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            input.meeting_id,
            input.emp_id,
            input.name,
            input.position,
            input.unit,
            input.cost_center,
            at_str,
            input.is_manual,
          ],
        );

        match result {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          // A concurrent duplicate slipped past the pre-check; the
          // constraint is the authority and this is a normal outcome.
          Err(e) if is_unique_violation(&e) => Ok(None),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    let Some(id) = inserted else {
      return Ok(InsertOutcome::Duplicate);
    };

    Ok(InsertOutcome::Inserted(Registration {
      id,
      meeting_id: row.meeting_id,
      emp_id: row.emp_id,
      name: row.name,
      position: row.position,
      unit: row.unit,
      cost_center: row.cost_center,
      registered_at,
      is_manual: row.is_manual,
    }))
  }

  async fn is_registered(&self, meeting_id: i64, emp_id: &str) -> Result<bool> {
    let emp_id = emp_id.to_owned();

    let registered: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM registrations WHERE meeting_id = ?1 AND emp_id = ?2",
              rusqlite::params![meeting_id, emp_id],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(registered)
  }

  async fn list_registrations(&self, meeting_id: i64) -> Result<Vec<Registration>> {
    let raws: Vec<RawRegistration> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REGISTRATION_COLUMNS} FROM registrations
           WHERE meeting_id = ?1
           ORDER BY registered_at DESC, id DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![meeting_id], registration_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawRegistration::into_registration)
      .collect()
  }

  async fn count_registrations(&self, meeting_id: i64) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM registrations WHERE meeting_id = ?1",
          rusqlite::params![meeting_id],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(count as u64)
  }

  async fn delete_registration(&self, id: i64) -> Result<bool> {
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM registrations WHERE id = ?1",
          rusqlite::params![id],
        )?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn registration_breakdown(&self, meeting_id: i64) -> Result<RegistrationBreakdown> {
    let breakdown = self
      .conn
      .call(move |conn| {
        let mut by_unit_stmt = conn.prepare(
          "SELECT unit, COUNT(*) FROM registrations
           WHERE meeting_id = ?1
           GROUP BY unit
           ORDER BY COUNT(*) DESC, unit",
        )?;
        let by_unit = by_unit_stmt
          .query_map(rusqlite::params![meeting_id], |row| {
            Ok((row.get::<_, Option<String>>(0)?, row.get::<_, i64>(1)? as u64))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut source_stmt = conn.prepare(
          "SELECT is_manual, COUNT(*) FROM registrations
           WHERE meeting_id = ?1
           GROUP BY is_manual",
        )?;
        let mut breakdown = RegistrationBreakdown { by_unit, ..Default::default() };
        for row in source_stmt.query_map(rusqlite::params![meeting_id], |row| {
          Ok((row.get::<_, bool>(0)?, row.get::<_, i64>(1)? as u64))
        })? {
          let (is_manual, count) = row?;
          if is_manual {
            breakdown.manual = count;
          } else {
            breakdown.directory = count;
          }
        }

        Ok(breakdown)
      })
      .await?;

    Ok(breakdown)
  }

  // ── Organizer accounts ────────────────────────────────────────────────────

  async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
    let email = email.to_owned();

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, email, name, is_active, created_at, last_login
               FROM users WHERE email = ?1",
              rusqlite::params![email],
              user_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn upsert_pending_user(&self, email: &str, name: &str) -> Result<Option<User>> {
    let email   = email.to_owned();
    let name    = name.to_owned();
    let now_str = encode_dt(Utc::now());

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let existing: Option<RawUser> = tx
          .query_row(
            "SELECT id, email, name, is_active, created_at, last_login
             FROM users WHERE email = ?1",
            rusqlite::params![email],
            user_row,
          )
          .optional()?;

        let raw = match existing {
          // An active account owns the email; signup is refused.
          Some(user) if user.is_active => None,
          Some(user) => {
            tx.execute(
              "UPDATE users SET name = ?2 WHERE id = ?1",
              rusqlite::params![user.id, name],
            )?;
            Some(RawUser { name, ..user })
          }
          None => {
            tx.execute(
              "INSERT INTO users (email, name, is_active, created_at)
               VALUES (?1, ?2, 0, ?3)",
              rusqlite::params![email, name, now_str],
            )?;
            Some(RawUser {
              id:         tx.last_insert_rowid(),
              email,
              name,
              is_active:  false,
              created_at: now_str,
              last_login: None,
            })
          }
        };

        tx.commit()?;
        Ok(raw)
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn activate_user(&self, id: i64) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE users SET is_active = 1 WHERE id = ?1",
          rusqlite::params![id],
        )?;
        if changed == 0 {
          return Ok(None);
        }
        Ok(
          conn
            .query_row(
              "SELECT id, email, name, is_active, created_at, last_login
               FROM users WHERE id = ?1",
              rusqlite::params![id],
              user_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn record_login(&self, id: i64) -> Result<()> {
    let now_str = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE users SET last_login = ?2 WHERE id = ?1",
          rusqlite::params![id, now_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  // ── OTP tokens ────────────────────────────────────────────────────────────

  async fn store_otp(&self, otp: NewOtp) -> Result<()> {
    let now_str     = encode_dt(Utc::now());
    let expires_str = encode_dt(otp.expires_at);
    let purpose     = encode_purpose(otp.purpose).to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO otp_tokens (email, code_hash, purpose, expires_at, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![otp.email, otp.code_hash, purpose, expires_str, now_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn consume_otp(
    &self,
    email: &str,
    code_hash: &str,
    purpose: OtpPurpose,
    max_attempts: u32,
  ) -> Result<OtpOutcome> {
    let email_owned = email.to_owned();
    let purpose_str = encode_purpose(purpose).to_owned();

    let pending: Option<(i64, String, String, i64)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, code_hash, expires_at, attempts FROM otp_tokens
               WHERE email = ?1 AND purpose = ?2 AND consumed = 0
               ORDER BY created_at DESC, id DESC
               LIMIT 1",
              rusqlite::params![email_owned, purpose_str],
              |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )
            .optional()?,
        )
      })
      .await?;

    let Some((id, stored_hash, expires_str, attempts)) = pending else {
      return Ok(OtpOutcome::NonePending);
    };

    if Utc::now() > decode_dt(&expires_str)? {
      return Ok(OtpOutcome::Expired);
    }
    if attempts >= i64::from(max_attempts) {
      return Ok(OtpOutcome::AttemptsExceeded);
    }

    if stored_hash != code_hash {
      self
        .conn
        .call(move |conn| {
          conn.execute(
            "UPDATE otp_tokens SET attempts = attempts + 1 WHERE id = ?1",
            rusqlite::params![id],
          )?;
          Ok(())
        })
        .await?;
      return Ok(OtpOutcome::Incorrect);
    }

    // Conditional consume so a raced duplicate verify can't accept twice.
    let consumed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE otp_tokens SET consumed = 1 WHERE id = ?1 AND consumed = 0",
          rusqlite::params![id],
        )?)
      })
      .await?;

    if consumed == 1 {
      Ok(OtpOutcome::Accepted)
    } else {
      Ok(OtpOutcome::NonePending)
    }
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(
    &self,
    user_id: i64,
    token: Uuid,
    expires_at: DateTime<Utc>,
  ) -> Result<Session> {
    let created_at  = Utc::now();
    let token_str   = encode_uuid(token);
    let created_str = encode_dt(created_at);
    let expires_str = encode_dt(expires_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token, user_id, created_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![token_str, user_id, created_str, expires_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(Session { token, user_id, created_at, expires_at })
  }

  async fn session_user(&self, token: Uuid) -> Result<Option<User>> {
    let token_str = encode_uuid(token);

    let found: Option<(String, RawUser)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT s.expires_at,
                      u.id, u.email, u.name, u.is_active, u.created_at, u.last_login
               FROM sessions s
               JOIN users u ON u.id = s.user_id
               WHERE s.token = ?1 AND u.is_active = 1",
              rusqlite::params![token_str],
              |row| {
                Ok((
                  row.get(0)?,
                  RawUser {
                    id:         row.get(1)?,
                    email:      row.get(2)?,
                    name:       row.get(3)?,
                    is_active:  row.get(4)?,
                    created_at: row.get(5)?,
                    last_login: row.get(6)?,
                  },
                ))
              },
            )
            .optional()?,
        )
      })
      .await?;

    let Some((expires_str, raw)) = found else {
      return Ok(None);
    };

    if Utc::now() > decode_dt(&expires_str)? {
      return Ok(None);
    }

    Ok(Some(raw.into_user()?))
  }

  async fn delete_session(&self, token: Uuid) -> Result<()> {
    let token_str = encode_uuid(token);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM sessions WHERE token = ?1",
          rusqlite::params![token_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
