//! The `RegistryStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `rollcall-store-sqlite`). Higher layers (`rollcall-api`,
//! `rollcall-server`) depend on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  employee::{Employee, ImportSummary, NewEmployee},
  meeting::{DeleteMeetingOutcome, Meeting, MeetingUpdate, NewMeeting},
  registration::{
    InsertOutcome, NewRegistration, Registration, RegistrationBreakdown,
  },
  user::{NewOtp, OtpOutcome, OtpPurpose, Session, User},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`RegistryStore::list_employees`].
#[derive(Debug, Clone, Default)]
pub struct DirectoryQuery {
  /// Free-text filter matched against code, name, position, unit, and cost
  /// center.
  pub search: Option<String>,
  pub limit:  Option<usize>,
  pub offset: Option<usize>,
}

// ─── Narrow seam for the resolver ────────────────────────────────────────────

/// The one read the active-meeting resolver needs, split out as the supertrait
/// of [`RegistryStore`] so the resolver can be exercised in tests with a
/// scripted stub instead of a full backend.
///
/// The `Error` associated type declared here is the error type for the whole
/// store; `RegistryStore` methods refer to it as `Self::Error`.
pub trait ActiveMeetingSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Uncached read of the meeting currently open for check-in: among
  /// `is_active` meetings, the most recently created. The resolver wraps
  /// this with its cache and retry policy.
  fn active_meeting(
    &self,
  ) -> impl Future<Output = Result<Option<Meeting>, Self::Error>> + Send + '_;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a rollcall storage backend.
///
/// The backend owns every timestamp and surrogate id. Duplicate attendance is
/// rejected by the backend's uniqueness constraint over
/// `(meeting_id, emp_id)` — implementations report that rejection as
/// [`InsertOutcome::Duplicate`], never as a second row and never as a fault.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RegistryStore: ActiveMeetingSource {
  // ── Directory ─────────────────────────────────────────────────────────

  /// Resolve a submitted identifier to a directory record, trying the
  /// [`crate::employee::lookup_candidates`] forms in order.
  fn find_employee<'a>(
    &'a self,
    raw_id: &'a str,
  ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send + 'a;

  /// Exact-match lookup by canonical code.
  fn get_employee<'a>(
    &'a self,
    emp_id: &'a str,
  ) -> impl Future<Output = Result<Option<Employee>, Self::Error>> + Send + 'a;

  /// Bulk import: insert new codes, overwrite attributes of existing ones.
  fn upsert_employees(
    &self,
    rows: Vec<NewEmployee>,
  ) -> impl Future<Output = Result<ImportSummary, Self::Error>> + Send + '_;

  fn list_employees<'a>(
    &'a self,
    query: &'a DirectoryQuery,
  ) -> impl Future<Output = Result<Vec<Employee>, Self::Error>> + Send + 'a;

  fn count_employees(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Meetings ──────────────────────────────────────────────────────────

  /// Create a meeting. When `input.is_active`, the new meeting atomically
  /// becomes the single active one.
  fn create_meeting(
    &self,
    input: NewMeeting,
  ) -> impl Future<Output = Result<Meeting, Self::Error>> + Send + '_;

  fn get_meeting(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Meeting>, Self::Error>> + Send + '_;

  /// All meetings, newest first.
  fn list_meetings(
    &self,
    limit: usize,
    offset: usize,
  ) -> impl Future<Output = Result<Vec<Meeting>, Self::Error>> + Send + '_;

  /// Meetings owned by one organizer, newest first.
  fn list_meetings_by_organizer(
    &self,
    organizer_id: i64,
  ) -> impl Future<Output = Result<Vec<Meeting>, Self::Error>> + Send + '_;

  /// Replace a meeting's editable fields. `None` if the meeting is gone.
  fn update_meeting(
    &self,
    id: i64,
    update: MeetingUpdate,
  ) -> impl Future<Output = Result<Option<Meeting>, Self::Error>> + Send + '_;

  /// Activate (making this the single active meeting, in one atomic
  /// statement) or deactivate a meeting. `None` if the meeting is gone.
  fn set_meeting_active(
    &self,
    id: i64,
    active: bool,
  ) -> impl Future<Output = Result<Option<Meeting>, Self::Error>> + Send + '_;

  /// Delete a meeting. Refused while attendance rows reference it.
  fn delete_meeting(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<DeleteMeetingOutcome, Self::Error>> + Send + '_;

  fn count_meetings(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Registrations ─────────────────────────────────────────────────────

  /// Insert one attendance row. A uniqueness-constraint rejection (the pair
  /// already exists, possibly from a concurrent submission) is reported as
  /// [`InsertOutcome::Duplicate`], never as an error.
  fn insert_registration(
    &self,
    input: NewRegistration,
  ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send + '_;

  /// Cheap pre-check used before the insert; the constraint remains the
  /// authority.
  fn is_registered<'a>(
    &'a self,
    meeting_id: i64,
    emp_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Attendance rows for a meeting, newest first.
  fn list_registrations(
    &self,
    meeting_id: i64,
  ) -> impl Future<Output = Result<Vec<Registration>, Self::Error>> + Send + '_;

  fn count_registrations(
    &self,
    meeting_id: i64,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Remove one attendance row; `false` if no row had the id.
  fn delete_registration(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Per-unit and manual-vs-directory aggregates for one meeting.
  fn registration_breakdown(
    &self,
    meeting_id: i64,
  ) -> impl Future<Output = Result<RegistrationBreakdown, Self::Error>> + Send + '_;

  // ── Organizer accounts ────────────────────────────────────────────────

  fn find_user_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Create an inactive account, or refresh the name of an existing inactive
  /// one. `None` when an active account already owns the email.
  fn upsert_pending_user<'a>(
    &'a self,
    email: &'a str,
    name: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Flip an account active after its first verified OTP. `None` if the
  /// account is gone.
  fn activate_user(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn record_login(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── OTP tokens ────────────────────────────────────────────────────────

  fn store_otp(
    &self,
    otp: NewOtp,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Check a submitted code hash against the latest pending token for
  /// `(email, purpose)`: expiry and the attempt cap are enforced here, a
  /// mismatch burns an attempt, and a match consumes the token.
  fn consume_otp<'a>(
    &'a self,
    email: &'a str,
    code_hash: &'a str,
    purpose: OtpPurpose,
    max_attempts: u32,
  ) -> impl Future<Output = Result<OtpOutcome, Self::Error>> + Send + 'a;

  // ── Sessions ──────────────────────────────────────────────────────────

  fn create_session(
    &self,
    user_id: i64,
    token: Uuid,
    expires_at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Session, Self::Error>> + Send + '_;

  /// Resolve a bearer token to its user, if the session is unexpired and the
  /// account active.
  fn session_user(
    &self,
    token: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn delete_session(
    &self,
    token: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
