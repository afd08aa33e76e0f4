//! rollcall server — wiring for the check-in API, admin, and organizer
//! surfaces.
//!
//! Exposes an axum [`Router`] backed by any [`RegistryStore`] plus the shared
//! [`AppState`] and [`ServerConfig`]. The binary in `main.rs` loads the
//! config, opens the SQLite store, spawns the notification worker, and
//! serves.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod notifier;

pub use error::Error;

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::Router;
use serde::Deserialize;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

use rollcall_api::{ActiveMeetingResolver, CheckinState, ResolverConfig};
use rollcall_core::{notify::NotificationJob, store::RegistryStore};

use auth::AdminAuth;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` layered with
/// `ROLLCALL_`-prefixed environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:                  String,
  pub port:                  u16,
  pub store_path:            PathBuf,
  pub admin_username:        String,
  /// argon2 PHC string; generate with `rollcall-server --hash-password`.
  pub admin_password_hash:   String,
  /// Gateway that receives notification jobs as JSON POSTs. Unset means
  /// notifications are dropped after dequeue.
  #[serde(default)]
  pub webhook_url:           Option<String>,
  /// Organizer signup allowlist; empty admits every domain.
  #[serde(default)]
  pub allowed_email_domains: Vec<String>,
  #[serde(default = "default_cache_ttl_secs")]
  pub cache_ttl_secs:        u64,
  #[serde(default = "default_lookup_attempts")]
  pub lookup_attempts:       u32,
  #[serde(default = "default_retry_delay_ms")]
  pub retry_delay_ms:        u64,
  #[serde(default = "default_otp_validity_minutes")]
  pub otp_validity_minutes:  i64,
  #[serde(default = "default_otp_max_attempts")]
  pub otp_max_attempts:      u32,
  #[serde(default = "default_session_hours")]
  pub session_hours:         i64,
}

fn default_cache_ttl_secs() -> u64 { 60 }
fn default_lookup_attempts() -> u32 { 3 }
fn default_retry_delay_ms() -> u64 { 1000 }
fn default_otp_validity_minutes() -> i64 { 10 }
fn default_otp_max_attempts() -> u32 { 3 }
fn default_session_hours() -> i64 { 12 }

impl ServerConfig {
  pub fn resolver_config(&self) -> ResolverConfig {
    ResolverConfig {
      cache_ttl:    Duration::from_secs(self.cache_ttl_secs),
      max_attempts: self.lookup_attempts,
      retry_delay:  Duration::from_millis(self.retry_delay_ms),
    }
  }

  pub fn otp_validity(&self) -> chrono::Duration {
    chrono::Duration::minutes(self.otp_validity_minutes)
  }

  pub fn session_duration(&self) -> chrono::Duration {
    chrono::Duration::hours(self.session_hours)
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: RegistryStore> {
  pub store:         Arc<S>,
  pub config:        Arc<ServerConfig>,
  pub auth:          Arc<AdminAuth>,
  pub resolver:      Arc<ActiveMeetingResolver<S>>,
  pub notifications: mpsc::Sender<NotificationJob>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router: anonymous check-in endpoints plus the
/// authenticated auth, admin, and organizer surfaces.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let checkin_state = CheckinState {
    store:         state.store.clone(),
    resolver:      state.resolver.clone(),
    notifications: state.notifications.clone(),
  };

  Router::new()
    .merge(rollcall_api::checkin_router(checkin_state))
    .merge(handlers::auth::router(state.clone()))
    .merge(handlers::admin::router(state.clone()))
    .merge(handlers::organizer::router(state))
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use chrono::{NaiveDate, NaiveTime};
  use rand_core::OsRng;
  use tower::ServiceExt as _;

  use rollcall_core::{
    employee::NewEmployee,
    meeting::NewMeeting,
    store::RegistryStore as _,
  };
  use rollcall_store_sqlite::SqliteStore;

  async fn make_state() -> (AppState<SqliteStore>, mpsc::Receiver<NotificationJob>) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let salt  = SaltString::generate(&mut OsRng);
    let hash  = Argon2::default()
      .hash_password(b"secret", &salt)
      .unwrap()
      .to_string();

    let config = ServerConfig {
      host:                  "127.0.0.1".to_string(),
      port:                  9000,
      store_path:            PathBuf::from(":memory:"),
      admin_username:        "admin".to_string(),
      admin_password_hash:   hash.clone(),
      webhook_url:           None,
      allowed_email_domains: Vec::new(),
      cache_ttl_secs:        60,
      lookup_attempts:       3,
      retry_delay_ms:        1,
      otp_validity_minutes:  10,
      otp_max_attempts:      3,
      session_hours:         12,
    };

    let store    = Arc::new(store);
    let resolver = Arc::new(ActiveMeetingResolver::new(
      store.clone(),
      config.resolver_config(),
    ));
    let (tx, rx) = mpsc::channel(8);

    let state = AppState {
      store,
      config: Arc::new(config),
      auth: Arc::new(AdminAuth {
        username:      "admin".to_string(),
        password_hash: hash,
      }),
      resolver,
      notifications: tx,
    };

    (state, rx)
  }

  fn admin_header() -> String {
    format!("Basic {}", B64.encode("admin:secret"))
  }

  async fn seed_employee(state: &AppState<SqliteStore>, emp_id: &str, name: &str) {
    state
      .store
      .upsert_employees(vec![NewEmployee {
        emp_id:      emp_id.to_owned(),
        name:        name.to_owned(),
        position:    Some("Analyst".to_owned()),
        unit:        Some("FIN".to_owned()),
        cost_center: Some("CC-100".to_owned()),
      }])
      .await
      .unwrap();
  }

  async fn seed_meeting(state: &AppState<SqliteStore>, topic: &str, active: bool) -> i64 {
    let meeting = state
      .store
      .create_meeting(NewMeeting {
        topic:        topic.to_owned(),
        meeting_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        start_time:   NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        end_time:     NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        room:         Some("Auditorium".to_owned()),
        floor:        None,
        building:     None,
        organizer_id: None,
        is_active:    active,
      })
      .await
      .unwrap();
    state.resolver.invalidate().await;
    meeting.id
  }

  async fn oneshot_raw(
    state:   AppState<SqliteStore>,
    method:  &str,
    uri:     &str,
    headers: Vec<(header::HeaderName, &str)>,
    body:    &str,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let req = builder.body(Body::from(body.to_string())).unwrap();
    router(state).oneshot(req).await.unwrap()
  }

  async fn post_form(
    state: AppState<SqliteStore>,
    uri:   &str,
    body:  &str,
  ) -> axum::response::Response {
    oneshot_raw(
      state,
      "POST",
      uri,
      vec![(
        header::CONTENT_TYPE,
        "application/x-www-form-urlencoded",
      )],
      body,
    )
    .await
  }

  async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  // ── Check-in flow ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn checkin_without_meeting_reports_no_meeting_open() {
    let (state, _rx) = make_state().await;
    let resp = post_form(state, "/checkin", "emp_id=00123456").await;

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await["outcome"], "no_meeting_open");
  }

  #[tokio::test]
  async fn checkin_registers_directory_employee() {
    let (state, mut rx) = make_state().await;
    seed_employee(&state, "00123456", "Alice Liddell").await;
    let meeting_id = seed_meeting(&state, "Town hall", true).await;

    let resp = post_form(state.clone(), "/checkin", "emp_id=00123456").await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let json = body_json(resp).await;
    assert_eq!(json["outcome"], "registered");
    assert_eq!(json["registration"]["emp_id"], "00123456");
    assert_eq!(json["registration"]["name"], "Alice Liddell");

    assert!(state.store.is_registered(meeting_id, "00123456").await.unwrap());

    // The side effect rode the queue.
    let job = rx.try_recv().expect("notification enqueued");
    assert_eq!(job.kind(), "registration");
  }

  #[tokio::test]
  async fn checkin_accepts_unpadded_identifier() {
    let (state, _rx) = make_state().await;
    seed_employee(&state, "00123456", "Alice").await;
    seed_meeting(&state, "Town hall", true).await;

    // Keypad entry without the canonical leading zeros.
    let resp = post_form(state, "/checkin", "emp_id=123456").await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let json = body_json(resp).await;
    assert_eq!(json["registration"]["emp_id"], "00123456");
  }

  #[tokio::test]
  async fn duplicate_checkin_reports_already_registered() {
    let (state, _rx) = make_state().await;
    seed_employee(&state, "00123456", "Alice").await;
    let meeting_id = seed_meeting(&state, "Town hall", true).await;

    let first = post_form(state.clone(), "/checkin", "emp_id=00123456").await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = post_form(state.clone(), "/checkin", "emp_id=00123456").await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(body_json(second).await["outcome"], "already_registered");

    assert_eq!(state.store.count_registrations(meeting_id).await.unwrap(), 1);
  }

  #[tokio::test]
  async fn short_identifier_is_rejected() {
    let (state, _rx) = make_state().await;
    seed_meeting(&state, "Town hall", true).await;

    let resp = post_form(state, "/checkin", "emp_id=123").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["outcome"], "invalid_employee_id");
  }

  #[tokio::test]
  async fn unknown_identifier_offers_manual_entry() {
    let (state, _rx) = make_state().await;
    seed_meeting(&state, "Town hall", true).await;

    let resp = post_form(state, "/checkin", "emp_id=99999999").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["outcome"], "employee_not_found");
    assert_eq!(json["emp_id"], "99999999");
  }

  #[tokio::test]
  async fn manual_checkin_requires_a_name() {
    let (state, _rx) = make_state().await;
    seed_meeting(&state, "Town hall", true).await;

    let resp = post_form(
      state,
      "/checkin/manual",
      "emp_id=X-GUEST-99&name=",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["outcome"], "missing_name");
  }

  #[tokio::test]
  async fn manual_checkin_creates_flagged_row() {
    let (state, _rx) = make_state().await;
    let meeting_id = seed_meeting(&state, "Town hall", true).await;

    let resp = post_form(
      state.clone(),
      "/checkin/manual",
      "emp_id=X-GUEST-99&name=Walk%20In&unit=OPS",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let rows = state.store.list_registrations(meeting_id).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_manual);
    assert_eq!(rows[0].name, "Walk In");
    assert_eq!(rows[0].unit.as_deref(), Some("OPS"));
  }

  #[tokio::test]
  async fn meeting_endpoint_serves_the_active_meeting() {
    let (state, _rx) = make_state().await;

    let empty = oneshot_raw(state.clone(), "GET", "/meeting", vec![], "").await;
    assert_eq!(empty.status(), StatusCode::CONFLICT);

    seed_meeting(&state, "Town hall", true).await;
    let resp = oneshot_raw(state, "GET", "/meeting", vec![], "").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["topic"], "Town hall");
  }

  #[tokio::test]
  async fn employee_check_and_status_endpoints() {
    let (state, _rx) = make_state().await;
    seed_employee(&state, "00123456", "Alice").await;
    let meeting_id = seed_meeting(&state, "Town hall", true).await;

    let check = oneshot_raw(state.clone(), "GET", "/employees/123456", vec![], "").await;
    let json  = body_json(check).await;
    assert_eq!(json["exists"], true);
    assert_eq!(json["employee"]["emp_id"], "00123456");

    let uri  = format!("/status/{meeting_id}/00123456");
    let none = oneshot_raw(state.clone(), "GET", &uri, vec![], "").await;
    assert_eq!(body_json(none).await["registered"], false);

    post_form(state.clone(), "/checkin", "emp_id=00123456").await;
    let yes = oneshot_raw(state, "GET", &uri, vec![], "").await;
    assert_eq!(body_json(yes).await["registered"], true);
  }

  // ── Admin surface ───────────────────────────────────────────────────────────

  #[tokio::test]
  async fn admin_requires_credentials() {
    let (state, _rx) = make_state().await;

    let resp = oneshot_raw(state, "GET", "/admin/meetings", vec![], "").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn admin_create_meeting_claims_the_active_slot() {
    let (state, _rx) = make_state().await;
    let auth = admin_header();

    // Prime the cache with "nothing open" to prove invalidation works.
    let empty = oneshot_raw(state.clone(), "GET", "/meeting", vec![], "").await;
    assert_eq!(empty.status(), StatusCode::CONFLICT);

    let body = r#"{"topic":"First","meeting_date":"2026-03-02","start_time":"09:00:00","end_time":"10:00:00","is_active":true}"#;
    let resp = oneshot_raw(
      state.clone(),
      "POST",
      "/admin/meetings",
      vec![
        (header::AUTHORIZATION, auth.as_str()),
        (header::CONTENT_TYPE, "application/json"),
      ],
      body,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let first_id = body_json(resp).await["id"].as_i64().unwrap();

    let body2 = r#"{"topic":"Second","meeting_date":"2026-03-09","start_time":"09:00:00","end_time":"10:00:00","is_active":true}"#;
    oneshot_raw(
      state.clone(),
      "POST",
      "/admin/meetings",
      vec![
        (header::AUTHORIZATION, auth.as_str()),
        (header::CONTENT_TYPE, "application/json"),
      ],
      body2,
    )
    .await;

    let active = oneshot_raw(state.clone(), "GET", "/meeting", vec![], "").await;
    assert_eq!(body_json(active).await["topic"], "Second");

    let first = state.store.get_meeting(first_id).await.unwrap().unwrap();
    assert!(!first.is_active);
  }

  #[tokio::test]
  async fn admin_toggle_closes_checkin() {
    let (state, _rx) = make_state().await;
    let auth = admin_header();
    let meeting_id = seed_meeting(&state, "Town hall", true).await;

    let resp = oneshot_raw(
      state.clone(),
      "POST",
      &format!("/admin/meetings/{meeting_id}/toggle"),
      vec![(header::AUTHORIZATION, auth.as_str())],
      "",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let closed = oneshot_raw(state, "GET", "/meeting", vec![], "").await;
    assert_eq!(closed.status(), StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn admin_delete_with_registrations_conflicts() {
    let (state, _rx) = make_state().await;
    let auth = admin_header();
    seed_employee(&state, "00123456", "Alice").await;
    let meeting_id = seed_meeting(&state, "Town hall", true).await;
    post_form(state.clone(), "/checkin", "emp_id=00123456").await;

    let resp = oneshot_raw(
      state.clone(),
      "DELETE",
      &format!("/admin/meetings/{meeting_id}"),
      vec![(header::AUTHORIZATION, auth.as_str())],
      "",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert!(state.store.get_meeting(meeting_id).await.unwrap().is_some());
  }

  #[tokio::test]
  async fn admin_export_serves_csv_attachment() {
    let (state, _rx) = make_state().await;
    let auth = admin_header();
    seed_employee(&state, "00123456", "Alice Liddell").await;
    let meeting_id = seed_meeting(&state, "Town hall", true).await;
    post_form(state.clone(), "/checkin", "emp_id=00123456").await;

    let resp = oneshot_raw(
      state,
      "GET",
      &format!("/admin/meetings/{meeting_id}/export"),
      vec![(header::AUTHORIZATION, auth.as_str())],
      "",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
    assert!(ct.contains("text/csv"), "Content-Type: {ct}");
    let cd = resp
      .headers()
      .get(header::CONTENT_DISPOSITION)
      .unwrap()
      .to_str()
      .unwrap();
    assert!(cd.contains("registrations_"), "Content-Disposition: {cd}");

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body  = std::str::from_utf8(&bytes).unwrap();
    assert!(body.starts_with('\u{feff}'));
    assert!(body.contains("Alice Liddell"));
  }

  #[tokio::test]
  async fn admin_import_feeds_stats() {
    let (state, _rx) = make_state().await;
    let auth = admin_header();

    let csv = "emp_id,name,position,unit,cost_center\n\
               00123456,Alice,Analyst,FIN,CC-100\n\
               00123457,Bob,,OPS,\n";
    let resp = oneshot_raw(
      state.clone(),
      "POST",
      "/admin/employees/import",
      vec![(header::AUTHORIZATION, auth.as_str())],
      csv,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let summary = body_json(resp).await;
    assert_eq!(summary["inserted"], 2);

    let stats = oneshot_raw(
      state,
      "GET",
      "/admin/stats",
      vec![(header::AUTHORIZATION, auth.as_str())],
      "",
    )
    .await;
    let json = body_json(stats).await;
    assert_eq!(json["employees"], 2);
  }

  #[tokio::test]
  async fn admin_import_rejects_malformed_csv() {
    let (state, _rx) = make_state().await;
    let auth = admin_header();

    let resp = oneshot_raw(
      state,
      "POST",
      "/admin/employees/import",
      vec![(header::AUTHORIZATION, auth.as_str())],
      "emp_id,title\n1,boss\n",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  // ── Organizer auth and scoping ──────────────────────────────────────────────

  /// Walk signup → OTP (read off the queue) → verify, returning a bearer
  /// token.
  async fn signup_and_login(
    state: &AppState<SqliteStore>,
    rx:    &mut mpsc::Receiver<NotificationJob>,
    email: &str,
  ) -> String {
    let body = format!(r#"{{"email":"{email}","name":"Organizer"}}"#);
    let resp = oneshot_raw(
      state.clone(),
      "POST",
      "/auth/signup",
      vec![(header::CONTENT_TYPE, "application/json")],
      &body,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    let NotificationJob::Otp { code, .. } = rx.try_recv().expect("otp enqueued")
    else {
      panic!("expected otp job");
    };

    let body = format!(
      r#"{{"email":"{email}","code":"{code}","purpose":"signup"}}"#
    );
    let resp = oneshot_raw(
      state.clone(),
      "POST",
      "/auth/verify",
      vec![(header::CONTENT_TYPE, "application/json")],
      &body,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["outcome"], "verified");
    json["token"].as_str().unwrap().to_owned()
  }

  #[tokio::test]
  async fn signup_verify_creates_a_working_session() {
    let (state, mut rx) = make_state().await;
    let token = signup_and_login(&state, &mut rx, "alice@example.com").await;

    let bearer = format!("Bearer {token}");
    let resp = oneshot_raw(
      state,
      "GET",
      "/organizer/meetings",
      vec![(header::AUTHORIZATION, bearer.as_str())],
      "",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, serde_json::json!([]));
  }

  #[tokio::test]
  async fn wrong_otp_code_is_rejected() {
    let (state, mut rx) = make_state().await;

    let resp = oneshot_raw(
      state.clone(),
      "POST",
      "/auth/signup",
      vec![(header::CONTENT_TYPE, "application/json")],
      r#"{"email":"alice@example.com","name":"Alice"}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    rx.try_recv().expect("otp enqueued");

    let resp = oneshot_raw(
      state,
      "POST",
      "/auth/verify",
      vec![(header::CONTENT_TYPE, "application/json")],
      r#"{"email":"alice@example.com","code":"000000","purpose":"signup"}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["outcome"], "invalid_code");
  }

  #[tokio::test]
  async fn login_issues_a_fresh_otp_for_active_accounts() {
    let (state, mut rx) = make_state().await;
    signup_and_login(&state, &mut rx, "alice@example.com").await;

    let resp = oneshot_raw(
      state.clone(),
      "POST",
      "/auth/login",
      vec![(header::CONTENT_TYPE, "application/json")],
      r#"{"email":"alice@example.com"}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);

    let NotificationJob::Otp { code, .. } = rx.try_recv().expect("otp enqueued")
    else {
      panic!("expected otp job");
    };

    let body = format!(
      r#"{{"email":"alice@example.com","code":"{code}","purpose":"login"}}"#
    );
    let resp = oneshot_raw(
      state,
      "POST",
      "/auth/verify",
      vec![(header::CONTENT_TYPE, "application/json")],
      &body,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
  }

  #[tokio::test]
  async fn login_with_unknown_email_is_not_found() {
    let (state, _rx) = make_state().await;

    let resp = oneshot_raw(
      state,
      "POST",
      "/auth/login",
      vec![(header::CONTENT_TYPE, "application/json")],
      r#"{"email":"ghost@example.com"}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn signup_honours_the_domain_allowlist() {
    let (mut state, _rx) = make_state().await;
    let mut config = (*state.config).clone();
    config.allowed_email_domains = vec!["example.com".to_string()];
    state.config = Arc::new(config);

    let resp = oneshot_raw(
      state,
      "POST",
      "/auth/signup",
      vec![(header::CONTENT_TYPE, "application/json")],
      r#"{"email":"alice@other.org","name":"Alice"}"#,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn organizer_meetings_are_scoped_to_their_owner() {
    let (state, mut rx) = make_state().await;
    let alice = signup_and_login(&state, &mut rx, "alice@example.com").await;
    let mallory = signup_and_login(&state, &mut rx, "mallory@example.com").await;

    let alice_bearer = format!("Bearer {alice}");
    let body = r#"{"topic":"Alice's standup","meeting_date":"2026-03-02","start_time":"09:00:00","end_time":"09:30:00"}"#;
    let resp = oneshot_raw(
      state.clone(),
      "POST",
      "/organizer/meetings",
      vec![
        (header::AUTHORIZATION, alice_bearer.as_str()),
        (header::CONTENT_TYPE, "application/json"),
      ],
      body,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let meeting_id = body_json(resp).await["id"].as_i64().unwrap();

    // Mallory cannot see or edit Alice's meeting.
    let mallory_bearer = format!("Bearer {mallory}");
    let resp = oneshot_raw(
      state.clone(),
      "POST",
      &format!("/organizer/meetings/{meeting_id}/toggle"),
      vec![(header::AUTHORIZATION, mallory_bearer.as_str())],
      "",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = oneshot_raw(
      state,
      "GET",
      "/organizer/meetings",
      vec![(header::AUTHORIZATION, mallory_bearer.as_str())],
      "",
    )
    .await;
    assert_eq!(body_json(resp).await, serde_json::json!([]));
  }

  #[tokio::test]
  async fn organizer_activation_opens_checkin() {
    let (state, mut rx) = make_state().await;
    seed_employee(&state, "00123456", "Alice").await;
    let token  = signup_and_login(&state, &mut rx, "host@example.com").await;
    let bearer = format!("Bearer {token}");

    let body = r#"{"topic":"Workshop","meeting_date":"2026-03-02","start_time":"09:00:00","end_time":"12:00:00","is_active":true}"#;
    oneshot_raw(
      state.clone(),
      "POST",
      "/organizer/meetings",
      vec![
        (header::AUTHORIZATION, bearer.as_str()),
        (header::CONTENT_TYPE, "application/json"),
      ],
      body,
    )
    .await;

    let resp = post_form(state, "/checkin", "emp_id=00123456").await;
    assert_eq!(resp.status(), StatusCode::CREATED);
  }

  #[tokio::test]
  async fn logout_invalidates_the_session() {
    let (state, mut rx) = make_state().await;
    let token  = signup_and_login(&state, &mut rx, "alice@example.com").await;
    let bearer = format!("Bearer {token}");

    let resp = oneshot_raw(
      state.clone(),
      "POST",
      "/auth/logout",
      vec![(header::AUTHORIZATION, bearer.as_str())],
      "",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = oneshot_raw(
      state,
      "GET",
      "/organizer/meetings",
      vec![(header::AUTHORIZATION, bearer.as_str())],
      "",
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }
}
