//! Public check-in JSON API for rollcall.
//!
//! Exposes an axum [`Router`] backed by any
//! [`rollcall_core::store::RegistryStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility — these endpoints are the anonymous
//! attendee surface.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(rollcall_api::checkin_router(state))
//! ```

pub mod checkin;
pub mod directory;
pub mod error;
pub mod resolver;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use tokio::sync::mpsc;

use rollcall_core::{notify::NotificationJob, store::RegistryStore};

pub use error::ApiError;
pub use resolver::{ActiveMeetingResolver, ResolverConfig};

/// Shared state threaded through the check-in handlers.
///
/// Everything the flow touches — store, cache, queue — arrives here
/// explicitly; there are no module-level singletons.
#[derive(Clone)]
pub struct CheckinState<S: RegistryStore> {
  pub store:         Arc<S>,
  pub resolver:      Arc<ActiveMeetingResolver<S>>,
  pub notifications: mpsc::Sender<NotificationJob>,
}

/// Build a fully-materialised check-in router for `state`.
///
/// The returned `Router<()>` can be merged into any parent router regardless
/// of its own state type.
pub fn checkin_router<S>(state: CheckinState<S>) -> Router<()>
where
  S: RegistryStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/meeting", get(checkin::active_meeting::<S>))
    .route("/checkin", post(checkin::submit::<S>))
    .route("/checkin/manual", post(checkin::submit_manual::<S>))
    .route("/employees/{emp_id}", get(directory::check::<S>))
    .route(
      "/status/{meeting_id}/{emp_id}",
      get(directory::status::<S>),
    )
    .with_state(state)
}
