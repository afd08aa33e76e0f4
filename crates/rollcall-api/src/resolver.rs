//! Active-meeting resolution with a timed cache and bounded retry.
//!
//! The check-in page hits this on every load, so the result is cached for a
//! short window and refreshed through a retry loop that degrades to "no
//! meeting open" instead of surfacing storage errors. Mutating handlers call
//! [`ActiveMeetingResolver::invalidate`] so admin edits show up immediately.

use std::{sync::Arc, time::Duration};

use tokio::{sync::Mutex, time::Instant};

use rollcall_core::{meeting::Meeting, store::ActiveMeetingSource};

// ─── Configuration ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ResolverConfig {
  /// How long a resolved snapshot (including an empty one) stays served.
  pub cache_ttl:   Duration,
  /// Total attempts per refresh, including the first.
  pub max_attempts: u32,
  /// Base delay between attempts; attempt `n` sleeps `n * retry_delay`.
  pub retry_delay: Duration,
}

impl Default for ResolverConfig {
  fn default() -> Self {
    Self {
      cache_ttl:    Duration::from_secs(60),
      max_attempts: 3,
      retry_delay:  Duration::from_secs(1),
    }
  }
}

// ─── Resolver ────────────────────────────────────────────────────────────────

struct Snapshot {
  fetched_at: Instant,
  meeting:    Option<Meeting>,
}

/// Cached, retrying view of the single active meeting.
pub struct ActiveMeetingResolver<S> {
  source: Arc<S>,
  config: ResolverConfig,
  // The lock covers the whole refresh so a cold cache triggers one storage
  // read, not one per concurrent request.
  slot:   Mutex<Option<Snapshot>>,
}

impl<S: ActiveMeetingSource> ActiveMeetingResolver<S> {
  pub fn new(source: Arc<S>, config: ResolverConfig) -> Self {
    Self {
      source,
      config,
      slot: Mutex::new(None),
    }
  }

  /// The meeting currently open for check-in, or `None`.
  ///
  /// Never returns an error: a storage outage that survives the retry budget
  /// clears the cache entry and reads as "no meeting open".
  pub async fn resolve(&self) -> Option<Meeting> {
    let mut slot = self.slot.lock().await;

    if let Some(snapshot) = slot.as_ref()
      && snapshot.fetched_at.elapsed() < self.config.cache_ttl
    {
      return snapshot.meeting.clone();
    }

    for attempt in 1..=self.config.max_attempts {
      match self.source.active_meeting().await {
        Ok(meeting) => {
          *slot = Some(Snapshot {
            fetched_at: Instant::now(),
            meeting:    meeting.clone(),
          });
          return meeting;
        }
        Err(e) => {
          tracing::warn!(attempt, "active-meeting lookup failed: {e}");
          if attempt < self.config.max_attempts {
            tokio::time::sleep(self.config.retry_delay * attempt).await;
          }
        }
      }
    }

    tracing::error!(
      "active-meeting lookup failed after {} attempts; reporting no meeting",
      self.config.max_attempts,
    );
    *slot = None;
    None
  }

  /// Drop the cached snapshot; the next [`resolve`](Self::resolve) reads
  /// storage. Called on every meeting mutation.
  pub async fn invalidate(&self) {
    *self.slot.lock().await = None;
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
