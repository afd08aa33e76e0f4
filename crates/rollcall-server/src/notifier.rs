//! Background notification dispatch.
//!
//! A bounded mpsc channel is the work queue; one worker task drains it and
//! POSTs each job as JSON to the configured webhook gateway. Delivery is
//! best-effort — failures are logged and the job dropped, and no producer
//! ever blocks on the queue.

use anyhow::Context as _;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use rollcall_core::notify::NotificationJob;

/// Jobs queued beyond this are dropped at enqueue time (logged by the
/// producer).
pub const QUEUE_DEPTH: usize = 256;

const DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

/// Spawn the dispatch worker and hand back the producer side of the queue.
pub fn spawn(webhook_url: Option<String>) -> anyhow::Result<mpsc::Sender<NotificationJob>> {
  let client = reqwest::Client::builder()
    .timeout(DELIVERY_TIMEOUT)
    .build()
    .context("failed to build notification HTTP client")?;

  let (tx, rx) = mpsc::channel(QUEUE_DEPTH);
  tokio::spawn(run(rx, client, webhook_url));
  Ok(tx)
}

async fn run(
  mut rx: mpsc::Receiver<NotificationJob>,
  client: reqwest::Client,
  webhook_url: Option<String>,
) {
  match &webhook_url {
    Some(url) => info!("notification dispatch enabled → {url}"),
    None => info!("no webhook configured; notifications will be dropped"),
  }

  while let Some(job) = rx.recv().await {
    let Some(url) = &webhook_url else {
      debug!("dropping {} notification: no webhook configured", job.kind());
      continue;
    };

    if let Err(e) = deliver(&client, url, &job).await {
      warn!("failed to deliver {} notification: {e:#}", job.kind());
    } else {
      debug!("delivered {} notification", job.kind());
    }
  }
}

async fn deliver(
  client: &reqwest::Client,
  url: &str,
  job: &NotificationJob,
) -> anyhow::Result<()> {
  let response = client
    .post(url)
    .json(job)
    .send()
    .await
    .context("webhook request failed")?;

  if !response.status().is_success() {
    anyhow::bail!("webhook returned {}", response.status());
  }
  Ok(())
}
