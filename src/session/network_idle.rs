//! Network-idle detection for page loads
//!
//! A page counts as idle once at most `max_inflight` requests have been
//! outstanding for a full settle period. With `max_inflight == 0` this is
//! the classic "no connections for 500ms" rule.

use std::collections::HashSet;
use std::pin::pin;
use std::time::Duration;

use anyhow::{Result, bail};
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use futures::{Stream, StreamExt, stream};
use tokio::time::{Instant, sleep_until};
use tracing::trace;

/// Tracks outstanding requests by CDP request id
#[derive(Debug, Default)]
pub struct InflightTracker {
    inflight: HashSet<String>,
    max_inflight: usize,
}

impl InflightTracker {
    #[must_use]
    pub fn new(max_inflight: usize) -> Self {
        Self {
            inflight: HashSet::new(),
            max_inflight,
        }
    }

    /// Record a request start. Redirect hops reuse the id and are not counted twice.
    pub fn started(&mut self, request_id: &str) -> bool {
        self.inflight.insert(request_id.to_string())
    }

    /// Record a request that finished or failed
    pub fn finished(&mut self, request_id: &str) -> bool {
        self.inflight.remove(request_id)
    }

    #[must_use]
    pub fn inflight(&self) -> usize {
        self.inflight.len()
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.inflight.len() <= self.max_inflight
    }
}

/// Request lifecycle notification, keyed by request id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkEvent {
    Started(String),
    Finished(String),
}

/// Navigate `page` to `url` and return once the network has gone idle
///
/// Listeners are registered before navigation so requests issued during the
/// initial load are observed. Not bounded in time: a page that never goes
/// idle keeps this future pending, and the caller's timeout decides.
///
/// # Errors
///
/// Returns an error if navigation fails or the page's event streams close
/// before the network settles.
pub async fn goto_and_wait_for_idle(
    page: &Page,
    url: &str,
    settle: Duration,
    max_inflight: usize,
) -> Result<()> {
    let started = page
        .event_listener::<EventRequestWillBeSent>()
        .await?
        .map(|e| NetworkEvent::Started(e.request_id.inner().clone()));
    let finished = page
        .event_listener::<EventLoadingFinished>()
        .await?
        .map(|e| NetworkEvent::Finished(e.request_id.inner().clone()));
    let failed = page
        .event_listener::<EventLoadingFailed>()
        .await?
        .map(|e| NetworkEvent::Finished(e.request_id.inner().clone()));

    page.goto(url).await?;

    wait_for_idle(
        stream::select(started, stream::select(finished, failed)),
        settle,
        max_inflight,
    )
    .await
}

/// Consume `events` until at most `max_inflight` requests have been
/// outstanding for `settle`
///
/// The settle timer restarts whenever the in-flight set changes.
///
/// # Errors
///
/// Returns an error if `events` ends while the page is still busy.
pub async fn wait_for_idle<S>(events: S, settle: Duration, max_inflight: usize) -> Result<()>
where
    S: Stream<Item = NetworkEvent>,
{
    let mut events = pin!(events);
    let mut tracker = InflightTracker::new(max_inflight);
    let mut quiet_since = Instant::now();

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                let changed = match &event {
                    NetworkEvent::Started(id) => tracker.started(id),
                    NetworkEvent::Finished(id) => tracker.finished(id),
                };
                if changed {
                    quiet_since = Instant::now();
                }
            }
            () = sleep_until(quiet_since + settle), if tracker.is_idle() => {
                trace!("Network idle for {settle:?} with {} in flight", tracker.inflight());
                return Ok(());
            }
            else => bail!("Page event streams closed before network went idle"),
        }
    }
}
