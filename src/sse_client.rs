use anyhow::Result;
use eventsource_client::{self as es, Client};
use futures_util::stream::StreamExt;
use log::*;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use crate::auth::SESSION_COOKIE;

#[derive(Debug, Clone)]
pub struct FeedEvent {
    pub event_type: String,
    pub data: Value,
    pub timestamp: Instant,
}

/// A live connection to a course's feed stream. Events are parsed on a
/// background task and handed over through a channel.
pub struct FeedStream {
    pub course_id: String,
    event_rx: mpsc::UnboundedReceiver<FeedEvent>,
    _handle: tokio::task::JoinHandle<()>,
}

impl FeedStream {
    pub async fn connect(base_url: &str, course_id: &str, session_cookie: &str) -> Result<Self> {
        let url = format!(
            "{}/courses/{}/feed/stream",
            base_url.trim_end_matches('/'),
            course_id
        );
        let (tx, rx) = mpsc::unbounded_channel();

        let client = es::ClientBuilder::for_url(&url)?
            .header("Cookie", &format!("{}={}", SESSION_COOKIE, session_cookie))?
            .build();

        let label = course_id.to_string();
        let handle = tokio::spawn(async move {
            let mut stream = client.stream();

            loop {
                match stream.next().await {
                    Some(Ok(es::SSE::Event(event))) => {
                        if let Ok(data) = serde_json::from_str(&event.data) {
                            let feed_event = FeedEvent {
                                event_type: event.event_type,
                                data,
                                timestamp: Instant::now(),
                            };

                            if tx.send(feed_event).is_err() {
                                debug!("Feed stream receiver dropped for course {}", label);
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {
                        // Keep-alive comments and connection notices
                    }
                    Some(Err(e)) => {
                        warn!("Feed stream error for course {}: {}", label, e);
                    }
                    None => {
                        debug!("Feed stream ended for course {}", label);
                        break;
                    }
                }
            }
        });

        Ok(Self {
            course_id: course_id.to_string(),
            event_rx: rx,
            _handle: handle,
        })
    }

    /// Waits for the next event of the given type on this course's feed,
    /// discarding any others that arrive in between.
    pub async fn wait_for_event(
        &mut self,
        event_type: &str,
        timeout: Duration,
    ) -> Result<FeedEvent> {
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                anyhow::bail!(
                    "Timed out waiting for {} on the feed of course {}",
                    event_type,
                    self.course_id
                );
            }

            match tokio::time::timeout(remaining, self.event_rx.recv()).await {
                Ok(Some(event)) if event.event_type == event_type => return Ok(event),
                Ok(Some(other)) => {
                    debug!(
                        "Discarding {} event on course {} while waiting for {}",
                        other.event_type, self.course_id, event_type
                    );
                }
                Ok(None) => {
                    anyhow::bail!("Feed stream for course {} closed", self.course_id);
                }
                Err(_) => {
                    anyhow::bail!(
                        "Timed out waiting for {} on the feed of course {}",
                        event_type,
                        self.course_id
                    );
                }
            }
        }
    }
}
