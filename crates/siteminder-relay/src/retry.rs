// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Re-submission of events whose batch hit a transport failure.
//!
//! Retried events go back through the ordinary submission queue and compete with fresh
//! traffic for batch slots; they get no priority.

use crate::event::Event;
use crate::queue::EventQueue;
use tracing::{debug, error, warn};

/// Counts one more attempt for `event` if it is still below `max_retries`.
///
/// Returns the event back as `Err` once the ceiling is reached.
pub fn next_attempt(mut event: Event, max_retries: u32) -> Result<Event, Event> {
    if event.number_of_retries() < max_retries {
        event.record_retry();
        Ok(event)
    } else {
        Err(event)
    }
}

/// Re-submits every event of a failed batch that still has retries left, in batch order.
///
/// Waits on the queue like any other producer.
pub async fn resubmit(batch: Vec<Event>, max_retries: u32, queue: &EventQueue) {
    let mut exhausted = 0;
    for event in batch {
        match next_attempt(event, max_retries) {
            Ok(event) => {
                debug!(
                    "Retrying event (attempt {}) after a network failure: {:?}",
                    event.number_of_retries(),
                    event.data()
                );
                if let Err(e) = queue.submit(event).await {
                    error!(
                        "Failed to resubmit event, batcher is not running: {:?}",
                        e.0.data()
                    );
                }
            }
            Err(event) => {
                exhausted += 1;
                debug!("Maximum retries limit reached: {:?}", event.data());
            }
        }
    }
    if exhausted > 0 {
        warn!(
            "Dropped {} events after {} failed retries",
            exhausted, max_retries
        );
    }
}
