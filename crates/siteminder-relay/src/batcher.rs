// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Single consumer of the submission queue.
//!
//! The batcher owns the in-memory buffer outright, so no locking is involved. It flushes on
//! whichever comes first:
//! - an arrival that finds the buffer already at or above the size threshold (the buffer is
//!   flushed before the new event is appended, so it may briefly sit above the threshold);
//! - expiry of the flush timer while the buffer holds at least one event.
//!
//! Each flush runs on its own task, independently of later batcher iterations.

use std::sync::Arc;
use std::time::Duration;

use crate::event::Event;
use crate::flusher::BatchFlusher;
use crate::queue::EventReceiver;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Ordered events awaiting the next flush, with their summed encoded size.
#[derive(Debug, Default)]
pub struct Buffer {
    events: Vec<Event>,
    byte_size: usize,
}

impl Buffer {
    pub fn push(&mut self, event: Event) {
        self.byte_size += event.size();
        self.events.push(event);
    }

    /// Empties the buffer, returning its events in arrival order.
    pub fn take(&mut self) -> Vec<Event> {
        self.byte_size = 0;
        std::mem::take(&mut self.events)
    }

    pub fn byte_size(&self) -> usize {
        self.byte_size
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BatcherConfig {
    pub flush_interval: Duration,
    /// Size threshold in bytes
    pub max_buffer_size: usize,
}

pub struct Batcher {
    rx: EventReceiver,
    flusher: Arc<dyn BatchFlusher>,
    buffer: Buffer,
    config: BatcherConfig,
    cancel_token: CancellationToken,
}

impl Batcher {
    pub fn new(
        rx: EventReceiver,
        flusher: Arc<dyn BatchFlusher>,
        config: BatcherConfig,
        cancel_token: CancellationToken,
    ) -> Self {
        Batcher {
            rx,
            flusher,
            buffer: Buffer::default(),
            config,
            cancel_token,
        }
    }

    /// Consumes the queue until cancelled or until every producer is gone.
    pub async fn run(mut self) {
        debug!("Batcher started");
        let flush_interval = self.config.flush_interval;
        let timer = sleep(flush_interval);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                () = self.cancel_token.cancelled() => break,
                received = self.rx.recv() => {
                    let Some(event) = received else {
                        break;
                    };
                    if !self.buffer.is_empty() && self.buffer.byte_size() >= self.config.max_buffer_size {
                        debug!("Flushing buffer because of size: {}", self.buffer.byte_size());
                        self.flush();
                        timer.as_mut().reset(Instant::now() + flush_interval);
                    }
                    self.buffer.push(event);
                }
                () = &mut timer => {
                    if !self.buffer.is_empty() {
                        debug!(
                            "Flushing buffer because the interval limit is reached: {:?}",
                            flush_interval
                        );
                        self.flush();
                    }
                    timer.as_mut().reset(Instant::now() + flush_interval);
                }
            }
        }

        self.shutdown().await;
        debug!("Batcher stopped");
    }

    fn flush(&mut self) {
        let batch = self.buffer.take();
        let flusher = Arc::clone(&self.flusher);
        tokio::spawn(async move {
            flusher.flush(batch).await;
        });
    }

    // Closing the queue first makes late retries fail fast instead of waiting on a
    // batcher that will never receive again.
    async fn shutdown(&mut self) {
        self.rx.close();
        while let Ok(event) = self.rx.try_recv() {
            self.buffer.push(event);
        }
        if !self.buffer.is_empty() {
            debug!("Flushing {} buffered events before stopping", self.buffer.len());
            self.flusher.flush(self.buffer.take()).await;
        }
    }
}
