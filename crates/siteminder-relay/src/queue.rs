// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The submission queue between event producers (builder, retry) and the batcher.
//!
//! The queue holds at most one in-flight event: once that slot is taken, every producer
//! waits until the batcher receives. A stalled batcher therefore stalls ingestion and retry
//! re-submission alike, which is the relay's only backpressure mechanism.

use crate::event::Event;
use tokio::sync::mpsc;

pub const QUEUE_CAPACITY: usize = 1;

pub type EventReceiver = mpsc::Receiver<Event>;

/// Producer side of the submission queue. Cheap to clone.
#[derive(Clone, Debug)]
pub struct EventQueue {
    tx: mpsc::Sender<Event>,
}

impl EventQueue {
    /// Hands `event` to the batcher, waiting while the queue is full.
    ///
    /// Fails only once the batcher has stopped, giving the event back.
    pub async fn submit(&self, event: Event) -> Result<(), mpsc::error::SendError<Event>> {
        self.tx.send(event).await
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

pub fn event_queue() -> (EventQueue, EventReceiver) {
    let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
    (EventQueue { tx }, rx)
}
