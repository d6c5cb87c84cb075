// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! TCP intake of monitoring output.
//!
//! The listener accepts a client, reads its stream line by line, extracts every metric tag of
//! each line and hands the resulting metrics to the event builder. By default only the first
//! client is served; with `accept_loop` further clients are accepted one at a time after the
//! previous one disconnects.

use std::borrow::Cow;
use std::net::SocketAddr;

use crate::errors::StartupError;
use crate::event::EventBuilder;
use crate::metric;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

const LINE_CAPACITY: usize = 8192;
/// Longest accepted line, terminator included. Longer lines are skipped.
pub const MAX_LINE_LENGTH: usize = 64 * 1024;

enum LineRead {
    Complete,
    Oversized,
    Eof,
}

pub struct ListenerConfig {
    pub addr: SocketAddr,
    pub accept_loop: bool,
}

pub struct Listener {
    cancel_token: CancellationToken,
    event_builder: EventBuilder,
    tcp_listener: TcpListener,
    accept_loop: bool,
}

impl Listener {
    /// Binds the listening socket. Failing to bind is fatal for the relay.
    pub async fn bind(
        config: &ListenerConfig,
        event_builder: EventBuilder,
        cancel_token: CancellationToken,
    ) -> Result<Listener, StartupError> {
        let tcp_listener =
            TcpListener::bind(config.addr)
                .await
                .map_err(|source| StartupError::Bind {
                    addr: config.addr,
                    source,
                })?;
        Ok(Listener {
            cancel_token,
            event_builder,
            tcp_listener,
            accept_loop: config.accept_loop,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.tcp_listener.local_addr()
    }

    /// Serves clients until the stream of the last accepted one ends or the token is cancelled.
    pub async fn spin(self) -> Result<(), StartupError> {
        loop {
            let (stream, peer) = tokio::select! {
                accepted = self.tcp_listener.accept() => accepted.map_err(StartupError::Accept)?,
                () = self.cancel_token.cancelled() => return Ok(()),
            };
            info!("Accepted connection from {}", peer);
            self.consume(BufReader::new(stream)).await;
            info!("Connection from {} closed", peer);

            if !self.accept_loop || self.cancel_token.is_cancelled() {
                return Ok(());
            }
        }
    }

    /// Reads `reader` to its end, processing one line at a time.
    async fn consume<R: AsyncBufRead + Unpin>(&self, mut reader: R) {
        let mut buf = Vec::with_capacity(LINE_CAPACITY);
        loop {
            buf.clear();
            let read = tokio::select! {
                read = read_line(&mut reader, &mut buf) => read,
                () = self.cancel_token.cancelled() => return,
            };
            match read {
                Ok(LineRead::Eof) => return,
                Ok(LineRead::Complete) => {
                    let line = decode_line(&buf);
                    trace!("Reading one line: {}", line);
                    self.process_line(&line).await;
                }
                Ok(LineRead::Oversized) => {
                    warn!("Skipping line longer than {} bytes", MAX_LINE_LENGTH);
                }
                Err(e) => {
                    error!("Failed to read from connection: {}", e);
                    return;
                }
            }
        }
    }

    async fn process_line(&self, line: &str) {
        let mut matched = false;
        for result in metric::extract(line) {
            matched = true;
            match result {
                Ok(metric) => {
                    debug!("Extracted metric: {:?}", metric);
                    self.event_builder.submit(metric).await;
                }
                Err(e) => error!("Failed to parse metric tag in line: {}", e),
            }
        }
        if !matched {
            debug!("No metric tag in line");
        }
    }
}

/// Reads one line into `buf`, reading at most [`MAX_LINE_LENGTH`] bytes of it. The rest of
/// an oversized line is consumed and discarded.
async fn read_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> std::io::Result<LineRead> {
    let read = (&mut *reader)
        .take(MAX_LINE_LENGTH as u64)
        .read_until(b'\n', buf)
        .await?;
    if read == 0 {
        return Ok(LineRead::Eof);
    }
    if read == MAX_LINE_LENGTH && buf.last() != Some(&b'\n') {
        skip_line(reader).await?;
        return Ok(LineRead::Oversized);
    }
    Ok(LineRead::Complete)
}

async fn skip_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> std::io::Result<()> {
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|b| *b == b'\n') {
            Some(end) => {
                reader.consume(end + 1);
                return Ok(());
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}

fn decode_line(buf: &[u8]) -> Cow<'_, str> {
    let line = buf.strip_suffix(b"\n").unwrap_or(buf);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line)
}
