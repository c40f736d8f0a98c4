//! Response sinks: the channel back to the caller.
//!
//! `UnarySink` delivers the single terminal response of a unary call and
//! structurally prevents a second write: the sender lives in a mutexed
//! `Option` and is taken out on the first write. `StreamSink` carries the
//! many outbound messages of the telemetry stream over a bounded channel.
//! Both swallow and log write failures so worker tasks survive a caller
//! that has gone away.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tracing::warn;

/// Single-use terminal write handle for a unary call.
///
/// Cloneable so the admission path and the rejection path can each hold
/// the sink; whichever writes first wins, and the loser's write is
/// suppressed and logged rather than delivered.
#[derive(Debug)]
pub struct UnarySink<T> {
    tx: Arc<Mutex<Option<oneshot::Sender<T>>>>,
}

impl<T> Clone for UnarySink<T> {
    fn clone(&self) -> Self {
        Self {
            tx: Arc::clone(&self.tx),
        }
    }
}

impl<T> UnarySink<T> {
    /// Creates a sink and the receiver the transport awaits the terminal
    /// response on.
    #[must_use]
    pub fn channel() -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                tx: Arc::new(Mutex::new(Some(tx))),
            },
            rx,
        )
    }

    /// Writes the terminal response. Returns `false` when a response was
    /// already written or the receiver is gone; either way the failure is
    /// logged and swallowed.
    pub fn write(&self, value: T) -> bool {
        let Some(tx) = self.tx.lock().take() else {
            warn!("terminal response already written, dropping duplicate");
            return false;
        };
        if tx.send(value).is_err() {
            warn!("response receiver dropped before terminal write");
            return false;
        }
        true
    }

    /// Whether a terminal write has already consumed this sink.
    #[must_use]
    pub fn is_written(&self) -> bool {
        self.tx.lock().is_none()
    }
}

/// Outbound handle for the bidirectional telemetry stream.
///
/// Unlike `UnarySink` this is multi-write: the stream emits one outbound
/// command per forwarded or rejected inbound message over its lifetime.
/// Writes never block; a full channel drops the message.
#[derive(Debug)]
pub struct StreamSink<T> {
    tx: mpsc::Sender<T>,
}

impl<T> Clone for StreamSink<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> StreamSink<T> {
    /// Creates a sink and the receiver the transport drains outbound
    /// stream messages from.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<T>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Writes one outbound stream message without blocking. Returns
    /// `false` when the channel is full or the stream has closed.
    pub fn write(&self, value: T) -> bool {
        match self.tx.try_send(value) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!("outbound stream channel full, dropping message");
                false
            }
            Err(TrySendError::Closed(_)) => {
                warn!("outbound stream closed, dropping message");
                false
            }
        }
    }

    /// Whether the stream's receiver is still attached.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }
}
