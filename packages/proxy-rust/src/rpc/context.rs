//! Per-call context extraction from ambient call metadata.
//!
//! The upstream interceptor attaches key-value metadata and an optional
//! deadline to every inbound call. `CallContext::extract` reads both into
//! an immutable per-call value, tolerating absent fields. Extraction takes
//! an explicit `CallMetadata` handle rather than reading thread-ambient
//! state, so it is testable without a live call.

use std::collections::HashMap;

use tokio::time::Instant;

/// Attachment keys set by the upstream call interceptor.
pub mod attachment_keys {
    pub const LOCAL_ADDRESS: &str = "local-address";
    pub const REMOTE_ADDRESS: &str = "remote-address";
    pub const CLIENT_ID: &str = "client-id";
    pub const LANGUAGE: &str = "language";
}

/// Explicit handle to the ambient state of one inbound call: opaque
/// key-value attachments plus an optional deadline.
#[derive(Debug, Clone, Default)]
pub struct CallMetadata {
    attachments: HashMap<String, String>,
    deadline: Option<Instant>,
}

impl CallMetadata {
    /// Creates empty metadata (no attachments, no deadline).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key-value attachment.
    #[must_use]
    pub fn with_attachment(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attachments.insert(key.into(), value.into());
        self
    }

    /// Sets the call deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Looks up an attachment value by key.
    #[must_use]
    pub fn attachment(&self, key: &str) -> Option<&str> {
        self.attachments.get(key).map(String::as_str)
    }

    /// Returns the call deadline, if one was set.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

/// Immutable per-call context read by operation bodies and logging.
///
/// One context is created per unary call, and one per telemetry stream
/// (shared by every message on that stream).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallContext {
    /// Address the call arrived on. Empty when not attached.
    pub local_address: String,
    /// Address of the calling client. Empty when not attached.
    pub remote_address: String,
    /// Client identifier declared by the caller. Empty when not attached.
    pub client_id: String,
    /// Client SDK language declared by the caller. Empty when not attached.
    pub language: String,
    /// Remaining time budget in milliseconds, relative to extraction time.
    /// `None` when the call carries no deadline. Informational only; this
    /// layer does not cancel running operations when the budget elapses.
    pub remaining_ms: Option<u64>,
}

impl CallContext {
    /// Builds a context from call metadata. Total: missing attachments
    /// become empty strings, an absent deadline leaves `remaining_ms`
    /// unset, and an already-elapsed deadline saturates to zero.
    #[must_use]
    pub fn extract(metadata: &CallMetadata) -> Self {
        let field = |key| metadata.attachment(key).unwrap_or_default().to_string();
        Self {
            local_address: field(attachment_keys::LOCAL_ADDRESS),
            remote_address: field(attachment_keys::REMOTE_ADDRESS),
            client_id: field(attachment_keys::CLIENT_ID),
            language: field(attachment_keys::LANGUAGE),
            remaining_ms: metadata.deadline().map(|deadline| {
                let remaining = deadline.saturating_duration_since(Instant::now());
                u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX)
            }),
        }
    }
}
