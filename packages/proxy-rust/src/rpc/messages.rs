//! Request/response envelopes for the RPC surface.
//!
//! These shapes are externally defined; this layer treats them opaquely
//! except for the shared `status` field every response carries. Each
//! response type provides `with_status`, the envelope constructor shared
//! by the failure-translation and rejection paths.

use serde::{Deserialize, Serialize};

use super::status::Status;

macro_rules! impl_with_status {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $ty {
                /// Builds an envelope carrying only the given status.
                #[must_use]
                pub fn with_status(status: Status) -> Self {
                    Self {
                        status,
                        ..Self::default()
                    }
                }
            }
        )+
    };
}

// ----- route -----

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRouteRequest {
    pub topic: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRouteResponse {
    pub status: Status,
    pub queues: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAssignmentRequest {
    pub topic: String,
    pub group: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryAssignmentResponse {
    pub status: Status,
    pub assignments: Vec<String>,
}

// ----- produce -----

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub topic: String,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub status: Status,
    pub message_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardToDeadLetterQueueRequest {
    pub topic: String,
    pub group: String,
    pub receipt_handle: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardToDeadLetterQueueResponse {
    pub status: Status,
}

// ----- consume -----

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveMessageRequest {
    pub topic: String,
    pub group: String,
    pub batch_size: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiveMessageResponse {
    pub status: Status,
    pub messages: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckMessageRequest {
    pub topic: String,
    pub group: String,
    pub receipt_handle: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckMessageResponse {
    pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeInvisibleDurationRequest {
    pub receipt_handle: String,
    pub invisible_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeInvisibleDurationResponse {
    pub status: Status,
    pub receipt_handle: String,
}

// ----- client lifecycle -----

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatRequest {
    pub group: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartbeatResponse {
    pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyClientTerminationRequest {
    pub group: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifyClientTerminationResponse {
    pub status: Status,
}

// ----- transaction -----

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndTransactionRequest {
    pub transaction_id: String,
    pub commit: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndTransactionResponse {
    pub status: Status,
}

// ----- telemetry (bidirectional stream) -----

/// A single message on the bidirectional telemetry stream. Flows in both
/// directions; rejected inbound commands are answered with an outbound
/// command carrying the flow-limit status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCommand {
    pub status: Status,
    pub payload: Vec<u8>,
}

impl_with_status!(
    QueryRouteResponse,
    QueryAssignmentResponse,
    SendMessageResponse,
    ForwardToDeadLetterQueueResponse,
    ReceiveMessageResponse,
    AckMessageResponse,
    ChangeInvisibleDurationResponse,
    HeartbeatResponse,
    NotifyClientTerminationResponse,
    EndTransactionResponse,
    TelemetryCommand,
);
