//! Collaborator contracts: the business logic behind the front end.
//!
//! This layer only admits, schedules, and answers calls; the actual
//! broker semantics (routing, queue assignment, send/receive/ack,
//! transactions) live behind these traits.

use std::sync::Arc;

use async_trait::async_trait;

use super::context::CallContext;
use super::messages::{
    AckMessageRequest, AckMessageResponse, ChangeInvisibleDurationRequest,
    ChangeInvisibleDurationResponse, EndTransactionRequest, EndTransactionResponse,
    ForwardToDeadLetterQueueRequest, ForwardToDeadLetterQueueResponse, HeartbeatRequest,
    HeartbeatResponse, NotifyClientTerminationRequest, NotifyClientTerminationResponse,
    QueryAssignmentRequest, QueryAssignmentResponse, QueryRouteRequest, QueryRouteResponse,
    ReceiveMessageRequest, ReceiveMessageResponse, SendMessageRequest, SendMessageResponse,
    TelemetryCommand,
};
use super::sink::StreamSink;
use super::status::ProxyError;

/// Handler for inbound messages on one telemetry stream, produced by
/// [`MessagingActivity::telemetry`].
///
/// `on_command` runs on a bulkhead pool worker; `on_error` and
/// `on_completed` are invoked synchronously from the stream multiplexer,
/// outside admission control.
#[async_trait]
pub trait TelemetryHandler: Send + Sync {
    async fn on_command(&self, command: TelemetryCommand);
    fn on_error(&self, error: ProxyError);
    fn on_completed(&self);
}

/// The broker-proxy business logic, one asynchronous method per unary
/// operation kind plus the telemetry stream factory.
///
/// Unary methods complete on whichever task resolves them; the front end
/// delivers their result from that context.
#[async_trait]
pub trait MessagingActivity: Send + Sync {
    /// Starts the collaborator.
    ///
    /// # Errors
    ///
    /// Returns an error if the collaborator cannot start.
    async fn start(&self) -> anyhow::Result<()>;

    /// Shuts the collaborator down.
    ///
    /// # Errors
    ///
    /// Returns an error if teardown fails.
    async fn shutdown(&self) -> anyhow::Result<()>;

    async fn query_route(
        &self,
        ctx: &CallContext,
        request: QueryRouteRequest,
    ) -> Result<QueryRouteResponse, ProxyError>;

    async fn query_assignment(
        &self,
        ctx: &CallContext,
        request: QueryAssignmentRequest,
    ) -> Result<QueryAssignmentResponse, ProxyError>;

    async fn send_message(
        &self,
        ctx: &CallContext,
        request: SendMessageRequest,
    ) -> Result<SendMessageResponse, ProxyError>;

    async fn forward_to_dead_letter_queue(
        &self,
        ctx: &CallContext,
        request: ForwardToDeadLetterQueueRequest,
    ) -> Result<ForwardToDeadLetterQueueResponse, ProxyError>;

    async fn receive_message(
        &self,
        ctx: &CallContext,
        request: ReceiveMessageRequest,
    ) -> Result<ReceiveMessageResponse, ProxyError>;

    async fn ack_message(
        &self,
        ctx: &CallContext,
        request: AckMessageRequest,
    ) -> Result<AckMessageResponse, ProxyError>;

    async fn change_invisible_duration(
        &self,
        ctx: &CallContext,
        request: ChangeInvisibleDurationRequest,
    ) -> Result<ChangeInvisibleDurationResponse, ProxyError>;

    async fn heartbeat(
        &self,
        ctx: &CallContext,
        request: HeartbeatRequest,
    ) -> Result<HeartbeatResponse, ProxyError>;

    async fn notify_client_termination(
        &self,
        ctx: &CallContext,
        request: NotifyClientTerminationRequest,
    ) -> Result<NotifyClientTerminationResponse, ProxyError>;

    async fn end_transaction(
        &self,
        ctx: &CallContext,
        request: EndTransactionRequest,
    ) -> Result<EndTransactionResponse, ProxyError>;

    /// Opens a telemetry stream: given the stream's context and the
    /// outbound sink, returns the handler for inbound messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be established; the stream
    /// is then never constructed.
    async fn telemetry(
        &self,
        ctx: &CallContext,
        outbound: StreamSink<TelemetryCommand>,
    ) -> Result<Arc<dyn TelemetryHandler>, ProxyError>;
}
