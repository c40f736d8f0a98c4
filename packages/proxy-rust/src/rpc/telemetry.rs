//! Multiplexer for the bidirectional telemetry stream.
//!
//! Each inbound message is individually admitted through the
//! client-lifecycle bulkhead pool, under the same saturation rules as
//! unary calls. Stream lifecycle signals (error, completion) are not new
//! work and bypass the pool entirely: they reach the handler
//! synchronously and immediately.

use std::sync::Arc;

use super::activity::TelemetryHandler;
use super::bulkhead::BulkheadPool;
use super::context::CallContext;
use super::messages::TelemetryCommand;
use super::operation::RpcKind;
use super::sink::StreamSink;
use super::status::{ProxyError, Status};
use super::task::RpcTask;

/// One live telemetry stream.
///
/// Created once per stream by the facade and held for the stream's
/// duration. The context is extracted once at stream creation and shared
/// by every message on the stream.
pub struct TelemetryStream {
    context: CallContext,
    outbound: StreamSink<TelemetryCommand>,
    handler: Arc<dyn TelemetryHandler>,
    pool: Arc<BulkheadPool>,
}

impl TelemetryStream {
    pub(crate) fn new(
        context: CallContext,
        outbound: StreamSink<TelemetryCommand>,
        handler: Arc<dyn TelemetryHandler>,
        pool: Arc<BulkheadPool>,
    ) -> Self {
        Self {
            context,
            outbound,
            handler,
            pool,
        }
    }

    /// The context captured when the stream was opened.
    #[must_use]
    pub fn context(&self) -> &CallContext {
        &self.context
    }

    /// Forwards one inbound message through the client-lifecycle pool.
    ///
    /// When the pool is saturated the message is answered on the outbound
    /// sink with a flow-limit command; the stream itself stays open and
    /// no error or completion is signalled.
    pub fn on_command(&self, command: TelemetryCommand) {
        let handler = Arc::clone(&self.handler);
        let outbound = self.outbound.clone();
        let task = RpcTask::new(
            RpcKind::Telemetry,
            Box::pin(async move {
                handler.on_command(command).await;
            }),
            Box::new(move || {
                outbound.write(TelemetryCommand::with_status(Status::flow_limited()));
            }),
        );
        self.pool.submit(task);
    }

    /// Forwards a stream error to the handler, bypassing admission
    /// control: the caller is reporting termination, not issuing work.
    pub fn on_error(&self, error: ProxyError) {
        self.handler.on_error(error);
    }

    /// Forwards stream completion to the handler, bypassing admission
    /// control.
    pub fn on_completed(&self) {
        self.handler.on_completed();
    }
}

impl std::fmt::Debug for TelemetryStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryStream")
            .field("context", &self.context)
            .field("pool", &self.pool.name())
            .finish_non_exhaustive()
    }
}
