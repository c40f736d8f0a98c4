//! Composition root: admission, dispatch, and completion plumbing.
//!
//! One entry point per operation kind. Each unary entry extracts the call
//! context, wraps the collaborator call and its delivery into an
//! [`RpcTask`] carrying a precomputed flow-limit envelope, and submits it
//! to the category's bulkhead pool. The submitting thread never runs the
//! operation body and never blocks. No retries, health checks, or
//! circuit breaking live here.

use std::future::Future;
use std::sync::Arc;

use super::activity::MessagingActivity;
use super::bulkhead::BulkheadPool;
use super::config::RpcConfig;
use super::context::{CallContext, CallMetadata};
use super::delivery::deliver;
use super::messages::{
    AckMessageRequest, AckMessageResponse, ChangeInvisibleDurationRequest,
    ChangeInvisibleDurationResponse, EndTransactionRequest, EndTransactionResponse,
    ForwardToDeadLetterQueueRequest, ForwardToDeadLetterQueueResponse, HeartbeatRequest,
    HeartbeatResponse, NotifyClientTerminationRequest, NotifyClientTerminationResponse,
    QueryAssignmentRequest, QueryAssignmentResponse, QueryRouteRequest, QueryRouteResponse,
    ReceiveMessageRequest, ReceiveMessageResponse, SendMessageRequest, SendMessageResponse,
    TelemetryCommand,
};
use super::operation::{OperationCategory, RpcKind};
use super::sink::{StreamSink, UnarySink};
use super::status::{ProxyError, Status};
use super::task::RpcTask;
use super::telemetry::TelemetryStream;

/// The five category pools, created once at facade construction and
/// immutable for the process lifetime.
struct PoolSet {
    route: Arc<BulkheadPool>,
    produce: Arc<BulkheadPool>,
    consume: Arc<BulkheadPool>,
    client_lifecycle: Arc<BulkheadPool>,
    transaction: Arc<BulkheadPool>,
}

impl PoolSet {
    fn start(config: &RpcConfig) -> Self {
        Self {
            route: Arc::new(BulkheadPool::start("route", &config.route)),
            produce: Arc::new(BulkheadPool::start("produce", &config.produce)),
            consume: Arc::new(BulkheadPool::start("consume", &config.consume)),
            client_lifecycle: Arc::new(BulkheadPool::start(
                "client-lifecycle",
                &config.client_lifecycle,
            )),
            transaction: Arc::new(BulkheadPool::start("transaction", &config.transaction)),
        }
    }

    fn get(&self, category: OperationCategory) -> &Arc<BulkheadPool> {
        match category {
            OperationCategory::Route => &self.route,
            OperationCategory::Produce => &self.produce,
            OperationCategory::Consume => &self.consume,
            OperationCategory::ClientLifecycle => &self.client_lifecycle,
            OperationCategory::Transaction => &self.transaction,
        }
    }

    async fn shutdown(&self) {
        for pool in [
            &self.route,
            &self.produce,
            &self.consume,
            &self.client_lifecycle,
            &self.transaction,
        ] {
            pool.shutdown().await;
        }
    }
}

/// The RPC front end of the broker proxy.
///
/// Owns the five bulkhead pools and the collaborator. Must be constructed
/// within a tokio runtime (pool workers are spawned immediately).
pub struct MessagingApplication {
    activity: Arc<dyn MessagingActivity>,
    pools: PoolSet,
}

impl MessagingApplication {
    /// Builds the facade, spawning one bulkhead pool per operation
    /// category from the given configuration.
    #[must_use]
    pub fn new(activity: Arc<dyn MessagingActivity>, config: &RpcConfig) -> Self {
        Self {
            activity,
            pools: PoolSet::start(config),
        }
    }

    /// Starts the underlying collaborator.
    ///
    /// # Errors
    ///
    /// Returns an error if the collaborator fails to start.
    pub async fn start(&self) -> anyhow::Result<()> {
        self.activity.start().await
    }

    /// Shuts down the collaborator, then all five pools. Pool shutdown is
    /// drain-then-stop; submissions arriving afterwards receive the
    /// flow-limit envelope.
    ///
    /// # Errors
    ///
    /// Returns an error if the collaborator fails to shut down; the pools
    /// are not stopped in that case.
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        self.activity.shutdown().await?;
        self.pools.shutdown().await;
        Ok(())
    }

    /// Wraps one unary call into an admission task and submits it.
    ///
    /// `envelope` builds the kind-specific response around a status; it
    /// serves both the failure-translation write and the precomputed
    /// rejection write.
    fn dispatch<Resp, Fut>(
        &self,
        kind: RpcKind,
        op: Fut,
        sink: UnarySink<Resp>,
        envelope: fn(Status) -> Resp,
    ) where
        Resp: Send + 'static,
        Fut: Future<Output = Result<Resp, ProxyError>> + Send + 'static,
    {
        let op_sink = sink.clone();
        let task = RpcTask::new(
            kind,
            Box::pin(async move {
                deliver(op.await, &op_sink, envelope);
            }),
            Box::new(move || {
                sink.write(envelope(Status::flow_limited()));
            }),
        );
        self.pools.get(kind.category()).submit(task);
    }

    pub fn query_route(
        &self,
        metadata: &CallMetadata,
        request: QueryRouteRequest,
        sink: UnarySink<QueryRouteResponse>,
    ) {
        let context = CallContext::extract(metadata);
        let activity = Arc::clone(&self.activity);
        self.dispatch(
            RpcKind::QueryRoute,
            async move { activity.query_route(&context, request).await },
            sink,
            QueryRouteResponse::with_status,
        );
    }

    pub fn query_assignment(
        &self,
        metadata: &CallMetadata,
        request: QueryAssignmentRequest,
        sink: UnarySink<QueryAssignmentResponse>,
    ) {
        let context = CallContext::extract(metadata);
        let activity = Arc::clone(&self.activity);
        self.dispatch(
            RpcKind::QueryAssignment,
            async move { activity.query_assignment(&context, request).await },
            sink,
            QueryAssignmentResponse::with_status,
        );
    }

    pub fn send_message(
        &self,
        metadata: &CallMetadata,
        request: SendMessageRequest,
        sink: UnarySink<SendMessageResponse>,
    ) {
        let context = CallContext::extract(metadata);
        let activity = Arc::clone(&self.activity);
        self.dispatch(
            RpcKind::SendMessage,
            async move { activity.send_message(&context, request).await },
            sink,
            SendMessageResponse::with_status,
        );
    }

    pub fn forward_to_dead_letter_queue(
        &self,
        metadata: &CallMetadata,
        request: ForwardToDeadLetterQueueRequest,
        sink: UnarySink<ForwardToDeadLetterQueueResponse>,
    ) {
        let context = CallContext::extract(metadata);
        let activity = Arc::clone(&self.activity);
        self.dispatch(
            RpcKind::ForwardToDeadLetterQueue,
            async move {
                activity
                    .forward_to_dead_letter_queue(&context, request)
                    .await
            },
            sink,
            ForwardToDeadLetterQueueResponse::with_status,
        );
    }

    pub fn receive_message(
        &self,
        metadata: &CallMetadata,
        request: ReceiveMessageRequest,
        sink: UnarySink<ReceiveMessageResponse>,
    ) {
        let context = CallContext::extract(metadata);
        let activity = Arc::clone(&self.activity);
        self.dispatch(
            RpcKind::ReceiveMessage,
            async move { activity.receive_message(&context, request).await },
            sink,
            ReceiveMessageResponse::with_status,
        );
    }

    pub fn ack_message(
        &self,
        metadata: &CallMetadata,
        request: AckMessageRequest,
        sink: UnarySink<AckMessageResponse>,
    ) {
        let context = CallContext::extract(metadata);
        let activity = Arc::clone(&self.activity);
        self.dispatch(
            RpcKind::AckMessage,
            async move { activity.ack_message(&context, request).await },
            sink,
            AckMessageResponse::with_status,
        );
    }

    pub fn change_invisible_duration(
        &self,
        metadata: &CallMetadata,
        request: ChangeInvisibleDurationRequest,
        sink: UnarySink<ChangeInvisibleDurationResponse>,
    ) {
        let context = CallContext::extract(metadata);
        let activity = Arc::clone(&self.activity);
        self.dispatch(
            RpcKind::ChangeInvisibleDuration,
            async move { activity.change_invisible_duration(&context, request).await },
            sink,
            ChangeInvisibleDurationResponse::with_status,
        );
    }

    pub fn heartbeat(
        &self,
        metadata: &CallMetadata,
        request: HeartbeatRequest,
        sink: UnarySink<HeartbeatResponse>,
    ) {
        let context = CallContext::extract(metadata);
        let activity = Arc::clone(&self.activity);
        self.dispatch(
            RpcKind::Heartbeat,
            async move { activity.heartbeat(&context, request).await },
            sink,
            HeartbeatResponse::with_status,
        );
    }

    pub fn notify_client_termination(
        &self,
        metadata: &CallMetadata,
        request: NotifyClientTerminationRequest,
        sink: UnarySink<NotifyClientTerminationResponse>,
    ) {
        let context = CallContext::extract(metadata);
        let activity = Arc::clone(&self.activity);
        self.dispatch(
            RpcKind::NotifyClientTermination,
            async move { activity.notify_client_termination(&context, request).await },
            sink,
            NotifyClientTerminationResponse::with_status,
        );
    }

    pub fn end_transaction(
        &self,
        metadata: &CallMetadata,
        request: EndTransactionRequest,
        sink: UnarySink<EndTransactionResponse>,
    ) {
        let context = CallContext::extract(metadata);
        let activity = Arc::clone(&self.activity);
        self.dispatch(
            RpcKind::EndTransaction,
            async move { activity.end_transaction(&context, request).await },
            sink,
            EndTransactionResponse::with_status,
        );
    }

    /// Opens the bidirectional telemetry stream. The context is extracted
    /// once and shared by every message on the stream; inbound messages
    /// are admitted through the client-lifecycle pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the collaborator refuses the stream.
    pub async fn telemetry(
        &self,
        metadata: &CallMetadata,
        outbound: StreamSink<TelemetryCommand>,
    ) -> Result<TelemetryStream, ProxyError> {
        let context = CallContext::extract(metadata);
        let handler = self.activity.telemetry(&context, outbound.clone()).await?;
        Ok(TelemetryStream::new(
            context,
            outbound,
            handler,
            Arc::clone(self.pools.get(OperationCategory::ClientLifecycle)),
        ))
    }
}

impl std::fmt::Debug for MessagingApplication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagingApplication").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::sync::oneshot;

    use super::*;
    use crate::rpc::activity::TelemetryHandler;
    use crate::rpc::config::PoolConfig;
    use crate::rpc::status::StatusCode;

    /// Collaborator stub. `send_message` optionally parks on a gate so a
    /// worker can be held busy; `fail_ack` makes `ack_message` fail.
    struct StubActivity {
        started: AtomicBool,
        stopped: AtomicBool,
        send_gate: Mutex<Option<oneshot::Receiver<()>>>,
        send_entered: Mutex<Option<oneshot::Sender<()>>>,
        fail_ack: bool,
        telemetry_handler: Arc<NullHandler>,
    }

    impl StubActivity {
        fn new() -> Self {
            Self {
                started: AtomicBool::new(false),
                stopped: AtomicBool::new(false),
                send_gate: Mutex::new(None),
                send_entered: Mutex::new(None),
                fail_ack: false,
                telemetry_handler: Arc::new(NullHandler::default()),
            }
        }

        fn with_send_gate(mut self) -> (Self, oneshot::Receiver<()>, oneshot::Sender<()>) {
            let (entered_tx, entered_rx) = oneshot::channel();
            let (release_tx, release_rx) = oneshot::channel();
            self.send_gate = Mutex::new(Some(release_rx));
            self.send_entered = Mutex::new(Some(entered_tx));
            (self, entered_rx, release_tx)
        }
    }

    #[derive(Default)]
    struct NullHandler {
        commands: Mutex<Vec<TelemetryCommand>>,
    }

    #[async_trait]
    impl TelemetryHandler for NullHandler {
        async fn on_command(&self, command: TelemetryCommand) {
            self.commands.lock().push(command);
        }
        fn on_error(&self, _error: ProxyError) {}
        fn on_completed(&self) {}
    }

    #[async_trait]
    impl MessagingActivity for StubActivity {
        async fn start(&self) -> anyhow::Result<()> {
            self.started.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn shutdown(&self) -> anyhow::Result<()> {
            self.stopped.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn query_route(
            &self,
            _ctx: &CallContext,
            request: QueryRouteRequest,
        ) -> Result<QueryRouteResponse, ProxyError> {
            Ok(QueryRouteResponse {
                status: Status::ok(),
                queues: vec![format!("{}-0", request.topic)],
            })
        }

        async fn query_assignment(
            &self,
            _ctx: &CallContext,
            _request: QueryAssignmentRequest,
        ) -> Result<QueryAssignmentResponse, ProxyError> {
            Ok(QueryAssignmentResponse::with_status(Status::ok()))
        }

        async fn send_message(
            &self,
            _ctx: &CallContext,
            request: SendMessageRequest,
        ) -> Result<SendMessageResponse, ProxyError> {
            if let Some(entered) = self.send_entered.lock().take() {
                let _ = entered.send(());
            }
            let gate = self.send_gate.lock().take();
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            Ok(SendMessageResponse {
                status: Status::ok(),
                message_id: format!("{}-msg", request.topic),
            })
        }

        async fn forward_to_dead_letter_queue(
            &self,
            _ctx: &CallContext,
            _request: ForwardToDeadLetterQueueRequest,
        ) -> Result<ForwardToDeadLetterQueueResponse, ProxyError> {
            Ok(ForwardToDeadLetterQueueResponse::with_status(Status::ok()))
        }

        async fn receive_message(
            &self,
            _ctx: &CallContext,
            _request: ReceiveMessageRequest,
        ) -> Result<ReceiveMessageResponse, ProxyError> {
            Ok(ReceiveMessageResponse::with_status(Status::ok()))
        }

        async fn ack_message(
            &self,
            _ctx: &CallContext,
            _request: AckMessageRequest,
        ) -> Result<AckMessageResponse, ProxyError> {
            if self.fail_ack {
                return Err(ProxyError::Internal(anyhow::anyhow!("broker down")));
            }
            Ok(AckMessageResponse::with_status(Status::ok()))
        }

        async fn change_invisible_duration(
            &self,
            _ctx: &CallContext,
            request: ChangeInvisibleDurationRequest,
        ) -> Result<ChangeInvisibleDurationResponse, ProxyError> {
            Ok(ChangeInvisibleDurationResponse {
                status: Status::ok(),
                receipt_handle: request.receipt_handle,
            })
        }

        async fn heartbeat(
            &self,
            _ctx: &CallContext,
            _request: HeartbeatRequest,
        ) -> Result<HeartbeatResponse, ProxyError> {
            Ok(HeartbeatResponse::with_status(Status::ok()))
        }

        async fn notify_client_termination(
            &self,
            _ctx: &CallContext,
            _request: NotifyClientTerminationRequest,
        ) -> Result<NotifyClientTerminationResponse, ProxyError> {
            Ok(NotifyClientTerminationResponse::with_status(Status::ok()))
        }

        async fn end_transaction(
            &self,
            _ctx: &CallContext,
            _request: EndTransactionRequest,
        ) -> Result<EndTransactionResponse, ProxyError> {
            Ok(EndTransactionResponse::with_status(Status::ok()))
        }

        async fn telemetry(
            &self,
            _ctx: &CallContext,
            _outbound: StreamSink<TelemetryCommand>,
        ) -> Result<Arc<dyn TelemetryHandler>, ProxyError> {
            Ok(Arc::clone(&self.telemetry_handler) as Arc<dyn TelemetryHandler>)
        }
    }

    fn tiny_produce_config() -> RpcConfig {
        RpcConfig {
            produce: PoolConfig {
                workers: 1,
                queue_capacity: 1,
            },
            ..RpcConfig::default()
        }
    }

    #[tokio::test]
    async fn unary_success_delivers_collaborator_response() {
        let app = MessagingApplication::new(Arc::new(StubActivity::new()), &RpcConfig::default());
        let (sink, rx) = UnarySink::channel();
        app.query_route(
            &CallMetadata::new(),
            QueryRouteRequest {
                topic: "orders".to_string(),
            },
            sink,
        );
        let response = rx.await.unwrap();
        assert_eq!(response.status.code, StatusCode::Ok);
        assert_eq!(response.queues, vec!["orders-0".to_string()]);
    }

    #[tokio::test]
    async fn unary_failure_arrives_as_status_not_error() {
        let activity = StubActivity {
            fail_ack: true,
            ..StubActivity::new()
        };
        let app = MessagingApplication::new(Arc::new(activity), &RpcConfig::default());
        let (sink, rx) = UnarySink::channel();
        app.ack_message(&CallMetadata::new(), AckMessageRequest::default(), sink);
        let response = rx.await.unwrap();
        assert_eq!(response.status.code, StatusCode::InternalServerError);
        assert_ne!(response.status.code, StatusCode::TooManyRequests);
    }

    #[tokio::test]
    async fn saturated_produce_pool_rejects_without_running() {
        let (activity, entered, release) = StubActivity::new().with_send_gate();
        let app = MessagingApplication::new(Arc::new(activity), &tiny_produce_config());

        // Hold the single produce worker busy.
        let (hold_sink, hold_rx) = UnarySink::channel();
        app.send_message(
            &CallMetadata::new(),
            SendMessageRequest {
                topic: "held".to_string(),
                body: vec![],
            },
            hold_sink,
        );
        entered.await.unwrap();

        // First send queues; second is rejected with the precomputed
        // flow-limit envelope, before any operation body runs.
        let (queued_sink, queued_rx) = UnarySink::channel();
        app.send_message(
            &CallMetadata::new(),
            SendMessageRequest {
                topic: "queued".to_string(),
                body: vec![],
            },
            queued_sink,
        );
        let (rejected_sink, rejected_rx) = UnarySink::channel();
        app.send_message(
            &CallMetadata::new(),
            SendMessageRequest {
                topic: "rejected".to_string(),
                body: vec![],
            },
            rejected_sink,
        );
        let rejection = rejected_rx.await.unwrap();
        assert_eq!(rejection.status.code, StatusCode::TooManyRequests);
        assert_eq!(rejection.status.message, "flow limit");
        assert!(rejection.message_id.is_empty());

        // The held and queued calls still complete normally.
        release.send(()).unwrap();
        assert_eq!(hold_rx.await.unwrap().status.code, StatusCode::Ok);
        assert_eq!(queued_rx.await.unwrap().status.code, StatusCode::Ok);
    }

    #[tokio::test]
    async fn saturating_produce_does_not_affect_client_lifecycle() {
        let (activity, entered, release) = StubActivity::new().with_send_gate();
        let app = MessagingApplication::new(Arc::new(activity), &tiny_produce_config());

        // Fully saturate produce: worker held plus a queued send.
        let (hold_sink, hold_rx) = UnarySink::channel();
        app.send_message(&CallMetadata::new(), SendMessageRequest::default(), hold_sink);
        entered.await.unwrap();
        let (queued_sink, queued_rx) = UnarySink::channel();
        app.send_message(&CallMetadata::new(), SendMessageRequest::default(), queued_sink);

        // Heartbeats ride the client-lifecycle pool and are unaffected.
        let (hb_sink, hb_rx) = UnarySink::channel();
        app.heartbeat(&CallMetadata::new(), HeartbeatRequest::default(), hb_sink);
        assert_eq!(hb_rx.await.unwrap().status.code, StatusCode::Ok);

        release.send(()).unwrap();
        assert_eq!(hold_rx.await.unwrap().status.code, StatusCode::Ok);
        assert_eq!(queued_rx.await.unwrap().status.code, StatusCode::Ok);
    }

    #[tokio::test]
    async fn lifecycle_delegates_and_stops_pools() {
        let activity = Arc::new(StubActivity::new());
        let app = MessagingApplication::new(
            Arc::clone(&activity) as Arc<dyn MessagingActivity>,
            &RpcConfig::default(),
        );
        app.start().await.unwrap();
        assert!(activity.started.load(Ordering::SeqCst));

        app.shutdown().await.unwrap();
        assert!(activity.stopped.load(Ordering::SeqCst));

        // Submissions after shutdown receive the flow-limit envelope.
        let (sink, rx) = UnarySink::channel();
        app.query_route(&CallMetadata::new(), QueryRouteRequest::default(), sink);
        assert_eq!(rx.await.unwrap().status.code, StatusCode::TooManyRequests);
    }

    #[tokio::test]
    async fn telemetry_stream_forwards_through_the_facade() {
        let activity = Arc::new(StubActivity::new());
        let app = MessagingApplication::new(
            Arc::clone(&activity) as Arc<dyn MessagingActivity>,
            &RpcConfig::default(),
        );
        let metadata = CallMetadata::new()
            .with_attachment(crate::rpc::context::attachment_keys::CLIENT_ID, "c-9");
        let (outbound, _outbound_rx) = StreamSink::channel(8);
        let stream = app.telemetry(&metadata, outbound).await.unwrap();
        assert_eq!(stream.context().client_id, "c-9");

        stream.on_command(TelemetryCommand::default());
        app.shutdown().await.unwrap();
        assert_eq!(activity.telemetry_handler.commands.lock().len(), 1);
    }
}
