//! Operation kinds and their static category assignment.

/// The five bulkhead categories. Each category gets its own pool so an
/// overload in one cannot starve another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationCategory {
    Route,
    Produce,
    Consume,
    ClientLifecycle,
    Transaction,
}

impl OperationCategory {
    /// Pool name used in logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            OperationCategory::Route => "route",
            OperationCategory::Produce => "produce",
            OperationCategory::Consume => "consume",
            OperationCategory::ClientLifecycle => "client-lifecycle",
            OperationCategory::Transaction => "transaction",
        }
    }
}

/// Every operation kind the front end accepts: ten unary kinds plus the
/// bidirectional telemetry stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcKind {
    QueryRoute,
    QueryAssignment,
    SendMessage,
    ForwardToDeadLetterQueue,
    ReceiveMessage,
    AckMessage,
    ChangeInvisibleDuration,
    Heartbeat,
    NotifyClientTermination,
    EndTransaction,
    Telemetry,
}

impl RpcKind {
    pub const ALL: [RpcKind; 11] = [
        RpcKind::QueryRoute,
        RpcKind::QueryAssignment,
        RpcKind::SendMessage,
        RpcKind::ForwardToDeadLetterQueue,
        RpcKind::ReceiveMessage,
        RpcKind::AckMessage,
        RpcKind::ChangeInvisibleDuration,
        RpcKind::Heartbeat,
        RpcKind::NotifyClientTermination,
        RpcKind::EndTransaction,
        RpcKind::Telemetry,
    ];

    /// The category this kind is dispatched to. The mapping is static and
    /// never changes at runtime.
    #[must_use]
    pub fn category(self) -> OperationCategory {
        match self {
            RpcKind::QueryRoute | RpcKind::QueryAssignment => OperationCategory::Route,
            RpcKind::SendMessage | RpcKind::ForwardToDeadLetterQueue => OperationCategory::Produce,
            RpcKind::ReceiveMessage
            | RpcKind::AckMessage
            | RpcKind::ChangeInvisibleDuration => OperationCategory::Consume,
            RpcKind::Heartbeat | RpcKind::NotifyClientTermination | RpcKind::Telemetry => {
                OperationCategory::ClientLifecycle
            }
            RpcKind::EndTransaction => OperationCategory::Transaction,
        }
    }

    /// Kind name used in logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            RpcKind::QueryRoute => "query_route",
            RpcKind::QueryAssignment => "query_assignment",
            RpcKind::SendMessage => "send_message",
            RpcKind::ForwardToDeadLetterQueue => "forward_to_dead_letter_queue",
            RpcKind::ReceiveMessage => "receive_message",
            RpcKind::AckMessage => "ack_message",
            RpcKind::ChangeInvisibleDuration => "change_invisible_duration",
            RpcKind::Heartbeat => "heartbeat",
            RpcKind::NotifyClientTermination => "notify_client_termination",
            RpcKind::EndTransaction => "end_transaction",
            RpcKind::Telemetry => "telemetry",
        }
    }
}
