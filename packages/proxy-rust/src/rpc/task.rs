//! Admission task: an operation body paired with its rejection path.

use std::fmt;

use futures_util::future::BoxFuture;

use super::operation::RpcKind;

/// A unit of work admitted to a bulkhead pool.
///
/// Carries the operation body (which performs the collaborator call and
/// ends in a response-delivery write) and a precomputed rejection path
/// (which writes the flow-limit envelope through the same sink). A task
/// is consumed by exactly one of `run` or `reject`; taking `self` by
/// value makes the two completion paths mutually exclusive by
/// construction, so no call can receive two terminal responses from one
/// task.
pub struct RpcTask {
    kind: RpcKind,
    op: BoxFuture<'static, ()>,
    reject: Box<dyn FnOnce() + Send>,
}

impl RpcTask {
    #[must_use]
    pub fn new(kind: RpcKind, op: BoxFuture<'static, ()>, reject: Box<dyn FnOnce() + Send>) -> Self {
        Self { kind, op, reject }
    }

    /// The operation kind, for diagnostics.
    #[must_use]
    pub fn kind(&self) -> RpcKind {
        self.kind
    }

    /// Runs the operation body on a pool worker. The unused rejection
    /// closure is dropped without executing.
    pub(crate) async fn run(self) {
        self.op.await;
    }

    /// Answers the caller with the precomputed rejection envelope. Runs
    /// synchronously on the submitting thread; the operation body is
    /// dropped without executing.
    pub(crate) fn reject(self) {
        (self.reject)();
    }
}

impl fmt::Debug for RpcTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcTask").field("kind", &self.kind).finish()
    }
}
